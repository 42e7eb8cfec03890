use casefile_core::config::{DialogueConfig, EncounterConfig};
use casefile_core::encounter::topic::{resolve_compacted_index, visible_indices};
use casefile_core::encounter::{
    Encounter, EncounterBuilder, LineScript, MenuKind, Mode, ProfileSet, ScriptRequest, Step, Topic,
};
use casefile_core::SceneState;
use casefile_ui::widgets::EvidenceEntry;
use proptest::prelude::*;

fn say(text: &str) -> LineScript {
    let config = DialogueConfig { ms_per_char: 1, ..DialogueConfig::default() };
    LineScript::from_lines(&[text], &config, 0).unwrap()
}

fn run_until(enc: &mut Encounter, state: &mut SceneState, mut done: impl FnMut(&Encounter) -> bool) {
    for _ in 0..2_000 {
        if done(enc) {
            return;
        }
        enc.update(16, state);
    }
    panic!("condition never reached, encounter stuck in {:?}", enc.mode());
}

fn open_topics(enc: &mut Encounter, state: &mut SceneState) {
    assert_eq!(enc.menu_kind(), Some(MenuKind::Main));
    assert!(enc.select_menu_entry(0).unwrap());
    run_until(enc, state, |e| e.menu_kind() == Some(MenuKind::Topics));
}

#[test]
fn test_menu_compaction_resolves_full_index() {
    let mut b = EncounterBuilder::new(EncounterConfig::default());
    let sa = b.add_script(say("About A."));
    let sb = b.add_script(say("About B."));
    let sc = b.add_script(say("About C."));
    let sd = b.add_script(say("About D."));
    let mut done = Topic::new("d", "D", sd).hidden_when_completed();
    done.completed = true;
    b.topic(Topic::new("a", "A", sa))
        .topic(Topic::new("b", "B", sb).unlocked_by("never"))
        .topic(Topic::new("c", "C", sc))
        .topic(done);
    let mut enc = b.build().unwrap();
    let mut state = SceneState::new();

    enc.begin(&mut state);
    open_topics(&mut enc, &mut state);
    assert_eq!(enc.menu_labels(), ["A", "C", "Back"]);

    assert!(enc.select_menu_entry(1).unwrap());
    run_until(&mut enc, &mut state, |e| e.mode() == Mode::ScriptRunning);
    assert_eq!(enc.running_script(), Some(sc));

    run_until(&mut enc, &mut state, |e| e.mode() == Mode::Menu);
    assert!(enc.topics()[2].completed);
    assert!(!enc.topics()[1].completed);
    assert_eq!(enc.menu_kind(), Some(MenuKind::Topics));
}

fn evidence_encounter() -> (Encounter, [casefile_core::encounter::ScriptId; 3]) {
    let mut b = Encounter::builder(EncounterConfig::default());
    let badge = b.add_script(say("That's my badge."));
    let wrong = b.add_script(say("What does that prove?"));
    let wrong_profile = b.add_script(say("Who is that?"));
    b.evidence(EvidenceEntry::new("badge", "Attorney's Badge"))
        .evidence(EvidenceEntry::new("knife", "Kitchen Knife"))
        .evidence(EvidenceEntry::new("maya", "Maya Fey"))
        .evidence_script("badge", badge)
        .wrong_evidence_script(wrong)
        .wrong_profile_script(wrong_profile)
        .catalog(ProfileSet::new().with_profile("maya"));
    (b.build().unwrap(), [badge, wrong, wrong_profile])
}

#[test]
fn test_wrong_evidence_routes_by_item_kind() {
    let (enc, [badge, wrong, wrong_profile]) = evidence_encounter();
    assert_eq!(enc.script_for_evidence("badge"), Some(badge));
    assert_eq!(enc.script_for_evidence("knife"), Some(wrong));
    assert_eq!(enc.script_for_evidence("maya"), Some(wrong_profile));
}

#[test]
fn test_presenting_unbound_object_runs_generic_fallback() {
    let (mut enc, [_, wrong, _]) = evidence_encounter();
    let mut state = SceneState::new();
    enc.begin(&mut state);

    assert!(enc.select_menu_entry(1).unwrap());
    run_until(&mut enc, &mut state, |e| e.mode() == Mode::EvidencePicker);
    assert!(enc.present_evidence("knife").unwrap());
    run_until(&mut enc, &mut state, |e| e.mode() == Mode::ScriptRunning);
    assert_eq!(enc.running_script(), Some(wrong));

    run_until(&mut enc, &mut state, |e| e.mode() == Mode::Menu);
    assert_eq!(enc.menu_kind(), Some(MenuKind::Main));
}

#[test]
fn test_topic_requests_evidence_then_cancel_returns_to_topics() {
    let mut b = EncounterBuilder::new(EncounterConfig::default());
    let ask = b.add_script(say("Show me proof.").request(ScriptRequest::PresentEvidence));
    b.topic(Topic::new("proof", "Proof", ask))
        .evidence(EvidenceEntry::new("badge", "Badge"));
    let mut enc = b.build().unwrap();
    let mut state = SceneState::new();

    enc.begin(&mut state);
    open_topics(&mut enc, &mut state);
    assert!(enc.select_menu_entry(0).unwrap());
    run_until(&mut enc, &mut state, |e| e.mode() == Mode::EvidencePicker);
    assert_eq!(enc.running_script(), None);

    assert!(enc.cancel_evidence());
    assert!(!enc.cancel_evidence());
    run_until(&mut enc, &mut state, |e| e.mode() == Mode::Menu);
    assert_eq!(enc.menu_kind(), Some(MenuKind::Topics));
    assert!(!enc.topics()[0].completed);
}

#[test]
fn test_redirect_prefers_topic_fallback() {
    let mut b = EncounterBuilder::new(EncounterConfig::default());
    let generic = b.add_script(say("Generic."));
    let own = b.add_script(say("Not that again."));
    let topic = b.add_script(say("Hmm.").step(Step::RedirectToWrongEvidence));
    b.topic(Topic::new("alibi", "Alibi", topic).with_wrong_evidence(own))
        .wrong_evidence_script(generic);
    let mut enc = b.build().unwrap();
    let mut state = SceneState::new();

    enc.begin(&mut state);
    open_topics(&mut enc, &mut state);
    enc.select_menu_entry(0).unwrap();
    run_until(&mut enc, &mut state, |e| e.running_script() == Some(own));
    assert!(enc.topics()[0].completed);
}

#[test]
fn test_early_exit_skips_completion() {
    let mut b = EncounterBuilder::new(EncounterConfig::default());
    let bail = b.add_script(say("Never mind.").step(Step::ExitEarly).set_flag("unreached"));
    b.topic(Topic::new("x", "X", bail));
    let mut enc = b.build().unwrap();
    let mut state = SceneState::new();

    enc.begin(&mut state);
    open_topics(&mut enc, &mut state);
    enc.select_menu_entry(0).unwrap();
    run_until(&mut enc, &mut state, |e| e.mode() == Mode::ScriptRunning);
    run_until(&mut enc, &mut state, |e| e.mode() == Mode::Menu);
    assert!(!enc.topics()[0].completed);
    assert!(!state.has_flag("unreached"));
    assert_eq!(enc.menu_kind(), Some(MenuKind::Topics));
}

#[test]
fn test_unlocked_topic_gets_badge() {
    let mut b = EncounterBuilder::new(EncounterConfig::default());
    let first = b.add_script(say("Interesting...").set_flag("clue"));
    let second = b.add_script(say("About that clue."));
    b.topic(Topic::new("first", "First", first))
        .topic(Topic::new("second", "Second", second).unlocked_by("clue"));
    let mut enc = b.build().unwrap();
    let mut state = SceneState::new();

    enc.begin(&mut state);
    open_topics(&mut enc, &mut state);
    assert_eq!(enc.menu_labels(), ["First", "Back"]);
    enc.select_menu_entry(0).unwrap();
    run_until(&mut enc, &mut state, |e| e.mode() == Mode::ScriptRunning);
    run_until(&mut enc, &mut state, |e| e.mode() == Mode::Menu);

    assert_eq!(enc.menu_labels(), ["First", "Second", "Back"]);
    let buttons = enc.menu_buttons().unwrap().buttons();
    assert!(!buttons[0].badge);
    assert!(buttons[1].badge);
}

#[test]
fn test_initial_script_skips_actor_entrance_once() {
    let mut b = EncounterBuilder::new(EncounterConfig::default());
    let intro = b.add_script(say("You again?"));
    b.initial_script(intro, Some("intro_seen"));
    let mut enc = b.build().unwrap();
    let mut state = SceneState::new();

    enc.begin(&mut state);
    assert_eq!(enc.mode(), Mode::ScriptRunning);
    assert!(enc.rig().left_entrance().is_finished());
    assert_eq!(enc.rig().left_actor_offset(), 0.0);

    run_until(&mut enc, &mut state, |e| e.mode() == Mode::Menu);
    assert!(state.has_flag("intro_seen"));
    assert_eq!(enc.menu_kind(), Some(MenuKind::Main));

    enc.begin(&mut state);
    assert_eq!(enc.mode(), Mode::Menu);
    assert!(!enc.rig().left_entrance().is_finished());
}

#[test]
fn test_end_request_closes_after_panel_exit() {
    let mut b = EncounterBuilder::new(EncounterConfig::default());
    let leave = b.add_script(LineScript::new(0).request(ScriptRequest::EndEncounter));
    b.initial_script(leave, None);
    let mut enc = b.build().unwrap();
    let mut state = SceneState::new();

    enc.begin(&mut state);
    enc.update(16, &mut state);
    assert_eq!(enc.mode(), Mode::Closing);
    assert!(!enc.is_finished());
    assert!(!enc.select_menu_entry(0).unwrap());

    run_until(&mut enc, &mut state, |e| e.is_finished());
    assert!(enc.rig().panel_exit().is_finished());
}

#[test]
fn test_bad_inputs() {
    let (mut enc, _) = evidence_encounter();
    let mut state = SceneState::new();
    enc.begin(&mut state);

    assert!(enc.select_menu_entry(7).is_err());
    assert!(!enc.present_evidence("badge").unwrap());
    assert!(!enc.cancel_evidence());

    enc.select_menu_entry(1).unwrap();
    run_until(&mut enc, &mut state, |e| e.mode() == Mode::EvidencePicker);
    assert!(enc.present_evidence("rope").is_err());
}

#[test]
fn test_builder_rejects_inconsistent_content() {
    let mut b = EncounterBuilder::new(EncounterConfig::default());
    let s = b.add_script(say("x"));
    b.topic(Topic::new("dup", "One", s)).topic(Topic::new("dup", "Two", s));
    assert!(b.build().is_err());

    let mut other = EncounterBuilder::new(EncounterConfig::default());
    other.add_script(say("a"));
    let foreign = other.add_script(say("b"));
    let mut b = EncounterBuilder::new(EncounterConfig::default());
    b.add_script(say("only one"));
    b.topic(Topic::new("t", "T", foreign));
    let err = b.build().err().unwrap();
    assert!(err.to_string().contains("topic 't'"));

    let mut b = EncounterBuilder::new(EncounterConfig::default());
    let s = b.add_script(say("x"));
    b.evidence_script("badge", s).evidence_script("badge", s);
    assert!(b.build().is_err());
}

#[test]
#[should_panic(expected = "before begin")]
fn test_update_before_begin_panics() {
    let mut enc = EncounterBuilder::new(EncounterConfig::default()).build().unwrap();
    enc.update(16, &mut SceneState::new());
}

fn arb_topic() -> impl Strategy<Value = Topic> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(enabled, completed, hide, partner)| {
            let mut b = EncounterBuilder::new(EncounterConfig::default());
            let script = b.add_script(LineScript::new(0));
            let mut topic = Topic::new("t", "T", script);
            topic.enabled = enabled;
            topic.completed = completed;
            topic.hide_when_completed = hide;
            if partner {
                topic = topic.requires_partner("gumshoe");
            }
            topic
        },
    )
}

proptest! {
    #[test]
    fn compacted_indices_round_trip(topics in proptest::collection::vec(arb_topic(), 0..16)) {
        let visible = visible_indices(&topics);
        for (k, &full) in visible.iter().enumerate() {
            prop_assert_eq!(resolve_compacted_index(&topics, k).unwrap(), full);
        }
        prop_assert!(resolve_compacted_index(&topics, visible.len()).is_err());
    }
}
