use anyhow::{bail, ensure, Context};
use casefile_ui::widgets::{ButtonArray, ButtonArrayEvent, EvidenceEntry, EvidencePicker, PickerEvent};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::EncounterConfig;
use crate::encounter::evidence::{EvidenceCatalog, ProfileSet};
use crate::encounter::rig::EntranceRig;
use crate::encounter::script::{Script, ScriptId, ScriptRequest};
use crate::encounter::topic::{Topic, TopicList};
use crate::runtime::SceneState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Menu,
    EvidencePicker,
    ScriptRunning,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Main,
    Topics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuEntry {
    Talk,
    Present,
    Back,
    /// Position among the visible topics, not the full list.
    Topic(usize),
}

struct Menu {
    kind: MenuKind,
    entries: Vec<MenuEntry>,
    buttons: ButtonArray,
}

#[derive(Debug, Clone, Copy)]
enum PendingAction {
    ShowNext,
    OpenPicker,
    StartTopic(usize),
}

#[derive(Debug, Clone)]
enum PickerOutcome {
    Present(String),
    Cancel,
}

#[derive(Debug, Clone, Copy)]
struct Running {
    script: ScriptId,
    topic: Option<usize>,
}

/// One interrogation scene: a menu of topics, an evidence picker and the
/// scripts they lead to.
///
/// Driven by [`update`](Self::update) once per frame. Within a tick the
/// entrance/exit curves advance first, then the active widget or script,
/// then any mode change; a new mode shows from the next frame on.
pub struct Encounter {
    config: EncounterConfig,
    topics: TopicList,
    scripts: Vec<Box<dyn Script>>,
    evidence_scripts: FxHashMap<String, ScriptId>,
    wrong_evidence: Option<ScriptId>,
    wrong_profile: Option<ScriptId>,
    initial_script: Option<ScriptId>,
    initial_lock_flag: Option<String>,
    catalog: Box<dyn EvidenceCatalog>,

    mode: Mode,
    menu: Option<Menu>,
    next_menu: Option<Menu>,
    menu_before_script: Option<MenuKind>,
    pending: Option<PendingAction>,
    picker: EvidencePicker,
    picker_outcome: Option<PickerOutcome>,
    running: Option<Running>,
    rig: EntranceRig,
    started: bool,
    finished: bool,
}

impl Encounter {
    pub fn builder(config: EncounterConfig) -> EncounterBuilder {
        EncounterBuilder::new(config)
    }

    pub fn begin(&mut self, state: &mut SceneState) {
        self.started = true;
        self.finished = false;
        self.menu = None;
        self.next_menu = None;
        self.menu_before_script = None;
        self.pending = None;
        self.picker_outcome = None;
        self.running = None;
        self.picker.reset();
        self.rig.reset();

        self.topics.unprime();
        self.topics.refresh(state);

        let auto = self.initial_script.filter(|_| !self.initial_locked(state));
        self.rig.begin_entrance(auto.is_none());
        match auto {
            Some(script) => {
                log::info!("encounter begins with {}", script);
                self.start_script(script, None, state);
            }
            None => {
                log::info!("encounter begins at the main menu");
                self.show_menu(MenuKind::Main);
            }
        }
    }

    fn initial_locked(&self, state: &SceneState) -> bool {
        self.initial_lock_flag.as_deref().is_some_and(|flag| state.has_flag(flag))
    }

    pub fn update(&mut self, delta_ms: u32, state: &mut SceneState) {
        assert!(self.started, "Encounter::update called before begin");
        if self.finished {
            return;
        }

        self.rig.update(delta_ms);
        match self.mode {
            Mode::Menu => self.update_menu(delta_ms, state),
            Mode::EvidencePicker => self.update_picker(delta_ms, state),
            Mode::ScriptRunning => self.update_script(delta_ms, state),
            Mode::Closing => {
                if let Some(menu) = self.menu.as_mut() {
                    menu.buttons.update(delta_ms);
                }
                self.picker.update(delta_ms);
                if self.rig.is_exit_finished() {
                    log::info!("encounter finished");
                    self.finished = true;
                }
            }
        }
    }

    fn update_menu(&mut self, delta_ms: u32, state: &mut SceneState) {
        let Some(menu) = self.menu.as_mut() else { return };
        menu.buttons.update(delta_ms);

        let kind = menu.kind;
        let mut closed = false;
        for event in menu.buttons.drain_events() {
            match event {
                ButtonArrayEvent::Clicked(k) => {
                    let entry = self.menu.as_ref().and_then(|m| m.entries.get(k).copied());
                    if let Some(entry) = entry {
                        self.on_menu_click(kind, k, entry);
                    }
                }
                ButtonArrayEvent::Closed => closed = true,
            }
        }
        if closed {
            self.apply_pending(kind, state);
        }
    }

    fn on_menu_click(&mut self, kind: MenuKind, k: usize, entry: MenuEntry) {
        let action = match entry {
            MenuEntry::Talk => {
                self.next_menu = Some(self.build_menu(MenuKind::Topics));
                PendingAction::ShowNext
            }
            MenuEntry::Back => {
                self.next_menu = Some(self.build_menu(MenuKind::Main));
                PendingAction::ShowNext
            }
            MenuEntry::Present => PendingAction::OpenPicker,
            MenuEntry::Topic(compacted) => match self.topics.resolve(compacted) {
                Ok(index) => PendingAction::StartTopic(index),
                Err(err) => {
                    log::error!("{:#}", err);
                    return;
                }
            },
        };
        log::debug!("{:?} menu entry {} clicked: {:?}", kind, k, action);
        self.pending = Some(action);
        if let Some(menu) = self.menu.as_mut() {
            menu.buttons.begin_close(Some(k));
        }
    }

    fn apply_pending(&mut self, kind: MenuKind, state: &mut SceneState) {
        self.menu = None;
        match self.pending.take() {
            Some(PendingAction::ShowNext) => match self.next_menu.take() {
                Some(mut next) => {
                    next.buttons.show();
                    self.menu = Some(next);
                }
                None => self.show_menu(MenuKind::Main),
            },
            Some(PendingAction::OpenPicker) => {
                self.menu_before_script = Some(kind);
                self.enter_picker();
            }
            Some(PendingAction::StartTopic(index)) => {
                self.menu_before_script = Some(kind);
                self.topics.mark_started(index);
                match self.topics.get(index).map(|t| t.script) {
                    Some(script) => self.start_script(script, Some(index), state),
                    None => self.show_menu(kind),
                }
            }
            None => self.show_menu(kind),
        }
    }

    fn build_menu(&self, kind: MenuKind) -> Menu {
        let labels = &self.config.labels;
        let mut buttons = ButtonArray::new(self.config.menu_area, self.config.menu_layout.clone());
        let mut entries = Vec::new();
        match kind {
            MenuKind::Main => {
                buttons.push(labels.talk.as_str(), false);
                entries.push(MenuEntry::Talk);
                buttons.push(labels.present.as_str(), false);
                entries.push(MenuEntry::Present);
            }
            MenuKind::Topics => {
                for (k, topic) in self.topics.visible().enumerate() {
                    buttons.push(topic.label.as_str(), topic.is_new);
                    entries.push(MenuEntry::Topic(k));
                }
                buttons.push(labels.back.as_str(), false);
                entries.push(MenuEntry::Back);
            }
        }
        Menu { kind, entries, buttons }
    }

    fn show_menu(&mut self, kind: MenuKind) {
        let mut menu = self.build_menu(kind);
        menu.buttons.show();
        log::debug!("showing {:?} menu with {} entries", kind, menu.entries.len());
        self.menu = Some(menu);
        self.mode = Mode::Menu;
    }

    fn restore_menu(&mut self, state: &SceneState) {
        self.topics.refresh(state);
        let kind = match self.menu_before_script.take() {
            Some(MenuKind::Topics) if self.topics.visible_count() > 0 => MenuKind::Topics,
            _ => MenuKind::Main,
        };
        self.show_menu(kind);
    }

    fn enter_picker(&mut self) {
        self.picker.show();
        self.picker_outcome = None;
        self.mode = Mode::EvidencePicker;
        log::debug!("evidence picker opened");
    }

    fn update_picker(&mut self, delta_ms: u32, state: &mut SceneState) {
        self.picker.update(delta_ms);
        let mut closed = false;
        for event in self.picker.drain_events() {
            match event {
                PickerEvent::Presented(id) => {
                    self.picker_outcome = Some(PickerOutcome::Present(id));
                    self.picker.begin_close();
                }
                PickerEvent::Cancelled => {
                    self.picker_outcome = Some(PickerOutcome::Cancel);
                    self.picker.begin_close();
                }
                PickerEvent::Closed => closed = true,
            }
        }
        if !closed {
            return;
        }

        match self.picker_outcome.take() {
            Some(PickerOutcome::Present(id)) => match self.script_for_evidence(&id) {
                Some(script) => {
                    log::info!("evidence '{}' presented, running {}", id, script);
                    self.start_script(script, None, state);
                }
                None => {
                    log::info!("nothing reacts to evidence '{}'", id);
                    self.restore_menu(state);
                }
            },
            Some(PickerOutcome::Cancel) | None => self.restore_menu(state),
        }
    }

    /// The script bound to the item, else the matching wrong-evidence
    /// fallback.
    pub fn script_for_evidence(&self, id: &str) -> Option<ScriptId> {
        self.evidence_scripts.get(id).copied().or_else(|| {
            if self.catalog.is_profile(id) {
                self.wrong_profile
            } else {
                self.wrong_evidence
            }
        })
    }

    fn start_script(&mut self, script: ScriptId, topic: Option<usize>, state: &mut SceneState) {
        let Some(body) = self.scripts.get_mut(script.0) else {
            log::error!("{} is not registered with this encounter", script);
            self.restore_menu(state);
            return;
        };
        body.reset();
        body.begin(state);
        self.running = Some(Running { script, topic });
        self.mode = Mode::ScriptRunning;
        log::debug!("running {} (topic {:?})", script, topic);
    }

    fn update_script(&mut self, delta_ms: u32, state: &mut SceneState) {
        let Some(run) = self.running else {
            self.restore_menu(state);
            return;
        };
        let Some(body) = self.scripts.get_mut(run.script.0) else {
            self.running = None;
            self.restore_menu(state);
            return;
        };

        let request = body.update(delta_ms, state);
        let finished = body.is_finished();
        let early_exit = body.was_early_exit_requested();
        let redirect = body.should_redirect_to_wrong_evidence();

        match request {
            Some(ScriptRequest::PresentEvidence) => {
                log::debug!("{} asks for evidence", run.script);
                self.running = None;
                self.enter_picker();
                return;
            }
            Some(ScriptRequest::EndEncounter) => {
                self.end();
                return;
            }
            None => {}
        }
        if !finished {
            return;
        }

        self.running = None;
        if early_exit {
            log::debug!("{} exited early", run.script);
            self.restore_menu(state);
            return;
        }

        match run.topic {
            Some(index) => self.topics.mark_completed(index),
            None if Some(run.script) == self.initial_script => {
                if let Some(flag) = &self.initial_lock_flag {
                    state.set_flag(flag.clone());
                }
            }
            None => {}
        }

        if redirect {
            let fallback = run
                .topic
                .and_then(|i| self.topics.get(i))
                .and_then(|t| t.wrong_evidence_script)
                .or(self.wrong_evidence)
                .filter(|fallback| *fallback != run.script);
            match fallback {
                Some(fallback) => {
                    log::debug!("{} redirects to {}", run.script, fallback);
                    self.start_script(fallback, None, state);
                    return;
                }
                None => log::debug!("{} asked for a redirect but no fallback exists", run.script),
            }
        }
        self.restore_menu(state);
    }

    /// Starts the exit animation. There is no way back from here.
    pub fn end(&mut self) {
        if self.mode == Mode::Closing {
            return;
        }
        log::info!("encounter closing");
        self.mode = Mode::Closing;
        self.running = None;
        self.pending = None;
        if let Some(menu) = self.menu.as_mut() {
            if menu.buttons.is_visible() && !menu.buttons.is_closing() {
                menu.buttons.begin_close(None);
            }
        }
        if self.picker.is_visible() {
            self.picker.begin_close();
        }
        self.rig.begin_exit();
    }

    /// Clicks entry `k` of the visible menu. `Ok(false)` means the click was
    /// ignored because no menu is taking input right now.
    pub fn select_menu_entry(&mut self, k: usize) -> anyhow::Result<bool> {
        if self.mode != Mode::Menu {
            log::warn!("menu click {} ignored in {:?} mode", k, self.mode);
            return Ok(false);
        }
        let Some(menu) = self.menu.as_mut() else {
            return Ok(false);
        };
        if k >= menu.entries.len() {
            bail!("menu entry {} is out of range ({} shown)", k, menu.entries.len());
        }
        if let MenuEntry::Topic(compacted) = menu.entries[k] {
            self.topics
                .resolve(compacted)
                .with_context(|| format!("resolving topic menu entry {}", k))?;
        }
        let accepted = menu.buttons.click(k);
        if !accepted {
            log::warn!("menu click {} ignored while animating", k);
        }
        Ok(accepted)
    }

    pub fn present_evidence(&mut self, id: &str) -> anyhow::Result<bool> {
        if self.mode != Mode::EvidencePicker {
            log::warn!("evidence '{}' ignored in {:?} mode", id, self.mode);
            return Ok(false);
        }
        ensure!(self.picker.contains(id), "evidence '{}' is not in the court record", id);
        Ok(self.picker.present(id))
    }

    pub fn cancel_evidence(&mut self) -> bool {
        self.mode == Mode::EvidencePicker && self.picker.cancel()
    }

    /// Fast-forwards whatever the running script is showing.
    pub fn skip(&mut self, state: &mut SceneState) {
        if let (Mode::ScriptRunning, Some(run)) = (self.mode, self.running) {
            if let Some(body) = self.scripts.get_mut(run.script.0) {
                body.skip(state);
            }
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn menu_kind(&self) -> Option<MenuKind> {
        self.menu.as_ref().map(|m| m.kind)
    }

    pub fn menu_buttons(&self) -> Option<&ButtonArray> {
        self.menu.as_ref().map(|m| &m.buttons)
    }

    pub fn menu_labels(&self) -> Vec<&str> {
        self.menu_buttons()
            .map(|b| b.buttons().iter().map(|button| button.label.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn is_menu_ready(&self) -> bool {
        self.mode == Mode::Menu && self.menu_buttons().is_some_and(|b| b.is_accepting_input())
    }

    pub fn picker(&self) -> &EvidencePicker {
        &self.picker
    }

    pub fn rig(&self) -> &EntranceRig {
        &self.rig
    }

    pub fn topics(&self) -> &[Topic] {
        self.topics.as_slice()
    }

    pub fn running_script(&self) -> Option<ScriptId> {
        self.running.map(|r| r.script)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// # Panics
    /// When the encounter was never begun.
    pub fn is_finished(&self) -> bool {
        assert!(self.started, "Encounter::is_finished queried before begin");
        self.finished
    }
}

/// Assembles an [`Encounter`] from content and checks it for dangling
/// references.
pub struct EncounterBuilder {
    config: EncounterConfig,
    scripts: Vec<Box<dyn Script>>,
    topics: Vec<Topic>,
    evidence: Vec<EvidenceEntry>,
    evidence_scripts: Vec<(String, ScriptId)>,
    wrong_evidence: Option<ScriptId>,
    wrong_profile: Option<ScriptId>,
    initial_script: Option<ScriptId>,
    initial_lock_flag: Option<String>,
    catalog: Option<Box<dyn EvidenceCatalog>>,
}

impl EncounterBuilder {
    pub fn new(config: EncounterConfig) -> Self {
        Self {
            config,
            scripts: Vec::new(),
            topics: Vec::new(),
            evidence: Vec::new(),
            evidence_scripts: Vec::new(),
            wrong_evidence: None,
            wrong_profile: None,
            initial_script: None,
            initial_lock_flag: None,
            catalog: None,
        }
    }

    pub fn add_script(&mut self, script: impl Script + 'static) -> ScriptId {
        self.scripts.push(Box::new(script));
        ScriptId(self.scripts.len() - 1)
    }

    pub fn topic(&mut self, topic: Topic) -> &mut Self {
        self.topics.push(topic);
        self
    }

    pub fn evidence(&mut self, entry: EvidenceEntry) -> &mut Self {
        self.evidence.push(entry);
        self
    }

    /// Script played when `id` is presented.
    pub fn evidence_script(&mut self, id: impl Into<String>, script: ScriptId) -> &mut Self {
        self.evidence_scripts.push((id.into(), script));
        self
    }

    pub fn wrong_evidence_script(&mut self, script: ScriptId) -> &mut Self {
        self.wrong_evidence = Some(script);
        self
    }

    pub fn wrong_profile_script(&mut self, script: ScriptId) -> &mut Self {
        self.wrong_profile = Some(script);
        self
    }

    /// Runs `script` on entry until it has completed once. Completion sets
    /// `lock_flag`, which keeps it from auto-running again.
    pub fn initial_script(&mut self, script: ScriptId, lock_flag: Option<&str>) -> &mut Self {
        self.initial_script = Some(script);
        self.initial_lock_flag = lock_flag.map(str::to_string);
        self
    }

    pub fn catalog(&mut self, catalog: impl EvidenceCatalog + 'static) -> &mut Self {
        self.catalog = Some(Box::new(catalog));
        self
    }

    fn check(&self, script: ScriptId, what: &str) -> anyhow::Result<()> {
        ensure!(
            script.0 < self.scripts.len(),
            "{} refers to {}, but only {} scripts are registered",
            what,
            script,
            self.scripts.len()
        );
        Ok(())
    }

    pub fn build(self) -> anyhow::Result<Encounter> {
        let mut topic_ids = FxHashSet::default();
        for topic in &self.topics {
            ensure!(!topic.id.is_empty(), "topic '{}' has an empty id", topic.label);
            ensure!(topic_ids.insert(topic.id.as_str()), "duplicate topic id '{}'", topic.id);
            self.check(topic.script, &format!("topic '{}'", topic.id))?;
            if let Some(fallback) = topic.wrong_evidence_script {
                self.check(fallback, &format!("wrong-evidence fallback of topic '{}'", topic.id))?;
            }
        }

        let mut evidence_scripts = FxHashMap::default();
        for (id, script) in &self.evidence_scripts {
            self.check(*script, &format!("evidence '{}'", id))?;
            ensure!(
                evidence_scripts.insert(id.clone(), *script).is_none(),
                "evidence '{}' is bound to more than one script",
                id
            );
        }

        if let Some(script) = self.wrong_evidence {
            self.check(script, "the wrong-evidence script")?;
        }
        if let Some(script) = self.wrong_profile {
            self.check(script, "the wrong-profile script")?;
        }
        if let Some(script) = self.initial_script {
            self.check(script, "the initial script")?;
        }

        let mut picker = EvidencePicker::new(self.config.picker_fade_ms);
        picker.set_entries(self.evidence);

        log::debug!(
            "encounter built: {} topics, {} scripts, {} evidence bindings",
            self.topics.len(),
            self.scripts.len(),
            evidence_scripts.len()
        );

        Ok(Encounter {
            rig: EntranceRig::new(&self.config),
            config: self.config,
            topics: TopicList::new(self.topics),
            scripts: self.scripts,
            evidence_scripts,
            wrong_evidence: self.wrong_evidence,
            wrong_profile: self.wrong_profile,
            initial_script: self.initial_script,
            initial_lock_flag: self.initial_lock_flag,
            catalog: self.catalog.unwrap_or_else(|| Box::new(ProfileSet::new())),
            mode: Mode::Menu,
            menu: None,
            next_menu: None,
            menu_before_script: None,
            pending: None,
            picker,
            picker_outcome: None,
            running: None,
            started: false,
            finished: false,
        })
    }
}
