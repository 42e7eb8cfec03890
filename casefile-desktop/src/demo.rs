use anyhow::Result;
use log::{debug, info, warn};

use casefile_core::effects::{Effect, VoiceHandle};
use casefile_core::encounter::topic::is_hidden_from_menu;
use casefile_core::encounter::{Encounter, MenuKind, Mode};
use casefile_core::SceneState;

/// How long a simulated voice clip plays.
const VOICE_MS: u32 = 900;

struct VoiceSim {
    handle: VoiceHandle,
    remaining_ms: u32,
    paused: bool,
}

#[derive(Debug, Default)]
pub struct RunStats {
    pub frames: u32,
    pub effects: usize,
    pub finished: bool,
}

/// Plays an encounter without a window: picks every topic once, presents
/// every piece of evidence once and logs the effects the scene asks for.
pub struct Autopilot {
    evidence: Vec<String>,
    presented: usize,
    tried: Vec<String>,
    skip_dialogue: bool,
    voices: Vec<VoiceSim>,
}

impl Autopilot {
    pub fn new(evidence: Vec<String>, skip_dialogue: bool) -> Self {
        Self {
            evidence,
            presented: 0,
            tried: Vec::new(),
            skip_dialogue,
            voices: Vec::new(),
        }
    }

    pub fn run(
        &mut self,
        enc: &mut Encounter,
        state: &mut SceneState,
        frame_ms: u32,
        max_frames: u32,
    ) -> Result<RunStats> {
        let mut stats = RunStats::default();
        enc.begin(state);

        while stats.frames < max_frames {
            if enc.is_finished() {
                stats.finished = true;
                break;
            }
            if !self.drive(enc, state)? {
                info!("Nothing left to try, leaving the encounter open");
                break;
            }

            enc.update(frame_ms, state);
            for effect in state.drain() {
                stats.effects += 1;
                self.observe(effect);
            }
            self.tick_voices(frame_ms, state);
            stats.frames += 1;
        }

        if !stats.finished && stats.frames >= max_frames {
            warn!("Demo stopped after {} frames", stats.frames);
        }
        Ok(stats)
    }

    /// Feeds input for the current mode. Returns `false` once there is
    /// nothing left to click.
    fn drive(&mut self, enc: &mut Encounter, state: &mut SceneState) -> Result<bool> {
        match enc.mode() {
            Mode::Menu if enc.is_menu_ready() => match enc.menu_kind() {
                Some(MenuKind::Main) => {
                    if next_topic(enc, &self.tried).is_some() {
                        enc.select_menu_entry(0)?;
                    } else if self.presented < self.evidence.len() {
                        enc.select_menu_entry(1)?;
                    } else {
                        return Ok(false);
                    }
                }
                Some(MenuKind::Topics) => {
                    let k = match next_topic(enc, &self.tried) {
                        Some((k, id)) => {
                            info!("Asking about '{}'", id);
                            self.tried.push(id);
                            k
                        }
                        None => enc.menu_labels().len().saturating_sub(1),
                    };
                    debug!("autopilot picks menu entry {}", k);
                    enc.select_menu_entry(k)?;
                }
                None => {}
            },
            Mode::EvidencePicker if enc.picker().is_accepting_input() => {
                match self.evidence.get(self.presented) {
                    Some(id) => {
                        info!("Presenting '{}'", id);
                        self.presented += 1;
                        enc.present_evidence(id)?;
                    }
                    None => {
                        enc.cancel_evidence();
                    }
                }
            }
            Mode::ScriptRunning if self.skip_dialogue => enc.skip(state),
            _ => {}
        }
        Ok(true)
    }

    fn observe(&mut self, effect: Effect) {
        match &effect {
            Effect::PlayVoice { handle, .. } => self.voices.push(VoiceSim {
                handle: *handle,
                remaining_ms: VOICE_MS,
                paused: false,
            }),
            Effect::PauseVoice(handle) | Effect::ResumeVoice(handle) => {
                let paused = matches!(effect, Effect::PauseVoice(_));
                for voice in self.voices.iter_mut().filter(|v| v.handle == *handle) {
                    voice.paused = paused;
                }
            }
            Effect::StopVoice(handle) => self.voices.retain(|v| v.handle != *handle),
            _ => {}
        }
        info!("effect: {:?}", effect);
    }

    fn tick_voices(&mut self, frame_ms: u32, state: &mut SceneState) {
        for voice in self.voices.iter_mut().filter(|v| !v.paused) {
            voice.remaining_ms = voice.remaining_ms.saturating_sub(frame_ms);
            if voice.remaining_ms == 0 {
                state.finish_voice(voice.handle);
            }
        }
        self.voices.retain(|v| v.remaining_ms > 0);
    }
}

/// Menu position and id of the first visible topic not tried yet.
fn next_topic(enc: &Encounter, tried: &[String]) -> Option<(usize, String)> {
    enc.topics()
        .iter()
        .filter(|t| !is_hidden_from_menu(t))
        .enumerate()
        .find(|(_, t)| !t.completed && !tried.contains(&t.id))
        .map(|(k, t)| (k, t.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content;
    use casefile_core::config::{DialogueConfig, EncounterConfig};

    const DEMO: &str = include_str!("../../demos/detention_center.toml");

    fn play(skip: bool) -> (RunStats, SceneState) {
        let file = content::parse(DEMO).unwrap();
        let mut enc = file
            .build(&DialogueConfig::default(), EncounterConfig::default())
            .unwrap();
        let mut state = SceneState::new().with_partner("maya");
        let stats = Autopilot::new(file.evidence_ids(), skip)
            .run(&mut enc, &mut state, 16, 60 * 60 * 10)
            .unwrap();
        (stats, state)
    }

    #[test]
    fn demo_plays_to_the_end() {
        let (stats, state) = play(false);
        assert!(stats.finished);
        assert!(stats.effects > 0);
        assert!(state.has_flag("greeted"));
        assert!(state.has_flag("alibi_broken"));
        assert_eq!(state.playing_voice_count(), 0);
    }

    #[test]
    fn skipping_is_faster() {
        let (slow, _) = play(false);
        let (fast, state) = play(true);
        assert!(fast.finished);
        assert!(fast.frames < slow.frames);
        assert!(state.has_flag("heard_about_night"));
    }
}
