use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::effects::{Effect, EffectSink, VoiceHandle};

/// Mutable state shared by every script in a scene.
///
/// Also the scene's [`EffectSink`]: effects are queued here and the host
/// drains them once per frame.
#[derive(Debug, Default)]
pub struct SceneState {
    pub flags: FxHashSet<String>,
    /// Character currently accompanying the player, if any.
    pub partner: Option<String>,
    pub event_queue: VecDeque<Effect>,
    playing_voices: FxHashSet<VoiceHandle>,
    next_voice: u64,
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partner(mut self, partner: impl Into<String>) -> Self {
        self.partner = Some(partner.into());
        self
    }

    pub fn set_flag(&mut self, flag: impl Into<String>) {
        self.flags.insert(flag.into());
    }

    pub fn clear_flag(&mut self, flag: &str) -> bool {
        self.flags.remove(flag)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn push(&mut self, effect: Effect) {
        self.event_queue.push_back(effect);
    }

    pub fn pop(&mut self) -> Option<Effect> {
        self.event_queue.pop_front()
    }

    pub fn drain(&mut self) -> Vec<Effect> {
        self.event_queue.drain(..).collect()
    }

    /// Called by the host when the audio backend reports a voice clip ended.
    pub fn finish_voice(&mut self, handle: VoiceHandle) {
        if self.playing_voices.remove(&handle) {
            log::trace!("voice {:?} finished", handle);
        }
    }

    pub fn playing_voice_count(&self) -> usize {
        self.playing_voices.len()
    }
}

impl EffectSink for SceneState {
    fn emit(&mut self, effect: Effect) {
        if let Effect::StopVoice(handle) = effect {
            self.playing_voices.remove(&handle);
        }
        self.push(effect);
    }

    fn play_voice(&mut self, id: &str) -> VoiceHandle {
        self.next_voice += 1;
        let handle = VoiceHandle(self.next_voice);
        self.playing_voices.insert(handle);
        self.push(Effect::PlayVoice { id: id.to_string(), handle });
        handle
    }

    fn is_voice_playing(&self, handle: VoiceHandle) -> bool {
        self.playing_voices.contains(&handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_clip_gets_distinct_handles() {
        let mut state = SceneState::new();
        let a = state.play_voice("objection");
        let b = state.play_voice("objection");
        assert_ne!(a, b);

        state.stop_voice(a);
        assert!(!state.is_voice_playing(a));
        assert!(state.is_voice_playing(b));

        state.finish_voice(b);
        assert_eq!(state.playing_voice_count(), 0);
        assert_eq!(state.drain().len(), 3);
    }
}
