//! Side effects requested by dialogue and scripts.
//!
//! Dialogue never talks to audio or graphics directly. Everything goes
//! through an [`EffectSink`], which the host drains once per frame.

/// Identifies one playback of a voice clip. Two lines sharing the same clip
/// still get distinct handles, so one line can never stop or query the
/// other's playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageTarget {
    Player,
    Opponent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PlaySound(String),
    SpeakerEmotion(String),
    OtherEmotion(String),
    Mouth { open: bool },
    Shake,
    ScreenShake { intensity: f32 },
    AdvanceFrame,
    Damage(DamageTarget),
    PlayBgm { id: String, permanent: bool },
    StopBgm { instant: bool, permanent: bool },
    Zoom { active: bool },
    Breakdown { active: bool },

    PlayVoice { id: String, handle: VoiceHandle },
    PauseVoice(VoiceHandle),
    ResumeVoice(VoiceHandle),
    StopVoice(VoiceHandle),
}

pub trait EffectSink {
    fn emit(&mut self, effect: Effect);

    /// Starts a voice clip and returns the handle for this playback.
    fn play_voice(&mut self, id: &str) -> VoiceHandle;

    fn is_voice_playing(&self, handle: VoiceHandle) -> bool;

    fn pause_voice(&mut self, handle: VoiceHandle) {
        self.emit(Effect::PauseVoice(handle));
    }

    fn resume_voice(&mut self, handle: VoiceHandle) {
        self.emit(Effect::ResumeVoice(handle));
    }

    fn stop_voice(&mut self, handle: VoiceHandle) {
        self.emit(Effect::StopVoice(handle));
    }
}
