//! Parsed markup: event descriptors and colour markers.
//!
//! Every descriptor carries the char offset in the *stripped* text at which
//! it fires. Descriptors are small plain values so a playback can clone the
//! whole list cheaply.

/// A position-tagged instruction embedded in dialogue text.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDescriptor {
    pub offset: usize,
    pub kind: EventKind,
}

impl EventDescriptor {
    pub fn new(offset: usize, kind: EventKind) -> Self {
        Self { offset, kind }
    }
}

/// Side effect triggered when the reveal cursor reaches an event's offset.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// New reveal speed in milliseconds per character.
    SpeedChange { ms_per_char: u32 },
    SpeakerEmotion(String),
    OtherEmotion(String),
    /// Holds the text for the given number of milliseconds.
    Pause { ms: u32 },
    /// Holds both the text and the voice track.
    AudioPause { ms: u32 },
    MouthOpen,
    MouthClose,
    PlaySound(String),
    Shake,
    ScreenShake { intensity: f32 },
    AdvanceFrame,
    PlayerDamaged,
    OpponentDamaged,
    PlayBgm { id: String, permanent: bool },
    StopBgm { instant: bool, permanent: bool },
    ZoomBegin,
    ZoomEnd,
    BreakdownBegin,
    BreakdownEnd,
}

impl EventKind {
    /// Whether the event still takes effect when the reader fast-forwards
    /// past it. Purely cosmetic mid-read effects are dropped on skip.
    pub fn fires_on_skip(&self) -> bool {
        match self {
            Self::SpeedChange { .. }
            | Self::Pause { .. }
            | Self::AudioPause { .. }
            | Self::MouthOpen
            | Self::MouthClose
            | Self::Shake
            | Self::ScreenShake { .. } => false,
            Self::SpeakerEmotion(_)
            | Self::OtherEmotion(_)
            | Self::PlaySound(_)
            | Self::AdvanceFrame
            | Self::PlayerDamaged
            | Self::OpponentDamaged
            | Self::PlayBgm { .. }
            | Self::StopBgm { .. }
            | Self::ZoomBegin
            | Self::ZoomEnd
            | Self::BreakdownBegin
            | Self::BreakdownEnd => true,
        }
    }

    /// One-shot audio cues; muted when skipping with the mute policy on.
    pub fn plays_audio(&self) -> bool {
        matches!(self, Self::PlaySound(_))
    }

    /// The tag name this kind is written as.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::SpeedChange { .. } => "SPEED",
            Self::SpeakerEmotion(_) => "EMOTION",
            Self::OtherEmotion(_) => "OTHER_EMOTION",
            Self::Pause { .. } => "PAUSE",
            Self::AudioPause { .. } => "AUDIO_PAUSE",
            Self::MouthOpen => "MOUTH_OPEN",
            Self::MouthClose => "MOUTH_CLOSE",
            Self::PlaySound(_) => "SOUND",
            Self::Shake => "SHAKE",
            Self::ScreenShake { .. } => "SCREEN_SHAKE",
            Self::AdvanceFrame => "NEXT_FRAME",
            Self::PlayerDamaged => "PLAYER_DAMAGED",
            Self::OpponentDamaged => "OPPONENT_DAMAGED",
            Self::PlayBgm { .. } => "BGM",
            Self::StopBgm { .. } => "STOP_BGM",
            Self::ZoomBegin => "ZOOM",
            Self::ZoomEnd => "END_ZOOM",
            Self::BreakdownBegin => "BREAKDOWN",
            Self::BreakdownEnd => "END_BREAKDOWN",
        }
    }
}

/// Text colour class. `Normal` is always at the bottom of the mode stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    #[default]
    Normal,
    /// Thoughts and asides, usually parenthesised.
    Aside,
    Emphasis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorOp {
    Push(ColorMode),
    Pop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorMarker {
    pub offset: usize,
    pub op: ColorOp,
}

/// Result of parsing one dialogue unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedText {
    /// Display text with all tags removed.
    pub text: String,
    /// Events in non-decreasing offset order.
    pub events: Vec<EventDescriptor>,
    /// Colour push/pop markers in non-decreasing offset order.
    pub colors: Vec<ColorMarker>,
}

impl ParsedText {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
