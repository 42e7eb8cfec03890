use casefile_markup::{
    ColorMarker, ColorMode, ColorOp, EventDescriptor, EventKind, MarkupError, ParseOptions, ParsedText,
};
use casefile_ui::{Color, Rect, Vec2};

use crate::config::DialogueConfig;
use crate::dialogue::timeline::EventTimeline;
use crate::effects::{DamageTarget, Effect, EffectSink, VoiceHandle};

/// A finished or in-progress run of same-coloured revealed characters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSpan {
    pub mode: ColorMode,
    pub color: Color,
    /// Char range `start..end` into the display text.
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default)]
struct Pacing {
    elapsed_ms: u32,
    ms_per_char: u32,
    pause_ms: u32,
    audio_pause_ms: u32,
}

impl Pacing {
    fn new(ms_per_char: u32) -> Self {
        Self {
            ms_per_char: ms_per_char.max(1),
            ..Self::default()
        }
    }

    fn is_paused(&self) -> bool {
        self.pause_ms > 0 || self.audio_pause_ms > 0
    }
}

#[derive(Debug, Clone, Copy)]
struct VoiceTrack {
    handle: VoiceHandle,
    paused: bool,
}

#[derive(Debug, Clone, Default)]
struct ColorState {
    stack: Vec<ColorMode>,
    spans: Vec<ColorSpan>,
    open_start: usize,
    next_marker: usize,
}

/// One dialogue unit revealed character by character.
///
/// Call [`begin`](Self::begin) once, then [`update`](Self::update) every
/// frame until [`is_finished`](Self::is_finished). Events embedded in the
/// text fire as the reveal cursor passes them; their effects go to the
/// [`EffectSink`] handed to each call.
#[derive(Debug, Clone)]
pub struct DialogueBox {
    text: String,
    /// Byte index of every char boundary, `len + 1` entries.
    boundaries: Vec<usize>,
    timeline: EventTimeline,
    markers: Vec<ColorMarker>,
    config: DialogueConfig,
    voice_id: Option<String>,

    started: bool,
    cursor: usize,
    pacing: Pacing,
    colors: ColorState,
    voice: Option<VoiceTrack>,
    voice_playing: bool,
}

impl DialogueBox {
    pub fn new(parsed: ParsedText, config: &DialogueConfig) -> Self {
        let ParsedText { text, events, colors } = parsed;
        let boundaries = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        Self {
            text,
            boundaries,
            timeline: EventTimeline::new(events),
            markers: colors,
            config: config.clone(),
            voice_id: None,
            started: false,
            cursor: 0,
            pacing: Pacing::new(config.ms_per_char),
            colors: ColorState::default(),
            voice: None,
            voice_playing: false,
        }
    }

    pub fn from_markup(raw: &str, config: &DialogueConfig) -> Result<Self, MarkupError> {
        let options = ParseOptions { auto_aside: config.auto_aside };
        Ok(Self::new(casefile_markup::parse_with(raw, &options)?, config))
    }

    /// Ties a voice clip to this unit. The box is not finished until that
    /// playback has ended too.
    pub fn with_voice(mut self, id: impl Into<String>) -> Self {
        self.voice_id = Some(id.into());
        self
    }

    pub fn begin(&mut self, sink: &mut impl EffectSink) {
        if let Some(track) = self.voice.take() {
            if sink.is_voice_playing(track.handle) {
                sink.stop_voice(track.handle);
            }
        }

        self.started = true;
        self.cursor = 0;
        self.pacing = Pacing::new(self.config.ms_per_char);
        self.colors = ColorState {
            stack: vec![ColorMode::Normal],
            ..ColorState::default()
        };
        self.timeline.begin_playback();

        self.voice_playing = false;
        if let Some(id) = &self.voice_id {
            let handle = sink.play_voice(id);
            self.voice = Some(VoiceTrack { handle, paused: false });
            self.voice_playing = true;
        }

        self.apply_color_markers();
        let voice = self.voice.map(|v| v.handle);
        let pacing = &mut self.pacing;
        self.timeline.advance(0, |event| dispatch(event, pacing, voice, sink));
        self.sync_voice_pause(sink);
        log::debug!("dialogue begins: {} chars, {} events", self.len(), self.timeline.template().len());
    }

    pub fn update(&mut self, delta_ms: u32, sink: &mut impl EffectSink) {
        assert!(self.started, "DialogueBox::update called before begin");
        self.refresh_voice(&*sink);

        if self.pacing.is_paused() {
            self.pacing.pause_ms = self.pacing.pause_ms.saturating_sub(delta_ms);
            self.pacing.audio_pause_ms = self.pacing.audio_pause_ms.saturating_sub(delta_ms);
            self.sync_voice_pause(sink);
            return;
        }

        let len = self.len();
        if self.cursor >= len {
            return;
        }

        self.pacing.elapsed_ms = self.pacing.elapsed_ms.saturating_add(delta_ms);
        let voice = self.voice.map(|v| v.handle);
        while self.cursor < len && self.pacing.elapsed_ms >= self.pacing.ms_per_char {
            self.pacing.elapsed_ms -= self.pacing.ms_per_char;
            self.cursor += 1;
            self.apply_color_markers();

            let pacing = &mut self.pacing;
            self.timeline.advance(self.cursor, |event| dispatch(event, pacing, voice, sink));
            if self.pacing.is_paused() {
                self.pacing.elapsed_ms = 0;
                break;
            }
        }
        if self.cursor >= len {
            self.pacing.elapsed_ms = 0;
        }
        self.sync_voice_pause(sink);
    }

    /// Fast-forwards to the end of the text. Only events that fire on skip
    /// take effect; audio is muted when the dialogue config asks for it.
    pub fn skip(&mut self, sink: &mut impl EffectSink) {
        let mute = self.config.mute_audio_on_skip;
        self.fast_forward(mute, mute, sink);
    }

    /// Completes the unit on the owner's behalf. Remaining events follow the
    /// same rules as [`skip`](Self::skip); the voice track is always stopped.
    pub fn finish(&mut self, sink: &mut impl EffectSink) {
        self.fast_forward(self.config.mute_audio_on_skip, true, sink);
    }

    fn fast_forward(&mut self, mute: bool, stop_voice: bool, sink: &mut impl EffectSink) {
        assert!(self.started, "DialogueBox skipped before begin");
        self.cursor = self.len();
        self.apply_color_markers();
        self.pacing.elapsed_ms = 0;
        self.pacing.pause_ms = 0;
        self.pacing.audio_pause_ms = 0;

        let voice = self.voice.map(|v| v.handle);
        let pacing = &mut self.pacing;
        let fired = self.timeline.fire_remaining(true, |event| {
            if mute && event.kind.plays_audio() {
                log::trace!("muted [{}] on skip", event.kind.tag());
                return;
            }
            dispatch(event, pacing, voice, sink);
        });
        log::debug!("dialogue skipped, {} events fired on the way", fired);

        if stop_voice {
            if let Some(track) = self.voice.take() {
                if sink.is_voice_playing(track.handle) {
                    sink.stop_voice(track.handle);
                }
            }
            self.voice_playing = false;
        } else {
            self.sync_voice_pause(sink);
        }
    }

    /// Text and voice have both concluded and no pause is pending.
    ///
    /// # Panics
    /// When called before [`begin`](Self::begin).
    pub fn is_finished(&self) -> bool {
        assert!(self.started, "DialogueBox::is_finished queried before begin");
        self.cursor >= self.len() && !self.pacing.is_paused() && !self.voice_playing
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_paused(&self) -> bool {
        self.pacing.is_paused()
    }

    pub fn is_text_complete(&self) -> bool {
        self.started && self.cursor >= self.len()
    }

    fn refresh_voice(&mut self, sink: &impl EffectSink) {
        if let Some(track) = self.voice {
            self.voice_playing = sink.is_voice_playing(track.handle);
        }
    }

    fn sync_voice_pause(&mut self, sink: &mut impl EffectSink) {
        let Some(track) = self.voice.as_mut() else { return };
        if !self.voice_playing {
            return;
        }
        let want_paused = self.pacing.audio_pause_ms > 0;
        if want_paused != track.paused {
            track.paused = want_paused;
            if want_paused {
                sink.pause_voice(track.handle);
            } else {
                sink.resume_voice(track.handle);
            }
        }
    }

    fn apply_color_markers(&mut self) {
        let palette = self.config.palette;
        let state = &mut self.colors;
        while let Some(marker) = self.markers.get(state.next_marker) {
            if marker.offset > self.cursor {
                break;
            }
            let top = state.stack.last().copied().unwrap_or_default();
            if marker.offset > state.open_start {
                state.spans.push(ColorSpan {
                    mode: top,
                    color: palette.color(top),
                    start: state.open_start,
                    end: marker.offset,
                });
            }
            state.open_start = marker.offset;
            match marker.op {
                ColorOp::Push(mode) => state.stack.push(mode),
                ColorOp::Pop => {
                    if state.stack.len() > 1 {
                        state.stack.pop();
                    }
                }
            }
            state.next_marker += 1;
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the display text in chars.
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn revealed_text(&self) -> &str {
        &self.text[..self.boundaries[self.cursor]]
    }

    /// Colour runs covering exactly the revealed prefix.
    pub fn color_spans(&self) -> Vec<ColorSpan> {
        let mut spans = self.colors.spans.clone();
        if self.cursor > self.colors.open_start {
            let top = self.colors.stack.last().copied().unwrap_or_default();
            spans.push(ColorSpan {
                mode: top,
                color: self.config.palette.color(top),
                start: self.colors.open_start,
                end: self.cursor,
            });
        }
        spans
    }

    pub fn ms_per_char(&self) -> u32 {
        self.pacing.ms_per_char
    }

    pub fn pause_remaining(&self) -> u32 {
        self.pacing.pause_ms
    }

    pub fn audio_pause_remaining(&self) -> u32 {
        self.pacing.audio_pause_ms
    }

    pub fn voice(&self) -> Option<VoiceHandle> {
        self.voice.map(|v| v.handle)
    }

    pub fn timeline(&self) -> &EventTimeline {
        &self.timeline
    }

    /// Inner rectangle glyphs are laid out in.
    pub fn content_rect(&self) -> Rect {
        self.config.text_area.shrink(self.config.padding)
    }

    /// Where a presented evidence icon is drawn.
    pub fn evidence_point(&self) -> Vec2 {
        self.config.text_area.anchor_point(self.config.evidence_anchor)
    }
}

fn dispatch(
    event: &EventDescriptor,
    pacing: &mut Pacing,
    voice: Option<VoiceHandle>,
    sink: &mut impl EffectSink,
) {
    log::trace!("[{}] at {} (voice {:?})", event.kind.tag(), event.offset, voice);
    match &event.kind {
        EventKind::SpeedChange { ms_per_char } => pacing.ms_per_char = (*ms_per_char).max(1),
        EventKind::Pause { ms } => pacing.pause_ms = pacing.pause_ms.saturating_add(*ms),
        EventKind::AudioPause { ms } => {
            pacing.pause_ms = pacing.pause_ms.saturating_add(*ms);
            pacing.audio_pause_ms = pacing.audio_pause_ms.saturating_add(*ms);
        }
        EventKind::SpeakerEmotion(id) => sink.emit(Effect::SpeakerEmotion(id.clone())),
        EventKind::OtherEmotion(id) => sink.emit(Effect::OtherEmotion(id.clone())),
        EventKind::MouthOpen => sink.emit(Effect::Mouth { open: true }),
        EventKind::MouthClose => sink.emit(Effect::Mouth { open: false }),
        EventKind::PlaySound(id) => sink.emit(Effect::PlaySound(id.clone())),
        EventKind::Shake => sink.emit(Effect::Shake),
        EventKind::ScreenShake { intensity } => sink.emit(Effect::ScreenShake { intensity: *intensity }),
        EventKind::AdvanceFrame => sink.emit(Effect::AdvanceFrame),
        EventKind::PlayerDamaged => sink.emit(Effect::Damage(DamageTarget::Player)),
        EventKind::OpponentDamaged => sink.emit(Effect::Damage(DamageTarget::Opponent)),
        EventKind::PlayBgm { id, permanent } => sink.emit(Effect::PlayBgm {
            id: id.clone(),
            permanent: *permanent,
        }),
        EventKind::StopBgm { instant, permanent } => sink.emit(Effect::StopBgm {
            instant: *instant,
            permanent: *permanent,
        }),
        EventKind::ZoomBegin => sink.emit(Effect::Zoom { active: true }),
        EventKind::ZoomEnd => sink.emit(Effect::Zoom { active: false }),
        EventKind::BreakdownBegin => sink.emit(Effect::Breakdown { active: true }),
        EventKind::BreakdownEnd => sink.emit(Effect::Breakdown { active: false }),
    }
}
