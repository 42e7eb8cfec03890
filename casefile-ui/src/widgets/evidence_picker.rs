use std::collections::VecDeque;

use crate::easing::{Easing, EasingKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceEntry {
    pub id: String,
    pub name: String,
}

impl EvidenceEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
    Presented(String),
    Cancelled,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Hidden,
    Open,
    Closing,
    Closed,
}

/// Grid of evidence items the player can present.
#[derive(Debug, Clone)]
pub struct EvidencePicker {
    entries: Vec<EvidenceEntry>,
    selected: usize,
    fade: Easing,
    fade_ms: u32,
    phase: Phase,
    decided: bool,
    outbox: VecDeque<PickerEvent>,
}

impl EvidencePicker {
    pub fn new(fade_ms: u32) -> Self {
        Self {
            entries: Vec::new(),
            selected: 0,
            fade: Easing::new(EasingKind::Linear, 0.0, 1.0, fade_ms),
            fade_ms,
            phase: Phase::Hidden,
            decided: false,
            outbox: VecDeque::new(),
        }
    }

    pub fn set_entries(&mut self, entries: Vec<EvidenceEntry>) {
        self.entries = entries;
        self.selected = 0;
    }

    pub fn entries(&self) -> &[EvidenceEntry] {
        &self.entries
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn show(&mut self) {
        self.fade = Easing::new(EasingKind::Linear, self.fade.value(), 1.0, self.fade_ms);
        self.fade.begin();
        self.phase = Phase::Open;
        self.decided = false;
        self.outbox.clear();
    }

    /// Hides the picker instantly, dropping any queued events.
    pub fn reset(&mut self) {
        self.fade = Easing::new(EasingKind::Linear, 0.0, 1.0, self.fade_ms);
        self.phase = Phase::Hidden;
        self.decided = false;
        self.outbox.clear();
    }

    pub fn begin_close(&mut self) {
        self.fade = Easing::new(EasingKind::Linear, self.fade.value(), 0.0, self.fade_ms);
        self.fade.begin();
        self.phase = Phase::Closing;
        self.settle();
    }

    pub fn update(&mut self, delta_ms: u32) {
        self.fade.update(delta_ms);
        self.settle();
    }

    fn settle(&mut self) {
        if self.phase == Phase::Closing && self.fade.is_finished() {
            self.phase = Phase::Closed;
            self.outbox.push_back(PickerEvent::Closed);
        }
    }

    /// Moves the highlight; returns `false` for an out-of-range index.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.selected = index;
        true
    }

    pub fn selected_entry(&self) -> Option<&EvidenceEntry> {
        self.entries.get(self.selected)
    }

    pub fn present(&mut self, id: &str) -> bool {
        if !self.is_accepting_input() || !self.contains(id) {
            return false;
        }
        self.decided = true;
        self.outbox.push_back(PickerEvent::Presented(id.to_string()));
        true
    }

    pub fn present_selected(&mut self) -> bool {
        match self.selected_entry().map(|e| e.id.clone()) {
            Some(id) => self.present(&id),
            None => false,
        }
    }

    pub fn cancel(&mut self) -> bool {
        if !self.is_accepting_input() {
            return false;
        }
        self.decided = true;
        self.outbox.push_back(PickerEvent::Cancelled);
        true
    }

    pub fn is_accepting_input(&self) -> bool {
        self.phase == Phase::Open && !self.decided
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.phase, Phase::Open | Phase::Closing)
    }

    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    /// Opacity of the picker overlay.
    pub fn alpha(&self) -> f32 {
        self.fade.value()
    }

    pub fn drain_events(&mut self) -> Vec<PickerEvent> {
        self.outbox.drain(..).collect()
    }
}
