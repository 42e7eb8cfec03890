use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::easing::{Easing, EasingKind};
use crate::Rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonArrayEvent {
    Clicked(usize),
    Closed,
}

/// Geometry and timing of a vertical button list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonLayout {
    pub button_height: f32,
    pub spacing: f32,
    /// Horizontal distance a button travels when sliding in or out.
    pub slide_distance: f32,
    pub slide_ms: u32,
    /// Delay between consecutive buttons starting their slide.
    pub stagger_ms: u32,
    /// Extra time the clicked button lingers before leaving.
    pub clicked_hold_ms: u32,
}

impl Default for ButtonLayout {
    fn default() -> Self {
        Self {
            button_height: 64.0,
            spacing: 12.0,
            slide_distance: 480.0,
            slide_ms: 250,
            stagger_ms: 50,
            clicked_hold_ms: 150,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuButton {
    pub label: String,
    /// Draws a "new" marker next to the label.
    pub badge: bool,
    slide: Easing,
}

impl MenuButton {
    pub fn offset(&self) -> f32 {
        self.slide.value()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Hidden,
    Opening,
    Open,
    Closing,
    Closed,
}

/// A vertical list of buttons that slides in staggered and slides out with
/// the clicked entry leaving last.
///
/// Clicks are queued as [`ButtonArrayEvent`]s and drained by the owner once
/// per tick.
#[derive(Debug, Clone)]
pub struct ButtonArray {
    buttons: Vec<MenuButton>,
    area: Rect,
    layout: ButtonLayout,
    phase: Phase,
    clicked: Option<usize>,
    outbox: VecDeque<ButtonArrayEvent>,
}

impl ButtonArray {
    pub fn new(area: Rect, layout: ButtonLayout) -> Self {
        Self {
            buttons: Vec::new(),
            area,
            layout,
            phase: Phase::Hidden,
            clicked: None,
            outbox: VecDeque::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, badge: bool) {
        let distance = self.layout.slide_distance;
        self.buttons.push(MenuButton {
            label: label.into(),
            badge,
            slide: Easing::new(EasingKind::QuadOut, distance, 0.0, self.layout.slide_ms),
        });
    }

    pub fn with_button(mut self, label: impl Into<String>, badge: bool) -> Self {
        self.push(label, badge);
        self
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub fn buttons(&self) -> &[MenuButton] {
        &self.buttons
    }

    pub fn show(&mut self) {
        let distance = self.layout.slide_distance;
        for (i, button) in self.buttons.iter_mut().enumerate() {
            button.slide = Easing::new(EasingKind::QuadOut, distance, 0.0, self.layout.slide_ms)
                .with_delay(i as u32 * self.layout.stagger_ms);
            button.slide.begin();
        }
        self.clicked = None;
        self.outbox.clear();
        self.phase = Phase::Opening;
        self.settle();
        log::trace!("button array shown with {} entries", self.buttons.len());
    }

    /// Starts the exit animation. Unclicked buttons leave first in list order;
    /// the clicked one (if any) holds briefly and leaves after all the others.
    pub fn begin_close(&mut self, clicked: Option<usize>) {
        let layout = &self.layout;
        let others = self.buttons.len() - usize::from(clicked.is_some_and(|k| k < self.buttons.len()));
        let mut order = 0u32;
        for (i, button) in self.buttons.iter_mut().enumerate() {
            let current = button.slide.value();
            button.slide = if Some(i) == clicked {
                let delay = others as u32 * layout.stagger_ms + layout.clicked_hold_ms;
                Easing::new(EasingKind::SCurve, current, -layout.slide_distance, layout.slide_ms)
                    .with_delay(delay)
            } else {
                let delay = order * layout.stagger_ms;
                order += 1;
                Easing::new(EasingKind::QuadIn, current, layout.slide_distance, layout.slide_ms)
                    .with_delay(delay)
            };
            button.slide.begin();
        }
        self.phase = Phase::Closing;
        self.settle();
    }

    pub fn update(&mut self, delta_ms: u32) {
        for button in &mut self.buttons {
            button.slide.update(delta_ms);
        }
        self.settle();
    }

    fn settle(&mut self) {
        let done = self.buttons.iter().all(|b| b.slide.is_finished());
        match self.phase {
            Phase::Opening if done => self.phase = Phase::Open,
            Phase::Closing if done => {
                self.phase = Phase::Closed;
                self.outbox.push_back(ButtonArrayEvent::Closed);
            }
            _ => {}
        }
    }

    /// Queues a click on entry `index`. Returns `false` when the array is not
    /// taking input (hidden, closing, already clicked) or the index is out of
    /// range.
    pub fn click(&mut self, index: usize) -> bool {
        if !self.is_accepting_input() || index >= self.buttons.len() {
            return false;
        }
        self.clicked = Some(index);
        self.outbox.push_back(ButtonArrayEvent::Clicked(index));
        true
    }

    pub fn clicked(&self) -> Option<usize> {
        self.clicked
    }

    pub fn is_accepting_input(&self) -> bool {
        matches!(self.phase, Phase::Opening | Phase::Open) && self.clicked.is_none()
    }

    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    pub fn is_closing(&self) -> bool {
        self.phase == Phase::Closing
    }

    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.phase, Phase::Opening | Phase::Open | Phase::Closing)
    }

    pub fn button_rect(&self, index: usize) -> Option<Rect> {
        let button = self.buttons.get(index)?;
        let step = self.layout.button_height + self.layout.spacing;
        let (row, _) = self.area
            .translate(0.0, step * index as f32)
            .split_top(self.layout.button_height);
        Some(row.translate(button.offset(), 0.0))
    }

    pub fn drain_events(&mut self) -> Vec<ButtonArrayEvent> {
        self.outbox.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> ButtonArray {
        ButtonArray::new(Rect::new(0.0, 0.0, 400.0, 400.0), ButtonLayout::default())
            .with_button("a", false)
            .with_button("b", false)
            .with_button("c", true)
    }

    #[test]
    fn opens_after_staggered_slides() {
        let mut arr = three();
        arr.show();
        arr.update(250);
        assert!(!arr.is_open());
        arr.update(100);
        assert!(arr.is_open());
        assert_eq!(arr.button_rect(2).unwrap().x, 0.0);
    }

    #[test]
    fn clicked_entry_leaves_last() {
        let mut arr = three();
        arr.show();
        arr.update(1000);
        assert!(arr.click(0));
        assert!(!arr.click(1));
        arr.begin_close(Some(0));
        // the two others need 50ms stagger + 250ms slide
        arr.update(300);
        assert!(arr.buttons()[1].slide.is_finished());
        assert!(arr.buttons()[2].slide.is_finished());
        assert!(!arr.buttons()[0].slide.is_finished());
        assert!(!arr.is_closed());
        arr.update(1000);
        assert!(arr.is_closed());
        assert_eq!(
            arr.drain_events(),
            vec![ButtonArrayEvent::Clicked(0), ButtonArrayEvent::Closed]
        );
    }

    #[test]
    fn rejects_out_of_range_and_hidden_clicks() {
        let mut arr = three();
        assert!(!arr.click(0));
        arr.show();
        assert!(!arr.click(3));
        assert!(arr.click(2));
    }

    #[test]
    fn empty_array_closes_immediately() {
        let mut arr = ButtonArray::new(Rect::default(), ButtonLayout::default());
        arr.show();
        arr.begin_close(None);
        assert!(arr.is_closed());
    }
}
