use std::collections::VecDeque;

use casefile_markup::EventDescriptor;

/// Offset-ordered event playback.
///
/// The template list is never consumed. Each playback works on a fresh
/// clone, so a dialogue unit can be replayed any number of times and fire
/// exactly the same events.
#[derive(Debug, Clone, Default)]
pub struct EventTimeline {
    template: Vec<EventDescriptor>,
    working: VecDeque<EventDescriptor>,
    fired: usize,
}

impl EventTimeline {
    pub fn new(mut template: Vec<EventDescriptor>) -> Self {
        // stable: events sharing an offset keep their authored order
        template.sort_by_key(|e| e.offset);
        Self {
            template,
            working: VecDeque::new(),
            fired: 0,
        }
    }

    pub fn template(&self) -> &[EventDescriptor] {
        &self.template
    }

    pub fn begin_playback(&mut self) {
        self.working = self.template.iter().cloned().collect();
        self.fired = 0;
    }

    /// Pops and executes every pending event with `offset <= to_offset`, in
    /// order. Returns how many fired.
    pub fn advance<F>(&mut self, to_offset: usize, mut execute: F) -> usize
    where
        F: FnMut(&EventDescriptor),
    {
        let mut count = 0;
        while self.working.front().is_some_and(|e| e.offset <= to_offset) {
            if let Some(event) = self.working.pop_front() {
                execute(&event);
                count += 1;
            }
        }
        self.fired += count;
        count
    }

    /// Empties the playback. With `only_skippable`, events that should not
    /// fire on a skip are discarded instead of executed.
    pub fn fire_remaining<F>(&mut self, only_skippable: bool, mut execute: F) -> usize
    where
        F: FnMut(&EventDescriptor),
    {
        let mut count = 0;
        for event in self.working.drain(..) {
            if only_skippable && !event.kind.fires_on_skip() {
                log::trace!("dropping [{}] on skip", event.kind.tag());
                continue;
            }
            execute(&event);
            count += 1;
        }
        self.fired += count;
        count
    }

    pub fn next_offset(&self) -> Option<usize> {
        self.working.front().map(|e| e.offset)
    }

    pub fn pending(&self) -> usize {
        self.working.len()
    }

    pub fn fired_count(&self) -> usize {
        self.fired
    }

    pub fn is_exhausted(&self) -> bool {
        self.working.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casefile_markup::EventKind;

    fn timeline() -> EventTimeline {
        EventTimeline::new(vec![
            EventDescriptor::new(4, EventKind::Shake),
            EventDescriptor::new(0, EventKind::SpeakerEmotion("normal".into())),
            EventDescriptor::new(4, EventKind::PlaySound("thud".into())),
            EventDescriptor::new(9, EventKind::Pause { ms: 300 }),
        ])
    }

    #[test]
    fn advance_fires_up_to_offset_in_order() {
        let mut t = timeline();
        t.begin_playback();
        let mut seen = Vec::new();
        assert_eq!(t.advance(3, |e| seen.push(e.kind.tag())), 1);
        assert_eq!(t.advance(4, |e| seen.push(e.kind.tag())), 2);
        assert_eq!(seen, ["EMOTION", "SHAKE", "SOUND"]);
        assert_eq!(t.next_offset(), Some(9));
        assert_eq!(t.fired_count(), 3);
    }

    #[test]
    fn replay_fires_the_same_events() {
        let mut t = timeline();
        for _ in 0..3 {
            t.begin_playback();
            let mut n = 0;
            t.advance(usize::MAX, |_| n += 1);
            assert_eq!(n, 4);
            assert!(t.is_exhausted());
        }
        assert_eq!(t.template().len(), 4);
    }

    #[test]
    fn skip_drops_pacing_events() {
        let mut t = timeline();
        t.begin_playback();
        let mut seen = Vec::new();
        assert_eq!(t.fire_remaining(true, |e| seen.push(e.kind.tag())), 2);
        assert_eq!(seen, ["EMOTION", "SOUND"]);
        assert!(t.is_exhausted());
    }
}
