use casefile_ui::{Easing, EasingKind};

use crate::config::EncounterConfig;

/// The eight curves that bring an encounter's backdrop, bottom panel and
/// both actors on and off screen.
///
/// Each exit curve starts from wherever its entrance curve currently is, so
/// an encounter closed mid-entrance leaves without a jump.
#[derive(Debug, Clone)]
pub struct EntranceRig {
    background_in: Easing,
    background_out: Easing,
    panel_in: Easing,
    panel_out: Easing,
    left_in: Easing,
    left_out: Easing,
    right_in: Easing,
    right_out: Easing,
}

fn current(entrance: &Easing, exit: &Easing) -> f32 {
    if exit.is_started() { exit.value() } else { entrance.value() }
}

impl EntranceRig {
    pub fn new(config: &EncounterConfig) -> Self {
        let actor = config.actor_offset;
        let slide = config.actor_slide_ms;
        Self {
            background_in: Easing::new(EasingKind::Linear, 0.0, 1.0, config.fade_ms),
            background_out: Easing::new(EasingKind::Linear, 1.0, 0.0, config.fade_ms),
            panel_in: Easing::new(EasingKind::QuadOut, config.panel_offset, 0.0, config.panel_slide_ms),
            panel_out: Easing::new(EasingKind::QuadIn, 0.0, config.panel_offset, config.panel_slide_ms),
            left_in: Easing::new(EasingKind::BackOut, -actor, 0.0, slide).with_delay(config.actor_slide_delay_ms),
            left_out: Easing::new(EasingKind::QuadIn, 0.0, -actor, slide),
            right_in: Easing::new(EasingKind::BackOut, actor, 0.0, slide).with_delay(config.actor_slide_delay_ms),
            right_out: Easing::new(EasingKind::QuadIn, 0.0, actor, slide),
        }
    }

    fn all_mut(&mut self) -> [&mut Easing; 8] {
        [
            &mut self.background_in,
            &mut self.background_out,
            &mut self.panel_in,
            &mut self.panel_out,
            &mut self.left_in,
            &mut self.left_out,
            &mut self.right_in,
            &mut self.right_out,
        ]
    }

    pub fn reset(&mut self) {
        for curve in self.all_mut() {
            curve.reset();
        }
    }

    /// Starts the entrance. With `animate_actors` off the actors snap to
    /// their resting spots.
    pub fn begin_entrance(&mut self, animate_actors: bool) {
        self.background_in.begin();
        self.panel_in.begin();
        if animate_actors {
            self.left_in.begin();
            self.right_in.begin();
        } else {
            self.left_in.complete();
            self.right_in.complete();
        }
    }

    pub fn begin_exit(&mut self) {
        self.background_out.set_from(self.background_in.value());
        self.panel_out.set_from(self.panel_in.value());
        self.left_out.set_from(self.left_in.value());
        self.right_out.set_from(self.right_in.value());
        self.background_out.begin();
        self.panel_out.begin();
        self.left_out.begin();
        self.right_out.begin();
        log::debug!("encounter exit animation started");
    }

    pub fn update(&mut self, delta_ms: u32) {
        for curve in self.all_mut() {
            curve.update(delta_ms);
        }
    }

    pub fn background_alpha(&self) -> f32 {
        current(&self.background_in, &self.background_out)
    }

    pub fn panel_offset(&self) -> f32 {
        current(&self.panel_in, &self.panel_out)
    }

    pub fn left_actor_offset(&self) -> f32 {
        current(&self.left_in, &self.left_out)
    }

    pub fn right_actor_offset(&self) -> f32 {
        current(&self.right_in, &self.right_out)
    }

    pub fn is_entrance_finished(&self) -> bool {
        [&self.background_in, &self.panel_in, &self.left_in, &self.right_in]
            .iter()
            .all(|c| c.is_finished())
    }

    pub fn is_exiting(&self) -> bool {
        self.panel_out.is_started()
    }

    /// The encounter counts as gone once the panel is off screen.
    pub fn is_exit_finished(&self) -> bool {
        self.panel_out.is_finished()
    }

    pub fn left_entrance(&self) -> &Easing {
        &self.left_in
    }

    pub fn right_entrance(&self) -> &Easing {
        &self.right_in
    }

    pub fn panel_exit(&self) -> &Easing {
        &self.panel_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_actor_entrance_snaps_to_rest() {
        let mut rig = EntranceRig::new(&EncounterConfig::default());
        rig.begin_entrance(false);
        assert!(rig.left_entrance().is_finished());
        assert_eq!(rig.left_actor_offset(), 0.0);
        assert_eq!(rig.right_actor_offset(), 0.0);
        assert!(!rig.is_entrance_finished());
    }

    #[test]
    fn exit_continues_from_interrupted_entrance() {
        let config = EncounterConfig { fade_ms: 100, ..EncounterConfig::default() };
        let mut rig = EntranceRig::new(&config);
        rig.begin_entrance(true);
        rig.update(50);
        let alpha = rig.background_alpha();
        assert!(alpha > 0.0 && alpha < 1.0);

        rig.begin_exit();
        assert!((rig.background_alpha() - alpha).abs() < 1e-4);
        rig.update(config.panel_slide_ms);
        assert!(rig.is_exit_finished());
        assert_eq!(rig.background_alpha(), 0.0);
    }
}
