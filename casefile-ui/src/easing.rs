//! Time-based easing curves.
//!
//! Every animated transition in the game is an [`Easing`]: a value that moves
//! from `from` to `to` over a fixed number of milliseconds, optionally after a
//! start delay. Curves are advanced by the owner's frame tick and never read a
//! clock themselves.

use serde::{Deserialize, Serialize};

const BACK_C1: f32 = 1.701_58;
const BACK_C3: f32 = BACK_C1 + 1.0;

/// The shape of an easing curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EasingKind {
    #[default]
    Linear,
    /// Slow start, fast end.
    QuadIn,
    /// Fast start, slow end.
    QuadOut,
    /// Slow start and end (cubic S-curve).
    SCurve,
    /// Overshoots the target, then settles.
    BackOut,
    /// Bounces against the target a few times.
    BounceOut,
}

impl EasingKind {
    /// Maps normalized time `t` in `[0, 1]` to the curve output.
    ///
    /// Output stays inside `[0, 1]` except for [`EasingKind::BackOut`], which
    /// overshoots past 1 before settling.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadIn => t * t,
            Self::QuadOut => t * (2.0 - t),
            Self::SCurve => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::BackOut => {
                let u = t - 1.0;
                1.0 + BACK_C3 * u.powi(3) + BACK_C1 * u.powi(2)
            }
            Self::BounceOut => bounce_out(t),
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// Stateless curve evaluation with a start delay.
///
/// Returns `0` while `elapsed_ms < delay_ms`, then the eased fraction of
/// `duration_ms`. A zero duration jumps straight to the end value.
pub fn progress(kind: EasingKind, elapsed_ms: u32, delay_ms: u32, duration_ms: u32) -> f32 {
    if elapsed_ms < delay_ms {
        return 0.0;
    }
    if duration_ms == 0 {
        return kind.apply(1.0);
    }
    let t = (elapsed_ms - delay_ms) as f32 / duration_ms as f32;
    kind.apply(t)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Easing {
    kind: EasingKind,
    from: f32,
    to: f32,
    duration_ms: u32,
    delay_ms: u32,
    elapsed_ms: u32,
    started: bool,
    finished: bool,
}

impl Easing {
    pub fn new(kind: EasingKind, from: f32, to: f32, duration_ms: u32) -> Self {
        Self {
            kind,
            from,
            to,
            duration_ms,
            delay_ms: 0,
            elapsed_ms: 0,
            started: false,
            finished: false,
        }
    }

    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn begin(&mut self) {
        self.elapsed_ms = 0;
        self.started = true;
        self.finished = self.total_ms() == 0;
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
        self.started = false;
        self.finished = false;
    }

    /// Jumps straight to the end value, marking the curve started and finished.
    pub fn complete(&mut self) {
        self.started = true;
        self.finished = true;
        self.elapsed_ms = self.total_ms();
    }

    /// Replaces the start value; used when an exit must continue from wherever
    /// an interrupted entrance left off.
    pub fn set_from(&mut self, from: f32) {
        self.from = from;
    }

    pub fn update(&mut self, delta_ms: u32) {
        if !self.started || self.finished {
            return;
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        if self.elapsed_ms >= self.total_ms() {
            self.elapsed_ms = self.total_ms();
            self.finished = true;
        }
    }

    /// Normalized eased output; `0` before the curve has begun.
    pub fn fraction(&self) -> f32 {
        if !self.started {
            return 0.0;
        }
        if self.finished {
            return self.kind.apply(1.0);
        }
        progress(self.kind, self.elapsed_ms, self.delay_ms, self.duration_ms)
    }

    pub fn value(&self) -> f32 {
        self.from + (self.to - self.from) * self.fraction()
    }

    pub fn from(&self) -> f32 {
        self.from
    }

    pub fn to(&self) -> f32 {
        self.to
    }

    pub fn total_ms(&self) -> u32 {
        self.delay_ms.saturating_add(self.duration_ms)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
