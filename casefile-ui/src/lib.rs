//! Presentation primitives shared by the dialogue box and the encounter
//! controller: geometry, colours, easing curves and the two list widgets.

pub mod easing;
pub mod types;
pub mod widgets;

pub use easing::{Easing, EasingKind};
pub use types::{Color, Rect, Vec2};
