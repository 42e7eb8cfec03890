pub mod dialogue_box;
pub mod timeline;

pub use dialogue_box::{ColorSpan, DialogueBox};
pub use timeline::EventTimeline;
