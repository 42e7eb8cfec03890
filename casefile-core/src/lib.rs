pub mod config;
pub mod dialogue;
pub mod effects;
pub mod encounter;
pub mod runtime;

pub use dialogue::{DialogueBox, EventTimeline};
pub use effects::{Effect, EffectSink, VoiceHandle};
pub use encounter::{Encounter, EncounterBuilder, LineScript, Script, ScriptRequest, Topic};
pub use runtime::SceneState;
