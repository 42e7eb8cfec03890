pub mod controller;
pub mod evidence;
pub mod rig;
pub mod script;
pub mod topic;

pub use controller::{Encounter, EncounterBuilder, MenuKind, Mode};
pub use evidence::{EvidenceCatalog, ProfileSet};
pub use rig::EntranceRig;
pub use script::{LineScript, Script, ScriptId, ScriptRequest, Step};
pub use topic::{Topic, TopicList};
