pub mod button_array;
pub mod evidence_picker;

pub use button_array::{ButtonArray, ButtonArrayEvent, ButtonLayout, MenuButton};
pub use evidence_picker::{EvidenceEntry, EvidencePicker, PickerEvent};
