// Roll module
// Piano-roll JSON interchange

pub mod interchange;

pub use interchange::{RollDocument, RollError, StepResolution};
