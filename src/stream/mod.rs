// Event stream module
// Delta-time decoding and absolute-tick merge of multi-track files

pub mod builder;
pub mod types;

pub use builder::{from_bytes, from_smf, StreamError};
pub use types::{EventStream, NoteEvent, NoteKind, StreamEvent};
