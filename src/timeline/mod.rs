// Timeline module
// Grid sampling of the sounding pitch set over the event stream

pub mod active;
pub mod sampler;

pub use active::ActiveNoteSet;
pub use sampler::{sample_grid, sample_sixteenths, Snapshot};
