// Surgery module
// Tick-exact stream cutting and final-chord minorization

pub mod cut;
pub mod minorize;

pub use cut::{cut_at_sixteenth, cut_at_tick, SurgeryError};
pub use minorize::minorize_final_dominant;
