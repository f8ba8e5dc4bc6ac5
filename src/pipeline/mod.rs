// Pipeline module
// Per-file analysis orchestration and batch cadence cutting

pub mod analysis;

pub use analysis::{analyze, cut_at_cadences, AnalysisError, MIN_POLYPHONY};
