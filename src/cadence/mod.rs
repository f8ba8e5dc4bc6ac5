// Cadence module
// Run compression, cadence detection, and root-motion scanning

pub mod detector;
pub mod root_motion;
pub mod runs;

pub use detector::{
    find_cadences, is_dominant, is_tonic, split_by_strength, Cadence, CadenceStrength,
};
pub use root_motion::{find_fifth_resolutions, FifthResolution};
pub use runs::{compress_runs, FunctionSample, HarmonicEvent};
