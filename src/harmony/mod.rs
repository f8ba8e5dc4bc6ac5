// Harmony module
// Chord classification, key detection, and function resolution

pub mod chord;
pub mod classifier;
pub mod function;
pub mod key;

pub use chord::{pitch_class_name, ChordLabel, Quality, Tension, NOTE_NAMES};
pub use classifier::classify;
pub use function::{FunctionResolver, ScaleDegreeResolver};
pub use key::{Key, KeyAnalyzer, Mode, ProfileKeyAnalyzer};
