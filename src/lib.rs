// Clausula - Harmonic timeline analysis and cadence-directed MIDI surgery
// Module declarations

pub mod cadence;
pub mod harmony;
pub mod pipeline;
pub mod report;
pub mod roll;
pub mod stream;
pub mod surgery;
pub mod timeline;
