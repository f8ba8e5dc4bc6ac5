// Cadence detection
// Dominant-to-tonic resolutions over a compressed label timeline

use serde::{Deserialize, Serialize};

use super::runs::{compress_runs, FunctionSample};

/// Whether a function label acts as a dominant.
///
/// True for "V" and any extension of it ("V7", "Vsus4"), but not for
/// "VI"/"VII" degrees, which merely start with the same letter.
pub fn is_dominant(label: &str) -> bool {
    let mut chars = label.chars();
    match chars.next() {
        Some('V') => !matches!(chars.next(), Some('I') | Some('i')),
        _ => false,
    }
}

/// Whether a function label acts as a tonic.
///
/// True for "I"/"i" and extensions ("Imaj7", "i7"), but not for the
/// "II"/"ii"/"IV"/"iv" degrees.
pub fn is_tonic(label: &str) -> bool {
    let mut chars = label.chars();
    match chars.next() {
        Some('I') | Some('i') => !matches!(
            chars.next(),
            Some('I') | Some('i') | Some('V') | Some('v')
        ),
        _ => false,
    }
}

/// Strength of a detected cadence, decided by tonic run length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceStrength {
    /// Tonic held for at least 8 subdivisions
    Strong,

    /// Tonic held for 2 to 7 subdivisions
    Regular,
}

/// A dominant-to-tonic resolution landing on a beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    /// Subdivision tick where the tonic run begins
    pub tick: u64,

    /// Strong or regular
    pub strength: CadenceStrength,
}

/// Find all cadences in a sampled function-label timeline.
///
/// The samples are compressed into runs first; each adjacent run pair
/// must pass four gates to register a cadence at the tonic run's start:
/// the previous run is dominant, the current run is tonic, the tonic
/// starts on a beat (`start_tick % 4 == 0`), and the dominant lasted at
/// least 2 subdivisions. The tonic run's own length then grades the
/// cadence: 8 or more is strong, 2 to 7 regular, shorter is discarded.
pub fn find_cadences(samples: &[FunctionSample]) -> Vec<Cadence> {
    let events = compress_runs(samples);
    let mut cadences = Vec::new();

    for i in 1..events.len() {
        let prev = &events[i - 1];
        let curr = &events[i];

        if !is_dominant(&prev.label) || !is_tonic(&curr.label) {
            continue;
        }
        if curr.start_tick % 4 != 0 {
            continue;
        }
        if prev.duration_ticks < 2 {
            continue;
        }

        if curr.duration_ticks >= 8 {
            cadences.push(Cadence {
                tick: curr.start_tick,
                strength: CadenceStrength::Strong,
            });
        } else if curr.duration_ticks >= 2 {
            cadences.push(Cadence {
                tick: curr.start_tick,
                strength: CadenceStrength::Regular,
            });
        }
    }

    cadences
}

/// Split cadences into (strong, regular) tick lists, preserving order
pub fn split_by_strength(cadences: &[Cadence]) -> (Vec<u64>, Vec<u64>) {
    let mut strong = Vec::new();
    let mut regular = Vec::new();
    for cadence in cadences {
        match cadence.strength {
            CadenceStrength::Strong => strong.push(cadence.tick),
            CadenceStrength::Regular => regular.push(cadence.tick),
        }
    }
    (strong, regular)
}
