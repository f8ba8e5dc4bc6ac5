// Key detection
// Pitch-class profile correlation over a sampled timeline

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timeline::Snapshot;

use super::chord::pitch_class_name;

/// Mode of a detected key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Major,
    Minor,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => f.write_str("major"),
            Mode::Minor => f.write_str("minor"),
        }
    }
}

/// A detected key: tonic pitch class and mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Tonic pitch class (0-11)
    pub tonic: u8,

    /// Major or minor
    pub mode: Mode,
}

impl Key {
    pub fn is_minor(&self) -> bool {
        self.mode == Mode::Minor
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", pitch_class_name(self.tonic), self.mode)
    }
}

/// Capability interface for key detection over a sampled timeline.
///
/// Any conforming implementation may be swapped in; the shipped default
/// is the profile-correlation analyzer below.
pub trait KeyAnalyzer {
    /// Detect the overall key of the timeline. `None` when the timeline
    /// holds no sounding pitches at all.
    fn detect_key(&self, timeline: &[Snapshot]) -> Option<Key>;
}

// Krumhansl-Kessler tonal hierarchy profiles, indexed by scale degree
// in semitones above the tonic
const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Profile-correlation key analyzer.
///
/// Builds a pitch-class histogram weighted by the number of subdivisions
/// each class sounds in, then scores it against the Krumhansl-Kessler
/// major and minor profiles at all 12 rotations. The best of the 24
/// candidates wins; ties resolve to the lower tonic, major before minor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileKeyAnalyzer;

impl ProfileKeyAnalyzer {
    pub fn new() -> Self {
        ProfileKeyAnalyzer
    }
}

impl KeyAnalyzer for ProfileKeyAnalyzer {
    fn detect_key(&self, timeline: &[Snapshot]) -> Option<Key> {
        let chroma = chroma_histogram(timeline);
        if chroma.iter().all(|&weight| weight == 0.0) {
            return None;
        }

        let mut best_score = f64::NEG_INFINITY;
        let mut best_key = Key {
            tonic: 0,
            mode: Mode::Major,
        };
        for (mode, profile) in [(Mode::Major, &MAJOR_PROFILE), (Mode::Minor, &MINOR_PROFILE)] {
            for tonic in 0..12u8 {
                let score = correlate(&chroma, profile, tonic);
                if score > best_score {
                    best_score = score;
                    best_key = Key { tonic, mode };
                }
            }
        }
        Some(best_key)
    }
}

/// Per-subdivision presence histogram: each pitch class sounding in a
/// snapshot contributes 1.0 regardless of octave doubling.
fn chroma_histogram(timeline: &[Snapshot]) -> [f64; 12] {
    let mut chroma = [0.0f64; 12];
    for snapshot in timeline {
        let mut seen = [false; 12];
        for pitch in &snapshot.pitches {
            let pc = (pitch % 12) as usize;
            if !seen[pc] {
                seen[pc] = true;
                chroma[pc] += 1.0;
            }
        }
    }
    chroma
}

/// Dot product of the histogram with the profile rotated to `tonic`
fn correlate(chroma: &[f64; 12], profile: &[f64; 12], tonic: u8) -> f64 {
    (0..12)
        .map(|degree| chroma[(tonic as usize + degree) % 12] * profile[degree])
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(index: usize, pitches: Vec<u8>) -> Snapshot {
        Snapshot {
            index,
            tick: index as u64 * 4,
            pitches,
        }
    }

    fn timeline_of(pitch_sets: &[&[u8]]) -> Vec<Snapshot> {
        pitch_sets
            .iter()
            .enumerate()
            .map(|(i, pitches)| snapshot(i, pitches.to_vec()))
            .collect()
    }

    #[test]
    fn test_empty_timeline_has_no_key() {
        let analyzer = ProfileKeyAnalyzer::new();
        assert_eq!(analyzer.detect_key(&[]), None);
        assert_eq!(analyzer.detect_key(&timeline_of(&[&[], &[]])), None);
    }

    #[test]
    fn test_c_major_progression() {
        let analyzer = ProfileKeyAnalyzer::new();
        // I IV V I
        let timeline = timeline_of(&[
            &[60, 64, 67],
            &[60, 65, 69],
            &[62, 67, 71],
            &[60, 64, 67],
        ]);
        let key = analyzer.detect_key(&timeline).unwrap();
        assert_eq!(key.tonic, 0);
        assert_eq!(key.mode, Mode::Major);
        assert_eq!(key.to_string(), "C major");
    }

    #[test]
    fn test_a_harmonic_minor() {
        let analyzer = ProfileKeyAnalyzer::new();
        // A B C D E F G# spread over a few subdivisions
        let timeline = timeline_of(&[
            &[57, 60, 64],
            &[57, 62, 65],
            &[56, 59, 64],
            &[57, 60, 64],
            &[57, 60, 64],
        ]);
        let key = analyzer.detect_key(&timeline).unwrap();
        assert_eq!(key.tonic, 9);
        assert_eq!(key.mode, Mode::Minor);
        assert_eq!(key.to_string(), "A minor");
    }

    #[test]
    fn test_octave_doubling_counts_once() {
        let analyzer = ProfileKeyAnalyzer::new();
        // heavy octave doubling must not drown out the triad
        let timeline = timeline_of(&[&[36, 48, 60, 64, 67, 72, 76, 79]]);
        let key = analyzer.detect_key(&timeline).unwrap();
        assert_eq!(key.to_string(), "C major");
    }

    #[test]
    fn test_transposition_moves_tonic() {
        let analyzer = ProfileKeyAnalyzer::new();
        // the C major progression up a fifth
        let timeline = timeline_of(&[
            &[67, 71, 74],
            &[67, 72, 76],
            &[69, 74, 78],
            &[67, 71, 74],
        ]);
        let key = analyzer.detect_key(&timeline).unwrap();
        assert_eq!(key.to_string(), "G major");
    }
}
