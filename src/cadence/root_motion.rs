// Root-motion scan
// Key-agnostic detection of descending-fifth resolutions

use serde::{Deserialize, Serialize};

use crate::harmony::ChordLabel;

/// A descending-fifth arrival found by the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FifthResolution {
    /// Subdivision index of the chord a fifth above
    pub dominant_index: usize,

    /// Subdivision index of the arrival chord
    pub tonic_index: usize,
}

/// Scan per-subdivision chord labels for dominant-style resolutions
/// without consulting a key.
///
/// Rests are skipped and the preceding chord persists across them. A
/// pair is reported when the root falls a perfect fifth, the departing
/// chord is major-family, the arrival is in root position, and the
/// arrival index lands in the third quarter of a sixteen-subdivision
/// bar (index % 16 in 8..=11).
pub fn find_fifth_resolutions(labels: &[Option<ChordLabel>]) -> Vec<FifthResolution> {
    let mut resolutions = Vec::new();
    let mut prev: Option<(usize, &ChordLabel)> = None;

    for (index, slot) in labels.iter().enumerate() {
        let chord = match slot {
            Some(chord) => chord,
            None => continue,
        };

        if let Some((prev_index, prev_chord)) = prev {
            let motion = (prev_chord.root + 12 - chord.root) % 12;
            let bar_slot = index % 16;
            if motion == 7
                && prev_chord.quality.is_major_family()
                && chord.bass == chord.root
                && (8..=11).contains(&bar_slot)
            {
                resolutions.push(FifthResolution {
                    dominant_index: prev_index,
                    tonic_index: index,
                });
            }
        }

        prev = Some((index, chord));
    }

    resolutions
}
