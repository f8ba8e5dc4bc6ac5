// Harmonic function resolution
// Maps chord labels to scale-degree numerals relative to a key

use super::chord::{ChordLabel, Quality};
use super::key::Key;

/// Capability interface for harmonic function labelling.
///
/// Downstream stages treat the returned label as an opaque string and
/// classify it only by its leading characters, so alternative notations
/// can be substituted freely.
pub trait FunctionResolver {
    /// Label `chord` relative to `key`, e.g. "V7" or "ii".
    fn resolve(&self, chord: &ChordLabel, key: &Key) -> String;
}

// Scale-degree numerals indexed by semitones above the tonic
const NUMERALS: [&str; 12] = [
    "I", "bII", "II", "bIII", "III", "IV", "bV", "V", "bVI", "VI", "bVII", "VII",
];

/// Rule-based resolver over the chord root's interval above the tonic.
///
/// Minor and diminished qualities lowercase the numeral; quality marks
/// follow common lead-sheet practice (`°`, `ø7`, `+`, seventh digits).
/// A bare label resolves to "?" so it never reads as dominant or tonic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleDegreeResolver;

impl ScaleDegreeResolver {
    pub fn new() -> Self {
        ScaleDegreeResolver
    }
}

impl FunctionResolver for ScaleDegreeResolver {
    fn resolve(&self, chord: &ChordLabel, key: &Key) -> String {
        if chord.quality == Quality::Bare {
            return "?".to_string();
        }

        let degree = ((chord.root + 12 - key.tonic) % 12) as usize;
        let numeral = NUMERALS[degree];
        let lowercase = matches!(
            chord.quality,
            Quality::Minor
                | Quality::Minor7
                | Quality::Diminished
                | Quality::Diminished7
                | Quality::HalfDiminished7
        );

        let mut label = if lowercase {
            numeral.to_lowercase()
        } else {
            numeral.to_string()
        };
        label.push_str(quality_mark(chord.quality));
        label
    }
}

/// Suffix appended to the numeral for each quality
fn quality_mark(quality: Quality) -> &'static str {
    match quality {
        Quality::Major | Quality::Minor | Quality::Bare => "",
        Quality::Major7 => "maj7",
        Quality::Dominant7 | Quality::Minor7 => "7",
        Quality::Diminished => "°",
        Quality::Diminished7 => "°7",
        Quality::HalfDiminished7 => "ø7",
        Quality::Augmented => "+",
        Quality::Sus2 => "sus2",
        Quality::Sus2Seventh => "sus27",
        Quality::Sus4 => "sus4",
        Quality::Sus4Seventh => "sus47",
    }
}
