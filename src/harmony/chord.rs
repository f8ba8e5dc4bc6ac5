// Chord label types
// Pitch-class names, chord qualities, tensions, and slash-bass rendering

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pitch-class spellings, sharps only
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Name of a pitch class (taken modulo 12)
pub fn pitch_class_name(pc: u8) -> &'static str {
    NOTE_NAMES[(pc % 12) as usize]
}

/// Chord quality resolved by the interval-pattern classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// Major triad (also the implied quality of a lone pitch class)
    Major,

    /// Major triad with a major seventh
    Major7,

    /// Major triad with a minor seventh
    Dominant7,

    /// Minor triad
    Minor,

    /// Minor triad with a minor seventh
    Minor7,

    /// Diminished triad
    Diminished,

    /// Diminished triad with a diminished seventh
    Diminished7,

    /// Diminished triad with a minor seventh
    HalfDiminished7,

    /// Augmented triad
    Augmented,

    /// Suspended second
    Sus2,

    /// Suspended second with a minor seventh
    Sus2Seventh,

    /// Suspended fourth
    Sus4,

    /// Suspended fourth with a minor seventh
    Sus4Seventh,

    /// No pattern matched; the label is the bare bass pitch-class name
    Bare,
}

impl Quality {
    /// Suffix appended to the root name when rendering
    pub fn suffix(&self) -> &'static str {
        match self {
            Quality::Major => "",
            Quality::Major7 => "maj7",
            Quality::Dominant7 => "7",
            Quality::Minor => "m",
            Quality::Minor7 => "m7",
            Quality::Diminished => "dim",
            Quality::Diminished7 => "dim7",
            Quality::HalfDiminished7 => "m7b5",
            Quality::Augmented => "aug",
            Quality::Sus2 => "sus2",
            Quality::Sus2Seventh => "sus27",
            Quality::Sus4 => "sus4",
            Quality::Sus4Seventh => "sus47",
            Quality::Bare => "",
        }
    }

    /// Whether the quality contains a major third above the root
    pub fn has_major_third(&self) -> bool {
        matches!(
            self,
            Quality::Major | Quality::Major7 | Quality::Dominant7 | Quality::Augmented
        )
    }

    /// Major-family test used by the root-motion scan: a plain major
    /// triad, either seventh on a major triad, or a bare root name.
    /// Minor, diminished, augmented, and suspended qualities are not
    /// dominant candidates.
    pub fn is_major_family(&self) -> bool {
        matches!(
            self,
            Quality::Major | Quality::Major7 | Quality::Dominant7 | Quality::Bare
        )
    }
}

/// A tension sounding above the chord quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tension {
    /// Minor second above the root
    FlatNine,

    /// Diminished fifth alongside a third and perfect fifth
    SharpEleven,

    /// Augmented fifth alongside a seventh
    FlatThirteen,
}

impl Tension {
    /// Symbol appended to the rendered chord name
    pub fn symbol(&self) -> &'static str {
        match self {
            Tension::FlatNine => "b9",
            Tension::SharpEleven => "#11",
            Tension::FlatThirteen => "b13",
        }
    }
}

/// A resolved chord: root, quality, tensions, and the sounding bass
///
/// Derived once by the classifier and never mutated. The bass is the
/// pitch class of the lowest absolute pitch; it renders as a slash
/// suffix when it differs from the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordLabel {
    /// Root pitch class (0-11)
    pub root: u8,

    /// Matched quality
    pub quality: Quality,

    /// Tensions in detection order; only major- and minor-family
    /// qualities carry them
    pub tensions: Vec<Tension>,

    /// Bass pitch class (0-11)
    pub bass: u8,
}

impl ChordLabel {
    /// The unclassifiable fallback: just the bass pitch-class name
    pub fn bare(bass_pc: u8) -> Self {
        let pc = bass_pc % 12;
        ChordLabel {
            root: pc,
            quality: Quality::Bare,
            tensions: Vec::new(),
            bass: pc,
        }
    }

    /// Rendered chord name, e.g. "Cm7b5" or "F#7/A#"
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", pitch_class_name(self.root), self.quality.suffix())?;
        for tension in &self.tensions {
            f.write_str(tension.symbol())?;
        }
        if self.bass != self.root {
            write!(f, "/{}", pitch_class_name(self.bass))?;
        }
        Ok(())
    }
}
