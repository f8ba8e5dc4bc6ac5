// Interval-pattern chord classifier
// Matches a sounding pitch set against triad and seventh templates

use log::debug;

use super::chord::{ChordLabel, Quality, Tension};

// Interval offsets above a candidate root, modulo 12
const MINOR_SECOND: usize = 1;
const MAJOR_SECOND: usize = 2;
const MINOR_THIRD: usize = 3;
const MAJOR_THIRD: usize = 4;
const PERFECT_FOURTH: usize = 5;
const DIMINISHED_FIFTH: usize = 6;
const PERFECT_FIFTH: usize = 7;
const AUGMENTED_FIFTH: usize = 8;
const DIMINISHED_SEVENTH: usize = 9;
const MINOR_SEVENTH: usize = 10;
const MAJOR_SEVENTH: usize = 11;

/// Classify a set of sounding pitches into a chord label.
///
/// `pitches` are absolute MIDI pitches; the lowest one supplies the
/// bass. Returns `None` for an empty set (a rest).
///
/// Candidate roots are tried in ascending pitch-class order and the
/// first match wins, so the result is deterministic for ambiguous
/// sets. A single pitch class is an implied major triad; more than
/// four distinct pitch classes never match a template and fall back
/// to the bare bass name.
pub fn classify(pitches: &[u8]) -> Option<ChordLabel> {
    let bass_pc = pitches.iter().min()? % 12;

    let mut present = [false; 12];
    let mut distinct = 0usize;
    for pitch in pitches {
        let pc = (pitch % 12) as usize;
        if !present[pc] {
            present[pc] = true;
            distinct += 1;
        }
    }

    if distinct > 4 {
        return Some(ChordLabel::bare(bass_pc));
    }
    if distinct == 1 {
        return Some(ChordLabel {
            root: bass_pc,
            quality: Quality::Major,
            tensions: Vec::new(),
            bass: bass_pc,
        });
    }

    for root in 0..12u8 {
        if !present[root as usize] {
            continue;
        }
        if let Some((quality, tensions)) = match_root(root, &present) {
            return Some(ChordLabel {
                root,
                quality,
                tensions,
                bass: bass_pc,
            });
        }
    }

    debug!("no chord template matched; labelling by bass pitch class");
    Some(ChordLabel::bare(bass_pc))
}

/// Match the pitch-class set against one candidate root.
///
/// Suspended templates are only tried when the set holds no third
/// above this root, and they never carry tensions. Triad templates
/// follow in fixed precedence: major, minor, diminished, augmented.
fn match_root(root: u8, present: &[bool; 12]) -> Option<(Quality, Vec<Tension>)> {
    let iv = |offset: usize| present[(root as usize + offset) % 12];

    let has_third = iv(MINOR_THIRD) || iv(MAJOR_THIRD);

    if !has_third {
        if iv(MAJOR_SECOND) && iv(PERFECT_FIFTH) {
            let quality = if iv(MINOR_SEVENTH) {
                Quality::Sus2Seventh
            } else {
                Quality::Sus2
            };
            return Some((quality, Vec::new()));
        }
        if iv(PERFECT_FOURTH) && iv(PERFECT_FIFTH) {
            let quality = if iv(MINOR_SEVENTH) {
                Quality::Sus4Seventh
            } else {
                Quality::Sus4
            };
            return Some((quality, Vec::new()));
        }
    }

    let tensions = collect_tensions(root, present, has_third);

    if iv(MAJOR_THIRD) && iv(PERFECT_FIFTH) {
        let quality = if iv(MAJOR_SEVENTH) {
            Quality::Major7
        } else if iv(MINOR_SEVENTH) {
            Quality::Dominant7
        } else {
            Quality::Major
        };
        return Some((quality, tensions));
    }
    if iv(MINOR_THIRD) && iv(PERFECT_FIFTH) {
        let quality = if iv(MINOR_SEVENTH) {
            Quality::Minor7
        } else {
            Quality::Minor
        };
        return Some((quality, tensions));
    }
    if iv(MINOR_THIRD) && iv(DIMINISHED_FIFTH) {
        let quality = if iv(DIMINISHED_SEVENTH) {
            Quality::Diminished7
        } else if iv(MINOR_SEVENTH) {
            Quality::HalfDiminished7
        } else {
            Quality::Diminished
        };
        return Some((quality, Vec::new()));
    }
    if iv(MAJOR_THIRD) && iv(AUGMENTED_FIFTH) {
        return Some((Quality::Augmented, Vec::new()));
    }

    None
}

/// Tensions sounding above a candidate root, in fixed b9, #11, b13 order
fn collect_tensions(root: u8, present: &[bool; 12], has_third: bool) -> Vec<Tension> {
    let iv = |offset: usize| present[(root as usize + offset) % 12];
    let mut tensions = Vec::new();

    if iv(MINOR_SECOND) {
        tensions.push(Tension::FlatNine);
    }
    if iv(DIMINISHED_FIFTH) && has_third && iv(PERFECT_FIFTH) {
        tensions.push(Tension::SharpEleven);
    }
    if iv(AUGMENTED_FIFTH) && (iv(MINOR_SEVENTH) || iv(MAJOR_SEVENTH)) {
        tensions.push(Tension::FlatThirteen);
    }

    tensions
}
