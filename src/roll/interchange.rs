// Piano-roll interchange
// JSON step-grid export and import of note streams

use std::collections::BTreeMap;

use log::debug;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stream::EventStream;
use crate::timeline::sample_grid;

/// Lowest and highest pitch kept in a roll, the 88-key piano range
const PIANO_LOW: u8 = 21;
const PIANO_HIGH: u8 = 108;

/// Fixed resolution of streams rebuilt from a roll
const ROLL_TICKS_PER_BEAT: u16 = 480;

/// Split names probed when reading a document, in order
const SPLIT_ORDER: [&str; 4] = ["train", "test", "valid", "single"];

/// Errors raised while reading or writing roll documents
#[derive(Debug, Error)]
pub enum RollError {
    #[error("no recognized split in roll document (expected train, test, valid, or single)")]
    EmptyDocument,

    #[error("failed to read roll JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Step length of a roll grid, as a fraction of a beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepResolution {
    Quarter,
    Eighth,
    Sixteenth,
}

impl StepResolution {
    pub fn beats(&self) -> f64 {
        match self {
            StepResolution::Quarter => 1.0,
            StepResolution::Eighth => 0.5,
            StepResolution::Sixteenth => 0.25,
        }
    }
}

impl Default for StepResolution {
    fn default() -> Self {
        StepResolution::Sixteenth
    }
}

/// A piano-roll document: named splits of step sequences.
///
/// Each sequence is a list of steps, each step the pitches sounding
/// during it in descending order. The JSON form is the bare object of
/// splits, e.g. `{"single": [[[67, 64, 60], [67, 64, 60]]]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RollDocument {
    pub splits: BTreeMap<String, Vec<Vec<Vec<u8>>>>,
}

impl RollDocument {
    /// Sample `stream` on a step grid and store it as one sequence
    /// under `split`. Pitches outside the piano range are dropped.
    pub fn from_stream(stream: &EventStream, resolution: StepResolution, split: &str) -> Self {
        let step_ticks = f64::from(stream.ticks_per_beat) * resolution.beats();
        let steps: Vec<Vec<u8>> = sample_grid(stream, step_ticks)
            .into_iter()
            .map(|snapshot| {
                let mut pitches: Vec<u8> = snapshot
                    .pitches
                    .into_iter()
                    .filter(|pitch| (PIANO_LOW..=PIANO_HIGH).contains(pitch))
                    .collect();
                pitches.reverse();
                pitches
            })
            .collect();

        debug!("exported {} steps to split {:?}", steps.len(), split);

        let mut splits = BTreeMap::new();
        splits.insert(split.to_string(), vec![steps]);
        RollDocument { splits }
    }

    /// The sequences of the first split present in `SPLIT_ORDER`
    pub fn primary_sequences(&self) -> Option<&[Vec<Vec<u8>>]> {
        SPLIT_ORDER
            .iter()
            .find_map(|name| self.splits.get(*name).map(|sequences| sequences.as_slice()))
    }

    /// Rebuild a playable single-track file from the primary split.
    ///
    /// Steps are walked with an active pitch set; a pitch leaving the
    /// set emits an Off, one entering emits an On (velocity 64), Offs
    /// before Ons within a step. The first message of a step carries
    /// the accumulated tick delta, the rest zero. Remaining notes are
    /// closed after each sequence's final step.
    pub fn to_smf(&self, resolution: StepResolution, bpm: u32) -> Result<Smf<'static>, RollError> {
        let sequences = self.primary_sequences().ok_or(RollError::EmptyDocument)?;
        let bpm = bpm.max(1);
        let step_ticks = (f64::from(ROLL_TICKS_PER_BEAT) * resolution.beats()) as u32;

        let mut track = Track::new();
        track.push(TrackEvent {
            delta: 0u32.into(),
            kind: TrackEventKind::Meta(MetaMessage::Tempo((60_000_000 / bpm).into())),
        });

        let mut accumulated = 0u32;
        for sequence in sequences {
            let mut active: Vec<u8> = Vec::new();
            for step in sequence {
                let mut target: Vec<u8> = step
                    .iter()
                    .copied()
                    .filter(|pitch| (PIANO_LOW..=PIANO_HIGH).contains(pitch))
                    .collect();
                target.sort_unstable();
                target.dedup();

                for pitch in active.iter().filter(|p| !target.contains(p)) {
                    track.push(note_message(accumulated, false, *pitch));
                    accumulated = 0;
                }
                for pitch in target.iter().filter(|p| !active.contains(p)) {
                    track.push(note_message(accumulated, true, *pitch));
                    accumulated = 0;
                }

                active = target;
                accumulated += step_ticks;
            }

            for pitch in &active {
                track.push(note_message(accumulated, false, *pitch));
                accumulated = 0;
            }
        }

        track.push(TrackEvent {
            delta: 0u32.into(),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });

        Ok(Smf {
            header: Header {
                format: Format::SingleTrack,
                timing: Timing::Metrical(ROLL_TICKS_PER_BEAT.into()),
            },
            tracks: vec![track],
        })
    }

    pub fn to_json(&self) -> Result<String, RollError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, RollError> {
        Ok(serde_json::from_str(text)?)
    }
}

fn note_message(delta: u32, is_on: bool, pitch: u8) -> TrackEvent<'static> {
    let message = if is_on {
        MidiMessage::NoteOn {
            key: pitch.into(),
            vel: 64u8.into(),
        }
    } else {
        MidiMessage::NoteOff {
            key: pitch.into(),
            vel: 64u8.into(),
        }
    };
    TrackEvent {
        delta: delta.into(),
        kind: TrackEventKind::Midi {
            channel: 0u8.into(),
            message,
        },
    }
}
