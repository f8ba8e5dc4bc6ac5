// Event stream types
// Absolute-tick note and meta events merged from every track of a file

use serde::{Deserialize, Serialize};

/// Whether a note event starts or ends a sounding pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    /// Note begins sounding
    On,

    /// Note stops sounding
    Off,
}

/// A note boundary at an absolute tick
///
/// Immutable once constructed. A source `note_on` with velocity 0 is
/// normalized to `NoteKind::Off` before a NoteEvent is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Absolute tick from the start of the file
    pub tick: u64,

    /// On or Off
    pub kind: NoteKind,

    /// MIDI channel (0-15)
    pub channel: u8,

    /// MIDI pitch (0-127)
    pub pitch: u8,

    /// MIDI velocity (0-127)
    pub velocity: u8,
}

/// One merged stream event, tagged with its originating track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamEvent {
    /// A note boundary
    Note { track: usize, note: NoteEvent },

    /// Tempo change in microseconds per quarter note
    Tempo {
        track: usize,
        tick: u64,
        micros_per_beat: u32,
    },

    /// End-of-track marker
    EndOfTrack { track: usize, tick: u64 },
}

impl StreamEvent {
    /// Absolute tick of this event
    pub fn tick(&self) -> u64 {
        match self {
            StreamEvent::Note { note, .. } => note.tick,
            StreamEvent::Tempo { tick, .. } => *tick,
            StreamEvent::EndOfTrack { tick, .. } => *tick,
        }
    }

    /// Index of the track this event came from
    pub fn track(&self) -> usize {
        match self {
            StreamEvent::Note { track, .. } => *track,
            StreamEvent::Tempo { track, .. } => *track,
            StreamEvent::EndOfTrack { track, .. } => *track,
        }
    }

    /// The note payload, if this is a note event
    pub fn as_note(&self) -> Option<&NoteEvent> {
        match self {
            StreamEvent::Note { note, .. } => Some(note),
            _ => None,
        }
    }

    /// Ordering rank at equal tick: Off events sort first, then meta
    /// events, then On events. A note ending and a note starting at the
    /// same instant must never overlap.
    pub(crate) fn merge_rank(&self) -> u8 {
        match self {
            StreamEvent::Note { note, .. } => match note.kind {
                NoteKind::Off => 0,
                NoteKind::On => 2,
            },
            StreamEvent::Tempo { .. } | StreamEvent::EndOfTrack { .. } => 1,
        }
    }
}

/// All events of one file in absolute-tick order
///
/// Invariant: `events` is sorted by (tick, merge rank), so ticks are
/// non-decreasing and an Off never follows an On at the same tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventStream {
    /// Ticks per quarter note from the file header
    pub ticks_per_beat: u16,

    /// Number of tracks the stream was merged from
    pub track_count: usize,

    /// Merged events, ordered
    pub events: Vec<StreamEvent>,
}

impl EventStream {
    /// Absolute tick of the last event (0 for an empty stream)
    pub fn last_tick(&self) -> u64 {
        self.events.last().map(|e| e.tick()).unwrap_or(0)
    }

    /// Iterate over the note events only
    pub fn notes(&self) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter().filter_map(|e| e.as_note())
    }

    /// Length of one sixteenth-note subdivision in ticks
    ///
    /// Fractional when ticks_per_beat is not divisible by 4.
    pub fn sixteenth_ticks(&self) -> f64 {
        self.ticks_per_beat as f64 / 4.0
    }
}
