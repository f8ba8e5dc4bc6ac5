// Timeline sampler
// Sweeps the ordered event stream once to capture the sounding pitch set
// at every grid subdivision

use serde::{Deserialize, Serialize};

use super::active::ActiveNoteSet;
use crate::stream::{EventStream, NoteKind, StreamEvent};

/// The sounding pitches at one grid subdivision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Subdivision index on the grid
    pub index: usize,

    /// Absolute tick the subdivision falls on
    pub tick: u64,

    /// Distinct sounding pitches, ascending (the first is the bass)
    pub pitches: Vec<u8>,
}

/// Sample the stream at sixteenth-note resolution
pub fn sample_sixteenths(stream: &EventStream) -> Vec<Snapshot> {
    sample_grid(stream, stream.sixteenth_ticks())
}

/// Sample the sounding pitch set at every subdivision of a grid
///
/// The grid holds `round(last_event_tick / subdivision_ticks)` points and
/// subdivision `i` falls on tick `trunc(i * subdivision_ticks)`.
///
/// A single cursor advances through the ordered event list: for each
/// subdivision every event at or before the target tick is applied to the
/// running active set, then the set is snapshotted. The event list is
/// walked exactly once, never re-scanned per subdivision.
pub fn sample_grid(stream: &EventStream, subdivision_ticks: f64) -> Vec<Snapshot> {
    if !(subdivision_ticks > 0.0) {
        return Vec::new();
    }

    let total = (stream.last_tick() as f64 / subdivision_ticks).round() as usize;
    let mut snapshots = Vec::with_capacity(total);

    let mut active = ActiveNoteSet::new();
    let mut cursor = 0;
    let events = &stream.events;

    for index in 0..total {
        let target_tick = (index as f64 * subdivision_ticks) as u64;

        while cursor < events.len() && events[cursor].tick() <= target_tick {
            if let StreamEvent::Note { note, .. } = &events[cursor] {
                match note.kind {
                    NoteKind::On => active.note_on(note.channel, note.pitch),
                    NoteKind::Off => active.note_off(note.channel, note.pitch),
                }
            }
            cursor += 1;
        }

        snapshots.push(Snapshot {
            index,
            tick: target_tick,
            pitches: active.sounding_pitches(),
        });
    }

    snapshots
}
