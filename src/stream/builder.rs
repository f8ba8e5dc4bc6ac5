// Event stream builder
// Merges per-track delta-time messages into one absolute-tick-ordered stream

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use thiserror::Error;

use super::types::{EventStream, NoteEvent, NoteKind, StreamEvent};

/// Errors raised while building an event stream
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("malformed header: missing or zero ticks-per-beat resolution")]
    MalformedHeader,

    #[error("failed to parse MIDI data: {0}")]
    InvalidMidi(#[from] midly::Error),
}

/// Parse raw SMF bytes and build the merged event stream
pub fn from_bytes(bytes: &[u8]) -> Result<EventStream, StreamError> {
    let smf = Smf::parse(bytes)?;
    from_smf(&smf)
}

/// Build the merged event stream from a parsed file
///
/// Algorithm:
/// 1. Per track, accumulate a running absolute tick by summing deltas
/// 2. Emit one stream event per note/tempo/end-of-track message
/// 3. Merge all tracks ordered by absolute tick; at equal tick, Off
///    events sort strictly before On events (the sort is stable, so
///    events of equal tick and kind keep their per-track order)
///
/// Timecode timing carries no ticks-per-beat resolution and is rejected
/// as a malformed header, as is a metrical resolution of zero.
pub fn from_smf(smf: &Smf) -> Result<EventStream, StreamError> {
    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(tpb) if tpb.as_int() > 0 => tpb.as_int(),
        _ => return Err(StreamError::MalformedHeader),
    };

    let mut events = Vec::new();

    for (track_index, track) in smf.tracks.iter().enumerate() {
        let mut current_tick = 0u64;

        for event in track {
            current_tick += u64::from(event.delta.as_int());

            match event.kind {
                TrackEventKind::Midi { channel, message } => {
                    if let Some((kind, pitch, velocity)) = note_boundary(&message) {
                        events.push(StreamEvent::Note {
                            track: track_index,
                            note: NoteEvent {
                                tick: current_tick,
                                kind,
                                channel: channel.as_int(),
                                pitch,
                                velocity,
                            },
                        });
                    }
                }
                TrackEventKind::Meta(MetaMessage::Tempo(micros)) => {
                    events.push(StreamEvent::Tempo {
                        track: track_index,
                        tick: current_tick,
                        micros_per_beat: micros.as_int(),
                    });
                }
                TrackEventKind::Meta(MetaMessage::EndOfTrack) => {
                    events.push(StreamEvent::EndOfTrack {
                        track: track_index,
                        tick: current_tick,
                    });
                }
                _ => {}
            }
        }
    }

    events.sort_by_key(|e| (e.tick(), e.merge_rank()));

    Ok(EventStream {
        ticks_per_beat,
        track_count: smf.tracks.len(),
        events,
    })
}

/// Normalize a channel message to a note boundary
///
/// A note_on with velocity 0 is an Off by MIDI convention, never an On.
pub(crate) fn note_boundary(message: &MidiMessage) -> Option<(NoteKind, u8, u8)> {
    match message {
        MidiMessage::NoteOn { key, vel } => {
            let kind = if vel.as_int() == 0 {
                NoteKind::Off
            } else {
                NoteKind::On
            };
            Some((kind, key.as_int(), vel.as_int()))
        }
        MidiMessage::NoteOff { key, vel } => Some((NoteKind::Off, key.as_int(), vel.as_int())),
        _ => None,
    }
}
