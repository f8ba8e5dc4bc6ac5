// Stream cutting
// Truncates a MIDI file exactly at a tick boundary

use log::debug;
use midly::{MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use thiserror::Error;

use crate::stream::builder::note_boundary;
use crate::stream::{NoteKind, StreamError};
use crate::timeline::ActiveNoteSet;

/// Errors raised by the surgical transforms
#[derive(Debug, Error)]
pub enum SurgeryError {
    #[error("malformed header: missing or zero ticks-per-beat resolution")]
    MalformedHeader,

    #[error("failed to build event stream: {0}")]
    Stream(#[from] StreamError),
}

/// Cut at a sixteenth-subdivision index.
///
/// The cut tick is derived with the same grid arithmetic the sampler
/// uses, `trunc(index * ticks_per_beat / 4)`, so a cut at subdivision
/// `n` lands exactly on the tick that subdivision was sampled at.
pub fn cut_at_sixteenth<'a>(smf: &Smf<'a>, index: usize) -> Result<Smf<'a>, SurgeryError> {
    let ticks_per_beat = metrical_resolution(smf)?;
    let cut_tick = (index as f64 * f64::from(ticks_per_beat) / 4.0) as u64;
    Ok(cut_at_tick(smf, cut_tick))
}

pub(crate) fn metrical_resolution(smf: &Smf) -> Result<u16, SurgeryError> {
    match smf.header.timing {
        Timing::Metrical(tpb) if tpb.as_int() > 0 => Ok(tpb.as_int()),
        _ => Err(SurgeryError::MalformedHeader),
    }
}

/// Truncate every track of `smf` at an absolute tick.
///
/// Boundary policy at the cut instant: a note may end there but never
/// begin, so an On landing exactly on `cut_tick` is dropped while an
/// Off or meta-event is kept. Notes still sounding when the cut is
/// reached get synthesized Offs at `cut_tick`, and each track closes
/// with a fresh end-of-track marker.
pub fn cut_at_tick<'a>(smf: &Smf<'a>, cut_tick: u64) -> Smf<'a> {
    let mut tracks = Vec::with_capacity(smf.tracks.len());
    for track in &smf.tracks {
        tracks.push(cut_track(track, cut_tick));
    }
    debug!("cut {} tracks at tick {}", tracks.len(), cut_tick);

    Smf {
        header: smf.header,
        tracks,
    }
}

fn cut_track<'a>(track: &Track<'a>, cut_tick: u64) -> Track<'a> {
    let mut output = Track::new();
    let mut actives = ActiveNoteSet::new();
    let mut current_tick = 0u64;
    // absolute tick of the last event actually written out; deltas are
    // recomputed from it so a dropped at-cut On cannot skew the timing
    // of whatever follows
    let mut emitted_tick = 0u64;

    for event in track.iter() {
        current_tick += u64::from(event.delta.as_int());
        if current_tick > cut_tick {
            break;
        }

        match event.kind {
            TrackEventKind::Midi { channel, message } => {
                if let Some((kind, pitch, _)) = note_boundary(&message) {
                    match kind {
                        NoteKind::On => {
                            // no note may begin exactly at the cut
                            if current_tick == cut_tick {
                                continue;
                            }
                            actives.note_on(channel.as_int(), pitch);
                        }
                        NoteKind::Off => {
                            actives.note_off(channel.as_int(), pitch);
                        }
                    }
                }
            }
            // the source marker is replaced by a fresh one at the end
            TrackEventKind::Meta(MetaMessage::EndOfTrack) => continue,
            _ => {}
        }

        output.push(TrackEvent {
            delta: ((current_tick - emitted_tick) as u32).into(),
            kind: event.kind,
        });
        emitted_tick = current_tick;
    }

    for (i, (channel, pitch)) in actives.active_pairs().into_iter().enumerate() {
        let residual = if i == 0 { cut_tick - emitted_tick } else { 0 };
        output.push(TrackEvent {
            delta: (residual as u32).into(),
            kind: TrackEventKind::Midi {
                channel: channel.into(),
                message: MidiMessage::NoteOff {
                    key: pitch.into(),
                    vel: 0u8.into(),
                },
            },
        });
    }

    output.push(TrackEvent {
        delta: 0u32.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::{Format, Header};

    fn metrical_smf(ticks_per_beat: u16, tracks: Vec<Track<'static>>) -> Smf<'static> {
        Smf {
            header: Header {
                format: Format::Parallel,
                timing: Timing::Metrical(ticks_per_beat.into()),
            },
            tracks,
        }
    }

    fn on(delta: u32, pitch: u8, vel: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: delta.into(),
            kind: TrackEventKind::Midi {
                channel: 0u8.into(),
                message: MidiMessage::NoteOn {
                    key: pitch.into(),
                    vel: vel.into(),
                },
            },
        }
    }

    fn off(delta: u32, pitch: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: delta.into(),
            kind: TrackEventKind::Midi {
                channel: 0u8.into(),
                message: MidiMessage::NoteOff {
                    key: pitch.into(),
                    vel: 0u8.into(),
                },
            },
        }
    }

    fn end_of_track(delta: u32) -> TrackEvent<'static> {
        TrackEvent {
            delta: delta.into(),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        }
    }

    /// Flatten a track back into (absolute tick, event) pairs
    fn absolute<'a>(track: &Track<'a>) -> Vec<(u64, TrackEvent<'a>)> {
        let mut tick = 0u64;
        track
            .iter()
            .map(|event| {
                tick += u64::from(event.delta.as_int());
                (tick, *event)
            })
            .collect()
    }

    fn is_off_of(event: &TrackEvent, pitch: u8) -> bool {
        match event.kind {
            TrackEventKind::Midi { message, .. } => {
                matches!(note_boundary(&message), Some((NoteKind::Off, p, _)) if p == pitch)
            }
            _ => false,
        }
    }

    fn is_on_of(event: &TrackEvent, pitch: u8) -> bool {
        match event.kind {
            TrackEventKind::Midi { message, .. } => {
                matches!(note_boundary(&message), Some((NoteKind::On, p, _)) if p == pitch)
            }
            _ => false,
        }
    }

    #[test]
    fn test_held_note_gets_synthesized_off_at_cut() {
        let track = vec![on(0, 60, 90), off(20, 60), end_of_track(0)];
        let smf = metrical_smf(480, vec![track]);

        let cut = cut_at_tick(&smf, 10);
        let events = absolute(&cut.tracks[0]);

        // On at 0, synthesized Off at 10, end-of-track at 10
        assert_eq!(events.len(), 3);
        assert!(is_on_of(&events[0].1, 60));
        assert_eq!(events[1].0, 10);
        assert!(is_off_of(&events[1].1, 60));
        assert_eq!(events[2].0, 10);
        assert!(matches!(
            events[2].1.kind,
            TrackEventKind::Meta(MetaMessage::EndOfTrack)
        ));
    }

    #[test]
    fn test_natural_off_at_cut_is_kept() {
        let track = vec![on(0, 60, 90), off(20, 60), end_of_track(0)];
        let smf = metrical_smf(480, vec![track]);

        let cut = cut_at_tick(&smf, 20);
        let events = absolute(&cut.tracks[0]);

        assert_eq!(events.len(), 3);
        assert_eq!(events[1].0, 20);
        assert!(is_off_of(&events[1].1, 60));
        // no duplicate synthesized Off
        let offs = events
            .iter()
            .filter(|(_, e)| is_off_of(e, 60))
            .count();
        assert_eq!(offs, 1);
    }

    #[test]
    fn test_on_at_cut_is_dropped() {
        let track = vec![
            on(0, 60, 90),
            off(10, 60),
            on(0, 64, 90),
            off(10, 64),
            end_of_track(0),
        ];
        let smf = metrical_smf(480, vec![track]);

        // the second On lands exactly on the cut
        let cut = cut_at_tick(&smf, 10);
        let events = absolute(&cut.tracks[0]);

        assert!(!events.iter().any(|(_, e)| is_on_of(e, 64)));
        // and no Off is synthesized for a note that never began
        assert!(!events.iter().any(|(_, e)| is_off_of(e, 64)));
    }

    #[test]
    fn test_dropped_on_does_not_skew_following_delta() {
        // On 60 at 0, On 64 at 10 (dropped by the cut), Off 60 at 10 (kept)
        let track = vec![on(0, 60, 90), on(10, 64, 90), off(0, 60), end_of_track(0)];
        let smf = metrical_smf(480, vec![track]);

        let cut = cut_at_tick(&smf, 10);
        let events = absolute(&cut.tracks[0]);

        // the kept Off must still land on tick 10 despite the dropped On
        assert_eq!(events.len(), 3);
        assert!(is_off_of(&events[1].1, 60));
        assert_eq!(events[1].0, 10);
    }

    #[test]
    fn test_multiple_held_notes_all_closed() {
        let track = vec![
            on(0, 48, 80),
            on(0, 64, 80),
            on(0, 67, 80),
            off(40, 48),
            off(0, 64),
            off(0, 67),
            end_of_track(0),
        ];
        let smf = metrical_smf(480, vec![track]);

        let cut = cut_at_tick(&smf, 16);
        let events = absolute(&cut.tracks[0]);

        // three synthesized Offs at the cut, ascending pitch
        let offs: Vec<(u64, u8)> = events
            .iter()
            .filter_map(|(tick, e)| match e.kind {
                TrackEventKind::Midi { message, .. } => match note_boundary(&message) {
                    Some((NoteKind::Off, pitch, _)) => Some((*tick, pitch)),
                    _ => None,
                },
                _ => None,
            })
            .collect();
        assert_eq!(offs, vec![(16, 48), (16, 64), (16, 67)]);
    }

    #[test]
    fn test_cut_applies_per_track() {
        let track_a = vec![on(0, 60, 90), off(100, 60), end_of_track(0)];
        let track_b = vec![on(0, 41, 70), off(100, 41), end_of_track(0)];
        let smf = metrical_smf(480, vec![track_a, track_b]);

        let cut = cut_at_tick(&smf, 50);
        assert_eq!(cut.tracks.len(), 2);
        for track in &cut.tracks {
            let events = absolute(track);
            let last = events.last().unwrap();
            assert_eq!(last.0, 50);
            assert!(matches!(
                last.1.kind,
                TrackEventKind::Meta(MetaMessage::EndOfTrack)
            ));
        }
    }

    #[test]
    fn test_meta_events_before_cut_survive() {
        let tempo = TrackEvent {
            delta: 0u32.into(),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(500_000u32.into())),
        };
        let track = vec![tempo, on(0, 60, 90), off(32, 60), end_of_track(0)];
        let smf = metrical_smf(480, vec![track]);

        let cut = cut_at_tick(&smf, 16);
        let has_tempo = cut.tracks[0]
            .iter()
            .any(|e| matches!(e.kind, TrackEventKind::Meta(MetaMessage::Tempo(_))));
        assert!(has_tempo);
    }

    #[test]
    fn test_sixteenth_index_matches_grid_arithmetic() {
        let track = vec![on(0, 60, 90), off(480, 60), end_of_track(0)];
        let smf = metrical_smf(6, vec![track]);

        // subdivision length 1.5 ticks; index 3 truncates to tick 4
        let cut = cut_at_sixteenth(&smf, 3).unwrap();
        let events = absolute(&cut.tracks[0]);
        let last = events.last().unwrap();
        assert_eq!(last.0, 4);
    }

    #[test]
    fn test_rejects_timecode_for_sixteenth_cut() {
        let smf = Smf {
            header: Header {
                format: Format::SingleTrack,
                timing: Timing::Timecode(midly::Fps::Fps24, 4),
            },
            tracks: vec![Track::new()],
        };
        assert!(matches!(
            cut_at_sixteenth(&smf, 4),
            Err(SurgeryError::MalformedHeader)
        ));
    }
}
