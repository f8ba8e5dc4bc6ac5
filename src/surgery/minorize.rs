// Dominant minorization
// Lowers the major third of a file's final chord by one semitone

use std::collections::HashMap;

use log::{debug, info};
use midly::{MidiMessage, Smf, Track, TrackEvent, TrackEventKind};

use crate::harmony::{classify, pitch_class_name};
use crate::stream::builder::note_boundary;
use crate::stream::{from_smf, NoteKind};
use crate::timeline::sample_sixteenths;

use super::cut::SurgeryError;

/// Lower the major third of the final sounding chord to a minor third.
///
/// The timeline supplies the last non-empty subdivision; its classified
/// label gives the root, and the target pitch class sits a major third
/// above it. Every note of that pitch class whose Off falls strictly
/// after the final chord's onset is transposed down one semitone, On
/// and Off alike, velocity untouched. A final chord with no major third
/// leaves the file unchanged.
pub fn minorize_final_dominant<'a>(smf: &Smf<'a>) -> Result<Smf<'a>, SurgeryError> {
    let stream = from_smf(smf)?;
    let timeline = sample_sixteenths(&stream);

    let snapshot = match timeline.iter().rev().find(|s| !s.pitches.is_empty()) {
        Some(snapshot) => snapshot,
        None => {
            debug!("no sounding subdivision; nothing to minorize");
            return Ok(smf.clone());
        }
    };

    let label = match classify(&snapshot.pitches) {
        Some(label) => label,
        None => {
            debug!("final subdivision is a rest; nothing to minorize");
            return Ok(smf.clone());
        }
    };
    if !label.quality.has_major_third() {
        info!("final chord {} has no major third; leaving file unchanged", label);
        return Ok(smf.clone());
    }

    let target_pc = (label.root + 4) % 12;
    let onset_tick = snapshot.tick;
    debug!(
        "lowering pitch class {} sounding past tick {}",
        pitch_class_name(target_pc),
        onset_tick
    );

    let mut tracks = Vec::with_capacity(smf.tracks.len());
    for track in &smf.tracks {
        tracks.push(minorize_track(track, target_pc, onset_tick));
    }

    Ok(Smf {
        header: smf.header,
        tracks,
    })
}

fn minorize_track<'a>(track: &Track<'a>, target_pc: u8, onset_tick: u64) -> Track<'a> {
    let marks = marked_events(track, target_pc, onset_tick);

    track
        .iter()
        .enumerate()
        .map(|(index, event)| if marks[index] { lowered(event) } else { *event })
        .collect()
}

/// Pair the track's target-pitch-class boundaries first-in first-out
/// per (channel, pitch) and mark the pairs whose Off lands strictly
/// after the onset. An On left unpaired at end of track never closes,
/// so it counts as sounding past the onset too.
fn marked_events(track: &Track, target_pc: u8, onset_tick: u64) -> Vec<bool> {
    let mut marks = vec![false; track.len()];
    let mut pending: HashMap<(u8, u8), Vec<usize>> = HashMap::new();
    let mut current_tick = 0u64;

    for (index, event) in track.iter().enumerate() {
        current_tick += u64::from(event.delta.as_int());

        let (kind, channel, pitch) = match event.kind {
            TrackEventKind::Midi { channel, message } => match note_boundary(&message) {
                Some((kind, pitch, _)) => (kind, channel.as_int(), pitch),
                None => continue,
            },
            _ => continue,
        };
        if pitch % 12 != target_pc {
            continue;
        }

        match kind {
            NoteKind::On => pending.entry((channel, pitch)).or_default().push(index),
            NoteKind::Off => {
                if let Some(queue) = pending.get_mut(&(channel, pitch)) {
                    if !queue.is_empty() {
                        let on_index = queue.remove(0);
                        if current_tick > onset_tick {
                            marks[on_index] = true;
                            marks[index] = true;
                        }
                    }
                }
            }
        }
    }

    for queue in pending.values() {
        for &on_index in queue {
            marks[on_index] = true;
        }
    }

    marks
}

/// Copy of a note event with its pitch lowered one semitone
fn lowered<'a>(event: &TrackEvent<'a>) -> TrackEvent<'a> {
    let kind = match event.kind {
        TrackEventKind::Midi { channel, message } => {
            let message = match message {
                MidiMessage::NoteOn { key, vel } if key.as_int() > 0 => MidiMessage::NoteOn {
                    key: (key.as_int() - 1).into(),
                    vel,
                },
                MidiMessage::NoteOff { key, vel } if key.as_int() > 0 => MidiMessage::NoteOff {
                    key: (key.as_int() - 1).into(),
                    vel,
                },
                other => other,
            };
            TrackEventKind::Midi { channel, message }
        }
        other => other,
    };

    TrackEvent {
        delta: event.delta,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::{Format, Header, Timing};

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
            kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
        }
    }

    /// Collect (kind, pitch, velocity) for every note boundary
    fn note_list(track: &Track) -> Vec<(NoteKind, u8, u8)> {
        track
            .iter()
            .filter_map(|event| match event.kind {
                TrackEventKind::Midi { message, .. } => note_boundary(&message),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_final_major_chord_gets_minor_third() {
        // C major held for two beats at 4 ticks per beat
        let track = vec![
            on(0, 60, 90),
            on(0, 64, 85),
            on(0, 67, 80),
            off(8, 60),
            off(0, 64),
            off(0, 67),
            end_of_track(0),
        ];
        let smf = metrical_smf(4, vec![track]);

        let out = minorize_final_dominant(&smf).unwrap();
        let notes = note_list(&out.tracks[0]);

        assert_eq!(
            notes,
            vec![
                (NoteKind::On, 60, 90),
                (NoteKind::On, 63, 85),
                (NoteKind::On, 67, 80),
                (NoteKind::Off, 60, 0),
                (NoteKind::Off, 63, 0),
                (NoteKind::Off, 67, 0),
            ]
        );
    }

    #[test]
    fn test_minor_final_chord_is_untouched() {
        let track = vec![
            on(0, 60, 90),
            on(0, 63, 85),
            on(0, 67, 80),
            off(8, 60),
            off(0, 63),
            off(0, 67),
            end_of_track(0),
        ];
        let smf = metrical_smf(4, vec![track.clone()]);

        let out = minorize_final_dominant(&smf).unwrap();
        assert_eq!(out.tracks, smf.tracks);
    }

    #[test]
    fn test_earlier_thirds_are_left_alone() {
        // an E that ends before the final chord begins stays put
        let track = vec![
            on(0, 64, 70),
            off(4, 64),
            on(0, 60, 90),
            on(0, 64, 85),
            on(0, 67, 80),
            off(8, 60),
            off(0, 64),
            off(0, 67),
            end_of_track(0),
        ];
        let smf = metrical_smf(4, vec![track]);

        let out = minorize_final_dominant(&smf).unwrap();
        let notes = note_list(&out.tracks[0]);

        assert_eq!(notes[0], (NoteKind::On, 64, 70));
        assert_eq!(notes[1], (NoteKind::Off, 64, 0));
        assert!(notes.contains(&(NoteKind::On, 63, 85)));
        assert!(!notes.contains(&(NoteKind::On, 64, 85)));
    }

    #[test]
    fn test_deltas_are_preserved() {
        let track = vec![
            on(0, 60, 90),
            on(2, 64, 85),
            on(1, 67, 80),
            off(5, 60),
            off(0, 64),
            off(0, 67),
            end_of_track(0),
        ];
        let smf = metrical_smf(4, vec![track]);

        let out = minorize_final_dominant(&smf).unwrap();
        let deltas: Vec<u32> = out.tracks[0].iter().map(|e| e.delta.as_int()).collect();
        assert_eq!(deltas, vec![0, 2, 1, 5, 0, 0, 0]);
    }

    #[test]
    fn test_silent_file_is_a_no_op() {
        let smf = metrical_smf(4, vec![vec![end_of_track(0)]]);
        let out = minorize_final_dominant(&smf).unwrap();
        assert_eq!(out.tracks, smf.tracks);
    }
}
