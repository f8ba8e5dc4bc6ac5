// Run-length compression of function-label timelines

use serde::{Deserialize, Serialize};

/// One sampled (tick, function label) pair at subdivision resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSample {
    /// Subdivision tick the sample was taken at
    pub tick: u64,

    /// Harmonic function label, e.g. "V7"
    pub label: String,
}

impl FunctionSample {
    pub fn new(tick: u64, label: impl Into<String>) -> Self {
        FunctionSample {
            tick,
            label: label.into(),
        }
    }
}

/// A maximal run of identical consecutive labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarmonicEvent {
    /// The shared label of the run
    pub label: String,

    /// Tick of the run's first sample
    pub start_tick: u64,

    /// Run length in subdivisions; the final run counts its last
    /// sample inclusively
    pub duration_ticks: u64,
}

/// Merge consecutive samples with identical labels into runs.
///
/// Each run's duration is the gap to the next run's start; the final
/// run has no successor and spans `last_tick - start_tick + 1`.
pub fn compress_runs(samples: &[FunctionSample]) -> Vec<HarmonicEvent> {
    let first = match samples.first() {
        Some(sample) => sample,
        None => return Vec::new(),
    };

    let mut events = Vec::new();
    let mut run_label = first.label.clone();
    let mut run_start = first.tick;
    let mut last_tick = first.tick;

    for sample in &samples[1..] {
        if sample.label != run_label {
            events.push(HarmonicEvent {
                label: run_label,
                start_tick: run_start,
                duration_ticks: sample.tick - run_start,
            });
            run_label = sample.label.clone();
            run_start = sample.tick;
        }
        last_tick = sample.tick;
    }

    events.push(HarmonicEvent {
        label: run_label,
        start_tick: run_start,
        duration_ticks: last_tick - run_start + 1,
    });
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(labels: &[&str]) -> Vec<FunctionSample> {
        labels
            .iter()
            .enumerate()
            .map(|(tick, label)| FunctionSample::new(tick as u64, *label))
            .collect()
    }

    /// Expand runs back into one label per subdivision
    fn expand(events: &[HarmonicEvent]) -> Vec<String> {
        let mut labels = Vec::new();
        for event in events {
            for _ in 0..event.duration_ticks {
                labels.push(event.label.clone());
            }
        }
        labels
    }

    #[test]
    fn test_empty_input() {
        assert!(compress_runs(&[]).is_empty());
    }

    #[test]
    fn test_single_run() {
        let events = compress_runs(&samples(&["I", "I", "I"]));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start_tick, 0);
        assert_eq!(events[0].duration_ticks, 3);
    }

    #[test]
    fn test_runs_and_durations() {
        let events = compress_runs(&samples(&["V", "V", "I", "I", "I", "ii"]));
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].label, "V");
        assert_eq!(events[0].duration_ticks, 2);
        assert_eq!(events[1].label, "I");
        assert_eq!(events[1].start_tick, 2);
        assert_eq!(events[1].duration_ticks, 3);
        assert_eq!(events[2].label, "ii");
        assert_eq!(events[2].start_tick, 5);
        assert_eq!(events[2].duration_ticks, 1);
    }

    #[test]
    fn test_round_trip_reproduces_timeline() {
        let labels = ["I", "I", "IV", "V", "V", "V", "I", "I"];
        let events = compress_runs(&samples(&labels));
        let expanded = expand(&events);
        assert_eq!(expanded, labels.to_vec());
    }

    #[test]
    fn test_alternating_labels() {
        let events = compress_runs(&samples(&["I", "V", "I", "V"]));
        assert_eq!(events.len(), 4);
        for event in &events[..3] {
            assert_eq!(event.duration_ticks, 1);
        }
        assert_eq!(events[3].duration_ticks, 1);
    }
}
