// Analysis pipeline
// Per-file harmonic analysis and batch cadence cutting

use log::{info, warn};
use midly::Smf;
use thiserror::Error;

use crate::cadence::{find_cadences, split_by_strength, FunctionSample};
use crate::harmony::{classify, FunctionResolver, KeyAnalyzer};
use crate::report::{parse_strong_cadence_ticks, AnalysisReport, ReportRow};
use crate::stream::{from_bytes, StreamError};
use crate::surgery::cut_at_sixteenth;
use crate::timeline::sample_sixteenths;

/// Minimum sounding pitches required at every subdivision
pub const MIN_POLYPHONY: usize = 3;

/// Errors that reject a file from analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("malformed header: missing or zero ticks-per-beat resolution")]
    MalformedHeader,

    #[error("failed to parse MIDI data: {0}")]
    InvalidMidi(midly::Error),

    #[error("subdivision {subdivision} has {count} sounding pitches, need at least 3")]
    InsufficientPolyphony { subdivision: usize, count: usize },

    #[error("detected a minor key; file skipped")]
    MinorKey,

    #[error("subdivision {subdivision} is silent")]
    SilenceEncountered { subdivision: usize },
}

impl From<StreamError> for AnalysisError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::MalformedHeader => AnalysisError::MalformedHeader,
            StreamError::InvalidMidi(source) => AnalysisError::InvalidMidi(source),
        }
    }
}

/// Run the full harmonic analysis over one file's bytes.
///
/// Stages, first failure short-circuiting the rest: parse and merge the
/// event stream, sample the sixteenth timeline, reject silent or thin
/// subdivisions, detect the key and skip minor pieces, classify every
/// subdivision, resolve function labels, detect cadences.
///
/// Row ticks count subdivisions, the unit the cadence detector and the
/// batch cutter work in.
pub fn analyze(
    bytes: &[u8],
    source: &str,
    key_analyzer: &dyn KeyAnalyzer,
    resolver: &dyn FunctionResolver,
) -> Result<AnalysisReport, AnalysisError> {
    let stream = from_bytes(bytes)?;
    let timeline = sample_sixteenths(&stream);

    for snapshot in &timeline {
        if snapshot.pitches.is_empty() {
            warn!("{}: subdivision {} is silent, rejecting", source, snapshot.index);
            return Err(AnalysisError::SilenceEncountered {
                subdivision: snapshot.index,
            });
        }
        if snapshot.pitches.len() < MIN_POLYPHONY {
            warn!(
                "{}: subdivision {} has only {} sounding pitches, rejecting",
                source,
                snapshot.index,
                snapshot.pitches.len()
            );
            return Err(AnalysisError::InsufficientPolyphony {
                subdivision: snapshot.index,
                count: snapshot.pitches.len(),
            });
        }
    }

    let key = match key_analyzer.detect_key(&timeline) {
        Some(key) => key,
        None => {
            warn!("{}: no sounding pitches to detect a key from", source);
            return Err(AnalysisError::SilenceEncountered { subdivision: 0 });
        }
    };
    if key.is_minor() {
        info!("{}: detected {}, skipping minor keys", source, key);
        return Err(AnalysisError::MinorKey);
    }

    let mut rows = Vec::with_capacity(timeline.len());
    let mut samples = Vec::with_capacity(timeline.len());
    for snapshot in &timeline {
        let label = match classify(&snapshot.pitches) {
            Some(label) => label,
            None => {
                return Err(AnalysisError::SilenceEncountered {
                    subdivision: snapshot.index,
                })
            }
        };
        let function = resolver.resolve(&label, &key);
        let tick = snapshot.index as u64;
        samples.push(FunctionSample::new(tick, function.clone()));
        rows.push(ReportRow {
            tick,
            chord: label.name(),
            function,
        });
    }

    let cadences = find_cadences(&samples);
    let (strong, regular) = split_by_strength(&cadences);
    info!(
        "{}: {} subdivisions in {}, {} strong / {} regular cadences",
        source,
        rows.len(),
        key,
        strong.len(),
        regular.len()
    );

    Ok(AnalysisReport {
        source: source.to_string(),
        key,
        rows,
        strong,
        regular,
    })
}

/// Cut a source file once per strong cadence listed in a report.
///
/// Returns (subdivision, truncated file) pairs. An empty or missing
/// cadence list is a logged no-op; a cut that fails is logged and
/// skipped without aborting the remaining cuts.
pub fn cut_at_cadences<'a>(smf: &Smf<'a>, report_text: &str) -> Vec<(u64, Smf<'a>)> {
    let subdivisions = parse_strong_cadence_ticks(report_text);
    if subdivisions.is_empty() {
        warn!("no strong cadences listed, nothing to cut");
        return Vec::new();
    }

    let mut cuts = Vec::with_capacity(subdivisions.len());
    for subdivision in subdivisions {
        match cut_at_sixteenth(smf, subdivision as usize) {
            Ok(truncated) => cuts.push((subdivision, truncated)),
            Err(err) => warn!("skipping cut at subdivision {}: {}", subdivision, err),
        }
    }
    cuts
}
