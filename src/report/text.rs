// Analysis report rendering and parsing
// The textual interchange format for per-subdivision harmonic analyses

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cadence::FunctionSample;
use crate::harmony::Key;

/// One subdivision row of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Subdivision tick
    pub tick: u64,

    /// Rendered chord name, e.g. "G7"
    pub chord: String,

    /// Harmonic function label, e.g. "V7"
    pub function: String,
}

/// A complete harmonic analysis of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Path or name of the analyzed file
    pub source: String,

    /// Detected key
    pub key: Key,

    /// One row per subdivision
    pub rows: Vec<ReportRow>,

    /// Ticks of strong cadences, in order
    pub strong: Vec<u64>,

    /// Ticks of regular cadences, in order
    pub regular: Vec<u64>,
}

impl AnalysisReport {
    /// Render the report to its textual form: a header block, one
    /// tab-separated row per subdivision, and the two cadence trailers.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("File: {}\n", self.source));
        out.push_str("Format: MIDI\n");
        out.push_str(&format!("Key: {}\n\n", self.key));
        out.push_str("tick\tchord\tfunction\n");
        for row in &self.rows {
            out.push_str(&format!("{}\t{}\t{}\n", row.tick, row.chord, row.function));
        }
        out.push_str(&format!("Strong Cadences: {}\n", render_tick_list(&self.strong)));
        out.push_str(&format!("Regular Cadences: {}\n", render_tick_list(&self.regular)));
        out
    }

    /// Persist the rendered report. Rendering happens fully in memory,
    /// so a failed analysis never leaves a partial file behind.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.render())
    }
}

fn render_tick_list(ticks: &[u64]) -> String {
    let fields: Vec<String> = ticks.iter().map(u64::to_string).collect();
    format!("[{}]", fields.join(", "))
}

/// Extract (tick, function label) samples from report text.
///
/// A line counts as a row when its first tab field parses as an
/// integer; header lines, blanks, and trailers all fail that test and
/// are skipped.
pub fn parse_function_samples(text: &str) -> Vec<FunctionSample> {
    let mut samples = Vec::new();
    for line in text.lines() {
        let mut fields = line.split('\t');
        let tick = match fields.next().and_then(|field| field.trim().parse::<u64>().ok()) {
            Some(tick) => tick,
            None => continue,
        };
        let function = match fields.nth(1) {
            Some(function) => function.trim().to_string(),
            None => continue,
        };
        samples.push(FunctionSample::new(tick, function));
    }
    samples
}

/// Extract the strong-cadence tick list from report text.
///
/// Reads the bracketed list on the "Strong Cadences:" trailer line; a
/// missing trailer or empty list yields an empty vec.
pub fn parse_strong_cadence_ticks(text: &str) -> Vec<u64> {
    for line in text.lines() {
        if line.starts_with("Strong Cadences:") {
            return parse_tick_list(line);
        }
    }
    Vec::new()
}

fn parse_tick_list(line: &str) -> Vec<u64> {
    let open = match line.find('[') {
        Some(index) => index,
        None => return Vec::new(),
    };
    let close = match line[open..].find(']') {
        Some(offset) => open + offset,
        None => return Vec::new(),
    };
    line[open + 1..close]
        .split(',')
        .filter_map(|field| field.trim().parse::<u64>().ok())
        .collect()
}
