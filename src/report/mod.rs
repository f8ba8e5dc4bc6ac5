// Report module
// Textual analysis reports and their parser

pub mod text;

pub use text::{parse_function_samples, parse_strong_cadence_ticks, AnalysisReport, ReportRow};
