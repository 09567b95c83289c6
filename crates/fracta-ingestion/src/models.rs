//! Data models for the analysis pipeline.

use serde::{Deserialize, Serialize};

/// Outcome of analysing one PDF, as printed on stdout.
///
/// Field order is the JSON key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub pdf: String,
    pub region: String,
    pub region_score: u32,
    pub fracture_types: Vec<String>,
    pub locations: Vec<String>,
    pub abstract_summary: String,
    pub conclusion_summary: String,
    pub db_id: i64,
}

/// Where the final abstract / conclusion text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionSource {
    Regex,
    Llm,
    Missing,
}

impl SectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionSource::Regex    => "regex",
            SectionSource::Llm      => "llm",
            SectionSource::Missing  => "missing",
        }
    }
}
