//! Schema and row types for the `papers` table.

use serde::{Deserialize, Serialize};

pub const TABLE_PAPERS: &str = "papers";

pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS papers (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  filename TEXT NOT NULL,
  pdf_path TEXT NOT NULL,
  raw_text TEXT,
  abstract_text TEXT,
  conclusion_text TEXT,
  region TEXT,
  region_score INTEGER,
  fracture_types TEXT,
  locations TEXT,
  abstract_summary TEXT,
  conclusion_summary TEXT,
  created_at TEXT DEFAULT (datetime('now'))
);
";

/// A paper ready to be inserted. Lists are stored comma-joined.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPaper {
    pub filename: String,
    pub pdf_path: String,
    pub raw_text: String,
    pub abstract_text: String,
    pub conclusion_text: String,
    pub region: String,
    pub region_score: u32,
    pub fracture_types: Vec<String>,
    pub locations: Vec<String>,
    pub abstract_summary: String,
    pub conclusion_summary: String,
}

/// A stored paper with every column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperRecord {
    pub id: i64,
    pub filename: String,
    pub pdf_path: String,
    pub raw_text: Option<String>,
    pub abstract_text: Option<String>,
    pub conclusion_text: Option<String>,
    pub region: Option<String>,
    pub region_score: Option<u32>,
    pub fracture_types: Vec<String>,
    pub locations: Vec<String>,
    pub abstract_summary: Option<String>,
    pub conclusion_summary: Option<String>,
    pub created_at: Option<String>,
}

/// Listing row: classification and timestamps, no text bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperRow {
    pub id: i64,
    pub filename: String,
    pub region: Option<String>,
    pub region_score: Option<u32>,
    pub fracture_types: Vec<String>,
    pub locations: Vec<String>,
    pub created_at: Option<String>,
}

pub(crate) fn join_list(items: &[String]) -> String {
    items.join(",")
}

pub(crate) fn split_list(stored: Option<String>) -> Vec<String> {
    stored
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
