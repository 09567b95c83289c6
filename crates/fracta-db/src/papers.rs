//! Paper repository.
//!
//! Insert and read back analysed papers.

use std::sync::Arc;

use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use crate::database::Database;
use crate::error::Result;
use crate::schema::{join_list, split_list, NewPaper, PaperRecord, PaperRow};

/// Repository for paper operations.
#[derive(Clone)]
pub struct PaperRepository {
    db: Arc<Database>,
}

impl PaperRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a paper and return its row id.
    pub fn insert(&self, paper: &NewPaper) -> Result<i64> {
        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO papers (
                filename, pdf_path, raw_text, abstract_text, conclusion_text,
                region, region_score, fracture_types, locations,
                abstract_summary, conclusion_summary
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                paper.filename,
                paper.pdf_path,
                paper.raw_text,
                paper.abstract_text,
                paper.conclusion_text,
                paper.region,
                paper.region_score,
                join_list(&paper.fracture_types),
                join_list(&paper.locations),
                paper.abstract_summary,
                paper.conclusion_summary,
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(id, filename = %paper.filename, region = %paper.region, "Paper stored");
        Ok(id)
    }

    /// Find a paper by row id.
    pub fn find_by_id(&self, id: i64) -> Result<Option<PaperRecord>> {
        let conn = self.db.connection()?;
        let record = conn
            .query_row(
                "SELECT id, filename, pdf_path, raw_text, abstract_text, conclusion_text,
                        region, region_score, fracture_types, locations,
                        abstract_summary, conclusion_summary, created_at
                 FROM papers WHERE id = ?1",
                [id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Most recent papers first.
    pub fn list(&self, limit: usize) -> Result<Vec<PaperRow>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, filename, region, region_score, fracture_types, locations, created_at
             FROM papers ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok(PaperRow {
                    id: row.get(0)?,
                    filename: row.get(1)?,
                    region: row.get(2)?,
                    region_score: row.get(3)?,
                    fracture_types: split_list(row.get(4)?),
                    locations: split_list(row.get(5)?),
                    created_at: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.db.connection()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM papers", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<PaperRecord> {
    Ok(PaperRecord {
        id: row.get(0)?,
        filename: row.get(1)?,
        pdf_path: row.get(2)?,
        raw_text: row.get(3)?,
        abstract_text: row.get(4)?,
        conclusion_text: row.get(5)?,
        region: row.get(6)?,
        region_score: row.get(7)?,
        fracture_types: split_list(row.get(8)?),
        locations: split_list(row.get(9)?),
        abstract_summary: row.get(10)?,
        conclusion_summary: row.get(11)?,
        created_at: row.get(12)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> PaperRepository {
        PaperRepository::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    fn sample(name: &str) -> NewPaper {
        NewPaper {
            filename: name.to_string(),
            pdf_path: format!("/papers/{name}"),
            raw_text: "Full text".to_string(),
            abstract_text: "Abstract body".to_string(),
            conclusion_text: "Conclusion body".to_string(),
            region: "pelvis".to_string(),
            region_score: 7,
            fracture_types: vec!["comminuted".to_string(), "displaced".to_string()],
            locations: vec!["left".to_string(), "posterior".to_string()],
            abstract_summary: "Short abstract summary".to_string(),
            conclusion_summary: "Short conclusion summary".to_string(),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let repo = repo();
        let id = repo.insert(&sample("a.pdf")).unwrap();
        assert_eq!(id, 1);

        let rec = repo.find_by_id(id).unwrap().expect("stored paper");
        assert_eq!(rec.filename, "a.pdf");
        assert_eq!(rec.pdf_path, "/papers/a.pdf");
        assert_eq!(rec.region.as_deref(), Some("pelvis"));
        assert_eq!(rec.region_score, Some(7));
        assert_eq!(rec.fracture_types, vec!["comminuted", "displaced"]);
        assert_eq!(rec.locations, vec!["left", "posterior"]);
        assert!(rec.created_at.is_some());
    }

    #[test]
    fn test_empty_lists_round_trip_as_empty() {
        let repo = repo();
        let mut paper = sample("b.pdf");
        paper.fracture_types.clear();
        paper.locations.clear();
        let id = repo.insert(&paper).unwrap();
        let rec = repo.find_by_id(id).unwrap().unwrap();
        assert!(rec.fracture_types.is_empty());
        assert!(rec.locations.is_empty());
    }

    #[test]
    fn test_find_missing_returns_none() {
        assert!(repo().find_by_id(42).unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first_with_limit() {
        let repo = repo();
        for name in ["one.pdf", "two.pdf", "three.pdf"] {
            repo.insert(&sample(name)).unwrap();
        }
        assert_eq!(repo.count().unwrap(), 3);

        let rows = repo.list(2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].filename, "three.pdf");
        assert_eq!(rows[1].filename, "two.pdf");
    }
}
