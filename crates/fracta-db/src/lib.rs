//! Fracta Database Layer
//!
//! Embedded SQLite storage for analysed papers. One row per analysed PDF
//! in the `papers` table; the file is opened in WAL mode.
//!
//! # Example
//!
//! ```rust,no_run
//! use fracta_db::{Database, NewPaper, PaperRepository};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Arc::new(Database::open("db/papers.sqlite")?);
//!     let papers = PaperRepository::new(db);
//!     println!("{} papers stored", papers.count()?);
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod schema;
pub mod papers;

pub use database::Database;
pub use error::{DbError, Result};
pub use schema::{NewPaper, PaperRecord, PaperRow, TABLE_PAPERS};
pub use papers::PaperRepository;
