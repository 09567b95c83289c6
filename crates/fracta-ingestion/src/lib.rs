//! fracta-ingestion: Single-paper analysis pipeline.
//! - PDF text extraction
//! - Abstract / Conclusion section extraction (regex, then LLM fallback)
//! - Keyword classification and section summaries
//! - Persistence of the analysed paper

pub mod models;
pub mod pdf_parser;
pub mod sections;
pub mod pipeline;

pub use models::AnalysisReport;
pub use pipeline::{PaperPipeline, PipelineConfig};
