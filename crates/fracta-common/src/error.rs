use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FractaError {
    #[error("PDF not found: {0}")]
    PdfNotFound(PathBuf),

    #[error("PDF parse error: {0}")]
    PdfParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FractaError>;
