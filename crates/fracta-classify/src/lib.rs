//! fracta-classify: Rule-based fracture classification.
//!
//! Scores a paper against fixed clinical keyword dictionaries:
//! - anatomical region (single label, highest count wins)
//! - fracture type (multi-label)
//! - location descriptors (side / zone conflicts resolved, top 3)

pub mod keywords;
pub mod counter;
pub mod classifier;

pub use classifier::{classify_by_keywords, Classification, KeywordClassifier, UNKNOWN_REGION};
pub use counter::KeywordCounter;
