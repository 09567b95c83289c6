//! fracta-llm: LLM backend abstraction and the two generation tasks
//! Fracta delegates to a model:
//! - section extraction fallback (Abstract / Conclusion)
//! - summarization of the key sections

pub mod backend;
pub mod router;
pub mod audit;
pub mod extraction;
pub mod summarize;

pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message};
pub use extraction::{ExtractionConfig, LlmSectionExtractor};
pub use router::{build_router, BackendConfig, BackendKind, LlmRouter, RoutingPolicy};
pub use summarize::{SummaryConfig, SummaryEngine, Summarizer};
