//! Audit records for LLM calls.
//!
//! Entries are emitted as structured `tracing` events on the
//! `fracta::audit` target; the raw output is never logged, only its hash.
//! Failed and policy-blocked calls are recorded too, with the error
//! instead of a hash.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::backend::LlmError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAuditEntry {
    pub id: Uuid,
    pub task: String,
    pub model: String,
    pub backend: String,
    pub is_local: bool,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub output_hash: Option<String>,
    pub error: Option<String>,
    pub latency_ms: u64,
    pub called_at: chrono::DateTime<Utc>,
}

impl LlmAuditEntry {
    pub fn new(
        task: &str,
        backend: &str,
        is_local: bool,
        response: &crate::backend::LlmResponse,
        latency_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task: task.to_string(),
            model: response.model.clone(),
            backend: backend.to_string(),
            is_local,
            prompt_tokens: response.prompt_tokens,
            completion_tokens: response.completion_tokens,
            output_hash: Some(sha256_hex(&response.content)),
            error: None,
            latency_ms,
            called_at: Utc::now(),
        }
    }

    /// A call that produced no response. `model` is empty when no
    /// backend was selected.
    pub fn failed(
        task: &str,
        backend: &str,
        model: &str,
        is_local: bool,
        error: &LlmError,
        latency_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task: task.to_string(),
            model: model.to_string(),
            backend: backend.to_string(),
            is_local,
            prompt_tokens: 0,
            completion_tokens: 0,
            output_hash: None,
            error: Some(error.to_string()),
            latency_ms,
            called_at: Utc::now(),
        }
    }

    pub fn emit(&self) {
        match &self.error {
            None => tracing::info!(
                target: "fracta::audit",
                id = %self.id,
                task = %self.task,
                model = %self.model,
                backend = %self.backend,
                is_local = self.is_local,
                prompt_tokens = self.prompt_tokens,
                completion_tokens = self.completion_tokens,
                output_hash = self.output_hash.as_deref().unwrap_or(""),
                latency_ms = self.latency_ms,
                "LLM call"
            ),
            Some(error) => tracing::info!(
                target: "fracta::audit",
                id = %self.id,
                task = %self.task,
                model = %self.model,
                backend = %self.backend,
                is_local = self.is_local,
                error = %error,
                latency_ms = self.latency_ms,
                "LLM call failed"
            ),
        }
    }
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
