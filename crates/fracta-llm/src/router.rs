//! LLM router: picks the backend for a request according to the
//! configured policy and records an audit entry per call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::audit::LlmAuditEntry;
use crate::backend::{
    AnthropicBackend, LlmBackend, LlmError, LlmRequest, LlmResponse, OllamaBackend,
    OpenAiBackend, OpenAiCompatibleBackend,
};

/// Routing policy controlling which backend serves requests.
#[derive(Debug, Clone)]
pub struct RoutingPolicy {
    /// If true, every call must go to a local backend.
    pub local_only_mode: bool,
    /// Preferred backend name.
    pub default_backend: String,
    /// Local backend name (used in local-only mode and as fallback).
    pub local_backend: String,
    /// Emit an audit event for every completed call.
    pub audit: bool,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            local_only_mode: true,
            default_backend: "ollama".to_string(),
            local_backend: "ollama".to_string(),
            audit: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Ollama,
    OpenAi,
    OpenAiCompatible,
    Anthropic,
}

/// Everything needed to construct one backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub name: String,
    pub kind: BackendKind,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

pub struct LlmRouter {
    backends: HashMap<String, Arc<dyn LlmBackend>>,
    policy: RoutingPolicy,
}

impl LlmRouter {
    pub fn new(policy: RoutingPolicy) -> Self {
        Self { backends: HashMap::new(), policy }
    }

    pub fn register_backend(&mut self, name: impl Into<String>, backend: Arc<dyn LlmBackend>) {
        self.backends.insert(name.into(), backend);
    }

    pub fn registered_backends(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Execute `req` on the selected backend. `task` labels the audit
    /// entry, which is written for failed and blocked calls as well.
    pub async fn route(&self, task: &str, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let (name, backend) = match self.select_backend() {
            Ok(selected) => selected,
            Err(e) => {
                if self.policy.audit {
                    LlmAuditEntry::failed(task, self.requested_backend(), "", false, &e, 0).emit();
                }
                return Err(e);
            }
        };

        tracing::debug!(
            task,
            backend = name,
            model = backend.model_id(),
            is_local = backend.is_local(),
            "LLM request routed"
        );

        let started = Instant::now();
        let result = backend.complete(req).await;

        if self.policy.audit {
            let latency_ms = started.elapsed().as_millis() as u64;
            let entry = match &result {
                Ok(resp) => LlmAuditEntry::new(task, name, backend.is_local(), resp, latency_ms),
                Err(e) => LlmAuditEntry::failed(
                    task, name, backend.model_id(), backend.is_local(), e, latency_ms,
                ),
            };
            entry.emit();
        }
        result
    }

    /// Backend the policy asks for, whether or not it is registered.
    fn requested_backend(&self) -> &str {
        if self.policy.local_only_mode {
            &self.policy.local_backend
        } else {
            &self.policy.default_backend
        }
    }

    fn select_backend(&self) -> Result<(&str, &Arc<dyn LlmBackend>), LlmError> {
        if self.policy.local_only_mode {
            let (name, b) = self.backends.get_key_value(&self.policy.local_backend)
                .ok_or_else(|| LlmError::Unavailable(format!(
                    "local backend '{}' not configured", self.policy.local_backend
                )))?;
            if !b.is_local() {
                return Err(LlmError::PolicyBlocked(format!(
                    "backend '{}' is remote but local-only mode is active", name
                )));
            }
            return Ok((name.as_str(), b));
        }

        self.backends.get_key_value(&self.policy.default_backend)
            .or_else(|| self.backends.get_key_value(&self.policy.local_backend))
            .map(|(name, b)| (name.as_str(), b))
            .ok_or_else(|| LlmError::Unavailable(format!(
                "neither '{}' nor '{}' backend is configured",
                self.policy.default_backend, self.policy.local_backend
            )))
    }
}

/// Construct backends from configs and register them under their names.
pub fn build_router(configs: Vec<BackendConfig>, policy: RoutingPolicy) -> LlmRouter {
    let mut router = LlmRouter::new(policy);

    for cfg in configs {
        let backend: Arc<dyn LlmBackend> = match cfg.kind {
            BackendKind::Ollama => Arc::new(OllamaBackend::new(
                cfg.base_url.unwrap_or_else(|| "http://localhost:11434".to_string()),
                cfg.model,
                cfg.timeout,
            )),
            BackendKind::OpenAi => Arc::new(OpenAiBackend::new(
                cfg.api_key.unwrap_or_default(),
                cfg.model,
                cfg.timeout,
            )),
            BackendKind::OpenAiCompatible => Arc::new(OpenAiCompatibleBackend::new(
                cfg.base_url.unwrap_or_else(|| "http://localhost:1234".to_string()),
                cfg.model,
                cfg.api_key,
                cfg.timeout,
            )),
            BackendKind::Anthropic => Arc::new(AnthropicBackend::new(
                cfg.api_key.unwrap_or_default(),
                cfg.model,
                cfg.timeout,
            )),
        };
        tracing::debug!(name = %cfg.name, kind = ?cfg.kind, "Registered LLM backend");
        router.register_backend(cfg.name, backend);
    }

    router
}
