//! Configuration loading for Fracta.
//! Reads fracta.toml from the current directory or the path in FRACTA_CONFIG.
//! A missing file is not an error: every field has a default.

use serde::{Deserialize, Serialize};
use std::path::Path;

use fracta_ingestion::PipelineConfig;
use fracta_llm::{ExtractionConfig, SummaryConfig};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub extraction: ExtractionSettings,
    #[serde(default)]
    pub summary: SummarySettings,
    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_db_path() }
    }
}

fn default_db_path() -> String { "db/papers.sqlite".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "local_only" | "remote" | "disabled"
    #[serde(default = "default_llm_mode")]
    pub mode: String,
    #[serde(default = "default_backend_name")]
    pub default_backend: String,
    #[serde(default = "default_backend_name")]
    pub local_backend: String,
    #[serde(default = "default_ollama")]
    pub ollama: Option<OllamaConfig>,
    pub openai: Option<ApiBackendConfig>,
    pub anthropic: Option<ApiBackendConfig>,
    pub openai_compatible: Option<CompatBackendConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            mode: default_llm_mode(),
            default_backend: default_backend_name(),
            local_backend: default_backend_name(),
            ollama: default_ollama(),
            openai: None,
            anthropic: None,
            openai_compatible: None,
        }
    }
}

/// Accepted values of `llm.mode`.
pub const LLM_MODES: [&str; 3] = ["local_only", "remote", "disabled"];

impl LlmConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !LLM_MODES.contains(&self.mode.as_str()) {
            anyhow::bail!(
                "Invalid llm.mode {:?}: expected one of {}",
                self.mode,
                LLM_MODES.join(", ")
            );
        }
        Ok(())
    }

    pub fn is_disabled(&self) -> bool {
        self.mode == "disabled"
    }

    pub fn is_local_only(&self) -> bool {
        self.mode == "local_only"
    }
}

fn default_llm_mode()     -> String { "local_only".to_string() }
fn default_backend_name() -> String { "ollama".to_string() }
fn default_ollama()       -> Option<OllamaConfig> { Some(OllamaConfig::default()) }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_ollama_url()   -> String { "http://localhost:11434".to_string() }
fn default_ollama_model() -> String { "llama3.1:8b".to_string() }
fn default_timeout_secs() -> u64    { 120 }

/// Hosted provider (OpenAI, Anthropic). An empty key falls back to the
/// provider's FRACTA_*_API_KEY environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiBackendConfig {
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatBackendConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSettings {
    #[serde(default = "default_extraction_input")]
    pub max_input_tokens: usize,
    #[serde(default = "default_extraction_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_min_abstract_words")]
    pub min_abstract_words: usize,
    #[serde(default = "default_min_conclusion_words")]
    pub min_conclusion_words: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_input_tokens: default_extraction_input(),
            max_new_tokens: default_extraction_new_tokens(),
            min_abstract_words: default_min_abstract_words(),
            min_conclusion_words: default_min_conclusion_words(),
        }
    }
}

impl ExtractionSettings {
    pub fn extraction(&self) -> ExtractionConfig {
        ExtractionConfig {
            max_input_tokens: self.max_input_tokens,
            max_new_tokens: self.max_new_tokens,
        }
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            min_abstract_words: self.min_abstract_words,
            min_conclusion_words: self.min_conclusion_words,
        }
    }
}

fn default_extraction_input()      -> usize { 512 }
fn default_extraction_new_tokens() -> u32   { 220 }
fn default_min_abstract_words()    -> usize { 50 }
fn default_min_conclusion_words()  -> usize { 30 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySettings {
    #[serde(default = "default_summary_input")]
    pub max_input_tokens: usize,
    #[serde(default = "default_summary_min")]
    pub min_length: usize,
    #[serde(default = "default_summary_max")]
    pub max_length: usize,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            max_input_tokens: default_summary_input(),
            min_length: default_summary_min(),
            max_length: default_summary_max(),
        }
    }
}

impl From<&SummarySettings> for SummaryConfig {
    fn from(s: &SummarySettings) -> Self {
        SummaryConfig {
            max_input_tokens: s.max_input_tokens,
            min_length: s.min_length,
            max_length: s.max_length,
        }
    }
}

fn default_summary_input() -> usize { 1024 }
fn default_summary_min()   -> usize { 150 }
fn default_summary_max()   -> usize { 200 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "bool_true")]
    pub audit_llm_calls: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { audit_llm_calls: true }
    }
}

fn bool_true() -> bool { true }

mod tests;

impl Config {
    /// Load configuration from fracta.toml.
    /// Checks FRACTA_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("FRACTA_CONFIG")
            .unwrap_or_else(|_| "fracta.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Config file not found: {}. Using defaults \
                 (copy fracta.example.toml to fracta.toml to customise).",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.llm.validate()?;
        Ok(config)
    }
}
