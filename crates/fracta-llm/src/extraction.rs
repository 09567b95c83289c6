//! LLM fallback for Abstract / Conclusion extraction.
//!
//! Used when the regex extraction yields nothing or a suspiciously short
//! section. The model only sees a bounded window of the article: the
//! first window for the abstract, the last one for the conclusion.

use std::sync::Arc;

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, instrument, warn};

use fracta_common::text::{estimate_tokens, first_paragraphs, normalize, words_for_tokens};

use crate::backend::{LlmRequest, Message};
use crate::router::LlmRouter;

pub const ABSTRACT_PROMPT: &str = "Extract ONLY the Abstract text from the scientific article. \
If no abstract exists, output EMPTY.\n\nTEXT:\n";
pub const CONCLUSION_PROMPT: &str = "Extract ONLY the Conclusion(s) text from the scientific article. \
If no conclusion exists, output EMPTY.\n\nTEXT:\n";

/// Sentinel the model is told to emit when a section is absent.
const EMPTY_MARKER: &str = "EMPTY";
/// Word budget of the first-paragraphs abstract fallback.
const FALLBACK_ABSTRACT_WORDS: usize = 180;
/// Floor on the per-chunk token budget.
const MIN_CHUNK_TOKENS: usize = 256;
/// Tokens held back for special tokens and formatting.
const TOKEN_RESERVE: usize = 32;

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Model input window in tokens (prompt + article text).
    pub max_input_tokens: usize,
    /// Generation cap per section.
    pub max_new_tokens: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { max_input_tokens: 512, max_new_tokens: 220 }
    }
}

pub struct LlmSectionExtractor {
    router: Arc<LlmRouter>,
    config: ExtractionConfig,
}

impl LlmSectionExtractor {
    pub fn new(router: Arc<LlmRouter>, config: ExtractionConfig) -> Self {
        Self { router, config }
    }

    /// Token budget left for article text once the longer prompt is accounted for.
    pub fn chunk_budget(&self) -> usize {
        let prompt_tokens = estimate_tokens(ABSTRACT_PROMPT).max(estimate_tokens(CONCLUSION_PROMPT));
        self.config
            .max_input_tokens
            .saturating_sub(prompt_tokens + TOKEN_RESERVE)
            .max(MIN_CHUNK_TOKENS)
    }

    /// Returns `(abstract, conclusion)`; either may be empty.
    /// The abstract falls back to the opening paragraphs when the model
    /// finds nothing.
    #[instrument(skip_all, fields(chars = raw_text.len()))]
    pub async fn extract(&self, raw_text: &str) -> (String, String) {
        let text = normalize(raw_text).trim().to_string();
        if text.is_empty() {
            return (String::new(), String::new());
        }

        let chunks = chunk_text(&text, self.chunk_budget());
        debug!(chunks = chunks.len(), "Prepared LLM extraction windows");

        let first = chunks.first().map(String::as_str).unwrap_or("");
        let last = chunks.last().map(String::as_str).unwrap_or("");

        let mut abstract_text = self.ask("extract_abstract", ABSTRACT_PROMPT, first).await;
        let conclusion = self.ask("extract_conclusion", CONCLUSION_PROMPT, last).await;

        if abstract_text.is_empty() {
            abstract_text = first_paragraphs(&text, FALLBACK_ABSTRACT_WORDS);
        }

        (abstract_text.trim().to_string(), conclusion.trim().to_string())
    }

    async fn ask(&self, task: &str, prompt: &str, chunk: &str) -> String {
        let req = LlmRequest::deterministic(
            vec![Message::user(format!("{prompt}{chunk}"))],
            self.config.max_new_tokens,
        );
        match self.router.route(task, req).await {
            Ok(resp) => clean_output(&resp.content),
            Err(e) => {
                warn!(task, error = %e, "LLM section extraction failed");
                String::new()
            }
        }
    }
}

/// Split text into consecutive word windows of at most `max_tokens`
/// estimated tokens. Text that already fits is returned whole.
pub fn chunk_text(text: &str, max_tokens: usize) -> Vec<String> {
    if estimate_tokens(text) <= max_tokens {
        return vec![text.to_string()];
    }
    let per_chunk = words_for_tokens(max_tokens).max(1);
    text.split_whitespace()
        .collect::<Vec<_>>()
        .chunks(per_chunk)
        .map(|words| words.join(" "))
        .filter(|c| !c.is_empty())
        .collect()
}

fn re_abstract_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^abstract\s*:\s*").expect("static regex"))
}

fn re_conclusion_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^conclusions?\s*:\s*").expect("static regex"))
}

/// Strip section labels the model likes to echo and map the EMPTY
/// sentinel to an empty string.
pub fn clean_output(text: &str) -> String {
    let text = text.trim();
    let text = re_abstract_label().replace(text, "");
    let text = text.trim();
    let text = re_conclusion_label().replace(text, "");
    let text = text.trim();
    if text.eq_ignore_ascii_case(EMPTY_MARKER) {
        return String::new();
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::tests::{router_with, ScriptedBackend};

    fn extractor(backend: Arc<ScriptedBackend>) -> LlmSectionExtractor {
        LlmSectionExtractor::new(Arc::new(router_with(backend)), ExtractionConfig::default())
    }

    #[test]
    fn test_clean_output_strips_labels() {
        assert_eq!(clean_output("  Abstract: The study..."), "The study...");
        assert_eq!(clean_output("CONCLUSIONS : Fixation works."), "Fixation works.");
        assert_eq!(clean_output("empty"), "");
        assert_eq!(clean_output("EMPTY\n"), "");
    }

    #[test]
    fn test_chunk_budget_has_floor() {
        let b = Arc::new(ScriptedBackend::new(vec![]));
        let ex = LlmSectionExtractor::new(
            Arc::new(router_with(b)),
            ExtractionConfig { max_input_tokens: 100, max_new_tokens: 10 },
        );
        assert_eq!(ex.chunk_budget(), MIN_CHUNK_TOKENS);
    }

    #[test]
    fn test_chunk_text_splits_long_input() {
        let text = "word ".repeat(1000);
        let chunks = chunk_text(&text, 256);
        assert_eq!(chunks.len(), 6); // 192 words per chunk
        assert!(chunks.iter().all(|c| c.split_whitespace().count() <= 192));
        assert_eq!(chunk_text("short", 256), vec!["short".to_string()]);
    }

    #[tokio::test]
    async fn test_extract_uses_first_and_last_windows() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("Abstract: Opening summary of the study."),
            Ok("Conclusion: Surgery improved outcomes."),
        ]));
        let ex = extractor(backend.clone());
        let text = format!("START {} END", "filler ".repeat(800));

        let (abs, conc) = ex.extract(&text).await;
        assert_eq!(abs, "Opening summary of the study.");
        assert_eq!(conc, "Surgery improved outcomes.");

        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].starts_with(ABSTRACT_PROMPT));
        assert!(prompts[0].contains("START"));
        assert!(!prompts[0].contains("END"));
        assert!(prompts[1].contains("END"));
        assert!(!prompts[1].contains("START"));
    }

    #[tokio::test]
    async fn test_empty_abstract_falls_back_to_first_paragraphs() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("EMPTY"), Err("down")]));
        let ex = extractor(backend);
        let text = "Short title\n\nThis opening paragraph describes acetabular fracture fixation outcomes.";

        let (abs, conc) = ex.extract(text).await;
        assert_eq!(abs, "This opening paragraph describes acetabular fracture fixation outcomes.");
        assert_eq!(conc, "");
    }

    #[tokio::test]
    async fn test_blank_input_skips_model() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let ex = extractor(backend.clone());
        assert_eq!(ex.extract("  \r\n ").await, (String::new(), String::new()));
        assert!(backend.prompts.lock().unwrap().is_empty());
    }
}
