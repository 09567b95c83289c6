//! Clinical summaries of the abstract and conclusion.
//!
//! Input is cleaned twice (layout noise, then non-clinical sentences).
//! Short inputs are returned as-is, since summarizing them invites
//! hallucination. Longer inputs go to the LLM with a bounded window, and
//! the output is rejected if it is degenerate or bibliographic noise.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{debug, instrument, warn};

use fracta_common::text::{
    clean_extracted_text, clean_for_summary, lead_sentences, truncate_to_tokens, word_count,
    words_for_tokens,
};

use crate::backend::{LlmRequest, Message};
use crate::router::LlmRouter;

/// Inputs shorter than this (in words) are not summarized.
pub const MIN_WORDS_TO_SUMMARIZE: usize = 60;
/// Outputs shorter than this (in words) are discarded.
pub const MIN_SUMMARY_WORDS: usize = 5;
/// Tokens of the input window held back for the instruction.
const INPUT_RESERVE_TOKENS: usize = 64;
const MIN_INPUT_TOKENS: usize = 128;

const SYSTEM_PROMPT: &str = "You summarise orthopaedic trauma research for clinicians. \
Write plain prose, no lists, no headings, no citations.";

#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Input window of the summarization model, in tokens.
    pub max_input_tokens: usize,
    /// Target summary length bounds, in tokens.
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self { max_input_tokens: 1024, min_length: 150, max_length: 200 }
    }
}

/// How summaries are produced.
#[derive(Clone)]
pub enum SummaryEngine {
    /// Abstractive summary from the routed LLM backend.
    Llm(Arc<LlmRouter>),
    /// Leading sentences of the cleaned text; no model involved.
    Lead,
}

impl SummaryEngine {
    pub fn name(&self) -> &'static str {
        match self {
            SummaryEngine::Llm(_) => "llm",
            SummaryEngine::Lead => "lead",
        }
    }
}

pub struct Summarizer {
    engine: SummaryEngine,
    config: SummaryConfig,
}

impl Summarizer {
    pub fn new(engine: SummaryEngine, config: SummaryConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &SummaryEngine {
        &self.engine
    }

    /// Summarize `text`. Returns an empty string when there is nothing
    /// usable to say.
    #[instrument(skip_all, fields(engine = self.engine.name(), words = word_count(text)))]
    pub async fn summarize(&self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }

        let cleaned = clean_for_summary(&clean_extracted_text(text));
        if word_count(&cleaned) < MIN_WORDS_TO_SUMMARIZE {
            debug!("Input too short to summarize, returning cleaned text");
            return cleaned;
        }

        let window = self
            .config
            .max_input_tokens
            .saturating_sub(INPUT_RESERVE_TOKENS)
            .max(MIN_INPUT_TOKENS);
        let input = truncate_to_tokens(&cleaned, window);

        match &self.engine {
            SummaryEngine::Lead => self.lead(&input),
            SummaryEngine::Llm(router) => match self.abstractive(router, &input).await {
                Ok(summary) => summary,
                Err(e) => {
                    warn!(error = %e, "LLM summarization failed, using lead sentences");
                    self.lead(&input)
                }
            },
        }
    }

    fn lead(&self, input: &str) -> String {
        lead_sentences(input, words_for_tokens(self.config.max_length))
    }

    async fn abstractive(
        &self,
        router: &LlmRouter,
        input: &str,
    ) -> Result<String, crate::backend::LlmError> {
        let min_words = words_for_tokens(self.config.min_length);
        let max_words = words_for_tokens(self.config.max_length);
        let user = format!(
            "Summarise the following text from a scientific article about bone fractures \
             in {min_words} to {max_words} words. Keep clinical findings; omit statistics \
             software, search strategy and bibliographic details. Output only the summary.\n\n\
             TEXT:\n{input}"
        );
        // Chat tokenizers run longer than the word estimate; leave headroom.
        let max_tokens = (self.config.max_length + self.config.max_length / 2) as u32;
        let req = LlmRequest::deterministic(
            vec![Message::system(SYSTEM_PROMPT), Message::user(user)],
            max_tokens,
        );

        let resp = router.route("summarize", req).await?;
        Ok(accept_summary(&resp.content))
    }
}

fn re_bibliographic() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bcrossref\b|\bdoi\b|creativecommons|open\s+access").expect("static regex")
    })
}

/// Reject degenerate model output: too short, or bibliographic noise
/// such as a lone "CrossRef]".
pub fn accept_summary(raw: &str) -> String {
    let summary = raw.trim();
    if word_count(summary) < MIN_SUMMARY_WORDS {
        return String::new();
    }
    if re_bibliographic().is_match(summary) {
        return String::new();
    }
    summary.to_string()
}
