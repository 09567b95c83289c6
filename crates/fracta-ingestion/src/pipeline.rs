//! End-to-end analysis of a single paper.
//!
//! PDF text → sections (regex, then LLM when weak) → cleaning →
//! classification → summaries → stored row → report.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, instrument};

use fracta_classify::KeywordClassifier;
use fracta_common::text::{clean_extracted_text, text_tail, word_count};
use fracta_db::{NewPaper, PaperRepository};
use fracta_llm::{LlmSectionExtractor, Summarizer};

use crate::models::{AnalysisReport, SectionSource};
use crate::pdf_parser::extract_text_from_pdf;
use crate::sections::extract_abstract_and_conclusion;

/// Reported when no conclusion summary could be produced at all.
pub const CONCLUSION_UNAVAILABLE: &str = "Conclusion non disponible.";
/// Words taken from the end of the article when no conclusion was found.
const CONCLUSION_TAIL_WORDS: usize = 200;

/// Word counts below which an extracted section counts as weak.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub min_abstract_words: usize,
    pub min_conclusion_words: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { min_abstract_words: 50, min_conclusion_words: 30 }
    }
}

pub struct PaperPipeline {
    /// `None` disables the LLM section fallback.
    extractor: Option<LlmSectionExtractor>,
    summarizer: Summarizer,
    papers: PaperRepository,
    config: PipelineConfig,
}

impl PaperPipeline {
    pub fn new(
        extractor: Option<LlmSectionExtractor>,
        summarizer: Summarizer,
        papers: PaperRepository,
        config: PipelineConfig,
    ) -> Self {
        Self { extractor, summarizer, papers, config }
    }

    /// Name of the summary engine in use ("llm" or "lead").
    pub fn summary_engine(&self) -> &'static str {
        self.summarizer.engine().name()
    }

    /// Analyse the PDF at `pdf_path` and store the result.
    #[instrument(skip(self), fields(pdf = %pdf_path.display()))]
    pub async fn analyze(&self, pdf_path: &Path) -> Result<AnalysisReport> {
        let raw_text = extract_text_from_pdf(pdf_path)?;
        info!(words = word_count(&raw_text), "Text extracted");
        self.analyze_text(pdf_path, &raw_text).await
    }

    /// Analyse already-extracted article text attributed to `pdf_path`.
    pub async fn analyze_text(&self, pdf_path: &Path, raw_text: &str) -> Result<AnalysisReport> {
        let (abstract_raw, conclusion_raw) = self.extract_sections(raw_text).await;

        let abstract_clean = clean_extracted_text(&abstract_raw);
        let conclusion_clean = clean_extracted_text(&conclusion_raw);
        let text_clean = clean_extracted_text(raw_text);

        let classification = KeywordClassifier::shared().classify(&text_clean);
        info!(
            region = %classification.region,
            score = classification.region_score,
            types = ?classification.fracture_types,
            locations = ?classification.locations,
            "Paper classified"
        );

        let abstract_summary = match non_empty_or(&abstract_clean, &abstract_raw) {
            Some(text) => self.summarizer.summarize(text).await,
            None => String::new(),
        };
        let conclusion_summary = self
            .conclusion_summary(&conclusion_clean, &conclusion_raw, raw_text)
            .await;

        let paper = NewPaper {
            filename: pdf_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| pdf_path.display().to_string()),
            pdf_path: pdf_path.display().to_string(),
            raw_text: text_clean,
            abstract_text: abstract_clean,
            conclusion_text: conclusion_clean,
            region: classification.region.clone(),
            region_score: classification.region_score,
            fracture_types: classification.fracture_types.clone(),
            locations: classification.locations.clone(),
            abstract_summary: abstract_summary.clone(),
            conclusion_summary: conclusion_summary.clone(),
        };
        let db_id = self.papers.insert(&paper)?;

        Ok(AnalysisReport {
            pdf: pdf_path.display().to_string(),
            region: classification.region,
            region_score: classification.region_score,
            fracture_types: classification.fracture_types,
            locations: classification.locations,
            abstract_summary,
            conclusion_summary,
            db_id,
        })
    }

    /// Regex extraction, with weak sides replaced by non-empty LLM output.
    async fn extract_sections(&self, raw_text: &str) -> (String, String) {
        let (mut abstract_text, mut conclusion) = extract_abstract_and_conclusion(raw_text);
        let mut abstract_source = source_of(&abstract_text);
        let mut conclusion_source = source_of(&conclusion);

        let weak_abstract = word_count(&abstract_text) < self.config.min_abstract_words;
        let weak_conclusion = word_count(&conclusion) < self.config.min_conclusion_words;

        if let Some(extractor) = &self.extractor {
            if weak_abstract || weak_conclusion {
                debug!(weak_abstract, weak_conclusion, "Falling back to LLM extraction");
                let (llm_abstract, llm_conclusion) = extractor.extract(raw_text).await;
                if weak_abstract && !llm_abstract.is_empty() {
                    abstract_text = llm_abstract;
                    abstract_source = SectionSource::Llm;
                }
                if weak_conclusion && !llm_conclusion.is_empty() {
                    conclusion = llm_conclusion;
                    conclusion_source = SectionSource::Llm;
                }
            }
        }

        info!(
            abstract_source = abstract_source.as_str(),
            abstract_words = word_count(&abstract_text),
            conclusion_source = conclusion_source.as_str(),
            conclusion_words = word_count(&conclusion),
            "Sections extracted"
        );
        (abstract_text, conclusion)
    }

    async fn conclusion_summary(&self, clean: &str, raw: &str, raw_text: &str) -> String {
        if let Some(text) = non_empty_or(clean, raw) {
            let summary = self.summarizer.summarize(text).await;
            if !summary.is_empty() {
                return summary;
            }
        }

        let tail = text_tail(raw_text, CONCLUSION_TAIL_WORDS);
        let fallback = if !tail.is_empty() {
            tail
        } else {
            let cleaned = clean_extracted_text(raw_text);
            if cleaned.is_empty() { raw_text.to_string() } else { cleaned }
        };
        debug!(words = word_count(&fallback), "Summarizing conclusion fallback");

        let summary = self.summarizer.summarize(&fallback).await;
        if summary.is_empty() {
            CONCLUSION_UNAVAILABLE.to_string()
        } else {
            summary
        }
    }
}

fn non_empty_or<'a>(preferred: &'a str, fallback: &'a str) -> Option<&'a str> {
    [preferred, fallback].into_iter().find(|s| !s.trim().is_empty())
}

fn source_of(section: &str) -> SectionSource {
    if section.is_empty() { SectionSource::Missing } else { SectionSource::Regex }
}
