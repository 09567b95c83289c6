//! Text normalisation and cleaning shared by section extraction,
//! LLM prompting and summarization.
//!
//! Everything here is pure string munging over PDF text layers, which are
//! noisy: running headers, DOIs, licence footers, citation brackets and
//! broken line joins all end up in the extracted text.

use regex::Regex;
use std::sync::OnceLock;

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("static regex"))
        }
    };
}

static_regex!(re_blank_runs, r"\n{3,}");
static_regex!(re_url, r"https?://[^\s]+");
static_regex!(re_www, r"www\.[^\s]+");
static_regex!(re_doi_url, r"(?i)https?://doi\.org/[^\s]+");
static_regex!(re_doi, r"(?i)\bdoi:\s*[^\s]+");
static_regex!(
    re_footer_noise,
    r"(?i)crossref|open\s+access|creative\s+commons|license|pmcid|pmid|issn"
);
static_regex!(
    re_journal_line,
    r"(?i)efort\s+open\s+reviews|trauma\s+efort|open\s+reviews"
);
static_regex!(re_page_year, r"\(\d{4}\).*\d");
static_regex!(re_citation, r"\[\d+(?:,\s*\d+)*\]");
static_regex!(re_tabs, r"\t+");
static_regex!(re_spaces, r" {2,}");
static_regex!(re_space_before_punct, r"\s+([.!?,;:])");
static_regex!(re_sentence_join, r"([.!?])\s*([A-Z])");
static_regex!(re_leading_symbols, r"(?m)^[\W\d_]+\s*");
static_regex!(re_sentence_end, r"[.!?]\s+");
static_regex!(
    re_non_clinical,
    r"endnote|software|statistical analysis|ibm|spss|database|search strategy|screened|eligibility criteria|data extraction|p\s*<\s*0\.\d+|p\s*=\s*0\.\d+|crossref|doi\s*:|https?://doi\.org/|open access|creativecommons|license|references|publisher|issn|pmcid|pmid"
);

/// Convert carriage returns to newlines and squash runs of blank lines.
pub fn normalize(text: &str) -> String {
    let text = text.replace('\r', "\n");
    re_blank_runs().replace_all(&text, "\n\n").into_owned()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Rough token estimation: words / 0.75 (subword tokenizers average ~1.3 tokens/word).
pub fn estimate_tokens(text: &str) -> usize {
    ((word_count(text) as f32) / 0.75).ceil() as usize
}

/// Number of whole words that fit in a token budget.
pub fn words_for_tokens(max_tokens: usize) -> usize {
    ((max_tokens as f32) * 0.75) as usize
}

/// Keep only as many leading words as fit in `max_tokens`.
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> String {
    let limit = words_for_tokens(max_tokens).max(1);
    if word_count(text) <= limit {
        return text.trim().to_string();
    }
    text.split_whitespace().take(limit).collect::<Vec<_>>().join(" ")
}

/// Clean the raw text of an extracted section (or a whole article).
///
/// Removes URLs and DOIs, publisher footers, journal running heads,
/// numeric citation brackets and stray leading symbols, then repairs
/// whitespace around punctuation and drops empty blocks.
pub fn clean_extracted_text(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = re_blank_runs().replace_all(&text, "\n\n");

    let text = re_url().replace_all(&text, "");
    let text = re_www().replace_all(&text, "");
    let text = re_doi_url().replace_all(&text, "");
    let text = re_doi().replace_all(&text, "");

    let text = text
        .split('\n')
        .filter(|line| !re_footer_noise().is_match(line))
        .collect::<Vec<_>>()
        .join("\n");

    let text = text
        .split('\n')
        .filter(|line| !re_journal_line().is_match(line) && !re_page_year().is_match(line))
        .collect::<Vec<_>>()
        .join("\n");

    let text = re_citation().replace_all(&text, "");
    let text = re_tabs().replace_all(&text, " ");
    let text = re_spaces().replace_all(&text, " ");
    let text = re_space_before_punct().replace_all(&text, "$1");
    let text = re_sentence_join().replace_all(&text, "$1 $2");
    let text = re_leading_symbols().replace_all(&text, "");

    let text = text
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    let text = text
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    text.trim().to_string()
}

/// Split on whitespace that follows `.`, `!` or `?`.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last = 0;
    for m in re_sentence_end().find_iter(text) {
        // Terminators are ASCII, so start + 1 stays on a char boundary.
        sentences.push(&text[last..m.start() + 1]);
        last = m.end();
    }
    if last < text.len() {
        sentences.push(&text[last..]);
    }
    sentences
}

/// Drop sentences that carry no clinical content: tooling, statistics,
/// search methodology and bibliographic boilerplate.
pub fn clean_for_summary(text: &str) -> String {
    split_sentences(text)
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| !re_non_clinical().is_match(&s.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Up to `max_words` words taken from the start of the first three
/// substantial paragraphs (longer than 40 characters).
pub fn first_paragraphs(text: &str, max_words: usize) -> String {
    let normalized = normalize(text);
    let paragraphs: Vec<&str> = normalized
        .trim()
        .split("\n\n")
        .map(str::trim)
        .filter(|p| p.chars().count() > 40)
        .take(3)
        .collect();

    let mut words: Vec<&str> = Vec::new();
    for p in paragraphs {
        words.extend(p.split_whitespace());
        if words.len() >= max_words {
            break;
        }
    }
    words.truncate(max_words);
    words.join(" ")
}

/// The last `max_words` words of the text, in reading order.
pub fn text_tail(text: &str, max_words: usize) -> String {
    let normalized = text.replace('\r', "\n");
    let paragraphs: Vec<&str> = normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut collected: Vec<Vec<&str>> = Vec::new();
    let mut total = 0;
    for p in paragraphs.iter().rev() {
        let words: Vec<&str> = p.split_whitespace().collect();
        total += words.len();
        collected.push(words);
        if total >= max_words {
            break;
        }
    }

    let words: Vec<&str> = collected.into_iter().rev().flatten().collect();
    let start = words.len().saturating_sub(max_words);
    words[start..].join(" ")
}

/// Leading sentences of `text` totalling at most `max_words` words.
/// A first sentence longer than the budget is cut at the word limit.
pub fn lead_sentences(text: &str, max_words: usize) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut used = 0;
    for sentence in split_sentences(text).into_iter().map(str::trim) {
        if sentence.is_empty() {
            continue;
        }
        let n = word_count(sentence);
        if used + n > max_words {
            if out.is_empty() {
                return sentence
                    .split_whitespace()
                    .take(max_words)
                    .collect::<Vec<_>>()
                    .join(" ");
            }
            break;
        }
        out.push(sentence);
        used += n;
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_squashes_blank_runs() {
        assert_eq!(normalize("a\r\r\r\rb\n\n\n\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens("one two three"), 4);
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn test_clean_strips_urls_dois_and_citations() {
        let raw = "Tibial plateau fractures are common [1, 2]. See https://example.org/x for details.\n\
                   doi: 10.1000/xyz123 More text here.";
        let cleaned = clean_extracted_text(raw);
        assert!(!cleaned.contains("https://"));
        assert!(!cleaned.contains("10.1000"));
        assert!(!cleaned.contains("[1, 2]"));
        assert!(cleaned.starts_with("Tibial plateau fractures are common."));
    }

    #[test]
    fn test_clean_drops_footer_and_journal_lines() {
        let raw = "Main clinical finding.\nThis article is Open Access under a CC license\n\
                   EFORT Open Reviews (2025) 10 316-326\nSecond finding.";
        let cleaned = clean_extracted_text(raw);
        // The sentence-join pass also folds the surviving lines together.
        assert_eq!(cleaned, "Main clinical finding. Second finding.");
    }

    #[test]
    fn test_clean_fixes_punctuation_spacing() {
        let cleaned = clean_extracted_text("Fixation failed .Patients recovered\t\twell ,mostly.");
        assert_eq!(cleaned, "Fixation failed. Patients recovered well,mostly.");
    }

    #[test]
    fn test_clean_removes_leading_symbols() {
        let cleaned = clean_extracted_text("• 12 Displaced fractures\n— Closed reduction");
        assert_eq!(cleaned, "Displaced fractures\nClosed reduction");
    }

    #[test]
    fn test_clean_empty_input() {
        assert_eq!(clean_extracted_text("   \n "), "");
    }

    #[test]
    fn test_split_sentences() {
        let s = split_sentences("First one. Second one! Third? tail");
        assert_eq!(s, vec!["First one.", "Second one!", "Third?", "tail"]);
    }

    #[test]
    fn test_clean_for_summary_drops_non_clinical() {
        let text = "Union was achieved in all cases. Data were analysed with SPSS software. \
                    The difference was significant (p < 0.05). Outcomes were good.";
        assert_eq!(
            clean_for_summary(text),
            "Union was achieved in all cases. Outcomes were good."
        );
    }

    #[test]
    fn test_first_paragraphs_skips_short_blocks() {
        let text = "Title\n\nThis is a long enough first paragraph about pelvic ring injuries.\n\n\
                    Another substantial paragraph describing the acetabular fixation method.";
        let out = first_paragraphs(text, 5);
        assert_eq!(out, "This is a long enough");
    }

    #[test]
    fn test_text_tail_keeps_reading_order() {
        let text = "alpha beta\n\ngamma delta\n\nepsilon zeta";
        assert_eq!(text_tail(text, 3), "delta epsilon zeta");
        assert_eq!(text_tail(text, 100), "alpha beta gamma delta epsilon zeta");
    }

    #[test]
    fn test_lead_sentences_respects_budget() {
        let text = "One two three. Four five six. Seven eight.";
        assert_eq!(lead_sentences(text, 6), "One two three. Four five six.");
        assert_eq!(lead_sentences(text, 2), "One two");
    }

    #[test]
    fn test_truncate_to_tokens() {
        let text = "w ".repeat(100);
        assert_eq!(word_count(&truncate_to_tokens(&text, 40)), 30);
        assert_eq!(truncate_to_tokens("short text", 40), "short text");
    }
}
