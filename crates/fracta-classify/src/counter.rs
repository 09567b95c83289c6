//! Keyword hit counting with a single Aho-Corasick pass per dictionary.

use aho_corasick::{AhoCorasick, MatchKind};

use crate::keywords::Dictionary;

/// Counts keyword hits per category of a [`Dictionary`].
///
/// Matching is case-insensitive. Each keyword is counted with
/// non-overlapping, left-to-right semantics on its own, while hits of
/// different keywords may overlap (so "lateral tibial plateau" scores
/// for both "lateral tibial plateau" and "tibial plateau").
pub struct KeywordCounter {
    automaton: AhoCorasick,
    /// Maps pattern index -> category index
    pattern_category: Vec<usize>,
    labels: Vec<&'static str>,
}

impl KeywordCounter {
    pub fn new(dictionary: Dictionary) -> Self {
        let mut patterns: Vec<String> = Vec::new();
        let mut pattern_category = Vec::new();
        let mut labels = Vec::with_capacity(dictionary.len());

        for (idx, (label, keywords)) in dictionary.iter().enumerate() {
            labels.push(*label);
            for kw in keywords.iter() {
                patterns.push(kw.to_lowercase());
                pattern_category.push(idx);
            }
        }

        // Standard match kind is required for overlapping iteration.
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&patterns)
            .expect("keyword dictionaries are valid literal patterns");

        Self { automaton, pattern_category, labels }
    }

    /// Hit counts in dictionary order, one entry per category.
    pub fn counts(&self, text: &str) -> Vec<(&'static str, usize)> {
        let haystack = text.to_lowercase();
        let mut per_category = vec![0usize; self.labels.len()];
        let mut last_end = vec![0usize; self.pattern_category.len()];

        for mat in self.automaton.find_overlapping_iter(&haystack) {
            let pid = mat.pattern().as_usize();
            if mat.start() < last_end[pid] {
                continue;
            }
            last_end[pid] = mat.end();
            per_category[self.pattern_category[pid]] += 1;
        }

        self.labels.iter().copied().zip(per_category).collect()
    }
}
