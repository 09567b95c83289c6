//! Keyword-count classification of a fracture paper.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::counter::KeywordCounter;
use crate::keywords::{LOCATION_KEYWORDS, REGION_KEYWORDS, SIDE_LABELS, TYPE_KEYWORDS, ZONE_LABELS};

/// Region label used when no region keyword occurs at all.
pub const UNKNOWN_REGION: &str = "inconnu";

/// Maximum number of location descriptors reported.
pub const MAX_LOCATIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub region: String,
    pub region_score: u32,
    pub fracture_types: Vec<String>,
    pub locations: Vec<String>,
}

pub struct KeywordClassifier {
    regions: KeywordCounter,
    types: KeywordCounter,
    locations: KeywordCounter,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            regions: KeywordCounter::new(REGION_KEYWORDS),
            types: KeywordCounter::new(TYPE_KEYWORDS),
            locations: KeywordCounter::new(LOCATION_KEYWORDS),
        }
    }
}

impl KeywordClassifier {
    /// Process-wide instance; automata are built once.
    pub fn shared() -> &'static KeywordClassifier {
        static INSTANCE: OnceLock<KeywordClassifier> = OnceLock::new();
        INSTANCE.get_or_init(KeywordClassifier::default)
    }

    pub fn classify(&self, text: &str) -> Classification {
        // Region: single label. Stable sort keeps dictionary order on ties.
        let mut scores = self.regions.counts(text);
        scores.sort_by(|a, b| b.1.cmp(&a.1));
        let (best_region, best_score) = scores.first().copied().unwrap_or((UNKNOWN_REGION, 0));
        let region = if best_score == 0 { UNKNOWN_REGION } else { best_region };

        // Type: multi-label
        let mut fracture_types: Vec<String> = self
            .types
            .counts(text)
            .into_iter()
            .filter(|(_, c)| *c > 0)
            .map(|(label, _)| label.to_string())
            .collect();
        fracture_types.sort();
        fracture_types.dedup();

        let locations = self.top_locations(text, MAX_LOCATIONS);

        debug!(region, best_score, ?fracture_types, ?locations, "Keyword classification");

        Classification {
            region: region.to_string(),
            region_score: best_score as u32,
            fracture_types,
            locations,
        }
    }

    /// Most frequent location descriptors, keeping at most one side
    /// (left/right) and one zone (proximal/distal) so the result never
    /// contradicts itself.
    fn top_locations(&self, text: &str, max_items: usize) -> Vec<String> {
        let mut ordered: Vec<(&'static str, usize)> = self
            .locations
            .counts(text)
            .into_iter()
            .filter(|(_, c)| *c > 0)
            .collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));

        let side = ordered.iter().find(|(l, _)| SIDE_LABELS.contains(l));
        let zone = ordered.iter().find(|(l, _)| ZONE_LABELS.contains(l));
        let others = ordered
            .iter()
            .filter(|(l, _)| !SIDE_LABELS.contains(l) && !ZONE_LABELS.contains(l));

        side.into_iter()
            .chain(zone)
            .chain(others)
            .take(max_items)
            .map(|(l, _)| l.to_string())
            .collect()
    }
}

/// Classify `text` with the shared keyword classifier.
pub fn classify_by_keywords(text: &str) -> Classification {
    KeywordClassifier::shared().classify(text)
}
