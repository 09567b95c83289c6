//! Abstract / Conclusion extraction from raw article text.
//!
//! Text is normalised first (`\r` to `\n`, blank-line runs squashed).
//! Two strategies, tried in order:
//! 1. Labelled sections (`Abstract:` / `Conclusion:` followed by text), each
//!    ending at the first stop marker.
//! 2. Standalone headings on their own line, with the section running to
//!    the next known heading.

use std::sync::OnceLock;

use regex::Regex;

use fracta_common::text::normalize;

const ABSTRACT_TITLES: &[&str] = &["Abstract", "Résumé", "RESUME"];
const CONCLUSION_TITLES: &[&str] = &["Conclusion", "Conclusions", "Concluding remarks"];
const STOP_TITLES: &[&str] = &[
    "Introduction",
    "Methods",
    "Materials and Methods",
    "Results",
    "Discussion",
    "Keywords",
    "References",
    "Acknowledgements",
    "Supplementary materials",
];

/// A labelled section: where its header ends and what terminates it.
struct Labelled {
    header: Regex,
    stop: Regex,
}

impl Labelled {
    fn new(header: &str, stop: &str) -> Self {
        Self {
            header: Regex::new(header).expect("static regex"),
            stop: Regex::new(stop).expect("static regex"),
        }
    }

    /// Body of the first header that has text after it, up to the first
    /// stop marker found past the first body character.
    fn find(&self, text: &str) -> Option<String> {
        for header in self.header.find_iter(text) {
            let start = header.end();
            let Some(first) = text[start..].chars().next() else {
                continue;
            };
            let search_from = start + first.len_utf8();
            let end = self
                .stop
                .find_at(text, search_from)
                .map_or(text.len(), |m| m.start());
            return Some(text[start..end].trim().to_string());
        }
        None
    }
}

fn labelled_abstract() -> &'static Labelled {
    static L: OnceLock<Labelled> = OnceLock::new();
    L.get_or_init(|| {
        Labelled::new(
            r"(?im)^\s*abstract\s*:\s*",
            r"(?im)^\s*\d+\.\s+|\n\s*keywords\s*:|\n\s*introduction",
        )
    })
}

fn labelled_conclusion() -> &'static Labelled {
    static L: OnceLock<Labelled> = OnceLock::new();
    L.get_or_init(|| {
        Labelled::new(
            r"(?im)^\s*(?:\d+\.\s*)?conclusions?\s*:\s*",
            r"(?im)^\s*author contributions|^\s*funding|^\s*references",
        )
    })
}

/// Regex matching any of `titles` alone on a line.
fn heading_regex(titles: &[&str]) -> Regex {
    let alternatives = titles.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
    Regex::new(&format!(r"(?im)^(?:{alternatives})\s*$")).expect("static regex")
}

struct Headed {
    start: Regex,
    stop: Regex,
}

impl Headed {
    fn find(&self, text: &str) -> String {
        let text = normalize(text);
        let Some(heading) = self.start.find(&text) else {
            return String::new();
        };
        let rest = &text[heading.end()..];
        let end = self.stop.find(rest).map_or(rest.len(), |m| m.start());
        rest[..end].trim().to_string()
    }
}

fn headed_abstract() -> &'static Headed {
    static H: OnceLock<Headed> = OnceLock::new();
    H.get_or_init(|| {
        let stops: Vec<&str> = STOP_TITLES.iter().chain(CONCLUSION_TITLES).copied().collect();
        Headed { start: heading_regex(ABSTRACT_TITLES), stop: heading_regex(&stops) }
    })
}

fn headed_conclusion() -> &'static Headed {
    static H: OnceLock<Headed> = OnceLock::new();
    H.get_or_init(|| Headed {
        start: heading_regex(CONCLUSION_TITLES),
        stop: heading_regex(STOP_TITLES),
    })
}

/// Returns `(abstract, conclusion)`, either possibly empty.
pub fn extract_abstract_and_conclusion(text: &str) -> (String, String) {
    let text = normalize(text);
    let mut abstract_text = labelled_abstract().find(&text).unwrap_or_default();
    let mut conclusion = labelled_conclusion().find(&text).unwrap_or_default();

    if abstract_text.is_empty() {
        abstract_text = headed_abstract().find(&text);
    }
    if conclusion.is_empty() {
        conclusion = headed_conclusion().find(&text);
    }
    (abstract_text, conclusion)
}
