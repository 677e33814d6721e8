//! Title normalization and scoring for course title lookup.

use serde::Serialize;

/// Keyword hints used to narrow a title search to one subject. Checked in
/// order; the first subject with a keyword contained in the query wins.
const SUBJECT_HINTS: &[(&str, &[&str])] = &[
    (
        "MATH",
        &["calc", "calculus", "algebra", "geometry", "trigonometry", "statistics", "math"],
    ),
    (
        "CS",
        &["programming", "computer", "software", "algorithm", "data structures", "coding"],
    ),
    ("PHYS", &["physics"]),
    ("CHEM", &["chemistry", "chem"]),
    ("BIO", &["biology", "bio"]),
    ("ENG", &["english", "literature", "writing"]),
    ("HIST", &["history"]),
    ("PSYC", &["psychology", "psych"]),
];

const ROMAN: &[(&str, &str)] = &[
    ("i", "1"),
    ("ii", "2"),
    ("iii", "3"),
    ("iv", "4"),
    ("v", "5"),
    ("vi", "6"),
    ("vii", "7"),
    ("viii", "8"),
    ("ix", "9"),
    ("x", "10"),
];

/// Lowercase, collapse whitespace, and replace Roman numerals I-X that
/// stand as whole words with Arabic digits: `"Calculus III"` becomes
/// `"calculus 3"`.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            ROMAN
                .iter()
                .find(|(roman, _)| *roman == word)
                .map_or(word, |(_, arabic)| arabic)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Subject prefix suggested by keywords in `query`, e.g. `"calc 3"` gives `MATH`.
pub fn infer_subject(query: &str) -> Option<&'static str> {
    let query = query.to_lowercase();
    SUBJECT_HINTS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| query.contains(k)))
        .map(|(subject, _)| *subject)
}

/// How a title matched a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "tier", content = "score")]
pub enum MatchTier {
    /// Normalized title equals the query.
    Exact,
    /// Query is a substring of the title.
    Substring,
    /// Every query word appears in the title.
    AllWords,
    /// Spelling-tolerant similarity in `0.0..=1.0`.
    Fuzzy(f64),
}

impl MatchTier {
    /// Sort key: 100 / 50 / 25 for the direct tiers, the similarity for fuzzy.
    pub fn score(&self) -> f64 {
        match self {
            Self::Exact => 100.0,
            Self::Substring => 50.0,
            Self::AllWords => 25.0,
            Self::Fuzzy(similarity) => *similarity,
        }
    }
}

/// Direct match of a normalized query against a normalized title.
pub fn direct_match(query: &str, title: &str) -> Option<MatchTier> {
    if query.is_empty() {
        return None;
    }
    if query == title {
        Some(MatchTier::Exact)
    } else if title.contains(query) {
        Some(MatchTier::Substring)
    } else if query.split_whitespace().all(|w| title.contains(w)) {
        Some(MatchTier::AllWords)
    } else {
        None
    }
}

/// Minimum fuzzy similarity: stricter for short queries, which otherwise
/// match unrelated titles (`"calc 4"` against `"clinical practice 4"`).
pub fn fuzzy_threshold(query: &str) -> f64 {
    if query.chars().count() <= 10 { 0.8 } else { 0.7 }
}

/// The better of whole-string similarity and the mean over query words of
/// each word's best similarity to any title word.
pub fn fuzzy_similarity(query: &str, title: &str) -> f64 {
    let whole = strsim::normalized_levenshtein(query, title);

    let title_words: Vec<&str> = title.split_whitespace().collect();
    let query_words: Vec<&str> = query.split_whitespace().collect();
    let per_word = if query_words.is_empty() {
        0.0
    } else {
        let total: f64 = query_words
            .iter()
            .map(|q| {
                title_words
                    .iter()
                    .map(|t| strsim::normalized_levenshtein(q, t))
                    .fold(0.0, f64::max)
            })
            .sum();
        total / query_words.len() as f64
    };

    whole.max(per_word)
}
