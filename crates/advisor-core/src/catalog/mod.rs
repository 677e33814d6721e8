//! Course catalog index: load-once, read-only course metadata with exact
//! code lookup, tiered title search, and cached prerequisite parses.

pub mod credits;
pub mod search;

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use advisor_data::models::CatalogRecord;

use crate::code::CourseCode;
use crate::prereq::parser::{PrerequisiteParse, parse_prerequisite, prerequisite_source};

pub use credits::{CreditParseError, CreditRange, format_credits};
pub use search::MatchTier;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Errors detected while building a [`CatalogIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("duplicate course code in catalog: {0}")]
    DuplicateCode(CourseCode),

    #[error("catalog contains no valid course records ({skipped} skipped)")]
    Empty { skipped: usize },
}

/// Metadata for one course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseCatalogEntry {
    pub code: CourseCode,
    pub title: String,
    pub credits: CreditRange,
    /// Prerequisite text as it will be parsed (may be empty).
    pub raw_prerequisite_text: String,
    pub description: String,
}

impl CourseCatalogEntry {
    pub fn new(code: CourseCode, title: impl Into<String>) -> Self {
        Self {
            code,
            title: title.into(),
            credits: CreditRange::ZERO,
            raw_prerequisite_text: String::new(),
            description: String::new(),
        }
    }

    pub fn with_credits(mut self, credits: CreditRange) -> Self {
        self.credits = credits;
        self
    }

    pub fn with_prerequisites(mut self, text: impl Into<String>) -> Self {
        self.raw_prerequisite_text = text.into();
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Convert a scraped record. Returns `None` (after logging) when the
    /// record's code is not a course code.
    pub fn from_record(record: &CatalogRecord) -> Option<Self> {
        let code = match CourseCode::parse(&record.code) {
            Ok(code) => code,
            Err(err) => {
                warn!(code = %record.code, error = %err, "skipping catalog record");
                return None;
            }
        };
        let credits = CreditRange::from_catalog(record.credits.as_deref()).unwrap_or_else(|err| {
            warn!(%code, error = %err, "unreadable credits; counting as zero");
            CreditRange::ZERO
        });
        let prerequisites = prerequisite_source(
            record.prerequisites.as_deref(),
            record.description.as_deref(),
        );

        Some(
            Self::new(code, record.title.clone().unwrap_or_default())
                .with_credits(credits)
                .with_prerequisites(prerequisites)
                .with_description(record.description.clone().unwrap_or_default()),
        )
    }
}

/// A title search hit.
#[derive(Debug, Clone, Serialize)]
pub struct TitleMatch<'a> {
    pub entry: &'a CourseCatalogEntry,
    pub tier: MatchTier,
}

/// Result of [`CatalogIndex::lookup`].
#[derive(Debug, Clone)]
pub enum Lookup<'a> {
    /// The query was a course code present in the catalog.
    Code(&'a CourseCatalogEntry),
    /// The query matched titles, best first.
    Title(Vec<TitleMatch<'a>>),
    NotFound,
}

// ---------------------------------------------------------------------------
// CatalogIndex
// ---------------------------------------------------------------------------

/// Immutable course index shared by reference with every consumer.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: BTreeMap<CourseCode, CourseCatalogEntry>,
    prerequisites: BTreeMap<CourseCode, PrerequisiteParse>,
}

impl CatalogIndex {
    /// Build an index, parsing every entry's prerequisite text once.
    /// Duplicate codes are rejected.
    pub fn new(entries: impl IntoIterator<Item = CourseCatalogEntry>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for entry in entries {
            if map.contains_key(&entry.code) {
                return Err(CatalogError::DuplicateCode(entry.code));
            }
            map.insert(entry.code.clone(), entry);
        }

        let prerequisites: BTreeMap<CourseCode, PrerequisiteParse> = map
            .values()
            .map(|entry| {
                let parse = parse_prerequisite(&entry.raw_prerequisite_text, |c| map.contains_key(c));
                (entry.code.clone(), parse)
            })
            .collect();

        let invalid = prerequisites.values().filter(|p| !p.is_valid()).count();
        info!(courses = map.len(), invalid_prerequisites = invalid, "catalog index built");

        Ok(Self {
            entries: map,
            prerequisites,
        })
    }

    /// Build from scraped records, skipping records with malformed codes.
    pub fn from_records(records: &[CatalogRecord]) -> Result<Self, CatalogError> {
        let entries: Vec<CourseCatalogEntry> = records
            .iter()
            .filter_map(CourseCatalogEntry::from_record)
            .collect();
        let skipped = records.len() - entries.len();
        if entries.is_empty() && !records.is_empty() {
            return Err(CatalogError::Empty { skipped });
        }
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, code: &CourseCode) -> bool {
        self.entries.contains_key(code)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CourseCatalogEntry> {
        self.entries.values()
    }

    /// Exact lookup by course code.
    pub fn lookup_by_code(&self, code: &CourseCode) -> Option<&CourseCatalogEntry> {
        self.entries.get(code)
    }

    /// Cached prerequisite parse for a course in the index.
    pub fn prerequisite(&self, code: &CourseCode) -> Option<&PrerequisiteParse> {
        self.prerequisites.get(code)
    }

    /// Every course with its prerequisite parse, in code order.
    pub fn prerequisites(&self) -> impl Iterator<Item = (&CourseCode, &PrerequisiteParse)> {
        self.prerequisites.iter()
    }

    /// Ranked title search.
    ///
    /// Direct matches (exact, substring, all words) are tried first; only
    /// when none exist does the spelling-tolerant fuzzy tier run. A subject
    /// inferred from keyword hints narrows both tiers. Ties keep code order.
    pub fn lookup_by_title(&self, query: &str) -> Vec<TitleMatch<'_>> {
        let normalized = search::normalize_title(query);
        if normalized.is_empty() {
            return Vec::new();
        }
        let subject = search::infer_subject(query);
        let candidates: Vec<(&CourseCatalogEntry, String)> = self
            .entries
            .values()
            .filter(|e| subject.is_none_or(|s| e.code.subject() == s))
            .map(|e| (e, search::normalize_title(&e.title)))
            .collect();

        let mut matches: Vec<TitleMatch<'_>> = candidates
            .iter()
            .filter_map(|(entry, title)| {
                search::direct_match(&normalized, title).map(|tier| TitleMatch {
                    entry: *entry,
                    tier,
                })
            })
            .collect();

        if matches.is_empty() {
            let threshold = search::fuzzy_threshold(&normalized);
            matches = candidates
                .iter()
                .filter_map(|(entry, title)| {
                    let similarity = search::fuzzy_similarity(&normalized, title);
                    (similarity >= threshold).then_some(TitleMatch {
                        entry: *entry,
                        tier: MatchTier::Fuzzy(similarity),
                    })
                })
                .collect();
        }

        matches.sort_by(|a, b| b.tier.score().total_cmp(&a.tier.score()));
        debug!(query, ?subject, hits = matches.len(), "title lookup");
        matches
    }

    /// Look up by code when `query` is a course code, otherwise by title.
    pub fn lookup(&self, query: &str) -> Lookup<'_> {
        if let Ok(code) = CourseCode::parse(query) {
            if let Some(entry) = self.lookup_by_code(&code) {
                return Lookup::Code(entry);
            }
        }
        let matches = self.lookup_by_title(query);
        if matches.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::Title(matches)
        }
    }
}
