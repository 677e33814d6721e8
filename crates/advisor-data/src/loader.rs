//! JSON loaders for the catalog, transcripts, and degree documents, plus
//! mapping of transcript program/major pairs onto degree file names.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::DataConfig;
use crate::models::{CatalogRecord, DegreeDocument, TranscriptRecord};

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} at {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse {what} at {}", path.display()))
}

/// Load every catalog record from a `courses.json` file.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogRecord>> {
    let records: Vec<CatalogRecord> = read_json(path, "course catalog")?;
    debug!(path = %path.display(), count = records.len(), "loaded catalog records");
    Ok(records)
}

/// Load a transcript produced by the transcript extractor.
pub fn load_transcript(path: &Path) -> Result<TranscriptRecord> {
    let transcript: TranscriptRecord = read_json(path, "transcript")?;
    debug!(
        path = %path.display(),
        terms = transcript.completed.len(),
        transfer = transcript.transfer.len(),
        "loaded transcript"
    );
    Ok(transcript)
}

/// Load one degree program document.
pub fn load_degree(path: &Path) -> Result<DegreeDocument> {
    let doc: DegreeDocument = read_json(path, "degree document")?;
    debug!(path = %path.display(), sections = doc.content.len(), "loaded degree document");
    Ok(doc)
}

/// List the `.json` file names in the degrees directory, sorted.
pub fn list_degree_files(config: &DataConfig) -> Result<Vec<String>> {
    let dir = config.degrees_dir();
    let entries = fs::read_dir(&dir)
        .with_context(|| format!("failed to list degree directory {}", dir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".json") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

// ---------------------------------------------------------------------------
// Degree file resolution
// ---------------------------------------------------------------------------

const ABBREVIATIONS: &[(&str, &str)] = &[
    ("b.f.a.", "bachelor of fine arts"),
    ("b.s.", "bachelor of science"),
    ("b.a.", "bachelor of arts"),
    ("bfa", "bachelor of fine arts"),
    ("bs", "bachelor of science"),
    ("ba", "bachelor of arts"),
];

/// Build the expected degree file stem for a program and major, e.g.
/// `("Bachelor of Science", "Computer Info Systems")` becomes
/// `bachelor_of_science_in_computer_information_systems`.
///
/// Program abbreviations (`BS`, `B.A.`, `BFA`, ...) are expanded, `&` becomes
/// `and`, and the word `info` becomes `information`.
pub fn degree_file_stem(program: &str, major: &str) -> String {
    let mut program = program.trim().to_lowercase();
    if let Some((_, full)) = ABBREVIATIONS.iter().find(|(abbr, _)| program == *abbr) {
        program = full.to_string();
    }

    let phrase = format!("{program} in {}", major.trim().to_lowercase());
    let words: Vec<String> = phrase
        .replace('&', " and ")
        .split_whitespace()
        .map(|w| match w {
            "info" => "information".to_string(),
            other => other.to_string(),
        })
        .collect();
    words.join("_")
}

/// Pick the degree file whose name is most similar to the stem built from
/// `program` and `major`. Errors when the directory holds no degree files.
pub fn resolve_degree_file(config: &DataConfig, program: &str, major: &str) -> Result<PathBuf> {
    let files = list_degree_files(config)?;
    let stem = degree_file_stem(program, major);
    let Some(best) = closest_file(&stem, &files) else {
        bail!(
            "no degree documents found in {}",
            config.degrees_dir().display()
        );
    };

    let name = best.trim_end_matches(".json");
    if name != stem {
        warn!(%stem, chosen = %best, "no exact degree file match; using closest");
    }
    Ok(config.degree_path(best))
}

fn closest_file<'a>(stem: &str, files: &'a [String]) -> Option<&'a str> {
    files
        .iter()
        .map(|f| {
            let score = strsim::normalized_levenshtein(stem, f.trim_end_matches(".json"));
            (f.as_str(), score)
        })
        .fold(None, |best: Option<(&str, f64)>, (name, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((name, score)),
        })
        .map(|(name, _)| name)
}
