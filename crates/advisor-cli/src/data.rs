//! Loading helpers shared by the commands: catalog index, transcript and
//! the degree documents a transcript maps to.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use advisor_core::catalog::CatalogIndex;
use advisor_core::code::CourseCode;
use advisor_core::transcript::CompletedCourses;
use advisor_data::config::DataConfig;
use advisor_data::loader;
use advisor_data::models::{DegreeDocument, TranscriptRecord};

/// Load `courses.json` from the data directory and build the index.
pub fn load_index(config: &DataConfig) -> Result<CatalogIndex> {
    let path = config.catalog_path();
    let records = loader::load_catalog(&path)?;
    CatalogIndex::from_records(&records)
        .with_context(|| format!("invalid course catalog at {}", path.display()))
}

/// A transcript and the completed-course set derived from it.
pub struct Student {
    pub transcript: TranscriptRecord,
    pub completed: CompletedCourses,
}

impl Student {
    pub fn load(path: &Path) -> Result<Self> {
        let transcript = loader::load_transcript(path)?;
        let completed = CompletedCourses::from_transcript(&transcript);
        info!(
            transcript = %path.display(),
            completed = completed.len(),
            "loaded student record"
        );
        Ok(Self {
            transcript,
            completed,
        })
    }

    /// Earned credits from the transcript, or the sum over completed
    /// courses when the transcript does not state them.
    pub fn earned_credits(&self) -> f64 {
        self.transcript
            .earned_credits
            .unwrap_or_else(|| self.completed.iter().map(|c| c.credits).sum())
    }
}

/// A degree document with the label it is reported under.
pub struct LabeledDegree {
    /// File stem of the document, e.g. `bachelor_of_science_in_computer_science`.
    pub label: String,
    pub document: DegreeDocument,
}

/// Load the degree documents for `transcript`.
///
/// Explicit `degree_files` win; otherwise every program/major pair on the
/// transcript is resolved to the closest document in the degrees directory.
pub fn load_degrees(
    config: &DataConfig,
    transcript: &TranscriptRecord,
    degree_files: &[PathBuf],
) -> Result<Vec<LabeledDegree>> {
    let paths: Vec<PathBuf> = if degree_files.is_empty() {
        let pairs = transcript.program_majors();
        if pairs.is_empty() {
            bail!("transcript names no program and major; pass --degree <file> to choose one");
        }
        pairs
            .iter()
            .map(|(program, major)| loader::resolve_degree_file(config, program, major))
            .collect::<Result<_>>()?
    } else {
        degree_files
            .iter()
            .map(|file| {
                if file.components().count() == 1 && !file.exists() {
                    config.degree_path(file)
                } else {
                    file.clone()
                }
            })
            .collect()
    };

    paths
        .into_iter()
        .map(|path| {
            let document = loader::load_degree(&path)?;
            let label = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .or_else(|| document.name.clone())
                .unwrap_or_else(|| "degree".to_string());
            Ok(LabeledDegree { label, document })
        })
        .collect()
}

/// Parse a course code given as one or more words (`CS 01101`, `cs01101`).
pub fn parse_code(words: &[String]) -> Result<CourseCode> {
    let text = words.join(" ");
    CourseCode::parse(&text).with_context(|| format!("invalid course code: {text}"))
}
