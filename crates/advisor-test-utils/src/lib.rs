//! Shared fixtures for advisor integration tests.
//!
//! Provides a small sample catalog, transcript and degree-document
//! builders, an on-disk data directory, and a scripted candidate generator
//! that replays canned replies and records every call.

use std::collections::{BTreeSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;

use advisor_core::catalog::{CatalogIndex, CourseCatalogEntry, CreditRange};
use advisor_core::code::CourseCode;
use advisor_core::recommend::{CandidateGenerator, GenerationRequest, GeneratorError, Role};
use advisor_data::models::{CourseRecord, DegreeDocument, TermRecord, TranscriptRecord};

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

pub fn code(s: &str) -> CourseCode {
    CourseCode::parse(s).unwrap_or_else(|e| panic!("bad fixture code: {e}"))
}

pub fn codes(list: &[&str]) -> BTreeSet<CourseCode> {
    list.iter().map(|s| code(s)).collect()
}

pub fn entry(c: &str, title: &str, credits: f64) -> CourseCatalogEntry {
    CourseCatalogEntry::new(code(c), title).with_credits(CreditRange::fixed(credits))
}

/// A dozen courses with chained prerequisites:
///
/// - `MATH 01130` -> `MATH 01131` -> `MATH 01132`
/// - `CS 01100` and (`MATH 01130` or `MATH 01131`) -> `CS 01101`
/// - `CS 01101` and `MATH 01131` -> `CS 02100`
/// - `PHYS 01200` needs `PHYS 00220`, which is not in the catalog
/// - `MUS 01100` carries 1 to 3 credits
pub fn sample_catalog() -> CatalogIndex {
    CatalogIndex::new(vec![
        entry("MATH 01130", "Calculus I", 4.0),
        entry("MATH 01131", "Calculus II", 4.0).with_prerequisites("MATH 01130"),
        entry("MATH 01132", "Calculus III", 4.0).with_prerequisites("MATH 01131"),
        entry("CS 01100", "Introduction to Programming", 3.0),
        entry("CS 01101", "Data Structures", 3.0)
            .with_prerequisites("CS 01100 and (MATH 01130 or MATH 01131)"),
        entry("CS 02100", "Algorithms", 3.0).with_prerequisites("CS 01101 and MATH 01131"),
        entry("CS 02200", "Computer Organization", 3.0).with_prerequisites("CS 01101"),
        entry("ENG 01101", "College Composition I", 3.0),
        entry("ART 01100", "Drawing I", 3.0),
        entry("HIST 01100", "World History", 3.0),
        CourseCatalogEntry::new(code("MUS 01100"), "Ensemble")
            .with_credits(CreditRange { min: 1.0, max: 3.0 }),
        entry("PHYS 01200", "Physics I", 4.0).with_prerequisites("MATH 01130 and PHYS 00220"),
    ])
    .unwrap_or_else(|e| panic!("sample catalog is invalid: {e}"))
}

// ---------------------------------------------------------------------------
// Transcripts
// ---------------------------------------------------------------------------

pub fn course_record(c: &str, title: &str, credits: f64, grade: &str) -> CourseRecord {
    let (subject, number) = c.split_once(' ').unwrap_or((c, ""));
    CourseRecord {
        subject: subject.to_string(),
        course_number: number.to_string(),
        title: Some(title.to_string()),
        credits: Some(credits),
        grade: Some(grade.to_string()),
        quality_points: None,
    }
}

/// Builder for [`TranscriptRecord`] fixtures.
#[derive(Debug, Clone, Default)]
pub struct TranscriptBuilder {
    record: TranscriptRecord,
}

impl TranscriptBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            record: TranscriptRecord {
                name: Some(name.to_string()),
                ..Default::default()
            },
        }
    }

    pub fn program(mut self, program: &str, major: &str) -> Self {
        self.record.program = Some(program.to_string());
        self.record.major = Some(major.to_string());
        self
    }

    pub fn earned_credits(mut self, credits: f64) -> Self {
        self.record.earned_credits = Some(credits);
        self
    }

    pub fn transfer(mut self, c: &str, title: &str, credits: f64, grade: &str) -> Self {
        self.record.transfer.push(course_record(c, title, credits, grade));
        self
    }

    /// Append a completed term of `(code, title, credits, grade)` rows.
    pub fn term(mut self, term: &str, courses: &[(&str, &str, f64, &str)]) -> Self {
        self.record.completed.push(TermRecord {
            term: term.to_string(),
            courses: courses
                .iter()
                .map(|(c, t, cr, g)| course_record(c, t, *cr, g))
                .collect(),
        });
        self
    }

    pub fn build(self) -> TranscriptRecord {
        self.record
    }
}

// ---------------------------------------------------------------------------
// Degrees and data directories
// ---------------------------------------------------------------------------

pub fn degree_document(name: &str, content: Value) -> DegreeDocument {
    serde_json::from_value(json!({ "name": name, "content": content }))
        .unwrap_or_else(|e| panic!("bad degree fixture: {e}"))
}

/// A requirement-course JSON object as found in degree documents.
pub fn requirement(c: &str, title: &str, credits: f64) -> Value {
    let (subject, number) = c.split_once(' ').unwrap_or((c, ""));
    json!({ "subject": subject, "course_number": number, "title": title, "credits": credits })
}

/// Write `courses.json` from the sample catalog and each degree document
/// under `degrees/` into a fresh temporary directory.
pub fn write_data_dir(degrees: &[(&str, Value)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let catalog = sample_catalog();
    let records: Vec<Value> = catalog
        .entries()
        .map(|e| {
            json!({
                "CourseCode": e.code.as_str(),
                "CourseTitle": e.title,
                "Credits": e.credits.to_string(),
                "Description": e.description,
                "Prerequisites": e.raw_prerequisite_text,
            })
        })
        .collect();
    write_json(&dir.path().join("courses.json"), &Value::Array(records));

    let degrees_dir = dir.path().join("degrees");
    std::fs::create_dir_all(&degrees_dir).unwrap_or_else(|e| panic!("create degrees dir: {e}"));
    for (file, doc) in degrees {
        write_json(&degrees_dir.join(file), doc);
    }
    dir
}

fn write_json(path: &Path, value: &Value) {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|e| panic!("encode: {e}"));
    std::fs::write(path, text).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
}

// ---------------------------------------------------------------------------
// Scripted generator
// ---------------------------------------------------------------------------

/// One recorded generator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub attempt: u32,
    pub prior_rejection: Option<String>,
    /// Content of the last user message in the conversation.
    pub last_user_message: String,
}

/// Generator that replays queued replies in order. When the queue is empty
/// it fails with [`GeneratorError::EmptyResponse`].
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GeneratorError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()))
    }

    /// Queue a reply whose `<recommendation>` section lists `courses`.
    pub fn recommend(self, courses: &[&str]) -> Self {
        self.reply(format!(
            "Here is my plan.\n<recommendation>\n{}\n</recommendation>",
            courses.join("\n")
        ))
    }

    pub fn fail(self, error: GeneratorError) -> Self {
        self.push(Err(error))
    }

    fn push(self, reply: Result<String, GeneratorError>) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl CandidateGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, GeneratorError> {
        let last_user_message = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                attempt: request.attempt,
                prior_rejection: request.prior_rejection.map(str::to_owned),
                last_user_message,
            });
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Err(GeneratorError::EmptyResponse))
    }
}
