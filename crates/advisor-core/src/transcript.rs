//! Grade policy and the completed-course set derived from a transcript.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use advisor_data::models::{CourseRecord, TranscriptRecord};

use crate::code::CourseCode;
use crate::prereq::CourseSet;

// ---------------------------------------------------------------------------
// Grades
// ---------------------------------------------------------------------------

/// Lowest quality-point value that counts as passing (C-).
pub const PASSING_QUALITY: f64 = 1.7;

/// A transcript grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    DPlus,
    D,
    DMinus,
    F,
    Withdrawn,
    /// Transfer credit without a letter grade (`TR`, `T`).
    Transfer,
}

impl Grade {
    /// Quality points for letter grades; `None` for `W` and `TR`.
    pub fn quality_points(&self) -> Option<f64> {
        let points = match self {
            Self::A => 4.0,
            Self::AMinus => 3.7,
            Self::BPlus => 3.3,
            Self::B => 3.0,
            Self::BMinus => 2.7,
            Self::CPlus => 2.3,
            Self::C => 2.0,
            Self::CMinus => 1.7,
            Self::DPlus => 1.3,
            Self::D => 1.0,
            Self::DMinus => 0.7,
            Self::F => 0.0,
            Self::Withdrawn | Self::Transfer => return None,
        };
        Some(points)
    }

    /// Letter grade of C- or better.
    pub fn is_passing(&self) -> bool {
        self.quality_points().is_some_and(|q| q >= PASSING_QUALITY)
    }

    fn parse_letter(s: &str) -> Option<Self> {
        let grade = match s {
            "A" => Self::A,
            "A-" => Self::AMinus,
            "B+" => Self::BPlus,
            "B" => Self::B,
            "B-" => Self::BMinus,
            "C+" => Self::CPlus,
            "C" => Self::C,
            "C-" => Self::CMinus,
            "D+" => Self::DPlus,
            "D" => Self::D,
            "D-" => Self::DMinus,
            "F" => Self::F,
            _ => return None,
        };
        Some(grade)
    }

    /// Parse a grade from a transfer record, where letter grades may carry
    /// a trailing `T` (e.g. `BT`, `A-T`).
    pub fn parse_transfer(s: &str) -> Result<Self, GradeParseError> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "TR" | "T" => Ok(Self::Transfer),
            other => Self::parse_letter(other.strip_suffix('T').unwrap_or(other))
                .ok_or_else(|| GradeParseError(s.to_owned())),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::DMinus => "D-",
            Self::F => "F",
            Self::Withdrawn => "withdrawn",
            Self::Transfer => "transferred",
        };
        f.write_str(s)
    }
}

impl FromStr for Grade {
    type Err = GradeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "W" | "WITHDRAWN" => Ok(Self::Withdrawn),
            "TR" => Ok(Self::Transfer),
            other => Self::parse_letter(other).ok_or_else(|| GradeParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an unrecognized [`Grade`] string.
#[derive(Debug, Clone)]
pub struct GradeParseError(pub String);

impl fmt::Display for GradeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized grade: {:?}", self.0)
    }
}

impl std::error::Error for GradeParseError {}

// ---------------------------------------------------------------------------
// Completed courses
// ---------------------------------------------------------------------------

/// A course that counts as completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedCourse {
    pub code: CourseCode,
    pub title: String,
    pub credits: f64,
    pub grade: Grade,
    /// Term the course was taken, `None` for transfer credit.
    pub term: Option<String>,
}

/// Completed-course set: transfer credit plus passing term courses.
///
/// A later passing attempt replaces an earlier one; failing or withdrawn
/// attempts never remove a completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompletedCourses {
    courses: BTreeMap<CourseCode, CompletedCourse>,
}

impl CompletedCourses {
    pub fn from_transcript(transcript: &TranscriptRecord) -> Self {
        let mut out = Self::default();

        for record in &transcript.transfer {
            let credits = record.credits.unwrap_or(0.0);
            let grade = record
                .grade
                .as_deref()
                .map(Grade::parse_transfer)
                .unwrap_or(Ok(Grade::Transfer));
            match grade {
                Ok(grade) if credits > 0.0 && (grade == Grade::Transfer || grade.is_passing()) => {
                    out.insert_record(record, grade, None);
                }
                _ => debug!(course = %record.code_text(), "transfer record not counted"),
            }
        }

        for term in &transcript.completed {
            for record in &term.courses {
                let grade = record.grade.as_deref().map(str::parse::<Grade>);
                match grade {
                    Some(Ok(grade)) if grade.is_passing() => {
                        out.insert_record(record, grade, Some(term.term.clone()));
                    }
                    _ => debug!(course = %record.code_text(), term = %term.term, "course not passed"),
                }
            }
        }
        out
    }

    fn insert_record(&mut self, record: &CourseRecord, grade: Grade, term: Option<String>) {
        let Ok(code) = CourseCode::parse(&record.code_text()) else {
            debug!(course = %record.code_text(), "transcript course code not recognized");
            return;
        };
        self.insert(CompletedCourse {
            code,
            title: record.title.clone().unwrap_or_default(),
            credits: record.credits.unwrap_or(0.0),
            grade,
            term,
        });
    }

    pub fn insert(&mut self, course: CompletedCourse) {
        self.courses.insert(course.code.clone(), course);
    }

    pub fn get(&self, code: &CourseCode) -> Option<&CompletedCourse> {
        self.courses.get(code)
    }

    pub fn contains(&self, code: &CourseCode) -> bool {
        self.courses.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompletedCourse> {
        self.courses.values()
    }
}

impl CourseSet for CompletedCourses {
    fn contains_code(&self, code: &CourseCode) -> bool {
        self.contains(code)
    }
}

impl FromIterator<CompletedCourse> for CompletedCourses {
    fn from_iter<I: IntoIterator<Item = CompletedCourse>>(iter: I) -> Self {
        let mut out = Self::default();
        for course in iter {
            out.insert(course);
        }
        out
    }
}
