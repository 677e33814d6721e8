//! Record types for the JSON documents the engine consumes.
//!
//! These map directly to the output of the catalog scraper, the transcript
//! extractor, and the degree-program scraper. Field values in those files
//! are loosely typed (credits appear as `3`, `"3.000"`, or `null`), so the
//! numeric and text fields go through lenient deserializers.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Lenient field helpers
// ---------------------------------------------------------------------------

/// Accept a string, a number, or `null` and yield optional text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected text or number, got {other}"
        ))),
    }
}

/// Accept a number, a numeric string, or `null` and yield an optional `f64`.
/// Blank strings are treated as `null`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected a number, got {s:?}"))),
        Some(other) => Err(de::Error::custom(format!("expected a number, got {other}"))),
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One course as emitted by the catalog scraper (`courses.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Subject and number, e.g. `"CS 04103"`.
    #[serde(rename = "CourseCode")]
    pub code: String,
    #[serde(rename = "CourseTitle", default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    /// Raw credit text: `"3"`, `"1 to 3"`, or absent.
    #[serde(rename = "Credits", default, deserialize_with = "lenient_text")]
    pub credits: Option<String>,
    /// Full catalog text, which embeds labeled sections such as
    /// `Prerequisite Courses: ...`.
    #[serde(rename = "Description", default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    /// Short prerequisite field (link texts joined with commas).
    #[serde(rename = "Prerequisites", default, deserialize_with = "lenient_text")]
    pub prerequisites: Option<String>,
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// A parsed student transcript.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TranscriptRecord {
    #[serde(default)]
    pub name: Option<String>,
    /// Degree program(s), comma separated for double majors
    /// (e.g. `"Bachelor of Science, Bachelor of Arts"`).
    #[serde(default)]
    pub program: Option<String>,
    /// Major(s), positionally paired with `program`.
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub concentration: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub earned_credits: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub gpa: Option<f64>,
    /// Credit accepted from other institutions.
    #[serde(default)]
    pub transfer: Vec<CourseRecord>,
    /// Finished terms, oldest first.
    #[serde(default)]
    pub completed: Vec<TermRecord>,
    /// Terms currently underway.
    #[serde(default)]
    pub inprogress: Vec<TermRecord>,
}

impl TranscriptRecord {
    /// Pair each program with its major, splitting the comma-separated
    /// transcript fields. Extra majors reuse the last listed program.
    pub fn program_majors(&self) -> Vec<(String, String)> {
        let programs: Vec<&str> = self
            .program
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        let majors = self
            .major
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty());

        majors
            .enumerate()
            .filter_map(|(i, major)| {
                let program = programs.get(i).or(programs.last())?;
                Some((program.to_string(), major.to_string()))
            })
            .collect()
    }
}

/// One academic term and its courses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRecord {
    pub term: String,
    #[serde(default)]
    pub courses: Vec<CourseRecord>,
}

/// A course line on a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub subject: String,
    pub course_number: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub credits: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub quality_points: Option<f64>,
}

impl CourseRecord {
    /// `"<subject> <course_number>"`, unvalidated.
    pub fn code_text(&self) -> String {
        format!("{} {}", self.subject.trim(), self.course_number.trim())
    }
}

// ---------------------------------------------------------------------------
// Degree documents
// ---------------------------------------------------------------------------

/// A degree program document (`degrees/<program>.json`).
///
/// `content` maps section headings (e.g. `"Major Requirements 32-33 s.h."`)
/// to loosely structured values: an object with a `requirements` list, a
/// list of prose/course lines, or notes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DegreeDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Map<String, Value>,
}

/// A group of courses inside a section's `requirements` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementGroupRecord {
    /// `"and"` (take every course) or `"or"` (take any one).
    #[serde(rename = "type", default = "default_group_type")]
    pub kind: String,
    #[serde(default)]
    pub courses: Vec<RequirementCourseRecord>,
}

/// A course entry within a requirement group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementCourseRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub course_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub credits: Option<f64>,
}

impl RequirementCourseRecord {
    /// `"<subject> <course_number>"` when both parts are present.
    pub fn code_text(&self) -> Option<String> {
        let subject = self.subject.as_deref()?.trim();
        let number = self.course_number.as_deref()?.trim();
        if subject.is_empty() || number.is_empty() {
            return None;
        }
        Some(format!("{subject} {number}"))
    }
}

fn default_group_type() -> String {
    "and".to_string()
}

/// The shape of one degree-document section value.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    /// Object carrying a `requirements` list (plus optional notes).
    Requirements {
        groups: Vec<RequirementGroupRecord>,
        /// Entries of the `requirements` list that are not valid groups.
        malformed: Vec<MalformedGroup>,
        notes: Vec<String>,
    },
    /// Plain list of text lines.
    Lines(Vec<String>),
    /// Anything else (object of notes only, scalars).
    Other,
}

/// A `requirements` entry that failed to deserialize, kept with its raw
/// value so callers can report it.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedGroup {
    pub raw: Value,
    pub error: String,
}

impl DegreeDocument {
    /// Iterate sections in document order, classifying each body.
    ///
    /// Requirement groups that do not deserialize land in `malformed`.
    pub fn sections(&self) -> impl Iterator<Item = (&str, SectionBody)> + '_ {
        self.content
            .iter()
            .map(|(heading, value)| (heading.as_str(), classify_section(value)))
    }
}

fn classify_section(value: &Value) -> SectionBody {
    match value {
        Value::Object(obj) => match obj.get("requirements") {
            Some(Value::Array(items)) => {
                let mut groups = Vec::new();
                let mut malformed = Vec::new();
                for item in items {
                    match serde_json::from_value::<RequirementGroupRecord>(item.clone()) {
                        Ok(group) => groups.push(group),
                        Err(e) => malformed.push(MalformedGroup {
                            raw: item.clone(),
                            error: e.to_string(),
                        }),
                    }
                }
                SectionBody::Requirements {
                    groups,
                    malformed,
                    notes: string_items(obj.get("notes")),
                }
            }
            _ => SectionBody::Other,
        },
        Value::Array(_) => SectionBody::Lines(string_items(Some(value))),
        _ => SectionBody::Other,
    }
}

fn string_items(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_record_accepts_null_and_numeric_fields() {
        let rec: CatalogRecord = serde_json::from_value(json!({
            "CourseCode": "CS 04103",
            "CourseTitle": "Data Structures",
            "Credits": 3,
            "Description": null,
            "Prerequisites": null
        }))
        .expect("should deserialize");
        assert_eq!(rec.credits.as_deref(), Some("3"));
        assert!(rec.description.is_none());
        assert!(rec.prerequisites.is_none());
    }

    #[test]
    fn course_record_parses_string_numbers() {
        let rec: CourseRecord = serde_json::from_value(json!({
            "subject": "MATH",
            "course_number": "01131",
            "title": "Calculus I",
            "credits": "4.000",
            "grade": "B+",
            "quality_points": "13.200"
        }))
        .expect("should deserialize");
        assert_eq!(rec.credits, Some(4.0));
        assert_eq!(rec.quality_points, Some(13.2));
        assert_eq!(rec.code_text(), "MATH 01131");
    }

    #[test]
    fn course_record_rejects_garbage_credits() {
        let err = serde_json::from_value::<CourseRecord>(json!({
            "subject": "MATH",
            "course_number": "01131",
            "credits": "four"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("expected a number"));
    }

    #[test]
    fn program_majors_pairs_double_majors() {
        let t = TranscriptRecord {
            program: Some("Bachelor of Science, Bachelor of Arts".into()),
            major: Some("Computer Science, Philosophy".into()),
            ..Default::default()
        };
        assert_eq!(
            t.program_majors(),
            vec![
                ("Bachelor of Science".to_string(), "Computer Science".to_string()),
                ("Bachelor of Arts".to_string(), "Philosophy".to_string()),
            ]
        );
    }

    #[test]
    fn program_majors_reuses_last_program() {
        let t = TranscriptRecord {
            program: Some("Bachelor of Science".into()),
            major: Some("Mathematics, Physics".into()),
            ..Default::default()
        };
        let pairs = t.program_majors();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].0, "Bachelor of Science");
    }

    #[test]
    fn degree_sections_keep_document_order_and_shape() {
        let doc: DegreeDocument = serde_json::from_value(json!({
            "name": "Computer Science",
            "content": {
                "Computer Science Program": ["A rigorous program."],
                "Major Requirements 11 s.h.": {
                    "requirements": [
                        {"type": "and", "courses": [
                            {"subject": "CS", "course_number": "01100", "title": "Intro", "credits": 3}
                        ]},
                        {"type": "or", "courses": []},
                        "not a group"
                    ],
                    "notes": ["Grade of C- or better."]
                },
                "Free Electives": {"notes": ["Any course."]}
            }
        }))
        .expect("should deserialize");

        let sections: Vec<(&str, SectionBody)> = doc.sections().collect();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].0, "Computer Science Program");
        assert!(matches!(sections[0].1, SectionBody::Lines(ref l) if l.len() == 1));
        match &sections[1].1 {
            SectionBody::Requirements {
                groups,
                malformed,
                notes,
            } => {
                assert_eq!(groups.len(), 2);
                assert_eq!(malformed.len(), 1);
                assert_eq!(malformed[0].raw, json!("not a group"));
                assert_eq!(groups[0].courses[0].code_text().as_deref(), Some("CS 01100"));
                assert_eq!(notes, &vec!["Grade of C- or better.".to_string()]);
            }
            other => panic!("expected requirements, got {other:?}"),
        }
        assert_eq!(sections[2].1, SectionBody::Other);
    }

    #[test]
    fn group_type_defaults_to_and() {
        let g: RequirementGroupRecord =
            serde_json::from_value(json!({"courses": []})).expect("should deserialize");
        assert_eq!(g.kind, "and");
    }
}
