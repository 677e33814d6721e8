//! Degree requirement trees built from degree documents.
//!
//! A degree document maps section headings to bodies. Sections whose
//! heading carries a credit quota (`"Major Requirements 32-33 s.h."`) and
//! whose body lists requirement groups become [`DegreeRequirementSection`]s
//! that the reconciler checks against a transcript.

pub mod reconcile;
pub mod summary;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use tracing::warn;

use advisor_data::models::{
    DegreeDocument, MalformedGroup, RequirementCourseRecord, RequirementGroupRecord, SectionBody,
};

use crate::catalog::CreditRange;
use crate::code::CourseCode;
use crate::transcript::CompletedCourses;

pub use reconcile::{DegreeReconciliation, OutstandingCourse, SectionStatus, reconcile_degree};
pub use summary::ProgramSummary;

static QUOTA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3})\s?-?\s?(\d{1,3})?\s+s\.h\.").expect("valid regex")
});

/// Parse a credit quota such as `"11 s.h."` or `"32-33 s.h."` from a
/// section heading.
pub fn parse_quota(heading: &str) -> Option<CreditRange> {
    let caps = QUOTA.captures(heading)?;
    let min: f64 = caps.get(1)?.as_str().parse().ok()?;
    let max = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => min,
    };
    Some(CreditRange { min, max })
}

/// How a requirement group is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Every course is required (`"and"`).
    All,
    /// Any one course satisfies the group (`"or"`).
    AnyOne,
}

impl GroupKind {
    /// `"or"` (any case) is a choice group; everything else is required.
    pub fn from_document(kind: &str) -> Self {
        if kind.trim().eq_ignore_ascii_case("or") {
            Self::AnyOne
        } else {
            Self::All
        }
    }
}

/// Identifies a requirement entry.
///
/// Entries whose subject and number form a course code are matched against
/// the transcript. Anything else is kept verbatim as `Unrecognized`, which
/// no transcript can satisfy, so the entry stays outstanding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequirementKey {
    Course(CourseCode),
    Unrecognized(String),
}

impl RequirementKey {
    pub fn course(&self) -> Option<&CourseCode> {
        match self {
            Self::Course(code) => Some(code),
            Self::Unrecognized(_) => None,
        }
    }
}

impl From<CourseCode> for RequirementKey {
    fn from(code: CourseCode) -> Self {
        Self::Course(code)
    }
}

impl fmt::Display for RequirementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Course(code) => write!(f, "{code}"),
            Self::Unrecognized(text) => f.write_str(text),
        }
    }
}

impl Serialize for RequirementKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One course named by a requirement group, with the credits the degree
/// document pins for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementCourse {
    pub code: RequirementKey,
    pub title: String,
    pub credits: Option<f64>,
}

impl RequirementCourse {
    fn from_record(record: &RequirementCourseRecord) -> Self {
        let title = record.title.clone().unwrap_or_default();
        let code = match record.code_text() {
            Some(text) => match CourseCode::parse(&text) {
                Ok(code) => RequirementKey::Course(code),
                Err(_) => {
                    warn!(course = %text, "requirement entry is not a course code; kept as outstanding");
                    RequirementKey::Unrecognized(text)
                }
            },
            None => {
                let label = if title.trim().is_empty() {
                    UNNAMED_REQUIREMENT.to_string()
                } else {
                    title.trim().to_string()
                };
                warn!(entry = %label, "requirement entry has no course code; kept as outstanding");
                RequirementKey::Unrecognized(label)
            }
        };
        Self {
            code,
            title,
            credits: record.credits,
        }
    }

    /// Whether `completed` holds this course. Unrecognized entries never match.
    pub fn is_completed(&self, completed: &CompletedCourses) -> bool {
        self.code.course().is_some_and(|code| completed.contains(code))
    }
}

const UNNAMED_REQUIREMENT: &str = "(unnamed requirement)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementGroup {
    pub kind: GroupKind,
    pub courses: Vec<RequirementCourse>,
}

impl RequirementGroup {
    fn from_record(record: &RequirementGroupRecord) -> Self {
        Self {
            kind: GroupKind::from_document(&record.kind),
            courses: record.courses.iter().map(RequirementCourse::from_record).collect(),
        }
    }

    /// A group that failed to deserialize becomes a single unmet entry
    /// carrying its raw JSON.
    fn from_malformed(section: &str, group: &MalformedGroup) -> Self {
        warn!(section, error = %group.error, "malformed requirement group; kept as outstanding");
        Self {
            kind: GroupKind::All,
            courses: vec![RequirementCourse {
                code: RequirementKey::Unrecognized(group.raw.to_string()),
                title: format!("malformed requirement group: {}", group.error),
                credits: None,
            }],
        }
    }
}

/// A named, credit-bound collection of requirement groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreeRequirementSection {
    pub name: String,
    pub credit_range: CreditRange,
    pub groups: Vec<RequirementGroup>,
}

/// The reconcilable part of a degree document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreeProgram {
    pub name: String,
    /// Sections in document order.
    pub sections: Vec<DegreeRequirementSection>,
}

impl DegreeProgram {
    /// Collect every section that has both a credit quota in its heading and
    /// at least one requirement group.
    pub fn from_document(doc: &DegreeDocument) -> Self {
        let sections = doc
            .sections()
            .filter_map(|(heading, body)| {
                let credit_range = parse_quota(heading)?;
                let SectionBody::Requirements {
                    groups, malformed, ..
                } = body
                else {
                    return None;
                };
                if groups.is_empty() && malformed.is_empty() {
                    return None;
                }
                let groups = groups
                    .iter()
                    .map(RequirementGroup::from_record)
                    .chain(malformed.iter().map(|m| RequirementGroup::from_malformed(heading, m)))
                    .collect();
                Some(DegreeRequirementSection {
                    name: heading.to_string(),
                    credit_range,
                    groups,
                })
            })
            .collect();

        Self {
            name: doc.name.clone().unwrap_or_else(|| "Unknown Degree".to_string()),
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_single_and_ranged_quotas() {
        assert_eq!(
            parse_quota("Major Requirements 11 s.h."),
            Some(CreditRange { min: 11.0, max: 11.0 })
        );
        assert_eq!(
            parse_quota("Major Requirements 32-33 s.h."),
            Some(CreditRange { min: 32.0, max: 33.0 })
        );
        assert_eq!(
            parse_quota("Concentration 12 - 15 s.h."),
            Some(CreditRange { min: 12.0, max: 15.0 })
        );
        assert_eq!(parse_quota("Free Electives"), None);
    }

    #[test]
    fn group_kind_defaults_to_all() {
        assert_eq!(GroupKind::from_document("OR"), GroupKind::AnyOne);
        assert_eq!(GroupKind::from_document("and"), GroupKind::All);
        assert_eq!(GroupKind::from_document("unknown"), GroupKind::All);
    }

    #[test]
    fn program_keeps_quota_sections_with_groups() {
        let doc: DegreeDocument = serde_json::from_value(json!({
            "name": "Computer Science",
            "content": {
                "Computer Science Program": ["Overview."],
                "Major Requirements 11 s.h.": {
                    "requirements": [
                        {"type": "and", "courses": [
                            {"subject": "CS", "course_number": "01100", "title": "Intro", "credits": 3},
                            {"subject": null, "course_number": null, "title": "Elective"}
                        ]}
                    ]
                },
                "Empty Section 3 s.h.": {"requirements": []},
                "Notes Only": {"requirements": [{"type": "or", "courses": []}]}
            }
        }))
        .unwrap();

        let program = DegreeProgram::from_document(&doc);
        assert_eq!(program.name, "Computer Science");
        assert_eq!(program.sections.len(), 1);
        let section = &program.sections[0];
        assert_eq!(section.name, "Major Requirements 11 s.h.");
        assert_eq!(section.groups[0].courses.len(), 2);
        assert_eq!(section.groups[0].courses[0].credits, Some(3.0));
        assert_eq!(
            section.groups[0].courses[1].code,
            RequirementKey::Unrecognized("Elective".into())
        );
    }

    #[test]
    fn unparseable_entries_and_groups_are_kept() {
        let doc: DegreeDocument = serde_json::from_value(json!({
            "content": {
                "Major Core 6 s.h.": {"requirements": [
                    {"type": "and", "courses": [
                        {"subject": "ENGR", "course_number": "101", "title": "Engineering Clinic"},
                        {"subject": "WRITE", "course_number": "01100", "title": "Writing Arts"}
                    ]}
                ]},
                "Lab Science 4 s.h.": {"requirements": [
                    {"type": "or", "courses": {"subject": "BIO"}}
                ]}
            }
        }))
        .unwrap();

        let program = DegreeProgram::from_document(&doc);
        assert_eq!(program.sections.len(), 2);
        let keys: Vec<String> = program.sections[0].groups[0]
            .courses
            .iter()
            .map(|c| c.code.to_string())
            .collect();
        assert_eq!(keys, vec!["ENGR 101", "WRITE 01100"]);
        assert!(program.sections[0].groups[0].courses.iter().all(|c| c.code.course().is_none()));

        let lab = &program.sections[1].groups[0];
        assert_eq!(lab.kind, GroupKind::All);
        assert!(matches!(lab.courses[0].code, RequirementKey::Unrecognized(ref raw) if raw.contains("BIO")));
    }
}
