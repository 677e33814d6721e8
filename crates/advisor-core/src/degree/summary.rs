//! Human-readable program overview: total credits, description, required
//! courses, choose-one groups and restricted electives.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use advisor_data::models::{DegreeDocument, RequirementCourseRecord, SectionBody};

use crate::catalog::format_credits;

use super::GroupKind;

static TOTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*s\.h\.").expect("valid regex"));

static COURSE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<subject>[A-Z]{2,5})\s+(?P<number>\d{3,5})\s*-\s*(?P<title>.*?)(?:\s+Credits:\s*(?P<credits>\d+(?:\s*to\s*\d+)?))?$",
    )
    .expect("valid regex")
});

static LOOKS_LIKE_COURSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{2,5}\s+\d{3,5}").expect("valid regex"));

/// Headings left out of the overview.
const SKIPPED_SECTIONS: &[&str] = &[
    "rowan core",
    "rowan experience",
    "free elective",
    "total required",
];

/// A course as listed in the overview. Codes are kept as written since
/// list sections use three-digit legacy numbers too.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCourse {
    pub code: String,
    pub title: Option<String>,
    /// Credit text (`"3"`, `"3 to 6"`), absent when unspecified.
    pub credits: Option<String>,
}

impl SummaryCourse {
    fn from_record(record: &RequirementCourseRecord) -> Option<Self> {
        Some(Self {
            code: record.code_text()?,
            title: record.title.clone().filter(|t| !t.trim().is_empty()),
            credits: record.credits.filter(|c| *c > 0.0).map(format_credits),
        })
    }

    /// Parse a list line such as `"CMS 04323 - Images of Athletes Credits: 3"`.
    fn from_line(line: &str) -> Option<Self> {
        let caps = COURSE_LINE.captures(line.trim())?;
        let title = caps["title"].trim();
        let title = title
            .strip_suffix("Credits:")
            .or_else(|| title.strip_suffix("Credits"))
            .unwrap_or(title)
            .trim();
        Some(Self {
            code: format!("{} {}", &caps["subject"], &caps["number"]),
            title: (!title.is_empty()).then(|| title.to_string()),
            credits: caps.name("credits").map(|m| m.as_str().trim().to_string()),
        })
    }
}

impl fmt::Display for SummaryCourse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.code,
            self.title.as_deref().unwrap_or("(title not specified)")
        )?;
        match &self.credits {
            Some(credits) => write!(f, " ({credits} credits)"),
            None => f.write_str(" (credits not specified)"),
        }
    }
}

/// Overview of a degree program.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgramSummary {
    pub name: String,
    pub total_credits: Option<u32>,
    pub description: Option<String>,
    pub required: Vec<SummaryCourse>,
    pub choose_one: Vec<Vec<SummaryCourse>>,
    pub restricted_electives: Vec<SummaryCourse>,
    pub restricted_credits: Option<u32>,
}

impl ProgramSummary {
    pub fn from_document(doc: &DegreeDocument) -> Self {
        let name = doc.name.clone().unwrap_or_else(|| "Unknown Degree".to_string());
        let mut summary = Self {
            total_credits: total_credits(doc),
            description: description(doc, &name),
            name,
            ..Self::default()
        };

        for (heading, body) in doc.sections() {
            let lower = heading.to_lowercase();
            if SKIPPED_SECTIONS.iter().any(|s| lower.contains(s)) {
                continue;
            }
            let restricted = lower.contains("elective");
            if restricted && summary.restricted_credits.is_none() {
                summary.restricted_credits = leading_credit_figure(heading);
            }

            match body {
                SectionBody::Requirements { groups, .. } => {
                    for group in &groups {
                        let courses = group.courses.iter().filter_map(SummaryCourse::from_record);
                        match GroupKind::from_document(&group.kind) {
                            GroupKind::AnyOne => {
                                let options: Vec<_> = courses.collect();
                                if options.len() > 1 {
                                    summary.choose_one.push(options);
                                }
                            }
                            GroupKind::All if restricted => {
                                summary.restricted_electives.extend(courses);
                            }
                            GroupKind::All => summary.required.extend(courses),
                        }
                    }
                }
                SectionBody::Lines(lines) => {
                    let courses = lines
                        .iter()
                        .filter(|l| !matches!(l.as_str(), "AND" | "OR"))
                        .filter(|l| LOOKS_LIKE_COURSE.is_match(l))
                        .filter_map(|l| SummaryCourse::from_line(l));
                    if restricted {
                        summary.restricted_electives.extend(courses);
                    } else {
                        summary.required.extend(courses);
                    }
                }
                SectionBody::Other => {}
            }
        }
        summary
    }
}

fn leading_credit_figure(text: &str) -> Option<u32> {
    TOTAL.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Total program credits from a "Total Required Credits" section: its
/// heading first, then its notes or lines.
pub fn total_credits(doc: &DegreeDocument) -> Option<u32> {
    doc.content
        .iter()
        .filter(|(heading, _)| heading.to_lowercase().contains("total required credits"))
        .find_map(|(heading, value)| {
            leading_credit_figure(heading).or_else(|| {
                let items = match value {
                    Value::Object(obj) => obj.get("notes").and_then(Value::as_array),
                    Value::Array(items) => Some(items),
                    _ => None,
                }?;
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .find_map(leading_credit_figure)
            })
        })
}

/// First line of the first list section whose heading names the degree.
fn description(doc: &DegreeDocument, name: &str) -> Option<String> {
    let name = name.to_lowercase();
    doc.sections().find_map(|(heading, body)| match body {
        SectionBody::Lines(lines) if heading.to_lowercase().contains(&name) => {
            lines.into_iter().next()
        }
        _ => None,
    })
}

impl fmt::Display for ProgramSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(total) = self.total_credits {
            writeln!(f, "Total Credits: {total}\n")?;
        }
        if let Some(description) = &self.description {
            writeln!(f, "Description: {description}\n")?;
        }
        if !self.required.is_empty() {
            writeln!(f, "Required Courses:")?;
            for course in &self.required {
                writeln!(f, "- {course}")?;
            }
            writeln!(f)?;
        }
        for group in &self.choose_one {
            writeln!(f, "Choose One:")?;
            for course in group {
                writeln!(f, "- {course}")?;
            }
            writeln!(f)?;
        }
        if !self.restricted_electives.is_empty() {
            match self.restricted_credits {
                Some(n) => writeln!(f, "Restricted Electives (Choose {n} credits):")?,
                None => writeln!(f, "Restricted Electives:")?,
            }
            for course in &self.restricted_electives {
                writeln!(f, "- {course}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document() -> DegreeDocument {
        serde_json::from_value(json!({
            "name": "Computer Science",
            "content": {
                "Computer Science Program": ["Study of computation.", "More prose."],
                "Rowan Core 30 s.h.": ["COMP 01111 - College Composition I Credits: 3"],
                "Major Requirements 9 s.h.": {
                    "requirements": [
                        {"type": "and", "courses": [
                            {"subject": "CS", "course_number": "01100", "title": "Intro", "credits": 3},
                            {"subject": null, "course_number": null, "title": "Any elective"}
                        ]},
                        {"type": "or", "courses": [
                            {"subject": "MATH", "course_number": "01130", "title": "Calculus I", "credits": 4},
                            {"subject": "MATH", "course_number": "01131", "title": "Calculus II", "credits": 4}
                        ]}
                    ]
                },
                "Restricted Electives 6 s.h.": [
                    "AND",
                    "CMS 04323 - Images of Athletes Credits: 3",
                    "HIST 05429 - Special Topics"
                ],
                "Total Required Credits": {"notes": ["Students need 120 s.h. to graduate."]}
            }
        }))
        .unwrap()
    }

    #[test]
    fn extracts_total_from_notes() {
        assert_eq!(total_credits(&document()), Some(120));
    }

    #[test]
    fn builds_overview_sections() {
        let summary = ProgramSummary::from_document(&document());
        assert_eq!(summary.description.as_deref(), Some("Study of computation."));
        assert_eq!(summary.required.len(), 1);
        assert_eq!(summary.choose_one.len(), 1);
        assert_eq!(summary.restricted_credits, Some(6));
        assert_eq!(summary.restricted_electives.len(), 2);
        assert_eq!(summary.restricted_electives[1].credits, None);
    }

    #[test]
    fn renders_course_lines() {
        let text = ProgramSummary::from_document(&document()).to_string();
        assert!(text.starts_with("Total Credits: 120\n\nDescription: Study of computation.\n"));
        assert!(text.contains("Required Courses:\n- CS 01100 - Intro (3 credits)\n"));
        assert!(text.contains("Choose One:\n- MATH 01130 - Calculus I (4 credits)\n"));
        assert!(text.contains("Restricted Electives (Choose 6 credits):\n"));
        assert!(text.contains("- HIST 05429 - Special Topics (credits not specified)"));
        assert!(!text.contains("COMP 01111"));
    }

    #[test]
    fn parses_list_line_with_credit_range() {
        let course = SummaryCourse::from_line("ART 01200 - Studio Credits: 3 to 6").unwrap();
        assert_eq!(course.code, "ART 01200");
        assert_eq!(course.title.as_deref(), Some("Studio"));
        assert_eq!(course.credits.as_deref(), Some("3 to 6"));
    }
}
