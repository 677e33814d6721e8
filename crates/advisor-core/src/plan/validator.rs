//! Judging a candidate plan against the completed set and the catalog.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::catalog::{CatalogIndex, CreditRange, format_credits};
use crate::code::CourseCode;
use crate::prereq::{CourseSet, ParseOutcome, PrerequisiteParse, SearchOverflow, minimal_unlocking_set};

/// Credits a plan may fall below its target and still be accepted.
pub const CREDIT_SLACK: f64 = 3.0;

// ---------------------------------------------------------------------------
// Catalog access
// ---------------------------------------------------------------------------

/// What the validator needs to know about one course.
#[derive(Debug, Clone, Copy)]
pub struct CourseFacts<'a> {
    pub title: &'a str,
    pub credits: CreditRange,
    pub prerequisite: &'a PrerequisiteParse,
}

/// Read access to course facts by code.
pub trait CatalogLookup {
    fn course_facts(&self, code: &CourseCode) -> Option<CourseFacts<'_>>;
}

impl CatalogLookup for CatalogIndex {
    fn course_facts(&self, code: &CourseCode) -> Option<CourseFacts<'_>> {
        let entry = self.lookup_by_code(code)?;
        let prerequisite = self.prerequisite(code)?;
        Some(CourseFacts {
            title: &entry.title,
            credits: entry.credits,
            prerequisite,
        })
    }
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

/// A course that would help unlock a rejected candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemediationCourse {
    pub code: CourseCode,
    /// `None` when the course is referenced but not in the catalog.
    pub title: Option<String>,
    pub credits: Option<CreditRange>,
}

impl fmt::Display for RemediationCourse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.title, self.credits) {
            (Some(title), Some(credits)) => write!(f, "{} - {title} ({credits} credits)", self.code),
            _ => write!(f, "{} - not offered in the catalog", self.code),
        }
    }
}

/// Guidance attached to an unmet-prerequisite rejection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "detail")]
pub enum Remediation {
    /// The smallest set of additional courses that satisfies the prerequisite.
    Courses(Vec<RemediationCourse>),
    /// The prerequisite text could not be parsed; carries the original text.
    ManualReview(String),
    /// Too many missing courses to search for a minimal set.
    SearchTooLarge(SearchOverflow),
}

/// Why a plan was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Rejection {
    #[error("incorrect course format ({candidate})")]
    MalformedCode { candidate: String },

    #[error("course ({code}) already completed")]
    AlreadyCompleted { code: CourseCode },

    #[error("course ({code}) not found in catalog")]
    NotInCatalog { code: CourseCode },

    #[error("{}", unmet_message(.code, .remediation))]
    PrerequisitesUnmet {
        code: CourseCode,
        remediation: Remediation,
    },

    #[error(
        "sum of all course credits too high ({} > {target_credits}), remove {} credits from this recommendation",
        shown(.total_credits),
        shown(.excess)
    )]
    OverBudget {
        total_credits: f64,
        target_credits: u32,
        excess: f64,
    },

    #[error(
        "sum of all course credits too low ({} < {}), add {} more credits to this recommendation",
        shown(.total_credits),
        floor(.target_credits),
        shown(.shortfall)
    )]
    UnderBudget {
        total_credits: f64,
        target_credits: u32,
        shortfall: f64,
    },

    #[error("no courses recommended")]
    EmptyPlan,
}

fn shown(credits: &f64) -> String {
    format_credits(*credits)
}

fn floor(target_credits: &u32) -> String {
    format_credits(f64::from(*target_credits) - CREDIT_SLACK)
}

fn unmet_message(code: &CourseCode, remediation: &Remediation) -> String {
    let mut out = format!("course ({code}) is missing prerequisites\n");
    match remediation {
        Remediation::Courses(courses) => {
            out.push_str(&format!(
                "taking these courses will satisfy the prerequisites for ({code}):\n"
            ));
            for course in courses {
                out.push_str(&format!("\t{course}\n"));
            }
        }
        Remediation::ManualReview(text) => {
            out.push_str(&format!("the prerequisites could not be evaluated, review manually: {text}\n"));
        }
        Remediation::SearchTooLarge(overflow) => {
            out.push_str(&format!("{overflow}\n"));
        }
    }
    out
}

/// Discriminant of a [`Rejection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    MalformedCode,
    AlreadyCompleted,
    NotInCatalog,
    PrerequisitesUnmet,
    OverBudget,
    UnderBudget,
    EmptyPlan,
}

impl Rejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::MalformedCode { .. } => RejectionKind::MalformedCode,
            Self::AlreadyCompleted { .. } => RejectionKind::AlreadyCompleted,
            Self::NotInCatalog { .. } => RejectionKind::NotInCatalog,
            Self::PrerequisitesUnmet { .. } => RejectionKind::PrerequisitesUnmet,
            Self::OverBudget { .. } => RejectionKind::OverBudget,
            Self::UnderBudget { .. } => RejectionKind::UnderBudget,
            Self::EmptyPlan => RejectionKind::EmptyPlan,
        }
    }

    /// The course the rejection is about, if any.
    pub fn course(&self) -> Option<&CourseCode> {
        match self {
            Self::AlreadyCompleted { code }
            | Self::NotInCatalog { code }
            | Self::PrerequisitesUnmet { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Outcome of validating one candidate plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "verdict")]
pub enum ValidationVerdict {
    Accepted {
        courses: Vec<CourseCode>,
        total_credits: f64,
    },
    Rejected { rejection: Rejection },
}

impl ValidationVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected { rejection } => Some(rejection),
            Self::Accepted { .. } => None,
        }
    }
}

impl From<Rejection> for ValidationVerdict {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected { rejection }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate `candidates` in order, stopping at the first rejected course,
/// then check the credit total against `target_credits`.
///
/// Each candidate must be exactly one course code (any case, surrounding
/// whitespace allowed); anything else is a malformed candidate. Repeated
/// codes count once. Effective credits are the upper bound of each course's range.
pub fn validate_plan<S, C>(
    completed: &S,
    catalog: &C,
    candidates: &[String],
    target_credits: u32,
) -> ValidationVerdict
where
    S: CourseSet + ?Sized,
    C: CatalogLookup + ?Sized,
{
    if candidates.is_empty() {
        return Rejection::EmptyPlan.into();
    }

    let mut seen = BTreeSet::new();
    let mut courses = Vec::with_capacity(candidates.len());
    let mut total_credits = 0.0;

    for candidate in candidates {
        let Ok(code) = CourseCode::parse(candidate) else {
            return Rejection::MalformedCode {
                candidate: candidate.clone(),
            }
            .into();
        };
        if !seen.insert(code.clone()) {
            debug!(%code, "duplicate candidate ignored");
            continue;
        }
        if completed.contains_code(&code) {
            return Rejection::AlreadyCompleted { code }.into();
        }
        let Some(facts) = catalog.course_facts(&code) else {
            return Rejection::NotInCatalog { code }.into();
        };
        if let Some(remediation) = check_prerequisites(facts.prerequisite, completed, catalog) {
            return Rejection::PrerequisitesUnmet { code, remediation }.into();
        }

        total_credits += facts.credits.effective();
        courses.push(code);
    }

    let target = f64::from(target_credits);
    if total_credits > target {
        return Rejection::OverBudget {
            total_credits,
            target_credits,
            excess: total_credits - target,
        }
        .into();
    }
    if total_credits < target - CREDIT_SLACK {
        return Rejection::UnderBudget {
            total_credits,
            target_credits,
            shortfall: target - total_credits,
        }
        .into();
    }

    debug!(courses = courses.len(), total_credits, "plan accepted");
    ValidationVerdict::Accepted {
        courses,
        total_credits,
    }
}

/// `None` when the prerequisite holds, otherwise the remediation to report.
fn check_prerequisites<S, C>(
    parse: &PrerequisiteParse,
    completed: &S,
    catalog: &C,
) -> Option<Remediation>
where
    S: CourseSet + ?Sized,
    C: CatalogLookup + ?Sized,
{
    match &parse.outcome {
        ParseOutcome::NoPrerequisite => None,
        ParseOutcome::Invalid { text, .. } => Some(Remediation::ManualReview(text.clone())),
        ParseOutcome::Parsed { expression } => {
            if expression.is_satisfied_by(completed) {
                return None;
            }
            let remediation = match minimal_unlocking_set(Some(expression), completed) {
                Ok(codes) => Remediation::Courses(
                    codes
                        .into_iter()
                        .map(|code| {
                            let facts = catalog.course_facts(&code);
                            RemediationCourse {
                                title: facts.map(|f| f.title.to_string()),
                                credits: facts.map(|f| f.credits),
                                code,
                            }
                        })
                        .collect(),
                ),
                Err(overflow) => Remediation::SearchTooLarge(overflow),
            };
            Some(remediation)
        }
    }
}
