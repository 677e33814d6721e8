//! Section-by-section reconciliation of a degree against a completed set.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::catalog::CreditRange;
use crate::transcript::CompletedCourses;

use super::{DegreeRequirementSection, GroupKind, RequirementKey};

/// A requirement the student has not yet met.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutstandingCourse {
    pub title: String,
    pub credits: Option<f64>,
}

/// Reconciled state of one requirement section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionStatus {
    pub name: String,
    pub credit_range: CreditRange,
    pub completed_credits: f64,
    pub outstanding: BTreeMap<RequirementKey, OutstandingCourse>,
    pub is_complete: bool,
}

/// Reconciliation of every quota-bearing section, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DegreeReconciliation {
    pub sections: Vec<SectionStatus>,
}

impl DegreeReconciliation {
    pub fn section(&self, name: &str) -> Option<&SectionStatus> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn is_complete(&self) -> bool {
        self.sections.iter().all(|s| s.is_complete)
    }

    pub fn incomplete(&self) -> impl Iterator<Item = &SectionStatus> {
        self.sections.iter().filter(|s| !s.is_complete)
    }
}

/// Reconcile requirement sections against completed courses.
///
/// An `or` group with no completed course lists all of its courses as
/// outstanding; an `and` group lists each course not completed. Completed
/// credits sum the requirement's pinned credits (falling back to the
/// transcript's) for each distinct completed course named in the section.
///
/// A section is complete when completed credits reach either bound of its
/// quota, or independently when nothing is outstanding. Entries that are not
/// course codes are never completed.
pub fn reconcile_degree(
    sections: &[DegreeRequirementSection],
    completed: &CompletedCourses,
) -> DegreeReconciliation {
    let sections = sections
        .iter()
        .map(|section| reconcile_section(section, completed))
        .collect();
    DegreeReconciliation { sections }
}

fn reconcile_section(section: &DegreeRequirementSection, completed: &CompletedCourses) -> SectionStatus {
    let mut outstanding = BTreeMap::new();
    let mut counted: BTreeSet<&RequirementKey> = BTreeSet::new();
    let mut completed_credits = 0.0;

    for group in &section.groups {
        let done: Vec<_> = group
            .courses
            .iter()
            .filter(|c| c.is_completed(completed))
            .collect();

        let missing = group.courses.iter().filter(|c| match group.kind {
            GroupKind::AnyOne => done.is_empty(),
            GroupKind::All => !c.is_completed(completed),
        });
        for course in missing {
            outstanding
                .entry(course.code.clone())
                .or_insert_with(|| OutstandingCourse {
                    title: course.title.clone(),
                    credits: course.credits,
                });
        }

        for course in done {
            if counted.insert(&course.code) {
                let credits = course
                    .credits
                    .or_else(|| {
                        let code = course.code.course()?;
                        completed.get(code).map(|c| c.credits)
                    })
                    .unwrap_or(0.0);
                completed_credits += credits;
            }
        }
    }

    let range = section.credit_range;
    let meets_quota = completed_credits >= range.min || completed_credits >= range.max;
    let is_complete = meets_quota || outstanding.is_empty();
    debug!(
        section = %section.name,
        completed_credits,
        outstanding = outstanding.len(),
        is_complete,
        "section reconciled"
    );

    SectionStatus {
        name: section.name.clone(),
        credit_range: range,
        completed_credits,
        outstanding,
        is_complete,
    }
}
