//! `advisor validate` command: check a hand-written plan.

use anyhow::{Result, bail};

use advisor_core::catalog::{CatalogIndex, format_credits};
use advisor_core::plan::{ValidationVerdict, validate_plan};
use advisor_core::transcript::CompletedCourses;

/// Validate `courses` against the transcript and catalog. A rejected plan
/// is reported and turned into an error so the exit status reflects it.
pub fn run_validate(
    index: &CatalogIndex,
    completed: &CompletedCourses,
    courses: &[String],
    target_credits: u32,
    json: bool,
) -> Result<()> {
    let verdict = validate_plan(completed, index, courses, target_credits);

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
        return match verdict.rejection() {
            Some(rejection) => bail!("plan rejected ({:?})", rejection.kind()),
            None => Ok(()),
        };
    }

    match verdict {
        ValidationVerdict::Accepted {
            courses,
            total_credits,
        } => {
            println!(
                "Plan accepted: {} credits (target {target_credits})",
                format_credits(total_credits)
            );
            for code in &courses {
                if let Some(entry) = index.lookup_by_code(code) {
                    println!("  {} - {} ({} credits)", entry.code, entry.title, entry.credits);
                }
            }
            Ok(())
        }
        ValidationVerdict::Rejected { rejection } => {
            bail!("plan rejected: {rejection}")
        }
    }
}
