//! `advisor audit` command: reconcile a transcript against its degree
//! programs.

use std::fmt::Write as _;

use anyhow::Result;

use advisor_core::catalog::format_credits;
use advisor_core::degree::{DegreeProgram, DegreeReconciliation, ProgramSummary, reconcile_degree};
use advisor_core::transcript::CompletedCourses;

use crate::data::LabeledDegree;

/// Output options for the audit.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditOptions {
    /// Print the program overview before the reconciliation.
    pub summary: bool,
    /// Emit JSON instead of text.
    pub json: bool,
}

pub fn run_audit(
    degrees: &[LabeledDegree],
    completed: &CompletedCourses,
    options: AuditOptions,
) -> Result<()> {
    if options.json {
        let reports: serde_json::Map<String, serde_json::Value> = degrees
            .iter()
            .map(|degree| {
                let program = DegreeProgram::from_document(&degree.document);
                let reconciliation = reconcile_degree(&program.sections, completed);
                Ok((degree.label.clone(), serde_json::to_value(&reconciliation)?))
            })
            .collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for degree in degrees {
        if options.summary {
            print!("{}", ProgramSummary::from_document(&degree.document));
        }
        let program = DegreeProgram::from_document(&degree.document);
        let reconciliation = reconcile_degree(&program.sections, completed);
        print!("{}", render_reconciliation(&degree.label, &program, &reconciliation));
    }
    Ok(())
}

/// One line per section with its credit progress, followed by the
/// outstanding courses of each unfinished section.
pub fn render_reconciliation(
    label: &str,
    program: &DegreeProgram,
    reconciliation: &DegreeReconciliation,
) -> String {
    let mut out = String::with_capacity(1024);
    let _ = writeln!(out, "== {} ({label}) ==", program.name);
    if reconciliation.sections.is_empty() {
        out.push_str("No credit-bearing requirement sections found.\n\n");
        return out;
    }

    for section in &reconciliation.sections {
        let marker = if section.is_complete { "done" } else { "open" };
        let _ = writeln!(
            out,
            "[{marker}] {} ({} of {} credits)",
            section.name,
            format_credits(section.completed_credits),
            section.credit_range
        );
        if section.is_complete {
            continue;
        }
        for (code, course) in &section.outstanding {
            let credits = course
                .credits
                .map_or_else(|| "credits not specified".to_string(), |c| format!("{} credits", format_credits(c)));
            let _ = writeln!(out, "    {code} - {} ({credits})", course.title);
        }
    }

    let open = reconciliation.incomplete().count();
    if open == 0 {
        out.push_str("All requirement sections complete.\n");
    } else {
        let _ = writeln!(
            out,
            "{open} of {} sections still open.",
            reconciliation.sections.len()
        );
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use advisor_test_utils::{TranscriptBuilder, degree_document, requirement};

    #[test]
    fn renders_open_and_done_sections() {
        let document = degree_document(
            "Computer Science",
            json!({
                "Writing 3 s.h.": { "requirements": [
                    { "type": "and", "courses": [requirement("ENG 01101", "College Composition I", 3.0)] }
                ]},
                "Core 6 s.h.": { "requirements": [
                    { "type": "and", "courses": [
                        requirement("CS 01100", "Introduction to Programming", 3.0),
                        requirement("CS 01101", "Data Structures", 3.0)
                    ]}
                ]}
            }),
        );
        let transcript = TranscriptBuilder::new("Sam")
            .transfer("ENG 01101", "Composition", 3.0, "TR")
            .term("Fall 2024", &[("CS 01100", "Intro", 3.0, "B")])
            .build();
        let completed = CompletedCourses::from_transcript(&transcript);

        let program = DegreeProgram::from_document(&document);
        let reconciliation = reconcile_degree(&program.sections, &completed);
        let text = render_reconciliation("bs_cs", &program, &reconciliation);

        assert_eq!(
            text,
            "== Computer Science (bs_cs) ==\n\
             [done] Writing 3 s.h. (3 of 3 credits)\n\
             [open] Core 6 s.h. (3 of 6 credits)\n\
             \x20   CS 01101 - Data Structures (3 credits)\n\
             1 of 2 sections still open.\n\n"
        );
    }
}
