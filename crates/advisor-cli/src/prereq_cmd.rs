//! `advisor prereq` command: show a course's prerequisites, optionally
//! checked against a transcript.

use std::fmt::Write as _;

use anyhow::{Context, Result};

use advisor_core::catalog::CatalogIndex;
use advisor_core::code::CourseCode;
use advisor_core::prereq::{ParseOutcome, minimal_unlocking_set};
use advisor_core::prereq::report::render_status;
use advisor_core::transcript::CompletedCourses;

pub fn run_prereq(
    index: &CatalogIndex,
    code: &CourseCode,
    completed: Option<&CompletedCourses>,
) -> Result<()> {
    print!("{}", render_prereq(index, code, completed)?);
    Ok(())
}

/// Without a transcript only the expression is shown; with one, the status
/// tree plus the smallest set of courses that would unlock the course.
pub fn render_prereq(
    index: &CatalogIndex,
    code: &CourseCode,
    completed: Option<&CompletedCourses>,
) -> Result<String> {
    let entry = index
        .lookup_by_code(code)
        .with_context(|| format!("course {code} not found in catalog"))?;
    let parse = index
        .prerequisite(code)
        .with_context(|| format!("no prerequisite entry for {code}"))?;

    let mut out = String::with_capacity(512);
    let _ = writeln!(out, "{} - {}", entry.code, entry.title);

    let Some(completed) = completed else {
        match &parse.outcome {
            ParseOutcome::NoPrerequisite => out.push_str("Prerequisites: None\n"),
            ParseOutcome::Parsed { expression } => {
                let _ = writeln!(out, "Prerequisites: {expression}");
            }
            ParseOutcome::Invalid { text, reason } => {
                let _ = writeln!(out, "Prerequisites (unparsed, {reason}): {text}");
            }
        }
        if !parse.unresolved.is_empty() {
            let codes: Vec<&str> = parse.unresolved.iter().map(CourseCode::as_str).collect();
            let _ = writeln!(out, "Not offered in the catalog: {}", codes.join(", "));
        }
        return Ok(out);
    };

    out.push_str(&render_status(parse, completed));
    out.push('\n');

    if let Some(expression) = parse.expression() {
        match minimal_unlocking_set(Some(expression), completed) {
            Ok(codes) if codes.is_empty() => {}
            Ok(codes) => {
                out.push_str("\nTake these courses to unlock it:\n");
                for unlock in &codes {
                    match index.lookup_by_code(unlock) {
                        Some(e) => {
                            let _ = writeln!(out, "  {} - {} ({} credits)", e.code, e.title, e.credits);
                        }
                        None => {
                            let _ = writeln!(out, "  {unlock} - not offered in the catalog");
                        }
                    }
                }
            }
            Err(overflow) => {
                let _ = writeln!(out, "\n{overflow}");
            }
        }
    }
    Ok(out)
}
