//! Human-readable prerequisite status against a completed-course set.

use std::fmt::Write as _;

use super::expr::{CourseSet, PrerequisiteExpr};
use super::parser::{ParseOutcome, PrerequisiteParse};

/// Render `parse` as a status block:
///
/// ```text
/// PREREQUISITES:
/// MATH 01131 - COMPLETED
/// (Choose one of the following):
///   CS 01100 - NOT MET
///   CS 01101 - COMPLETED
///   [OK] Requirement met
///
/// STATUS: You have met all prerequisites for this course
/// ```
pub fn render_status<S: CourseSet + ?Sized>(parse: &PrerequisiteParse, completed: &S) -> String {
    let expr = match &parse.outcome {
        ParseOutcome::NoPrerequisite => return "PREREQUISITES: None".to_string(),
        ParseOutcome::Invalid { text, .. } => {
            return format!("PREREQUISITES: could not be evaluated, review manually: {text}");
        }
        ParseOutcome::Parsed { expression } => expression,
    };

    let mut out = String::with_capacity(256);
    out.push_str("PREREQUISITES:\n");
    match expr {
        // Top-level conjunction: list each requirement flat.
        PrerequisiteExpr::And(children) => {
            for child in children {
                render_node(&mut out, child, completed, 0);
            }
        }
        other => render_node(&mut out, other, completed, 0),
    }

    if !parse.unresolved.is_empty() {
        let codes: Vec<&str> = parse.unresolved.iter().map(|c| c.as_str()).collect();
        let _ = writeln!(out, "Not offered in the catalog: {}", codes.join(", "));
    }

    out.push('\n');
    if expr.is_satisfied_by(completed) {
        out.push_str("STATUS: You have met all prerequisites for this course");
    } else {
        out.push_str("STATUS: You have NOT met all prerequisites for this course");
    }
    out
}

fn render_node<S: CourseSet + ?Sized>(
    out: &mut String,
    node: &PrerequisiteExpr,
    completed: &S,
    depth: usize,
) {
    let indent = "  ".repeat(depth);
    match node {
        PrerequisiteExpr::Literal(code) => {
            let status = if completed.contains_code(code) {
                "COMPLETED"
            } else {
                "NOT MET"
            };
            let _ = writeln!(out, "{indent}{code} - {status}");
        }
        PrerequisiteExpr::Or(children) => {
            let _ = writeln!(out, "{indent}(Choose one of the following):");
            for child in children {
                render_node(out, child, completed, depth + 1);
            }
            let status = if node.is_satisfied_by(completed) {
                "[OK] Requirement met"
            } else {
                "[!] Need one of these"
            };
            let _ = writeln!(out, "{indent}  {status}");
        }
        PrerequisiteExpr::And(children) => {
            let _ = writeln!(out, "{indent}(All of the following):");
            for child in children {
                render_node(out, child, completed, depth + 1);
            }
        }
    }
}
