//! Satisfiability and minimal unlocking sets.

use serde::Serialize;
use thiserror::Error;

use super::expr::{CourseSet, Extended, PrerequisiteExpr};
use crate::code::CourseCode;

/// Upper bound on missing literals the unlocking search will enumerate.
pub const MAX_UNLOCK_LITERALS: usize = 12;

/// The unlocking search was refused because the expression references too
/// many missing courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("unlocking search over {literals} missing courses exceeds the limit of {limit}")]
pub struct SearchOverflow {
    pub literals: usize,
    pub limit: usize,
}

/// `true` when there is no prerequisite or `expr` holds against `completed`.
pub fn is_satisfied<S: CourseSet + ?Sized>(expr: Option<&PrerequisiteExpr>, completed: &S) -> bool {
    expr.is_none_or(|e| e.is_satisfied_by(completed))
}

/// Smallest set of not-yet-completed literal courses that, added to
/// `completed`, satisfies `expr`.
///
/// Subsets are tried by increasing size, each size in lexicographic order
/// of course code, so the result is deterministic. Returns an empty list
/// when `expr` is already satisfied.
pub fn minimal_unlocking_set<S: CourseSet + ?Sized>(
    expr: Option<&PrerequisiteExpr>,
    completed: &S,
) -> Result<Vec<CourseCode>, SearchOverflow> {
    let Some(expr) = expr else {
        return Ok(Vec::new());
    };
    if expr.is_satisfied_by(completed) {
        return Ok(Vec::new());
    }

    let missing: Vec<&CourseCode> = expr
        .literals()
        .into_iter()
        .filter(|code| !completed.contains_code(code))
        .collect();
    if missing.len() > MAX_UNLOCK_LITERALS {
        return Err(SearchOverflow {
            literals: missing.len(),
            limit: MAX_UNLOCK_LITERALS,
        });
    }

    for size in 1..=missing.len() {
        let mut found: Option<Vec<CourseCode>> = None;
        for_each_combination(missing.len(), size, |indices| {
            let picked: Vec<&CourseCode> = indices.iter().map(|&i| missing[i]).collect();
            let trial = Extended {
                base: completed,
                extra: &picked,
            };
            if expr.is_satisfied_by(&trial) {
                found = Some(picked.into_iter().cloned().collect());
                return true;
            }
            false
        });
        if let Some(set) = found {
            return Ok(set);
        }
    }
    Ok(Vec::new())
}

/// Visit every `k`-combination of `0..n` in lexicographic order until
/// `visit` returns `true`.
fn for_each_combination(n: usize, k: usize, mut visit: impl FnMut(&[usize]) -> bool) {
    if k == 0 || k > n {
        return;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        if visit(&indices) {
            return;
        }
        // Rightmost index that can still advance.
        let Some(i) = (0..k).rev().find(|&i| indices[i] < n - k + i) else {
            return;
        };
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}
