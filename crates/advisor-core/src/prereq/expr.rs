//! Boolean prerequisite expressions over course-code literals.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::code::CourseCode;

/// A set of course codes that expressions are evaluated against.
pub trait CourseSet {
    fn contains_code(&self, code: &CourseCode) -> bool;
}

impl CourseSet for BTreeSet<CourseCode> {
    fn contains_code(&self, code: &CourseCode) -> bool {
        self.contains(code)
    }
}

impl CourseSet for HashSet<CourseCode> {
    fn contains_code(&self, code: &CourseCode) -> bool {
        self.contains(code)
    }
}

impl<T: CourseSet + ?Sized> CourseSet for &T {
    fn contains_code(&self, code: &CourseCode) -> bool {
        (**self).contains_code(code)
    }
}

/// A base set extended with a few extra codes, used while searching for
/// unlocking sets without cloning the base.
pub(crate) struct Extended<'a, S: ?Sized> {
    pub base: &'a S,
    pub extra: &'a [&'a CourseCode],
}

impl<S: CourseSet + ?Sized> CourseSet for Extended<'_, S> {
    fn contains_code(&self, code: &CourseCode) -> bool {
        self.extra.iter().any(|c| *c == code) || self.base.contains_code(code)
    }
}

/// A parsed prerequisite: a tree of `and`/`or` nodes over course codes.
///
/// Children keep the order they had in the catalog text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op", content = "args")]
pub enum PrerequisiteExpr {
    Literal(CourseCode),
    And(Vec<PrerequisiteExpr>),
    Or(Vec<PrerequisiteExpr>),
}

impl PrerequisiteExpr {
    /// Evaluate against `completed`.
    pub fn is_satisfied_by<S: CourseSet + ?Sized>(&self, completed: &S) -> bool {
        match self {
            Self::Literal(code) => completed.contains_code(code),
            Self::And(children) => children.iter().all(|c| c.is_satisfied_by(completed)),
            Self::Or(children) => children.iter().any(|c| c.is_satisfied_by(completed)),
        }
    }

    /// Distinct literal codes in the tree, sorted.
    pub fn literals(&self) -> BTreeSet<&CourseCode> {
        let mut out = BTreeSet::new();
        self.collect_literals(&mut out);
        out
    }

    fn collect_literals<'a>(&'a self, out: &mut BTreeSet<&'a CourseCode>) {
        match self {
            Self::Literal(code) => {
                out.insert(code);
            }
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_literals(out);
                }
            }
        }
    }

    fn write_child(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(code) => write!(f, "{code}"),
            _ => write!(f, "({self})"),
        }
    }
}

impl fmt::Display for PrerequisiteExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (children, connective) = match self {
            Self::Literal(code) => return write!(f, "{code}"),
            Self::And(children) => (children, " and "),
            Self::Or(children) => (children, " or "),
        };
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                f.write_str(connective)?;
            }
            child.write_child(f)?;
        }
        Ok(())
    }
}
