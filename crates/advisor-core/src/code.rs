//! Course codes: a subject of 2-4 letters followed by a 4-5 digit number.
//!
//! Codes are normalized to `SUBJ NNNNN` (uppercase subject, one space,
//! number zero-padded to five digits), so `CS01100`, `cs 1100` and
//! `CS   01100` all compare equal.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Regex source for one embedded course code, capturing subject and number.
pub(crate) const CODE_PATTERN: &str = r"\b([A-Z]{2,4})\s*(\d{4,5})\b";

/// Matches a course code embedded in uppercase catalog text.
static EMBEDDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CODE_PATTERN).expect("valid regex"));

/// Matches a whole string that is exactly one course code, any case.
static WHOLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)([A-Z]{2,4})\s*(\d{4,5})$").expect("valid regex"));

/// Error returned when a string is not a course code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid course code: {0:?}")]
pub struct CourseCodeError(pub String);

/// A validated, normalized course code such as `MATH 01131`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    /// Parse a string that must consist of exactly one course code
    /// (surrounding whitespace allowed, any letter case).
    pub fn parse(s: &str) -> Result<Self, CourseCodeError> {
        let caps = WHOLE
            .captures(s.trim())
            .ok_or_else(|| CourseCodeError(s.to_owned()))?;
        Ok(Self::from_parts(&caps[1], &caps[2]))
    }

    /// First course code appearing inside `text`. Letters must already be
    /// uppercase, which keeps prose like `"or 2024"` from matching.
    pub fn find(text: &str) -> Option<Self> {
        EMBEDDED
            .captures(text)
            .map(|caps| Self::from_parts(&caps[1], &caps[2]))
    }

    /// Every course code inside `text`, in order of appearance.
    pub fn find_all(text: &str) -> Vec<Self> {
        EMBEDDED
            .captures_iter(text)
            .map(|caps| Self::from_parts(&caps[1], &caps[2]))
            .collect()
    }

    pub(crate) fn from_parts(subject: &str, number: &str) -> Self {
        Self(format!("{} {number:0>5}", subject.to_ascii_uppercase()))
    }

    /// The subject prefix, e.g. `MATH`.
    pub fn subject(&self) -> &str {
        self.0.split_once(' ').map(|(s, _)| s).unwrap_or(&self.0)
    }

    /// The numeric part, e.g. `01131`.
    pub fn number(&self) -> &str {
        self.0.split_once(' ').map(|(_, n)| n).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CourseCode {
    type Err = CourseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CourseCode {
    type Error = CourseCodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CourseCode> for String {
    fn from(code: CourseCode) -> Self {
        code.0
    }
}

impl Borrow<str> for CourseCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
