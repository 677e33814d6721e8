//! Credit values from catalog text: `"3"`, `"3.0"`, `"1 to 3"`, `"1-3"`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*(?:(?:to|-)\s*(\d+(?:\.\d+)?))?\s*$").expect("valid regex")
});

/// Error returned for credit text that is neither a number nor a range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid credit value: {0:?}")]
pub struct CreditParseError(pub String);

/// Credit range of a course. Fixed-credit courses have `min == max`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CreditRange {
    pub min: f64,
    pub max: f64,
}

impl CreditRange {
    pub const ZERO: Self = Self { min: 0.0, max: 0.0 };

    pub fn fixed(credits: f64) -> Self {
        Self {
            min: credits,
            max: credits,
        }
    }

    /// Credits counted toward a plan: the upper bound.
    pub fn effective(&self) -> f64 {
        self.max
    }

    /// Parse optional catalog text; missing or blank text counts as zero.
    pub fn from_catalog(text: Option<&str>) -> Result<Self, CreditParseError> {
        match text.map(str::trim) {
            None | Some("") => Ok(Self::ZERO),
            Some(t) => t.parse(),
        }
    }
}

impl FromStr for CreditRange {
    type Err = CreditParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = RANGE
            .captures(s)
            .ok_or_else(|| CreditParseError(s.to_owned()))?;
        let number = |i: usize| -> Result<Option<f64>, CreditParseError> {
            caps.get(i)
                .map(|m| m.as_str().parse::<f64>())
                .transpose()
                .map_err(|_| CreditParseError(s.to_owned()))
        };
        let min = number(1)?.ok_or_else(|| CreditParseError(s.to_owned()))?;
        let max = number(2)?.unwrap_or(min);
        if max < min {
            return Err(CreditParseError(s.to_owned()));
        }
        Ok(Self { min, max })
    }
}

impl fmt::Display for CreditRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            f.write_str(&format_credits(self.max))
        } else {
            write!(f, "{} to {}", format_credits(self.min), format_credits(self.max))
        }
    }
}

/// Format a credit amount without a trailing `.0` for whole numbers.
pub fn format_credits(credits: f64) -> String {
    if credits.fract() == 0.0 {
        format!("{credits:.0}")
    } else {
        format!("{credits}")
    }
}
