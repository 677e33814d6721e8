//! Prerequisite text parser.
//!
//! Catalog prerequisite text is prose with an embedded boolean expression,
//! e.g. `"CS 04113 with a minimum grade of C- or (MATH 01130 and MATH 01131)"`.
//! Parsing keeps only course codes, `and`/`or` keywords and parentheses,
//! anchors at the first course code, and builds a [`PrerequisiteExpr`].
//!
//! Precedence: parentheses bind tightest, then `and`, then `or`. A run of
//! the same connective at one nesting level becomes a single n-ary node.
//!
//! Parsing never fails outward. Malformed text yields
//! [`ParseOutcome::Invalid`] carrying the original text for manual review.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::expr::PrerequisiteExpr;
use crate::code::{CODE_PATTERN, CourseCode};

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{CODE_PATTERN}|(?i:\b(and|or)\b)|\(|\)")).expect("valid regex")
});

/// Description headings look like `Prerequisite Courses:`, two words and a colon.
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z]+ [A-Za-z]+):").expect("valid regex"));

/// Heading of the description section that holds the full prerequisite text.
pub const PREREQUISITE_HEADING: &str = "Prerequisite Courses";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Code(CourseCode),
    And,
    Or,
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::And => f.write_str("and"),
            Self::Or => f.write_str("or"),
            Self::Open => f.write_str("("),
            Self::Close => f.write_str(")"),
        }
    }
}

fn tokenize(text: &str) -> Vec<Token> {
    TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            if let (Some(subject), Some(number)) = (caps.get(1), caps.get(2)) {
                return Some(Token::Code(CourseCode::from_parts(
                    subject.as_str(),
                    number.as_str(),
                )));
            }
            if let Some(kw) = caps.get(3) {
                return Some(if kw.as_str().eq_ignore_ascii_case("and") {
                    Token::And
                } else {
                    Token::Or
                });
            }
            match caps.get(0)?.as_str() {
                "(" => Some(Token::Open),
                ")" => Some(Token::Close),
                _ => None,
            }
        })
        .collect()
}

/// Remove `( )` pairs left behind by discarded prose, repeatedly.
fn collapse_empty_groups(tokens: &mut Vec<Token>) {
    loop {
        let Some(i) = tokens
            .windows(2)
            .position(|w| w[0] == Token::Open && w[1] == Token::Close)
        else {
            return;
        };
        tokens.drain(i..i + 2);
    }
}

/// Drop everything before the first course code, keeping the run of
/// opening parentheses directly in front of it.
fn anchor_at_first_code(tokens: &mut Vec<Token>) {
    let Some(first) = tokens.iter().position(|t| matches!(t, Token::Code(_))) else {
        tokens.clear();
        return;
    };
    let mut start = first;
    while start > 0 && tokens[start - 1] == Token::Open {
        start -= 1;
    }
    tokens.drain(..start);
}

// ---------------------------------------------------------------------------
// Errors and results
// ---------------------------------------------------------------------------

/// Structural problems in prerequisite text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrerequisiteSyntaxError {
    #[error("expression ends after {after:?}")]
    UnexpectedEnd { after: String },

    #[error("unexpected {found:?} at token {position}")]
    UnexpectedToken { found: String, position: usize },

    #[error("unclosed parenthesis opened at token {position}")]
    UnclosedParen { position: usize },

    #[error("unmatched closing parenthesis at token {position}")]
    UnmatchedCloseParen { position: usize },
}

/// What a prerequisite text turned out to mean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ParseOutcome {
    /// No course codes: the course has no prerequisite.
    NoPrerequisite,
    /// A well-formed expression.
    Parsed { expression: PrerequisiteExpr },
    /// Unrecognizable structure. `text` is the original prerequisite text.
    Invalid { text: String, reason: String },
}

/// Result of parsing one prerequisite text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteParse {
    pub outcome: ParseOutcome,
    /// Referenced codes that are not in the catalog, sorted. These can
    /// never be satisfied but do not invalidate the expression.
    pub unresolved: Vec<CourseCode>,
}

impl PrerequisiteParse {
    /// A parse with no prerequisite.
    pub fn none() -> Self {
        Self {
            outcome: ParseOutcome::NoPrerequisite,
            unresolved: Vec::new(),
        }
    }

    /// `false` only for [`ParseOutcome::Invalid`].
    pub fn is_valid(&self) -> bool {
        !matches!(self.outcome, ParseOutcome::Invalid { .. })
    }

    pub fn expression(&self) -> Option<&PrerequisiteExpr> {
        match &self.outcome {
            ParseOutcome::Parsed { expression } => Some(expression),
            _ => None,
        }
    }

    /// The expression rendered as text, or the original text when invalid.
    pub fn display_text(&self) -> Option<String> {
        match &self.outcome {
            ParseOutcome::NoPrerequisite => None,
            ParseOutcome::Parsed { expression } => Some(expression.to_string()),
            ParseOutcome::Invalid { text, .. } => Some(text.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse raw prerequisite text. `is_known` reports whether a code exists in
/// the catalog and feeds [`PrerequisiteParse::unresolved`].
pub fn parse_prerequisite(raw: &str, is_known: impl Fn(&CourseCode) -> bool) -> PrerequisiteParse {
    let mut tokens = tokenize(raw);

    let unresolved: Vec<CourseCode> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Code(code) if !is_known(code) => Some(code.clone()),
            _ => None,
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let code_count = tokens.iter().filter(|t| matches!(t, Token::Code(_))).count();

    let outcome = if code_count == 0 {
        ParseOutcome::NoPrerequisite
    } else if code_count == 1 {
        // A lone code is the whole expression; connectives and parentheses
        // around it come from prose such as "or permission of instructor".
        let expression = tokens
            .into_iter()
            .find_map(|t| match t {
                Token::Code(code) => Some(PrerequisiteExpr::Literal(code)),
                _ => None,
            })
            .map(|expression| ParseOutcome::Parsed { expression });
        expression.unwrap_or(ParseOutcome::NoPrerequisite)
    } else {
        collapse_empty_groups(&mut tokens);
        anchor_at_first_code(&mut tokens);
        match Parser::new(&tokens).parse() {
            Ok(expression) => ParseOutcome::Parsed { expression },
            Err(err) => {
                debug!(text = raw, error = %err, "unparseable prerequisite text");
                ParseOutcome::Invalid {
                    text: raw.trim().to_string(),
                    reason: err.to_string(),
                }
            }
        }
    };

    PrerequisiteParse {
        outcome,
        unresolved,
    }
}

/// Extract the `Prerequisite Courses` section from a catalog description.
///
/// Descriptions are a run of `Heading Words: value` sections; the value
/// extends to the next heading or the end of the text.
pub fn prerequisite_section(description: &str) -> Option<&str> {
    let headings: Vec<(usize, usize, &str)> = HEADING
        .captures_iter(description)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((whole.start(), whole.end(), caps.get(1)?.as_str()))
        })
        .collect();

    headings.iter().enumerate().find_map(|(i, (_, end, name))| {
        if *name != PREREQUISITE_HEADING {
            return None;
        }
        let stop = headings.get(i + 1).map_or(description.len(), |h| h.0);
        Some(description[*end..stop].trim())
    })
}

/// Choose which text to parse for a catalog course: the short prerequisite
/// field when it names at most one course, otherwise the description's
/// `Prerequisite Courses` section (falling back to the short field).
pub fn prerequisite_source<'a>(short: Option<&'a str>, description: Option<&'a str>) -> &'a str {
    let short = short.unwrap_or_default();
    if CourseCode::find_all(short).len() <= 1 {
        return short;
    }
    description
        .and_then(prerequisite_section)
        .unwrap_or(short)
}

/// Recursive-descent parser over the filtered token stream.
///
/// ```text
/// expr := term ("or" term)*
/// term := atom ("and" atom)*
/// atom := CODE | "(" expr ")"
/// ```
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse(mut self) -> Result<PrerequisiteExpr, PrerequisiteSyntaxError> {
        let expr = self.expr()?;
        match self.tokens.get(self.pos) {
            None => Ok(expr),
            Some(Token::Close) => Err(PrerequisiteSyntaxError::UnmatchedCloseParen {
                position: self.pos,
            }),
            Some(other) => Err(PrerequisiteSyntaxError::UnexpectedToken {
                found: other.to_string(),
                position: self.pos,
            }),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn expr(&mut self) -> Result<PrerequisiteExpr, PrerequisiteSyntaxError> {
        let mut terms = vec![self.term()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            terms.push(self.term()?);
        }
        Ok(join(terms, PrerequisiteExpr::Or))
    }

    fn term(&mut self) -> Result<PrerequisiteExpr, PrerequisiteSyntaxError> {
        let mut atoms = vec![self.atom()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            atoms.push(self.atom()?);
        }
        Ok(join(atoms, PrerequisiteExpr::And))
    }

    fn atom(&mut self) -> Result<PrerequisiteExpr, PrerequisiteSyntaxError> {
        let position = self.pos;
        match self.peek().cloned() {
            Some(Token::Code(code)) => {
                self.pos += 1;
                Ok(PrerequisiteExpr::Literal(code))
            }
            Some(Token::Open) => {
                self.pos += 1;
                let inner = self.expr()?;
                if self.peek() != Some(&Token::Close) {
                    return Err(PrerequisiteSyntaxError::UnclosedParen { position });
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(other) => Err(PrerequisiteSyntaxError::UnexpectedToken {
                found: other.to_string(),
                position,
            }),
            None => Err(PrerequisiteSyntaxError::UnexpectedEnd {
                after: self
                    .tokens
                    .last()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            }),
        }
    }
}

fn join(
    mut parts: Vec<PrerequisiteExpr>,
    node: fn(Vec<PrerequisiteExpr>) -> PrerequisiteExpr,
) -> PrerequisiteExpr {
    if parts.len() == 1 {
        parts.remove(0)
    } else {
        node(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> PrerequisiteExpr {
        PrerequisiteExpr::Literal(CourseCode::parse(s).unwrap())
    }

    fn parse(raw: &str) -> PrerequisiteParse {
        parse_prerequisite(raw, |_| true)
    }

    #[test]
    fn tokenizer_keeps_codes_keywords_and_parens() {
        let tokens = tokenize("Take (CS 01100 AND Math 1) Or CS01101 with grade C-");
        let text: Vec<String> = tokens.iter().map(ToString::to_string).collect();
        assert_eq!(text, vec!["(", "CS 01100", "and", ")", "or", "CS 01101"]);
    }

    #[test]
    fn empty_groups_collapse_repeatedly() {
        let mut tokens = tokenize("(( )) CS 01100");
        collapse_empty_groups(&mut tokens);
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn anchoring_keeps_leading_parens() {
        let mut tokens = tokenize("and or ) ((CS 01100 or CS 01101) and MATH 01130)");
        anchor_at_first_code(&mut tokens);
        assert_eq!(tokens[0], Token::Open);
        assert_eq!(tokens[1], Token::Open);
        assert!(matches!(tokens[2], Token::Code(_)));
    }

    #[test]
    fn prose_before_first_code_is_ignored() {
        let p = parse("Students need or want CS 01100 and CS 01101");
        assert_eq!(
            p.expression(),
            Some(&PrerequisiteExpr::And(vec![lit("CS 01100"), lit("CS 01101")]))
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let p = parse("CS 01100 and CS 01101 or MATH 01130");
        assert_eq!(
            p.expression(),
            Some(&PrerequisiteExpr::Or(vec![
                PrerequisiteExpr::And(vec![lit("CS 01100"), lit("CS 01101")]),
                lit("MATH 01130"),
            ]))
        );
    }

    #[test]
    fn same_connective_runs_flatten() {
        let p = parse("CS 01100 or CS 01101 or CS 01102");
        assert_eq!(
            p.expression(),
            Some(&PrerequisiteExpr::Or(vec![
                lit("CS 01100"),
                lit("CS 01101"),
                lit("CS 01102"),
            ]))
        );
    }

    #[test]
    fn rejects_dangling_connective() {
        let p = parse("CS 04113 and MATH 01316 with a minimum grade of C- or Math 0316");
        match &p.outcome {
            ParseOutcome::Invalid { text, reason } => {
                assert!(text.starts_with("CS 04113"));
                assert!(reason.contains("ends after"), "got: {reason}");
            }
            other => panic!("expected Invalid, got: {other:?}"),
        }
    }

    #[test]
    fn rejects_adjacent_literals() {
        let p = parse("CS 01100 CS 01101 and MATH 01130");
        assert!(
            matches!(p.outcome, ParseOutcome::Invalid { ref reason, .. } if reason.contains("unexpected")),
            "expected Invalid, got: {:?}",
            p.outcome
        );
    }

    #[test]
    fn rejects_unbalanced_parens() {
        assert!(!parse("(CS 01100 or CS 01101 and MATH 01130").is_valid());
        assert!(!parse("CS 01100 or CS 01101) and MATH 01130").is_valid());
    }

    #[test]
    fn lone_code_with_stray_paren_short_circuits() {
        let p = parse("(CS 01100 minimum grade C-");
        assert_eq!(p.expression(), Some(&lit("CS 01100")));
    }

    #[test]
    fn lone_code_ignores_dangling_connective() {
        let p = parse("CS 01100 or permission of the instructor");
        assert_eq!(p.expression(), Some(&lit("CS 01100")));
    }

    #[test]
    fn no_codes_means_no_prerequisite() {
        assert_eq!(parse("").outcome, ParseOutcome::NoPrerequisite);
        assert_eq!(parse("Permission of instructor").outcome, ParseOutcome::NoPrerequisite);
    }

    #[test]
    fn unresolved_codes_are_recorded_sorted() {
        let known = CourseCode::parse("CS 01100").unwrap();
        let p = parse_prerequisite("PHYS 00220 or CS 01100 or BIO 01101 or PHYS 00220", |c| {
            *c == known
        });
        assert!(p.is_valid());
        let unresolved: Vec<&str> = p.unresolved.iter().map(CourseCode::as_str).collect();
        assert_eq!(unresolved, vec!["BIO 01101", "PHYS 00220"]);
    }

    #[test]
    fn extracts_prerequisite_section() {
        let desc = "Covers lists and trees. Prerequisite Courses: CS 01100 and (MATH 01130 or MATH 01131) Course Attributes: CAT, UGRD Academic Department: Computer Science";
        assert_eq!(
            prerequisite_section(desc),
            Some("CS 01100 and (MATH 01130 or MATH 01131)")
        );
        assert_eq!(prerequisite_section("Course Attributes: CAT"), None);
    }

    #[test]
    fn source_prefers_short_field_for_single_code() {
        let desc = "Prerequisite Courses: CS 01100 and CS 01101";
        assert_eq!(prerequisite_source(Some("CS 01100"), Some(desc)), "CS 01100");
        assert_eq!(
            prerequisite_source(Some("CS 01100, CS 01101"), Some(desc)),
            "CS 01100 and CS 01101"
        );
        assert_eq!(
            prerequisite_source(Some("CS 01100, CS 01101"), Some("No sections here")),
            "CS 01100, CS 01101"
        );
        assert_eq!(prerequisite_source(None, Some(desc)), "");
    }
}
