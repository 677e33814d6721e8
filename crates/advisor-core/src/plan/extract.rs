//! Pulling the proposed course list out of a generator reply.

use std::sync::LazyLock;

use regex::Regex;

use crate::code::CourseCode;

static SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<recommendation>(.*?)</recommendation>").expect("valid regex")
});

/// Course codes inside the first `<recommendation>...</recommendation>`
/// section, in order. Text outside the section is ignored.
///
/// Returns `None` when the reply has no such section; an empty list when the
/// section holds no course codes.
pub fn extract_recommendation(reply: &str) -> Option<Vec<CourseCode>> {
    let caps = SECTION.captures(reply)?;
    Some(CourseCode::find_all(caps[1].trim()))
}
