//! Prerequisite expressions: parsing catalog text, evaluating against a
//! completed-course set, and finding minimal unlocking sets.

pub mod expr;
pub mod parser;
pub mod report;
pub mod solver;

pub use expr::{CourseSet, PrerequisiteExpr};
pub use parser::{
    ParseOutcome, PrerequisiteParse, PrerequisiteSyntaxError, parse_prerequisite,
    prerequisite_section, prerequisite_source,
};
pub use solver::{MAX_UNLOCK_LITERALS, SearchOverflow, is_satisfied, minimal_unlocking_set};
