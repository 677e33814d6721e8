//! Candidate plans: extraction from generator replies and validation.

pub mod extract;
pub mod validator;

pub use extract::extract_recommendation;
pub use validator::{
    CREDIT_SLACK, CatalogLookup, CourseFacts, Rejection, RejectionKind, Remediation,
    RemediationCourse, ValidationVerdict, validate_plan,
};
