//! Bounded-retry recommendation loop.
//!
//! The loop asks an injected [`CandidateGenerator`] for a plan, extracts the
//! course list from its reply, validates it, and on rejection feeds the
//! reason back as the next prompt until a plan is accepted or the retry
//! budget runs out.

pub mod command;
pub mod generator;
pub mod prompt;

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::format_credits;
use crate::code::CourseCode;
use crate::plan::{CatalogLookup, Rejection, ValidationVerdict, extract_recommendation, validate_plan};
use crate::prereq::CourseSet;

pub use command::CommandGenerator;
pub use generator::{CandidateGenerator, GenerationRequest, GeneratorError, Message, Role};
pub use prompt::{DegreeContext, build_advising_context, initial_conversation, rejection_feedback};

/// Credits required for a degree.
pub const DEGREE_CREDITS: f64 = 120.0;

/// Attempts allowed for an interactive recommendation.
pub const DEFAULT_RETRY_BUDGET: u32 = 5;

/// Attempts allowed for unattended callers.
pub const EXTENDED_RETRY_BUDGET: u32 = 25;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// States of one recommendation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Prompting,
    AwaitingCandidate,
    Validating,
    Accepted,
    Retrying,
    Exhausted,
    /// The generator failed; the run ends without retrying.
    Failed,
}

impl LoopState {
    /// Whether `from -> to` is an edge of the loop's state graph.
    pub fn is_valid_transition(from: LoopState, to: LoopState) -> bool {
        matches!(
            (from, to),
            (LoopState::Prompting, LoopState::AwaitingCandidate)
                | (LoopState::Prompting, LoopState::Exhausted)
                | (LoopState::AwaitingCandidate, LoopState::Validating)
                | (LoopState::AwaitingCandidate, LoopState::Retrying)
                | (LoopState::AwaitingCandidate, LoopState::Exhausted)
                | (LoopState::AwaitingCandidate, LoopState::Failed)
                | (LoopState::Validating, LoopState::Accepted)
                | (LoopState::Validating, LoopState::Retrying)
                | (LoopState::Validating, LoopState::Exhausted)
                | (LoopState::Retrying, LoopState::Prompting)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Exhausted | Self::Failed)
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Prompting => "prompting",
            Self::AwaitingCandidate => "awaiting_candidate",
            Self::Validating => "validating",
            Self::Accepted => "accepted",
            Self::Retrying => "retrying",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

struct Machine {
    state: LoopState,
}

impl Machine {
    fn advance(&mut self, to: LoopState) {
        debug_assert!(
            LoopState::is_valid_transition(self.state, to),
            "invalid loop transition: {} -> {}",
            self.state,
            to
        );
        debug!(from = %self.state, %to, "loop transition");
        self.state = to;
    }
}

// ---------------------------------------------------------------------------
// Request / outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecommendationRequest {
    pub earned_credits: f64,
    pub target_credits: u32,
    pub retry_budget: u32,
}

impl RecommendationRequest {
    pub fn new(earned_credits: f64, target_credits: u32) -> Self {
        Self {
            earned_credits,
            target_credits,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }

    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    /// Credits remaining before the degree total is reached.
    pub fn credits_left(&self) -> f64 {
        DEGREE_CREDITS - self.earned_credits
    }
}

/// How a recommendation run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RecommendationOutcome {
    Accepted {
        courses: Vec<CourseCode>,
        total_credits: f64,
        attempts: u32,
        /// The generator reply that carried the accepted plan.
        reply: String,
    },
    /// Every attempt was rejected.
    Exhausted {
        attempts: u32,
        last_rejection: Option<Rejection>,
    },
    /// More credits were requested than remain in the degree; the generator
    /// was never consulted.
    OverBudgetAtStart {
        credits_left: f64,
        target_credits: u32,
    },
    GeneratorFailure { attempt: u32, error: String },
}

impl RecommendationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// User-facing summary of the outcome.
    pub fn message(&self) -> String {
        match self {
            Self::Accepted {
                courses,
                total_credits,
                ..
            } => {
                let listed = courses
                    .iter()
                    .map(CourseCode::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "Recommended {} credits: {listed}",
                    format_credits(*total_credits)
                )
            }
            Self::Exhausted { attempts, .. } => format!(
                "Exceeded the retry budget of {attempts} attempts with invalid recommendations"
            ),
            Self::OverBudgetAtStart {
                credits_left,
                target_credits,
            } => format!(
                "You requested {target_credits} credits, but you have only {} credits left to complete your degree.",
                format_credits(*credits_left)
            ),
            Self::GeneratorFailure { attempt, error } => {
                format!("The plan generator failed on attempt {attempt}: {error}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

/// Run the bounded-retry loop.
///
/// `context` is the advising context placed in the opening conversation.
/// Each rejected attempt consumes one unit of `retry_budget`, including
/// replies without a usable `<recommendation>` section. A generator error
/// ends the run immediately.
pub async fn run_recommendation_loop<S, C>(
    request: &RecommendationRequest,
    context: &str,
    completed: &S,
    catalog: &C,
    generator: &dyn CandidateGenerator,
) -> RecommendationOutcome
where
    S: CourseSet + ?Sized,
    C: CatalogLookup + ?Sized,
{
    let credits_left = request.credits_left();
    if f64::from(request.target_credits) > credits_left {
        info!(
            target_credits = request.target_credits,
            credits_left, "requested credits exceed remaining degree credits"
        );
        return RecommendationOutcome::OverBudgetAtStart {
            credits_left,
            target_credits: request.target_credits,
        };
    }

    let mut machine = Machine {
        state: LoopState::Prompting,
    };
    let mut messages = initial_conversation(context, request.target_credits);
    let mut last_rejection: Option<Rejection> = None;

    for attempt in 1..=request.retry_budget {
        if let Some(rejection) = &last_rejection {
            let recommended = rejection_candidates(&messages);
            messages.push(Message::user(rejection_feedback(
                &recommended,
                &rejection.to_string(),
            )));
        }

        machine.advance(LoopState::AwaitingCandidate);
        let prior = last_rejection.as_ref().map(ToString::to_string);
        let generation = GenerationRequest {
            attempt,
            messages: &messages,
            prior_rejection: prior.as_deref(),
        };
        let reply = match generator.generate(&generation).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(generator = generator.name(), attempt, error = %err, "generator failed");
                machine.advance(LoopState::Failed);
                return RecommendationOutcome::GeneratorFailure {
                    attempt,
                    error: err.to_string(),
                };
            }
        };
        messages.push(Message::assistant(reply.clone()));

        let rejection = match extract_recommendation(&reply) {
            Some(codes) if !codes.is_empty() => {
                machine.advance(LoopState::Validating);
                let candidates: Vec<String> = codes.iter().map(ToString::to_string).collect();
                match validate_plan(completed, catalog, &candidates, request.target_credits) {
                    ValidationVerdict::Accepted {
                        courses,
                        total_credits,
                    } => {
                        machine.advance(LoopState::Accepted);
                        info!(attempt, total_credits, "plan accepted");
                        return RecommendationOutcome::Accepted {
                            courses,
                            total_credits,
                            attempts: attempt,
                            reply,
                        };
                    }
                    ValidationVerdict::Rejected { rejection } => rejection,
                }
            }
            _ => Rejection::EmptyPlan,
        };

        info!(attempt, kind = ?rejection.kind(), reason = %rejection, "plan rejected");
        last_rejection = Some(rejection);
        if attempt < request.retry_budget {
            machine.advance(LoopState::Retrying);
            machine.advance(LoopState::Prompting);
        } else {
            machine.advance(LoopState::Exhausted);
        }
    }

    if !machine.state.is_terminal() {
        machine.advance(LoopState::Exhausted);
    }
    warn!(attempts = request.retry_budget, "retry budget exhausted");
    RecommendationOutcome::Exhausted {
        attempts: request.retry_budget,
        last_rejection,
    }
}

/// Codes from the most recent assistant reply, for echoing back in feedback.
fn rejection_candidates(messages: &[Message]) -> Vec<CourseCode> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .and_then(|m| extract_recommendation(&m.content))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use LoopState::*;
        assert!(LoopState::is_valid_transition(Prompting, AwaitingCandidate));
        assert!(LoopState::is_valid_transition(Validating, Accepted));
        assert!(LoopState::is_valid_transition(Validating, Retrying));
        assert!(LoopState::is_valid_transition(Retrying, Prompting));
        assert!(LoopState::is_valid_transition(AwaitingCandidate, Failed));
    }

    #[test]
    fn invalid_transitions() {
        use LoopState::*;
        assert!(!LoopState::is_valid_transition(Prompting, Accepted));
        assert!(!LoopState::is_valid_transition(Accepted, Prompting));
        assert!(!LoopState::is_valid_transition(Exhausted, Prompting));
        assert!(!LoopState::is_valid_transition(Retrying, Validating));
    }

    #[test]
    fn terminal_states() {
        assert!(LoopState::Accepted.is_terminal());
        assert!(LoopState::Failed.is_terminal());
        assert!(!LoopState::Retrying.is_terminal());
    }

    #[test]
    fn over_budget_message_reports_credits_left() {
        let outcome = RecommendationOutcome::OverBudgetAtStart {
            credits_left: 5.0,
            target_credits: 10,
        };
        assert_eq!(
            outcome.message(),
            "You requested 10 credits, but you have only 5 credits left to complete your degree."
        );
    }

    #[test]
    fn request_defaults_to_standard_budget() {
        let request = RecommendationRequest::new(90.0, 15);
        assert_eq!(request.retry_budget, DEFAULT_RETRY_BUDGET);
        assert_eq!(request.credits_left(), 30.0);
        assert_eq!(request.with_retry_budget(EXTENDED_RETRY_BUDGET).retry_budget, 25);
    }
}
