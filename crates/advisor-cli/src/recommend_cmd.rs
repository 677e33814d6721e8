//! `advisor recommend` command: run the bounded-retry recommendation loop
//! with a subprocess generator.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::info;

use advisor_core::catalog::CatalogIndex;
use advisor_core::degree::{DegreeProgram, reconcile_degree};
use advisor_core::recommend::{
    CandidateGenerator, CommandGenerator, DegreeContext, RecommendationOutcome,
    RecommendationRequest, build_advising_context, run_recommendation_loop,
};

use crate::data::{LabeledDegree, Student};

/// Settings for one recommendation run, already resolved from flags,
/// environment and config file.
#[derive(Debug, Clone)]
pub struct RecommendOptions {
    pub target_credits: u32,
    pub retry_budget: u32,
    pub generator: Option<String>,
    pub timeout: Duration,
    pub json: bool,
}

pub async fn run_recommend(
    index: &CatalogIndex,
    student: &Student,
    degrees: &[LabeledDegree],
    options: &RecommendOptions,
) -> Result<()> {
    let generator = options
        .generator
        .as_deref()
        .and_then(CommandGenerator::from_command_line)
        .context(
            "no plan generator configured; pass --generator, set ADVISOR_GENERATOR, \
             or run `advisor init --generator <command>`",
        )?
        .with_timeout(options.timeout);

    let contexts: Vec<DegreeContext> = degrees
        .iter()
        .map(|degree| {
            let program = DegreeProgram::from_document(&degree.document);
            DegreeContext {
                label: degree.label.clone(),
                reconciliation: reconcile_degree(&program.sections, &student.completed),
            }
        })
        .collect();
    let context = build_advising_context(&student.transcript, &contexts);

    let request = RecommendationRequest::new(student.earned_credits(), options.target_credits)
        .with_retry_budget(options.retry_budget);
    info!(
        target_credits = request.target_credits,
        retry_budget = request.retry_budget,
        degrees = contexts.len(),
        "requesting recommendation"
    );

    let generator: Box<dyn CandidateGenerator> = Box::new(generator);
    let outcome = run_recommendation_loop(
        &request,
        &context,
        &student.completed,
        index,
        generator.as_ref(),
    )
    .await;

    report(index, &outcome, options.json)
}

fn report(index: &CatalogIndex, outcome: &RecommendationOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else if let RecommendationOutcome::Accepted {
        courses, attempts, ..
    } = outcome
    {
        println!("{}", outcome.message());
        for code in courses {
            if let Some(entry) = index.lookup_by_code(code) {
                println!("  {} - {} ({} credits)", entry.code, entry.title, entry.credits);
            }
        }
        println!("(accepted after {attempts} attempt(s))");
    }

    match outcome {
        RecommendationOutcome::Accepted { .. } => Ok(()),
        RecommendationOutcome::Exhausted {
            last_rejection: Some(rejection),
            ..
        } => bail!("{}\nlast rejection: {rejection}", outcome.message()),
        _ => bail!("{}", outcome.message()),
    }
}
