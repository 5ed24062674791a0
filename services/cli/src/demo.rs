use crate::infra::{self, CompletionClient, InMemoryApplicantStore, SAMPLE_APPLICANT_IDS};
use applicant_ai::config::AppConfig;
use applicant_ai::error::AppError;
use applicant_ai::workflows::applicants::{
    children_from_dossier, ApplicantId, ApplicantPipeline, AssessmentReport, AssessmentSummary,
    BatchReport, CancelFlag, ChildRecords, PipelineError, RecordFields, ShortlistOutcome,
};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

type SamplePipeline = ApplicantPipeline<InMemoryApplicantStore, CompletionClient>;

#[derive(Args, Debug, Default)]
pub(crate) struct ScopeArgs {
    /// Applicant to process (defaults to every stored applicant)
    #[arg(short = 'a', long = "applicant-id")]
    pub(crate) applicant_id: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RestoreArgs {
    #[command(flatten)]
    pub(crate) scope: ScopeArgs,
    /// Restore from this dossier JSON file instead of the stored document
    #[arg(short = 'f', long = "json-file", requires = "applicant_id")]
    pub(crate) json_file: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReviewArgs {
    #[command(flatten)]
    pub(crate) scope: ScopeArgs,
    /// Review date for ongoing experience (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SummaryArgs {
    /// Review date used while processing the samples (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Review date for the walkthrough (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_compress(args: ScopeArgs) -> Result<(), AppError> {
    let pipeline = sample_pipeline()?;

    match args.applicant_id {
        Some(applicant_id) => {
            let document = pipeline.consolidate(&ApplicantId(applicant_id.clone()))?;
            println!("Consolidated dossier for {applicant_id}");
            println!("{document}");
        }
        None => {
            let report = pipeline.consolidate_all(&CancelFlag::new())?;
            render_batch_report(&report);
        }
    }

    Ok(())
}

pub(crate) fn run_restore(args: RestoreArgs) -> Result<(), AppError> {
    let RestoreArgs { scope, json_file } = args;
    let pipeline = sample_pipeline()?;

    match (json_file, scope.applicant_id) {
        (Some(path), Some(applicant_id)) => {
            let document = std::fs::read_to_string(&path)?;
            let dossier =
                pipeline.restore_from_text(&ApplicantId(applicant_id.clone()), &document)?;
            println!("Restored {applicant_id} from {}", path.display());
            render_children(&children_from_dossier(&dossier));
        }
        (Some(_), None) => {
            println!("--json-file requires --applicant-id");
        }
        (None, Some(applicant_id)) => {
            consolidate_samples(&pipeline)?;
            let dossier = pipeline.restore(&ApplicantId(applicant_id.clone()))?;
            println!("Restored child records for {applicant_id}");
            render_children(&children_from_dossier(&dossier));
        }
        (None, None) => {
            consolidate_samples(&pipeline)?;
            let report = pipeline.restore_all(&CancelFlag::new())?;
            render_batch_report(&report);
        }
    }

    Ok(())
}

pub(crate) fn run_shortlist(args: ReviewArgs) -> Result<(), AppError> {
    let ReviewArgs { scope, today } = args;
    let pipeline = sample_pipeline()?;
    consolidate_samples(&pipeline)?;

    match scope.applicant_id {
        Some(applicant_id) => {
            let outcome = pipeline.shortlist(&ApplicantId(applicant_id.clone()), today)?;
            render_shortlist_outcome(&applicant_id, &outcome);
        }
        None => {
            let report = pipeline.shortlist_all(&CancelFlag::new(), today)?;
            render_batch_report(&report);

            let summary = pipeline.shortlist_summary()?;
            println!("\nLeads on file: {}", summary.total);
            for lead in &summary.leads {
                println!("- {}: {}", lead.applicant_id.0, lead.score_reason);
            }
        }
    }

    Ok(())
}

pub(crate) fn run_evaluate(args: ScopeArgs) -> Result<(), AppError> {
    let pipeline = sample_pipeline()?;
    consolidate_samples(&pipeline)?;

    match args.applicant_id {
        Some(applicant_id) => {
            let report = pipeline.assess(&ApplicantId(applicant_id.clone()))?;
            println!("Assessment for {applicant_id}");
            render_assessment(&report);
        }
        None => {
            let batch = pipeline.assess_all(&CancelFlag::new())?;
            render_batch_report(&batch);
            render_assessment_summary(&pipeline.assessment_summary()?);
        }
    }

    Ok(())
}

pub(crate) fn run_pipeline(args: ReviewArgs) -> Result<(), AppError> {
    let ReviewArgs { scope, today } = args;
    let pipeline = sample_pipeline()?;

    match scope.applicant_id {
        Some(applicant_id) => {
            let outcome = pipeline.run(&ApplicantId(applicant_id.clone()), today)?;
            render_shortlist_outcome(&applicant_id, &outcome.shortlist);
            println!("\nModel assessment");
            render_assessment(&outcome.assessment);
        }
        None => {
            let report = pipeline.run_all(&CancelFlag::new(), today)?;
            render_batch_report(&report);
        }
    }

    Ok(())
}

pub(crate) fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let pipeline = sample_pipeline()?;
    pipeline.run_all(&CancelFlag::new(), args.today)?;

    let shortlisted = pipeline.shortlist_summary()?;
    println!("Leads on file: {}", shortlisted.total);
    for lead in &shortlisted.leads {
        println!("- {}: {}", lead.applicant_id.0, lead.score_reason);
    }

    render_assessment_summary(&pipeline.assessment_summary()?);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today } = args;
    let pipeline = sample_pipeline()?;
    let first = SAMPLE_APPLICANT_IDS[0];
    let first_id = ApplicantId(first.to_string());

    println!("Applicant decisioning demo");
    println!("\nStage walkthrough for {first}");

    let document = pipeline.consolidate(&first_id)?;
    println!("Compressed dossier:");
    println!("{document}");

    println!("\nShortlist review");
    let outcome = pipeline.shortlist(&first_id, today)?;
    render_shortlist_outcome(first, &outcome);

    println!("\nModel assessment");
    let report = pipeline.assess(&first_id)?;
    render_assessment(&report);

    println!("\nBatch over the whole store");
    let batch = pipeline.run_all(&CancelFlag::new(), today)?;
    render_batch_report(&batch);

    let shortlisted = pipeline.shortlist_summary()?;
    println!("\nLeads on file: {}", shortlisted.total);
    for lead in &shortlisted.leads {
        println!("- {}: {}", lead.applicant_id.0, lead.score_reason);
    }

    render_assessment_summary(&pipeline.assessment_summary()?);

    println!("\nPublic status payloads");
    for applicant_id in SAMPLE_APPLICANT_IDS {
        let view = pipeline
            .status(&ApplicantId(applicant_id.to_string()))?
            .status_view();
        match serde_json::to_string_pretty(&view) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("status payload unavailable: {err}"),
        }
    }

    Ok(())
}

fn sample_pipeline() -> Result<SamplePipeline, AppError> {
    let config = AppConfig::load()?;
    let store = Arc::new(InMemoryApplicantStore::default());
    infra::seed_sample_applicants(&store).map_err(PipelineError::from)?;
    let gateway = Arc::new(infra::build_completion_client(&config)?);

    Ok(ApplicantPipeline::new(
        store,
        gateway,
        config.shortlist,
        config.generation,
    ))
}

/// Single-stage commands read the stored document, so build the documents
/// before running them.
fn consolidate_samples(pipeline: &SamplePipeline) -> Result<(), AppError> {
    pipeline.consolidate_all(&CancelFlag::new())?;
    Ok(())
}

fn render_batch_report(report: &BatchReport) {
    println!(
        "{} batch: {} succeeded, {} failed, {} skipped",
        report.stage.label(),
        report.succeeded.len(),
        report.failed.len(),
        report.skipped
    );
    for failure in &report.failed {
        println!(
            "- {} failed during {}: {}",
            failure.applicant_id.0,
            failure.stage.label(),
            failure.reason
        );
    }
}

fn render_shortlist_outcome(applicant_id: &str, outcome: &ShortlistOutcome) {
    let verdict = if outcome.eligible {
        "shortlisted"
    } else {
        "rejected"
    };
    println!("{applicant_id}: {verdict}");
    println!("  Reason: {}", outcome.reason);
    for review in &outcome.reviews {
        let mark = if review.passed { "pass" } else { "fail" };
        println!("  - {}: {} ({})", review.criterion.label(), mark, review.detail);
    }
    for flag in &outcome.data_quality_flags {
        println!("  - data quality: {flag}");
    }
}

fn render_assessment(report: &AssessmentReport) {
    println!("  Attempts: {}", report.attempts);
    match report.assessment.score {
        Some(score) => println!("  Score: {score}/10"),
        None => println!("  Score: not provided"),
    }
    println!("  Summary: {}", report.assessment.summary);
    if !report.assessment.issues.is_empty() {
        println!("  Issues:");
        for issue in &report.assessment.issues {
            println!("    - {issue}");
        }
    }
    if !report.assessment.follow_ups.is_empty() {
        println!("  Follow-ups:");
        for follow_up in &report.assessment.follow_ups {
            println!("    - {follow_up}");
        }
    }
    for warning in &report.warnings {
        println!("  Warning: {warning}");
    }
}

fn render_assessment_summary(summary: &AssessmentSummary) {
    println!(
        "\nAssessment coverage: {}/{} evaluated, {} scored, {} unscored",
        summary.evaluated, summary.total_applicants, summary.scored, summary.unscored
    );
    if let Some(average) = summary.average_score {
        println!("Average score: {average:.1}");
    }
    if !summary.distribution.is_empty() {
        println!("Score distribution:");
        for (score, count) in &summary.distribution {
            println!("  {score}: {count}");
        }
    }
}

fn render_children(children: &ChildRecords) {
    match &children.personal {
        Some(fields) => {
            println!("Personal details:");
            render_fields(fields);
        }
        None => println!("Personal details: none"),
    }

    if children.experience.is_empty() {
        println!("Work experience: none");
    } else {
        for (index, fields) in children.experience.iter().enumerate() {
            println!("Work experience {}:", index + 1);
            render_fields(fields);
        }
    }

    match &children.salary {
        Some(fields) => {
            println!("Salary preference:");
            render_fields(fields);
        }
        None => println!("Salary preference: none"),
    }
}

fn render_fields(fields: &RecordFields) {
    match serde_json::to_string_pretty(fields) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("  unrenderable: {err}"),
    }
}
