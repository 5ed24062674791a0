//! Deterministic shortlist decisioning over consolidated dossiers.

pub mod config;
mod rules;

pub use config::ShortlistConfig;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::applicants::domain::ApplicationDossier;

/// The three checks every applicant is reviewed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortlistCriterion {
    Experience,
    Compensation,
    Location,
}

impl ShortlistCriterion {
    pub const fn label(self) -> &'static str {
        match self {
            ShortlistCriterion::Experience => "experience",
            ShortlistCriterion::Compensation => "compensation",
            ShortlistCriterion::Location => "location",
        }
    }
}

/// Verdict for one criterion, with the human-readable detail line that
/// feeds the overall reason string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionReview {
    pub criterion: ShortlistCriterion,
    pub passed: bool,
    pub detail: String,
}

/// Full shortlist verdict. `reason` cites every criterion's detail line,
/// so a rejection still records which way the experience rule was met.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistOutcome {
    pub eligible: bool,
    pub reason: String,
    pub reviews: Vec<CriterionReview>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_quality_flags: Vec<String>,
}

/// Applies a fixed [`ShortlistConfig`] to dossiers. The engine holds no
/// mutable state, so one instance can serve every applicant in a batch.
#[derive(Debug, Clone)]
pub struct ShortlistEngine {
    config: ShortlistConfig,
}

impl ShortlistEngine {
    pub fn new(config: ShortlistConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ShortlistConfig {
        &self.config
    }

    /// Review a dossier as of `today`. `today` only matters for ongoing
    /// work experience, which is measured up to that date.
    pub fn evaluate(&self, dossier: &ApplicationDossier, today: NaiveDate) -> ShortlistOutcome {
        let experience = rules::review_experience(dossier, &self.config, today);
        let (compensation, currency_flag) = rules::review_compensation(dossier, &self.config);
        let location = rules::review_location(dossier, &self.config);

        let reviews = vec![experience, compensation, location];
        let eligible = reviews.iter().all(|review| review.passed);

        let mut reason = reviews
            .iter()
            .map(|review| review.detail.as_str())
            .collect::<Vec<_>>()
            .join(" | ");

        let data_quality_flags: Vec<String> = currency_flag.into_iter().collect();
        for flag in &data_quality_flags {
            reason.push_str(" | Data quality: ");
            reason.push_str(flag);
        }

        ShortlistOutcome {
            eligible,
            reason,
            reviews,
            data_quality_flags,
        }
    }
}
