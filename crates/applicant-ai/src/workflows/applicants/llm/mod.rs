//! Model-backed assessment of consolidated dossiers.
//!
//! The orchestrator owns prompting, retry policy, and response parsing.
//! Everything network-shaped sits behind [`CompletionGateway`] so tests and
//! the CLI can swap in scripted gateways.

pub mod openai;
mod parser;
mod prompt;
pub mod retry;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use self::retry::RetrySchedule;
use super::domain::{ApplicantId, LlmAssessment};

/// Model parameters and the retry budget for assessment calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_attempts: u8,
    pub backoff_base: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            max_tokens: 500,
            temperature: 0.3,
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

/// One fully rendered completion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Boundary to whichever service produces completions.
pub trait CompletionGateway: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("generation endpoint rate limited the request")]
    RateLimited,
    #[error("generation request timed out")]
    Timeout,
    #[error("generation endpoint rejected the credentials")]
    Auth,
    #[error("generation request was malformed: {0}")]
    MalformedRequest(String),
    #[error("generation endpoint returned status {status}")]
    Upstream { status: u16 },
    #[error("transport failure reaching the generation endpoint: {0}")]
    Transport(String),
}

impl CompletionError {
    /// Transient failures are worth retrying; the rest would fail the same
    /// way again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited
                | CompletionError::Timeout
                | CompletionError::Upstream { .. }
                | CompletionError::Transport(_)
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("assessment failed after {attempts} attempts: {source}")]
    RetriesExhausted { attempts: u8, source: CompletionError },
    #[error("assessment rejected: {source}")]
    Rejected { source: CompletionError },
}

/// Parsed assessment plus how the call went.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub assessment: LlmAssessment,
    pub attempts: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Drives assessment calls against a [`CompletionGateway`] with bounded
/// retries for transient failures.
pub struct AssessmentOrchestrator<G> {
    gateway: Arc<G>,
    config: GenerationConfig,
}

impl<G> AssessmentOrchestrator<G>
where
    G: CompletionGateway,
{
    pub fn new(gateway: Arc<G>, config: GenerationConfig) -> Self {
        Self { gateway, config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Ask the model to review one canonical dossier document. Transient
    /// gateway failures retry on the configured backoff; permanent ones
    /// abort immediately. Parser warnings never fail the assessment.
    pub fn assess(
        &self,
        applicant_id: &ApplicantId,
        document: &str,
    ) -> Result<AssessmentReport, AssessmentError> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            system: prompt::SYSTEM_PROMPT.to_string(),
            user: prompt::user_prompt(document),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut schedule = RetrySchedule::new(self.config.max_attempts, self.config.backoff_base);

        loop {
            match self.gateway.complete(&request) {
                Ok(raw) => {
                    let attempts = schedule.attempts_made() + 1;
                    let (assessment, warnings) = parser::parse_assessment(&raw);
                    for warning in &warnings {
                        warn!(
                            applicant = %applicant_id.0,
                            warning = %warning,
                            "assessment response needed tolerant parsing"
                        );
                    }
                    debug!(applicant = %applicant_id.0, attempts, "assessment completed");
                    return Ok(AssessmentReport {
                        assessment,
                        attempts,
                        warnings,
                    });
                }
                Err(error) if error.is_transient() => match schedule.next_delay() {
                    Some(delay) => {
                        warn!(
                            applicant = %applicant_id.0,
                            attempt = schedule.attempts_made(),
                            delay_ms = delay.as_millis() as u64,
                            error = %error,
                            "assessment attempt failed, retrying"
                        );
                        thread::sleep(delay);
                    }
                    None => {
                        return Err(AssessmentError::RetriesExhausted {
                            attempts: schedule.attempts_made(),
                            source: error,
                        });
                    }
                },
                Err(error) => return Err(AssessmentError::Rejected { source: error }),
            }
        }
    }
}
