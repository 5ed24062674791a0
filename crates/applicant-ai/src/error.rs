use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::applicants::PipelineError;

/// Top-level failure for the binary surfaces. Startup problems and
/// pipeline failures funnel through here so `main` has one error to print
/// and handlers have one error to render.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Pipeline(PipelineError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(error) => write!(f, "configuration error: {error}"),
            AppError::Telemetry(error) => write!(f, "telemetry error: {error}"),
            AppError::Io(error) => write!(f, "io error: {error}"),
            AppError::Server(error) => write!(f, "server error: {error}"),
            AppError::Pipeline(error) => write!(f, "pipeline error: {error}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(error) => Some(error),
            AppError::Telemetry(error) => Some(error),
            AppError::Io(error) => Some(error),
            AppError::Server(error) => Some(error),
            AppError::Pipeline(error) => Some(error),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        AppError::Config(error)
    }
}

impl From<TelemetryError> for AppError {
    fn from(error: TelemetryError) -> Self {
        AppError::Telemetry(error)
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::Io(error)
    }
}

impl From<axum::Error> for AppError {
    fn from(error: axum::Error) -> Self {
        AppError::Server(error)
    }
}

impl From<PipelineError> for AppError {
    fn from(error: PipelineError) -> Self {
        AppError::Pipeline(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Pipeline(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
