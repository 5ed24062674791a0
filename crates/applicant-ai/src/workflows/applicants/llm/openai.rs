//! Blocking client for OpenAI-compatible chat completion endpoints.
//!
//! The orchestrator is synchronous, so the client owns a small runtime and
//! drives the async HTTP stack to completion per call.

use std::io;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

use super::{CompletionError, CompletionGateway, CompletionRequest};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OpenAiChatClient {
    http: reqwest::Client,
    runtime: Runtime,
    base_url: String,
    api_key: String,
}

impl OpenAiChatClient {
    /// Build a client with its own runtime. Fails only if the runtime or
    /// TLS stack cannot be set up.
    pub fn with_runtime(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> io::Result<Self> {
        let runtime = Runtime::new()?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(io::Error::other)?;
        Ok(Self {
            http,
            runtime,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[derive(Serialize)]
struct ChatPayload<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl CompletionGateway for OpenAiChatClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let payload = ChatPayload {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        self.runtime.block_on(async {
            let response = self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&payload)
                .send()
                .await
                .map_err(transport_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(status_error(status));
            }

            let completion: ChatCompletion = response.json().await.map_err(transport_error)?;
            completion
                .choices
                .into_iter()
                .find_map(|choice| choice.message.content)
                .filter(|content| !content.is_empty())
                .ok_or_else(|| {
                    CompletionError::Transport(
                        "completion response contained no content".to_string(),
                    )
                })
        })
    }
}

fn status_error(status: StatusCode) -> CompletionError {
    match status.as_u16() {
        401 | 403 => CompletionError::Auth,
        400 | 404 | 422 => {
            CompletionError::MalformedRequest(format!("endpoint returned status {status}"))
        }
        408 => CompletionError::Timeout,
        429 => CompletionError::RateLimited,
        other => CompletionError::Upstream { status: other },
    }
}

fn transport_error(error: reqwest::Error) -> CompletionError {
    if error.is_timeout() {
        CompletionError::Timeout
    } else {
        CompletionError::Transport(error.to_string())
    }
}
