//! Remote text generation.

use std::{future::Future, sync::Arc};

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::{prompt::compose_prompt, ChatRequest};
use crate::config::AppConfig;

const MAX_ERROR_BODY: usize = 200;

/// Failure to obtain a reply from the external responder.
#[derive(Debug, Error)]
pub enum ResponderError {
    /// No API key was configured, so no request was attempted.
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,
    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Leading part of the response body.
        body: String,
    },
    /// The response body was not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The response carried no reply text.
    #[error("reply contained no text")]
    EmptyReply,
    /// The request task ended without producing a result.
    #[error("request task aborted: {0}")]
    Aborted(String),
}

/// Produces a reply for a chat request.
pub trait Responder {
    /// Generate reply text for `request`.
    fn respond(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<String, ResponderError>> + Send;
}

/// Run `responder` on its own task so a panic still yields an outcome.
///
/// The returned future always resolves, which lets the session leave its
/// awaiting state no matter how the request ends.
pub async fn respond_guarded<R>(
    responder: Arc<R>,
    request: ChatRequest,
) -> Result<String, ResponderError>
where
    R: Responder + Send + Sync + 'static,
{
    let handle = tokio::spawn(async move { responder.respond(&request).await });
    match handle.await {
        Ok(outcome) => outcome,
        Err(err) => Err(ResponderError::Aborted(err.to_string())),
    }
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiResponder {
    client: Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiResponder {
    /// Build a responder from configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Whether an API key is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full URL of the generation endpoint, without the key.
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

impl Responder for GeminiResponder {
    fn respond(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<String, ResponderError>> + Send {
        self.generate(compose_prompt(&request.history, &request.text))
    }
}

impl GeminiResponder {
    async fn generate(&self, prompt: String) -> Result<String, ResponderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ResponderError::MissingApiKey)?;
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: &prompt }],
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending generation request");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(ResponderError::Status {
                status,
                body: raw.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        extract_reply(&raw)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Pull the reply text out of a `generateContent` response body.
pub(crate) fn extract_reply(raw: &str) -> Result<String, ResponderError> {
    let decoded: GenerateResponse = serde_json::from_str(raw)?;
    let text: String = decoded
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        Err(ResponderError::EmptyReply)
    } else {
        Ok(text)
    }
}
