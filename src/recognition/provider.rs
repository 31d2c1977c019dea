use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::ProviderConfig;

/// What the provider heard in an audio fragment.
///
/// Either field may be missing when the provider could not extract usable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedFragment {
    pub title: Option<String>,
    pub artist: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider transport error: {0}")]
    Transport(String),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("provider response malformed: {0}")]
    Malformed(String),

    #[error("provider rejected request: {0}")]
    Rejected(String),
}

/// External recognition capability.
///
/// Injected into the orchestrator so the pipeline is testable without network
/// access. `Ok(None)` means the provider found no recognizable track.
pub trait RecognitionProvider {
    fn recognize(&self, audio: &[u8]) -> Result<Option<RecognizedFragment>, ProviderError>;
}

/// Audd.io adapter backed by `ureq`.
pub struct AuddProvider {
    http_client: ureq::Agent,
    api_url: String,
    api_token: String,
}

impl AuddProvider {
    pub fn new(config: &ProviderConfig, api_token: String) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();

        Self {
            http_client,
            api_url: config.api_url.clone(),
            api_token,
        }
    }
}

impl RecognitionProvider for AuddProvider {
    fn recognize(&self, audio: &[u8]) -> Result<Option<RecognizedFragment>, ProviderError> {
        let response = self
            .http_client
            .post(&self.api_url)
            .query("api_token", &self.api_token)
            .send_bytes(audio)
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => ProviderError::Status(code),
                ureq::Error::Transport(transport) => {
                    ProviderError::Transport(transport.to_string())
                }
            })?;

        let body: AuddResponse = response
            .into_json()
            .map_err(|err| ProviderError::Malformed(err.to_string()))?;

        fragment_from_response(body)
    }
}

#[derive(Debug, Deserialize)]
struct AuddResponse {
    status: String,
    result: Option<AuddResult>,
    error: Option<AuddError>,
}

#[derive(Debug, Deserialize)]
struct AuddResult {
    title: Option<String>,
    artist: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuddError {
    error_message: Option<String>,
}

fn fragment_from_response(
    body: AuddResponse,
) -> Result<Option<RecognizedFragment>, ProviderError> {
    if body.status != "success" {
        let message = body
            .error
            .and_then(|e| e.error_message)
            .unwrap_or_else(|| format!("status {}", body.status));
        return Err(ProviderError::Rejected(message));
    }

    Ok(body.result.map(|result| RecognizedFragment {
        title: result.title,
        artist: result.artist,
    }))
}
