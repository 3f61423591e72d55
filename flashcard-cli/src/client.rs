use std::time::Duration;

use flashcard_core::card::GenerationRequest;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("server returned {status}: {detail}")]
    Server { status: u16, detail: String },
}

/// Thin HTTP client for the flashcardd API.
#[derive(Clone)]
pub struct FlashcardClient {
    http: reqwest::Client,
    base: String,
}

impl FlashcardClient {
    pub fn new(addr: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            base: addr.trim_end_matches('/').to_string(),
        })
    }

    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let url = format!("{}/health", self.base);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| map_transport_error(err, &url))?;
        read_json(response).await
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<serde_json::Value, ClientError> {
        let url = format!("{}/generate_flashcards", self.base);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| map_transport_error(err, &url))?;
        read_json(response).await
    }
}

async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, ClientError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| ClientError::Transport(err.to_string()))?;

    if !status.is_success() {
        let detail = serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("detail").cloned())
            .map(|detail| match detail {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            })
            .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
        return Err(ClientError::Server {
            status: status.as_u16(),
            detail,
        });
    }

    serde_json::from_slice(&body).map_err(|err| ClientError::InvalidResponse(err.to_string()))
}

fn map_transport_error(err: reqwest::Error, url: &str) -> ClientError {
    if err.is_connect() {
        return ClientError::Transport(format!(
            "unable to reach flashcardd at '{url}'. Is the daemon running?"
        ));
    }
    if err.is_timeout() {
        return ClientError::Transport(format!("request to '{url}' timed out"));
    }
    ClientError::Transport(err.to_string())
}
