//! HTTP client for the cloudmark annotation API.
//!
//! [`ApiClient`] is a pure network adapter: it translates the three store
//! operations (list, create, delete) into HTTP calls and decodes the JSON
//! bodies. There are no retries and no backoff; any transport failure or
//! non-2xx response is surfaced immediately to the caller.

use serde::Deserialize;

pub use reqwest::{StatusCode, Url};

use cloudmark_core::{Annotation, Position};

/// Environment variable naming the API base URL.
pub const API_BASE_ENV: &str = "CLOUDMARK_API_BASE";

/// Default API base URL for local development.
pub const DEFAULT_API_BASE: &str = "http://localhost:5174";

/// Client for one cloudmark API deployment.
///
/// Holds the base URL and a shared `reqwest::Client` (connection pooling
/// comes for free from reusing it across calls).
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

/// Errors raised by [`ApiClient`] calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A transport-level failure (connection refused, DNS, decode, ...).
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status. `body` carries the response
    /// text for diagnostics (empty when it could not be read).
    #[error("API returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    /// The configured base URL could not be parsed.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

/// `{ "items": [...] }` envelope returned by the list endpoint.
#[derive(Debug, Deserialize)]
struct ItemsEnvelope {
    items: Vec<Annotation>,
}

/// `{ "removed": bool }` body returned by the delete endpoint.
#[derive(Debug, Deserialize)]
struct RemovedEnvelope {
    removed: bool,
}

impl ApiClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Create a client from `CLOUDMARK_API_BASE`, falling back to the local
    /// development default.
    pub fn from_env() -> Result<Self, ClientError> {
        let base = std::env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let url = Url::parse(&base).map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))?;
        Ok(Self::new(url))
    }

    /// API base URL this client targets.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET /annotations -- fetch all annotations, newest-first.
    pub async fn list(&self) -> Result<Vec<Annotation>, ClientError> {
        let response = self.http.get(self.annotations_url(None)?).send().await?;
        let response = check_status(response).await?;

        let envelope: ItemsEnvelope = response.json().await?;
        Ok(envelope.items)
    }

    /// POST /annotations -- create an annotation at `position`.
    pub async fn create(
        &self,
        position: &Position,
        text: &str,
    ) -> Result<Annotation, ClientError> {
        let payload = serde_json::json!({ "position": position, "text": text });

        let response = self
            .http
            .post(self.annotations_url(None)?)
            .json(&payload)
            .send()
            .await?;
        let response = check_status(response).await?;

        let created: Annotation = response.json().await?;
        tracing::debug!(id = %created.id, "Annotation created via API");
        Ok(created)
    }

    /// DELETE /annotations/{id} -- returns whether a removal occurred.
    pub async fn delete(&self, id: &str) -> Result<bool, ClientError> {
        let response = self
            .http
            .delete(self.annotations_url(Some(id))?)
            .send()
            .await?;
        let response = check_status(response).await?;

        let envelope: RemovedEnvelope = response.json().await?;
        Ok(envelope.removed)
    }

    /// Build `{base}/annotations[/{id}]`, percent-encoding the id segment.
    fn annotations_url(&self, id: Option<&str>) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ClientError::InvalidBaseUrl("URL cannot be a base".into()))?;
            segments.pop_if_empty().push("annotations");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }
}

/// Map a non-2xx response to [`ClientError::Api`], capturing the body text.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%status, %body, "API request failed");
    Err(ClientError::Api { status, body })
}
