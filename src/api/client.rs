use super::payload::TopicPayload;
use super::types::{ApiError, ApiReply, Envelope, Topic};
use crate::util::validate_base_url;
use futures::StreamExt;
use reqwest::redirect::Policy;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;

/// Response bodies larger than this are rejected (5 MB).
const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024;

/// Create a redirect policy that follows at most 3 hops and stops on loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

/// HTTP client for the library endpoints.
///
/// Cheap to clone: the connection pool and the token are shared, so each
/// background task takes its own copy.
#[derive(Clone)]
pub struct TopicClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<Arc<SecretString>>,
    timeout: Duration,
}

impl std::fmt::Debug for TopicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TopicClient {
    /// Build a client for `base_url`, e.g. `https://admin.example.com/api`.
    ///
    /// Fails when the base URL is not HTTPS (loopback HTTP excepted).
    pub fn new(
        base_url: &str,
        token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let parsed = validate_base_url(base_url)?;
        if parsed.scheme() == "http" {
            tracing::warn!(base_url = %parsed, "Using plain HTTP API base URL (loopback only)");
        }

        let http = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            token: token.map(Arc::new),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn library_url(&self, id: Option<i64>) -> String {
        match id {
            Some(id) => format!("{}/library/{}", self.base_url, id),
            None => format!("{}/library", self.base_url),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        tokio::time::timeout(self.timeout, self.authorize(request).send())
            .await
            .map_err(|_| ApiError::Timeout(self.timeout.as_secs()))?
            .map_err(ApiError::Network)
    }

    /// `GET /library`: the full topic list.
    pub async fn fetch_topics(&self) -> Result<Vec<Topic>, ApiError> {
        let response = self.send(self.http.get(self.library_url(None))).await?;
        let http_status = response.status();
        if !http_status.is_success() {
            return Err(ApiError::HttpStatus(http_status.as_u16()));
        }

        let body = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        let envelope: Envelope<Vec<Topic>> =
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))?;

        if let Some(status) = envelope.status.filter(|s| *s != ApiReply::OK) {
            return Err(ApiError::HttpStatus(status));
        }

        let topics = envelope.data.unwrap_or_default();
        tracing::debug!(count = topics.len(), "Fetched topic list");
        Ok(topics)
    }

    /// `POST /library` when `id` is `None`, `PUT /library/{id}` otherwise.
    pub async fn create_or_update_topic(
        &self,
        payload: TopicPayload,
        id: Option<i64>,
    ) -> Result<ApiReply, ApiError> {
        let form = payload.into_form()?;
        let url = self.library_url(id);
        let request = match id {
            Some(_) => self.http.put(url),
            None => self.http.post(url),
        };

        tracing::info!(id = ?id, "Submitting topic");
        let response = self.send(request.multipart(form)).await?;
        read_reply(response).await
    }

    /// `DELETE /library/{id}`.
    pub async fn delete_topic(&self, id: i64) -> Result<ApiReply, ApiError> {
        tracing::info!(id, "Deleting topic");
        let response = self.send(self.http.delete(self.library_url(Some(id)))).await?;
        read_reply(response).await
    }
}

/// Turn a mutation response into an [`ApiReply`].
///
/// The JSON body's `status` wins over the HTTP status. A body that is not the
/// expected JSON still yields a reply carrying the HTTP status.
async fn read_reply(response: reqwest::Response) -> Result<ApiReply, ApiError> {
    let http_status = response.status().as_u16();
    let body = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;

    match serde_json::from_slice::<Envelope<serde_json::Value>>(&body) {
        Ok(envelope) => Ok(ApiReply {
            status: envelope.status.unwrap_or(http_status),
            message: envelope.message,
        }),
        Err(e) => {
            tracing::debug!(http_status, error = %e, "Reply body is not a JSON envelope");
            Ok(ApiReply {
                status: http_status,
                message: None,
            })
        }
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
