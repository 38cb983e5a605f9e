//! Typed client for the Pasteor paste-storage API.
//!
//! Every response is parsed into a concrete model at this boundary; a shape
//! mismatch surfaces as [`ApiError::Malformed`] instead of leaking partial
//! data into the views. Server error bodies carry a human-readable `error`
//! field which is surfaced verbatim when present.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use pasteor_core::models::{
    AggregateStats, CreatePasteRequest, ListResult, Paste, PasteMetadata, PasteSummary,
    PublicStats, UpdatePasteRequest, UserProfile,
};
use pasteor_core::{ApiError, Config, Query};

/// HTTP client bound to one Pasteor server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

/// Build an endpoint URL by appending path segments to the server base.
///
/// Segments are percent-encoded individually, so reserved characters in a
/// paste id cannot break out of the path.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ApiError::Transport("server URL cannot be used as an API base".into()))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

/// Extract the user-facing message from a failed response body.
pub(crate) fn error_message_for_response(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

/// Map a failed response to the error taxonomy.
pub(crate) fn error_for_response(status: StatusCode, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::AuthRequired,
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::FORBIDDEN => ApiError::Ownership(error_message_for_response(status, body)),
        _ => ApiError::Api {
            status: status.as_u16(),
            message: error_message_for_response(status, body),
        },
    }
}

fn with_bearer(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

impl ApiClient {
    /// Construct a client for `server` with a fixed request timeout.
    pub fn new(server: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(server)
            .map_err(|err| ApiError::Transport(format!("invalid server URL '{server}': {err}")))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::transport)?;
        Ok(Self { http, base })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            &config.server_url,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        request.send().await.map_err(|err| {
            if err.is_timeout() {
                ApiError::Transport(format!("request timed out: {err}"))
            } else {
                ApiError::transport(err)
            }
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await.map_err(ApiError::transport)?;
        if !status.is_success() {
            debug!(%status, "api request failed");
            return Err(error_for_response(status, &body));
        }
        serde_json::from_str(&body).map_err(|err| ApiError::Malformed(err.to_string()))
    }

    async fn read_text(response: Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await.map_err(ApiError::transport)?;
        if !status.is_success() {
            return Err(error_for_response(status, &body));
        }
        Ok(body)
    }

    /// Create a paste; anonymous when no token is given.
    pub async fn create_paste(
        &self,
        token: Option<&str>,
        request: &CreatePasteRequest,
    ) -> Result<PasteMetadata, ApiError> {
        let url = endpoint(&self.base, &["api", "pastes"])?;
        let response = self
            .send(with_bearer(self.http.post(url), token).json(request))
            .await?;
        Self::read_json(response).await
    }

    /// Most recent public pastes, newest first.
    pub async fn recent_pastes(&self, limit: u32) -> Result<Vec<PasteSummary>, ApiError> {
        let url = endpoint(&self.base, &["api", "pastes", "recent"])?;
        let response = self
            .send(self.http.get(url).query(&[("limit", limit)]))
            .await?;
        Self::read_json(response).await
    }

    /// One page of the caller's own pastes for the given query.
    pub async fn my_pastes(&self, token: &str, query: &Query) -> Result<ListResult, ApiError> {
        let mut url = endpoint(&self.base, &["api", "pastes", "my"])?;
        {
            let mut pairs = url.query_pairs_mut();
            if !query.search.is_empty() {
                pairs.append_pair("search", &query.search);
            }
            if let Some(language) = &query.language {
                pairs.append_pair("language", language);
            }
            pairs.append_pair("sortBy", query.sort.as_str());
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("pageSize", &query.page_size.to_string());
        }
        let response = self.send(self.http.get(url).bearer_auth(token)).await?;
        Self::read_json(response).await
    }

    /// Full paste detail; the token, when present, resolves `isOwner`.
    pub async fn get_paste(&self, id: &str, token: Option<&str>) -> Result<Paste, ApiError> {
        let url = endpoint(&self.base, &["api", "pastes", id])?;
        let response = self.send(with_bearer(self.http.get(url), token)).await?;
        Self::read_json(response).await
    }

    /// Raw content without layout chrome.
    pub async fn get_raw(&self, id: &str) -> Result<String, ApiError> {
        let url = endpoint(&self.base, &["api", "pastes", id, "raw"])?;
        let response = self.send(self.http.get(url)).await?;
        Self::read_text(response).await
    }

    pub async fn update_paste(
        &self,
        token: &str,
        id: &str,
        request: &UpdatePasteRequest,
    ) -> Result<PasteMetadata, ApiError> {
        let url = endpoint(&self.base, &["api", "pastes", id])?;
        let response = self
            .send(self.http.put(url).bearer_auth(token).json(request))
            .await?;
        Self::read_json(response).await
    }

    pub async fn delete_paste(&self, token: &str, id: &str) -> Result<(), ApiError> {
        let url = endpoint(&self.base, &["api", "pastes", id])?;
        let response = self.send(self.http.delete(url).bearer_auth(token)).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(ApiError::transport)?;
            return Err(error_for_response(status, &body));
        }
        Ok(())
    }

    /// Aggregate counts for the caller's own pastes.
    pub async fn user_stats(&self, token: &str) -> Result<AggregateStats, ApiError> {
        let url = endpoint(&self.base, &["api", "stats", "me"])?;
        let response = self.send(self.http.get(url).bearer_auth(token)).await?;
        Self::read_json(response).await
    }

    /// Distinct language tags the caller has ever used.
    pub async fn user_languages(&self, token: &str) -> Result<Vec<String>, ApiError> {
        let url = endpoint(&self.base, &["api", "users", "me", "languages"])?;
        let response = self.send(self.http.get(url).bearer_auth(token)).await?;
        Self::read_json(response).await
    }

    pub async fn public_stats(&self) -> Result<PublicStats, ApiError> {
        let url = endpoint(&self.base, &["api", "stats", "public"])?;
        let response = self.send(self.http.get(url)).await?;
        Self::read_json(response).await
    }

    /// Profile for the given token; 401 means the token is no longer valid.
    pub async fn me(&self, token: &str) -> Result<UserProfile, ApiError> {
        let url = endpoint(&self.base, &["api", "auth", "me"])?;
        let response = self.send(self.http.get(url).bearer_auth(token)).await?;
        Self::read_json(response).await
    }
}
