//! Shared HTTP client for the StudyHub backend.
//!
//! Provides a client with bearer-token auth, generic request helpers that
//! classify every non-2xx response into the [`ApiError`] taxonomy, and typed
//! domain methods (auth, organizations, channels, topics, notes, memberships,
//! invitations, uploads). The services and CLI crates use this client
//! directly.

pub mod api;

use std::sync::{Arc, RwLock};

use reqwest::Client;
use serde::de::DeserializeOwned;
use studyhub_core::config::ClientConfig;

pub use studyhub_core::error::{ApiError, ApiResult, FieldError};
use studyhub_core::store::SessionStore;

/// HTTP client for the StudyHub backend. Cheap to clone; the bearer token is
/// shared between clones so a login anywhere authenticates everywhere. A 401
/// from any request clears the token and the attached session store, so stale
/// credentials never survive a rejection.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
    session_store: Arc<RwLock<Option<SessionStore>>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
            session_store: Arc::new(RwLock::new(None)),
        })
    }

    /// Create a client from environment: STUDYHUB_API_URL (or API_URL),
    /// STUDYHUB_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ClientConfig::from_env()?;
        Self::new(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Install the bearer token after login, or restore it from a stored
    /// session.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().expect("token lock poisoned") = Some(token.into());
    }

    /// Drop the bearer token. Called on logout and after any 401.
    pub fn clear_token(&self) {
        *self.token.write().expect("token lock poisoned") = None;
    }

    /// Attach the session store so a 401 clears the persisted session along
    /// with the in-memory token. Shared between clones, like the token.
    pub fn attach_session_store(&self, store: SessionStore) {
        *self.session_store.write().expect("session store lock poisoned") = Some(store);
    }

    pub fn has_token(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.read().expect("token lock poisoned").as_deref() {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Classify a non-2xx response. An `Unauthorized` clears the stored
    /// credentials here, at the one point every response passes through, so
    /// the side effect fires even when the caller swallows the error.
    fn classify_failure(&self, status: u16, body: &str) -> ApiError {
        let err = ApiError::from_response_parts(status, body);
        tracing::debug!(status, error = %err, "request failed");
        if matches!(err, ApiError::Unauthorized { .. }) {
            self.clear_token();
            if let Some(store) = self
                .session_store
                .read()
                .expect("session store lock poisoned")
                .as_ref()
            {
                if let Err(e) = store.clear() {
                    tracing::warn!(error = %e, "failed to remove session file after 401");
                }
            }
        }
        err
    }

    /// Run a request, classify non-2xx responses, decode the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ApiResult<T> {
        let response = self.apply_auth(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.classify_failure(status.as_u16(), &body));
        }

        let body = response.text().await.map_err(ApiError::Network)?;
        serde_json::from_str(&body).map_err(|e| {
            ApiError::Decode(format!("{} (body: {})", e, truncate_body(&body)))
        })
    }

    /// Like [`execute`] but discards the body. Used for deletes and other
    /// calls whose response shape is not depended upon.
    async fn execute_empty(&self, request: reqwest::RequestBuilder) -> ApiResult<()> {
        let response = self.apply_auth(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.classify_failure(status.as_u16(), &body));
        }
        Ok(())
    }

    /// GET request with optional query parameters.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let mut request = self.client.get(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        self.execute(request).await
    }

    /// POST a JSON body and decode the response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = self.client.post(self.build_url(path)).json(body);
        self.execute(request).await
    }

    /// POST form-urlencoded fields (the auth endpoints use this shape).
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> ApiResult<T> {
        let request = self.client.post(self.build_url(path)).form(&fields);
        self.execute(request).await
    }

    /// POST with query parameters only, ignoring the response body.
    pub async fn post_empty(&self, path: &str, query: &[(&str, String)]) -> ApiResult<()> {
        let mut request = self.client.post(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        self.execute_empty(request).await
    }

    /// PUT form-urlencoded fields, ignoring the response body.
    pub async fn put_form(&self, path: &str, fields: &[(&str, &str)]) -> ApiResult<()> {
        let request = self.client.put(self.build_url(path)).form(&fields);
        self.execute_empty(request).await
    }

    /// POST a multipart form and decode the response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> ApiResult<T> {
        let request = self.client.post(self.build_url(path)).multipart(form);
        self.execute(request).await
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let request = self.client.delete(self.build_url(path));
        self.execute_empty(request).await
    }
}

fn truncate_body(body: &str) -> &str {
    let max = 200.min(body.len());
    // Back off to a char boundary so the error message slice never panics.
    let mut end = max;
    while end > 0 && !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

// Re-export core types so consumers only need this crate for most calls.
pub use studyhub_core::models::{
    Channel, Invitation, Membership, Note, Organization, Role, Topic, UploadResponse, User,
};
