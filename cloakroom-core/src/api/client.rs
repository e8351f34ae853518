//! HTTP client for the Cloakroom catalog service.
//!
//! Every endpoint goes through [`ApiClient::request`], which owns URL
//! building, body encoding and failure classification. Nothing here retries.

use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use super::error::{ApiError, ServerErrorBody};
use crate::models::{
    BootstrapRequest, ClothingItem, HealthStatus, ItemId, OwnerId, OwnerIdentity, TryOnRequest,
    TryOnResult, UploadResponse,
};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Request payload accepted by [`ApiClient::request`].
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::Decode(format!("failed to encode request body: {}", e)))
    }
}

/// Catalog service client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client without a request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client that gives up on requests after `timeout`.
    ///
    /// Timeouts surface as [`ApiError::Network`].
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds an absolute URL for `path`. Absolute inputs are returned as is.
    pub fn url(&self, path: &str) -> String {
        if is_absolute(path) {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Turns a server asset path (`/static/x.png`) into a displayable URL.
    pub fn resolve_asset_url(&self, path_or_url: &str) -> String {
        if path_or_url.trim().is_empty() {
            return String::new();
        }
        self.url(path_or_url)
    }

    /// Executes a request whose caller requires a JSON payload.
    ///
    /// A 2xx response without a JSON content type is a decode failure.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        headers: Option<HeaderMap>,
    ) -> Result<T, ApiError> {
        self.request_optional(method, path, body, headers)
            .await?
            .ok_or_else(|| ApiError::Decode("expected a JSON response body".to_string()))
    }

    /// Executes a request, returning `None` for a 2xx response that does not
    /// declare a JSON content type.
    pub async fn request_optional<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        headers: Option<HeaderMap>,
    ) -> Result<Option<T>, ApiError> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "sending request");

        let mut builder = self.client.request(method, &url);
        if let Some(headers) = headers {
            builder = builder.headers(headers);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(%url, error = %e, "request failed before a response arrived");
            ApiError::Network(e.to_string())
        })?;

        Self::read_response(response).await
    }

    async fn read_response<T: DeserializeOwned>(response: Response) -> Result<Option<T>, ApiError> {
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            let body = if is_json {
                ServerErrorBody::parse(&bytes)
            } else {
                ServerErrorBody::Empty
            };
            let err = ApiError::from_status(status.as_u16(), body);
            tracing::debug!(status = status.as_u16(), error = %err, "request rejected");
            return Err(err);
        }

        if !is_json {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    // ==================== Endpoints ====================

    /// `GET /health`. Any status other than "ok" is unhealthy, not an error.
    pub async fn fetch_health(&self) -> Result<bool, ApiError> {
        let health: HealthStatus = self
            .request(Method::GET, "/health", RequestBody::Empty, None)
            .await?;
        Ok(health.is_ok())
    }

    /// `POST /api/users/bootstrap`.
    pub async fn bootstrap_user(
        &self,
        request: &BootstrapRequest,
    ) -> Result<OwnerIdentity, ApiError> {
        self.request(
            Method::POST,
            "/api/users/bootstrap",
            RequestBody::json(request)?,
            None,
        )
        .await
    }

    /// `POST /api/upload/` with a prepared multipart form.
    pub async fn upload_item(&self, form: Form) -> Result<UploadResponse, ApiError> {
        self.request(
            Method::POST,
            "/api/upload/",
            RequestBody::Multipart(form),
            None,
        )
        .await
    }

    /// `GET /api/closet/{owner_id}`.
    pub async fn fetch_closet(&self, owner_id: OwnerId) -> Result<Vec<ClothingItem>, ApiError> {
        self.request(
            Method::GET,
            &format!("/api/closet/{}", owner_id),
            RequestBody::Empty,
            None,
        )
        .await
    }

    /// `PATCH /api/items/{item_id}`.
    pub async fn update_item_name(
        &self,
        item_id: ItemId,
        name: &str,
    ) -> Result<ClothingItem, ApiError> {
        self.request(
            Method::PATCH,
            &format!("/api/items/{}", item_id),
            RequestBody::Json(json!({ "name": name })),
            None,
        )
        .await
    }

    /// `POST /api/items/{item_id}/photos` with a prepared multipart form.
    pub async fn add_item_photos(
        &self,
        item_id: ItemId,
        form: Form,
    ) -> Result<ClothingItem, ApiError> {
        self.request(
            Method::POST,
            &format!("/api/items/{}/photos", item_id),
            RequestBody::Multipart(form),
            None,
        )
        .await
    }

    /// `POST /api/tryon/`.
    pub async fn generate_try_on(&self, request: &TryOnRequest) -> Result<TryOnResult, ApiError> {
        self.request(
            Method::POST,
            "/api/tryon/",
            RequestBody::json(request)?,
            None,
        )
        .await
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}
