//! HTTP client for the user/resource REST API.

use crate::config::SuiteConfig;
use crate::result::SauceResult;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Status, content type and parsed body of one call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// `content-type` header, if sent
    pub content_type: Option<String>,
    /// Parsed JSON body; `Null` when the body is empty, a string when it is
    /// not JSON
    pub body: Value,
}

impl ApiResponse {
    /// Whether the content type mentions `application/json`
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }

    /// Whether the body is `{}`
    #[must_use]
    pub fn is_empty_object(&self) -> bool {
        self.body.as_object().is_some_and(serde_json::Map::is_empty)
    }
}

/// Client for `/api/users` and `/api/unknown`
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    /// Client for the API at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            client,
        }
    }

    /// Client for the configured API origin and key
    pub fn from_config(config: &SuiteConfig) -> Self {
        let client = Self::new(&config.api_base_url);
        match &config.api_key {
            Some(key) => client.with_api_key(key),
            None => client,
        }
    }

    /// Send `x-api-key` with every request
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Use a custom reqwest client
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Returns the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Option<Value>) -> SauceResult<ApiResponse> {
        let mut request = self.client.request(method.clone(), self.url(path));
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        tracing::debug!(%method, path, status, "api call");
        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }

    /// `GET /api/users/{id}`
    pub async fn get_user(&self, id: u32) -> SauceResult<ApiResponse> {
        self.send(reqwest::Method::GET, &format!("/api/users/{id}"), None)
            .await
    }

    /// `GET /api/unknown/{id}`
    pub async fn get_resource(&self, id: u32) -> SauceResult<ApiResponse> {
        self.send(reqwest::Method::GET, &format!("/api/unknown/{id}"), None)
            .await
    }

    /// `POST /api/users`
    pub async fn create_user<T: Serialize + Sync>(&self, body: &T) -> SauceResult<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.send(reqwest::Method::POST, "/api/users", Some(body))
            .await
    }

    /// `PUT /api/users/{id}`
    pub async fn update_user<T: Serialize + Sync>(&self, id: u32, body: &T) -> SauceResult<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.send(reqwest::Method::PUT, &format!("/api/users/{id}"), Some(body))
            .await
    }

    /// `PATCH /api/users/{id}`
    pub async fn patch_user<T: Serialize + Sync>(&self, id: u32, body: &T) -> SauceResult<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.send(reqwest::Method::PATCH, &format!("/api/users/{id}"), Some(body))
            .await
    }

    /// `DELETE /api/users/{id}`
    pub async fn delete_user(&self, id: u32) -> SauceResult<ApiResponse> {
        self.send(reqwest::Method::DELETE, &format!("/api/users/{id}"), None)
            .await
    }
}
