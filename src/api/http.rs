use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;

use super::{ApiError, ApiRequest, Body, Transport};

/// reqwest-backed transport against the Ascend REST API.
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        if base_url.trim().is_empty() {
            log::error!("API base URL is not configured");
        }
        let http = Client::builder()
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            http,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build(&self, request: ApiRequest) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        match request.body {
            Some(Body::Json(value)) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(value.to_string()),
            Some(Body::Form(fields)) => builder.form(&fields),
            None => builder.header(CONTENT_TYPE, "application/json"),
        }
    }

    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let method = request.method.clone();
        let path = request.path.clone();
        let resp = self.build(request).send().await.map_err(|e| {
            log::error!("{} {} failed: {}", method, path, e);
            ApiError::Transport(e.to_string())
        })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = error_message(status, &text);
            log::debug!("{} {} returned {}: {}", method, path, status, message);
            return Err(ApiError::server(status.as_u16(), message));
        }

        decode_success(status, &text)
    }
}

impl Transport for HttpClient {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<Value, ApiError>> {
        self.execute(request).boxed()
    }
}

/// Human-readable message for a failed response: the JSON `detail` string
/// when present, else a generic status line.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .get("detail")
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16())),
        Err(_) => "Unknown API error".to_string(),
    }
}

fn decode_success(status: StatusCode, body: &str) -> Result<Value, ApiError> {
    if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}
