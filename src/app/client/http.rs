//! Core HTTP operations for the Reactor API
//!
//! Sends one request at a time and always reads the body as JSON so callers
//! can inspect structured errors. In verbose mode every request and response
//! is logged under a shared debug id, with the bearer token redacted.

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

/// Placeholder logged instead of the real bearer token
const REDACTED_AUTHORIZATION: &str = "Bearer [USER_ACCESS_TOKEN]";

/// Response with its body decoded eagerly
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// JSON body; a non-JSON body is kept as a string, an empty one as null
    pub body: Value,
}

/// HTTP operations handler
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    verbose: bool,
    debug_id: AtomicU64,
}

impl HttpHandler {
    /// Creates a new HttpHandler around `client`
    pub fn new(client: Client, verbose: bool) -> Self {
        Self {
            client,
            verbose,
            debug_id: AtomicU64::new(0),
        }
    }

    /// Whether request/response tracing is enabled
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Sends the request and decodes the body
    ///
    /// Non-success status codes are not errors here; callers decide how to
    /// translate them.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the request cannot be built or sent, or
    /// the body cannot be read
    pub async fn send(&self, builder: RequestBuilder) -> reqwest::Result<ApiResponse> {
        let request = builder.build()?;

        let debug_id = if self.verbose {
            let id = self.debug_id.fetch_add(1, Ordering::Relaxed) + 1;
            info!(
                debug_id = id,
                method = %request.method(),
                uri = %request.url(),
                host = request.url().host_str().unwrap_or_default(),
                headers = ?redact_headers(request.headers()),
                "Request"
            );
            Some(id)
        } else {
            None
        };

        let response = self.client.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;
        let body = decode_body(&text);

        if let Some(id) = debug_id {
            info!(
                debug_id = id,
                status_code = status.as_u16(),
                headers = ?headers,
                body = %body,
                "Response"
            );
        } else {
            debug!("{} response with {} byte body", status, text.len());
        }

        Ok(ApiResponse { status, body })
    }
}

/// Decode a response body, keeping non-JSON content as a string
pub fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Copy of `headers` that is safe to log
fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut redacted = headers.clone();
    if redacted.contains_key(AUTHORIZATION) {
        redacted.insert(
            AUTHORIZATION,
            reqwest::header::HeaderValue::from_static(REDACTED_AUTHORIZATION),
        );
    }
    redacted
}
