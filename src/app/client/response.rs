//! Translation of failed Reactor and gateway responses into readable messages
//!
//! Three body shapes are recognised: a gateway error carrying `message`, a
//! JSON:API document carrying `errors`, and anything else, which is dumped
//! as JSON so nothing the server said is lost.

use reqwest::StatusCode;
use serde_json::Value;

use crate::app::client::http::ApiResponse;
use crate::app::models::ReactorErrorEntry;

/// Why a Reactor request did not produce the expected document
#[derive(Debug)]
pub enum RequestFailure {
    /// The request never produced a response
    Transport(reqwest::Error),
    /// The server answered with a non-success status
    Rejected { status: StatusCode, body: Value },
    /// The server answered with success but the body is not usable
    Malformed { reason: String, body: Value },
}

impl RequestFailure {
    /// Message suitable for appending to a context prefix
    pub fn describe(&self) -> String {
        match self {
            RequestFailure::Transport(error) => format!("{}.", error),
            // Non-JSON bodies say little on their own
            RequestFailure::Rejected { status, body } if !body.is_object() => {
                format!("HTTP {}: {}.", status, body)
            }
            RequestFailure::Rejected { body, .. } => describe_body(body),
            RequestFailure::Malformed { reason, body } => {
                format!("{} Full response body: {}", reason, body)
            }
        }
    }
}

impl From<reqwest::Error> for RequestFailure {
    fn from(error: reqwest::Error) -> Self {
        RequestFailure::Transport(error)
    }
}

/// Reject non-success responses
pub fn ensure_success(response: ApiResponse) -> Result<Value, RequestFailure> {
    if response.status.is_success() {
        Ok(response.body)
    } else {
        Err(RequestFailure::Rejected {
            status: response.status,
            body: response.body,
        })
    }
}

/// Message carried by a gateway or JSON:API error body, if the body has one
pub fn structured_message(body: &Value) -> Option<String> {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }

    let first = body.get("errors")?.as_array()?.first()?;
    let entry: ReactorErrorEntry = serde_json::from_value(first.clone()).ok()?;
    Some(entry.to_message())
}

/// Message for any error body: structured when possible, otherwise a dump
pub fn describe_body(body: &Value) -> String {
    structured_message(body).unwrap_or_else(|| format!("{}.", body))
}
