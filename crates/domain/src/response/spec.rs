//! Response type returned by transports

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::request::Headers;

/// Status code the backend uses for an expired or missing credential.
pub const UNAUTHORIZED: u16 = 401;

/// A raw HTTP response from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Raw response body
    pub body: Vec<u8>,
    /// Time from send to last body byte
    pub duration: Duration,
}

impl ApiResponse {
    /// Creates a response with the given status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            ..Self::default()
        }
    }

    /// Creates a response whose body is the serialized JSON value.
    #[must_use]
    pub fn json_body(status: u16, value: &serde_json::Value) -> Self {
        let mut response = Self::new(status, value.to_string());
        response.headers.set("Content-Type", "application/json");
        response
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true for 401 Unauthorized.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == UNAUTHORIZED
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the JSON body.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Extracts a human-readable error message from a failed response.
    ///
    /// Looks for `message`, `detail` or `error` string fields in a JSON body
    /// and falls back to the trimmed body text, then to the bare status.
    #[must_use]
    pub fn error_message(&self) -> String {
        if let Ok(serde_json::Value::Object(map)) = self.json::<serde_json::Value>() {
            let found = ["message", "detail", "error"]
                .iter()
                .find_map(|key| map.get(*key).and_then(serde_json::Value::as_str));
            if let Some(message) = found {
                return message.to_string();
            }
        }
        let text = self.text();
        let text = text.trim();
        if text.is_empty() {
            format!("HTTP {}", self.status)
        } else {
            text.to_string()
        }
    }
}
