use std::time::Duration;

use thiserror::Error;

/// Boxed error returned by status and stream observers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// All errors that can occur when using the Twelve Labs client.
#[derive(Error, Debug)]
pub enum TwelveLabsError {
    /// The request was rejected as malformed (HTTP 400).
    #[error("bad request (400): {message}")]
    BadRequest { message: String },

    /// The API key is missing or invalid (HTTP 401).
    #[error("unauthorized (401): {message}")]
    Unauthorized { message: String },

    /// The requested resource was not found (HTTP 404).
    #[error("not found (404): {message}")]
    NotFound { message: String },

    /// The request was rate-limited (HTTP 429).
    #[error("too many requests (429): {message}")]
    TooManyRequests { message: String },

    /// The service failed to handle the request (HTTP 500).
    #[error("internal server error (500): {message}")]
    InternalServerError { message: String },

    /// Any other non-2xx response, with the status code and parsed body if it was JSON.
    #[error("API error {status_code}: {message}")]
    Api {
        status_code: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    /// Caller input was rejected before any request was sent.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The client could not be constructed from the given settings.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A transport-level HTTP error from reqwest.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// An I/O error, typically from reading a local file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A successful response body could not be decoded.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a live streaming response failed.
    #[error("stream read failed: {0}")]
    Stream(#[source] std::io::Error),

    /// Polling for a terminal status exceeded the configured timeout.
    #[error("poll timed out after {0:?}")]
    Timeout(Duration),

    /// The operation was cancelled through its cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// An observer callback returned an error and stopped the operation.
    #[error("callback aborted: {0}")]
    Callback(#[source] BoxError),

    /// A task reached a terminal status other than `ready`.
    #[error("task {id} finished with status {status}")]
    TaskFailed { id: String, status: String },
}

impl TwelveLabsError {
    /// HTTP status code for errors produced from an API response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::Unauthorized { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::TooManyRequests { .. } => Some(429),
            Self::InternalServerError { .. } => Some(500),
            Self::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// `true` for failures that may succeed if the same request is sent again:
    /// network errors, rate limiting, and 5xx responses.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::TooManyRequests { .. } | Self::InternalServerError { .. } => {
                true
            }
            Self::Api { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

/// A convenience alias for `Result<T, TwelveLabsError>`.
pub type Result<T> = std::result::Result<T, TwelveLabsError>;

/// Map a non-2xx status code and its response body to exactly one error variant.
///
/// The message comes from the body's `message` field. When the body is not JSON
/// or carries no message, a description of the status line is used instead.
pub fn classify(status_code: u16, body: &str) -> TwelveLabsError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();

    let message = parsed
        .as_ref()
        .and_then(|b| b.get("message"))
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| status_description(status_code));

    match status_code {
        400 => TwelveLabsError::BadRequest { message },
        401 => TwelveLabsError::Unauthorized { message },
        404 => TwelveLabsError::NotFound { message },
        429 => TwelveLabsError::TooManyRequests { message },
        500 => TwelveLabsError::InternalServerError { message },
        _ => TwelveLabsError::Api {
            status_code,
            message,
            body: parsed,
        },
    }
}

fn status_description(status_code: u16) -> String {
    let reason = reqwest::StatusCode::from_u16(status_code)
        .ok()
        .and_then(|s| s.canonical_reason());

    match reason {
        Some(reason) => format!("HTTP {status_code} {reason}"),
        None => format!("HTTP {status_code}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_taken_from_body() {
        let err = classify(429, r#"{"message":"slow down"}"#);
        match err {
            TwelveLabsError::TooManyRequests { message } => assert_eq!(message, "slow down"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn mapped_codes_produce_their_variant() {
        assert!(matches!(classify(400, "{}"), TwelveLabsError::BadRequest { .. }));
        assert!(matches!(classify(401, "{}"), TwelveLabsError::Unauthorized { .. }));
        assert!(matches!(classify(404, "{}"), TwelveLabsError::NotFound { .. }));
        assert!(matches!(classify(429, "{}"), TwelveLabsError::TooManyRequests { .. }));
        assert!(matches!(
            classify(500, "{}"),
            TwelveLabsError::InternalServerError { .. }
        ));
    }

    #[test]
    fn unmapped_code_falls_back_to_status_line() {
        match classify(599, "<html>gateway</html>") {
            TwelveLabsError::Api {
                status_code,
                message,
                body,
            } => {
                assert_eq!(status_code, 599);
                assert_eq!(message, "HTTP 599");
                assert!(body.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn known_reason_is_used_when_body_has_no_message() {
        match classify(403, r#"{"code":"forbidden"}"#) {
            TwelveLabsError::Api { message, body, .. } => {
                assert_eq!(message, "HTTP 403 Forbidden");
                assert_eq!(body.unwrap()["code"], "forbidden");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        match classify(404, "not json") {
            TwelveLabsError::NotFound { message } => assert_eq!(message, "HTTP 404 Not Found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn transient_classification() {
        assert!(classify(429, "").is_transient());
        assert!(classify(500, "").is_transient());
        assert!(classify(503, "").is_transient());
        assert!(!classify(401, "").is_transient());
        assert!(!TwelveLabsError::Cancelled.is_transient());
        assert_eq!(classify(503, "").status_code(), Some(503));
        assert_eq!(TwelveLabsError::Timeout(Duration::ZERO).status_code(), None);
    }
}
