//! Outbound calls to third-party conversational-AI providers.
//!
//! Every provider call is a single authenticated JSON POST. Success bodies
//! are returned as JSON; non-success responses keep their status and a
//! best-effort parse of the body so handlers can pass both through.

pub mod awaz;
pub mod openai;

use axum::http::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("provider responded with status {status}")]
    Status { status: StatusCode, details: Value },
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("provider response did not contain '{0}'")]
    MissingField(&'static str),
}

impl UpstreamError {
    /// A short name for the failure class, reported to callers as `type`.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Status { .. } => "UpstreamStatus",
            UpstreamError::Transport(e) if e.is_timeout() => "Timeout",
            UpstreamError::Transport(_) => "NetworkError",
            UpstreamError::Decode(_) => "DecodeError",
            UpstreamError::MissingField(_) => "MissingField",
        }
    }
}

/// Parses an error body as JSON, wrapping non-JSON text as `{"message": text}`.
pub fn parse_error_details(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "message": text }))
}

pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Sends one bearer-authenticated JSON POST and returns the decoded body.
pub(crate) async fn post_json<B: Serialize + ?Sized>(
    http: &reqwest::Client,
    url: &str,
    api_key: &SecretString,
    headers: &[(&str, &str)],
    body: &B,
) -> Result<Value, UpstreamError> {
    let mut request = http
        .post(url)
        .bearer_auth(api_key.expose_secret())
        .json(body);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = request.send().await?;
    let status = response.status();
    debug!(url, status = status.as_u16(), "Provider responded");

    let text = response.text().await?;
    if !status.is_success() {
        warn!(url, status = status.as_u16(), body = %text, "Provider returned an error");
        return Err(UpstreamError::Status {
            status,
            details: parse_error_details(&text),
        });
    }
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_details_are_kept() {
        let details =
            parse_error_details(r#"{"error":{"message":"Rate limit","type":"rate_limit"}}"#);
        assert_eq!(details["error"]["type"], "rate_limit");
    }

    #[test]
    fn test_text_error_details_are_wrapped() {
        assert_eq!(
            parse_error_details("Bad Gateway"),
            json!({ "message": "Bad Gateway" })
        );
        assert_eq!(parse_error_details(""), json!({ "message": "" }));
    }

    #[test]
    fn test_endpoint_joining() {
        assert_eq!(
            endpoint("https://api.openai.com/v1/", "/chatkit/sessions"),
            "https://api.openai.com/v1/chatkit/sessions"
        );
        assert_eq!(endpoint("http://127.0.0.1:1234", "calls"), "http://127.0.0.1:1234/calls");
    }

    #[test]
    fn test_error_kinds() {
        let status = UpstreamError::Status {
            status: StatusCode::TOO_MANY_REQUESTS,
            details: json!({}),
        };
        assert_eq!(status.kind(), "UpstreamStatus");
        assert_eq!(UpstreamError::MissingField("client_secret").kind(), "MissingField");
        let decode = serde_json::from_str::<Value>("nope").unwrap_err();
        assert_eq!(UpstreamError::from(decode).kind(), "DecodeError");
    }
}
