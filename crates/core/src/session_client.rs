//! Client side of the chat session handshake.
//!
//! The chat SDK asks for a client secret whenever it needs a fresh session.
//! `SessionTokenClient` answers by resolving the browser's user id and
//! calling the session proxy endpoint, which talks to the provider.

use crate::identity::{KeyValueStore, get_or_create_user_id};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Path of the session proxy endpoint, relative to the site origin.
pub const SESSION_ENDPOINT_PATH: &str = "/api/chatkit/session";

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to get client secret: {0}")]
    Status(u16),
    #[error("session request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("session response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("session response did not contain a client secret")]
    MissingSecret,
}

/// Supplies session tokens to a chat widget.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientSecretSource: Send + Sync {
    /// Obtains a new client secret. Every call creates a new upstream session.
    async fn client_secret(&self) -> Result<String, TokenError>;
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
}

#[derive(Deserialize)]
struct SessionResponse {
    client_secret: Option<String>,
}

/// Calls the session proxy endpoint of a deployed site.
pub struct SessionTokenClient {
    http: reqwest::Client,
    endpoint: String,
    store: Arc<dyn KeyValueStore>,
}

impl SessionTokenClient {
    /// Creates a client for the site at `origin`, e.g. `https://example.com`.
    pub fn new(origin: &str, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_client(reqwest::Client::new(), origin, store)
    }

    pub fn with_client(
        http: reqwest::Client,
        origin: &str,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", origin.trim_end_matches('/'), SESSION_ENDPOINT_PATH),
            store,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ClientSecretSource for SessionTokenClient {
    async fn client_secret(&self) -> Result<String, TokenError> {
        let user_id = get_or_create_user_id(self.store.as_ref());
        debug!(endpoint = %self.endpoint, %user_id, "Requesting client secret");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&SessionRequest {
                user_id: user_id.as_str(),
            })
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(status = status.as_u16(), body = %text, "Failed to get client secret");
            return Err(TokenError::Status(status.as_u16()));
        }

        let parsed: SessionResponse = serde_json::from_str(&text)?;
        let secret = parsed
            .client_secret
            .filter(|s| !s.is_empty())
            .ok_or(TokenError::MissingSecret)?;
        info!(secret_len = secret.len(), "Client secret received");
        Ok(secret)
    }
}
