//! OpenAI session issuance: ChatKit chat sessions and realtime voice sessions.

use super::{UpstreamError, endpoint, post_json};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

const CHATKIT_BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "chatkit_beta=v1");

#[derive(Serialize)]
struct IdRef<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct ChatKitSessionRequest<'a> {
    workflow: IdRef<'a>,
    user: IdRef<'a>,
}

#[derive(Serialize)]
struct RealtimeSessionRequest<'a> {
    model: &'a str,
    voice: &'a str,
}

/// Client for the OpenAI session endpoints.
pub struct OpenAiSessions<'a> {
    pub http: &'a reqwest::Client,
    pub api_base: &'a str,
    pub api_key: &'a SecretString,
}

impl OpenAiSessions<'_> {
    /// Creates a ChatKit session for `user_id` and returns its client secret.
    pub async fn create_chatkit_session(
        &self,
        workflow_id: &str,
        user_id: &str,
    ) -> Result<String, UpstreamError> {
        let body = ChatKitSessionRequest {
            workflow: IdRef { id: workflow_id },
            user: IdRef { id: user_id },
        };
        info!(workflow_id, "Creating ChatKit session");
        let data = post_json(
            self.http,
            &endpoint(self.api_base, "chatkit/sessions"),
            self.api_key,
            &[CHATKIT_BETA_HEADER],
            &body,
        )
        .await?;
        extract_secret(&data["client_secret"])
    }

    /// Creates a realtime voice session and returns its ephemeral client secret.
    pub async fn create_realtime_session(
        &self,
        model: &str,
        voice: &str,
    ) -> Result<String, UpstreamError> {
        info!(model, voice, "Creating realtime session");
        let data = post_json(
            self.http,
            &endpoint(self.api_base, "realtime/sessions"),
            self.api_key,
            &[],
            &RealtimeSessionRequest { model, voice },
        )
        .await?;
        extract_secret(&data["client_secret"]["value"])
    }
}

fn extract_secret(value: &Value) -> Result<String, UpstreamError> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(UpstreamError::MissingField("client_secret"))
}
