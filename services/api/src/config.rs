use secrecy::SecretString;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_AWAZ_API_BASE: &str = "https://api.awaz.ai/v1";
pub const DEFAULT_REALTIME_MODEL: &str = "gpt-4o-realtime-preview-2024-12-17";
pub const DEFAULT_REALTIME_VOICE: &str = "alloy";
pub const DEFAULT_CALLER_NUMBER: &str = "+18599035211";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
///
/// Provider credentials are optional here. The endpoints that need them
/// answer with a configuration error per request instead of refusing to boot.
#[derive(Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub openai_api_key: Option<SecretString>,
    pub openai_workflow_id: Option<String>,
    pub openai_api_base: String,
    pub realtime_model: String,
    pub realtime_voice: String,
    pub awaz_api_key: Option<SecretString>,
    pub awaz_agent_id: Option<String>,
    pub awaz_api_base: String,
    pub awaz_caller_number: String,
    pub partner_form_url: String,
    pub upstream_timeout: Duration,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    non_empty_var(name).unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let timeout_str = var_or("UPSTREAM_TIMEOUT_SECS", "30");
        let upstream_timeout = match timeout_str.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                return Err(ConfigError::InvalidValue(
                    "UPSTREAM_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", timeout_str),
                ));
            }
        };

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key: non_empty_var("OPENAI_API_KEY").map(SecretString::from),
            openai_workflow_id: non_empty_var("OPENAI_WORKFLOW_ID"),
            openai_api_base: var_or("OPENAI_API_BASE", DEFAULT_OPENAI_API_BASE),
            realtime_model: var_or("REALTIME_MODEL", DEFAULT_REALTIME_MODEL),
            realtime_voice: var_or("REALTIME_VOICE", DEFAULT_REALTIME_VOICE),
            awaz_api_key: non_empty_var("AWAZ_API_KEY").map(SecretString::from),
            awaz_agent_id: non_empty_var("AWAZ_AGENT_ID"),
            awaz_api_base: var_or("AWAZ_API_BASE", DEFAULT_AWAZ_API_BASE),
            awaz_caller_number: var_or("AWAZ_CALLER_NUMBER", DEFAULT_CALLER_NUMBER),
            partner_form_url: var_or(
                "PARTNER_FORM_URL",
                onthego_core::partner::DEFAULT_FORM_ACTION_URL,
            ),
            upstream_timeout,
        })
    }

    /// The chat provider credentials, or the first one that is missing.
    pub fn chatkit_credentials(&self) -> Result<(&SecretString, &str), ConfigError> {
        let api_key = self
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
        let workflow_id = self
            .openai_workflow_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_WORKFLOW_ID".to_string()))?;
        Ok((api_key, workflow_id))
    }

    /// The outbound calling credentials, or the first one that is missing.
    pub fn awaz_credentials(&self) -> Result<(&SecretString, &str), ConfigError> {
        let api_key = self
            .awaz_api_key
            .as_ref()
            .ok_or_else(|| ConfigError::MissingVar("AWAZ_API_KEY".to_string()))?;
        let agent_id = self
            .awaz_agent_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("AWAZ_AGENT_ID".to_string()))?;
        Ok((api_key, agent_id))
    }
}
