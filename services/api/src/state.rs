//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources like the configuration and the outbound HTTP client.

use crate::config::Config;
use onthego_core::partner::GoogleFormClient;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub forms: Arc<GoogleFormClient>,
}

impl AppState {
    /// Builds the state, sharing one connection pool between all providers.
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        let forms = Arc::new(GoogleFormClient::new(
            http.clone(),
            config.partner_form_url.clone(),
        ));
        Ok(Self {
            config: Arc::new(config),
            http,
            forms,
        })
    }
}
