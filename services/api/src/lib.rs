//! On the Go API Library Crate
//!
//! This library contains all the logic for the site's web service: the
//! application state, configuration, provider clients, API handlers and
//! routing. The `api` binary is a thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod router;
pub mod state;
