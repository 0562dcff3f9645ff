//! Core library for the On the Go site.
//!
//! Holds everything that is not HTTP serving: the template catalog, the
//! per-browser user identifier, the widget bootstrap state machine with its
//! script registry, the client for the session proxy, and the partner
//! application form.

pub mod identity;
pub mod partner;
pub mod scripts;
pub mod session_client;
pub mod template;
pub mod widget;
