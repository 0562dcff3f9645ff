//! Browser-scoped user identifier.
//!
//! Each browser gets one opaque identifier, created the first time a chat
//! widget needs a session and reused on every later visit. It is only a
//! correlation hint for the upstream provider; nothing validates it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// The local-storage key the identifier is persisted under.
pub const USER_ID_STORAGE_KEY: &str = "chatkit_user_id";

const USER_ID_PREFIX: &str = "user_";
const USER_ID_RANDOM_LEN: usize = 13;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A string key/value store with the semantics of browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

/// An in-process `KeyValueStore`, used by native clients and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }
}

/// An opaque per-browser identifier such as `user_k3j9x0a1b2c3d`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Generates a fresh identifier from 13 random base-36 characters.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..USER_ID_RANDOM_LEN)
            .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
            .collect();
        Self(format!("{USER_ID_PREFIX}{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns the stored identifier, creating and persisting one if absent.
pub fn get_or_create_user_id(store: &dyn KeyValueStore) -> UserId {
    match store.get(USER_ID_STORAGE_KEY) {
        Some(existing) if !existing.is_empty() => {
            debug!(user_id = %existing, "Reusing existing user id");
            UserId(existing)
        }
        _ => {
            let user_id = UserId::generate();
            store.set(USER_ID_STORAGE_KEY, user_id.0.clone());
            debug!(user_id = %user_id, "Generated new user id");
            user_id
        }
    }
}
