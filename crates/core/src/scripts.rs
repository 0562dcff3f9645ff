//! Page-wide registry of injected third-party scripts.
//!
//! A widget script is injected at most once per page and keyed by a fixed
//! element id. Later mounts reuse the existing entry, and nothing removes a
//! script on unmount: it stays resident so the next preview starts faster.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::{debug, info, warn};

/// Load progress of one injected script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptState {
    /// Injected, load event not yet observed.
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub id: String,
    pub src: String,
    pub state: ScriptState,
}

#[derive(Debug, Default)]
pub struct ScriptRegistry {
    tags: Mutex<HashMap<String, ScriptTag>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every widget on the page.
    pub fn global() -> &'static ScriptRegistry {
        static GLOBAL: OnceLock<ScriptRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ScriptRegistry::new)
    }

    /// Looks up the script by id, injecting it if it is not present.
    ///
    /// Returns `Loaded` or `Loading`, never `Failed`: a tag whose previous
    /// load failed is replaced by a fresh one, so reopening a preview tries
    /// again without ever holding two tags for the same id.
    pub fn ensure(&self, id: &str, src: &str) -> ScriptState {
        let mut tags = self.tags.lock().unwrap_or_else(PoisonError::into_inner);
        match tags.get(id) {
            Some(tag) if !matches!(tag.state, ScriptState::Failed(_)) => {
                debug!(script_id = id, state = ?tag.state, "Reusing injected script");
                tag.state.clone()
            }
            _ => {
                info!(script_id = id, src, "Injecting widget script");
                tags.insert(
                    id.to_string(),
                    ScriptTag {
                        id: id.to_string(),
                        src: src.to_string(),
                        state: ScriptState::Loading,
                    },
                );
                ScriptState::Loading
            }
        }
    }

    /// Records the script's load event. Returns `false` if no such script exists.
    pub fn mark_loaded(&self, id: &str) -> bool {
        self.set_state(id, ScriptState::Loaded)
    }

    pub fn mark_failed(&self, id: &str, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        warn!(script_id = id, %reason, "Widget script failed to load");
        self.set_state(id, ScriptState::Failed(reason))
    }

    pub fn state(&self, id: &str) -> Option<ScriptState> {
        self.tag(id).map(|tag| tag.state)
    }

    /// A snapshot of the script tag with the given element id.
    pub fn tag(&self, id: &str) -> Option<ScriptTag> {
        self.tags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Number of script tags currently on the page.
    pub fn len(&self) -> usize {
        self.tags.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set_state(&self, id: &str, state: ScriptState) -> bool {
        let mut tags = self.tags.lock().unwrap_or_else(PoisonError::into_inner);
        match tags.get_mut(id) {
            Some(tag) => {
                tag.state = state;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "test-script";
    const SRC: &str = "https://cdn.example.com/widget.js";

    #[test]
    fn test_first_ensure_injects() {
        let registry = ScriptRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.ensure(ID, SRC), ScriptState::Loading);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let registry = ScriptRegistry::new();
        registry.ensure(ID, SRC);
        registry.ensure(ID, SRC);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.state(ID), Some(ScriptState::Loading));

        assert!(registry.mark_loaded(ID));
        assert_eq!(registry.ensure(ID, SRC), ScriptState::Loaded);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_failed_script_is_replaced_on_next_ensure() {
        let registry = ScriptRegistry::new();
        registry.ensure(ID, SRC);
        registry.mark_failed(ID, "net::ERR_BLOCKED_BY_CLIENT");
        assert_eq!(
            registry.state(ID),
            Some(ScriptState::Failed("net::ERR_BLOCKED_BY_CLIENT".to_string()))
        );

        const RETRY_SRC: &str = "https://mirror.example.com/widget.js";
        assert_eq!(registry.ensure(ID, RETRY_SRC), ScriptState::Loading);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.tag(ID),
            Some(ScriptTag {
                id: ID.to_string(),
                src: RETRY_SRC.to_string(),
                state: ScriptState::Loading,
            })
        );
    }

    #[test]
    fn test_reused_tag_keeps_original_src() {
        let registry = ScriptRegistry::new();
        registry.ensure(ID, SRC);
        registry.ensure(ID, "https://other.example.com/widget.js");
        let tag = registry.tag(ID).unwrap();
        assert_eq!(tag.id, ID);
        assert_eq!(tag.src, SRC);
    }

    #[test]
    fn test_marking_unknown_script() {
        let registry = ScriptRegistry::new();
        assert!(!registry.mark_loaded("missing"));
        assert!(!registry.mark_failed("missing", "boom"));
        assert_eq!(registry.state("missing"), None);
        assert_eq!(registry.tag("missing"), None);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(ScriptRegistry::global(), ScriptRegistry::global()));
    }
}
