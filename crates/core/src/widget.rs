//! Widget Bootstrap
//!
//! When a template preview opens, exactly one demo surface is mounted: the
//! voice widget, the chat widget, or a static placeholder. `WidgetBootstrap`
//! owns that choice and drives the widget through its lifecycle:
//!
//! ```text
//! unmounted -> script-loading -> initializing -> ready
//!                     \________________\_________-> error
//! ready | error -> unmounted (on close)
//! ```
//!
//! Errors are terminal for the mount. Nothing is retried until the preview is
//! closed and opened again.

use crate::scripts::{ScriptRegistry, ScriptState};
use crate::session_client::{ClientSecretSource, TokenError};
use crate::template::TemplateDescriptor;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Title of the template that mounts the voice widget.
pub const VOICE_TEMPLATE_TITLE: &str = "Restaurant Reservation Bot";
/// Title of the template that mounts the chat widget.
pub const CHAT_TEMPLATE_TITLE: &str = "Retail & E-commerce Bot";

pub const VOICE_WIDGET_SCRIPT_ID: &str = "vapi-widget-script";
pub const VOICE_WIDGET_SCRIPT_SRC: &str =
    "https://unpkg.com/@vapi-ai/client-sdk-react/dist/embed/widget.umd.js";

// Client-visible embed credentials, not secrets.
pub const VOICE_ASSISTANT_ID: &str = "c72f770b-2c30-4021-a81e-6a4f85f176e9";
pub const VOICE_PUBLIC_KEY: &str = "992bd5fb-c74c-4955-9371-4ae0b3aec062";

pub const PLACEHOLDER_MESSAGE: &str = "Text-only chat widget coming soon.";

/// Which demo surface a preview mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Voice,
    Chat,
    Placeholder,
}

impl WidgetKind {
    pub fn for_title(title: &str) -> Self {
        match title {
            VOICE_TEMPLATE_TITLE => WidgetKind::Voice,
            CHAT_TEMPLATE_TITLE => WidgetKind::Chat,
            _ => WidgetKind::Placeholder,
        }
    }
}

/// Lifecycle of one mounted preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Unmounted,
    ScriptLoading,
    Initializing,
    Ready,
    Error(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("widget script '{id}' failed to load: {reason}")]
    ScriptLoad { id: String, reason: String },
    #[error("voice widget failed to start: {0}")]
    Voice(String),
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// The voice vendor SDK.
#[cfg_attr(test, mockall::automock)]
pub trait VoiceClient: Send + Sync {
    /// Creates an SDK instance for `public_key` and starts a call with the assistant.
    fn start(&self, public_key: &str, assistant_id: &str) -> anyhow::Result<()>;
    /// Ends the active call, if any.
    fn stop(&self);
}

/// The `<vapi-widget>` custom element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceEmbed {
    pub assistant_id: &'static str,
    pub public_key: &'static str,
}

impl Default for VoiceEmbed {
    fn default() -> Self {
        Self {
            assistant_id: VOICE_ASSISTANT_ID,
            public_key: VOICE_PUBLIC_KEY,
        }
    }
}

impl VoiceEmbed {
    pub fn to_html(&self) -> String {
        format!(
            r#"<vapi-widget assistant-id="{}" public-key="{}"></vapi-widget>"#,
            self.assistant_id, self.public_key
        )
    }
}

/// Control handle for a ready chat widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatControl {
    pub client_secret: String,
}

/// What the preview panel shows in place of the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Surface {
    Hidden,
    Loading(&'static str),
    Error(String),
    Voice(VoiceEmbed),
    Chat(ChatControl),
    Placeholder(&'static str),
}

/// Mounts and tears down the demo widget of one template preview.
pub struct WidgetBootstrap {
    scripts: Arc<ScriptRegistry>,
    voice: Arc<dyn VoiceClient>,
    secrets: Arc<dyn ClientSecretSource>,
    kind: Option<WidgetKind>,
    state: LifecycleState,
    chat: Option<ChatControl>,
    call_active: bool,
}

impl WidgetBootstrap {
    pub fn new(
        scripts: Arc<ScriptRegistry>,
        voice: Arc<dyn VoiceClient>,
        secrets: Arc<dyn ClientSecretSource>,
    ) -> Self {
        Self {
            scripts,
            voice,
            secrets,
            kind: None,
            state: LifecycleState::Unmounted,
            chat: None,
            call_active: false,
        }
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn kind(&self) -> Option<WidgetKind> {
        self.kind
    }

    /// Opens the preview for `template`, closing any widget already mounted.
    pub async fn open(&mut self, template: &TemplateDescriptor) -> &LifecycleState {
        if self.state != LifecycleState::Unmounted {
            self.close();
        }

        let kind = template.widget_kind();
        info!(template = template.title, ?kind, "Opening template preview");
        self.kind = Some(kind);

        match kind {
            WidgetKind::Placeholder => self.state = LifecycleState::Ready,
            WidgetKind::Voice => {
                let script = self
                    .scripts
                    .ensure(VOICE_WIDGET_SCRIPT_ID, VOICE_WIDGET_SCRIPT_SRC);
                if script == ScriptState::Loaded {
                    self.start_voice();
                } else {
                    self.state = LifecycleState::ScriptLoading;
                }
            }
            WidgetKind::Chat => {
                self.state = LifecycleState::Initializing;
                self.fetch_chat_token().await;
            }
        }
        &self.state
    }

    /// Delivers the voice script's load event.
    pub fn on_script_loaded(&mut self) {
        self.scripts.mark_loaded(VOICE_WIDGET_SCRIPT_ID);
        if self.state == LifecycleState::ScriptLoading {
            self.start_voice();
        }
    }

    /// Delivers the voice script's error event.
    pub fn on_script_error(&mut self, reason: &str) {
        self.scripts.mark_failed(VOICE_WIDGET_SCRIPT_ID, reason);
        if self.state == LifecycleState::ScriptLoading {
            self.fail(WidgetError::ScriptLoad {
                id: VOICE_WIDGET_SCRIPT_ID.to_string(),
                reason: reason.to_string(),
            });
        }
    }

    /// Asks for a fresh client secret on behalf of a ready chat widget.
    pub async fn refresh_chat_token(&mut self) -> &LifecycleState {
        if self.kind == Some(WidgetKind::Chat) && self.state == LifecycleState::Ready {
            self.fetch_chat_token().await;
        }
        &self.state
    }

    /// Tears the widget down. The injected script is left in place.
    pub fn close(&mut self) {
        if self.call_active {
            self.voice.stop();
            self.call_active = false;
        }
        if self.kind.is_some() {
            info!(kind = ?self.kind, "Closing template preview");
        }
        self.chat = None;
        self.kind = None;
        self.state = LifecycleState::Unmounted;
    }

    pub fn surface(&self) -> Surface {
        match (&self.state, self.kind) {
            (LifecycleState::Unmounted, _) | (_, None) => Surface::Hidden,
            (LifecycleState::Error(message), _) => Surface::Error(message.clone()),
            (LifecycleState::ScriptLoading, _) => Surface::Loading("Loading voice widget..."),
            (LifecycleState::Initializing, Some(WidgetKind::Chat)) => {
                Surface::Loading("Initializing ChatKit...")
            }
            (LifecycleState::Initializing, _) => Surface::Loading("Starting voice call..."),
            (LifecycleState::Ready, Some(WidgetKind::Voice)) => {
                Surface::Voice(VoiceEmbed::default())
            }
            (LifecycleState::Ready, Some(WidgetKind::Chat)) => match &self.chat {
                Some(control) => Surface::Chat(control.clone()),
                None => Surface::Loading("Initializing ChatKit..."),
            },
            (LifecycleState::Ready, Some(WidgetKind::Placeholder)) => {
                Surface::Placeholder(PLACEHOLDER_MESSAGE)
            }
        }
    }

    fn start_voice(&mut self) {
        self.state = LifecycleState::Initializing;
        match self.voice.start(VOICE_PUBLIC_KEY, VOICE_ASSISTANT_ID) {
            Ok(()) => {
                self.call_active = true;
                self.state = LifecycleState::Ready;
            }
            Err(e) => self.fail(WidgetError::Voice(e.to_string())),
        }
    }

    async fn fetch_chat_token(&mut self) {
        match self.secrets.client_secret().await {
            Ok(client_secret) => {
                self.chat = Some(ChatControl { client_secret });
                self.state = LifecycleState::Ready;
            }
            Err(e) => self.fail(e.into()),
        }
    }

    fn fail(&mut self, err: WidgetError) {
        error!(kind = ?self.kind, error = %err, "Widget failed");
        if self.call_active {
            warn!("Stopping voice call after widget failure");
            self.voice.stop();
            self.call_active = false;
        }
        self.chat = None;
        self.state = LifecycleState::Error(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_client::MockClientSecretSource;
    use crate::template::find_by_title;
    use anyhow::anyhow;

    fn voice_ok() -> MockVoiceClient {
        let mut voice = MockVoiceClient::new();
        voice
            .expect_start()
            .withf(|key, assistant| {
                key.to_string() == VOICE_PUBLIC_KEY && assistant.to_string() == VOICE_ASSISTANT_ID
            })
            .returning(|_, _| Ok(()));
        voice.expect_stop().returning(|| ());
        voice
    }

    fn no_secrets() -> MockClientSecretSource {
        let mut secrets = MockClientSecretSource::new();
        secrets.expect_client_secret().never();
        secrets
    }

    fn bootstrap(
        scripts: Arc<ScriptRegistry>,
        voice: MockVoiceClient,
        secrets: MockClientSecretSource,
    ) -> WidgetBootstrap {
        WidgetBootstrap::new(scripts, Arc::new(voice), Arc::new(secrets))
    }

    #[test]
    fn test_widget_kind_selection() {
        assert_eq!(WidgetKind::for_title("Restaurant Reservation Bot"), WidgetKind::Voice);
        assert_eq!(WidgetKind::for_title("Retail & E-commerce Bot"), WidgetKind::Chat);
        assert_eq!(WidgetKind::for_title("Retail Store Assistant"), WidgetKind::Placeholder);
        assert_eq!(WidgetKind::for_title("restaurant reservation bot"), WidgetKind::Placeholder);
    }

    #[test]
    fn test_voice_embed_html() {
        assert_eq!(
            VoiceEmbed::default().to_html(),
            r#"<vapi-widget assistant-id="c72f770b-2c30-4021-a81e-6a4f85f176e9" public-key="992bd5fb-c74c-4955-9371-4ae0b3aec062"></vapi-widget>"#
        );
    }

    #[tokio::test]
    async fn test_placeholder_never_requests_a_token() {
        let mut voice = MockVoiceClient::new();
        voice.expect_start().never();
        let scripts = Arc::new(ScriptRegistry::new());
        let mut widget = bootstrap(scripts.clone(), voice, no_secrets());

        let template = find_by_title("SaaS Support Bot").unwrap();
        assert_eq!(widget.open(template).await, &LifecycleState::Ready);
        assert_eq!(widget.surface(), Surface::Placeholder(PLACEHOLDER_MESSAGE));
        assert!(scripts.is_empty());
    }

    #[tokio::test]
    async fn test_voice_waits_for_script_then_starts() {
        let scripts = Arc::new(ScriptRegistry::new());
        let mut widget = bootstrap(scripts.clone(), voice_ok(), no_secrets());
        let template = find_by_title(VOICE_TEMPLATE_TITLE).unwrap();

        assert_eq!(widget.open(template).await, &LifecycleState::ScriptLoading);
        assert!(matches!(widget.surface(), Surface::Loading(_)));

        widget.on_script_loaded();
        assert_eq!(widget.state(), &LifecycleState::Ready);
        assert_eq!(widget.surface(), Surface::Voice(VoiceEmbed::default()));
        assert_eq!(scripts.state(VOICE_WIDGET_SCRIPT_ID), Some(ScriptState::Loaded));
    }

    #[tokio::test]
    async fn test_reopening_voice_preview_keeps_one_script() {
        let scripts = Arc::new(ScriptRegistry::new());
        let mut voice = MockVoiceClient::new();
        voice.expect_start().times(3).returning(|_, _| Ok(()));
        voice.expect_stop().times(3).returning(|| ());
        let mut widget = bootstrap(scripts.clone(), voice, no_secrets());
        let template = find_by_title(VOICE_TEMPLATE_TITLE).unwrap();

        widget.open(template).await;
        widget.on_script_loaded();
        widget.close();
        assert_eq!(widget.state(), &LifecycleState::Unmounted);

        for _ in 0..2 {
            // Script already loaded: straight to ready without a load event.
            assert_eq!(widget.open(template).await, &LifecycleState::Ready);
            widget.close();
        }

        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts.state(VOICE_WIDGET_SCRIPT_ID), Some(ScriptState::Loaded));
    }

    #[tokio::test]
    async fn test_script_error_is_terminal() {
        let mut voice = MockVoiceClient::new();
        voice.expect_start().never();
        let scripts = Arc::new(ScriptRegistry::new());
        let mut widget = bootstrap(scripts, voice, no_secrets());

        widget.open(find_by_title(VOICE_TEMPLATE_TITLE).unwrap()).await;
        widget.on_script_error("blocked");

        match widget.surface() {
            Surface::Error(message) => assert!(message.contains("blocked")),
            other => panic!("expected error surface, got {other:?}"),
        }
        // A late load event does not revive the failed mount.
        widget.on_script_loaded();
        assert!(matches!(widget.state(), LifecycleState::Error(_)));
    }

    #[tokio::test]
    async fn test_reopening_after_script_error_reinjects() {
        let mut voice = MockVoiceClient::new();
        voice.expect_start().times(1).returning(|_, _| Ok(()));
        voice.expect_stop().returning(|| ());
        let scripts = Arc::new(ScriptRegistry::new());
        let mut widget = bootstrap(scripts.clone(), voice, no_secrets());
        let template = find_by_title(VOICE_TEMPLATE_TITLE).unwrap();

        widget.open(template).await;
        widget.on_script_error("blocked");
        widget.close();

        assert_eq!(widget.open(template).await, &LifecycleState::ScriptLoading);
        assert_eq!(scripts.len(), 1);
        widget.on_script_loaded();
        assert_eq!(widget.state(), &LifecycleState::Ready);
    }

    #[tokio::test]
    async fn test_voice_sdk_failure() {
        let mut voice = MockVoiceClient::new();
        voice
            .expect_start()
            .returning(|_, _| Err(anyhow!("microphone permission denied")));
        voice.expect_stop().never();
        let scripts = Arc::new(ScriptRegistry::new());
        scripts.ensure(VOICE_WIDGET_SCRIPT_ID, VOICE_WIDGET_SCRIPT_SRC);
        scripts.mark_loaded(VOICE_WIDGET_SCRIPT_ID);
        let mut widget = bootstrap(scripts, voice, no_secrets());

        let state = widget.open(find_by_title(VOICE_TEMPLATE_TITLE).unwrap()).await;
        assert_eq!(
            state,
            &LifecycleState::Error(
                "voice widget failed to start: microphone permission denied".to_string()
            )
        );
        widget.close();
    }

    #[tokio::test]
    async fn test_chat_ready_with_token() {
        let mut secrets = MockClientSecretSource::new();
        secrets
            .expect_client_secret()
            .times(1)
            .returning(|| Ok("cs_live".to_string()));
        let mut widget = bootstrap(
            Arc::new(ScriptRegistry::new()),
            MockVoiceClient::new(),
            secrets,
        );

        let state = widget.open(find_by_title(CHAT_TEMPLATE_TITLE).unwrap()).await;
        assert_eq!(state, &LifecycleState::Ready);
        assert_eq!(
            widget.surface(),
            Surface::Chat(ChatControl {
                client_secret: "cs_live".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_chat_token_failure_surfaces_error() {
        let mut secrets = MockClientSecretSource::new();
        secrets
            .expect_client_secret()
            .times(1)
            .returning(|| Err(TokenError::Status(500)));
        let mut widget = bootstrap(
            Arc::new(ScriptRegistry::new()),
            MockVoiceClient::new(),
            secrets,
        );

        widget.open(find_by_title(CHAT_TEMPLATE_TITLE).unwrap()).await;
        assert_eq!(
            widget.surface(),
            Surface::Error("Failed to get client secret: 500".to_string())
        );

        // No retry happens on its own.
        widget.refresh_chat_token().await;
        assert!(matches!(widget.state(), LifecycleState::Error(_)));
    }

    #[tokio::test]
    async fn test_refresh_requests_new_token() {
        let mut secrets = MockClientSecretSource::new();
        let mut seq = mockall::Sequence::new();
        secrets
            .expect_client_secret()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok("first".to_string()));
        secrets
            .expect_client_secret()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok("second".to_string()));
        let mut widget = bootstrap(
            Arc::new(ScriptRegistry::new()),
            MockVoiceClient::new(),
            secrets,
        );

        widget.open(find_by_title(CHAT_TEMPLATE_TITLE).unwrap()).await;
        widget.refresh_chat_token().await;
        assert_eq!(
            widget.surface(),
            Surface::Chat(ChatControl {
                client_secret: "second".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_switching_templates_stops_voice_call() {
        let scripts = Arc::new(ScriptRegistry::new());
        let mut voice = MockVoiceClient::new();
        voice.expect_start().times(1).returning(|_, _| Ok(()));
        voice.expect_stop().times(1).returning(|| ());
        let mut widget = bootstrap(scripts, voice, no_secrets());

        widget.open(find_by_title(VOICE_TEMPLATE_TITLE).unwrap()).await;
        widget.on_script_loaded();
        assert_eq!(widget.kind(), Some(WidgetKind::Voice));

        widget.open(find_by_title("Real Estate Agent Bot").unwrap()).await;
        assert_eq!(widget.kind(), Some(WidgetKind::Placeholder));
        assert_eq!(widget.surface(), Surface::Placeholder(PLACEHOLDER_MESSAGE));
    }

    #[test]
    fn test_closed_widget_is_hidden() {
        let widget = bootstrap(
            Arc::new(ScriptRegistry::new()),
            MockVoiceClient::new(),
            MockClientSecretSource::new(),
        );
        assert_eq!(widget.state(), &LifecycleState::Unmounted);
        assert_eq!(widget.surface(), Surface::Hidden);
    }
}
