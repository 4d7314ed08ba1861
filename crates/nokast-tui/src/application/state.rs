//! Application state (Model in Elm architecture)
//!
//! Every field is written only by the update function. Views and services get
//! read-only access.

use std::time::Instant;

use chrono::{Duration, Utc};
use nokast_common::models::DEFAULT_MODEL;
use nokast_common::types::*;

use crate::components::{
    DashboardState, HelperState, ModelsState, Overlay, SettingsState, StatusMessage,
};
use crate::message::{Screen, SessionId, StatusSeverity};

/// How long a status-line message stays up.
const STATUS_MESSAGE_TTL_SECS: i64 = 6;

#[derive(Debug, Clone)]
pub struct AppModel {
    /// Currently displayed screen
    pub screen: Screen,

    /// Session of the running status poller; messages from any other session
    /// are ignored
    pub sync_session: Option<SessionId>,

    /// Transport outcome of the most recent poll, `None` before the first one
    pub backend_online: Option<bool>,

    /// Gmail credentials and token are both present on the backend
    pub gmail_connected: bool,
    pub secrets: Option<SecretsStatus>,

    /// Newsletters the next generation runs over
    pub newsletters: Vec<Newsletter>,
    pub newsletters_dirty: bool,
    pub keywords: Vec<PriorityKeyword>,
    pub keywords_dirty: bool,

    pub stories: Vec<Story>,
    pub pipeline: Option<PipelineStatus>,
    pub runtime: Option<RuntimeStatus>,
    pub model_loaded: bool,

    /// A generation was requested and has not yet been seen to complete
    pub generating: bool,
    /// Pipeline polls issued before this instant cannot finish the current
    /// generation. Moves to the backend's reply once it arrives.
    pub generation_since: Option<Instant>,

    pub preferences: SummaryPreferences,
    pub preferences_dirty: bool,
    pub pipeline_config: PipelineConfig,
    pub pipeline_dirty: bool,

    pub whatsapp: Option<WhatsAppStatus>,
    /// Session of the WhatsApp watcher while Settings is open
    pub whatsapp_watch: Option<SessionId>,

    pub dashboard: DashboardState,
    pub models: ModelsState,
    pub settings: SettingsState,
    pub helper: HelperState,

    /// Modal stack; the last entry has focus
    pub overlays: Vec<Overlay>,
    pub status_message: Option<StatusMessage>,
    pub animation_frame: usize,
    pub should_quit: bool,
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            screen: Screen::Home,
            sync_session: None,
            backend_online: None,
            gmail_connected: false,
            secrets: None,
            newsletters: Vec::new(),
            newsletters_dirty: false,
            keywords: Vec::new(),
            keywords_dirty: false,
            stories: Vec::new(),
            pipeline: None,
            runtime: None,
            model_loaded: false,
            generating: false,
            generation_since: None,
            preferences: SummaryPreferences::default(),
            preferences_dirty: false,
            pipeline_config: PipelineConfig::default(),
            pipeline_dirty: false,
            whatsapp: None,
            whatsapp_watch: None,
            dashboard: DashboardState::default(),
            models: ModelsState::default(),
            settings: SettingsState::default(),
            helper: HelperState::default(),
            overlays: Vec::new(),
            status_message: None,
            animation_frame: 0,
            should_quit: false,
        }
    }

    pub fn set_status_message(&mut self, severity: StatusSeverity, message: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            severity,
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    pub fn push_overlay(&mut self, overlay: Overlay) {
        self.overlays.push(overlay);
    }

    pub fn has_overlay(&self) -> bool {
        !self.overlays.is_empty()
    }

    pub fn toggle_help(&mut self) {
        if matches!(self.overlays.last(), Some(Overlay::Help)) {
            self.overlays.pop();
        } else {
            self.overlays.push(Overlay::Help);
        }
    }

    /// Model the pipeline is configured to use.
    pub fn configured_model(&self) -> &str {
        self.pipeline_config.ollama_model().unwrap_or(DEFAULT_MODEL)
    }

    pub fn selected_story(&self) -> Option<&Story> {
        self.stories.get(self.dashboard.selected)
    }

    /// Advance animation frame and expire the status message.
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
        let expired = self
            .status_message
            .as_ref()
            .is_some_and(|m| Utc::now() - m.timestamp > Duration::seconds(STATUS_MESSAGE_TTL_SECS));
        if expired {
            self.clear_status_message();
        }
    }
}
