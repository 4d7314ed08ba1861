//! Application message and effect types
//!
//! All state changes happen through [`AppMsg`]s handed to the update function.
//! Anything that needs I/O is returned from it as an [`Effect`] and executed
//! by the runtime, whose results come back as further messages.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossterm::event::KeyEvent;
use nokast_common::types::*;
use nokast_common::NokastError;
use ratatui::style::Color;
use strum_macros::{Display, EnumIter};

/// Top-level screens, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Screen {
    Home,
    Dashboard,
    Models,
    Settings,
    About,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Home,
        Screen::Dashboard,
        Screen::Models,
        Screen::Settings,
        Screen::About,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// Screen bound to a number key, `1` being Home.
    pub fn from_digit(digit: char) -> Option<Screen> {
        let n = digit.to_digit(10)? as usize;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn next(self) -> Screen {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Screen {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Identifies one run of a background poller. Messages from a poller that has
/// since been replaced or shut down carry a stale id and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

impl SessionId {
    pub fn next() -> Self {
        Self(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A failed request as the model sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// No HTTP response was received.
    pub transport: bool,
    pub message: String,
}

impl Failure {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            transport: true,
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self {
            transport: false,
            message: message.into(),
        }
    }
}

impl From<NokastError> for Failure {
    fn from(err: NokastError) -> Self {
        Self {
            transport: err.is_transport(),
            message: err.user_message(),
        }
    }
}

pub type Outcome<T> = std::result::Result<T, Failure>;

/// Results delivered by the status poller.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Newsletters(Outcome<Vec<Newsletter>>),
    Keywords(Outcome<Vec<PriorityKeyword>>),
    Secrets(Outcome<SecretsStatus>),
    Stories(Outcome<Vec<Story>>),
    Runtime(Outcome<RuntimeStatus>),
    /// `issued_at` is when the poll was sent, not when it answered.
    Pipeline {
        issued_at: Instant,
        outcome: Outcome<PipelineStatus>,
    },
    /// Story list fetched after a generation completed.
    StoriesRefreshed(Outcome<Vec<Story>>),
}

impl SyncEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SyncEvent::Newsletters(_) => "newsletters",
            SyncEvent::Keywords(_) => "keywords",
            SyncEvent::Secrets(_) => "secrets",
            SyncEvent::Stories(_) => "stories",
            SyncEvent::Runtime(_) => "runtime",
            SyncEvent::Pipeline { .. } => "pipeline",
            SyncEvent::StoriesRefreshed(_) => "stories_refreshed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppMsg {
    Quit,
    Tick,
    Key(KeyEvent),
    Resize(u16, u16),

    // ============== Status sync ==============
    SyncStarted(SessionId),
    Synced {
        session: SessionId,
        event: SyncEvent,
    },

    // ============== Effect results ==============
    GenerationRequested(Outcome<String>),
    ModelsLoaded {
        inventory: Outcome<Vec<DownloadedModel>>,
        runtime: Outcome<RuntimeStatus>,
    },
    ModelActionFinished {
        action: ModelAction,
        model: String,
        outcome: Outcome<String>,
    },
    HelperReplied(Outcome<String>),
    NewslettersSaved(Outcome<usize>),
    KeywordsSaved(Outcome<usize>),
    CredentialUploaded {
        kind: CredentialKind,
        outcome: Outcome<String>,
    },
    CredentialsDeleted(Outcome<CredentialsRemoval>),
    SecretsLoaded(Outcome<SecretsStatus>),
    PipelineConfigLoaded(Outcome<PipelineConfig>),
    PipelineConfigSaved(Outcome<()>),
    PreferencesSaved(Outcome<()>),
    WhatsAppWatchStarted(SessionId),
    WhatsAppPolled {
        session: SessionId,
        outcome: Outcome<WhatsAppStatus>,
    },
    WhatsAppConnectRequested(Outcome<()>),
    ExportFinished(Outcome<usize>),
}

/// Side effects requested by the update function.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch the story list inside the given sync session.
    RefreshStories(SessionId),
    StartGeneration(RunRequest),
    LoadModels,
    ApplyModelAction {
        action: ModelAction,
        model: String,
    },
    AskHelper {
        summary: String,
        prompt: String,
    },
    SaveNewsletters(Vec<Newsletter>),
    SaveKeywords(Vec<PriorityKeyword>),
    UploadCredential {
        kind: CredentialKind,
        path: PathBuf,
    },
    DeleteCredentials,
    ReloadSecrets,
    LoadPipelineConfig,
    SavePipelineConfig(PipelineConfig),
    SavePreferences(PipelineConfig),
    StartWhatsAppWatch,
    StopWhatsAppWatch,
    ConnectWhatsApp,
    CopyToClipboard(String),
}

/// Status message severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSeverity {
    Info,
    Warning,
    Error,
}

impl StatusSeverity {
    pub fn color(&self) -> Color {
        match self {
            StatusSeverity::Info => Color::Blue,
            StatusSeverity::Warning => Color::Yellow,
            StatusSeverity::Error => Color::Red,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            StatusSeverity::Info => "ℹ",
            StatusSeverity::Warning => "⚠",
            StatusSeverity::Error => "✗",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_order_wraps() {
        assert_eq!(Screen::Home.previous(), Screen::About);
        assert_eq!(Screen::About.next(), Screen::Home);
        assert_eq!(Screen::from_digit('3'), Some(Screen::Models));
        assert_eq!(Screen::from_digit('0'), None);
        assert_eq!(Screen::from_digit('6'), None);
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::next(), SessionId::next());
    }

    #[test]
    fn test_failure_from_client_error() {
        let failure = Failure::from(NokastError::Transport {
            endpoint: "/api/status".into(),
            message: "connection refused".into(),
        });
        assert!(failure.transport);
    }
}
