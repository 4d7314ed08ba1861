use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumIter};
use uuid::Uuid;

use crate::error::{NokastError, Result};

pub const PRIORITY_MIN: u8 = 1;
pub const PRIORITY_MAX: u8 = 10;
pub const DEFAULT_PRIORITY: u8 = 5;
pub const DEFAULT_KEYWORD_SCORE: f64 = 1.0;

/// Backend ids come out of DuckDB and may be integers or strings.
fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) => s,
        Some(RawId::Int(i)) => i.to_string(),
        Some(RawId::Float(f)) => f.to_string(),
        None => String::new(),
    })
}

fn clamped_priority<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw
        .map(|p| Newsletter::clamp_priority(p.round() as i64))
        .unwrap_or(DEFAULT_PRIORITY))
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A newsletter sender the pipeline should read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Newsletter {
    #[serde(deserialize_with = "id_string", default)]
    pub id: String,
    #[serde(deserialize_with = "null_as_default", default)]
    pub sender: String,
    #[serde(deserialize_with = "null_as_default", default)]
    pub email: String,
    #[serde(deserialize_with = "clamped_priority", default = "default_priority")]
    pub priority: u8,
}

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

impl Newsletter {
    /// Creates a newsletter with a fresh id. Both fields must be non-blank.
    pub fn new(sender: &str, email: &str, priority: i64) -> Result<Self> {
        let sender = sender.trim();
        let email = email.trim();
        if sender.is_empty() {
            return Err(NokastError::validation("Newsletter name cannot be empty"));
        }
        if email.is_empty() {
            return Err(NokastError::validation("Newsletter email cannot be empty"));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            sender: sender.to_string(),
            email: email.to_string(),
            priority: Self::clamp_priority(priority),
        })
    }

    pub fn clamp_priority(priority: i64) -> u8 {
        priority.clamp(PRIORITY_MIN as i64, PRIORITY_MAX as i64) as u8
    }

    pub fn set_priority(&mut self, priority: i64) {
        self.priority = Self::clamp_priority(priority);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityKeyword {
    pub keyword: String,
    #[serde(default = "default_keyword_score")]
    pub score: f64,
}

fn default_keyword_score() -> f64 {
    DEFAULT_KEYWORD_SCORE
}

impl PriorityKeyword {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.trim().to_string(),
            score: DEFAULT_KEYWORD_SCORE,
        }
    }

    /// Drops blank keywords and keeps the first occurrence of each keyword
    /// (case-insensitive), preserving order.
    pub fn normalize(keywords: Vec<PriorityKeyword>) -> Vec<PriorityKeyword> {
        let mut seen = std::collections::HashSet::new();
        keywords
            .into_iter()
            .map(|k| PriorityKeyword {
                keyword: k.keyword.trim().to_string(),
                score: k.score,
            })
            .filter(|k| !k.keyword.is_empty() && seen.insert(k.keyword.to_lowercase()))
            .collect()
    }
}

/// One generated digest item. Produced by the backend pipeline only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    #[serde(deserialize_with = "id_string", default)]
    pub id: String,
    #[serde(deserialize_with = "null_as_default", default)]
    pub title: String,
    #[serde(deserialize_with = "null_as_default", default)]
    pub summary: String,
    #[serde(rename = "linkedIn", default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub x_post: Option<String>,
    #[serde(default)]
    pub branding_tag: Option<String>,
    #[serde(default)]
    pub action_suggestion: Option<String>,
    #[serde(deserialize_with = "null_as_default", default)]
    pub score: f64,
    #[serde(default)]
    pub date_iso: Option<String>,
    #[serde(default)]
    pub sender_email: Option<String>,
    #[serde(default)]
    pub processed_at: Option<String>,
}

impl Story {
    /// Social-post variants derived by the pipeline, labelled, skipping blanks.
    pub fn social_posts(&self) -> Vec<(&'static str, &str)> {
        [("LinkedIn", &self.linkedin), ("X", &self.x_post)]
            .into_iter()
            .filter_map(|(label, post)| {
                post.as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(|p| (label, p))
            })
            .collect()
    }

    /// The calendar part of `date_iso`, if it parses.
    pub fn source_date(&self) -> Option<chrono::NaiveDate> {
        let raw = self.date_iso.as_deref()?;
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .ok()
            .or_else(|| chrono::NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LastRun {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub last_result: Option<String>,
}

/// Outcome of the pipeline's last run as reported by `last_run.last_result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    NeverRan,
    Succeeded,
    PipelineUnavailable,
    Failed(String),
}

/// Snapshot of the backend job, polled and never owned by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStatus {
    #[serde(default)]
    pub pipeline_available: bool,
    #[serde(default)]
    pub last_run: LastRun,
}

impl PipelineStatus {
    pub fn is_running(&self) -> bool {
        self.last_run.running
    }

    /// A generation the client started is finished once the backend reports
    /// its last run as no longer running.
    pub fn completes_generation(&self, in_progress: bool) -> bool {
        in_progress && !self.last_run.running
    }

    pub fn outcome(&self) -> RunOutcome {
        match self.last_run.last_result.as_deref() {
            None => RunOutcome::NeverRan,
            Some("ok") => RunOutcome::Succeeded,
            Some("pipeline_not_available") => RunOutcome::PipelineUnavailable,
            Some(other) => RunOutcome::Failed(
                other
                    .strip_prefix("error:")
                    .map(str::trim)
                    .unwrap_or(other)
                    .to_string(),
            ),
        }
    }
}

/// State of the local model runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeStatus {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub cli_available: bool,
    #[serde(default)]
    pub server_up: bool,
    #[serde(default)]
    pub running_models: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedModel {
    pub name: String,
    #[serde(default)]
    pub size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ModelStatus {
    #[strum(serialize = "Running")]
    Running,
    #[strum(serialize = "Idle")]
    Idle,
    #[strum(serialize = "Not Downloaded")]
    NotDownloaded,
}

/// A model as shown on the model management screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalModel {
    pub name: String,
    pub size: String,
    pub status: ModelStatus,
    pub is_active: bool,
    pub recommended: bool,
}

/// Actions the backend can apply to a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ModelAction {
    Pull,
    Remove,
    Activate,
    Deactivate,
}

impl ModelAction {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ModelAction::Pull => "/api/models/pull",
            ModelAction::Remove => "/api/models/remove",
            ModelAction::Activate => "/api/models/activate",
            ModelAction::Deactivate => "/api/models/deactivate",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretEntry {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub path: Option<String>,
}

/// Which credential artifacts the backend currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretsStatus {
    #[serde(default)]
    pub google_credentials: SecretEntry,
    #[serde(default)]
    pub google_token: SecretEntry,
    #[serde(default)]
    pub env: SecretEntry,
    #[serde(default)]
    pub duckdb: SecretEntry,
    #[serde(default)]
    pub authority_scores: SecretEntry,
    #[serde(default)]
    pub model_processes: SecretEntry,
}

impl SecretsStatus {
    pub fn gmail_connected(&self) -> bool {
        self.google_credentials.exists && self.google_token.exists
    }

    pub fn entries(&self) -> [(&'static str, &SecretEntry); 6] {
        [
            ("google_credentials", &self.google_credentials),
            ("google_token", &self.google_token),
            ("env", &self.env),
            ("duckdb", &self.duckdb),
            ("authority_scores", &self.authority_scores),
            ("model_processes", &self.model_processes),
        ]
    }
}

/// Files the backend accepts as multipart uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum CredentialKind {
    #[strum(serialize = "Google credentials")]
    GoogleCredentials,
    #[strum(serialize = "Google token")]
    GoogleToken,
    #[strum(serialize = "environment file")]
    EnvFile,
}

impl CredentialKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            CredentialKind::GoogleCredentials => "/api/upload-google-credentials",
            CredentialKind::GoogleToken => "/api/upload-google-token",
            CredentialKind::EnvFile => "/api/upload-env",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalError {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsRemoval {
    #[serde(default)]
    pub removed: Vec<String>,
    #[serde(default)]
    pub errors: Vec<RemovalError>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
}

impl Frequency {
    pub fn toggled(self) -> Self {
        match self {
            Frequency::Daily => Frequency::Weekly,
            Frequency::Weekly => Frequency::Daily,
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = NokastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            other => Err(NokastError::validation(format!(
                "Unknown frequency '{other}' (expected Daily or Weekly)"
            ))),
        }
    }
}

/// Client-held summary preferences, echoed to the backend config on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPreferences {
    pub frequency: Frequency,
    /// Time of day as `HH:MM`.
    pub time: String,
    pub notifications: bool,
}

impl Default for SummaryPreferences {
    fn default() -> Self {
        Self {
            frequency: Frequency::Daily,
            time: "08:00".to_string(),
            notifications: true,
        }
    }
}

impl SummaryPreferences {
    pub fn parse_time(raw: &str) -> Result<String> {
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .map(|t| t.format("%H:%M").to_string())
            .map_err(|_| NokastError::validation(format!("'{}' is not a valid HH:MM time", raw.trim())))
    }

    pub fn to_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.set(PipelineConfig::SUMMARY_FREQUENCY, self.frequency.to_string());
        config.set(PipelineConfig::SUMMARY_TIME, self.time.clone());
        config.set(
            PipelineConfig::SUMMARY_NOTIFICATIONS,
            self.notifications.to_string(),
        );
        config
    }

    /// Reads preferences previously echoed to the backend, falling back to
    /// `self` for missing or malformed keys.
    pub fn merged_with(&self, config: &PipelineConfig) -> Self {
        let frequency = config
            .get(PipelineConfig::SUMMARY_FREQUENCY)
            .and_then(|f| f.parse().ok())
            .unwrap_or(self.frequency);
        let time = config
            .get(PipelineConfig::SUMMARY_TIME)
            .and_then(|t| Self::parse_time(t).ok())
            .unwrap_or_else(|| self.time.clone());
        let notifications = config
            .get(PipelineConfig::SUMMARY_NOTIFICATIONS)
            .and_then(|n| n.trim().parse().ok())
            .unwrap_or(self.notifications);
        Self {
            frequency,
            time,
            notifications,
        }
    }
}

/// Flat key/value pipeline configuration held by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineConfig(pub BTreeMap<String, String>);

impl PipelineConfig {
    pub const FETCH_LIMIT: &'static str = "FETCH_LIMIT";
    pub const TOP_N: &'static str = "TOP_N";
    pub const SIMILARITY_THRESHOLD: &'static str = "SIMILARITY_THRESHOLD";
    pub const OLLAMA_MODEL: &'static str = "OLLAMA_MODEL";
    pub const WHATSAPP_PHONE: &'static str = "WHATSAPP_PHONE";
    pub const SUMMARY_FREQUENCY: &'static str = "SUMMARY_FREQUENCY";
    pub const SUMMARY_TIME: &'static str = "SUMMARY_TIME";
    pub const SUMMARY_NOTIFICATIONS: &'static str = "SUMMARY_NOTIFICATIONS";

    /// Keys editable from the pipeline settings form, in display order.
    pub const EDITABLE_KEYS: [&'static str; 5] = [
        Self::FETCH_LIMIT,
        Self::TOP_N,
        Self::SIMILARITY_THRESHOLD,
        Self::OLLAMA_MODEL,
        Self::WHATSAPP_PHONE,
    ];

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn fetch_limit(&self) -> Option<u32> {
        self.get(Self::FETCH_LIMIT)?.trim().parse().ok()
    }

    pub fn top_n(&self) -> Option<u32> {
        self.get(Self::TOP_N)?.trim().parse().ok()
    }

    pub fn similarity_threshold(&self) -> Option<f64> {
        self.get(Self::SIMILARITY_THRESHOLD)?.trim().parse().ok()
    }

    pub fn ollama_model(&self) -> Option<&str> {
        self.get(Self::OLLAMA_MODEL)
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    pub fn whatsapp_phone(&self) -> Option<&str> {
        self.get(Self::WHATSAPP_PHONE)
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Checks a value before it is stored under `key`, returning the
    /// normalized value.
    pub fn validate_value(key: &str, value: &str) -> Result<String> {
        let value = value.trim();
        match key {
            Self::FETCH_LIMIT | Self::TOP_N => match value.parse::<u32>() {
                Ok(n) if n > 0 => Ok(n.to_string()),
                _ => Err(NokastError::validation(format!(
                    "{key} must be a positive whole number"
                ))),
            },
            Self::SIMILARITY_THRESHOLD => match value.parse::<f64>() {
                Ok(t) if (0.0..=1.0).contains(&t) => Ok(value.to_string()),
                _ => Err(NokastError::validation(format!(
                    "{key} must be a number between 0 and 1"
                ))),
            },
            Self::WHATSAPP_PHONE => {
                if value.is_empty() || value.chars().all(|c| c.is_ascii_digit() || c == '+') {
                    Ok(value.to_string())
                } else {
                    Err(NokastError::validation(
                        "Phone number may only contain digits and a leading '+'",
                    ))
                }
            }
            _ => Ok(value.to_string()),
        }
    }

    /// Only the keys in `keys`, for partial updates.
    pub fn subset(&self, keys: &[&str]) -> PipelineConfig {
        PipelineConfig(
            self.0
                .iter()
                .filter(|(k, _)| keys.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsAppStatus {
    #[serde(default)]
    pub connected: bool,
    /// Base64 PNG of the pairing QR code while pairing is pending.
    #[serde(default)]
    pub qr: Option<String>,
}

impl WhatsAppStatus {
    pub fn pairing_pending(&self) -> bool {
        !self.connected && self.qr.as_deref().is_some_and(|q| !q.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Email addresses of the newsletters to include.
    pub newsletters: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_limit: Option<u32>,
}

impl RunRequest {
    pub fn for_newsletters(newsletters: &[Newsletter], fetch_limit: Option<u32>) -> Self {
        Self {
            newsletters: newsletters.iter().map(|n| n.email.clone()).collect(),
            fetch_limit,
        }
    }
}

impl fmt::Display for LocalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.size, self.status)
    }
}
