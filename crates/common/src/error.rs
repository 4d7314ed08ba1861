use thiserror::Error;

#[derive(Error, Debug)]
pub enum NokastError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced an HTTP response.
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// The backend answered with a non-success HTTP status.
    #[error("{endpoint} returned HTTP {status}{}", status_suffix(.message))]
    Status {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },

    /// The backend answered 2xx but its envelope carried `ok: false`.
    #[error("{endpoint} rejected the request: {message}")]
    Rejected { endpoint: String, message: String },

    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NokastError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Network-level failures are logged and left for the next poll; everything
    /// else is shown to the user.
    pub fn is_transport(&self) -> bool {
        matches!(self, NokastError::Transport { .. })
    }

    /// Message suitable for an alert dialog.
    pub fn user_message(&self) -> String {
        match self {
            NokastError::Transport { .. } => {
                "Could not reach the Nokast backend. Is it running?".to_string()
            }
            NokastError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            NokastError::Status { status, .. } => {
                format!("The backend returned an error (HTTP {status})")
            }
            NokastError::Rejected { message, .. } => message.clone(),
            NokastError::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<url::ParseError> for NokastError {
    fn from(err: url::ParseError) -> Self {
        NokastError::Config(format!("invalid URL: {err}"))
    }
}

fn status_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, NokastError>;
