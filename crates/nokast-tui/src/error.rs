//! Error handling for the Nokast terminal UI

use nokast_common::NokastError;
use thiserror::Error;

/// Result type alias using the application's error type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend client errors
    #[error(transparent)]
    Client(#[from] NokastError),

    /// Terminal setup, drawing or event errors
    #[error("UI error: {0}")]
    Ui(String),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn ui(message: impl Into<String>) -> Self {
        Self::Ui(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
