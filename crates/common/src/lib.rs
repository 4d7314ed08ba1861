//! Common types and utilities shared by the Nokast terminal UI and CLI

pub mod client;
pub mod config;
pub mod error;
pub mod helper;
pub mod models;
pub mod logging;
pub mod types;

pub use client::ApiClient;
pub use config::*;
pub use error::{NokastError, Result};
pub use types::*;
