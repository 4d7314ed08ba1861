//! # Nokast TUI
//!
//! Terminal front end for the Nokast newsletter digest backend. All real work
//! (mail fetching, scoring, summarization, persistence) happens in the backend;
//! this crate renders its state and keeps it in sync.
//!
//! ## Architecture
//!
//! The application follows the Elm architecture:
//!
//! - **Model**: [`application::AppModel`], the single application-state store
//! - **Update**: [`application::update`], a pure function from message to
//!   effects; it is the only writer of the model
//! - **View**: [`application::view`], a read-only projection of the model
//! - **Services**: the status poller, the WhatsApp watcher and the action
//!   executor turn effects into backend requests and feed results back as
//!   messages

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

pub mod application;
pub mod components;
pub mod config;
pub mod error;
pub mod message;
pub mod services;
pub mod utils;

pub use application::AppModel;
pub use config::Config;
pub use error::{Error, Result};
