//! Command-line client for the Nokast backend
//!
//! Every command is a thin wrapper over [`nokast_common::ApiClient`]; output
//! formatting lives in [`display`] so it can be tested without a backend.

pub mod cli;
pub mod commands;
pub mod completions;
pub mod display;
pub mod interactive;
pub mod oneshot;

pub use cli::{Cli, Commands};
