//! Utility functions and helpers

pub mod formatting;
pub mod line_editor;

pub use formatting::*;
pub use line_editor::LineEditor;
