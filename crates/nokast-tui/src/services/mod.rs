//! Background services
//!
//! Services own every task that talks to the backend. They never touch the
//! model; results come back to the update function as messages.

pub mod action_executor;
pub mod status_sync;
pub mod whatsapp_watcher;

pub use action_executor::ActionExecutor;
pub use status_sync::StatusSync;
pub use whatsapp_watcher::WhatsAppWatcher;
