//! UI components
//!
//! Each screen module holds its screen-local state, a key handler that turns
//! keys into screen actions, and a render function over the application model.

pub mod about;
pub mod dashboard;
pub mod header;
pub mod helper;
pub mod home;
pub mod model_management;
pub mod overlay;
pub mod settings;
pub mod status_line;

use ratatui::layout::Rect;

pub use dashboard::DashboardState;
pub use helper::HelperState;
pub use model_management::ModelsState;
pub use overlay::{ConfirmAction, FormPurpose, FormState, Overlay};
pub use settings::{SettingsSection, SettingsState};
pub use status_line::StatusMessage;

/// A `width` x `height` rectangle centered in `area`, clipped to it.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Moves a list cursor by `delta`, clamped to `len`.
pub fn step_selection(selected: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = selected as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}
