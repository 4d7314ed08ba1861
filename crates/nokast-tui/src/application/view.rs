//! Application view logic (View in Elm architecture)

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::{
    application::AppModel,
    components::{about, dashboard, header, helper, home, model_management, overlay, settings, status_line},
    message::Screen,
};

/// Render the complete application UI
pub fn render_app(model: &AppModel, frame: &mut Frame) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with tabs
            Constraint::Min(5),    // Current screen
            Constraint::Length(1), // Status line
        ])
        .split(area);

    header::render(frame, chunks[0], model);

    let body = chunks[1];
    match model.screen {
        Screen::Home => home::render(frame, body, model),
        Screen::Dashboard => dashboard::render(frame, body, model),
        Screen::Models => model_management::render(frame, body, model),
        Screen::Settings => settings::render(frame, body, model),
        Screen::About => about::render(frame, body, model),
    }

    status_line::render(frame, chunks[2], model);

    if model.helper.open {
        helper::render(frame, body, model);
    }

    // Bottom of the stack first so the focused overlay ends up on top.
    for item in &model.overlays {
        overlay::render(frame, area, item);
    }
}
