//! Status line: the latest non-blocking message plus context key hints.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::application::AppModel;
use crate::message::{Screen, StatusSeverity};
use crate::utils::format_timestamp;

/// A status message to display
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub severity: StatusSeverity,
    pub message: String,
    /// When this message was created
    pub timestamp: DateTime<Utc>,
}

impl StatusMessage {
    pub fn display_text(&self) -> String {
        format!(
            "{} {} {}",
            format_timestamp(&self.timestamp),
            self.severity.symbol(),
            self.message
        )
    }
}

fn key_hints(model: &AppModel) -> &'static str {
    if model.helper.open {
        return "Enter send · Esc close";
    }
    match model.screen {
        Screen::Home => "g generate · d dashboard · s settings · ? help",
        Screen::Dashboard if model.model_loaded => "↑↓ story · r regenerate · e export · h helper",
        Screen::Dashboard => "l load model · ? help",
        Screen::Models => "↑↓ select · Enter pull/activate/deactivate · x remove · r refresh",
        Screen::Settings => "←→ section · ↑↓ select · Enter edit · a add · d remove · s save",
        Screen::About => "? help · q quit",
    }
}

pub fn render(frame: &mut Frame, area: Rect, model: &AppModel) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(72)])
        .split(area);

    let left = match &model.status_message {
        Some(message) => Paragraph::new(message.display_text()).style(
            Style::default()
                .fg(message.severity.color())
                .add_modifier(Modifier::BOLD),
        ),
        None => Paragraph::new("Ready").style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(left, chunks[0]);

    let hints = Paragraph::new(Line::from(Span::styled(
        key_hints(model),
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(ratatui::layout::Alignment::Right);
    frame.render_widget(hints, chunks[1]);
}
