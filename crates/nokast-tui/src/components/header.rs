//! Header: app title, screen tabs and backend indicators.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::application::AppModel;
use crate::message::Screen;
use crate::utils::spinner_frame;

fn indicator(on: bool, on_label: &str, off_label: &str, off_color: Color) -> Vec<Span<'static>> {
    let (label, color) = if on {
        (on_label, Color::Green)
    } else {
        (off_label, off_color)
    };
    vec![
        Span::styled("●", Style::default().fg(color)),
        Span::raw(format!(" {label}  ")),
    ]
}

pub fn render(frame: &mut Frame, area: Rect, model: &AppModel) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Min(30),
            Constraint::Length(48),
        ])
        .split(inner);

    let title = Paragraph::new(Line::from(Span::styled(
        " Nokast",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(title, chunks[0]);

    let titles: Vec<Line> = Screen::ALL
        .iter()
        .enumerate()
        .map(|(i, screen)| Line::from(format!("{} {}", i + 1, screen)))
        .collect();
    let tabs = Tabs::new(titles)
        .select(model.screen.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    frame.render_widget(tabs, chunks[1]);

    let mut spans = Vec::new();
    if model.generating {
        spans.push(Span::styled(
            format!("{} generating  ", spinner_frame(model.animation_frame)),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.extend(indicator(model.model_loaded, "Model", "No model", Color::Gray));
    match model.backend_online {
        Some(online) => spans.extend(indicator(online, "Online", "Offline", Color::Yellow)),
        None => spans.push(Span::styled("○ Connecting", Style::default().fg(Color::Gray))),
    }
    let status = Paragraph::new(Line::from(spans)).alignment(ratatui::layout::Alignment::Right);
    frame.render_widget(status, chunks[2]);
}
