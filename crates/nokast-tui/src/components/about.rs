use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
    Frame,
};

use crate::application::AppModel;

pub fn render(frame: &mut Frame, area: Rect, model: &AppModel) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let lines = vec![
        Line::from(Span::styled("Nokast", bold.fg(Color::Cyan))),
        Line::from(Span::styled(
            format!("Terminal client v{}", env!("CARGO_PKG_VERSION")),
            dim,
        )),
        Line::from(""),
        Line::from(
            "Nokast reads the newsletters you pick from Gmail, scores and \
             deduplicates their stories, and summarizes the best of them with \
             a model running on your own machine.",
        ),
        Line::from(""),
        Line::from(Span::styled("How it works", bold)),
        Line::from("  1. Connect Gmail and choose newsletters in Settings"),
        Line::from("  2. Pull and activate a local model on the Models screen"),
        Line::from("  3. Generate a digest; it shows up on the Dashboard when ready"),
        Line::from("  4. Ask the AI helper about the stories"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Backend  ", dim),
            Span::raw(
                model
                    .pipeline
                    .as_ref()
                    .map(|p| {
                        if p.pipeline_available {
                            "pipeline available"
                        } else {
                            "pipeline unavailable"
                        }
                    })
                    .unwrap_or("not contacted yet"),
            ),
        ]),
    ];

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" About ")
            .borders(Borders::ALL)
            .padding(Padding::horizontal(2)),
    );
    frame.render_widget(widget, area);
}
