//! AI helper panel: a chat over the current digest, floating at the right edge.

use crossterm::event::{KeyCode, KeyEvent};
use nokast_common::helper::{Speaker, Transcript};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::application::AppModel;
use crate::components::overlay::editor_line;
use crate::utils::{spinner_frame, LineEditor};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HelperState {
    pub open: bool,
    pub transcript: Transcript,
    pub input: LineEditor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperAction {
    Submit,
    Close,
}

impl HelperState {
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<HelperAction> {
        match key.code {
            KeyCode::Esc => Some(HelperAction::Close),
            KeyCode::Enter => Some(HelperAction::Submit),
            _ => {
                self.input.handle_key(key);
                None
            }
        }
    }

    /// Moves the typed prompt into the transcript. Returns the prompt to send,
    /// or `None` (input kept) when it is blank or a reply is pending.
    pub fn submit(&mut self) -> Option<String> {
        let prompt = self.transcript.push_prompt(self.input.text())?;
        self.input.clear();
        Some(prompt)
    }
}

pub fn render(frame: &mut Frame, area: Rect, model: &AppModel) {
    let state = &model.helper;
    let width = (area.width / 5 * 2).clamp(36.min(area.width), area.width);
    let popup = Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height: area.height,
    };
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" AI Helper ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(inner);

    let mut lines = Vec::new();
    if state.transcript.messages().is_empty() {
        lines.push(Line::from(Span::styled(
            "Ask anything about the current digest.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for message in state.transcript.messages() {
        let (who, color) = match message.speaker {
            Speaker::User => ("You", Color::Blue),
            Speaker::Assistant => ("Helper", Color::Green),
        };
        lines.push(Line::from(Span::styled(
            who,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.extend(message.text.lines().map(|l| Line::from(l.to_string())));
        lines.push(Line::from(""));
    }
    if state.transcript.is_awaiting_reply() {
        lines.push(Line::from(Span::styled(
            format!("{} thinking...", spinner_frame(model.animation_frame)),
            Style::default().fg(Color::Yellow),
        )));
    }

    // Keep the tail of the conversation in view.
    let overflow = (lines.len() as u16).saturating_sub(chunks[0].height);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((overflow, 0)),
        chunks[0],
    );

    frame.render_widget(
        Paragraph::new(editor_line(&state.input, true)).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        chunks[1],
    );
}
