//! Model management: recommended and downloaded models, reconciled against the
//! runtime's running list.

use crossterm::event::{KeyCode, KeyEvent};
use nokast_common::types::{DownloadedModel, LocalModel, ModelAction, ModelStatus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::application::AppModel;
use crate::components::step_selection;
use crate::utils::spinner_frame;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelsState {
    pub models: Vec<LocalModel>,
    pub downloaded: Vec<DownloadedModel>,
    pub selected: usize,
    pub loading: bool,
    /// The one action in flight, if any
    pub pending: Option<(ModelAction, String)>,
    /// Inventory failure reported by the runtime
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelsAction {
    Refresh,
    Apply { action: ModelAction, model: String },
    ConfirmRemove(String),
}

/// The action Enter performs for a model in its current state.
pub fn primary_action(model: &LocalModel) -> ModelAction {
    match model.status {
        ModelStatus::NotDownloaded => ModelAction::Pull,
        _ if model.is_active => ModelAction::Deactivate,
        _ => ModelAction::Activate,
    }
}

impl ModelsState {
    pub fn selected_model(&self) -> Option<&LocalModel> {
        self.models.get(self.selected)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ModelsAction> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = step_selection(self.selected, self.models.len(), -1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = step_selection(self.selected, self.models.len(), 1);
                None
            }
            KeyCode::Char('r') => Some(ModelsAction::Refresh),
            // One action at a time; keys are ignored until it resolves.
            _ if self.pending.is_some() => None,
            KeyCode::Enter => self.selected_model().map(|m| ModelsAction::Apply {
                action: primary_action(m),
                model: m.name.clone(),
            }),
            KeyCode::Char('p') => self
                .selected_model()
                .filter(|m| m.status == ModelStatus::NotDownloaded)
                .map(|m| ModelsAction::Apply {
                    action: ModelAction::Pull,
                    model: m.name.clone(),
                }),
            KeyCode::Char('x') | KeyCode::Delete => self
                .selected_model()
                .filter(|m| m.status != ModelStatus::NotDownloaded)
                .map(|m| ModelsAction::ConfirmRemove(m.name.clone())),
            _ => None,
        }
    }
}

fn status_color(status: ModelStatus) -> Color {
    match status {
        ModelStatus::Running => Color::Green,
        ModelStatus::Idle => Color::Yellow,
        ModelStatus::NotDownloaded => Color::Gray,
    }
}

pub fn render(frame: &mut Frame, area: Rect, model: &AppModel) {
    let state = &model.models;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(2)])
        .split(area);

    let runtime_line = match &model.runtime {
        Some(rt) if rt.server_up => Line::from(vec![
            Span::styled("● ", Style::default().fg(Color::Green)),
            Span::raw(format!(
                "Runtime up · {} running",
                rt.running_models.len()
            )),
        ]),
        Some(rt) if !rt.cli_available => Line::from(Span::styled(
            "● Runtime CLI not found on the backend host",
            Style::default().fg(Color::Red),
        )),
        Some(_) => Line::from(Span::styled(
            "● Runtime server is down",
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            "○ Runtime status unknown",
            Style::default().fg(Color::Gray),
        )),
    };
    let mut header = vec![runtime_line];
    if state.loading {
        header.push(Line::from(format!(
            "{} Loading models...",
            spinner_frame(model.animation_frame)
        )));
    } else if let Some((action, name)) = &state.pending {
        header.push(Line::from(Span::styled(
            format!("{} {action} {name}...", spinner_frame(model.animation_frame)),
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(err) = &state.error {
        header.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    frame.render_widget(Paragraph::new(header).wrap(Wrap { trim: true }), chunks[0]);

    let rows: Vec<Row> = state
        .models
        .iter()
        .map(|m| {
            let name = if m.recommended {
                m.name.clone()
            } else {
                format!("{} (local)", m.name)
            };
            let action = primary_action(m);
            Row::new(vec![
                Cell::from(name),
                Cell::from(m.size.clone()),
                Cell::from(Line::from(vec![
                    Span::styled("● ", Style::default().fg(status_color(m.status))),
                    Span::raw(m.status.to_string()),
                ])),
                Cell::from(if m.is_active { "active" } else { "" }),
                Cell::from(Span::styled(
                    format!("Enter: {action}"),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(18),
            Constraint::Length(10),
            Constraint::Length(18),
            Constraint::Length(8),
            Constraint::Length(20),
        ],
    )
    .header(
        Row::new(vec!["Model", "Size", "Status", "", ""])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().title(" Model Management ").borders(Borders::ALL))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, chunks[1], &mut table_state);

    frame.render_widget(
        Paragraph::new(format!(
            "The pipeline summarizes with {}. Smaller models are faster on laptops.",
            model.configured_model()
        ))
        .style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}
