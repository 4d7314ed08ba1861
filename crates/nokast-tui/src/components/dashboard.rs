//! Dashboard: the generated digest, story by story.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::application::AppModel;
use crate::components::step_selection;
use crate::utils::{format_score, spinner_frame, truncate_text};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub selected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    LoadModel,
    Generate,
    Export,
}

impl DashboardState {
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        story_count: usize,
        model_loaded: bool,
    ) -> Option<DashboardAction> {
        if !model_loaded {
            return match key.code {
                KeyCode::Char('l') | KeyCode::Enter => Some(DashboardAction::LoadModel),
                _ => None,
            };
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = step_selection(self.selected, story_count, -1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = step_selection(self.selected, story_count, 1);
                None
            }
            KeyCode::Char('r') => Some(DashboardAction::Generate),
            KeyCode::Enter if story_count == 0 => Some(DashboardAction::Generate),
            KeyCode::Char('e') => Some(DashboardAction::Export),
            _ => None,
        }
    }

    /// Keeps the cursor inside a story list that was replaced.
    pub fn clamp(&mut self, story_count: usize) {
        self.selected = step_selection(self.selected, story_count, 0);
    }
}

pub fn render(frame: &mut Frame, area: Rect, model: &AppModel) {
    if !model.model_loaded {
        render_model_not_loaded(frame, area, model);
        return;
    }

    if model.stories.is_empty() {
        let text = if model.generating {
            format!(
                "{} Generating your summary...",
                spinner_frame(model.animation_frame)
            )
        } else {
            "No summary generated yet for this session. Press Enter to generate the first one."
                .to_string()
        };
        frame.render_widget(
            Paragraph::new(text)
                .alignment(ratatui::layout::Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(Block::default().title(" Latest Summary ").borders(Borders::ALL)),
            area,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(area);

    let width = chunks[0].width.saturating_sub(10) as usize;
    let items: Vec<ListItem> = model
        .stories
        .iter()
        .map(|story| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>4} ", format_score(story.score)),
                    Style::default().fg(Color::Blue),
                ),
                Span::raw(truncate_text(story.title.trim(), width)),
            ]))
        })
        .collect();

    let title = if model.generating {
        format!(" Stories {} regenerating ", spinner_frame(model.animation_frame))
    } else {
        format!(" Stories ({}) ", model.stories.len())
    };
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(Some(model.dashboard.selected));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    if let Some(story) = model.selected_story() {
        let dim = Style::default().fg(Color::DarkGray);
        let bold = Style::default().add_modifier(Modifier::BOLD);

        let mut meta = vec![format!("score {}", format_score(story.score))];
        if let Some(date) = story.source_date() {
            meta.push(date.to_string());
        }
        if let Some(sender) = story.sender_email.as_deref().filter(|s| !s.is_empty()) {
            meta.push(sender.to_string());
        }
        if let Some(tag) = story.branding_tag.as_deref().filter(|t| !t.is_empty()) {
            meta.push(format!("#{tag}"));
        }

        let mut lines = vec![
            Line::from(Span::styled(story.title.trim().to_string(), bold)),
            Line::from(Span::styled(meta.join(" · "), dim)),
            Line::from(""),
            Line::from(story.summary.trim().to_string()),
        ];
        for (label, post) in story.social_posts() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(label, bold.fg(Color::Cyan))));
            lines.push(Line::from(post.to_string()));
        }
        if let Some(action) = story
            .action_suggestion
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
        {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Next step: ", bold.fg(Color::Green)),
                Span::raw(action.to_string()),
            ]));
        }

        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::default().title(" Story ").borders(Borders::ALL)),
            chunks[1],
        );
    }
}

fn render_model_not_loaded(frame: &mut Frame, area: Rect, model: &AppModel) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "AI Model Not Loaded",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Load the AI model into memory to generate summaries and use the AI Helper."),
        Line::from(""),
        Line::from(Span::styled(
            format!("Press l to load {}", model.configured_model()),
            Style::default().fg(Color::Cyan),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(ratatui::layout::Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().title(" Dashboard ").borders(Borders::ALL)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_only_load_available_without_model() {
        let mut state = DashboardState::default();
        assert_eq!(state.handle_key(key('e'), 3, false), None);
        assert_eq!(state.handle_key(key('l'), 3, false), Some(DashboardAction::LoadModel));
    }

    #[test]
    fn test_selection_moves_within_stories() {
        let mut state = DashboardState::default();
        state.handle_key(key('j'), 2, true);
        state.handle_key(key('j'), 2, true);
        assert_eq!(state.selected, 1);
        state.clamp(0);
        assert_eq!(state.selected, 0);
    }
}
