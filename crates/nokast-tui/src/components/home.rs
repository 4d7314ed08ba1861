//! Home screen: connection status, newsletter selection, latest story preview.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::application::AppModel;
use crate::message::Screen;
use crate::utils::{pluralize, preview};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeAction {
    Generate,
    Navigate(Screen),
}

pub fn handle_key(key: KeyEvent) -> Option<HomeAction> {
    match key.code {
        KeyCode::Enter => Some(HomeAction::Generate),
        KeyCode::Char('d') => Some(HomeAction::Navigate(Screen::Dashboard)),
        KeyCode::Char('s') => Some(HomeAction::Navigate(Screen::Settings)),
        KeyCode::Char('m') => Some(HomeAction::Navigate(Screen::Models)),
        _ => None,
    }
}

fn stat_card<'a>(title: &'a str, value: Span<'a>, hint: &'a str) -> Paragraph<'a> {
    Paragraph::new(vec![
        Line::from(value),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ])
    .block(Block::default().title(format!(" {title} ")).borders(Borders::ALL))
}

pub fn render(frame: &mut Frame, area: Rect, model: &AppModel) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(6)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(rows[0]);

    let big = Style::default().add_modifier(Modifier::BOLD);
    let gmail = if model.gmail_connected {
        Span::styled("Connected", big.fg(Color::Green))
    } else {
        Span::styled("Disconnected", big.fg(Color::Yellow))
    };
    frame.render_widget(stat_card("Gmail Connection", gmail, "s: go to Settings"), cards[0]);
    frame.render_widget(
        stat_card(
            "Selected Newsletters",
            Span::styled(model.newsletters.len().to_string(), big),
            "s: edit selection",
        ),
        cards[1],
    );
    let action = if model.generating {
        Span::styled("Generating...", big.fg(Color::Yellow))
    } else {
        Span::styled("Enter: Generate Summary", big.fg(Color::Cyan))
    };
    frame.render_widget(stat_card("Quick Actions", action, "d: view dashboard"), cards[2]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[1]);

    let preview_text = match model.stories.first() {
        Some(story) => {
            let title = story.title.trim();
            vec![
                Line::from(Span::styled(title.to_string(), big)),
                Line::from(""),
                Line::from(preview(story.summary.trim())),
                Line::from(""),
                Line::from(Span::styled(
                    format!(
                        "{} in the latest digest · d: view full digest",
                        pluralize(model.stories.len(), "story")
                    ),
                    Style::default().fg(Color::DarkGray),
                )),
            ]
        }
        None => vec![Line::from(Span::styled(
            "No summary generated for this session.",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    frame.render_widget(
        Paragraph::new(preview_text)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(" Latest Summary Preview ").borders(Borders::ALL)),
        body[0],
    );

    let newsletters = Block::default().title(" Your Newsletters ").borders(Borders::ALL);
    if model.newsletters.is_empty() {
        frame.render_widget(
            Paragraph::new(
                "No newsletters selected. Please connect Gmail and choose your newsletters in Settings.",
            )
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(newsletters),
            body[1],
        );
    } else {
        let items: Vec<ListItem> = model
            .newsletters
            .iter()
            .map(|n| {
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{:<24}", n.sender)),
                    Span::styled(format!(" P: {}", n.priority), Style::default().fg(Color::Blue)),
                ]))
            })
            .collect();
        frame.render_widget(List::new(items).block(newsletters), body[1]);
    }
}
