//! Settings: account credentials, newsletter and keyword selection, summary
//! preferences, pipeline configuration and the WhatsApp connector.

use crossterm::event::{KeyCode, KeyEvent};
use nokast_common::types::{CredentialKind, PipelineConfig};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::application::AppModel;
use crate::components::step_selection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter)]
pub enum SettingsSection {
    #[default]
    Account,
    Newsletters,
    Keywords,
    Preferences,
    Pipeline,
    #[strum(serialize = "WhatsApp")]
    WhatsApp,
}

impl SettingsSection {
    fn index(self) -> usize {
        Self::iter().position(|s| s == self).unwrap_or(0)
    }

    fn step(self, delta: isize) -> Self {
        let all: Vec<Self> = Self::iter().collect();
        let len = all.len() as isize;
        all[(self.index() as isize + delta).rem_euclid(len) as usize]
    }
}

/// Entries of the Account section, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountItem {
    Upload(CredentialKind),
    DeleteCredentials,
}

pub const ACCOUNT_ITEMS: [AccountItem; 4] = [
    AccountItem::Upload(CredentialKind::GoogleCredentials),
    AccountItem::Upload(CredentialKind::GoogleToken),
    AccountItem::Upload(CredentialKind::EnvFile),
    AccountItem::DeleteCredentials,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceItem {
    Frequency,
    Time,
    Notifications,
}

pub const PREFERENCE_ITEMS: [PreferenceItem; 3] = [
    PreferenceItem::Frequency,
    PreferenceItem::Time,
    PreferenceItem::Notifications,
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsState {
    pub section: SettingsSection,
    pub selected: usize,
}

/// Section-independent intents; the update function decides what each one
/// means for the current section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    Activate,
    Toggle,
    Add,
    Remove,
    Save,
    Reload,
    PriorityUp,
    PriorityDown,
    Connect,
}

/// Number of selectable rows in `section`.
pub fn item_count(section: SettingsSection, model: &AppModel) -> usize {
    match section {
        SettingsSection::Account => ACCOUNT_ITEMS.len(),
        SettingsSection::Newsletters if model.gmail_connected => model.newsletters.len(),
        SettingsSection::Newsletters => 0,
        SettingsSection::Keywords => model.keywords.len(),
        SettingsSection::Preferences => PREFERENCE_ITEMS.len(),
        SettingsSection::Pipeline => PipelineConfig::EDITABLE_KEYS.len(),
        SettingsSection::WhatsApp => 0,
    }
}

impl SettingsState {
    pub fn handle_key(&mut self, key: KeyEvent, item_count: usize) -> Option<SettingsAction> {
        match key.code {
            KeyCode::Left => {
                self.section = self.section.step(-1);
                self.selected = 0;
                None
            }
            KeyCode::Right => {
                self.section = self.section.step(1);
                self.selected = 0;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = step_selection(self.selected, item_count, -1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = step_selection(self.selected, item_count, 1);
                None
            }
            KeyCode::Enter => Some(SettingsAction::Activate),
            KeyCode::Char(' ') => Some(SettingsAction::Toggle),
            KeyCode::Char('a') => Some(SettingsAction::Add),
            KeyCode::Char('d') | KeyCode::Delete => Some(SettingsAction::Remove),
            KeyCode::Char('s') => Some(SettingsAction::Save),
            KeyCode::Char('r') => Some(SettingsAction::Reload),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(SettingsAction::PriorityUp),
            KeyCode::Char('-') => Some(SettingsAction::PriorityDown),
            KeyCode::Char('c') => Some(SettingsAction::Connect),
            _ => None,
        }
    }

    pub fn clamp(&mut self, item_count: usize) {
        self.selected = step_selection(self.selected, item_count, 0);
    }
}

fn dirty_marker(dirty: bool) -> &'static str {
    if dirty {
        " (unsaved)"
    } else {
        ""
    }
}

fn hint(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray),
    ))
}

fn flag(exists: bool) -> Span<'static> {
    if exists {
        Span::styled("● present", Style::default().fg(Color::Green))
    } else {
        Span::styled("○ missing", Style::default().fg(Color::Gray))
    }
}

pub fn render(frame: &mut Frame, area: Rect, model: &AppModel) {
    let state = &model.settings;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(5)])
        .split(area);

    let tabs = Tabs::new(
        SettingsSection::iter()
            .map(|s| Line::from(s.to_string()))
            .collect::<Vec<_>>(),
    )
    .select(state.section.index())
    .style(Style::default().fg(Color::Gray))
    .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[0]);

    let body = chunks[1];
    match state.section {
        SettingsSection::Account => render_account(frame, body, model),
        SettingsSection::Newsletters => render_newsletters(frame, body, model),
        SettingsSection::Keywords => render_keywords(frame, body, model),
        SettingsSection::Preferences => render_preferences(frame, body, model),
        SettingsSection::Pipeline => render_pipeline(frame, body, model),
        SettingsSection::WhatsApp => render_whatsapp(frame, body, model),
    }
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    title: String,
    items: Vec<ListItem>,
    selected: usize,
) {
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");
    let mut list_state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_account(frame: &mut Frame, area: Rect, model: &AppModel) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let items = ACCOUNT_ITEMS
        .iter()
        .map(|item| match item {
            AccountItem::Upload(kind) => ListItem::new(format!("Upload {kind}")),
            AccountItem::DeleteCredentials => ListItem::new(Span::styled(
                "Delete Gmail credentials",
                Style::default().fg(Color::Red),
            )),
        })
        .collect();
    render_list(
        frame,
        chunks[0],
        " Account ".to_string(),
        items,
        model.settings.selected,
    );

    let mut lines = vec![Line::from(vec![
        Span::raw("Gmail: "),
        if model.gmail_connected {
            Span::styled("Connected", Style::default().fg(Color::Green))
        } else {
            Span::styled("Not connected", Style::default().fg(Color::Yellow))
        },
    ])];
    lines.push(Line::from(""));
    match &model.secrets {
        Some(secrets) => {
            for (name, entry) in secrets.entries() {
                lines.push(Line::from(vec![Span::raw(format!("{name:<20}")), flag(entry.exists)]));
            }
        }
        None => lines.push(hint("Secret status not loaded yet.")),
    }
    lines.push(Line::from(""));
    lines.push(hint("Enter: upload from a file path or delete"));
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(" Credentials ").borders(Borders::ALL)),
        chunks[1],
    );
}

fn render_newsletters(frame: &mut Frame, area: Rect, model: &AppModel) {
    let title = format!(
        " Newsletters{} ",
        dirty_marker(model.newsletters_dirty)
    );
    if !model.gmail_connected {
        frame.render_widget(
            Paragraph::new(vec![
                Line::from("Connect Gmail in the Account section to choose newsletters."),
                Line::from(""),
                hint("Upload both the Google credentials and token files."),
            ])
            .wrap(Wrap { trim: true })
            .block(Block::default().title(title).borders(Borders::ALL)),
            area,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let items = model
        .newsletters
        .iter()
        .map(|n| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<24} ", n.sender)),
                Span::styled(format!("{:<32}", n.email), Style::default().fg(Color::Gray)),
                Span::styled(format!(" P: {}", n.priority), Style::default().fg(Color::Blue)),
            ]))
        })
        .collect();
    render_list(frame, chunks[0], title, items, model.settings.selected);
    frame.render_widget(
        Paragraph::new(hint("a add · d remove · +/- priority · s save")),
        chunks[1],
    );
}

fn render_keywords(frame: &mut Frame, area: Rect, model: &AppModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let items = model
        .keywords
        .iter()
        .map(|k| ListItem::new(k.keyword.clone()))
        .collect();
    render_list(
        frame,
        chunks[0],
        format!(" Priority Keywords{} ", dirty_marker(model.keywords_dirty)),
        items,
        model.settings.selected,
    );
    frame.render_widget(
        Paragraph::new(hint("Stories mentioning these rank higher · a add · d remove · s save")),
        chunks[1],
    );
}

fn render_preferences(frame: &mut Frame, area: Rect, model: &AppModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let prefs = &model.preferences;
    let items = PREFERENCE_ITEMS
        .iter()
        .map(|item| {
            let (label, value) = match item {
                PreferenceItem::Frequency => ("Frequency", prefs.frequency.to_string()),
                PreferenceItem::Time => ("Time", prefs.time.clone()),
                PreferenceItem::Notifications => (
                    "Notifications",
                    if prefs.notifications { "on" } else { "off" }.to_string(),
                ),
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{label:<16}")),
                Span::styled(value, Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();
    render_list(
        frame,
        chunks[0],
        format!(" Summary Preferences{} ", dirty_marker(model.preferences_dirty)),
        items,
        model.settings.selected,
    );
    frame.render_widget(
        Paragraph::new(hint("Enter/Space change · s save")),
        chunks[1],
    );
}

fn render_pipeline(frame: &mut Frame, area: Rect, model: &AppModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let items = PipelineConfig::EDITABLE_KEYS
        .iter()
        .map(|key| {
            let value = model.pipeline_config.get(key).unwrap_or("");
            let value = if value.is_empty() {
                Span::styled("(default)", Style::default().fg(Color::DarkGray))
            } else {
                Span::styled(value.to_string(), Style::default().fg(Color::Cyan))
            };
            ListItem::new(Line::from(vec![Span::raw(format!("{key:<22}")), value]))
        })
        .collect();
    render_list(
        frame,
        chunks[0],
        format!(" Pipeline Configuration{} ", dirty_marker(model.pipeline_dirty)),
        items,
        model.settings.selected,
    );
    frame.render_widget(
        Paragraph::new(hint("Enter edit · s save · r reload")),
        chunks[1],
    );
}

fn render_whatsapp(frame: &mut Frame, area: Rect, model: &AppModel) {
    let phone = model
        .pipeline_config
        .whatsapp_phone()
        .unwrap_or("not set (Pipeline section)");
    let mut lines = vec![Line::from(vec![Span::raw("Phone: "), Span::raw(phone.to_string())])];
    lines.push(Line::from(""));
    lines.push(match &model.whatsapp {
        Some(status) if status.connected => Line::from(Span::styled(
            "● Connected",
            Style::default().fg(Color::Green),
        )),
        Some(status) if status.pairing_pending() => Line::from(Span::styled(
            "◐ Waiting for pairing",
            Style::default().fg(Color::Yellow),
        )),
        Some(_) => Line::from(Span::styled("○ Not connected", Style::default().fg(Color::Gray))),
        None => hint("Checking status..."),
    });
    if model.whatsapp.as_ref().is_some_and(|s| s.pairing_pending()) {
        lines.push(Line::from(""));
        lines.push(Line::from(
            "Scan the pairing QR code from WhatsApp > Linked devices.",
        ));
        lines.push(hint("Save it with: nokast whatsapp status --qr-out qr.png"));
    }
    lines.push(Line::from(""));
    lines.push(hint("c connect · status refreshes every few seconds"));
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(" WhatsApp ").borders(Borders::ALL)),
        area,
    );
}
