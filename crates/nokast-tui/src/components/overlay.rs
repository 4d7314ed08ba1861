//! Modal overlays: help, alerts, confirmations and input forms.
//!
//! Overlays stack; only the top one receives keys. An alert raised while a
//! form is open sits on top of it, so dismissing the alert returns to the form
//! with its input intact.

use crossterm::event::{KeyCode, KeyEvent};
use nokast_common::types::CredentialKind;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::components::centered_rect;
use crate::message::StatusSeverity;
use crate::utils::LineEditor;

#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    Help,
    Alert {
        title: String,
        message: String,
        severity: StatusSeverity,
    },
    Confirm {
        message: String,
        action: ConfirmAction,
    },
    Form(FormState),
}

impl Overlay {
    pub fn alert(title: impl Into<String>, message: impl Into<String>) -> Self {
        Overlay::Alert {
            title: title.into(),
            message: message.into(),
            severity: StatusSeverity::Error,
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Overlay::Alert {
            title: title.into(),
            message: message.into(),
            severity: StatusSeverity::Warning,
        }
    }
}

/// Destructive actions that need a yes/no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteCredentials,
    RemoveModel(String),
}

/// What a submitted form is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPurpose {
    UploadCredential(CredentialKind),
    AddNewsletter,
    AddKeyword,
    SummaryTime,
    PipelineValue(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub label: String,
    pub editor: LineEditor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub title: String,
    pub purpose: FormPurpose,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl FormState {
    pub fn new(title: &str, purpose: FormPurpose, fields: &[(&str, &str)]) -> Self {
        Self {
            title: title.to_string(),
            purpose,
            fields: fields
                .iter()
                .map(|(label, initial)| FormField {
                    label: label.to_string(),
                    editor: LineEditor::with_text(initial),
                })
                .collect(),
            focus: 0,
        }
    }

    pub fn values(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.editor.text().trim().to_string())
            .collect()
    }

    fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    fn focus_previous(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayAction {
    None,
    Close,
    Submit {
        purpose: FormPurpose,
        values: Vec<String>,
    },
    Confirm(ConfirmAction),
}

pub fn handle_key(overlay: &mut Overlay, key: KeyEvent) -> OverlayAction {
    match overlay {
        Overlay::Help => OverlayAction::Close,
        Overlay::Alert { .. } => match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => OverlayAction::Close,
            _ => OverlayAction::None,
        },
        Overlay::Confirm { action, .. } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                OverlayAction::Confirm(action.clone())
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => OverlayAction::Close,
            _ => OverlayAction::None,
        },
        Overlay::Form(form) => match key.code {
            KeyCode::Esc => OverlayAction::Close,
            KeyCode::Enter => OverlayAction::Submit {
                purpose: form.purpose,
                values: form.values(),
            },
            KeyCode::Tab | KeyCode::Down => {
                form.focus_next();
                OverlayAction::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.focus_previous();
                OverlayAction::None
            }
            _ => {
                if let Some(field) = form.fields.get_mut(form.focus) {
                    field.editor.handle_key(key);
                }
                OverlayAction::None
            }
        },
    }
}

pub fn render(frame: &mut Frame, area: Rect, overlay: &Overlay) {
    match overlay {
        Overlay::Help => render_help(frame, area),
        Overlay::Alert {
            title,
            message,
            severity,
        } => render_alert(frame, area, title, message, *severity),
        Overlay::Confirm { message, .. } => render_confirm(frame, area, message),
        Overlay::Form(form) => render_form(frame, area, form),
    }
}

fn render_help(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(area, 56, 22);
    frame.render_widget(Clear, popup);

    let key = |k: &str, what: &str| {
        Line::from(vec![
            Span::styled(format!(" {k:<12}"), Style::default().fg(Color::Cyan)),
            Span::raw(what.to_string()),
        ])
    };

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        key("1-5", "Jump to screen"),
        key("Tab/S-Tab", "Next / previous screen"),
        key("↑/↓ j/k", "Move selection"),
        key("←/→", "Settings section"),
        Line::from(""),
        Line::from(Span::styled(
            " Actions",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        key("g", "Generate digest"),
        key("h", "AI helper (needs a loaded model)"),
        key("l", "Load model (Dashboard)"),
        key("e", "Export digest to clipboard"),
        key("a / d", "Add / remove (Settings)"),
        key("s", "Save section (Settings)"),
        key("?", "Toggle this help"),
        key("q / Ctrl+C", "Quit"),
        Line::from(""),
        Line::from(" Press any key to close"),
    ];

    let widget = Paragraph::new(help_text).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(widget, popup);
}

fn render_alert(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    message: &str,
    severity: StatusSeverity,
) {
    let popup = centered_rect(area, 60, 9);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from(""),
        Line::from(format!(" {} {}", severity.symbol(), message)),
        Line::from(""),
        Line::from(Span::styled(
            " Enter to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(format!(" {title} "))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(severity.color())),
        );
    frame.render_widget(widget, popup);
}

fn render_confirm(frame: &mut Frame, area: Rect, message: &str) {
    let popup = centered_rect(area, 56, 7);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from(""),
        Line::from(format!(" {message}")),
        Line::from(""),
        Line::from(Span::styled(" [y] yes   [n] no", Style::default().fg(Color::Yellow))),
    ];
    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Confirm ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(widget, popup);
}

fn render_form(frame: &mut Frame, area: Rect, form: &FormState) {
    let height = (form.fields.len() as u16) * 2 + 5;
    let popup = centered_rect(area, 60, height);
    frame.render_widget(Clear, popup);

    let mut lines = vec![Line::from("")];
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(format!(" {}", field.label), label_style)));
        lines.push(editor_line(&field.editor, focused));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Enter submit · Tab next field · Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" {} ", form.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(widget, popup);
}

/// Editor contents with a block cursor when focused.
pub fn editor_line(editor: &LineEditor, focused: bool) -> Line<'static> {
    let text = editor.text();
    if !focused {
        return Line::from(format!(" > {text}"));
    }
    let chars: Vec<char> = text.chars().collect();
    let cursor = editor.cursor().min(chars.len());
    let before: String = chars[..cursor].iter().collect();
    let at: String = chars.get(cursor).map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
    let after: String = chars.get(cursor + 1..).map(|rest| rest.iter().collect()).unwrap_or_default();
    Line::from(vec![
        Span::raw(format!(" > {before}")),
        Span::styled(at, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(after),
    ])
}
