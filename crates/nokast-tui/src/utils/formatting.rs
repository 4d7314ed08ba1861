//! Text and data formatting utilities

use chrono::{DateTime, Utc};
use nokast_common::types::Story;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Length of the story preview on the Home screen, in chars.
pub const PREVIEW_CHARS: usize = 200;

/// Format a timestamp for display in the UI
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%H:%M:%S").to_string()
}

/// Truncate text to at most `max_chars` chars, adding an ellipsis if needed
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else if max_chars <= 3 {
        "...".to_string()
    } else {
        let kept: String = text.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    }
}

/// First [`PREVIEW_CHARS`] chars of `text` followed by "...".
pub fn preview(text: &str) -> String {
    let kept: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{kept}...")
}

/// Pluralize a noun based on count
pub fn pluralize(count: usize, singular: &str) -> String {
    if count == 1 {
        return format!("{count} {singular}");
    }
    match singular.strip_suffix('y') {
        Some(stem) if !stem.ends_with(['a', 'e', 'o', 'u']) => format!("{count} {stem}ies"),
        _ => format!("{count} {singular}s"),
    }
}

pub fn spinner_frame(frame: usize) -> &'static str {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

pub fn format_score(score: f64) -> String {
    format!("{score:.1}")
}

/// The current digest as markdown, for export.
pub fn digest_markdown(stories: &[Story]) -> String {
    let mut out = String::from("# Nokast digest\n");
    for story in stories {
        out.push_str(&format!("\n## {}\n\n{}\n", story.title.trim(), story.summary.trim()));

        let mut meta = vec![format!("score {}", format_score(story.score))];
        if let Some(date) = story.source_date() {
            meta.push(date.to_string());
        }
        if let Some(sender) = story.sender_email.as_deref().filter(|s| !s.is_empty()) {
            meta.push(sender.to_string());
        }
        out.push_str(&format!("\n_{}_\n", meta.join(" · ")));

        for (label, post) in story.social_posts() {
            out.push_str(&format!("\n**{label}:** {post}\n"));
        }
        if let Some(action) = story
            .action_suggestion
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
        {
            out.push_str(&format!("\n> {action}\n"));
        }
    }
    out
}
