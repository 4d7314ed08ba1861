//! Plain-text rendering of backend data for the terminal.

use std::fmt::Write;

use nokast_common::types::*;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub fn run_outcome(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::NeverRan => "never ran".to_string(),
        RunOutcome::Succeeded => "succeeded".to_string(),
        RunOutcome::PipelineUnavailable => "pipeline not available".to_string(),
        RunOutcome::Failed(reason) => format!("failed: {reason}"),
    }
}

pub fn status(pipeline: &PipelineStatus, runtime: &RuntimeStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Pipeline available: {}", yes_no(pipeline.pipeline_available));
    let _ = writeln!(out, "Run in progress:    {}", yes_no(pipeline.is_running()));
    let _ = writeln!(out, "Last run:           {}", run_outcome(&pipeline.outcome()));
    let _ = writeln!(out, "Model runtime:      {}", if runtime.server_up { "up" } else { "down" });
    let loaded = if runtime.running_models.is_empty() {
        "none".to_string()
    } else {
        runtime.running_models.join(", ")
    };
    let _ = writeln!(out, "Loaded models:      {loaded}");
    out
}

pub fn stories(stories: &[Story], limit: Option<usize>) -> String {
    if stories.is_empty() {
        return "No stories yet. Run `nokast run --wait` to generate a summary.\n".to_string();
    }
    let shown = limit.unwrap_or(stories.len()).min(stories.len());
    let mut out = String::new();
    for (i, story) in stories.iter().take(shown).enumerate() {
        let _ = writeln!(out, "{}. {} [{:.1}]", i + 1, story.title.trim(), story.score);
        let mut meta = Vec::new();
        if let Some(date) = story.source_date() {
            meta.push(date.to_string());
        }
        if let Some(sender) = story.sender_email.as_deref().filter(|s| !s.is_empty()) {
            meta.push(sender.to_string());
        }
        if !meta.is_empty() {
            let _ = writeln!(out, "   {}", meta.join(" | "));
        }
        let _ = writeln!(out, "   {}", story.summary.trim());
        for (label, post) in story.social_posts() {
            let _ = writeln!(out, "   {label}: {post}");
        }
        out.push('\n');
    }
    if shown < stories.len() {
        let _ = writeln!(out, "({} more)", stories.len() - shown);
    }
    out
}

pub fn newsletters(newsletters: &[Newsletter]) -> String {
    if newsletters.is_empty() {
        return "No newsletters saved.\n".to_string();
    }
    let width = newsletters
        .iter()
        .map(|n| n.sender.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for n in newsletters {
        let _ = writeln!(out, "{:>2}  {:<width$}  {}", n.priority, n.sender, n.email);
    }
    out
}

pub fn keywords(keywords: &[PriorityKeyword]) -> String {
    if keywords.is_empty() {
        return "No priority keywords.\n".to_string();
    }
    keywords
        .iter()
        .map(|k| format!("{} ({})\n", k.keyword, k.score))
        .collect()
}

pub fn models(models: &[LocalModel]) -> String {
    let width = models
        .iter()
        .map(|m| m.name.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for m in models {
        let marker = if m.recommended { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {:<width$}  {:>8}  {}",
            m.name,
            m.size,
            m.status
        );
    }
    out.push_str("* recommended\n");
    out
}

pub fn secrets(secrets: &SecretsStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Gmail connected: {}", yes_no(secrets.gmail_connected()));
    for (name, entry) in secrets.entries() {
        let state = if entry.exists { "present" } else { "missing" };
        match entry.path.as_deref() {
            Some(path) => {
                let _ = writeln!(out, "  {name:<18} {state:<8} {path}");
            }
            None => {
                let _ = writeln!(out, "  {name:<18} {state}");
            }
        }
    }
    out
}

/// `KEY=value` lines; with `keys` given, only those keys, in that order.
pub fn config(config: &PipelineConfig, keys: &[String]) -> String {
    if keys.is_empty() {
        return config.0.iter().map(|(k, v)| format!("{k}={v}\n")).collect();
    }
    keys.iter()
        .map(|k| format!("{k}={}\n", config.get(k).unwrap_or("")))
        .collect()
}

pub fn removal(removal: &CredentialsRemoval) -> String {
    let mut out = String::new();
    if removal.removed.is_empty() {
        out.push_str("Nothing to remove.\n");
    }
    for file in &removal.removed {
        let _ = writeln!(out, "Removed {file}");
    }
    for error in &removal.errors {
        let _ = writeln!(out, "Could not remove {}: {}", error.file, error.error);
    }
    out
}
