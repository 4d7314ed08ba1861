use anyhow::{Context, Result};
use nokast_common::helper::{summary_context, Transcript};
use nokast_common::ApiClient;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

use crate::oneshot::ensure_model_loaded;

#[derive(Debug, PartialEq, Eq)]
pub enum ChatInput {
    Exit,
    /// Forget the conversation so far.
    Clear,
    /// Reload the stories used as context.
    Refresh,
    Prompt(String),
    Blank,
}

pub fn parse_input(line: &str) -> ChatInput {
    match line.trim() {
        "" => ChatInput::Blank,
        "exit" | "quit" | "/exit" | "/quit" => ChatInput::Exit,
        "/clear" => ChatInput::Clear,
        "/refresh" => ChatInput::Refresh,
        prompt => ChatInput::Prompt(prompt.to_string()),
    }
}

pub async fn run(client: &ApiClient) -> Result<()> {
    ensure_model_loaded(client).await?;
    let mut summary = summary_context(&client.stories().await?);
    let mut transcript = Transcript::new();
    let mut rl = DefaultEditor::new().context("Failed to start line editor")?;

    println!("Nokast AI Helper - ask about the current digest");
    println!("Commands: /refresh reloads stories, /clear resets the chat, exit quits");

    loop {
        let line = match rl.readline("nokast> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };

        match parse_input(&line) {
            ChatInput::Blank => continue,
            ChatInput::Exit => break,
            ChatInput::Clear => {
                transcript.clear();
                println!("Chat cleared.");
            }
            ChatInput::Refresh => match client.stories().await {
                Ok(stories) => {
                    summary = summary_context(&stories);
                    println!("Loaded {} stories.", stories.len());
                }
                Err(e) => println!("Could not reload stories: {}", e.user_message()),
            },
            ChatInput::Prompt(prompt) => {
                let _ = rl.add_history_entry(prompt.as_str());
                let Some(prompt) = transcript.push_prompt(&prompt) else {
                    continue;
                };
                match client.ask_helper(&summary, &prompt).await {
                    Ok(reply) => transcript.push_reply(&reply),
                    Err(e) => {
                        warn!(error = %e, "Helper request failed");
                        transcript.push_failure();
                    }
                }
                if let Some(reply) = transcript.messages().last() {
                    println!("{}\n", reply.text);
                }
                debug!(messages = transcript.messages().len(), "Chat turn finished");
            }
        }
    }

    Ok(())
}
