//! Command handlers. Each prints its result to stdout and returns an error for
//! anything the backend did not accept.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use base64::Engine;
use nokast_common::models::{reconcile, runtime_name, RECOMMENDED_MODELS};
use nokast_common::types::*;
use nokast_common::{ApiClient, ClientConfig};
use rustyline::DefaultEditor;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::cli::*;
use crate::{completions, display, interactive, oneshot};

pub async fn execute(client: &ApiClient, config: &ClientConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Status => status(client).await,
        Commands::Run { fetch_limit, wait } => {
            run(client, fetch_limit, wait, config.sync.poll_interval()).await
        }
        Commands::Stories { limit, json } => stories(client, limit, json).await,
        Commands::Newsletters(cmd) => newsletters(client, cmd).await,
        Commands::Keywords(cmd) => keywords(client, cmd).await,
        Commands::Models(cmd) => models(client, cmd).await,
        Commands::Config(cmd) => pipeline_config(client, cmd).await,
        Commands::Credentials(cmd) => credentials(client, cmd).await,
        Commands::WhatsApp(cmd) => whatsapp(client, cmd).await,
        Commands::Ask { prompt } => oneshot::ask(client, &prompt.join(" ")).await,
        Commands::Chat => interactive::run(client).await,
        Commands::Completions { shell } => {
            completions::generate(shell);
            Ok(())
        }
    }
}

async fn status(client: &ApiClient) -> Result<()> {
    let (pipeline, runtime) = tokio::join!(client.pipeline_status(), client.runtime_status());
    print!("{}", display::status(&pipeline?, &runtime?));
    Ok(())
}

async fn run(
    client: &ApiClient,
    fetch_limit: Option<u32>,
    wait: bool,
    period: Duration,
) -> Result<()> {
    let newsletters = client.newsletters().await?;
    if newsletters.is_empty() {
        bail!("No newsletters saved. Add one with `nokast newsletters add <SENDER> <EMAIL>`.");
    }

    let request = RunRequest::for_newsletters(&newsletters, fetch_limit);
    let message = client.start_run(&request).await?;
    info!(%message, newsletters = newsletters.len(), "Generation started");
    println!("Generation started for {} newsletter(s).", newsletters.len());

    if !wait {
        return Ok(());
    }

    println!("Waiting for the pipeline to finish (Ctrl+C to stop waiting)...");
    let finished = tokio::select! {
        status = wait_for_completion(client, period) => status,
        _ = tokio::signal::ctrl_c() => {
            println!("Stopped waiting; the pipeline keeps running.");
            return Ok(());
        }
    };

    match finished.outcome() {
        RunOutcome::Failed(reason) => bail!("Pipeline failed: {reason}"),
        RunOutcome::PipelineUnavailable => bail!("The backend pipeline is not available"),
        outcome => {
            let stories = client.stories().await?;
            println!(
                "Pipeline {}. {} stories available.",
                display::run_outcome(&outcome),
                stories.len()
            );
        }
    }
    Ok(())
}

/// Polls pipeline status every `period`, starting one period from now, until
/// the generation started by this process is over. Transport failures are
/// retried on the next tick.
#[instrument(skip(client), fields(period_ms = period.as_millis() as u64))]
pub async fn wait_for_completion(client: &ApiClient, period: Duration) -> PipelineStatus {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match client.pipeline_status().await {
            Ok(status) if status.completes_generation(true) => return status,
            Ok(_) => debug!("Pipeline still running"),
            Err(e) => warn!(error = %e, "Status poll failed"),
        }
    }
}

async fn stories(client: &ApiClient, limit: Option<usize>, json: bool) -> Result<()> {
    let mut stories = client.stories().await?;
    if json {
        if let Some(limit) = limit {
            stories.truncate(limit);
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&stories).context("Failed to encode stories")?
        );
    } else {
        print!("{}", display::stories(&stories, limit));
    }
    Ok(())
}

async fn newsletters(client: &ApiClient, command: NewslettersCommand) -> Result<()> {
    let mut list = client.newsletters().await?;
    match command {
        NewslettersCommand::List => {
            print!("{}", display::newsletters(&list));
            return Ok(());
        }
        NewslettersCommand::Add {
            sender,
            email,
            priority,
        } => {
            let newsletter = Newsletter::new(&sender, &email, priority)?;
            if find_newsletter(&list, &newsletter.email).is_some() {
                bail!("{} is already saved", newsletter.email);
            }
            list.push(newsletter);
        }
        NewslettersCommand::Remove { email } => {
            let index = find_newsletter(&list, &email)
                .with_context(|| format!("No newsletter with email {email}"))?;
            list.remove(index);
        }
        NewslettersCommand::Priority { email, priority } => {
            let index = find_newsletter(&list, &email)
                .with_context(|| format!("No newsletter with email {email}"))?;
            list[index].set_priority(priority);
        }
    }
    let count = client.save_newsletters(&list).await?;
    println!("Saved {count} newsletter(s).");
    Ok(())
}

fn find_newsletter(list: &[Newsletter], email: &str) -> Option<usize> {
    let email = email.trim();
    list.iter().position(|n| n.email.eq_ignore_ascii_case(email))
}

async fn keywords(client: &ApiClient, command: KeywordsCommand) -> Result<()> {
    let mut list = client.priority_keywords().await?;
    match command {
        KeywordsCommand::List => {
            print!("{}", display::keywords(&list));
            return Ok(());
        }
        KeywordsCommand::Add { keywords } => {
            list.extend(keywords.iter().map(|k| PriorityKeyword::new(k)));
        }
        KeywordsCommand::Remove { keywords } => {
            let before = list.len();
            list.retain(|k| {
                !keywords
                    .iter()
                    .any(|r| r.trim().eq_ignore_ascii_case(&k.keyword))
            });
            if list.len() == before {
                bail!("None of the given keywords are saved");
            }
        }
    }
    let count = client
        .save_priority_keywords(&PriorityKeyword::normalize(list))
        .await?;
    println!("Saved {count} keyword(s).");
    Ok(())
}

async fn models(client: &ApiClient, command: ModelsCommand) -> Result<()> {
    let (inventory, runtime) = tokio::join!(client.models(), client.runtime_status());
    let downloaded = inventory?;
    let running = runtime.map(|r| r.running_models).unwrap_or_else(|e| {
        warn!(error = %e, "Runtime status unavailable");
        Vec::new()
    });
    let listed = reconcile(RECOMMENDED_MODELS, &downloaded, &running);

    let (action, name) = match command {
        ModelsCommand::List => {
            print!("{}", display::models(&listed));
            return Ok(());
        }
        ModelsCommand::Pull { name } => (ModelAction::Pull, name),
        ModelsCommand::Remove { name } => (ModelAction::Remove, name),
        ModelsCommand::Activate { name } => (ModelAction::Activate, name),
        ModelsCommand::Deactivate { name } => (ModelAction::Deactivate, name),
    };

    let target = resolve_model_name(&listed, &downloaded, &name);
    println!("Requesting {action} of {target}...");
    let message = client.model_action(action, &target).await?;
    if message.is_empty() {
        println!("Done.");
    } else {
        println!("{message}");
    }
    Ok(())
}

/// The runtime's tag for `name` when a listed model matches it exactly.
pub fn resolve_model_name(listed: &[LocalModel], downloaded: &[DownloadedModel], name: &str) -> String {
    listed
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(name.trim()))
        .map(|m| runtime_name(m, downloaded).to_string())
        .unwrap_or_else(|| name.trim().to_string())
}

async fn pipeline_config(client: &ApiClient, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Get { keys } => {
            let config = client.pipeline_config().await?;
            print!("{}", display::config(&config, &keys));
        }
        ConfigCommand::Set { assignments } => {
            let mut update = PipelineConfig::default();
            for assignment in &assignments {
                let (key, value) = parse_assignment(assignment)?;
                update.set(&key, value);
            }
            client.save_pipeline_config(&update).await?;
            println!("Updated {} key(s).", update.0.len());
        }
    }
    Ok(())
}

/// Splits and validates one `KEY=VALUE` argument.
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("Missing key in '{raw}'");
    }
    let value = PipelineConfig::validate_value(key, value)?;
    Ok((key.to_string(), value))
}

async fn credentials(client: &ApiClient, command: CredentialsCommand) -> Result<()> {
    match command {
        CredentialsCommand::Status => {
            print!("{}", display::secrets(&client.secrets_status().await?));
            Ok(())
        }
        CredentialsCommand::UploadCredentials { path } => {
            upload(client, CredentialKind::GoogleCredentials, &path).await
        }
        CredentialsCommand::UploadToken { path } => {
            upload(client, CredentialKind::GoogleToken, &path).await
        }
        CredentialsCommand::UploadEnv { path } => upload(client, CredentialKind::EnvFile, &path).await,
        CredentialsCommand::Delete { yes } => {
            if !yes && !confirm("Delete the stored Gmail credentials and token? [y/N] ")? {
                println!("Cancelled.");
                return Ok(());
            }
            let removal = client.delete_credentials().await?;
            print!("{}", display::removal(&removal));
            if removal.errors.is_empty() {
                Ok(())
            } else {
                bail!("Some files could not be removed")
            }
        }
    }
}

async fn upload(client: &ApiClient, kind: CredentialKind, path: &Path) -> Result<()> {
    let stored = client.upload_credential(kind, path).await?;
    println!("Uploaded {kind} to {stored}");
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    let mut editor = DefaultEditor::new().context("Failed to open terminal prompt")?;
    match editor.readline(prompt) {
        Ok(answer) => Ok(matches!(answer.trim(), "y" | "Y" | "yes")),
        Err(_) => Ok(false),
    }
}

async fn whatsapp(client: &ApiClient, command: WhatsAppCommand) -> Result<()> {
    match command {
        WhatsAppCommand::Status { qr_out } => {
            let status = client.whatsapp_status().await?;
            if status.connected {
                println!("WhatsApp: connected");
            } else if status.pairing_pending() {
                println!("WhatsApp: waiting for the pairing QR code to be scanned");
            } else {
                println!("WhatsApp: not connected (run `nokast whatsapp connect`)");
            }

            if let Some(path) = qr_out {
                let qr = status
                    .qr
                    .as_deref()
                    .filter(|_| status.pairing_pending())
                    .context("No pairing QR code is available")?;
                let bytes = decode_qr(qr)?;
                std::fs::write(&path, &bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("QR code written to {}", path.display());
            }
        }
        WhatsAppCommand::Connect => {
            client.whatsapp_connect().await?;
            println!("Pairing started. Run `nokast whatsapp status --qr-out qr.png` for the QR code.");
        }
    }
    Ok(())
}

/// PNG bytes of a base64 QR code, with or without a `data:` URL prefix.
pub fn decode_qr(qr: &str) -> Result<Vec<u8>> {
    let payload = match qr.split_once("base64,") {
        Some((_, data)) => data,
        None => qr,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .context("QR code is not valid base64")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment_validates_known_keys() {
        assert_eq!(
            parse_assignment("FETCH_LIMIT= 25").unwrap(),
            ("FETCH_LIMIT".to_string(), "25".to_string())
        );
        assert!(parse_assignment("FETCH_LIMIT=0").is_err());
        assert!(parse_assignment("SIMILARITY_THRESHOLD=1.5").is_err());
        assert!(parse_assignment("TOP_N").is_err());
        assert!(parse_assignment("=5").is_err());
        assert_eq!(parse_assignment("CUSTOM=a=b").unwrap().1, "a=b");
    }

    #[test]
    fn test_decode_qr_accepts_data_url() {
        assert_eq!(decode_qr("aGk=").unwrap(), b"hi");
        assert_eq!(decode_qr("data:image/png;base64,aGk=").unwrap(), b"hi");
        assert!(decode_qr("not base64!").is_err());
    }

    #[test]
    fn test_resolve_model_name_prefers_runtime_tag() {
        let downloaded = vec![DownloadedModel {
            name: "llama3.2:1b-q4".to_string(),
            size: None,
        }];
        let listed = reconcile(RECOMMENDED_MODELS, &downloaded, &[]);
        assert_eq!(resolve_model_name(&listed, &downloaded, "llama3.2:1b"), "llama3.2:1b-q4");
        assert_eq!(resolve_model_name(&listed, &downloaded, "gemma:2b"), "gemma:2b");
    }
}
