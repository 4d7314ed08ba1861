use anyhow::{bail, Result};
use nokast_common::helper::summary_context;
use nokast_common::ApiClient;
use tracing::debug;

/// Fails when the backend reports no running model; the helper needs one.
pub async fn ensure_model_loaded(client: &ApiClient) -> Result<()> {
    let runtime = client.runtime_status().await?;
    if !runtime.running {
        bail!("No model is loaded. Start one with `nokast models activate <NAME>`.");
    }
    Ok(())
}

pub async fn ask(client: &ApiClient, prompt: &str) -> Result<()> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        bail!("The prompt is empty");
    }
    ensure_model_loaded(client).await?;

    let stories = client.stories().await?;
    debug!(stories = stories.len(), "Asking helper");
    let reply = client.ask_helper(&summary_context(&stories), prompt).await?;
    println!("{reply}");
    Ok(())
}
