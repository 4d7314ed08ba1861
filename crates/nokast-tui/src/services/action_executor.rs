//! Executes request effects against the backend and reports each result back
//! as an application message.

use std::future::Future;

use nokast_common::ApiClient;
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use crate::message::{AppMsg, Effect, Failure, Outcome};

#[derive(Clone)]
pub struct ActionExecutor {
    client: ApiClient,
    sender: mpsc::UnboundedSender<AppMsg>,
}

impl ActionExecutor {
    pub fn new(client: ApiClient, sender: mpsc::UnboundedSender<AppMsg>) -> Self {
        Self { client, sender }
    }

    /// Runs `request` in its own task and sends `reply(outcome)` when done.
    fn spawn<T, Fut>(
        &self,
        request: impl FnOnce(ApiClient) -> Fut + Send + 'static,
        reply: impl FnOnce(Outcome<T>) -> AppMsg + Send + 'static,
    ) where
        T: Send + 'static,
        Fut: Future<Output = nokast_common::Result<T>> + Send + 'static,
    {
        let client = self.client.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let outcome = request(client).await.map_err(Failure::from);
            if sender.send(reply(outcome)).is_err() {
                debug!("Application gone, result dropped");
            }
        });
    }

    #[instrument(level = "debug", skip_all)]
    pub fn execute(&self, effect: Effect) {
        match effect {
            Effect::StartGeneration(request) => self.spawn(
                move |c| async move { c.start_run(&request).await },
                AppMsg::GenerationRequested,
            ),
            Effect::LoadModels => {
                let client = self.client.clone();
                let sender = self.sender.clone();
                tokio::spawn(async move {
                    let (inventory, runtime) = tokio::join!(client.models(), client.runtime_status());
                    let loaded = AppMsg::ModelsLoaded {
                        inventory: inventory.map_err(Failure::from),
                        runtime: runtime.map_err(Failure::from),
                    };
                    if sender.send(loaded).is_err() {
                        debug!("Application gone, result dropped");
                    }
                });
            }
            Effect::ApplyModelAction { action, model } => {
                let name = model.clone();
                self.spawn(
                    move |c| async move { c.model_action(action, &name).await },
                    move |outcome| AppMsg::ModelActionFinished {
                        action,
                        model,
                        outcome,
                    },
                )
            }
            Effect::AskHelper { summary, prompt } => self.spawn(
                move |c| async move { c.ask_helper(&summary, &prompt).await },
                AppMsg::HelperReplied,
            ),
            Effect::SaveNewsletters(newsletters) => self.spawn(
                move |c| async move { c.save_newsletters(&newsletters).await },
                AppMsg::NewslettersSaved,
            ),
            Effect::SaveKeywords(keywords) => self.spawn(
                move |c| async move { c.save_priority_keywords(&keywords).await },
                AppMsg::KeywordsSaved,
            ),
            Effect::UploadCredential { kind, path } => self.spawn(
                move |c| async move { c.upload_credential(kind, &path).await },
                move |outcome| AppMsg::CredentialUploaded { kind, outcome },
            ),
            Effect::DeleteCredentials => self.spawn(
                |c| async move { c.delete_credentials().await },
                AppMsg::CredentialsDeleted,
            ),
            Effect::ReloadSecrets => self.spawn(
                |c| async move { c.secrets_status().await },
                AppMsg::SecretsLoaded,
            ),
            Effect::LoadPipelineConfig => self.spawn(
                |c| async move { c.pipeline_config().await },
                AppMsg::PipelineConfigLoaded,
            ),
            Effect::SavePipelineConfig(config) => self.spawn(
                move |c| async move { c.save_pipeline_config(&config).await },
                AppMsg::PipelineConfigSaved,
            ),
            Effect::SavePreferences(config) => self.spawn(
                move |c| async move { c.save_pipeline_config(&config).await },
                AppMsg::PreferencesSaved,
            ),
            Effect::ConnectWhatsApp => self.spawn(
                |c| async move { c.whatsapp_connect().await },
                AppMsg::WhatsAppConnectRequested,
            ),
            Effect::RefreshStories(_)
            | Effect::StartWhatsAppWatch
            | Effect::StopWhatsAppWatch
            | Effect::CopyToClipboard(_) => {
                warn!(?effect, "Effect is not a backend request");
            }
        }
    }
}
