//! Application update logic (Update in Elm architecture)
//!
//! [`update`] is the only writer of [`AppModel`]. It performs no I/O: anything
//! that talks to the backend or the clipboard is returned as an [`Effect`].

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use nokast_common::helper::summary_context;
use nokast_common::models::{reconcile, runtime_name, RECOMMENDED_MODELS};
use nokast_common::types::*;
use tracing::{debug, info, instrument, warn};

use crate::application::AppModel;
use crate::components::dashboard::DashboardAction;
use crate::components::helper::HelperAction;
use crate::components::home::{self, HomeAction};
use crate::components::model_management::ModelsAction;
use crate::components::overlay::{self, OverlayAction};
use crate::components::settings::{
    self, AccountItem, PreferenceItem, SettingsAction, ACCOUNT_ITEMS, PREFERENCE_ITEMS,
};
use crate::components::{ConfirmAction, FormPurpose, FormState, Overlay, SettingsSection};
use crate::message::{AppMsg, Effect, Failure, Outcome, Screen, SessionId, StatusSeverity, SyncEvent};
use crate::utils::{digest_markdown, pluralize};

pub const NO_NEWSLETTERS_WARNING: &str = "Please add some newsletters in Settings first.";
pub const HELPER_NEEDS_MODEL: &str = "Load a model on the Dashboard to enable the AI Helper";

/// Update function - handles all application messages and updates the model
#[instrument(level = "debug", skip_all, fields(
    msg_type = %format!("{:?}", msg).split(['(', ' ']).next().unwrap_or("Unknown"),
    screen = %model.screen,
))]
pub fn update(model: &mut AppModel, msg: AppMsg) -> Vec<Effect> {
    let mut effects = Vec::new();

    match msg {
        // ============== System Events ==============
        AppMsg::Quit => {
            info!("Application quit requested");
            model.should_quit = true;
        }

        AppMsg::Tick => model.tick(),

        AppMsg::Resize(width, height) => {
            debug!(width, height, "Terminal resized");
        }

        AppMsg::Key(key) => handle_key(model, key, &mut effects),

        // ============== Status Sync ==============
        AppMsg::SyncStarted(session) => {
            info!(%session, "Status sync started");
            model.sync_session = Some(session);
            // Summary preferences live in the backend config.
            effects.push(Effect::LoadPipelineConfig);
        }

        AppMsg::Synced { session, event } => {
            if model.sync_session == Some(session) {
                apply_sync_event(model, session, event, &mut effects);
            } else {
                debug!(%session, event = event.name(), "Dropping result from stale sync session");
            }
        }

        // ============== Generation ==============
        AppMsg::GenerationRequested(outcome) => match outcome {
            Ok(message) => {
                info!(%message, "Backend accepted generation request");
                model.generation_since = Some(Instant::now());
                model.set_status_message(
                    StatusSeverity::Info,
                    "Generating summary; the Dashboard updates when it is ready",
                );
            }
            Err(failure) if failure.transport => {
                // The poll decides when this generation is over.
                warn!(error = %failure.message, "Generation request did not reach the backend");
                model.generation_since = Some(Instant::now());
                model.set_status_message(StatusSeverity::Warning, failure.message);
            }
            Err(failure) => {
                model.generating = false;
                model.generation_since = None;
                report_failure(model, "Could not start generation", failure);
            }
        },

        // ============== Models ==============
        AppMsg::ModelsLoaded { inventory, runtime } => {
            model.models.loading = false;
            match runtime {
                Ok(status) => apply_runtime(model, status),
                Err(failure) => {
                    warn!(error = %failure.message, "Runtime status unavailable for model list");
                }
            }
            match inventory {
                Ok(downloaded) => {
                    debug!(count = downloaded.len(), "Model inventory loaded");
                    model.models.downloaded = downloaded;
                    model.models.error = None;
                }
                Err(failure) if failure.transport => {
                    warn!(error = %failure.message, "Model inventory unavailable");
                    model.set_status_message(StatusSeverity::Warning, failure.message);
                }
                Err(failure) => {
                    warn!(error = %failure.message, "Runtime refused to list models");
                    model.models.error = Some(failure.message);
                }
            }
            let running = model
                .runtime
                .as_ref()
                .map(|r| r.running_models.clone())
                .unwrap_or_default();
            model.models.models = reconcile(RECOMMENDED_MODELS, &model.models.downloaded, &running);
            model.models.selected = model.models.selected.min(model.models.models.len().saturating_sub(1));
        }

        AppMsg::ModelActionFinished {
            action,
            model: name,
            outcome,
        } => {
            model.models.pending = None;
            match outcome {
                Ok(_) => {
                    info!(%action, model = %name, "Model action finished");
                    model.set_status_message(StatusSeverity::Info, action_done_text(action, &name));
                }
                Err(failure) => {
                    report_failure(model, &format!("Could not {action} {name}"), failure);
                }
            }
            load_models(model, &mut effects);
        }

        // ============== Helper ==============
        AppMsg::HelperReplied(outcome) => match outcome {
            Ok(reply) => {
                debug!(reply_len = reply.len(), "Helper replied");
                model.helper.transcript.push_reply(&reply);
            }
            Err(failure) => {
                warn!(error = %failure.message, "Helper request failed");
                model.helper.transcript.push_failure();
            }
        },

        // ============== Settings ==============
        AppMsg::NewslettersSaved(outcome) => match outcome {
            Ok(count) => {
                info!(count, "Newsletters saved");
                model.newsletters_dirty = false;
                model.set_status_message(
                    StatusSeverity::Info,
                    format!("Saved {}", pluralize(count, "newsletter")),
                );
            }
            Err(failure) => report_failure(model, "Could not save newsletters", failure),
        },

        AppMsg::KeywordsSaved(outcome) => match outcome {
            Ok(count) => {
                info!(count, "Priority keywords saved");
                model.keywords_dirty = false;
                model.set_status_message(
                    StatusSeverity::Info,
                    format!("Saved {}", pluralize(count, "keyword")),
                );
            }
            Err(failure) => report_failure(model, "Could not save keywords", failure),
        },

        AppMsg::CredentialUploaded { kind, outcome } => match outcome {
            Ok(path) => {
                info!(%kind, %path, "Credential uploaded");
                model.set_status_message(StatusSeverity::Info, format!("Uploaded {kind}"));
                effects.push(Effect::ReloadSecrets);
            }
            Err(failure) => report_failure(model, &format!("Could not upload {kind}"), failure),
        },

        AppMsg::CredentialsDeleted(outcome) => match outcome {
            Ok(removal) => {
                info!(removed = removal.removed.len(), errors = removal.errors.len(), "Credentials deleted");
                model.gmail_connected = false;
                let count = settings::item_count(model.settings.section, model);
                model.settings.clamp(count);
                if removal.errors.is_empty() {
                    model.set_status_message(
                        StatusSeverity::Info,
                        format!("Removed {}", pluralize(removal.removed.len(), "file")),
                    );
                } else {
                    let details = removal
                        .errors
                        .iter()
                        .map(|e| format!("{}: {}", e.file, e.error))
                        .collect::<Vec<_>>()
                        .join("; ");
                    model.push_overlay(Overlay::alert("Some files were not removed", details));
                }
                effects.push(Effect::ReloadSecrets);
            }
            Err(failure) => report_failure(model, "Could not delete credentials", failure),
        },

        AppMsg::SecretsLoaded(outcome) => match outcome {
            Ok(secrets) => apply_secrets(model, secrets),
            Err(failure) => warn!(error = %failure.message, "Secret status reload failed"),
        },

        AppMsg::PipelineConfigLoaded(outcome) => match outcome {
            Ok(config) => {
                debug!(keys = config.0.len(), "Pipeline config loaded");
                if !model.preferences_dirty {
                    model.preferences = model.preferences.merged_with(&config);
                }
                if !model.pipeline_dirty {
                    model.pipeline_config = config;
                }
            }
            Err(failure) => {
                warn!(error = %failure.message, "Pipeline config unavailable");
                if model.screen == Screen::Settings {
                    model.set_status_message(
                        StatusSeverity::Warning,
                        format!("Could not load pipeline configuration: {}", failure.message),
                    );
                }
            }
        },

        AppMsg::PipelineConfigSaved(outcome) => match outcome {
            Ok(()) => {
                model.pipeline_dirty = false;
                model.set_status_message(StatusSeverity::Info, "Pipeline configuration saved");
            }
            Err(failure) => report_failure(model, "Could not save pipeline configuration", failure),
        },

        AppMsg::PreferencesSaved(outcome) => match outcome {
            Ok(()) => {
                model.preferences_dirty = false;
                model.set_status_message(StatusSeverity::Info, "Summary preferences saved");
            }
            Err(failure) => report_failure(model, "Could not save preferences", failure),
        },

        AppMsg::WhatsAppWatchStarted(session) => {
            if model.screen == Screen::Settings {
                debug!(%session, "WhatsApp watcher started");
                model.whatsapp_watch = Some(session);
            }
        }

        AppMsg::WhatsAppPolled { session, outcome } => {
            if model.whatsapp_watch != Some(session) {
                debug!(%session, "Dropping result from stale WhatsApp watcher");
            } else {
                match outcome {
                    Ok(status) => model.whatsapp = Some(status),
                    Err(failure) => debug!(error = %failure.message, "WhatsApp status poll failed"),
                }
            }
        }

        AppMsg::WhatsAppConnectRequested(outcome) => match outcome {
            Ok(()) => model.set_status_message(
                StatusSeverity::Info,
                "WhatsApp pairing started; scan the QR code when it appears",
            ),
            Err(failure) => report_failure(model, "Could not connect WhatsApp", failure),
        },

        AppMsg::ExportFinished(outcome) => match outcome {
            Ok(bytes) => {
                debug!(bytes, "Digest exported");
                model.set_status_message(StatusSeverity::Info, "Summary copied to clipboard!");
            }
            Err(failure) => {
                warn!(error = %failure.message, "Clipboard export failed");
                model.push_overlay(Overlay::alert("Export failed", failure.message));
            }
        },
    }

    effects
}

/// Non-transport failures of user actions get an alert; transport failures
/// only a status-line warning.
fn report_failure(model: &mut AppModel, title: &str, failure: Failure) {
    warn!(title, transport = failure.transport, error = %failure.message, "Request failed");
    if failure.transport {
        model.set_status_message(StatusSeverity::Warning, format!("{title}: {}", failure.message));
    } else {
        model.push_overlay(Overlay::alert(title, failure.message));
    }
}

fn record_backend_reachability<T>(model: &mut AppModel, outcome: &Outcome<T>) {
    model.backend_online = Some(!matches!(outcome, Err(f) if f.transport));
}

fn apply_runtime(model: &mut AppModel, status: RuntimeStatus) {
    if model.model_loaded != status.running {
        info!(running = status.running, models = ?status.running_models, "Model runtime state changed");
    }
    model.model_loaded = status.running;
    model.runtime = Some(status);
}

fn apply_secrets(model: &mut AppModel, secrets: SecretsStatus) {
    model.gmail_connected = secrets.gmail_connected();
    model.secrets = Some(secrets);
}

fn apply_sync_event(
    model: &mut AppModel,
    session: SessionId,
    event: SyncEvent,
    effects: &mut Vec<Effect>,
) {
    let name = event.name();
    match event {
        SyncEvent::Newsletters(Ok(newsletters)) => {
            debug!(count = newsletters.len(), "Newsletters loaded");
            model.newsletters = newsletters;
            model.newsletters_dirty = false;
        }
        SyncEvent::Keywords(Ok(keywords)) => {
            debug!(count = keywords.len(), "Priority keywords loaded");
            model.keywords = keywords;
            model.keywords_dirty = false;
        }
        SyncEvent::Secrets(Ok(secrets)) => apply_secrets(model, secrets),
        SyncEvent::Stories(Ok(stories)) => {
            debug!(count = stories.len(), "Stories loaded");
            model.dashboard.clamp(stories.len());
            model.stories = stories;
        }
        SyncEvent::Runtime(outcome) => {
            record_backend_reachability(model, &outcome);
            match outcome {
                Ok(status) => apply_runtime(model, status),
                Err(failure) => log_sync_failure(session, name, &failure),
            }
        }
        SyncEvent::Pipeline { issued_at, outcome } => {
            record_backend_reachability(model, &outcome);
            match outcome {
                Ok(status) => {
                    let predates_request = model
                        .generation_since
                        .is_some_and(|since| issued_at < since);
                    if predates_request {
                        debug!(%session, "Pipeline snapshot predates the generation request");
                    } else if status.completes_generation(model.generating) {
                        let outcome = status.outcome();
                        info!(%session, ?outcome, "Generation finished, refreshing stories");
                        model.generating = false;
                        model.generation_since = None;
                        effects.push(Effect::RefreshStories(session));
                        match outcome {
                            RunOutcome::Failed(reason) => model.set_status_message(
                                StatusSeverity::Warning,
                                format!("Last run failed: {reason}"),
                            ),
                            RunOutcome::PipelineUnavailable => model.set_status_message(
                                StatusSeverity::Warning,
                                "The backend pipeline is not available",
                            ),
                            RunOutcome::NeverRan | RunOutcome::Succeeded => {}
                        }
                    }
                    model.pipeline = Some(status);
                }
                Err(failure) => log_sync_failure(session, name, &failure),
            }
        }
        SyncEvent::StoriesRefreshed(Ok(stories)) => {
            info!(%session, count = stories.len(), "Stories refreshed");
            model.dashboard.clamp(stories.len());
            model.set_status_message(
                StatusSeverity::Info,
                format!("Summary ready: {}", pluralize(stories.len(), "story")),
            );
            model.stories = stories;
        }
        SyncEvent::StoriesRefreshed(Err(failure)) => {
            log_sync_failure(session, name, &failure);
            model.set_status_message(
                StatusSeverity::Warning,
                format!("Could not load the new stories: {}", failure.message),
            );
        }
        SyncEvent::Newsletters(Err(failure))
        | SyncEvent::Keywords(Err(failure))
        | SyncEvent::Secrets(Err(failure))
        | SyncEvent::Stories(Err(failure)) => log_sync_failure(session, name, &failure),
    }
}

fn log_sync_failure(session: SessionId, name: &str, failure: &Failure) {
    warn!(%session, fetch = name, transport = failure.transport, error = %failure.message, "Sync fetch failed");
}

// ============== Keys ==============

fn handle_key(model: &mut AppModel, key: KeyEvent, effects: &mut Vec<Effect>) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        info!("Ctrl+C pressed");
        model.should_quit = true;
        return;
    }

    if let Some(top) = model.overlays.last_mut() {
        match overlay::handle_key(top, key) {
            OverlayAction::None => {}
            OverlayAction::Close => {
                model.overlays.pop();
            }
            OverlayAction::Submit { purpose, values } => {
                match submit_form(model, purpose, &values, effects) {
                    Ok(()) => {
                        model.overlays.pop();
                    }
                    // The form stays open under the alert.
                    Err(message) => model.push_overlay(Overlay::warning("Invalid input", message)),
                }
            }
            OverlayAction::Confirm(action) => {
                model.overlays.pop();
                confirm(model, action, effects);
            }
        }
        return;
    }

    if model.helper.open {
        match model.helper.handle_key(key) {
            Some(HelperAction::Close) => model.helper.open = false,
            Some(HelperAction::Submit) => {
                if let Some(prompt) = model.helper.submit() {
                    debug!(prompt_len = prompt.len(), "Helper prompt submitted");
                    effects.push(Effect::AskHelper {
                        summary: summary_context(&model.stories),
                        prompt,
                    });
                }
            }
            None => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => {
            info!("Quit key pressed");
            model.should_quit = true;
            return;
        }
        KeyCode::Char('?') => {
            model.toggle_help();
            return;
        }
        KeyCode::Char('h') => {
            toggle_helper(model);
            return;
        }
        KeyCode::Char('g') => {
            request_generation(model, effects);
            return;
        }
        KeyCode::Char(c @ '1'..='5') => {
            if let Some(screen) = Screen::from_digit(c) {
                navigate(model, screen, effects);
            }
            return;
        }
        KeyCode::Tab => {
            navigate(model, model.screen.next(), effects);
            return;
        }
        KeyCode::BackTab => {
            navigate(model, model.screen.previous(), effects);
            return;
        }
        _ => {}
    }

    match model.screen {
        Screen::Home => match home::handle_key(key) {
            Some(HomeAction::Generate) => request_generation(model, effects),
            Some(HomeAction::Navigate(screen)) => navigate(model, screen, effects),
            None => {}
        },
        Screen::Dashboard => {
            match model.dashboard.handle_key(key, model.stories.len(), model.model_loaded) {
                Some(DashboardAction::LoadModel) => {
                    let name = model.configured_model().to_string();
                    apply_model_action(model, ModelAction::Activate, &name, effects);
                }
                Some(DashboardAction::Generate) => request_generation(model, effects),
                Some(DashboardAction::Export) => {
                    if model.stories.is_empty() {
                        model.set_status_message(StatusSeverity::Info, "Nothing to export yet");
                    } else {
                        effects.push(Effect::CopyToClipboard(digest_markdown(&model.stories)));
                    }
                }
                None => {}
            }
        }
        Screen::Models => match model.models.handle_key(key) {
            Some(ModelsAction::Refresh) => load_models(model, effects),
            Some(ModelsAction::Apply { action, model: name }) => {
                apply_model_action(model, action, &name, effects)
            }
            Some(ModelsAction::ConfirmRemove(name)) => model.push_overlay(Overlay::Confirm {
                message: format!("Remove {name} from this machine?"),
                action: ConfirmAction::RemoveModel(name),
            }),
            None => {}
        },
        Screen::Settings => {
            let count = settings::item_count(model.settings.section, model);
            if let Some(action) = model.settings.handle_key(key, count) {
                handle_settings_action(model, action, effects);
            }
        }
        Screen::About => {}
    }
}

fn toggle_helper(model: &mut AppModel) {
    if model.helper.open {
        model.helper.open = false;
    } else if model.model_loaded {
        model.helper.open = true;
    } else {
        model.set_status_message(StatusSeverity::Info, HELPER_NEEDS_MODEL);
    }
}

fn navigate(model: &mut AppModel, screen: Screen, effects: &mut Vec<Effect>) {
    if model.screen == screen {
        return;
    }
    let previous = std::mem::replace(&mut model.screen, screen);
    debug!(from = %previous, to = %screen, "Screen changed");

    if previous == Screen::Settings {
        model.whatsapp_watch = None;
        effects.push(Effect::StopWhatsAppWatch);
    }

    match screen {
        Screen::Models => load_models(model, effects),
        Screen::Settings => {
            let count = settings::item_count(model.settings.section, model);
            model.settings.clamp(count);
            effects.push(Effect::LoadPipelineConfig);
            effects.push(Effect::StartWhatsAppWatch);
        }
        Screen::Home | Screen::Dashboard | Screen::About => {}
    }
}

fn request_generation(model: &mut AppModel, effects: &mut Vec<Effect>) {
    if model.generating {
        model.set_status_message(StatusSeverity::Info, "A summary is already being generated");
        return;
    }
    if model.newsletters.is_empty() {
        warn!("Generation requested without newsletters");
        model.push_overlay(Overlay::warning("No newsletters", NO_NEWSLETTERS_WARNING));
        return;
    }

    info!(newsletters = model.newsletters.len(), "Generation requested");
    model.generating = true;
    model.generation_since = Some(Instant::now());
    model.set_status_message(StatusSeverity::Info, "Starting summary generation...");
    effects.push(Effect::StartGeneration(RunRequest::for_newsletters(
        &model.newsletters,
        None,
    )));
}

fn load_models(model: &mut AppModel, effects: &mut Vec<Effect>) {
    model.models.loading = true;
    effects.push(Effect::LoadModels);
}

fn action_done_text(action: ModelAction, name: &str) -> String {
    match action {
        ModelAction::Pull => format!("Downloaded {name}"),
        ModelAction::Remove => format!("Removed {name}"),
        ModelAction::Activate => format!("{name} is loading"),
        ModelAction::Deactivate => format!("Stopped {name}"),
    }
}

fn action_progress_text(action: ModelAction) -> &'static str {
    match action {
        ModelAction::Pull => "Pulling",
        ModelAction::Remove => "Removing",
        ModelAction::Activate => "Loading",
        ModelAction::Deactivate => "Stopping",
    }
}

/// The runtime's own tag for a listed model, or `name` unchanged.
fn backend_model_name(model: &AppModel, name: &str) -> String {
    model
        .models
        .models
        .iter()
        .find(|m| m.name == name)
        .map(|m| runtime_name(m, &model.models.downloaded).to_string())
        .unwrap_or_else(|| name.to_string())
}

fn apply_model_action(
    model: &mut AppModel,
    action: ModelAction,
    name: &str,
    effects: &mut Vec<Effect>,
) {
    if let Some((pending, pending_model)) = &model.models.pending {
        let message = format!("Wait for {pending} {pending_model} to finish");
        model.set_status_message(StatusSeverity::Info, message);
        return;
    }
    let target = backend_model_name(model, name);
    info!(%action, model = %target, "Model action requested");
    model.set_status_message(
        StatusSeverity::Info,
        format!("{} {target}...", action_progress_text(action)),
    );
    model.models.pending = Some((action, target.clone()));
    effects.push(Effect::ApplyModelAction {
        action,
        model: target,
    });
}

fn confirm(model: &mut AppModel, action: ConfirmAction, effects: &mut Vec<Effect>) {
    match action {
        ConfirmAction::DeleteCredentials => {
            info!("Credential deletion confirmed");
            effects.push(Effect::DeleteCredentials);
        }
        ConfirmAction::RemoveModel(name) => {
            apply_model_action(model, ModelAction::Remove, &name, effects);
        }
    }
}

// ============== Settings ==============

fn handle_settings_action(model: &mut AppModel, action: SettingsAction, effects: &mut Vec<Effect>) {
    let selected = model.settings.selected;
    match (model.settings.section, action) {
        (SettingsSection::Account, SettingsAction::Activate) => match ACCOUNT_ITEMS.get(selected) {
            Some(AccountItem::Upload(kind)) => model.push_overlay(Overlay::Form(FormState::new(
                &format!("Upload {kind}"),
                FormPurpose::UploadCredential(*kind),
                &[("File path", "")],
            ))),
            Some(AccountItem::DeleteCredentials) => confirm_credential_deletion(model),
            None => {}
        },
        (SettingsSection::Account, SettingsAction::Remove) => confirm_credential_deletion(model),

        (SettingsSection::Newsletters, _) if !model.gmail_connected => {
            model.set_status_message(StatusSeverity::Info, "Connect Gmail in the Account section first");
        }
        (SettingsSection::Newsletters, SettingsAction::Add) => {
            model.push_overlay(Overlay::Form(FormState::new(
                "Add newsletter",
                FormPurpose::AddNewsletter,
                &[("Sender", ""), ("Email", "")],
            )));
        }
        (SettingsSection::Newsletters, SettingsAction::Remove) => {
            if selected < model.newsletters.len() {
                let removed = model.newsletters.remove(selected);
                debug!(sender = %removed.sender, "Newsletter removed");
                model.newsletters_dirty = true;
                model.settings.clamp(model.newsletters.len());
            }
        }
        (SettingsSection::Newsletters, SettingsAction::PriorityUp | SettingsAction::PriorityDown) => {
            let delta = if action == SettingsAction::PriorityUp { 1 } else { -1 };
            if let Some(newsletter) = model.newsletters.get_mut(selected) {
                newsletter.set_priority(i64::from(newsletter.priority) + delta);
                model.newsletters_dirty = true;
            }
        }
        (SettingsSection::Newsletters, SettingsAction::Save) => {
            effects.push(Effect::SaveNewsletters(model.newsletters.clone()));
        }

        (SettingsSection::Keywords, SettingsAction::Add) => {
            model.push_overlay(Overlay::Form(FormState::new(
                "Add priority keyword",
                FormPurpose::AddKeyword,
                &[("Keyword", "")],
            )));
        }
        (SettingsSection::Keywords, SettingsAction::Remove) => {
            if selected < model.keywords.len() {
                model.keywords.remove(selected);
                model.keywords_dirty = true;
                model.settings.clamp(model.keywords.len());
            }
        }
        (SettingsSection::Keywords, SettingsAction::Save) => {
            effects.push(Effect::SaveKeywords(PriorityKeyword::normalize(
                model.keywords.clone(),
            )));
        }

        (SettingsSection::Preferences, SettingsAction::Activate | SettingsAction::Toggle) => {
            match PREFERENCE_ITEMS.get(selected) {
                Some(PreferenceItem::Frequency) => {
                    model.preferences.frequency = model.preferences.frequency.toggled();
                    model.preferences_dirty = true;
                }
                Some(PreferenceItem::Time) => {
                    let current = model.preferences.time.clone();
                    model.push_overlay(Overlay::Form(FormState::new(
                        "Summary time",
                        FormPurpose::SummaryTime,
                        &[("Time (HH:MM)", current.as_str())],
                    )));
                }
                Some(PreferenceItem::Notifications) => {
                    model.preferences.notifications = !model.preferences.notifications;
                    model.preferences_dirty = true;
                }
                None => {}
            }
        }
        (SettingsSection::Preferences, SettingsAction::Save) => {
            effects.push(Effect::SavePreferences(model.preferences.to_config()));
        }

        (SettingsSection::Pipeline, SettingsAction::Activate) => {
            if let Some(key) = PipelineConfig::EDITABLE_KEYS.get(selected).copied() {
                let current = model.pipeline_config.get(key).unwrap_or("").to_string();
                model.push_overlay(Overlay::Form(FormState::new(
                    &format!("Edit {key}"),
                    FormPurpose::PipelineValue(key),
                    &[("Value", current.as_str())],
                )));
            }
        }
        (SettingsSection::Pipeline, SettingsAction::Save) => {
            effects.push(Effect::SavePipelineConfig(
                model.pipeline_config.subset(&PipelineConfig::EDITABLE_KEYS),
            ));
        }
        (SettingsSection::Pipeline, SettingsAction::Reload) => {
            model.pipeline_dirty = false;
            effects.push(Effect::LoadPipelineConfig);
        }

        (SettingsSection::WhatsApp, SettingsAction::Connect) => {
            model.set_status_message(StatusSeverity::Info, "Requesting WhatsApp pairing...");
            effects.push(Effect::ConnectWhatsApp);
        }

        _ => {}
    }
}

fn confirm_credential_deletion(model: &mut AppModel) {
    model.push_overlay(Overlay::Confirm {
        message: "Delete the stored Gmail credentials and token?".to_string(),
        action: ConfirmAction::DeleteCredentials,
    });
}

/// Applies a submitted form. An `Err` carries the message to show; nothing is
/// changed in that case.
fn submit_form(
    model: &mut AppModel,
    purpose: FormPurpose,
    values: &[String],
    effects: &mut Vec<Effect>,
) -> Result<(), String> {
    let value = |i: usize| values.get(i).map(String::as_str).unwrap_or("");

    match purpose {
        FormPurpose::UploadCredential(kind) => {
            let path = value(0);
            if path.is_empty() {
                return Err("Enter the path of the file to upload".to_string());
            }
            model.set_status_message(StatusSeverity::Info, format!("Uploading {kind}..."));
            effects.push(Effect::UploadCredential {
                kind,
                path: path.into(),
            });
        }
        FormPurpose::AddNewsletter => {
            let newsletter = Newsletter::new(value(0), value(1), i64::from(DEFAULT_PRIORITY))
                .map_err(|e| e.user_message())?;
            if model
                .newsletters
                .iter()
                .any(|n| n.email.eq_ignore_ascii_case(&newsletter.email))
            {
                return Err(format!("{} is already selected", newsletter.email));
            }
            model.newsletters.push(newsletter);
            model.newsletters_dirty = true;
            model.settings.selected = model.newsletters.len() - 1;
        }
        FormPurpose::AddKeyword => {
            let keyword = PriorityKeyword::new(value(0));
            if keyword.keyword.is_empty() {
                return Err("Keyword cannot be empty".to_string());
            }
            if model
                .keywords
                .iter()
                .any(|k| k.keyword.eq_ignore_ascii_case(&keyword.keyword))
            {
                return Err(format!("'{}' is already a priority keyword", keyword.keyword));
            }
            model.keywords.push(keyword);
            model.keywords_dirty = true;
            model.settings.selected = model.keywords.len() - 1;
        }
        FormPurpose::SummaryTime => {
            model.preferences.time =
                SummaryPreferences::parse_time(value(0)).map_err(|e| e.user_message())?;
            model.preferences_dirty = true;
        }
        FormPurpose::PipelineValue(key) => {
            let normalized =
                PipelineConfig::validate_value(key, value(0)).map_err(|e| e.user_message())?;
            model.pipeline_config.set(key, normalized);
            model.pipeline_dirty = true;
        }
    }
    Ok(())
}
