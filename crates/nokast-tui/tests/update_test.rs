//! Update-function behaviour: generation lifecycle, start-up batch, settings
//! and helper flows.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use nokast_common::helper::HELPER_FAILURE_TEXT;
use nokast_common::types::*;
use nokast_tui::application::update::{update, NO_NEWSLETTERS_WARNING};
use nokast_tui::application::AppModel;
use nokast_tui::components::settings::{self, SettingsSection};
use nokast_tui::components::Overlay;
use nokast_tui::message::{AppMsg, Effect, Failure, Outcome, Screen, SessionId, SyncEvent};

fn key(code: KeyCode) -> AppMsg {
    AppMsg::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn press(model: &mut AppModel, c: char) -> Vec<Effect> {
    update(model, key(KeyCode::Char(c)))
}

fn type_text(model: &mut AppModel, text: &str) {
    for c in text.chars() {
        press(model, c);
    }
}

fn synced_model() -> (AppModel, SessionId) {
    let mut model = AppModel::new();
    let session = SessionId::next();
    let effects = update(&mut model, AppMsg::SyncStarted(session));
    assert_eq!(effects, vec![Effect::LoadPipelineConfig]);
    (model, session)
}

fn pipeline(running: bool) -> PipelineStatus {
    PipelineStatus {
        pipeline_available: true,
        last_run: LastRun {
            running,
            last_result: Some("ok".to_string()),
        },
    }
}

fn runtime(running: bool) -> RuntimeStatus {
    RuntimeStatus {
        running,
        cli_available: true,
        server_up: true,
        running_models: if running {
            vec!["qwen3:8b".to_string()]
        } else {
            Vec::new()
        },
    }
}

fn story(id: &str) -> Story {
    Story {
        id: id.to_string(),
        title: format!("Story {id}"),
        summary: "Something happened.".to_string(),
        linkedin: None,
        x_post: None,
        branding_tag: None,
        action_suggestion: None,
        score: 6.0,
        date_iso: None,
        sender_email: None,
        processed_at: None,
    }
}

fn newsletter(sender: &str, email: &str) -> Newsletter {
    Newsletter::new(sender, email, 5).unwrap()
}

/// A pipeline poll answered now.
fn polled(outcome: Outcome<PipelineStatus>) -> SyncEvent {
    SyncEvent::Pipeline {
        issued_at: Instant::now(),
        outcome,
    }
}

fn sync(model: &mut AppModel, session: SessionId, event: SyncEvent) -> Vec<Effect> {
    update(model, AppMsg::Synced { session, event })
}

#[test]
fn test_completion_refreshes_stories_exactly_once() {
    let (mut model, session) = synced_model();
    model.generating = true;

    let effects = sync(&mut model, session, polled(Ok(pipeline(false))));
    assert_eq!(effects, vec![Effect::RefreshStories(session)]);
    assert!(!model.generating);

    // The next poll sees the same snapshot; the flag is already clear.
    let effects = sync(&mut model, session, polled(Ok(pipeline(false))));
    assert!(effects.is_empty());

    let effects = sync(
        &mut model,
        session,
        SyncEvent::StoriesRefreshed(Ok(vec![story("1"), story("2")])),
    );
    assert!(effects.is_empty());
    assert_eq!(model.stories.len(), 2);
    assert!(!model.generating);
}

#[test]
fn test_no_refresh_without_generation_in_progress() {
    let (mut model, session) = synced_model();
    for running in [false, true, false] {
        let effects = sync(&mut model, session, polled(Ok(pipeline(running))));
        assert!(effects.is_empty());
    }
    assert!(!model.generating);
}

#[test]
fn test_running_pipeline_keeps_generation_flag() {
    let (mut model, session) = synced_model();
    model.generating = true;
    let effects = sync(&mut model, session, polled(Ok(pipeline(true))));
    assert!(effects.is_empty());
    assert!(model.generating);
    assert_eq!(model.pipeline, Some(pipeline(true)));
}

#[test]
fn test_failed_mount_fetch_does_not_block_others() {
    let (mut model, session) = synced_model();

    sync(
        &mut model,
        session,
        SyncEvent::Newsletters(Err(Failure::transport("connection refused"))),
    );
    sync(
        &mut model,
        session,
        SyncEvent::Keywords(Ok(vec![PriorityKeyword::new("rust")])),
    );
    sync(
        &mut model,
        session,
        SyncEvent::Secrets(Ok(SecretsStatus {
            google_credentials: SecretEntry { exists: true, path: None },
            google_token: SecretEntry { exists: true, path: None },
            ..Default::default()
        })),
    );
    sync(
        &mut model,
        session,
        SyncEvent::Stories(Err(Failure::backend("stories table missing"))),
    );
    sync(&mut model, session, SyncEvent::Runtime(Ok(runtime(true))));

    assert!(model.newsletters.is_empty());
    assert_eq!(model.keywords.len(), 1);
    assert!(model.gmail_connected);
    assert!(model.stories.is_empty());
    assert!(model.model_loaded);
    // Background failures never raise alerts.
    assert!(model.overlays.is_empty());
}

#[test]
fn test_generate_without_newsletters_warns() {
    let (mut model, _) = synced_model();
    let effects = press(&mut model, 'g');

    assert!(effects.is_empty());
    assert!(!model.generating);
    match model.overlays.last() {
        Some(Overlay::Alert { message, .. }) => assert_eq!(message, NO_NEWSLETTERS_WARNING),
        other => panic!("expected a warning, got {other:?}"),
    }
}

#[test]
fn test_generate_then_poll_completes() {
    let (mut model, session) = synced_model();
    model.newsletters = vec![
        newsletter("The Batch", "thebatch@deeplearning.ai"),
        newsletter("TLDR AI", "dan@tldrnewsletter.com"),
    ];

    let effects = press(&mut model, 'g');
    assert_eq!(
        effects,
        vec![Effect::StartGeneration(RunRequest {
            newsletters: vec![
                "thebatch@deeplearning.ai".to_string(),
                "dan@tldrnewsletter.com".to_string()
            ],
            fetch_limit: None,
        })]
    );
    assert!(model.generating);

    // Already generating: no second request.
    assert!(press(&mut model, 'g').is_empty());

    update(&mut model, AppMsg::GenerationRequested(Ok("pipeline_started".to_string())));
    assert!(model.generating);

    let effects = sync(&mut model, session, polled(Ok(pipeline(false))));
    assert_eq!(effects, vec![Effect::RefreshStories(session)]);
    assert!(!model.generating);
}

#[test]
fn test_rejected_generation_clears_flag_and_alerts() {
    let (mut model, _) = synced_model();
    model.newsletters = vec![newsletter("The Batch", "thebatch@deeplearning.ai")];
    press(&mut model, 'g');

    update(
        &mut model,
        AppMsg::GenerationRequested(Err(Failure::backend("pipeline_unavailable"))),
    );
    assert!(!model.generating);
    assert!(matches!(
        model.overlays.last(),
        Some(Overlay::Alert { message, .. }) if message == "pipeline_unavailable"
    ));
}

#[test]
fn test_unreachable_backend_keeps_flag() {
    let (mut model, _) = synced_model();
    model.newsletters = vec![newsletter("The Batch", "thebatch@deeplearning.ai")];
    press(&mut model, 'g');

    update(
        &mut model,
        AppMsg::GenerationRequested(Err(Failure::transport("connection refused"))),
    );
    assert!(model.generating);
    assert!(model.overlays.is_empty());
}

#[test]
fn test_runtime_stop_does_not_clear_generation() {
    let (mut model, session) = synced_model();
    model.generating = true;
    sync(&mut model, session, SyncEvent::Runtime(Ok(runtime(true))));
    assert!(model.model_loaded);

    sync(&mut model, session, SyncEvent::Runtime(Ok(runtime(false))));
    assert!(!model.model_loaded);
    assert!(model.generating);
}

#[test]
fn test_stale_session_results_are_dropped() {
    let (mut model, _) = synced_model();
    model.generating = true;
    let stale = SessionId::next();

    let effects = sync(&mut model, stale, polled(Ok(pipeline(false))));
    assert!(effects.is_empty());
    assert!(model.generating);
    assert_eq!(model.pipeline, None);

    sync(&mut model, stale, SyncEvent::Stories(Ok(vec![story("1")])));
    assert!(model.stories.is_empty());
}

#[test]
fn test_poll_transport_failure_marks_backend_offline() {
    let (mut model, session) = synced_model();
    assert_eq!(model.backend_online, None);

    sync(
        &mut model,
        session,
        polled(Err(Failure::transport("connection refused"))),
    );
    assert_eq!(model.backend_online, Some(false));

    sync(&mut model, session, SyncEvent::Runtime(Ok(runtime(false))));
    assert_eq!(model.backend_online, Some(true));
}

#[test]
fn test_delete_credentials_hides_newsletters() {
    let (mut model, _) = synced_model();
    model.gmail_connected = true;
    model.newsletters = vec![newsletter("The Batch", "thebatch@deeplearning.ai")];

    let effects = press(&mut model, '4');
    assert_eq!(model.screen, Screen::Settings);
    assert_eq!(effects, vec![Effect::LoadPipelineConfig, Effect::StartWhatsAppWatch]);

    // Account section, "Delete Gmail credentials" entry.
    for _ in 0..3 {
        update(&mut model, key(KeyCode::Down));
    }
    assert!(update(&mut model, key(KeyCode::Enter)).is_empty());
    assert!(matches!(model.overlays.last(), Some(Overlay::Confirm { .. })));

    let effects = press(&mut model, 'y');
    assert_eq!(effects, vec![Effect::DeleteCredentials]);
    assert!(model.overlays.is_empty());

    let effects = update(
        &mut model,
        AppMsg::CredentialsDeleted(Ok(CredentialsRemoval {
            removed: vec!["google_credentials.json".into(), "token.json".into()],
            errors: Vec::new(),
        })),
    );
    assert_eq!(effects, vec![Effect::ReloadSecrets]);
    assert!(!model.gmail_connected);
    assert_eq!(settings::item_count(SettingsSection::Newsletters, &model), 0);
}

#[test]
fn test_leaving_settings_stops_whatsapp_watch() {
    let (mut model, _) = synced_model();
    press(&mut model, '4');
    let watch = SessionId::next();
    update(&mut model, AppMsg::WhatsAppWatchStarted(watch));
    assert_eq!(model.whatsapp_watch, Some(watch));

    let effects = press(&mut model, '1');
    assert_eq!(effects, vec![Effect::StopWhatsAppWatch]);
    assert_eq!(model.whatsapp_watch, None);

    // A poll that was already in flight is ignored.
    update(
        &mut model,
        AppMsg::WhatsAppPolled {
            session: watch,
            outcome: Ok(WhatsAppStatus {
                connected: true,
                qr: None,
            }),
        },
    );
    assert_eq!(model.whatsapp, None);
}

#[test]
fn test_add_newsletter_requires_sender_and_email() {
    let (mut model, _) = synced_model();
    model.gmail_connected = true;
    press(&mut model, '4');
    update(&mut model, key(KeyCode::Right));
    assert_eq!(model.settings.section, SettingsSection::Newsletters);

    press(&mut model, 'a');
    type_text(&mut model, "Import AI");
    update(&mut model, key(KeyCode::Enter));
    // Validation alert sits on top of the still-open form.
    assert_eq!(model.overlays.len(), 2);
    assert!(model.newsletters.is_empty());

    update(&mut model, key(KeyCode::Esc));
    update(&mut model, key(KeyCode::Tab));
    type_text(&mut model, "jack@importai.net");
    update(&mut model, key(KeyCode::Enter));
    assert!(model.overlays.is_empty());
    assert_eq!(model.newsletters.len(), 1);
    assert_eq!(model.newsletters[0].email, "jack@importai.net");
    assert!(model.newsletters_dirty);

    let effects = press(&mut model, 's');
    assert!(matches!(effects.as_slice(), [Effect::SaveNewsletters(list)] if list.len() == 1));
}

#[test]
fn test_models_screen_reconciles_inventory() {
    let (mut model, _) = synced_model();
    let effects = press(&mut model, '3');
    assert_eq!(effects, vec![Effect::LoadModels]);
    assert!(model.models.loading);

    update(
        &mut model,
        AppMsg::ModelsLoaded {
            inventory: Ok(vec![DownloadedModel {
                name: "llama3.2:1b-q4".to_string(),
                size: Some("1.3 GB".to_string()),
            }]),
            runtime: Ok(runtime(false)),
        },
    );
    assert!(!model.models.loading);
    let llama = &model.models.models[0];
    assert_eq!(llama.name, "llama3.2:1b");
    assert_eq!(llama.status, ModelStatus::Idle);

    // Enter on an idle model activates it under the runtime's own tag.
    let effects = update(&mut model, key(KeyCode::Enter));
    assert_eq!(
        effects,
        vec![Effect::ApplyModelAction {
            action: ModelAction::Activate,
            model: "llama3.2:1b-q4".to_string(),
        }]
    );
    assert!(update(&mut model, key(KeyCode::Enter)).is_empty());
}

#[test]
fn test_helper_needs_loaded_model() {
    let (mut model, session) = synced_model();
    press(&mut model, 'h');
    assert!(!model.helper.open);

    sync(&mut model, session, SyncEvent::Runtime(Ok(runtime(true))));
    model.stories = vec![story("1")];
    press(&mut model, 'h');
    assert!(model.helper.open);

    // Blank prompts are not sent.
    type_text(&mut model, "   ");
    assert!(update(&mut model, key(KeyCode::Enter)).is_empty());

    for _ in 0..3 {
        update(&mut model, key(KeyCode::Backspace));
    }
    type_text(&mut model, "why?");
    let effects = update(&mut model, key(KeyCode::Enter));
    assert_eq!(
        effects,
        vec![Effect::AskHelper {
            summary: "**Story 1:** Something happened.".to_string(),
            prompt: "why?".to_string(),
        }]
    );

    update(&mut model, AppMsg::HelperReplied(Err(Failure::transport("timed out"))));
    let last = model.helper.transcript.messages().last().unwrap();
    assert_eq!(last.text, HELPER_FAILURE_TEXT);
}

#[test]
fn test_poll_sent_before_generate_does_not_finish_it() {
    let (mut model, session) = synced_model();
    model.newsletters = vec![newsletter("The Batch", "thebatch@deeplearning.ai")];

    let sent_before = Instant::now() - Duration::from_millis(10);
    press(&mut model, 'g');
    assert!(model.generating);

    let idle_before = SyncEvent::Pipeline {
        issued_at: sent_before,
        outcome: Ok(pipeline(false)),
    };
    assert!(sync(&mut model, session, idle_before.clone()).is_empty());
    assert!(model.generating);

    // Still in flight when the backend accepts: the reply moves the cutoff.
    update(&mut model, AppMsg::GenerationRequested(Ok("pipeline_started".to_string())));
    assert!(sync(&mut model, session, idle_before).is_empty());
    assert!(model.generating);

    let effects = sync(&mut model, session, polled(Ok(pipeline(false))));
    assert_eq!(effects, vec![Effect::RefreshStories(session)]);
    assert!(!model.generating);
    assert_eq!(model.generation_since, None);
}
