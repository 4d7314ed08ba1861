use nokast_common::types::*;
use serde_json::json;

#[test]
fn test_newsletter_priority_is_clamped_on_receipt() {
    let raw = json!([
        { "id": 7, "sender": "Tech Weekly", "email": "news@tech.io", "priority": 42 },
        { "id": "b", "sender": "Design Finds", "email": "hi@design.co", "priority": -3 },
        { "id": "c", "sender": "AI Breakfast", "email": "ai@bf.com", "priority": null },
        { "id": "d", "sender": "Indie", "email": "x@indie.com" }
    ]);

    let newsletters: Vec<Newsletter> = serde_json::from_value(raw).unwrap();

    assert_eq!(newsletters[0].id, "7");
    assert_eq!(newsletters[0].priority, PRIORITY_MAX);
    assert_eq!(newsletters[1].priority, PRIORITY_MIN);
    assert_eq!(newsletters[2].priority, DEFAULT_PRIORITY);
    assert_eq!(newsletters[3].priority, DEFAULT_PRIORITY);
}

#[test]
fn test_newsletter_requires_sender_and_email() {
    assert!(Newsletter::new("", "a@b.c", 5).is_err());
    assert!(Newsletter::new("Sender", "   ", 5).is_err());

    let newsletter = Newsletter::new(" Tech Weekly ", "news@tech.io", 11).unwrap();
    assert_eq!(newsletter.sender, "Tech Weekly");
    assert_eq!(newsletter.priority, 10);
    assert!(!newsletter.id.is_empty());
}

#[test]
fn test_keywords_normalize_drops_blanks_and_duplicates() {
    let keywords = PriorityKeyword::normalize(vec![
        PriorityKeyword::new("llm"),
        PriorityKeyword::new("  "),
        PriorityKeyword::new("LLM"),
        PriorityKeyword { keyword: " nvidia ".into(), score: 2.5 },
    ]);

    let names: Vec<&str> = keywords.iter().map(|k| k.keyword.as_str()).collect();
    assert_eq!(names, vec!["llm", "nvidia"]);
    assert_eq!(keywords[1].score, 2.5);
}

#[test]
fn test_story_deserializes_backend_row() {
    let story: Story = serde_json::from_value(json!({
        "id": 12,
        "title": "Open weights model released",
        "summary": "A new model tops the leaderboard.",
        "linkedIn": "Big news for open AI...",
        "x_post": "",
        "branding_tag": null,
        "action_suggestion": "Try it locally",
        "score": 8.5,
        "date_iso": "2024-05-01T09:30:00+00:00",
        "sender_email": "news@aibreakfast.com",
        "processed_at": "2024-05-01 10:00:00"
    }))
    .unwrap();

    assert_eq!(story.id, "12");
    assert_eq!(story.social_posts(), vec![("LinkedIn", "Big news for open AI...")]);
    assert_eq!(
        story.source_date(),
        chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
    );
}

#[test]
fn test_story_tolerates_null_columns() {
    let story: Story = serde_json::from_value(json!({
        "id": "s1", "title": null, "summary": null, "score": null
    }))
    .unwrap();
    assert_eq!(story.title, "");
    assert_eq!(story.score, 0.0);
    assert!(story.social_posts().is_empty());
    assert_eq!(story.source_date(), None);
}

#[test]
fn test_pipeline_completion_rule() {
    let idle: PipelineStatus = serde_json::from_value(json!({
        "ok": true, "pipeline_available": true,
        "last_run": { "running": false, "last_result": "ok" }
    }))
    .unwrap();
    let busy = PipelineStatus {
        last_run: LastRun { running: true, last_result: None },
        ..idle.clone()
    };

    assert!(idle.completes_generation(true));
    assert!(!idle.completes_generation(false));
    assert!(!busy.completes_generation(true));
    assert!(!busy.completes_generation(false));
}

#[test]
fn test_pipeline_outcome() {
    let with_result = |r: Option<&str>| PipelineStatus {
        pipeline_available: true,
        last_run: LastRun { running: false, last_result: r.map(String::from) },
    };

    assert_eq!(with_result(None).outcome(), RunOutcome::NeverRan);
    assert_eq!(with_result(Some("ok")).outcome(), RunOutcome::Succeeded);
    assert_eq!(
        with_result(Some("pipeline_not_available")).outcome(),
        RunOutcome::PipelineUnavailable
    );
    assert_eq!(
        with_result(Some("error: token expired")).outcome(),
        RunOutcome::Failed("token expired".into())
    );
}

#[test]
fn test_gmail_connected_needs_credentials_and_token() {
    let mut secrets: SecretsStatus = serde_json::from_value(json!({
        "google_credentials": { "exists": true, "path": "/s/Google_credentials.json" },
        "google_token": { "exists": false, "path": "/s/token.json" }
    }))
    .unwrap();
    assert!(!secrets.gmail_connected());

    secrets.google_token.exists = true;
    assert!(secrets.gmail_connected());
}

#[test]
fn test_preferences_round_trip_through_config() {
    let prefs = SummaryPreferences {
        frequency: Frequency::Weekly,
        time: "18:45".into(),
        notifications: false,
    };

    let restored = SummaryPreferences::default().merged_with(&prefs.to_config());
    assert_eq!(restored, prefs);
}

#[test]
fn test_preferences_ignore_malformed_config() {
    let mut config = PipelineConfig::default();
    config.set(PipelineConfig::SUMMARY_TIME, "25:99");
    config.set(PipelineConfig::SUMMARY_FREQUENCY, "hourly");

    let prefs = SummaryPreferences::default().merged_with(&config);
    assert_eq!(prefs, SummaryPreferences::default());
}

#[test]
fn test_time_validation() {
    assert_eq!(SummaryPreferences::parse_time(" 7:05 ").unwrap(), "07:05");
    assert!(SummaryPreferences::parse_time("7pm").is_err());
}

#[test]
fn test_pipeline_config_accessors_and_validation() {
    let config: PipelineConfig = serde_json::from_value(json!({
        "FETCH_LIMIT": "10",
        "TOP_N": "oops",
        "SIMILARITY_THRESHOLD": "0.85",
        "OLLAMA_MODEL": "qwen3:8b",
        "WHATSAPP_PHONE": ""
    }))
    .unwrap();

    assert_eq!(config.fetch_limit(), Some(10));
    assert_eq!(config.top_n(), None);
    assert_eq!(config.similarity_threshold(), Some(0.85));
    assert_eq!(config.ollama_model(), Some("qwen3:8b"));
    assert_eq!(config.whatsapp_phone(), None);

    assert_eq!(PipelineConfig::validate_value("TOP_N", " 5 ").unwrap(), "5");
    assert!(PipelineConfig::validate_value("TOP_N", "0").is_err());
    assert!(PipelineConfig::validate_value("SIMILARITY_THRESHOLD", "1.5").is_err());
    assert!(PipelineConfig::validate_value("WHATSAPP_PHONE", "+91 98").is_err());
    assert_eq!(PipelineConfig::validate_value("WHATSAPP_PHONE", "919876543210").unwrap(), "919876543210");
}

#[test]
fn test_run_request_uses_newsletter_emails() {
    let newsletters = vec![
        Newsletter::new("Tech Weekly", "news@tech.io", 5).unwrap(),
        Newsletter::new("AI Breakfast", "ai@bf.com", 9).unwrap(),
    ];
    let request = RunRequest::for_newsletters(&newsletters, None);

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({ "newsletters": ["news@tech.io", "ai@bf.com"] })
    );
}

#[test]
fn test_whatsapp_pairing_pending() {
    let pairing = WhatsAppStatus { connected: false, qr: Some("iVBORw0...".into()) };
    let idle = WhatsAppStatus { connected: false, qr: None };
    let connected = WhatsAppStatus { connected: true, qr: None };

    assert!(pairing.pairing_pending());
    assert!(!idle.pairing_pending());
    assert!(!connected.pairing_pending());
}

#[test]
fn test_model_status_labels() {
    assert_eq!(ModelStatus::NotDownloaded.to_string(), "Not Downloaded");
    assert_eq!(ModelAction::Deactivate.to_string(), "deactivate");
    assert_eq!(ModelAction::Pull.endpoint(), "/api/models/pull");
}
