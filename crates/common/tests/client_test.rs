//! Client behaviour against a mock backend.

use std::collections::HashSet;

use nokast_common::types::*;
use nokast_common::{ApiClient, NokastError};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::new(&server.uri()).unwrap();
    (server, client)
}

async fn mount_get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_newsletters_round_trip() {
    let (server, client) = setup().await;
    mount_get(
        &server,
        "/api/newsletters",
        json!({ "ok": true, "newsletters": [
            { "id": "n1", "sender": "Tech Weekly", "email": "news@tech.io", "priority": 8 }
        ]}),
    )
    .await;

    let newsletters = client.newsletters().await.unwrap();
    assert_eq!(newsletters.len(), 1);
    assert_eq!(newsletters[0].sender, "Tech Weekly");

    Mock::given(method("POST"))
        .and(path("/api/newsletters"))
        .and(body_json(json!({ "newsletters": [
            { "id": "n1", "sender": "Tech Weekly", "email": "news@tech.io", "priority": 8 }
        ]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "count": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.save_newsletters(&newsletters).await.unwrap(), 1);
}

#[tokio::test]
async fn test_keywords_save_then_load_is_order_insensitive() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/priority-keywords"))
        .and(body_json(json!({ "keywords": [
            { "keyword": "llm", "score": 1.0 },
            { "keyword": "gpu", "score": 2.0 }
        ]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "count": 2 })))
        .expect(1)
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/api/priority-keywords",
        json!({ "ok": true, "keywords": [
            { "keyword": "gpu", "score": 2.0 },
            { "keyword": "llm", "score": 1.0 }
        ]}),
    )
    .await;

    let saved = vec![
        PriorityKeyword::new("llm"),
        PriorityKeyword::new(""),
        PriorityKeyword { keyword: "gpu".into(), score: 2.0 },
        PriorityKeyword::new("LLM"),
    ];
    assert_eq!(client.save_priority_keywords(&saved).await.unwrap(), 2);

    let loaded: HashSet<String> = client
        .priority_keywords()
        .await
        .unwrap()
        .into_iter()
        .map(|k| k.keyword)
        .collect();
    assert_eq!(loaded, HashSet::from(["llm".to_string(), "gpu".to_string()]));
}

#[tokio::test]
async fn test_status_error_carries_backend_message() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/run"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "ok": false, "error": "pipeline_unavailable" })),
        )
        .mount(&server)
        .await;

    let err = client
        .start_run(&RunRequest::default())
        .await
        .unwrap_err();

    match &err {
        NokastError::Status { status, message, .. } => {
            assert_eq!(*status, 500);
            assert_eq!(message.as_deref(), Some("pipeline_unavailable"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(err.user_message(), "pipeline_unavailable");
    assert!(!err.is_transport());
}

#[tokio::test]
async fn test_ok_false_is_rejected() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/models/pull"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": false, "err": "ollama: model not found" })),
        )
        .mount(&server)
        .await;

    let err = client
        .model_action(ModelAction::Pull, "nonexistent:7b")
        .await
        .unwrap_err();
    assert!(matches!(err, NokastError::Rejected { .. }));
    assert_eq!(err.user_message(), "ollama: model not found");
}

#[tokio::test]
async fn test_model_action_requires_a_name() {
    let (_server, client) = setup().await;
    let err = client.model_action(ModelAction::Remove, "  ").await.unwrap_err();
    assert!(matches!(err, NokastError::Validation(_)));
}

#[tokio::test]
async fn test_model_action_posts_model_name() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/models/activate"))
        .and(body_json(json!({ "model": "phi3:mini" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true, "message": "phi3:mini loaded" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let message = client
        .model_action(ModelAction::Activate, " phi3:mini ")
        .await
        .unwrap();
    assert_eq!(message, "phi3:mini loaded");
}

#[tokio::test]
async fn test_start_run_sends_selected_emails() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/run"))
        .and(body_json(json!({ "newsletters": ["news@tech.io"], "fetch_limit": 20 })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true, "message": "pipeline_started" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let newsletters = vec![Newsletter::new("Tech Weekly", "news@tech.io", 5).unwrap()];
    let message = client
        .start_run(&RunRequest::for_newsletters(&newsletters, Some(20)))
        .await
        .unwrap();
    assert_eq!(message, "pipeline_started");
}

#[tokio::test]
async fn test_status_endpoints() {
    let (server, client) = setup().await;
    mount_get(
        &server,
        "/api/status",
        json!({ "ok": true, "pipeline_available": true,
                "last_run": { "running": true, "last_result": null } }),
    )
    .await;
    mount_get(
        &server,
        "/api/ollama/status",
        json!({ "ok": true, "running": true, "cli_available": true, "server_up": true,
                "running_models": ["llama3.2:1b"] }),
    )
    .await;
    mount_get(
        &server,
        "/api/models",
        json!({ "ok": true, "models": [{ "name": "llama3.2:1b", "size": "1.3 GB" }] }),
    )
    .await;

    let pipeline = client.pipeline_status().await.unwrap();
    assert!(pipeline.is_running());
    assert!(!pipeline.completes_generation(true));

    let runtime = client.runtime_status().await.unwrap();
    assert_eq!(runtime.running_models, vec!["llama3.2:1b".to_string()]);

    let models = client.models().await.unwrap();
    assert_eq!(models[0].size.as_deref(), Some("1.3 GB"));
}

#[tokio::test]
async fn test_stories_and_secrets() {
    let (server, client) = setup().await;
    mount_get(
        &server,
        "/api/stories",
        json!({ "ok": true, "stories": [
            { "id": 1, "title": "GPU prices fall", "summary": "Cheaper compute.", "score": 7.2 }
        ]}),
    )
    .await;
    mount_get(
        &server,
        "/api/secrets/status",
        json!({ "ok": true, "secrets": {
            "google_credentials": { "exists": true, "path": "/s/c.json" },
            "google_token": { "exists": true, "path": "/s/t.json" },
            "env": { "exists": false, "path": "/s/.env" }
        }}),
    )
    .await;

    let stories = client.stories().await.unwrap();
    assert_eq!(stories[0].title, "GPU prices fall");

    let secrets = client.secrets_status().await.unwrap();
    assert!(secrets.gmail_connected());
    assert!(!secrets.env.exists);
}

#[tokio::test]
async fn test_helper_reply() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/ai-helper"))
        .and(body_json(json!({ "summary": "**A:** b", "prompt": "Why?" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "response": "Because." })),
        )
        .mount(&server)
        .await;

    assert_eq!(client.ask_helper("**A:** b", " Why? ").await.unwrap(), "Because.");
    assert!(client.ask_helper("**A:** b", "").await.is_err());
}

#[tokio::test]
async fn test_upload_credential_sends_multipart_file() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/upload-google-token"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("{\"token\":\"abc\"}"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true, "path": "/secrets/token.json" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("token.json");
    std::fs::write(&file, "{\"token\":\"abc\"}").unwrap();

    let stored = client
        .upload_credential(CredentialKind::GoogleToken, &file)
        .await
        .unwrap();
    assert_eq!(stored, "/secrets/token.json");
}

#[tokio::test]
async fn test_delete_credentials_reports_partial_failure() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/delete-credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "removed": ["/s/c.json"],
            "errors": [{ "file": "/s/t.json", "error": "permission denied" }]
        })))
        .mount(&server)
        .await;

    let removal = client.delete_credentials().await.unwrap();
    assert_eq!(removal.removed, vec!["/s/c.json".to_string()]);
    assert_eq!(removal.errors[0].error, "permission denied");
}

#[tokio::test]
async fn test_pipeline_config_values_are_stringified() {
    let (server, client) = setup().await;
    mount_get(
        &server,
        "/api/config",
        json!({ "ok": true, "config": { "FETCH_LIMIT": 10, "OLLAMA_MODEL": "qwen3:8b", "TOP_N": null } }),
    )
    .await;

    let config = client.pipeline_config().await.unwrap();
    assert_eq!(config.fetch_limit(), Some(10));
    assert_eq!(config.ollama_model(), Some("qwen3:8b"));
    assert_eq!(config.get("TOP_N"), Some(""));
}

#[tokio::test]
async fn test_save_pipeline_config_posts_flat_map() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/config"))
        .and(body_json(json!({ "TOP_N": "5" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = PipelineConfig::default();
    config.set(PipelineConfig::TOP_N, "5");
    client.save_pipeline_config(&config).await.unwrap();
}

#[tokio::test]
async fn test_whatsapp_status_nested_envelope() {
    let (server, client) = setup().await;
    mount_get(
        &server,
        "/api/whatsapp/status",
        json!({ "ok": true, "status": { "connected": false, "qr": "iVBORw0KGgo=" } }),
    )
    .await;

    let status = client.whatsapp_status().await.unwrap();
    assert!(status.pairing_pending());
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/stories"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = client.stories().await.unwrap_err();
    assert!(matches!(err, NokastError::Decode { .. }));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Nothing listens on port 9 in the test environment.
    let client = ApiClient::new("http://127.0.0.1:9").unwrap();
    let err = client.pipeline_status().await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(
        err.user_message(),
        "Could not reach the Nokast backend. Is it running?"
    );
}
