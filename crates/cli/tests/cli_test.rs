//! Argument parsing and command behaviour against a mock backend.

use std::time::Duration;

use clap::Parser;
use nokast_cli::cli::{ConfigCommand, NewslettersCommand, WhatsAppCommand};
use nokast_cli::commands::{self, wait_for_completion};
use nokast_cli::{Cli, Commands};
use nokast_common::{ApiClient, ClientConfig};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::new(&server.uri()).unwrap();
    (server, client)
}

fn status_body(running: bool, last_result: Option<&str>) -> serde_json::Value {
    json!({ "ok": true, "pipeline_available": true,
            "last_run": { "running": running, "last_result": last_result } })
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "nokast",
        "newsletters",
        "add",
        "Import AI",
        "jack@importai.net",
        "--priority",
        "8",
        "--server",
        "http://10.0.0.2:4000",
    ])
    .unwrap();
    assert_eq!(cli.server.as_deref(), Some("http://10.0.0.2:4000"));
    match cli.command {
        Some(Commands::Newsletters(NewslettersCommand::Add {
            sender,
            email,
            priority,
        })) => {
            assert_eq!(sender, "Import AI");
            assert_eq!(email, "jack@importai.net");
            assert_eq!(priority, 8);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_subcommand_shapes() {
    let cli = Cli::try_parse_from(["nokast"]).unwrap();
    assert!(cli.command.is_none());

    let cli = Cli::try_parse_from(["nokast", "run", "--fetch-limit", "20", "--wait"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Run {
            fetch_limit: Some(20),
            wait: true
        })
    ));

    let cli = Cli::try_parse_from(["nokast", "config", "set", "TOP_N=5", "FETCH_LIMIT=10"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Config(ConfigCommand::Set { assignments })) if assignments.len() == 2
    ));

    let cli = Cli::try_parse_from(["nokast", "whatsapp", "status", "--qr-out", "qr.png"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::WhatsApp(WhatsAppCommand::Status { qr_out: Some(_) }))
    ));

    assert!(Cli::try_parse_from(["nokast", "ask"]).is_err());
    assert!(Cli::try_parse_from(["nokast", "config", "set"]).is_err());
}

#[tokio::test]
async fn test_wait_returns_once_pipeline_stops() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body(true, None)))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body(false, Some("ok"))))
        .mount(&server)
        .await;

    let status = tokio::time::timeout(
        Duration::from_secs(5),
        wait_for_completion(&client, Duration::from_millis(20)),
    )
    .await
    .unwrap();
    assert!(!status.is_running());

    let polls = server.received_requests().await.unwrap();
    assert_eq!(polls.len(), 3);
}

#[tokio::test]
async fn test_run_sends_saved_newsletters() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/newsletters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "newsletters": [
            { "id": 1, "sender": "The Batch", "email": "thebatch@deeplearning.ai", "priority": 7 }
        ]})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/run"))
        .and(body_json(json!({
            "newsletters": ["thebatch@deeplearning.ai"],
            "fetch_limit": 15
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "message": "pipeline_started" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let command = Commands::Run {
        fetch_limit: Some(15),
        wait: false,
    };
    commands::execute(&client, &ClientConfig::default(), command)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_run_without_newsletters_fails() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/newsletters"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "newsletters": [] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/run"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let command = Commands::Run {
        fetch_limit: None,
        wait: false,
    };
    let err = commands::execute(&client, &ClientConfig::default(), command)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No newsletters saved"));
}

#[tokio::test]
async fn test_config_set_rejects_invalid_values_before_sending() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(0)
        .mount(&server)
        .await;

    let command = Commands::Config(ConfigCommand::Set {
        assignments: vec!["TOP_N=5".to_string(), "FETCH_LIMIT=-1".to_string()],
    });
    assert!(commands::execute(&client, &ClientConfig::default(), command)
        .await
        .is_err());
}

#[tokio::test]
async fn test_newsletter_remove_saves_remaining() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/newsletters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "newsletters": [
            { "id": 1, "sender": "The Batch", "email": "thebatch@deeplearning.ai", "priority": 7 },
            { "id": 2, "sender": "TLDR AI", "email": "dan@tldrnewsletter.com" }
        ]})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/newsletters"))
        .and(body_json(json!({ "newsletters": [
            { "id": "2", "sender": "TLDR AI", "email": "dan@tldrnewsletter.com", "priority": 5 }
        ]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "count": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let command = Commands::Newsletters(NewslettersCommand::Remove {
        email: "TheBatch@DeepLearning.ai".to_string(),
    });
    commands::execute(&client, &ClientConfig::default(), command)
        .await
        .unwrap();
}
