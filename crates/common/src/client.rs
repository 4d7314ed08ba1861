//! Typed client for the Nokast backend's `/api` surface.
//!
//! Every reply is a JSON envelope carrying `ok`. Failures are classified as
//! transport errors (no response), status errors (non-2xx, with the backend's
//! `error`/`detail` text when present) or rejections (2xx with `ok: false`).

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{NokastError, Result};
use crate::types::*;

const STATUS: &str = "/api/status";
const NEWSLETTERS: &str = "/api/newsletters";
const PRIORITY_KEYWORDS: &str = "/api/priority-keywords";
const SECRETS_STATUS: &str = "/api/secrets/status";
const STORIES: &str = "/api/stories";
const RUNTIME_STATUS: &str = "/api/ollama/status";
const MODELS: &str = "/api/models";
const RUN: &str = "/api/run";
const AI_HELPER: &str = "/api/ai-helper";
const DELETE_CREDENTIALS: &str = "/api/delete-credentials";
const CONFIG: &str = "/api/config";
const WHATSAPP_STATUS: &str = "/api/whatsapp/status";
const WHATSAPP_CONNECT: &str = "/api/whatsapp/connect";

#[derive(Deserialize)]
struct NewslettersEnvelope {
    #[serde(default)]
    newsletters: Vec<Newsletter>,
}

#[derive(Deserialize)]
struct KeywordsEnvelope {
    #[serde(default)]
    keywords: Vec<PriorityKeyword>,
}

#[derive(Deserialize)]
struct StoriesEnvelope {
    #[serde(default)]
    stories: Vec<Story>,
}

#[derive(Deserialize)]
struct SecretsEnvelope {
    #[serde(default)]
    secrets: SecretsStatus,
}

#[derive(Deserialize)]
struct ModelsEnvelope {
    #[serde(default)]
    models: Vec<DownloadedModel>,
}

#[derive(Deserialize)]
struct CountEnvelope {
    #[serde(default)]
    count: usize,
}

#[derive(Deserialize)]
struct MessageEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

#[derive(Deserialize)]
struct ConfigEnvelope {
    #[serde(default)]
    config: BTreeMap<String, Value>,
}

#[derive(Serialize)]
struct NewslettersPayload<'a> {
    newsletters: &'a [Newsletter],
}

#[derive(Serialize)]
struct KeywordsPayload<'a> {
    keywords: &'a [PriorityKeyword],
}

#[derive(Serialize)]
struct HelperPayload<'a> {
    summary: &'a str,
    prompt: &'a str,
}

/// HTTP client for one backend instance. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_timeout(&config.server_url, config.sync.request_timeout())
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let parsed = url::Url::parse(base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NokastError::Config(format!(
                "unsupported scheme '{}' in {base_url}",
                parsed.scheme()
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| NokastError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn send(&self, endpoint: &str, request: reqwest::RequestBuilder) -> Result<Value> {
        debug!(endpoint, "Sending request");
        let response = request.send().await.map_err(|e| transport(endpoint, e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| transport(endpoint, e))?;
        let value = serde_json::from_str::<Value>(&body).ok();

        if !status.is_success() {
            let message = value
                .as_ref()
                .and_then(envelope_message)
                .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty() && b.len() <= 200));
            debug!(endpoint, status = status.as_u16(), "Request returned non-success status");
            return Err(NokastError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let value = value.ok_or_else(|| NokastError::Decode {
            endpoint: endpoint.to_string(),
            message: "response body is not JSON".to_string(),
        })?;

        if value.get("ok").and_then(Value::as_bool) == Some(false) {
            return Err(NokastError::Rejected {
                endpoint: endpoint.to_string(),
                message: envelope_message(&value)
                    .unwrap_or_else(|| "the request was not accepted".to_string()),
            });
        }

        Ok(value)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let value = self.send(endpoint, self.http.get(self.url(endpoint))).await?;
        decode(endpoint, value)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let value = self
            .send(endpoint, self.http.post(self.url(endpoint)).json(body))
            .await?;
        decode(endpoint, value)
    }

    pub async fn newsletters(&self) -> Result<Vec<Newsletter>> {
        let envelope: NewslettersEnvelope = self.get(NEWSLETTERS).await?;
        Ok(envelope.newsletters)
    }

    /// Replaces the saved newsletter list. Returns the stored count.
    #[instrument(skip(self, newsletters), fields(count = newsletters.len()))]
    pub async fn save_newsletters(&self, newsletters: &[Newsletter]) -> Result<usize> {
        let newsletters: Vec<Newsletter> = newsletters
            .iter()
            .cloned()
            .map(|mut n| {
                n.set_priority(n.priority as i64);
                n
            })
            .collect();
        let envelope: CountEnvelope = self
            .post(NEWSLETTERS, &NewslettersPayload { newsletters: &newsletters })
            .await?;
        Ok(envelope.count)
    }

    pub async fn priority_keywords(&self) -> Result<Vec<PriorityKeyword>> {
        let envelope: KeywordsEnvelope = self.get(PRIORITY_KEYWORDS).await?;
        Ok(envelope.keywords)
    }

    /// Replaces the saved keyword set. Blank and duplicate keywords are dropped.
    #[instrument(skip(self, keywords), fields(count = keywords.len()))]
    pub async fn save_priority_keywords(&self, keywords: &[PriorityKeyword]) -> Result<usize> {
        let keywords = PriorityKeyword::normalize(keywords.to_vec());
        let envelope: CountEnvelope = self
            .post(PRIORITY_KEYWORDS, &KeywordsPayload { keywords: &keywords })
            .await?;
        Ok(envelope.count)
    }

    pub async fn secrets_status(&self) -> Result<SecretsStatus> {
        let envelope: SecretsEnvelope = self.get(SECRETS_STATUS).await?;
        Ok(envelope.secrets)
    }

    pub async fn stories(&self) -> Result<Vec<Story>> {
        let envelope: StoriesEnvelope = self.get(STORIES).await?;
        Ok(envelope.stories)
    }

    pub async fn pipeline_status(&self) -> Result<PipelineStatus> {
        self.get(STATUS).await
    }

    pub async fn runtime_status(&self) -> Result<RuntimeStatus> {
        self.get(RUNTIME_STATUS).await
    }

    pub async fn models(&self) -> Result<Vec<DownloadedModel>> {
        let envelope: ModelsEnvelope = self.get(MODELS).await?;
        Ok(envelope.models)
    }

    /// Applies `action` to `model`, returning the backend's message.
    #[instrument(skip(self))]
    pub async fn model_action(&self, action: ModelAction, model: &str) -> Result<String> {
        let model = model.trim();
        if model.is_empty() {
            return Err(NokastError::validation("No model specified"));
        }
        let envelope: MessageEnvelope = self
            .post(action.endpoint(), &json!({ "model": model }))
            .await?;
        Ok(envelope
            .message
            .unwrap_or_else(|| format!("{action} {model}: done")))
    }

    /// Asks the backend to start the pipeline. Returns as soon as the job is
    /// queued; completion is observed by polling [`ApiClient::pipeline_status`].
    #[instrument(skip(self, request), fields(newsletters = request.newsletters.len()))]
    pub async fn start_run(&self, request: &RunRequest) -> Result<String> {
        let envelope: MessageEnvelope = self.post(RUN, request).await?;
        Ok(envelope
            .message
            .unwrap_or_else(|| "pipeline_started".to_string()))
    }

    #[instrument(skip(self, summary), fields(summary_len = summary.len()))]
    pub async fn ask_helper(&self, summary: &str, prompt: &str) -> Result<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(NokastError::validation("Prompt cannot be empty"));
        }
        let value = self
            .send(
                AI_HELPER,
                self.http
                    .post(self.url(AI_HELPER))
                    .json(&HelperPayload { summary, prompt }),
            )
            .await?;
        Ok(match value.get("response") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
    }

    /// Uploads a credential file as multipart field `file`. Returns the path
    /// the backend stored it under.
    #[instrument(skip(self))]
    pub async fn upload_credential(&self, kind: CredentialKind, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));

        let endpoint = kind.endpoint();
        let value = self
            .send(endpoint, self.http.post(self.url(endpoint)).multipart(form))
            .await?;
        let envelope: MessageEnvelope = decode(endpoint, value)?;
        Ok(envelope.path.unwrap_or_default())
    }

    pub async fn delete_credentials(&self) -> Result<CredentialsRemoval> {
        let value = self
            .send(DELETE_CREDENTIALS, self.http.post(self.url(DELETE_CREDENTIALS)))
            .await?;
        decode(DELETE_CREDENTIALS, value)
    }

    pub async fn pipeline_config(&self) -> Result<PipelineConfig> {
        let envelope: ConfigEnvelope = self.get(CONFIG).await?;
        Ok(PipelineConfig(
            envelope
                .config
                .into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s,
                        Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (key, value)
                })
                .collect(),
        ))
    }

    /// Merges `config` into the backend configuration.
    pub async fn save_pipeline_config(&self, config: &PipelineConfig) -> Result<()> {
        let _: Value = self.post(CONFIG, config).await?;
        Ok(())
    }

    pub async fn whatsapp_status(&self) -> Result<WhatsAppStatus> {
        let value: Value = self.get(WHATSAPP_STATUS).await?;
        match value.get("status") {
            Some(status) => decode(WHATSAPP_STATUS, status.clone()),
            None => decode(WHATSAPP_STATUS, value),
        }
    }

    pub async fn whatsapp_connect(&self) -> Result<()> {
        self.send(WHATSAPP_CONNECT, self.http.post(self.url(WHATSAPP_CONNECT)))
            .await?;
        Ok(())
    }
}

fn transport(endpoint: &str, err: reqwest::Error) -> NokastError {
    NokastError::Transport {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| NokastError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

/// Human-readable failure text from an error envelope.
fn envelope_message(value: &Value) -> Option<String> {
    ["error", "detail", "err", "message"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|field| match field {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Null | Value::String(_) => None,
            other => Some(other.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_message_prefers_error_field() {
        let value = json!({ "ok": false, "error": "pipeline_unavailable", "message": "ignored" });
        assert_eq!(envelope_message(&value).as_deref(), Some("pipeline_unavailable"));
    }

    #[test]
    fn test_envelope_message_skips_blank_fields() {
        let value = json!({ "ok": false, "error": "  ", "err": "ollama: not found" });
        assert_eq!(envelope_message(&value).as_deref(), Some("ollama: not found"));
        assert_eq!(envelope_message(&json!({ "ok": false })), None);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:4000/").unwrap();
        assert_eq!(client.url(STATUS), "http://localhost:4000/api/status");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(ApiClient::new("ftp://example.com").is_err());
        assert!(ApiClient::new("not a url").is_err());
    }
}
