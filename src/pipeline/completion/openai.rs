use std::sync::OnceLock;
use std::time::Duration;

use super::credential::ApiCredential;
use super::types::{ChatCompletionResponse, CompletionTransport, ErrorEnvelope};
use super::TransportError;
use crate::config::Settings;
use crate::pipeline::request::GenerationRequest;

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// HTTPS transport to an OpenAI-compatible chat-completion endpoint.
///
/// The blocking client is built on first use, from a blocking thread, and
/// reused for every later attempt.
#[derive(Debug, Clone)]
pub struct OpenAiTransport {
    base_url: String,
    timeout: Duration,
    client: OnceLock<reqwest::blocking::Client>,
}

impl OpenAiTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: OnceLock::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.base_url, settings.http_timeout)
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH)
    }

    fn client(&self) -> Result<&reqwest::blocking::Client, TransportError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let built = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(self.client.get_or_init(|| built))
    }
}

impl CompletionTransport for OpenAiTransport {
    fn send(
        &self,
        request: &GenerationRequest,
        credential: &ApiCredential,
    ) -> Result<ChatCompletionResponse, TransportError> {
        let response = self
            .client()?
            .post(self.endpoint())
            .bearer_auth(credential.expose())
            .json(request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Network(format!(
                        "request timed out after {}s",
                        self.timeout.as_secs()
                    ))
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: provider_error_message(&body, status.canonical_reason()),
            });
        }

        response
            .json::<ChatCompletionResponse>()
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))
    }
}

/// Provider's own error message if the body carries one, else the status reason.
fn provider_error_message(body: &str, reason: Option<&str>) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|m| !m.is_empty())
        .or_else(|| reason.map(str::to_string))
        .unwrap_or_else(|| "Unknown error".to_string())
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::pipeline::completion::client::testing::RecordingSleeper;
    use crate::pipeline::completion::{CompletionClient, RetryPolicy};
    use crate::pipeline::request::build;

    const KEY: &str = "sk-test-key";

    /// Upstream stand-in: rejects unknown keys, has no `gpt-4o`, rate limits
    /// `busy-model` and answers everything else.
    async fn chat_completions(
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if auth != format!("Bearer {KEY}") {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": {"message": "Incorrect API key provided"}})),
            );
        }
        match body["model"].as_str() {
            Some("gpt-4o") => (
                StatusCode::NOT_FOUND,
                Json(json!({"error": {"message": "The model `gpt-4o` does not exist"}})),
            ),
            Some("busy-model") => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"error": {"message": "Rate limit reached"}})),
            ),
            Some(model) => (
                StatusCode::OK,
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": format!("Report from {model}")}}],
                    "usage": {"prompt_tokens": 120, "completion_tokens": 80, "total_tokens": 200}
                })),
            ),
            None => (StatusCode::BAD_REQUEST, Json(json!({"error": {"message": "model required"}}))),
        }
    }

    async fn mock_upstream() -> SocketAddr {
        let app = Router::new().route(CHAT_COMPLETIONS_PATH, post(chat_completions));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn transport_for(addr: SocketAddr) -> OpenAiTransport {
        OpenAiTransport::new(&format!("http://{addr}/"), Duration::from_secs(5))
    }

    fn send_blocking(
        transport: OpenAiTransport,
        model: &str,
        key: &str,
    ) -> tokio::task::JoinHandle<Result<ChatCompletionResponse, TransportError>> {
        let mut request = build("medical_report", "PATIENT DATA", None).unwrap();
        request.model = model.to_string();
        let credential = ApiCredential::parse(key).unwrap();
        tokio::task::spawn_blocking(move || transport.send(&request, &credential))
    }

    #[tokio::test]
    async fn decodes_success_envelope_with_bearer_auth() {
        let addr = mock_upstream().await;
        let response = send_blocking(transport_for(addr), "gpt-4o-mini", KEY)
            .await
            .unwrap()
            .unwrap();

        let message = response.choices[0].message.as_ref().unwrap();
        assert_eq!(message.content.as_deref(), Some("Report from gpt-4o-mini"));
        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 120);
        assert_eq!(usage.total_tokens, 200);
    }

    #[tokio::test]
    async fn error_statuses_carry_provider_message() {
        let addr = mock_upstream().await;

        let not_found = send_blocking(transport_for(addr), "gpt-4o", KEY).await.unwrap();
        assert_eq!(
            not_found.unwrap_err(),
            TransportError::Status {
                status: 404,
                message: "The model `gpt-4o` does not exist".into()
            }
        );

        let limited = send_blocking(transport_for(addr), "busy-model", KEY).await.unwrap();
        let err = limited.unwrap_err();
        assert_eq!(err.status(), Some(429));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("Rate limit reached"));

        let rejected = send_blocking(transport_for(addr), "gpt-4o-mini", "sk-wrong")
            .await
            .unwrap();
        assert_eq!(
            rejected.unwrap_err(),
            TransportError::Status {
                status: 401,
                message: "Incorrect API key provided".into()
            }
        );
    }

    #[tokio::test]
    async fn client_falls_back_over_http() {
        let addr = mock_upstream().await;
        let transport = transport_for(addr);
        let sleeper = RecordingSleeper::default();
        let completion = CompletionClient::new(
            Box::new(transport),
            RetryPolicy::default(),
            Box::new(sleeper.clone()),
        );

        let result = tokio::task::spawn_blocking(move || {
            let request = build("medical_report", "PATIENT DATA", None).unwrap();
            let credential = ApiCredential::parse(KEY).unwrap();
            completion.complete(&request, &credential)
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(result.model_actually_used, "gpt-4o-mini");
        assert_eq!(result.content, "Report from gpt-4o-mini");
        assert!(sleeper.slept().is_empty());
    }

    #[test]
    fn endpoint_joins_base_url() {
        let transport = OpenAiTransport::new("https://api.openai.com/", Duration::from_secs(5));
        assert_eq!(
            transport.endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn error_message_prefers_provider_text() {
        assert_eq!(
            provider_error_message(
                r#"{"error": {"message": "The model `gpt-4o` does not exist"}}"#,
                Some("Not Found")
            ),
            "The model `gpt-4o` does not exist"
        );
        assert_eq!(provider_error_message("<html>", Some("Not Found")), "Not Found");
        assert_eq!(provider_error_message("", None), "Unknown error");
    }

    #[test]
    fn unreachable_host_is_network_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let transport = OpenAiTransport::new("http://127.0.0.1:9", Duration::from_secs(2));
        let credential = ApiCredential::parse("sk-test").unwrap();
        let request = crate::pipeline::request::build("medical_report", "x", None).unwrap();
        match transport.send(&request, &credential) {
            Err(TransportError::Network(_)) => {}
            other => panic!("expected network error, got {other:?}"),
        }
    }
}
