//! OpenAI-compatible completion provider.
//!
//! Works with: DeepSeek, OpenAI, OpenRouter, Ollama, vLLM, Together AI,
//! Groq, and any endpoint exposing `/chat/completions`.
//!
//! Supports:
//! - Chat completions (non-streaming and streaming SSE)
//! - Health checks

use async_trait::async_trait;
use futures::StreamExt;
use mastermind_core::error::ProviderError;
use mastermind_core::message::{Message, Role};
use mastermind_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// An OpenAI-compatible completion provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create a DeepSeek provider (convenience constructor).
    pub fn deepseek(api_key: impl Into<String>) -> Self {
        Self::new("deepseek", "https://api.deepseek.com/v1", api_key)
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Create an Ollama provider (convenience constructor).
    pub fn ollama(base_url: Option<&str>) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
        )
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str().into(),
                content: Some(m.content.clone()),
            })
            .collect()
    }

    fn request_body(request: &ProviderRequest, stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": stream,
        });

        if stream {
            body["stream_options"] = serde_json::json!({ "include_usage": true });
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    /// Map a non-success HTTP status to a provider error.
    async fn status_error(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        match status {
            429 => ProviderError::RateLimited {
                retry_after_secs: 5,
            },
            401 | 403 => ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ),
            _ => {
                let error_body = response.text().await.unwrap_or_default();
                warn!(status, body = %error_body, "Provider returned error");
                ProviderError::ApiError {
                    status_code: status,
                    message: error_body,
                }
            }
        }
    }

    fn transport_error(e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl mastermind_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(&request, false);

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if response.status().as_u16() != 200 {
            return Err(Self::status_error(response).await);
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice =
            api_response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| ProviderError::ApiError {
                    status_code: 200,
                    message: "No choices in response".into(),
                })?;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ProviderResponse {
            message: Message {
                role: Role::Assistant,
                content: choice.message.content.unwrap_or_default(),
            },
            usage,
            model: api_response.model,
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(Self::transport_error)?;

        Ok(response.status().is_success())
    }

    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ChunkReceiver, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(&request, true);

        debug!(provider = %self.name, model = %request.model, "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if response.status().as_u16() != 200 {
            return Err(Self::status_error(response).await);
        }

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        let provider_name = self.name.clone();

        // Read the SSE byte stream and forward parsed chunks
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            // Raw bytes: a multi-byte character may straddle two network chunks
            let mut buffer: Vec<u8> = Vec::new();
            let mut finished = false;

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                buffer.extend_from_slice(&bytes);

                while let Some(line_end) = buffer.iter().position(|&b| b == b'\n') {
                    let raw: Vec<u8> = buffer.drain(..=line_end).collect();
                    let line = String::from_utf8_lossy(&raw);

                    let Some(frame) = parse_sse_line(&line) else {
                        continue;
                    };

                    match frame {
                        SseFrame::Done => {
                            let _ = tx.send(Ok(StreamChunk::end())).await;
                            return;
                        }
                        SseFrame::Unparseable { data, error } => {
                            trace!(
                                provider = %provider_name,
                                data = %data,
                                error = %error,
                                "Ignoring unparseable SSE chunk"
                            );
                        }
                        SseFrame::Delta {
                            content,
                            finish_reason,
                            usage,
                        } => {
                            finished |= finish_reason.is_some();

                            if let Some(text) = content.filter(|c| !c.is_empty()) {
                                if tx.send(Ok(StreamChunk::text(text))).await.is_err() {
                                    return; // receiver dropped
                                }
                            }

                            // Usage arrives in the last chunk when stream_options is honored
                            if let Some(usage) = usage {
                                let _ = tx
                                    .send(Ok(StreamChunk {
                                        usage: Some(usage),
                                        ..StreamChunk::end()
                                    }))
                                    .await;
                                return;
                            }
                        }
                    }
                }
            }

            if finished {
                let _ = tx.send(Ok(StreamChunk::end())).await;
            } else {
                let _ = tx
                    .send(Err(ProviderError::StreamInterrupted(
                        "connection closed before end of stream".into(),
                    )))
                    .await;
            }
        });

        Ok(rx)
    }
}

/// One meaningful SSE line.
#[derive(Debug)]
enum SseFrame {
    /// `data: [DONE]`
    Done,
    Delta {
        content: Option<String>,
        finish_reason: Option<String>,
        usage: Option<Usage>,
    },
    Unparseable {
        data: String,
        error: String,
    },
}

/// Parse a single SSE line. Blank lines, comments and non-data fields yield `None`.
fn parse_sse_line(line: &str) -> Option<SseFrame> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let data = line.strip_prefix("data:")?.trim();
    if data == "[DONE]" {
        return Some(SseFrame::Done);
    }

    match serde_json::from_str::<StreamResponse>(data) {
        Ok(resp) => {
            let (content, finish_reason) = resp
                .choices
                .into_iter()
                .next()
                .map(|c| (c.delta.content, c.finish_reason))
                .unwrap_or((None, None));
            Some(SseFrame::Delta {
                content,
                finish_reason,
                usage: resp.usage.map(|u| Usage {
                    prompt_tokens: u.prompt_tokens,
                    completion_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                }),
            })
        }
        Err(e) => Some(SseFrame::Unparseable {
            data: data.to_string(),
            error: e.to_string(),
        }),
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

// --- Streaming SSE types ---

/// A single SSE `data: {...}` chunk from a streaming response.
#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastermind_core::Provider;

    #[test]
    fn deepseek_constructor() {
        let provider = OpenAiCompatProvider::deepseek("sk-test");
        assert_eq!(provider.name(), "deepseek");
        assert!(provider.base_url.contains("api.deepseek.com"));
    }

    #[test]
    fn ollama_constructor() {
        let provider = OpenAiCompatProvider::ollama(None);
        assert_eq!(provider.name(), "ollama");
        assert!(provider.base_url.contains("localhost:11434"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let provider = OpenAiCompatProvider::new("custom", "http://localhost:8000/v1/", "k");
        assert_eq!(provider.base_url, "http://localhost:8000/v1");
    }

    #[test]
    fn message_conversion() {
        let messages = vec![
            Message::system("You are a judge"),
            Message::user("Hello"),
            Message::assistant("Hi"),
        ];
        let api_messages = OpenAiCompatProvider::to_api_messages(&messages);
        assert_eq!(api_messages.len(), 3);
        assert_eq!(api_messages[0].role, "system");
        assert_eq!(api_messages[1].role, "user");
        assert_eq!(api_messages[2].role, "assistant");
    }

    #[test]
    fn streaming_body_requests_usage() {
        let request = ProviderRequest {
            model: "deepseek-chat".into(),
            messages: vec![Message::user("q")],
            temperature: 0.2,
            max_tokens: Some(512),
            stream: true,
        };
        let body = OpenAiCompatProvider::request_body(&request, true);
        assert_eq!(body["stream"], true);
        assert_eq!(body["stream_options"]["include_usage"], true);
        assert_eq!(body["max_tokens"], 512);

        let body = OpenAiCompatProvider::request_body(&request, false);
        assert!(body.get("stream_options").is_none());
    }

    // --- SSE parsing tests ---

    #[test]
    fn parse_content_delta() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hello"},"finish_reason":null}]}"#;
        match parse_sse_line(line) {
            Some(SseFrame::Delta {
                content,
                finish_reason,
                usage,
            }) => {
                assert_eq!(content.as_deref(), Some("Hello"));
                assert!(finish_reason.is_none());
                assert!(usage.is_none());
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn parse_finish_chunk() {
        let line = r#"data: {"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        match parse_sse_line(line) {
            Some(SseFrame::Delta {
                content,
                finish_reason,
                ..
            }) => {
                assert!(content.is_none());
                assert_eq!(finish_reason.as_deref(), Some("stop"));
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn parse_usage_chunk() {
        let line = r#"data: {"choices":[],"usage":{"prompt_tokens":10,"completion_tokens":5,"total_tokens":15}}"#;
        match parse_sse_line(line) {
            Some(SseFrame::Delta { usage, .. }) => {
                let usage = usage.unwrap();
                assert_eq!(usage.prompt_tokens, 10);
                assert_eq!(usage.total_tokens, 15);
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn parse_done_and_ignorable_lines() {
        assert!(matches!(parse_sse_line("data: [DONE]\r\n"), Some(SseFrame::Done)));
        assert!(parse_sse_line("").is_none());
        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(parse_sse_line("event: message").is_none());
    }

    #[test]
    fn parse_garbage_is_reported_not_fatal() {
        assert!(matches!(
            parse_sse_line("data: {not json"),
            Some(SseFrame::Unparseable { .. })
        ));
    }

    #[test]
    fn parse_api_response() {
        let data = r#"{
            "model": "deepseek-chat",
            "choices": [{"message": {"role": "assistant", "content": "Yes."}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.model, "deepseek-chat");
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Yes."));
        assert_eq!(parsed.usage.unwrap().total_tokens, 4);
    }
}
