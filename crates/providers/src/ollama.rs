//! Ollama provider implementation.
//!
//! Talks to a local Ollama server through its native API:
//! - `/api/chat` for conversational completion with function tools
//! - `/api/generate` for bare single-shot generation
//! - `/api/tags` for model listing and health checks
//!
//! Streaming responses arrive as NDJSON lines rather than SSE.
//! Like Gemini, Ollama does not assign tool-call IDs, so this provider
//! synthesizes them.

use async_trait::async_trait;
use futures::StreamExt;
use nova_core::error::ProviderError;
use nova_core::message::{Message, MessageToolCall, Role};
use nova_core::provider::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

/// Local Ollama server provider.
pub struct OllamaProvider {
    name: String,
    base_url: String,
    /// Model used by the bare `generate` path.
    default_model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider pointing at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "ollama".into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_model: "llama3.2".into(),
            client,
        }
    }

    /// Set the model used by the bare `generate` path.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Convert transcript messages to Ollama chat messages.
    ///
    /// System messages fold into a single leading system message. Tool
    /// results must answer a call issued earlier in the transcript.
    fn to_api_messages(messages: &[Message]) -> Result<Vec<OllamaMessage>, ProviderError> {
        let mut known_calls: HashSet<&str> = HashSet::new();
        let mut system_parts: Vec<&str> = Vec::new();
        let mut rest: Vec<OllamaMessage> = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => system_parts.push(&msg.content),
                Role::User => rest.push(OllamaMessage {
                    role: "user".into(),
                    content: msg.content.clone(),
                    tool_calls: Vec::new(),
                    tool_name: None,
                }),
                Role::Assistant => {
                    for tc in &msg.tool_calls {
                        known_calls.insert(tc.id.as_str());
                    }
                    let tool_calls = msg
                        .tool_calls
                        .iter()
                        .map(|tc| OllamaToolCall {
                            function: OllamaFunctionCall {
                                name: tc.name.clone(),
                                arguments: serde_json::from_str(&tc.arguments)
                                    .unwrap_or_default(),
                            },
                        })
                        .collect();
                    rest.push(OllamaMessage {
                        role: "assistant".into(),
                        content: msg.content.clone(),
                        tool_calls,
                        tool_name: None,
                    });
                }
                Role::Tool => {
                    let call_id = msg.tool_call_id.as_deref().ok_or_else(|| {
                        ProviderError::Protocol("tool message without tool_call_id".into())
                    })?;
                    if !known_calls.contains(call_id) {
                        return Err(ProviderError::Protocol(format!(
                            "tool result '{call_id}' does not answer any prior tool call"
                        )));
                    }
                    rest.push(OllamaMessage {
                        role: "tool".into(),
                        content: msg.content.clone(),
                        tool_calls: Vec::new(),
                        tool_name: msg.name.clone(),
                    });
                }
            }
        }

        let mut result = Vec::with_capacity(rest.len() + 1);
        if !system_parts.is_empty() {
            result.push(OllamaMessage {
                role: "system".into(),
                content: system_parts.join("\n\n"),
                tool_calls: Vec::new(),
                tool_name: None,
            });
        }
        result.extend(rest);
        Ok(result)
    }

    /// Convert tool definitions to OpenAI-style function tools.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<serde_json::Value> {
        tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.json_schema(),
                    }
                })
            })
            .collect()
    }

    fn build_body(
        &self,
        request: &ChatRequest,
        stream: bool,
    ) -> Result<serde_json::Value, ProviderError> {
        let messages = Self::to_api_messages(&request.messages)?;

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "stream": stream,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["options"] = serde_json::json!({ "num_predict": max_tokens });
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        Ok(body)
    }

    fn usage_from(resp: &OllamaChatResponse) -> Option<Usage> {
        match (resp.prompt_eval_count, resp.eval_count) {
            (None, None) => None,
            (prompt, completion) => {
                let prompt = prompt.unwrap_or(0);
                let completion = completion.unwrap_or(0);
                Some(Usage {
                    prompt_tokens: prompt,
                    completion_tokens: completion,
                    total_tokens: prompt + completion,
                })
            }
        }
    }

    /// Convert an Ollama chat response into our ChatResponse.
    fn to_chat_response(resp: OllamaChatResponse, model: &str) -> ChatResponse {
        let usage = Self::usage_from(&resp);
        let api_msg = resp.message.unwrap_or_default();

        let mut message = Message::assistant(api_msg.content);
        message.tool_calls = api_msg
            .tool_calls
            .into_iter()
            .enumerate()
            .map(|(i, tc)| MessageToolCall {
                id: format!("call_{}_{}", tc.function.name, i + 1),
                name: tc.function.name,
                arguments: serde_json::to_string(&tc.function.arguments).unwrap_or_default(),
            })
            .collect();

        let finish_reason = if message.tool_calls.is_empty() {
            resp.done_reason
        } else {
            Some("tool_calls".into())
        };

        ChatResponse {
            message,
            finish_reason,
            usage,
            model: model.to_string(),
        }
    }

    /// Forward an NDJSON byte stream into the channel as text chunks.
    ///
    /// Lines can split anywhere across reads, so bytes accumulate in a
    /// buffer and only complete lines are parsed. The `done` event ends the
    /// stream with a final chunk carrying token counts; a stream that ends
    /// without one still produces a bare `done` chunk. Returns early when
    /// the receiver goes away.
    async fn pump_ndjson<S, B, E>(
        mut byte_stream: S,
        tx: tokio::sync::mpsc::Sender<Result<StreamChunk, ProviderError>>,
    ) where
        S: futures::Stream<Item = Result<B, E>> + Unpin,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        let mut buffer = String::new();

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

            buffer.push_str(&String::from_utf8_lossy(bytes.as_ref()));

            // NDJSON: one JSON object per line
            while let Some(line_end) = buffer.find('\n') {
                let line = buffer[..line_end].trim().to_string();
                buffer = buffer[line_end + 1..].to_string();

                if line.is_empty() {
                    continue;
                }

                let event: OllamaChatResponse = match serde_json::from_str(&line) {
                    Ok(v) => v,
                    Err(e) => {
                        trace!(error = %e, line = %line, "Ignoring unparseable Ollama line");
                        continue;
                    }
                };

                if event.done {
                    let usage = Self::usage_from(&event);
                    let _ = tx
                        .send(Ok(StreamChunk {
                            content: event
                                .message
                                .and_then(|m| (!m.content.is_empty()).then_some(m.content)),
                            done: true,
                            usage,
                        }))
                        .await;
                    return;
                }

                if let Some(msg) = event.message {
                    if !msg.content.is_empty() {
                        let chunk = StreamChunk {
                            content: Some(msg.content),
                            done: false,
                            usage: None,
                        };
                        if tx.send(Ok(chunk)).await.is_err() {
                            return;
                        }
                    }
                }
            }
        }

        // Stream ended without a done marker
        let _ = tx
            .send(Ok(StreamChunk {
                content: None,
                done: true,
                usage: None,
            }))
            .await;
    }

    async fn check_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ProviderError> {
        let status = response.status().as_u16();
        if status == 404 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ModelNotFound(body));
        }
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Ollama API error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl nova_core::Provider for OllamaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.build_body(&request, false)?;

        debug!(provider = "ollama", model = %request.model, "Sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let api_resp: OllamaChatResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse Ollama response: {e}"),
            })?;

        Ok(Self::to_chat_response(api_resp, &request.model))
    }

    async fn stream(
        &self,
        request: ChatRequest,
    ) -> Result<
        tokio::sync::mpsc::Receiver<Result<StreamChunk, ProviderError>>,
        ProviderError,
    > {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.build_body(&request, true)?;

        debug!(provider = "ollama", model = %request.model, "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        tokio::spawn(Self::pump_ndjson(response.bytes_stream(), tx));
        Ok(rx)
    }

    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut body = serde_json::json!({
            "model": self.default_model,
            "prompt": prompt,
            "stream": false,
        });
        if let Some(sys) = system {
            body["system"] = serde_json::json!(sys);
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let api_resp: OllamaGenerateResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse Ollama response: {e}"),
            })?;

        Ok(api_resp.response)
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let tags: OllamaTagsResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse Ollama tags: {e}"),
            })?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

// --- Ollama API types ---

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,

    content: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaToolCall>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

impl Default for OllamaMessage {
    fn default() -> Self {
        Self {
            role: "assistant".into(),
            content: String::new(),
            tool_calls: Vec::new(),
            tool_name: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaFunctionCall {
    name: String,

    /// Ollama sends arguments as a JSON object, not a string
    #[serde(default)]
    arguments: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    message: Option<OllamaMessage>,

    #[serde(default)]
    done: bool,

    #[serde(default)]
    done_reason: Option<String>,

    #[serde(default)]
    prompt_eval_count: Option<u32>,

    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    name: String,
}
