//! Google Gemini provider implementation.
//!
//! Uses the `generativelanguage.googleapis.com` v1beta REST API directly.
//!
//! Features:
//! - `x-goog-api-key` header authentication
//! - System prompt via the top-level `systemInstruction` slot
//! - Native function calling with `functionCall` / `functionResponse` parts
//! - Streaming via `:streamGenerateContent?alt=sse`
//!
//! Gemini does not assign IDs to function calls, so this provider
//! synthesizes them (`call_{name}_{n}`) to keep call/result correlation
//! uniform across backends.

use async_trait::async_trait;
use futures::StreamExt;
use nova_core::error::ProviderError;
use nova_core::message::{Message, MessageToolCall, Role};
use nova_core::provider::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Google Gemini REST API provider.
pub struct GeminiProvider {
    name: String,
    base_url: String,
    api_key: String,
    /// Model used by the bare `generate` path.
    default_model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            default_model: "gemini-2.0-flash".into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model used by the bare `generate` path.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Pull system messages out of the transcript.
    /// Gemini takes the system prompt as a top-level field, not a content.
    fn extract_system(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut non_system: Vec<&Message> = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => system_parts.push(&msg.content),
                _ => non_system.push(msg),
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        (system, non_system)
    }

    /// Convert transcript messages into Gemini `contents`.
    ///
    /// A tool message must answer a call issued earlier in the same
    /// transcript; an orphaned one is a protocol violation, not something
    /// to drop silently.
    fn to_contents(messages: &[&Message]) -> Result<Vec<GeminiContent>, ProviderError> {
        let mut known_calls: HashSet<&str> = HashSet::new();
        let mut contents = Vec::new();

        for msg in messages {
            match msg.role {
                Role::User => contents.push(GeminiContent {
                    role: "user".into(),
                    parts: vec![GeminiPart::text(&msg.content)],
                }),
                Role::Assistant => {
                    let mut parts = Vec::new();
                    if !msg.content.is_empty() {
                        parts.push(GeminiPart::text(&msg.content));
                    }
                    for tc in &msg.tool_calls {
                        known_calls.insert(tc.id.as_str());
                        let args: serde_json::Value =
                            serde_json::from_str(&tc.arguments).unwrap_or_default();
                        parts.push(GeminiPart {
                            function_call: Some(FunctionCall {
                                name: tc.name.clone(),
                                args,
                            }),
                            ..Default::default()
                        });
                    }
                    if parts.is_empty() {
                        parts.push(GeminiPart::text(""));
                    }
                    contents.push(GeminiContent {
                        role: "model".into(),
                        parts,
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
                    let name = msg.name.clone().unwrap_or_default();
                    contents.push(GeminiContent {
                        role: "user".into(),
                        parts: vec![GeminiPart {
                            function_response: Some(FunctionResponse {
                                name,
                                response: serde_json::json!({ "result": msg.content }),
                            }),
                            ..Default::default()
                        }],
                    });
                }
                Role::System => {} // handled separately
            }
        }

        Ok(contents)
    }

    /// Convert tool definitions into Gemini function declarations.
    ///
    /// Gemini's schema subset does not accept `default`, so the
    /// declaration is built from the parameter list directly.
    fn to_declarations(tools: &[ToolDefinition]) -> serde_json::Value {
        let declarations: Vec<serde_json::Value> = tools
            .iter()
            .map(|t| {
                let mut properties = serde_json::Map::new();
                let mut required = Vec::new();
                for param in &t.parameters {
                    properties.insert(
                        param.name.clone(),
                        serde_json::json!({
                            "type": param.kind,
                            "description": param.description,
                        }),
                    );
                    if param.required {
                        required.push(serde_json::Value::String(param.name.clone()));
                    }
                }
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "parameters": {
                        "type": "object",
                        "properties": properties,
                        "required": required,
                    }
                })
            })
            .collect();

        serde_json::json!([{ "functionDeclarations": declarations }])
    }

    fn build_body(&self, request: &ChatRequest) -> Result<serde_json::Value, ProviderError> {
        let (system, messages) = Self::extract_system(&request.messages);
        let contents = Self::to_contents(&messages)?;

        let max_tokens = request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": { "maxOutputTokens": max_tokens },
        });

        if let Some(sys) = system {
            body["systemInstruction"] = serde_json::json!({ "parts": [{ "text": sys }] });
        }

        if !request.tools.is_empty() {
            body["tools"] = Self::to_declarations(&request.tools);
        }

        Ok(body)
    }

    async fn check_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ProviderError> {
        let status = response.status().as_u16();
        if status == 429 {
            return Err(ProviderError::RateLimited { retry_after_secs: 5 });
        }
        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid Gemini API key".into(),
            ));
        }
        if status == 404 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ModelNotFound(body));
        }
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Gemini API error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: body,
            });
        }
        Ok(response)
    }

    /// Forward an SSE byte stream into the channel as text chunks.
    ///
    /// SSE frames can split anywhere, so bytes accumulate in a line buffer
    /// and only complete `data:` lines are parsed. Ends with a `done` chunk
    /// carrying any usage metadata seen; returns early when the receiver
    /// goes away, which is how an interrupted stream is cancelled.
    async fn pump_sse<S, B, E>(
        mut byte_stream: S,
        tx: tokio::sync::mpsc::Sender<Result<StreamChunk, ProviderError>>,
    ) where
        S: futures::Stream<Item = Result<B, E>> + Unpin,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        let mut buffer = String::new();
        let mut usage: Option<Usage> = None;

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

            while let Some(line_end) = buffer.find('\n') {
                let line = buffer[..line_end].trim_end_matches('\r').to_string();
                buffer = buffer[line_end + 1..].to_string();

                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };
                let data = data.trim();
                if data.is_empty() {
                    continue;
                }

                let event: GeminiResponse = match serde_json::from_str(data) {
                    Ok(v) => v,
                    Err(e) => {
                        trace!(error = %e, data = %data, "Ignoring unparseable Gemini SSE");
                        continue;
                    }
                };

                if let Some(u) = event.usage_metadata {
                    usage = Some(Usage {
                        prompt_tokens: u.prompt_token_count,
                        completion_tokens: u.candidates_token_count,
                        total_tokens: u.total_token_count,
                    });
                }

                for candidate in event.candidates {
                    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
                        if let Some(text) = part.text {
                            let chunk = StreamChunk {
                                content: Some(text),
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
        }

        let _ = tx
            .send(Ok(StreamChunk {
                content: None,
                done: true,
                usage,
            }))
            .await;
    }

    /// Convert a Gemini API response into our ChatResponse.
    fn to_chat_response(
        resp: GeminiResponse,
        model: &str,
    ) -> Result<ChatResponse, ProviderError> {
        let candidate = resp.candidates.into_iter().next().ok_or_else(|| {
            ProviderError::ApiError {
                status_code: 200,
                message: "Gemini response contained no candidates".into(),
            }
        })?;

        let mut text_content = String::new();
        let mut tool_calls = Vec::new();

        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(text) = part.text {
                text_content.push_str(&text);
            }
            if let Some(fc) = part.function_call {
                let id = format!("call_{}_{}", fc.name, tool_calls.len() + 1);
                tool_calls.push(MessageToolCall {
                    id,
                    name: fc.name,
                    arguments: serde_json::to_string(&fc.args).unwrap_or_default(),
                });
            }
        }

        let mut message = Message::assistant(text_content);
        message.tool_calls = tool_calls;

        let usage = resp.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        let finish_reason = if message.tool_calls.is_empty() {
            candidate.finish_reason.map(|r| r.to_lowercase())
        } else {
            Some("tool_calls".into())
        };

        Ok(ChatResponse {
            message,
            finish_reason,
            usage,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl nova_core::Provider for GeminiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        let body = self.build_body(&request)?;

        debug!(provider = "gemini", model = %request.model, "Sending chat request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let api_resp: GeminiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse Gemini response: {e}"),
            })?;

        Self::to_chat_response(api_resp, &request.model)
    }

    async fn stream(
        &self,
        request: ChatRequest,
    ) -> Result<
        tokio::sync::mpsc::Receiver<Result<StreamChunk, ProviderError>>,
        ProviderError,
    > {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, request.model
        );
        let body = self.build_body(&request)?;

        debug!(provider = "gemini", model = %request.model, "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        tokio::spawn(Self::pump_sse(response.bytes_stream(), tx));
        Ok(rx)
    }

    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, ProviderError> {
        // Auxiliary single-shot path: no transcript, no tools.
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.default_model
        );

        let mut body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });
        if let Some(sys) = system {
            body["systemInstruction"] = serde_json::json!({ "parts": [{ "text": sys }] });
        }

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let api_resp: GeminiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse Gemini response: {e}"),
            })?;

        let resp = Self::to_chat_response(api_resp, &self.default_model)?;
        Ok(resp.message.content)
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        // No key-scoped listing worth exposing; return the supported set.
        Ok(vec![
            "gemini-2.0-flash".into(),
            "gemini-2.0-flash-lite".into(),
            "gemini-2.5-flash".into(),
            "gemini-2.5-pro".into(),
        ])
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }
}

// --- Gemini API types ---

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,

    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,

    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,

    #[serde(default)]
    candidates_token_count: u32,

    #[serde(default)]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::Provider as _;

    #[test]
    fn constructor() {
        let provider = GeminiProvider::new("test-key");
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn constructor_with_base_url() {
        let provider = GeminiProvider::new("test-key").with_base_url("http://localhost:9999/");
        assert_eq!(provider.base_url, "http://localhost:9999");
    }

    #[test]
    fn system_extraction() {
        let messages = vec![
            Message::system("You are Nova"),
            Message::user("Hello"),
            Message::assistant("Hi!"),
        ];
        let (system, non_system) = GeminiProvider::extract_system(&messages);
        assert_eq!(system.as_deref(), Some("You are Nova"));
        assert_eq!(non_system.len(), 2);
    }

    #[test]
    fn content_conversion_roles() {
        let messages = vec![Message::user("Hello"), Message::assistant("Hi!")];
        let refs: Vec<&Message> = messages.iter().collect();
        let contents = GeminiProvider::to_contents(&refs).unwrap();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "model");
        assert_eq!(contents[0].parts[0].text.as_deref(), Some("Hello"));
    }

    #[test]
    fn content_conversion_tool_call_roundtrip() {
        let mut assistant = Message::assistant("");
        assistant.tool_calls = vec![MessageToolCall {
            id: "call_read_file_1".into(),
            name: "read_file".into(),
            arguments: r#"{"path":"src/main.rs"}"#.into(),
        }];
        let result = Message::tool_result("call_read_file_1", "read_file", "fn main() {}");

        let messages = vec![Message::user("show me main"), assistant, result];
        let refs: Vec<&Message> = messages.iter().collect();
        let contents = GeminiProvider::to_contents(&refs).unwrap();

        assert_eq!(contents.len(), 3);
        let call = contents[1].parts[0].function_call.as_ref().unwrap();
        assert_eq!(call.name, "read_file");
        assert_eq!(call.args["path"], "src/main.rs");
        let resp = contents[2].parts[0].function_response.as_ref().unwrap();
        assert_eq!(resp.name, "read_file");
        assert_eq!(resp.response["result"], "fn main() {}");
    }

    #[test]
    fn orphaned_tool_result_is_protocol_error() {
        let messages = vec![
            Message::user("hi"),
            Message::tool_result("call_never_issued", "read_file", "output"),
        ];
        let refs: Vec<&Message> = messages.iter().collect();
        let err = GeminiProvider::to_contents(&refs).unwrap_err();
        assert!(matches!(err, ProviderError::Protocol(_)));
    }

    #[test]
    fn declarations_omit_defaults() {
        let tools = vec![ToolDefinition {
            name: "read_file".into(),
            description: "Read a file".into(),
            parameters: vec![
                ToolParameter::required("path", "string", "File path"),
                ToolParameter::optional("start_line", "integer", "First line")
                    .with_default(serde_json::json!(1)),
            ],
        }];
        let decls = GeminiProvider::to_declarations(&tools);
        let schema = &decls[0]["functionDeclarations"][0]["parameters"];
        assert_eq!(schema["properties"]["path"]["type"], "string");
        assert!(schema["properties"]["start_line"].get("default").is_none());
        assert_eq!(schema["required"], serde_json::json!(["path"]));
    }

    #[test]
    fn parse_text_response() {
        let resp: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Hello!"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
            }"#,
        )
        .unwrap();

        let cr = GeminiProvider::to_chat_response(resp, "gemini-2.0-flash").unwrap();
        assert_eq!(cr.message.content, "Hello!");
        assert!(!cr.has_tool_calls());
        assert_eq!(cr.finish_reason.as_deref(), Some("stop"));
        assert_eq!(cr.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn parse_function_call_response_synthesizes_ids() {
        let resp: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [
                        {"functionCall": {"name": "list_files", "args": {"path": "."}}},
                        {"functionCall": {"name": "read_file", "args": {"path": "Cargo.toml"}}}
                    ]},
                    "finishReason": "STOP"
                }]
            }"#,
        )
        .unwrap();

        let cr = GeminiProvider::to_chat_response(resp, "gemini-2.0-flash").unwrap();
        assert!(cr.has_tool_calls());
        assert_eq!(cr.message.tool_calls[0].id, "call_list_files_1");
        assert_eq!(cr.message.tool_calls[1].id, "call_read_file_2");
        assert_eq!(cr.finish_reason.as_deref(), Some("tool_calls"));
    }

    #[test]
    fn empty_candidates_is_api_error() {
        let resp = GeminiResponse::default();
        let err = GeminiProvider::to_chat_response(resp, "gemini-2.0-flash").unwrap_err();
        assert!(matches!(err, ProviderError::ApiError { .. }));
    }

    fn sse_frame(text: &str) -> String {
        format!(
            "data: {{\"candidates\":[{{\"content\":{{\"role\":\"model\",\"parts\":[{{\"text\":\"{text}\"}}]}}}}]}}\n"
        )
    }

    async fn pump_to_vec(
        frames: Vec<Result<String, String>>,
    ) -> Vec<Result<StreamChunk, ProviderError>> {
        let (tx, mut rx) = tokio::sync::mpsc::channel(64);
        GeminiProvider::pump_sse(futures::stream::iter(frames), tx).await;
        let mut out = Vec::new();
        while let Some(item) = rx.recv().await {
            out.push(item);
        }
        out
    }

    #[tokio::test]
    async fn stream_parses_sse_frames_and_finishes_with_usage() {
        let frames = vec![
            Ok(sse_frame("Hel")),
            Ok("data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"lo\"}]}}],\"usageMetadata\":{\"promptTokenCount\":3,\"candidatesTokenCount\":2,\"totalTokenCount\":5}}\n\n".to_string()),
        ];
        let chunks = pump_to_vec(frames).await;

        assert_eq!(chunks.len(), 3);
        let texts: Vec<&str> = chunks[..2]
            .iter()
            .map(|c| c.as_ref().unwrap().content.as_deref().unwrap())
            .collect();
        assert_eq!(texts, vec!["Hel", "lo"]);
        let done = chunks[2].as_ref().unwrap();
        assert!(done.done);
        assert_eq!(done.usage.as_ref().unwrap().total_tokens, 5);
    }

    #[tokio::test]
    async fn stream_reassembles_lines_split_across_reads() {
        let frame = sse_frame("joined");
        let (head, tail) = frame.split_at(30);
        let chunks = pump_to_vec(vec![Ok(head.to_string()), Ok(tail.to_string())]).await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap().content.as_deref(), Some("joined"));
        assert!(chunks[1].as_ref().unwrap().done);
    }

    #[tokio::test]
    async fn stream_skips_unparseable_events() {
        let frames = vec![
            Ok("data: this is not json\n".to_string()),
            Ok(sse_frame("ok")),
        ];
        let chunks = pump_to_vec(frames).await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap().content.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn stream_transport_failure_is_interrupted_error() {
        let frames = vec![
            Ok(sse_frame("partial")),
            Err("connection reset by peer".to_string()),
        ];
        let chunks = pump_to_vec(frames).await;

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].is_ok());
        assert!(matches!(
            chunks[1],
            Err(ProviderError::StreamInterrupted(_))
        ));
    }

    #[tokio::test]
    async fn stream_stops_when_receiver_is_dropped() {
        let frames: Vec<Result<String, String>> =
            (0..200).map(|i| Ok(sse_frame(&format!("t{i}")))).collect();
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        drop(rx);

        // Must return on the first failed send instead of draining the
        // remaining frames into a closed channel.
        tokio::spawn(GeminiProvider::pump_sse(futures::stream::iter(frames), tx))
            .await
            .unwrap();
    }
}
