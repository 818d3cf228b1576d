//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider knows how to send a session transcript to an LLM and get a
//! response back, either as a complete message or as a stream of tokens.
//!
//! Implementations: Gemini (cloud), Ollama (local).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::Message;

/// A request sent to a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to use (e.g., "gemini-2.0-flash", "llama3.2")
    pub model: String,

    /// The transcript snapshot to send
    pub messages: Vec<Message>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Whether to stream the response
    #[serde(default)]
    pub stream: bool,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            stream: false,
            max_tokens: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

/// A single parameter in a tool's signature.
///
/// Declaration order is preserved; the generated schema lists properties
/// in the order tools declare them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,

    /// JSON Schema type ("string", "integer", "boolean", "number")
    pub kind: String,

    /// Description of what the parameter controls
    pub description: String,

    /// Whether the parameter must be supplied
    #[serde(default)]
    pub required: bool,

    /// Default value to document when the parameter is optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl ToolParameter {
    pub fn required(name: &str, kind: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: description.into(),
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &str, kind: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: description.into(),
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// A tool definition sent to the LLM so it knows what tools it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// Ordered parameter list
    pub parameters: Vec<ToolParameter>,
}

impl ToolDefinition {
    /// Project the parameter list into a JSON Schema object.
    ///
    /// Providers derive their wire format from this; the structured list
    /// stays the source of truth.
    pub fn json_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for param in &self.parameters {
            let mut prop = serde_json::Map::new();
            prop.insert("type".into(), serde_json::Value::String(param.kind.clone()));
            prop.insert(
                "description".into(),
                serde_json::Value::String(param.description.clone()),
            );
            if let Some(default) = &param.default {
                prop.insert("default".into(), default.clone());
            }
            properties.insert(param.name.clone(), serde_json::Value::Object(prop));
            if param.required {
                required.push(serde_json::Value::String(param.name.clone()));
            }
        }
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A complete (non-streaming) response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated assistant message (may carry tool calls)
    pub message: Message,

    /// Why generation stopped ("stop", "tool_calls", "length", ...)
    #[serde(default)]
    pub finish_reason: Option<String>,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded
    pub model: String,
}

impl ChatResponse {
    /// True when the model is asking the orchestrator to run tools.
    ///
    /// Any text alongside the calls is advisory until a round arrives
    /// with no calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.message.tool_calls.is_empty()
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A single chunk in a streaming response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Partial content delta
    #[serde(default)]
    pub content: Option<String>,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,

    /// Usage info (typically only in the final chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// The core Provider trait.
///
/// Every LLM backend implements this trait. The agent loop calls `chat()`
/// or `stream()` without knowing which provider is being used.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini", "ollama").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn chat(&self, request: ChatRequest) -> std::result::Result<ChatResponse, ProviderError>;

    /// Send a request and get a stream of response chunks.
    ///
    /// The channel is finite; dropping the receiver cancels consumption
    /// without re-invoking the provider. Default implementation calls
    /// `chat()` and wraps the result as a single chunk.
    async fn stream(
        &self,
        request: ChatRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>,
        ProviderError,
    > {
        let response = self.chat(request).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let _ = tx
            .send(Ok(StreamChunk {
                content: Some(response.message.content),
                done: true,
                usage: response.usage,
            }))
            .await;
        Ok(rx)
    }

    /// Stateless single-shot generation with no transcript and no tools.
    ///
    /// Used for auxiliary prompts (memory extraction, summaries).
    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> std::result::Result<String, ProviderError>;

    /// List available models for this provider.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_definition() -> ToolDefinition {
        ToolDefinition {
            name: "read_file".into(),
            description: "Read a file from the project".into(),
            parameters: vec![
                ToolParameter::required("path", "string", "Relative path to the file"),
                ToolParameter::optional("start_line", "integer", "First line to read")
                    .with_default(serde_json::json!(1)),
            ],
        }
    }

    #[test]
    fn json_schema_preserves_required_and_defaults() {
        let schema = sample_definition().json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["path"]["type"], "string");
        assert_eq!(schema["properties"]["start_line"]["default"], 1);
        assert_eq!(schema["required"], serde_json::json!(["path"]));
    }

    #[test]
    fn response_reports_pending_tool_calls() {
        let mut msg = Message::assistant("Let me check that.");
        msg.tool_calls.push(crate::message::MessageToolCall {
            id: "call_1".into(),
            name: "read_file".into(),
            arguments: "{}".into(),
        });
        let resp = ChatResponse {
            message: msg,
            finish_reason: Some("tool_calls".into()),
            usage: None,
            model: "gemini-2.0-flash".into(),
        };
        assert!(resp.has_tool_calls());
    }
}
