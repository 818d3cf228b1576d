//! The session orchestrator.
//!
//! `AgentLoop` owns everything a session needs: config, the active
//! provider, the tool registry, the transcript, the memory store, and a
//! renderer handle. Turns are strictly sequential — one user input is
//! processed to completion (including all tool rounds) before the next
//! prompt is read. No error escapes to crash the session; every failure
//! is rendered and the loop returns to the prompt.

use std::sync::Arc;

use nova_config::AppConfig;
use nova_core::{
    ChatRequest, ChatResponse, MemoryStore, Message, Provider, ProviderError, Renderer, Role,
    ToolCall, ToolRegistry,
};
use nova_providers::provider_from_config;
use tracing::{debug, info, warn};

use crate::commands::{CommandHandler, CommandOutcome};
use crate::context::ContextManager;

/// What the caller should do after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Read the next prompt.
    Continue,
    /// The user asked to leave.
    Quit,
}

pub struct AgentLoop {
    pub(crate) config: AppConfig,
    pub(crate) provider: Arc<dyn Provider>,
    pub(crate) registry: ToolRegistry,
    pub(crate) context: ContextManager,
    pub(crate) memory: Arc<dyn MemoryStore>,
    pub(crate) renderer: Arc<dyn Renderer>,
}

impl AgentLoop {
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn Provider>,
        registry: ToolRegistry,
        memory: Arc<dyn MemoryStore>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        // The window never exceeds the hard transcript ceiling.
        let context =
            ContextManager::new(config.sliding_window_size.min(config.max_context_messages));
        Self {
            config,
            provider,
            registry,
            context,
            memory,
            renderer,
        }
    }

    /// Prepare the session: recall memories and install the system prompt.
    ///
    /// Memory failures degrade to an empty recall — the session starts
    /// either way.
    pub async fn init(&mut self) {
        let recalled = match self
            .memory
            .search(
                "user preferences and recent context",
                self.config.memory.search_limit,
            )
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!("memory recall failed at session start: {e}");
                Vec::new()
            }
        };
        if !recalled.is_empty() {
            debug!(count = recalled.len(), "recalled memories for system prompt");
        }

        let mut prompt = self.base_system_prompt();
        if !recalled.is_empty() {
            prompt.push_str("\n\n## What you remember about the user\n");
            for entry in &recalled {
                prompt.push_str("- ");
                prompt.push_str(&entry.content);
                prompt.push('\n');
            }
        }
        self.context.set_system(Message::system(prompt));
    }

    fn base_system_prompt(&self) -> String {
        let mut prompt = String::from(
            "You are Nova, an AI assistant that lives in the terminal. You help \
             with software tasks: answering questions, reading and editing files, \
             running commands, and searching the web. Be concise and direct. \
             When a task calls for action, use the available tools instead of \
             describing what the user should do.",
        );
        if let Some(name) = &self.config.user_name {
            prompt.push_str(&format!(" The user's name is {name}."));
        }
        prompt.push_str(&format!(
            "\n\nProject root: {}",
            self.config.project_root.display()
        ));
        prompt
    }

    /// Process one line of user input.
    pub async fn handle_input(&mut self, raw: &str) -> TurnOutcome {
        let input = raw.trim();
        if input.is_empty() {
            return TurnOutcome::Continue;
        }

        if input.starts_with('/') {
            return match CommandHandler::execute(input, self).await {
                CommandOutcome::Continue => TurnOutcome::Continue,
                CommandOutcome::Quit => TurnOutcome::Quit,
            };
        }

        self.chat_turn(input).await;
        TurnOutcome::Continue
    }

    /// Run one chat turn: send the transcript, execute any requested tools,
    /// repeat until the model answers in plain text or the round cap hits.
    async fn chat_turn(&mut self, input: &str) {
        self.context.push(Message::user(input));

        let definitions = self.registry.definitions();
        self.renderer.thinking(true, "Thinking");

        let mut rounds = 0usize;
        let mut last_text = String::new();

        loop {
            let mut request = ChatRequest::new(self.config.current_model(), self.context.snapshot())
                .with_tools(definitions.clone());
            request.max_tokens = Some(self.config.max_tokens_per_message);

            let response = match self.provider.chat(request).await {
                Ok(response) => response,
                Err(e) => {
                    // The user message stays in the transcript so a retry
                    // does not require retyping.
                    self.renderer.thinking(false, "");
                    self.render_provider_error(&e);
                    return;
                }
            };

            if let Some(usage) = &response.usage {
                self.context.record_usage(usage);
            }

            if !response.has_tool_calls() {
                self.renderer.thinking(false, "");
                let text = response.message.content.clone();
                self.context.push(response.message);
                self.renderer.message(Role::Assistant, &text);
                self.spawn_memory_extract(input.to_string(), text);
                return;
            }

            rounds += 1;
            if rounds > self.config.max_tool_rounds {
                self.renderer.thinking(false, "");
                warn!(
                    rounds = rounds - 1,
                    "tool round cap reached, ending turn"
                );
                self.renderer.info(
                    "Reached the tool-call limit for this turn. Ask again to continue.",
                    Some("Notice"),
                );
                if !last_text.is_empty() {
                    self.renderer.message(Role::Assistant, &last_text);
                }
                return;
            }

            if !response.message.content.is_empty() {
                last_text = response.message.content.clone();
            }
            self.execute_tool_round(response).await;
        }
    }

    /// Execute every tool call in the response, in provider order, feeding
    /// each result back into the transcript.
    async fn execute_tool_round(&mut self, response: ChatResponse) {
        let calls = response.message.tool_calls.clone();
        self.context.push(response.message);

        for requested in &calls {
            let call = ToolCall {
                id: requested.id.clone(),
                name: requested.name.clone(),
                arguments: serde_json::from_str(&requested.arguments)
                    .unwrap_or(serde_json::Value::Object(Default::default())),
            };

            debug!(tool = %call.name, "executing tool call");
            let output = match self.registry.execute(&call).await {
                Ok(result) => result.output,
                Err(e) => {
                    // Tool failures are fed back to the model as result
                    // text; they never abort the turn.
                    warn!(tool = %call.name, error = %e, "tool execution failed");
                    format!("Error: {e}")
                }
            };

            self.renderer
                .tool_call(&requested.name, &requested.arguments, Some(&output));
            self.context
                .push(Message::tool_result(&requested.id, &requested.name, &output));
        }
    }

    fn render_provider_error(&self, error: &ProviderError) {
        let text = match error {
            ProviderError::RateLimited { retry_after_secs } => format!(
                "Rate limited by the provider. Try again in about {retry_after_secs}s."
            ),
            ProviderError::AuthenticationFailed(_) => {
                "Authentication failed. Check your API key (GEMINI_API_KEY).".into()
            }
            other => other.to_string(),
        };
        self.renderer.error(&text, Some("Provider error"));
    }

    /// Store a condensed note about the completed exchange. Fire and
    /// forget; the turn is already over when this runs.
    fn spawn_memory_extract(&self, user_text: String, assistant_text: String) {
        if !self.config.memory.enabled || !self.config.memory.auto_extract {
            return;
        }
        if user_text.len() < 10 || assistant_text.len() < 10 {
            return;
        }

        let memory = Arc::clone(&self.memory);
        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move {
            let prompt = format!(
                "Condense this exchange into one short note worth remembering \
                 about the user or their project. Reply with the note only, or \
                 NONE if nothing is worth keeping.\n\nUser: {user_text}\n\
                 Assistant: {assistant_text}"
            );
            let note = match provider.generate(&prompt, None).await {
                Ok(text) => {
                    let text = text.trim().to_string();
                    if text.is_empty() || text.eq_ignore_ascii_case("none") {
                        return;
                    }
                    text
                }
                Err(e) => {
                    debug!("memory extraction prompt failed: {e}");
                    format!("User asked: {user_text}\nAssistant answered: {assistant_text}")
                }
            };
            match memory.add(&note, vec!["conversation".into()]).await {
                Ok(id) => debug!(memory_id = %id, "stored conversation memory"),
                Err(e) => warn!("failed to store conversation memory: {e}"),
            }
        });
    }

    /// Rebuild the provider after a config switch.
    ///
    /// Switches happen between turns, so in-flight requests are never
    /// affected.
    pub(crate) fn rebuild_provider(&mut self) -> Result<(), ProviderError> {
        self.provider = provider_from_config(&self.config)?;
        info!(provider = %self.provider.name(), model = %self.config.current_model(), "provider rebuilt");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nova_core::{
        ChatResponse, MessageToolCall, NullRenderer, Tool, ToolError, ToolParameter, ToolResult,
        Usage,
    };
    use nova_memory::InMemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// Replays a script of responses; repeats the last one when exhausted.
    struct ScriptedProvider {
        script: Mutex<Vec<ChatResponse>>,
        calls: AtomicUsize,
        error: Option<ProviderError>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<ChatResponse>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
                error: None,
            }
        }

        fn failing(error: ProviderError) -> Self {
            Self {
                script: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                error: Some(error),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = &self.error {
                return Err(clone_error(error));
            }
            let mut script = self.script.lock().await;
            let response = if script.len() > 1 {
                script.remove(0)
            } else {
                script[0].clone()
            };
            Ok(response)
        }

        async fn generate(
            &self,
            _prompt: &str,
            _system: Option<&str>,
        ) -> Result<String, ProviderError> {
            Ok("NONE".into())
        }
    }

    fn clone_error(e: &ProviderError) -> ProviderError {
        match e {
            ProviderError::RateLimited { retry_after_secs } => ProviderError::RateLimited {
                retry_after_secs: *retry_after_secs,
            },
            other => ProviderError::ApiError {
                status_code: 500,
                message: other.to_string(),
            },
        }
    }

    fn text_response(text: &str) -> ChatResponse {
        ChatResponse {
            message: Message::assistant(text),
            finish_reason: Some("stop".into()),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "scripted".into(),
        }
    }

    fn tool_call_response(name: &str, arguments: &str) -> ChatResponse {
        let mut message = Message::assistant("");
        message.tool_calls.push(MessageToolCall {
            id: format!("call_{name}_1"),
            name: name.into(),
            arguments: arguments.into(),
        });
        ChatResponse {
            message,
            finish_reason: Some("tool_calls".into()),
            usage: None,
            model: "scripted".into(),
        }
    }

    struct UppercaseTool;

    #[async_trait]
    impl Tool for UppercaseTool {
        fn name(&self) -> &str {
            "uppercase"
        }
        fn description(&self) -> &str {
            "Uppercases text"
        }
        fn parameters(&self) -> Vec<ToolParameter> {
            vec![ToolParameter::required("text", "string", "Text to uppercase")]
        }
        async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
            let text = arguments["text"].as_str().unwrap_or("");
            Ok(ToolResult::ok("test", text.to_uppercase()))
        }
    }

    fn agent_with(provider: Arc<ScriptedProvider>) -> AgentLoop {
        let mut config = AppConfig::default();
        config.memory.auto_extract = false;
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(UppercaseTool));
        AgentLoop::new(
            config,
            provider,
            registry,
            Arc::new(InMemoryStore::new()),
            Arc::new(NullRenderer),
        )
    }

    #[tokio::test]
    async fn plain_text_turn() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response(
            "Hello! How can I help?",
        )]));
        let mut agent = agent_with(provider.clone());

        let outcome = agent.handle_input("Hello!").await;
        assert_eq!(outcome, TurnOutcome::Continue);
        assert_eq!(provider.call_count(), 1);

        let snapshot = agent.context.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].role, Role::User);
        assert_eq!(snapshot[1].content, "Hello! How can I help?");
        assert_eq!(agent.context.tokens_used(), 15);
    }

    #[tokio::test]
    async fn tool_round_then_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response("uppercase", r#"{"text":"hi"}"#),
            text_response("The result is HI."),
        ]));
        let mut agent = agent_with(provider.clone());

        agent.handle_input("uppercase hi please").await;
        assert_eq!(provider.call_count(), 2);

        let snapshot = agent.context.snapshot();
        // user, assistant (with call), tool result, final assistant
        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot[1].role, Role::Assistant);
        assert!(!snapshot[1].tool_calls.is_empty());
        assert_eq!(snapshot[2].role, Role::Tool);
        assert_eq!(snapshot[2].content, "HI");
        assert_eq!(snapshot[2].tool_call_id.as_deref(), Some("call_uppercase_1"));
        assert_eq!(snapshot[3].content, "The result is HI.");
    }

    #[tokio::test]
    async fn unknown_tool_feeds_error_back() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response("nonexistent", "{}"),
            text_response("That tool is not available."),
        ]));
        let mut agent = agent_with(provider);

        agent.handle_input("do the thing").await;

        let snapshot = agent.context.snapshot();
        let tool_msg = snapshot.iter().find(|m| m.role == Role::Tool).unwrap();
        assert!(tool_msg.content.starts_with("Error:"));
    }

    #[tokio::test]
    async fn provider_error_keeps_user_message() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderError::RateLimited {
            retry_after_secs: 5,
        }));
        let mut agent = agent_with(provider);

        let outcome = agent.handle_input("Hello!").await;
        assert_eq!(outcome, TurnOutcome::Continue);

        let snapshot = agent.context.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].role, Role::User);
        assert_eq!(snapshot[0].content, "Hello!");
    }

    #[tokio::test]
    async fn tool_rounds_are_bounded() {
        // The model keeps asking for tools forever; the turn must end.
        let provider = Arc::new(ScriptedProvider::new(vec![tool_call_response(
            "uppercase",
            r#"{"text":"again"}"#,
        )]));
        let mut agent = agent_with(provider.clone());
        agent.config.max_tool_rounds = 3;

        let outcome = agent.handle_input("loop forever").await;
        assert_eq!(outcome, TurnOutcome::Continue);
        // 3 tool rounds plus the call that hit the cap
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test]
    async fn context_cap_bounds_the_window() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("reply")]));
        let mut config = AppConfig::default();
        config.memory.auto_extract = false;
        config.sliding_window_size = 50;
        config.max_context_messages = 2;
        let mut agent = AgentLoop::new(
            config,
            provider,
            ToolRegistry::new(),
            Arc::new(InMemoryStore::new()),
            Arc::new(NullRenderer),
        );

        agent.handle_input("first").await;
        agent.handle_input("second").await;

        // Each turn adds a user and an assistant message; the transcript
        // must stay within the hard cap.
        assert_eq!(agent.context.message_count(), 2);
    }

    #[tokio::test]
    async fn empty_input_is_a_no_op() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("hi")]));
        let mut agent = agent_with(provider.clone());

        agent.handle_input("   ").await;
        assert_eq!(provider.call_count(), 0);
        assert_eq!(agent.context.message_count(), 0);
    }

    #[tokio::test]
    async fn slash_input_never_reaches_the_provider() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("hi")]));
        let mut agent = agent_with(provider.clone());

        agent.handle_input("/definitely-not-a-command").await;
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn quit_commands_stop_the_loop() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("hi")]));
        let mut agent = agent_with(provider);

        assert_eq!(agent.handle_input("/quit").await, TurnOutcome::Quit);
        assert_eq!(agent.handle_input("/exit").await, TurnOutcome::Quit);
    }

    #[tokio::test]
    async fn init_folds_memories_into_system_prompt() {
        let memory = Arc::new(InMemoryStore::new());
        memory
            .add("The user prefers concise answers and recent context", vec![])
            .await
            .unwrap();

        let provider = Arc::new(ScriptedProvider::new(vec![text_response("hi")]));
        let mut config = AppConfig::default();
        config.memory.auto_extract = false;
        let mut agent = AgentLoop::new(
            config,
            provider,
            ToolRegistry::new(),
            memory,
            Arc::new(NullRenderer),
        );
        agent.init().await;

        let snapshot = agent.context.snapshot();
        assert_eq!(snapshot[0].role, Role::System);
        assert!(snapshot[0].content.contains("concise answers"));
    }
}
