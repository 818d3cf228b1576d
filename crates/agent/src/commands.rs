//! Slash command dispatch.
//!
//! Every input starting with `/` is handled here and never reaches the
//! LLM — including unknown commands, which render an error panel.

use nova_core::Role;
use nova_tools::project_structure::ProjectStructureTool;
use nova_tools::default_registry;

use crate::loop_runner::AgentLoop;

/// What the agent loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Quit,
}

/// Stateless command dispatcher. All session state lives on the agent
/// loop; the handler only routes and formats.
pub struct CommandHandler;

impl CommandHandler {
    /// Execute a slash command. `input` must start with `/`.
    pub async fn execute(input: &str, agent: &mut AgentLoop) -> CommandOutcome {
        let mut parts = input.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or("").to_lowercase();
        let rest = parts.next().unwrap_or("").trim();

        match command.as_str() {
            "/help" => Self::help(agent),
            "/tools" => Self::tools(agent),
            "/clear" => Self::clear(agent),
            "/status" => Self::status(agent).await,
            "/config" => Self::config(agent, rest),
            "/model" => Self::model(agent, rest),
            "/init" => Self::init(agent, rest),
            "/memory" => Self::memory(agent, rest).await,
            "/remember" => Self::remember(agent, rest).await,
            "/forget" => Self::forget(agent, rest).await,
            "/quit" | "/exit" => return CommandOutcome::Quit,
            other => {
                agent.renderer.error(
                    &format!("Unknown command: {other}. Type /help for the list."),
                    Some("Error"),
                );
            }
        }
        CommandOutcome::Continue
    }

    fn help(agent: &AgentLoop) {
        let text = "\
/help              Show this help
/tools             List available tools
/clear             Clear the conversation (keeps the system prompt)
/status            Session status: model, context, memory
/config            Show config; /config KEY=VALUE to set model or provider
/model             Show or switch the model; gemini|ollama switches provider
/init [path]       Set the project root and load its structure as context
/memory            List memories; /memory search <query> to search
/remember <text>   Store a memory
/forget <id|all>   Delete a memory (use 'all confirm' to wipe)
/quit, /exit       Leave";
        agent.renderer.info(text, Some("Commands"));
    }

    fn tools(agent: &AgentLoop) {
        let mut text = String::new();
        for def in agent.registry.definitions() {
            text.push_str(&format!("{} — {}\n", def.name, def.description));
            for param in &def.parameters {
                let req = if param.required { "required" } else { "optional" };
                text.push_str(&format!(
                    "    {} ({}, {}): {}\n",
                    param.name, param.kind, req, param.description
                ));
            }
        }
        if text.is_empty() {
            text.push_str("No tools registered.");
        }
        agent.renderer.info(text.trim_end(), Some("Tools"));
    }

    fn clear(agent: &mut AgentLoop) {
        agent.context.reset(true);
        agent.renderer.header();
        agent.renderer.success("Conversation cleared.", None);
    }

    async fn status(agent: &AgentLoop) {
        let memory_count = agent.memory.count().await.unwrap_or(0);
        let text = format!(
            "Provider: {} ({})\nModel: {}\n{}\nMemory: {} entries ({})\nProject root: {}",
            agent.config.provider,
            agent.provider.name(),
            agent.config.current_model(),
            agent.context.summary(),
            memory_count,
            agent.memory.name(),
            agent.config.project_root.display(),
        );
        agent.renderer.info(&text, Some("Status"));
    }

    fn config(agent: &mut AgentLoop, rest: &str) {
        if rest.is_empty() {
            let text = format!(
                "provider = {}\ngemini_model = {}\nollama_model = {}\nollama_host = {}\n\
                 api_key = {}\nmax_context_messages = {}\nsliding_window_size = {}\n\
                 max_tool_rounds = {}\n\
                 command_timeout_secs = {}\nmemory.enabled = {}",
                agent.config.provider,
                agent.config.gemini_model,
                agent.config.ollama_model,
                agent.config.ollama_host,
                if agent.config.api_key.is_some() { "[set]" } else { "[not set]" },
                agent.config.max_context_messages,
                agent.config.sliding_window_size,
                agent.config.max_tool_rounds,
                agent.config.command_timeout_secs,
                agent.config.memory.enabled,
            );
            agent.renderer.info(&text, Some("Config"));
            return;
        }

        let Some((key, value)) = rest.split_once('=') else {
            agent
                .renderer
                .error("Usage: /config KEY=VALUE (keys: model, provider)", Some("Error"));
            return;
        };

        match key.trim() {
            "model" => Self::switch_model(agent, value.trim()),
            "provider" => Self::switch_provider(agent, value.trim()),
            other => agent.renderer.error(
                &format!("Unknown config key: {other} (keys: model, provider)"),
                Some("Error"),
            ),
        }
    }

    fn model(agent: &mut AgentLoop, rest: &str) {
        if rest.is_empty() {
            let text = format!(
                "Current: {} via {}\nUsage: /model gemini|ollama to switch provider, \
                 /model <name> to switch model",
                agent.config.current_model(),
                agent.config.provider,
            );
            agent.renderer.info(&text, Some("Model"));
        } else if rest.eq_ignore_ascii_case("gemini") || rest.eq_ignore_ascii_case("ollama") {
            Self::switch_provider(agent, rest);
        } else {
            Self::switch_model(agent, rest);
        }
    }

    fn switch_provider(agent: &mut AgentLoop, name: &str) {
        match agent.config.switch_provider(name) {
            Ok(kind) => match agent.rebuild_provider() {
                Ok(()) => agent.renderer.success(
                    &format!("Switched to {kind} ({})", agent.config.current_model()),
                    None,
                ),
                Err(e) => agent.renderer.error(&e.to_string(), Some("Provider error")),
            },
            Err(e) => agent.renderer.error(&e.to_string(), Some("Error")),
        }
    }

    fn switch_model(agent: &mut AgentLoop, model: &str) {
        match agent.config.switch_model(model) {
            Ok(()) => match agent.rebuild_provider() {
                Ok(()) => agent.renderer.success(
                    &format!(
                        "Model set to {} via {}",
                        agent.config.current_model(),
                        agent.config.provider
                    ),
                    None,
                ),
                Err(e) => agent.renderer.error(&e.to_string(), Some("Provider error")),
            },
            Err(e) => agent.renderer.error(&e.to_string(), Some("Error")),
        }
    }

    fn init(agent: &mut AgentLoop, rest: &str) {
        let root = if rest.is_empty() {
            agent.config.project_root.clone()
        } else {
            std::path::PathBuf::from(rest)
        };

        if !root.is_dir() {
            agent.renderer.error(
                &format!("Not a directory: {}", root.display()),
                Some("Error"),
            );
            return;
        }

        agent.config.project_root = root.clone();
        agent.registry = default_registry(&root, agent.config.command_timeout_secs);

        let tree = ProjectStructureTool::render(&root, 3, false);
        agent.context.set_system_note(
            "Project structure of ",
            nova_core::Message::system(format!(
                "Project structure of {}:\n{}",
                root.display(),
                tree
            )),
        );
        agent.renderer.success(
            &format!("Project root set to {}", root.display()),
            Some("Project"),
        );
        agent.renderer.message(Role::System, &tree);
    }

    async fn memory(agent: &AgentLoop, rest: &str) {
        let result = if let Some(query) = rest.strip_prefix("search") {
            agent
                .memory
                .search(query.trim(), agent.config.memory.search_limit)
                .await
        } else {
            agent.memory.all(20).await
        };

        match result {
            Ok(entries) if entries.is_empty() => {
                agent.renderer.info("No memories stored.", Some("Memory"));
            }
            Ok(entries) => {
                let mut text = String::new();
                for entry in &entries {
                    text.push_str(&format!(
                        "[{}] {} ({})\n",
                        &entry.id[..entry.id.len().min(8)],
                        entry.content,
                        entry.created_at.format("%Y-%m-%d"),
                    ));
                }
                agent.renderer.info(text.trim_end(), Some("Memory"));
            }
            Err(e) => agent.renderer.error(&e.to_string(), Some("Memory error")),
        }
    }

    async fn remember(agent: &AgentLoop, rest: &str) {
        if rest.is_empty() {
            agent.renderer.error("Usage: /remember <text>", Some("Error"));
            return;
        }
        match agent.memory.add(rest, vec!["manual".into()]).await {
            Ok(id) => agent.renderer.success(
                &format!("Remembered ({})", &id[..id.len().min(8)]),
                None,
            ),
            Err(e) => agent.renderer.error(&e.to_string(), Some("Memory error")),
        }
    }

    async fn forget(agent: &AgentLoop, rest: &str) {
        match rest {
            "" => agent
                .renderer
                .error("Usage: /forget <id> or /forget all confirm", Some("Error")),
            "all" => agent.renderer.info(
                "This deletes every stored memory. Run '/forget all confirm' to proceed.",
                Some("Memory"),
            ),
            "all confirm" => match agent.memory.delete_all().await {
                Ok(()) => agent.renderer.success("All memories deleted.", None),
                Err(e) => agent.renderer.error(&e.to_string(), Some("Memory error")),
            },
            id => match agent.memory.delete(id).await {
                Ok(true) => agent.renderer.success("Memory deleted.", None),
                Ok(false) => agent
                    .renderer
                    .error(&format!("No memory with id: {id}"), Some("Error")),
                Err(e) => agent.renderer.error(&e.to_string(), Some("Memory error")),
            },
        }
    }
}
