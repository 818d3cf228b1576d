//! Nova CLI — the main entry point.
//!
//! Runs an interactive chat session by default; `--message` sends a
//! single prompt and exits.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use nova_agent::{AgentLoop, TurnOutcome};
use nova_config::{AppConfig, ProviderKind};
use nova_core::{ChatRequest, Message, NullRenderer, Provider, Renderer};
use nova_providers::provider_from_config;
use nova_tui::{InputEvent, TuiRenderer};

#[derive(Parser)]
#[command(
    name = "nova",
    about = "Nova — an AI assistant for your terminal",
    version
)]
struct Cli {
    /// Use the local Ollama provider for this session
    #[arg(short, long)]
    local: bool,

    /// Override the model for this session
    #[arg(short, long)]
    model: Option<String>,

    /// Project root for file and shell tools (default: current directory)
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Send a single message and print the reply instead of entering
    /// interactive mode
    #[arg(long)]
    message: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; keep them quiet by default so they do not fight
    // the chat output.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load().context("failed to load configuration")?;

    if cli.local {
        config.provider = ProviderKind::Ollama;
    }
    if let Some(model) = &cli.model {
        config
            .switch_model(model)
            .context("invalid --model value")?;
    }
    if let Some(project) = cli.project {
        config.project_root = project;
    }

    let issues = config.validate();
    if !issues.is_empty() {
        eprintln!("Configuration problems:");
        for issue in &issues {
            eprintln!("  - {issue}");
        }
        eprintln!(
            "\nConfig file: {}",
            AppConfig::config_dir().join("config.toml").display()
        );
        bail!("fix the configuration and try again");
    }

    let provider = provider_from_config(&config).context("failed to build provider")?;

    if let Some(message) = cli.message {
        return one_shot(&config, provider, &message).await;
    }

    interactive(config, provider).await
}

/// Stream a single reply to stdout and exit.
async fn one_shot(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
    message: &str,
) -> anyhow::Result<()> {
    let mut request = ChatRequest::new(
        config.current_model(),
        vec![
            Message::system("You are Nova, a concise AI assistant for the terminal."),
            Message::user(message),
        ],
    );
    request.stream = true;
    request.max_tokens = Some(config.max_tokens_per_message);

    let mut rx = provider.stream(request).await?;
    let mut stdout = std::io::stdout();
    while let Some(chunk) = rx.recv().await {
        let chunk = chunk?;
        if let Some(text) = chunk.content {
            print!("{text}");
            stdout.flush()?;
        }
        if chunk.done {
            break;
        }
    }
    println!();
    Ok(())
}

async fn interactive(config: AppConfig, provider: Arc<dyn Provider>) -> anyhow::Result<()> {
    let renderer: Arc<dyn Renderer> = if std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        Arc::new(TuiRenderer::new(
            config.provider.to_string(),
            config.current_model(),
        ))
    } else {
        Arc::new(NullRenderer)
    };

    let registry =
        nova_tools::default_registry(&config.project_root, config.command_timeout_secs);
    let memory = nova_memory::store_from_config(config.memory.enabled, config.memory_path());

    let mut agent = AgentLoop::new(config, provider, registry, memory, Arc::clone(&renderer));
    renderer.header();
    agent.init().await;

    let mut editor = nova_tui::editor().context("failed to initialize the input line")?;
    loop {
        match nova_tui::read_input(&mut editor, "you ❯ ") {
            InputEvent::Line(line) => {
                if agent.handle_input(&line).await == TurnOutcome::Quit {
                    break;
                }
            }
            InputEvent::Interrupted => continue,
            InputEvent::Eof => break,
        }
    }

    println!("Goodbye!");
    Ok(())
}
