use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::HearthConfig;
use hearth_core::{
    AnthropicClient, CrewExecutor, CrewRunner, HouseholdManager, LlmRunner, LocalClient,
    ResponseStatus,
};
use hearth_gateway::{GatewayServer, GatewayState};
use hearth_store::HearthStore;

#[derive(Parser)]
#[command(name = "hearth")]
#[command(version)]
#[command(about = "hearth — a household management agent backend")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve,

    /// Send a one-shot prompt to the household manager
    Ask {
        /// The prompt to dispatch
        prompt: String,
    },

    /// Initialize config directory and default config
    Init,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Init => cmd_init().await,
        Commands::Config => cmd_config(&cli.config),
        Commands::Serve => cmd_serve(&cli.config).await,
        Commands::Ask { prompt } => cmd_ask(&cli.config, &prompt).await,
    }
}

async fn cmd_init() -> Result<()> {
    let config_dir = config::config_dir();
    tokio::fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        warn!("Config already exists at {}", config_path.display());
    } else {
        let default_config = include_str!("../../../config/default.toml");
        tokio::fs::write(&config_path, default_config).await?;
        info!("Created default config at {}", config_path.display());
    }

    println!("hearth initialized at {}", config_dir.display());
    println!(
        "Edit {} to configure your API key or local model.",
        config_path.display()
    );
    Ok(())
}

fn cmd_config(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = HearthConfig::load(config_path)?;
    println!("{}", toml::to_string_pretty(&cfg)?);
    Ok(())
}

/// Build the household manager from configuration. An `Err` here means
/// the dispatcher is unavailable; the caller decides whether that is
/// fatal (`ask`) or degradable (`serve`).
fn build_manager(cfg: &HearthConfig) -> Result<HouseholdManager, hearth_core::DispatchError> {
    let api_key = shellexpand_str(&cfg.providers.anthropic.api_key);
    let anthropic = if api_key.is_empty() {
        None
    } else {
        Some(
            AnthropicClient::new(api_key, Some(cfg.agents.model.clone()))
                .with_max_tokens(cfg.agents.max_tokens)
                .with_base_url(cfg.providers.anthropic.base_url.clone()),
        )
    };
    let local = cfg.providers.local.as_ref().map(|l| {
        LocalClient::new(l.base_url.clone(), l.model.clone())
            .with_max_tokens(cfg.agents.max_tokens)
    });

    let runner = LlmRunner::from_backends(anthropic, local)?;
    info!("LLM runner initialized (model: {})", runner.model());

    let executor = CrewExecutor::new(
        Arc::new(runner) as Arc<dyn CrewRunner>,
        cfg.agents.max_concurrent_requests,
        Duration::from_secs(cfg.agents.request_timeout_secs),
    );
    Ok(HouseholdManager::new(executor))
}

async fn cmd_serve(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = HearthConfig::load(config_path)?;
    info!("Starting hearth server...");

    let db_path = shellexpand(&cfg.database.path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Arc::new(HearthStore::new(&db_path).context("Failed to initialize database")?);
    info!("Database initialized at {}", db_path.display());

    // The CRUD API stays up even when the dispatcher cannot start;
    // agent requests then answer with an `unavailable` status.
    let state = match build_manager(&cfg) {
        Ok(manager) => GatewayState::new(store, Some(Arc::new(manager))),
        Err(e) => {
            warn!("Agent dispatcher unavailable: {}", e);
            GatewayState::new(store, None).with_manager_error(e.to_string())
        }
    };

    let bind: SocketAddr = format!("{}:{}", cfg.server.bind, cfg.server.port)
        .parse()
        .context("Invalid server bind address")?;
    let server = GatewayServer::new(bind, state);
    let mut handle = server.spawn();

    println!("hearth is running on http://{bind}. Press Ctrl+C to stop.");

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            handle.abort();
        }
        result = &mut handle => {
            result.context("server task panicked")??;
        }
    }

    println!("hearth stopped.");
    Ok(())
}

async fn cmd_ask(config_path: &Option<PathBuf>, prompt: &str) -> Result<()> {
    let cfg = HearthConfig::load(config_path)?;
    let manager = build_manager(&cfg)?;

    let envelope = manager.process_request(prompt).await;
    if envelope.status == ResponseStatus::PartialSuccess {
        warn!("Request degraded: {}", envelope.results[0].output);
    }
    for message in &envelope.messages {
        println!("{}", message.content);
    }

    Ok(())
}

// Utility: expand a leading ~ in configured paths
fn shellexpand(s: &str) -> PathBuf {
    PathBuf::from(shellexpand_str(s))
}

fn shellexpand_str(s: &str) -> String {
    let mut result = s.to_string();
    if result.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            result = format!("{}{}", home.display(), &result[1..]);
        }
    }
    result
}
