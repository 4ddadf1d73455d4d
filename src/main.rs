//! provider-models — discover and validate a provider's models from the
//! command line, against a running proxy's admin API.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use provider_models::api::http::HttpModelsApi;
use provider_models::config::Config;
use provider_models::logging;
use provider_models::ui::terminal::TerminalSink;
use provider_models::{Coordinator, ProviderIndex, Severity};

#[derive(Debug, Parser)]
#[command(name = "provider-models", version, about)]
struct Cli {
    /// Config file (defaults to the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Admin API base URL; overrides config and environment.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Emit JSON lines instead of plain text, for output and logs alike.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch and list a provider's models.
    Discover { provider: String },
    /// Validate a comma-separated model list.
    Validate { provider: String, models: String },
    /// Add a model to a list and validate the result.
    Select {
        provider: String,
        model: String,
        /// Current model list.
        #[arg(long, default_value = "")]
        current: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }

    tracing::subscriber::set_global_default(logging::subscriber(
        logging::env_filter(&config.log_filter),
        cli.json,
        std::io::stderr,
    ))
    .context("Failed to install tracing subscriber")?;

    debug!(?config, "Configuration loaded");

    let api = HttpModelsApi::new(&config.base_url)
        .with_context(|| format!("Invalid base URL {}", config.base_url))?;
    let sink = Arc::new(TerminalSink::stdout(cli.json));
    let coordinator =
        Coordinator::with_options(Arc::new(api), sink, config.coordinator_options());

    info!(
        session = %coordinator.session_id(),
        base_url = %config.base_url,
        "provider-models v{}",
        env!("CARGO_PKG_VERSION")
    );

    let ok = match cli.command {
        Command::Discover { provider } => coordinator
            .refresh_models(&ProviderIndex::new(provider))
            .await
            .is_some(),
        Command::Validate { provider, models } => coordinator
            .validate_models(&ProviderIndex::new(provider), &models)
            .await
            .map_or(true, |feedback| feedback.severity == Severity::Success),
        Command::Select { provider, model, current } => coordinator
            .handle_model_selection(&ProviderIndex::new(provider), &current, &model)
            .await
            .is_some(),
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
