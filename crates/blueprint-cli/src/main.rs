use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use blueprint_application::Wizard;
use blueprint_core::artifact::ArtifactRenderer;
use blueprint_infrastructure::{AppConfig, ArtifactExporter, BlueprintPaths, SecretConfig};
use blueprint_interaction::{DiagramFetcher, GeminiApiClient};

mod commands;
mod notifier;
mod repl;

#[derive(Parser)]
#[command(name = "blueprint")]
#[command(about = "Blueprint - talk an idea through into a PRD, an architecture diagram and an SDD", long_about = None)]
struct Cli {
    /// Gemini API key (overrides GEMINI_API_KEY and secret.json)
    #[arg(long)]
    api_key: Option<String>,

    /// Gemini model name
    #[arg(long)]
    model: Option<String>,

    /// Path to config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // ===== Configuration =====
    let paths = BlueprintPaths::default();
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path).await?,
        None => AppConfig::load(&paths).await?,
    };
    let secrets = SecretConfig::load(&paths).await.unwrap_or_else(|e| {
        tracing::warn!("[Startup] Ignoring unreadable secret.json: {}", e);
        SecretConfig::default()
    });

    let api_key = secrets.resolve_api_key(cli.api_key.as_deref());
    let model = cli
        .model
        .or_else(|| secrets.model_name().map(str::to_string))
        .unwrap_or_else(|| config.model.clone());

    // ===== Backend Initialization =====
    let mut client = GeminiApiClient::new(api_key, model);
    if let Some(secs) = config.request_timeout_secs {
        client = client.with_timeout(Duration::from_secs(secs))?;
    }
    if !client.has_credential() {
        println!(
            "{}",
            "No Gemini API key found. Pass --api-key or set GEMINI_API_KEY before sending messages."
                .yellow()
        );
    }
    tracing::info!("[Startup] Using model {}", client.model());

    let wizard = Wizard::new(
        Arc::new(client),
        Arc::new(notifier::TerminalNotifier),
        ArtifactRenderer::new(config.viewer_base_url.clone()),
    );
    let exporter = ArtifactExporter::new(&config.output_dir);

    repl::Repl::new(wizard, exporter, DiagramFetcher::new())
        .run()
        .await
}
