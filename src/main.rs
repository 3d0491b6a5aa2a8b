use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

use topic_desk::api::TopicClient;
use topic_desk::app::{App, AppEvent};
use topic_desk::config::{Config, TOKEN_ENV_VAR};
use topic_desk::ui;

/// Default config file path (~/.config/topic-desk/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("topic-desk")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(
    name = "topic-desk",
    version,
    about = "Terminal admin client for a topic library"
)]
struct Args {
    /// Config file (default: ~/.config/topic-desk/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend API root, overriding the config file
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Bearer token (takes precedence over TOPIC_DESK_API_TOKEN)
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // The TUI owns stdout, so logs go to stderr and only when asked for.
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    tracing::debug!(?config, "Effective configuration");

    let env_token = std::env::var(TOKEN_ENV_VAR).ok();
    let token = config.resolve_token(args.token.as_deref(), env_token.as_deref());
    if token.is_none() {
        tracing::info!("No API token configured, sending unauthenticated requests");
    }

    let client = TopicClient::new(&config.base_url, token, config.request_timeout())
        .with_context(|| format!("Invalid API base URL '{}'", config.base_url))?;

    let mut app = App::new(client, &config);

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    app.initialize(&event_tx);

    ui::run(&mut app, event_tx, event_rx).await?;

    Ok(())
}
