use anyhow::Result;
use clap::{Parser, Subcommand};
use gestura_core::config::AppConfig;
use gestura_core::{Broadcaster, GestureHub, GestureStore, TrustingClassifier};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "gestura",
    about = "Classroom gesture relay with live teacher and parent dashboards",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/gestura/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP/WebSocket server (default)
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize default configuration file
    Init,
    /// Print config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "gestura=info,warn".into()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load config.
    // `config init` may point --config at a file that doesn't exist yet.
    let init_target = matches!(cli.command, Some(Commands::Config { .. }));
    let mut config = match &cli.config {
        Some(path) if init_target && !path.exists() => AppConfig::default(),
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        Some(Commands::Config { action }) => {
            let path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
            handle_config_command(action, &config, &path)?;
        }
        Some(Commands::Serve { host, port }) => {
            if let Some(h) = host {
                config.server.host = h;
            }
            if let Some(p) = port {
                config.server.port = p;
            }
            run_server(config).await?;
        }
        None => {
            run_server(config).await?;
        }
    }

    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    let hub = Arc::new(GestureHub::new(
        GestureStore::new(),
        Broadcaster::with_capacity(config.realtime.queue_capacity),
        Arc::new(TrustingClassifier),
    ));
    tracing::info!(
        "Gesture hub initialized (classifier: {})",
        hub.classifier().name()
    );
    gestura_server::serve(config, hub).await
}

fn handle_config_command(action: Option<ConfigAction>, config: &AppConfig, path: &Path) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => {
            if path.exists() {
                println!("Config already exists at: {}", path.display());
            } else {
                config.save_to(path)?;
                println!("Created default config at: {}", path.display());
            }
        }
        Some(ConfigAction::Path) => {
            println!("{}", path.display());
        }
    }
    Ok(())
}
