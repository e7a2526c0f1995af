use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use signal_assistant::application::alerts::{AlertEngine, AlertScheduler, CryptoAlert};
use signal_assistant::application::errors::{BusError, ConfigError, FeedError, StorageError};
use signal_assistant::application::messaging::{CommandDispatcher, MessageParser};
use signal_assistant::application::services::{default_registry, Notifier};
use signal_assistant::domain::traits::{BusClient, FileStore};
use signal_assistant::infrastructure::adapters::ConsoleAdapter;
use signal_assistant::infrastructure::config::Config;
use signal_assistant::infrastructure::financial::CoinPaprikaFeed;
use signal_assistant::infrastructure::storage::LocalStorage;

#[derive(Parser)]
#[command(name = "signal-assistant")]
#[command(about = "A personal assistant reachable over Signal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    /// Owner phone number (overrides config and $OWNER_NUMBER)
    #[arg(short, long, global = true)]
    owner: Option<String>,

    /// Shared folder (overrides config and $ASSISTANT_FOLDER)
    #[arg(short, long, global = true)]
    storage: Option<PathBuf>,

    /// Read commands from stdin instead of signal-cli
    #[arg(long, global = true)]
    console: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the assistant
    Run,
    /// Show version
    Version,
    /// Write the default config to --config
    InitConfig,
}

/// Failures that stop the assistant before it starts serving
#[derive(Error, Debug)]
enum StartupError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Bus(#[from] BusError),

    #[error("Unable to open shared folder: {0}")]
    Storage(#[from] StorageError),

    #[error("Unable to create price feed: {0}")]
    Feed(#[from] FeedError),
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_assistant(cli.config, cli.owner, cli.storage, cli.console),
        Commands::Version => {
            println!("signal-assistant v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(&cli.config),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` directives when set and valid, `info` otherwise
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn run_assistant(
    config_path: PathBuf,
    owner: Option<String>,
    storage: Option<PathBuf>,
    console: bool,
) -> Result<(), StartupError> {
    let config = load_config(&config_path, owner, storage)?;
    tracing::info!("Starting signal-assistant for {}", config.owner());

    let rt = tokio::runtime::Runtime::new().map_err(BusError::from)?;
    rt.block_on(serve(config, console))
}

/// Defaults, then the YAML file, then the environment, then CLI flags
fn load_config(
    path: &Path,
    owner: Option<String>,
    storage: Option<PathBuf>,
) -> Result<Config, ConfigError> {
    let mut config = Config::load_or_default(path)?.with_env();

    if let Some(owner) = owner {
        config.assistant.owner = Some(owner);
    }
    if let Some(storage) = storage {
        config.assistant.storage_dir = Some(storage);
    }

    config.validate()
}

async fn serve(config: Config, console: bool) -> Result<(), StartupError> {
    let owner = config.owner().to_string();

    let bus: Arc<dyn BusClient> = if console {
        Arc::new(ConsoleAdapter::new(&owner))
    } else {
        signal_bus(&config).await?
    };

    let storage = LocalStorage::new(config.storage_dir());
    storage.init().await?;
    let storage: Arc<dyn FileStore> = Arc::new(storage);

    let prefix = config.assistant.command_prefix;
    let notifier = Notifier::new(owner, bus.clone());
    let dispatcher = CommandDispatcher::new(
        MessageParser::new(prefix),
        default_registry(prefix, storage),
        notifier.clone(),
    );
    tracing::info!("Registered {} commands", dispatcher.registry().len());

    if config.alerts.enabled {
        let feed = CoinPaprikaFeed::new(
            &config.feed.base_url,
            Duration::from_secs(config.feed.timeout_secs),
        )?;
        let engine = AlertEngine::new().with_rule(CryptoAlert::new(
            Arc::new(feed),
            config.ticker_watches(),
            config.change_limits(),
        ));

        tracing::info!(
            "Alerts enabled: {} every {:?}",
            engine.names().join(", "),
            config.alert_interval()
        );
        AlertScheduler::new(Arc::new(engine), notifier.clone())
            .with_interval(config.alert_interval())
            .with_spacing(config.alert_spacing())
            .spawn();
    } else {
        tracing::info!("Alerts disabled");
    }

    let inbound = bus.subscribe()?;
    tracing::info!("Listening on {} bus", bus.name());

    tokio::select! {
        _ = dispatcher.run(inbound) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}

#[cfg(unix)]
async fn signal_bus(config: &Config) -> Result<Arc<dyn BusClient>, StartupError> {
    use signal_assistant::infrastructure::adapters::SignalAdapter;

    let adapter = SignalAdapter::new(&config.signal)?;
    adapter.launch().await?;
    Ok(Arc::new(adapter))
}

#[cfg(not(unix))]
async fn signal_bus(_config: &Config) -> Result<Arc<dyn BusClient>, StartupError> {
    Err(BusError::Startup("signal-cli bus needs unix sockets, use --console".to_string()).into())
}

fn init_config(path: &Path) -> Result<(), StartupError> {
    if path.exists() {
        return Err(ConfigError::InvalidValue(format!(
            "{} already exists, refusing to overwrite",
            path.display()
        ))
        .into());
    }

    let yaml = Config::default().to_yaml()?;
    std::fs::write(path, yaml)
        .map_err(|e| ConfigError::Parse(format!("Failed to write config: {}", e)))?;

    println!("Wrote default config to {}", path.display());
    println!("Set assistant.owner and assistant.storage-dir before running.");
    Ok(())
}
