//! Cardputer ECU simulator
//!
//! Main entry point: CLI dispatch, logging setup and the TUI launcher.

use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cardputer_ecu::bundle::{BundleGenerator, GeminiClient};
use cardputer_ecu::tui::{self, App};
use cardputer_ecu::{AppConfig, Storage};
use cardputer_sim::Session;

mod cli;
use cli::{Cli, Commands, KeymapCommands, ProfileCommands};

mod commands;

/// Log file written in TUI mode, inside the data directory
const LOG_FILE: &str = "cardputer-ecu.log";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config, then apply CLI overrides
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&config_path)?;
    if let Some(dir) = cli.data_dir.clone() {
        config.storage.data_dir = Some(dir);
    }
    let data_dir = config.storage.resolved_data_dir();

    // The TUI owns the terminal, so its logs go to a file
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    let log_file = interactive.then(|| data_dir.join(LOG_FILE));
    init_logging(&cli.log_level, log_file.as_deref())?;
    info!("Config {:?}, data dir {:?}", config_path, data_dir);

    let storage = Storage::new(&data_dir);

    match cli.command {
        None | Some(Commands::Tui) => run_tui(&config, storage).await?,
        Some(Commands::Generate { out }) => commands::generate::generate(&config, out).await?,
        Some(Commands::Keymap(cmd)) => match cmd {
            KeymapCommands::Show => commands::keymap::show(&storage)?,
            KeymapCommands::Set { key, action } => commands::keymap::set(&storage, &key, &action)?,
            KeymapCommands::Unbind { key } => commands::keymap::unbind(&storage, &key)?,
            KeymapCommands::Reset => commands::keymap::reset(&storage)?,
        },
        Some(Commands::Profiles(cmd)) => match cmd {
            ProfileCommands::List => commands::profiles::list(&storage)?,
            ProfileCommands::Show { profile } => commands::profiles::show(&storage, &profile)?,
        },
        Some(Commands::Press { keys, from }) => {
            commands::simulate::press(&storage, &keys, from.as_deref())?;
        }
        Some(Commands::Elm { requests, from }) => {
            commands::simulate::elm(&storage, &requests, from.as_deref())?;
        }
    }

    Ok(())
}

/// Initialize logging: `RUST_LOG` wins over `--log-level`. Output goes to
/// `log_file` when given, stderr otherwise.
fn init_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

/// Run with TUI
async fn run_tui(config: &AppConfig, storage: Storage) -> Result<()> {
    let session = Session::new(storage.load_keymap(), storage.load_profiles());
    info!(
        "Loaded {} key bindings and {} profiles",
        session.keymap.len(),
        session.profiles.len()
    );

    let generator: Arc<dyn BundleGenerator> =
        Arc::new(GeminiClient::from_config(&config.generator)?);
    let (results_tx, results_rx) = mpsc::unbounded_channel();

    let app = App::new(
        session,
        storage,
        generator,
        results_tx,
        config.generator.target.clone(),
        config.storage.resolved_export_dir(),
    );
    tui::run(app, results_rx).await
}
