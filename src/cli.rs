// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cardputer-ecu")]
#[command(author, version, about = "Cardputer OBD/ECU handheld simulator")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/cardputer-ecu/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory for the key map, profiles and logs (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive simulator (default)
    #[command(visible_alias = "ui")]
    Tui,

    /// Generate a firmware bundle and write its three files
    #[command(visible_alias = "gen")]
    Generate {
        /// Output directory (default: configured export dir)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Inspect or edit the persisted key map
    #[command(subcommand, visible_alias = "km")]
    Keymap(KeymapCommands),

    /// Inspect saved vehicle profiles
    #[command(subcommand, visible_aliases = ["profile", "sd"])]
    Profiles(ProfileCommands),

    /// Replay keypad keys from the default state and print the result as JSON
    ///
    /// Keys use the keypad legends, e.g. `press UP UP ENT TAB`.
    Press {
        /// Keys to press, in order
        #[arg(required = true)]
        keys: Vec<String>,

        /// Start from a saved profile (id or name) instead of defaults
        #[arg(long, value_name = "PROFILE")]
        from: Option<String>,
    },

    /// Send ELM327 requests to the simulated adapter
    ///
    /// Example: `elm ATZ "01 0C" 03`
    Elm {
        /// Request lines (default: the terminal screen's script)
        requests: Vec<String>,

        /// Answer from a saved profile (id or name) instead of defaults
        #[arg(long, value_name = "PROFILE")]
        from: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum KeymapCommands {
    /// Show every binding
    #[command(visible_alias = "ls")]
    Show,

    /// Bind a keypad key to an action
    ///
    /// Actions: NONE, RPM_UP, RPM_DOWN, SPD_UP, SPD_DOWN, TOGGLE_MIL,
    /// TOGGLE_BLE, NEXT_MODE, PREV_MODE
    Set {
        /// Keypad legend (e.g. Q, ENT, ";")
        key: String,
        /// Action name
        action: String,
    },

    /// Remove a key's binding
    #[command(visible_alias = "rm")]
    Unbind {
        /// Keypad legend
        key: String,
    },

    /// Restore the factory bindings
    Reset,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// List saved profiles
    #[command(visible_alias = "ls")]
    List,

    /// Print one profile as JSON
    Show {
        /// Profile id or name
        profile: String,
    },
}
