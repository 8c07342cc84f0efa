// Cardputer ECU simulator - application library
// Configuration, persistence, firmware bundle generation and the terminal UI
// around the pure simulator core in `cardputer-sim`.

pub mod activity;
pub mod bundle;
pub mod config;
pub mod storage;
pub mod tui;

pub use activity::ActivityLog;
pub use bundle::{
    ApiError, BundleFile, BundleGenerator, GeminiClient, GenerationSlot, ProjectBundle,
};
pub use config::{AppConfig, ConfigError};
pub use storage::{Storage, StorageError};
