//! One-shot firmware bundle generation.

use super::CommandResult;
use cardputer_ecu::bundle::{BundleFile, BundleGenerator, GeminiClient};
use cardputer_ecu::AppConfig;
use std::path::PathBuf;
use tracing::info;

/// Generate a bundle for the configured target and write it under `out`
/// (or the configured export directory).
pub async fn generate(config: &AppConfig, out: Option<PathBuf>) -> CommandResult {
    let out = out.unwrap_or_else(|| config.storage.resolved_export_dir());
    let client = GeminiClient::from_config(&config.generator)?;

    println!(
        "Generating bundle for {} with {}...",
        config.generator.target, config.generator.model
    );
    let bundle = client.generate(&config.generator.target).await?;

    let written = bundle.write_to(&out)?;
    info!("Wrote {} files under {}", written.len(), out.display());
    for (file, path) in BundleFile::ALL.iter().zip(&written) {
        println!("  {:<14} {}", file.label(), path.display());
    }
    Ok(())
}
