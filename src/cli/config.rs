//! Config command handlers

use crate::cli::{ConfigInitArgs, ConfigValidateArgs};
use crate::config::EngineConfig;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../assignd.example.toml");

/// Handle `assignd config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    fs::write(&args.output, EXAMPLE_CONFIG)?;

    println!("✓ Configuration file created: {}", args.output.display());
    println!("  Edit this file to tune weights, shifts and backends.");

    Ok(())
}

/// Handle `assignd config validate` command
///
/// Unlike the engine commands, a missing file is an error here.
pub fn handle_config_validate(
    args: &ConfigValidateArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let config = EngineConfig::load(Some(&args.config))?.with_env_overrides();
    config.validate()?;

    let w = &config.weights;
    Ok(format!(
        "✓ {} is valid (weights: workload {}, role {}, availability {})",
        args.config.display(),
        w.workload,
        w.role,
        w.availability
    ))
}
