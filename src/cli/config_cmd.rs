// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::config::{ServerConfig, DEFAULT_CONFIG_PATH};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write the default configuration to a file
    Generate(GenerateArgs),

    /// Parse and validate a configuration file
    Validate(ValidateArgs),
}

/// Arguments for config generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Destination file
    #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration file to check
    #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

pub fn run(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Generate(args) => generate(&args),
        ConfigCommand::Validate(args) => validate(&args).map(|config| {
            println!("Configuration {} is valid", args.config.display());
            println!("  Listen address: {}", config.bind_address());
            println!("  Workers:        {}", config.server.workers);
            println!("  API keys:       {}", config.api.require_api_key);
            println!("  Storage path:   {}", config.storage.path);
        }),
    }
}

pub fn generate(args: &GenerateArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!(
            "{} already exists, pass --force to overwrite",
            args.output.display()
        );
    }
    ServerConfig::default()
        .save(&args.output)
        .context("Failed to write default configuration")?;
    info!("Wrote default configuration to {}", args.output.display());
    Ok(())
}

pub fn validate(args: &ValidateArgs) -> Result<ServerConfig> {
    let config = ServerConfig::from_file(&args.config)?;
    config.validate()?;
    Ok(config)
}
