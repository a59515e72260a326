// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analyze;
pub mod config_cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// PsychDoodle CLI
#[derive(Parser, Debug)]
#[command(name = "psychdoodle-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Configuration and offline analysis tools for the PsychDoodle node", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate or validate a configuration file
    #[command(subcommand)]
    Config(config_cmd::ConfigCommand),

    /// Score a traced shape from two image files
    AnalyzeShape(analyze::AnalyzeShapeArgs),

    /// Score and transform a doodle image file
    AnalyzeDoodle(analyze::AnalyzeDoodleArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Config(command) => config_cmd::run(command),
        Commands::AnalyzeShape(args) => analyze::analyze_shape(args),
        Commands::AnalyzeDoodle(args) => analyze::analyze_doodle(args),
    }
}
