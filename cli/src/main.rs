// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # FSx for Lustre CSI node plugin
//!
//! The `fsx-csi-driver` binary runs on every node as a daemonset pod and
//! serves the CSI Identity and Node services to the kubelet.
//!
//! ## Commands
//!
//! - `fsx-csi-driver [serve]` - Serve the CSI endpoint (default)
//! - `fsx-csi-driver config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use fsx_csi_driver::commands::{self, ConfigCommand, ServeArgs};

/// FSx for Lustre CSI node plugin
#[derive(Parser)]
#[command(name = "fsx-csi-driver")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "FSX_CSI_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "FSX_CSI_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(
        long,
        global = true,
        env = "FSX_CSI_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    log_format: LogFormat,

    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the CSI Identity and Node services
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_format)?;

    match cli.command {
        Some(Commands::Config { command }) => {
            reject_serve_flags(&cli.serve)?;
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::Serve(args)) => commands::serve::run(cli.config, args.or(cli.serve)).await,
        None => commands::serve::run(cli.config, cli.serve).await,
    }
}

/// `--node-id` and `--endpoint` only affect the server
fn reject_serve_flags(args: &ServeArgs) -> Result<()> {
    if !args.is_empty() {
        anyhow::bail!("--node-id and --endpoint only apply when serving");
    }
    Ok(())
}

/// Initialize tracing subscriber for logging
///
/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Text => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(())
}
