// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use fsx_csi_core::domain::node_config::NodeConfigManifest;
use fsx_csi_core::presentation::grpc::Endpoint;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective configuration as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./fsx-csi-config.yaml)
        #[arg(short, long, default_value = "./fsx-csi-config.yaml")]
        output: PathBuf,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output } => generate(output).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let (config, source) = NodeConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        for (i, path) in NodeConfigManifest::candidate_paths().iter().enumerate() {
            println!("  {}. {}", i + 2, path.display());
        }
        println!();
    }

    if as_yaml {
        print!("{}", config.to_yaml_string()?);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    match &source {
        Some(path) => println!("  Source: {}", path.display()),
        None => println!("  Source: {}", "(built-in defaults)".dimmed()),
    }
    println!();

    println!("{}", "Node Identity:".bold());
    println!("  ID: {}", config.spec.node.id);
    println!();

    let mount = &config.spec.mount;
    println!("{}", "Mount:".bold());
    println!("  Intermediate root: {}", mount.intermediate_root.display());
    println!("  Default mount name: {}", mount.default_mount_name);
    println!("  Filesystem: {} (bind: {})", mount.fs_type, mount.bind_fs_type);
    println!();

    let capabilities = &config.spec.capabilities;
    println!("{}", "Capabilities:".bold());
    if capabilities.node.is_empty() {
        println!("  Node: {}", "(none)".dimmed());
    } else {
        for capability in &capabilities.node {
            println!("  Node: {:?}", capability);
        }
    }
    for mode in &capabilities.access_modes {
        println!("  Access mode: {}", mode);
    }
    println!();

    println!("{}", "Network:".bold());
    println!("  Endpoint: {}", config.spec.network.endpoint);
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let (config, _) = NodeConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    config
        .spec
        .network
        .endpoint
        .parse::<Endpoint>()
        .with_context(|| format!("Invalid endpoint '{}'", config.spec.network.endpoint))?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf) -> Result<()> {
    let sample = include_str!("../../templates/config-minimal.yaml");

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_valid() {
        let sample = include_str!("../../templates/config-minimal.yaml");
        let config = NodeConfigManifest::from_yaml_str(sample).unwrap();
        config.validate().unwrap();
        config.spec.network.endpoint.parse::<Endpoint>().unwrap();
    }

    #[tokio::test]
    async fn test_generate_then_validate() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("fsx-csi-config.yaml");

        generate(output.clone()).await.unwrap();
        validate(Some(output)).await.unwrap();
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_endpoint() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let mut config = NodeConfigManifest::default();
        config.spec.network.endpoint = "/csi/csi.sock".to_string();
        std::fs::write(&path, config.to_yaml_string().unwrap()).unwrap();

        assert!(validate(Some(path)).await.is_err());
    }

    #[tokio::test]
    async fn test_validate_rejects_staging_capability() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let sample = include_str!("../../templates/config-minimal.yaml")
            .replace("node: []", "node: [stage-unstage-volume]");
        std::fs::write(&path, sample).unwrap();

        assert!(validate(Some(path)).await.is_err());
    }
}
