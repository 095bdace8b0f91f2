// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Receipt Vault Driver
//!
//! Entry point for the `receipt-vault` binary. Parses CLI arguments,
//! initializes logging and metrics, stands up a vault from a deployment
//! file and replays a script of batched operations against it.
//!
//! The binary supports three subcommands:
//!
//! - `run`     replay a script and print the JSON report to stdout
//! - `init`    write a sample deployment and script
//! - `version` print build version information

mod cli;
mod deployment;
mod logging;
mod metrics;
mod runner;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::Level;

use cli::{Commands, ReceiptVaultCli};
use deployment::{Deployment, DeploymentConfig};
use logging::LogFormat;
use metrics::RunMetrics;

fn main() -> Result<()> {
    let cli = ReceiptVaultCli::parse();

    match cli.command {
        Commands::Run(args) => run_script(args),
        Commands::Init(args) => {
            logging::init_logging(Level::INFO, LogFormat::Pretty);
            init_files(args)
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Builds the deployment, replays the script and prints the report.
fn run_script(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(Level::INFO, args.log_format.into());

    let deployment_json = read(&args.deployment)?;
    let script_json = read(&args.script)?;

    let config = DeploymentConfig::from_json(&deployment_json)
        .with_context(|| format!("in {}", args.deployment.display()))?;
    tracing::info!(
        variant = ?config.variant,
        vault = %config.vault.address,
        name = %config.vault.name,
        "deploying vault"
    );
    let mut deployment = Deployment::build(&config)?;

    let metrics = RunMetrics::new().context("failed to create metrics registry")?;
    let report = runner::run(&mut deployment, &script_json, &metrics, args.keep_going)
        .with_context(|| format!("while running {}", args.script.display()))?;

    tracing::info!(
        steps = report.steps.len(),
        failed = report.failed_steps(),
        total_supply = %report.total_supply,
        backed = report.backed,
        "script finished"
    );

    let rendered =
        serde_json::to_string_pretty(&report).context("failed to serialize run report")?;
    println!("{rendered}");

    if args.metrics {
        print!("{}", metrics.encode().context("failed to encode metrics")?);
    }

    if !report.backed {
        bail!("vault finished unbacked: share supply does not match receipts");
    }
    Ok(())
}

/// Writes a sample `deployment.json` and `script.json`.
fn init_files(args: cli::InitArgs) -> Result<()> {
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create directory: {}", args.output.display()))?;

    let (deployment, script) = deployment::sample(args.variant.into())?;
    for (name, contents) in [("deployment.json", deployment), ("script.json", script)] {
        let path = args.output.join(name);
        if path.exists() && !args.force {
            bail!("{} already exists (pass --force to overwrite)", path.display());
        }
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote sample");
    }

    println!("Sample written.");
    println!("  Variant    : {:?}", args.variant);
    println!("  Directory  : {}", args.output.display());
    println!(
        "  Next       : receipt-vault run -d {0}/deployment.json -s {0}/script.json",
        args.output.display()
    );
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Prints version information to stdout.
fn print_version() {
    println!("receipt-vault {}", env!("CARGO_PKG_VERSION"));
    println!("protocol      {}", receipt_vault_protocol::config::PROTOCOL_VERSION);
}
