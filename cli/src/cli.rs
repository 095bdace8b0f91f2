//! # CLI Interface
//!
//! Defines the command-line argument structure for `receipt-vault` using
//! `clap` derive. Supports three subcommands: `run`, `init` and `version`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::deployment::VariantKind;
use crate::logging::LogFormat;

/// Receipt vault driver.
///
/// Stands up an in-memory vault from a deployment file, replays a JSON
/// script of batched operations against it and reports the emitted events,
/// the final ledger state and, optionally, Prometheus metrics.
#[derive(Parser, Debug)]
#[command(
    name = "receipt-vault",
    about = "Receipt vault deployment driver",
    version,
    propagate_version = true
)]
pub struct ReceiptVaultCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a script against a fresh deployment.
    Run(RunArgs),
    /// Write a sample deployment file and script to a directory.
    Init(InitArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the deployment file (JSON).
    #[arg(long, short = 'd', env = "RECEIPT_VAULT_DEPLOYMENT")]
    pub deployment: PathBuf,

    /// Path to the operation script (JSON).
    #[arg(long, short = 's', env = "RECEIPT_VAULT_SCRIPT")]
    pub script: PathBuf,

    /// Log output format.
    #[arg(long, env = "RECEIPT_VAULT_LOG_FORMAT", value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    /// Print the Prometheus text exposition after the report.
    #[arg(long)]
    pub metrics: bool,

    /// Keep going after a step fails instead of aborting the run.
    #[arg(long)]
    pub keep_going: bool,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Directory to write `deployment.json` and `script.json` into.
    #[arg(long, short = 'o', default_value = ".")]
    pub output: PathBuf,

    /// Which vault variant the sample targets.
    #[arg(long, value_enum, default_value_t = VariantArg::Offchain)]
    pub variant: VariantArg,

    /// Overwrite existing files.
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
    Offchain,
    Oracle,
}

impl From<VariantArg> for VariantKind {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Offchain => VariantKind::Offchain,
            VariantArg::Oracle => VariantKind::Oracle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        ReceiptVaultCli::command().debug_assert();
    }

    #[test]
    fn run_parses_paths_and_flags() {
        let cli = ReceiptVaultCli::try_parse_from([
            "receipt-vault",
            "run",
            "-d",
            "deploy.json",
            "-s",
            "script.json",
            "--log-format",
            "json",
            "--metrics",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.deployment, PathBuf::from("deploy.json"));
        assert_eq!(args.script, PathBuf::from("script.json"));
        assert_eq!(args.log_format, LogFormatArg::Json);
        assert!(args.metrics);
        assert!(!args.keep_going);
    }

    #[test]
    fn init_defaults_to_the_offchain_variant() {
        let cli = ReceiptVaultCli::try_parse_from(["receipt-vault", "init"]).unwrap();
        let Commands::Init(args) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(args.variant, VariantArg::Offchain);
        assert_eq!(args.output, PathBuf::from("."));
    }
}
