//! # Run Logging
//!
//! `receipt-vault` reports on two channels. The run report and the optional
//! Prometheus exposition go to stdout so they can be piped into `jq` or a
//! file. Everything the vault engine, the variant contracts and the binary
//! log through `tracing` goes to stderr, either as readable lines for an
//! operator replaying a script or as JSON lines for a CI job collecting them.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shape of the stderr log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored lines with source locations.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Filter directives used when `RUST_LOG` is unset.
///
/// The binary and the variant contracts log at `level`. The engine logs every
/// rollback and compensation at debug, so it stays at `warn` unless `level`
/// asks for debug output.
pub fn default_directives(level: Level) -> String {
    let engine = if level >= Level::DEBUG { level } else { Level::WARN };
    format!(
        "receipt_vault={level},receipt_vault_contracts={level},receipt_vault_protocol={engine}"
    )
    .to_lowercase()
}

/// Installs the global subscriber writing to stderr.
///
/// Must run once per process, before the deployment is built. `RUST_LOG`
/// replaces [`default_directives`] entirely when set:
///
/// ```text
/// RUST_LOG=receipt_vault_protocol=debug receipt-vault run -d vault.json -s steps.json
/// ```
pub fn init_logging(level: Level, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    tracing::debug!(?format, %level, "receipt-vault logging ready");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_stays_quiet_below_debug() {
        assert_eq!(
            default_directives(Level::INFO),
            "receipt_vault=info,receipt_vault_contracts=info,receipt_vault_protocol=warn"
        );
    }

    #[test]
    fn debug_level_opens_up_the_engine() {
        assert_eq!(
            default_directives(Level::TRACE),
            "receipt_vault=trace,receipt_vault_contracts=trace,receipt_vault_protocol=trace"
        );
        assert!(EnvFilter::try_new(default_directives(Level::DEBUG)).is_ok());
    }
}
