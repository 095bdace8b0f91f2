//! # Prometheus Metrics
//!
//! Operational metrics for a scripted vault run. All metrics live in a
//! dedicated [`prometheus::Registry`] under the `receipt_vault` prefix and
//! are rendered in the text exposition format on request.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

/// Holds all Prometheus metric handles for a run.
#[derive(Clone)]
pub struct RunMetrics {
    registry: Registry,
    /// Operations committed as part of a successful step.
    pub operations_total: IntCounter,
    /// Steps whose batch failed and was rolled back.
    pub failed_steps_total: IntCounter,
    /// Events emitted by committed steps.
    pub events_total: IntCounter,
    /// Current share supply, saturated at `i64::MAX`.
    pub share_supply: IntGauge,
    /// Receipt ids with a non-zero outstanding total.
    pub outstanding_receipt_ids: IntGauge,
    /// Operations per submitted step.
    pub batch_size: Histogram,
}

impl RunMetrics {
    /// Creates and registers all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("receipt_vault".into()), None)?;

        let operations_total = IntCounter::new(
            "operations_total",
            "Total number of operations committed by successful steps",
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let failed_steps_total = IntCounter::new(
            "failed_steps_total",
            "Total number of steps rolled back after a failure",
        )?;
        registry.register(Box::new(failed_steps_total.clone()))?;

        let events_total =
            IntCounter::new("events_total", "Total number of events emitted by the vault")?;
        registry.register(Box::new(events_total.clone()))?;

        let share_supply = IntGauge::new("share_supply", "Current total share supply")?;
        registry.register(Box::new(share_supply.clone()))?;

        let outstanding_receipt_ids = IntGauge::new(
            "outstanding_receipt_ids",
            "Receipt ids with a non-zero outstanding balance",
        )?;
        registry.register(Box::new(outstanding_receipt_ids.clone()))?;

        let batch_size = Histogram::with_opts(
            HistogramOpts::new("batch_size", "Number of operations per submitted step")
                .buckets(vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0]),
        )?;
        registry.register(Box::new(batch_size.clone()))?;

        Ok(Self {
            registry,
            operations_total,
            failed_steps_total,
            events_total,
            share_supply,
            outstanding_receipt_ids,
            batch_size,
        })
    }

    /// Updates the state gauges from raw ledger values.
    pub fn observe_state(&self, share_supply: u128, outstanding_receipt_ids: usize) {
        self.share_supply.set(saturate(share_supply));
        self.outstanding_receipt_ids
            .set(i64::try_from(outstanding_receipt_ids).unwrap_or(i64::MAX));
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

fn saturate(value: u128) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_includes_prefixed_metrics() {
        let metrics = RunMetrics::new().unwrap();
        metrics.operations_total.inc_by(3);
        metrics.observe_state(1_000, 2);

        let text = metrics.encode().unwrap();
        assert!(text.contains("receipt_vault_operations_total 3"));
        assert!(text.contains("receipt_vault_share_supply 1000"));
        assert!(text.contains("receipt_vault_outstanding_receipt_ids 2"));
    }

    #[test]
    fn share_supply_saturates_instead_of_wrapping() {
        let metrics = RunMetrics::new().unwrap();
        metrics.observe_state(u128::MAX, 0);
        assert_eq!(metrics.share_supply.get(), i64::MAX);
    }
}
