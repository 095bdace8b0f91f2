//! # Script Runner
//!
//! Replays a [`Script`] against a [`Deployment`]. Every step becomes one
//! `multicall`, so a step either commits whole or leaves the vault
//! untouched. Committed events are drained after each step and collected
//! into the [`RunReport`].

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use tracing::{info, warn};

use receipt_vault_contracts::{OffchainOperation, OperationOutput, OracleOperation};
use receipt_vault_protocol::{ReceiptId, ReceiptVault, VaultEvent, VaultStrategy};

use crate::deployment::{Deployment, Script, Step, VariantKind};
use crate::metrics::RunMetrics;

/// Outcome of a single step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub committed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<OperationOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub events: Vec<VaultEvent>,
}

/// Final vault state after a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub variant: VariantKind,
    pub steps: Vec<StepReport>,
    pub total_supply: u128,
    pub total_assets: u128,
    /// Highest sequential id issued; zero for price-keyed vaults.
    pub highwater_id: ReceiptId,
    /// `(id, total)` for every receipt id still outstanding.
    pub outstanding_receipts: Vec<(ReceiptId, u128)>,
    pub backed: bool,
}

impl RunReport {
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|step| !step.committed).count()
    }
}

/// Runs `script_json` against `deployment`.
///
/// A step that fails without `expect_failure` aborts the run unless
/// `keep_going` is set; a step that succeeds despite `expect_failure`
/// always aborts.
pub fn run(
    deployment: &mut Deployment,
    script_json: &str,
    metrics: &RunMetrics,
    keep_going: bool,
) -> Result<RunReport> {
    let deployment_kind = deployment.variant();
    let steps = match deployment {
        Deployment::Offchain(vault) => {
            let script: Script<OffchainOperation> = Script::from_json(script_json)?;
            replay(&script, metrics, keep_going, |step| {
                if step.set_price.is_some() {
                    bail!("`set_price` is only meaningful for oracle deployments");
                }
                let outcome = vault
                    .multicall(&step.context(), &step.operations)
                    .map_err(|e| e.to_string());
                Ok((outcome, vault.drain_events()))
            })?
        }
        Deployment::Oracle { vault, oracle, .. } => {
            let script: Script<OracleOperation> = Script::from_json(script_json)?;
            replay(&script, metrics, keep_going, |step| {
                if let Some(price) = step.set_price {
                    oracle.set_price(price);
                    info!(price, "oracle price published");
                }
                let outcome = vault
                    .multicall(&step.context(), &step.operations)
                    .map_err(|e| e.to_string());
                Ok((outcome, vault.drain_events()))
            })?
        }
    };

    let report = match deployment {
        Deployment::Offchain(vault) => summarize(deployment_kind, steps, vault.vault()),
        Deployment::Oracle { vault, .. } => summarize(deployment_kind, steps, vault.vault()),
    };
    metrics.observe_state(report.total_supply, report.outstanding_receipts.len());
    Ok(report)
}

fn summarize<S: VaultStrategy>(
    variant: VariantKind,
    steps: Vec<StepReport>,
    vault: &ReceiptVault<S>,
) -> RunReport {
    RunReport {
        variant,
        steps,
        total_supply: vault.total_supply(),
        total_assets: vault.total_assets(),
        highwater_id: vault.highwater_id(),
        outstanding_receipts: vault.ledgers().receipts.outstanding(),
        backed: vault.is_backed(),
    }
}

type StepOutcome = (std::result::Result<Vec<OperationOutput>, String>, Vec<VaultEvent>);

fn replay<Op>(
    script: &Script<Op>,
    metrics: &RunMetrics,
    keep_going: bool,
    mut execute: impl FnMut(&Step<Op>) -> Result<StepOutcome>,
) -> Result<Vec<StepReport>> {
    let mut reports = Vec::with_capacity(script.steps.len());

    for (index, step) in script.steps.iter().enumerate() {
        metrics.batch_size.observe(step.operations.len() as f64);
        let (outcome, events) = execute(step)?;
        metrics.events_total.inc_by(events.len() as u64);

        let report = match outcome {
            Ok(outputs) => {
                if step.expect_failure {
                    bail!("step {index} was expected to fail but committed");
                }
                metrics.operations_total.inc_by(step.operations.len() as u64);
                info!(step = index, operations = outputs.len(), events = events.len(), "step committed");
                StepReport {
                    index,
                    committed: true,
                    outputs,
                    error: None,
                    events,
                }
            }
            Err(error) => {
                metrics.failed_steps_total.inc();
                if !step.expect_failure && !keep_going {
                    return Err(anyhow!("step {index} failed: {error}"));
                }
                warn!(step = index, %error, expected = step.expect_failure, "step rolled back");
                StepReport {
                    index,
                    committed: false,
                    outputs: vec![],
                    error: Some(error),
                    events,
                }
            }
        };
        reports.push(report);
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::{sample, DeploymentConfig};
    use receipt_vault_protocol::{Address, FIXED_POINT_ONE};

    fn deploy(variant: VariantKind) -> (Deployment, String) {
        let (deployment, script) = sample(variant).unwrap();
        let config = DeploymentConfig::from_json(&deployment).unwrap();
        (Deployment::build(&config).unwrap(), script)
    }

    #[test]
    fn offchain_sample_runs_to_completion() {
        let (mut deployment, script) = deploy(VariantKind::Offchain);
        let metrics = RunMetrics::new().unwrap();
        let report = run(&mut deployment, &script, &metrics, false).unwrap();

        assert_eq!(report.failed_steps(), 0);
        assert_eq!(report.total_supply, 1_000);
        assert_eq!(report.highwater_id, 1);
        assert!(report.backed);
        assert_eq!(report.steps[1].events.len(), 1);
        assert_eq!(metrics.operations_total.get(), 6);
        assert_eq!(metrics.share_supply.get(), 1_000);
    }

    #[test]
    fn oracle_sample_publishes_prices_between_steps() {
        let (mut deployment, script) = deploy(VariantKind::Oracle);
        let metrics = RunMetrics::new().unwrap();
        let report = run(&mut deployment, &script, &metrics, false).unwrap();

        assert_eq!(report.highwater_id, 0);
        assert_eq!(
            report.outstanding_receipts,
            vec![(FIXED_POINT_ONE, 600), (2 * FIXED_POINT_ONE, 1_000)]
        );
        assert_eq!(metrics.outstanding_receipt_ids.get(), 2);
        assert_eq!(report.total_supply, 1_000 - 400 + 1_000);
        assert_eq!(report.total_assets, 1_000 + 500 - 400);
        assert_eq!(
            report.steps[1].outputs,
            vec![OperationOutput::Shares(1_000), OperationOutput::Assets(400)]
        );
    }

    fn failing_offchain_script() -> String {
        let stranger = Address::from_label("stranger");
        format!(
            r#"{{"steps": [{{"caller": "{stranger}", "timestamp": 1, "expect_failure": EXPECT,
                "operations": [{{"deposit": {{"assets": 10, "receiver": "{stranger}"}}}}]}}]}}"#
        )
    }

    #[test]
    fn unexpected_failure_aborts_the_run() {
        let (mut deployment, _) = deploy(VariantKind::Offchain);
        let metrics = RunMetrics::new().unwrap();
        let script = failing_offchain_script().replace("EXPECT", "false");

        let err = run(&mut deployment, &script, &metrics, false).unwrap_err();
        assert!(err.to_string().contains("step 0 failed"));
        assert_eq!(metrics.failed_steps_total.get(), 1);
    }

    #[test]
    fn expected_failure_is_reported_and_leaves_no_events() {
        let (mut deployment, _) = deploy(VariantKind::Offchain);
        let metrics = RunMetrics::new().unwrap();
        let script = failing_offchain_script().replace("EXPECT", "true");

        let report = run(&mut deployment, &script, &metrics, false).unwrap();
        assert_eq!(report.failed_steps(), 1);
        assert!(report.steps[0].events.is_empty());
        assert!(report.steps[0].error.as_deref().unwrap().contains("batch operation 0"));
        assert_eq!(report.total_supply, 0);
    }

    #[test]
    fn keep_going_continues_past_failures() {
        let (mut deployment, _) = deploy(VariantKind::Offchain);
        let metrics = RunMetrics::new().unwrap();
        let script = failing_offchain_script().replace("EXPECT", "false");

        let report = run(&mut deployment, &script, &metrics, true).unwrap();
        assert_eq!(report.failed_steps(), 1);
    }

    #[test]
    fn set_price_is_rejected_for_offchain_scripts() {
        let (mut deployment, _) = deploy(VariantKind::Offchain);
        let metrics = RunMetrics::new().unwrap();
        let caller = Address::from_label("admin");
        let script = format!(
            r#"{{"steps": [{{"caller": "{caller}", "set_price": 5, "operations": []}}]}}"#
        );
        assert!(run(&mut deployment, &script, &metrics, false).is_err());
    }
}
