//! # Typed Batches
//!
//! A batch is a list of closed, serde-friendly operation values executed
//! in order inside a single vault checkpoint. Either every operation
//! commits, or the vault (ledgers, events, custodied assets) looks exactly
//! as if the batch had never been submitted.
//!
//! Each variant defines its own operation enum; this module holds what they
//! share: the per-operation output and the indexed failure.

use serde::Serialize;
use thiserror::Error;

use receipt_vault_protocol::ledger::SnapshotId;

/// What one batched operation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OperationOutput {
    /// Shares minted by a deposit or burned by a withdrawal.
    Shares(u128),
    /// Assets paid by a mint or returned by a redemption.
    Assets(u128),
    /// Balance moved by a confiscation.
    Confiscated(u128),
    Snapshot(SnapshotId),
    /// Whether a role grant or revocation changed membership.
    RoleChanged(bool),
    Done,
}

/// The batch failed at operation `index`; nothing was committed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("batch operation {index} failed: {source}")]
pub struct BatchError<E>
where
    E: std::error::Error + 'static,
{
    /// Zero-based position of the failing operation.
    pub index: usize,
    pub source: E,
}
