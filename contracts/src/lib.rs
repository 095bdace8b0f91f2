//! # Receipt Vault Variants
//!
//! Concrete vaults built on the generic engine in `receipt-vault-protocol`.
//! Each variant is a [`VaultStrategy`](receipt_vault_protocol::vault::VaultStrategy)
//! plus a wrapper type that owns a `ReceiptVault<Strategy>` and exposes the
//! variant's public surface:
//!
//! - **Offchain Asset Vault** — no on-ledger asset; role-gated minting and
//!   burning, an auditor-maintained certification window, tier-gated
//!   transfers, confiscation, snapshots and redeposits.
//! - **Oracle Vault** — a real custodied asset priced by an oracle; the
//!   price at mint time is the receipt id.
//! - **Batches** — typed operation lists executed all-or-nothing.
//!
//! ## Design Principles
//!
//! 1. Every privileged operation checks its role before touching state.
//! 2. Multi-step operations run inside the engine's checkpoint, so a
//!    failure at any step leaves no trace.
//! 3. Operation enums are serde types, so batches can be scripted as JSON.

pub mod batch;
pub mod offchain_asset;
pub mod oracle_vault;
pub mod tier;

pub use batch::{BatchError, OperationOutput};
pub use offchain_asset::{
    OffchainAssetError, OffchainAssetPolicy, OffchainAssetVault, OffchainAssetVaultConfig,
    OffchainOperation,
};
pub use oracle_vault::{OracleOperation, OraclePricing, OracleVault, OracleVaultError};
pub use tier::TierPolicy;
