// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Receipt Vault Protocol — Accounting Core
//!
//! Tokenized custody ledgers that pair a fungible **share** with a
//! per-identifier **receipt**. Every share in existence is backed by exactly
//! one receipt unit, and every receipt unit remembers *why* it was minted:
//! the price it was minted at, or the sequence number of the audit event
//! that justified it.
//!
//! The engine is deterministic and in-memory. The asset being custodied,
//! the price feed and the membership registry are collaborators behind
//! traits; callers hand in the caller, time and block height explicitly.
//!
//! ## Architecture
//!
//! - **types** — addresses, receipt ids, call context.
//! - **config** — fixed-point scale, vault metadata and its validation.
//! - **fixed_point** — 18-decimal mul/div with explicit rounding.
//! - **access** — capability roles and authorization errors.
//! - **ledger** — share and receipt ledgers with transfer gates.
//! - **external** — asset, price oracle and tier oracle traits plus doubles.
//! - **events** — the observable event log.
//! - **vault** — the generic vault engine and its strategy hooks.
//!
//! ## Design Philosophy
//!
//! 1. Co-mint and co-burn or do nothing. Partial states are never observable.
//! 2. Round against the caller, every time.
//! 3. Policy lives in strategies; the engine stays variant-agnostic.
//! 4. If it touches a balance, it has tests.

pub mod access;
pub mod config;
pub mod events;
pub mod external;
pub mod fixed_point;
pub mod ledger;
pub mod types;
pub mod vault;

pub use access::{AuthorizationError, Role, RoleRegistry};
pub use config::{VaultConfig, FIXED_POINT_ONE};
pub use events::{EventLog, VaultEvent};
pub use external::{Asset, AssetError, OracleError, PriceOracle, TierOracle};
pub use fixed_point::{MathError, Rounding};
pub use ledger::{LedgerError, ReceiptLedger, ShareLedger};
pub use types::{Address, CallContext, ReceiptId};
pub use vault::{IdAllocation, Ledgers, ReceiptVault, SharedVault, VaultError, VaultStrategy};
