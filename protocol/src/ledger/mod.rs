//! # Share & Receipt Ledgers
//!
//! The two token ledgers a vault owns exclusively:
//!
//! ```text
//! share.rs    — fungible share balances, supply, allowances, snapshots
//! receipt.rs  — per-(holder, id) receipt balances and operator approvals
//! ```
//!
//! Both ledgers share the same rules:
//!
//! 1. **Owner-gated supply.** Mint, burn and forced transfers are only
//!    accepted from the ledger owner (the vault's own address).
//! 2. **Gate before every movement.** Each movement, mints and burns
//!    included, is first submitted to a [`TransferGate`] supplied by the
//!    vault. A denial aborts the movement before any balance changes.
//! 3. **Checked arithmetic.** Balances and supply use `checked_add` /
//!    `checked_sub`; overflow is an error, never a wrap.

pub mod receipt;
pub mod share;

pub use receipt::ReceiptLedger;
pub use share::{ShareLedger, SnapshotId};

use thiserror::Error;

use crate::access::AuthorizationError;
use crate::types::{Address, ReceiptId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by ledger operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// A supply-changing call came from someone other than the ledger owner.
    #[error("{caller} is not the ledger owner")]
    NotOwner {
        /// The rejected operator.
        caller: Address,
    },

    /// A holder transfer was submitted by an operator without approval.
    #[error("{operator} is not approved to move receipts of {owner}")]
    NotApproved {
        /// Holder whose receipts were targeted.
        owner: Address,
        /// The unapproved operator.
        operator: Address,
    },

    /// Share balance too small for a burn or transfer.
    #[error("insufficient share balance for {holder}: available {available}, requested {requested}")]
    InsufficientShares {
        holder: Address,
        available: u128,
        requested: u128,
    },

    /// Receipt balance at `id` too small for a burn or transfer.
    #[error(
        "insufficient receipt balance for {holder} at id {id}: available {available}, requested {requested}"
    )]
    InsufficientBalance {
        holder: Address,
        id: ReceiptId,
        available: u128,
        requested: u128,
    },

    /// Allowance too small for a delegated spend.
    #[error("insufficient allowance from {owner} to {spender}: allowance {allowance}, requested {requested}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        allowance: u128,
        requested: u128,
    },

    /// A balance or supply would exceed `u128::MAX`.
    #[error("ledger overflow")]
    Overflow,

    /// Holder transfers cannot target the zero address; mint and burn do that.
    #[error("transfer to or from the zero address")]
    ZeroAddress,

    /// Snapshot id was never issued.
    #[error("unknown snapshot {0}")]
    UnknownSnapshot(SnapshotId),

    /// The vault's transfer gate denied the movement.
    #[error("transfer denied: {0}")]
    Unauthorized(#[from] AuthorizationError),
}

// ---------------------------------------------------------------------------
// TransferGate
// ---------------------------------------------------------------------------

/// Authorization hook the vault hands to its ledgers.
///
/// Called before every movement with the effective `from` and `to`; a mint
/// has `from == Address::ZERO`, a burn has `to == Address::ZERO`.
pub trait TransferGate {
    /// Approves or denies a share movement.
    fn authorize_share_transfer(&self, from: &Address, to: &Address)
        -> Result<(), AuthorizationError>;

    /// Approves or denies a receipt movement.
    fn authorize_receipt_transfer(
        &self,
        from: &Address,
        to: &Address,
    ) -> Result<(), AuthorizationError>;
}

/// A gate that approves everything. Useful for ledgers used outside a vault.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGate;

impl TransferGate for OpenGate {
    fn authorize_share_transfer(&self, _: &Address, _: &Address) -> Result<(), AuthorizationError> {
        Ok(())
    }

    fn authorize_receipt_transfer(
        &self,
        _: &Address,
        _: &Address,
    ) -> Result<(), AuthorizationError> {
        Ok(())
    }
}
