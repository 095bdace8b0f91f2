//! # Receipt Vault Engine
//!
//! The accounting core shared by every vault variant. A vault owns a share
//! ledger and a receipt ledger and keeps them in lockstep:
//!
//! ```text
//!   deposit ──► pull assets ──► mint shares ──► mint receipts @ id
//!   withdraw ─► burn receipts @ id ──► burn shares ──► push assets
//! ```
//!
//! ## Layout
//!
//! ```text
//! engine.rs    — ReceiptVault<S>: operations, previews, checkpoints
//! strategy.rs  — VaultStrategy hooks, IdAllocation, deposit/withdraw intents
//! shared.rs    — SharedVault: a vault behind Arc<Mutex<_>>
//! ```
//!
//! ## Invariants
//!
//! 1. **Backing.** After every completed operation the share supply equals
//!    the sum of all receipt balances.
//! 2. **All or nothing.** Every mutating entry point runs inside
//!    [`ReceiptVault::transact`]. A failure restores the ledgers, the
//!    highwater id, the strategy state and the event log, and hands back any
//!    asset the operation already moved.
//! 3. **Monotonic ids.** The highwater id only grows, and a sequential id
//!    is never handed out twice by committed deposits.
//! 4. **Rounding favors the vault.** Shares out round down, assets in and
//!    shares burned round up, assets out round down.

pub mod engine;
pub mod shared;
pub mod strategy;

pub use engine::ReceiptVault;
pub use shared::SharedVault;
pub use strategy::{DepositIntent, FixedRatio, IdAllocation, VaultStrategy, WithdrawIntent};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::AuthorizationError;
use crate::config::ConfigError;
use crate::external::{AssetError, OracleError};
use crate::fixed_point::MathError;
use crate::ledger::{LedgerError, ReceiptLedger, ShareLedger};
use crate::types::{Address, ReceiptId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by vault operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("assets amount must be nonzero")]
    ZeroAssetsAmount,

    #[error("shares amount must be nonzero")]
    ZeroSharesAmount,

    #[error("receiver must not be the zero address")]
    ZeroReceiver,

    #[error("owner must not be the zero address")]
    ZeroOwner,

    /// The ratio read for this operation is below the caller's floor.
    #[error("share ratio {actual} below minimum {minimum}")]
    MinShareRatio { minimum: u128, actual: u128 },

    /// The ratio for a withdrawal or mint is zero.
    #[error("share ratio is zero")]
    ZeroShareRatio,

    /// An explicit receipt id that the vault never issued.
    #[error("invalid receipt id {id} (highwater {highwater})")]
    InvalidId { id: ReceiptId, highwater: ReceiptId },

    /// Information attached to a receipt id the caller holds none of.
    #[error("{account} holds no receipts at id {id}")]
    NoReceiptBalance { account: Address, id: ReceiptId },

    /// A guarded section was entered while already inside one.
    #[error("reentrant call")]
    Reentrant,

    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl VaultError {
    /// The authorization failure behind this error, whether raised by a
    /// hook directly or by a ledger's transfer gate.
    pub fn authorization(&self) -> Option<&AuthorizationError> {
        match self {
            VaultError::Unauthorized(err) => Some(err),
            VaultError::Ledger(LedgerError::Unauthorized(err)) => Some(err),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Ledgers
// ---------------------------------------------------------------------------

/// The two ledgers a vault owns. Hooks get read access to both.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ledgers {
    pub shares: ShareLedger,
    pub receipts: ReceiptLedger,
}

impl Ledgers {
    /// Empty ledgers owned by `owner`.
    pub fn new(owner: Address) -> Self {
        Self {
            shares: ShareLedger::new(owner),
            receipts: ReceiptLedger::new(owner),
        }
    }

    /// Copy taken before a transaction. Share snapshots are append-only and
    /// are left out of the copy.
    pub(crate) fn checkpoint(&self) -> Self {
        Self {
            shares: self.shares.checkpoint(),
            receipts: self.receipts.clone(),
        }
    }

    /// Puts back a [`Self::checkpoint`] copy.
    pub(crate) fn rollback(&mut self, saved: Self) {
        self.shares.rollback(saved.shares);
        self.receipts = saved.receipts;
    }

    /// Whether share supply equals the sum of every receipt balance.
    pub fn is_backed(&self) -> bool {
        self.shares.total_supply() == self.receipts.total()
    }
}
