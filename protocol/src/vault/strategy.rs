//! Variant hooks.
//!
//! The core [`ReceiptVault`](super::ReceiptVault) knows how to mint, burn
//! and roll back; a [`VaultStrategy`] tells it at which ratio, under which
//! receipt id, and who may do what. Every hook has a permissive default
//! except the two ratio sources, which each variant must supply.

use std::fmt;

use super::{Ledgers, VaultError};
use crate::access::AuthorizationError;
use crate::types::{Address, CallContext, ReceiptId};

/// How a deposit picks its receipt id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdAllocation {
    /// The id is the share ratio the deposit was priced at.
    ShareRatio,
    /// The id is the next value of the vault's highwater counter.
    Sequential,
}

/// A deposit about to be executed, handed to [`VaultStrategy::before_deposit`].
#[derive(Debug, Clone, Copy)]
pub struct DepositIntent<'a> {
    pub depositor: Address,
    pub receiver: Address,
    pub assets: u128,
    pub shares: u128,
    pub id: ReceiptId,
    pub justification: &'a [u8],
    /// `true` when the id was chosen by the caller rather than allocated.
    pub redeposit: bool,
}

/// A completed withdrawal, handed to [`VaultStrategy::after_withdraw`].
#[derive(Debug, Clone, Copy)]
pub struct WithdrawIntent<'a> {
    pub caller: Address,
    pub receiver: Address,
    pub owner: Address,
    pub assets: u128,
    pub shares: u128,
    pub id: ReceiptId,
    pub justification: &'a [u8],
}

/// Variant-specific policy plugged into the generic vault.
///
/// Strategies are cloned when the vault takes a checkpoint, so any state
/// they hold (roles, certification, tier policies) rolls back together
/// with the ledgers.
pub trait VaultStrategy: Clone + Send + fmt::Debug {
    /// How deposits are assigned receipt ids.
    fn id_allocation(&self) -> IdAllocation;

    /// Ratio for a deposit or mint. Read exactly once per operation.
    fn deposit_ratio(&self, ctx: &CallContext) -> Result<u128, VaultError>;

    /// Ratio for a withdraw or redeem against receipt `id`.
    fn withdraw_ratio(&self, ctx: &CallContext, id: ReceiptId) -> Result<u128, VaultError>;

    /// Ratio used by deposit and mint previews. `Ok(0)` means the caller
    /// could not deposit, and the preview reports 0.
    fn preview_deposit_ratio(&self, ctx: &CallContext) -> Result<u128, VaultError> {
        self.deposit_ratio(ctx)
    }

    /// Ratio used by withdraw and redeem previews. `Ok(0)` means the caller
    /// could not withdraw.
    fn preview_withdraw_ratio(&self, ctx: &CallContext, id: ReceiptId) -> Result<u128, VaultError> {
        self.withdraw_ratio(ctx, id)
    }

    /// Runs before any asset or ledger movement of a deposit.
    fn before_deposit(
        &self,
        _ctx: &CallContext,
        _ledgers: &Ledgers,
        _intent: &DepositIntent<'_>,
    ) -> Result<(), VaultError> {
        Ok(())
    }

    /// Runs after a withdrawal moved everything; an error rolls it all back.
    fn after_withdraw(
        &self,
        _ctx: &CallContext,
        _ledgers: &Ledgers,
        _intent: &WithdrawIntent<'_>,
    ) -> Result<(), VaultError> {
        Ok(())
    }

    /// Gate for every share movement, mints and burns included.
    fn authorize_share_transfer(
        &self,
        _ctx: &CallContext,
        _from: &Address,
        _to: &Address,
    ) -> Result<(), AuthorizationError> {
        Ok(())
    }

    /// Gate for every receipt movement, mints and burns included.
    fn authorize_receipt_transfer(
        &self,
        _ctx: &CallContext,
        _from: &Address,
        _to: &Address,
    ) -> Result<(), AuthorizationError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FixedRatio
// ---------------------------------------------------------------------------

/// An ungated strategy with a constant ratio. Withdrawals always use the
/// same ratio, whatever the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRatio {
    pub ratio: u128,
    pub allocation: IdAllocation,
}

impl FixedRatio {
    pub fn new(ratio: u128, allocation: IdAllocation) -> Self {
        Self { ratio, allocation }
    }
}

impl VaultStrategy for FixedRatio {
    fn id_allocation(&self) -> IdAllocation {
        self.allocation
    }

    fn deposit_ratio(&self, _ctx: &CallContext) -> Result<u128, VaultError> {
        Ok(self.ratio)
    }

    fn withdraw_ratio(&self, _ctx: &CallContext, _id: ReceiptId) -> Result<u128, VaultError> {
        Ok(self.ratio)
    }
}
