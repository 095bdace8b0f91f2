//! The generic receipt vault.
//!
//! [`ReceiptVault`] holds the ledgers, the highwater id, the event log and
//! the journal of asset movements. Policy lives in the strategy `S`; this
//! file only knows how to price, co-mint, co-burn and undo.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::strategy::{DepositIntent, IdAllocation, VaultStrategy, WithdrawIntent};
use super::{Ledgers, VaultError};
use crate::access::AuthorizationError;
use crate::config::VaultConfig;
use crate::events::{EventLog, VaultEvent};
use crate::external::Asset;
use crate::fixed_point::{self, Rounding};
use crate::ledger::{ReceiptLedger, SnapshotId, TransferGate};
use crate::types::{Address, CallContext, ReceiptId};

/// One asset movement performed by the current outermost operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetMovement {
    In { from: Address, amount: u128 },
    Out { to: Address, amount: u128 },
}

/// Everything [`ReceiptVault::transact`] restores on failure.
struct Checkpoint<S> {
    ledgers: Ledgers,
    highwater_id: ReceiptId,
    strategy: S,
    events: usize,
    journal: usize,
}

/// Adapts the strategy's authorization hooks to the ledgers' gate.
struct Gate<'a, S> {
    strategy: &'a S,
    ctx: &'a CallContext,
}

impl<S: VaultStrategy> TransferGate for Gate<'_, S> {
    fn authorize_share_transfer(
        &self,
        from: &Address,
        to: &Address,
    ) -> Result<(), AuthorizationError> {
        self.strategy.authorize_share_transfer(self.ctx, from, to)
    }

    fn authorize_receipt_transfer(
        &self,
        from: &Address,
        to: &Address,
    ) -> Result<(), AuthorizationError> {
        self.strategy.authorize_receipt_transfer(self.ctx, from, to)
    }
}

// ---------------------------------------------------------------------------
// ReceiptVault
// ---------------------------------------------------------------------------

/// A share/receipt vault driven by strategy `S`.
pub struct ReceiptVault<S> {
    config: VaultConfig,
    asset: Option<Arc<dyn Asset>>,
    ledgers: Ledgers,
    highwater_id: ReceiptId,
    strategy: S,
    events: EventLog,
    journal: Vec<AssetMovement>,
    /// Nesting level of `transact`.
    depth: usize,
    /// Set while inside `non_reentrant`.
    entered: bool,
}

impl<S: fmt::Debug> fmt::Debug for ReceiptVault<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiptVault")
            .field("address", &self.config.address)
            .field("name", &self.config.name)
            .field("total_supply", &self.ledgers.shares.total_supply())
            .field("highwater_id", &self.highwater_id)
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl<S: VaultStrategy> ReceiptVault<S> {
    /// Builds a vault from a validated config.
    ///
    /// `asset` is the custodied token; pass `None` for vaults whose assets
    /// live off-ledger.
    pub fn new(
        config: VaultConfig,
        asset: Option<Arc<dyn Asset>>,
        strategy: S,
    ) -> Result<Self, VaultError> {
        config.validate()?;
        debug!(vault = %config.address, name = %config.name, "vault created");
        Ok(Self {
            ledgers: Ledgers::new(config.address),
            config,
            asset,
            highwater_id: 0,
            strategy,
            events: EventLog::new(),
            journal: Vec::new(),
            depth: 0,
            entered: false,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// The vault's own account, owner of both ledgers.
    pub fn address(&self) -> Address {
        self.config.address
    }

    pub fn asset(&self) -> Option<&Arc<dyn Asset>> {
        self.asset.as_ref()
    }

    pub fn ledgers(&self) -> &Ledgers {
        &self.ledgers
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Mutable strategy access. Changes made inside [`Self::transact`] roll
    /// back with everything else.
    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    /// Largest sequential id handed out so far.
    pub fn highwater_id(&self) -> ReceiptId {
        self.highwater_id
    }

    pub fn total_supply(&self) -> u128 {
        self.ledgers.shares.total_supply()
    }

    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.ledgers.shares.balance_of(holder)
    }

    pub fn receipt_balance_of(&self, holder: &Address, id: ReceiptId) -> u128 {
        self.ledgers.receipts.balance_of(holder, id)
    }

    /// Whether share supply equals the sum of receipt balances.
    pub fn is_backed(&self) -> bool {
        self.ledgers.is_backed()
    }

    /// Events emitted so far and not yet drained.
    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    /// Hands buffered events to an observer.
    pub fn drain_events(&mut self) -> Vec<VaultEvent> {
        debug_assert_eq!(self.depth, 0, "events drained mid-operation");
        std::mem::take(&mut self.events)
    }

    /// Appends a variant-level event to the log.
    pub fn emit(&mut self, event: VaultEvent) {
        self.events.push(event);
    }

    // -----------------------------------------------------------------------
    // Atomicity
    // -----------------------------------------------------------------------

    /// Runs `f` as one atomic step.
    ///
    /// On error the vault is restored to its state before `f` ran and every
    /// asset movement `f` journaled is reversed, newest first. Calls nest;
    /// an inner failure only unwinds the inner step.
    pub fn transact<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        E: fmt::Display,
    {
        let checkpoint = self.checkpoint();
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        if let Err(err) = &result {
            warn!(
                vault = %self.config.address,
                depth = self.depth,
                error = %err,
                "operation rolled back"
            );
            self.restore(checkpoint);
        }
        if self.depth == 0 {
            self.journal.clear();
            debug_assert!(self.ledgers.is_backed(), "share supply no longer backed by receipts");
        }
        result
    }

    /// Runs `f` with the reentrancy guard held.
    pub fn non_reentrant<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<VaultError>,
    {
        if self.entered {
            return Err(VaultError::Reentrant.into());
        }
        self.entered = true;
        let result = f(self);
        self.entered = false;
        result
    }

    fn checkpoint(&self) -> Checkpoint<S> {
        Checkpoint {
            ledgers: self.ledgers.checkpoint(),
            highwater_id: self.highwater_id,
            strategy: self.strategy.clone(),
            events: self.events.len(),
            journal: self.journal.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint<S>) {
        self.ledgers.rollback(checkpoint.ledgers);
        self.highwater_id = checkpoint.highwater_id;
        self.strategy = checkpoint.strategy;
        self.events.truncate(checkpoint.events);

        let undone = self.journal.split_off(checkpoint.journal);
        let Some(asset) = &self.asset else {
            return;
        };
        for movement in undone.iter().rev() {
            let outcome = match movement {
                AssetMovement::In { from, amount } => asset.transfer_out(from, *amount),
                AssetMovement::Out { to, amount } => asset.transfer_in(to, *amount),
            };
            if let Err(err) = outcome {
                error!(
                    vault = %self.config.address,
                    ?movement,
                    error = %err,
                    "asset compensation failed"
                );
            }
        }
    }

    fn pull_assets(&mut self, from: &Address, amount: u128) -> Result<(), VaultError> {
        if let Some(asset) = &self.asset {
            asset.transfer_in(from, amount)?;
            self.journal.push(AssetMovement::In { from: *from, amount });
        }
        Ok(())
    }

    fn push_assets(&mut self, to: &Address, amount: u128) -> Result<(), VaultError> {
        if let Some(asset) = &self.asset {
            asset.transfer_out(to, amount)?;
            self.journal.push(AssetMovement::Out { to: *to, amount });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Deposit & mint
    // -----------------------------------------------------------------------

    /// Deposits `assets` for `receiver` under a freshly allocated id.
    /// Returns the shares minted.
    ///
    /// # Errors
    ///
    /// `ZeroAssetsAmount`, `MinShareRatio`, `ZeroReceiver` and
    /// `ZeroSharesAmount` are checked in that order before anything moves.
    /// Hook, asset and ledger failures roll the whole deposit back.
    pub fn deposit(
        &mut self,
        ctx: &CallContext,
        assets: u128,
        receiver: Address,
        min_share_ratio: u128,
        justification: &[u8],
    ) -> Result<u128, VaultError> {
        let (ratio, shares) = self.price_deposit(ctx, assets, receiver, min_share_ratio)?;
        self.transact(|vault| {
            let id = vault.allocate_id(ratio);
            vault.execute_deposit(
                ctx,
                DepositIntent {
                    depositor: ctx.caller,
                    receiver,
                    assets,
                    shares,
                    id,
                    justification,
                    redeposit: false,
                },
            )
        })?;
        Ok(shares)
    }

    /// Deposits under an existing receipt id chosen by the caller.
    ///
    /// Sequential vaults accept `0 < id <= highwater_id`; ratio-keyed
    /// vaults only accept the id the current ratio would allocate.
    pub fn deposit_at(
        &mut self,
        ctx: &CallContext,
        assets: u128,
        receiver: Address,
        min_share_ratio: u128,
        id: ReceiptId,
        justification: &[u8],
    ) -> Result<u128, VaultError> {
        let (ratio, shares) = self.price_deposit(ctx, assets, receiver, min_share_ratio)?;
        self.check_explicit_id(id, ratio)?;
        self.transact(|vault| {
            vault.execute_deposit(
                ctx,
                DepositIntent {
                    depositor: ctx.caller,
                    receiver,
                    assets,
                    shares,
                    id,
                    justification,
                    redeposit: true,
                },
            )
        })?;
        Ok(shares)
    }

    /// Mints exactly `shares` to `receiver`, pulling the assets they cost
    /// (rounded up). Returns the assets paid.
    pub fn mint(
        &mut self,
        ctx: &CallContext,
        shares: u128,
        receiver: Address,
        min_share_ratio: u128,
        justification: &[u8],
    ) -> Result<u128, VaultError> {
        if shares == 0 {
            return Err(VaultError::ZeroSharesAmount);
        }
        let ratio = self.strategy.deposit_ratio(ctx)?;
        check_min_ratio(min_share_ratio, ratio)?;
        if receiver.is_zero() {
            return Err(VaultError::ZeroReceiver);
        }
        if ratio == 0 {
            return Err(VaultError::ZeroShareRatio);
        }
        let assets = fixed_point::div(shares, ratio, Rounding::Up)?;

        self.transact(|vault| {
            let id = vault.allocate_id(ratio);
            vault.execute_deposit(
                ctx,
                DepositIntent {
                    depositor: ctx.caller,
                    receiver,
                    assets,
                    shares,
                    id,
                    justification,
                    redeposit: false,
                },
            )
        })?;
        Ok(assets)
    }

    fn price_deposit(
        &self,
        ctx: &CallContext,
        assets: u128,
        receiver: Address,
        min_share_ratio: u128,
    ) -> Result<(u128, u128), VaultError> {
        if assets == 0 {
            return Err(VaultError::ZeroAssetsAmount);
        }
        let ratio = self.strategy.deposit_ratio(ctx)?;
        check_min_ratio(min_share_ratio, ratio)?;
        if receiver.is_zero() {
            return Err(VaultError::ZeroReceiver);
        }
        let shares = fixed_point::mul(assets, ratio, Rounding::Down)?;
        if shares == 0 {
            return Err(VaultError::ZeroSharesAmount);
        }
        Ok((ratio, shares))
    }

    fn allocate_id(&mut self, ratio: u128) -> ReceiptId {
        match self.strategy.id_allocation() {
            IdAllocation::ShareRatio => ratio,
            IdAllocation::Sequential => {
                self.highwater_id += 1;
                self.highwater_id
            }
        }
    }

    fn check_explicit_id(&self, id: ReceiptId, ratio: u128) -> Result<(), VaultError> {
        let valid = match self.strategy.id_allocation() {
            IdAllocation::ShareRatio => id == ratio,
            IdAllocation::Sequential => id > 0 && id <= self.highwater_id,
        };
        if valid {
            Ok(())
        } else {
            Err(VaultError::InvalidId {
                id,
                highwater: self.highwater_id,
            })
        }
    }

    fn execute_deposit(
        &mut self,
        ctx: &CallContext,
        intent: DepositIntent<'_>,
    ) -> Result<(), VaultError> {
        self.strategy.before_deposit(ctx, &self.ledgers, &intent)?;
        self.pull_assets(&intent.depositor, intent.assets)?;

        let owner = self.config.address;
        let gate = Gate {
            strategy: &self.strategy,
            ctx,
        };
        self.ledgers
            .shares
            .mint(&owner, &intent.receiver, intent.shares, &gate, &mut self.events)?;
        self.ledgers.receipts.mint(
            &owner,
            &intent.receiver,
            intent.id,
            intent.shares,
            intent.justification,
            &gate,
            &mut self.events,
        )?;

        self.events.push(VaultEvent::Deposit {
            depositor: intent.depositor,
            receiver: intent.receiver,
            assets: intent.assets,
            shares: intent.shares,
            id: intent.id,
            justification: intent.justification.to_vec(),
        });
        debug!(
            vault = %owner,
            depositor = %intent.depositor,
            receiver = %intent.receiver,
            assets = intent.assets,
            shares = intent.shares,
            id = intent.id,
            redeposit = intent.redeposit,
            "deposit"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Withdraw & redeem
    // -----------------------------------------------------------------------

    /// Withdraws exactly `assets` to `receiver`, burning the shares and
    /// receipts at `id` they cost (rounded up). Returns the shares burned.
    ///
    /// A caller other than `owner` spends `owner`'s share allowance.
    pub fn withdraw(
        &mut self,
        ctx: &CallContext,
        assets: u128,
        receiver: Address,
        owner: Address,
        id: ReceiptId,
        justification: &[u8],
    ) -> Result<u128, VaultError> {
        if assets == 0 {
            return Err(VaultError::ZeroAssetsAmount);
        }
        check_parties(&receiver, &owner)?;
        let ratio = self.strategy.withdraw_ratio(ctx, id)?;
        if ratio == 0 {
            return Err(VaultError::ZeroShareRatio);
        }
        let shares = fixed_point::mul(assets, ratio, Rounding::Up)?;
        if shares == 0 {
            return Err(VaultError::ZeroSharesAmount);
        }

        self.transact(|vault| {
            vault.execute_withdraw(
                ctx,
                WithdrawIntent {
                    caller: ctx.caller,
                    receiver,
                    owner,
                    assets,
                    shares,
                    id,
                    justification,
                },
            )
        })?;
        Ok(shares)
    }

    /// Redeems exactly `shares` at `id`, sending the assets they are worth
    /// (rounded down) to `receiver`. Returns the assets sent.
    pub fn redeem(
        &mut self,
        ctx: &CallContext,
        shares: u128,
        receiver: Address,
        owner: Address,
        id: ReceiptId,
        justification: &[u8],
    ) -> Result<u128, VaultError> {
        if shares == 0 {
            return Err(VaultError::ZeroSharesAmount);
        }
        check_parties(&receiver, &owner)?;
        let ratio = self.strategy.withdraw_ratio(ctx, id)?;
        if ratio == 0 {
            return Err(VaultError::ZeroShareRatio);
        }
        let assets = fixed_point::div(shares, ratio, Rounding::Down)?;
        if assets == 0 {
            return Err(VaultError::ZeroAssetsAmount);
        }

        self.transact(|vault| {
            vault.execute_withdraw(
                ctx,
                WithdrawIntent {
                    caller: ctx.caller,
                    receiver,
                    owner,
                    assets,
                    shares,
                    id,
                    justification,
                },
            )
        })?;
        Ok(assets)
    }

    fn execute_withdraw(
        &mut self,
        ctx: &CallContext,
        intent: WithdrawIntent<'_>,
    ) -> Result<(), VaultError> {
        if intent.caller != intent.owner {
            self.ledgers
                .shares
                .spend_allowance(&intent.owner, &intent.caller, intent.shares)?;
        }

        let vault = self.config.address;
        let gate = Gate {
            strategy: &self.strategy,
            ctx,
        };
        self.ledgers.receipts.burn(
            &vault,
            &intent.owner,
            intent.id,
            intent.shares,
            intent.justification,
            &gate,
            &mut self.events,
        )?;
        self.ledgers
            .shares
            .burn(&vault, &intent.owner, intent.shares, &gate, &mut self.events)?;

        self.push_assets(&intent.receiver, intent.assets)?;
        self.strategy.after_withdraw(ctx, &self.ledgers, &intent)?;

        self.events.push(VaultEvent::Withdraw {
            caller: intent.caller,
            receiver: intent.receiver,
            owner: intent.owner,
            assets: intent.assets,
            shares: intent.shares,
            id: intent.id,
            justification: intent.justification.to_vec(),
        });
        debug!(
            vault = %vault,
            caller = %intent.caller,
            owner = %intent.owner,
            receiver = %intent.receiver,
            assets = intent.assets,
            shares = intent.shares,
            id = intent.id,
            "withdraw"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Previews, conversions & limits
    // -----------------------------------------------------------------------

    /// Shares a deposit of `assets` would mint, or 0 if the caller cannot deposit.
    pub fn preview_deposit(&self, ctx: &CallContext, assets: u128) -> Result<u128, VaultError> {
        match self.strategy.preview_deposit_ratio(ctx)? {
            0 => Ok(0),
            ratio => Ok(fixed_point::mul(assets, ratio, Rounding::Down)?),
        }
    }

    /// Assets a mint of `shares` would cost, or 0 if the caller cannot deposit.
    pub fn preview_mint(&self, ctx: &CallContext, shares: u128) -> Result<u128, VaultError> {
        match self.strategy.preview_deposit_ratio(ctx)? {
            0 => Ok(0),
            ratio => Ok(fixed_point::div(shares, ratio, Rounding::Up)?),
        }
    }

    /// Shares a withdrawal of `assets` at `id` would burn, or 0 if the
    /// caller cannot withdraw.
    pub fn preview_withdraw(
        &self,
        ctx: &CallContext,
        assets: u128,
        id: ReceiptId,
    ) -> Result<u128, VaultError> {
        match self.strategy.preview_withdraw_ratio(ctx, id)? {
            0 => Ok(0),
            ratio => Ok(fixed_point::mul(assets, ratio, Rounding::Up)?),
        }
    }

    /// Assets a redemption of `shares` at `id` would return, or 0 if the
    /// caller cannot withdraw.
    pub fn preview_redeem(
        &self,
        ctx: &CallContext,
        shares: u128,
        id: ReceiptId,
    ) -> Result<u128, VaultError> {
        match self.strategy.preview_withdraw_ratio(ctx, id)? {
            0 => Ok(0),
            ratio => Ok(fixed_point::div(shares, ratio, Rounding::Down)?),
        }
    }

    /// Assets under management: the custodied balance for asset-backed
    /// vaults, otherwise the share supply at 1:1.
    pub fn total_assets(&self) -> u128 {
        match &self.asset {
            Some(asset) => asset.balance_of(&self.config.address),
            None => self.ledgers.shares.total_supply(),
        }
    }

    /// Shares `assets` converts to at the current deposit ratio, rounded down.
    pub fn convert_to_shares(&self, ctx: &CallContext, assets: u128) -> Result<u128, VaultError> {
        let ratio = self.strategy.deposit_ratio(ctx)?;
        Ok(fixed_point::mul(assets, ratio, Rounding::Down)?)
    }

    /// Assets `shares` converts to at the current deposit ratio, rounded down.
    pub fn convert_to_assets(&self, ctx: &CallContext, shares: u128) -> Result<u128, VaultError> {
        match self.strategy.deposit_ratio(ctx)? {
            0 => Ok(0),
            ratio => Ok(fixed_point::div(shares, ratio, Rounding::Down)?),
        }
    }

    /// Largest number of shares `owner` can redeem at `id`: bounded by both
    /// the share balance and the receipt balance at `id`.
    pub fn max_redeem(&self, owner: &Address, id: ReceiptId) -> u128 {
        self.ledgers
            .shares
            .balance_of(owner)
            .min(self.ledgers.receipts.balance_of(owner, id))
    }

    /// Largest amount of assets `owner` can withdraw at `id`.
    pub fn max_withdraw(
        &self,
        ctx: &CallContext,
        owner: &Address,
        id: ReceiptId,
    ) -> Result<u128, VaultError> {
        match self.strategy.withdraw_ratio(ctx, id)? {
            0 => Ok(0),
            ratio => Ok(fixed_point::div(self.max_redeem(owner, id), ratio, Rounding::Down)?),
        }
    }

    // -----------------------------------------------------------------------
    // Holder operations
    // -----------------------------------------------------------------------

    /// Moves the caller's shares to `to`.
    pub fn transfer_shares(
        &mut self,
        ctx: &CallContext,
        to: Address,
        amount: u128,
    ) -> Result<(), VaultError> {
        let gate = Gate {
            strategy: &self.strategy,
            ctx,
        };
        self.ledgers
            .shares
            .transfer(&ctx.caller, &to, amount, &gate, &mut self.events)?;
        Ok(())
    }

    /// Sets the caller's share allowance for `spender`.
    pub fn approve_shares(
        &mut self,
        ctx: &CallContext,
        spender: Address,
        amount: u128,
    ) -> Result<(), VaultError> {
        self.ledgers
            .shares
            .approve(&ctx.caller, &spender, amount, &mut self.events)?;
        Ok(())
    }

    /// Moves `from`'s shares to `to`, spending the caller's allowance.
    pub fn transfer_shares_from(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), VaultError> {
        let gate = Gate {
            strategy: &self.strategy,
            ctx,
        };
        self.ledgers
            .shares
            .transfer_from(&ctx.caller, &from, &to, amount, &gate, &mut self.events)?;
        Ok(())
    }

    /// Moves receipts at `id` from `from` to `to`. The caller must be `from`
    /// or approved for all of `from`'s receipts.
    pub fn transfer_receipt(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        id: ReceiptId,
        amount: u128,
    ) -> Result<(), VaultError> {
        let gate = Gate {
            strategy: &self.strategy,
            ctx,
        };
        self.ledgers
            .receipts
            .transfer(&ctx.caller, &from, &to, id, amount, &gate, &mut self.events)?;
        Ok(())
    }

    pub fn set_receipt_approval_for_all(
        &mut self,
        ctx: &CallContext,
        operator: Address,
        approved: bool,
    ) -> Result<(), VaultError> {
        self.ledgers
            .receipts
            .set_approval_for_all(&ctx.caller, &operator, approved, &mut self.events)?;
        Ok(())
    }

    /// Attaches `information` to the caller's receipts at `id`.
    pub fn receipt_information(
        &mut self,
        ctx: &CallContext,
        id: ReceiptId,
        information: &[u8],
    ) -> Result<(), VaultError> {
        if self.ledgers.receipts.balance_of(&ctx.caller, id) == 0 {
            return Err(VaultError::NoReceiptBalance {
                account: ctx.caller,
                id,
            });
        }
        ReceiptLedger::information(&ctx.caller, &ctx.caller, id, information, &mut self.events);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Owner operations, for variants
    // -----------------------------------------------------------------------

    /// Forces a share movement on the vault's authority. The gate still runs.
    pub fn owner_transfer_shares(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), VaultError> {
        let owner = self.config.address;
        let gate = Gate {
            strategy: &self.strategy,
            ctx,
        };
        self.ledgers
            .shares
            .owner_transfer(&owner, &from, &to, amount, &gate, &mut self.events)?;
        Ok(())
    }

    /// Forces a receipt movement on the vault's authority. The gate still runs.
    pub fn owner_transfer_receipt(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        id: ReceiptId,
        amount: u128,
    ) -> Result<(), VaultError> {
        let owner = self.config.address;
        let gate = Gate {
            strategy: &self.strategy,
            ctx,
        };
        self.ledgers
            .receipts
            .owner_transfer(&owner, &from, &to, id, amount, &gate, &mut self.events)?;
        Ok(())
    }

    /// Takes a share snapshot. Access control is the variant's business.
    pub fn snapshot_shares(&mut self) -> SnapshotId {
        self.ledgers.shares.snapshot(&mut self.events)
    }
}

fn check_min_ratio(minimum: u128, actual: u128) -> Result<(), VaultError> {
    if actual < minimum {
        return Err(VaultError::MinShareRatio { minimum, actual });
    }
    Ok(())
}

fn check_parties(receiver: &Address, owner: &Address) -> Result<(), VaultError> {
    if receiver.is_zero() {
        return Err(VaultError::ZeroReceiver);
    }
    if owner.is_zero() {
        return Err(VaultError::ZeroOwner);
    }
    Ok(())
}
