//! # Offchain Asset Vault
//!
//! A receipt vault whose backing asset lives off-ledger (bullion in a
//! warehouse, invoices in a file room). Nothing is pulled or pushed on
//! deposit and withdrawal; instead every mint and burn is gated by roles,
//! and every ordinary transfer by an auditor-maintained certification
//! window and optional tier policies.
//!
//! Lifecycle of the window:
//!
//! 1. A **Certifier** audits the custodian and calls [`OffchainAssetVault::certify`]
//!    with the time until which the audit holds.
//! 2. While `timestamp <= certified_until`, holders trade shares and
//!    receipts freely (subject to tier policies).
//! 3. Once the window lapses, only mints, burns, handler movements and
//!    transfers to a **Confiscator** go through, until the next certify.
//!
//! Receipt ids are sequential: each fresh deposit takes the next highwater
//! id, and a **redeposit** tops up an id the depositor already holds.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use receipt_vault_protocol::access::{AuthorizationError, Role, RoleRegistry};
use receipt_vault_protocol::config::{VaultConfig, OFFCHAIN_SHARE_RATIO};
use receipt_vault_protocol::events::VaultEvent;
use receipt_vault_protocol::external::TierOracle;
use receipt_vault_protocol::ledger::SnapshotId;
use receipt_vault_protocol::types::{hex_bytes, Address, CallContext, ReceiptId};
use receipt_vault_protocol::vault::{
    DepositIntent, IdAllocation, Ledgers, ReceiptVault, VaultError, VaultStrategy, WithdrawIntent,
};

use crate::batch::{BatchError, OperationOutput};
use crate::tier::TierPolicy;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by the offchain asset vault.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OffchainAssetError {
    /// Construction without an initial admin.
    #[error("admin must not be the zero address")]
    ZeroAdmin,

    /// Construction with an on-ledger asset; this vault has none.
    #[error("offchain asset vault must not have an asset, got {0}")]
    NonZeroAsset(Address),

    /// `certify` with `until == 0`.
    #[error("certify until must be nonzero")]
    ZeroCertifyUntil,

    /// `certify` referencing a block the host has not reached.
    #[error("reference block {reference_block} is ahead of current block {block_number}")]
    FutureReferenceBlock { reference_block: u64, block_number: u64 },

    #[error(transparent)]
    Vault(#[from] VaultError),
}

impl From<AuthorizationError> for OffchainAssetError {
    fn from(err: AuthorizationError) -> Self {
        OffchainAssetError::Vault(VaultError::Unauthorized(err))
    }
}

impl OffchainAssetError {
    /// The authorization failure behind this error, if any.
    pub fn authorization(&self) -> Option<&AuthorizationError> {
        match self {
            OffchainAssetError::Vault(err) => err.authorization(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Everything needed to stand up an offchain asset vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffchainAssetVaultConfig {
    /// Receives every admin role at construction.
    pub admin: Address,
    /// Must be the zero address.
    #[serde(default)]
    pub asset: Address,
    pub vault: VaultConfig,
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Strategy state of the offchain asset vault: roles, the certification
/// window and one tier policy per token class.
#[derive(Debug, Clone)]
pub struct OffchainAssetPolicy {
    roles: RoleRegistry,
    certified_until: u64,
    share_tier: TierPolicy,
    receipt_tier: TierPolicy,
}

impl OffchainAssetPolicy {
    pub fn new(admin: Address) -> Self {
        Self {
            roles: RoleRegistry::new(admin),
            certified_until: 0,
            share_tier: TierPolicy::disabled(),
            receipt_tier: TierPolicy::disabled(),
        }
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    /// End of the certification window; 0 until the first certify.
    pub fn certified_until(&self) -> u64 {
        self.certified_until
    }

    pub fn share_tier(&self) -> &TierPolicy {
        &self.share_tier
    }

    pub fn receipt_tier(&self) -> &TierPolicy {
        &self.receipt_tier
    }

    /// The transfer rule shared by both token classes, in order:
    ///
    /// 1. a Handler on either side is always allowed;
    /// 2. mints and burns are always allowed;
    /// 3. a transfer to a Confiscator skips the certification and sender
    ///    tier checks;
    /// 4. otherwise the certification window must be open and the sender
    ///    must satisfy the tier policy;
    /// 5. the recipient must satisfy the tier policy.
    fn authorize_transfer(
        &self,
        ctx: &CallContext,
        tier: &TierPolicy,
        from: &Address,
        to: &Address,
    ) -> Result<(), AuthorizationError> {
        if self.roles.has_role(Role::Handler, from) || self.roles.has_role(Role::Handler, to) {
            return Ok(());
        }
        if from.is_zero() || to.is_zero() {
            return Ok(());
        }

        if !self.roles.has_role(Role::Confiscator, to) {
            if ctx.timestamp > self.certified_until {
                return Err(AuthorizationError::CertificationExpired {
                    from: *from,
                    to: *to,
                    certified_until: self.certified_until,
                    timestamp: ctx.timestamp,
                });
            }
            if !tier.permits(from, ctx.timestamp) {
                return Err(AuthorizationError::SenderTierTooLow {
                    account: *from,
                    minimum_tier: tier.minimum_tier,
                });
            }
        }
        if !tier.permits(to, ctx.timestamp) {
            return Err(AuthorizationError::RecipientTierTooLow {
                account: *to,
                minimum_tier: tier.minimum_tier,
            });
        }
        Ok(())
    }
}

impl VaultStrategy for OffchainAssetPolicy {
    fn id_allocation(&self) -> IdAllocation {
        IdAllocation::Sequential
    }

    fn deposit_ratio(&self, _ctx: &CallContext) -> Result<u128, VaultError> {
        Ok(OFFCHAIN_SHARE_RATIO)
    }

    fn withdraw_ratio(&self, _ctx: &CallContext, _id: ReceiptId) -> Result<u128, VaultError> {
        Ok(OFFCHAIN_SHARE_RATIO)
    }

    fn preview_deposit_ratio(&self, ctx: &CallContext) -> Result<u128, VaultError> {
        if self.roles.has_role(Role::Depositor, &ctx.caller) {
            Ok(OFFCHAIN_SHARE_RATIO)
        } else {
            Ok(0)
        }
    }

    fn preview_withdraw_ratio(&self, ctx: &CallContext, _id: ReceiptId) -> Result<u128, VaultError> {
        if self.roles.has_role(Role::Withdrawer, &ctx.caller) {
            Ok(OFFCHAIN_SHARE_RATIO)
        } else {
            Ok(0)
        }
    }

    fn before_deposit(
        &self,
        _ctx: &CallContext,
        ledgers: &Ledgers,
        intent: &DepositIntent<'_>,
    ) -> Result<(), VaultError> {
        if !self.roles.has_role(Role::Depositor, &intent.depositor) {
            return Err(AuthorizationError::NotDepositor(intent.depositor).into());
        }
        if intent.redeposit && ledgers.receipts.balance_of(&intent.depositor, intent.id) == 0 {
            return Err(AuthorizationError::ReceiptNotHeld {
                account: intent.depositor,
                id: intent.id,
            }
            .into());
        }
        Ok(())
    }

    fn after_withdraw(
        &self,
        _ctx: &CallContext,
        _ledgers: &Ledgers,
        intent: &WithdrawIntent<'_>,
    ) -> Result<(), VaultError> {
        if !self.roles.has_role(Role::Withdrawer, &intent.owner) {
            return Err(AuthorizationError::NotWithdrawer(intent.owner).into());
        }
        Ok(())
    }

    fn authorize_share_transfer(
        &self,
        ctx: &CallContext,
        from: &Address,
        to: &Address,
    ) -> Result<(), AuthorizationError> {
        self.authorize_transfer(ctx, &self.share_tier, from, to)
    }

    fn authorize_receipt_transfer(
        &self,
        ctx: &CallContext,
        from: &Address,
        to: &Address,
    ) -> Result<(), AuthorizationError> {
        self.authorize_transfer(ctx, &self.receipt_tier, from, to)
    }
}

// ---------------------------------------------------------------------------
// Batch operations
// ---------------------------------------------------------------------------

/// One step of an offchain vault batch. Tier policy changes are not
/// batchable because they carry a live oracle handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffchainOperation {
    Deposit {
        assets: u128,
        receiver: Address,
        #[serde(default)]
        min_share_ratio: u128,
        #[serde(default, with = "hex_bytes")]
        justification: Vec<u8>,
    },
    Mint {
        shares: u128,
        receiver: Address,
        #[serde(default)]
        min_share_ratio: u128,
        #[serde(default, with = "hex_bytes")]
        justification: Vec<u8>,
    },
    Withdraw {
        assets: u128,
        receiver: Address,
        owner: Address,
        id: ReceiptId,
        #[serde(default, with = "hex_bytes")]
        justification: Vec<u8>,
    },
    Redeem {
        shares: u128,
        receiver: Address,
        owner: Address,
        id: ReceiptId,
        #[serde(default, with = "hex_bytes")]
        justification: Vec<u8>,
    },
    Redeposit {
        assets: u128,
        receiver: Address,
        id: ReceiptId,
        #[serde(default, with = "hex_bytes")]
        justification: Vec<u8>,
    },
    Certify {
        until: u64,
        reference_block: u64,
        #[serde(default)]
        force: bool,
        #[serde(default, with = "hex_bytes")]
        justification: Vec<u8>,
    },
    ConfiscateShares {
        target: Address,
        #[serde(default, with = "hex_bytes")]
        justification: Vec<u8>,
    },
    ConfiscateReceipt {
        target: Address,
        id: ReceiptId,
        #[serde(default, with = "hex_bytes")]
        justification: Vec<u8>,
    },
    Snapshot,
    GrantRole {
        role: Role,
        account: Address,
    },
    RevokeRole {
        role: Role,
        account: Address,
    },
    TransferShares {
        to: Address,
        amount: u128,
    },
    TransferReceipt {
        from: Address,
        to: Address,
        id: ReceiptId,
        amount: u128,
    },
    ReceiptInformation {
        id: ReceiptId,
        #[serde(with = "hex_bytes")]
        information: Vec<u8>,
    },
}

// ---------------------------------------------------------------------------
// OffchainAssetVault
// ---------------------------------------------------------------------------

type Inner = ReceiptVault<OffchainAssetPolicy>;

/// Role-gated receipt vault over an off-ledger asset.
#[derive(Debug)]
pub struct OffchainAssetVault {
    vault: Inner,
}

impl OffchainAssetVault {
    /// Builds the vault and grants every admin role to `config.admin`.
    pub fn new(config: OffchainAssetVaultConfig) -> Result<Self, OffchainAssetError> {
        if config.admin.is_zero() {
            return Err(OffchainAssetError::ZeroAdmin);
        }
        if !config.asset.is_zero() {
            return Err(OffchainAssetError::NonZeroAsset(config.asset));
        }
        let vault = ReceiptVault::new(config.vault, None, OffchainAssetPolicy::new(config.admin))?;
        info!(vault = %vault.address(), admin = %config.admin, "offchain asset vault initialized");
        Ok(Self { vault })
    }

    /// Read access to the underlying vault: balances, previews, limits.
    pub fn vault(&self) -> &Inner {
        &self.vault
    }

    pub fn policy(&self) -> &OffchainAssetPolicy {
        self.vault.strategy()
    }

    pub fn drain_events(&mut self) -> Vec<VaultEvent> {
        self.vault.drain_events()
    }

    // -----------------------------------------------------------------------
    // Deposit & withdraw
    // -----------------------------------------------------------------------

    /// Mints shares 1:1 for `assets` under a fresh receipt id. Depositor only.
    pub fn deposit(
        &mut self,
        ctx: &CallContext,
        assets: u128,
        receiver: Address,
        min_share_ratio: u128,
        justification: &[u8],
    ) -> Result<u128, OffchainAssetError> {
        Ok(self
            .vault
            .deposit(ctx, assets, receiver, min_share_ratio, justification)?)
    }

    pub fn mint(
        &mut self,
        ctx: &CallContext,
        shares: u128,
        receiver: Address,
        min_share_ratio: u128,
        justification: &[u8],
    ) -> Result<u128, OffchainAssetError> {
        Ok(self
            .vault
            .mint(ctx, shares, receiver, min_share_ratio, justification)?)
    }

    /// Adds `assets` under receipt `id`, which the caller must already hold.
    pub fn redeposit(
        &mut self,
        ctx: &CallContext,
        assets: u128,
        receiver: Address,
        id: ReceiptId,
        justification: &[u8],
    ) -> Result<u128, OffchainAssetError> {
        Ok(self
            .vault
            .deposit_at(ctx, assets, receiver, 0, id, justification)?)
    }

    /// Burns shares and receipts at `id`. The share owner must be a Withdrawer.
    pub fn withdraw(
        &mut self,
        ctx: &CallContext,
        assets: u128,
        receiver: Address,
        owner: Address,
        id: ReceiptId,
        justification: &[u8],
    ) -> Result<u128, OffchainAssetError> {
        Ok(self
            .vault
            .withdraw(ctx, assets, receiver, owner, id, justification)?)
    }

    pub fn redeem(
        &mut self,
        ctx: &CallContext,
        shares: u128,
        receiver: Address,
        owner: Address,
        id: ReceiptId,
        justification: &[u8],
    ) -> Result<u128, OffchainAssetError> {
        Ok(self
            .vault
            .redeem(ctx, shares, receiver, owner, id, justification)?)
    }

    // -----------------------------------------------------------------------
    // Privileged operations
    // -----------------------------------------------------------------------

    /// Extends the certification window to `until`, or sets it exactly when
    /// `force` is set. Certifier only.
    pub fn certify(
        &mut self,
        ctx: &CallContext,
        until: u64,
        reference_block: u64,
        force: bool,
        justification: &[u8],
    ) -> Result<(), OffchainAssetError> {
        self.vault.transact(|vault| {
            Self::certify_in(vault, ctx, until, reference_block, force, justification)
        })
    }

    /// Moves `target`'s whole share balance to the caller unless the target
    /// satisfies an active share tier policy. Returns the amount moved.
    pub fn confiscate_shares(
        &mut self,
        ctx: &CallContext,
        target: Address,
        justification: &[u8],
    ) -> Result<u128, OffchainAssetError> {
        self.vault
            .transact(|vault| Self::confiscate_shares_in(vault, ctx, target, justification))
    }

    /// Receipt counterpart of [`Self::confiscate_shares`] for the balance at `id`.
    pub fn confiscate_receipt(
        &mut self,
        ctx: &CallContext,
        target: Address,
        id: ReceiptId,
        justification: &[u8],
    ) -> Result<u128, OffchainAssetError> {
        self.vault.transact(|vault| {
            Self::confiscate_receipt_in(vault, ctx, target, id, justification)
        })
    }

    /// Replaces the share tier policy. ShareTierer only.
    pub fn set_share_tier(
        &mut self,
        ctx: &CallContext,
        tier: Option<Arc<dyn TierOracle>>,
        minimum_tier: u32,
        context: Vec<u64>,
        justification: &[u8],
    ) -> Result<(), OffchainAssetError> {
        self.vault
            .strategy()
            .roles
            .check_role(Role::ShareTierer, &ctx.caller)?;
        let policy = TierPolicy::new(tier, minimum_tier, context);
        self.vault.emit(VaultEvent::SetShareTier {
            sender: ctx.caller,
            tier: policy.oracle_address(),
            minimum_tier,
            context: policy.context.clone(),
            justification: justification.to_vec(),
        });
        info!(sender = %ctx.caller, minimum_tier, active = policy.is_active(), "share tier set");
        self.vault.strategy_mut().share_tier = policy;
        Ok(())
    }

    /// Replaces the receipt tier policy. ReceiptTierer only.
    pub fn set_receipt_tier(
        &mut self,
        ctx: &CallContext,
        tier: Option<Arc<dyn TierOracle>>,
        minimum_tier: u32,
        context: Vec<u64>,
        justification: &[u8],
    ) -> Result<(), OffchainAssetError> {
        self.vault
            .strategy()
            .roles
            .check_role(Role::ReceiptTierer, &ctx.caller)?;
        let policy = TierPolicy::new(tier, minimum_tier, context);
        self.vault.emit(VaultEvent::SetReceiptTier {
            sender: ctx.caller,
            tier: policy.oracle_address(),
            minimum_tier,
            context: policy.context.clone(),
            justification: justification.to_vec(),
        });
        info!(sender = %ctx.caller, minimum_tier, active = policy.is_active(), "receipt tier set");
        self.vault.strategy_mut().receipt_tier = policy;
        Ok(())
    }

    /// Snapshots share balances. Snapshotter only.
    pub fn snapshot(&mut self, ctx: &CallContext) -> Result<SnapshotId, OffchainAssetError> {
        Self::snapshot_in(&mut self.vault, ctx)
    }

    pub fn grant_role(
        &mut self,
        ctx: &CallContext,
        role: Role,
        account: Address,
    ) -> Result<bool, OffchainAssetError> {
        Self::grant_role_in(&mut self.vault, ctx, role, account)
    }

    pub fn revoke_role(
        &mut self,
        ctx: &CallContext,
        role: Role,
        account: Address,
    ) -> Result<bool, OffchainAssetError> {
        Self::revoke_role_in(&mut self.vault, ctx, role, account)
    }

    /// Drops `role` from the caller.
    pub fn renounce_role(&mut self, ctx: &CallContext, role: Role) -> bool {
        let changed = self.vault.strategy_mut().roles.renounce(&ctx.caller, role);
        if changed {
            self.vault.emit(VaultEvent::RoleRevoked {
                role,
                account: ctx.caller,
                sender: ctx.caller,
            });
        }
        changed
    }

    // -----------------------------------------------------------------------
    // Holder operations
    // -----------------------------------------------------------------------

    pub fn transfer_shares(
        &mut self,
        ctx: &CallContext,
        to: Address,
        amount: u128,
    ) -> Result<(), OffchainAssetError> {
        Ok(self.vault.transfer_shares(ctx, to, amount)?)
    }

    pub fn approve_shares(
        &mut self,
        ctx: &CallContext,
        spender: Address,
        amount: u128,
    ) -> Result<(), OffchainAssetError> {
        Ok(self.vault.approve_shares(ctx, spender, amount)?)
    }

    pub fn transfer_shares_from(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), OffchainAssetError> {
        Ok(self.vault.transfer_shares_from(ctx, from, to, amount)?)
    }

    pub fn transfer_receipt(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        id: ReceiptId,
        amount: u128,
    ) -> Result<(), OffchainAssetError> {
        Ok(self.vault.transfer_receipt(ctx, from, to, id, amount)?)
    }

    pub fn set_receipt_approval_for_all(
        &mut self,
        ctx: &CallContext,
        operator: Address,
        approved: bool,
    ) -> Result<(), OffchainAssetError> {
        Ok(self.vault.set_receipt_approval_for_all(ctx, operator, approved)?)
    }

    pub fn receipt_information(
        &mut self,
        ctx: &CallContext,
        id: ReceiptId,
        information: &[u8],
    ) -> Result<(), OffchainAssetError> {
        Ok(self.vault.receipt_information(ctx, id, information)?)
    }

    // -----------------------------------------------------------------------
    // Batches
    // -----------------------------------------------------------------------

    /// Runs `operations` in order as one atomic step, all as `ctx.caller`.
    pub fn multicall(
        &mut self,
        ctx: &CallContext,
        operations: &[OffchainOperation],
    ) -> Result<Vec<OperationOutput>, BatchError<OffchainAssetError>> {
        self.vault.transact(|vault| {
            operations
                .iter()
                .enumerate()
                .map(|(index, operation)| {
                    Self::dispatch(vault, ctx, operation)
                        .map_err(|source| BatchError { index, source })
                })
                .collect()
        })
    }

    fn dispatch(
        vault: &mut Inner,
        ctx: &CallContext,
        operation: &OffchainOperation,
    ) -> Result<OperationOutput, OffchainAssetError> {
        let output = match operation {
            OffchainOperation::Deposit {
                assets,
                receiver,
                min_share_ratio,
                justification,
            } => OperationOutput::Shares(vault.deposit(
                ctx,
                *assets,
                *receiver,
                *min_share_ratio,
                justification,
            )?),
            OffchainOperation::Mint {
                shares,
                receiver,
                min_share_ratio,
                justification,
            } => OperationOutput::Assets(vault.mint(
                ctx,
                *shares,
                *receiver,
                *min_share_ratio,
                justification,
            )?),
            OffchainOperation::Withdraw {
                assets,
                receiver,
                owner,
                id,
                justification,
            } => OperationOutput::Shares(vault.withdraw(
                ctx,
                *assets,
                *receiver,
                *owner,
                *id,
                justification,
            )?),
            OffchainOperation::Redeem {
                shares,
                receiver,
                owner,
                id,
                justification,
            } => OperationOutput::Assets(vault.redeem(
                ctx,
                *shares,
                *receiver,
                *owner,
                *id,
                justification,
            )?),
            OffchainOperation::Redeposit {
                assets,
                receiver,
                id,
                justification,
            } => OperationOutput::Shares(vault.deposit_at(
                ctx,
                *assets,
                *receiver,
                0,
                *id,
                justification,
            )?),
            OffchainOperation::Certify {
                until,
                reference_block,
                force,
                justification,
            } => {
                Self::certify_in(vault, ctx, *until, *reference_block, *force, justification)?;
                OperationOutput::Done
            }
            OffchainOperation::ConfiscateShares {
                target,
                justification,
            } => OperationOutput::Confiscated(Self::confiscate_shares_in(
                vault,
                ctx,
                *target,
                justification,
            )?),
            OffchainOperation::ConfiscateReceipt {
                target,
                id,
                justification,
            } => OperationOutput::Confiscated(Self::confiscate_receipt_in(
                vault,
                ctx,
                *target,
                *id,
                justification,
            )?),
            OffchainOperation::Snapshot => OperationOutput::Snapshot(Self::snapshot_in(vault, ctx)?),
            OffchainOperation::GrantRole { role, account } => {
                OperationOutput::RoleChanged(Self::grant_role_in(vault, ctx, *role, *account)?)
            }
            OffchainOperation::RevokeRole { role, account } => {
                OperationOutput::RoleChanged(Self::revoke_role_in(vault, ctx, *role, *account)?)
            }
            OffchainOperation::TransferShares { to, amount } => {
                vault.transfer_shares(ctx, *to, *amount)?;
                OperationOutput::Done
            }
            OffchainOperation::TransferReceipt {
                from,
                to,
                id,
                amount,
            } => {
                vault.transfer_receipt(ctx, *from, *to, *id, *amount)?;
                OperationOutput::Done
            }
            OffchainOperation::ReceiptInformation { id, information } => {
                vault.receipt_information(ctx, *id, information)?;
                OperationOutput::Done
            }
        };
        Ok(output)
    }

    // -----------------------------------------------------------------------
    // Operation bodies, shared by the public methods and `multicall`
    // -----------------------------------------------------------------------

    fn certify_in(
        vault: &mut Inner,
        ctx: &CallContext,
        until: u64,
        reference_block: u64,
        force: bool,
        justification: &[u8],
    ) -> Result<(), OffchainAssetError> {
        vault
            .strategy()
            .roles
            .check_role(Role::Certifier, &ctx.caller)?;
        if until == 0 {
            return Err(OffchainAssetError::ZeroCertifyUntil);
        }
        if reference_block > ctx.block_number {
            return Err(OffchainAssetError::FutureReferenceBlock {
                reference_block,
                block_number: ctx.block_number,
            });
        }

        let policy = vault.strategy_mut();
        if force || until > policy.certified_until {
            policy.certified_until = until;
        }
        let certified_until = policy.certified_until;
        vault.emit(VaultEvent::Certify {
            sender: ctx.caller,
            certify_until: until,
            reference_block,
            force_until: force,
            justification: justification.to_vec(),
        });
        info!(sender = %ctx.caller, until, force, certified_until, "certified");
        Ok(())
    }

    fn confiscate_shares_in(
        vault: &mut Inner,
        ctx: &CallContext,
        target: Address,
        justification: &[u8],
    ) -> Result<u128, OffchainAssetError> {
        vault.non_reentrant(|vault| {
            vault
                .strategy()
                .roles
                .check_role(Role::Confiscator, &ctx.caller)?;

            let tier = vault.strategy().share_tier();
            let exempt = tier.is_active() && tier.permits(&target, ctx.timestamp);
            let balance = vault.balance_of(&target);
            let confiscated = if exempt || balance == 0 {
                0
            } else {
                vault.owner_transfer_shares(ctx, target, ctx.caller, balance)?;
                balance
            };

            vault.emit(VaultEvent::ConfiscateShares {
                sender: ctx.caller,
                confiscatee: target,
                confiscated,
                justification: justification.to_vec(),
            });
            info!(sender = %ctx.caller, target = %target, confiscated, "shares confiscated");
            Ok(confiscated)
        })
    }

    fn confiscate_receipt_in(
        vault: &mut Inner,
        ctx: &CallContext,
        target: Address,
        id: ReceiptId,
        justification: &[u8],
    ) -> Result<u128, OffchainAssetError> {
        vault.non_reentrant(|vault| {
            vault
                .strategy()
                .roles
                .check_role(Role::Confiscator, &ctx.caller)?;

            let tier = vault.strategy().receipt_tier();
            let exempt = tier.is_active() && tier.permits(&target, ctx.timestamp);
            let balance = vault.receipt_balance_of(&target, id);
            let confiscated = if exempt || balance == 0 {
                0
            } else {
                vault.owner_transfer_receipt(ctx, target, ctx.caller, id, balance)?;
                balance
            };

            vault.emit(VaultEvent::ConfiscateReceipt {
                sender: ctx.caller,
                confiscatee: target,
                id,
                confiscated,
                justification: justification.to_vec(),
            });
            info!(sender = %ctx.caller, target = %target, id, confiscated, "receipt confiscated");
            Ok(confiscated)
        })
    }

    fn snapshot_in(vault: &mut Inner, ctx: &CallContext) -> Result<SnapshotId, OffchainAssetError> {
        vault
            .strategy()
            .roles
            .check_role(Role::Snapshotter, &ctx.caller)?;
        let id = vault.snapshot_shares();
        info!(sender = %ctx.caller, snapshot = id, "snapshot taken");
        Ok(id)
    }

    fn grant_role_in(
        vault: &mut Inner,
        ctx: &CallContext,
        role: Role,
        account: Address,
    ) -> Result<bool, OffchainAssetError> {
        let changed = vault
            .strategy_mut()
            .roles
            .grant(&ctx.caller, role, account)?;
        if changed {
            vault.emit(VaultEvent::RoleGranted {
                role,
                account,
                sender: ctx.caller,
            });
            info!(%role, account = %account, sender = %ctx.caller, "role granted");
        }
        Ok(changed)
    }

    fn revoke_role_in(
        vault: &mut Inner,
        ctx: &CallContext,
        role: Role,
        account: Address,
    ) -> Result<bool, OffchainAssetError> {
        let changed = vault
            .strategy_mut()
            .roles
            .revoke(&ctx.caller, role, &account)?;
        if changed {
            vault.emit(VaultEvent::RoleRevoked {
                role,
                account,
                sender: ctx.caller,
            });
            info!(%role, account = %account, sender = %ctx.caller, "role revoked");
        }
        Ok(changed)
    }
}
