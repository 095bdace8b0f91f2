//! # Oracle Vault
//!
//! A receipt vault over a real on-ledger asset, priced by a
//! [`PriceOracle`]. The oracle's answer is the share ratio, and the ratio
//! is the receipt id: every receipt remembers the price its shares were
//! minted at, and redeeming it later returns assets at that same price.
//!
//! ```text
//!   price 1.5 ──► deposit 100 assets ──► 150 shares + 150 receipts @ id 1.5e18
//!   price 3.0 ──► redeem 150 receipts @ id 1.5e18 ──► 100 assets
//! ```
//!
//! There are no roles: anyone may deposit, and holders of matching shares
//! and receipts may withdraw.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use receipt_vault_protocol::config::VaultConfig;
use receipt_vault_protocol::events::VaultEvent;
use receipt_vault_protocol::external::{Asset, PriceOracle};
use receipt_vault_protocol::types::{hex_bytes, Address, CallContext, ReceiptId};
use receipt_vault_protocol::vault::{IdAllocation, ReceiptVault, VaultError, VaultStrategy};

use crate::batch::{BatchError, OperationOutput};

/// Errors raised by the oracle vault.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleVaultError {
    /// Construction without an asset to custody.
    #[error("oracle vault requires an asset")]
    MissingAsset,

    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// Prices deposits with one oracle read; withdrawals use the id as ratio.
#[derive(Debug, Clone)]
pub struct OraclePricing {
    oracle: Arc<dyn PriceOracle>,
}

impl OraclePricing {
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        Self { oracle }
    }
}

impl VaultStrategy for OraclePricing {
    fn id_allocation(&self) -> IdAllocation {
        IdAllocation::ShareRatio
    }

    fn deposit_ratio(&self, _ctx: &CallContext) -> Result<u128, VaultError> {
        Ok(self.oracle.price()?)
    }

    fn withdraw_ratio(&self, _ctx: &CallContext, id: ReceiptId) -> Result<u128, VaultError> {
        Ok(id)
    }
}

/// One step of an oracle vault batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleOperation {
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

type Inner = ReceiptVault<OraclePricing>;

/// Oracle-priced receipt vault over an on-ledger asset.
#[derive(Debug)]
pub struct OracleVault {
    vault: Inner,
}

impl OracleVault {
    pub fn new(
        config: VaultConfig,
        asset: Option<Arc<dyn Asset>>,
        oracle: Arc<dyn PriceOracle>,
    ) -> Result<Self, OracleVaultError> {
        let asset = asset.ok_or(OracleVaultError::MissingAsset)?;
        let vault = ReceiptVault::new(config, Some(asset), OraclePricing::new(oracle))?;
        info!(vault = %vault.address(), "oracle vault initialized");
        Ok(Self { vault })
    }

    /// Read access to the underlying vault: balances, previews, limits.
    pub fn vault(&self) -> &Inner {
        &self.vault
    }

    pub fn drain_events(&mut self) -> Vec<VaultEvent> {
        self.vault.drain_events()
    }

    pub fn deposit(
        &mut self,
        ctx: &CallContext,
        assets: u128,
        receiver: Address,
        min_share_ratio: u128,
        justification: &[u8],
    ) -> Result<u128, OracleVaultError> {
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
    ) -> Result<u128, OracleVaultError> {
        Ok(self
            .vault
            .mint(ctx, shares, receiver, min_share_ratio, justification)?)
    }

    pub fn withdraw(
        &mut self,
        ctx: &CallContext,
        assets: u128,
        receiver: Address,
        owner: Address,
        id: ReceiptId,
        justification: &[u8],
    ) -> Result<u128, OracleVaultError> {
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
    ) -> Result<u128, OracleVaultError> {
        Ok(self
            .vault
            .redeem(ctx, shares, receiver, owner, id, justification)?)
    }

    pub fn transfer_shares(
        &mut self,
        ctx: &CallContext,
        to: Address,
        amount: u128,
    ) -> Result<(), OracleVaultError> {
        Ok(self.vault.transfer_shares(ctx, to, amount)?)
    }

    pub fn approve_shares(
        &mut self,
        ctx: &CallContext,
        spender: Address,
        amount: u128,
    ) -> Result<(), OracleVaultError> {
        Ok(self.vault.approve_shares(ctx, spender, amount)?)
    }

    pub fn transfer_shares_from(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), OracleVaultError> {
        Ok(self.vault.transfer_shares_from(ctx, from, to, amount)?)
    }

    pub fn transfer_receipt(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        id: ReceiptId,
        amount: u128,
    ) -> Result<(), OracleVaultError> {
        Ok(self.vault.transfer_receipt(ctx, from, to, id, amount)?)
    }

    pub fn set_receipt_approval_for_all(
        &mut self,
        ctx: &CallContext,
        operator: Address,
        approved: bool,
    ) -> Result<(), OracleVaultError> {
        Ok(self.vault.set_receipt_approval_for_all(ctx, operator, approved)?)
    }

    pub fn receipt_information(
        &mut self,
        ctx: &CallContext,
        id: ReceiptId,
        information: &[u8],
    ) -> Result<(), OracleVaultError> {
        Ok(self.vault.receipt_information(ctx, id, information)?)
    }

    /// Runs `operations` in order as one atomic step, all as `ctx.caller`.
    /// Each deposit or mint reads the oracle once.
    pub fn multicall(
        &mut self,
        ctx: &CallContext,
        operations: &[OracleOperation],
    ) -> Result<Vec<OperationOutput>, BatchError<OracleVaultError>> {
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
        operation: &OracleOperation,
    ) -> Result<OperationOutput, OracleVaultError> {
        let output = match operation {
            OracleOperation::Deposit {
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
            OracleOperation::Mint {
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
            OracleOperation::Withdraw {
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
            OracleOperation::Redeem {
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
            OracleOperation::TransferShares { to, amount } => {
                vault.transfer_shares(ctx, *to, *amount)?;
                OperationOutput::Done
            }
            OracleOperation::TransferReceipt {
                from,
                to,
                id,
                amount,
            } => {
                vault.transfer_receipt(ctx, *from, *to, *id, *amount)?;
                OperationOutput::Done
            }
            OracleOperation::ReceiptInformation { id, information } => {
                vault.receipt_information(ctx, *id, information)?;
                OperationOutput::Done
            }
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use receipt_vault_protocol::config::FIXED_POINT_ONE;
    use receipt_vault_protocol::external::{InMemoryAsset, ManualPriceOracle, OracleError};

    fn addr(label: &str) -> Address {
        Address::from_label(label)
    }

    fn setup() -> (OracleVault, Arc<InMemoryAsset>, Arc<ManualPriceOracle>) {
        let asset = Arc::new(InMemoryAsset::new(addr("vault")));
        asset.credit(&addr("alice"), 10_000).unwrap();
        let oracle = Arc::new(ManualPriceOracle::with_price(FIXED_POINT_ONE));
        let vault = OracleVault::new(
            VaultConfig::new(addr("vault"), "Oracle Vault", "OV"),
            Some(asset.clone() as Arc<dyn Asset>),
            oracle.clone() as Arc<dyn PriceOracle>,
        )
        .unwrap();
        (vault, asset, oracle)
    }

    #[test]
    fn construction_requires_asset() {
        let err = OracleVault::new(
            VaultConfig::new(addr("vault"), "Oracle Vault", "OV"),
            None,
            Arc::new(ManualPriceOracle::new()),
        )
        .unwrap_err();
        assert_eq!(err, OracleVaultError::MissingAsset);
    }

    #[test]
    fn receipts_remember_their_mint_price() {
        let (mut vault, asset, oracle) = setup();
        let alice = CallContext::new(addr("alice"), 0, 0);

        oracle.set_price(3 * FIXED_POINT_ONE / 2);
        let shares = vault.deposit(&alice, 100, addr("alice"), 0, b"").unwrap();
        assert_eq!(shares, 150);
        let id = 3 * FIXED_POINT_ONE / 2;
        assert_eq!(vault.vault().receipt_balance_of(&addr("alice"), id), 150);

        oracle.set_price(3 * FIXED_POINT_ONE);
        let assets = vault
            .redeem(&alice, 150, addr("alice"), addr("alice"), id, b"")
            .unwrap();
        assert_eq!(assets, 100);
        assert_eq!(asset.balance_of(&addr("alice")), 10_000);
    }

    #[test]
    fn unavailable_price_fails_deposit_cleanly() {
        let (mut vault, asset, oracle) = setup();
        oracle.clear();
        let err = vault
            .deposit(&CallContext::new(addr("alice"), 0, 0), 100, addr("alice"), 0, b"")
            .unwrap_err();
        assert!(matches!(
            err,
            OracleVaultError::Vault(VaultError::Oracle(OracleError::Unavailable(_)))
        ));
        assert_eq!(asset.balance_of(&addr("vault")), 0);
    }

    #[test]
    fn min_share_ratio_protects_depositor() {
        let (mut vault, _, oracle) = setup();
        oracle.set_price(FIXED_POINT_ONE / 2);
        let err = vault
            .deposit(
                &CallContext::new(addr("alice"), 0, 0),
                100,
                addr("alice"),
                FIXED_POINT_ONE,
                b"",
            )
            .unwrap_err();
        assert_eq!(
            err,
            OracleVaultError::Vault(VaultError::MinShareRatio {
                minimum: FIXED_POINT_ONE,
                actual: FIXED_POINT_ONE / 2,
            })
        );
    }

    #[test]
    fn total_assets_is_custodied_balance() {
        let (mut vault, _, _) = setup();
        vault
            .deposit(&CallContext::new(addr("alice"), 0, 0), 400, addr("alice"), 0, b"")
            .unwrap();
        assert_eq!(vault.vault().total_assets(), 400);
    }
}
