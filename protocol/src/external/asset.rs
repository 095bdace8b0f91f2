//! Fungible asset custody.
//!
//! The vault never holds asset balances itself: it asks its [`Asset`] to
//! pull from a depositor and to push to a receiver. Both movements are
//! journaled by the vault so a failed operation can hand the assets back.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::types::Address;

/// Failures reported by an [`Asset`] implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
    /// `account` cannot cover the movement.
    #[error("insufficient asset balance for {account}: available {available}, requested {requested}")]
    InsufficientBalance {
        account: Address,
        available: u128,
        requested: u128,
    },

    /// A balance would exceed `u128::MAX`.
    #[error("asset balance overflow")]
    Overflow,

    /// The asset refused the movement for its own reasons.
    #[error("asset transfer rejected: {0}")]
    Rejected(String),
}

/// The custodied token, seen from the vault.
pub trait Asset: Send + Sync + fmt::Debug {
    /// Moves `amount` from `from` into the vault's custody.
    fn transfer_in(&self, from: &Address, amount: u128) -> Result<(), AssetError>;

    /// Moves `amount` out of the vault's custody to `to`.
    fn transfer_out(&self, to: &Address, amount: u128) -> Result<(), AssetError>;

    /// Balance of `account`.
    fn balance_of(&self, account: &Address) -> u128;

    /// Total asset supply.
    fn total_supply(&self) -> u128;
}

// ---------------------------------------------------------------------------
// InMemoryAsset
// ---------------------------------------------------------------------------

/// A mutex-guarded balance map with a fixed custodian account.
///
/// `transfer_in` debits the sender and credits the custodian;
/// `transfer_out` does the reverse.
#[derive(Debug)]
pub struct InMemoryAsset {
    custodian: Address,
    balances: Mutex<HashMap<Address, u128>>,
}

impl InMemoryAsset {
    /// Creates an empty asset whose custody account is `custodian`.
    pub fn new(custodian: Address) -> Self {
        Self {
            custodian,
            balances: Mutex::new(HashMap::new()),
        }
    }

    /// The account holding custodied assets.
    pub fn custodian(&self) -> &Address {
        &self.custodian
    }

    /// Mints `amount` to `account` out of thin air. Seeding only.
    pub fn credit(&self, account: &Address, amount: u128) -> Result<(), AssetError> {
        let mut balances = self.balances.lock();
        let balance = balances.entry(*account).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(AssetError::Overflow)?;
        Ok(())
    }

    fn move_balance(&self, from: &Address, to: &Address, amount: u128) -> Result<(), AssetError> {
        let mut balances = self.balances.lock();
        let available = balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                account: *from,
                available,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = balances
            .get(to)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        balances.insert(*from, available - amount);
        balances.insert(*to, credited);
        Ok(())
    }
}

impl Asset for InMemoryAsset {
    fn transfer_in(&self, from: &Address, amount: u128) -> Result<(), AssetError> {
        self.move_balance(from, &self.custodian, amount)
    }

    fn transfer_out(&self, to: &Address, amount: u128) -> Result<(), AssetError> {
        self.move_balance(&self.custodian, to, amount)
    }

    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.lock().get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> u128 {
        self.balances.lock().values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_in_and_out_go_through_custodian() {
        let vault = Address::from_label("vault");
        let alice = Address::from_label("alice");
        let asset = InMemoryAsset::new(vault);
        asset.credit(&alice, 100).unwrap();

        asset.transfer_in(&alice, 60).unwrap();
        assert_eq!(asset.balance_of(&alice), 40);
        assert_eq!(asset.balance_of(&vault), 60);

        asset.transfer_out(&alice, 10).unwrap();
        assert_eq!(asset.balance_of(&alice), 50);
        assert_eq!(asset.total_supply(), 100);
    }

    #[test]
    fn overdraw_is_rejected_without_side_effects() {
        let vault = Address::from_label("vault");
        let alice = Address::from_label("alice");
        let asset = InMemoryAsset::new(vault);
        asset.credit(&alice, 5).unwrap();

        let err = asset.transfer_in(&alice, 6).unwrap_err();
        assert_eq!(
            err,
            AssetError::InsufficientBalance {
                account: alice,
                available: 5,
                requested: 6,
            }
        );
        assert_eq!(asset.balance_of(&alice), 5);
        assert_eq!(asset.balance_of(&vault), 0);
    }
}
