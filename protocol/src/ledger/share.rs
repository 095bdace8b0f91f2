//! # Share Ledger
//!
//! Fungible share balances, total supply, spender allowances, and immutable
//! point-in-time snapshots of the whole ledger.
//!
//! Supply only changes through [`ShareLedger::mint`] and
//! [`ShareLedger::burn`], both restricted to the ledger owner. Every
//! movement (mint, burn, forced or holder transfer) first passes through the
//! vault's [`TransferGate`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{LedgerError, TransferGate};
use crate::events::{EventLog, VaultEvent};
use crate::types::Address;

/// Sequence number of a share snapshot. The first snapshot is `1`.
pub type SnapshotId = u64;

/// Frozen copy of the ledger at the moment a snapshot was taken.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ShareSnapshot {
    total_supply: u128,
    balances: HashMap<Address, u128>,
}

/// Fungible share balances owned by a vault.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShareLedger {
    /// Only this account may mint, burn, or force transfers.
    owner: Address,
    total_supply: u128,
    balances: HashMap<Address, u128>,
    /// owner → spender → remaining allowance.
    allowances: HashMap<Address, HashMap<Address, u128>>,
    snapshots: BTreeMap<SnapshotId, ShareSnapshot>,
    last_snapshot: SnapshotId,
}

impl ShareLedger {
    /// Creates an empty ledger owned by `owner`.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            snapshots: BTreeMap::new(),
            last_snapshot: 0,
        }
    }

    /// The ledger owner.
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Sum of all share balances.
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Share balance of `holder`, or 0.
    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Remaining allowance from `owner` to `spender`, or 0.
    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Holders with a nonzero balance, in address order.
    pub fn holders(&self) -> Vec<(Address, u128)> {
        let mut holders: Vec<_> = self
            .balances
            .iter()
            .filter(|(_, balance)| **balance > 0)
            .map(|(holder, balance)| (*holder, *balance))
            .collect();
        holders.sort();
        holders
    }

    // -----------------------------------------------------------------------
    // Owner-gated supply changes
    // -----------------------------------------------------------------------

    /// Creates `amount` shares for `to`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotOwner`] if `operator` is not the owner,
    /// [`LedgerError::Unauthorized`] if the gate denies `ZERO → to`,
    /// [`LedgerError::Overflow`] if supply or balance would overflow.
    pub fn mint(
        &mut self,
        operator: &Address,
        to: &Address,
        amount: u128,
        gate: &dyn TransferGate,
        log: &mut EventLog,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(operator)?;
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.move_shares(&Address::ZERO, to, amount, gate, log)
    }

    /// Destroys `amount` shares held by `from`.
    pub fn burn(
        &mut self,
        operator: &Address,
        from: &Address,
        amount: u128,
        gate: &dyn TransferGate,
        log: &mut EventLog,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(operator)?;
        if from.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.move_shares(from, &Address::ZERO, amount, gate, log)
    }

    /// Moves shares between holders without their consent. The gate still runs.
    pub fn owner_transfer(
        &mut self,
        operator: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
        gate: &dyn TransferGate,
        log: &mut EventLog,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(operator)?;
        self.transfer(from, to, amount, gate, log)
    }

    // -----------------------------------------------------------------------
    // Holder operations
    // -----------------------------------------------------------------------

    /// Moves `amount` shares from `from` to `to`.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
        gate: &dyn TransferGate,
        log: &mut EventLog,
    ) -> Result<(), LedgerError> {
        if from.is_zero() || to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.move_shares(from, to, amount, gate, log)
    }

    /// Sets the allowance `owner` grants to `spender`, replacing any previous value.
    pub fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: u128,
        log: &mut EventLog,
    ) -> Result<(), LedgerError> {
        if owner.is_zero() || spender.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
        log.push(VaultEvent::ShareApproval {
            owner: *owner,
            spender: *spender,
            amount,
        });
        Ok(())
    }

    /// Deducts `amount` from the allowance `owner` granted to `spender`.
    ///
    /// An allowance of `u128::MAX` is treated as unlimited and never decreases.
    pub fn spend_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(owner, spender);
        if allowance == u128::MAX {
            return Ok(());
        }
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: *owner,
                spender: *spender,
                allowance,
                requested: amount,
            });
        }
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, allowance - amount);
        Ok(())
    }

    /// Moves shares on behalf of `from`, spending `spender`'s allowance.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
        gate: &dyn TransferGate,
        log: &mut EventLog,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: *from,
                spender: *spender,
                allowance,
                requested: amount,
            });
        }
        self.transfer(from, to, amount, gate, log)?;
        self.spend_allowance(from, spender, amount)
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Freezes the current supply and balances under a new snapshot id.
    pub fn snapshot(&mut self, log: &mut EventLog) -> SnapshotId {
        self.last_snapshot += 1;
        let id = self.last_snapshot;
        self.snapshots.insert(
            id,
            ShareSnapshot {
                total_supply: self.total_supply,
                balances: self.balances.clone(),
            },
        );
        log.push(VaultEvent::Snapshot {
            id,
            total_supply: self.total_supply,
        });
        id
    }

    /// Id of the most recent snapshot, or 0 if none was taken.
    pub fn last_snapshot_id(&self) -> SnapshotId {
        self.last_snapshot
    }

    /// Copy of the live balances and allowances. The snapshot history stays
    /// behind; only the id counter is carried so [`Self::rollback`] knows
    /// where to cut.
    pub(crate) fn checkpoint(&self) -> Self {
        Self {
            owner: self.owner,
            total_supply: self.total_supply,
            balances: self.balances.clone(),
            allowances: self.allowances.clone(),
            snapshots: BTreeMap::new(),
            last_snapshot: self.last_snapshot,
        }
    }

    /// Reinstates the state captured by [`Self::checkpoint`] and discards
    /// every snapshot taken since.
    pub(crate) fn rollback(&mut self, saved: Self) {
        let mut snapshots = std::mem::take(&mut self.snapshots);
        snapshots.retain(|id, _| *id <= saved.last_snapshot);
        *self = Self { snapshots, ..saved };
    }

    /// Total supply recorded by snapshot `id`.
    pub fn total_supply_at(&self, id: SnapshotId) -> Result<u128, LedgerError> {
        self.snapshots
            .get(&id)
            .map(|snapshot| snapshot.total_supply)
            .ok_or(LedgerError::UnknownSnapshot(id))
    }

    /// Balance of `holder` recorded by snapshot `id`.
    pub fn balance_of_at(&self, holder: &Address, id: SnapshotId) -> Result<u128, LedgerError> {
        self.snapshots
            .get(&id)
            .map(|snapshot| snapshot.balances.get(holder).copied().unwrap_or(0))
            .ok_or(LedgerError::UnknownSnapshot(id))
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn ensure_owner(&self, operator: &Address) -> Result<(), LedgerError> {
        if *operator != self.owner {
            return Err(LedgerError::NotOwner { caller: *operator });
        }
        Ok(())
    }

    /// Validates everything first, then applies. No partial movement is
    /// ever visible.
    fn move_shares(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
        gate: &dyn TransferGate,
        log: &mut EventLog,
    ) -> Result<(), LedgerError> {
        gate.authorize_share_transfer(from, to)?;

        if from.is_zero() {
            self.total_supply
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;
        } else {
            let available = self.balance_of(from);
            if available < amount {
                return Err(LedgerError::InsufficientShares {
                    holder: *from,
                    available,
                    requested: amount,
                });
            }
        }
        if !to.is_zero() && from != to {
            self.balance_of(to)
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;
        }

        if from.is_zero() {
            self.total_supply += amount;
        } else {
            *self.balances.entry(*from).or_insert(0) -= amount;
        }
        if to.is_zero() {
            // Supply always covers every individual balance.
            self.total_supply -= amount;
        } else {
            *self.balances.entry(*to).or_insert(0) += amount;
        }

        log.push(VaultEvent::ShareTransfer {
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AuthorizationError;
    use crate::ledger::OpenGate;

    fn addr(label: &str) -> Address {
        Address::from_label(label)
    }

    fn ledger() -> ShareLedger {
        ShareLedger::new(addr("vault"))
    }

    struct DenyAll;

    impl TransferGate for DenyAll {
        fn authorize_share_transfer(
            &self,
            from: &Address,
            _: &Address,
        ) -> Result<(), AuthorizationError> {
            Err(AuthorizationError::NotDepositor(*from))
        }

        fn authorize_receipt_transfer(
            &self,
            _: &Address,
            _: &Address,
        ) -> Result<(), AuthorizationError> {
            Ok(())
        }
    }

    #[test]
    fn mint_increases_supply_and_balance() {
        let mut shares = ledger();
        let mut log = EventLog::new();
        shares
            .mint(&addr("vault"), &addr("alice"), 500, &OpenGate, &mut log)
            .unwrap();
        assert_eq!(shares.total_supply(), 500);
        assert_eq!(shares.balance_of(&addr("alice")), 500);
        assert_eq!(
            log,
            vec![VaultEvent::ShareTransfer {
                from: Address::ZERO,
                to: addr("alice"),
                amount: 500,
            }]
        );
    }

    #[test]
    fn non_owner_cannot_mint_or_burn() {
        let mut shares = ledger();
        let mut log = EventLog::new();
        let err = shares
            .mint(&addr("alice"), &addr("alice"), 1, &OpenGate, &mut log)
            .unwrap_err();
        assert_eq!(err, LedgerError::NotOwner { caller: addr("alice") });
        assert!(shares
            .burn(&addr("alice"), &addr("alice"), 1, &OpenGate, &mut log)
            .is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn burn_more_than_balance_rejected() {
        let mut shares = ledger();
        let mut log = EventLog::new();
        shares
            .mint(&addr("vault"), &addr("alice"), 100, &OpenGate, &mut log)
            .unwrap();
        let err = shares
            .burn(&addr("vault"), &addr("alice"), 101, &OpenGate, &mut log)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientShares { available: 100, .. }));
        assert_eq!(shares.total_supply(), 100);
    }

    #[test]
    fn gate_denial_leaves_ledger_untouched() {
        let mut shares = ledger();
        let mut log = EventLog::new();
        let err = shares
            .mint(&addr("vault"), &addr("alice"), 100, &DenyAll, &mut log)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized(_)));
        assert_eq!(shares.total_supply(), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let mut shares = ledger();
        let mut log = EventLog::new();
        shares
            .mint(&addr("vault"), &addr("alice"), 100, &OpenGate, &mut log)
            .unwrap();
        shares
            .approve(&addr("alice"), &addr("bob"), 60, &mut log)
            .unwrap();
        shares
            .transfer_from(&addr("bob"), &addr("alice"), &addr("carol"), 40, &OpenGate, &mut log)
            .unwrap();
        assert_eq!(shares.allowance(&addr("alice"), &addr("bob")), 20);
        assert_eq!(shares.balance_of(&addr("carol")), 40);

        let err = shares
            .transfer_from(&addr("bob"), &addr("alice"), &addr("carol"), 21, &OpenGate, &mut log)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { allowance: 20, .. }));
    }

    #[test]
    fn self_transfer_keeps_balance() {
        let mut shares = ledger();
        let mut log = EventLog::new();
        shares
            .mint(&addr("vault"), &addr("alice"), 10, &OpenGate, &mut log)
            .unwrap();
        shares
            .transfer(&addr("alice"), &addr("alice"), 10, &OpenGate, &mut log)
            .unwrap();
        assert_eq!(shares.balance_of(&addr("alice")), 10);
    }

    #[test]
    fn snapshots_are_immutable_and_sequential() {
        let mut shares = ledger();
        let mut log = EventLog::new();
        shares
            .mint(&addr("vault"), &addr("alice"), 100, &OpenGate, &mut log)
            .unwrap();
        let first = shares.snapshot(&mut log);
        shares
            .mint(&addr("vault"), &addr("bob"), 50, &OpenGate, &mut log)
            .unwrap();
        let second = shares.snapshot(&mut log);

        assert_eq!((first, second), (1, 2));
        assert_eq!(shares.total_supply_at(first).unwrap(), 100);
        assert_eq!(shares.balance_of_at(&addr("bob"), first).unwrap(), 0);
        assert_eq!(shares.total_supply_at(second).unwrap(), 150);
        assert_eq!(shares.total_supply_at(3), Err(LedgerError::UnknownSnapshot(3)));
    }

    #[test]
    fn rollback_keeps_history_up_to_the_checkpoint() {
        let mut shares = ledger();
        let mut log = EventLog::new();
        shares
            .mint(&addr("vault"), &addr("alice"), 100, &OpenGate, &mut log)
            .unwrap();
        let kept = shares.snapshot(&mut log);

        let saved = shares.checkpoint();
        shares
            .mint(&addr("vault"), &addr("bob"), 50, &OpenGate, &mut log)
            .unwrap();
        let dropped = shares.snapshot(&mut log);
        shares.rollback(saved);

        assert_eq!(shares.last_snapshot_id(), kept);
        assert_eq!(shares.total_supply(), 100);
        assert_eq!(shares.total_supply_at(kept).unwrap(), 100);
        assert_eq!(
            shares.total_supply_at(dropped),
            Err(LedgerError::UnknownSnapshot(dropped))
        );
        assert_eq!(shares.snapshot(&mut log), dropped);
        assert_eq!(shares.balance_of_at(&addr("bob"), dropped).unwrap(), 0);
    }

    #[test]
    fn mint_overflow_rejected() {
        let mut shares = ledger();
        let mut log = EventLog::new();
        shares
            .mint(&addr("vault"), &addr("alice"), u128::MAX, &OpenGate, &mut log)
            .unwrap();
        let err = shares
            .mint(&addr("vault"), &addr("bob"), 1, &OpenGate, &mut log)
            .unwrap_err();
        assert_eq!(err, LedgerError::Overflow);
    }
}
