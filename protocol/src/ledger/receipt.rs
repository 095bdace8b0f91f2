//! # Receipt Ledger
//!
//! Per-`(holder, id)` balances of the vault's receipt token. A receipt id
//! names the event that justified a mint: the share ratio it was minted at,
//! or a sequence number. Holders possess balances; the ledger owner (the
//! vault) alone may mint, burn, or force transfers.
//!
//! A non-empty justification passed to [`ReceiptLedger::mint`] or
//! [`ReceiptLedger::burn`] is emitted as a separate
//! [`VaultEvent::ReceiptInformation`] keyed by `(holder, id)`. An empty one
//! emits nothing.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{LedgerError, TransferGate};
use crate::events::{EventLog, VaultEvent};
use crate::types::{Address, ReceiptId};

/// Receipt balances owned by a vault.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReceiptLedger {
    owner: Address,
    /// holder → id → balance.
    balances: HashMap<Address, BTreeMap<ReceiptId, u128>>,
    /// id → sum of balances at that id.
    totals: BTreeMap<ReceiptId, u128>,
    /// Sum over every id.
    total: u128,
    /// holder → operators approved for all of the holder's receipts.
    approvals: HashMap<Address, BTreeSet<Address>>,
}

impl ReceiptLedger {
    /// Creates an empty ledger owned by `owner`.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            balances: HashMap::new(),
            totals: BTreeMap::new(),
            total: 0,
            approvals: HashMap::new(),
        }
    }

    /// The ledger owner.
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Balance of `holder` at `id`, or 0.
    pub fn balance_of(&self, holder: &Address, id: ReceiptId) -> u128 {
        self.balances
            .get(holder)
            .and_then(|ids| ids.get(&id))
            .copied()
            .unwrap_or(0)
    }

    /// Outstanding receipts at `id` across all holders.
    pub fn total_of(&self, id: ReceiptId) -> u128 {
        self.totals.get(&id).copied().unwrap_or(0)
    }

    /// Outstanding receipts across every id.
    pub fn total(&self) -> u128 {
        self.total
    }

    /// Nonzero `(id, balance)` pairs held by `holder`, in id order.
    pub fn receipts_of(&self, holder: &Address) -> Vec<(ReceiptId, u128)> {
        self.balances
            .get(holder)
            .map(|ids| {
                ids.iter()
                    .filter(|(_, balance)| **balance > 0)
                    .map(|(id, balance)| (*id, *balance))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids with outstanding receipts and their totals, in id order.
    pub fn outstanding(&self) -> Vec<(ReceiptId, u128)> {
        self.totals
            .iter()
            .filter(|(_, total)| **total > 0)
            .map(|(id, total)| (*id, *total))
            .collect()
    }

    /// Whether `operator` may move every receipt of `owner`.
    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.approvals
            .get(owner)
            .map(|operators| operators.contains(operator))
            .unwrap_or(false)
    }

    // -----------------------------------------------------------------------
    // Owner-gated operations
    // -----------------------------------------------------------------------

    /// Mints `amount` receipts at `id` to `holder`.
    #[allow(clippy::too_many_arguments)]
    pub fn mint(
        &mut self,
        operator: &Address,
        holder: &Address,
        id: ReceiptId,
        amount: u128,
        justification: &[u8],
        gate: &dyn TransferGate,
        log: &mut EventLog,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(operator)?;
        if holder.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.move_receipts(operator, &Address::ZERO, holder, id, amount, gate, log)?;
        Self::information(operator, holder, id, justification, log);
        Ok(())
    }

    /// Burns `amount` receipts at `id` held by `holder`.
    #[allow(clippy::too_many_arguments)]
    pub fn burn(
        &mut self,
        operator: &Address,
        holder: &Address,
        id: ReceiptId,
        amount: u128,
        justification: &[u8],
        gate: &dyn TransferGate,
        log: &mut EventLog,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(operator)?;
        if holder.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.move_receipts(operator, holder, &Address::ZERO, id, amount, gate, log)?;
        Self::information(operator, holder, id, justification, log);
        Ok(())
    }

    /// Moves receipts between holders without their consent. The gate still runs.
    #[allow(clippy::too_many_arguments)]
    pub fn owner_transfer(
        &mut self,
        operator: &Address,
        from: &Address,
        to: &Address,
        id: ReceiptId,
        amount: u128,
        gate: &dyn TransferGate,
        log: &mut EventLog,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(operator)?;
        if from.is_zero() || to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.move_receipts(operator, from, to, id, amount, gate, log)
    }

    // -----------------------------------------------------------------------
    // Holder operations
    // -----------------------------------------------------------------------

    /// Moves receipts from `from` to `to`. `operator` must be `from` or an
    /// approved operator of `from`.
    #[allow(clippy::too_many_arguments)]
    pub fn transfer(
        &mut self,
        operator: &Address,
        from: &Address,
        to: &Address,
        id: ReceiptId,
        amount: u128,
        gate: &dyn TransferGate,
        log: &mut EventLog,
    ) -> Result<(), LedgerError> {
        if from.is_zero() || to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if operator != from && !self.is_approved_for_all(from, operator) {
            return Err(LedgerError::NotApproved {
                owner: *from,
                operator: *operator,
            });
        }
        self.move_receipts(operator, from, to, id, amount, gate, log)
    }

    /// Grants or withdraws `operator`'s approval over all of `owner`'s receipts.
    pub fn set_approval_for_all(
        &mut self,
        owner: &Address,
        operator: &Address,
        approved: bool,
        log: &mut EventLog,
    ) -> Result<(), LedgerError> {
        if owner.is_zero() || operator.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        let operators = self.approvals.entry(*owner).or_default();
        if approved {
            operators.insert(*operator);
        } else {
            operators.remove(operator);
        }
        log.push(VaultEvent::ReceiptApprovalForAll {
            owner: *owner,
            operator: *operator,
            approved,
        });
        Ok(())
    }

    /// Emits an information event for `(holder, id)` unless `information` is empty.
    pub fn information(
        sender: &Address,
        holder: &Address,
        id: ReceiptId,
        information: &[u8],
        log: &mut EventLog,
    ) {
        if information.is_empty() {
            return;
        }
        log.push(VaultEvent::ReceiptInformation {
            sender: *sender,
            holder: *holder,
            id,
            information: information.to_vec(),
        });
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

    #[allow(clippy::too_many_arguments)]
    fn move_receipts(
        &mut self,
        operator: &Address,
        from: &Address,
        to: &Address,
        id: ReceiptId,
        amount: u128,
        gate: &dyn TransferGate,
        log: &mut EventLog,
    ) -> Result<(), LedgerError> {
        gate.authorize_receipt_transfer(from, to)?;

        if from.is_zero() {
            self.total.checked_add(amount).ok_or(LedgerError::Overflow)?;
        } else {
            let available = self.balance_of(from, id);
            if available < amount {
                return Err(LedgerError::InsufficientBalance {
                    holder: *from,
                    id,
                    available,
                    requested: amount,
                });
            }
        }
        if !to.is_zero() && from != to {
            self.balance_of(to, id)
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;
        }

        if from.is_zero() {
            self.total += amount;
            *self.totals.entry(id).or_insert(0) += amount;
        } else {
            *self.balances.entry(*from).or_default().entry(id).or_insert(0) -= amount;
        }
        if to.is_zero() {
            self.total -= amount;
            *self.totals.entry(id).or_insert(0) -= amount;
        } else {
            *self.balances.entry(*to).or_default().entry(id).or_insert(0) += amount;
        }

        log.push(VaultEvent::ReceiptTransfer {
            operator: *operator,
            from: *from,
            to: *to,
            id,
            amount,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::OpenGate;

    fn addr(label: &str) -> Address {
        Address::from_label(label)
    }

    fn minted(amount: u128) -> (ReceiptLedger, EventLog) {
        let mut receipts = ReceiptLedger::new(addr("vault"));
        let mut log = EventLog::new();
        receipts
            .mint(&addr("vault"), &addr("alice"), 1, amount, b"", &OpenGate, &mut log)
            .unwrap();
        (receipts, log)
    }

    #[test]
    fn mint_tracks_holder_id_and_totals() {
        let (receipts, _) = minted(1000);
        assert_eq!(receipts.balance_of(&addr("alice"), 1), 1000);
        assert_eq!(receipts.balance_of(&addr("alice"), 2), 0);
        assert_eq!(receipts.total_of(1), 1000);
        assert_eq!(receipts.total(), 1000);
        assert_eq!(receipts.receipts_of(&addr("alice")), vec![(1, 1000)]);
    }

    #[test]
    fn empty_justification_emits_only_transfer() {
        let (_, log) = minted(10);
        assert_eq!(log.len(), 1);
        assert!(matches!(log[0], VaultEvent::ReceiptTransfer { .. }));
    }

    #[test]
    fn justification_emits_information_event() {
        let mut receipts = ReceiptLedger::new(addr("vault"));
        let mut log = EventLog::new();
        receipts
            .mint(&addr("vault"), &addr("alice"), 3, 10, b"bar #41", &OpenGate, &mut log)
            .unwrap();
        assert_eq!(
            log[1],
            VaultEvent::ReceiptInformation {
                sender: addr("vault"),
                holder: addr("alice"),
                id: 3,
                information: b"bar #41".to_vec(),
            }
        );
    }

    #[test]
    fn only_owner_mints_burns_and_forces() {
        let (mut receipts, mut log) = minted(10);
        let not_owner = LedgerError::NotOwner { caller: addr("alice") };
        assert_eq!(
            receipts
                .mint(&addr("alice"), &addr("alice"), 1, 1, b"", &OpenGate, &mut log)
                .unwrap_err(),
            not_owner
        );
        assert_eq!(
            receipts
                .burn(&addr("alice"), &addr("alice"), 1, 1, b"", &OpenGate, &mut log)
                .unwrap_err(),
            not_owner
        );
        assert_eq!(
            receipts
                .owner_transfer(&addr("alice"), &addr("alice"), &addr("bob"), 1, 1, &OpenGate, &mut log)
                .unwrap_err(),
            not_owner
        );
    }

    #[test]
    fn burn_more_than_held_rejected() {
        let (mut receipts, mut log) = minted(10);
        let err = receipts
            .burn(&addr("vault"), &addr("alice"), 1, 11, b"", &OpenGate, &mut log)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                holder: addr("alice"),
                id: 1,
                available: 10,
                requested: 11,
            }
        );
    }

    #[test]
    fn holder_transfer_requires_approval() {
        let (mut receipts, mut log) = minted(10);
        let err = receipts
            .transfer(&addr("bob"), &addr("alice"), &addr("bob"), 1, 5, &OpenGate, &mut log)
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotApproved { .. }));

        receipts
            .set_approval_for_all(&addr("alice"), &addr("bob"), true, &mut log)
            .unwrap();
        receipts
            .transfer(&addr("bob"), &addr("alice"), &addr("bob"), 1, 5, &OpenGate, &mut log)
            .unwrap();
        assert_eq!(receipts.balance_of(&addr("bob"), 1), 5);
        assert_eq!(receipts.total_of(1), 10);
    }

    #[test]
    fn burn_reduces_totals() {
        let (mut receipts, mut log) = minted(10);
        receipts
            .burn(&addr("vault"), &addr("alice"), 1, 4, b"", &OpenGate, &mut log)
            .unwrap();
        assert_eq!(receipts.total_of(1), 6);
        assert_eq!(receipts.total(), 6);
        assert_eq!(receipts.outstanding(), vec![(1, 6)]);
    }
}
