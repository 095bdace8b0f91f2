//! # Vault Events
//!
//! The notification surface consumed by off-chain observers. Every ledger
//! movement and every privileged state change appends one [`VaultEvent`] to
//! the vault's log. The log is part of the vault state: a rolled-back
//! operation leaves no events behind, and observers drain the log only after
//! an operation has completed.

use serde::Serialize;

use crate::access::Role;
use crate::types::{hex_bytes, Address, ReceiptId};

/// Append-only buffer of events produced by vault operations.
pub type EventLog = Vec<VaultEvent>;

/// A single observable vault event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VaultEvent {
    /// Share movement. `from == ZERO` is a mint, `to == ZERO` a burn.
    ShareTransfer {
        from: Address,
        to: Address,
        amount: u128,
    },

    /// Share allowance set by `owner` for `spender`.
    ShareApproval {
        owner: Address,
        spender: Address,
        amount: u128,
    },

    /// Share supply snapshot taken.
    Snapshot { id: u64, total_supply: u128 },

    /// Receipt movement at `id`.
    ReceiptTransfer {
        operator: Address,
        from: Address,
        to: Address,
        id: ReceiptId,
        amount: u128,
    },

    /// Operator approval over all of `owner`'s receipts.
    ReceiptApprovalForAll {
        owner: Address,
        operator: Address,
        approved: bool,
    },

    /// Informational payload attached to the receipt bucket `(holder, id)`.
    ReceiptInformation {
        sender: Address,
        holder: Address,
        id: ReceiptId,
        #[serde(with = "hex_bytes")]
        information: Vec<u8>,
    },

    /// Assets in, shares and receipts out.
    Deposit {
        depositor: Address,
        receiver: Address,
        assets: u128,
        shares: u128,
        id: ReceiptId,
        #[serde(with = "hex_bytes")]
        justification: Vec<u8>,
    },

    /// Shares and receipts burned, assets out.
    Withdraw {
        caller: Address,
        receiver: Address,
        owner: Address,
        assets: u128,
        shares: u128,
        id: ReceiptId,
        #[serde(with = "hex_bytes")]
        justification: Vec<u8>,
    },

    RoleGranted {
        role: Role,
        account: Address,
        sender: Address,
    },

    RoleRevoked {
        role: Role,
        account: Address,
        sender: Address,
    },

    /// Emitted for every accepted certify call, whether or not the stored
    /// window moved.
    Certify {
        sender: Address,
        certify_until: u64,
        reference_block: u64,
        force_until: bool,
        #[serde(with = "hex_bytes")]
        justification: Vec<u8>,
    },

    ConfiscateShares {
        sender: Address,
        confiscatee: Address,
        confiscated: u128,
        #[serde(with = "hex_bytes")]
        justification: Vec<u8>,
    },

    ConfiscateReceipt {
        sender: Address,
        confiscatee: Address,
        id: ReceiptId,
        confiscated: u128,
        #[serde(with = "hex_bytes")]
        justification: Vec<u8>,
    },

    /// Share tier policy replaced. `tier` is the oracle's address, if any.
    SetShareTier {
        sender: Address,
        tier: Option<Address>,
        minimum_tier: u32,
        context: Vec<u64>,
        #[serde(with = "hex_bytes")]
        justification: Vec<u8>,
    },

    /// Receipt tier policy replaced.
    SetReceiptTier {
        sender: Address,
        tier: Option<Address>,
        minimum_tier: u32,
        context: Vec<u64>,
        #[serde(with = "hex_bytes")]
        justification: Vec<u8>,
    },
}

impl VaultEvent {
    /// Short snake_case name, used for logging and metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            VaultEvent::ShareTransfer { .. } => "share_transfer",
            VaultEvent::ShareApproval { .. } => "share_approval",
            VaultEvent::Snapshot { .. } => "snapshot",
            VaultEvent::ReceiptTransfer { .. } => "receipt_transfer",
            VaultEvent::ReceiptApprovalForAll { .. } => "receipt_approval_for_all",
            VaultEvent::ReceiptInformation { .. } => "receipt_information",
            VaultEvent::Deposit { .. } => "deposit",
            VaultEvent::Withdraw { .. } => "withdraw",
            VaultEvent::RoleGranted { .. } => "role_granted",
            VaultEvent::RoleRevoked { .. } => "role_revoked",
            VaultEvent::Certify { .. } => "certify",
            VaultEvent::ConfiscateShares { .. } => "confiscate_shares",
            VaultEvent::ConfiscateReceipt { .. } => "confiscate_receipt",
            VaultEvent::SetShareTier { .. } => "set_share_tier",
            VaultEvent::SetReceiptTier { .. } => "set_receipt_tier",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_tag_and_hex_payloads() {
        let event = VaultEvent::ReceiptInformation {
            sender: Address::from_label("alice"),
            holder: Address::from_label("alice"),
            id: 7,
            information: b"audit".to_vec(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "receipt_information");
        assert_eq!(json["information"], hex::encode(b"audit"));
        assert_eq!(event.name(), "receipt_information");
    }
}
