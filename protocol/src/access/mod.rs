//! # Access Control
//!
//! Capability roles and the authorization failures every gated path in the
//! vault reports. Each failure names the offending account so off-chain
//! tooling can diagnose a rejection without replaying the call.

pub mod roles;

pub use roles::{Role, RoleRegistry};

use thiserror::Error;

use crate::types::{Address, ReceiptId};

/// Authorization failures: missing capability, tier non-compliance,
/// certification expiry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    /// `account` lacks `role`.
    #[error("account {account} is missing role {role}")]
    MissingRole {
        /// Required role.
        role: Role,
        /// Account that attempted the operation.
        account: Address,
    },

    /// Deposit or mint attempted by an account without the Depositor role.
    #[error("account {0} is not a depositor")]
    NotDepositor(Address),

    /// Withdrawal from shares whose owner lacks the Withdrawer role.
    #[error("account {0} is not a withdrawer")]
    NotWithdrawer(Address),

    /// Redeposit into a receipt id the caller does not hold.
    #[error("account {account} holds no receipt balance at id {id}")]
    ReceiptNotHeld {
        /// The caller.
        account: Address,
        /// The receipt id targeted by the redeposit.
        id: ReceiptId,
    },

    /// Ordinary transfer attempted after the certification window closed.
    #[error("certification expired at {certified_until} (now {timestamp}): {from} -> {to}")]
    CertificationExpired {
        /// Sender of the rejected transfer.
        from: Address,
        /// Recipient of the rejected transfer.
        to: Address,
        /// End of the certification window.
        certified_until: u64,
        /// Time of the attempt.
        timestamp: u64,
    },

    /// The sender does not meet the configured tier.
    #[error("sender {account} does not meet minimum tier {minimum_tier}")]
    SenderTierTooLow {
        /// The sender.
        account: Address,
        /// Tier the policy requires.
        minimum_tier: u32,
    },

    /// The recipient does not meet the configured tier.
    #[error("recipient {account} does not meet minimum tier {minimum_tier}")]
    RecipientTierTooLow {
        /// The recipient.
        account: Address,
        /// Tier the policy requires.
        minimum_tier: u32,
    },
}
