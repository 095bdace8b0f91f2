//! # Role Registry
//!
//! A plain two-map structure: role → holders, and role → the role that
//! administers it. Every capability role is administered by its paired
//! admin role, and every admin role administers itself, so only the holders
//! seeded at construction can start delegating.
//!
//! ```text
//!   DepositorAdmin ──administers──► Depositor
//!        ▲    │
//!        └────┘ (self-administering)
//! ```
//!
//! Nothing stops the last holder of an admin role from revoking or
//! renouncing it. Doing so freezes that branch of the hierarchy for good;
//! that is an operational hazard, not something the registry prevents.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::AuthorizationError;
use crate::types::Address;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Capability roles recognised by the vaults, each paired with an admin role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May deposit and mint.
    Depositor,
    DepositorAdmin,
    /// Owners holding this role may withdraw and redeem.
    Withdrawer,
    WithdrawerAdmin,
    /// May extend (or force) the certification window.
    Certifier,
    CertifierAdmin,
    /// Transfers to or from a handler bypass every transfer restriction.
    Handler,
    HandlerAdmin,
    /// May replace the share tier policy.
    ShareTierer,
    ShareTiererAdmin,
    /// May replace the receipt tier policy.
    ReceiptTierer,
    ReceiptTiererAdmin,
    /// May confiscate non-compliant balances.
    Confiscator,
    ConfiscatorAdmin,
    /// May take share supply snapshots.
    Snapshotter,
    SnapshotterAdmin,
}

impl Role {
    /// All capability roles, in declaration order.
    pub const CAPABILITIES: [Role; 8] = [
        Role::Depositor,
        Role::Withdrawer,
        Role::Certifier,
        Role::Handler,
        Role::ShareTierer,
        Role::ReceiptTierer,
        Role::Confiscator,
        Role::Snapshotter,
    ];

    /// The admin role paired with this role. Admin roles map to themselves.
    pub fn default_admin(self) -> Role {
        match self {
            Role::Depositor | Role::DepositorAdmin => Role::DepositorAdmin,
            Role::Withdrawer | Role::WithdrawerAdmin => Role::WithdrawerAdmin,
            Role::Certifier | Role::CertifierAdmin => Role::CertifierAdmin,
            Role::Handler | Role::HandlerAdmin => Role::HandlerAdmin,
            Role::ShareTierer | Role::ShareTiererAdmin => Role::ShareTiererAdmin,
            Role::ReceiptTierer | Role::ReceiptTiererAdmin => Role::ReceiptTiererAdmin,
            Role::Confiscator | Role::ConfiscatorAdmin => Role::ConfiscatorAdmin,
            Role::Snapshotter | Role::SnapshotterAdmin => Role::SnapshotterAdmin,
        }
    }

    /// Returns `true` for the `*Admin` roles.
    pub fn is_admin(self) -> bool {
        self.default_admin() == self
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Depositor => "Depositor",
            Role::DepositorAdmin => "DepositorAdmin",
            Role::Withdrawer => "Withdrawer",
            Role::WithdrawerAdmin => "WithdrawerAdmin",
            Role::Certifier => "Certifier",
            Role::CertifierAdmin => "CertifierAdmin",
            Role::Handler => "Handler",
            Role::HandlerAdmin => "HandlerAdmin",
            Role::ShareTierer => "ShareTierer",
            Role::ShareTiererAdmin => "ShareTiererAdmin",
            Role::ReceiptTierer => "ReceiptTierer",
            Role::ReceiptTiererAdmin => "ReceiptTiererAdmin",
            Role::Confiscator => "Confiscator",
            Role::ConfiscatorAdmin => "ConfiscatorAdmin",
            Role::Snapshotter => "Snapshotter",
            Role::SnapshotterAdmin => "SnapshotterAdmin",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// RoleRegistry
// ---------------------------------------------------------------------------

/// Role membership plus the admin-of-admin edges.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoleRegistry {
    /// Holders of each role.
    members: HashMap<Role, BTreeSet<Address>>,
    /// Role → the role whose holders may grant and revoke it.
    admins: HashMap<Role, Role>,
}

impl RoleRegistry {
    /// Creates a registry with the default admin edges and every admin
    /// role granted to `admin`.
    pub fn new(admin: Address) -> Self {
        let mut registry = Self::default();
        for role in Role::CAPABILITIES {
            let admin_role = role.default_admin();
            registry.admins.insert(role, admin_role);
            registry.admins.insert(admin_role, admin_role);
            registry.members.entry(admin_role).or_default().insert(admin);
        }
        registry
    }

    /// Returns whether `account` holds `role`.
    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.members
            .get(&role)
            .map(|holders| holders.contains(account))
            .unwrap_or(false)
    }

    /// The role that administers `role`.
    pub fn admin_of(&self, role: Role) -> Role {
        self.admins
            .get(&role)
            .copied()
            .unwrap_or_else(|| role.default_admin())
    }

    /// Current holders of `role`, in address order.
    pub fn members(&self, role: Role) -> Vec<Address> {
        self.members
            .get(&role)
            .map(|holders| holders.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Fails with [`AuthorizationError::MissingRole`] unless `account` holds `role`.
    pub fn check_role(&self, role: Role, account: &Address) -> Result<(), AuthorizationError> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(AuthorizationError::MissingRole {
                role,
                account: *account,
            })
        }
    }

    /// Grants `role` to `account`. `caller` must hold the role's admin.
    ///
    /// Returns `true` if membership changed; granting a held role is a no-op.
    pub fn grant(
        &mut self,
        caller: &Address,
        role: Role,
        account: Address,
    ) -> Result<bool, AuthorizationError> {
        self.check_role(self.admin_of(role), caller)?;
        Ok(self.members.entry(role).or_default().insert(account))
    }

    /// Revokes `role` from `account`. `caller` must hold the role's admin.
    ///
    /// Returns `true` if membership changed.
    pub fn revoke(
        &mut self,
        caller: &Address,
        role: Role,
        account: &Address,
    ) -> Result<bool, AuthorizationError> {
        self.check_role(self.admin_of(role), caller)?;
        Ok(self.remove(role, account))
    }

    /// Drops `role` from the caller's own account. Needs no admin.
    pub fn renounce(&mut self, caller: &Address, role: Role) -> bool {
        self.remove(role, caller)
    }

    fn remove(&mut self, role: Role, account: &Address) -> bool {
        self.members
            .get_mut(&role)
            .map(|holders| holders.remove(account))
            .unwrap_or(false)
    }
}
