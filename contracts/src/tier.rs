//! # Tier Policies
//!
//! A tier policy gates one token class (shares or receipts) on membership
//! reported by an external [`TierOracle`]. It is active only when an
//! oracle is configured and the minimum tier is above zero; an inactive
//! policy permits everyone.

use std::fmt;
use std::sync::Arc;

use receipt_vault_protocol::external::TierOracle;
use receipt_vault_protocol::types::Address;

/// `(oracle, minimum_tier, context)` for one token class.
#[derive(Clone, Default)]
pub struct TierPolicy {
    pub oracle: Option<Arc<dyn TierOracle>>,
    pub minimum_tier: u32,
    /// Opaque values forwarded to the oracle with every query.
    pub context: Vec<u64>,
}

impl TierPolicy {
    pub fn new(oracle: Option<Arc<dyn TierOracle>>, minimum_tier: u32, context: Vec<u64>) -> Self {
        Self {
            oracle,
            minimum_tier,
            context,
        }
    }

    /// A policy that permits everyone.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.oracle.is_some() && self.minimum_tier > 0
    }

    /// Address of the configured oracle, if any.
    pub fn oracle_address(&self) -> Option<Address> {
        self.oracle.as_ref().map(|oracle| oracle.address())
    }

    /// Whether `account` satisfies the policy at `now`.
    pub fn permits(&self, account: &Address, now: u64) -> bool {
        match &self.oracle {
            Some(oracle) if self.minimum_tier > 0 => {
                oracle.is_compliant(account, self.minimum_tier, &self.context, now)
            }
            _ => true,
        }
    }
}

impl fmt::Debug for TierPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TierPolicy")
            .field("oracle", &self.oracle_address())
            .field("minimum_tier", &self.minimum_tier)
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use receipt_vault_protocol::external::StaticTierOracle;

    #[test]
    fn inactive_policies_permit_everyone() {
        let alice = Address::from_label("alice");
        assert!(TierPolicy::disabled().permits(&alice, 0));

        let oracle = Arc::new(StaticTierOracle::new(Address::from_label("tier")));
        let zero_minimum = TierPolicy::new(Some(oracle as Arc<dyn TierOracle>), 0, vec![]);
        assert!(!zero_minimum.is_active());
        assert!(zero_minimum.permits(&alice, 0));
    }

    #[test]
    fn active_policy_consults_report_time() {
        let alice = Address::from_label("alice");
        let oracle = Arc::new(StaticTierOracle::new(Address::from_label("tier")));
        oracle.set_report(alice, 50);
        let policy = TierPolicy::new(Some(oracle as Arc<dyn TierOracle>), 2, vec![7]);

        assert!(policy.is_active());
        assert!(!policy.permits(&alice, 49));
        assert!(policy.permits(&alice, 50));
        assert!(!policy.permits(&Address::from_label("bob"), 1_000));
        assert_eq!(policy.oracle_address(), Some(Address::from_label("tier")));
    }
}
