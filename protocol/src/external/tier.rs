//! Membership tier oracles.
//!
//! A tier oracle reports, for an account, the time at which that account
//! first reached a given tier. The account is compliant when that time is
//! at or before the current timestamp; accounts that never reached the tier
//! report `u64::MAX` and therefore never comply.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

use crate::types::Address;

/// The membership oracle consulted by tier policies.
pub trait TierOracle: Send + Sync + fmt::Debug {
    /// Address identifying this oracle in events.
    fn address(&self) -> Address;

    /// Time at which `account` reached `minimum_tier`, or `u64::MAX` if never.
    fn report_time_for_tier(&self, account: &Address, minimum_tier: u32, context: &[u64]) -> u64;

    /// Whether `account` holds `minimum_tier` at `now`.
    fn is_compliant(&self, account: &Address, minimum_tier: u32, context: &[u64], now: u64) -> bool {
        self.report_time_for_tier(account, minimum_tier, context) <= now
    }
}

/// A fixed account → report-time table. Tier and context are ignored.
#[derive(Debug)]
pub struct StaticTierOracle {
    address: Address,
    reports: RwLock<HashMap<Address, u64>>,
}

impl StaticTierOracle {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            reports: RwLock::new(HashMap::new()),
        }
    }

    /// Records that `account` qualified at `report_time`.
    pub fn set_report(&self, account: Address, report_time: u64) {
        self.reports.write().insert(account, report_time);
    }

    /// Forgets `account`, which then never qualifies.
    pub fn remove(&self, account: &Address) {
        self.reports.write().remove(account);
    }
}

impl TierOracle for StaticTierOracle {
    fn address(&self) -> Address {
        self.address
    }

    fn report_time_for_tier(&self, account: &Address, _minimum_tier: u32, _context: &[u64]) -> u64 {
        self.reports.read().get(account).copied().unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_accounts_never_comply() {
        let oracle = StaticTierOracle::new(Address::from_label("tier"));
        let alice = Address::from_label("alice");
        assert!(!oracle.is_compliant(&alice, 1, &[], u64::MAX - 1));

        oracle.set_report(alice, 100);
        assert!(!oracle.is_compliant(&alice, 1, &[], 99));
        assert!(oracle.is_compliant(&alice, 1, &[], 100));

        oracle.remove(&alice);
        assert!(!oracle.is_compliant(&alice, 1, &[], 1_000));
    }
}
