//! Price oracles.
//!
//! A [`PriceOracle`] answers one question: how many shares does one unit
//! of asset buy right now, as an 18-decimal ratio. Feed scaling, staleness
//! windows and the like belong to adapters outside this crate; the vault
//! only sees the final ratio or an [`OracleError`].

use parking_lot::RwLock;
use std::fmt;
use thiserror::Error;

/// Failures reported by a [`PriceOracle`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    /// No usable price is available.
    #[error("price unavailable: {0}")]
    Unavailable(String),
}

/// Source of the share ratio for oracle-priced vaults.
pub trait PriceOracle: Send + Sync + fmt::Debug {
    /// Current price as an 18-decimal fixed-point ratio.
    fn price(&self) -> Result<u128, OracleError>;
}

/// Always answers the same price.
#[derive(Debug, Clone, Copy)]
pub struct FixedPriceOracle {
    price: u128,
}

impl FixedPriceOracle {
    pub fn new(price: u128) -> Self {
        Self { price }
    }
}

impl PriceOracle for FixedPriceOracle {
    fn price(&self) -> Result<u128, OracleError> {
        Ok(self.price)
    }
}

/// A price that tests and scripts can move between operations.
///
/// Starts unavailable unless constructed with [`ManualPriceOracle::with_price`].
#[derive(Debug, Default)]
pub struct ManualPriceOracle {
    price: RwLock<Option<u128>>,
}

impl ManualPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(price: u128) -> Self {
        Self {
            price: RwLock::new(Some(price)),
        }
    }

    /// Replaces the current price.
    pub fn set_price(&self, price: u128) {
        *self.price.write() = Some(price);
    }

    /// Makes the oracle report [`OracleError::Unavailable`].
    pub fn clear(&self) {
        *self.price.write() = None;
    }
}

impl PriceOracle for ManualPriceOracle {
    fn price(&self) -> Result<u128, OracleError> {
        self.price
            .read()
            .ok_or_else(|| OracleError::Unavailable("no price set".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_oracle_moves_and_clears() {
        let oracle = ManualPriceOracle::new();
        assert!(oracle.price().is_err());
        oracle.set_price(2_000_000_000_000_000_000);
        assert_eq!(oracle.price().unwrap(), 2_000_000_000_000_000_000);
        oracle.clear();
        assert!(matches!(oracle.price(), Err(OracleError::Unavailable(_))));
    }

    #[test]
    fn fixed_oracle_is_constant() {
        let oracle = FixedPriceOracle::new(7);
        assert_eq!(oracle.price().unwrap(), 7);
        assert_eq!(oracle.price().unwrap(), 7);
    }
}
