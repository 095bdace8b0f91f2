//! # Vault Configuration & Constants
//!
//! Every fixed number the accounting core depends on lives here, next to the
//! [`VaultConfig`] a deployment is built from. Changing the fixed-point scale
//! after receipts have been issued would silently reinterpret every
//! ratio-keyed receipt id, so treat these as frozen once a vault is live.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Address;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Version string of the accounting core.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Fixed-Point Parameters
// ---------------------------------------------------------------------------

/// Decimal places of every ratio handled by the vault.
pub const FIXED_POINT_DECIMALS: u32 = 18;

/// `1.0` in 18-decimal fixed point.
pub const FIXED_POINT_ONE: u128 = 1_000_000_000_000_000_000;

/// Share ratio of the offchain-asset vault: one share per asset unit.
pub const OFFCHAIN_SHARE_RATIO: u128 = FIXED_POINT_ONE;

// ---------------------------------------------------------------------------
// Token Metadata Limits
// ---------------------------------------------------------------------------

/// Maximum share token name length in bytes.
pub const MAX_NAME_LENGTH: usize = 64;

/// Maximum share token symbol length in bytes.
pub const MAX_SYMBOL_LENGTH: usize = 16;

// ---------------------------------------------------------------------------
// VaultConfig
// ---------------------------------------------------------------------------

/// Errors raised by [`VaultConfig::validate`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The vault's own address must be a real account.
    #[error("vault address must not be the zero address")]
    ZeroVaultAddress,

    /// Empty or oversized token name.
    #[error("invalid name length {0} (1..=64 bytes)")]
    InvalidName(usize),

    /// Empty or oversized token symbol.
    #[error("invalid symbol length {0} (1..=16 bytes)")]
    InvalidSymbol(usize),
}

/// Static parameters shared by every vault variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// The vault's own account. Owns both ledgers and, for asset-backed
    /// vaults, custodies the deposited asset.
    pub address: Address,
    /// Share token name.
    pub name: String,
    /// Share token symbol.
    pub symbol: String,
}

impl VaultConfig {
    /// Builds a config for a vault living at `address`.
    pub fn new(address: Address, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
        }
    }

    /// Checks the config before a vault is constructed from it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.is_zero() {
            return Err(ConfigError::ZeroVaultAddress);
        }
        if self.name.is_empty() || self.name.len() > MAX_NAME_LENGTH {
            return Err(ConfigError::InvalidName(self.name.len()));
        }
        if self.symbol.is_empty() || self.symbol.len() > MAX_SYMBOL_LENGTH {
            return Err(ConfigError::InvalidSymbol(self.symbol.len()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_matches_decimals() {
        assert_eq!(FIXED_POINT_ONE, 10u128.pow(FIXED_POINT_DECIMALS));
    }

    #[test]
    fn valid_config_passes() {
        let config = VaultConfig::new(Address::from_label("vault"), "Gold Receipts", "gRCT");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn zero_address_rejected() {
        let config = VaultConfig::new(Address::ZERO, "Gold Receipts", "gRCT");
        assert_eq!(config.validate(), Err(ConfigError::ZeroVaultAddress));
    }

    #[test]
    fn empty_symbol_rejected() {
        let config = VaultConfig::new(Address::from_label("vault"), "Gold", "");
        assert_eq!(config.validate(), Err(ConfigError::InvalidSymbol(0)));
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = VaultConfig::new(Address::from_label("vault"), "Gold Receipts", "gRCT");
        let json = serde_json::to_string(&config).unwrap();
        let back: VaultConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
