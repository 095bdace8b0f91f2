//! # Accounts, Identifiers & Call Context
//!
//! The vocabulary shared by every layer of the vault: [`Address`] for
//! accounts, [`ReceiptId`] for receipt buckets, and [`CallContext`] for the
//! "who / when / at which height" that accompanies every mutating call.
//!
//! Addresses are opaque 20-byte values. For scripting and tests an address
//! can be derived deterministically from a human label with
//! [`Address::from_label`] (BLAKE3 of the label, first 20 bytes), so
//! `"alice"` is the same account in every run.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Length of an [`Address`] in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Receipt bucket identifier.
///
/// For the oracle-priced vault this is the 18-decimal share ratio at mint
/// time; for the offchain-asset vault it is a sequence number handed out by
/// the vault's highwater counter.
pub type ReceiptId = u128;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account identifier.
///
/// [`Address::ZERO`] is the void counterparty: share and receipt mints are
/// transfers *from* it, burns are transfers *to* it. It can never receive
/// shares or receipts through a vault operation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

/// Errors produced when parsing an [`Address`] from text.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The string is not valid hex.
    #[error("invalid address hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The decoded value has the wrong length.
    #[error("invalid address length: expected 20 bytes, got {0}")]
    Length(usize),
}

impl Address {
    /// The void address.
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    /// Creates an address from raw bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Derives a stable address from a human-readable label.
    pub fn from_label(label: &str) -> Self {
        let digest = blake3::hash(label.as_bytes());
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest.as_bytes()[..ADDRESS_LENGTH]);
        Self(bytes)
    }

    /// Returns `true` for the void address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LENGTH]
    }

    /// Hex encoding with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parses a hex address, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)?;
        if bytes.len() != ADDRESS_LENGTH {
            return Err(AddressError::Length(bytes.len()));
        }
        let mut arr = [0u8; ADDRESS_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}…)", &self.to_hex()[..10])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Addresses travel as hex strings so they can key JSON objects.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// CallContext
// ---------------------------------------------------------------------------

/// The execution environment of a single vault call.
///
/// The engine never reads a wall clock: `timestamp` and `block_number` are
/// supplied by the host so replays are deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Account invoking the operation.
    pub caller: Address,
    /// Host timestamp in seconds.
    pub timestamp: u64,
    /// Host block height.
    pub block_number: u64,
}

impl CallContext {
    /// Creates a context for `caller` at the given time and height.
    pub fn new(caller: Address, timestamp: u64, block_number: u64) -> Self {
        Self {
            caller,
            timestamp,
            block_number,
        }
    }

    /// Same time and height, different caller.
    pub fn with_caller(&self, caller: Address) -> Self {
        Self { caller, ..*self }
    }
}

// ---------------------------------------------------------------------------
// Serde helper: byte payloads as hex strings
// ---------------------------------------------------------------------------

/// Serializes `Vec<u8>` payloads (justifications, receipt information) as
/// hex strings instead of JSON number arrays.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Payload {
///     #[serde(with = "crate::types::hex_bytes")]
///     justification: Vec<u8>,
/// }
/// ```
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_addresses_are_stable_and_distinct() {
        let alice = Address::from_label("alice");
        assert_eq!(alice, Address::from_label("alice"));
        assert_ne!(alice, Address::from_label("bob"));
        assert!(!alice.is_zero());
    }

    #[test]
    fn hex_roundtrip_accepts_optional_prefix() {
        let addr = Address::from_label("vault");
        let hex = addr.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(Address::from_hex(&hex).unwrap(), addr);
        assert_eq!(Address::from_hex(&hex[2..]).unwrap(), addr);
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(matches!(
            Address::from_hex("0xdeadbeef"),
            Err(AddressError::Length(4))
        ));
    }

    #[test]
    fn zero_address_is_default() {
        assert!(Address::default().is_zero());
        assert_eq!(Address::ZERO, Address::default());
    }
}
