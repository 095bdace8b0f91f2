//! # External Collaborators
//!
//! The vault engine talks to three things it does not own:
//!
//! ```text
//! asset.rs   — the fungible asset being custodied (pull on deposit, push on withdraw)
//! oracle.rs  — the price oracle that sets the share ratio of the oracle vault
//! tier.rs    — the membership/tier oracle consulted by transfer policies
//! ```
//!
//! Each is a trait object shared through an `Arc`, so a vault can be
//! cloned for checkpointing without cloning the collaborator. Every trait
//! ships with an in-memory double used by tests, benches and the CLI.

pub mod asset;
pub mod oracle;
pub mod tier;

pub use asset::{Asset, AssetError, InMemoryAsset};
pub use oracle::{FixedPriceOracle, ManualPriceOracle, OracleError, PriceOracle};
pub use tier::{StaticTierOracle, TierOracle};
