//! # Deployments and Scripts
//!
//! A deployment file describes one vault: which variant, its static config,
//! the admin (offchain variant) or the opening price and seeded asset
//! balances (oracle variant). A script is an ordered list of steps; each
//! step is one batch submitted by one caller at one point in time.
//!
//! Both are plain JSON so runs can be versioned next to the data they
//! reproduce.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use receipt_vault_contracts::{
    OffchainAssetVault, OffchainAssetVaultConfig, OffchainOperation, OracleOperation, OracleVault,
};
use receipt_vault_protocol::access::Role;
use receipt_vault_protocol::external::{Asset, InMemoryAsset, ManualPriceOracle, PriceOracle};
use receipt_vault_protocol::{Address, CallContext, VaultConfig, FIXED_POINT_ONE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    Offchain,
    Oracle,
}

/// Asset units credited to `account` before the first step runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedBalance {
    pub account: Address,
    pub amount: u128,
}

/// Contents of a deployment file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub variant: VariantKind,
    pub vault: VaultConfig,
    /// Required by the offchain variant.
    #[serde(default)]
    pub admin: Option<Address>,
    /// Opening oracle price (18 decimals). Required by the oracle variant.
    #[serde(default)]
    pub price: Option<u128>,
    #[serde(default)]
    pub balances: Vec<SeedBalance>,
}

impl DeploymentConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("malformed deployment file")?;
        config.check()?;
        Ok(config)
    }

    /// Cross-field checks serde cannot express.
    pub fn check(&self) -> Result<()> {
        self.vault.validate().context("invalid vault config")?;
        match self.variant {
            VariantKind::Offchain => {
                if self.admin.is_none() {
                    bail!("offchain deployments need an `admin`");
                }
                if self.price.is_some() || !self.balances.is_empty() {
                    bail!("offchain deployments take no `price` or `balances`");
                }
            }
            VariantKind::Oracle => {
                if self.price.is_none() {
                    bail!("oracle deployments need an opening `price`");
                }
            }
        }
        Ok(())
    }
}

/// One batch submitted by `caller`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step<Op> {
    pub caller: Address,
    /// Seconds since the epoch. Defaults to the wall clock at run time.
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub block_number: u64,
    /// Oracle price to publish before the batch runs (oracle variant only).
    #[serde(default)]
    pub set_price: Option<u128>,
    /// The step is expected to be rejected.
    #[serde(default)]
    pub expect_failure: bool,
    pub operations: Vec<Op>,
}

impl<Op> Step<Op> {
    pub fn context(&self) -> CallContext {
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0));
        CallContext::new(self.caller, timestamp, self.block_number)
    }
}

/// Contents of a script file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script<Op> {
    pub steps: Vec<Step<Op>>,
}

impl<Op: DeserializeOwned> Script<Op> {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("malformed script file")
    }
}

/// A live vault stood up from a [`DeploymentConfig`], together with the
/// in-memory collaborators the script can reach.
#[derive(Debug)]
pub enum Deployment {
    Offchain(OffchainAssetVault),
    Oracle {
        vault: OracleVault,
        asset: Arc<InMemoryAsset>,
        oracle: Arc<ManualPriceOracle>,
    },
}

impl Deployment {
    pub fn build(config: &DeploymentConfig) -> Result<Self> {
        config.check()?;
        match config.variant {
            VariantKind::Offchain => {
                let admin = config.admin.unwrap_or(Address::ZERO);
                let vault = OffchainAssetVault::new(OffchainAssetVaultConfig {
                    admin,
                    asset: Address::ZERO,
                    vault: config.vault.clone(),
                })
                .context("failed to construct offchain asset vault")?;
                Ok(Deployment::Offchain(vault))
            }
            VariantKind::Oracle => {
                let asset = Arc::new(InMemoryAsset::new(config.vault.address));
                for seed in &config.balances {
                    asset
                        .credit(&seed.account, seed.amount)
                        .with_context(|| format!("failed to seed {}", seed.account))?;
                }
                let oracle = Arc::new(ManualPriceOracle::with_price(
                    config.price.unwrap_or(FIXED_POINT_ONE),
                ));
                let vault = OracleVault::new(
                    config.vault.clone(),
                    Some(asset.clone() as Arc<dyn Asset>),
                    oracle.clone() as Arc<dyn PriceOracle>,
                )
                .context("failed to construct oracle vault")?;
                Ok(Deployment::Oracle {
                    vault,
                    asset,
                    oracle,
                })
            }
        }
    }

    pub fn variant(&self) -> VariantKind {
        match self {
            Deployment::Offchain(_) => VariantKind::Offchain,
            Deployment::Oracle { .. } => VariantKind::Oracle,
        }
    }
}

/// A sample deployment and script pair, ready to be written by `init`.
pub fn sample(variant: VariantKind) -> Result<(String, String)> {
    let vault = Address::from_label("vault");
    let alice = Address::from_label("alice");
    let bob = Address::from_label("bob");

    match variant {
        VariantKind::Offchain => {
            let admin = Address::from_label("admin");
            let deployment = DeploymentConfig {
                variant,
                vault: VaultConfig::new(vault, "Warehouse Receipts", "WHR"),
                admin: Some(admin),
                price: None,
                balances: vec![],
            };
            let grant = |role: Role| OffchainOperation::GrantRole {
                role,
                account: admin,
            };
            let script = Script {
                steps: vec![
                    Step {
                        caller: admin,
                        timestamp: Some(1_700_000_000),
                        block_number: 10,
                        set_price: None,
                        expect_failure: false,
                        operations: vec![
                            grant(Role::Depositor),
                            grant(Role::Withdrawer),
                            grant(Role::Certifier),
                            OffchainOperation::Certify {
                                until: 1_800_000_000,
                                reference_block: 10,
                                force: false,
                                justification: b"audit 2023-Q4".to_vec(),
                            },
                            OffchainOperation::Deposit {
                                assets: 1_000,
                                receiver: alice,
                                min_share_ratio: FIXED_POINT_ONE,
                                justification: b"lot 1".to_vec(),
                            },
                        ],
                    },
                    Step {
                        caller: alice,
                        timestamp: Some(1_700_000_100),
                        block_number: 11,
                        set_price: None,
                        expect_failure: false,
                        operations: vec![OffchainOperation::TransferShares {
                            to: bob,
                            amount: 250,
                        }],
                    },
                ],
            };
            Ok((to_json(&deployment)?, to_json(&script)?))
        }
        VariantKind::Oracle => {
            let deployment = DeploymentConfig {
                variant,
                vault: VaultConfig::new(vault, "Priced Receipts", "PRC"),
                admin: None,
                price: Some(FIXED_POINT_ONE),
                balances: vec![SeedBalance {
                    account: alice,
                    amount: 10_000,
                }],
            };
            let script = Script {
                steps: vec![
                    Step {
                        caller: alice,
                        timestamp: Some(1_700_000_000),
                        block_number: 10,
                        set_price: None,
                        expect_failure: false,
                        operations: vec![OracleOperation::Deposit {
                            assets: 1_000,
                            receiver: alice,
                            min_share_ratio: 0,
                            justification: vec![],
                        }],
                    },
                    Step {
                        caller: alice,
                        timestamp: Some(1_700_000_100),
                        block_number: 11,
                        set_price: Some(2 * FIXED_POINT_ONE),
                        expect_failure: false,
                        operations: vec![
                            OracleOperation::Deposit {
                                assets: 500,
                                receiver: alice,
                                min_share_ratio: 0,
                                justification: vec![],
                            },
                            OracleOperation::Redeem {
                                shares: 400,
                                receiver: alice,
                                owner: alice,
                                id: FIXED_POINT_ONE,
                                justification: vec![],
                            },
                        ],
                    },
                ],
            };
            Ok((to_json(&deployment)?, to_json(&script)?))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize sample")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offchain_deployment_requires_admin() {
        let json = format!(
            r#"{{"variant": "offchain", "vault": {{"address": "{}", "name": "V", "symbol": "V"}}}}"#,
            Address::from_label("vault")
        );
        let err = DeploymentConfig::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("admin"));
    }

    #[test]
    fn oracle_deployment_requires_price() {
        let json = format!(
            r#"{{"variant": "oracle", "vault": {{"address": "{}", "name": "V", "symbol": "V"}}}}"#,
            Address::from_label("vault")
        );
        assert!(DeploymentConfig::from_json(&json).is_err());
    }

    #[test]
    fn invalid_vault_config_is_reported() {
        let json = r#"{"variant": "oracle", "price": 1,
            "vault": {"address": "0x0000000000000000000000000000000000000000", "name": "V", "symbol": "V"}}"#;
        let err = DeploymentConfig::from_json(json).unwrap_err();
        assert!(format!("{err:#}").contains("invalid vault config"));
    }

    #[test]
    fn samples_parse_back() {
        for variant in [VariantKind::Offchain, VariantKind::Oracle] {
            let (deployment, _) = sample(variant).unwrap();
            let config = DeploymentConfig::from_json(&deployment).unwrap();
            assert_eq!(config.variant, variant);
        }
        let (_, script) = sample(VariantKind::Offchain).unwrap();
        let script: Script<OffchainOperation> = Script::from_json(&script).unwrap();
        assert_eq!(script.steps.len(), 2);
        let (_, script) = sample(VariantKind::Oracle).unwrap();
        let script: Script<OracleOperation> = Script::from_json(&script).unwrap();
        assert_eq!(script.steps[1].set_price, Some(2 * FIXED_POINT_ONE));
    }

    #[test]
    fn oracle_deployment_seeds_balances() {
        let (deployment, _) = sample(VariantKind::Oracle).unwrap();
        let config = DeploymentConfig::from_json(&deployment).unwrap();
        let Deployment::Oracle { asset, .. } = Deployment::build(&config).unwrap() else {
            panic!("expected oracle deployment");
        };
        assert_eq!(asset.balance_of(&Address::from_label("alice")), 10_000);
    }

    #[test]
    fn step_context_uses_explicit_time() {
        let step: Step<OracleOperation> = Step {
            caller: Address::from_label("alice"),
            timestamp: Some(42),
            block_number: 7,
            set_price: None,
            expect_failure: false,
            operations: vec![],
        };
        let ctx = step.context();
        assert_eq!((ctx.timestamp, ctx.block_number), (42, 7));
    }
}
