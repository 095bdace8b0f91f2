//! Property-based tests for vault invariants
//!
//! - Backing: share supply == Σ receipt balances after every operation,
//!   successful or not
//! - Rounding safety: no deposit/withdraw or mint/redeem round trip pays out
//!   more assets than went in
//! - Asset conservation: custodied assets only move through the vault's own
//!   deposits and withdrawals

use proptest::prelude::*;
use std::sync::Arc;

use receipt_vault_protocol::external::{Asset, InMemoryAsset};
use receipt_vault_protocol::vault::{FixedRatio, IdAllocation, ReceiptVault};
use receipt_vault_protocol::{Address, CallContext, VaultConfig, FIXED_POINT_ONE};

const HOLDERS: [&str; 3] = ["alice", "bob", "carol"];

#[derive(Debug, Clone)]
enum Op {
    Deposit { holder: usize, assets: u128 },
    Mint { holder: usize, shares: u128 },
    Withdraw { holder: usize, assets: u128, id: u128 },
    Redeem { holder: usize, shares: u128, id: u128 },
    TransferShares { from: usize, to: usize, amount: u128 },
    TransferReceipt { from: usize, to: usize, id: u128, amount: u128 },
}

/// Ratios between 0.01 and 100.0, including awkward non-terminating ones.
fn ratio_strategy() -> impl Strategy<Value = u128> {
    prop_oneof![
        Just(FIXED_POINT_ONE),
        Just(FIXED_POINT_ONE / 3),
        Just(7 * FIXED_POINT_ONE / 3),
        (FIXED_POINT_ONE / 100..100 * FIXED_POINT_ONE),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let holder = 0..HOLDERS.len();
    prop_oneof![
        (holder.clone(), 1u128..10_000).prop_map(|(holder, assets)| Op::Deposit { holder, assets }),
        (holder.clone(), 1u128..10_000).prop_map(|(holder, shares)| Op::Mint { holder, shares }),
        (holder.clone(), 1u128..10_000, 1u128..6)
            .prop_map(|(holder, assets, id)| Op::Withdraw { holder, assets, id }),
        (holder.clone(), 1u128..10_000, 1u128..6)
            .prop_map(|(holder, shares, id)| Op::Redeem { holder, shares, id }),
        (holder.clone(), holder.clone(), 0u128..10_000)
            .prop_map(|(from, to, amount)| Op::TransferShares { from, to, amount }),
        (holder.clone(), holder, 1u128..6, 0u128..10_000)
            .prop_map(|(from, to, id, amount)| Op::TransferReceipt { from, to, id, amount }),
    ]
}

fn addr(index: usize) -> Address {
    Address::from_label(HOLDERS[index])
}

fn ctx(index: usize) -> CallContext {
    CallContext::new(addr(index), 0, 0)
}

fn setup(ratio: u128) -> (ReceiptVault<FixedRatio>, Arc<InMemoryAsset>) {
    let vault_address = Address::from_label("vault");
    let asset = Arc::new(InMemoryAsset::new(vault_address));
    for index in 0..HOLDERS.len() {
        asset.credit(&addr(index), 1_000_000_000).unwrap();
    }
    let vault = ReceiptVault::new(
        VaultConfig::new(vault_address, "Property Vault", "PV"),
        Some(asset.clone() as Arc<dyn Asset>),
        FixedRatio::new(ratio, IdAllocation::Sequential),
    )
    .unwrap();
    (vault, asset)
}

fn apply(vault: &mut ReceiptVault<FixedRatio>, op: &Op) {
    // Individual operations may fail; the invariants must hold either way.
    let _ = match *op {
        Op::Deposit { holder, assets } => vault.deposit(&ctx(holder), assets, addr(holder), 0, b"").map(drop),
        Op::Mint { holder, shares } => vault.mint(&ctx(holder), shares, addr(holder), 0, b"").map(drop),
        Op::Withdraw { holder, assets, id } => vault
            .withdraw(&ctx(holder), assets, addr(holder), addr(holder), id, b"")
            .map(drop),
        Op::Redeem { holder, shares, id } => vault
            .redeem(&ctx(holder), shares, addr(holder), addr(holder), id, b"")
            .map(drop),
        Op::TransferShares { from, to, amount } => vault.transfer_shares(&ctx(from), addr(to), amount),
        Op::TransferReceipt { from, to, id, amount } => {
            vault.transfer_receipt(&ctx(from), addr(from), addr(to), id, amount)
        }
    };
}

proptest! {
    #[test]
    fn supply_is_always_backed_by_receipts(
        ratio in ratio_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let (mut vault, asset) = setup(ratio);
        let seeded = asset.total_supply();
        for op in &ops {
            apply(&mut vault, op);
            prop_assert!(vault.is_backed(), "unbacked after {:?}", op);
            prop_assert_eq!(asset.total_supply(), seeded);
            prop_assert_eq!(vault.total_assets(), asset.balance_of(&vault.address()));
        }
        let sequential_ids = vault.highwater_id();
        for (id, _) in vault.ledgers().receipts.outstanding() {
            prop_assert!(id >= 1 && id <= sequential_ids);
        }
    }

    #[test]
    fn deposit_then_withdraw_never_profits(ratio in ratio_strategy(), assets in 1u128..1_000_000) {
        let (mut vault, asset) = setup(ratio);
        let alice = addr(0);
        let before = asset.balance_of(&alice);
        if vault.deposit(&ctx(0), assets, alice, 0, b"").is_ok() {
            let max = vault.max_withdraw(&ctx(0), &alice, 1).unwrap();
            prop_assert!(max <= assets);
            if max > 0 {
                vault.withdraw(&ctx(0), max, alice, alice, 1, b"").unwrap();
            }
        }
        prop_assert!(asset.balance_of(&alice) <= before);
        prop_assert!(vault.is_backed());
    }

    #[test]
    fn mint_then_redeem_never_profits(ratio in ratio_strategy(), shares in 1u128..1_000_000) {
        let (mut vault, asset) = setup(ratio);
        let alice = addr(0);
        let before = asset.balance_of(&alice);
        let paid = vault.mint(&ctx(0), shares, alice, 0, b"").unwrap();
        let returned = vault.redeem(&ctx(0), shares, alice, alice, 1, b"").unwrap_or(0);
        prop_assert!(returned <= paid);
        prop_assert!(asset.balance_of(&alice) <= before);
    }
}
