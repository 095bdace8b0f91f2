// Vault engine benchmarks.
//
// Covers the fixed-point primitives, a full deposit (checkpoint, asset pull,
// co-mint), a deposit/redeem round trip, and a rolled-back batch.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use receipt_vault_protocol::external::{Asset, InMemoryAsset};
use receipt_vault_protocol::fixed_point::{div, mul, Rounding};
use receipt_vault_protocol::vault::{FixedRatio, IdAllocation, ReceiptVault};
use receipt_vault_protocol::{Address, CallContext, VaultConfig, VaultError, FIXED_POINT_ONE};

/// A vault with `holders` existing depositors, so checkpoints clone
/// realistically sized ledgers.
fn setup(holders: usize) -> (ReceiptVault<FixedRatio>, CallContext) {
    let vault_address = Address::from_label("vault");
    let asset = Arc::new(InMemoryAsset::new(vault_address));
    let mut vault = ReceiptVault::new(
        VaultConfig::new(vault_address, "Bench Vault", "BV"),
        Some(asset.clone() as Arc<dyn Asset>),
        FixedRatio::new(7 * FIXED_POINT_ONE / 3, IdAllocation::Sequential),
    )
    .unwrap();

    for i in 0..holders {
        let holder = Address::from_label(&format!("holder-{i}"));
        asset.credit(&holder, 1_000).unwrap();
        vault
            .deposit(&CallContext::new(holder, 0, 0), 1_000, holder, 0, b"")
            .unwrap();
    }
    vault.drain_events();

    let bencher = Address::from_label("bencher");
    asset.credit(&bencher, u64::MAX as u128).unwrap();
    (vault, CallContext::new(bencher, 0, 0))
}

fn bench_fixed_point(c: &mut Criterion) {
    let ratio = 7 * FIXED_POINT_ONE / 3;
    c.bench_function("fixed_point/mul_down", |b| {
        b.iter(|| mul(black_box(123_456_789), black_box(ratio), Rounding::Down));
    });
    c.bench_function("fixed_point/div_up", |b| {
        b.iter(|| div(black_box(123_456_789), black_box(ratio), Rounding::Up));
    });
}

fn bench_deposit(c: &mut Criterion) {
    let mut group = c.benchmark_group("vault/deposit");
    for holders in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(holders), &holders, |b, &holders| {
            let (mut vault, ctx) = setup(holders);
            b.iter(|| {
                vault
                    .deposit(&ctx, black_box(100), ctx.caller, 0, b"bench")
                    .unwrap();
                vault.drain_events();
            });
        });
    }
    group.finish();
}

fn bench_round_trip(c: &mut Criterion) {
    let (mut vault, ctx) = setup(100);
    c.bench_function("vault/deposit_redeem", |b| {
        b.iter(|| {
            let shares = vault.deposit(&ctx, 300, ctx.caller, 0, b"").unwrap();
            let id = vault.highwater_id();
            vault
                .redeem(&ctx, shares, ctx.caller, ctx.caller, id, b"")
                .unwrap();
            vault.drain_events();
        });
    });
}

fn bench_rollback(c: &mut Criterion) {
    let (mut vault, ctx) = setup(100);
    c.bench_function("vault/rolled_back_batch", |b| {
        b.iter(|| {
            let result: Result<(), VaultError> = vault.transact(|vault| {
                for _ in 0..10 {
                    vault.deposit(&ctx, 10, ctx.caller, 0, b"")?;
                }
                Err(VaultError::ZeroOwner)
            });
            assert!(result.is_err());
        });
    });
}

criterion_group!(
    benches,
    bench_fixed_point,
    bench_deposit,
    bench_round_trip,
    bench_rollback
);
criterion_main!(benches);
