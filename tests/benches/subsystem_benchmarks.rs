//! # Oracle Committee Subsystem Benchmarks
//!
//! | Subsystem | Operation | Target |
//! |-----------|-----------|--------|
//! | oc-01 Config Tracking | digest of a 31-member config | < 50μs |
//! | oc-02 Cooldown Cache | get / set under contention | < 1μs |
//! | oc-04 Round Executor | keyed leader selection | < 1μs |

use chrono::{Duration as ChronoDuration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use oc_01_config_tracking::{
    ConfigDigester, DiscriminatorTransform, Keccak256ConfigDigester, TransformingConfigDigester,
};
use oc_02_cooldown_cache::{CooldownApi, CooldownCache};
use oc_04_round_executor::{KeyedLeaderSelector, LeaderSelector};
use rand::Rng;
use shared_types::{ConfigDigest, ContractConfig};
use std::sync::Arc;

// ============================================================================
// OC-01: Config digests
// ============================================================================

fn committee_config(n: usize) -> ContractConfig {
    let mut rng = rand::thread_rng();
    ContractConfig {
        config_count: 1,
        signers: (0..n).map(|_| (0..20).map(|_| rng.gen()).collect()).collect(),
        transmitters: (0..n).map(|i| format!("0x{:040x}", i)).collect(),
        f: ((n - 1) / 3) as u8,
        offchain_config: vec![0u8; 512],
        ..Default::default()
    }
}

fn bench_config_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("oc-01-config-digest");
    let base = Keccak256ConfigDigester::evm(1, vec![0x0c; 20]);
    let transformed = TransformingConfigDigester::new(
        Keccak256ConfigDigester::evm(1, vec![0x0c; 20]),
        DiscriminatorTransform::new(b"commit".to_vec()),
    );

    for n in [4usize, 16, 31] {
        let config = committee_config(n);
        group.bench_with_input(BenchmarkId::new("keccak256", n), &config, |b, config| {
            b.iter(|| black_box(base.config_digest(config)))
        });
        group.bench_with_input(BenchmarkId::new("discriminated", n), &config, |b, config| {
            b.iter(|| black_box(transformed.config_digest(config)))
        });
    }
    group.finish();
}

// ============================================================================
// OC-02: Cooldown cache
// ============================================================================

fn bench_cooldown_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("oc-02-cooldown-cache");

    for size in [1_000usize, 100_000] {
        let cache: CooldownCache = CooldownCache::with_capacity(size);
        let until = Utc::now() + ChronoDuration::minutes(5);
        let keys: Vec<[u8; 32]> = (0..size)
            .map(|i| {
                let mut key = [0u8; 32];
                key[..8].copy_from_slice(&(i as u64).to_be_bytes());
                key
            })
            .collect();
        for key in &keys {
            cache.set(*key, until);
        }

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("get_hit", size), &keys, |b, keys| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % keys.len();
                black_box(cache.get(&keys[i]))
            })
        });
        group.bench_with_input(BenchmarkId::new("set_overwrite", size), &keys, |b, keys| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % keys.len();
                cache.set(keys[i], until)
            })
        });
    }

    // Readers racing one writer
    let cache: Arc<CooldownCache> = Arc::new(CooldownCache::new());
    let key = [7u8; 32];
    cache.set(key, Utc::now());
    group.bench_function("get_with_concurrent_writer", |b| {
        let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let writer = {
            let cache = cache.clone();
            let stop = stop.clone();
            std::thread::spawn(move || {
                while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                    cache.set([8u8; 32], Utc::now());
                }
            })
        };
        b.iter(|| black_box(cache.get(&key)));
        stop.store(true, std::sync::atomic::Ordering::Relaxed);
        let _ = writer.join();
    });
    group.finish();
}

// ============================================================================
// OC-04: Leader selection
// ============================================================================

fn bench_leader_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("oc-04-leader-selection");
    let selector = KeyedLeaderSelector;
    let digest = ConfigDigest([0xab; 32]);

    group.bench_function("keyed_select", |b| {
        let mut seq_nr = 0u64;
        b.iter(|| {
            seq_nr += 1;
            black_box(selector.select(&digest, seq_nr, 31))
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_config_digest,
    bench_cooldown_cache,
    bench_leader_selection
);
criterion_main!(benches);
