//! Criterion benchmarks for the Viable packet path.
//!
//! Measures the cost of one packet through the dispatcher and through the
//! full router (wrapper validation included), for the commands a client
//! issues most: table reads during sync and writes during editing.
//!
//! Run with:
//! ```bash
//! cargo bench --package viable-core --bench dispatch_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use viable_core::storage::Layout;
use viable_core::{
    dispatch, ClientId, ManualClock, MemoryStorage, NoLegacy, PacketRouter, Viable, ViableConfig,
};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn device() -> Viable<MemoryStorage> {
    let config = ViableConfig::default();
    let size = Layout::new(config.capacities).total_size();
    let mut viable =
        Viable::new(MemoryStorage::new(size), config).expect("default config must be valid");
    viable.init().expect("init must succeed for benchmark setup");
    viable
}

fn packet(bytes: &[u8]) -> [u8; 32] {
    let mut p = [0u8; 32];
    p[0] = 0xDF;
    p[1..1 + bytes.len()].copy_from_slice(bytes);
    p
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

/// Benchmarks `dispatch` for representative commands.
fn bench_dispatch(c: &mut Criterion) {
    let requests: &[(&str, [u8; 32])] = &[
        ("GetInfo", packet(&[0x00])),
        ("TapDanceGet", packet(&[0x01, 3])),
        ("TapDanceSet", packet(&[0x02, 3, 0x04, 0, 0xE1, 0, 0, 0, 0, 0, 0xC8, 0x80])),
        ("ComboSet", packet(&[0x04, 7, 0x0D, 0, 0x0E, 0, 0, 0, 0, 0, 0x29, 0, 0, 0])),
        ("SettingsQuery", packet(&[0x10, 0, 0])),
        ("DefinitionChunk", packet(&[0x0E, 0, 0])),
    ];

    let mut viable = device();
    let mut group = c.benchmark_group("dispatch");
    for (name, request) in requests {
        group.bench_with_input(BenchmarkId::new("cmd", name), request, |b, request| {
            b.iter(|| {
                let mut buf = *request;
                dispatch(black_box(&mut viable), black_box(&mut buf)).expect("known command")
            })
        });
    }
    group.finish();
}

/// Benchmarks the router: plain Viable packets and the same packets wrapped.
fn bench_router(c: &mut Criterion) {
    let clock = ManualClock::new(0x0004_0000);
    let mut router = PacketRouter::new(device(), NoLegacy, &clock);

    let mut boot = [0u8; 32];
    boot[0] = 0xDD;
    let reply = router.handle(&boot).expect("bootstrap must reply");
    let client = ClientId::from_le_bytes([reply[25], reply[26], reply[27], reply[28]]);

    let plain = packet(&[0x01, 3]);
    let mut wrapped = [0u8; 32];
    wrapped[0] = 0xDD;
    wrapped[1..5].copy_from_slice(&client.to_le_bytes());
    wrapped[5..].copy_from_slice(&plain[..27]);

    let mut group = c.benchmark_group("router");
    group.bench_function("Viable", |b| {
        b.iter(|| router.handle(black_box(&plain)).expect("reply"))
    });
    group.bench_function("Wrapped", |b| {
        b.iter(|| router.handle(black_box(&wrapped)).expect("reply"))
    });
    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_router);
criterion_main!(benches);
