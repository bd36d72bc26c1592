//! Dispatch benchmarks
//!
//! - Reducer execution in isolation
//! - Store `send` with and without middleware and listeners
//!
//! Run with: `cargo bench -p todo-store-runtime`

#![allow(missing_docs)] // Benchmarks don't need extensive docs
#![allow(clippy::expect_used)] // Benchmarks can use expect for setup

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use todo_store_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use todo_store_runtime::middleware::{default_middleware, LoggingMiddleware};
use todo_store_runtime::{Store, StoreConfig};
use todo_store_testing::test_clock;

#[derive(Clone, Debug, Default, serde::Serialize)]
struct Ledger {
    entries: Vec<i64>,
    balance: i64,
}

#[derive(Clone, Debug, serde::Serialize)]
enum LedgerAction {
    Post(i64),
    Void,
}

struct LedgerReducer;

impl Reducer for LedgerReducer {
    type State = Ledger;
    type Action = LedgerAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Ledger,
        action: LedgerAction,
        _env: &(),
    ) -> SmallVec<[Effect<LedgerAction>; 4]> {
        match action {
            LedgerAction::Post(amount) => {
                state.entries.push(amount);
                state.balance += amount;
            },
            LedgerAction::Void => {
                if let Some(amount) = state.entries.pop() {
                    state.balance -= amount;
                }
            },
        }
        smallvec![Effect::None]
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

/// Benchmark reducer execution in isolation (no Store overhead)
fn benchmark_reducer(c: &mut Criterion) {
    let mut group = c.benchmark_group("reducer");
    group.throughput(Throughput::Elements(2));

    group.bench_function("post_then_void", |b| {
        let mut state = Ledger::default();
        b.iter(|| {
            let _ = LedgerReducer.reduce(&mut state, black_box(LedgerAction::Post(7)), &());
            let _ = LedgerReducer.reduce(&mut state, black_box(LedgerAction::Void), &());
        });
    });

    group.finish();
}

/// Benchmark Store dispatch (actions/sec)
fn benchmark_store_send(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_send");
    group.throughput(Throughput::Elements(2));
    let runtime = runtime();

    group.bench_function("bare", |b| {
        let store = Store::new(Ledger::default(), LedgerReducer, ());
        b.to_async(&runtime).iter(|| async {
            let _ = store.send(black_box(LedgerAction::Post(7))).await;
            let _ = store.send(black_box(LedgerAction::Void)).await;
        });
    });

    group.bench_function("with_listener", |b| {
        let store = Store::new(Ledger::default(), LedgerReducer, ());
        let _subscription = store.subscribe(|ledger: &Ledger| {
            black_box(ledger.balance);
        });
        b.to_async(&runtime).iter(|| async {
            let _ = store.send(black_box(LedgerAction::Post(7))).await;
            let _ = store.send(black_box(LedgerAction::Void)).await;
        });
    });

    group.bench_function("with_middleware", |b| {
        let config: StoreConfig<Ledger, LedgerAction> = StoreConfig::default()
            .with_middleware(LoggingMiddleware::new(Arc::new(test_clock())))
            .with_middlewares(default_middleware());
        let store = Store::with_config(Ledger::default(), LedgerReducer, (), config);
        b.to_async(&runtime).iter(|| async {
            let _ = store.send(black_box(LedgerAction::Post(7))).await;
            let _ = store.send(black_box(LedgerAction::Void)).await;
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_reducer, benchmark_store_send);
criterion_main!(benches);
