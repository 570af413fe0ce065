//! Action-Selection Engine Benchmarks
//!
//! Benchmarks for the hot paths of the debugging agent's RL engine:
//! - Block allocation and release
//! - Experience store insertion and sampling
//! - Epsilon-greedy action selection
//! - TD update with the Adam step
//!
//! ## Hot Paths Identified
//! 1. ActionSelector::select_action() - Called for every planning decision
//! 2. ActionSelector::update() - Called for every reported reward
//! 3. ExperienceStore::sample() - Random sampling for replay
//! 4. AdamOptimizer::step() - Touches every table parameter
//!
//! ## Performance Targets
//! - Selection: < 10µs per decision at D=100, A=10
//! - Update: < 50µs per transition at D=100, A=10
//! - Sampling: < 100µs for batch of 32

#![allow(clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cda_rl::{
    ActionSelector, AdamOptimizer, BlockAllocator, EngineConfig, ExperienceStore, Transition,
};

// ============================================================================
// Helpers
// ============================================================================

fn random_state(rng: &mut StdRng, dim: usize) -> Vec<f64> {
    (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn generate_transitions(count: usize, dim: usize, actions: usize) -> Vec<Transition> {
    let mut rng = StdRng::seed_from_u64(17);
    (0..count)
        .map(|i| {
            Transition::new(
                random_state(&mut rng, dim),
                i % actions,
                rng.gen_range(-1.0..1.0),
                random_state(&mut rng, dim),
                i % 10 == 9,
            )
        })
        .collect()
}

// ============================================================================
// Allocator Benchmarks
// ============================================================================

fn bench_allocator_fill(c: &mut Criterion) {
    let block_sizes = [1, 8, 64, 203];

    let mut group = c.benchmark_group("allocator/fill");
    for block_size in block_sizes {
        let capacity = 64 * 1024;
        group.throughput(Throughput::Elements((capacity / block_size) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, &block_size| {
                b.iter(|| {
                    let mut alloc = BlockAllocator::new(capacity);
                    while alloc.allocate(block_size).is_ok() {}
                    black_box(alloc.allocated())
                });
            },
        );
    }
    group.finish();
}

fn bench_allocator_churn(c: &mut Criterion) {
    c.bench_function("allocator/allocate_last_free_block", |b| {
        let mut alloc = BlockAllocator::new(64 * 1024);
        let mut last = 0;
        while let Ok(address) = alloc.allocate(203) {
            last = address;
        }
        // Only the final block is free, so every allocate scans the whole space
        alloc.free(last).unwrap();
        b.iter(|| {
            let address = alloc.allocate(203).unwrap();
            alloc.free(black_box(address)).unwrap();
        });
    });
}

// ============================================================================
// Experience Store Benchmarks
// ============================================================================

fn bench_store_add(c: &mut Criterion) {
    let transitions = generate_transitions(1000, 100, 10);

    c.bench_function("experience_store/add_with_overwrite", |b| {
        let mut store = ExperienceStore::new(256, 100).unwrap();
        let mut i = 0;
        b.iter(|| {
            store.add(transitions[i % transitions.len()].clone()).unwrap();
            i += 1;
        });
    });
}

fn bench_store_sample_from_sizes(c: &mut Criterion) {
    let store_sizes = [100, 1000, 10000];

    let mut group = c.benchmark_group("experience_store/sample_from_store_size");
    for store_size in store_sizes {
        let mut store = ExperienceStore::new(store_size, 16).unwrap();
        for transition in generate_transitions(store_size, 16, 10) {
            store.add(transition).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(1);

        group.bench_with_input(
            BenchmarkId::from_parameter(store_size),
            &store,
            |b, store| b.iter(|| store.sample(32, &mut rng).unwrap()),
        );
    }
    group.finish();
}

// ============================================================================
// Selector Benchmarks
// ============================================================================

fn bench_select_action(c: &mut Criterion) {
    let epsilons = [0.0, 0.1, 1.0];

    let mut group = c.benchmark_group("selector/select_action");
    for epsilon in epsilons {
        let mut selector = ActionSelector::from_seed(EngineConfig::default(), 3).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let state = random_state(&mut rng, 100);

        group.bench_with_input(
            BenchmarkId::from_parameter(epsilon),
            &epsilon,
            |b, &epsilon| b.iter(|| selector.select_action(black_box(&state), epsilon).unwrap()),
        );
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let dims = [(10, 4), (100, 10), (512, 32)];

    let mut group = c.benchmark_group("selector/update");
    for (state_dim, action_count) in dims {
        let transitions = generate_transitions(512, state_dim, action_count);
        let mut selector =
            ActionSelector::from_seed(EngineConfig::with_dims(state_dim, action_count), 5)
                .unwrap();
        let mut i = 0;

        group.throughput(Throughput::Elements((state_dim * action_count) as u64));
        group.bench_function(
            BenchmarkId::from_parameter(format!("{state_dim}x{action_count}")),
            |b| {
                b.iter(|| {
                    let outcome = selector
                        .update(transitions[i % transitions.len()].clone())
                        .unwrap();
                    i += 1;
                    outcome
                });
            },
        );
    }
    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let mut selector = ActionSelector::from_seed(EngineConfig::default(), 9).unwrap();
    for transition in generate_transitions(1000, 100, 10) {
        selector.update(transition).unwrap();
    }

    c.bench_function("selector/replay_32", |b| {
        b.iter(|| selector.replay(32).unwrap());
    });
}

// ============================================================================
// Optimizer Benchmarks
// ============================================================================

fn bench_adam_step(c: &mut Criterion) {
    let shapes = [(10, 4), (100, 10), (768, 10)];

    let mut group = c.benchmark_group("optimizer/adam_step");
    for (rows, cols) in shapes {
        let mut table = Array2::from_elem((rows, cols), 0.5);
        let mut optimizer = AdamOptimizer::default();

        group.throughput(Throughput::Elements((rows * cols) as u64));
        group.bench_function(BenchmarkId::from_parameter(format!("{rows}x{cols}")), |b| {
            b.iter(|| optimizer.step(&mut table, black_box(0.25)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    name = allocator_benchmarks;
    config = Criterion::default();
    targets =
        bench_allocator_fill,
        bench_allocator_churn,
);

criterion_group!(
    name = experience_store_benchmarks;
    config = Criterion::default();
    targets =
        bench_store_add,
        bench_store_sample_from_sizes,
);

criterion_group!(
    name = selector_benchmarks;
    config = Criterion::default();
    targets =
        bench_select_action,
        bench_update,
        bench_replay,
);

criterion_group!(
    name = optimizer_benchmarks;
    config = Criterion::default();
    targets =
        bench_adam_step,
);

criterion_main!(
    allocator_benchmarks,
    experience_store_benchmarks,
    selector_benchmarks,
    optimizer_benchmarks
);
