//! Benchmarks for move generation and search.
//!
//! Run with: `cargo bench`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use tak_zero::core::GameState;
use tak_zero::mcts::{MCTSConfig, MCTSSearch};
use tak_zero::nn::{BoardEncoder, Evaluator, HeuristicEvaluator, StateEncoder};
use tak_zero::rules::{apply_move, legal_moves, parse_move};

/// A midgame position with several tall stacks.
fn midgame() -> GameState {
    let moves = [
        "fb2", "fc3", "fb3", "fc2", "mb2d", "mc3a", "fa1", "fd4", "mc2w", "fa4", "fd1", "wb1",
    ];
    moves.iter().fold(GameState::new(), |state, text| match parse_move(text, &state) {
        Ok(mv) => apply_move(&state, &mv),
        Err(_) => state,
    })
}

// =============================================================================
// Rules Benchmarks
// =============================================================================

fn bench_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("legal_moves");
    for (name, state) in [("opening", GameState::new()), ("midgame", midgame())] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &state, |b, state| {
            b.iter(|| legal_moves(black_box(state)))
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let state = midgame();
    c.bench_function("encode_board", |b| b.iter(|| BoardEncoder.encode(black_box(&state))));
}

// =============================================================================
// Search Benchmarks
// =============================================================================

fn bench_choose_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("choose_move");
    let evaluator: Arc<dyn Evaluator> = Arc::new(HeuristicEvaluator);

    for sims in [50u32, 200, 800] {
        group.throughput(Throughput::Elements(u64::from(sims)));
        group.bench_with_input(BenchmarkId::new("midgame", sims), &sims, |b, &sims| {
            b.iter(|| {
                let mut search = MCTSSearch::new(
                    midgame(),
                    Arc::clone(&evaluator),
                    MCTSConfig::default().with_seed(42),
                )
                .unwrap();
                black_box(search.choose_move(sims).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_legal_moves, bench_encode, bench_choose_move);
criterion_main!(benches);
