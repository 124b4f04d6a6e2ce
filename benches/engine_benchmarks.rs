//! Benchmarks for move generation, exchange evaluation and search.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use supranova::board::search::{smp_search, SearchLimits, SharedSearchState};
use supranova::board::{Board, Evaluator, PestoEvaluator};
use supranova::TranspositionTable;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const ITALIAN: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

fn board(fen: &str) -> Board {
    Board::from_fen(fen).expect("benchmark FEN")
}

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");

    let mut startpos = Board::new();
    for depth in 1..=4 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| startpos.perft(black_box(depth)))
        });
    }

    let mut kiwipete = board(KIWIPETE);
    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| kiwipete.perft(black_box(depth)))
        });
    }

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");

    for (name, fen) in [("italian", ITALIAN), ("kiwipete", KIWIPETE)] {
        let position = board(fen);
        group.bench_function(BenchmarkId::new("legal", name), |b| {
            b.iter(|| black_box(position.generate_moves()))
        });
        group.bench_function(BenchmarkId::new("tactical", name), |b| {
            b.iter(|| black_box(position.generate_tactical_moves()))
        });
    }

    group.finish();
}

fn bench_see_and_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("static");

    let position = board(KIWIPETE);
    let captures = position.generate_tactical_moves();
    group.bench_function("see_all_captures", |b| {
        b.iter(|| captures.iter().map(|&mv| position.see(black_box(mv))).sum::<i32>())
    });

    let evaluator = PestoEvaluator;
    for (name, fen) in [
        ("startpos", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
        ("middlegame", ITALIAN),
        ("endgame", "8/5k2/8/8/8/8/5K2/4R3 w - - 0 1"),
    ] {
        let position = board(fen);
        group.bench_with_input(BenchmarkId::new("eval", name), &position, |b, position| {
            b.iter(|| black_box(evaluator.evaluate(position)))
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for (name, fen, threads) in [
        ("startpos", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 1),
        ("italian", ITALIAN, 1),
        ("italian_smp4", ITALIAN, 4),
    ] {
        let position = board(fen);
        for depth in [4, 6] {
            group.bench_with_input(BenchmarkId::new(name, depth), &depth, |b, &depth| {
                b.iter(|| {
                    let tt = Arc::new(TranspositionTable::try_new(16).expect("table"));
                    let shared = SharedSearchState::new(tt, Arc::new(PestoEvaluator))
                        .with_limits(SearchLimits::depth(depth));
                    smp_search(&position, &shared, threads)
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_perft, bench_movegen, bench_see_and_eval, bench_search);
criterion_main!(benches);
