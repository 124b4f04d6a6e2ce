//! Multi-threaded search: time budget, thread counts, shared stop.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use supranova::board::search::{smp_search, SearchLimits, SharedSearchState};
use supranova::board::PestoEvaluator;
use supranova::engine::{EngineConfig, EngineController, GoParams, TimeManager, MAX_THREADS};
use supranova::sync::StopFlag;
use supranova::{Board, TranspositionTable};

const MIDDLEGAME: &str = "r1bq1rk1/pp2bppp/2n1pn2/3p4/2PP4/2N1PN2/PP2BPPP/R2QKB1R w KQ - 0 8";

fn engine(threads: usize) -> EngineController {
    let mut engine = EngineController::try_new(EngineConfig {
        hash_mb: 16,
        ..Default::default()
    })
    .unwrap();
    engine.set_threads(threads);
    engine.set_board(Board::from_fen(MIDDLEGAME).unwrap());
    engine
}

#[test]
fn four_threads_respect_movetime() {
    let mut engine = engine(4);
    let start = Instant::now();
    let result = engine.search_blocking(&GoParams::move_time(300));
    let elapsed = start.elapsed();
    let best = result.best_move.expect("a move");
    assert!(engine.board().generate_moves().contains(best));
    assert!(result.depth >= 1);
    assert!(elapsed < Duration::from_millis(1500), "took {elapsed:?}");
}

#[test]
fn maximum_thread_count_still_returns_a_move() {
    let mut engine = engine(MAX_THREADS);
    assert_eq!(engine.config().threads, MAX_THREADS);
    let result = engine.search_blocking(&GoParams::depth(2));
    let best = result.best_move.expect("a move");
    assert!(engine.board().generate_moves().contains(best));
}

#[test]
fn maximum_thread_count_respects_movetime() {
    let mut engine = engine(MAX_THREADS);
    let start = Instant::now();
    let result = engine.search_blocking(&GoParams::move_time(200));
    let elapsed = start.elapsed();
    let best = result.best_move.expect("a move");
    assert!(engine.board().generate_moves().contains(best));
    assert!(result.depth >= 1);
    assert!(elapsed < Duration::from_millis(1500), "took {elapsed:?}");
}

#[test]
fn thread_counts_agree_on_forced_win() {
    // Rook takes the undefended queen.
    for threads in [1, 2, 3, 8] {
        let mut engine = engine(threads);
        engine.set_board(Board::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap());
        let result = engine.search_blocking(&GoParams::depth(5));
        assert_eq!(
            result.best_move.map(|m| m.to_string()).as_deref(),
            Some("d1d5"),
            "{threads} threads"
        );
    }
}

#[test]
fn external_stop_ends_every_worker() {
    let stop = StopFlag::new();
    let shared = SharedSearchState::new(
        Arc::new(TranspositionTable::try_new(16).unwrap()),
        Arc::new(PestoEvaluator),
    )
    .with_stop(stop.clone())
    .with_time(TimeManager::infinite())
    .with_limits(SearchLimits::default());
    let board = Board::from_fen(MIDDLEGAME).unwrap();

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        stop.stop();
    });
    let start = Instant::now();
    let result = smp_search(&board, &shared, 4);
    stopper.join().unwrap();

    assert!(start.elapsed() < Duration::from_secs(3));
    assert!(result.best_move.is_some());
    assert!(shared.nodes() > 0);
    assert_eq!(result.nodes, shared.nodes());
}
