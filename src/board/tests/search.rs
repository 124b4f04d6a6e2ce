//! Search behaviour on small tactical and rule positions.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::board::search::{
    smp_search, Score, SearchInfo, SearchLimits, SearchResult, SharedSearchState, MATE_SCORE,
};
use crate::board::{Board, PestoEvaluator};
use crate::engine::tablebase::{Tablebase, TablebaseHit};
use crate::tt::TranspositionTable;

fn shared(limits: SearchLimits) -> SharedSearchState {
    let tt = Arc::new(TranspositionTable::try_new(4).unwrap());
    SharedSearchState::new(tt, Arc::new(PestoEvaluator)).with_limits(limits)
}

fn search_fen(fen: &str, limits: SearchLimits, threads: usize) -> SearchResult {
    let board = Board::from_fen(fen).unwrap();
    smp_search(&board, &shared(limits), threads)
}

fn best(result: &SearchResult) -> String {
    result.best_move.map(|m| m.to_string()).unwrap_or_default()
}

#[test]
fn finds_back_rank_mate() {
    let result = search_fen("6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1", SearchLimits::depth(3), 1);
    assert_eq!(best(&result), "e1e8");
    assert_eq!(Score::from_raw(result.score), Score::Mate(1));
}

#[test]
fn finds_scholars_mate() {
    let result = search_fen(
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        SearchLimits::depth(4),
        1,
    );
    assert_eq!(best(&result), "h5f7");
    assert!(result.score >= MATE_SCORE - 10);
}

#[test]
fn wins_hanging_queen() {
    let result = search_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1", SearchLimits::depth(4), 1);
    assert_eq!(best(&result), "d1d5");
    assert!(result.score > 300);
}

#[test]
fn stalemated_root_has_no_move() {
    let result = search_fen("k7/8/1QK5/8/8/8/8/8 b - - 0 1", SearchLimits::depth(4), 1);
    assert_eq!(result.best_move, None);
    assert_eq!(result.score, 0);
}

#[test]
fn checkmated_root_scores_mate() {
    let result = search_fen("R5k1/5ppp/8/8/8/8/8/7K b - - 0 1", SearchLimits::depth(4), 1);
    assert_eq!(result.best_move, None);
    assert_eq!(result.score, -MATE_SCORE);
}

#[test]
fn fifty_move_rule_scores_draw() {
    let fen = "4k3/8/8/8/8/8/8/R3K3 w - - 99 80";
    let result = search_fen(fen, SearchLimits::depth(3), 1);
    assert_eq!(result.score, 0);
    assert!(result.best_move.is_some());

    let result = search_fen(fen, SearchLimits::depth(3).with_contempt(20), 1);
    assert_eq!(result.score, -20);
}

#[test]
fn drawn_root_scores_draw_but_plays_a_move() {
    let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    for _ in 0..2 {
        for notation in ["a1a2", "e8d8", "a2a1", "d8e8"] {
            let mv = board.parse_move(notation).unwrap();
            board.make_move(mv);
        }
    }
    assert_eq!(board.repetition_count(), 3);

    let result = smp_search(&board, &shared(SearchLimits::depth(4)), 1);
    assert_eq!(result.score, 0);
    let mv = result.best_move.expect("a move is still played");
    assert!(board.is_legal(mv));

    let result = smp_search(&board, &shared(SearchLimits::depth(4).with_contempt(15)), 2);
    assert_eq!(result.score, -15);

    let fen = "4k3/8/8/8/8/8/8/R3K3 w - - 100 80";
    let result = search_fen(fen, SearchLimits::depth(3), 1);
    assert_eq!(result.score, 0);
    assert!(result.best_move.is_some());
}

#[test]
fn node_limit_stops_search() {
    let result = search_fen(
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        SearchLimits::default().with_nodes(20_000),
        1,
    );
    assert!(result.best_move.is_some());
    assert!(result.depth < 64);
    assert!(result.nodes < 40_000, "searched {} nodes", result.nodes);
}

#[test]
fn ponder_move_is_legal_reply() {
    let mut board = Board::new();
    let result = smp_search(&board, &shared(SearchLimits::depth(4)), 1);
    let best = result.best_move.unwrap();
    let ponder = result.ponder_move.expect("ponder move");
    board.make_move(best);
    assert!(board.generate_moves().contains(ponder));
}

#[test]
fn multi_pv_reports_distinct_lines() {
    let seen: Arc<Mutex<Vec<SearchInfo>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let state = shared(SearchLimits::depth(3).with_multi_pv(3))
        .with_info(Arc::new(move |info: &SearchInfo| sink.lock().push(info.clone())));
    let result = smp_search(&Board::new(), &state, 1);

    let infos = seen.lock();
    let last: Vec<&SearchInfo> = infos.iter().filter(|i| i.depth == 3).collect();
    assert_eq!(last.len(), 3);
    assert_eq!(
        last.iter().map(|i| i.multipv).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(Some(last[0].pv[0]), result.best_move);
    let firsts: HashSet<_> = last.iter().map(|i| i.pv[0]).collect();
    assert_eq!(firsts.len(), 3);
}

struct WinningTables;

impl Tablebase for WinningTables {
    fn max_pieces(&self) -> u32 {
        3
    }

    fn probe(&self, board: &Board) -> Option<TablebaseHit> {
        (board.piece_count() <= 3).then_some(TablebaseHit {
            score: -1234,
            best_move: None,
        })
    }
}

#[test]
fn tablebase_hits_replace_search() {
    let board = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
    let state = shared(SearchLimits::depth(2)).with_tablebase(Arc::new(WinningTables));
    let result = smp_search(&board, &state, 1);
    assert_eq!(result.score, 1234);
    assert!(result.best_move.is_some());
}

#[test]
fn helpers_agree_on_forced_mate() {
    let result = search_fen("6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1", SearchLimits::depth(5), 4);
    assert_eq!(best(&result), "e1e8");
    assert!(result.nodes > 0);
}
