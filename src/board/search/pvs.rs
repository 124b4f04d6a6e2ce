//! Per-worker search: the recursive PVS node search.
//!
//! Each worker owns a `Searcher` with a private board copy, private
//! ordering tables and a per-ply frame array holding the principal
//! variation. Everything else comes from the shared state.

mod iterative;
mod pruning;
mod quiescence;

pub(crate) use iterative::WorkerOutcome;

use std::sync::atomic::Ordering;

use super::constants::{
    CHECK_INTERVAL, INFINITY, LMR_MIN_DEPTH, LMR_MIN_MOVES, LMR_TABLE_MAX_DEPTH,
    LMR_TABLE_MAX_IDX, MATE_SCORE, MATE_THRESHOLD,
};
use super::ordering::OrderingTables;
use super::smp::SharedSearchState;
use crate::board::{Board, Color, Move, MAX_PLY};
use crate::tt::{Bound, TtEntry};
use once_cell::sync::Lazy;

/// Late move reduction by `[depth][move number]`.
static LMR_TABLE: Lazy<[[i32; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH]> = Lazy::new(|| {
    let mut table = [[0i32; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH];
    for (depth, row) in table.iter_mut().enumerate().skip(1) {
        for (idx, cell) in row.iter_mut().enumerate().skip(1) {
            let r = (0.53 + (depth as f64).ln() * (idx as f64).ln() / 2.44).floor();
            *cell = r.max(0.0) as i32;
        }
    }
    table
});

fn lmr_reduction(depth: i32, move_number: usize) -> i32 {
    let d = (depth.max(0) as usize).min(LMR_TABLE_MAX_DEPTH - 1);
    LMR_TABLE[d][move_number.min(LMR_TABLE_MAX_IDX - 1)]
}

/// Mate scores are stored relative to the node, not the root.
#[inline]
pub(crate) fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

#[inline]
pub(crate) fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

/// Principal variation collected below one ply.
#[derive(Clone)]
pub(crate) struct Frame {
    pv: [Move; MAX_PLY],
    pv_len: usize,
}

impl Frame {
    fn new() -> Self {
        Frame {
            pv: [Move::null(); MAX_PLY],
            pv_len: 0,
        }
    }

    pub(crate) fn pv(&self) -> &[Move] {
        &self.pv[..self.pv_len]
    }
}

pub(crate) struct Searcher<'a> {
    pub(crate) board: Board,
    shared: &'a SharedSearchState,
    id: usize,
    tables: OrderingTables,
    frames: Vec<Frame>,
    nodes: u64,
    unflushed: u64,
    seldepth: usize,
    root_color: Color,
    /// Root moves already reported as earlier MultiPV lines.
    root_excluded: Vec<Move>,
    /// Cleared while the first iteration runs so it always completes.
    abortable: bool,
    stopped: bool,
}

impl<'a> Searcher<'a> {
    pub(crate) fn new(board: Board, shared: &'a SharedSearchState, id: usize) -> Self {
        let root_color = board.side_to_move();
        Searcher {
            board,
            shared,
            id,
            tables: OrderingTables::default(),
            frames: vec![Frame::new(); MAX_PLY + 1],
            nodes: 0,
            unflushed: 0,
            seldepth: 0,
            root_color,
            root_excluded: Vec::new(),
            abortable: false,
            stopped: false,
        }
    }

    #[inline]
    fn is_main(&self) -> bool {
        self.id == 0
    }

    /// Count a node. Every `CHECK_INTERVAL` nodes the local count is
    /// published, and the main worker checks the clock and node limit.
    #[inline]
    fn count_node(&mut self, ply: usize) {
        self.nodes += 1;
        self.unflushed += 1;
        self.seldepth = self.seldepth.max(ply + 1);
        if self.unflushed >= CHECK_INTERVAL {
            self.flush_nodes();
            if self.is_main() && self.limits_reached() {
                self.shared.stop.stop();
            }
        }
    }

    pub(crate) fn flush_nodes(&mut self) {
        self.shared
            .nodes
            .fetch_add(self.unflushed, Ordering::Relaxed);
        self.unflushed = 0;
    }

    fn limits_reached(&self) -> bool {
        self.shared.time.time_up()
            || self
                .shared
                .limits
                .node_limit
                .is_some_and(|limit| self.shared.nodes.load(Ordering::Relaxed) >= limit)
    }

    #[inline]
    fn should_stop(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if self.abortable && self.shared.stop.is_stopped() {
            self.stopped = true;
        }
        self.stopped
    }

    #[inline]
    fn evaluate(&self) -> i32 {
        self.shared.evaluator.evaluate(&self.board)
    }

    /// Draws score slightly below zero for the side that started the search.
    #[inline]
    fn draw_score(&self) -> i32 {
        let contempt = self.shared.limits.contempt;
        if self.board.side_to_move() == self.root_color {
            -contempt
        } else {
            contempt
        }
    }

    fn is_rule_draw(&self) -> bool {
        self.board.halfmove_clock() >= 100
            || self.board.repetition_count() >= 2
            || self.board.is_insufficient_material()
    }

    fn clear_pv(&mut self, ply: usize) {
        if let Some(frame) = self.frames.get_mut(ply) {
            frame.pv_len = 0;
        }
    }

    fn update_pv(&mut self, ply: usize, mv: Move) {
        let (head, tail) = self.frames.split_at_mut(ply + 1);
        let frame = &mut head[ply];
        let child = &tail[0];
        let len = child.pv_len.min(MAX_PLY - 1);
        frame.pv[0] = mv;
        frame.pv[1..=len].copy_from_slice(&child.pv[..len]);
        frame.pv_len = len + 1;
    }

    pub(crate) fn root_pv(&self) -> &[Move] {
        self.frames[0].pv()
    }

    fn probe_tt(&self) -> Option<TtEntry> {
        self.shared.tt.probe(self.board.hash())
    }

    /// Principal variation search.
    ///
    /// `excluded` is skipped in the move loop and disables TT cutoffs and
    /// stores; it drives the singular extension test.
    pub(crate) fn search(
        &mut self,
        mut depth: i32,
        mut alpha: i32,
        mut beta: i32,
        ply: usize,
        excluded: Option<Move>,
        allow_null: bool,
    ) -> i32 {
        let root = ply == 0;
        let pv_node = beta - alpha > 1;
        self.clear_pv(ply);

        if self.should_stop() {
            return 0;
        }
        if ply >= MAX_PLY - 1 {
            return self.evaluate();
        }

        if !root {
            if self.is_rule_draw() {
                return self.draw_score();
            }
            // Mate distance pruning.
            alpha = alpha.max(-MATE_SCORE + ply as i32);
            beta = beta.min(MATE_SCORE - ply as i32 - 1);
            if alpha >= beta {
                return alpha;
            }
            if excluded.is_none() {
                if let Some(score) = self.probe_tablebase(depth, ply) {
                    return score;
                }
            }
        }

        let us = self.board.side_to_move();
        let in_check = self.board.is_in_check(us);
        if in_check {
            depth += 1;
        }
        if depth <= 0 {
            return self.quiesce(alpha, beta, ply, 0);
        }

        self.count_node(ply);

        let entry = if excluded.is_none() { self.probe_tt() } else { None };
        let tt_move = entry.and_then(|e| e.best_move);
        if let Some(e) = entry {
            if !pv_node && i32::from(e.depth) >= depth {
                let score = score_from_tt(i32::from(e.score), ply);
                let usable = match e.bound {
                    Bound::Exact => true,
                    Bound::Lower => score >= beta,
                    Bound::Upper => score <= alpha,
                };
                if usable {
                    return score;
                }
            }
        }

        let static_eval = if in_check { -INFINITY } else { self.evaluate() };

        if !pv_node && !in_check && excluded.is_none() && allow_null {
            if let Some(score) = self.try_null_move(depth, beta, static_eval, ply) {
                return score;
            }
            if self.stopped {
                return 0;
            }
        }

        let moves = self.board.generate_moves();
        if moves.is_empty() {
            return if in_check {
                -MATE_SCORE + ply as i32
            } else {
                0
            };
        }

        let singular_extension = match (entry, tt_move) {
            (Some(e), Some(mv)) if !root && excluded.is_none() && moves.contains(mv) => {
                let extend = self.is_singular(&e, mv, depth, ply);
                if self.stopped {
                    return 0;
                }
                i32::from(extend)
            }
            _ => 0,
        };

        let original_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = None;
        let mut searched = 0usize;
        let mut scored = self
            .tables
            .score_moves(&self.board, &moves, tt_move, ply);

        for i in 0..scored.len() {
            let Some(candidate) = scored.pick_best(i) else {
                break;
            };
            let mv = candidate.mv;
            if Some(mv) == excluded || (root && self.root_excluded.contains(&mv)) {
                continue;
            }

            let quiet = mv.is_quiet();
            let killer = self.tables.killers.is_killer(ply, mv);
            let undo = self.board.make_move(mv);
            if self.board.is_in_check(us) {
                // Generator disagreement; never search or record it.
                log::warn!("skipping illegal move {mv} in {}", self.board.to_fen());
                self.board.unmake_move(mv, undo);
                continue;
            }
            let gives_check = self.board.is_in_check(!us);
            searched += 1;

            let extension = if Some(mv) == tt_move {
                singular_extension
            } else {
                0
            };
            let new_depth = depth - 1 + extension;

            let score = if searched == 1 {
                -self.search(new_depth, -beta, -alpha, ply + 1, None, true)
            } else {
                let reduction = if depth >= LMR_MIN_DEPTH
                    && searched > LMR_MIN_MOVES
                    && quiet
                    && !killer
                    && !in_check
                    && !gives_check
                {
                    let r = lmr_reduction(depth, searched) - i32::from(pv_node);
                    r.clamp(0, (new_depth - 1).max(0))
                } else {
                    0
                };

                let mut score =
                    -self.search(new_depth - reduction, -alpha - 1, -alpha, ply + 1, None, true);
                if reduction > 0 && score > alpha {
                    score = -self.search(new_depth, -alpha - 1, -alpha, ply + 1, None, true);
                }
                if score > alpha && score < beta {
                    score = -self.search(new_depth, -beta, -alpha, ply + 1, None, true);
                }
                score
            };

            self.board.unmake_move(mv, undo);
            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                if score > alpha {
                    best_move = Some(mv);
                    alpha = score;
                    self.update_pv(ply, mv);
                    if score >= beta {
                        self.tables.record_cutoff(mv, ply, depth);
                        break;
                    }
                }
            }
        }

        if searched == 0 {
            // Every move was excluded or rejected.
            return if excluded.is_some() || root {
                alpha
            } else if in_check {
                -MATE_SCORE + ply as i32
            } else {
                0
            };
        }

        if excluded.is_none() && !(root && !self.root_excluded.is_empty()) {
            let bound = if best_score >= beta {
                Bound::Lower
            } else if best_score > original_alpha {
                Bound::Exact
            } else {
                Bound::Upper
            };
            self.shared.tt.store(
                self.board.hash(),
                depth as u32,
                score_to_tt(best_score, ply),
                bound,
                best_move,
            );
        }
        best_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mate_scores_are_node_relative_in_the_table() {
        let mate_in_3_plies = MATE_SCORE - 5;
        let stored = score_to_tt(mate_in_3_plies, 2);
        assert_eq!(stored, MATE_SCORE - 3);
        assert_eq!(score_from_tt(stored, 2), mate_in_3_plies);
        assert_eq!(score_from_tt(score_to_tt(-MATE_SCORE + 4, 4), 4), -MATE_SCORE + 4);
        assert_eq!(score_to_tt(120, 9), 120);
    }

    /// Score of a depth-2 search with a fresh table, so every window sees
    /// the same tree.
    fn search_window(fen: &str, alpha: i32, beta: i32) -> i32 {
        use crate::board::PestoEvaluator;
        use crate::tt::TranspositionTable;
        use std::sync::Arc;

        let tt = Arc::new(TranspositionTable::try_new(1).unwrap());
        let shared = SharedSearchState::new(tt, Arc::new(PestoEvaluator));
        let board = Board::from_fen(fen).unwrap();
        let mut searcher = Searcher::new(board, &shared, 0);
        searcher.search(2, alpha, beta, 0, None, true)
    }

    #[test]
    fn narrow_windows_agree_with_full_window() {
        let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";
        let exact = search_window(fen, -INFINITY, INFINITY);

        assert_eq!(search_window(fen, exact - 10, exact + 10), exact);
        assert!(search_window(fen, exact + 50, exact + 100) <= exact + 50);
        assert!(search_window(fen, exact - 100, exact - 50) >= exact - 50);
    }

    #[test]
    fn lmr_grows_with_depth_and_move_number() {
        assert_eq!(lmr_reduction(1, 1), 0);
        assert!(lmr_reduction(10, 20) > lmr_reduction(3, 4));
        assert!(lmr_reduction(200, 500) >= lmr_reduction(63, 63));
    }
}
