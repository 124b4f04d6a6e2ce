use std::sync::atomic::Ordering;

use super::super::constants::{
    ASPIRATION_DELTA, ASPIRATION_MAX_RETRIES, ASPIRATION_MIN_DEPTH, INFINITY, MATE_SCORE,
    MATE_THRESHOLD,
};
use super::super::{Score, SearchInfo};
use super::Searcher;
use crate::board::Move;

/// What one worker settled on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkerOutcome {
    pub best_move: Option<Move>,
    pub ponder_move: Option<Move>,
    pub score: i32,
    /// Deepest completed iteration; 0 if none completed.
    pub depth: u32,
}

impl Searcher<'_> {
    /// Iterative deepening from depth 1. The result of an interrupted
    /// iteration is discarded; the first iteration always runs to the end.
    pub(crate) fn iterate(&mut self) -> WorkerOutcome {
        self.tables.reset();
        let root_moves = self.board.generate_moves();
        let mut outcome = WorkerOutcome {
            best_move: root_moves.first(),
            ponder_move: None,
            score: 0,
            depth: 0,
        };
        if root_moves.is_empty() {
            if self.board.is_in_check(self.board.side_to_move()) {
                outcome.score = -MATE_SCORE;
            }
            return outcome;
        }

        let limits = self.shared.limits;
        let lines = if self.is_main() {
            limits.multi_pv.clamp(1, root_moves.len())
        } else {
            1
        };
        let mut previous = vec![0i32; lines];
        // The game is already drawn; moves are still searched so one can be played.
        let root_draw = self.board.is_draw() || self.board.is_insufficient_material();

        for depth in 1..=limits.max_depth {
            self.abortable = depth > 1;
            // Odd helpers run one ply ahead to diversify the shared table.
            let search_depth = if self.is_main() {
                depth
            } else {
                (depth + (self.id % 2) as u32).min(limits.max_depth)
            };
            self.seldepth = 0;

            let mut completed: Vec<(i32, Vec<Move>)> = Vec::with_capacity(lines);
            self.root_excluded.clear();
            for line in 0..lines {
                let score = self.aspiration(search_depth as i32, previous[line]);
                if self.stopped {
                    break;
                }
                let pv = self.root_pv().to_vec();
                let Some(&first) = pv.first() else {
                    break;
                };
                self.root_excluded.push(first);
                completed.push((score, pv));
            }
            self.root_excluded.clear();

            if self.stopped || completed.is_empty() {
                break;
            }

            for (slot, (score, _)) in previous.iter_mut().zip(&completed) {
                *slot = *score;
            }
            if root_draw {
                let draw = self.draw_score();
                for (score, _) in &mut completed {
                    *score = draw;
                }
            }
            let (score, pv) = &completed[0];
            outcome = WorkerOutcome {
                best_move: pv.first().copied(),
                ponder_move: pv.get(1).copied(),
                score: *score,
                depth: search_depth,
            };

            if self.is_main() {
                self.report(search_depth, &completed);
                log::debug!(
                    "depth {search_depth} score {score} best {} nodes {}",
                    pv[0],
                    self.shared.nodes.load(Ordering::Relaxed)
                );
                if self.should_finish(root_moves.len(), *score, search_depth) {
                    break;
                }
            }
        }

        self.flush_nodes();
        if outcome.ponder_move.is_none() {
            outcome.ponder_move = outcome.best_move.and_then(|mv| self.ponder_from_tt(mv));
        }
        outcome
    }

    /// Root search with a window around the previous score. A failed
    /// window is widened and re-searched at the same depth; after a few
    /// failures the full window is used.
    fn aspiration(&mut self, depth: i32, previous: i32) -> i32 {
        if depth < ASPIRATION_MIN_DEPTH as i32 || previous.abs() >= MATE_THRESHOLD {
            return self.search(depth, -INFINITY, INFINITY, 0, None, true);
        }

        let mut delta = ASPIRATION_DELTA;
        let mut alpha = (previous - delta).max(-INFINITY);
        let mut beta = (previous + delta).min(INFINITY);
        let mut retries = 0;
        loop {
            let score = self.search(depth, alpha, beta, 0, None, true);
            if self.stopped {
                return score;
            }
            if score <= alpha {
                alpha = (score - delta).max(-INFINITY);
            } else if score >= beta {
                beta = (score + delta).min(INFINITY);
            } else {
                return score;
            }

            retries += 1;
            delta = delta.saturating_mul(2);
            if retries >= ASPIRATION_MAX_RETRIES {
                alpha = -INFINITY;
                beta = INFINITY;
            }
        }
    }

    /// Stop deepening early: a forced move under a clock, a proven mate
    /// the search has had depth to confirm, or too little time left to
    /// finish another iteration.
    fn should_finish(&self, root_moves: usize, score: i32, depth: u32) -> bool {
        let timed = self.shared.time.budget().is_some();
        if timed && root_moves == 1 {
            return true;
        }
        if score.abs() >= MATE_THRESHOLD {
            let mate_plies = (MATE_SCORE - score.abs()) as u32;
            if depth >= mate_plies.saturating_mul(2) + 2 {
                return true;
            }
        }
        !self.shared.time.should_start_iteration()
    }

    fn report(&mut self, depth: u32, lines: &[(i32, Vec<Move>)]) {
        let shared = self.shared;
        let Some(callback) = &shared.info else {
            return;
        };
        self.flush_nodes();
        let nodes = shared.nodes.load(Ordering::Relaxed);
        let time_ms = shared.time.elapsed().as_millis() as u64;
        let nps = if time_ms > 0 { nodes * 1000 / time_ms } else { nodes };
        let hashfull = shared.tt.hashfull();

        for (idx, (score, pv)) in lines.iter().enumerate() {
            callback(&SearchInfo {
                depth,
                seldepth: self.seldepth as u32,
                multipv: idx + 1,
                score: Score::from_raw(*score),
                nodes,
                nps,
                hashfull,
                time_ms,
                pv: pv.clone(),
            });
        }
    }

    /// The stored reply to `best`, if it is legal.
    fn ponder_from_tt(&mut self, best: Move) -> Option<Move> {
        let undo = self.board.make_move(best);
        let reply = self
            .probe_tt()
            .and_then(|entry| entry.best_move)
            .filter(|&mv| self.board.generate_moves().contains(mv));
        self.board.unmake_move(best, undo);
        reply
    }
}
