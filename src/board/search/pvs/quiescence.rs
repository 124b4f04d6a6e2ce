use super::super::constants::{INFINITY, MATE_SCORE, MAX_QSEARCH_DEPTH};
use super::super::ordering::capture_score;
use super::Searcher;
use crate::board::{ScoredMoveList, MAX_PLY};

impl Searcher<'_> {
    /// Quiescence search: resolve captures (and, on the first ply, quiet
    /// checks) until the position is quiet. Losing captures are pruned by
    /// SEE; in check every evasion is tried.
    pub(super) fn quiesce(&mut self, mut alpha: i32, beta: i32, ply: usize, qdepth: i32) -> i32 {
        self.clear_pv(ply);
        if self.should_stop() {
            return 0;
        }
        self.count_node(ply);

        if ply >= MAX_PLY - 1 || qdepth >= MAX_QSEARCH_DEPTH {
            return self.evaluate();
        }

        let us = self.board.side_to_move();
        let in_check = self.board.is_in_check(us);
        let mut best_score;
        let moves;

        if in_check {
            moves = self.board.generate_moves();
            if moves.is_empty() {
                return -MATE_SCORE + ply as i32;
            }
            best_score = -INFINITY;
        } else {
            let stand_pat = self.evaluate();
            if stand_pat >= beta {
                return stand_pat;
            }
            alpha = alpha.max(stand_pat);
            best_score = stand_pat;
            moves = if qdepth == 0 {
                self.board.generate_moves()
            } else {
                self.board.generate_tactical_moves()
            };
        }

        let mut scored = ScoredMoveList::new();
        for &mv in &moves {
            let tactical = mv.is_capture() || mv.is_promotion();
            if in_check {
                let score = if tactical { capture_score(&self.board, mv) } else { 0 };
                scored.push(mv, score);
            } else if tactical {
                if self.board.see(mv) >= 0 {
                    scored.push(mv, capture_score(&self.board, mv));
                }
            } else if self.board.gives_check(mv) {
                scored.push(mv, 0);
            }
        }

        for i in 0..scored.len() {
            let Some(candidate) = scored.pick_best(i) else {
                break;
            };
            let mv = candidate.mv;
            let undo = self.board.make_move(mv);
            let score = -self.quiesce(-beta, -alpha, ply + 1, qdepth + 1);
            self.board.unmake_move(mv, undo);
            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                if score > alpha {
                    alpha = score;
                    if score >= beta {
                        break;
                    }
                }
            }
        }

        best_score
    }
}
