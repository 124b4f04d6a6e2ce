use super::super::constants::{
    MATE_THRESHOLD, NULL_MOVE_BASE_REDUCTION, NULL_MOVE_MIN_DEPTH, SINGULAR_MARGIN,
    SINGULAR_MIN_DEPTH, SINGULAR_TT_DEPTH_SLACK,
};
use super::{score_from_tt, score_to_tt, Searcher};
use crate::board::Move;
use crate::tt::{Bound, TtEntry};

impl Searcher<'_> {
    /// Null move pruning: hand the opponent a free move and cut off if a
    /// reduced search still fails high. Skipped without non-pawn material,
    /// where zugzwang makes passing unsound.
    pub(super) fn try_null_move(
        &mut self,
        depth: i32,
        beta: i32,
        static_eval: i32,
        ply: usize,
    ) -> Option<i32> {
        let us = self.board.side_to_move();
        if depth < NULL_MOVE_MIN_DEPTH
            || static_eval < beta
            || beta.abs() >= MATE_THRESHOLD
            || !self.board.has_non_pawn_material(us)
        {
            return None;
        }

        let r = NULL_MOVE_BASE_REDUCTION + (depth + 1) / 3;
        let info = self.board.make_null_move();
        let score = -self.search(depth - 1 - r, -beta, -beta + 1, ply + 1, None, false);
        self.board.unmake_null_move(info);

        if self.stopped {
            return None;
        }
        // Unproven mates from a null move are not trusted.
        (score >= beta).then(|| if score >= MATE_THRESHOLD { beta } else { score })
    }

    /// Is `tt_move` clearly better than every alternative? Searches the
    /// node at reduced depth with the move excluded and a window just
    /// below the stored score.
    pub(super) fn is_singular(
        &mut self,
        entry: &TtEntry,
        tt_move: Move,
        depth: i32,
        ply: usize,
    ) -> bool {
        let tt_score = score_from_tt(i32::from(entry.score), ply);
        if depth < SINGULAR_MIN_DEPTH
            || i32::from(entry.depth) < depth - SINGULAR_TT_DEPTH_SLACK
            || !matches!(entry.bound, Bound::Lower | Bound::Exact)
            || tt_score.abs() >= MATE_THRESHOLD
        {
            return false;
        }

        let singular_beta = tt_score - SINGULAR_MARGIN * depth;
        let score = self.search(
            (depth - 1) / 2,
            singular_beta - 1,
            singular_beta,
            ply,
            Some(tt_move),
            false,
        );
        score < singular_beta
    }

    /// Exact result from the tablebase, also recorded in the
    /// transposition table.
    pub(super) fn probe_tablebase(&self, depth: i32, ply: usize) -> Option<i32> {
        let tablebase = &self.shared.tablebase;
        let max = tablebase.max_pieces();
        if max == 0 || self.board.piece_count() > max {
            return None;
        }
        let hit = tablebase.probe(&self.board)?;
        self.shared.tt.store(
            self.board.hash(),
            depth.max(0) as u32,
            score_to_tt(hit.score, ply),
            Bound::Exact,
            hit.best_move,
        );
        Some(hit.score)
    }
}
