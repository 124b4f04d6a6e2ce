//! Move ordering: killer moves, history heuristic and move scoring.
//!
//! Both tables are owned by one search worker and reset at the start of
//! every top-level search.

use super::constants::{
    BAD_CAPTURE_SCORE, GOOD_CAPTURE_SCORE, HISTORY_MAX, KILLER1_SCORE, KILLER2_SCORE,
    TT_MOVE_SCORE,
};
use crate::board::{Board, Move, MoveList, ScoredMoveList, MAX_PLY};

/// Two quiet moves per ply that recently caused a beta cutoff.
pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KillerTable {
    #[must_use]
    pub fn new() -> Self {
        KillerTable {
            slots: [[Move::null(); 2]; MAX_PLY],
        }
    }

    #[must_use]
    pub fn primary(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(Move::null(), |row| row[0])
    }

    #[must_use]
    pub fn secondary(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(Move::null(), |row| row[1])
    }

    #[must_use]
    pub fn is_killer(&self, ply: usize, mv: Move) -> bool {
        self.slots.get(ply).is_some_and(|row| row.contains(&mv))
    }

    /// Record `mv` as the most recent killer, demoting the previous one.
    pub fn update(&mut self, ply: usize, mv: Move) {
        let Some(row) = self.slots.get_mut(ply) else {
            return;
        };
        if row[0] != mv {
            row[1] = row[0];
            row[0] = mv;
        }
    }

    pub fn reset(&mut self) {
        self.slots = [[Move::null(); 2]; MAX_PLY];
    }
}

/// Cutoff counts indexed by `[from][to]`.
pub struct HistoryTable {
    entries: [i32; 4096],
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryTable {
    #[must_use]
    pub fn new() -> Self {
        HistoryTable { entries: [0; 4096] }
    }

    #[inline]
    fn index(mv: Move) -> usize {
        mv.from().index() * 64 + mv.to().index()
    }

    #[must_use]
    pub fn score(&self, mv: Move) -> i32 {
        self.entries[Self::index(mv)]
    }

    /// Credit a quiet move that failed high at `depth`. Never decremented.
    pub fn update(&mut self, mv: Move, depth: i32) {
        let entry = &mut self.entries[Self::index(mv)];
        *entry = entry.saturating_add(depth * depth).min(HISTORY_MAX);
    }

    pub fn reset(&mut self) {
        self.entries = [0; 4096];
    }
}

/// Per-worker ordering state.
#[derive(Default)]
pub struct OrderingTables {
    pub killers: KillerTable,
    pub history: HistoryTable,
}

impl OrderingTables {
    pub fn reset(&mut self) {
        self.killers.reset();
        self.history.reset();
    }

    /// Record a beta cutoff. Captures and promotions leave the tables alone.
    pub fn record_cutoff(&mut self, mv: Move, ply: usize, depth: i32) {
        if mv.is_quiet() {
            self.killers.update(ply, mv);
            self.history.update(mv, depth);
        }
    }

    /// Score every move for selection at an interior node.
    pub fn score_moves(
        &self,
        board: &Board,
        moves: &MoveList,
        tt_move: Option<Move>,
        ply: usize,
    ) -> ScoredMoveList {
        let mut scored = ScoredMoveList::new();
        for &mv in moves {
            let score = if Some(mv) == tt_move {
                TT_MOVE_SCORE
            } else if mv.is_capture() || mv.is_promotion() {
                capture_score(board, mv)
            } else if mv == self.killers.primary(ply) {
                KILLER1_SCORE
            } else if mv == self.killers.secondary(ply) {
                KILLER2_SCORE
            } else {
                self.history.score(mv)
            };
            scored.push(mv, score);
        }
        scored
    }
}

/// Captures and promotions by SEE: winning or even ones ahead of killers,
/// losing ones behind every quiet move.
#[must_use]
pub fn capture_score(board: &Board, mv: Move) -> i32 {
    let see = board.see(mv);
    if see >= 0 {
        GOOD_CAPTURE_SCORE + see
    } else {
        BAD_CAPTURE_SCORE + see
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    fn quiet(from: usize, to: usize) -> Move {
        Move::quiet(Square::from_index(from), Square::from_index(to))
    }

    #[test]
    fn killers_keep_two_most_recent() {
        let mut killers = KillerTable::new();
        killers.update(3, quiet(1, 2));
        killers.update(3, quiet(3, 4));
        killers.update(3, quiet(3, 4));
        assert_eq!(killers.primary(3), quiet(3, 4));
        assert_eq!(killers.secondary(3), quiet(1, 2));
        killers.update(3, quiet(5, 6));
        assert!(!killers.is_killer(3, quiet(1, 2)));
        assert!(killers.is_killer(3, quiet(3, 4)));
        assert!(!killers.is_killer(4, quiet(3, 4)));
    }

    #[test]
    fn history_accumulates_depth_squared() {
        let mut history = HistoryTable::new();
        history.update(quiet(12, 28), 3);
        history.update(quiet(12, 28), 4);
        assert_eq!(history.score(quiet(12, 28)), 9 + 16);
        history.reset();
        assert_eq!(history.score(quiet(12, 28)), 0);
    }

    #[test]
    fn ordering_follows_priority_classes() {
        // exd5 trades evenly, Qxd5 loses the queen to cxd5.
        let board = Board::from_fen("4k3/8/2p5/3p4/4P3/8/3Q4/4K3 w - - 0 1").unwrap();
        let moves = board.generate_moves();
        let mut tables = OrderingTables::default();
        let killer = board.parse_move("d2d3").unwrap();
        let tt_move = board.parse_move("e1f1").unwrap();
        tables.killers.update(0, killer);

        let mut scored = tables.score_moves(&board, &moves, Some(tt_move), 0);
        let order: Vec<Move> = (0..scored.len())
            .filter_map(|i| scored.pick_best(i))
            .map(|s| s.mv)
            .collect();

        let pos = |uci: &str| {
            let mv = board.parse_move(uci).unwrap();
            order.iter().position(|&m| m == mv).unwrap()
        };
        assert_eq!(pos("e1f1"), 0);
        assert_eq!(pos("e4d5"), 1);
        assert_eq!(pos("d2d3"), 2);
        assert_eq!(pos("d2d5"), order.len() - 1);
    }
}
