//! Endgame tablebase probing.
//!
//! The search only needs an exact score (and optionally a move) for
//! positions with few pieces; how the answer is obtained is up to the
//! implementation.

use crate::board::{Board, Move};

/// An exact result for the probed position, side-to-move perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablebaseHit {
    pub score: i32,
    pub best_move: Option<Move>,
}

pub trait Tablebase: Send + Sync {
    /// Largest piece count (kings included) the tables cover.
    fn max_pieces(&self) -> u32;

    fn probe(&self, board: &Board) -> Option<TablebaseHit>;
}

/// No tables installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTablebase;

impl Tablebase for NoTablebase {
    fn max_pieces(&self) -> u32 {
        0
    }

    fn probe(&self, _board: &Board) -> Option<TablebaseHit> {
        None
    }
}
