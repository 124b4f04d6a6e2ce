//! Chess board representation, move generation and search.
//!
//! Positions are bitboard sets with an incrementally maintained Zobrist
//! hash. Moves are applied in place and reverted with an explicit token.
//!
//! # Example
//! ```
//! use supranova::board::Board;
//!
//! let mut board = Board::new();
//! let moves = board.generate_moves();
//! assert_eq!(moves.len(), 20);
//!
//! let mv = board.parse_move("e2e4").unwrap();
//! let undo = board.make_move(mv);
//! board.unmake_move(mv, undo);
//! assert_eq!(board, Board::new());
//! ```

pub mod attack_tables;
mod error;
mod eval;
mod fen;
mod make_unmake;
mod movegen;
pub mod search;
mod see;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use error::{FenError, MoveParseError, SquareError};
pub use eval::{Evaluator, PestoEvaluator, CENTER_BONUS};
pub use fen::STARTING_FEN;
pub use see::SEE_VALUES;
pub use state::{Board, NullMoveInfo, UnmakeInfo};
pub use types::{
    Bitboard, BitboardIter, CastlingRights, Color, Move, MoveList, Piece, ScoredMove,
    ScoredMoveList, Square, MAX_PLY,
};

pub(crate) use types::PROMOTION_PIECES;
