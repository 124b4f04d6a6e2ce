//! Core chess value types: pieces, colors, squares, bitboards, moves and
//! castling rights.

mod bitboard;
mod castling;
mod moves;
mod piece;
mod square;

pub use bitboard::{Bitboard, BitboardIter};
pub use castling::CastlingRights;
pub use moves::{Move, MoveList, ScoredMove, ScoredMoveList, MAX_PLY};
pub use piece::{Color, Piece};
pub use square::Square;

pub(crate) use piece::PROMOTION_PIECES;
