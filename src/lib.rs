//! Supranova: a UCI chess engine.
//!
//! The [`board`] module holds the position, move generation, static
//! exchange evaluation and the parallel search. [`tt`] is the shared
//! transposition table, [`engine`] drives searches against a clock, and
//! [`uci`] speaks the protocol.

pub mod board;
pub mod engine;
pub mod sync;
pub mod timer;
pub mod tt;
pub mod uci;
mod zobrist;

pub use board::search::{SearchLimits, SearchResult};
pub use board::{Board, Color, Move, Piece, Square};
pub use engine::{EngineConfig, EngineController, GoParams};
pub use tt::TranspositionTable;
