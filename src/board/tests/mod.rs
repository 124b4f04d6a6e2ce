//! Board module tests.
//!
//! - `perft.rs` - move generator node counts on reference positions
//! - `make_unmake.rs` - make/unmake and null move restore the position
//! - `draw.rs` - fifty-move rule, repetition, insufficient material
//! - `proptest.rs` - properties over random legal games
//! - `search.rs` - tactical and rule behaviour of the search

mod draw;
mod perft;
mod search;
