//! Castling rights bitmask.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Color;
use super::square::Square;

pub(crate) const CASTLE_WHITE_K: u8 = 1 << 0;
pub(crate) const CASTLE_WHITE_Q: u8 = 1 << 1;
pub(crate) const CASTLE_BLACK_K: u8 = 1 << 2;
pub(crate) const CASTLE_BLACK_Q: u8 = 1 << 3;

/// Rights kept when a move touches a square. Any move from or to a king
/// or rook home square strips the matching rights.
pub(crate) const fn rights_mask_for(sq: Square) -> u8 {
    match sq.index() {
        0 => !CASTLE_WHITE_Q,
        4 => !(CASTLE_WHITE_K | CASTLE_WHITE_Q),
        7 => !CASTLE_WHITE_K,
        56 => !CASTLE_BLACK_Q,
        60 => !(CASTLE_BLACK_K | CASTLE_BLACK_Q),
        63 => !CASTLE_BLACK_K,
        _ => 0xFF,
    }
}

/// Castling rights as a 4-bit mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastlingRights(u8);

impl CastlingRights {
    #[must_use]
    pub const fn none() -> Self {
        CastlingRights(0)
    }

    #[must_use]
    pub const fn all() -> Self {
        CastlingRights(CASTLE_WHITE_K | CASTLE_WHITE_Q | CASTLE_BLACK_K | CASTLE_BLACK_Q)
    }

    #[inline]
    #[must_use]
    pub const fn has(self, color: Color, kingside: bool) -> bool {
        self.0 & Self::bit_for(color, kingside) != 0
    }

    #[inline]
    pub fn set(&mut self, color: Color, kingside: bool) {
        self.0 |= Self::bit_for(color, kingside);
    }

    /// Drop any rights tied to `from` or `to`.
    #[inline]
    pub(crate) fn update_for_move(&mut self, from: Square, to: Square) {
        self.0 &= rights_mask_for(from) & rights_mask_for(to);
    }

    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    #[inline]
    const fn bit_for(color: Color, kingside: bool) -> u8 {
        match (color, kingside) {
            (Color::White, true) => CASTLE_WHITE_K,
            (Color::White, false) => CASTLE_WHITE_Q,
            (Color::Black, true) => CASTLE_BLACK_K,
            (Color::Black, false) => CASTLE_BLACK_Q,
        }
    }
}
