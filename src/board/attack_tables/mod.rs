//! Attack tables for move generation.
//!
//! Sliding attacks use Hyperbola Quintessence (`o^(o-2r)` with a byte
//! swap for the reverse ray); ranks use a 512-entry occupancy lookup.

#![allow(clippy::needless_range_loop)]

mod tables;

use once_cell::sync::Lazy;

use super::types::{Bitboard, Color, Square};
use tables::{KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};

const FILE_A: u64 = 0x0101010101010101;

fn ray_mask(sq: usize, dr: isize, df: isize) -> u64 {
    let mut mask = 0u64;
    for dir in [1isize, -1] {
        let mut r = (sq / 8) as isize;
        let mut f = (sq % 8) as isize;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            mask |= 1u64 << (r * 8 + f);
            r += dr * dir;
            f += df * dir;
        }
    }
    mask
}

/// Diagonal (a1-h8 direction) masks per square, square included.
static DIAG_MASKS: Lazy<[u64; 64]> = Lazy::new(|| {
    let mut masks = [0u64; 64];
    for sq in 0..64 {
        masks[sq] = ray_mask(sq, 1, 1);
    }
    masks
});

/// Anti-diagonal (h1-a8 direction) masks per square, square included.
static ANTI_MASKS: Lazy<[u64; 64]> = Lazy::new(|| {
    let mut masks = [0u64; 64];
    for sq in 0..64 {
        masks[sq] = ray_mask(sq, 1, -1);
    }
    masks
});

/// `RANK_ATTACKS[8 * inner_occupancy + file]`, rank-1 relative.
/// Inner occupancy is the six bits for files b-g.
static RANK_ATTACKS: Lazy<[u64; 512]> = Lazy::new(|| {
    let mut attacks = [0u64; 512];
    for occ in 0..64usize {
        let blocked = |f: usize| (1..=6).contains(&f) && occ & (1 << (f - 1)) != 0;
        for file in 0..8 {
            let mut attack = 0u64;
            for f in (file + 1)..8 {
                attack |= 1u64 << f;
                if blocked(f) {
                    break;
                }
            }
            for f in (0..file).rev() {
                attack |= 1u64 << f;
                if blocked(f) {
                    break;
                }
            }
            attacks[8 * occ + file] = attack;
        }
    }
    attacks
});

#[inline(always)]
fn hyp_quint(occupied: u64, mask: u64, square: usize) -> u64 {
    let piece = 1u64 << square;
    let forward = occupied & mask;
    let backward = forward.swap_bytes();
    let fwd = forward.wrapping_sub(piece.wrapping_mul(2));
    let rev = backward
        .wrapping_sub(piece.swap_bytes().wrapping_mul(2))
        .swap_bytes();
    (fwd ^ rev) & mask & !piece
}

#[inline(always)]
fn rank_attacks(occupied: u64, square: usize) -> u64 {
    let rank = square / 8;
    let inner = ((occupied >> (rank * 8 + 1)) & 63) as usize;
    RANK_ATTACKS[8 * inner + square % 8] << (rank * 8)
}

#[inline]
#[must_use]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let s = sq.index();
    Bitboard(hyp_quint(occupied.0, DIAG_MASKS[s], s) | hyp_quint(occupied.0, ANTI_MASKS[s], s))
}

#[inline]
#[must_use]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let s = sq.index();
    Bitboard(hyp_quint(occupied.0, FILE_A << (s % 8), s) | rank_attacks(occupied.0, s))
}

#[inline]
#[must_use]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

#[inline]
#[must_use]
pub fn knight_attacks(sq: Square) -> Bitboard {
    Bitboard(KNIGHT_ATTACKS[sq.index()])
}

#[inline]
#[must_use]
pub fn king_attacks(sq: Square) -> Bitboard {
    Bitboard(KING_ATTACKS[sq.index()])
}

/// Squares a pawn of `color` standing on `sq` attacks.
#[inline]
#[must_use]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    Bitboard(PAWN_ATTACKS[color.index()][sq.index()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn rook_on_empty_board_sees_rank_and_file() {
        let attacks = rook_attacks(sq("e4"), Bitboard::EMPTY);
        let expected = ((0xFFu64 << 24) | (FILE_A << 4)) & !(1u64 << 28);
        assert_eq!(attacks.0, expected);
    }

    #[test]
    fn bishop_on_empty_board_reaches_corners() {
        let attacks = bishop_attacks(sq("e4"), Bitboard::EMPTY);
        for target in ["b1", "h7", "h1", "a8"] {
            assert!(attacks.contains(sq(target)), "{target}");
        }
        assert!(!attacks.contains(sq("e4")));
        assert_eq!(attacks.popcount(), 13);
    }

    #[test]
    fn rook_stops_at_blockers() {
        let blockers = Bitboard::from_square(sq("e6")) | Bitboard::from_square(sq("c4"));
        let attacks = rook_attacks(sq("e4"), blockers);
        assert!(attacks.contains(sq("e6")));
        assert!(!attacks.contains(sq("e7")));
        assert!(attacks.contains(sq("c4")));
        assert!(!attacks.contains(sq("b4")));
    }

    #[test]
    fn bishop_stops_at_blockers() {
        let attacks = bishop_attacks(sq("e4"), Bitboard::from_square(sq("g6")));
        assert!(attacks.contains(sq("g6")));
        assert!(!attacks.contains(sq("h7")));
    }

    #[test]
    fn queen_is_union_of_rook_and_bishop() {
        let occ = Bitboard(0x00FF_00FF_00FF_00FF);
        for idx in 0..64 {
            let s = Square::from_index(idx);
            assert_eq!(
                queen_attacks(s, occ),
                rook_attacks(s, occ) | bishop_attacks(s, occ)
            );
        }
    }
}
