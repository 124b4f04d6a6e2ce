//! Static Exchange Evaluation (SEE).
//!
//! Plays out the capture sequence on one square, least valuable attacker
//! first, and minimaxes the swap list. X-rays appear naturally because the
//! attacker set is recomputed from the shrinking occupancy.

use super::{Bitboard, Board, Color, Move, Piece, Square};

/// Piece values used for exchange arithmetic.
pub const SEE_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 20000];

#[inline]
fn see_value(piece: Piece) -> i32 {
    SEE_VALUES[piece.index()]
}

impl Board {
    /// Net material the side to move gains by playing `mv` and letting
    /// both sides recapture on the destination square for as long as it
    /// pays. Quiet non-promotions score 0.
    #[must_use]
    pub fn see(&self, mv: Move) -> i32 {
        let (from, to) = (mv.from(), mv.to());
        let Some((us, attacker)) = self.piece_at(from) else {
            return 0;
        };

        let mut occupied = self.all_occupied ^ Bitboard::from_square(from);
        let victim_value = if mv.is_en_passant() {
            occupied ^= Bitboard::from_square(Square::new(from.rank(), to.file()));
            see_value(Piece::Pawn)
        } else {
            self.piece_at(to).map_or(0, |(_, p)| see_value(p))
        };

        let mut gain = [0i32; 32];
        gain[0] = victim_value;
        // Value of the piece now standing on `to`, exposed to recapture.
        let mut on_square = see_value(attacker);
        if let Some(promo) = mv.promotion_piece() {
            gain[0] += see_value(promo) - see_value(Piece::Pawn);
            on_square = see_value(promo);
        }

        let mut side = !us;
        let mut depth = 0;
        loop {
            let attackers = self.attacks_to(to, side, occupied) & occupied;
            let Some((piece, bb)) = self.least_valuable(attackers, side) else {
                break;
            };
            // A king may only recapture onto an undefended square.
            if piece == Piece::King
                && !(self.attacks_to(to, !side, occupied) & occupied).is_empty()
            {
                break;
            }
            depth += 1;
            if depth >= gain.len() {
                break;
            }
            gain[depth] = on_square - gain[depth - 1];
            if (-gain[depth - 1]).max(gain[depth]) < 0 {
                break;
            }
            occupied ^= bb;
            on_square = see_value(piece);
            side = !side;
        }

        while depth > 0 {
            gain[depth - 1] = -(-gain[depth - 1]).max(gain[depth]);
            depth -= 1;
        }
        gain[0]
    }

    fn least_valuable(&self, attackers: Bitboard, color: Color) -> Option<(Piece, Bitboard)> {
        Piece::ALL.into_iter().find_map(|piece| {
            let set = attackers & self.pieces(color, piece);
            (!set.is_empty()).then(|| (piece, set.lowest()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn see_of(fen: &str, uci: &str) -> i32 {
        let board = Board::from_fen(fen).unwrap();
        let mv = board.parse_move(uci).unwrap();
        board.see(mv)
    }

    #[test]
    fn undefended_pawn_wins_a_pawn() {
        assert_eq!(see_of("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", "e4d5"), 100);
    }

    #[test]
    fn pawn_trade_is_even() {
        assert_eq!(see_of("4k3/8/2p5/3p4/4P3/8/8/4K3 w - - 0 1", "e4d5"), 0);
    }

    #[test]
    fn knight_for_defended_pawn_loses() {
        assert_eq!(see_of("4k3/8/2p5/3p4/8/4N3/8/4K3 w - - 0 1", "e3d5"), -220);
    }

    #[test]
    fn queen_for_defended_pawn_loses_heavily() {
        assert_eq!(see_of("4k3/8/2p5/3p4/4Q3/8/8/4K3 w - - 0 1", "e4d5"), -800);
    }

    #[test]
    fn xray_rook_backs_up_first_capture() {
        // Rxd8 Rxd8 Rxd8: white wins a rook net.
        assert_eq!(see_of("3r2k1/3r4/8/8/8/8/3R4/3R2K1 w - - 0 1", "d2d7"), 500);
    }

    #[test]
    fn en_passant_counts_the_pawn() {
        assert_eq!(
            see_of("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", "e5d6"),
            100
        );
    }

    #[test]
    fn quiet_move_is_zero() {
        assert_eq!(see_of(crate::board::STARTING_FEN, "g1f3"), 0);
    }
}
