use super::super::attack_tables::pawn_attacks;
use super::super::{Board, Color, Move, MoveList, Piece, Square, PROMOTION_PIECES};
use super::GenKind;

impl Board {
    pub(crate) fn generate_pawn_moves(&self, kind: GenKind, moves: &mut MoveList) {
        let us = self.side_to_move;
        let enemies = self.occupancy(!us);
        let (start_rank, promo_rank) = match us {
            Color::White => (1, 7),
            Color::Black => (6, 0),
        };

        for from in self.pieces(us, Piece::Pawn).iter() {
            let forward = match us {
                Color::White => from.index() + 8,
                Color::Black => from.index().wrapping_sub(8),
            };
            if forward < 64 {
                let push = Square::from_index(forward);
                if !self.all_occupied.contains(push) {
                    if push.rank() == promo_rank {
                        for piece in PROMOTION_PIECES {
                            moves.push(Move::promotion(from, push, piece, false));
                        }
                    } else if kind == GenKind::All {
                        moves.push(Move::quiet(from, push));
                        if from.rank() == start_rank {
                            let double = Square::new(
                                if us == Color::White { 3 } else { 4 },
                                from.file(),
                            );
                            if !self.all_occupied.contains(double) {
                                moves.push(Move::double_pawn_push(from, double));
                            }
                        }
                    }
                }
            }

            let attacks = pawn_attacks(us, from);
            for to in (attacks & enemies).iter() {
                if to.rank() == promo_rank {
                    for piece in PROMOTION_PIECES {
                        moves.push(Move::promotion(from, to, piece, true));
                    }
                } else {
                    moves.push(Move::capture(from, to));
                }
            }

            if let Some(ep) = self.en_passant {
                if attacks.contains(ep) {
                    moves.push(Move::en_passant(from, ep));
                }
            }
        }
    }
}
