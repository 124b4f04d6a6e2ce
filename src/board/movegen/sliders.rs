use super::super::attack_tables::{bishop_attacks, queen_attacks, rook_attacks};
use super::super::{Bitboard, Board, MoveList, Piece, Square};
use super::GenKind;

impl Board {
    pub(crate) fn generate_slider_moves(&self, kind: GenKind, moves: &mut MoveList) {
        let us = self.side_to_move;
        let targets = self.target_mask(kind);
        let sliders: [(Piece, fn(Square, Bitboard) -> Bitboard); 3] = [
            (Piece::Bishop, bishop_attacks),
            (Piece::Rook, rook_attacks),
            (Piece::Queen, queen_attacks),
        ];
        for (piece, attacks) in sliders {
            for from in self.pieces(us, piece).iter() {
                for to in (attacks(from, self.all_occupied) & targets).iter() {
                    self.push_normal(from, to, moves);
                }
            }
        }
    }
}
