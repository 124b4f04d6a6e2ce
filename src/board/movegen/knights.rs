use super::super::attack_tables::knight_attacks;
use super::super::{Board, MoveList, Piece};
use super::GenKind;

impl Board {
    pub(crate) fn generate_knight_moves(&self, kind: GenKind, moves: &mut MoveList) {
        let targets = self.target_mask(kind);
        for from in self.pieces(self.side_to_move, Piece::Knight).iter() {
            for to in (knight_attacks(from) & targets).iter() {
                self.push_normal(from, to, moves);
            }
        }
    }
}
