use super::super::attack_tables::king_attacks;
use super::super::{Bitboard, Board, Move, MoveList, Piece, Square};
use super::GenKind;

impl Board {
    pub(crate) fn generate_king_moves(&self, kind: GenKind, moves: &mut MoveList) {
        let us = self.side_to_move;
        let Some(from) = self.king_square(us) else {
            return;
        };
        for to in (king_attacks(from) & self.target_mask(kind)).iter() {
            self.push_normal(from, to, moves);
        }
        if kind == GenKind::All {
            self.generate_castling(from, moves);
        }
    }

    /// Castling checks run cheapest first: rights and rook, empty squares
    /// between king and rook, king not in check, then the king's path and
    /// destination not attacked.
    fn generate_castling(&self, from: Square, moves: &mut MoveList) {
        let us = self.side_to_move;
        let rank = us.back_rank();
        if from != Square::new(rank, 4) {
            return;
        }
        let rooks = self.pieces(us, Piece::Rook);

        for kingside in [true, false] {
            if !self.castling_rights.has(us, kingside) {
                continue;
            }
            let (rook_file, between, path): (usize, &[usize], [usize; 2]) = if kingside {
                (7, &[5, 6], [5, 6])
            } else {
                (0, &[1, 2, 3], [3, 2])
            };
            if !rooks.contains(Square::new(rank, rook_file)) {
                continue;
            }
            let between_bb = between
                .iter()
                .fold(Bitboard::EMPTY, |bb, &f| bb | Bitboard::from_square(Square::new(rank, f)));
            if !(self.all_occupied & between_bb).is_empty() {
                continue;
            }
            if self.is_square_attacked(from, !us)
                || path
                    .iter()
                    .any(|&f| self.is_square_attacked(Square::new(rank, f), !us))
            {
                continue;
            }
            moves.push(Move::castle(from, Square::new(rank, path[1]), kingside));
        }
    }
}
