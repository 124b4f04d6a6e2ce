//! Applying and reverting moves with incremental hash updates.

use super::{Board, Color, Move, NullMoveInfo, Piece, Square, UnmakeInfo};
use crate::zobrist::ZOBRIST;

/// Rook origin and destination for a castle landing on `king_to`.
#[inline]
pub(crate) fn castle_rook_squares(king_to: Square) -> (Square, Square) {
    let rank = king_to.rank();
    if king_to.file() == 6 {
        (Square::new(rank, 7), Square::new(rank, 5))
    } else {
        (Square::new(rank, 0), Square::new(rank, 3))
    }
}

impl Board {
    /// Apply `mv` in place and return the token that reverts it.
    ///
    /// `mv` must come from this position's move generator. A move whose
    /// origin square is empty only passes the turn, so the board stays
    /// consistent and `unmake_move` still restores it exactly.
    pub fn make_move(&mut self, mv: Move) -> UnmakeInfo {
        let us = self.side_to_move;
        let them = !us;
        let (from, to) = (mv.from(), mv.to());

        let mut info = UnmakeInfo {
            captured: None,
            moved: None,
            previous_en_passant: self.en_passant,
            previous_castling_rights: self.castling_rights,
            previous_hash: self.hash,
            previous_halfmove_clock: self.halfmove_clock,
            previous_fullmove_number: self.fullmove_number,
            made_hash: 0,
            previous_repetition_count: 0,
        };

        self.hash ^= ZOBRIST.en_passant(self.en_passant) ^ ZOBRIST.castling(self.castling_rights);
        self.en_passant = None;
        self.halfmove_clock = self.halfmove_clock.saturating_add(1);

        if let Some((_, moving)) = self.piece_at(from) {
            info.moved = Some(moving);

            if mv.is_en_passant() {
                self.remove_piece(Square::new(from.rank(), to.file()), them, Piece::Pawn);
                info.captured = Some(Piece::Pawn);
            } else if mv.is_capture() {
                if let Some((_, victim)) = self.piece_at(to) {
                    self.remove_piece(to, them, victim);
                    info.captured = Some(victim);
                }
            }

            self.remove_piece(from, us, moving);
            self.add_piece(to, us, mv.promotion_piece().unwrap_or(moving));

            if mv.is_castling() {
                let (rook_from, rook_to) = castle_rook_squares(to);
                self.remove_piece(rook_from, us, Piece::Rook);
                self.add_piece(rook_to, us, Piece::Rook);
            }

            if mv.is_double_pawn_push() {
                self.en_passant = Some(Square::new((from.rank() + to.rank()) / 2, from.file()));
            }

            if moving == Piece::Pawn || info.captured.is_some() {
                self.halfmove_clock = 0;
            }
            self.castling_rights.update_for_move(from, to);
        }

        self.hash ^= ZOBRIST.en_passant(self.en_passant)
            ^ ZOBRIST.castling(self.castling_rights)
            ^ ZOBRIST.side();
        if us == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = them;

        info.made_hash = self.hash;
        info.previous_repetition_count = self.repetitions.increment(self.hash) - 1;
        info
    }

    /// Revert `mv`, restoring the exact prior state.
    pub fn unmake_move(&mut self, mv: Move, info: UnmakeInfo) {
        self.repetitions
            .set(info.made_hash, info.previous_repetition_count);
        let us = !self.side_to_move;
        let (from, to) = (mv.from(), mv.to());

        if let Some(moved) = info.moved {
            if mv.is_castling() {
                let (rook_from, rook_to) = castle_rook_squares(to);
                self.remove_piece(rook_to, us, Piece::Rook);
                self.put_piece(rook_from, us, Piece::Rook);
            }

            self.remove_piece(to, us, mv.promotion_piece().unwrap_or(moved));
            self.put_piece(from, us, moved);

            if let Some(victim) = info.captured {
                let victim_sq = if mv.is_en_passant() {
                    Square::new(from.rank(), to.file())
                } else {
                    to
                };
                self.put_piece(victim_sq, !us, victim);
            }
        }

        self.side_to_move = us;
        self.en_passant = info.previous_en_passant;
        self.castling_rights = info.previous_castling_rights;
        self.halfmove_clock = info.previous_halfmove_clock;
        self.fullmove_number = info.previous_fullmove_number;
        self.hash = info.previous_hash;
    }

    /// Pass the turn. Used by null-move pruning; never recorded for repetition.
    pub fn make_null_move(&mut self) -> NullMoveInfo {
        let info = NullMoveInfo {
            previous_en_passant: self.en_passant,
            previous_hash: self.hash,
            previous_halfmove_clock: self.halfmove_clock,
        };
        self.hash ^= ZOBRIST.en_passant(self.en_passant) ^ ZOBRIST.side();
        self.en_passant = None;
        self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        self.side_to_move = !self.side_to_move;
        info
    }

    pub fn unmake_null_move(&mut self, info: NullMoveInfo) {
        self.side_to_move = !self.side_to_move;
        self.en_passant = info.previous_en_passant;
        self.halfmove_clock = info.previous_halfmove_clock;
        self.hash = info.previous_hash;
    }
}
