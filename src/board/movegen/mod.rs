//! Move generation.
//!
//! Pseudo-legal moves come from the per-piece generators; a move is legal
//! iff the mover's king is not attacked afterwards. That test is done on a
//! scratch occupancy rather than by playing the move.

mod kings;
mod knights;
mod pawns;
mod sliders;

use super::error::MoveParseError;
use super::{Bitboard, Board, Move, MoveList, Piece, Square};

/// Which moves a generator should emit.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum GenKind {
    All,
    /// Captures and promotions only.
    Tactical,
}

impl Board {
    fn generate_pseudo_moves(&self, kind: GenKind, moves: &mut MoveList) {
        self.generate_pawn_moves(kind, moves);
        self.generate_knight_moves(kind, moves);
        self.generate_slider_moves(kind, moves);
        self.generate_king_moves(kind, moves);
    }

    /// Target squares allowed for non-pawn pieces.
    #[inline]
    pub(crate) fn target_mask(&self, kind: GenKind) -> Bitboard {
        let us = self.side_to_move;
        match kind {
            GenKind::All => !self.occupancy(us),
            GenKind::Tactical => self.occupancy(!us),
        }
    }

    /// Push a quiet move or capture depending on what stands on `to`.
    #[inline]
    pub(crate) fn push_normal(&self, from: Square, to: Square, moves: &mut MoveList) {
        if self.occupancy(!self.side_to_move).contains(to) {
            moves.push(Move::capture(from, to));
        } else {
            moves.push(Move::quiet(from, to));
        }
    }

    /// True when playing `mv` leaves the mover's king safe.
    #[must_use]
    pub fn is_legal(&self, mv: Move) -> bool {
        let us = self.side_to_move;
        let (from, to) = (mv.from(), mv.to());
        let from_bb = Bitboard::from_square(from);
        let to_bb = Bitboard::from_square(to);

        let king_sq = if self.pieces(us, Piece::King).contains(from) {
            to
        } else {
            match self.king_square(us) {
                Some(k) => k,
                None => return true,
            }
        };

        let mut occupied = (self.all_occupied ^ from_bb) | to_bb;
        let mut removed = to_bb;
        if mv.is_en_passant() {
            let victim = Bitboard::from_square(Square::new(from.rank(), to.file()));
            occupied ^= victim;
            removed |= victim;
        }
        (self.attacks_to(king_sq, !us, occupied) & !removed).is_empty()
    }

    /// All legal moves in the position.
    #[must_use]
    pub fn generate_moves(&self) -> MoveList {
        self.generate_legal(GenKind::All)
    }

    /// Legal captures and promotions.
    #[must_use]
    pub fn generate_tactical_moves(&self) -> MoveList {
        self.generate_legal(GenKind::Tactical)
    }

    fn generate_legal(&self, kind: GenKind) -> MoveList {
        let mut moves = MoveList::new();
        self.generate_pseudo_moves(kind, &mut moves);
        let mut i = 0;
        while i < moves.len() {
            if self.is_legal(moves[i]) {
                i += 1;
            } else {
                moves.swap_remove(i);
            }
        }
        moves
    }

    /// Does `mv` give check? Plays and reverts it.
    pub fn gives_check(&mut self, mv: Move) -> bool {
        let info = self.make_move(mv);
        let check = self.is_in_check(self.side_to_move);
        self.unmake_move(mv, info);
        check
    }

    /// Leaf count of the legal move tree to `depth`.
    pub fn perft(&mut self, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.generate_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for &mv in moves.iter() {
            let info = self.make_move(mv);
            nodes += self.perft(depth - 1);
            self.unmake_move(mv, info);
        }
        nodes
    }

    /// Resolve long algebraic notation (`e2e4`, `e7e8q`) to a legal move.
    pub fn parse_move(&self, notation: &str) -> Result<Move, MoveParseError> {
        if !(4..=5).contains(&notation.len()) || !notation.is_ascii() {
            return Err(MoveParseError::InvalidLength {
                len: notation.len(),
            });
        }
        let invalid_square = || MoveParseError::InvalidSquare {
            notation: notation.to_string(),
        };
        let from: Square = notation[0..2].parse().map_err(|_| invalid_square())?;
        let to: Square = notation[2..4].parse().map_err(|_| invalid_square())?;
        let promotion = match notation[4..].chars().next() {
            None => None,
            Some(c) => match Piece::from_char(c) {
                Some(p @ (Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen)) => Some(p),
                _ => return Err(MoveParseError::InvalidPromotion { char: c }),
            },
        };

        self.generate_moves()
            .iter()
            .copied()
            .find(|m| m.from() == from && m.to() == to && m.promotion_piece() == promotion)
            .ok_or_else(|| MoveParseError::IllegalMove {
                notation: notation.to_string(),
            })
    }
}
