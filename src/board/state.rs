//! Board state: bitboards, side to move, rights, clocks and hash.

use std::collections::HashMap;

use super::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};
use super::{Bitboard, CastlingRights, Color, Piece, Square};
use crate::zobrist::ZOBRIST;

/// Everything `make_move` destroys that the move itself cannot restore.
#[derive(Clone, Debug)]
pub struct UnmakeInfo {
    pub(crate) captured: Option<Piece>,
    pub(crate) moved: Option<Piece>,
    pub(crate) previous_en_passant: Option<Square>,
    pub(crate) previous_castling_rights: CastlingRights,
    pub(crate) previous_hash: u64,
    pub(crate) previous_halfmove_clock: u32,
    pub(crate) previous_fullmove_number: u32,
    pub(crate) made_hash: u64,
    pub(crate) previous_repetition_count: u32,
}

pub struct NullMoveInfo {
    pub(crate) previous_en_passant: Option<Square>,
    pub(crate) previous_hash: u64,
    pub(crate) previous_halfmove_clock: u32,
}

/// Occurrence counts of every position hash in the game so far.
#[derive(Clone, Debug, Default)]
pub(crate) struct RepetitionTable {
    counts: HashMap<u64, u32>,
}

impl RepetitionTable {
    pub(crate) fn get(&self, hash: u64) -> u32 {
        self.counts.get(&hash).copied().unwrap_or(0)
    }

    pub(crate) fn set(&mut self, hash: u64, count: u32) {
        if count == 0 {
            self.counts.remove(&hash);
        } else {
            self.counts.insert(hash, count);
        }
    }

    pub(crate) fn increment(&mut self, hash: u64) -> u32 {
        let next = self.get(hash).saturating_add(1);
        self.set(hash, next);
        next
    }
}

/// A chess position.
///
/// Invariants: each square is in at most one piece mask, `occupied[c]` is
/// the union of `pieces[c]`, `all_occupied` is the union of both, and
/// `hash` equals [`Board::calculate_hash`].
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) occupied: [Bitboard; 2],
    pub(crate) all_occupied: Bitboard,
    pub(crate) side_to_move: Color,
    pub(crate) en_passant: Option<Square>,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) hash: u64,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) repetitions: RepetitionTable,
}

impl Board {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in back_rank.into_iter().enumerate() {
            board.put_piece(Square::new(0, file), Color::White, piece);
            board.put_piece(Square::new(7, file), Color::Black, piece);
            board.put_piece(Square::new(1, file), Color::White, Piece::Pawn);
            board.put_piece(Square::new(6, file), Color::Black, Piece::Pawn);
        }
        board.castling_rights = CastlingRights::all();
        board.finish_setup();
        board
    }

    pub(crate) fn empty() -> Self {
        Board {
            pieces: [[Bitboard::EMPTY; 6]; 2],
            occupied: [Bitboard::EMPTY; 2],
            all_occupied: Bitboard::EMPTY,
            side_to_move: Color::White,
            en_passant: None,
            castling_rights: CastlingRights::none(),
            hash: 0,
            halfmove_clock: 0,
            fullmove_number: 1,
            repetitions: RepetitionTable::default(),
        }
    }

    /// Recompute the hash and seed the repetition table after a setup.
    pub(crate) fn finish_setup(&mut self) {
        self.hash = self.calculate_hash();
        self.repetitions = RepetitionTable::default();
        self.repetitions.set(self.hash, 1);
    }

    /// Zobrist hash folded from scratch.
    #[must_use]
    pub fn calculate_hash(&self) -> u64 {
        let mut hash = 0u64;
        for color in Color::BOTH {
            for piece in Piece::ALL {
                for sq in self.pieces[color.index()][piece.index()].iter() {
                    hash ^= ZOBRIST.piece(color, piece, sq);
                }
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.side();
        }
        hash ^= ZOBRIST.castling(self.castling_rights);
        hash ^= ZOBRIST.en_passant(self.en_passant);
        hash
    }

    /// Place a piece without touching the hash. Setup only.
    pub(crate) fn put_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bb = Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] |= bb;
        self.occupied[color.index()] |= bb;
        self.all_occupied |= bb;
    }

    #[inline]
    pub(crate) fn add_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        self.put_piece(sq, color, piece);
        self.hash ^= ZOBRIST.piece(color, piece, sq);
    }

    #[inline]
    pub(crate) fn remove_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bb = !Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] &= bb;
        self.occupied[color.index()] &= bb;
        self.all_occupied &= bb;
        self.hash ^= ZOBRIST.piece(color, piece, sq);
    }

    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        if !self.all_occupied.contains(sq) {
            return None;
        }
        let color = if self.occupied[0].contains(sq) {
            Color::White
        } else {
            Color::Black
        };
        Piece::ALL
            .into_iter()
            .find(|p| self.pieces[color.index()][p.index()].contains(sq))
            .map(|p| (color, p))
    }

    #[inline]
    #[must_use]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    #[inline]
    #[must_use]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupied[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn all_occupied(&self) -> Bitboard {
        self.all_occupied
    }

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    #[must_use]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// How often the current position has occurred in this game.
    #[inline]
    #[must_use]
    pub fn repetition_count(&self) -> u32 {
        self.repetitions.get(self.hash)
    }

    #[inline]
    #[must_use]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color, Piece::King).lsb()
    }

    #[must_use]
    pub fn piece_count(&self) -> u32 {
        self.all_occupied.popcount()
    }

    /// Pieces of `by` attacking `sq`, given an occupancy for slider rays.
    #[must_use]
    pub fn attacks_to(&self, sq: Square, by: Color, occupied: Bitboard) -> Bitboard {
        let pieces = &self.pieces[by.index()];
        let diagonal = pieces[Piece::Bishop.index()] | pieces[Piece::Queen.index()];
        let straight = pieces[Piece::Rook.index()] | pieces[Piece::Queen.index()];
        (pawn_attacks(!by, sq) & pieces[Piece::Pawn.index()])
            | (knight_attacks(sq) & pieces[Piece::Knight.index()])
            | (king_attacks(sq) & pieces[Piece::King.index()])
            | (bishop_attacks(sq, occupied) & diagonal)
            | (rook_attacks(sq, occupied) & straight)
    }

    #[inline]
    #[must_use]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        !self.attacks_to(sq, by, self.all_occupied).is_empty()
    }

    #[must_use]
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|k| self.is_square_attacked(k, !color))
    }

    /// Any knight, bishop, rook or queen for `color`.
    #[must_use]
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let pawns_and_king = self.pieces(color, Piece::Pawn) | self.pieces(color, Piece::King);
        self.occupancy(color) != pawns_and_king
    }

    /// Fifty-move rule or threefold repetition.
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.halfmove_clock >= 100 || self.repetition_count() >= 3
    }

    /// Bare kings, or a single minor piece against a bare king.
    #[must_use]
    pub fn is_insufficient_material(&self) -> bool {
        let heavy_or_pawns = Color::BOTH.iter().any(|&c| {
            !(self.pieces(c, Piece::Pawn)
                | self.pieces(c, Piece::Rook)
                | self.pieces(c, Piece::Queen))
            .is_empty()
        });
        !heavy_or_pawns && self.piece_count() <= 3
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

/// Positions compare by placement and state, not by game history.
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.pieces == other.pieces
            && self.occupied == other.occupied
            && self.all_occupied == other.all_occupied
            && self.side_to_move == other.side_to_move
            && self.en_passant == other.en_passant
            && self.castling_rights == other.castling_rights
            && self.hash == other.hash
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
    }
}

impl Eq for Board {}
