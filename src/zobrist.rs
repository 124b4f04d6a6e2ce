//! Zobrist keys for incrementally-updatable 64-bit position hashes.

use once_cell::sync::Lazy;
use rand::prelude::*;

use crate::board::{CastlingRights, Color, Piece, Square};

pub(crate) struct ZobristKeys {
    // piece_keys[piece][color][square]
    piece_keys: [[[u64; 64]; 2]; 6],
    black_to_move: u64,
    // one key per castling-rights mask value
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        // Fixed seed: hashes must be stable across runs for books and tests.
        let mut rng = StdRng::seed_from_u64(1234567890_u64);
        let mut piece_keys = [[[0; 64]; 2]; 6];
        for piece in &mut piece_keys {
            for color in piece.iter_mut() {
                for key in color.iter_mut() {
                    *key = rng.gen();
                }
            }
        }
        let black_to_move = rng.gen();

        // Per-right keys folded into per-mask keys so a rights change is one XOR pair.
        let rights: [u64; 4] = rng.gen();
        let mut castling = [0u64; 16];
        for (mask, key) in castling.iter_mut().enumerate() {
            *key = (0..4)
                .filter(|bit| mask & (1 << bit) != 0)
                .fold(0, |acc, bit| acc ^ rights[bit]);
        }

        let mut en_passant_file = [0u64; 8];
        for key in &mut en_passant_file {
            *key = rng.gen();
        }

        ZobristKeys {
            piece_keys,
            black_to_move,
            castling,
            en_passant_file,
        }
    }

    #[inline]
    pub(crate) fn piece(&self, color: Color, piece: Piece, sq: Square) -> u64 {
        self.piece_keys[piece.index()][color.index()][sq.index()]
    }

    #[inline]
    pub(crate) fn side(&self) -> u64 {
        self.black_to_move
    }

    #[inline]
    pub(crate) fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.as_u8() as usize & 15]
    }

    #[inline]
    pub(crate) fn en_passant(&self, sq: Option<Square>) -> u64 {
        sq.map_or(0, |s| self.en_passant_file[s.file()])
    }
}

pub(crate) static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);
