//! FEN parsing and formatting.

use std::fmt::Write as _;
use std::str::FromStr;

use super::error::FenError;
use super::{Board, CastlingRights, Color, Piece, Square};

/// The standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Board {
    /// Parse a position from FEN. Halfmove and fullmove fields are optional.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidRankCount { found: ranks.len() });
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx;
            let mut file = 0;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                    if file >= 8 {
                        return Err(FenError::TooManyFiles {
                            rank: rank_idx,
                            files: file + 1,
                        });
                    }
                    let color = if c.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    board.put_piece(Square::new(rank, file), color, piece);
                    file += 1;
                }
            }
            if file > 8 {
                return Err(FenError::TooManyFiles {
                    rank: rank_idx,
                    files: file,
                });
            }
        }

        board.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        let mut rights = CastlingRights::none();
        for c in parts[2].chars() {
            match c {
                'K' => rights.set(Color::White, true),
                'Q' => rights.set(Color::White, false),
                'k' => rights.set(Color::Black, true),
                'q' => rights.set(Color::Black, false),
                '-' => {}
                _ => return Err(FenError::InvalidCastling { char: c }),
            }
        }
        board.castling_rights = rights;

        board.en_passant = match parts[3] {
            "-" => None,
            s => {
                let invalid = || FenError::InvalidEnPassant {
                    found: s.to_string(),
                };
                let sq: Square = s.parse().map_err(|_| invalid())?;
                if !board.en_passant_target_plausible(sq) {
                    return Err(invalid());
                }
                Some(sq)
            }
        };

        if let Some(s) = parts.get(4) {
            board.halfmove_clock = s.parse().map_err(|_| FenError::InvalidClock {
                found: (*s).to_string(),
            })?;
        }
        if let Some(s) = parts.get(5) {
            board.fullmove_number = s
                .parse::<u32>()
                .map_err(|_| FenError::InvalidClock {
                    found: (*s).to_string(),
                })?
                .max(1);
        }

        for color in Color::BOTH {
            if board.pieces(color, Piece::King).popcount() != 1 {
                return Err(FenError::MissingKing { color });
            }
        }
        if board.is_in_check(!board.side_to_move) {
            return Err(FenError::OpponentInCheck);
        }

        board.finish_setup();
        Ok(board)
    }

    /// The target must be empty, on the sixth rank from the mover's side,
    /// with the enemy pawn that just double-pushed right behind it.
    fn en_passant_target_plausible(&self, sq: Square) -> bool {
        let (target_rank, pawn_rank) = match self.side_to_move {
            Color::White => (5, 4),
            Color::Black => (2, 3),
        };
        sq.rank() == target_rank
            && self.piece_at(sq).is_none()
            && self.piece_at(Square::new(pawn_rank, sq.file()))
                == Some((!self.side_to_move, Piece::Pawn))
    }

    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(Square::new(rank, file)) {
                    Some((color, piece)) => {
                        if empty > 0 {
                            let _ = write!(fen, "{empty}");
                            empty = 0;
                        }
                        fen.push(piece.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                let _ = write!(fen, "{empty}");
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push_str(match self.side_to_move {
            Color::White => " w ",
            Color::Black => " b ",
        });

        let rights = self.castling_rights;
        let start = fen.len();
        for (color, kingside, c) in [
            (Color::White, true, 'K'),
            (Color::White, false, 'Q'),
            (Color::Black, true, 'k'),
            (Color::Black, false, 'q'),
        ] {
            if rights.has(color, kingside) {
                fen.push(c);
            }
        }
        if fen.len() == start {
            fen.push('-');
        }

        match self.en_passant {
            Some(sq) => {
                let _ = write!(fen, " {sq}");
            }
            None => fen.push_str(" -"),
        }
        let _ = write!(fen, " {} {}", self.halfmove_clock, self.fullmove_number);
        fen
    }
}

impl FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_fen(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_round_trips() {
        let board = Board::from_fen(STARTING_FEN).unwrap();
        assert_eq!(board.to_fen(), STARTING_FEN);
        assert_eq!(board, Board::new());
    }

    #[test]
    fn clocks_are_optional() {
        let board = Board::from_fen("8/8/8/8/8/8/8/K1k5 w - -").unwrap();
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.fullmove_number(), 1);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(
            Board::from_fen("8/8/8 w - -"),
            Err(FenError::InvalidRankCount { found: 3 })
        );
        assert!(matches!(
            Board::from_fen("8/8/8/8/8/8/8/K1k5 x - - 0 1"),
            Err(FenError::InvalidSideToMove { .. })
        ));
        assert!(matches!(
            Board::from_fen("8/8/8/8/8/8/8/K1x5 w - - 0 1"),
            Err(FenError::InvalidPiece { char: 'x' })
        ));
        assert!(matches!(
            Board::from_fen("8/8/8/8/8/8/8/K7 w - - 0 1"),
            Err(FenError::MissingKing {
                color: Color::Black
            })
        ));
    }

    #[test]
    fn en_passant_square_must_follow_a_double_push() {
        let board = Board::from_fen(
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        )
        .unwrap();
        assert_eq!(board.en_passant(), Some("d6".parse().unwrap()));
        let board = Board::from_fen("4k3/8/8/8/3Pp3/8/8/4K3 b - d3 0 1").unwrap();
        assert_eq!(board.en_passant(), Some("d3".parse().unwrap()));

        for fen in [
            // occupied by a rook, wrong rank for white to move
            "4k3/8/8/8/3r4/2P5/8/4K3 w - d4 0 1",
            // right rank, no pawn behind the target
            "4k3/8/8/4P3/8/8/8/4K3 w - d6 0 1",
            // own pawn behind the target
            "4k3/8/8/3P4/8/8/8/4K3 w - d6 0 1",
            // target square occupied
            "4k3/8/3n4/3p4/8/8/8/4K3 w - d6 0 1",
            // black to move needs a rank 3 target
            "4k3/8/8/3pP3/8/8/8/4K3 b - d6 0 1",
        ] {
            assert!(
                matches!(Board::from_fen(fen), Err(FenError::InvalidEnPassant { .. })),
                "accepted {fen}"
            );
        }
    }

    #[test]
    fn rejects_side_not_to_move_in_check() {
        assert_eq!(
            Board::from_fen("k7/8/8/8/8/8/8/R3K3 b - - 0 1").map(|b| b.to_fen()),
            Ok("k7/8/8/8/8/8/8/R3K3 b - - 0 1".to_string())
        );
        assert_eq!(
            Board::from_fen("k7/8/8/8/8/8/8/R3K3 w - - 0 1"),
            Err(FenError::OpponentInCheck)
        );
    }
}
