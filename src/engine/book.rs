//! Opening book lookup.

use std::collections::HashMap;

use crate::board::{Board, Move, MoveParseError};

/// Source of prepared moves consulted before searching.
pub trait OpeningBook: Send + Sync {
    fn lookup(&self, board: &Board) -> Option<Move>;
}

/// A book that knows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBook;

impl OpeningBook for NoBook {
    fn lookup(&self, _board: &Board) -> Option<Move> {
        None
    }
}

/// In-memory book keyed by Zobrist hash.
///
/// Built from lines of long-algebraic moves played from the start
/// position; the first line to reach a position decides its book move.
#[derive(Debug, Default, Clone)]
pub struct HashBook {
    entries: HashMap<u64, Move>,
}

impl HashBook {
    /// Parse `lines`, each a space-separated move sequence such as
    /// `"e2e4 e7e5 g1f3"`.
    pub fn from_lines<'a, I>(lines: I) -> Result<Self, MoveParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut book = HashBook::default();
        for line in lines {
            let mut board = Board::new();
            for notation in line.split_whitespace() {
                let mv = board.parse_move(notation)?;
                book.entries.entry(board.hash()).or_insert(mv);
                board.make_move(mv);
            }
        }
        log::debug!("opening book: {} positions", book.entries.len());
        Ok(book)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OpeningBook for HashBook {
    fn lookup(&self, board: &Board) -> Option<Move> {
        self.entries.get(&board.hash()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_lines_by_position() {
        let book = HashBook::from_lines(["e2e4 e7e5 g1f3", "e2e4 c7c5", "d2d4 d7d5"]).unwrap();
        let mut board = Board::new();
        assert_eq!(book.lookup(&board), Some(board.parse_move("e2e4").unwrap()));

        let e4 = board.parse_move("e2e4").unwrap();
        board.make_move(e4);
        assert_eq!(book.lookup(&board), Some(board.parse_move("e7e5").unwrap()));

        let a6 = board.parse_move("a7a6").unwrap();
        board.make_move(a6);
        assert_eq!(book.lookup(&board), None);
    }

    #[test]
    fn transpositions_share_an_entry() {
        let book = HashBook::from_lines(["g1f3 g8f6 b1c3 b8c6"]).unwrap();
        let mut board = Board::new();
        for uci in ["b1c3", "g8f6", "g1f3"] {
            let mv = board.parse_move(uci).unwrap();
            board.make_move(mv);
        }
        assert_eq!(book.lookup(&board), Some(board.parse_move("b8c6").unwrap()));
    }

    #[test]
    fn illegal_line_is_rejected() {
        assert!(HashBook::from_lines(["e2e5"]).is_err());
        assert!(NoBook.lookup(&Board::new()).is_none());
    }
}
