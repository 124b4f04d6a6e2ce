//! Draw detection tests.

use crate::board::Board;

fn apply(board: &mut Board, moves: &[&str]) {
    for notation in moves {
        let mv = board.parse_move(notation).expect("move should be legal");
        board.make_move(mv);
    }
}

#[test]
fn test_fen_halfmove_parsing() {
    let board = Board::from_fen("8/8/8/8/8/8/8/K1k5 w - - 57 1").unwrap();
    assert_eq!(board.halfmove_clock(), 57);
    assert!(!board.is_draw());
}

#[test]
fn test_fifty_move_rule_draw() {
    let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 100 80").unwrap();
    assert!(board.is_draw());
    assert!(!board.is_insufficient_material());
}

#[test]
fn test_halfmove_resets_on_pawn_move() {
    let mut board = Board::from_fen("4k3/8/8/8/8/8/4P3/K7 w - - 99 1").unwrap();
    apply(&mut board, &["e2e4"]);
    assert_eq!(board.halfmove_clock(), 0);
    assert!(!board.is_draw());
}

#[test]
fn test_repetition_counting() {
    let mut board = Board::new();
    assert_eq!(board.repetition_count(), 1);
    apply(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert_eq!(board.repetition_count(), 2);
    assert!(!board.is_draw());
    apply(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert_eq!(board.repetition_count(), 3);
    assert!(board.is_draw());
}

#[test]
fn test_unmake_forgets_repetition() {
    let mut board = Board::new();
    apply(&mut board, &["g1f3", "g8f6", "f3g1"]);
    let mv = board.parse_move("f6g8").unwrap();
    let info = board.make_move(mv);
    assert_eq!(board.repetition_count(), 2);
    board.unmake_move(mv, info);
    apply(&mut board, &["b8c6"]);
    assert_eq!(board.repetition_count(), 1);
}

#[test]
fn test_insufficient_material() {
    let cases = [
        ("8/8/8/8/8/8/8/K1k5 w - - 0 1", true),
        ("8/8/8/8/8/8/6N1/K1k5 w - - 0 1", true),
        ("8/8/8/8/8/8/6b1/K1k5 w - - 0 1", true),
        ("8/8/8/8/8/8/5NN1/K1k5 w - - 0 1", false),
        ("8/8/8/8/8/8/6P1/K1k5 w - - 0 1", false),
        ("8/8/8/8/8/8/6R1/K1k5 w - - 0 1", false),
    ];
    for (fen, expected) in cases {
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(board.is_insufficient_material(), expected, "{fen}");
    }
}
