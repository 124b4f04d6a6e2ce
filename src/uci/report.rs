use std::fmt::Write as _;

use crate::board::search::{SearchInfo, SearchResult};

/// `info depth .. pv ..` line for one reported line of an iteration.
#[must_use]
pub fn info_line(info: &SearchInfo) -> String {
    let mut line = format!(
        "info depth {} seldepth {} multipv {} score {} nodes {} nps {} hashfull {} time {}",
        info.depth,
        info.seldepth,
        info.multipv,
        info.score,
        info.nodes,
        info.nps,
        info.hashfull,
        info.time_ms
    );
    if !info.pv.is_empty() {
        line.push_str(" pv");
        for mv in &info.pv {
            let _ = write!(line, " {mv}");
        }
    }
    line
}

#[must_use]
pub fn bestmove_line(result: &SearchResult) -> String {
    match (result.best_move, result.ponder_move) {
        (Some(best), Some(ponder)) => format!("bestmove {best} ponder {ponder}"),
        (Some(best), None) => format!("bestmove {best}"),
        (None, _) => "bestmove (none)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::search::Score;
    use crate::board::Board;

    #[test]
    fn info_line_layout() {
        let board = Board::new();
        let pv = vec![board.parse_move("e2e4").unwrap()];
        let info = SearchInfo {
            depth: 5,
            seldepth: 9,
            multipv: 1,
            score: Score::Mate(-2),
            nodes: 1234,
            nps: 5000,
            hashfull: 12,
            time_ms: 246,
            pv,
        };
        assert_eq!(
            info_line(&info),
            "info depth 5 seldepth 9 multipv 1 score mate -2 nodes 1234 nps 5000 hashfull 12 time 246 pv e2e4"
        );
    }

    #[test]
    fn bestmove_variants() {
        let board = Board::new();
        let best = board.parse_move("g1f3").ok();
        let mut result = SearchResult {
            best_move: best,
            ponder_move: None,
            score: 0,
            depth: 1,
            nodes: 10,
        };
        assert_eq!(bestmove_line(&result), "bestmove g1f3");
        result.best_move = None;
        assert_eq!(bestmove_line(&result), "bestmove (none)");
    }
}
