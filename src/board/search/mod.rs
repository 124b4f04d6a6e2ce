//! Parallel principal-variation search.
//!
//! Features:
//! - Iterative deepening with aspiration windows and MultiPV
//! - PVS with null move pruning, LMR and singular extensions
//! - Check extension and mate distance pruning
//! - Quiescence search with SEE pruning and quiet checks
//! - Move ordering (TT move, SEE captures, killers, history)
//! - Lazy SMP over a shared transposition table

mod constants;
mod ordering;
mod pvs;
pub mod smp;

use std::fmt;
use std::sync::Arc;

use super::Move;

pub use constants::{INFINITY, MATE_SCORE, MATE_THRESHOLD, MAX_DEPTH};
pub use ordering::{capture_score, HistoryTable, KillerTable, OrderingTables};
pub use smp::{smp_search, SharedSearchState};

/// A search score as reported to the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawns from the side to move's view.
    Cp(i32),
    /// Mate in this many moves; negative when the side to move is mated.
    Mate(i32),
}

impl Score {
    #[must_use]
    pub fn from_raw(score: i32) -> Self {
        if score >= MATE_THRESHOLD {
            Score::Mate((MATE_SCORE - score + 1) / 2)
        } else if score <= -MATE_THRESHOLD {
            Score::Mate(-(MATE_SCORE + score + 1) / 2)
        } else {
            Score::Cp(score)
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Cp(cp) => write!(f, "cp {cp}"),
            Score::Mate(n) => write!(f, "mate {n}"),
        }
    }
}

/// Limits that are not time: depth, nodes, MultiPV and draw bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: u32,
    pub node_limit: Option<u64>,
    pub multi_pv: usize,
    /// Centipawns a draw is worth less than equality to the searching side.
    pub contempt: i32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_depth: MAX_DEPTH,
            node_limit: None,
            multi_pv: 1,
            contempt: 0,
        }
    }
}

impl SearchLimits {
    #[must_use]
    pub fn depth(max_depth: u32) -> Self {
        SearchLimits {
            max_depth: max_depth.clamp(1, MAX_DEPTH),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_nodes(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    #[must_use]
    pub fn with_multi_pv(mut self, lines: usize) -> Self {
        self.multi_pv = lines.max(1);
        self
    }

    #[must_use]
    pub fn with_contempt(mut self, contempt: i32) -> Self {
        self.contempt = contempt;
        self
    }
}

/// Progress report for one completed line of one iteration.
#[derive(Debug, Clone)]
pub struct SearchInfo {
    pub depth: u32,
    pub seldepth: u32,
    /// 1-based index of this line among the MultiPV lines.
    pub multipv: usize,
    pub score: Score,
    pub nodes: u64,
    pub nps: u64,
    /// Per mille.
    pub hashfull: u32,
    pub time_ms: u64,
    pub pv: Vec<Move>,
}

pub type InfoCallback = Arc<dyn Fn(&SearchInfo) + Send + Sync>;

/// Outcome of a top-level search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` only when the root has no legal move.
    pub best_move: Option<Move>,
    pub ponder_move: Option<Move>,
    /// Raw score of the best line, side to move's view.
    pub score: i32,
    /// Deepest completed iteration.
    pub depth: u32,
    pub nodes: u64,
}
