//! Search constants.

use crate::board::MAX_PLY;

// ============================================================================
// SCORES
// ============================================================================

/// Bound wider than any reachable score.
pub const INFINITY: i32 = 32_000;

/// Score of delivering mate at the root; mate at ply `p` scores `MATE_SCORE - p`.
pub const MATE_SCORE: i32 = 31_000;

/// Scores with absolute value >= this encode a forced mate.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - MAX_PLY as i32;

// ============================================================================
// SEARCH LIMITS
// ============================================================================

/// Deepest iteration ever started.
pub const MAX_DEPTH: u32 = 64;

/// Quiescence plies below the horizon before stand pat is forced.
pub const MAX_QSEARCH_DEPTH: i32 = 8;

/// Worker 0 polls the clock and node limit once every this many nodes.
pub const CHECK_INTERVAL: u64 = 1024;

// ============================================================================
// ASPIRATION WINDOWS
// ============================================================================

/// First depth searched with a narrowed window.
pub const ASPIRATION_MIN_DEPTH: u32 = 4;

pub const ASPIRATION_DELTA: i32 = 50;

/// Widened re-searches before falling back to the full window.
pub const ASPIRATION_MAX_RETRIES: u32 = 3;

// ============================================================================
// MOVE ORDERING PRIORITIES
// ============================================================================
// Higher scores are tried earlier: TT > good captures > killers > quiets > bad captures

pub const TT_MOVE_SCORE: i32 = 1 << 30;
pub const GOOD_CAPTURE_SCORE: i32 = 1 << 28;
pub const KILLER1_SCORE: i32 = 1 << 27;
pub const KILLER2_SCORE: i32 = (1 << 27) - 1;
pub const BAD_CAPTURE_SCORE: i32 = -(1 << 28);

/// History entries saturate here so quiets never outrank killers.
pub const HISTORY_MAX: i32 = 1 << 26;

// ============================================================================
// PRUNING AND REDUCTIONS
// ============================================================================

pub const NULL_MOVE_MIN_DEPTH: i32 = 3;
pub const NULL_MOVE_BASE_REDUCTION: i32 = 1;

/// LMR applies from this depth, to moves after the first `LMR_MIN_MOVES`.
pub const LMR_MIN_DEPTH: i32 = 3;
pub const LMR_MIN_MOVES: usize = 3;

/// LMR reduction table dimensions (depth x move index).
pub const LMR_TABLE_MAX_DEPTH: usize = 64;
pub const LMR_TABLE_MAX_IDX: usize = 64;

pub const SINGULAR_MIN_DEPTH: i32 = 6;
/// Singular margin per ply of depth.
pub const SINGULAR_MARGIN: i32 = 2;
/// How much shallower than the node a TT entry may be and still seed a singular test.
pub const SINGULAR_TT_DEPTH_SLACK: i32 = 3;
