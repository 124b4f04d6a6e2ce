//! Engine controller: owns the game position, the shared tables and the
//! collaborators, and runs searches on a coordinator thread.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::book::{NoBook, OpeningBook};
use super::tablebase::{NoTablebase, Tablebase};
use super::time::{TimeControl, TimeManager};
use crate::board::search::{
    smp_search, InfoCallback, SearchLimits, SearchResult, SharedSearchState, MAX_DEPTH,
};
use crate::board::{Board, Evaluator, Move, PestoEvaluator};
use crate::sync::StopFlag;
use crate::timer::spawn_deadline_timer;
use crate::tt::{TranspositionTable, TtError};

/// Poll interval while holding a finished result for `stop` or `ponderhit`.
const HOLD_POLL_MS: u64 = 5;

pub const MAX_THREADS: usize = 512;
pub const MAX_HASH_MB: usize = 4096;
pub const MAX_MULTI_PV: usize = 5;

/// Engine settings that outlive a single search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub threads: usize,
    pub hash_mb: usize,
    pub multi_pv: usize,
    pub ponder: bool,
    /// Safety margin subtracted from every timed budget.
    pub move_overhead_ms: u64,
    pub contempt: i32,
    /// Applied when a `go` request carries no node limit of its own.
    pub node_limit: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            threads: 1,
            hash_mb: 64,
            multi_pv: 1,
            ponder: false,
            move_overhead_ms: 30,
            contempt: 0,
            node_limit: None,
        }
    }
}

/// Limits of one `go` request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoParams {
    pub time: TimeControl,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub ponder: bool,
    pub infinite: bool,
}

impl GoParams {
    #[must_use]
    pub fn depth(depth: u32) -> Self {
        GoParams {
            depth: Some(depth),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn move_time(ms: u64) -> Self {
        GoParams {
            time: TimeControl::MoveTime { time_ms: ms },
            ..Default::default()
        }
    }
}

/// A search running on the coordinator thread.
pub struct SearchJob {
    /// Halts the workers.
    stop: StopFlag,
    /// Lets a held result through to the caller.
    release: StopFlag,
    pondering: Arc<AtomicBool>,
    /// Budget armed by `ponderhit`.
    ponder_budget: Option<Duration>,
    handle: JoinHandle<()>,
}

impl SearchJob {
    pub fn signal_stop(&self) {
        self.stop.stop();
        self.release.stop();
        self.pondering.store(false, Ordering::Relaxed);
    }

    pub fn stop_and_wait(self) {
        self.signal_stop();
        if self.handle.join().is_err() {
            log::error!("search coordinator panicked");
        }
    }

    /// The opponent played the expected move: keep searching, now on the
    /// clock.
    pub fn ponderhit(&self) {
        if self.pondering.swap(false, Ordering::Relaxed) {
            if let Some(budget) = self.ponder_budget {
                spawn_deadline_timer(Instant::now() + budget, self.stop.clone());
            }
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

pub struct EngineController {
    board: Board,
    config: EngineConfig,
    tt: Arc<TranspositionTable>,
    evaluator: Arc<dyn Evaluator>,
    book: Arc<dyn OpeningBook>,
    tablebase: Arc<dyn Tablebase>,
    info_callback: Option<InfoCallback>,
    current_job: Option<SearchJob>,
}

impl EngineController {
    /// Build an engine at the start position. Fails if the table cannot
    /// be allocated.
    pub fn try_new(config: EngineConfig) -> Result<Self, TtError> {
        let tt = TranspositionTable::try_new(config.hash_mb)?;
        Ok(EngineController {
            board: Board::new(),
            config,
            tt: Arc::new(tt),
            evaluator: Arc::new(PestoEvaluator),
            book: Arc::new(NoBook),
            tablebase: Arc::new(NoTablebase),
            info_callback: None,
            current_job: None,
        })
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn set_board(&mut self, board: Board) {
        self.stop_search();
        self.board = board;
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn tt(&self) -> &Arc<TranspositionTable> {
        &self.tt
    }

    pub fn set_evaluator(&mut self, evaluator: Arc<dyn Evaluator>) {
        self.evaluator = evaluator;
    }

    pub fn set_book(&mut self, book: Arc<dyn OpeningBook>) {
        self.book = book;
    }

    pub fn set_tablebase(&mut self, tablebase: Arc<dyn Tablebase>) {
        self.tablebase = tablebase;
    }

    pub fn set_info_callback(&mut self, callback: Option<InfoCallback>) {
        self.info_callback = callback;
    }

    /// Takes effect on the next search.
    pub fn set_threads(&mut self, threads: usize) {
        self.config.threads = threads.clamp(1, MAX_THREADS);
        log::info!("threads set to {}", self.config.threads);
    }

    pub fn set_multi_pv(&mut self, lines: usize) {
        self.config.multi_pv = lines.clamp(1, MAX_MULTI_PV);
    }

    pub fn set_ponder(&mut self, ponder: bool) {
        self.config.ponder = ponder;
    }

    pub fn set_move_overhead(&mut self, ms: u64) {
        self.config.move_overhead_ms = ms;
    }

    pub fn set_contempt(&mut self, contempt: i32) {
        self.config.contempt = contempt;
    }

    /// Replace the table with an empty one of `mb` megabytes. On
    /// allocation failure the previous table is kept.
    pub fn resize_hash(&mut self, mb: usize) -> Result<(), TtError> {
        self.stop_search();
        let mb = mb.clamp(1, MAX_HASH_MB);
        match TranspositionTable::try_new(mb) {
            Ok(tt) => {
                self.tt = Arc::new(tt);
                self.config.hash_mb = mb;
                log::info!("hash resized to {mb} MB");
                Ok(())
            }
            Err(err) => {
                log::warn!("{err}; keeping {} MB", self.config.hash_mb);
                Err(err)
            }
        }
    }

    pub fn clear_hash(&mut self) {
        self.stop_search();
        self.tt.clear();
    }

    pub fn new_game(&mut self) {
        self.stop_search();
        self.board = Board::new();
        self.tt.clear();
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.current_job.as_ref().is_some_and(|job| !job.is_finished())
    }

    /// Stop the active search and wait for its result to be delivered.
    pub fn stop_search(&mut self) {
        if let Some(job) = self.current_job.take() {
            job.stop_and_wait();
        }
    }

    /// Ask the active search to stop without waiting.
    pub fn signal_stop(&self) {
        if let Some(job) = &self.current_job {
            job.signal_stop();
        }
    }

    pub fn ponderhit(&self) {
        if let Some(job) = &self.current_job {
            job.ponderhit();
        }
    }

    /// A legal book move for the current position.
    fn book_move(&self) -> Option<Move> {
        let mv = self.book.lookup(&self.board)?;
        if self.board.generate_moves().contains(mv) {
            Some(mv)
        } else {
            log::warn!("ignoring illegal book move {mv}");
            None
        }
    }

    fn timed_budget(&self, params: &GoParams) -> TimeManager {
        let side = self.board.side_to_move();
        let overhead = Duration::from_millis(self.config.move_overhead_ms);
        let remaining = params.time.remaining_ms(side).map(Duration::from_millis);
        TimeManager::configure(&params.time, side).reserve(overhead, remaining)
    }

    /// Shared state for a search of the current position, plus the budget
    /// a later `ponderhit` should arm.
    fn prepare(&self, params: &GoParams, stop: StopFlag) -> (SharedSearchState, Option<Duration>) {
        let timed = self.timed_budget(params);
        let (time, ponder_budget) = if params.ponder || params.infinite {
            (TimeManager::infinite(), timed.budget())
        } else {
            (timed, None)
        };
        let limits = SearchLimits {
            max_depth: params.depth.unwrap_or(MAX_DEPTH).clamp(1, MAX_DEPTH),
            node_limit: params.nodes.or(self.config.node_limit),
            multi_pv: self.config.multi_pv,
            contempt: self.config.contempt,
        };

        let mut shared = SharedSearchState::new(Arc::clone(&self.tt), Arc::clone(&self.evaluator))
            .with_tablebase(Arc::clone(&self.tablebase))
            .with_stop(stop)
            .with_time(time)
            .with_limits(limits);
        if let Some(info) = &self.info_callback {
            shared = shared.with_info(Arc::clone(info));
        }
        (shared, ponder_budget)
    }

    fn book_result(mv: Move) -> SearchResult {
        SearchResult {
            best_move: Some(mv),
            ponder_move: None,
            score: 0,
            depth: 0,
            nodes: 0,
        }
    }

    /// Search the current position on the calling thread.
    pub fn search_blocking(&mut self, params: &GoParams) -> SearchResult {
        self.stop_search();
        if let Some(mv) = self.book_move() {
            return Self::book_result(mv);
        }
        let (shared, _) = self.prepare(params, StopFlag::new());
        smp_search(&self.board, &shared, self.config.threads)
    }

    /// Start searching in the background. `on_complete` receives the
    /// result; while pondering or in infinite mode it is held back until
    /// `stop` (or `ponderhit`, for a ponder search).
    pub fn start_search<F>(&mut self, params: &GoParams, on_complete: F) -> io::Result<()>
    where
        F: FnOnce(SearchResult) + Send + 'static,
    {
        self.stop_search();

        let stop = StopFlag::new();
        let release = StopFlag::new();
        let pondering = Arc::new(AtomicBool::new(params.ponder));
        let (shared, ponder_budget) = self.prepare(params, stop.clone());
        let book_move = self.book_move();
        let board = self.board.clone();
        let threads = self.config.threads;
        let infinite = params.infinite;

        let held = release.clone();
        let still_pondering = Arc::clone(&pondering);
        let handle = thread::Builder::new()
            .name("search-coordinator".to_string())
            .spawn(move || {
                let result = match book_move {
                    Some(mv) => Self::book_result(mv),
                    None => smp_search(&board, &shared, threads),
                };
                while (infinite || still_pondering.load(Ordering::Relaxed)) && !held.is_stopped() {
                    thread::sleep(Duration::from_millis(HOLD_POLL_MS));
                }
                on_complete(result);
            })?;

        self.current_job = Some(SearchJob {
            stop,
            release,
            pondering,
            ponder_budget,
            handle,
        });
        Ok(())
    }
}

impl Drop for EngineController {
    fn drop(&mut self) {
        self.stop_search();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn engine() -> EngineController {
        EngineController::try_new(EngineConfig {
            hash_mb: 4,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn blocking_search_returns_legal_move() {
        let mut engine = engine();
        let result = engine.search_blocking(&GoParams::depth(3));
        let best = result.best_move.unwrap();
        assert!(engine.board().generate_moves().contains(best));
        assert_eq!(result.depth, 3);
    }

    #[test]
    fn book_move_skips_search() {
        let mut engine = engine();
        let book = crate::engine::book::HashBook::from_lines(["d2d4"]).unwrap();
        engine.set_book(Arc::new(book));
        let result = engine.search_blocking(&GoParams::depth(5));
        assert_eq!(result.best_move.map(|m| m.to_string()).as_deref(), Some("d2d4"));
        assert_eq!(result.nodes, 0);
    }

    #[test]
    fn infinite_search_waits_for_stop() {
        let mut engine = engine();
        let (tx, rx) = mpsc::channel();
        let params = GoParams {
            infinite: true,
            depth: Some(2),
            ..Default::default()
        };
        engine
            .start_search(&params, move |result| {
                let _ = tx.send(result);
            })
            .unwrap();
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
        engine.stop_search();
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(result.best_move.is_some());
    }

    #[test]
    fn ponderhit_arms_the_clock() {
        let mut engine = engine();
        let (tx, rx) = mpsc::channel();
        let params = GoParams {
            ponder: true,
            time: TimeControl::MoveTime { time_ms: 200 },
            ..Default::default()
        };
        engine
            .start_search(&params, move |result| {
                let _ = tx.send(result);
            })
            .unwrap();
        thread::sleep(Duration::from_millis(100));
        engine.ponderhit();
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(result.best_move.is_some());
    }

    #[test]
    fn settings_are_clamped() {
        let mut engine = engine();
        engine.set_threads(0);
        engine.set_multi_pv(9);
        assert_eq!(engine.config().threads, 1);
        assert_eq!(engine.config().multi_pv, MAX_MULTI_PV);
        engine.resize_hash(2).unwrap();
        assert_eq!(engine.config().hash_mb, 2);
    }
}
