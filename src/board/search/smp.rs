//! Lazy SMP (Symmetric `MultiProcessing`) parallel search.
//!
//! Every worker searches the same root independently with its own board
//! copy and ordering tables; the transposition table is the only thing
//! they share. Worker 0 owns the clock, reports progress and decides the
//! move. Helpers only widen table coverage and stop when it does.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};

use super::pvs::{Searcher, WorkerOutcome};
use super::{InfoCallback, SearchLimits, SearchResult};
use crate::board::{Board, Evaluator};
use crate::engine::tablebase::{NoTablebase, Tablebase};
use crate::engine::time::TimeManager;
use crate::sync::StopFlag;
use crate::tt::TranspositionTable;

/// Search thread stack size (32 MB to handle deep recursion)
pub const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// State shared by all workers of one search. Everything except the node
/// counter and the stop flag is read-only once workers start.
pub struct SharedSearchState {
    pub tt: Arc<TranspositionTable>,
    pub evaluator: Arc<dyn Evaluator>,
    pub tablebase: Arc<dyn Tablebase>,
    /// Cooperative cancellation, polled by every worker.
    pub stop: StopFlag,
    /// Nodes published by all workers so far.
    pub nodes: AtomicU64,
    pub time: TimeManager,
    pub limits: SearchLimits,
    pub info: Option<InfoCallback>,
}

impl SharedSearchState {
    #[must_use]
    pub fn new(tt: Arc<TranspositionTable>, evaluator: Arc<dyn Evaluator>) -> Self {
        SharedSearchState {
            tt,
            evaluator,
            tablebase: Arc::new(NoTablebase),
            stop: StopFlag::new(),
            nodes: AtomicU64::new(0),
            time: TimeManager::infinite(),
            limits: SearchLimits::default(),
            info: None,
        }
    }

    #[must_use]
    pub fn with_tablebase(mut self, tablebase: Arc<dyn Tablebase>) -> Self {
        self.tablebase = tablebase;
        self
    }

    #[must_use]
    pub fn with_stop(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }

    #[must_use]
    pub fn with_time(mut self, time: TimeManager) -> Self {
        self.time = time;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn with_info(mut self, info: InfoCallback) -> Self {
        self.info = Some(info);
        self
    }

    #[must_use]
    pub fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }
}

/// Workers block here until the orchestrator has spawned all of them.
struct StartGate {
    open: Mutex<bool>,
    signal: Condvar,
}

impl StartGate {
    fn new() -> Self {
        StartGate {
            open: Mutex::new(false),
            signal: Condvar::new(),
        }
    }

    fn wait(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.signal.wait(&mut open);
        }
    }

    fn open(&self) {
        *self.open.lock() = true;
        self.signal.notify_all();
    }
}

/// Raises the stop flag when the main worker exits, even by unwinding,
/// so helpers never outlive it.
struct StopOnExit<'a>(&'a StopFlag);

impl Drop for StopOnExit<'_> {
    fn drop(&mut self) {
        self.0.stop();
    }
}

fn run_worker(id: usize, board: Board, shared: &SharedSearchState) -> WorkerOutcome {
    let _stop_helpers = (id == 0).then(|| StopOnExit(&shared.stop));
    Searcher::new(board, shared, id).iterate()
}

/// Search `board` with `threads` workers and return once they have all
/// been joined.
///
/// Workers that cannot be spawned are skipped with a warning; if the main
/// worker cannot be spawned it runs on the calling thread instead. A legal
/// move is always returned when one exists.
pub fn smp_search(board: &Board, shared: &SharedSearchState, threads: usize) -> SearchResult {
    let threads = threads.max(1);
    shared.tt.new_search();
    log::debug!(
        "search start: {threads} threads, depth {}, budget {:?}",
        shared.limits.max_depth,
        shared.time.budget()
    );

    let gate = StartGate::new();
    let outcomes: Vec<(usize, WorkerOutcome)> = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(threads);
        let mut main_inline = false;
        for id in 0..threads {
            let worker_board = board.clone();
            let gate = &gate;
            let spawned = thread::Builder::new()
                .name(format!("search-{id}"))
                .stack_size(SEARCH_STACK_SIZE)
                .spawn_scoped(scope, move || {
                    gate.wait();
                    run_worker(id, worker_board, shared)
                });
            match spawned {
                Ok(handle) => handles.push((id, handle)),
                Err(err) => {
                    log::warn!("could not spawn search worker {id}: {err}");
                    if id == 0 {
                        main_inline = true;
                    } else {
                        break;
                    }
                }
            }
        }
        gate.open();

        let mut outcomes = Vec::with_capacity(threads);
        if main_inline {
            outcomes.push((0, run_worker(0, board.clone(), shared)));
        }
        for (id, handle) in handles {
            match handle.join() {
                Ok(outcome) => outcomes.push((id, outcome)),
                Err(_) => log::error!("search worker {id} panicked"),
            }
        }
        outcomes
    });

    let chosen = outcomes
        .iter()
        .find(|(id, o)| *id == 0 && o.best_move.is_some())
        .or_else(|| {
            outcomes
                .iter()
                .filter(|(_, o)| o.best_move.is_some())
                .max_by_key(|(_, o)| o.depth)
        })
        .map(|(_, o)| *o);

    let nodes = shared.nodes();
    let result = match chosen {
        Some(o) => SearchResult {
            best_move: o.best_move,
            ponder_move: o.ponder_move,
            score: o.score,
            depth: o.depth,
            nodes,
        },
        None => SearchResult {
            best_move: board.generate_moves().first(),
            ponder_move: None,
            score: outcomes.first().map_or(0, |(_, o)| o.score),
            depth: 0,
            nodes,
        },
    };
    log::debug!(
        "search done: best {:?} score {} depth {} nodes {nodes}",
        result.best_move.map(|m| m.to_string()),
        result.score,
        result.depth
    );
    result
}
