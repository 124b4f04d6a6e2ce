//! Engine layer: the controller that owns game state and runs searches,
//! the time manager, and the pluggable book and tablebase collaborators.

pub mod book;
mod controller;
pub mod tablebase;
pub mod time;

pub use book::{HashBook, NoBook, OpeningBook};
pub use controller::{
    EngineConfig, EngineController, GoParams, SearchJob, MAX_HASH_MB, MAX_MULTI_PV, MAX_THREADS,
};
pub use tablebase::{NoTablebase, Tablebase, TablebaseHit};
pub use time::{TimeControl, TimeManager};
