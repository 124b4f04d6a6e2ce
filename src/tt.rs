//! Shared transposition table.
//!
//! Lockless: each slot stores `key ^ data` next to `data` in two atomics,
//! so a probe that races a store sees a key mismatch and misses instead of
//! returning a torn entry. Buckets hold four slots and the bucket count is
//! a power of two sized from a megabyte budget.

use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use crate::board::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// Failed high: the true score is at least this.
    Lower,
    /// Failed low: the true score is at most this.
    Upper,
}

impl Bound {
    // Never zero, so a stored entry never packs to zero.
    fn to_bits(self) -> u64 {
        match self {
            Bound::Exact => 1,
            Bound::Lower => 2,
            Bound::Upper => 3,
        }
    }

    fn from_bits(bits: u64) -> Option<Self> {
        match bits & 0x3 {
            1 => Some(Bound::Exact),
            2 => Some(Bound::Lower),
            3 => Some(Bound::Upper),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtEntry {
    pub depth: u8,
    pub score: i16,
    pub bound: Bound,
    pub best_move: Option<Move>,
    pub generation: u8,
}

/// Failure to allocate a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TtError {
    ZeroSize,
    Allocation { size_mb: usize },
}

impl fmt::Display for TtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TtError::ZeroSize => write!(f, "transposition table size must be at least 1 MB"),
            TtError::Allocation { size_mb } => {
                write!(f, "could not allocate a {size_mb} MB transposition table")
            }
        }
    }
}

impl std::error::Error for TtError {}

// Layout: move 0-15, score 16-31, depth 32-39, bound 40-41, generation 42-47.
fn pack(depth: u8, score: i16, bound: Bound, best_move: Option<Move>, generation: u8) -> u64 {
    let mv = u64::from(best_move.map_or(0, Move::as_u16));
    mv | (u64::from(score as u16) << 16)
        | (u64::from(depth) << 32)
        | (bound.to_bits() << 40)
        | (u64::from(generation & GENERATION_MASK) << 42)
}

fn unpack(data: u64) -> Option<TtEntry> {
    let bound = Bound::from_bits(data >> 40)?;
    let mv = (data & 0xFFFF) as u16;
    Some(TtEntry {
        depth: ((data >> 32) & 0xFF) as u8,
        score: ((data >> 16) & 0xFFFF) as u16 as i16,
        bound,
        best_move: (mv != 0).then(|| Move::from_u16(mv)),
        generation: ((data >> 42) as u8) & GENERATION_MASK,
    })
}

const GENERATION_MASK: u8 = 0x3F;
const BUCKET_SIZE: usize = 4;

#[repr(C)]
#[derive(Default)]
struct Slot {
    key_xor: AtomicU64,
    data: AtomicU64,
}

impl Slot {
    fn write(&self, hash: u64, data: u64) {
        self.data.store(data, Ordering::Relaxed);
        self.key_xor.store(hash ^ data, Ordering::Relaxed);
    }

    /// The slot's data if it currently holds `hash`.
    fn read(&self, hash: u64) -> Option<u64> {
        let key_xor = self.key_xor.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);
        (data != 0 && key_xor ^ data == hash).then_some(data)
    }

    fn raw(&self) -> u64 {
        self.data.load(Ordering::Relaxed)
    }

    fn clear(&self) {
        self.key_xor.store(0, Ordering::Relaxed);
        self.data.store(0, Ordering::Relaxed);
    }
}

#[repr(C, align(64))]
#[derive(Default)]
struct Bucket {
    slots: [Slot; BUCKET_SIZE],
}

/// Thread-safe transposition table shared by all search workers.
pub struct TranspositionTable {
    buckets: Vec<Bucket>,
    mask: usize,
    size_mb: usize,
    generation: AtomicU8,
}

impl TranspositionTable {
    /// Allocate a table of at most `size_mb` megabytes, rounded down to a
    /// power-of-two bucket count.
    pub fn try_new(size_mb: usize) -> Result<Self, TtError> {
        if size_mb == 0 {
            return Err(TtError::ZeroSize);
        }
        let bytes = size_mb
            .checked_mul(1024 * 1024)
            .ok_or(TtError::Allocation { size_mb })?;
        let fit = (bytes / mem::size_of::<Bucket>()).max(1);
        let count = 1usize << (usize::BITS - 1 - fit.leading_zeros());

        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(count)
            .map_err(|_| TtError::Allocation { size_mb })?;
        buckets.resize_with(count, Bucket::default);

        log::debug!("transposition table: {size_mb} MB, {count} buckets");
        Ok(TranspositionTable {
            buckets,
            mask: count - 1,
            size_mb,
            generation: AtomicU8::new(0),
        })
    }

    #[must_use]
    pub fn size_mb(&self) -> usize {
        self.size_mb
    }

    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn generation(&self) -> u8 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Age every existing entry by one search.
    pub fn new_search(&self) {
        let next = self.generation().wrapping_add(1) & GENERATION_MASK;
        self.generation.store(next, Ordering::Relaxed);
    }

    #[inline]
    fn bucket(&self, hash: u64) -> &Bucket {
        &self.buckets[(hash as usize) & self.mask]
    }

    #[must_use]
    pub fn probe(&self, hash: u64) -> Option<TtEntry> {
        self.bucket(hash)
            .slots
            .iter()
            .find_map(|slot| slot.read(hash))
            .and_then(unpack)
    }

    /// Store a search result.
    ///
    /// An empty slot or one already holding `hash` is overwritten. Otherwise
    /// the least valuable slot in the bucket is replaced, but only if it is
    /// no deeper than the new entry or was written by an older search.
    pub fn store(&self, hash: u64, depth: u32, score: i32, bound: Bound, best_move: Option<Move>) {
        let generation = self.generation();
        let depth = depth.min(u32::from(u8::MAX)) as u8;
        let score = score.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        let bucket = self.bucket(hash);

        if let Some(slot) = bucket
            .slots
            .iter()
            .find(|slot| slot.raw() == 0 || slot.read(hash).is_some())
        {
            // Keep a known move when the new result has none.
            let best_move = best_move.or_else(|| {
                slot.read(hash)
                    .and_then(unpack)
                    .and_then(|old| old.best_move)
            });
            slot.write(hash, pack(depth, score, bound, best_move, generation));
            return;
        }

        let victim = bucket.slots.iter().filter_map(|slot| {
            let entry = unpack(slot.raw())?;
            let age = generation.wrapping_sub(entry.generation) & GENERATION_MASK;
            Some((slot, entry, i32::from(entry.depth) - 8 * i32::from(age)))
        });
        if let Some((slot, entry, _)) = victim.min_by_key(|&(_, _, priority)| priority) {
            if entry.depth <= depth || entry.generation != generation {
                slot.write(hash, pack(depth, score, bound, best_move, generation));
            }
        }
    }

    /// Per-mille of sampled slots holding entries from the current search.
    #[must_use]
    pub fn hashfull(&self) -> u32 {
        let generation = self.generation();
        let sample = self.buckets.len().min(1000);
        let used = self.buckets[..sample]
            .iter()
            .flat_map(|b| b.slots.iter())
            .filter_map(|slot| unpack(slot.raw()))
            .filter(|entry| entry.generation == generation)
            .count();
        (used * 1000 / (sample * BUCKET_SIZE)) as u32
    }

    pub fn clear(&self) {
        for bucket in &self.buckets {
            for slot in &bucket.slots {
                slot.clear();
            }
        }
        self.generation.store(0, Ordering::Relaxed);
    }
}

impl fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("size_mb", &self.size_mb)
            .field("buckets", &self.buckets.len())
            .field("generation", &self.generation())
            .finish()
    }
}
