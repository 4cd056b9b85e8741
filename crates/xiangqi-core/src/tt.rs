//! Shared transposition table
//!
//! Each entry is two atomics: the packed data word and the key xor-ed with
//! that word. A torn write from two racing threads fails the key check on
//! probe, so threads share the table without locks.

use crate::error::{EngineError, EngineResult};
use crate::types::{Bound, Move, Value};
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

const ENTRY_BYTES: usize = std::mem::size_of::<Entry>();
const GENERATION_MASK: u8 = 0x3f;
const OCCUPIED: u64 = 1 << 48;

#[derive(Default)]
struct Entry {
    check: AtomicU64,
    data: AtomicU64,
}

/// Result of a successful probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtHit {
    pub mv: Move,
    pub value: Value,
    pub depth: i32,
    pub bound: Bound,
}

pub struct TranspositionTable {
    entries: Box<[Entry]>,
    generation: AtomicU8,
}

impl TranspositionTable {
    /// Allocate a table of `mb` MiB (at least one entry)
    pub fn new(mb: usize) -> Self {
        let count = Self::entry_count(mb);
        let entries = (0..count).map(|_| Entry::default()).collect::<Vec<_>>().into_boxed_slice();
        log::debug!("transposition table: {mb} MiB, {count} entries");
        Self { entries, generation: AtomicU8::new(0) }
    }

    /// Like [`TranspositionTable::new`], but a size the allocator refuses is
    /// an error instead of an abort
    pub fn try_new(mb: usize) -> EngineResult<Self> {
        let count = Self::entry_count(mb);
        let mut entries = Vec::new();
        if let Err(e) = entries.try_reserve_exact(count) {
            log::warn!("transposition table of {mb} MiB refused: {e}");
            return Err(EngineError::HashAllocation { mb });
        }
        entries.resize_with(count, Entry::default);
        log::debug!("transposition table: {mb} MiB, {count} entries");
        Ok(Self { entries: entries.into_boxed_slice(), generation: AtomicU8::new(0) })
    }

    fn entry_count(mb: usize) -> usize {
        (mb.saturating_mul(1024 * 1024) / ENTRY_BYTES).max(1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        for e in self.entries.iter() {
            e.check.store(0, Ordering::Relaxed);
            e.data.store(0, Ordering::Relaxed);
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    /// Advance the generation at the start of each search
    pub fn new_search(&self) {
        let next = (self.generation.load(Ordering::Relaxed) + 1) & GENERATION_MASK;
        self.generation.store(next, Ordering::Relaxed);
    }

    #[inline]
    fn generation(&self) -> u8 {
        self.generation.load(Ordering::Relaxed)
    }

    #[inline]
    fn slot(&self, key: u64) -> &Entry {
        let index = ((u128::from(key) * self.entries.len() as u128) >> 64) as usize;
        &self.entries[index]
    }

    pub fn probe(&self, key: u64) -> Option<TtHit> {
        let entry = self.slot(key);
        let data = entry.data.load(Ordering::Relaxed);
        let check = entry.check.load(Ordering::Relaxed);
        if data & OCCUPIED == 0 || check ^ data != key {
            return None;
        }
        let bound = Bound::from_bits(((data >> 40) & 0x3) as u8)?;
        Some(TtHit {
            mv: Move::from_raw(data as u16),
            value: Value::new(i32::from((data >> 16) as u16 as i16)),
            depth: i32::from((data >> 32) as u8),
            bound,
        })
    }

    pub fn store(&self, key: u64, mv: Move, value: Value, depth: i32, bound: Bound) {
        let entry = self.slot(key);
        let old = entry.data.load(Ordering::Relaxed);
        let same_key = entry.check.load(Ordering::Relaxed) ^ old == key;
        let old_generation = ((old >> 42) as u8) & GENERATION_MASK;
        let old_depth = i32::from((old >> 32) as u8);

        let replace = old & OCCUPIED == 0
            || same_key
            || old_generation != self.generation()
            || depth + 2 >= old_depth
            || bound == Bound::Exact;
        if !replace {
            return;
        }

        // Keep the previous best move when the new result has none.
        let mv = if !mv.is_ok() && same_key { Move::from_raw(old as u16) } else { mv };
        let data = u64::from(mv.raw())
            | (u64::from(value.raw().clamp(i16::MIN as i32, i16::MAX as i32) as i16 as u16) << 16)
            | (u64::from(depth.clamp(0, 255) as u8) << 32)
            | ((bound as u64) << 40)
            | (u64::from(self.generation()) << 42)
            | OCCUPIED;
        entry.data.store(data, Ordering::Relaxed);
        entry.check.store(key ^ data, Ordering::Relaxed);
    }

    /// Per-mille occupancy of entries written within the last `max_age`
    /// searches, sampled over the first thousand entries
    pub fn hashfull(&self, max_age: u32) -> u32 {
        let current = self.generation();
        let sample = self.entries.len().min(1000);
        let used = self.entries[..sample]
            .iter()
            .filter(|e| {
                let data = e.data.load(Ordering::Relaxed);
                let generation = ((data >> 42) as u8) & GENERATION_MASK;
                let age = u32::from(current.wrapping_sub(generation) & GENERATION_MASK);
                data & OCCUPIED != 0 && age <= max_age
            })
            .count();
        (used * 1000 / sample) as u32
    }
}

/// Mate scores are stored relative to the node, not the root
#[inline]
pub fn value_to_tt(v: Value, ply: i32) -> Value {
    if v.is_win() {
        v + ply
    } else if v.is_loss() {
        v - ply
    } else {
        v
    }
}

#[inline]
pub fn value_from_tt(v: Value, ply: i32) -> Value {
    if v.is_win() {
        v - ply
    } else if v.is_loss() {
        v + ply
    } else {
        v
    }
}
