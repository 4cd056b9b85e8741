//! Iterative-deepening alpha-beta search with Lazy SMP helpers

mod limits;
mod time;
mod worker;

pub use limits::Limits;
pub use time::TimeManager;
pub(crate) use worker::{RootMove, Worker};

use crate::tt::TranspositionTable;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Flags shared between the engine handle and its search threads
#[derive(Debug, Default)]
pub(crate) struct Signals {
    pub stop: AtomicBool,
    pub ponder: AtomicBool,
    pub stop_on_ponderhit: AtomicBool,
}

impl Signals {
    pub fn reset(&self, ponder: bool) {
        self.stop.store(false, Ordering::SeqCst);
        self.ponder.store(ponder, Ordering::SeqCst);
        self.stop_on_ponderhit.store(false, Ordering::SeqCst);
    }

    #[inline]
    pub fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// State shared by all threads of one search run
pub(crate) struct SharedSearch {
    pub limits: Limits,
    pub time: TimeManager,
    pub signals: Arc<Signals>,
    pub tt: Arc<TranspositionTable>,
    pub multi_pv: usize,
    /// Node counters, one per thread, flushed periodically
    pub nodes: Vec<AtomicU64>,
}

impl SharedSearch {
    pub fn total_nodes(&self) -> u64 {
        self.nodes.iter().map(|n| n.load(Ordering::Relaxed)).sum()
    }
}
