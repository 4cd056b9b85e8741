//! Events emitted by a running search

use crate::types::{Bound, Move, Score, Value};

/// Current root move being searched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoIter {
    pub depth: i32,
    pub currmove: Move,
    /// 1-based index into the root move list
    pub currmovenumber: usize,
}

/// Result reported when the root has no legal moves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoShort {
    pub depth: i32,
    pub score: Score,
}

/// One completed principal variation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoFull {
    pub depth: i32,
    pub sel_depth: i32,
    /// 1-based PV index
    pub multi_pv: usize,
    pub score: Score,
    pub bound: Bound,
    /// Raw value, kept for win/draw/loss estimation
    pub value: Value,
    /// Weighted material count of the root position
    pub material: i32,
    pub nodes: u64,
    pub nps: u64,
    pub hashfull: u32,
    pub tb_hits: u64,
    pub time_ms: u64,
    pub pv: Vec<Move>,
}

/// Messages from the search threads to whoever consumes results.
///
/// Every accepted `go` ends with exactly one [`SearchEvent::BestMove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Iter(InfoIter),
    UpdateNoMoves(InfoShort),
    UpdateFull(InfoFull),
    BestMove { best: Move, ponder: Move },
    /// The search thread failed; a `BestMove` with sentinels follows
    Failed(String),
}
