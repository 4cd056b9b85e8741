//! Search limits carried by `go`

use crate::types::Color;
use std::time::Instant;

/// Constraints for one search run. Unset fields are `None`; an explicit
/// zero stays distinguishable from "not given".
#[derive(Debug, Clone, PartialEq)]
pub struct Limits {
    /// Remaining clock per side in milliseconds, indexed by [`Color::index`]
    pub time: [Option<i64>; Color::NUM],
    /// Increment per move in milliseconds
    pub inc: [Option<i64>; Color::NUM],
    pub movestogo: Option<i32>,
    pub depth: Option<i32>,
    pub nodes: Option<u64>,
    pub movetime: Option<i64>,
    /// Stop once a mate in this many moves is found
    pub mate: Option<i32>,
    pub perft: Option<u32>,
    pub infinite: bool,
    pub ponder_mode: bool,
    /// Restrict the root to these moves (raw move text)
    pub searchmoves: Vec<String>,
    /// When the `go` command was received
    pub start_time: Instant,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            time: [None; Color::NUM],
            inc: [None; Color::NUM],
            movestogo: None,
            depth: None,
            nodes: None,
            movetime: None,
            mate: None,
            perft: None,
            infinite: false,
            ponder_mode: false,
            searchmoves: Vec::new(),
            start_time: Instant::now(),
        }
    }
}

impl Limits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether clock-based time management applies
    pub fn use_time_management(&self) -> bool {
        self.time.iter().any(Option::is_some)
    }

    /// Perft depth, when a perft run was requested
    pub fn perft_depth(&self) -> Option<u32> {
        self.perft.filter(|d| *d > 0)
    }

    /// Milliseconds since the command was received
    pub fn elapsed_ms(&self) -> i64 {
        self.start_time.elapsed().as_millis() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unset() {
        let limits = Limits::new();
        assert!(!limits.use_time_management());
        assert!(limits.depth.is_none());
        assert!(!limits.infinite);
        assert!(limits.searchmoves.is_empty());
    }

    #[test]
    fn test_explicit_zero_clock_enables_time_management() {
        let mut limits = Limits::new();
        limits.time[Color::Black.index()] = Some(0);
        assert!(limits.use_time_management());
    }

    #[test]
    fn test_perft_zero_is_not_perft() {
        let mut limits = Limits::new();
        limits.perft = Some(0);
        assert_eq!(limits.perft_depth(), None);
        limits.perft = Some(3);
        assert_eq!(limits.perft_depth(), Some(3));
    }
}
