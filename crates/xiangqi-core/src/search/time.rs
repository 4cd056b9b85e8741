//! Time allocation

use super::Limits;
use crate::types::Color;

/// Moves-to-go horizon when the GUI does not send `movestogo`
const DEFAULT_MOVES_TO_GO: i64 = 30;

/// Soft and hard deadlines for one search, in milliseconds since
/// [`Limits::start_time`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeManager {
    optimum: Option<i64>,
    maximum: Option<i64>,
}

impl TimeManager {
    pub fn new(limits: &Limits, us: Color, move_overhead: i64) -> Self {
        let Some(remaining) = limits.time[us.index()] else {
            return Self { optimum: None, maximum: None };
        };
        let inc = limits.inc[us.index()].unwrap_or(0);
        let mtg = limits
            .movestogo
            .filter(|m| *m > 0)
            .map_or(DEFAULT_MOVES_TO_GO, |m| i64::from(m).min(50));

        let left = (remaining - move_overhead).max(1);
        let cap = (left * 8 / 10).max(1);
        let optimum = (left / mtg + inc * 3 / 4).clamp(1, cap);
        let maximum = (optimum * 4).clamp(optimum, cap);
        Self { optimum: Some(optimum), maximum: Some(maximum) }
    }

    /// Time after which no new iteration should start
    pub fn optimum(&self) -> Option<i64> {
        self.optimum
    }

    /// Time after which the search must stop
    pub fn maximum(&self) -> Option<i64> {
        self.maximum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits_with_clock(white: i64, inc: i64) -> Limits {
        let mut limits = Limits::new();
        limits.time[Color::White.index()] = Some(white);
        limits.inc[Color::White.index()] = Some(inc);
        limits
    }

    #[test]
    fn test_no_clock_means_no_deadline() {
        let tm = TimeManager::new(&Limits::new(), Color::White, 10);
        assert_eq!(tm.optimum(), None);
        assert_eq!(tm.maximum(), None);
    }

    #[test]
    fn test_deadlines_within_remaining_time() {
        let tm = TimeManager::new(&limits_with_clock(60_000, 1_000), Color::White, 10);
        let (opt, max) = (tm.optimum().unwrap(), tm.maximum().unwrap());
        assert!(opt > 0);
        assert!(opt <= max);
        assert!(max < 60_000);
    }

    #[test]
    fn test_only_own_clock_counts() {
        let tm = TimeManager::new(&limits_with_clock(60_000, 0), Color::Black, 10);
        assert_eq!(tm.optimum(), None);
    }

    #[test]
    fn test_zero_clock_gets_minimal_budget() {
        let tm = TimeManager::new(&limits_with_clock(0, 0), Color::White, 10);
        assert_eq!(tm.optimum(), Some(1));
        assert_eq!(tm.maximum(), Some(1));
    }
}
