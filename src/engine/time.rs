//! Time management.
//!
//! Turns a time control into a per-move budget and answers deadline
//! queries. The manager is configured once by the orchestrating thread and
//! then shared read-only with every search worker. Safety margins are not
//! applied here; the orchestrator decides on those (see
//! [`TimeManager::reserve`]).

use std::time::{Duration, Instant};

use crate::board::Color;

/// Moves-to-go assumed when the clock does not say.
pub const DEFAULT_MOVES_TO_GO: u64 = 30;

/// Time control settings for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeControl {
    /// No deadline (`go infinite`, `go ponder`, depth- or node-limited).
    #[default]
    Infinite,
    /// Fixed time per move.
    MoveTime { time_ms: u64 },
    /// Remaining time and increment for both sides.
    Clock {
        wtime_ms: u64,
        btime_ms: u64,
        winc_ms: u64,
        binc_ms: u64,
        movestogo: Option<u64>,
    },
}

impl TimeControl {
    #[must_use]
    pub fn move_time(time: Duration) -> Self {
        TimeControl::MoveTime {
            time_ms: time.as_millis() as u64,
        }
    }

    /// Remaining clock time for `side`, when playing on a clock.
    #[must_use]
    pub fn remaining_ms(&self, side: Color) -> Option<u64> {
        match *self {
            TimeControl::Clock {
                wtime_ms, btime_ms, ..
            } => Some(match side {
                Color::White => wtime_ms,
                Color::Black => btime_ms,
            }),
            _ => None,
        }
    }

    /// Soft budget for `side`: the fixed move time, or
    /// `remaining / max(movestogo, 1) + increment / 2`.
    #[must_use]
    pub fn budget_ms(&self, side: Color) -> Option<u64> {
        match *self {
            TimeControl::Infinite => None,
            TimeControl::MoveTime { time_ms } => Some(time_ms),
            TimeControl::Clock {
                wtime_ms,
                btime_ms,
                winc_ms,
                binc_ms,
                movestogo,
            } => {
                let (remaining, inc) = match side {
                    Color::White => (wtime_ms, winc_ms),
                    Color::Black => (btime_ms, binc_ms),
                };
                let moves = movestogo.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);
                Some(remaining / moves + inc / 2)
            }
        }
    }
}

/// A started clock with an optional budget.
#[derive(Debug, Clone, Copy)]
pub struct TimeManager {
    start: Instant,
    budget: Option<Duration>,
}

impl TimeManager {
    /// Start timing now with the budget `tc` gives `side`.
    #[must_use]
    pub fn configure(tc: &TimeControl, side: Color) -> Self {
        TimeManager {
            start: Instant::now(),
            budget: tc.budget_ms(side).map(Duration::from_millis),
        }
    }

    /// A clock that never expires.
    #[must_use]
    pub fn infinite() -> Self {
        TimeManager {
            start: Instant::now(),
            budget: None,
        }
    }

    /// Shrink the budget by `margin` and cap it so at least `margin`
    /// remains on a clock of `remaining`. Never drops below 1 ms.
    #[must_use]
    pub fn reserve(mut self, margin: Duration, remaining: Option<Duration>) -> Self {
        if let Some(budget) = self.budget {
            let mut reserved = budget.saturating_sub(margin);
            if let Some(left) = remaining {
                reserved = reserved.min(left.saturating_sub(margin));
            }
            self.budget = Some(reserved.max(Duration::from_millis(1)));
        }
        self
    }

    #[must_use]
    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.budget.map(|b| self.start + b)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    #[must_use]
    pub fn time_up(&self) -> bool {
        self.budget.is_some_and(|b| self.start.elapsed() >= b)
    }

    /// Whether another iteration is worth starting: less than half the
    /// budget is spent. Deeper iterations take several times longer than
    /// the previous one, so starting late mostly wastes the remainder.
    #[must_use]
    pub fn should_start_iteration(&self) -> bool {
        self.budget.map_or(true, |b| self.start.elapsed() < b / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(wtime: u64, btime: u64, inc: u64, movestogo: Option<u64>) -> TimeControl {
        TimeControl::Clock {
            wtime_ms: wtime,
            btime_ms: btime,
            winc_ms: inc,
            binc_ms: inc,
            movestogo,
        }
    }

    #[test]
    fn infinite_has_no_budget() {
        let tm = TimeManager::configure(&TimeControl::Infinite, Color::White);
        assert!(tm.budget().is_none());
        assert!(tm.deadline().is_none());
        assert!(!tm.time_up());
        assert!(tm.should_start_iteration());
    }

    #[test]
    fn move_time_is_used_directly() {
        let tc = TimeControl::move_time(Duration::from_secs(5));
        assert_eq!(tc.budget_ms(Color::Black), Some(5000));
    }

    #[test]
    fn clock_divides_by_moves_to_go_and_adds_half_increment() {
        let tc = clock(60_000, 30_000, 2_000, Some(20));
        assert_eq!(tc.budget_ms(Color::White), Some(3_000 + 1_000));
        assert_eq!(tc.budget_ms(Color::Black), Some(1_500 + 1_000));
    }

    #[test]
    fn missing_moves_to_go_defaults_to_thirty() {
        let tc = clock(30_000, 30_000, 0, None);
        assert_eq!(tc.budget_ms(Color::White), Some(1_000));
    }

    #[test]
    fn zero_moves_to_go_is_treated_as_one() {
        let tc = clock(10_000, 10_000, 0, Some(0));
        assert_eq!(tc.budget_ms(Color::White), Some(10_000));
    }

    #[test]
    fn reserve_keeps_margin_on_the_clock() {
        let tc = clock(1_000, 1_000, 0, Some(1));
        let tm = TimeManager::configure(&tc, Color::White)
            .reserve(Duration::from_millis(100), Some(Duration::from_millis(1_000)));
        assert_eq!(tm.budget(), Some(Duration::from_millis(900)));
    }

    #[test]
    fn reserve_never_goes_below_one_millisecond() {
        let tm = TimeManager::configure(&TimeControl::MoveTime { time_ms: 10 }, Color::White)
            .reserve(Duration::from_millis(50), None);
        assert_eq!(tm.budget(), Some(Duration::from_millis(1)));
    }

    #[test]
    fn expired_budget_reports_time_up() {
        let tm = TimeManager::configure(&TimeControl::MoveTime { time_ms: 0 }, Color::White);
        assert!(tm.time_up());
        assert!(!tm.should_start_iteration());
    }

    #[test]
    fn remaining_is_per_side() {
        let tc = clock(5_000, 7_000, 0, None);
        assert_eq!(tc.remaining_ms(Color::Black), Some(7_000));
        assert_eq!(TimeControl::Infinite.remaining_ms(Color::White), None);
    }
}
