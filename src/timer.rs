//! Wall-clock deadlines for searches whose budget is armed after they
//! start (a ponder search that becomes a real one on `ponderhit`).

use std::thread;
use std::time::{Duration, Instant};

use crate::sync::StopFlag;

#[inline]
fn duration_until(deadline: Instant) -> Option<Duration> {
    deadline.checked_duration_since(Instant::now()).filter(|d| !d.is_zero())
}

/// Raise `stop` at `deadline`. A deadline already in the past raises it
/// immediately; so does a failure to spawn the timer thread.
pub fn spawn_deadline_timer(deadline: Instant, stop: StopFlag) {
    let Some(wait) = duration_until(deadline) else {
        stop.stop();
        return;
    };
    let timer_flag = stop.clone();
    let spawned = thread::Builder::new()
        .name("search-deadline".to_string())
        .spawn(move || {
            thread::sleep(wait);
            timer_flag.stop();
        });
    if let Err(err) = spawned {
        log::warn!("could not spawn deadline timer: {err}; stopping now");
        stop.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_deadline() {
        let flag = StopFlag::new();
        spawn_deadline_timer(Instant::now() + Duration::from_millis(30), flag.clone());
        assert!(!flag.is_stopped());
        thread::sleep(Duration::from_millis(150));
        assert!(flag.is_stopped());
    }

    #[test]
    fn past_deadline_stops_immediately() {
        let flag = StopFlag::new();
        let past = Instant::now()
            .checked_sub(Duration::from_millis(10))
            .unwrap_or_else(Instant::now);
        spawn_deadline_timer(past, flag.clone());
        assert!(flag.is_stopped());
    }
}
