use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Longest single sleep, so cancellation is noticed promptly.
const MAX_SLEEP_SLICE: Duration = Duration::from_millis(20);

/// Paces the detection loop at a fixed refresh rate.
///
/// Deadlines advance by whole intervals from the first tick, so a slow
/// tick is followed by an immediate one instead of drifting. When more than
/// one interval is missed the schedule restarts from now.
pub struct RefreshClock {
    interval: Duration,
    next: Option<Instant>,
}

impl RefreshClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: None,
        }
    }

    /// Blocks until the next tick. Returns `false` if cancelled meanwhile.
    pub fn wait(&mut self, cancelled: &AtomicBool) -> bool {
        let now = Instant::now();
        let deadline = match self.next {
            None => now,
            Some(next) if next + self.interval < now => now,
            Some(next) => next,
        };
        self.next = Some(deadline + self.interval);
        sleep_until(deadline, cancelled)
    }
}

/// Sleeps in short slices until `deadline`. Returns `false` as soon as
/// `cancelled` is set.
pub fn sleep_until(deadline: Instant, cancelled: &AtomicBool) -> bool {
    loop {
        if cancelled.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(MAX_SLEEP_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_immediate() {
        let mut clock = RefreshClock::new(Duration::from_secs(10));
        let start = Instant::now();
        assert!(clock.wait(&AtomicBool::new(false)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_second_tick_waits_one_interval() {
        let mut clock = RefreshClock::new(Duration::from_millis(30));
        let flag = AtomicBool::new(false);
        clock.wait(&flag);
        let start = Instant::now();
        clock.wait(&flag);
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn test_cancelled_wait_returns_false() {
        let mut clock = RefreshClock::new(Duration::from_secs(10));
        let flag = AtomicBool::new(false);
        clock.wait(&flag);
        flag.store(true, Ordering::Relaxed);
        let start = Instant::now();
        assert!(!clock.wait(&flag));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_sleep_until_past_deadline_returns_immediately() {
        assert!(sleep_until(Instant::now(), &AtomicBool::new(false)));
    }
}
