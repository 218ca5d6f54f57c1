//! Quiet-period debouncing for filesystem event bursts.

use std::time::{Duration, Instant};

/// Coalesces a burst of events into exactly one trigger per quiescent
/// period.
///
/// Every [`record`](Debouncer::record) arms (or re-arms) a deadline one
/// debounce-duration into the future; [`take_ready`](Debouncer::take_ready)
/// fires once when the deadline passes without another event. Independent
/// of any filesystem, so the "exactly one trigger" property is testable on
/// its own.
#[derive(Debug)]
pub struct Debouncer {
    deadline: Option<Instant>,
    duration: Duration,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period in milliseconds.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            deadline: None,
            duration: Duration::from_millis(debounce_ms),
        }
    }

    /// Record an event, resetting the quiet-period deadline.
    pub fn record(&mut self) {
        self.deadline = Some(Instant::now() + self.duration);
    }

    /// Consume the trigger if the quiet period has elapsed.
    ///
    /// Returns true at most once per recorded burst.
    pub fn take_ready(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a trigger is armed but not yet fired.
    pub fn has_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn fires_once_after_quiet_period() {
        let mut debouncer = Debouncer::new(50);
        debouncer.record();

        // Immediately after, nothing is ready.
        assert!(!debouncer.take_ready());
        assert!(debouncer.has_pending());

        sleep(Duration::from_millis(60));

        assert!(debouncer.take_ready());
        // The trigger is consumed; it does not fire again.
        assert!(!debouncer.take_ready());
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn new_event_resets_the_deadline() {
        let mut debouncer = Debouncer::new(50);
        debouncer.record();

        sleep(Duration::from_millis(30));
        debouncer.record();

        // 60ms since the first event but only 30ms since the second.
        sleep(Duration::from_millis(30));
        assert!(!debouncer.take_ready());

        sleep(Duration::from_millis(30));
        assert!(debouncer.take_ready());
    }

    #[test]
    fn burst_collapses_to_one_trigger() {
        let mut debouncer = Debouncer::new(50);
        for _ in 0..5 {
            debouncer.record();
            sleep(Duration::from_millis(5));
        }

        sleep(Duration::from_millis(60));

        let mut fired = 0;
        for _ in 0..10 {
            if debouncer.take_ready() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn idle_debouncer_never_fires() {
        let mut debouncer = Debouncer::new(10);
        sleep(Duration::from_millis(20));
        assert!(!debouncer.take_ready());
        assert!(!debouncer.has_pending());
    }
}
