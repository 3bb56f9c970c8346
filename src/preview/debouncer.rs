use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Pure debouncer: one pending deadline, no callbacks, no global state.
///
/// The owner polls [`Debouncer::take_if_elapsed`] after sleeping for
/// [`Debouncer::sleep_duration`]. Every edit replaces the deadline, so at
/// most one trigger is ever pending.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Restart the quiet period from `now`, replacing any pending deadline.
    pub fn notify_changed(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Drop the pending deadline. Returns whether one existed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the deadline if it has passed. Fires at most once per schedule.
    pub fn take_if_elapsed(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Precise sleep duration until the deadline.
    pub fn sleep_duration(&self, now: Instant) -> Duration {
        let Some(deadline) = self.deadline else {
            return Duration::from_secs(86400);
        };

        deadline
            .saturating_duration_since(now)
            .max(Duration::from_millis(1))
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_debouncer_empty() {
        let mut debouncer = Debouncer::default();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.take_if_elapsed(Instant::now()));
        assert_eq!(debouncer.sleep_duration(Instant::now()), Duration::from_secs(86400));
    }

    #[test]
    fn test_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));

        debouncer.notify_changed(start);
        assert!(!debouncer.take_if_elapsed(start + ms(499)));
        assert!(debouncer.take_if_elapsed(start + ms(500)));

        // Cleared after firing
        assert!(!debouncer.is_pending());
        assert!(!debouncer.take_if_elapsed(start + ms(2000)));
    }

    #[test]
    fn test_reschedule_replaces_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));

        debouncer.notify_changed(start);
        debouncer.notify_changed(start + ms(100));
        debouncer.notify_changed(start + ms(200));

        assert!(!debouncer.take_if_elapsed(start + ms(600)));
        assert_eq!(debouncer.sleep_duration(start + ms(600)), ms(100));
        assert!(debouncer.take_if_elapsed(start + ms(700)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));

        assert!(!debouncer.cancel());
        debouncer.notify_changed(start);
        assert!(debouncer.cancel());
        assert!(!debouncer.take_if_elapsed(start + ms(1000)));
    }

    #[test]
    fn test_sleep_duration_never_zero() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));
        debouncer.notify_changed(start);

        assert_eq!(debouncer.sleep_duration(start), ms(500));
        assert_eq!(debouncer.sleep_duration(start + ms(900)), ms(1));
    }
}
