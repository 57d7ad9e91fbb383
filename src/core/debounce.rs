use std::time::{Duration, Instant};

/// Trailing-edge coalescing window for rapid edits.
///
/// At most one deadline is pending; scheduling again supersedes it, so a
/// burst of edits fires once, after the last one. The caller re-derives
/// what to emit at fire time, so the notification always reflects the most
/// recent state. Dropping the window discards the pending notification.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    due: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self { delay, due: None }
    }

    pub fn schedule(&mut self) {
        self.schedule_from(Instant::now());
    }

    pub fn schedule_from(&mut self, now: Instant) {
        self.due = Some(now + self.delay);
    }

    /// Drop the pending deadline; returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.due.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// True once per window, when the deadline has passed.
    pub fn fire_ready(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Debounce;
    use std::time::{Duration, Instant};

    #[test]
    fn fires_once_after_the_delay() {
        let mut debounce = Debounce::new(Duration::from_millis(500));
        let start = Instant::now();
        debounce.schedule_from(start);

        assert!(!debounce.fire_ready(start + Duration::from_millis(499)));
        assert!(debounce.fire_ready(start + Duration::from_millis(500)));
        assert!(!debounce.fire_ready(start + Duration::from_millis(501)));
    }

    #[test]
    fn rescheduling_supersedes_the_pending_deadline() {
        let mut debounce = Debounce::new(Duration::from_millis(500));
        let start = Instant::now();
        debounce.schedule_from(start);
        debounce.schedule_from(start + Duration::from_millis(400));

        assert!(!debounce.fire_ready(start + Duration::from_millis(500)));
        assert!(debounce.fire_ready(start + Duration::from_millis(900)));
    }

    #[test]
    fn cancel_discards_the_window() {
        let mut debounce = Debounce::new(Duration::from_millis(500));
        let start = Instant::now();
        debounce.schedule_from(start);
        assert!(debounce.cancel());
        assert!(!debounce.fire_ready(start + Duration::from_secs(1)));
        assert!(!debounce.cancel());
    }
}
