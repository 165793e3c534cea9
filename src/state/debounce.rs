use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    due: Instant,
    requested: Instant,
}

// Collapses bursts of calls into one run.
// A call runs straight away when the previous run is older than the quiet
// period; otherwise it replaces any pending run with one due a full quiet
// period later. The caller owns the action and runs it whenever `call` or
// `fire_due` returns true.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    last_run: Option<Instant>,
    scheduled: Option<Scheduled>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_run: None,
            scheduled: None,
        }
    }

    pub fn call(&mut self, now: Instant) -> bool {
        self.scheduled = None;
        let cooled = self
            .last_run
            .map_or(true, |last| now.saturating_duration_since(last) > self.quiet);
        if cooled {
            self.last_run = Some(now);
            true
        } else {
            self.scheduled = Some(Scheduled {
                due: now + self.quiet,
                requested: now,
            });
            false
        }
    }

    // Returns true when a pending run has come due. The run counts as
    // having happened at the time it was requested.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.scheduled {
            Some(scheduled) if scheduled.due <= now => {
                self.scheduled = None;
                self.last_run = Some(scheduled.requested);
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.scheduled = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.scheduled.map(|scheduled| scheduled.due)
    }

    pub fn is_pending(&self) -> bool {
        self.scheduled.is_some()
    }
}
