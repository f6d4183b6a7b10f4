//! Generation-keyed cancelable timers.
//!
//! # Responsibility
//! - Model debounce and confirmation timeouts as explicit scheduled tasks.
//! - Let hosts drive time either by polling or by echoing a ticket back.
//!
//! # Invariants
//! - Each `arm` bumps the generation; only the newest ticket can fire.
//! - A ticket fires at most once.
//! - `cancel` invalidates every outstanding ticket.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time for timers.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock backed `Clock`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock; clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Handle for one armed timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTicket {
    pub generation: u64,
    pub due: Instant,
}

/// Single-slot timer whose re-arming supersedes earlier arms.
#[derive(Debug, Default)]
pub struct Timer {
    generation: u64,
    pending: Option<TimerTicket>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms (or re-arms) the timer to fire `delay` after `now`.
    pub fn arm(&mut self, now: Instant, delay: Duration) -> TimerTicket {
        self.generation += 1;
        let ticket = TimerTicket {
            generation: self.generation,
            due: now + delay,
        };
        self.pending = Some(ticket);
        ticket
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fires the pending ticket when its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<TimerTicket> {
        let ticket = self.pending?;
        if now < ticket.due {
            return None;
        }
        self.fire(ticket, now).then_some(ticket)
    }

    /// Fires `ticket` if it is still the current one and due.
    ///
    /// Stale tickets from superseded arms return `false` and change nothing.
    pub fn fire(&mut self, ticket: TimerTicket, now: Instant) -> bool {
        let current = self.pending == Some(ticket) && ticket.generation == self.generation;
        if !current || now < ticket.due {
            return false;
        }
        self.pending = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, Timer};
    use std::time::{Duration, Instant};

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::default();
        let start = clock.now();
        let handle = clock.clone();
        handle.advance(Duration::from_secs(2));
        assert_eq!(clock.now() - start, Duration::from_secs(2));
    }

    #[test]
    fn rearm_supersedes_previous_ticket() {
        let start = Instant::now();
        let mut timer = Timer::new();
        let first = timer.arm(start, Duration::from_millis(100));
        let second = timer.arm(start + Duration::from_millis(50), Duration::from_millis(100));

        assert!(!timer.fire(first, start + Duration::from_millis(120)));
        assert!(timer.poll(start + Duration::from_millis(120)).is_none());
        assert_eq!(timer.poll(start + Duration::from_millis(150)), Some(second));
        assert!(timer.poll(start + Duration::from_millis(500)).is_none());
    }

    #[test]
    fn cancel_invalidates_outstanding_ticket() {
        let start = Instant::now();
        let mut timer = Timer::new();
        let ticket = timer.arm(start, Duration::from_millis(10));
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.fire(ticket, start + Duration::from_secs(1)));
    }
}
