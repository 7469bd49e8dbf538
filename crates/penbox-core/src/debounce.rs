//! Debounce state machine.
//!
//! [`Debouncer`] is the clock-free core of the render scheduler. It has two
//! states, [`DebounceState::Idle`] and [`DebounceState::Pending`]. A change
//! moves it to `Pending` with a deadline one window ahead; every further
//! change pushes the deadline out again. Once the deadline passes with no
//! new change it fires exactly once and returns to `Idle`.
//!
//! The caller supplies `now` on every call, so the machine can be driven by
//! the Tokio clock in production and by hand in tests.

use std::time::Duration;

use tokio::time::Instant;

/// Current state of a [`Debouncer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// No change is waiting to be rendered.
    Idle,
    /// A change is waiting; it renders at `deadline` unless another change
    /// arrives first.
    Pending {
        /// When the quiescence window elapses.
        deadline: Instant,
    },
}

/// Two-state debounce machine with a fixed quiescence window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    state: DebounceState,
}

impl Debouncer {
    /// Create an idle debouncer with the given quiescence window.
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            state: DebounceState::Idle,
        }
    }

    /// The quiescence window.
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// The current state.
    pub const fn state(&self) -> DebounceState {
        self.state
    }

    /// Whether a change is waiting to be rendered.
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    /// The pending deadline, if any.
    pub const fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::Idle => None,
            DebounceState::Pending { deadline } => Some(deadline),
        }
    }

    /// Record a fragment change observed at `now`.
    ///
    /// Idle moves to Pending; Pending restarts its window. Returns the new
    /// deadline.
    pub fn record_change(&mut self, now: Instant) -> Instant {
        let deadline = now.checked_add(self.window).unwrap_or(now);
        self.state = DebounceState::Pending { deadline };
        deadline
    }

    /// Fire if the window has elapsed by `now`.
    ///
    /// Returns `true` exactly once per pending period, moving back to Idle.
    /// Returns `false` while idle or before the deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.state {
            DebounceState::Pending { deadline } if now >= deadline => {
                self.state = DebounceState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending render.
    ///
    /// Returns `true` if a render was pending.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.state = DebounceState::Idle;
        was_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(150);

    fn at(base: Instant, ms: u64) -> Instant {
        base.checked_add(Duration::from_millis(ms)).unwrap_or(base)
    }

    #[test]
    fn starts_idle() {
        let debouncer = Debouncer::new(WINDOW);
        assert_eq!(debouncer.state(), DebounceState::Idle);
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn change_moves_to_pending() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        let deadline = debouncer.record_change(base);
        assert_eq!(deadline, at(base, 150));
        assert!(debouncer.is_pending());
    }

    #[test]
    fn does_not_fire_before_deadline() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.record_change(base);
        assert!(!debouncer.fire_if_due(at(base, 149)));
        assert!(debouncer.is_pending());
    }

    #[test]
    fn fires_once_after_deadline() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.record_change(base);
        assert!(debouncer.fire_if_due(at(base, 150)));
        assert!(!debouncer.fire_if_due(at(base, 400)));
        assert_eq!(debouncer.state(), DebounceState::Idle);
    }

    #[test]
    fn each_change_restarts_window() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.record_change(base);
        debouncer.record_change(at(base, 100));
        debouncer.record_change(at(base, 200));
        assert!(!debouncer.fire_if_due(at(base, 300)));
        assert!(debouncer.fire_if_due(at(base, 350)));
    }

    #[test]
    fn cancel_prevents_firing() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.record_change(base);
        assert!(debouncer.cancel());
        assert!(!debouncer.fire_if_due(at(base, 1_000)));
        assert!(!debouncer.cancel());
    }

    #[test]
    fn idle_never_fires() {
        let mut debouncer = Debouncer::new(WINDOW);
        assert!(!debouncer.fire_if_due(Instant::now()));
    }
}
