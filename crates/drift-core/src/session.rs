use crate::error::{Error, Result};
use crate::view::GraphView;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Starting,
    Running,
    Terminated,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }
}

/// Guards the session state machine for one driver instance.
///
/// [`Lifecycle::terminate`] reports `true` only for the first transition into `Terminated`, which
/// is what keeps finalization exactly-once across the budget, stop and teardown exits.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    state: SessionState,
    generation: u64,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of sessions started so far; identifies the current one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn begin(&mut self) -> Result<u64> {
        if self.state.is_active() {
            return Err(Error::InvalidTransition {
                action: "start",
                state: self.state,
            });
        }
        self.state = SessionState::Starting;
        self.generation += 1;
        Ok(self.generation)
    }

    pub fn mark_running(&mut self) -> Result<()> {
        if self.state != SessionState::Starting {
            return Err(Error::InvalidTransition {
                action: "run",
                state: self.state,
            });
        }
        self.state = SessionState::Running;
        Ok(())
    }

    pub fn terminate(&mut self) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.state = SessionState::Terminated;
        true
    }
}

/// Monotonic time source. Drivers take one so budgets can be tested without sleeping.
pub trait Clock {
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.micros
            .fetch_add(by.as_micros() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, to: Duration) {
        self.micros.store(to.as_micros() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::SeqCst))
    }
}

/// Budget counters of a running session: start time, elapsed ticks and progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionClock {
    pub started_at: Duration,
    pub iterations: u64,
    pub progress: f64,
}

impl SessionClock {
    pub fn starting_at(now: Duration) -> Self {
        Self {
            started_at: now,
            iterations: 0,
            progress: 0.0,
        }
    }

    /// Restarts the run's budget: progress, iterations and elapsed time all go back to zero.
    pub fn restart(&mut self, now: Duration) {
        *self = Self::starting_at(now);
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }
}

/// The lifecycle contract every layout driver exposes to its host.
pub trait LayoutSession {
    /// Layout name carried by emitted lifecycle events.
    fn name(&self) -> &str;

    fn state(&self) -> SessionState;

    /// Terminates the active session. Idempotent; a no-op from `Idle` or `Terminated`.
    fn stop(&mut self, view: &mut dyn GraphView);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_walks_the_four_states() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.state(), SessionState::Idle);
        assert_eq!(lc.begin(), Ok(1));
        assert_eq!(lc.state(), SessionState::Starting);
        lc.mark_running().unwrap();
        assert_eq!(lc.state(), SessionState::Running);
        assert!(lc.terminate());
        assert!(!lc.terminate());
        assert_eq!(lc.state(), SessionState::Terminated);
        assert_eq!(lc.begin(), Ok(2));
    }

    #[test]
    fn begin_while_active_is_rejected() {
        let mut lc = Lifecycle::new();
        lc.begin().unwrap();
        let err = lc.begin().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Lifecycle);
    }

    #[test]
    fn terminate_from_idle_is_a_no_op() {
        let mut lc = Lifecycle::new();
        assert!(!lc.terminate());
        assert_eq!(lc.state(), SessionState::Idle);
    }

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(Duration::from_millis(250));
        assert_eq!(other.now(), Duration::from_millis(250));
        let mut budget = SessionClock::starting_at(other.now());
        budget.iterations = 12;
        clock.advance(Duration::from_millis(50));
        assert_eq!(budget.elapsed(clock.now()), Duration::from_millis(50));
        budget.restart(clock.now());
        assert_eq!(budget.iterations, 0);
        assert_eq!(budget.elapsed(clock.now()), Duration::ZERO);
    }
}
