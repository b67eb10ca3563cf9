//! Cooperative cancellation for search workers.
//!
//! Each worker owns a [`SearchMonitor`] and polls it once per search node.
//! The monitor watches an optional caller-supplied stop flag and an optional
//! wall-clock deadline. The clock is read only every
//! `CLOCK_CHECK_MASK + 1` steps. Whichever worker first observes a stop
//! condition raises the shared [`StopSignal`] so the others wind down too.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Instant;

use super::TerminationReason;

/// Check the clock every 1024 steps.
const CLOCK_CHECK_MASK: u64 = 0x3FF;

const RUNNING: u8 = 0;
const TIME_LIMIT: u8 = 1;
const INTERRUPTED: u8 = 2;

/// Shared "stop now" state with the reason that raised it first.
#[derive(Debug, Default)]
pub(crate) struct StopSignal {
    state: AtomicU8,
}

impl StopSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn is_raised(&self) -> bool {
        self.state.load(Ordering::Relaxed) != RUNNING
    }

    fn raise(&self, code: u8) {
        // First reason wins.
        let _ = self
            .state
            .compare_exchange(RUNNING, code, Ordering::Relaxed, Ordering::Relaxed);
    }

    /// Why the search stopped early, if it did.
    pub(crate) fn reason(&self) -> Option<TerminationReason> {
        match self.state.load(Ordering::Relaxed) {
            TIME_LIMIT => Some(TerminationReason::TimeLimitReached),
            INTERRUPTED => Some(TerminationReason::Interrupted),
            _ => None,
        }
    }
}

/// Per-worker view of the stop conditions.
#[derive(Debug)]
pub(crate) struct SearchMonitor<'a> {
    signal: &'a StopSignal,
    stop_flag: Option<&'a AtomicBool>,
    deadline: Option<Instant>,
    steps: u64,
}

impl<'a> SearchMonitor<'a> {
    pub(crate) fn new(
        signal: &'a StopSignal,
        stop_flag: Option<&'a AtomicBool>,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            signal,
            stop_flag,
            deadline,
            steps: 0,
        }
    }

    /// Called once per node; `true` means abandon the search.
    #[inline]
    pub(crate) fn should_stop(&mut self) -> bool {
        let step = self.steps;
        self.steps = self.steps.wrapping_add(1);

        if self.signal.is_raised() {
            return true;
        }
        if self
            .stop_flag
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            self.signal.raise(INTERRUPTED);
            return true;
        }
        if step & CLOCK_CHECK_MASK == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    self.signal.raise(TIME_LIMIT);
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_continues_without_limits() {
        let signal = StopSignal::new();
        let mut monitor = SearchMonitor::new(&signal, None, None);
        for _ in 0..5000 {
            assert!(!monitor.should_stop());
        }
        assert_eq!(signal.reason(), None);
    }

    #[test]
    fn test_stop_flag_interrupts() {
        let signal = StopSignal::new();
        let flag = AtomicBool::new(false);
        let mut monitor = SearchMonitor::new(&signal, Some(&flag), None);
        assert!(!monitor.should_stop());
        flag.store(true, Ordering::Relaxed);
        assert!(monitor.should_stop());
        assert_eq!(signal.reason(), Some(TerminationReason::Interrupted));
    }

    #[test]
    fn test_expired_deadline_checked_on_first_step() {
        let signal = StopSignal::new();
        let deadline = Instant::now();
        std::thread::sleep(Duration::from_millis(1));
        let mut monitor = SearchMonitor::new(&signal, None, Some(deadline));
        assert!(monitor.should_stop());
        assert_eq!(signal.reason(), Some(TerminationReason::TimeLimitReached));

        // Other workers see the raised signal.
        let mut other = SearchMonitor::new(&signal, None, None);
        assert!(other.should_stop());
    }

    #[test]
    fn test_first_reason_wins() {
        let signal = StopSignal::new();
        signal.raise(TIME_LIMIT);
        signal.raise(INTERRUPTED);
        assert_eq!(signal.reason(), Some(TerminationReason::TimeLimitReached));
    }
}
