//! Shared incumbent (best order found so far).
//!
//! Workers read a lock-free makespan hint to reject clearly worse candidates
//! and take the mutex only when a candidate might win. The mutex-guarded
//! `(makespan, ranks)` pair is the source of truth, so the hint may lag but
//! never causes a lost update or a torn read.
//!
//! Candidates compare by makespan first, then lexicographically by their
//! rank sequence. Only strictly smaller candidates are installed, which makes
//! the final incumbent independent of the order in which workers report.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::Time;

/// A complete order (as table ranks) and its makespan.
///
/// The derived ordering is `(makespan, ranks)` lexicographic, i.e. the
/// search's tie-break rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Candidate {
    pub(crate) makespan: Time,
    pub(crate) ranks: Vec<usize>,
}

#[derive(Debug)]
pub(crate) struct SharedIncumbent {
    upper_bound: AtomicI64,
    best: Mutex<Option<Candidate>>,
}

impl SharedIncumbent {
    pub(crate) fn new() -> Self {
        Self {
            upper_bound: AtomicI64::new(Time::MAX),
            best: Mutex::new(None),
        }
    }

    /// Current makespan hint; `Time::MAX` while empty.
    #[inline]
    pub(crate) fn upper_bound(&self) -> Time {
        self.upper_bound.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Candidate>> {
        self.best.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Installs `(makespan, ranks)` if it beats the incumbent.
    ///
    /// Returns `true` if installed.
    pub(crate) fn try_install(&self, makespan: Time, ranks: &[usize]) -> bool {
        // Equal makespans may still win on the rank tie-break.
        if makespan > self.upper_bound() {
            return false;
        }

        let mut guard = self.lock();
        if let Some(current) = guard.as_ref() {
            if (makespan, ranks) >= (current.makespan, current.ranks.as_slice()) {
                return false;
            }
        }
        *guard = Some(Candidate {
            makespan,
            ranks: ranks.to_vec(),
        });
        self.upper_bound.store(makespan, Ordering::Relaxed);
        true
    }

    /// Whether every completion of `prefix` is beaten by the incumbent,
    /// given that none can finish before `lower_bound`.
    pub(crate) fn dominates(&self, lower_bound: Time, prefix: &[usize]) -> bool {
        if lower_bound < self.upper_bound() {
            return false;
        }

        let guard = self.lock();
        match guard.as_ref() {
            None => false,
            Some(current) if lower_bound > current.makespan => true,
            Some(current) if lower_bound == current.makespan => {
                let len = prefix.len().min(current.ranks.len());
                prefix > &current.ranks[..len]
            }
            Some(_) => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Option<Candidate> {
        self.lock().clone()
    }

    pub(crate) fn into_best(self) -> Option<Candidate> {
        self.best
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_install_strictly_better() {
        let inc = SharedIncumbent::new();
        assert_eq!(inc.upper_bound(), Time::MAX);
        assert!(inc.try_install(50, &[1, 0, 2]));
        assert_eq!(inc.upper_bound(), 50);
        assert!(!inc.try_install(60, &[0, 1, 2]));
        assert!(!inc.try_install(50, &[1, 0, 2]));
        assert!(!inc.try_install(50, &[2, 0, 1]));
        // Tie on makespan, lexicographically smaller order wins.
        assert!(inc.try_install(50, &[0, 2, 1]));
        assert!(inc.try_install(40, &[2, 1, 0]));
        assert_eq!(
            inc.into_best(),
            Some(Candidate {
                makespan: 40,
                ranks: vec![2, 1, 0]
            })
        );
    }

    #[test]
    fn test_dominates() {
        let inc = SharedIncumbent::new();
        assert!(!inc.dominates(100, &[0]));
        inc.try_install(50, &[1, 0, 2]);
        assert!(inc.dominates(51, &[0]));
        assert!(!inc.dominates(49, &[2]));
        // Equal bound: only prefixes ordered after the incumbent's are cut.
        assert!(inc.dominates(50, &[2]));
        assert!(inc.dominates(50, &[1, 2]));
        assert!(!inc.dominates(50, &[1, 0]));
        assert!(!inc.dominates(50, &[0]));
    }

    #[test]
    fn test_concurrent_installs_keep_minimum() {
        let inc = Arc::new(SharedIncumbent::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let inc = Arc::clone(&inc);
                thread::spawn(move || {
                    for m in (10..200).rev() {
                        inc.try_install(m, &[t, m as usize]);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let best = inc.snapshot().unwrap();
        assert_eq!(best.makespan, 10);
        assert_eq!(best.ranks, vec![0, 10]);
        assert_eq!(inc.upper_bound(), 10);
    }
}
