//! # Attention Buckets
//!
//! One FIFO per attention level, each behind its own spin lock:
//!
//! ```text
//!   level  threshold   head ─────────────────────▶ tail
//!   ─────  ─────────   ─────────────────────────────────
//!     0      1.00      [P4]
//!     1      0.75      [P9][P2]
//!     2      0.50      (empty)
//!     3      0.25      [P1][P7][P3]      ◀── also catches scores < 0.25
//! ```
//!
//! Insertion takes the lock blocking; removal takes it with `try_lock` and
//! reports [`RemoveOutcome::Contended`] instead of spinning.

extern crate alloc;

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::ptr;
use core::sync::atomic::{AtomicUsize, Ordering};

use spin::Mutex;

use crate::process::CogProc;

/// Static threshold of `level` out of `levels` buckets
#[inline]
pub fn threshold_for(level: usize, levels: usize) -> f32 {
    (levels - level) as f32 / levels as f32
}

// =============================================================================
// RemoveOutcome
// =============================================================================

/// Result of a non-blocking bucket removal
#[derive(Debug, Clone)]
pub enum RemoveOutcome {
    /// The process was unlinked and is returned
    Removed(Arc<CogProc>),
    /// The bucket does not hold the process (or is empty)
    NotFound,
    /// The bucket lock was held elsewhere; try again next cycle
    Contended,
}

impl RemoveOutcome {
    /// Was a process unlinked?
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed(_))
    }

    /// Was the attempt lost to lock contention?
    pub fn is_contended(&self) -> bool {
        matches!(self, Self::Contended)
    }

    /// Take the removed process, if any
    pub fn into_removed(self) -> Option<Arc<CogProc>> {
        match self {
            Self::Removed(proc) => Some(proc),
            _ => None,
        }
    }
}

// =============================================================================
// AttentionQueue
// =============================================================================

/// A single attention bucket
#[derive(Debug)]
pub struct AttentionQueue {
    level: usize,
    threshold: f32,
    procs: Mutex<VecDeque<Arc<CogProc>>>,
    /// Mirror of `procs.len()`, written under the lock
    count: AtomicUsize,
}

impl AttentionQueue {
    /// Create an empty bucket
    pub fn new(level: usize, threshold: f32) -> Self {
        Self {
            level,
            threshold,
            procs: Mutex::new(VecDeque::new()),
            count: AtomicUsize::new(0),
        }
    }

    /// Bucket index (0 = highest priority)
    pub fn level(&self) -> usize {
        self.level
    }

    /// Minimum attention this bucket accepts
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Member count, read without the lock
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Is the bucket empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Link `proc` at the tail.
    ///
    /// Fails if the process is already a member of some bucket.
    pub fn push_back(&self, proc: &Arc<CogProc>) -> bool {
        let mut procs = self.procs.lock();
        if !proc.claim_bucket(self.level) {
            return false;
        }
        procs.push_back(Arc::clone(proc));
        self.count.store(procs.len(), Ordering::Release);
        true
    }

    /// Unlink the head without blocking
    pub fn try_pop_front(&self) -> RemoveOutcome {
        let Some(mut procs) = self.procs.try_lock() else {
            return RemoveOutcome::Contended;
        };
        match procs.pop_front() {
            Some(proc) => {
                proc.release_bucket(self.level);
                self.count.store(procs.len(), Ordering::Release);
                RemoveOutcome::Removed(proc)
            }
            None => RemoveOutcome::NotFound,
        }
    }

    /// Unlink a specific member without blocking
    pub fn try_remove(&self, proc: &CogProc) -> RemoveOutcome {
        match self.procs.try_lock() {
            Some(mut procs) => self.unlink(&mut procs, proc),
            None => RemoveOutcome::Contended,
        }
    }

    /// Unlink a specific member, waiting for the lock
    pub(crate) fn remove(&self, proc: &CogProc) -> RemoveOutcome {
        let mut procs = self.procs.lock();
        self.unlink(&mut procs, proc)
    }

    fn unlink(&self, procs: &mut VecDeque<Arc<CogProc>>, proc: &CogProc) -> RemoveOutcome {
        let Some(pos) = procs.iter().position(|p| ptr::eq(&**p, proc)) else {
            return RemoveOutcome::NotFound;
        };
        match procs.remove(pos) {
            Some(proc) => {
                proc.release_bucket(self.level);
                self.count.store(procs.len(), Ordering::Release);
                RemoveOutcome::Removed(proc)
            }
            None => RemoveOutcome::NotFound,
        }
    }

    /// Handles of all members in FIFO order
    pub fn members(&self) -> Vec<Arc<CogProc>> {
        self.procs.lock().iter().cloned().collect()
    }

    #[cfg(test)]
    pub(crate) fn procs_lock_for_test(&self) -> spin::MutexGuard<'_, VecDeque<Arc<CogProc>>> {
        self.procs.lock()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Pid;

    fn procs(n: u64) -> Vec<Arc<CogProc>> {
        (1..=n).map(|pid| Arc::new(CogProc::cognitive(pid))).collect()
    }

    #[test]
    fn test_thresholds_descend() {
        let t: Vec<f32> = (0..4).map(|i| threshold_for(i, 4)).collect();
        assert_eq!(t, [1.0, 0.75, 0.5, 0.25]);
    }

    #[test]
    fn test_fifo_order() {
        let q = AttentionQueue::new(0, 1.0);
        let ps = procs(5);
        for p in &ps {
            assert!(q.push_back(p));
        }
        assert_eq!(q.len(), 5);

        for expected in 1..=5 {
            let p = q.try_pop_front().into_removed().unwrap();
            assert_eq!(p.pid(), expected);
            assert_eq!(p.bucket(), None);
        }
        assert!(q.is_empty());
        assert!(matches!(q.try_pop_front(), RemoveOutcome::NotFound));
    }

    #[test]
    fn test_double_push_rejected() {
        let q0 = AttentionQueue::new(0, 1.0);
        let q1 = AttentionQueue::new(1, 0.5);
        let p = Arc::new(CogProc::cognitive(9));

        assert!(q0.push_back(&p));
        assert!(!q0.push_back(&p));
        assert!(!q1.push_back(&p));
        assert_eq!(q0.len(), 1);
        assert_eq!(q1.len(), 0);
    }

    #[test]
    fn test_remove_middle_tail_and_missing() {
        let q = AttentionQueue::new(2, 0.5);
        let ps = procs(4);
        for p in &ps {
            assert!(q.push_back(p));
        }

        assert!(q.try_remove(&ps[1]).is_removed());
        assert!(q.try_remove(&ps[3]).is_removed());
        assert!(matches!(q.try_remove(&ps[3]), RemoveOutcome::NotFound));

        // Same pid, different record: not a member
        let imposter = CogProc::cognitive(1);
        assert!(matches!(q.try_remove(&imposter), RemoveOutcome::NotFound));

        let order: Vec<Pid> = q.members().iter().map(|p| p.pid()).collect();
        assert_eq!(order, [1, 3]);

        // Tail is still correct after unlinking the old tail
        let p5 = Arc::new(CogProc::cognitive(5));
        q.push_back(&p5);
        let order: Vec<Pid> = q.members().iter().map(|p| p.pid()).collect();
        assert_eq!(order, [1, 3, 5]);
    }

    #[test]
    fn test_contended_removal_fails_fast() {
        let q = AttentionQueue::new(0, 1.0);
        let p = Arc::new(CogProc::cognitive(1));
        q.push_back(&p);

        let guard = q.procs_lock_for_test();
        assert!(q.try_remove(&p).is_contended());
        assert!(q.try_pop_front().is_contended());
        drop(guard);

        assert!(q.try_remove(&p).is_removed());
    }
}
