//! # Cognitive Process Record
//!
//! The host owns one [`CogProc`] per unit of work it wants the attention
//! scheduler to see. The record is shared through `Arc`: the host keeps its
//! handle while a bucket holds another, so queues borrow processes instead
//! of copying them.
//!
//! Bucket membership lives in a single atomic. It is only changed while the
//! lock of the bucket being entered or left is held, so at every bucket-lock
//! release `bucket() == Some(i)` exactly when the process sits in bucket `i`.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use bitflags::bitflags;
use spin::Mutex;

use crate::clock::Tick;
use crate::feature::{FeatureVector, FEATURE_COUNT};

/// Host process identifier
pub type Pid = u64;

/// Membership value for "not in any bucket"
const NOT_QUEUED: usize = usize::MAX;

bitflags! {
    /// Per-process scheduling flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProcFlags: u32 {
        /// Managed by the attention scheduler
        const COGNITIVE = 1 << 0;
        /// Counted in the tensor's active process count
        const TRACKED   = 1 << 1;
    }
}

// =============================================================================
// CogProc
// =============================================================================

/// Attention-managed process record
#[derive(Debug)]
pub struct CogProc {
    pid: Pid,
    flags: AtomicU32,
    /// Recent CPU consumption in per-mille, fed by the host
    cpu: AtomicU32,
    /// Legacy scheduler priority, fed by the host
    priority: AtomicU32,
    vector: Mutex<FeatureVector>,
    bucket: AtomicUsize,
}

impl CogProc {
    /// Create a non-cognitive record
    pub fn new(pid: Pid) -> Self {
        Self {
            pid,
            flags: AtomicU32::new(0),
            cpu: AtomicU32::new(0),
            priority: AtomicU32::new(0),
            vector: Mutex::new(FeatureVector::new()),
            bucket: AtomicUsize::new(NOT_QUEUED),
        }
    }

    /// Create a record already marked cognitive
    pub fn cognitive(pid: Pid) -> Self {
        let proc = Self::new(pid);
        proc.set_cognitive(true);
        proc
    }

    /// Process identifier
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Current flags
    pub fn flags(&self) -> ProcFlags {
        ProcFlags::from_bits_truncate(self.flags.load(Ordering::Acquire))
    }

    /// Is this process attention-managed?
    pub fn is_cognitive(&self) -> bool {
        self.flags().contains(ProcFlags::COGNITIVE)
    }

    /// Mark or unmark the process as attention-managed
    pub fn set_cognitive(&self, enable: bool) {
        if enable {
            self.flags.fetch_or(ProcFlags::COGNITIVE.bits(), Ordering::AcqRel);
        } else {
            self.flags
                .fetch_and(!ProcFlags::COGNITIVE.bits(), Ordering::AcqRel);
        }
    }

    /// Report recent CPU consumption (per-mille of one CPU)
    pub fn set_cpu_usage(&self, per_mille: u32) {
        self.cpu.store(per_mille, Ordering::Relaxed);
    }

    /// Recent CPU consumption
    pub fn cpu_usage(&self) -> u32 {
        self.cpu.load(Ordering::Relaxed)
    }

    /// Report legacy scheduler priority
    pub fn set_priority(&self, priority: u32) {
        self.priority.store(priority, Ordering::Relaxed);
    }

    /// Legacy scheduler priority
    pub fn priority(&self) -> u32 {
        self.priority.load(Ordering::Relaxed)
    }

    /// Copy of the feature state
    pub fn snapshot(&self) -> FeatureVector {
        *self.vector.lock()
    }

    /// Direct read of one feature slot, bypassing scoring
    pub fn feature(&self, index: usize) -> f32 {
        self.vector.lock().get(index)
    }

    /// All feature slots
    pub fn features(&self) -> [f32; FEATURE_COUNT] {
        *self.vector.lock().features()
    }

    /// Last computed attention level, regardless of the cognitive flag
    pub fn attention_level(&self) -> f32 {
        self.vector.lock().attention_level()
    }

    /// Tick of the last refresh or dispatch
    pub fn last_update(&self) -> Tick {
        self.vector.lock().last_update()
    }

    /// Bucket currently holding this process
    pub fn bucket(&self) -> Option<usize> {
        match self.bucket.load(Ordering::Acquire) {
            NOT_QUEUED => None,
            level => Some(level),
        }
    }

    // -------------------------------------------------------------------------
    // Crate-internal mutation
    // -------------------------------------------------------------------------

    pub(crate) fn with_vector<R>(&self, f: impl FnOnce(&mut FeatureVector) -> R) -> R {
        f(&mut *self.vector.lock())
    }

    /// Claim membership of `level`. Caller holds that bucket's lock.
    pub(crate) fn claim_bucket(&self, level: usize) -> bool {
        self.bucket
            .compare_exchange(NOT_QUEUED, level, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Release membership of `level`. Caller holds that bucket's lock.
    pub(crate) fn release_bucket(&self, level: usize) -> bool {
        self.bucket
            .compare_exchange(level, NOT_QUEUED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Set `TRACKED`, returning whether it was newly set
    pub(crate) fn mark_tracked(&self) -> bool {
        let prev = self.flags.fetch_or(ProcFlags::TRACKED.bits(), Ordering::AcqRel);
        prev & ProcFlags::TRACKED.bits() == 0
    }

    /// Clear `TRACKED`, returning whether it was set
    pub(crate) fn clear_tracked(&self) -> bool {
        let prev = self
            .flags
            .fetch_and(!ProcFlags::TRACKED.bits(), Ordering::AcqRel);
        prev & ProcFlags::TRACKED.bits() != 0
    }
}

static_assertions::assert_impl_all!(CogProc: Send, Sync);

// =============================================================================
// TESTS
// =============================================================================
