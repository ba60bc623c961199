//! # Attention Allocator
//!
//! The allocator composes the bucket array, the history tensor and the
//! global policy state, and exposes the calls a host scheduler makes.
//!
//! ```text
//!   host                         AttentionAllocator
//!   ────                         ──────────────────
//!   ready(p)      ──────▶  rescore ─▶ level_for ─▶ bucket[i].push_back
//!   select_next() ──────▶  bucket[0..L].try_pop_front  (first hit wins)
//!   refresh(p)    ──────▶  dynamic features ─▶ tensor.advance
//!   set_emergency_mode ──▶ flag (host consults it, core does not)
//! ```
//!
//! ## Lock Domains
//!
//! | Domain | Guards | Acquired |
//! |--------|--------|----------|
//! | bucket (one per level) | FIFO + membership | blocking on insert, `try_lock` on removal |
//! | tensor | ring, slot, active count | blocking |
//! | allocator | budget, last update, init/emergency writes | blocking |
//!
//! No call holds locks from two domains at once.

extern crate alloc;

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use spin::{Mutex, Once};

use crate::clock::{Tick, TickSource};
use crate::config::CogConfig;
use crate::error::CogResult;
use crate::feature::{Feature, FEATURE_COUNT};
use crate::process::CogProc;
use crate::queue::{threshold_for, AttentionQueue, RemoveOutcome};
use crate::score;
use crate::tensor::AttentionTensor;

// =============================================================================
// Internal State
// =============================================================================

/// Structures built by the one-shot initialization
#[derive(Debug)]
struct AllocatorCore {
    queues: Box<[AttentionQueue]>,
    tensor: AttentionTensor,
}

impl AllocatorCore {
    fn new(config: &CogConfig) -> Self {
        let levels = config.attention_levels;
        let queues = (0..levels)
            .map(|level| AttentionQueue::new(level, threshold_for(level, levels)))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            queues,
            tensor: AttentionTensor::new(config.max_procs, config.time_window),
        }
    }
}

/// Fields guarded by the allocator lock
#[derive(Debug, Default)]
struct GlobalState {
    total_attention_budget: u64,
    last_update_tick: Tick,
}

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    dispatched: AtomicU64,
    contended: AtomicU64,
    refreshes: AtomicU64,
}

/// Point-in-time allocator statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocatorStats {
    /// Successful bucket insertions
    pub enqueued: u64,
    /// Processes handed out by `select_next`
    pub dispatched: u64,
    /// Removals lost to bucket contention
    pub contended: u64,
    /// Refreshes that changed features
    pub refreshes: u64,
    /// Member count per bucket, highest priority first
    pub bucket_lengths: Vec<usize>,
    /// Emergency flag
    pub emergency_mode: bool,
    /// Advisory attention budget
    pub total_attention_budget: u64,
    /// Tick of the last effective refresh
    pub last_update_tick: Tick,
    /// Current tensor ring slot
    pub tensor_slot: usize,
    /// Advisory tracked-process count
    pub active_procs: usize,
}

// =============================================================================
// AttentionAllocator
// =============================================================================

/// Attention-based process selector
#[derive(Debug)]
pub struct AttentionAllocator<C: TickSource> {
    config: CogConfig,
    clock: C,
    core: Once<AllocatorCore>,
    global: Mutex<GlobalState>,
    initialized: AtomicBool,
    emergency: AtomicBool,
    counters: Counters,
}

impl<C: TickSource> AttentionAllocator<C> {
    /// Create an uninitialized allocator
    pub fn new(config: CogConfig, clock: C) -> CogResult<Self> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    /// Create and initialize with the default configuration
    pub fn with_clock(clock: C) -> Self {
        let allocator = Self::build(CogConfig::default(), clock);
        allocator.initialize();
        allocator
    }

    fn build(config: CogConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            core: Once::new(),
            global: Mutex::new(GlobalState::default()),
            initialized: AtomicBool::new(false),
            emergency: AtomicBool::new(false),
            counters: Counters::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &CogConfig {
        &self.config
    }

    /// Host clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Build the buckets, zero the tensor and set the default budget.
    ///
    /// Only the first call has any effect.
    pub fn initialize(&self) {
        if self.initialized.load(Ordering::Acquire) {
            return;
        }

        let mut global = self.global.lock();
        if self.initialized.load(Ordering::Acquire) {
            return;
        }

        self.core.call_once(|| AllocatorCore::new(&self.config));
        global.total_attention_budget = self.config.attention_budget;
        global.last_update_tick = 0;
        self.emergency.store(false, Ordering::Release);
        self.initialized.store(true, Ordering::Release);
        drop(global);

        log::info!(
            "CogSched: initialized ({} levels, tensor {}x{}x{}, budget {})",
            self.config.attention_levels,
            self.config.max_procs,
            FEATURE_COUNT,
            self.config.time_window,
            self.config.attention_budget
        );
    }

    /// Has `initialize` run?
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Relaxed)
    }

    fn ensure_core(&self) -> &AllocatorCore {
        self.initialize();
        self.core.call_once(|| AllocatorCore::new(&self.config))
    }

    // -------------------------------------------------------------------------
    // Scheduling Path
    // -------------------------------------------------------------------------

    /// Bucket a score maps to: the first level whose threshold it meets,
    /// or the lowest level when it meets none
    pub fn level_for(&self, attention: f32) -> usize {
        let levels = self.config.attention_levels;
        (0..levels)
            .find(|&level| attention >= threshold_for(level, levels))
            .unwrap_or(levels - 1)
    }

    /// Score a runnable process and file it into its bucket.
    ///
    /// Non-cognitive processes are ignored. A process that is already queued
    /// moves to the tail of the bucket matching its new score.
    pub fn ready(&self, proc: &Arc<CogProc>) {
        if !proc.is_cognitive() {
            return;
        }

        let core = self.ensure_core();
        let attention = proc.with_vector(score::rescore);

        if proc.mark_tracked() {
            core.tensor.track();
        }

        let level = self.level_for(attention);
        let target = &core.queues[level];

        loop {
            match proc.bucket() {
                None => {
                    if target.push_back(proc) {
                        break;
                    }
                }
                Some(current) => {
                    let Some(queue) = core.queues.get(current) else {
                        log::warn!(
                            "CogSched: pid {} queued in foreign bucket {}",
                            proc.pid(),
                            current
                        );
                        return;
                    };
                    queue.remove(proc);
                }
            }
        }

        self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        log::trace!(
            "CogSched: pid {} ready, attention {:.3} -> bucket {}",
            proc.pid(),
            attention,
            level
        );
    }

    /// Pop the head of the highest-priority non-empty bucket.
    ///
    /// A bucket whose lock is busy is skipped for this round.
    pub fn select_next(&self) -> Option<Arc<CogProc>> {
        let core = self.core.get()?;

        for queue in core.queues.iter() {
            if queue.is_empty() {
                continue;
            }

            match queue.try_pop_front() {
                RemoveOutcome::Removed(proc) => {
                    let now = self.clock.now();
                    proc.with_vector(|v| v.set_last_update(now));
                    self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
                    log::trace!(
                        "CogSched: dispatch pid {} from bucket {}",
                        proc.pid(),
                        queue.level()
                    );
                    return Some(proc);
                }
                RemoveOutcome::Contended => {
                    self.counters.contended.fetch_add(1, Ordering::Relaxed);
                    log::debug!("CogSched: bucket {} busy, skipped", queue.level());
                }
                RemoveOutcome::NotFound => {}
            }
        }

        None
    }

    /// Unlink a specific process from its bucket without blocking
    pub fn remove(&self, proc: &CogProc) -> RemoveOutcome {
        let outcome = match (self.core.get(), proc.bucket()) {
            (Some(core), Some(level)) => core
                .queues
                .get(level)
                .map_or(RemoveOutcome::NotFound, |queue| queue.try_remove(proc)),
            _ => RemoveOutcome::NotFound,
        };

        match &outcome {
            RemoveOutcome::Removed(_) => {
                log::debug!("CogSched: pid {} removed", proc.pid());
            }
            RemoveOutcome::Contended => {
                self.counters.contended.fetch_add(1, Ordering::Relaxed);
                log::debug!("CogSched: pid {} removal contended", proc.pid());
            }
            RemoveOutcome::NotFound => {}
        }

        outcome
    }

    /// Drop an exiting process from its bucket and from the tracked count.
    ///
    /// On [`RemoveOutcome::Contended`] nothing changes and the host should
    /// retry.
    pub fn retire(&self, proc: &CogProc) -> RemoveOutcome {
        let outcome = self.remove(proc);
        if outcome.is_contended() {
            return outcome;
        }

        if proc.clear_tracked() {
            if let Some(core) = self.core.get() {
                core.tensor.untrack();
            }
        }

        outcome
    }

    /// Recompute the dynamic features of `proc`.
    ///
    /// A second call within the same tick is a no-op. The attention level
    /// and bucket placement are left as they are until the next `ready`.
    pub fn refresh(&self, proc: &CogProc) {
        if !proc.is_cognitive() {
            return;
        }

        let now = self.clock.now();
        let interactive_window = self.clock.hz() / self.config.interactive_divisor;
        let load = proc.cpu_usage() as f32 / 1000.0;
        let priority = proc.priority() as f32 / self.config.priority_levels as f32;
        let memory = self.config.memory_baseline;

        let refreshed = proc.with_vector(|v| {
            let delta = now.wrapping_sub(v.last_update());
            if delta == 0 {
                return false;
            }

            let interactive = if delta < interactive_window { 1.0 } else { 0.1 };
            v.set_feature(Feature::Load, load);
            v.set_feature(Feature::Memory, memory);
            v.set_feature(Feature::Interactive, interactive);
            v.set_feature(Feature::Priority, priority);
            v.set_last_update(now);
            true
        });

        if !refreshed {
            return;
        }

        if let Some(core) = self.core.get() {
            core.tensor.advance(now);
        }
        self.global.lock().last_update_tick = now;
        self.counters.refreshes.fetch_add(1, Ordering::Relaxed);
        log::trace!("CogSched: pid {} refreshed at tick {}", proc.pid(), now);
    }

    // -------------------------------------------------------------------------
    // Feature Access
    // -------------------------------------------------------------------------

    /// Write one feature. Ignored for non-cognitive processes and
    /// out-of-range indices.
    pub fn set_feature(&self, proc: &CogProc, index: usize, value: f32) {
        if !proc.is_cognitive() || index >= FEATURE_COUNT {
            return;
        }
        proc.with_vector(|v| v.set(index, value));
    }

    /// Attention level from the last `ready`, zero for non-cognitive
    /// processes
    pub fn attention(&self, proc: &CogProc) -> f32 {
        if !proc.is_cognitive() {
            return 0.0;
        }
        proc.attention_level()
    }

    /// Does `proc` use attention scheduling?
    pub fn is_cognitive(&self, proc: &CogProc) -> bool {
        proc.is_cognitive()
    }

    // -------------------------------------------------------------------------
    // Global Policy
    // -------------------------------------------------------------------------

    /// Ask the host to bypass attention scheduling
    pub fn set_emergency_mode(&self, enable: bool) {
        let global = self.global.lock();
        self.emergency.store(enable, Ordering::Release);
        drop(global);

        if enable {
            log::warn!("CogSched: emergency mode enabled, host should bypass attention");
        } else {
            log::info!("CogSched: emergency mode cleared");
        }
    }

    /// Emergency flag (advisory read)
    pub fn emergency_mode(&self) -> bool {
        self.emergency.load(Ordering::Relaxed)
    }

    /// Advisory attention budget
    pub fn attention_budget(&self) -> u64 {
        self.global.lock().total_attention_budget
    }

    /// Replace the advisory attention budget
    pub fn set_attention_budget(&self, budget: u64) {
        self.global.lock().total_attention_budget = budget;
        log::info!("CogSched: attention budget set to {}", budget);
    }

    /// Tick of the last effective refresh
    pub fn last_update_tick(&self) -> Tick {
        self.global.lock().last_update_tick
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// All buckets, empty before initialization
    pub fn queues(&self) -> &[AttentionQueue] {
        match self.core.get() {
            Some(core) => &core.queues,
            None => &[],
        }
    }

    /// One bucket
    pub fn queue(&self, level: usize) -> Option<&AttentionQueue> {
        self.queues().get(level)
    }

    /// History tensor
    pub fn tensor(&self) -> Option<&AttentionTensor> {
        self.core.get().map(|core| &core.tensor)
    }

    /// Snapshot of counters and policy state
    pub fn stats(&self) -> AllocatorStats {
        let (total_attention_budget, last_update_tick) = {
            let global = self.global.lock();
            (global.total_attention_budget, global.last_update_tick)
        };
        let (tensor_slot, active_procs) = self
            .tensor()
            .map_or((0, 0), |t| (t.current_slot(), t.active_count()));

        AllocatorStats {
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            contended: self.counters.contended.load(Ordering::Relaxed),
            refreshes: self.counters.refreshes.load(Ordering::Relaxed),
            bucket_lengths: self.queues().iter().map(AttentionQueue::len).collect(),
            emergency_mode: self.emergency_mode(),
            total_attention_budget,
            last_update_tick,
            tensor_slot,
            active_procs,
        }
    }
}

static_assertions::assert_impl_all!(AttentionAllocator<crate::clock::ManualClock>: Send, Sync);

// =============================================================================
// TESTS
// =============================================================================
