//! # Attention Tensor
//!
//! Shared time-indexed history with shape `[procs][features][time]`.
//!
//! ```text
//!   timestamps   ┌────┬────┬────┬────┬─────┬────┐
//!   (ring, T)    │ t0 │ t1 │ t2 │ t3 │ ... │tT-1│
//!                └────┴────┴─▲──┴────┴─────┴────┘
//!                            └── current_slot, advanced on every refresh
//!
//!   history      P × F × T cells, zeroed on initialization
//! ```
//!
//! Only the timestamp ring is written today. The history cells are sized
//! and zeroed but no refresh path stores samples into them.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use spin::Mutex;

use crate::clock::Tick;
use crate::feature::FEATURE_COUNT;

struct TensorState {
    history: Vec<f32>,
    timestamps: Vec<Tick>,
    current_slot: usize,
    active_count: usize,
}

/// Shared feature-history tensor
pub struct AttentionTensor {
    max_procs: usize,
    time_window: usize,
    state: Mutex<TensorState>,
}

impl core::fmt::Debug for AttentionTensor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AttentionTensor")
            .field("max_procs", &self.max_procs)
            .field("time_window", &self.time_window)
            .field("current_slot", &state.current_slot)
            .field("active_count", &state.active_count)
            .finish()
    }
}

impl AttentionTensor {
    /// Allocate a zeroed tensor
    pub fn new(max_procs: usize, time_window: usize) -> Self {
        Self {
            max_procs,
            time_window,
            state: Mutex::new(TensorState {
                history: vec![0.0; max_procs * FEATURE_COUNT * time_window],
                timestamps: vec![0; time_window],
                current_slot: 0,
                active_count: 0,
            }),
        }
    }

    /// Process capacity (P)
    pub fn max_procs(&self) -> usize {
        self.max_procs
    }

    /// Ring length (T)
    pub fn time_window(&self) -> usize {
        self.time_window
    }

    /// Step the ring one slot and stamp it with `now`; returns the new slot
    pub fn advance(&self, now: Tick) -> usize {
        let mut state = self.state.lock();
        let slot = (state.current_slot + 1) % self.time_window;
        state.current_slot = slot;
        state.timestamps[slot] = now;
        slot
    }

    /// Current ring slot
    pub fn current_slot(&self) -> usize {
        self.state.lock().current_slot
    }

    /// Tick recorded in `slot`, zero when out of range
    pub fn timestamp(&self, slot: usize) -> Tick {
        self.state.lock().timestamps.get(slot).copied().unwrap_or(0)
    }

    /// Copy of the timestamp ring
    pub fn timestamps(&self) -> Vec<Tick> {
        self.state.lock().timestamps.clone()
    }

    /// History cell, zero when out of range
    pub fn sample(&self, proc_slot: usize, feature: usize, time: usize) -> f32 {
        if proc_slot >= self.max_procs || feature >= FEATURE_COUNT || time >= self.time_window {
            return 0.0;
        }
        let index = (proc_slot * FEATURE_COUNT + feature) * self.time_window + time;
        self.state.lock().history[index]
    }

    /// Advisory count of tracked processes
    pub fn active_count(&self) -> usize {
        self.state.lock().active_count
    }

    /// Count one more tracked process. Not capped by `max_procs`.
    pub(crate) fn track(&self) -> usize {
        let mut state = self.state.lock();
        state.active_count += 1;
        state.active_count
    }

    /// Count one tracked process less
    pub(crate) fn untrack(&self) -> usize {
        let mut state = self.state.lock();
        state.active_count = state.active_count.saturating_sub(1);
        state.active_count
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let t = AttentionTensor::new(4, 8);
        assert_eq!(t.current_slot(), 0);
        assert_eq!(t.active_count(), 0);
        assert!(t.timestamps().iter().all(|&ts| ts == 0));
        for p in 0..4 {
            for f in 0..FEATURE_COUNT {
                for s in 0..8 {
                    assert_eq!(t.sample(p, f, s), 0.0);
                }
            }
        }
    }

    #[test]
    fn test_ring_wraps() {
        let t = AttentionTensor::new(1, 3);
        assert_eq!(t.advance(10), 1);
        assert_eq!(t.advance(11), 2);
        assert_eq!(t.advance(12), 0);
        assert_eq!(t.advance(13), 1);
        assert_eq!(t.timestamps(), [12, 13, 11]);
        assert_eq!(t.timestamp(1), 13);
        assert_eq!(t.timestamp(3), 0);
    }

    #[test]
    fn test_sample_out_of_range() {
        let t = AttentionTensor::new(2, 2);
        assert_eq!(t.sample(2, 0, 0), 0.0);
        assert_eq!(t.sample(0, FEATURE_COUNT, 0), 0.0);
        assert_eq!(t.sample(0, 0, 2), 0.0);
    }

    #[test]
    fn test_track_untrack_saturates() {
        let t = AttentionTensor::new(1, 1);
        assert_eq!(t.track(), 1);
        assert_eq!(t.untrack(), 0);
        assert_eq!(t.untrack(), 0);
    }
}
