//! Host clock seam.
//!
//! The allocator never reads hardware timers. The host scheduler hands it a
//! [`TickSource`] that reports its periodic tick counter and the tick rate.

use core::sync::atomic::{AtomicU64, Ordering};

/// Host tick count
pub type Tick = u64;

/// Source of scheduler ticks
pub trait TickSource: Send + Sync {
    /// Current tick count
    fn now(&self) -> Tick;

    /// Ticks per second
    fn hz(&self) -> u64;
}

/// Manually advanced tick counter.
///
/// Useful for hosts that drive the allocator from their own timer callback,
/// and for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    ticks: AtomicU64,
    hz: u64,
}

impl ManualClock {
    /// Create a clock at tick zero
    pub const fn new(hz: u64) -> Self {
        Self {
            ticks: AtomicU64::new(0),
            hz,
        }
    }

    /// Advance by `delta` ticks, returning the new value
    pub fn advance(&self, delta: Tick) -> Tick {
        self.ticks.fetch_add(delta, Ordering::AcqRel) + delta
    }

    /// Jump to an absolute tick
    pub fn set(&self, tick: Tick) {
        self.ticks.store(tick, Ordering::Release);
    }
}

impl TickSource for ManualClock {
    fn now(&self) -> Tick {
        self.ticks.load(Ordering::Acquire)
    }

    fn hz(&self) -> u64 {
        self.hz
    }
}

impl<T: TickSource + ?Sized> TickSource for &T {
    fn now(&self) -> Tick {
        (**self).now()
    }

    fn hz(&self) -> u64 {
        (**self).hz()
    }
}

impl<T: TickSource + ?Sized> TickSource for alloc::sync::Arc<T> {
    fn now(&self) -> Tick {
        (**self).now()
    }

    fn hz(&self) -> u64 {
        (**self).hz()
    }
}
