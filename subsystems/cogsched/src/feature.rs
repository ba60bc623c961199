//! # Cognitive Features
//!
//! Every attention-managed process carries a fixed vector of eight bounded
//! signals. Each slot is a value in `[0, 1]`; writes are clamped and indices
//! outside the vector are dropped.
//!
//! ```text
//!   idx   feature        source
//!   ───   ───────────    ──────────────────────────────
//!    0    Load           refresh: recent CPU consumption
//!    1    Memory         refresh: memory-pressure baseline
//!    2    Io             host via set_feature
//!    3    Interactive    refresh: refresh recency
//!    4    Realtime       host via set_feature
//!    5    Network        host via set_feature
//!    6    Priority       refresh: legacy priority
//!    7    Emergent       host via set_feature (boosts attention)
//! ```

use crate::clock::Tick;

/// Number of feature slots per process
pub const FEATURE_COUNT: usize = 8;

/// Features shown in a diagnostic dump
pub const DUMP_FEATURE_PREFIX: usize = 4;

static_assertions::const_assert!(DUMP_FEATURE_PREFIX <= FEATURE_COUNT);
static_assertions::const_assert!((Feature::Emergent as usize) < FEATURE_COUNT);

/// Clamp a value into `[0, 1]`; NaN maps to zero
#[inline]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// =============================================================================
// Feature
// =============================================================================

/// Cognitive feature slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(usize)]
pub enum Feature {
    /// CPU load pattern
    Load        = 0,
    /// Memory access pattern
    Memory      = 1,
    /// I/O activity pattern
    Io          = 2,
    /// Interactive response pattern
    Interactive = 3,
    /// Real-time requirement pattern
    Realtime    = 4,
    /// Network activity pattern
    Network     = 5,
    /// Traditional priority influence
    Priority    = 6,
    /// Emergent behavioural pattern
    Emergent    = 7,
}

impl Feature {
    /// All features in index order
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Load,
        Feature::Memory,
        Feature::Io,
        Feature::Interactive,
        Feature::Realtime,
        Feature::Network,
        Feature::Priority,
        Feature::Emergent,
    ];

    /// Slot index
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Feature for a raw slot index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

// =============================================================================
// FeatureVector
// =============================================================================

/// Per-process feature state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureVector {
    features: [f32; FEATURE_COUNT],
    attention_level: f32,
    last_update: Tick,
}

impl FeatureVector {
    /// Zeroed vector
    pub const fn new() -> Self {
        Self {
            features: [0.0; FEATURE_COUNT],
            attention_level: 0.0,
            last_update: 0,
        }
    }

    /// Raw feature slots
    pub fn features(&self) -> &[f32; FEATURE_COUNT] {
        &self.features
    }

    /// Read a slot; out-of-range reads are zero
    pub fn get(&self, index: usize) -> f32 {
        self.features.get(index).copied().unwrap_or(0.0)
    }

    /// Last computed attention level
    pub fn attention_level(&self) -> f32 {
        self.attention_level
    }

    /// Tick of the last refresh or dispatch
    pub fn last_update(&self) -> Tick {
        self.last_update
    }

    /// Write a clamped slot; out-of-range writes are dropped
    pub(crate) fn set(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.features.get_mut(index) {
            *slot = clamp_unit(value);
        }
    }

    pub(crate) fn set_feature(&mut self, feature: Feature, value: f32) {
        self.set(feature.index(), value);
    }

    pub(crate) fn set_attention_level(&mut self, level: f32) {
        self.attention_level = clamp_unit(level);
    }

    pub(crate) fn set_last_update(&mut self, tick: Tick) {
        self.last_update = tick;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clamps() {
        let mut v = FeatureVector::new();
        v.set(Feature::Load.index(), 1.7);
        v.set(Feature::Memory.index(), -0.3);
        v.set(Feature::Io.index(), f32::NAN);
        v.set(Feature::Interactive.index(), 0.42);

        assert_eq!(v.get(0), 1.0);
        assert_eq!(v.get(1), 0.0);
        assert_eq!(v.get(2), 0.0);
        assert_eq!(v.get(3), 0.42);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut v = FeatureVector::new();
        v.set(FEATURE_COUNT, 0.9);
        v.set(usize::MAX, 0.9);
        assert_eq!(v.get(FEATURE_COUNT), 0.0);
        assert!(v.features().iter().all(|&f| f == 0.0));
    }

    #[test]
    fn test_feature_index_roundtrip() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
            assert_eq!(Feature::from_index(i), Some(*feature));
        }
        assert_eq!(Feature::from_index(FEATURE_COUNT), None);
    }
}
