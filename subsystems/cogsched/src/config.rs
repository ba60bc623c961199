//! Allocator configuration.

use crate::error::{CogError, CogResult, ErrorKind};
use crate::FEATURE_COUNT;

// =============================================================================
// Defaults
// =============================================================================

/// Default number of attention buckets
pub const DEFAULT_ATTENTION_LEVELS: usize = 4;
/// Default tensor process capacity
pub const DEFAULT_MAX_PROCS: usize = 256;
/// Default tensor ring length
pub const DEFAULT_TIME_WINDOW: usize = 32;
/// Base attention units granted on initialization
pub const DEFAULT_ATTENTION_BUDGET: u64 = 1000;
/// Host priority scale used to normalise the priority feature
pub const DEFAULT_PRIORITY_LEVELS: u32 = 20;
/// A refresh gap shorter than `hz / divisor` counts as interactive
pub const DEFAULT_INTERACTIVE_DIVISOR: u64 = 10;
/// Memory-pressure value written on refresh until real sampling exists
pub const DEFAULT_MEMORY_BASELINE: f32 = 0.5;

// =============================================================================
// CogConfig
// =============================================================================

/// Attention allocator configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CogConfig {
    /// Number of attention buckets (L)
    pub attention_levels: usize,
    /// Tensor process capacity (P)
    pub max_procs: usize,
    /// Tensor ring length (T)
    pub time_window: usize,
    /// Advisory attention budget set on initialization
    pub attention_budget: u64,
    /// Number of host priority levels
    pub priority_levels: u32,
    /// Interactive window divisor applied to the clock rate
    pub interactive_divisor: u64,
    /// Memory-pressure baseline
    pub memory_baseline: f32,
}

impl Default for CogConfig {
    fn default() -> Self {
        Self {
            attention_levels: DEFAULT_ATTENTION_LEVELS,
            max_procs: DEFAULT_MAX_PROCS,
            time_window: DEFAULT_TIME_WINDOW,
            attention_budget: DEFAULT_ATTENTION_BUDGET,
            priority_levels: DEFAULT_PRIORITY_LEVELS,
            interactive_divisor: DEFAULT_INTERACTIVE_DIVISOR,
            memory_baseline: DEFAULT_MEMORY_BASELINE,
        }
    }
}

impl CogConfig {
    /// Set number of attention buckets
    pub fn with_attention_levels(mut self, levels: usize) -> Self {
        self.attention_levels = levels;
        self
    }

    /// Set tensor process capacity
    pub fn with_max_procs(mut self, procs: usize) -> Self {
        self.max_procs = procs;
        self
    }

    /// Set tensor ring length
    pub fn with_time_window(mut self, window: usize) -> Self {
        self.time_window = window;
        self
    }

    /// Set initial attention budget
    pub fn with_attention_budget(mut self, budget: u64) -> Self {
        self.attention_budget = budget;
        self
    }

    /// Set host priority scale
    pub fn with_priority_levels(mut self, levels: u32) -> Self {
        self.priority_levels = levels;
        self
    }

    /// Set interactive window divisor
    pub fn with_interactive_divisor(mut self, divisor: u64) -> Self {
        self.interactive_divisor = divisor;
        self
    }

    /// Set memory-pressure baseline
    pub fn with_memory_baseline(mut self, baseline: f32) -> Self {
        self.memory_baseline = baseline;
        self
    }

    /// Number of cells in the history tensor
    pub fn tensor_cells(&self) -> Option<usize> {
        self.max_procs
            .checked_mul(FEATURE_COUNT)?
            .checked_mul(self.time_window)
    }

    /// Check every field
    pub fn validate(&self) -> CogResult<()> {
        if self.attention_levels == 0 {
            return Err(CogError::invalid_config(
                "attention_levels",
                "at least one attention bucket is required",
            ));
        }
        if self.max_procs == 0 {
            return Err(CogError::invalid_config(
                "max_procs",
                "tensor capacity must be non-zero",
            ));
        }
        if self.time_window == 0 {
            return Err(CogError::invalid_config(
                "time_window",
                "time window must hold at least one slot",
            ));
        }
        if self.priority_levels == 0 {
            return Err(CogError::invalid_config(
                "priority_levels",
                "priority scale must be non-zero",
            ));
        }
        if self.interactive_divisor == 0 {
            return Err(CogError::invalid_config(
                "interactive_divisor",
                "interactive divisor must be non-zero",
            ));
        }
        if !(0.0..=1.0).contains(&self.memory_baseline) {
            return Err(CogError::invalid_config(
                "memory_baseline",
                "memory baseline must lie in [0, 1]",
            ));
        }
        match self.tensor_cells() {
            Some(cells) if cells <= u32::MAX as usize => Ok(()),
            _ => Err(CogError::new(
                ErrorKind::CapacityExceeded,
                "history tensor exceeds addressable cells",
            )),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = CogConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tensor_cells(), Some(256 * 8 * 32));
    }

    #[test]
    fn test_zero_levels_rejected() {
        let err = CogConfig::default()
            .with_attention_levels(0)
            .validate()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert_eq!(err.field(), Some("attention_levels"));
    }

    #[test]
    fn test_baseline_out_of_range_rejected() {
        let err = CogConfig::default()
            .with_memory_baseline(1.5)
            .validate()
            .unwrap_err();
        assert_eq!(err.field(), Some("memory_baseline"));
    }

    #[test]
    fn test_oversized_tensor_rejected() {
        let err = CogConfig::default()
            .with_max_procs(usize::MAX / 2)
            .validate()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    }
}
