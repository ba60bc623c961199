//! # Error Handling
//!
//! The scheduling path itself never fails: invalid input is absorbed by
//! policy (no-op, zero, or a [`RemoveOutcome`](crate::RemoveOutcome)).
//! Errors only exist at construction time, when a host hands the allocator
//! a configuration it cannot honour.
//!
//! | Kind | Raised by | Example |
//! |------|-----------|---------|
//! | InvalidConfig | `CogConfig::validate` | zero attention levels |
//! | CapacityExceeded | `CogConfig::validate` | tensor larger than `u32` cells |

use core::fmt;

// =============================================================================
// ERROR KIND
// =============================================================================

/// Classification of scheduler errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorKind {
    /// A configuration field is out of range
    InvalidConfig    = 1,

    /// Requested structure would not fit its index space
    CapacityExceeded = 2,
}

impl ErrorKind {
    /// Short category label used in messages
    pub const fn category(self) -> &'static str {
        match self {
            Self::InvalidConfig => "config",
            Self::CapacityExceeded => "capacity",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// =============================================================================
// COG ERROR
// =============================================================================

/// Error returned when the allocator cannot be built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CogError {
    kind: ErrorKind,
    message: &'static str,
    field: Option<&'static str>,
}

impl CogError {
    /// Create new error with kind and message
    pub const fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self {
            kind,
            message,
            field: None,
        }
    }

    /// Shorthand for a rejected configuration field
    pub const fn invalid_config(field: &'static str, message: &'static str) -> Self {
        Self {
            kind: ErrorKind::InvalidConfig,
            message,
            field: Some(field),
        }
    }

    /// Get error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get message
    pub fn message(&self) -> &'static str {
        self.message
    }

    /// Configuration field that caused the error, if any
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }
}

impl fmt::Display for CogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.category(), self.message)?;

        if let Some(field) = self.field {
            write!(f, " (field: {})", field)?;
        }

        Ok(())
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for CogError {}

/// Result type for allocator construction
pub type CogResult<T> = Result<T, CogError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display_includes_field() {
        let err = CogError::invalid_config("attention_levels", "must be non-zero");
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert_eq!(
            err.to_string(),
            "[config] must be non-zero (field: attention_levels)"
        );
    }

    #[test]
    fn test_display_without_field() {
        let err = CogError::new(ErrorKind::CapacityExceeded, "tensor too large");
        assert_eq!(err.field(), None);
        assert_eq!(err.to_string(), "[capacity] tensor too large");
    }
}
