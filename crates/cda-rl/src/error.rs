//! Error types for the action-selection engine

use thiserror::Error;

/// Error type for allocator, store, estimator, optimizer, and policy operations
///
/// Numeric overflow and NaN are not errors: they propagate through the
/// tables and are left for the caller to inspect.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RLError {
    /// Allocation request of zero units or larger than the address space
    #[error("Invalid allocation size {size} (capacity {capacity})")]
    InvalidSize { size: usize, capacity: usize },

    /// Free of an address that is out of range or not allocated
    #[error("Invalid address: {0}")]
    InvalidAddress(usize),

    /// No free run of the requested length
    #[error("Out of memory: no free block of {requested} units")]
    OutOfMemory { requested: usize },

    /// Malformed transition offered to the experience store
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Sampling from a store with no transitions
    #[error("Experience store is empty")]
    EmptyStore,

    /// Vector or table shape does not match the configured dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Action index outside the action space
    #[error("Invalid action {action}: action space has {action_count} actions")]
    InvalidAction { action: usize, action_count: usize },

    /// Out-of-range configuration or call parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for RL operations
pub type Result<T> = std::result::Result<T, RLError>;
