//! Error types for the spatial engine
//!
//! Only construction can fail. Queries and mutations report "nothing found"
//! through empty results or the `QueryResult::NONE` sentinel, never through
//! this type.

use std::fmt;

/// Result type for spatial engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Spatial engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Outer bounds are degenerate (min > max on an axis, or non-finite)
    InvalidBounds(String),

    /// Cell size is zero, negative, or non-finite
    InvalidCellSize(String),

    /// Any other rejected construction parameter (depth, budget, looseness, dimensions)
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidBounds(msg) => write!(f, "Invalid bounds: {}", msg),
            Error::InvalidCellSize(msg) => write!(f, "Invalid cell size: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an error through the engine logger and return it from the current function.
///
/// ```ignore
/// spatial_bail!("spatial::Octree", Error::InvalidBounds(format!("{:?}", bounds)));
/// ```
#[macro_export]
macro_rules! spatial_bail {
    ($source:expr, $err:expr) => {{
        let err: $crate::spatial::Error = $err;
        $crate::spatial_error!($source, "{}", err);
        return Err(err);
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
