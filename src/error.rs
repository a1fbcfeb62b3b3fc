use geo::Coordinate;
use thiserror::Error;

/// Errors raised by overlay, relate and simplicity operations.
///
/// Operations are atomic: when one of these is returned no partial
/// result has been produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    /// The input geometry is structurally invalid.
    #[error("invalid input geometry: {reason} at {coord:?}")]
    InvalidInput {
        reason: String,
        coord: Option<Coordinate<f64>>,
    },

    /// The operand combination is not supported by the operation.
    #[error("unsupported argument: {0}")]
    UnsupportedArgument(String),

    /// An internal graph invariant was violated. This is almost always a
    /// floating point precision artifact.
    #[error("topology error: {reason} at {coord:?}")]
    Topology {
        reason: String,
        coord: Option<Coordinate<f64>>,
    },
}

impl OverlayError {
    pub(crate) fn topology(reason: impl Into<String>, coord: Coordinate<f64>) -> Self {
        OverlayError::Topology {
            reason: reason.into(),
            coord: Some(coord),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>, coord: Option<Coordinate<f64>>) -> Self {
        OverlayError::InvalidInput {
            reason: reason.into(),
            coord,
        }
    }

    /// Whether this error signals precision exhaustion (and so may be
    /// recovered by snapping the inputs).
    pub fn is_topology(&self) -> bool {
        matches!(self, OverlayError::Topology { .. })
    }
}

/// Error parsing a [`DD`](crate::DD) from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DdParseError {
    #[error("empty number string")]
    Empty,

    #[error("unexpected character {found:?} at position {position}")]
    Unexpected { position: usize, found: char },

    #[error("invalid exponent {0:?}")]
    Exponent(String),
}

/// Convenience type alias for results using [`OverlayError`].
pub type Result<T> = std::result::Result<T, OverlayError>;
