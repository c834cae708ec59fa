use thiserror::Error;

/// Invalid numeric configuration. Raised before any geometric work begins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{name}` must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("`{name}` must lie within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("road class `{0}` is active but has no segments")]
    EmptyRoadClass(&'static str),

    #[error("height bands of `{class}` are invalid: {reason}")]
    InvalidBands { class: &'static str, reason: String },

    #[error("site boundary is degenerate")]
    DegenerateBoundary,

    #[error("expected one FAR value per block ({expected}), got {actual}")]
    FarCountMismatch { expected: usize, actual: usize },
}

impl ConfigError {
    pub(crate) fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value > 0.0 && value.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::NonPositive { name, value })
        }
    }

    pub(crate) fn within(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange { name, value, min, max })
        }
    }
}

/// Failure reported by a planar primitive.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("polygon has fewer than three distinct vertices")]
    TooFewVertices,

    #[error("polygon area {0} is below tolerance")]
    ZeroArea(f64),

    #[error("split produced no fragments")]
    EmptySplit,
}
