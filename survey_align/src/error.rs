use thiserror::Error;

/// Result type for alignment construction and evaluation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or evaluating an alignment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed segment list or parameters, reported when a curve is built.
    #[error("Invalid alignment definition: {0}")]
    Construction(String),

    /// Station outside the domain of a closed curve.
    #[error("Station {station} is outside the curve domain [{start}, {end}]")]
    Domain { station: f64, start: f64, end: f64 },

    /// Zero-length or otherwise degenerate segment where a direction or rate is required.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A resolved placement failed its orthonormality check.
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl Error {
    pub(crate) fn construction(msg: impl Into<String>) -> Self {
        Error::Construction(msg.into())
    }

    pub(crate) fn degenerate(msg: impl Into<String>) -> Self {
        Error::DegenerateGeometry(msg.into())
    }
}
