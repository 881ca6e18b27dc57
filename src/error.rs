use core::fmt;

/// Curve endpoint that a series must supply an exact sample for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The sample at `t = 0`
    Start,
    /// The sample at `t = 1`
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("t = 0"),
            Self::End => f.write_str("t = 1"),
        }
    }
}

/// Errors reported when a fit is requested on input that breaks its preconditions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FitError {
    /// The time grid is too small to determine the free control value
    #[error("grid of {n} points is too small, at least {min} are required")]
    InvalidGridSize {
        /// Requested number of grid points
        n: usize,
        /// Smallest accepted number of grid points
        min: usize,
    },

    /// A series never received a sample exactly at one of the grid endpoints
    #[error("series {series} has no sample at {endpoint}")]
    MissingEndpoint {
        /// Index of the offending series
        series: usize,
        /// Endpoint that was not captured
        endpoint: Endpoint,
    },

    /// A series was fed a different number of samples than the grid holds
    #[error("series {series} holds {actual} samples but the grid has {expected} points")]
    SampleCountMismatch {
        /// Index of the offending series
        series: usize,
        /// Number of grid points
        expected: usize,
        /// Number of samples added to the series
        actual: usize,
    },

    /// Output buffers do not match the number of series
    #[error("{series} series cannot be written to {controls} control and {errors} error slots")]
    OutputLengthMismatch {
        /// Number of series to fit
        series: usize,
        /// Length of the control value buffer
        controls: usize,
        /// Length of the standard error buffer
        errors: usize,
    },
}
