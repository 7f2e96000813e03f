use thiserror::Error;

/// Result type for extraction, hull and sampling operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the extraction and sampling pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Element has no resolvable layer name. The classifier skips these.
    #[error("Element {element:?} has no resolvable layer tag")]
    MissingLayerTag { element: String },

    #[error("Element {element:?} has no vertices")]
    EmptyGeometry { element: String },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Sampling exhausted after {attempts} draws: accepted {accepted} of {requested} points")]
    SamplingExhausted {
        requested: usize,
        accepted: usize,
        attempts: usize,
    },

    #[error("Camera is not ready")]
    CameraNotReady,

    #[error("Unknown boundary id {0}")]
    UnknownBoundary(usize),

    #[error("Sampling task ended without a result")]
    TaskCancelled,
}

impl Error {
    /// Whether the failure only concerns a single element and processing of
    /// the remaining elements may continue.
    pub fn is_per_element(&self) -> bool {
        matches!(
            self,
            Error::MissingLayerTag { .. } | Error::EmptyGeometry { .. }
        )
    }
}
