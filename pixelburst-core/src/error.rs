use thiserror::Error;

/// Errors originating from parameter handling and block data.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The parameter surface has not produced enough to render yet.
    #[error("parameters not ready: missing `{0}`")]
    NotReady(&'static str),

    #[error("invalid colour: {0:?}")]
    InvalidColour(String),

    #[error("block grid size mismatch: {width}×{height} needs {expected} cells, got {actual}")]
    GridSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("pixel buffer size mismatch: {width}×{height} RGBA needs {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}
