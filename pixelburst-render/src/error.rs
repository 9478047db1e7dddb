use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not allocate a {width}×{height} raster")]
    PixmapAllocation { width: u32, height: u32 },

    #[error("no usable font face found")]
    NoFont,

    #[error("could not load font {path}: {source}")]
    FontFile {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] pixelburst_core::CoreError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
