pub mod buffer;
pub mod error;
pub mod export;
pub mod font;
pub mod pipeline;
pub mod renderer;
pub mod text;
pub mod tile;
pub mod transform;

pub use buffer::RenderBuffer;
pub use error::RenderError;
pub use export::{export_png, ExportMetadata};
pub use font::{FontFace, FontOptions, BUNDLED_FAMILY};
pub use pipeline::{create_portrait, create_portrait_blocks, render_if_ready, PortraitBlocks};
pub use renderer::{render_blocks, render_swatch_key, RenderOutput, RenderStats};
pub use text::{Typeface, Weight};
pub use transform::{QuantizedImage, RESIZE_FILTER};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
