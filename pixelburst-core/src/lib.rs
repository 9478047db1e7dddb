pub mod blocks;
pub mod colour;
pub mod error;
pub mod explosion;
pub mod geometry;
pub mod palette;
pub mod settings;

// Re-export primary types for convenience.
pub use blocks::{BlockGrid, TRANSPARENT_BLOCK};
pub use colour::{Hsl, Rgba};
pub use error::CoreError;
pub use explosion::{layout_blocks, BlockPlacement, CanvasSize, Displacement, ExplosionField};
pub use geometry::Point;
pub use crate::palette::{Palette, PaletteSpec, Swatch};
pub use settings::{CropRect, ExplosionSettings, PixelType, PortraitParams, Settings};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
