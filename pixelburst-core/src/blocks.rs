use tracing::{debug, warn};

use crate::error::CoreError;

/// Cell value for a fully transparent source pixel. Never drawn.
pub const TRANSPARENT_BLOCK: i32 = -1;

/// A row-major grid of block types: swatch indices, or [`TRANSPARENT_BLOCK`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockGrid {
    pub width: u32,
    pub height: u32,
    cells: Vec<i32>,
}

impl BlockGrid {
    pub fn new(width: u32, height: u32, cells: Vec<i32>) -> crate::Result<Self> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(CoreError::GridSizeMismatch {
                width,
                height,
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Map a quantized greyscale RGBA buffer to block types.
    ///
    /// Pixels with zero alpha become [`TRANSPARENT_BLOCK`]; every other pixel
    /// becomes the index of its brightness (red channel) in `bands`. A value
    /// missing from `bands` maps to the closest band.
    pub fn from_quantized(width: u32, height: u32, rgba: &[u8], bands: &[u8]) -> crate::Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(CoreError::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }

        // Exact lookup table: brightness -> band index.
        let mut lut = [None::<i32>; 256];
        for (i, &b) in bands.iter().enumerate() {
            lut[b as usize].get_or_insert(i as i32);
        }

        let mut misses = 0usize;
        let cells = rgba
            .chunks_exact(4)
            .map(|px| {
                if px[3] == 0 {
                    return TRANSPARENT_BLOCK;
                }
                let brightness = px[0];
                lut[brightness as usize].unwrap_or_else(|| {
                    misses += 1;
                    nearest_band(bands, brightness)
                })
            })
            .collect();

        if misses > 0 {
            warn!(misses, "Pixels outside the band set were snapped to the nearest band");
        }
        debug!(width, height, bands = bands.len(), "Extracted block grid");

        Self::new(width, height, cells)
    }

    pub fn cells(&self) -> &[i32] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Swatch index of cell `i`, or `None` when transparent or out of range.
    pub fn block(&self, i: usize) -> Option<usize> {
        self.cells
            .get(i)
            .and_then(|&v| usize::try_from(v).ok())
    }

    /// Grid coordinates `(column, row)` of cell `i`.
    pub fn position(&self, i: usize) -> (u32, u32) {
        let w = self.width.max(1) as usize;
        ((i % w) as u32, (i / w) as u32)
    }
}

/// Index of the band closest to `value`; [`TRANSPARENT_BLOCK`] if there are none.
fn nearest_band(bands: &[u8], value: u8) -> i32 {
    bands
        .iter()
        .enumerate()
        .min_by_key(|&(_, &b)| (b as i16 - value as i16).abs())
        .map_or(TRANSPARENT_BLOCK, |(i, _)| i as i32)
}
