//! Source photo to rendered portrait, end to end.
//!
//! Each stage produces a fresh value: the photo is cropped, downsized,
//! brightened, contrasted and quantized into grey bands, the bands become a
//! [`BlockGrid`], and the grid is drawn by [`render_blocks`].

use image::RgbaImage;
use pixelburst_core::{BlockGrid, CoreError, Palette, PortraitParams, Settings};
use tracing::{debug, warn};

use crate::renderer::{render_blocks, RenderOutput};
use crate::text::Typeface;
use crate::transform::{adjust_brightness, apply_contrast, crop, quantize_greys, resize_to_max};

/// The block grid extracted from a photo, with the band brightness values
/// its indices refer to.
#[derive(Debug, Clone)]
pub struct PortraitBlocks {
    pub grid: BlockGrid,
    /// Brightest first; index `i` is drawn with swatch `i`.
    pub bands: Vec<u8>,
}

/// Run the image transforms and extract the block grid.
pub fn create_portrait_blocks(source: &RgbaImage, settings: &Settings) -> crate::Result<PortraitBlocks> {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        // Nothing to sample: one transparent cell, drawn as bare background.
        warn!(width, height, "Empty source image; using a blank 1×1 grid");
        let quantized = quantize_greys(&RgbaImage::new(1, 1), settings.total_colours);
        let grid = BlockGrid::from_quantized(1, 1, quantized.image.as_raw(), &quantized.bands)?;
        return Ok(PortraitBlocks {
            grid,
            bands: quantized.bands,
        });
    }

    let cropped = crop(source, &settings.crop, settings.background_colour);
    let resized = resize_to_max(&cropped, Some(settings.pixels_wide));
    let brightened = adjust_brightness(&resized, settings.brightness_adjust);
    let contrasted = apply_contrast(&brightened, settings.contrast);
    let quantized = quantize_greys(&contrasted, settings.total_colours);

    let (grid_w, grid_h) = quantized.image.dimensions();
    let grid = BlockGrid::from_quantized(grid_w, grid_h, quantized.image.as_raw(), &quantized.bands)?;
    debug!(
        source_w = width,
        source_h = height,
        grid_w,
        grid_h,
        bands = quantized.bands.len(),
        "Portrait blocks ready"
    );

    Ok(PortraitBlocks {
        grid,
        bands: quantized.bands,
    })
}

/// Render `source` as a portrait with the palette derived from `settings`.
pub fn create_portrait(
    source: &RgbaImage,
    settings: &Settings,
    face: &dyn Typeface,
) -> crate::Result<RenderOutput> {
    let blocks = create_portrait_blocks(source, settings)?;
    let palette = Palette::from_settings(settings);
    render_blocks(&blocks.grid, &palette, settings, face)
}

/// Render when everything needed is present: `Ok(None)` while the source
/// image has not loaded or `blockSize` is missing.
pub fn render_if_ready(
    source: Option<&RgbaImage>,
    params: &PortraitParams,
    face: &dyn Typeface,
) -> crate::Result<Option<RenderOutput>> {
    let Some(source) = source else {
        debug!("No source image yet; skipping render");
        return Ok(None);
    };
    let settings = match Settings::from_params(params) {
        Ok(settings) => settings,
        Err(CoreError::NotReady(key)) => {
            debug!(key, "Parameters not ready; skipping render");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    create_portrait(source, &settings, face).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontFace;
    use pixelburst_core::{CropRect, TRANSPARENT_BLOCK};

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, _| {
            let v = (x * 255 / (w - 1).max(1)) as u8;
            image::Rgba([v, v, v, 255])
        })
    }

    fn settings() -> Settings {
        let mut s = Settings::default();
        s.explosion.enabled = false;
        s
    }

    #[test]
    fn grid_matches_downsized_image() {
        let mut s = settings();
        s.pixels_wide = 10;
        s.total_colours = 4;
        let blocks = create_portrait_blocks(&gradient(100, 50), &s).unwrap();
        assert_eq!((blocks.grid.width, blocks.grid.height), (10, 5));
        assert_eq!(blocks.bands.len(), s.total_colours as usize);
        // Bright right edge maps to the lightest swatch.
        assert_eq!(blocks.grid.block(9), Some(0));
        assert_eq!(blocks.grid.block(0), Some(s.total_colours as usize - 1));
    }

    #[test]
    fn crop_narrows_the_grid() {
        let mut s = settings();
        s.pixels_wide = 100;
        s.crop = CropRect {
            left: 0.0,
            top: 0.0,
            right: 0.5,
            bottom: 1.0,
        };
        let blocks = create_portrait_blocks(&gradient(100, 50), &s).unwrap();
        assert_eq!((blocks.grid.width, blocks.grid.height), (100, 100));
    }

    #[test]
    fn transparent_pixels_become_empty_cells() {
        let mut src = gradient(4, 1);
        src.put_pixel(2, 0, image::Rgba([0, 0, 0, 0]));
        let mut s = settings();
        s.pixels_wide = 4;
        let blocks = create_portrait_blocks(&src, &s).unwrap();
        assert_eq!(blocks.grid.cells()[2], TRANSPARENT_BLOCK);
    }

    #[test]
    fn empty_source_gives_blank_single_cell() {
        let blocks = create_portrait_blocks(&RgbaImage::new(0, 3), &settings()).unwrap();
        assert_eq!((blocks.grid.width, blocks.grid.height), (1, 1));
        assert_eq!(blocks.grid.cells(), &[TRANSPARENT_BLOCK]);
        assert_eq!(blocks.bands.len(), settings().total_colours as usize);
    }

    #[test]
    fn empty_source_renders_background_only() {
        let params = PortraitParams {
            block_size: Some(3.0),
            explode_outer_blocks: Some(false),
            background_colour: Some("rgb(10, 20, 30)".into()),
            ..PortraitParams::with_defaults()
        };
        let out = render_if_ready(Some(&RgbaImage::new(0, 5)), &params, &FontFace::bundled().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!((out.buffer.width, out.buffer.height), (3, 3));
        assert!(out.buffer.is_uniform(pixelburst_core::Rgba::opaque(10, 20, 30)));
        assert_eq!(out.stats.blocks_drawn, 0);
    }

    #[test]
    fn not_ready_renders_nothing() {
        let src = gradient(8, 8);
        let params = PortraitParams::default();
        assert!(render_if_ready(Some(&src), &params, &FontFace::bundled().unwrap()).unwrap().is_none());
        assert!(render_if_ready(None, &PortraitParams::with_defaults(), &FontFace::bundled().unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn ready_params_render() {
        let params = PortraitParams {
            block_size: Some(3.0),
            pixels_wide: Some(8),
            explode_outer_blocks: Some(false),
            ..PortraitParams::default()
        };
        let out = render_if_ready(Some(&gradient(16, 8)), &params, &FontFace::bundled().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!((out.buffer.width, out.buffer.height), (24, 12));
    }
}
