//! The block renderer: lays the grid out (with the explosion applied) and
//! rasterizes every block onto a background-filled canvas.

use std::time::{Duration, Instant};

use pixelburst_core::{layout_blocks, BlockGrid, CanvasSize, Palette, PixelType, Rgba, Settings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tiny_skia::{Color, Pixmap, Rect, Transform};
use tracing::{debug, info};

use crate::buffer::RenderBuffer;
use crate::error::RenderError;
use crate::text::{draw_text, paint, Align, TextStyle, Typeface, Weight};
use crate::tile::{draw_label_tile, draw_symbol_block, fill_square, SymbolBlock, SymbolMode};

/// Backing bar behind the sheet label: white at 80% opacity.
const SHEET_LABEL_BAR: Rgba = Rgba::new(255, 255, 255, 204);
const SHEET_LABEL_MIN_SIZE: f32 = 8.0;
const SHEET_LABEL_MAX_SIZE: f32 = 24.0;

/// Swatch key layout.
const KEY_COLUMNS: usize = 10;
const KEY_MIN_TILE: f64 = 40.0;

/// Counters collected during one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub blocks_drawn: usize,
    /// Transparent, removed, or blank numeral tiles.
    pub blocks_skipped: usize,
    pub blocks_displaced: usize,
    pub elapsed: Duration,
}

/// A finished render.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub buffer: RenderBuffer,
    pub stats: RenderStats,
}

/// Render `grid` with `palette` colours according to `settings`.
///
/// The canvas is the fixed size from `settings` or the grid scaled by the
/// block size, filled with the background colour first. Jitter draws come
/// from a `StdRng` seeded with `settings.seed` when set.
pub fn render_blocks(
    grid: &BlockGrid,
    palette: &Palette,
    settings: &Settings,
    face: &dyn Typeface,
) -> crate::Result<RenderOutput> {
    let start = Instant::now();
    let canvas = CanvasSize::for_grid(grid, settings);
    let mut pixmap = new_canvas(canvas.width, canvas.height, settings.background_colour)?;

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let placements = layout_blocks(grid, settings, canvas, &mut rng);
    debug!(
        width = canvas.width,
        height = canvas.height,
        cells = grid.len(),
        placements = placements.len(),
        pixel_type = ?settings.pixel_type,
        "Drawing blocks"
    );

    let size = settings.block_size as f32;
    let half = size / 2.0;
    let mut blocks_drawn = 0;
    let mut blocks_displaced = 0;

    for placement in &placements {
        let swatch = palette.swatch(placement.swatch_index);
        let transform = Transform::from_translate(
            placement.position.x as f32 + half,
            placement.position.y as f32 + half,
        )
        .pre_concat(Transform::from_rotate(placement.rotation as f32));

        let drawn = match settings.pixel_type {
            PixelType::Square => {
                fill_square(&mut pixmap, size, swatch.colour(), transform);
                true
            }
            PixelType::Symbol => {
                let label = palette.label(placement.swatch_index);
                let block = SymbolBlock {
                    size,
                    colour: swatch.hsl(),
                    label,
                    symbol: &swatch.symbol,
                    mode: SymbolMode::select(settings.show_as_finished_portrait, label.is_some()),
                    include_number_on_white: settings.include_number_on_white,
                };
                draw_symbol_block(&mut pixmap, face, &block, transform)
            }
        };
        if drawn {
            blocks_drawn += 1;
        }
        if placement.displaced {
            blocks_displaced += 1;
        }
    }

    if let Some(label) = &settings.sheet_label {
        draw_sheet_label(&mut pixmap, face, label);
    }

    let elapsed = start.elapsed();
    let stats = RenderStats {
        blocks_drawn,
        blocks_skipped: grid.len() - blocks_drawn,
        blocks_displaced,
        elapsed,
    };
    info!(
        elapsed_ms = elapsed.as_millis(),
        width = canvas.width,
        height = canvas.height,
        blocks_drawn,
        blocks_skipped = stats.blocks_skipped,
        blocks_displaced,
        "Render complete"
    );

    Ok(RenderOutput {
        buffer: RenderBuffer::from_pixmap(&pixmap),
        stats,
    })
}

/// Legend sheet: one finished label tile per swatch, lightest first, in rows
/// of up to ten on the background colour.
pub fn render_swatch_key(
    palette: &Palette,
    settings: &Settings,
    face: &dyn Typeface,
) -> crate::Result<RenderBuffer> {
    let count = palette.len().max(1);
    let columns = count.min(KEY_COLUMNS);
    let rows = count.div_ceil(columns);
    let tile = settings.block_size.max(KEY_MIN_TILE).round() as u32;

    let width = tile * columns as u32;
    let height = tile * rows as u32;
    let mut pixmap = new_canvas(width, height, settings.background_colour)?;

    let size = tile as f32;
    let half = size / 2.0;
    for (i, swatch) in palette.swatches.iter().enumerate() {
        let x = (i % columns) as f32 * size;
        let y = (i / columns) as f32 * size;
        let label = palette.label(i).unwrap_or(&swatch.symbol);
        let transform = Transform::from_translate(x + half, y + half);
        draw_label_tile(&mut pixmap, face, size, swatch.hsl(), label, None, transform);
    }

    debug!(swatches = palette.len(), width, height, "Rendered swatch key");
    Ok(RenderBuffer::from_pixmap(&pixmap))
}

/// A `width`×`height` canvas filled with `background`.
fn new_canvas(width: u32, height: u32, background: Rgba) -> crate::Result<Pixmap> {
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::PixmapAllocation { width, height })?;
    pixmap.fill(Color::from_rgba8(
        background.r,
        background.g,
        background.b,
        background.a,
    ));
    Ok(pixmap)
}

/// Caption in a translucent bar at the top-left corner.
fn draw_sheet_label(pixmap: &mut Pixmap, face: &dyn Typeface, label: &str) {
    let size = (pixmap.width() as f32 / 40.0).clamp(SHEET_LABEL_MIN_SIZE, SHEET_LABEL_MAX_SIZE);
    let padding = size / 2.0;
    let text_width = face.measure(label, size, Weight::Regular);

    if let Some(bar) = Rect::from_xywh(0.0, 0.0, text_width + padding * 2.0, size + padding * 2.0) {
        pixmap.fill_rect(bar, &paint(SHEET_LABEL_BAR), Transform::identity(), None);
    }
    let style = TextStyle {
        size,
        weight: Weight::Regular,
        align: Align::Left,
        max_width: None,
    };
    draw_text(
        pixmap,
        face,
        label,
        padding,
        padding + size / 2.0,
        style,
        Rgba::BLACK,
        Transform::identity(),
    );
}
