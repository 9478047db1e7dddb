//! Drawing a single block. All shapes are laid out in tile-local
//! coordinates, centred on the origin, and mapped onto the canvas by the
//! block's transform (translation to its centre plus rotation).

use pixelburst_core::{Hsl, Rgba};
use tiny_skia::{PathBuilder, Pixmap, Rect, Stroke, StrokeDash, Transform};

use crate::text::{draw_text, paint, Align, TextStyle, Typeface, Weight};

/// Ink for numeral tiles: black at 20% opacity.
const NUMERAL_INK: Rgba = Rgba::new(0, 0, 0, 51);
const BORDER_WIDTH: f32 = 0.4;
const TEMPLATE_LINE_WIDTH: f32 = 1.0;
const TEMPLATE_DASH: [f32; 2] = [3.0, 2.0];
const UNDERLINE_WIDTH: f32 = 2.0;

/// A flat colour square.
pub fn fill_square(pixmap: &mut Pixmap, size: f32, colour: Rgba, transform: Transform) {
    if let Some(rect) = local_rect(size) {
        pixmap.fill_rect(rect, &paint(colour), transform, None);
    }
}

// ---------------------------------------------------------------------------
// Symbol blocks
// ---------------------------------------------------------------------------

/// How a symbol block presents itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolMode {
    /// Filled with its colour and labelled, as the painted result looks.
    FinishedPortrait,
    /// White card with the label, to be painted in.
    FillInCard,
    /// Just the numeral and a faint border.
    Numeral,
}

impl SymbolMode {
    pub fn select(show_as_finished_portrait: bool, has_label: bool) -> Self {
        if show_as_finished_portrait {
            Self::FinishedPortrait
        } else if has_label {
            Self::FillInCard
        } else {
            Self::Numeral
        }
    }
}

/// One symbol block to draw.
#[derive(Debug, Clone, Copy)]
pub struct SymbolBlock<'a> {
    pub size: f32,
    pub colour: Hsl,
    pub label: Option<&'a str>,
    pub symbol: &'a str,
    pub mode: SymbolMode,
    pub include_number_on_white: bool,
}

/// Draw a symbol block. Returns `false` when the block is left blank (the
/// lightest numeral tile without `include_number_on_white`).
pub fn draw_symbol_block(
    pixmap: &mut Pixmap,
    face: &dyn Typeface,
    block: &SymbolBlock<'_>,
    transform: Transform,
) -> bool {
    match block.mode {
        SymbolMode::FinishedPortrait => {
            let label = block.label.unwrap_or(block.symbol);
            draw_label_tile(pixmap, face, block.size, block.colour, label, None, transform);
        }
        SymbolMode::FillInCard => {
            let label = block.label.unwrap_or(block.symbol);
            draw_label_tile(pixmap, face, block.size, Hsl::new(0.0, 0.0, 100.0), label, None, transform);
        }
        SymbolMode::Numeral => {
            // Blank tiles stay clean so they are easy to paint over.
            if block.symbol == "1" && !block.include_number_on_white {
                return false;
            }
            draw_numeral_tile(pixmap, face, block.size, block.symbol, transform);
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Label tile
// ---------------------------------------------------------------------------

/// Lightness of label text on a background of lightness `l` (percent):
/// a little darker on light tiles, a little lighter on dark ones, and never
/// below a legible floor on near-black tiles.
pub fn label_text_lightness(l: f64) -> f64 {
    match l {
        l if l <= 1.0 => 18.0,
        l if l <= 3.0 => 19.0,
        l if l <= 7.0 => 20.0,
        l if l <= 10.0 => 21.0,
        l if l >= 25.0 => l - 10.0,
        l => l + 7.0,
    }
}

/// A tile filled with `background`, a faint border, a dashed corner-cut
/// outline, and `label` in matching darker/lighter text. Two-word labels
/// are stacked with a smaller first line.
pub fn draw_label_tile(
    pixmap: &mut Pixmap,
    face: &dyn Typeface,
    size: f32,
    background: Hsl,
    label: &str,
    force_text_colour: Option<Rgba>,
    transform: Transform,
) {
    let Some(rect) = local_rect(size) else {
        return;
    };
    let half = size / 2.0;
    let (x, y) = (-half, -half);

    pixmap.fill_rect(rect, &paint(background.to_rgba()), transform, None);

    let text_colour = force_text_colour.unwrap_or_else(|| {
        background
            .with_lightness(label_text_lightness(background.l))
            .to_rgba()
    });
    let text_paint = paint(text_colour);

    let border = Stroke {
        width: BORDER_WIDTH,
        ..Stroke::default()
    };
    pixmap.stroke_path(&PathBuilder::from_rect(rect), &text_paint, &border, transform, None);

    // Dashed stop-sign outline: the four cut corners.
    let third = size / 3.0;
    let two_thirds = third * 2.0;
    let mut pb = PathBuilder::new();
    pb.move_to(x + two_thirds, y);
    pb.line_to(x + size, y + third);
    pb.move_to(x + size, y + two_thirds);
    pb.line_to(x + two_thirds, y + size);
    pb.move_to(x + third, y + size);
    pb.line_to(x, y + two_thirds);
    pb.move_to(x, y + third);
    pb.line_to(x + third, y);
    if let Some(path) = pb.finish() {
        let dashed = Stroke {
            width: TEMPLATE_LINE_WIDTH,
            dash: StrokeDash::new(TEMPLATE_DASH.to_vec(), 0.0),
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &text_paint, &dashed, transform, None);
    }

    let padding = size / 10.0;
    let max_width = Some(size - padding * 2.0);
    let text_x = x + half + 1.0;
    let style = |size: f32| TextStyle {
        size,
        weight: Weight::Black,
        align: Align::Center,
        max_width,
    };

    match label.trim().split_once(' ') {
        None => {
            draw_text(pixmap, face, label.trim(), text_x, y + half, style(half), text_colour, transform);
        }
        Some((first, rest)) => {
            let upper_size = half * 0.8;
            let upper_y = y + half / 2.0 + 2.0;
            draw_text(pixmap, face, first, text_x, upper_y, style(upper_size), text_colour, transform);
            draw_text(
                pixmap,
                face,
                rest.trim(),
                text_x,
                upper_y + upper_size,
                style(half),
                text_colour,
                transform,
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Numeral tile
// ---------------------------------------------------------------------------

/// A faint numeral with a faint border, on whatever is underneath.
/// `6` and `9` are underlined so they read correctly when rotated.
pub fn draw_numeral_tile(
    pixmap: &mut Pixmap,
    face: &dyn Typeface,
    size: f32,
    symbol: &str,
    transform: Transform,
) {
    let Some(rect) = local_rect(size) else {
        return;
    };
    let half = size / 2.0;
    let ink = paint(NUMERAL_INK);

    let border = Stroke {
        width: BORDER_WIDTH,
        ..Stroke::default()
    };
    pixmap.stroke_path(&PathBuilder::from_rect(rect), &ink, &border, transform, None);

    let style = TextStyle {
        size: half,
        weight: Weight::Regular,
        align: Align::Center,
        max_width: Some(size),
    };
    let width = draw_text(pixmap, face, symbol, 0.0, 0.0, style, NUMERAL_INK, transform);

    if symbol == "6" || symbol == "9" {
        let underline_y = half / 2.0;
        let mut pb = PathBuilder::new();
        pb.move_to(-width / 2.0, underline_y);
        pb.line_to(width / 2.0, underline_y);
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width: UNDERLINE_WIDTH,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &ink, &stroke, transform, None);
        }
    }
}

/// The `size`×`size` square centred on the origin.
fn local_rect(size: f32) -> Option<Rect> {
    let half = size / 2.0;
    Rect::from_xywh(-half, -half, size, size)
}
