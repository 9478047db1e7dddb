//! Text for tile labels and numerals.
//!
//! Layout only needs [`Typeface::measure`] and [`Typeface::outline`], which
//! keeps the tile code independent of where glyphs come from. The face used
//! in practice is [`crate::font::FontFace`].

use pixelburst_core::Rgba;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

/// Weight of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Black,
}

/// Something that can measure and outline a line of text.
pub trait Typeface {
    /// Advance width of `text` at `size` pixels.
    fn measure(&self, text: &str, size: f32, weight: Weight) -> f32;

    /// Append the filled outline of `text` to `pb`: left edge at
    /// `origin.0`, vertically centred on `origin.1`, horizontally scaled by
    /// `x_scale`.
    fn outline(
        &self,
        text: &str,
        size: f32,
        weight: Weight,
        origin: (f32, f32),
        x_scale: f32,
        pb: &mut PathBuilder,
    );
}

/// Horizontal anchor of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// How to set one run of text.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f32,
    pub weight: Weight,
    pub align: Align,
    /// Squeeze the run horizontally to fit when wider than this.
    pub max_width: Option<f32>,
}

/// Draw `text` anchored at `(x, y)` (vertical centre) in tile-local
/// coordinates mapped through `transform`. Returns the drawn width.
pub fn draw_text(
    pixmap: &mut Pixmap,
    face: &dyn Typeface,
    text: &str,
    x: f32,
    y: f32,
    style: TextStyle,
    colour: Rgba,
    transform: Transform,
) -> f32 {
    let natural = face.measure(text, style.size, style.weight);
    let x_scale = match style.max_width {
        Some(max) if natural > max && natural > 0.0 => (max / natural).max(0.0),
        _ => 1.0,
    };
    let width = natural * x_scale;
    let left = match style.align {
        Align::Left => x,
        Align::Center => x - width / 2.0,
    };

    let mut pb = PathBuilder::new();
    face.outline(text, style.size, style.weight, (left, y), x_scale, &mut pb);
    if let Some(path) = pb.finish() {
        pixmap.fill_path(&path, &paint(colour), FillRule::Winding, transform, None);
    }
    width
}

/// An anti-aliased solid paint.
pub(crate) fn paint(colour: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(colour.r, colour.g, colour.b, colour.a);
    paint.anti_alias = true;
    paint
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontFace;

    fn ink_columns(pixmap: &Pixmap) -> impl Iterator<Item = f32> + '_ {
        let w = pixmap.width() as usize;
        pixmap
            .pixels()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.alpha() > 0)
            .map(move |(i, _)| (i % w) as f32)
    }

    #[test]
    fn draw_text_marks_pixels_and_respects_max_width() {
        let face = FontFace::bundled().unwrap();
        let mut pixmap = Pixmap::new(40, 20).unwrap();
        let style = TextStyle {
            size: 16.0,
            weight: Weight::Black,
            align: Align::Center,
            max_width: Some(10.0),
        };
        let width = draw_text(
            &mut pixmap,
            &face,
            "88",
            20.0,
            10.0,
            style,
            Rgba::BLACK,
            Transform::identity(),
        );
        assert!((width - 10.0).abs() < 1e-4);
        assert!(pixmap.pixels().iter().any(|p| p.alpha() > 0));
        // Nothing lands outside the squeezed box (plus anti-aliasing).
        for x in ink_columns(&pixmap) {
            assert!((14.0..=26.0).contains(&x), "ink at x = {x}");
        }
    }

    #[test]
    fn left_aligned_text_starts_at_anchor() {
        let face = FontFace::bundled().unwrap();
        let mut pixmap = Pixmap::new(60, 20).unwrap();
        let style = TextStyle {
            size: 12.0,
            weight: Weight::Regular,
            align: Align::Left,
            max_width: None,
        };
        let width = draw_text(&mut pixmap, &face, "HI", 10.0, 10.0, style, Rgba::BLACK, Transform::identity());
        assert!((width - face.measure("HI", 12.0, Weight::Regular)).abs() < 1e-4);
        let min = ink_columns(&pixmap).fold(f32::MAX, f32::min);
        assert!((9.0..=13.0).contains(&min), "first ink at x = {min}");
    }
}
