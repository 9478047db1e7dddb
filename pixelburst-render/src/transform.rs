//! Deterministic canvas transforms applied to the source photo before it is
//! turned into blocks: crop, downsize, brightness, contrast and grey
//! quantization. Each returns a fresh buffer and leaves its input alone.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

use pixelburst_core::{CropRect, Rgba};

/// Resampling filter used when downsizing.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Highest number of grey bands an 8-bit channel can hold.
const MAX_GREYS: u32 = 256;

/// A greyscale image restricted to a closed set of brightness bands.
#[derive(Debug, Clone)]
pub struct QuantizedImage {
    pub image: RgbaImage,
    /// Band brightness values, brightest first. A pixel's band index is the
    /// position of its brightness in this list.
    pub bands: Vec<u8>,
}

/// Cut the crop rectangle out of `source`. Area outside the source is
/// filled with `background`; the result is at least 1×1.
pub fn crop(source: &RgbaImage, crop: &CropRect, background: Rgba) -> RgbaImage {
    let (x, y, w, h) = crop.to_pixels(source.width(), source.height());
    let mut out = RgbaImage::from_pixel(w, h, image::Rgba(background.to_array()));
    for (dx, dy, px) in out.enumerate_pixels_mut() {
        if let Some(src) = source.get_pixel_checked(x + dx, y + dy) {
            *px = *src;
        }
    }
    debug!(x, y, width = w, height = h, "Cropped source");
    out
}

/// Scale `source` proportionally so its longer side equals `max_dimension`
/// (the current longer side when `None`).
///
/// Resampling runs on premultiplied alpha, so transparent neighbours do not
/// bleed black into the edges of the photo.
pub fn resize_to_max(source: &RgbaImage, max_dimension: Option<u32>) -> RgbaImage {
    let (w, h) = source.dimensions();
    let longest = w.max(h).max(1);
    let target = max_dimension.unwrap_or(longest).max(1);
    if target == longest {
        return source.clone();
    }

    let scale = target as f64 / longest as f64;
    let nw = ((w as f64 * scale).round() as u32).max(1);
    let nh = ((h as f64 * scale).round() as u32).max(1);
    debug!(from_w = w, from_h = h, to_w = nw, to_h = nh, "Resizing");
    let mut premultiplied = source.clone();
    let pixels: &mut [u8] = &mut premultiplied;
    pixels.par_chunks_mut(4).for_each(premultiply);
    let mut out = imageops::resize(&premultiplied, nw, nh, RESIZE_FILTER);
    let pixels: &mut [u8] = &mut out;
    pixels.par_chunks_mut(4).for_each(demultiply);
    out
}

fn premultiply(px: &mut [u8]) {
    let a = px[3] as u32;
    for c in &mut px[..3] {
        *c = ((*c as u32 * a + 127) / 255) as u8;
    }
}

fn demultiply(px: &mut [u8]) {
    let a = px[3] as u32;
    for c in &mut px[..3] {
        *c = match a {
            0 => 0,
            a => ((*c as u32 * 255 + a / 2) / a).min(255) as u8,
        };
    }
}

/// Add `amount` percent of full scale (−100..=100) to every colour channel.
pub fn adjust_brightness(source: &RgbaImage, amount: i32) -> RgbaImage {
    if amount == 0 {
        return source.clone();
    }
    let delta = amount.clamp(-100, 100) as f64 / 100.0 * 255.0;
    map_colour_channels(source, |v| (v as f64 + delta).round().clamp(0.0, 255.0) as u8)
}

/// Push channels away from (positive) or towards (negative) mid grey.
/// `contrast` is −100..=100; 0 leaves the image unchanged.
pub fn apply_contrast(source: &RgbaImage, contrast: i32) -> RgbaImage {
    if contrast == 0 {
        return source.clone();
    }
    let c = contrast.clamp(-100, 100) as f64 * 2.55;
    let factor = (259.0 * (c + 255.0)) / (255.0 * (259.0 - c));
    map_colour_channels(source, |v| {
        (factor * (v as f64 - 128.0) + 128.0).round().clamp(0.0, 255.0) as u8
    })
}

/// Convert to grey and snap every pixel to the nearest of `max_greys`
/// evenly spaced brightness bands (clamped to 1..=256). Alpha is kept.
///
/// Quantizing an already quantized image with the same band count returns
/// it unchanged.
pub fn quantize_greys(source: &RgbaImage, max_greys: u32) -> QuantizedImage {
    let n = max_greys.clamp(1, MAX_GREYS);
    let band_lut: [u8; 256] = std::array::from_fn(|grey| band_value(band_level(grey as u8, n), n));
    let bands: Vec<u8> = (0..n).rev().map(|level| band_value(level, n)).collect();

    let mut image = source.clone();
    let pixels: &mut [u8] = &mut image;
    pixels.par_chunks_mut(4).for_each(|px| {
        let v = band_lut[luma(px[0], px[1], px[2]) as usize];
        px[0] = v;
        px[1] = v;
        px[2] = v;
    });

    debug!(bands = n, "Quantized greys");
    QuantizedImage { image, bands }
}

/// Rec. 601 luma in integer arithmetic; exact for already-grey pixels.
#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

/// Band level of a grey value, 0 = darkest.
#[inline]
fn band_level(grey: u8, n: u32) -> u32 {
    if n <= 1 {
        return 0;
    }
    (grey as f64 * (n - 1) as f64 / 255.0).round() as u32
}

/// Brightness of band `level`. A single band is white.
#[inline]
fn band_value(level: u32, n: u32) -> u8 {
    if n <= 1 {
        return 255;
    }
    (level as f64 * 255.0 / (n - 1) as f64).round() as u8
}

/// Apply `f` to R, G and B of every pixel through a 256-entry table.
fn map_colour_channels(source: &RgbaImage, f: impl Fn(u8) -> u8) -> RgbaImage {
    let lut: [u8; 256] = std::array::from_fn(|v| f(v as u8));
    let mut out = source.clone();
    let pixels: &mut [u8] = &mut out;
    pixels.par_chunks_mut(4).for_each(|px| {
        px[0] = lut[px[0] as usize];
        px[1] = lut[px[1] as usize];
        px[2] = lut[px[2] as usize];
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            let v = ((x + y * w) * 255 / (w * h - 1).max(1)) as u8;
            image::Rgba([v, v.wrapping_mul(3), 255 - v, 255])
        })
    }

    #[test]
    fn crop_takes_fractional_region() {
        let src = gradient(10, 10);
        let rect = CropRect {
            left: 0.2,
            top: 0.5,
            right: 0.6,
            bottom: 1.0,
        };
        let out = crop(&src, &rect, Rgba::WHITE);
        assert_eq!(out.dimensions(), (4, 5));
        assert_eq!(out.get_pixel(0, 0), src.get_pixel(2, 5));
        assert_eq!(out.get_pixel(3, 4), src.get_pixel(5, 9));
    }

    #[test]
    fn degenerate_crop_is_one_pixel() {
        let src = gradient(10, 10);
        let rect = CropRect {
            left: 0.3,
            top: 0.3,
            right: 0.3,
            bottom: 0.3,
        };
        assert_eq!(crop(&src, &rect, Rgba::WHITE).dimensions(), (1, 1));
    }

    #[test]
    fn resize_keeps_aspect() {
        let src = gradient(200, 100);
        let out = resize_to_max(&src, Some(24));
        assert_eq!(out.dimensions(), (24, 12));
        let tall = resize_to_max(&gradient(10, 40), Some(8));
        assert_eq!(tall.dimensions(), (2, 8));
        assert_eq!(resize_to_max(&src, None).dimensions(), (200, 100));
    }

    #[test]
    fn resize_never_collapses_a_side() {
        let out = resize_to_max(&gradient(1000, 2), Some(10));
        assert_eq!(out.dimensions(), (10, 1));
    }

    #[test]
    fn resize_does_not_darken_next_to_transparency() {
        let red = image::Rgba([200, 0, 0, 255]);
        let clear = image::Rgba([0, 0, 0, 0]);
        let src = RgbaImage::from_fn(4, 1, |x, _| if x < 2 { red } else { clear });
        let out = resize_to_max(&src, Some(2));
        assert_eq!(out.dimensions(), (2, 1));

        let edge = out.get_pixel(0, 0).0;
        assert!(edge[3] > 0 && edge[3] < 255, "mixed with the clear pixel: {edge:?}");
        for p in out.pixels().filter(|p| p.0[3] > 0) {
            assert!((198..=202).contains(&p.0[0]), "{:?}", p.0);
            assert_eq!(&p.0[1..3], &[0, 0]);
        }
    }

    #[test]
    fn resize_is_deterministic() {
        let src = gradient(64, 48);
        assert_eq!(resize_to_max(&src, Some(13)), resize_to_max(&src, Some(13)));
    }

    #[test]
    fn brightness_shifts_and_clamps() {
        let src = RgbaImage::from_pixel(1, 1, image::Rgba([10, 128, 250, 77]));
        let up = adjust_brightness(&src, 10);
        assert_eq!(up.get_pixel(0, 0).0, [36, 154, 255, 77]);
        let down = adjust_brightness(&src, -100);
        assert_eq!(down.get_pixel(0, 0).0, [0, 0, 0, 77]);
    }

    #[test]
    fn zero_contrast_is_identity() {
        let src = gradient(16, 16);
        assert_eq!(apply_contrast(&src, 0), src);
    }

    #[test]
    fn contrast_spreads_and_flattens() {
        let src = RgbaImage::from_pixel(1, 1, image::Rgba([100, 160, 128, 255]));
        let strong = apply_contrast(&src, 50).get_pixel(0, 0).0;
        assert!(strong[0] < 100 && strong[1] > 160);
        assert_eq!(strong[2], 128);
        let flat = apply_contrast(&src, -100).get_pixel(0, 0).0;
        assert_eq!(&flat[..3], &[128, 128, 128]);
    }

    #[test]
    fn quantize_limits_distinct_greys() {
        let src = gradient(32, 32);
        for n in [1u32, 2, 5, 10, 50] {
            let q = quantize_greys(&src, n);
            assert_eq!(q.bands.len(), n as usize);
            let distinct: BTreeSet<u8> = q.image.pixels().map(|p| p.0[0]).collect();
            assert!(distinct.len() <= n as usize);
            for p in q.image.pixels() {
                assert_eq!(p.0[0], p.0[1]);
                assert_eq!(p.0[1], p.0[2]);
                assert!(q.bands.contains(&p.0[0]));
            }
        }
    }

    #[test]
    fn bands_run_brightest_first() {
        let q = quantize_greys(&gradient(4, 4), 3);
        assert_eq!(q.bands, vec![255, 128, 0]);
    }

    #[test]
    fn quantize_is_idempotent() {
        let src = gradient(40, 30);
        for n in [2u32, 7, 10, 33, 255, 256] {
            let once = quantize_greys(&src, n);
            let twice = quantize_greys(&once.image, n);
            assert_eq!(once.bands, twice.bands);
            assert_eq!(once.image, twice.image, "n = {n}");
        }
    }

    #[test]
    fn quantize_keeps_alpha() {
        let src = RgbaImage::from_pixel(2, 1, image::Rgba([90, 90, 90, 0]));
        let q = quantize_greys(&src, 4);
        assert!(q.image.pixels().all(|p| p.0[3] == 0));
    }
}
