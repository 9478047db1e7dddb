//! Render parameters: the loose, flat parameter surface handed over by a
//! control panel ([`PortraitParams`]) and the validated, fully enumerated
//! [`Settings`] the pipeline consumes.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::colour::Rgba;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Limits and defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_BLOCK_SIZE: f64 = 7.0;
pub const DEFAULT_PIXELS_WIDE: u32 = 242;
pub const DEFAULT_TOTAL_COLOURS: u32 = 10;
pub const DEFAULT_BASE_COLOUR: &str = "#862c1c";
pub const DEFAULT_BACKGROUND_COLOUR: &str = "rgb(255, 255, 255, 1)";

const MAX_BLOCK_SIZE: f64 = 1000.0;
const MAX_PIXELS_WIDE: u32 = 4096;
/// Grey quantization works on 8-bit brightness, so 256 bands is the ceiling.
const MAX_TOTAL_COLOURS: u32 = 256;
const MAX_CANVAS_SIDE: u32 = 16_384;
const MIN_MULTIPLIER: f64 = 0.1;

// ---------------------------------------------------------------------------
// Parameter surface
// ---------------------------------------------------------------------------

/// Crop rectangle given as fractions of the source dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl CropRect {
    pub const FULL: CropRect = CropRect {
        left: 0.0,
        top: 0.0,
        right: 1.0,
        bottom: 1.0,
    };

    /// Clamp every edge to `[0, 1]` and order each pair so `left <= right`
    /// and `top <= bottom`.
    pub fn normalized(self) -> Self {
        let l = unit_or(self.left, 0.0);
        let r = unit_or(self.right, 1.0);
        let t = unit_or(self.top, 0.0);
        let b = unit_or(self.bottom, 1.0);
        Self {
            left: l.min(r),
            right: l.max(r),
            top: t.min(b),
            bottom: t.max(b),
        }
    }

    /// Pixel bounds `(x, y, width, height)` of the crop inside a
    /// `width`×`height` source. Never smaller than 1×1.
    pub fn to_pixels(self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let c = self.normalized();
        let w = width.max(1) as f64;
        let h = height.max(1) as f64;
        let x0 = ((c.left * w).round() as u32).min(width.saturating_sub(1));
        let y0 = ((c.top * h).round() as u32).min(height.saturating_sub(1));
        let x1 = (c.right * w).round() as u32;
        let y1 = (c.bottom * h).round() as u32;
        (x0, y0, x1.saturating_sub(x0).max(1), y1.saturating_sub(y0).max(1))
    }
}

impl Default for CropRect {
    fn default() -> Self {
        Self::FULL
    }
}

/// How each block is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelType {
    /// A flat colour square.
    #[default]
    Square,
    /// A numbered or labelled tile.
    Symbol,
}

/// The flat parameter mapping produced by a control panel or a JSON file.
///
/// Every key is optional. [`Settings::from_params`] fills the gaps with
/// defaults, except `blockSize`, whose absence means the surface is not
/// ready to render yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PortraitParams {
    pub block_size: Option<f64>,
    pub pixels_wide: Option<u32>,
    pub crop: Option<CropRect>,
    pub crop_left: Option<f64>,
    pub crop_top: Option<f64>,
    pub crop_right: Option<f64>,
    pub crop_bottom: Option<f64>,
    pub brightness_adjust: Option<i32>,
    pub contrast: Option<i32>,
    pub total_colours: Option<u32>,
    pub base_colour: Option<String>,
    pub background_colour: Option<String>,

    pub explode_outer_blocks: Option<bool>,
    pub explode_from_x: Option<f64>,
    pub explode_from_y: Option<f64>,
    pub min_explode_distance: Option<f64>,
    pub explosion_level: Option<f64>,
    pub multiplier: Option<f64>,
    pub use_rotation: Option<bool>,
    pub use_random: Option<bool>,

    pub pixel_type: Option<PixelType>,
    pub show_as_finished_portrait: Option<bool>,
    pub include_number_on_white: Option<bool>,
    pub sheet_label: Option<String>,
    pub remove_lightest_colour: Option<bool>,

    pub canvas_width: Option<u32>,
    pub canvas_height: Option<u32>,
    pub labels: Option<Vec<String>>,
    pub custom_hues: Option<Vec<Option<f64>>>,
    pub seed: Option<u64>,
}

impl PortraitParams {
    /// The control panel's initial state, with every key present.
    pub fn with_defaults() -> Self {
        Self {
            block_size: Some(DEFAULT_BLOCK_SIZE),
            pixels_wide: Some(DEFAULT_PIXELS_WIDE),
            crop: Some(CropRect::FULL),
            brightness_adjust: Some(0),
            contrast: Some(0),
            total_colours: Some(DEFAULT_TOTAL_COLOURS),
            base_colour: Some(DEFAULT_BASE_COLOUR.into()),
            background_colour: Some(DEFAULT_BACKGROUND_COLOUR.into()),
            explode_outer_blocks: Some(true),
            explode_from_x: Some(0.5),
            explode_from_y: Some(0.5),
            min_explode_distance: Some(0.5),
            explosion_level: Some(10.0),
            multiplier: Some(0.7),
            use_rotation: Some(true),
            use_random: Some(true),
            pixel_type: Some(PixelType::Square),
            show_as_finished_portrait: Some(false),
            include_number_on_white: Some(false),
            remove_lightest_colour: Some(false),
            ..Self::default()
        }
    }

    /// Crop rectangle with per-edge flat keys taking precedence over `crop`.
    fn resolved_crop(&self) -> CropRect {
        let base = self.crop.unwrap_or_default();
        CropRect {
            left: self.crop_left.unwrap_or(base.left),
            top: self.crop_top.unwrap_or(base.top),
            right: self.crop_right.unwrap_or(base.right),
            bottom: self.crop_bottom.unwrap_or(base.bottom),
        }
        .normalized()
    }
}

// ---------------------------------------------------------------------------
// Validated settings
// ---------------------------------------------------------------------------

/// Parameters of the radial explosion effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionSettings {
    /// Master switch (`explodeOuterBlocks`).
    pub enabled: bool,
    /// Centre as a fraction of the output width.
    pub from_x: f64,
    /// Centre as a fraction of the output height.
    pub from_y: f64,
    /// Radius, as a fraction of the output width, inside which nothing moves.
    pub min_distance: f64,
    pub level: f64,
    pub multiplier: f64,
    pub use_rotation: bool,
    pub use_random: bool,
}

impl Default for ExplosionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            from_x: 0.5,
            from_y: 0.5,
            min_distance: 0.5,
            level: 10.0,
            multiplier: 0.7,
            use_rotation: true,
            use_random: true,
        }
    }
}

/// Everything one render pass needs, validated and clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub block_size: f64,
    pub pixels_wide: u32,
    pub crop: CropRect,
    pub brightness_adjust: i32,
    pub contrast: i32,
    pub total_colours: u32,
    pub base_colour: Rgba,
    pub background_colour: Rgba,
    pub explosion: ExplosionSettings,
    pub pixel_type: PixelType,
    pub show_as_finished_portrait: bool,
    pub include_number_on_white: bool,
    pub sheet_label: Option<String>,
    /// Leave blocks of the lightest swatch undrawn.
    pub remove_lightest_colour: bool,
    /// Fixed output size; derived from the grid when `None`.
    pub canvas_size: Option<(u32, u32)>,
    pub labels: Vec<String>,
    pub custom_hues: Vec<Option<f64>>,
    /// Seed for the explosion jitter. Entropy-seeded when `None`.
    pub seed: Option<u64>,
}

impl Settings {
    /// Validate a parameter surface.
    ///
    /// Fails only with [`CoreError::NotReady`] when `blockSize` is missing;
    /// every other key is defaulted or clamped.
    pub fn from_params(params: &PortraitParams) -> crate::Result<Self> {
        let block_size = params.block_size.ok_or(CoreError::NotReady("blockSize"))?;
        Ok(Self::build(params, block_size))
    }

    fn build(params: &PortraitParams, block_size: f64) -> Self {
        let block_size = finite_or(block_size, DEFAULT_BLOCK_SIZE).clamp(1.0, MAX_BLOCK_SIZE);

        let total_colours = params
            .total_colours
            .unwrap_or(DEFAULT_TOTAL_COLOURS)
            .clamp(1, MAX_TOTAL_COLOURS);

        let defaults = ExplosionSettings::default();
        let explosion = ExplosionSettings {
            enabled: params.explode_outer_blocks.unwrap_or(defaults.enabled),
            from_x: unit_or(params.explode_from_x.unwrap_or(defaults.from_x), defaults.from_x),
            from_y: unit_or(params.explode_from_y.unwrap_or(defaults.from_y), defaults.from_y),
            min_distance: unit_or(
                params.min_explode_distance.unwrap_or(defaults.min_distance),
                defaults.min_distance,
            ),
            level: finite_or(params.explosion_level.unwrap_or(defaults.level), defaults.level)
                .max(0.0),
            multiplier: finite_or(
                params.multiplier.unwrap_or(defaults.multiplier),
                defaults.multiplier,
            )
            .max(MIN_MULTIPLIER),
            use_rotation: params.use_rotation.unwrap_or(defaults.use_rotation),
            use_random: params.use_random.unwrap_or(defaults.use_random),
        };

        let canvas_size = match (params.canvas_width, params.canvas_height) {
            (Some(w), Some(h)) => Some((w.clamp(1, MAX_CANVAS_SIDE), h.clamp(1, MAX_CANVAS_SIDE))),
            (None, None) => None,
            _ => {
                warn!("canvasWidth and canvasHeight must be given together; deriving size from grid");
                None
            }
        };

        let settings = Self {
            block_size,
            pixels_wide: params
                .pixels_wide
                .unwrap_or(DEFAULT_PIXELS_WIDE)
                .clamp(1, MAX_PIXELS_WIDE),
            crop: params.resolved_crop(),
            brightness_adjust: params.brightness_adjust.unwrap_or(0).clamp(-100, 100),
            contrast: params.contrast.unwrap_or(0).clamp(-100, 100),
            total_colours,
            base_colour: colour_or(params.base_colour.as_deref(), "baseColour", DEFAULT_BASE_COLOUR),
            background_colour: colour_or(
                params.background_colour.as_deref(),
                "backgroundColour",
                DEFAULT_BACKGROUND_COLOUR,
            ),
            explosion,
            pixel_type: params.pixel_type.unwrap_or_default(),
            show_as_finished_portrait: params.show_as_finished_portrait.unwrap_or(false),
            include_number_on_white: params.include_number_on_white.unwrap_or(false),
            sheet_label: params.sheet_label.clone().filter(|s| !s.trim().is_empty()),
            remove_lightest_colour: params.remove_lightest_colour.unwrap_or(false),
            canvas_size,
            labels: params.labels.clone().unwrap_or_default(),
            custom_hues: params.custom_hues.clone().unwrap_or_default(),
            seed: params.seed,
        };
        debug!(
            block_size = settings.block_size,
            pixels_wide = settings.pixels_wide,
            total_colours = settings.total_colours,
            explode = settings.explosion.enabled,
            "Settings derived from parameters"
        );
        settings
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::build(&PortraitParams::with_defaults(), DEFAULT_BLOCK_SIZE)
    }
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}

fn unit_or(v: f64, fallback: f64) -> f64 {
    finite_or(v, fallback).clamp(0.0, 1.0)
}

fn colour_or(value: Option<&str>, key: &str, fallback: &str) -> Rgba {
    let parse_fallback = || fallback.parse().unwrap_or(Rgba::WHITE);
    match value {
        None => parse_fallback(),
        Some(s) => s.parse().unwrap_or_else(|e| {
            warn!("{key}: {e}; using {fallback}");
            parse_fallback()
        }),
    }
}
