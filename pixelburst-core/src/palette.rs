use tracing::debug;

use crate::colour::{Hsl, Rgba};
use crate::settings::Settings;

/// Symbols shown on symbol tiles, by swatch index. Empty: tiles fall back
/// to their 1-based numeral.
const SYMBOLS: &[&str] = &[];

/// Colour used when a block refers to a swatch the palette does not have.
static FALLBACK_SWATCH: Swatch = Swatch {
    hue: 0.0,
    saturation: 100.0,
    lightness: 50.0,
    grey_rgb: Rgba::opaque(128, 128, 128),
    symbol: String::new(),
    custom_hue: None,
};

// ---------------------------------------------------------------------------
// Swatch
// ---------------------------------------------------------------------------

/// One palette entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub hue: f64,
    pub saturation: f64,
    /// Percent, 0..=100.
    pub lightness: f64,
    /// Neutral grey at the same lightness.
    pub grey_rgb: Rgba,
    pub symbol: String,
    pub custom_hue: Option<f64>,
}

impl Swatch {
    /// The custom hue if one is set, else the palette hue.
    pub fn effective_hue(&self) -> f64 {
        self.custom_hue.unwrap_or(self.hue)
    }

    pub fn hsl(&self) -> Hsl {
        Hsl::new(self.effective_hue(), self.saturation, self.lightness)
    }

    pub fn colour(&self) -> Rgba {
        self.hsl().to_rgba()
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Inputs to [`Palette::generate`].
#[derive(Debug, Clone)]
pub struct PaletteSpec<'a> {
    pub base_hue: f64,
    pub base_saturation: f64,
    pub total_colours: u32,
    pub labels: &'a [String],
    /// Per-index hue overrides; missing or `None` entries use `base_hue`.
    pub custom_hues: &'a [Option<f64>],
}

/// An ordered set of swatches running from lightest (index 0) to darkest.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub base_hue: f64,
    pub base_saturation: f64,
    pub total_colours: u32,
    pub swatches: Vec<Swatch>,
    pub labels: Vec<String>,
}

impl Palette {
    /// Generate `total_colours` swatches with lightness evenly spaced from
    /// 100 down to 0. A single-colour palette is one swatch at lightness 100.
    pub fn generate(spec: &PaletteSpec<'_>) -> Self {
        let n = spec.total_colours.max(1);
        let band = if n > 1 { 100.0 / (n - 1) as f64 } else { 0.0 };

        let swatches = (0..n as usize)
            .map(|i| {
                let lightness = (100.0 - band * i as f64).round();
                let symbol = SYMBOLS
                    .get(i)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| (i + 1).to_string());
                Swatch {
                    hue: spec.base_hue,
                    saturation: spec.base_saturation,
                    lightness,
                    grey_rgb: Hsl::new(0.0, 0.0, lightness).to_rgba(),
                    symbol,
                    custom_hue: spec.custom_hues.get(i).copied().flatten(),
                }
            })
            .collect();

        debug!(
            total_colours = n,
            base_hue = spec.base_hue,
            base_saturation = spec.base_saturation,
            "Generated palette"
        );

        Self {
            base_hue: spec.base_hue,
            base_saturation: spec.base_saturation,
            total_colours: n,
            swatches,
            labels: spec.labels.to_vec(),
        }
    }

    /// Palette for a settings value: hue and saturation come from the base colour.
    pub fn from_settings(settings: &Settings) -> Self {
        let base = settings.base_colour.to_hsl();
        Self::generate(&PaletteSpec {
            base_hue: base.h,
            base_saturation: base.s,
            total_colours: settings.total_colours,
            labels: &settings.labels,
            custom_hues: &settings.custom_hues,
        })
    }

    /// Swatch at `index`, or a red fallback for out-of-range indices.
    pub fn swatch(&self, index: usize) -> &Swatch {
        self.swatches.get(index).unwrap_or(&FALLBACK_SWATCH)
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels
            .get(index)
            .map(String::as_str)
            .filter(|l| !l.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }
}
