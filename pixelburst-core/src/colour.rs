//! Colour model: 8-bit RGBA, HSL, and CSS-style colour strings.
//!
//! Colour values arrive from the parameter surface as strings (`"#862c1c"`,
//! `"rgb(255, 255, 255, 1)"`, `"white"`, `"hsl(188, 30%, 50%)"`) and leave the
//! palette as HSL triples. Everything funnels through [`Rgba`] before it is
//! rasterized.

use std::fmt;
use std::str::FromStr;

use ::palette::{FromColor, Srgb};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// RGBA
// ---------------------------------------------------------------------------

/// An 8-bit sRGB colour with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array(px: [u8; 4]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    /// Same colour with alpha given as a 0..1 fraction.
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: unit_to_u8(alpha),
            ..self
        }
    }

    /// Convert to HSL (hue in degrees, saturation/lightness in percent).
    pub fn to_hsl(self) -> Hsl {
        let (h, s, l) = rgb_to_hsl(self.r, self.g, self.b);
        Hsl {
            h,
            s,
            l,
            a: self.a as f64 / 255.0,
        }
    }

    /// `#rrggbb` (alpha dropped).
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            let alpha = (self.a as f64 / 255.0 * 1000.0).round() / 1000.0;
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
        }
    }
}

impl FromStr for Rgba {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_colour(s).ok_or_else(|| CoreError::InvalidColour(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// HSL
// ---------------------------------------------------------------------------

/// A colour in HSL space. `h` in degrees, `s` and `l` in percent, `a` in 0..1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
    pub a: f64,
}

impl Hsl {
    pub const fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l, a: 1.0 }
    }

    pub fn to_rgba(self) -> Rgba {
        let (r, g, b) = hsl_to_rgb(self.h, self.s, self.l);
        Rgba::new(r, g, b, unit_to_u8(self.a))
    }

    /// Same hue and saturation at a different lightness.
    pub fn with_lightness(self, l: f64) -> Self {
        Self { l, ..self }
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "hsl({}, {}%, {}%)", self.h, self.s, self.l)
        } else {
            write!(f, "hsla({}, {}%, {}%, {})", self.h, self.s, self.l, self.a)
        }
    }
}

impl FromStr for Hsl {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        function_args(&lower, &["hsla", "hsl"])
            .and_then(|args| parse_hsl_args(&args))
            .ok_or_else(|| CoreError::InvalidColour(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// HSL → 8-bit RGB. Hue wraps, saturation and lightness are clamped to 0..100.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = if h.is_finite() { h.rem_euclid(360.0) } else { 0.0 };
    let hsl = ::palette::Hsl::new(h, (s / 100.0).clamp(0.0, 1.0), (l / 100.0).clamp(0.0, 1.0));
    let rgb: Srgb<u8> = Srgb::from_color(hsl).into_format();
    (rgb.red, rgb.green, rgb.blue)
}

/// 8-bit RGB → HSL: hue in [0, 360), saturation and lightness in [0, 100].
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let rgb: Srgb<f64> = Srgb::new(r, g, b).into_format();
    let hsl = ::palette::Hsl::from_color(rgb);
    (
        hsl.hue.into_positive_degrees().rem_euclid(360.0),
        hsl.saturation * 100.0,
        hsl.lightness * 100.0,
    )
}

#[inline]
fn unit_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn parse_colour(input: &str) -> Option<Rgba> {
    let s = input.trim().to_ascii_lowercase();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = function_args(&s, &["rgba", "rgb"]) {
        return parse_rgb_args(&args);
    }
    if let Some(args) = function_args(&s, &["hsla", "hsl"]) {
        return parse_hsl_args(&args).map(Hsl::to_rgba);
    }
    named(&s)
}

fn named(name: &str) -> Option<Rgba> {
    Some(match name {
        "white" => Rgba::WHITE,
        "black" => Rgba::BLACK,
        "transparent" => Rgba::TRANSPARENT,
        "red" => Rgba::opaque(255, 0, 0),
        "green" => Rgba::opaque(0, 128, 0),
        "blue" => Rgba::opaque(0, 0, 255),
        "grey" | "gray" => Rgba::opaque(128, 128, 128),
        _ => return None,
    })
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// Split `name(a, b, c)` into its trimmed arguments. Accepts commas,
/// whitespace and `/` as separators.
fn function_args(s: &str, names: &[&str]) -> Option<Vec<String>> {
    let name = names.iter().find(|n| s.starts_with(**n))?;
    let rest = s[name.len()..].trim_start();
    let inner = rest.strip_prefix('(')?.split(')').next()?;
    let args: Vec<String> = inner
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();
    Some(args)
}

fn parse_number(arg: &str) -> Option<f64> {
    let v: f64 = arg.trim_end_matches(['%', 'g', 'd', 'e']).parse().ok()?;
    v.is_finite().then_some(v)
}

fn parse_alpha(arg: Option<&String>) -> Option<f64> {
    match arg {
        None => Some(1.0),
        Some(a) if a.ends_with('%') => parse_number(a).map(|v| v / 100.0),
        Some(a) => parse_number(a),
    }
}

fn parse_rgb_args(args: &[String]) -> Option<Rgba> {
    if !(3..=4).contains(&args.len()) {
        return None;
    }
    let channel = |a: &String| -> Option<u8> {
        let v = parse_number(a)?;
        let v = if a.ends_with('%') { v * 2.55 } else { v };
        Some(v.clamp(0.0, 255.0).round() as u8)
    };
    let alpha = parse_alpha(args.get(3))?;
    Some(Rgba::opaque(channel(&args[0])?, channel(&args[1])?, channel(&args[2])?).with_alpha(alpha))
}

fn parse_hsl_args(args: &[String]) -> Option<Hsl> {
    if !(3..=4).contains(&args.len()) {
        return None;
    }
    Some(Hsl {
        h: parse_number(&args[0])?,
        s: parse_number(&args[1])?,
        l: parse_number(&args[2])?,
        a: parse_alpha(args.get(3))?.clamp(0.0, 1.0),
    })
}
