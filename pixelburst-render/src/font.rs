//! Font faces for tile text.
//!
//! Faces are registered in a `fontdb` database (the bundled DejaVu Sans pair,
//! plus any extra files and, optionally, the system fonts) and glyphs are
//! outlined with `ttf-parser` straight into a tiny-skia path. Characters the
//! chosen family lacks are looked up in every other registered face before
//! falling back to `.notdef`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use fontdb::{Database, Family, Query, Source, Stretch, Style, ID};
use tiny_skia::PathBuilder;
use tracing::{debug, info, warn};
use ttf_parser::{GlyphId, OutlineBuilder};

use crate::error::RenderError;
use crate::text::{Typeface, Weight};

const DEJAVU_SANS: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
const DEJAVU_SANS_BOLD: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

/// Family name of the bundled faces.
pub const BUNDLED_FAMILY: &str = "DejaVu Sans";

/// Where to look for fonts beyond the bundled pair.
#[derive(Debug, Clone, Default)]
pub struct FontOptions {
    /// Preferred family. The bundled family stands in when it is missing.
    pub family: Option<String>,
    /// Extra font files (TTF, OTF, TTC) to register.
    pub files: Vec<PathBuf>,
    /// Also register the fonts installed on this machine.
    pub system_fonts: bool,
}

/// A regular and a black face of one family, backed by a shared font
/// database.
#[derive(Clone)]
pub struct FontFace {
    db: Arc<Database>,
    regular: ID,
    black: ID,
    /// Every other registered face, tried in order for missing glyphs.
    fallbacks: Vec<ID>,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("regular", &self.regular)
            .field("black", &self.black)
            .field("fallbacks", &self.fallbacks.len())
            .finish()
    }
}

impl FontFace {
    /// The bundled DejaVu Sans faces only. Deterministic across machines.
    pub fn bundled() -> crate::Result<Self> {
        Self::load(&FontOptions::default())
    }

    pub fn load(options: &FontOptions) -> crate::Result<Self> {
        let mut db = Database::new();
        db.load_font_source(Source::Binary(Arc::new(DEJAVU_SANS)));
        db.load_font_source(Source::Binary(Arc::new(DEJAVU_SANS_BOLD)));
        for path in &options.files {
            db.load_font_file(path).map_err(|source| RenderError::FontFile {
                path: path.clone(),
                source,
            })?;
        }
        if options.system_fonts {
            db.load_system_fonts();
        }
        info!(faces = db.len(), "Font database loaded");
        Self::from_database(db, options.family.as_deref())
    }

    /// Pick the regular and black faces of `family` (or the bundled family)
    /// from an already populated database.
    pub fn from_database(db: Database, family: Option<&str>) -> crate::Result<Self> {
        let mut families = Vec::with_capacity(3);
        if let Some(name) = family {
            families.push(Family::Name(name));
        }
        families.push(Family::Name(BUNDLED_FAMILY));
        families.push(Family::SansSerif);

        let query = |weight| Query {
            families: &families,
            weight,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let regular = db.query(&query(fontdb::Weight::NORMAL)).ok_or(RenderError::NoFont)?;
        let black = db.query(&query(fontdb::Weight::BLACK)).unwrap_or(regular);

        if let Some(name) = family {
            let matched = db
                .face(regular)
                .is_some_and(|info| info.families.iter().any(|(n, _)| n == name));
            if !matched {
                warn!(family = name, fallback = BUNDLED_FAMILY, "Font family not found");
            }
        }

        let fallbacks: Vec<ID> = db
            .faces()
            .map(|info| info.id)
            .filter(|id| *id != regular && *id != black)
            .collect();
        debug!(?regular, ?black, fallbacks = fallbacks.len(), "Font faces selected");

        Ok(Self {
            db: Arc::new(db),
            regular,
            black,
            fallbacks,
        })
    }

    fn primary(&self, weight: Weight) -> ID {
        match weight {
            Weight::Regular => self.regular,
            Weight::Black => self.black,
        }
    }

    /// Run `f` on the first face with a glyph for `ch`, or on the primary
    /// face's `.notdef` when no face has one.
    fn with_glyph<T>(
        &self,
        ch: char,
        weight: Weight,
        mut f: impl FnMut(&ttf_parser::Face<'_>, GlyphId) -> T,
    ) -> Option<T> {
        let primary = self.primary(weight);
        for id in std::iter::once(primary).chain(self.fallbacks.iter().copied()) {
            let found = self
                .db
                .with_face_data(id, |data, index| {
                    let face = ttf_parser::Face::parse(data, index).ok()?;
                    let glyph = face.glyph_index(ch)?;
                    Some(f(&face, glyph))
                })
                .flatten();
            if found.is_some() {
                return found;
            }
        }
        self.db
            .with_face_data(primary, |data, index| {
                let face = ttf_parser::Face::parse(data, index).ok()?;
                Some(f(&face, GlyphId(0)))
            })
            .flatten()
    }
}

/// Horizontal advance of `glyph` as a fraction of the em.
fn advance_em(face: &ttf_parser::Face<'_>, glyph: GlyphId) -> f32 {
    f32::from(face.glyph_hor_advance(glyph).unwrap_or(0)) / f32::from(face.units_per_em())
}

impl Typeface for FontFace {
    fn measure(&self, text: &str, size: f32, weight: Weight) -> f32 {
        text.chars()
            .filter_map(|ch| self.with_glyph(ch, weight, |face, glyph| advance_em(face, glyph) * size))
            .sum()
    }

    fn outline(
        &self,
        text: &str,
        size: f32,
        weight: Weight,
        origin: (f32, f32),
        x_scale: f32,
        pb: &mut PathBuilder,
    ) {
        let (mut pen, centre) = origin;
        for ch in text.chars() {
            let advance = self.with_glyph(ch, weight, |face, glyph| {
                let scale = size / f32::from(face.units_per_em());
                // Baseline that puts the middle of the em box on `centre`.
                let baseline = centre + (f32::from(face.ascender()) + f32::from(face.descender())) / 2.0 * scale;
                let mut sink = PathSink {
                    pb: &mut *pb,
                    x: pen,
                    y: baseline,
                    sx: scale * x_scale,
                    sy: scale,
                };
                face.outline_glyph(glyph, &mut sink);
                advance_em(face, glyph) * size * x_scale
            });
            pen += advance.unwrap_or(0.0);
        }
    }
}

/// Maps font units (y up) onto canvas pixels (y down).
struct PathSink<'a> {
    pb: &'a mut PathBuilder,
    x: f32,
    y: f32,
    sx: f32,
    sy: f32,
}

impl PathSink<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + x * self.sx, self.y - y * self.sy)
    }
}

impl OutlineBuilder for PathSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.pb.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.pb.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.pb.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.pb.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.pb.close();
    }
}
