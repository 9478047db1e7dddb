use image::RgbaImage;
use pixelburst_core::Rgba;
use tiny_skia::Pixmap;

/// An RGBA pixel buffer representing a rendered portrait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderBuffer {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel, row-major order, straight alpha.
    pub pixels: Vec<u8>,
}

impl RenderBuffer {
    /// Create a new buffer filled with `colour`.
    pub fn filled(width: u32, height: u32, colour: Rgba) -> Self {
        let pixels = colour
            .to_array()
            .repeat(width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Copy a raster out of a (premultiplied) pixmap.
    pub fn from_pixmap(pixmap: &Pixmap) -> Self {
        let pixels = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        Self {
            width: pixmap.width(),
            height: pixmap.height(),
            pixels,
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let i = self.offset(x, y)?;
        let px: [u8; 4] = self.pixels.get(i..i + 4)?.try_into().ok()?;
        Some(Rgba::from_array(px))
    }

    /// Overwrite the pixel at `(x, y)`. Out-of-range writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, colour: Rgba) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i..i + 4].copy_from_slice(&colour.to_array());
        }
    }

    /// `true` if every pixel equals `colour`.
    pub fn is_uniform(&self, colour: Rgba) -> bool {
        let target = colour.to_array();
        self.pixels.chunks_exact(4).all(|px| px == target)
    }

    /// Hand the pixels over as an `image` buffer.
    pub fn into_image(self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels)
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }
}
