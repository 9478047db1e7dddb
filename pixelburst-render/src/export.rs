//! PNG export with embedded metadata (tEXt chunks, iTXt for text outside
//! Latin-1).

use std::io::BufWriter;
use std::path::Path;

use pixelburst_core::Settings;
use tracing::debug;

use crate::buffer::RenderBuffer;

/// Metadata to embed in an exported PNG as text chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMetadata {
    /// The parameter surface as JSON, so a render can be reproduced.
    pub params_json: Option<String>,
    pub grid_width: u32,
    pub grid_height: u32,
    pub block_size: f64,
    pub total_colours: u32,
    pub base_colour: String,
    pub exploded: bool,
    pub seed: Option<u64>,
}

impl ExportMetadata {
    pub fn new(settings: &Settings, grid_width: u32, grid_height: u32) -> Self {
        Self {
            params_json: None,
            grid_width,
            grid_height,
            block_size: settings.block_size,
            total_colours: settings.total_colours,
            base_colour: settings.base_colour.to_hex(),
            exploded: settings.explosion.enabled,
            seed: settings.seed,
        }
    }

    pub fn with_params_json(mut self, json: impl Into<String>) -> Self {
        self.params_json = Some(json.into());
        self
    }
}

/// Write `buffer` as an RGBA PNG file with embedded portrait metadata.
///
/// Uses the `png` crate directly (rather than `image`) to inject custom text
/// chunks readable by exiftool and most image viewers. Values that Latin-1
/// cannot hold (labels in other scripts, emoji) go into UTF-8 iTXt chunks.
pub fn export_png(buffer: &RenderBuffer, path: &Path, metadata: &ExportMetadata) -> crate::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, buffer.width, buffer.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    add_text(&mut encoder, "Software".to_string(), "PixelBurst".to_string())?;
    add_text(&mut encoder, "Description".to_string(), build_description(metadata, buffer))?;
    for (key, value) in build_metadata_pairs(metadata, buffer) {
        add_text(&mut encoder, key, value)?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&buffer.pixels)?;
    png_writer.finish()?;

    debug!(
        width = buffer.width,
        height = buffer.height,
        path = %path.display(),
        "Exported PNG"
    );
    Ok(())
}

fn add_text<W: std::io::Write>(
    encoder: &mut png::Encoder<'_, W>,
    key: String,
    value: String,
) -> crate::Result<()> {
    if value.chars().all(|c| u32::from(c) <= 0xFF) {
        encoder.add_text_chunk(key, value)?;
    } else {
        encoder.add_itxt_chunk(key, value)?;
    }
    Ok(())
}

fn build_description(meta: &ExportMetadata, buffer: &RenderBuffer) -> String {
    let mut desc = format!(
        "Pixel portrait {}x{} blocks of {}px, {} colours from {}",
        meta.grid_width, meta.grid_height, meta.block_size, meta.total_colours, meta.base_colour,
    );
    if meta.exploded {
        desc.push_str(", exploded");
    }
    desc.push_str(&format!(" ({}x{})", buffer.width, buffer.height));
    desc
}

fn build_metadata_pairs(meta: &ExportMetadata, buffer: &RenderBuffer) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("PixelBurst.Grid".into(), format!("{}x{}", meta.grid_width, meta.grid_height)),
        ("PixelBurst.BlockSize".into(), format!("{}", meta.block_size)),
        ("PixelBurst.TotalColours".into(), meta.total_colours.to_string()),
        ("PixelBurst.BaseColour".into(), meta.base_colour.clone()),
        ("PixelBurst.Exploded".into(), meta.exploded.to_string()),
        ("PixelBurst.Resolution".into(), format!("{}x{}", buffer.width, buffer.height)),
    ];
    if let Some(seed) = meta.seed {
        pairs.push(("PixelBurst.Seed".into(), seed.to_string()));
    }
    if let Some(json) = &meta.params_json {
        pairs.push(("PixelBurst.Params".into(), json.clone()));
    }
    pairs
}
