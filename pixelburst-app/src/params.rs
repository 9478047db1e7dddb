//! Parameter files and command-line overrides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use pixelburst_core::{PixelType, PortraitParams};
use tracing::{debug, info};

/// Load a JSON parameter file, or the control-panel defaults when no file
/// is given. Unknown keys are ignored and missing ones stay unset.
pub fn load(path: Option<&Path>) -> Result<PortraitParams> {
    let Some(path) = path else {
        debug!("No parameter file; using defaults");
        return Ok(PortraitParams::with_defaults());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read parameter file {}", path.display()))?;
    let params = parse(&json).with_context(|| format!("failed to parse {}", path.display()))?;
    info!("Loaded parameters from {}", path.display());
    Ok(params)
}

pub fn parse(json: &str) -> Result<PortraitParams> {
    Ok(serde_json::from_str(json)?)
}

/// Flags that take precedence over the parameter file.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Block edge length in output pixels
    #[arg(long)]
    pub block_size: Option<f64>,

    /// Longest side of the block grid, in blocks
    #[arg(long)]
    pub pixels_wide: Option<u32>,

    /// Number of palette colours
    #[arg(long)]
    pub colours: Option<u32>,

    /// Base colour, e.g. "#862c1c" or "hsl(200, 40%, 50%)"
    #[arg(long)]
    pub base_colour: Option<String>,

    /// Seed for reproducible explosion jitter
    #[arg(long)]
    pub seed: Option<u64>,

    /// Draw numbered symbol tiles instead of flat squares
    #[arg(long)]
    pub symbols: bool,

    /// With --symbols, show tiles as the finished, painted portrait
    #[arg(long)]
    pub finished: bool,

    /// Keep every block in its grid position
    #[arg(long)]
    pub no_explode: bool,

    /// Caption drawn at the top-left of the sheet
    #[arg(long)]
    pub sheet_label: Option<String>,
}

impl Overrides {
    pub fn apply(&self, params: &mut PortraitParams) {
        if let Some(v) = self.block_size {
            params.block_size = Some(v);
        }
        if let Some(v) = self.pixels_wide {
            params.pixels_wide = Some(v);
        }
        if let Some(v) = self.colours {
            params.total_colours = Some(v);
        }
        if let Some(v) = &self.base_colour {
            params.base_colour = Some(v.clone());
        }
        if let Some(v) = self.seed {
            params.seed = Some(v);
        }
        if self.symbols {
            params.pixel_type = Some(PixelType::Symbol);
        }
        if self.finished {
            params.show_as_finished_portrait = Some(true);
        }
        if self.no_explode {
            params.explode_outer_blocks = Some(false);
        }
        if let Some(v) = &self.sheet_label {
            params.sheet_label = Some(v.clone());
        }
    }
}
