mod params;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use pixelburst_core::{CoreError, Palette, PortraitParams, Settings};
use pixelburst_render::{
    create_portrait_blocks, export_png, render_blocks, render_swatch_key, ExportMetadata,
    FontFace, FontOptions,
};

use params::Overrides;

#[derive(Parser)]
#[command(name = "pixelburst")]
#[command(about = "Turn a photo into an exploded pixel portrait")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a portrait from a photo to a PNG file
    Render {
        /// Source photo (PNG or JPEG)
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// JSON parameter file (camelCase keys)
        #[arg(short, long)]
        params: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        #[command(flatten)]
        fonts: FontArgs,
    },
    /// Render the swatch key: one labelled tile per palette colour
    Key {
        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// JSON parameter file (camelCase keys)
        #[arg(short, long)]
        params: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        #[command(flatten)]
        fonts: FontArgs,
    },
    /// Print the default parameter file
    Defaults,
}

/// Where label text gets its glyphs.
#[derive(Args, Debug, Default)]
struct FontArgs {
    /// Font family for labels (falls back to the bundled DejaVu Sans)
    #[arg(long)]
    font_family: Option<String>,

    /// Extra font file to register; repeatable
    #[arg(long = "font-file")]
    font_files: Vec<PathBuf>,

    /// Also search the fonts installed on this machine
    #[arg(long)]
    system_fonts: bool,
}

impl FontArgs {
    fn load(&self) -> Result<FontFace> {
        let options = FontOptions {
            family: self.font_family.clone(),
            files: self.font_files.clone(),
            system_fonts: self.system_fonts,
        };
        FontFace::load(&options).context("failed to load fonts")
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render {
            input,
            output,
            params,
            overrides,
            fonts,
        } => {
            let params = resolve_params(params.as_deref(), &overrides)?;
            render_portrait(&input, &output, &params, &fonts.load()?)
        }
        Commands::Key {
            output,
            params,
            overrides,
            fonts,
        } => {
            let params = resolve_params(params.as_deref(), &overrides)?;
            render_key(&output, &params, &fonts.load()?)
        }
        Commands::Defaults => {
            println!("{}", serde_json::to_string_pretty(&PortraitParams::with_defaults())?);
            Ok(())
        }
    }
}

fn resolve_params(path: Option<&Path>, overrides: &Overrides) -> Result<PortraitParams> {
    let mut params = params::load(path)?;
    overrides.apply(&mut params);
    Ok(params)
}

fn settings_for(params: &PortraitParams) -> Result<Settings> {
    match Settings::from_params(params) {
        Ok(settings) => Ok(settings),
        Err(CoreError::NotReady(key)) => {
            bail!("nothing to render: `{key}` is not set (add it to the parameter file or pass --block-size)")
        }
        Err(e) => Err(e.into()),
    }
}

fn render_portrait(input: &Path, output: &Path, params: &PortraitParams, face: &FontFace) -> Result<()> {
    let settings = settings_for(params)?;
    let source = image::open(input)
        .with_context(|| format!("failed to open {}", input.display()))?
        .to_rgba8();
    info!(
        "Loaded {} ({}x{})",
        input.display(),
        source.width(),
        source.height()
    );

    let blocks = create_portrait_blocks(&source, &settings)?;
    let palette = Palette::from_settings(&settings);
    let rendered = render_blocks(&blocks.grid, &palette, &settings, face)?;

    let metadata = ExportMetadata::new(&settings, blocks.grid.width, blocks.grid.height)
        .with_params_json(serde_json::to_string(params)?);
    export_png(&rendered.buffer, output, &metadata)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        "Wrote {} ({}x{}, {} blocks, {} displaced) in {} ms",
        output.display(),
        rendered.buffer.width,
        rendered.buffer.height,
        rendered.stats.blocks_drawn,
        rendered.stats.blocks_displaced,
        rendered.stats.elapsed.as_millis()
    );
    Ok(())
}

fn render_key(output: &Path, params: &PortraitParams, face: &FontFace) -> Result<()> {
    let settings = settings_for(params)?;
    let palette = Palette::from_settings(&settings);
    let key = render_swatch_key(&palette, &settings, face)?;
    let image = key
        .into_image()
        .context("swatch key buffer has inconsistent dimensions")?;
    image
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!("Wrote swatch key with {} colours to {}", palette.len(), output.display());
    Ok(())
}
