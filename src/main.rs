use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tilepal::models::QuantizeConfig;
use tilepal::rendering::{self, OutputFormat};
use tile_quant::TiledQuantizer;

#[derive(Parser)]
#[command(name = "tilepal")]
#[command(about = "Tilepal - convert images to tiled palettes for retro graphics hardware")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Quantize a PNG into tiles drawn with a small set of palettes
    Quantize(QuantizeArgs),
}

#[derive(Args)]
struct QuantizeArgs {
    /// Input PNG file
    input: PathBuf,

    /// Output file (.bmp for indexed BMP, .png for PNG)
    #[arg(short, long)]
    output: PathBuf,

    /// YAML preset; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tile width in pixels
    #[arg(long)]
    tile_width: Option<u32>,

    /// Tile height in pixels
    #[arg(long)]
    tile_height: Option<u32>,

    /// Number of palettes
    #[arg(short, long)]
    palettes: Option<usize>,

    /// Colors per palette
    #[arg(long)]
    colors: Option<usize>,

    /// Bits per channel of the output colors (2-8)
    #[arg(short, long)]
    bits: Option<u8>,

    /// Share of pixels sampled per refinement pass (0-1)
    #[arg(long)]
    fraction: Option<f64>,

    /// Dither mode: off, fast or slow
    #[arg(short, long)]
    dither: Option<String>,

    /// Dither pattern, e.g. diagonal4 or horizontal2
    #[arg(long)]
    pattern: Option<String>,

    /// Error diffusion weight (0-1)
    #[arg(long)]
    dither_weight: Option<f64>,

    /// Color zero policy: unique, shared, transparent-from-alpha, transparent-from-color
    #[arg(long)]
    color_zero: Option<String>,

    /// Color zero as hex, e.g. "#FF00FF"
    #[arg(long)]
    zero_color: Option<String>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON palette report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl QuantizeArgs {
    fn apply_overrides(&self, config: &mut QuantizeConfig) {
        if let Some(v) = self.tile_width {
            config.tile_width = v;
        }
        if let Some(v) = self.tile_height {
            config.tile_height = v;
        }
        if let Some(v) = self.palettes {
            config.palettes = v;
        }
        if let Some(v) = self.colors {
            config.colors = v;
        }
        if let Some(v) = self.bits {
            config.bits = v;
        }
        if let Some(v) = self.fraction {
            config.fraction = v;
        }
        if let Some(v) = &self.dither {
            config.dither = v.clone();
        }
        if let Some(v) = &self.pattern {
            config.pattern = v.clone();
        }
        if let Some(v) = self.dither_weight {
            config.dither_weight = v;
        }
        if let Some(v) = &self.color_zero {
            config.color_zero = v.clone();
        }
        if let Some(v) = &self.zero_color {
            config.zero_color = v.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Quantize(args)) => run_quantize_command(&args),
        None => {
            run_status_command();
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "tilepal=debug,tile_quant=debug"
    } else {
        "tilepal=info,tile_quant=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

fn run_quantize_command(args: &QuantizeArgs) -> anyhow::Result<()> {
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => QuantizeConfig::load(path)
            .with_context(|| format!("Failed to load preset {}", path.display()))?,
        None => QuantizeConfig::default(),
    };
    args.apply_overrides(&mut config);
    let options = config.to_options()?;
    let format = OutputFormat::for_entries(
        &args.output,
        options.palette_count * options.colors_per_palette,
    )?;

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let source = rendering::decode_png(&bytes)
        .with_context(|| format!("Failed to decode {}", args.input.display()))?;
    tracing::info!(
        input = %args.input.display(),
        width = source.width,
        height = source.height,
        "Loaded image"
    );

    let quantizer = TiledQuantizer::new(options)?;
    let mut last_step = 0;
    let image = quantizer.quantize_with_progress(
        &source.pixels,
        source.width,
        source.height,
        |percent: u8| {
            let step = percent / 10;
            if step > last_step {
                last_step = step;
                tracing::info!(percent, "Progress");
            }
        },
    )?;

    let encoded = format.encode(&image)?;
    std::fs::write(&args.output, &encoded)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!(
        output = %args.output.display(),
        format = ?format,
        bytes = encoded.len(),
        mse = image.mse(),
        "Wrote image"
    );

    if let Some(report_path) = &args.report {
        let options = quantizer.options();
        let report = rendering::palette_report(&image, options.tile_width, options.tile_height)?;
        std::fs::write(report_path, report)
            .with_context(|| format!("Failed to write {}", report_path.display()))?;
        tracing::info!(report = %report_path.display(), "Wrote palette report");
    }

    Ok(())
}

fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let defaults = QuantizeConfig::default();

    println!("Tilepal v{VERSION} - tiled palette converter");
    println!("Converts images for tile-based graphics hardware\n");

    println!("Defaults:");
    println!("  tile size    = {}x{}", defaults.tile_width, defaults.tile_height);
    println!("  palettes     = {}", defaults.palettes);
    println!("  colors       = {}", defaults.colors);
    println!("  bits         = {}", defaults.bits);
    println!("  dither       = {} ({})", defaults.dither, defaults.pattern);
    println!("  color zero   = {}", defaults.color_zero);

    println!(
        "\n  RUST_LOG     = {}",
        std::env::var("RUST_LOG")
            .as_deref()
            .unwrap_or("tilepal=info,tile_quant=info (default)")
    );

    println!("\nUsage:");
    println!("  tilepal quantize input.png -o output.bmp");
    println!("  tilepal quantize input.png -o output.png --palettes 4 --colors 16 --dither fast");
    println!("  tilepal quantize input.png -o output.png --config preset.yaml --report palettes.json");
}
