//! localthresh - threshold an image using a downsampled copy for block statistics
//!
//! Writes the mask as an 8-bit grayscale image with foreground at 255, as PNM
//! when the output path ends in `.pnm`/`.pgm`/`.pbm` and PNG otherwise.

use anyhow::{Context, Result, bail};
use clap::Parser;
use localthresh::{ImageFormat, LocalThresholdOptions, LocalThresholder, Pix, PixelDepth};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "localthresh")]
#[command(about = "Binarize an image with per-block thresholds from a downsampled copy")]
#[command(version)]
struct Cli {
    /// Full-resolution grayscale image
    #[arg(default_value = "test_input.png")]
    input: PathBuf,

    /// Downsampled copy of the input, smaller by an integer factor
    #[arg(default_value = "test_input_downsampled.png")]
    downsampled: PathBuf,

    /// Output mask
    #[arg(default_value = "build/output/thresholded_img.png")]
    output: PathBuf,

    /// Bisection iteration budget per block
    #[arg(long, default_value_t = localthresh::filter::threshold::DEFAULT_NUM_THRESHOLDS)]
    num_thresholds: u32,

    /// Target capped histogram mass
    #[arg(long, default_value_t = localthresh::filter::threshold::DEFAULT_TARGET_SUM)]
    target_sum: f64,

    /// Standard deviation of the intensity kernel
    #[arg(long, default_value_t = localthresh::filter::threshold::DEFAULT_GAUS_STDEV)]
    gaus_stdev: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let full = load_gray(&cli.input)?;
    let downsampled = load_gray(&cli.downsampled)?;

    let thresholder = LocalThresholder::new(LocalThresholdOptions {
        num_thresholds: cli.num_thresholds,
        target_sum: cli.target_sum,
        gaus_stdev: cli.gaus_stdev,
        ..Default::default()
    })
    .context("invalid thresholding parameters")?;

    let (mask, stats) = thresholder
        .run_with_stats(&full, &downsampled)
        .context("local thresholding failed")?;
    info!(
        blocks = stats.blocks_processed,
        max_iterations = stats.max_iterations,
        foreground = mask.count_pixels()?,
        "thresholded {}x{} image",
        mask.width(),
        mask.height()
    );

    if let Some(parent) = cli.output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let out = mask.convert_1_to_8(0, 255)?;
    let format = localthresh::io::format_from_extension(&cli.output);
    localthresh::io::write_image(&out, &cli.output, format)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    info!("wrote {}", cli.output.display());

    Ok(())
}

/// Read an image as 8 bpp grayscale
fn load_gray(path: &Path) -> Result<Pix> {
    let pix = localthresh::io::read_image(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    match (pix.depth(), pix.informat()) {
        (PixelDepth::Bit8, _) => Ok(pix),
        // PBM stores 1 as black, 1-bit PNG stores 1 as white
        (PixelDepth::Bit1, ImageFormat::Pnm) => Ok(pix.convert_1_to_8(255, 0)?),
        (PixelDepth::Bit1, ImageFormat::Png) => Ok(pix.convert_1_to_8(0, 255)?),
        (PixelDepth::Bit1, format) => bail!(
            "{}: cannot interpret 1 bpp image of format {format:?}",
            path.display()
        ),
    }
}
