//! Raster metadata extractor.
//!
//! Reads GeoTIFF files and prints one JSON metadata record per file on
//! stdout: native CRS, WGS84 footprint, pixel size and sampled extrema.
//! Logs go to stderr.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use raster_metadata::{
    EmptyExtremaPolicy, ExtractorConfig, GeoTiffOpener, LayerMetadata, RasterMetadataExtractor,
    SamplingStride,
};

#[derive(Parser, Debug)]
#[command(name = "raster-meta")]
#[command(about = "Extract CRS, footprint, resolution and extrema from GeoTIFF rasters")]
struct Args {
    /// Raster files to inspect
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Layer name for the output records (default: file stem)
    #[arg(short, long)]
    layer: Option<String>,

    /// Sampling interval on both axes
    #[arg(short, long)]
    stride: Option<usize>,

    /// Sampling interval between rows
    #[arg(long)]
    stride_rows: Option<usize>,

    /// Sampling interval between columns
    #[arg(long)]
    stride_cols: Option<usize>,

    /// Behaviour when no finite sample is found: "default" or "fail"
    #[arg(long, env = "RASTER_EMPTY_EXTREMA")]
    empty_extrema: Option<String>,

    /// Extra vertices per footprint edge before reprojection
    #[arg(long)]
    densify: Option<usize>,

    /// Worker threads (default: number of CPU cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info", env = "RASTER_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Pretty-print output records
    #[arg(long)]
    pretty: bool,
}

impl Args {
    /// Environment configuration with command-line overrides applied.
    fn extractor_config(&self) -> ExtractorConfig {
        let mut config = ExtractorConfig::from_env();

        if let Some(step) = self.stride {
            config.stride = SamplingStride::uniform(step);
        }
        if let Some(rows) = self.stride_rows {
            config.stride = SamplingStride::new(rows, config.stride.cols);
        }
        if let Some(cols) = self.stride_cols {
            config.stride = SamplingStride::new(config.stride.rows, cols);
        }
        if let Some(policy) = &self.empty_extrema {
            config.empty_extrema = EmptyExtremaPolicy::from_str(policy);
        }
        if let Some(points) = self.densify {
            config.densify_points = points;
        }

        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level, args.json_logs)?;

    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    let config = args.extractor_config();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let extractor = RasterMetadataExtractor::new(GeoTiffOpener, config);
    let config = extractor.config();
    info!(
        files = args.files.len(),
        stride_rows = config.stride.rows,
        stride_cols = config.stride.cols,
        empty_extrema = %config.empty_extrema,
        densify_points = config.densify_points,
        "Starting metadata extraction"
    );

    let results: Vec<_> = args
        .files
        .par_iter()
        .map(|path| {
            let layer = args
                .layer
                .clone()
                .unwrap_or_else(|| LayerMetadata::default_layer_name(path));
            extractor.extract_layer(path, &layer)
        })
        .collect();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0;

    for result in results {
        match result {
            Ok(record) => {
                let json = if args.pretty {
                    serde_json::to_string_pretty(&record)?
                } else {
                    serde_json::to_string(&record)?
                };
                writeln!(out, "{}", json)?;
            }
            Err(e) => {
                error!(
                    path = %e.path.display(),
                    stage = %e.stage,
                    error = %e.cause,
                    "Extraction failed"
                );
                failed += 1;
            }
        }
    }
    out.flush()?;

    if failed > 0 {
        bail!("{} of {} files failed", failed, args.files.len());
    }

    info!("Metadata extraction complete");
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}
