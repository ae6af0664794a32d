//! Beam Profiler CLI
//!
//! Analyzes still images or a live stream and writes overlays and
//! per-frame reports.

use beam_profiler::{
    analysis::{surface_grid, SURFACE_GRID_SIZE},
    capture::{Frame, FrameSource, MockSource, PixelFormat, SourceError},
    config::FileConfig,
    metrics::{MetricsRegistry, MetricsSnapshot},
    overlay::RasterCanvas,
    pipeline::{BeamPipeline, FrameReport, PipelineError},
    raster::{Bgr, BgrImage},
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "beam-profiler")]
#[command(about = "Laser beam-profile diagnostics with a calibrated overlay")]
#[command(version)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `calibration.pixel_size_um`.
    #[arg(long, global = true)]
    pixel_size: Option<f64>,

    /// Overrides `calibration.threshold_percent`.
    #[arg(long, global = true)]
    threshold: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single image file.
    Analyze {
        /// Input image (any format the `image` crate reads).
        #[arg(long)]
        image: PathBuf,

        /// Where to write the overlay image.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Where to write the frame report (JSON). Printed to stdout otherwise.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Where to write the downsampled intensity surface (JSON).
        #[arg(long)]
        surface: Option<PathBuf>,
    },
    /// Process frames from an acquisition source.
    Stream {
        /// Number of frames to process (defaults to `output.frame_count`).
        #[arg(long)]
        frames: Option<u32>,

        /// Run until interrupted.
        #[arg(long)]
        continuous: bool,

        /// Directory for per-frame overlay images.
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Use the platform camera instead of the synthetic source.
        #[arg(long)]
        webcam: bool,
    },
    /// List attached devices.
    Devices {
        /// Query the platform camera backend.
        #[arg(long)]
        webcam: bool,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("Beam Profiler v{}", beam_profiler::VERSION);

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Analyze {
            image,
            out,
            json,
            surface,
        } => run_analyze(
            &config,
            &image,
            out.as_deref(),
            json.as_deref(),
            surface.as_deref(),
        ),
        Commands::Stream {
            frames,
            continuous,
            out_dir,
            webcam,
        } => {
            let frame_limit = if continuous || config.output.continuous {
                None
            } else {
                Some(frames.unwrap_or(config.output.frame_count))
            };
            let mut source = open_source(webcam)?;
            run_stream(&config, source.as_mut(), frame_limit, out_dir.as_deref())
        }
        Commands::Devices { webcam } => run_devices(open_source(webcam)?.as_mut()),
    }
}

fn load_config(cli: &Cli) -> CliResult<FileConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config: {}", path.display());
            FileConfig::from_file(path)?
        }
        None => FileConfig::default(),
    };
    if let Some(pixel_size) = cli.pixel_size {
        config.calibration.pixel_size_um = pixel_size;
    }
    if let Some(threshold) = cli.threshold {
        config.calibration.threshold_percent = threshold;
    }
    config.validate()?;
    Ok(config)
}

fn open_source(webcam: bool) -> CliResult<Box<dyn FrameSource>> {
    if webcam {
        #[cfg(feature = "camera")]
        return Ok(Box::new(beam_profiler::capture::WebcamSource::new()));
        #[cfg(not(feature = "camera"))]
        return Err("built without the `camera` feature".into());
    }
    Ok(Box::new(MockSource::new()))
}

fn run_analyze(
    config: &FileConfig,
    image_path: &Path,
    out_path: Option<&Path>,
    json_path: Option<&Path>,
    surface_path: Option<&Path>,
) -> CliResult<()> {
    info!("Loading image: {}", image_path.display());
    let img = image::open(image_path).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", image_path.display(), e).into()
    })?;
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    info!("Image size: {}x{}", w, h);

    let frame = Frame::new(rgb.into_raw(), w, h, PixelFormat::Rgb8, 0);
    let pipeline = BeamPipeline::new(config.calibration.clone(), config.overlay.clone())?;
    let measurement = pipeline.measure(&frame)?;
    let output = pipeline.render(&measurement);
    let report = FrameReport::new(&frame, measurement.metrics, &config.calibration, &output);
    log_report(&report);

    if let Some(path) = out_path {
        save_overlay(path, &output)?;
    }
    if let Some(path) = surface_path {
        let grid = surface_grid(&measurement.preprocessed.smoothed, SURFACE_GRID_SIZE);
        std::fs::write(path, serde_json::to_string(&grid)?)?;
        info!("Surface grid written to {}", path.display());
    }

    let json = serde_json::to_string_pretty(&report)?;
    match json_path {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run_stream(
    config: &FileConfig,
    source: &mut dyn FrameSource,
    frame_limit: Option<u32>,
    out_dir: Option<&Path>,
) -> CliResult<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)?;
    }

    let sink = MetricsSink::start(config.output.metrics_port)?;
    let pipeline = BeamPipeline::new(config.calibration.clone(), config.overlay.clone())?;

    let properties = source.start_stream(&config.stream.device, &config.stream)?;
    for p in &properties {
        info!(name = %p.name, value = %p.value, "Device property");
    }

    let timeout = config.stream.frame_timeout();
    let mut processed = 0u64;
    let mut skipped = 0u64;

    while running.load(Ordering::SeqCst) {
        if frame_limit.is_some_and(|limit| processed + skipped >= u64::from(limit)) {
            break;
        }

        let frame = match source.next_frame(timeout) {
            Ok(frame) => frame,
            Err(SourceError::Timeout(t)) => {
                warn!("No frame within {:?}", t);
                continue;
            }
            Err(e) => {
                source.stop_stream();
                return Err(e.into());
            }
        };

        match pipeline.process_with_report(&frame) {
            Ok((mut output, report)) => {
                processed += 1;
                log_report(&report);
                if let Some(dir) = out_dir {
                    let caption = format!("Frame {}", report.sequence);
                    pipeline
                        .renderer()
                        .draw_caption(&mut RasterCanvas::new(&mut output), &caption, Bgr::WHITE);
                    save_overlay(&dir.join(format!("frame_{:06}.png", report.sequence)), &output)?;
                }
                sink.publish(
                    &MetricsSnapshot::from_metrics(&report.metrics, processed, skipped),
                    report,
                );
            }
            Err(PipelineError::InvalidFrame(reason)) => {
                skipped += 1;
                warn!(sequence = frame.sequence(), "Skipping invalid frame: {}", reason);
                sink.publish_counters(processed, skipped);
            }
        }
    }

    source.stop_stream();
    info!("Processed {} frames, skipped {}", processed, skipped);
    Ok(())
}

fn run_devices(source: &mut dyn FrameSource) -> CliResult<()> {
    let devices = source.list_devices()?;
    if devices.is_empty() {
        println!("No devices found");
    }
    for d in devices {
        println!(
            "{:<16} {:<12} {:<12} {:<32} {}",
            d.model,
            d.serial_number,
            format!("{:?}", d.access_status),
            d.display_name,
            d.vendor
        );
    }
    Ok(())
}

fn log_report(report: &FrameReport) {
    let m = &report.metrics;
    if m.beam_found() {
        info!(
            sequence = report.sequence,
            x = m.centroid_x_px(),
            y = m.centroid_y_px(),
            width = m.width_px,
            height = m.height_px,
            volume = m.volume,
            "Beam"
        );
    } else {
        info!(sequence = report.sequence, "Beam not found");
    }
}

fn save_overlay(path: &Path, overlay: &BgrImage) -> CliResult<()> {
    let rgb = image::RgbImage::from_raw(
        overlay.width() as u32,
        overlay.height() as u32,
        overlay.to_rgb_vec(),
    )
    .ok_or("overlay buffer does not match its dimensions")?;
    rgb.save(path)?;
    info!("Overlay written to {}", path.display());
    Ok(())
}

/// Where per-frame metrics go: a local registry, or the HTTP exporter.
enum MetricsSink {
    Local(MetricsRegistry),
    #[cfg(feature = "metrics")]
    Served(Arc<tokio::sync::RwLock<beam_profiler::metrics::MetricsState>>),
}

impl MetricsSink {
    fn start(port: u16) -> CliResult<Self> {
        let registry = MetricsRegistry::new()?;
        #[cfg(feature = "metrics")]
        if port != 0 {
            use beam_profiler::metrics::{MetricsServer, MetricsServerConfig};

            let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
            let state = server.state();
            let runtime = tokio::runtime::Runtime::new()?;
            std::thread::spawn(move || {
                if let Err(e) = runtime.block_on(server.run()) {
                    tracing::error!("Metrics server stopped: {}", e);
                }
            });
            return Ok(MetricsSink::Served(state));
        }
        #[cfg(not(feature = "metrics"))]
        if port != 0 {
            info!("Built without the `metrics` feature; port {} ignored", port);
        }
        Ok(MetricsSink::Local(registry))
    }

    fn publish(&self, snapshot: &MetricsSnapshot, report: FrameReport) {
        match self {
            MetricsSink::Local(registry) => {
                registry.update(snapshot);
                drop(report);
            }
            #[cfg(feature = "metrics")]
            MetricsSink::Served(state) => {
                let mut state = state.blocking_write();
                state.update(snapshot);
                state.set_latest(report);
            }
        }
    }

    fn publish_counters(&self, processed: u64, skipped: u64) {
        match self {
            MetricsSink::Local(registry) => registry.update_counters(processed, skipped),
            #[cfg(feature = "metrics")]
            MetricsSink::Served(state) => state.blocking_read().update_counters(processed, skipped),
        }
    }
}
