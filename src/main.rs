use anyhow::{Context, Result};
use clap::{ArgAction, ArgGroup, Parser};
use laser_raster::output::write_png;
use laser_raster::{
    Binarize, GCodeOptions, OutputMode, PowerRange, RasterOptions, Reporter, Stage,
    TracingReporter, emitter_for, rasterize_image_file,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Turn a raster image into a laser engraving toolpath (G-code and/or SVG).
#[derive(Parser, Debug)]
#[command(name = "laser-raster", version, disable_help_flag = true)]
#[command(group(
    ArgGroup::new("destination")
        .args(["output", "svg"])
        .required(true)
        .multiple(true)
))]
struct Cli {
    /// Input bitmap to be rasterized
    #[arg(short, long)]
    input: PathBuf,

    /// Output G-code file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output SVG stroke document
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Output quantized PNG preview
    #[arg(short, long)]
    png: Option<PathBuf>,

    /// Final image width in mm
    #[arg(short, long, default_value_t = 100.0)]
    width: f64,

    /// Final image height in mm
    #[arg(short = 'h', long, default_value_t = 100.0)]
    height: f64,

    /// Laser dot size (sample pitch) in mm
    #[arg(short, long, default_value_t = 0.1)]
    dot: f64,

    /// Bit resolution of the image, 1-8 [default: 8, or 4 for SVG-only runs]
    #[arg(short = 't', long)]
    bits: Option<u8>,

    /// Threshold to black and white instead of grayscale
    #[arg(short = 'l', long, conflicts_with = "dither")]
    bw: bool,

    /// Dither to black and white instead of grayscale
    #[arg(long)]
    dither: bool,

    /// Laser burn speed in mm/min
    #[arg(short, long, default_value_t = 1000)]
    speed: u32,

    /// Minimal non-zero laser power
    #[arg(short, long, default_value_t = 80)]
    min: u8,

    /// Maximal laser power
    #[arg(short = 'x', long, default_value_t = 255)]
    max: u8,

    /// Count of audible marker cycles before burning
    #[arg(short, long, default_value_t = 16)]
    count: u32,

    /// Skip the focus and locate sequence
    #[arg(long)]
    no_locate: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Cli {
    fn mode(&self) -> OutputMode {
        if self.output.is_some() {
            OutputMode::CommandStream
        } else {
            OutputMode::VectorPath
        }
    }

    fn raster_options(&self) -> RasterOptions {
        let binarize = if self.bw {
            Binarize::Threshold
        } else if self.dither {
            Binarize::Dither
        } else {
            Binarize::None
        };
        RasterOptions {
            width_mm: self.width,
            height_mm: self.height,
            pitch: self.dot,
            bits: self.bits.unwrap_or_else(|| self.mode().default_bits()),
            binarize,
        }
    }

    fn gcode_options(&self, raster: &RasterOptions) -> GCodeOptions {
        GCodeOptions {
            speed: self.speed,
            power: PowerRange {
                min: self.min,
                max: self.max,
            },
            marker_cycles: self.count,
            locate: !self.no_locate,
            header: self.parameter_comments(raster),
            ..Default::default()
        }
    }

    /// Run parameters recorded at the top of the G-code
    fn parameter_comments(&self, raster: &RasterOptions) -> Vec<String> {
        fn opt(p: &Option<PathBuf>) -> String {
            p.as_ref()
                .map_or_else(|| "-".to_string(), |p| p.display().to_string())
        }

        let params = [
            ("input", self.input.display().to_string()),
            ("output", opt(&self.output)),
            ("svg", opt(&self.svg)),
            ("png", opt(&self.png)),
            ("width", self.width.to_string()),
            ("height", self.height.to_string()),
            ("dot", self.dot.to_string()),
            ("speed", self.speed.to_string()),
            ("count", self.count.to_string()),
            ("min", self.min.to_string()),
            ("max", self.max.to_string()),
            ("bits", raster.bits.to_string()),
            ("binarize", format!("{:?}", raster.binarize)),
        ];

        let mut lines = vec!["Parameters:".to_string()];
        lines.extend(
            params
                .iter()
                .map(|(name, value)| format!("   {:<8} = {}", name, value)),
        );
        lines.push(String::new());
        lines
    }
}

/// Log filter from `RUST_LOG`-style directives, `info` when unset or invalid
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Initialize logging to stderr, honouring `RUST_LOG`
fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = log_filter(directives.as_deref());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let raster = cli.raster_options();
    let gcode = cli.gcode_options(&raster);
    raster.validate()?;
    gcode.validate()?;

    let reporter = TracingReporter;
    let toolpath = rasterize_image_file(&cli.input, &raster, &reporter)
        .with_context(|| format!("rasterizing '{}'", cli.input.display()))?;

    if let Some(png) = &cli.png {
        reporter.report(
            Stage::Write,
            &format!("Writing PNG preview to {}", png.display()),
        );
        write_png(png, &toolpath.preview())?;
    }

    if let Some(output) = &cli.output {
        reporter.report(
            Stage::Emit,
            &format!(
                "Writing G-code to {} (burn speed {} mm/min)",
                output.display(),
                gcode.speed
            ),
        );
        emitter_for(OutputMode::CommandStream, gcode.clone()).write(&toolpath, output)?;
    }

    if let Some(svg) = &cli.svg {
        reporter.report(Stage::Emit, &format!("Writing SVG to {}", svg.display()));
        emitter_for(OutputMode::VectorPath, gcode).write(&toolpath, svg)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(&cli) {
        Ok(()) => {
            tracing::info!("Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
