//! Command-line interface for ring center estimation.

use clap::{Args, Parser, Subcommand, ValueEnum};
use image::GrayImage;
use ringfit::{
    CenterFinder, CircleAdjustment, CircleCandidate, FinderConfig, ObjectiveKind, SeedStrategy,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "ringfit")]
#[command(about = "Estimate the center and radius of a ring pattern in an intensity image")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pixel indices sampled along a circle.
    Sample(CliSampleArgs),

    /// Intensity centroid of the central image window.
    Centroid(CliCentroidArgs),

    /// Circle through three points.
    ThreePoint(CliThreePointArgs),

    /// Refine a seed circle against an image.
    Refine(CliRefineArgs),

    /// Seed (three points, centroid or external circle) and refine.
    Find(CliFindArgs),
}

#[derive(Debug, Clone, Args)]
struct ImageArgs {
    /// Path to the input image (converted to 8-bit grayscale).
    #[arg(long)]
    image: PathBuf,

    /// Histogram-equalize the image before processing.
    #[arg(long)]
    equalize: bool,
}

#[derive(Debug, Clone, Args)]
struct OutputArgs {
    /// Write JSON results to this path instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliSampleArgs {
    /// Circle center column.
    #[arg(long, allow_negative_numbers = true)]
    x: f64,

    /// Circle center row.
    #[arg(long, allow_negative_numbers = true)]
    y: f64,

    /// Circle radius.
    #[arg(long)]
    r: f64,

    /// Number of samples along the circumference.
    #[arg(long, default_value_t = ringfit::DEFAULT_NUM_POINTS)]
    num_points: usize,

    /// Optional image to read intensities and objective values from.
    #[arg(long)]
    image: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Clone, Args)]
struct CliCentroidArgs {
    #[command(flatten)]
    input: ImageArgs,

    /// Side of the square window around the image center.
    #[arg(long, default_value = "200")]
    window_size: u32,

    /// Pixels at or below this fraction of the window maximum are ignored.
    #[arg(long, default_value = "0.5")]
    threshold: f64,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Clone, Args)]
struct CliThreePointArgs {
    /// First point as `x,y`.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    p0: [f64; 2],

    /// Second point as `x,y`.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    p1: [f64; 2],

    /// Third point as `x,y`.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    p2: [f64; 2],

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ObjectiveArg {
    /// Maximize the mean intensity along the circle.
    Sum,
    /// Minimize the intensity variance along the circle.
    Variance,
}

impl ObjectiveArg {
    fn to_core(self) -> ObjectiveKind {
        match self {
            Self::Sum => ObjectiveKind::Sum,
            Self::Variance => ObjectiveKind::Variance,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct RefineArgs {
    /// Objective to optimize.
    #[arg(long, value_enum, default_value_t = ObjectiveArg::Variance)]
    objective: ObjectiveArg,

    /// Maximum refinement iterations.
    #[arg(long, default_value = "200")]
    max_iterations: usize,

    /// Consecutive low-gain iterations before stopping (default depends on objective).
    #[arg(long)]
    patience: Option<usize>,

    /// Samples along the circumference per evaluation.
    #[arg(long, default_value_t = ringfit::DEFAULT_NUM_POINTS)]
    num_points: usize,

    /// Swap x/y of the result when refinement flips their ordering relative to the seed.
    #[arg(long)]
    axis_order_guard: bool,

    /// Shift the seed by `dx,dy` before refining.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    translate: Option<[f64; 2]>,

    /// Grow (or shrink, if negative) the seed radius before refining.
    #[arg(long, allow_negative_numbers = true)]
    resize: Option<f64>,
}

impl RefineArgs {
    fn apply_to(&self, config: &mut FinderConfig) {
        config.objective = Some(self.objective.to_core());
        config.refine.max_iterations = self.max_iterations;
        config.refine.patience = self.patience;
        config.refine.num_points = self.num_points;
        config.refine.axis_order_guard = self.axis_order_guard;
    }

    fn adjustments(&self) -> Vec<CircleAdjustment> {
        let mut out = Vec::new();
        if let Some([dx, dy]) = self.translate {
            out.push(CircleAdjustment::Translate { dx, dy });
        }
        if let Some(dr) = self.resize {
            out.push(CircleAdjustment::Resize { dr });
        }
        out
    }
}

#[derive(Debug, Clone, Args)]
struct CliRefineArgs {
    #[command(flatten)]
    input: ImageArgs,

    /// Seed circle as `x,y,r`.
    #[arg(long, value_parser = parse_circle, allow_hyphen_values = true)]
    seed: CircleCandidate,

    #[command(flatten)]
    refine: RefineArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
struct SeedArgs {
    /// Three points on the ring, each `x,y`.
    #[arg(long, num_args = 3, value_parser = parse_point, allow_hyphen_values = true)]
    points: Option<Vec<[f64; 2]>>,

    /// Seed from the intensity centroid paired with this radius.
    #[arg(long)]
    centroid_radius: Option<f64>,

    /// External seed circle as `x,y,r` (e.g. from a Hough transform).
    #[arg(long, value_parser = parse_circle, allow_hyphen_values = true)]
    seed: Option<CircleCandidate>,
}

impl SeedArgs {
    fn to_strategy(&self) -> CliResult<SeedStrategy> {
        if let Some(points) = &self.points {
            let pts: [[f64; 2]; 3] = points
                .as_slice()
                .try_into()
                .map_err(|_| -> CliError { "--points expects exactly three x,y values".into() })?;
            return Ok(SeedStrategy::ThreePoints(pts));
        }
        if let Some(radius) = self.centroid_radius {
            return Ok(SeedStrategy::Centroid { radius });
        }
        match self.seed {
            Some(c) => Ok(SeedStrategy::External(c)),
            None => Err("one of --points, --centroid-radius or --seed is required".into()),
        }
    }
}

#[derive(Debug, Clone, Args)]
struct CliFindArgs {
    #[command(flatten)]
    input: ImageArgs,

    #[command(flatten)]
    seed: SeedArgs,

    /// Centroid window size (only with --centroid-radius).
    #[arg(long, default_value = "200")]
    window_size: u32,

    /// Centroid threshold fraction (only with --centroid-radius).
    #[arg(long, default_value = "0.5")]
    threshold: f64,

    /// Report the seed without refining it.
    #[arg(long)]
    no_refine: bool,

    #[command(flatten)]
    refine: RefineArgs,

    #[command(flatten)]
    output: OutputArgs,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sample(args) => run_sample(&args),
        Commands::Centroid(args) => run_centroid(&args),
        Commands::ThreePoint(args) => run_three_point(&args),
        Commands::Refine(args) => run_refine(&args),
        Commands::Find(args) => run_find(&args),
    }
}

// ── helpers ────────────────────────────────────────────────────────────

fn parse_floats<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {} comma-separated numbers, got '{}'", N, s));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{}': {}", part, e))?;
    }
    Ok(out)
}

fn parse_point(s: &str) -> Result<[f64; 2], String> {
    parse_floats::<2>(s)
}

fn parse_circle(s: &str) -> Result<CircleCandidate, String> {
    let [x, y, r] = parse_floats::<3>(s)?;
    CircleCandidate::new(x, y, r).map_err(|e| e.to_string())
}

fn load_gray(path: &Path, equalize: bool) -> CliResult<GrayImage> {
    tracing::info!("Loading image: {}", path.display());
    let img = image::open(path).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", path.display(), e).into()
    })?;
    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    if equalize {
        tracing::debug!("Equalizing histogram");
        return Ok(imageproc::contrast::equalize_histogram(&gray));
    }
    Ok(gray)
}

fn emit<T: Serialize>(value: &T, output: &OutputArgs) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match &output.out {
        Some(path) => {
            std::fs::write(path, &json)?;
            tracing::info!("Results written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn apply_adjustments(
    seed: CircleCandidate,
    adjustments: &[CircleAdjustment],
) -> CliResult<CircleCandidate> {
    let mut seed = seed;
    for adj in adjustments {
        seed = seed.adjusted(*adj)?;
        tracing::info!(
            "Adjusted seed to ({:.3}, {:.3}, {:.3})",
            seed.x,
            seed.y,
            seed.r
        );
    }
    Ok(seed)
}

// ── sample ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SampleReport {
    circle: [f64; 3],
    points: Vec<ringfit::PixelIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    intensities: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variance: Option<f64>,
}

fn run_sample(args: &CliSampleArgs) -> CliResult<()> {
    let circle = CircleCandidate::new(args.x, args.y, args.r)?;
    let points = ringfit::sample_circle(circle.x, circle.y, circle.r, args.num_points);
    let mut report = SampleReport {
        circle: [circle.x, circle.y, circle.r],
        points,
        intensities: None,
        sum: None,
        variance: None,
    };

    if let Some(path) = &args.image {
        let gray = load_gray(path, false)?;
        report.intensities = Some(ringfit::sample_intensities(&gray, &circle, args.num_points)?);
        report.sum = Some(ringfit::evaluate(
            &gray,
            &circle,
            ObjectiveKind::Sum,
            args.num_points,
        )?);
        report.variance = Some(ringfit::evaluate(
            &gray,
            &circle,
            ObjectiveKind::Variance,
            args.num_points,
        )?);
    }

    emit(&report, &args.output)
}

// ── centroid ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct CentroidReport {
    center: [f64; 2],
    window_size: u32,
    threshold: f64,
}

fn run_centroid(args: &CliCentroidArgs) -> CliResult<()> {
    let gray = load_gray(&args.input.image, args.input.equalize)?;
    let center = ringfit::estimate_centroid(&gray, args.window_size, args.threshold)?;
    tracing::info!("Centroid: ({:.3}, {:.3})", center[0], center[1]);
    emit(
        &CentroidReport {
            center,
            window_size: args.window_size,
            threshold: args.threshold,
        },
        &args.output,
    )
}

// ── three-point ────────────────────────────────────────────────────────

fn run_three_point(args: &CliThreePointArgs) -> CliResult<()> {
    let circle = ringfit::fit_three_points(args.p0, args.p1, args.p2)?;
    tracing::info!(
        "Circle: center ({:.3}, {:.3}), radius {:.3}",
        circle.x,
        circle.y,
        circle.r
    );
    emit(&circle, &args.output)
}

// ── refine ─────────────────────────────────────────────────────────────

fn run_refine(args: &CliRefineArgs) -> CliResult<()> {
    let gray = load_gray(&args.input.image, args.input.equalize)?;

    let mut finder = CenterFinder::default();
    args.refine.apply_to(finder.config_mut());

    let seed = apply_adjustments(args.seed, &args.refine.adjustments())?;
    let result = finder.find_from_seed(&gray, seed);
    report_find(&result);
    emit(&result, &args.output)
}

// ── find ───────────────────────────────────────────────────────────────

fn run_find(args: &CliFindArgs) -> CliResult<()> {
    let gray = load_gray(&args.input.image, args.input.equalize)?;

    let mut finder = CenterFinder::default();
    {
        let config = finder.config_mut();
        config.centroid.window_size = args.window_size;
        config.centroid.threshold_fraction = args.threshold;
        args.refine.apply_to(config);
        if args.no_refine {
            config.objective = None;
        }
    }

    let strategy = args.seed.to_strategy()?;
    let seed = finder.seed(&gray, &strategy)?;
    let seed = apply_adjustments(seed, &args.refine.adjustments())?;
    let result = finder.find_from_seed(&gray, seed);
    report_find(&result);
    emit(&result, &args.output)
}

fn report_find(result: &ringfit::FindResult) {
    match &result.refinement {
        Some(r) if r.accepted => tracing::info!(
            "Refined ({:.3}, {:.3}, {:.3}) in {} iterations, {} {:.4} -> {:.4}",
            result.circle.x,
            result.circle.y,
            result.circle.r,
            r.iterations,
            r.objective,
            r.objective_initial,
            r.objective_final
        ),
        Some(r) => tracing::warn!(
            "Refinement rejected after {} iterations; reporting seed ({:.3}, {:.3}, {:.3})",
            r.iterations,
            result.seed.x,
            result.seed.y,
            result.seed.r
        ),
        None => tracing::info!(
            "Seed ({:.3}, {:.3}, {:.3})",
            result.seed.x,
            result.seed.y,
            result.seed.r
        ),
    }
}
