//! Cyclo 命令行程序
//!
//! - `cyclo drive`：双摆线盘减速器装配图
//! - `cyclo profile`：单个摆线轮齿廓

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use cyclo_core::assembly::{assemble, DriveParameters, SMOOTHING_TOLERANCE};
use cyclo_core::drawing::LayeredDrawing;
use cyclo_core::geometry::Geometry;
use cyclo_core::layer::{Layer, PROFILE};
use cyclo_core::profile::{self, GearParameters, DEFAULT_RESOLUTION};
use cyclo_core::simplify::{BezierFit, CurveSimplifier, RamerDouglasPeucker};
use cyclo_file::export_drawing;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// 未指定参数文件时 `drive` 使用的参考设计
const REFERENCE_PIN_RADIUS: f64 = 0.125;
const REFERENCE_PATTERN_RADIUS: f64 = 2.5;
const REFERENCE_PIN_COUNT: u32 = 24;
/// 偏心距与针齿半径之比
const REFERENCE_ECCENTRICITY_RATIO: f64 = 0.56;
/// 轴承孔分布圆相对针齿分布圆的内缩量
const REFERENCE_INPUT_INSET: f64 = 1.25;
const REFERENCE_INPUT_COUNT: u32 = 3;
const REFERENCE_INPUT_RADIUS: f64 = 0.5625;

#[derive(Parser)]
#[command(name = "cyclo")]
#[command(about = "Generate cycloidal drive drawings (DXF, SVG, JSON)")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble the dual-disc drive: two phase-offset discs, pins and bearing holes
    Drive(DriveArgs),
    /// Write a single cycloidal disc profile
    Profile(ProfileArgs),
}

#[derive(Args)]
struct DriveArgs {
    /// JSON file with drive parameters; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    eccentricity: Option<f64>,

    #[arg(long)]
    pin_count: Option<u32>,

    #[arg(long)]
    pin_radius: Option<f64>,

    #[arg(long)]
    pattern_radius: Option<f64>,

    #[arg(long)]
    input_count: Option<u32>,

    #[arg(long)]
    input_radius: Option<f64>,

    #[arg(long)]
    input_pattern: Option<f64>,

    /// Output files, format chosen by extension (.dxf, .svg, .json)
    #[arg(short, long = "output", required = true, num_args = 1..)]
    outputs: Vec<PathBuf>,
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    pin_count: u32,

    /// Defaults to pin count - 1
    #[arg(long)]
    cam_count: Option<u32>,

    #[arg(long)]
    eccentricity: f64,

    #[arg(long)]
    pin_radius: f64,

    #[arg(long)]
    pattern_radius: f64,

    /// Samples per degree
    #[arg(long, default_value_t = DEFAULT_RESOLUTION)]
    resolution: u32,

    /// Simplification tolerance
    #[arg(long, default_value_t = SMOOTHING_TOLERANCE)]
    smoothing: f64,

    #[arg(long, value_enum, default_value_t = SimplifierKind::Bezier)]
    simplifier: SimplifierKind,

    /// Output files, format chosen by extension (.dxf, .svg, .json)
    #[arg(short, long = "output", required = true, num_args = 1..)]
    outputs: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SimplifierKind {
    /// Piecewise cubic bezier fit
    Bezier,
    /// Ramer-Douglas-Peucker vertex reduction
    Rdp,
    /// Keep every sample
    #[value(name = "none")]
    Dense,
}

impl DriveArgs {
    /// 参数来源：参数文件或参考设计，命令行参数优先
    fn resolve(&self, file: Option<DriveParameters>) -> DriveParameters {
        let base = file.unwrap_or_else(|| self.reference());
        DriveParameters {
            eccentricity: self.eccentricity.unwrap_or(base.eccentricity),
            pin_count: self.pin_count.unwrap_or(base.pin_count),
            pin_radius: self.pin_radius.unwrap_or(base.pin_radius),
            pattern_radius: self.pattern_radius.unwrap_or(base.pattern_radius),
            input_count: self.input_count.unwrap_or(base.input_count),
            input_radius: self.input_radius.unwrap_or(base.input_radius),
            input_pattern: self.input_pattern.unwrap_or(base.input_pattern),
        }
    }

    /// 参考设计；偏心距和轴承孔分布圆随给定的针齿尺寸推导
    fn reference(&self) -> DriveParameters {
        let pin_radius = self.pin_radius.unwrap_or(REFERENCE_PIN_RADIUS);
        let pattern_radius = self.pattern_radius.unwrap_or(REFERENCE_PATTERN_RADIUS);
        DriveParameters {
            eccentricity: pin_radius * REFERENCE_ECCENTRICITY_RATIO,
            pin_count: REFERENCE_PIN_COUNT,
            pin_radius,
            pattern_radius,
            input_count: REFERENCE_INPUT_COUNT,
            input_radius: REFERENCE_INPUT_RADIUS,
            input_pattern: pattern_radius - REFERENCE_INPUT_INSET,
        }
    }
}

impl ProfileArgs {
    fn gear_parameters(&self) -> GearParameters {
        let params = GearParameters::new(
            self.pin_count,
            self.eccentricity,
            self.pin_radius,
            self.pattern_radius,
        )
        .with_resolution(self.resolution);
        match self.cam_count {
            Some(cam_count) => params.with_cam_count(cam_count),
            None => params,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .finish(),
    )?;

    match cli.command {
        Command::Drive(args) => run_drive(&args),
        Command::Profile(args) => run_profile(&args),
    }
}

fn run_drive(args: &DriveArgs) -> Result<()> {
    let file = args.config.as_deref().map(load_parameters).transpose()?;
    let params = args.resolve(file);
    info!(?params, "assembling dual-disc drive");

    let assembly = assemble(&params).context("Failed to assemble drive")?;
    info!(
        layers = assembly.drawing.layer_count(),
        entities = assembly.drawing.entity_count(),
        "assembled"
    );

    write_outputs(&assembly.drawing, &args.outputs)
}

fn run_profile(args: &ProfileArgs) -> Result<()> {
    let params = args.gear_parameters();
    info!(?params, simplifier = ?args.simplifier, "generating profile");

    let dense = profile::generate(&params).context("Failed to generate profile")?;
    let extent = dense.bounding_box();
    info!(
        samples = dense.len(),
        width = extent.width(),
        height = extent.height(),
        "sampled profile"
    );
    let outline: Geometry = match args.simplifier {
        SimplifierKind::Bezier => BezierFit::default().simplify(dense.points(), args.smoothing)?,
        SimplifierKind::Rdp => RamerDouglasPeucker.simplify(dense.points(), args.smoothing)?,
        SimplifierKind::Dense => dense.to_polyline().into(),
    };

    let drawing = LayeredDrawing::builder()
        .layer(Layer::new(PROFILE))
        .add(PROFILE, outline)
        .build();

    write_outputs(&drawing, &args.outputs)
}

fn load_parameters(path: &Path) -> Result<DriveParameters> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open config {}", path.display()))?;
    let params = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    Ok(params)
}

fn write_outputs(drawing: &LayeredDrawing, outputs: &[PathBuf]) -> Result<()> {
    for path in outputs {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        export_drawing(drawing, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
