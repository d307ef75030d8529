//! 双摆线盘减速器装配
//!
//! 两片相同的摆线轮分别偏心 `(-e, 0)`、`(+e, 0)`，并各自反向转过半个
//! 齿距，使两片相位相差 180°，一阶旋转不平衡相互抵消，且都与同一
//! 针齿圈正确啮合。
//!
//! 装配流程：
//! 1. 以 `Zg = Zb - 1`、每度 32 点生成稠密齿廓
//! 2. 拟合为分段三次贝塞尔样条（容差 1e-6）
//! 3. 两片共用同一齿廓，仅摆放不同
//! 4. 放置针齿圈与两组输出轴承孔
//! 5. 按图层合并为一张图纸

use crate::drawing::LayeredDrawing;
use crate::error::GeometryError;
use crate::geometry::{Circle, Geometry};
use crate::layer::{Layer, CAM_DISC_A, CAM_DISC_B, PINS};
use crate::math::Point2;
use crate::pattern::{self, CirclePattern};
use crate::profile::{self, GearParameters};
use crate::simplify::{BezierFit, CurveSimplifier};
use crate::transform::Transform2D;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 装配时齿廓采样密度（每度点数）
pub const PROFILE_RESOLUTION: u32 = 32;

/// 齿廓简化容差
pub const SMOOTHING_TOLERANCE: f64 = 1e-6;

/// 双摆线盘装配参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveParameters {
    /// 偏心距
    pub eccentricity: f64,
    /// 固定针齿数
    pub pin_count: u32,
    /// 针齿半径
    pub pin_radius: f64,
    /// 针齿分布圆半径
    pub pattern_radius: f64,
    /// 摆线轮上输出轴承孔数量
    pub input_count: u32,
    /// 轴承孔半径
    pub input_radius: f64,
    /// 轴承孔分布圆半径
    pub input_pattern: f64,
}

impl Default for DriveParameters {
    fn default() -> Self {
        Self {
            eccentricity: 0.07,
            pin_count: 24,
            pin_radius: 0.125,
            pattern_radius: 2.25,
            input_count: 3,
            input_radius: 0.5625,
            input_pattern: 1.3125,
        }
    }
}

impl DriveParameters {
    /// 对应的标准摆线轮参数（`Zg = Zb - 1`）
    pub fn gear_parameters(&self) -> GearParameters {
        GearParameters::new(
            self.pin_count,
            self.eccentricity,
            self.pin_radius,
            self.pattern_radius,
        )
        .with_cam_count(self.pin_count.saturating_sub(1))
        .with_resolution(PROFILE_RESOLUTION)
    }

    /// 摆线轮半个齿距 `π / (2·(Zb - 1))`
    pub fn half_tooth_spacing(&self) -> f64 {
        half_tooth_spacing(self.pin_count)
    }

    /// 摆线轮 A 的摆放：偏移 `(-e, 0)`，转过 `+半齿距`
    pub fn disc_a_placement(&self) -> Transform2D {
        Transform2D::new(-self.eccentricity, 0.0, self.half_tooth_spacing())
    }

    /// 摆线轮 B 的摆放：偏移 `(+e, 0)`，转过 `-半齿距`
    pub fn disc_b_placement(&self) -> Transform2D {
        Transform2D::new(self.eccentricity, 0.0, -self.half_tooth_spacing())
    }
}

/// 装配结果
#[derive(Debug, Clone)]
pub struct DriveAssembly {
    pub drawing: LayeredDrawing,
    /// 简化后、未摆放的齿廓（两片共用）
    pub disc_profile: Geometry,
    pub disc_a: Transform2D,
    pub disc_b: Transform2D,
}

/// 半个齿距（弧度）
pub fn half_tooth_spacing(pin_count: u32) -> f64 {
    PI / (2.0 * (pin_count as f64 - 1.0))
}

/// 两片摆线轮点对称的参数偏移
///
/// 若返回 `Some(δ)`，则 A 片在 ψ 处的点与 B 片在 ψ + δ 处的点关于原点
/// 对称。针齿数为奇数时两片只在镜像意义下对称，返回 `None`。
pub fn reflection_phase(pin_count: u32) -> Option<f64> {
    if pin_count < 4 || pin_count % 2 != 0 {
        return None;
    }
    let zb = pin_count as f64;
    Some((zb - 2.0) * PI / (zb - 1.0))
}

/// 使用默认的贝塞尔拟合装配
pub fn assemble(params: &DriveParameters) -> Result<DriveAssembly, GeometryError> {
    assemble_with(params, &BezierFit::default())
}

/// 使用指定的曲线简化器装配
pub fn assemble_with(
    params: &DriveParameters,
    simplifier: &dyn CurveSimplifier,
) -> Result<DriveAssembly, GeometryError> {
    // 齿廓与圆阵列互不依赖
    let (disc_profile, patterns) = rayon::join(
        || disc_profile(params, simplifier),
        || circle_patterns(params),
    );
    let disc_profile = disc_profile?;
    let (pins, holes_a, holes_b) = patterns?;

    let disc_a = params.disc_a_placement();
    let disc_b = params.disc_b_placement();

    let drawing = LayeredDrawing::builder()
        .layer(Layer::new(CAM_DISC_A))
        .layer(Layer::new(CAM_DISC_B))
        .layer(Layer::new(PINS))
        .add_transformed(CAM_DISC_A, &disc_profile, &disc_a)
        .add_transformed(CAM_DISC_B, &disc_profile, &disc_b)
        .extend(PINS, pins)
        .extend(CAM_DISC_A, holes_a)
        .extend(CAM_DISC_B, holes_b)
        .build();

    tracing::debug!(
        pin_count = params.pin_count,
        profile = disc_profile.type_name(),
        entities = drawing.entity_count(),
        "assembled dual-disc cycloidal drive"
    );

    Ok(DriveAssembly {
        drawing,
        disc_profile,
        disc_a,
        disc_b,
    })
}

fn disc_profile(
    params: &DriveParameters,
    simplifier: &dyn CurveSimplifier,
) -> Result<Geometry, GeometryError> {
    let dense = profile::generate(&params.gear_parameters())?;
    simplifier.simplify(dense.points(), SMOOTHING_TOLERANCE)
}

type Patterns = (Vec<Circle>, Vec<Circle>, Vec<Circle>);

fn circle_patterns(params: &DriveParameters) -> Result<Patterns, GeometryError> {
    let e = params.eccentricity;
    let pins = pattern::generate(&CirclePattern::new(
        params.pin_radius,
        params.pattern_radius,
        params.pin_count,
    ))?;

    // 轴承孔跟随各自摆线轮的偏心中心
    let holes = CirclePattern::new(params.input_radius, params.input_pattern, params.input_count);
    let holes_a = pattern::generate(&holes.with_center(Point2::new(-e, 0.0)))?;
    let holes_b = pattern::generate(&holes.with_center(Point2::new(e, 0.0)))?;

    Ok((pins, holes_a, holes_b))
}
