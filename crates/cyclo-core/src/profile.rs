//! 摆线轮齿廓生成
//!
//! 采用 Chen BingKui 等人《Gear geometry of cycloid drives》中式 (10)、(11)
//! 的闭式参数方程，对参数 ψ ∈ [0, 2π] 一整周均匀采样。
//!
//! ```text
//! Ze = Zb / (Zb - Zg)
//! Zd = Zg / (Zb - Zg)
//! K1 = e·Zb / (Rz·(Zb - Zg))
//! x  = Rz·sin ψ - e·sin(Ze·ψ) + rz·cos β
//! y  = Rz·cos ψ - e·cos(Ze·ψ) - rz·sin β
//! ```
//!
//! 采样顺序即齿廓的绘制顺序。

use crate::error::GeometryError;
use crate::geometry::Polyline;
use crate::math::{BoundingBox2, Point2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// 默认采样密度（每度采样点数）
pub const DEFAULT_RESOLUTION: u32 = 16;

/// 齿轮参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GearParameters {
    /// 针齿数 Zb
    pub pin_count: u32,
    /// 摆线轮齿数 Zg，缺省为 `pin_count - 1`
    pub cam_count: Option<u32>,
    /// 偏心距 e
    pub eccentricity: f64,
    /// 针齿半径 rz
    pub pin_radius: f64,
    /// 针齿中心圆半径 Rz
    pub pattern_radius: f64,
    /// 每度采样点数
    pub resolution: u32,
}

impl GearParameters {
    pub fn new(pin_count: u32, eccentricity: f64, pin_radius: f64, pattern_radius: f64) -> Self {
        Self {
            pin_count,
            cam_count: None,
            eccentricity,
            pin_radius,
            pattern_radius,
            resolution: DEFAULT_RESOLUTION,
        }
    }

    pub fn with_cam_count(mut self, cam_count: u32) -> Self {
        self.cam_count = Some(cam_count);
        self
    }

    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// 实际使用的摆线轮齿数
    pub fn effective_cam_count(&self) -> u32 {
        self.cam_count
            .unwrap_or_else(|| self.pin_count.saturating_sub(1))
    }

    /// 采样点数 N = resolution·360
    pub fn sample_count(&self) -> usize {
        self.resolution as usize * 360
    }
}

/// 方程中由参数导出的常量
#[derive(Debug, Clone, Copy)]
struct ProfileEquation {
    ze: f64,
    zd: f64,
    k1: f64,
    sign: f64,
    eccentricity: f64,
    pin_radius: f64,
    pattern_radius: f64,
}

impl ProfileEquation {
    fn new(params: &GearParameters) -> Result<Self, GeometryError> {
        let zb = params.pin_count;
        let zg = params.effective_cam_count();
        if zb == zg {
            return Err(GeometryError::EqualToothCounts { count: zb });
        }

        let diff = zb as f64 - zg as f64;
        let (e, pattern_radius) = (params.eccentricity, params.pattern_radius);
        Ok(Self {
            ze: zb as f64 / diff,
            zd: zg as f64 / diff,
            k1: (e * zb as f64) / (pattern_radius * diff),
            sign: diff.signum(),
            eccentricity: e,
            pin_radius: params.pin_radius,
            pattern_radius,
        })
    }

    fn evaluate(&self, psi: f64) -> Result<Point2, GeometryError> {
        let k1 = self.k1;
        let denom = (1.0 + k1 * k1 - 2.0 * k1 * (self.zd * psi).cos()).sqrt();
        if denom == 0.0 {
            return Err(GeometryError::DegenerateProfile { psi });
        }

        let (sin_ze, cos_ze) = (self.ze * psi).sin_cos();
        let (sin_psi, cos_psi) = psi.sin_cos();
        let cos_b = self.sign * (k1 * sin_ze - sin_psi) / denom;
        let sin_b = self.sign * (-k1 * cos_ze + cos_psi) / denom;

        let e = self.eccentricity;
        Ok(Point2::new(
            self.pattern_radius * sin_psi - e * sin_ze + self.pin_radius * cos_b,
            self.pattern_radius * cos_psi - e * cos_ze - self.pin_radius * sin_b,
        ))
    }
}

/// 采样得到的齿廓曲线（近似闭合，首末点重合）
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCurve {
    points: Vec<Point2>,
}

impl ProfileCurve {
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 首末点距离是否在相对容差内
    pub fn is_closed(&self, relative_tolerance: f64) -> bool {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return false;
        };
        let scale = first.coords.norm().max(1.0);
        (first - last).norm() <= relative_tolerance * scale
    }

    /// 转为多段线，去掉与首点重合的末点
    pub fn to_polyline(&self) -> Polyline {
        let mut points = self.points.clone();
        if points.len() > 1 && self.is_closed(1e-9) {
            points.pop();
        }
        Polyline::new(points, true)
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.points.iter().copied())
    }
}

/// 生成摆线轮齿廓
///
/// ψ 在 [0, 2π] 上取 `resolution·360` 个点（含两端）。
/// `pin_count == cam_count` 或分母为零时返回定义域错误。
/// 偏心距与半径的合理性由调用方保证。
pub fn generate(params: &GearParameters) -> Result<ProfileCurve, GeometryError> {
    if params.pin_count < 3 {
        return Err(GeometryError::TooFewPins(params.pin_count));
    }
    if params.resolution == 0 {
        return Err(GeometryError::InvalidResolution(params.resolution));
    }

    let equation = ProfileEquation::new(params)?;
    let n = params.sample_count();
    let step = TAU / (n - 1) as f64;

    let points = (0..n)
        .map(|i| {
            // 末点精确取 2π
            let psi = if i == n - 1 { TAU } else { i as f64 * step };
            equation.evaluate(psi)
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        pin_count = params.pin_count,
        cam_count = params.effective_cam_count(),
        samples = points.len(),
        "generated cycloidal profile"
    );

    Ok(ProfileCurve { points })
}

/// 在单个参数 ψ 处求齿廓点
pub fn point_at(params: &GearParameters, psi: f64) -> Result<Point2, GeometryError> {
    ProfileEquation::new(params)?.evaluate(psi)
}
