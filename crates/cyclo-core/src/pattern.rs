//! 环形阵列圆
//!
//! 在半径为 `pattern_radius` 的分布圆上均匀放置 `count` 个圆，
//! 用于固定针齿和摆线轮上的输出轴承孔。

use crate::error::GeometryError;
use crate::geometry::Circle;
use crate::math::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CirclePattern {
    /// 单个圆的半径
    pub radius: f64,
    /// 分布圆半径
    pub pattern_radius: f64,
    pub count: u32,
    /// 第一个圆的起始角（弧度）
    pub angular_offset: f64,
    pub center: Point2,
}

impl CirclePattern {
    pub fn new(radius: f64, pattern_radius: f64, count: u32) -> Self {
        Self {
            radius,
            pattern_radius,
            count,
            angular_offset: 0.0,
            center: Point2::origin(),
        }
    }

    pub fn with_center(mut self, center: Point2) -> Self {
        self.center = center;
        self
    }

    pub fn with_angular_offset(mut self, angular_offset: f64) -> Self {
        self.angular_offset = angular_offset;
        self
    }

    /// 相邻两圆之间的角距
    pub fn angular_pitch(&self) -> f64 {
        TAU / self.count.max(1) as f64
    }
}

/// 计算阵列中每个圆
///
/// 第 k 个圆心：`center + pattern_radius·(cos a_k, sin a_k)`，
/// `a_k = angular_offset + k·2π/count`。
pub fn generate(pattern: &CirclePattern) -> Result<Vec<Circle>, GeometryError> {
    if pattern.count == 0 {
        return Err(GeometryError::InvalidPatternCount(pattern.count));
    }
    let radius = GeometryError::require_positive("circle radius", pattern.radius)?;
    let pattern_radius = GeometryError::require_positive("pattern radius", pattern.pattern_radius)?;

    let pitch = pattern.angular_pitch();
    Ok((0..pattern.count)
        .map(|k| {
            let angle = pattern.angular_offset + k as f64 * pitch;
            let offset = Vector2::new(angle.cos(), angle.sin()) * pattern_radius;
            Circle::new(pattern.center + offset, radius)
        })
        .collect())
}
