//! 二维刚体变换
//!
//! 先绕原点旋转 `theta`，再平移 `(dx, dy)`：`p' = R(theta)·p + (dx, dy)`。
//! 所有操作返回新值，不修改输入。

use crate::geometry::{Circle, CubicSpline, Geometry, Polyline};
use crate::math::{Point2, Vector2};
use nalgebra::{Isometry2, Rotation2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub dx: f64,
    pub dy: f64,
    /// 旋转角度（弧度，逆时针）
    pub theta: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    pub fn new(dx: f64, dy: f64, theta: f64) -> Self {
        Self { dx, dy, theta }
    }

    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::new(dx, dy, 0.0)
    }

    pub fn to_isometry(&self) -> Isometry2<f64> {
        Isometry2::new(Vector2::new(self.dx, self.dy), self.theta)
    }

    pub fn from_isometry(iso: &Isometry2<f64>) -> Self {
        Self::new(
            iso.translation.vector.x,
            iso.translation.vector.y,
            iso.rotation.angle(),
        )
    }

    /// 先应用 `self`，再应用 `then`
    pub fn then(&self, then: &Transform2D) -> Transform2D {
        Self::from_isometry(&(then.to_isometry() * self.to_isometry()))
    }

    pub fn inverse(&self) -> Transform2D {
        Self::from_isometry(&self.to_isometry().inverse())
    }

    pub fn apply_point(&self, point: &Point2) -> Point2 {
        Rotation2::new(self.theta) * *point + Vector2::new(self.dx, self.dy)
    }

    /// 逐点变换，保持点数和顺序
    pub fn apply(&self, points: &[Point2]) -> Vec<Point2> {
        let rotation = Rotation2::new(self.theta);
        let offset = Vector2::new(self.dx, self.dy);
        points.iter().map(|p| rotation * *p + offset).collect()
    }

    pub fn apply_polyline(&self, polyline: &Polyline) -> Polyline {
        Polyline::new(self.apply(&polyline.points), polyline.closed)
    }

    pub fn apply_circle(&self, circle: &Circle) -> Circle {
        Circle::new(self.apply_point(&circle.center), circle.radius)
    }

    /// 贝塞尔曲线对仿射变换不变，只需变换控制点
    pub fn apply_spline(&self, spline: &CubicSpline) -> CubicSpline {
        CubicSpline::new(self.apply(&spline.control_points), spline.closed)
    }

    pub fn apply_geometry(&self, geometry: &Geometry) -> Geometry {
        match geometry {
            Geometry::Circle(c) => Geometry::Circle(self.apply_circle(c)),
            Geometry::Polyline(pl) => Geometry::Polyline(self.apply_polyline(pl)),
            Geometry::Spline(sp) => Geometry::Spline(self.apply_spline(sp)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_rotate_quarter_turn() {
        let out = Transform2D::new(0.0, 0.0, PI / 2.0).apply(&[Point2::new(1.0, 0.0)]);
        assert_eq!(out.len(), 1);
        assert!((out[0] - Point2::new(0.0, 1.0)).norm() < TOL);
    }

    #[test]
    fn test_origin_maps_to_offset() {
        for theta in [0.0, 0.3, -2.0, PI] {
            let p = Transform2D::new(3.0, 4.0, theta).apply_point(&Point2::origin());
            assert!((p - Point2::new(3.0, 4.0)).norm() < TOL);
        }
    }

    #[test]
    fn test_rotation_before_translation() {
        // 先旋转后平移：(1,0) -> (0,1) -> (2,1)
        let p = Transform2D::new(2.0, 0.0, PI / 2.0).apply_point(&Point2::new(1.0, 0.0));
        assert!((p - Point2::new(2.0, 1.0)).norm() < TOL);
    }

    #[test]
    fn test_preserves_order_and_count() {
        let pts: Vec<Point2> = (0..10).map(|i| Point2::new(i as f64, 0.0)).collect();
        let out = Transform2D::translation(0.0, 1.0).apply(&pts);
        assert_eq!(out.len(), pts.len());
        for (a, b) in pts.iter().zip(&out) {
            assert_eq!(b.x, a.x);
            assert_eq!(b.y, 1.0);
        }
    }

    #[test]
    fn test_compose_and_inverse() {
        let a = Transform2D::new(1.0, -2.0, 0.4);
        let b = Transform2D::new(-0.5, 3.0, -1.1);
        let p = Point2::new(0.7, 0.2);

        let composed = a.then(&b).apply_point(&p);
        let stepwise = b.apply_point(&a.apply_point(&p));
        assert!((composed - stepwise).norm() < TOL);

        let back = a.inverse().apply_point(&a.apply_point(&p));
        assert!((back - p).norm() < TOL);
    }

    #[test]
    fn test_spline_control_points_moved() {
        let sp = CubicSpline::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            false,
        );
        let moved = match Transform2D::translation(2.0, 0.0).apply_geometry(&sp.into()) {
            Geometry::Spline(s) => s,
            other => panic!("unexpected {}", other.type_name()),
        };
        assert_eq!(moved.control_points[2], Point2::new(3.0, 1.0));
        assert!(!moved.closed);
    }

    #[test]
    fn test_circle_keeps_radius() {
        let c = Transform2D::new(1.0, 1.0, 0.5).apply_circle(&Circle::new(Point2::origin(), 0.25));
        assert_eq!(c.radius, 0.25);
        assert!((c.center - Point2::new(1.0, 1.0)).norm() < TOL);
    }
}
