//! 曲线简化
//!
//! 齿廓方程的原始采样远比导出所需密集。`CurveSimplifier` 把稠密的闭合
//! 折线压缩为少量顶点或控制点，同时保证偏差不超过给定容差，
//! 起点、绕向和闭合性保持不变。
//!
//! - [`BezierFit`]：分段三次贝塞尔拟合（Schneider 算法），输出样条，装配默认使用
//! - [`RamerDouglasPeucker`]：保留输入点子序列，输出多段线

use crate::error::GeometryError;
use crate::geometry::{
    bezier_newton_step, bezier_point, BezierSegment, CubicSpline, Geometry, Line, Polyline,
};
use crate::math::{Point2, Vector2, EPSILON};

/// 闭合曲线简化接口
pub trait CurveSimplifier: Send + Sync {
    /// 输入为稠密闭合折线（末点可与首点重合），输出闭合的多段线或样条
    fn simplify(&self, points: &[Point2], tolerance: f64) -> Result<Geometry, GeometryError>;
}

/// 去掉与首点重合的末点，并检查点数
fn closed_ring(points: &[Point2]) -> Result<&[Point2], GeometryError> {
    let mut ring = points;
    while ring.len() > 1 && (ring[ring.len() - 1] - ring[0]).norm() <= EPSILON {
        ring = &ring[..ring.len() - 1];
    }
    if ring.len() < 3 {
        return Err(GeometryError::TooFewPoints(ring.len()));
    }
    Ok(ring)
}

// ========== Ramer-Douglas-Peucker ==========

/// 闭合曲线的 Ramer-Douglas-Peucker 简化
#[derive(Debug, Clone, Copy, Default)]
pub struct RamerDouglasPeucker;

impl CurveSimplifier for RamerDouglasPeucker {
    fn simplify(&self, points: &[Point2], tolerance: f64) -> Result<Geometry, GeometryError> {
        let tolerance = GeometryError::require_positive("simplification tolerance", tolerance)?;
        let ring = closed_ring(points)?;

        // 以离起点最远的点把环切成两段，各自做开放折线简化
        let start = ring[0];
        let far = (1..ring.len())
            .max_by(|&a, &b| {
                let da = (ring[a] - start).norm_squared();
                let db = (ring[b] - start).norm_squared();
                da.total_cmp(&db)
            })
            .unwrap_or(1);

        let n = ring.len();
        let mut keep = vec![false; n + 1];
        keep[0] = true;
        keep[far] = true;
        keep[n] = true;

        // 下标 n 代表回到起点
        let at = |i: usize| if i == n { start } else { ring[i] };
        simplify_span(&at, tolerance, 0, far, &mut keep);
        simplify_span(&at, tolerance, far, n, &mut keep);

        let kept: Vec<Point2> = (0..n).filter(|&i| keep[i]).map(|i| ring[i]).collect();

        tracing::debug!(
            input = points.len(),
            output = kept.len(),
            tolerance,
            "simplified closed curve to polyline"
        );

        Ok(Polyline::new(kept, true).into())
    }
}

fn simplify_span(
    at: &impl Fn(usize) -> Point2,
    tolerance: f64,
    first: usize,
    last: usize,
    keep: &mut [bool],
) {
    if last <= first + 1 {
        return;
    }

    let chord = Line::new(at(first), at(last));
    let mut max_distance = -1.0;
    let mut max_index = first;
    for i in first + 1..last {
        let d = chord.distance_to_point(&at(i));
        if d > max_distance {
            max_distance = d;
            max_index = i;
        }
    }

    if max_distance > tolerance {
        keep[max_index] = true;
        simplify_span(at, tolerance, first, max_index, keep);
        simplify_span(at, tolerance, max_index, last, keep);
    }
}

// ========== 贝塞尔拟合 ==========

/// 分段三次贝塞尔拟合
///
/// 对每段点列用固定端点切向的最小二乘求控制点；误差略超容差时先做
/// Newton 重参数化，仍超差则在误差最大处一分为二递归拟合。
/// 每个输入采样点到样条的参数距离不超过容差，分段处 G1 连续。
#[derive(Debug, Clone, Copy)]
pub struct BezierFit {
    /// 每段最多重参数化次数
    pub max_reparameterizations: usize,
}

impl Default for BezierFit {
    fn default() -> Self {
        Self {
            max_reparameterizations: 4,
        }
    }
}

impl CurveSimplifier for BezierFit {
    fn simplify(&self, points: &[Point2], tolerance: f64) -> Result<Geometry, GeometryError> {
        let tolerance = GeometryError::require_positive("simplification tolerance", tolerance)?;
        let ring = closed_ring(points)?;
        let n = ring.len();

        let mut closed = ring.to_vec();
        closed.push(ring[0]);

        // 起点处两侧共用切向，保证闭合处光滑
        let tangent = direction(ring[1] - ring[n - 1], ring[1] - ring[0]);
        let mut segments = Vec::new();
        self.fit(&closed, tangent, -tangent, tolerance, &mut segments);

        tracing::debug!(
            input = points.len(),
            segments = segments.len(),
            tolerance,
            "fitted closed curve with cubic bezier spline"
        );

        Ok(CubicSpline::from_segments(&segments, true).into())
    }
}

impl BezierFit {
    /// `t1` 为首点处向前的切向，`t2` 为末点处向后的切向
    fn fit(
        &self,
        points: &[Point2],
        t1: Vector2,
        t2: Vector2,
        tolerance: f64,
        out: &mut Vec<BezierSegment>,
    ) {
        let first = points[0];
        let last = points[points.len() - 1];

        if points.len() == 2 {
            let dist = (last - first).norm() / 3.0;
            out.push([first, first + t1 * dist, last + t2 * dist, last]);
            return;
        }

        let mut u = chord_length_parameters(points);
        let mut seg = least_squares_bezier(points, &u, t1, t2);
        let (mut error, mut split) = max_error(points, &seg, &u);
        if error < tolerance {
            out.push(seg);
            return;
        }

        if error < tolerance * 4.0 {
            for _ in 0..self.max_reparameterizations {
                u = reparameterize(points, &seg, &u);
                seg = least_squares_bezier(points, &u, t1, t2);
                (error, split) = max_error(points, &seg, &u);
                if error < tolerance {
                    out.push(seg);
                    return;
                }
            }
        }

        let center = direction(
            points[split - 1] - points[split + 1],
            points[split] - points[split + 1],
        );
        self.fit(&points[..=split], t1, center, tolerance, out);
        self.fit(&points[split..], -center, t2, tolerance, out);
    }
}

/// 单位方向；主方向退化时用备选方向
fn direction(primary: Vector2, fallback: Vector2) -> Vector2 {
    if primary.norm() > EPSILON {
        primary.normalize()
    } else if fallback.norm() > EPSILON {
        fallback.normalize()
    } else {
        Vector2::x()
    }
}

fn chord_length_parameters(points: &[Point2]) -> Vec<f64> {
    let mut u = Vec::with_capacity(points.len());
    u.push(0.0);
    for w in points.windows(2) {
        let prev = u[u.len() - 1];
        u.push(prev + (w[1] - w[0]).norm());
    }
    let total = u[u.len() - 1];
    if total > 0.0 {
        for v in &mut u {
            *v /= total;
        }
    }
    u
}

fn least_squares_bezier(points: &[Point2], u: &[f64], t1: Vector2, t2: Vector2) -> BezierSegment {
    let first = points[0];
    let last = points[points.len() - 1];

    let mut c = [[0.0f64; 2]; 2];
    let mut x = [0.0f64; 2];
    for (p, &t) in points.iter().zip(u) {
        let mt = 1.0 - t;
        let a1 = t1 * (3.0 * mt * mt * t);
        let a2 = t2 * (3.0 * mt * t * t);
        c[0][0] += a1.dot(&a1);
        c[0][1] += a1.dot(&a2);
        c[1][1] += a2.dot(&a2);

        let base = bezier_point(&[first, first, last, last], t);
        let tmp = *p - base;
        x[0] += a1.dot(&tmp);
        x[1] += a2.dot(&tmp);
    }
    c[1][0] = c[0][1];

    let det = c[0][0] * c[1][1] - c[1][0] * c[0][1];
    let (mut alpha_l, mut alpha_r) = (0.0, 0.0);
    if det != 0.0 {
        alpha_l = (x[0] * c[1][1] - x[1] * c[0][1]) / det;
        alpha_r = (c[0][0] * x[1] - c[1][0] * x[0]) / det;
    }

    // 系数退化或为负时退回到弦长 1/3 的启发式
    let seg_length = (last - first).norm();
    let eps = 1e-6 * seg_length;
    if alpha_l < eps || alpha_r < eps {
        alpha_l = seg_length / 3.0;
        alpha_r = alpha_l;
    }

    [first, first + t1 * alpha_l, last + t2 * alpha_r, last]
}

/// 最大误差及其位置（仅内点，位置落在 `1..len-1`）
fn max_error(points: &[Point2], seg: &BezierSegment, u: &[f64]) -> (f64, usize) {
    let mut max = 0.0;
    let mut split = points.len() / 2;
    for i in 1..points.len() - 1 {
        let d = (bezier_point(seg, u[i]) - points[i]).norm();
        if d >= max {
            max = d;
            split = i;
        }
    }
    (max, split)
}

fn reparameterize(points: &[Point2], seg: &BezierSegment, u: &[f64]) -> Vec<f64> {
    points
        .iter()
        .zip(u)
        .map(|(p, &t)| bezier_newton_step(seg, p, t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn dense_circle(n: usize, radius: f64) -> Vec<Point2> {
        // 含重复的闭合点
        (0..=n)
            .map(|i| {
                let a = TAU * i as f64 / n as f64;
                Point2::new(radius * a.cos(), radius * a.sin())
            })
            .collect()
    }

    fn polyline(g: Geometry) -> Polyline {
        match g {
            Geometry::Polyline(pl) => pl,
            other => panic!("expected polyline, got {}", other.type_name()),
        }
    }

    fn spline(g: Geometry) -> CubicSpline {
        match g {
            Geometry::Spline(sp) => sp,
            other => panic!("expected spline, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_rdp_circle_within_tolerance() {
        let input = dense_circle(3600, 1.0);
        let out = polyline(RamerDouglasPeucker.simplify(&input, 1e-3).unwrap());

        assert!(out.closed);
        assert!(out.vertex_count() >= 3);
        assert!(out.vertex_count() < 200, "kept {} points", out.vertex_count());
        for p in &input {
            assert!(out.distance_to_point(p) <= 1e-3 + 1e-12);
        }
    }

    #[test]
    fn test_rdp_output_is_ordered_subsequence() {
        let input = dense_circle(720, 2.0);
        let out = polyline(RamerDouglasPeucker.simplify(&input, 1e-4).unwrap());

        assert_eq!(out.points[0], input[0]);
        let mut cursor = 0;
        for p in &out.points {
            let pos = input[cursor..].iter().position(|q| q == p).expect("point not in input");
            cursor += pos + 1;
        }
        // 绕向不变
        assert!(out.signed_area() > 0.0);
    }

    #[test]
    fn test_rdp_square_keeps_corners() {
        let mut input = Vec::new();
        for i in 0..10 {
            input.push(Point2::new(i as f64 / 10.0, 0.0));
        }
        for i in 0..10 {
            input.push(Point2::new(1.0, i as f64 / 10.0));
        }
        for i in 0..10 {
            input.push(Point2::new(1.0 - i as f64 / 10.0, 1.0));
        }
        for i in 0..10 {
            input.push(Point2::new(0.0, 1.0 - i as f64 / 10.0));
        }
        let out = polyline(RamerDouglasPeucker.simplify(&input, 1e-6).unwrap());
        assert_eq!(
            out.points,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_bezier_circle_tight_fit() {
        let input = dense_circle(3600, 1.0);
        let out = spline(BezierFit::default().simplify(&input, 1e-6).unwrap());

        assert!(out.closed);
        assert!(out.segment_count() >= 4);
        assert!(out.segment_count() < 100, "{} segments", out.segment_count());
        assert_eq!(out.control_points[0], input[0]);
        assert_eq!(out.control_points[out.control_points.len() - 1], input[0]);

        // 样条整体贴合真实圆
        for seg in out.segments() {
            for t in [0.0, 0.25, 0.5, 0.75] {
                let r = bezier_point(&seg, t).coords.norm();
                assert!((r - 1.0).abs() < 2e-6, "radius {r}");
            }
        }
    }

    #[test]
    fn test_bezier_keeps_winding_and_knots_on_input() {
        let input = dense_circle(720, 2.0);
        let out = spline(BezierFit::default().simplify(&input, 1e-5).unwrap());
        assert!(out.flatten(8).signed_area() > 0.0);
        for knot in out.knots() {
            assert!(input.iter().any(|p| *p == knot));
        }
    }

    #[test]
    fn test_bezier_is_g1_continuous() {
        let input = dense_circle(1000, 1.0);
        let out = spline(BezierFit::default().simplify(&input, 1e-6).unwrap());
        let segs: Vec<BezierSegment> = out.segments().collect();
        for i in 0..segs.len() {
            let cur = segs[i];
            let next = segs[(i + 1) % segs.len()];
            let incoming = (cur[3] - cur[2]).normalize();
            let outgoing = (next[1] - next[0]).normalize();
            assert!((incoming - outgoing).norm() < 1e-9);
        }
    }

    #[test]
    fn test_too_few_points() {
        let pts = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 0.0)];
        assert_eq!(
            RamerDouglasPeucker.simplify(&pts, 1e-6),
            Err(GeometryError::TooFewPoints(2))
        );
        assert_eq!(
            BezierFit::default().simplify(&pts, 1e-6),
            Err(GeometryError::TooFewPoints(2))
        );
    }

    #[test]
    fn test_tolerance_must_be_positive() {
        let input = dense_circle(16, 1.0);
        assert!(RamerDouglasPeucker.simplify(&input, 0.0).is_err());
        assert!(BezierFit::default().simplify(&input, -1.0).is_err());
    }
}
