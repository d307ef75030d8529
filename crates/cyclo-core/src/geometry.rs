//! 几何图元定义
//!
//! 图纸中出现的图元：
//! - 圆 (Circle)：针齿、轴承孔
//! - 多段线 (Polyline)：稠密或按顶点简化的齿廓
//! - 样条曲线 (CubicSpline)：拟合后的齿廓，分段三次贝塞尔

use crate::math::{BoundingBox2, Point2, Vector2, EPSILON};
use serde::{Deserialize, Serialize};

/// 几何类型枚举
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Circle(Circle),
    Polyline(Polyline),
    Spline(CubicSpline),
}

impl Geometry {
    /// 获取几何的包围盒
    pub fn bounding_box(&self) -> BoundingBox2 {
        match self {
            Geometry::Circle(c) => c.bounding_box(),
            Geometry::Polyline(pl) => pl.bounding_box(),
            Geometry::Spline(sp) => sp.bounding_box(),
        }
    }

    /// 获取几何的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Circle(_) => "Circle",
            Geometry::Polyline(_) => "Polyline",
            Geometry::Spline(_) => "Spline",
        }
    }

    /// 点到图元轮廓的距离（非负）
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        match self {
            Geometry::Circle(c) => c.distance_to_point(point).abs(),
            Geometry::Polyline(pl) => pl.distance_to_point(point),
            Geometry::Spline(sp) => sp.distance_to_point(point),
        }
    }

    /// 是否为闭合轮廓（圆总是闭合）
    pub fn is_closed(&self) -> bool {
        match self {
            Geometry::Circle(_) => true,
            Geometry::Polyline(pl) => pl.closed,
            Geometry::Spline(sp) => sp.closed,
        }
    }

    pub fn as_circle(&self) -> Option<&Circle> {
        match self {
            Geometry::Circle(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_polyline(&self) -> Option<&Polyline> {
        match self {
            Geometry::Polyline(pl) => Some(pl),
            _ => None,
        }
    }

    pub fn as_spline(&self) -> Option<&CubicSpline> {
        match self {
            Geometry::Spline(sp) => Some(sp),
            _ => None,
        }
    }
}

impl From<Circle> for Geometry {
    fn from(circle: Circle) -> Self {
        Geometry::Circle(circle)
    }
}

impl From<Polyline> for Geometry {
    fn from(polyline: Polyline) -> Self {
        Geometry::Polyline(polyline)
    }
}

impl From<CubicSpline> for Geometry {
    fn from(spline: CubicSpline) -> Self {
        Geometry::Spline(spline)
    }
}

/// 线段
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Point2,
    pub end: Point2,
}

impl Line {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// 计算点到线段的距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        let v: Vector2 = self.end - self.start;
        let w: Vector2 = point - self.start;

        let c1 = w.dot(&v);
        if c1 <= 0.0 {
            return (point - self.start).norm();
        }

        let c2 = v.dot(&v);
        if c2 <= c1 {
            return (point - self.end).norm();
        }

        let b = c1 / c2;
        let pb = self.start + v * b;
        (point - pb).norm()
    }
}

/// 圆
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// 计算周长
    pub fn circumference(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.radius
    }

    /// 计算点到圆的距离（负值表示在圆内）
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        (point - self.center).norm() - self.radius
    }

    /// 获取圆上指定角度的点
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        Point2::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(
            Point2::new(self.center.x - self.radius, self.center.y - self.radius),
            Point2::new(self.center.x + self.radius, self.center.y + self.radius),
        )
    }
}

/// 多段线
///
/// 顶点顺序即绘制顺序（决定绕向）。闭合多段线不重复存储首点。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point2>,
    /// 是否闭合
    pub closed: bool,
}

impl Polyline {
    pub fn new(points: Vec<Point2>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point2>, closed: bool) -> Self {
        Self {
            points: points.into_iter().collect(),
            closed,
        }
    }

    /// 顶点数量
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// 线段数量
    pub fn segment_count(&self) -> usize {
        if self.points.len() < 2 {
            return 0;
        }
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    /// 遍历所有线段（闭合时包含末点到首点）
    pub fn segments(&self) -> impl Iterator<Item = Line> + '_ {
        let n = self.points.len();
        (0..self.segment_count()).map(move |i| Line::new(self.points[i], self.points[(i + 1) % n]))
    }

    /// 计算总长度
    pub fn length(&self) -> f64 {
        self.segments().map(|s| s.length()).sum()
    }

    /// 有向面积（逆时针为正，仅对闭合多段线有意义）
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice / 2.0
    }

    /// 计算点到多段线的距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        match self.points.len() {
            0 => f64::MAX,
            1 => (point - self.points[0]).norm(),
            _ => self
                .segments()
                .map(|s| s.distance_to_point(point))
                .fold(f64::MAX, f64::min),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        if self.points.is_empty() {
            return BoundingBox2::empty();
        }
        BoundingBox2::from_points(self.points.iter().copied())
    }

}

/// 一段三次贝塞尔曲线的四个控制点
pub type BezierSegment = [Point2; 4];

/// 计算三次贝塞尔曲线上参数 t 处的点
pub fn bezier_point(seg: &BezierSegment, t: f64) -> Point2 {
    let mt = 1.0 - t;
    let b0 = mt * mt * mt;
    let b1 = 3.0 * mt * mt * t;
    let b2 = 3.0 * mt * t * t;
    let b3 = t * t * t;
    Point2::from(
        seg[0].coords * b0 + seg[1].coords * b1 + seg[2].coords * b2 + seg[3].coords * b3,
    )
}

/// 对 `|B(t) - p|²` 做一次牛顿迭代，结果限制在 [0, 1]
pub(crate) fn bezier_newton_step(seg: &BezierSegment, p: &Point2, t: f64) -> f64 {
    let mt = 1.0 - t;
    let q = bezier_point(seg, t) - *p;
    let d1 = (seg[1] - seg[0]) * (3.0 * mt * mt)
        + (seg[2] - seg[1]) * (6.0 * mt * t)
        + (seg[3] - seg[2]) * (3.0 * t * t);
    let d2 = (seg[2] - seg[1] * 2.0 + seg[0].coords) * (6.0 * mt)
        + (seg[3] - seg[2] * 2.0 + seg[1].coords) * (6.0 * t);

    let denominator = d1.dot(&d1) + q.dot(&d2);
    if denominator == 0.0 {
        return t;
    }
    (t - q.dot(&d1) / denominator).clamp(0.0, 1.0)
}

/// 段上离 `p` 最近的参数
///
/// 先等分采样取最近处，再用牛顿迭代细化；只接受使距离减小的步长，
/// 否则折半重试。
pub fn bezier_closest_parameter(seg: &BezierSegment, p: &Point2) -> f64 {
    const SAMPLES: usize = 16;
    const ITERATIONS: usize = 16;
    const HALVINGS: usize = 8;

    let dist2 = |t: f64| (bezier_point(seg, t) - *p).norm_squared();
    let (mut t, mut best) = (0..=SAMPLES)
        .map(|k| k as f64 / SAMPLES as f64)
        .map(|t| (t, dist2(t)))
        .fold((0.0, f64::INFINITY), |acc, c| if c.1 < acc.1 { c } else { acc });

    for _ in 0..ITERATIONS {
        let mut step = bezier_newton_step(seg, p, t) - t;
        let mut improved = false;
        for _ in 0..HALVINGS {
            let candidate = t + step;
            let d = dist2(candidate);
            if d < best {
                t = candidate;
                best = d;
                improved = true;
                break;
            }
            step *= 0.5;
        }
        if !improved {
            break;
        }
    }
    t
}

/// 段的精确包围盒：端点加上导数零点处的极值
pub fn bezier_bounding_box(seg: &BezierSegment) -> BoundingBox2 {
    let mut bbox = BoundingBox2::from_points([seg[0], seg[3]]);
    for axis in 0..2 {
        let [p0, p1, p2, p3] = seg.map(|p| p[axis]);
        // B'(t) / 3 = a t² + b t + c
        let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
        let b = 2.0 * (p0 - 2.0 * p1 + p2);
        let c = p1 - p0;
        for t in quadratic_roots(a, b, c) {
            if t > 0.0 && t < 1.0 {
                bbox.expand_to_include(&bezier_point(seg, t));
            }
        }
    }
    bbox
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < EPSILON {
        if b.abs() < EPSILON {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }
    let sq = discriminant.sqrt();
    vec![(-b + sq) / (2.0 * a), (-b - sq) / (2.0 * a)]
}

/// 点到控制点包围盒的距离，凸包性质保证不大于到曲线段的距离
fn hull_distance(seg: &BezierSegment, p: &Point2) -> f64 {
    let hull = BoundingBox2::from_points(*seg);
    let dx = (hull.min.x - p.x).max(p.x - hull.max.x).max(0.0);
    let dy = (hull.min.y - p.y).max(p.y - hull.max.y).max(0.0);
    dx.hypot(dy)
}

/// 分段三次贝塞尔样条
///
/// `control_points` 依次为 `P0, C1, C2, P1, C1, C2, P2, ...`，
/// 相邻段共享端点，共 `3·段数 + 1` 个点。闭合时末点等于首点。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubicSpline {
    pub control_points: Vec<Point2>,
    pub closed: bool,
}

impl CubicSpline {
    pub fn new(control_points: Vec<Point2>, closed: bool) -> Self {
        Self {
            control_points,
            closed,
        }
    }

    /// 由首尾相接的贝塞尔段构造
    pub fn from_segments(segments: &[BezierSegment], closed: bool) -> Self {
        let mut control_points = Vec::with_capacity(segments.len() * 3 + 1);
        for (i, seg) in segments.iter().enumerate() {
            if i == 0 {
                control_points.push(seg[0]);
            }
            control_points.extend_from_slice(&seg[1..]);
        }
        Self::new(control_points, closed)
    }

    pub fn segment_count(&self) -> usize {
        self.control_points.len().saturating_sub(1) / 3
    }

    pub fn segment(&self, index: usize) -> BezierSegment {
        let c = &self.control_points[index * 3..index * 3 + 4];
        [c[0], c[1], c[2], c[3]]
    }

    pub fn segments(&self) -> impl Iterator<Item = BezierSegment> + '_ {
        (0..self.segment_count()).map(move |i| self.segment(i))
    }

    /// 落在曲线上的点（各段端点）
    pub fn knots(&self) -> impl Iterator<Item = Point2> + '_ {
        self.control_points.iter().step_by(3).copied()
    }

    /// 均匀 B 样条节点向量：两端重数 4，内部重数 3（等价于分段贝塞尔）
    pub fn knot_vector(&self) -> Vec<f64> {
        let m = self.segment_count();
        let mut knots = Vec::with_capacity(3 * m + 5);
        knots.extend([0.0; 4]);
        for i in 1..m {
            knots.extend([i as f64; 3]);
        }
        knots.extend([m as f64; 4]);
        knots
    }

    /// 按每段 `steps` 等分展平为多段线
    pub fn flatten(&self, steps: usize) -> Polyline {
        let steps = steps.max(1);
        let mut points = Vec::with_capacity(self.segment_count() * steps + 1);
        for (i, seg) in self.segments().enumerate() {
            if i == 0 {
                points.push(seg[0]);
            }
            for k in 1..=steps {
                points.push(bezier_point(&seg, k as f64 / steps as f64));
            }
        }
        if self.closed && points.len() > 1 {
            points.pop();
        }
        Polyline::new(points, self.closed)
    }

    /// 各段投影距离的最小值；控制点包围盒更远的段直接跳过
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        self.segments().fold(f64::INFINITY, |best, seg| {
            if hull_distance(&seg, point) >= best {
                return best;
            }
            let t = bezier_closest_parameter(&seg, point);
            best.min((bezier_point(&seg, t) - point).norm())
        })
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        self.segments()
            .map(|seg| bezier_bounding_box(&seg))
            .fold(BoundingBox2::empty(), |acc, b| acc.union(&b))
    }
}
