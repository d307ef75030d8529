//! SVG 预览导出
//!
//! 每个图层一个 `<g>` 分组，使用图层颜色描边。SVG 的 y 轴向下，
//! 输出时翻转 y，使图形与 CAD 中的方向一致。

use crate::error::FileError;
use cyclo_core::drawing::LayeredDrawing;
use cyclo_core::geometry::{Circle, CubicSpline, Geometry, Polyline};
use cyclo_core::math::{BoundingBox2, Point2};
use std::path::Path;
use svg::node::element::path::Data;
use svg::node::element::{Circle as SvgCircle, Group, Path as SvgPath};
use svg::Document;

/// 边距占图纸尺寸的比例
const MARGIN_RATIO: f64 = 0.05;

/// 线宽占图纸尺寸的比例
const STROKE_RATIO: f64 = 0.002;

/// 导出到SVG文件
pub fn export(drawing: &LayeredDrawing, path: &Path) -> Result<(), FileError> {
    svg::save(path, &to_svg(drawing))?;

    tracing::info!(
        path = %path.display(),
        layers = drawing.layer_count(),
        entities = drawing.entity_count(),
        "wrote SVG"
    );

    Ok(())
}

/// 生成 SVG 文档
pub fn to_svg(drawing: &LayeredDrawing) -> Document {
    let bbox = drawing.bounding_box();
    let (bounds, size) = view_box(&bbox);
    let stroke_width = size * STROKE_RATIO;

    let mut document = Document::new().set("viewBox", bounds);
    for group in drawing.layers() {
        let mut node = Group::new()
            .set("id", group.layer.name.as_str())
            .set("fill", "none")
            .set("stroke", group.layer.color.to_hex())
            .set("stroke-width", stroke_width);
        for geometry in &group.entities {
            node = match geometry {
                Geometry::Circle(circle) => node.add(circle_element(circle)),
                Geometry::Polyline(polyline) => {
                    node.add(SvgPath::new().set("d", polyline_data(polyline)))
                }
                Geometry::Spline(spline) => {
                    node.add(SvgPath::new().set("d", spline_data(spline)))
                }
            };
        }
        document = document.add(node);
    }
    document
}

/// `min-x min-y width height`（已翻转 y），以及较大边长
fn view_box(bbox: &BoundingBox2) -> (String, f64) {
    if bbox.is_empty() {
        return ("0 0 1 1".to_string(), 1.0);
    }
    let size = bbox.width().max(bbox.height()).max(f64::EPSILON);
    let margin = size * MARGIN_RATIO;
    let view_box = format!(
        "{} {} {} {}",
        bbox.min.x - margin,
        -bbox.max.y - margin,
        bbox.width() + 2.0 * margin,
        bbox.height() + 2.0 * margin
    );
    (view_box, size)
}

/// 翻转 y 后的坐标（svg 内部以 f32 存储）
fn flip(p: &Point2) -> (f32, f32) {
    (p.x as f32, -p.y as f32)
}

fn circle_element(circle: &Circle) -> SvgCircle {
    let (cx, cy) = flip(&circle.center);
    SvgCircle::new()
        .set("cx", cx)
        .set("cy", cy)
        .set("r", circle.radius as f32)
}

fn polyline_data(polyline: &Polyline) -> Data {
    let mut points = polyline.points.iter();
    let mut data = match points.next() {
        Some(first) => Data::new().move_to(flip(first)),
        None => return Data::new(),
    };
    for p in points {
        data = data.line_to(flip(p));
    }
    if polyline.closed {
        data = data.close();
    }
    data
}

fn spline_data(spline: &CubicSpline) -> Data {
    let mut data = match spline.control_points.first() {
        Some(first) => Data::new().move_to(flip(first)),
        None => return Data::new(),
    };
    for seg in spline.segments() {
        let (x1, y1) = flip(&seg[1]);
        let (x2, y2) = flip(&seg[2]);
        let (x, y) = flip(&seg[3]);
        data = data.cubic_curve_to((x1, y1, x2, y2, x, y));
    }
    if spline.closed {
        data = data.close();
    }
    data
}
