//! DXF文件导入/导出
//!
//! 每个图层写入 LAYER 表，图元写在各自图层上：
//! 圆为 CIRCLE，多段线为 LWPOLYLINE，样条为三次 SPLINE。

use crate::error::FileError;
use cyclo_core::drawing::LayeredDrawing;
use cyclo_core::geometry::{Circle, CubicSpline, Geometry, Polyline};
use cyclo_core::layer::{Color, Layer};
use cyclo_core::math::{Point2, EPSILON};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// 样条阶数
const SPLINE_DEGREE: i32 = 3;

/// 从DXF文件导入
pub fn import(path: &Path) -> Result<LayeredDrawing, FileError> {
    let drawing = dxf::Drawing::load_file(path).map_err(|e| FileError::Dxf(e.to_string()))?;
    let result = from_dxf(&drawing);

    tracing::info!(
        path = %path.display(),
        layers = result.layer_count(),
        entities = result.entity_count(),
        "imported DXF"
    );

    Ok(result)
}

/// 将DXF图纸转换为分层图纸（只保留含图元的图层）
pub fn from_dxf(drawing: &dxf::Drawing) -> LayeredDrawing {
    let colors: HashMap<&str, Color> = drawing
        .layers()
        .map(|layer| {
            let color = aci_to_color(layer.color.index().unwrap_or(7) as u8);
            (layer.name.as_str(), color)
        })
        .collect();

    let mut declared = BTreeSet::new();
    let mut builder = LayeredDrawing::builder();

    for entity in drawing.entities() {
        let Some(geometry) = convert_dxf_entity(entity) else {
            continue;
        };
        let name = entity.common.layer.as_str();
        if declared.insert(name.to_string()) {
            let mut layer = Layer::new(name);
            if let Some(color) = colors.get(name) {
                layer = layer.with_color(*color);
            }
            builder = builder.layer(layer);
        }
        builder = builder.add(name, geometry);
    }

    builder.build()
}

/// 将DXF实体转换为几何图元
fn convert_dxf_entity(entity: &dxf::entities::Entity) -> Option<Geometry> {
    let geometry = match &entity.specific {
        dxf::entities::EntityType::Circle(circle) => {
            let center = Point2::new(circle.center.x, circle.center.y);
            Geometry::Circle(Circle::new(center, circle.radius))
        }

        dxf::entities::EntityType::LwPolyline(lwpoly) => {
            let points = lwpoly.vertices.iter().map(|v| Point2::new(v.x, v.y));
            Geometry::Polyline(Polyline::from_points(points, lwpoly.is_closed()))
        }

        dxf::entities::EntityType::Polyline(poly) => {
            let points = poly
                .vertices()
                .map(|v| Point2::new(v.location.x, v.location.y));
            Geometry::Polyline(Polyline::from_points(points, poly.is_closed()))
        }

        dxf::entities::EntityType::Spline(spline) => {
            // 只接受分段贝塞尔形式的三次样条
            let n = spline.control_points.len();
            if spline.degree_of_curve != SPLINE_DEGREE || n < 4 || (n - 1) % 3 != 0 {
                tracing::warn!(
                    degree = spline.degree_of_curve,
                    control_points = n,
                    "skipping spline that is not a cubic bezier chain"
                );
                return None;
            }
            let points: Vec<Point2> = spline
                .control_points
                .iter()
                .map(|p| Point2::new(p.x, p.y))
                .collect();
            let closed = (points[n - 1] - points[0]).norm() <= EPSILON;
            Geometry::Spline(CubicSpline::new(points, closed))
        }

        _ => return None,
    };

    Some(geometry)
}

/// 导出到DXF文件
pub fn export(drawing: &LayeredDrawing, path: &Path) -> Result<(), FileError> {
    to_dxf(drawing)
        .save_file(path)
        .map_err(|e| FileError::Dxf(e.to_string()))?;

    tracing::info!(
        path = %path.display(),
        layers = drawing.layer_count(),
        entities = drawing.entity_count(),
        "wrote DXF"
    );

    Ok(())
}

/// 将分层图纸转换为DXF图纸
pub fn to_dxf(drawing: &LayeredDrawing) -> dxf::Drawing {
    let mut dxf_drawing = dxf::Drawing::new();
    // R12 不支持 LWPOLYLINE 和 SPLINE
    dxf_drawing.header.version = dxf::enums::AcadVersion::R2000;

    for group in drawing.layers() {
        let mut dxf_layer = dxf::tables::Layer::default();
        dxf_layer.name = group.layer.name.clone();
        dxf_layer.color = dxf::Color::from_index(color_to_aci(&group.layer.color));
        dxf_drawing.add_layer(dxf_layer);
    }

    for (layer, geometry) in drawing.iter() {
        let mut dxf_entity = dxf::entities::Entity::new(convert_to_dxf_entity(geometry));
        dxf_entity.common.layer = layer.to_string();
        dxf_drawing.add_entity(dxf_entity);
    }

    dxf_drawing
}

fn convert_to_dxf_entity(geometry: &Geometry) -> dxf::entities::EntityType {
    match geometry {
        Geometry::Circle(circle) => {
            let mut dxf_circle = dxf::entities::Circle::default();
            dxf_circle.center = dxf::Point::new(circle.center.x, circle.center.y, 0.0);
            dxf_circle.radius = circle.radius;
            dxf::entities::EntityType::Circle(dxf_circle)
        }

        Geometry::Polyline(polyline) => {
            let mut lwpoly = dxf::entities::LwPolyline::default();
            lwpoly.set_is_closed(polyline.closed);
            lwpoly.vertices = polyline
                .points
                .iter()
                .map(|p| {
                    let mut vertex = dxf::LwPolylineVertex::default();
                    vertex.x = p.x;
                    vertex.y = p.y;
                    vertex
                })
                .collect();
            dxf::entities::EntityType::LwPolyline(lwpoly)
        }

        Geometry::Spline(spline) => {
            let mut dxf_spline = dxf::entities::Spline::default();
            dxf_spline.degree_of_curve = SPLINE_DEGREE;
            dxf_spline.knot_values = spline.knot_vector();
            dxf_spline.control_points = spline
                .control_points
                .iter()
                .map(|p| dxf::Point::new(p.x, p.y, 0.0))
                .collect();
            dxf::entities::EntityType::Spline(dxf_spline)
        }
    }
}

/// AutoCAD颜色索引(ACI)转颜色
fn aci_to_color(aci: u8) -> Color {
    match aci {
        1 => Color::RED,
        2 => Color::YELLOW,
        3 => Color::GREEN,
        4 => Color::CYAN,
        5 => Color::BLUE,
        6 => Color::MAGENTA,
        8 => Color::GRAY,
        _ => Color::WHITE,
    }
}

/// 颜色转AutoCAD颜色索引（非标准色退回白色）
fn color_to_aci(color: &Color) -> u8 {
    match (color.r, color.g, color.b) {
        (255, 0, 0) => 1,
        (255, 255, 0) => 2,
        (0, 255, 0) => 3,
        (0, 255, 255) => 4,
        (0, 0, 255) => 5,
        (255, 0, 255) => 6,
        (128, 128, 128) => 8,
        _ => 7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclo_core::assembly::{assemble, DriveParameters};
    use cyclo_core::layer::{CAM_DISC_A, CAM_DISC_B, PINS};

    #[test]
    fn test_color_aci_mapping() {
        for color in [Color::RED, Color::GREEN, Color::BLUE, Color::CYAN, Color::GRAY] {
            assert_eq!(aci_to_color(color_to_aci(&color)), color);
        }
        assert_eq!(color_to_aci(&Color::rgb(10, 20, 30)), 7);
    }

    #[test]
    fn test_to_dxf_layers_and_entities() {
        let drawing = assemble(&DriveParameters::default()).unwrap().drawing;
        let dxf_drawing = to_dxf(&drawing);

        let names: BTreeSet<&str> = dxf_drawing.layers().map(|l| l.name.as_str()).collect();
        for name in [CAM_DISC_A, CAM_DISC_B, PINS] {
            assert!(names.contains(name));
        }

        let entities: Vec<_> = dxf_drawing.entities().collect();
        assert_eq!(entities.len(), drawing.entity_count());
        let splines = entities
            .iter()
            .filter(|e| matches!(e.specific, dxf::entities::EntityType::Spline(_)))
            .count();
        assert_eq!(splines, 2);
        assert!(entities
            .iter()
            .filter(|e| matches!(e.specific, dxf::entities::EntityType::Circle(_)))
            .all(|e| e.common.layer != "0"));
    }

    #[test]
    fn test_export_import_readback() {
        let drawing = assemble(&DriveParameters::default()).unwrap().drawing;
        let file_path = std::env::temp_dir().join("cyclo_test_drive.dxf");

        export(&drawing, &file_path).expect("Failed to export");
        let loaded = import(&file_path).expect("Failed to import");

        let names: Vec<&str> = loaded.layer_names().collect();
        assert_eq!(names, vec![CAM_DISC_A, CAM_DISC_B, PINS]);
        for name in [CAM_DISC_A, CAM_DISC_B, PINS] {
            assert_eq!(loaded.entities(name).len(), drawing.entities(name).len());
        }
        assert_eq!(loaded.layer(CAM_DISC_A).unwrap().layer.color, Color::RED);

        let original = drawing.entities(CAM_DISC_A)[0].as_spline().unwrap();
        let read = loaded.entities(CAM_DISC_A)[0].as_spline().unwrap();
        assert!(read.closed);
        assert_eq!(read.control_points.len(), original.control_points.len());
        for (p, q) in original.control_points.iter().zip(&read.control_points) {
            assert!((p - q).norm() < 1e-9);
        }

        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_polyline_closed_flag_preserved() {
        let square = Polyline::from_points(
            [
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            true,
        );
        let drawing = LayeredDrawing::builder().add("outline", square.clone()).build();
        let loaded = from_dxf(&to_dxf(&drawing));
        assert_eq!(loaded.entities("outline")[0].as_polyline(), Some(&square));
    }

    #[test]
    fn test_import_missing_file() {
        let path = std::env::temp_dir().join("cyclo_test_does_not_exist.dxf");
        assert!(import(&path).is_err());
    }
}
