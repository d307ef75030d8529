//! 按扩展名选择导出格式

use crate::error::FileError;
use crate::{dxf_io, json_io, svg_io};
use cyclo_core::drawing::LayeredDrawing;
use std::path::Path;

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Dxf,
    Svg,
    Json,
}

impl ExportFormat {
    /// 根据扩展名（不区分大小写）确定格式
    pub fn from_path(path: &Path) -> Result<Self, FileError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "dxf" => Ok(Self::Dxf),
            "svg" => Ok(Self::Svg),
            "json" => Ok(Self::Json),
            _ => Err(FileError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Dxf => "dxf",
            Self::Svg => "svg",
            Self::Json => "json",
        }
    }
}

/// 写出图纸，格式由路径扩展名决定
pub fn export_drawing(drawing: &LayeredDrawing, path: &Path) -> Result<ExportFormat, FileError> {
    let format = ExportFormat::from_path(path)?;
    match format {
        ExportFormat::Dxf => dxf_io::export(drawing, path)?,
        ExportFormat::Svg => svg_io::export(drawing, path)?,
        ExportFormat::Json => json_io::export(drawing, path)?,
    }
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclo_core::geometry::Circle;
    use cyclo_core::math::Point2;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("a/b.dxf")).unwrap(), ExportFormat::Dxf);
        assert_eq!(ExportFormat::from_path(Path::new("plot.SVG")).unwrap(), ExportFormat::Svg);
        assert_eq!(ExportFormat::from_path(Path::new("x.json")).unwrap().extension(), "json");
        assert!(matches!(
            ExportFormat::from_path(Path::new("drawing.pdf")),
            Err(FileError::UnsupportedFormat(_))
        ));
        assert!(ExportFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_export_drawing_dispatch() {
        let drawing = LayeredDrawing::builder()
            .add("a", Circle::new(Point2::origin(), 1.0))
            .build();
        let file_path = std::env::temp_dir().join("cyclo_test_dispatch.json");

        let format = export_drawing(&drawing, &file_path).expect("Failed to export");
        assert_eq!(format, ExportFormat::Json);
        assert_eq!(json_io::import(&file_path).unwrap(), drawing);

        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_unsupported_writes_nothing() {
        let drawing = LayeredDrawing::default();
        let file_path = std::env::temp_dir().join("cyclo_test_unsupported.pdf");
        assert!(export_drawing(&drawing, &file_path).is_err());
        assert!(!file_path.exists());
    }
}
