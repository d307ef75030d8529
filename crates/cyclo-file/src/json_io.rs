//! JSON 格式
//!
//! 直接序列化 `LayeredDrawing`，便于其他工具读取完整的图元数据。

use crate::error::FileError;
use cyclo_core::drawing::LayeredDrawing;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// 导出到JSON文件
pub fn export(drawing: &LayeredDrawing, path: &Path) -> Result<(), FileError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, drawing)?;
    writer.flush()?;

    tracing::info!(
        path = %path.display(),
        layers = drawing.layer_count(),
        entities = drawing.entity_count(),
        "wrote JSON"
    );

    Ok(())
}

/// 从JSON文件导入
pub fn import(path: &Path) -> Result<LayeredDrawing, FileError> {
    let file = File::open(path)?;
    let drawing = serde_json::from_reader(BufReader::new(file))?;
    Ok(drawing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclo_core::assembly::{assemble, DriveParameters};

    #[test]
    fn test_save_load() {
        let drawing = assemble(&DriveParameters::default()).unwrap().drawing;
        let file_path = std::env::temp_dir().join("cyclo_test_drive.json");

        export(&drawing, &file_path).expect("Failed to export");
        let loaded = import(&file_path).expect("Failed to import");
        assert_eq!(
            loaded.layer_names().collect::<Vec<_>>(),
            drawing.layer_names().collect::<Vec<_>>()
        );
        assert_eq!(loaded.entity_count(), drawing.entity_count());
        for ((_, a), (_, b)) in loaded.iter().zip(drawing.iter()) {
            assert_eq!(a.type_name(), b.type_name());
            let (ba, bb) = (a.bounding_box(), b.bounding_box());
            assert!((ba.min - bb.min).norm() < 1e-12);
            assert!((ba.max - bb.max).norm() < 1e-12);
        }

        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_invalid_json() {
        let file_path = std::env::temp_dir().join("cyclo_test_invalid.json");
        std::fs::write(&file_path, b"{ not json").expect("Failed to write");

        assert!(matches!(import(&file_path), Err(FileError::Json(_))));

        std::fs::remove_file(&file_path).ok();
    }
}
