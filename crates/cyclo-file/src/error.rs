//! 文件操作错误定义

use cyclo_core::error::GeometryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DXF error: {0}")]
    Dxf(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}
