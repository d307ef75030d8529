//! Cyclo 文件导出
//!
//! 支持：
//! - `.dxf` 导出（LAYER 表 + CIRCLE/LWPOLYLINE/SPLINE）及回读
//! - `.svg` 预览
//! - `.json` 完整图纸数据

pub mod dxf_io;
pub mod error;
pub mod export;
pub mod json_io;
pub mod svg_io;

pub use error::FileError;
pub use export::{export_drawing, ExportFormat};
