//! 摆线针轮减速器几何内核
//!
//! 根据参数生成摆线轮齿廓、针齿与轴承孔分布，并装配成
//! 双摆线盘（相位差 180°）的分层二维图纸。
//!
//! # 模块划分
//!
//! - `profile`: 摆线轮齿廓方程与采样
//! - `pattern`: 圆形阵列（针齿、轴承孔）
//! - `simplify`: 稠密齿廓的简化与样条拟合
//! - `transform`: 刚体变换（先旋转后平移）
//! - `drawing`: 分层图纸及其构建器
//! - `assembly`: 双摆线盘装配
//!
//! 所有计算都是纯函数，相同输入得到逐位相同的结果。
//!
//! # 示例
//!
//! ```rust
//! use cyclo_core::prelude::*;
//!
//! let assembly = assemble(&DriveParameters::default()).unwrap();
//! assert_eq!(assembly.drawing.entities(PINS).len(), 24);
//! ```

pub mod assembly;
pub mod drawing;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod math;
pub mod pattern;
pub mod profile;
pub mod simplify;
pub mod transform;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::assembly::{assemble, assemble_with, reflection_phase, DriveAssembly, DriveParameters};
    pub use crate::drawing::{LayerGroup, LayeredDrawing, LayeredDrawingBuilder};
    pub use crate::error::GeometryError;
    pub use crate::geometry::{Circle, CubicSpline, Geometry, Line, Polyline};
    pub use crate::layer::{Color, Layer, CAM_DISC_A, CAM_DISC_B, PINS, PROFILE};
    pub use crate::math::{BoundingBox2, Point2, Vector2};
    pub use crate::pattern::CirclePattern;
    pub use crate::profile::{GearParameters, ProfileCurve};
    pub use crate::simplify::{BezierFit, CurveSimplifier, RamerDouglasPeucker};
    pub use crate::transform::Transform2D;
}
