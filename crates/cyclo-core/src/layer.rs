//! 图层与颜色
//!
//! 图层按名称区分物理上不同的零件（两片摆线轮、针齿），导出时
//! 每个图层对应 DXF 的 LAYER 表项或 SVG 的一个分组。

use serde::{Deserialize, Serialize};

/// 第一片摆线轮（含其轴承孔）
pub const CAM_DISC_A: &str = "cam_disc_A";
/// 第二片摆线轮（含其轴承孔）
pub const CAM_DISC_B: &str = "cam_disc_B";
/// 固定针齿
pub const PINS: &str = "pins";
/// 单独导出齿廓时使用的图层
pub const PROFILE: &str = "profile";

/// RGB 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` 形式
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// 图层
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub color: Color,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let color = default_color(&name);
        Self { name, color }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// 已知图层的默认颜色，其他图层为白色
pub fn default_color(name: &str) -> Color {
    match name {
        CAM_DISC_A => Color::RED,
        CAM_DISC_B => Color::BLUE,
        PINS => Color::GREEN,
        PROFILE => Color::CYAN,
        _ => Color::WHITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_layer_colors() {
        assert_eq!(Layer::new(CAM_DISC_A).color, Color::RED);
        assert_eq!(Layer::new(PINS).color, Color::GREEN);
        assert_eq!(Layer::new("custom").color, Color::WHITE);
        assert_eq!(Layer::new("custom").with_color(Color::GRAY).color, Color::GRAY);
    }

    #[test]
    fn test_hex() {
        assert_eq!(Color::MAGENTA.to_hex(), "#ff00ff");
        assert_eq!(Color::GRAY.to_hex(), "#808080");
    }
}
