//! 分层图纸
//!
//! `LayeredDrawing` 是装配结果：图层名到图元列表的映射，构建后不可变。
//! 只能通过 `LayeredDrawingBuilder` 累积生成。

use crate::geometry::Geometry;
use crate::layer::Layer;
use crate::math::BoundingBox2;
use crate::transform::Transform2D;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单个图层及其图元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerGroup {
    pub layer: Layer,
    pub entities: Vec<Geometry>,
}

/// 分层图纸（按图层名排序，保证导出结果确定）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayeredDrawing {
    layers: BTreeMap<String, LayerGroup>,
}

impl LayeredDrawing {
    pub fn builder() -> LayeredDrawingBuilder {
        LayeredDrawingBuilder::new()
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn layers(&self) -> impl Iterator<Item = &LayerGroup> {
        self.layers.values()
    }

    pub fn layer(&self, name: &str) -> Option<&LayerGroup> {
        self.layers.get(name)
    }

    /// 指定图层的图元，图层不存在时为空
    pub fn entities(&self, name: &str) -> &[Geometry] {
        self.layers
            .get(name)
            .map(|g| g.entities.as_slice())
            .unwrap_or(&[])
    }

    /// 遍历所有 (图层名, 图元)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Geometry)> {
        self.layers
            .iter()
            .flat_map(|(name, g)| g.entities.iter().map(move |e| (name.as_str(), e)))
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn entity_count(&self) -> usize {
        self.layers.values().map(|g| g.entities.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        self.iter()
            .map(|(_, e)| e.bounding_box())
            .fold(BoundingBox2::empty(), |acc, b| acc.union(&b))
    }
}

/// 图纸构建器
#[derive(Debug, Default)]
pub struct LayeredDrawingBuilder {
    layers: BTreeMap<String, LayerGroup>,
}

impl LayeredDrawingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明图层（可指定颜色）；已存在时更新其属性
    pub fn layer(mut self, layer: Layer) -> Self {
        match self.layers.get_mut(&layer.name) {
            Some(group) => group.layer = layer,
            None => {
                self.layers.insert(
                    layer.name.clone(),
                    LayerGroup {
                        layer,
                        entities: Vec::new(),
                    },
                );
            }
        }
        self
    }

    fn group_mut(&mut self, name: &str) -> &mut LayerGroup {
        self.layers
            .entry(name.to_string())
            .or_insert_with(|| LayerGroup {
                layer: Layer::new(name),
                entities: Vec::new(),
            })
    }

    pub fn add(mut self, layer: &str, geometry: impl Into<Geometry>) -> Self {
        self.group_mut(layer).entities.push(geometry.into());
        self
    }

    pub fn extend<G: Into<Geometry>>(
        mut self,
        layer: &str,
        geometries: impl IntoIterator<Item = G>,
    ) -> Self {
        self.group_mut(layer)
            .entities
            .extend(geometries.into_iter().map(Into::into));
        self
    }

    /// 变换后加入（不修改输入图元）
    pub fn add_transformed(self, layer: &str, geometry: &Geometry, transform: &Transform2D) -> Self {
        self.add(layer, transform.apply_geometry(geometry))
    }

    /// 合并另一张图纸，同名图层的图元追加在后
    pub fn merge(mut self, other: LayeredDrawing) -> Self {
        for (name, group) in other.layers {
            self.group_mut(&name).entities.extend(group.entities);
        }
        self
    }

    pub fn build(self) -> LayeredDrawing {
        LayeredDrawing {
            layers: self.layers,
        }
    }
}
