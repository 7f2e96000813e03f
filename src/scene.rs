use std::sync::Arc;

use glam::{DMat4, DVec3};
use serde::Deserialize;

use crate::math::AABB;

/// Position buffer of a scene element, in local coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<DVec3>,
    /// Triangle indices into `positions`; `None` for triangle lists and curves
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    pub fn triangles(positions: Vec<DVec3>, indices: Option<Vec<u32>>) -> Self {
        Self { positions, indices }
    }

    /// Polyline or point set with no faces
    pub fn curve(positions: Vec<DVec3>) -> Self {
        Self {
            positions,
            indices: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn local_bounds(&self) -> Option<AABB> {
        AABB::from_points(&self.positions)
    }
}

/// Mesh or curve node supplied by the loaded model
#[derive(Debug, Clone, PartialEq)]
pub struct SceneElement {
    pub name: String,
    pub geometry: Geometry,
    pub world_transform: DMat4,
    pub layer_index: Option<i64>,
}

impl SceneElement {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            geometry,
            world_transform: DMat4::IDENTITY,
            layer_index: None,
        }
    }

    pub fn with_transform(mut self, world_transform: DMat4) -> Self {
        self.world_transform = world_transform;
        self
    }

    pub fn with_layer(mut self, layer_index: i64) -> Self {
        self.layer_index = Some(layer_index);
        self
    }

    pub fn local_to_world(&self, p: DVec3) -> DVec3 {
        self.world_transform.transform_point3(p)
    }

    /// Positions in buffer order, mapped to world space
    pub fn world_positions(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.geometry
            .positions
            .iter()
            .map(move |&p| self.local_to_world(p))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Layer {
    pub name: String,
}

/// Layer names of the model, indexed by an element's `layer_index`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct LayerTable {
    layers: Vec<Layer>,
}

impl LayerTable {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            layers: names
                .into_iter()
                .map(|name| Layer { name: name.into() })
                .collect(),
        }
    }

    /// Layer name for `index`, or `None` for missing, negative or out-of-range indices
    pub fn resolve(&self, index: Option<i64>) -> Option<&str> {
        let index = usize::try_from(index?).ok()?;
        self.layers.get(index).map(|layer| layer.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub element: Arc<SceneElement>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(element: SceneElement) -> Self {
        Self {
            element: Arc::new(element),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<SceneNode>) -> Self {
        self.children = children;
        self
    }
}

/// Loaded model: layer table plus element hierarchy
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    pub layers: LayerTable,
    pub roots: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new(layers: LayerTable, roots: Vec<SceneNode>) -> Self {
        Self { layers, roots }
    }

    /// All elements in document order (depth-first, parents before children)
    pub fn elements(&self) -> Elements<'_> {
        Elements {
            stack: self.roots.iter().rev().collect(),
        }
    }

    pub fn element_count(&self) -> usize {
        self.elements().count()
    }
}

pub struct Elements<'a> {
    stack: Vec<&'a SceneNode>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a Arc<SceneElement>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(&node.element)
    }
}
