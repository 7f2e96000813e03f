use std::sync::Arc;

use glam::DVec3;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::math::AABB;
use crate::scene::SceneElement;

/// Space element with its world-space label anchor
#[derive(Debug, Clone)]
pub struct SpaceRecord {
    /// Local bounding-box midpoint mapped to world space
    pub center: DVec3,
    pub element: Arc<SceneElement>,
    /// Shared with every label produced for this space
    name: Arc<str>,
}

impl SpaceRecord {
    pub fn new(center: DVec3, element: Arc<SceneElement>) -> Self {
        let name = Arc::from(element.name.as_str());
        Self {
            center,
            element,
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shared_name(&self) -> &Arc<str> {
        &self.name
    }
}

/// Vertices of an occupancy boundary element, in buffer order and world space
#[derive(Debug, Clone)]
pub struct BoundaryCurve {
    pub element: Arc<SceneElement>,
    pub vertices: Vec<DVec3>,
}

impl BoundaryCurve {
    pub fn from_element(element: Arc<SceneElement>) -> Self {
        let vertices = element.world_positions().collect();
        Self { element, vertices }
    }

    pub fn name(&self) -> &str {
        &self.element.name
    }

    /// Bounds of the finite vertices; a boundary without any has no geometry
    pub fn bounds(&self) -> Result<AABB> {
        AABB::from_points(&self.vertices).ok_or_else(|| Error::EmptyGeometry {
            element: self.element.name.clone(),
        })
    }
}

/// Label position in pixels from the viewport's top-left corner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenLabel {
    #[serde(rename = "spaceName")]
    pub space_name: Arc<str>,
    pub x: f64,
    pub y: f64,
}
