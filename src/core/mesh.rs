use glam::DVec3;

use crate::error::{Error, Result};
use crate::math::AABB;
use crate::scene::SceneElement;

/// Closed triangulated surface that interior sampling can run against.
pub trait Solid {
    fn bounds(&self) -> AABB;

    fn triangle_count(&self) -> usize;

    fn triangle(&self, index: usize) -> [DVec3; 3];

    /// Enclosed volume, when it is known to be meaningful
    fn volume(&self) -> Option<f64> {
        None
    }
}

/// Indexed triangle mesh in world space
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    vertices: Vec<DVec3>,
    triangles: Vec<[u32; 3]>,
    bounds: AABB,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<DVec3>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        if triangles.is_empty() {
            return Err(Error::DegenerateGeometry("mesh has no triangles".into()));
        }
        if let Some(bad) = triangles
            .iter()
            .flatten()
            .find(|&&i| i as usize >= vertices.len())
        {
            return Err(Error::DegenerateGeometry(format!(
                "triangle index {} out of range for {} vertices",
                bad,
                vertices.len()
            )));
        }
        let bounds = AABB::from_points(&vertices)
            .ok_or_else(|| Error::DegenerateGeometry("mesh has no finite vertices".into()))?;

        Ok(Self {
            vertices,
            triangles,
            bounds,
        })
    }

    /// World-space mesh of a scene element. Uses the index buffer when
    /// present, otherwise treats positions as a triangle list.
    pub fn from_element(element: &SceneElement) -> Result<Self> {
        let vertices: Vec<DVec3> = element.world_positions().collect();
        if vertices.is_empty() {
            return Err(Error::EmptyGeometry {
                element: element.name.clone(),
            });
        }

        let triangles: Vec<[u32; 3]> = match &element.geometry.indices {
            Some(indices) => indices
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect(),
            None => (0..vertices.len() as u32 / 3)
                .map(|i| [i * 3, i * 3 + 1, i * 3 + 2])
                .collect(),
        };

        Self::new(vertices, triangles)
    }

    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Absolute signed volume via the divergence theorem. Only meaningful
    /// for closed, consistently wound meshes.
    pub fn enclosed_volume(&self) -> f64 {
        let signed: f64 = self
            .triangles
            .iter()
            .map(|t| {
                let a = self.vertices[t[0] as usize];
                let b = self.vertices[t[1] as usize];
                let c = self.vertices[t[2] as usize];
                a.dot(b.cross(c))
            })
            .sum();
        (signed / 6.0).abs()
    }
}

impl Solid for TriangleMesh {
    fn bounds(&self) -> AABB {
        self.bounds
    }

    fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn triangle(&self, index: usize) -> [DVec3; 3] {
        let t = self.triangles[index];
        [
            self.vertices[t[0] as usize],
            self.vertices[t[1] as usize],
            self.vertices[t[2] as usize],
        ]
    }
}

/// Axis-aligned box as a closed mesh of 12 outward-wound triangles.
pub fn box_mesh(min: DVec3, max: DVec3) -> TriangleMesh {
    let vertices = vec![
        DVec3::new(min.x, min.y, min.z),
        DVec3::new(max.x, min.y, min.z),
        DVec3::new(max.x, max.y, min.z),
        DVec3::new(min.x, max.y, min.z),
        DVec3::new(min.x, min.y, max.z),
        DVec3::new(max.x, min.y, max.z),
        DVec3::new(max.x, max.y, max.z),
        DVec3::new(min.x, max.y, max.z),
    ];
    let triangles = vec![
        [0, 2, 1], [0, 3, 2], // bottom
        [4, 5, 6], [4, 6, 7], // top
        [0, 1, 5], [0, 5, 4], // front
        [2, 3, 7], [2, 7, 6], // back
        [1, 2, 6], [1, 6, 5], // right
        [3, 0, 4], [3, 4, 7], // left
    ];
    TriangleMesh {
        bounds: AABB::new(min.min(max), min.max(max)),
        vertices,
        triangles,
    }
}
