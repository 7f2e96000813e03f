//! Convex hull construction for occupancy boundaries.
//!
//! Boundary curves arrive as loose vertex lists (possibly unordered and
//! non-planar). The hull is built with an initial tetrahedron from extreme
//! points followed by beneath-beyond insertion: each point outside the
//! current hull removes the faces it can see and is stitched to the horizon.

use std::collections::HashSet;

use glam::DVec3;

use crate::core::mesh::{Solid, TriangleMesh};
use crate::error::{Error, Result};
use crate::math::AABB;

/// Relative tolerance, scaled by the input's bounding-box diagonal
const HULL_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Face {
    v: [usize; 3],
    normal: DVec3,
    offset: f64,
}

impl Face {
    /// Face through `a`, `b`, `c` wound so its normal points away from `interior`
    fn oriented(points: &[DVec3], a: usize, b: usize, c: usize, interior: DVec3) -> Self {
        let normal = (points[b] - points[a])
            .cross(points[c] - points[a])
            .normalize_or_zero();
        let face = Face {
            v: [a, b, c],
            normal,
            offset: normal.dot(points[a]),
        };
        if face.distance(interior) > 0.0 {
            Face {
                v: [a, c, b],
                normal: -normal,
                offset: -face.offset,
            }
        } else {
            face
        }
    }

    fn distance(&self, p: DVec3) -> f64 {
        self.normal.dot(p) - self.offset
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.v;
        [(a, b), (b, c), (c, a)]
    }
}

/// Closed convex solid built from a boundary's vertices
#[derive(Debug, Clone)]
pub struct ConvexHull {
    mesh: TriangleMesh,
    volume: f64,
}

impl ConvexHull {
    /// Builds the hull of `points`. Non-finite points are ignored.
    ///
    /// Fails with [`Error::DegenerateGeometry`] for fewer than four points or
    /// when all points are coincident, collinear or coplanar.
    pub fn build(points: &[DVec3]) -> Result<Self> {
        let points: Vec<DVec3> = points.iter().copied().filter(|p| p.is_finite()).collect();
        if points.len() < 4 {
            return Err(Error::DegenerateGeometry(format!(
                "convex hull needs at least 4 points, got {}",
                points.len()
            )));
        }

        let input_bounds = AABB::from_points(&points)
            .ok_or_else(|| Error::DegenerateGeometry("no finite points".into()))?;
        let eps = input_bounds.diagonal() * HULL_EPSILON;
        if eps == 0.0 {
            return Err(Error::DegenerateGeometry("all points coincide".into()));
        }

        let simplex = initial_simplex(&points, eps)?;
        let interior = simplex.iter().map(|&i| points[i]).sum::<DVec3>() / 4.0;

        let [a, b, c, d] = simplex;
        let mut faces = vec![
            Face::oriented(&points, a, b, c, interior),
            Face::oriented(&points, a, b, d, interior),
            Face::oriented(&points, a, c, d, interior),
            Face::oriented(&points, b, c, d, interior),
        ];

        for (i, &p) in points.iter().enumerate() {
            if simplex.contains(&i) {
                continue;
            }

            let visible: Vec<usize> = (0..faces.len())
                .filter(|&f| faces[f].distance(p) > eps)
                .collect();
            if visible.is_empty() {
                continue;
            }

            let visible_edges: HashSet<(usize, usize)> = visible
                .iter()
                .flat_map(|&f| faces[f].edges())
                .collect();
            // Directed edges whose twin belongs to a hidden face form the horizon
            let horizon: Vec<(usize, usize)> = visible
                .iter()
                .flat_map(|&f| faces[f].edges())
                .filter(|&(u, v)| !visible_edges.contains(&(v, u)))
                .collect();

            let mut index = 0;
            faces.retain(|_| {
                let keep = !visible.contains(&index);
                index += 1;
                keep
            });
            faces.extend(
                horizon
                    .into_iter()
                    .map(|(u, v)| Face::oriented(&points, u, v, i, interior)),
            );
        }

        // Compact to the vertices actually on the hull
        let mut remap = vec![u32::MAX; points.len()];
        let mut vertices = Vec::new();
        let triangles: Vec<[u32; 3]> = faces
            .iter()
            .map(|face| {
                face.v.map(|vi| {
                    if remap[vi] == u32::MAX {
                        remap[vi] = vertices.len() as u32;
                        vertices.push(points[vi]);
                    }
                    remap[vi]
                })
            })
            .collect();

        let mesh = TriangleMesh::new(vertices, triangles)?;
        let volume = mesh.enclosed_volume();
        if volume <= eps * eps * eps {
            return Err(Error::DegenerateGeometry(format!(
                "hull encloses no volume ({:e})",
                volume
            )));
        }

        log::debug!(
            "Built convex hull: {} input points, {} hull vertices, {} triangles, volume {:.4}",
            points.len(),
            mesh.vertices().len(),
            mesh.triangle_count(),
            volume
        );

        Ok(Self { mesh, volume })
    }

    pub fn vertices(&self) -> &[DVec3] {
        self.mesh.vertices()
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        self.mesh.triangles()
    }
}

impl Solid for ConvexHull {
    fn bounds(&self) -> AABB {
        self.mesh.bounds()
    }

    fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    fn triangle(&self, index: usize) -> [DVec3; 3] {
        self.mesh.triangle(index)
    }

    fn volume(&self) -> Option<f64> {
        Some(self.volume)
    }
}

/// Four affinely independent point indices spanning as much volume as the
/// extreme points allow.
fn initial_simplex(points: &[DVec3], eps: f64) -> Result<[usize; 4]> {
    let farthest_by = |score: &dyn Fn(DVec3) -> f64| -> (usize, f64) {
        points
            .iter()
            .enumerate()
            .map(|(i, &p)| (i, score(p)))
            .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best })
    };

    let (i0, _) = farthest_by(&|p: DVec3| -p.x);
    let p0 = points[i0];

    let (i1, dist) = farthest_by(&|p: DVec3| p.distance(p0));
    if dist <= eps {
        return Err(Error::DegenerateGeometry("all points coincide".into()));
    }
    let axis = (points[i1] - p0).normalize();

    let (i2, dist) = farthest_by(&|p: DVec3| (p - p0).cross(axis).length());
    if dist <= eps {
        return Err(Error::DegenerateGeometry("all points are collinear".into()));
    }
    let normal = axis.cross(points[i2] - p0).normalize();

    let (i3, dist) = farthest_by(&|p: DVec3| (p - p0).dot(normal).abs());
    if dist <= eps {
        return Err(Error::DegenerateGeometry("all points are coplanar".into()));
    }

    Ok([i0, i1, i2, i3])
}
