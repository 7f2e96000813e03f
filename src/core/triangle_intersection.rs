use glam::DVec3;

use crate::math::Ray;

/// Hits closer than this fraction of the vertex distances count as starting
/// on the triangle
const T_EPSILON: f64 = 1e-10;

/// Outcome of casting a ray against a single triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crossing {
    Miss,
    /// Ray crosses the triangle interior at distance `t > 0`
    Hit(f64),
    /// Ray touches an edge or vertex, grazes the triangle plane, or starts on
    /// the triangle. Parity counting can't use this cast.
    Tie,
}

/// Watertight ray-triangle intersection (Woop et al. 2013), two-sided.
///
/// Edge functions are evaluated so that a ray through an edge shared by two
/// triangles produces exactly zero for both, which is reported as
/// [`Crossing::Tie`] instead of a double or missing hit.
pub fn watertight_crossing(ray: &Ray, v0: DVec3, v1: DVec3, v2: DVec3) -> Crossing {
    // Translate vertices based on ray origin
    let a = v0 - ray.origin;
    let b = v1 - ray.origin;
    let c = v2 - ray.origin;

    // Dominant axis of the ray direction becomes z
    let abs_dir = ray.dir.abs();
    let kz = if abs_dir.x > abs_dir.y && abs_dir.x > abs_dir.z {
        0
    } else if abs_dir.y > abs_dir.z {
        1
    } else {
        2
    };
    let mut kx = (kz + 1) % 3;
    let mut ky = (kx + 1) % 3;
    if ray.dir[kz] < 0.0 {
        std::mem::swap(&mut kx, &mut ky);
    }

    let d = DVec3::new(ray.dir[kx], ray.dir[ky], ray.dir[kz]);

    // Shear constants
    let sx = d.x / d.z;
    let sy = d.y / d.z;
    let sz = 1.0 / d.z;

    let ax = a[kx] - sx * a[kz];
    let ay = a[ky] - sy * a[kz];
    let bx = b[kx] - sx * b[kz];
    let by = b[ky] - sy * b[kz];
    let cx = c[kx] - sx * c[kz];
    let cy = c[ky] - sy * c[kz];

    // Scaled barycentric coordinates
    let u = cx * by - cy * bx;
    let v = ax * cy - ay * cx;
    let w = bx * ay - by * ax;

    if (u < 0.0 || v < 0.0 || w < 0.0) && (u > 0.0 || v > 0.0 || w > 0.0) {
        return Crossing::Miss;
    }

    let det = u + v + w;
    if det == 0.0 {
        // Ray lies in the triangle plane, or the triangle has no area
        let area = (v1 - v0).cross(v2 - v0).length_squared();
        return if area == 0.0 { Crossing::Miss } else { Crossing::Tie };
    }

    let az = sz * a[kz];
    let bz = sz * b[kz];
    let cz = sz * c[kz];
    let t = (u * az + v * bz + w * cz) / det;
    let t_tolerance = T_EPSILON * az.abs().max(bz.abs()).max(cz.abs());

    if t < -t_tolerance {
        return Crossing::Miss;
    }
    if t <= t_tolerance || u == 0.0 || v == 0.0 || w == 0.0 {
        return Crossing::Tie;
    }

    Crossing::Hit(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_triangle() -> (DVec3, DVec3, DVec3) {
        (
            DVec3::new(-1.0, 0.0, -5.0),
            DVec3::new(1.0, 0.0, -5.0),
            DVec3::new(0.0, 1.0, -5.0),
        )
    }

    #[test]
    fn test_watertight_hit() {
        let (v0, v1, v2) = create_test_triangle();
        let ray = Ray::new(DVec3::new(0.0, 0.25, 0.0), DVec3::new(0.0, 0.0, -1.0));

        match watertight_crossing(&ray, v0, v1, v2) {
            Crossing::Hit(t) => assert!((t - 5.0).abs() < 1e-9),
            other => panic!("expected hit, got {:?}", other),
        }
    }

    #[test]
    fn test_watertight_is_two_sided() {
        let (v0, v1, v2) = create_test_triangle();
        let ray = Ray::new(DVec3::new(0.0, 0.25, 0.0), DVec3::new(0.0, 0.0, -1.0));

        let front = watertight_crossing(&ray, v0, v1, v2);
        let back = watertight_crossing(&ray, v0, v2, v1);
        assert!(matches!(front, Crossing::Hit(_)));
        assert_eq!(front, back);
    }

    #[test]
    fn test_watertight_miss() {
        let (v0, v1, v2) = create_test_triangle();
        let ray = Ray::new(DVec3::ZERO, DVec3::new(5.0, 0.0, -1.0));
        assert_eq!(watertight_crossing(&ray, v0, v1, v2), Crossing::Miss);
    }

    #[test]
    fn test_behind_ray() {
        let (v0, v1, v2) = create_test_triangle();
        let ray = Ray::new(DVec3::new(0.0, 0.25, 0.0), DVec3::new(0.0, 0.0, 1.0));
        assert_eq!(watertight_crossing(&ray, v0, v1, v2), Crossing::Miss);
    }

    #[test]
    fn test_shared_edge_reports_tie_on_both_triangles() {
        // Two triangles of a quad sharing the diagonal x == y
        let p00 = DVec3::new(0.0, 0.0, -2.0);
        let p10 = DVec3::new(1.0, 0.0, -2.0);
        let p11 = DVec3::new(1.0, 1.0, -2.0);
        let p01 = DVec3::new(0.0, 1.0, -2.0);
        let ray = Ray::new(DVec3::new(0.5, 0.5, 0.0), DVec3::new(0.0, 0.0, -1.0));

        assert_eq!(watertight_crossing(&ray, p00, p10, p11), Crossing::Tie);
        assert_eq!(watertight_crossing(&ray, p00, p11, p01), Crossing::Tie);
    }

    #[test]
    fn test_parallel_ray_in_plane_is_tie() {
        let (v0, v1, v2) = create_test_triangle();
        let ray = Ray::new(DVec3::new(-3.0, 0.25, -5.0), DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(watertight_crossing(&ray, v0, v1, v2), Crossing::Tie);
    }

    #[test]
    fn test_parallel_ray_off_plane_misses() {
        let (v0, v1, v2) = create_test_triangle();
        let ray = Ray::new(DVec3::new(0.0, 0.0, -4.0), DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(watertight_crossing(&ray, v0, v1, v2), Crossing::Miss);
    }

    #[test]
    fn test_degenerate_triangle_misses() {
        let v = DVec3::new(0.0, 0.0, -5.0);
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        assert_eq!(watertight_crossing(&ray, v, v, v), Crossing::Miss);
    }

    #[test]
    fn test_origin_on_triangle_is_tie() {
        let (v0, v1, v2) = create_test_triangle();
        let ray = Ray::new(DVec3::new(0.0, 0.25, -5.0), DVec3::ONE);
        assert_eq!(watertight_crossing(&ray, v0, v1, v2), Crossing::Tie);
    }
}
