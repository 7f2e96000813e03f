use glam::DVec3;

/// Unnormalised directions used for parity casts. The first is the primary
/// `(1, 1, 1)` direction; the others are only used to re-cast after a tie.
/// None of them lie in an axis plane.
const PARITY_DIRECTIONS: [[f64; 3]; 4] = [
    [1.0, 1.0, 1.0],
    [0.8017, 0.3423, 0.4897],
    [-0.3194, 0.8761, 0.3609],
    [0.4471, -0.5237, 0.7251],
];

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub dir: DVec3,
}

impl Ray {
    pub fn new(origin: DVec3, dir: DVec3) -> Self {
        Self {
            origin,
            dir: dir.normalize(),
        }
    }
}

/// Normalised parity-cast directions, primary direction first.
pub fn parity_directions() -> impl Iterator<Item = DVec3> {
    PARITY_DIRECTIONS
        .iter()
        .map(|d| DVec3::from_array(*d).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_direction_is_normalized() {
        let ray = Ray::new(DVec3::ZERO, DVec3::new(3.0, 0.0, 4.0));
        assert!((ray.dir.length() - 1.0).abs() < 1e-12);
        assert!((ray.dir - DVec3::new(0.6, 0.0, 0.8)).length() < 1e-12);
    }

    #[test]
    fn test_primary_parity_direction() {
        let first = parity_directions().next().unwrap();
        let expected = DVec3::ONE.normalize();
        assert!((first - expected).length() < 1e-12);
    }

    #[test]
    fn test_parity_directions_avoid_axis_planes() {
        for d in parity_directions() {
            assert!((d.length() - 1.0).abs() < 1e-12);
            assert!(d.x.abs() > 0.1 && d.y.abs() > 0.1 && d.z.abs() > 0.1, "{:?}", d);
        }
    }
}
