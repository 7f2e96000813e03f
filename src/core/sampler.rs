//! Rejection sampling of points inside a closed solid.
//!
//! Candidates are drawn uniformly in the solid's bounding box and kept only
//! when a ray cast from them crosses the surface an odd number of times.

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::mesh::Solid;
use crate::core::triangle_intersection::{watertight_crossing, Crossing};
use crate::error::{Error, Result};
use crate::math::{parity_directions, Ray};

/// Limits on the rejection loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Slack applied to the expected number of draws (`count × box / solid volume`)
    pub attempt_multiplier: f64,
    /// Draws always allowed on top of the expected number
    pub min_attempts: usize,
    /// Hard ceiling on draws for a single request
    pub max_attempts: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            attempt_multiplier: 4.0,
            min_attempts: 1_000,
            max_attempts: 5_000_000,
        }
    }
}

/// Accepted interior points of one sampling request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampledPoints {
    pub points: Vec<DVec3>,
    /// Total candidates drawn, accepted or not
    pub attempts: usize,
}

impl SampledPoints {
    pub fn acceptance_ratio(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.points.len() as f64 / self.attempts as f64
    }
}

/// Number of crossings of `ray` with the surface, or `None` if any triangle
/// produced a tie.
fn count_crossings<S: Solid + ?Sized>(solid: &S, ray: &Ray) -> Option<usize> {
    let mut crossings = 0;
    for i in 0..solid.triangle_count() {
        let [a, b, c] = solid.triangle(i);
        match watertight_crossing(ray, a, b, c) {
            Crossing::Hit(_) => crossings += 1,
            Crossing::Miss => {}
            Crossing::Tie => return None,
        }
    }
    Some(crossings)
}

/// Parity test: odd number of crossings means `point` is inside.
///
/// Points outside the bounding box are outside without casting. When every
/// parity direction ties (e.g. the point lies on the surface) the point is
/// treated as outside.
pub fn contains_point<S: Solid + ?Sized>(solid: &S, point: DVec3) -> bool {
    if !point.is_finite() || !solid.bounds().contains(point) {
        return false;
    }

    for dir in parity_directions() {
        let ray = Ray::new(point, dir);
        match count_crossings(solid, &ray) {
            Some(n) => return n % 2 == 1,
            None => log::trace!("Parity cast from {:?} along {:?} tied, re-casting", point, dir),
        }
    }

    false
}

/// Maximum number of draws allowed for `count` accepted points
pub fn attempt_cap<S: Solid + ?Sized>(solid: &S, count: usize, config: &SamplerConfig) -> usize {
    let box_volume = solid.bounds().volume();
    let cap = match solid.volume() {
        Some(volume) if volume > 0.0 && box_volume > 0.0 => {
            let expected = count as f64 * (box_volume / volume);
            let slack = (expected * config.attempt_multiplier).ceil();
            if slack.is_finite() && slack < usize::MAX as f64 {
                (slack as usize).saturating_add(config.min_attempts)
            } else {
                config.max_attempts
            }
        }
        Some(_) => config.min_attempts,
        None => config.max_attempts,
    };
    cap.min(config.max_attempts)
}

/// Draws exactly `count` points strictly inside `solid`.
///
/// Deterministic for a given `(solid, count, seed, config)`. Fails with
/// [`Error::SamplingExhausted`] if the attempt cap is reached first; no
/// partial result is returned.
pub fn sample_interior_points<S: Solid + ?Sized>(
    solid: &S,
    count: usize,
    seed: u64,
    config: &SamplerConfig,
) -> Result<SampledPoints> {
    if count == 0 {
        return Ok(SampledPoints {
            points: Vec::new(),
            attempts: 0,
        });
    }

    let bounds = solid.bounds();
    let cap = attempt_cap(solid, count, config);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(count);
    let mut attempts = 0;

    while points.len() < count {
        if attempts >= cap {
            log::warn!(
                "Sampling exhausted: {} of {} points after {} draws",
                points.len(),
                count,
                attempts
            );
            return Err(Error::SamplingExhausted {
                requested: count,
                accepted: points.len(),
                attempts,
            });
        }
        attempts += 1;

        let candidate = DVec3::new(
            rng.gen_range(bounds.min.x..=bounds.max.x),
            rng.gen_range(bounds.min.y..=bounds.max.y),
            rng.gen_range(bounds.min.z..=bounds.max.z),
        );
        if contains_point(solid, candidate) {
            points.push(candidate);
        }
    }

    log::debug!(
        "Sampled {} interior points in {} draws (cap {})",
        count,
        attempts,
        cap
    );

    Ok(SampledPoints { points, attempts })
}
