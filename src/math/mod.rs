mod aabb;
mod ray;

pub use aabb::AABB;
pub use ray::{parity_directions, Ray};
