pub mod hull;
pub mod mesh;
pub mod sampler;
pub mod task;
pub mod triangle_intersection;

pub use hull::ConvexHull;
pub use mesh::{box_mesh, Solid, TriangleMesh};
pub use sampler::{attempt_cap, contains_point, sample_interior_points, SampledPoints, SamplerConfig};
pub use task::{spawn_sampling, SamplingTask};
