use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

/// Viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// View and projection transforms for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub view: DMat4,
    pub projection: DMat4,
}

impl CameraState {
    pub fn new(view: DMat4, projection: DMat4) -> Self {
        Self { view, projection }
    }

    /// Right-handed perspective camera with OpenGL clip space
    pub fn perspective(
        eye: DVec3,
        target: DVec3,
        up: DVec3,
        fov_y_degrees: f64,
        aspect: f64,
        near: f64,
        far: f64,
    ) -> Self {
        Self {
            view: DMat4::look_at_rh(eye, target, up),
            projection: DMat4::perspective_rh_gl(fov_y_degrees.to_radians(), aspect, near, far),
        }
    }

    pub fn view_projection(&self) -> DMat4 {
        self.projection * self.view
    }

    /// World point to normalized device coordinates. No clipping: points
    /// behind the camera still produce a value.
    pub fn project(&self, world: DVec3) -> DVec3 {
        self.view_projection().project_point3(world)
    }
}

/// Perspective camera description, Z-up by default
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f64; 3],
    pub target: [f64; 3],
    pub up: [f64; 3],
    pub fov_degrees: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [1.0, -2.0, 100.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 0.0, 1.0],
            fov_degrees: 10.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

impl CameraConfig {
    pub fn to_state(&self, viewport: Viewport) -> CameraState {
        CameraState::perspective(
            DVec3::from_array(self.position),
            DVec3::from_array(self.target),
            DVec3::from_array(self.up),
            self.fov_degrees,
            viewport.aspect(),
            self.near,
            self.far,
        )
    }
}
