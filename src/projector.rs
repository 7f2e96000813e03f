use std::sync::Arc;

use glam::{DVec2, DVec3};

use crate::camera::{CameraState, Viewport};
use crate::error::{Error, Result};
use crate::scene::SceneElement;
use crate::types::{ScreenLabel, SpaceRecord};

/// World-space lift applied to label anchors so they sit above the floor
pub const LABEL_Z_OFFSET: f64 = 1.0;

/// Midpoint of the element's local bounding box, mapped to world space
pub fn space_center(element: &SceneElement) -> Result<DVec3> {
    let bounds = element
        .geometry
        .local_bounds()
        .ok_or_else(|| Error::EmptyGeometry {
            element: element.name.clone(),
        })?;
    Ok(element.local_to_world(bounds.center()))
}

/// Pixel position of `world`, measured from the viewport's top-left corner
pub fn project_to_screen(
    world: DVec3,
    camera: &CameraState,
    viewport: Viewport,
    z_offset: f64,
) -> DVec2 {
    let lifted = world + DVec3::new(0.0, 0.0, z_offset);
    let ndc = camera.project(lifted);

    let half_width = 0.5 * viewport.width;
    let half_height = 0.5 * viewport.height;

    // NDC y grows upward, screen y grows downward
    DVec2::new(
        ndc.x * half_width + half_width,
        -(ndc.y * half_height) + half_height,
    )
}

/// Replaces the contents of `labels` with one label per record
pub fn compute_labels_into(
    records: &[SpaceRecord],
    camera: &CameraState,
    viewport: Viewport,
    z_offset: f64,
    labels: &mut Vec<ScreenLabel>,
) {
    labels.clear();
    labels.extend(records.iter().map(|record| {
        let screen = project_to_screen(record.center, camera, viewport, z_offset);
        ScreenLabel {
            space_name: Arc::clone(record.shared_name()),
            x: screen.x,
            y: screen.y,
        }
    }));
}

pub fn compute_labels(
    records: &[SpaceRecord],
    camera: &CameraState,
    viewport: Viewport,
    z_offset: f64,
) -> Vec<ScreenLabel> {
    let mut labels = Vec::with_capacity(records.len());
    compute_labels_into(records, camera, viewport, z_offset, &mut labels);
    labels
}
