//! Per-frame label state and sampling requests for a loaded model.

use serde::{Deserialize, Serialize};

use crate::camera::{CameraState, Viewport};
use crate::classify::{classify, ClassifierConfig};
use crate::core::{sample_interior_points, ConvexHull, SampledPoints, SamplerConfig, SamplingTask, Solid, TriangleMesh};
use crate::error::{Error, Result};
use crate::projector::{compute_labels_into, space_center, LABEL_Z_OFFSET};
use crate::scene::SceneGraph;
use crate::types::{BoundaryCurve, ScreenLabel, SpaceRecord};

/// Space records and occupancy boundaries extracted from one model
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub spaces: Vec<SpaceRecord>,
    pub boundaries: Vec<BoundaryCurve>,
}

/// Surface the interior test runs against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolidKind {
    /// Convex hull of the boundary's vertices
    #[default]
    Hull,
    /// The boundary element's own closed triangle mesh
    Mesh,
}

impl SolidKind {
    fn build(self, boundary: &BoundaryCurve) -> Result<Box<dyn Solid + Send>> {
        let solid: Box<dyn Solid + Send> = match self {
            SolidKind::Hull => Box::new(ConvexHull::build(&boundary.vertices)?),
            SolidKind::Mesh => Box::new(TriangleMesh::from_element(&boundary.element)?),
        };
        Ok(solid)
    }
}

/// Request for `count` interior points of boundary `boundary_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingRequest {
    pub boundary_id: usize,
    pub count: usize,
    pub seed: u64,
    #[serde(default)]
    pub solid: SolidKind,
}

impl SamplingRequest {
    pub fn new(boundary_id: usize, count: usize, seed: u64) -> Self {
        Self {
            boundary_id,
            count,
            seed,
            solid: SolidKind::Hull,
        }
    }

    pub fn with_solid(mut self, solid: SolidKind) -> Self {
        self.solid = solid;
        self
    }
}

impl ModelData {
    pub fn boundary(&self, boundary_id: usize) -> Result<&BoundaryCurve> {
        self.boundaries
            .get(boundary_id)
            .ok_or(Error::UnknownBoundary(boundary_id))
    }

    /// Builds the requested solid for the boundary and samples it on the
    /// calling thread
    pub fn sample(&self, request: SamplingRequest, config: &SamplerConfig) -> Result<SampledPoints> {
        let boundary = self.boundary(request.boundary_id)?;
        let solid = request.solid.build(boundary)?;
        sample_interior_points(&*solid, request.count, request.seed, config)
    }

    /// Like [`ModelData::sample`], but building the solid and sampling run
    /// on a background thread. Unknown boundaries fail immediately.
    pub fn spawn_sample(&self, request: SamplingRequest, config: SamplerConfig) -> Result<SamplingTask> {
        let boundary = self.boundary(request.boundary_id)?.clone();
        Ok(SamplingTask::spawn(move || {
            let solid = request.solid.build(&boundary)?;
            sample_interior_points(&*solid, request.count, request.seed, &config)
        }))
    }
}

/// Logs a per-element failure and drops the element
fn skip_element<T>(kind: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_per_element() => {
            log::warn!("Skipping {}: {}", kind, err);
            None
        }
        Err(err) => {
            log::error!("Skipping {}: {}", kind, err);
            None
        }
    }
}

/// Classifies the scene, computes a label anchor for every space and keeps
/// the boundaries that have vertices.
///
/// Elements without geometry are logged and left out; they do not affect
/// the other elements.
pub fn extract_model(scene: &SceneGraph, config: &ClassifierConfig) -> ModelData {
    let classification = classify(scene, config);

    let spaces = classification
        .spaces
        .into_iter()
        .filter_map(|element| {
            let center = skip_element("space", space_center(&element))?;
            Some(SpaceRecord::new(center, element))
        })
        .collect();

    let boundaries = classification
        .boundaries
        .into_iter()
        .filter_map(|boundary| {
            skip_element("boundary", boundary.bounds())?;
            Some(boundary)
        })
        .collect();

    ModelData { spaces, boundaries }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Uninitialized,
    ModelLoading,
    Ready,
}

/// Owns the latest space records and labels and refreshes the labels once
/// per rendered frame.
#[derive(Debug)]
pub struct LabelCoordinator {
    state: CoordinatorState,
    model: Option<ModelData>,
    camera: Option<CameraState>,
    labels: Vec<ScreenLabel>,
    z_offset: f64,
}

impl Default for LabelCoordinator {
    fn default() -> Self {
        Self::new(LABEL_Z_OFFSET)
    }
}

impl LabelCoordinator {
    pub fn new(z_offset: f64) -> Self {
        Self {
            state: CoordinatorState::Uninitialized,
            model: None,
            camera: None,
            labels: Vec::new(),
            z_offset,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn model(&self) -> Option<&ModelData> {
        self.model.as_ref()
    }

    /// Marks that a model load has started
    pub fn begin_loading(&mut self) {
        if self.state == CoordinatorState::Uninitialized {
            self.state = CoordinatorState::ModelLoading;
        }
    }

    /// Installs the loaded model. A second model is ignored; the scene is
    /// static once loaded.
    pub fn set_model(&mut self, model: ModelData) {
        if self.model.is_some() {
            log::warn!("Model already loaded, ignoring replacement");
            return;
        }
        log::info!(
            "Model ready: {} spaces, {} boundaries",
            model.spaces.len(),
            model.boundaries.len()
        );
        self.model = Some(model);
        if self.state == CoordinatorState::Uninitialized {
            self.state = CoordinatorState::ModelLoading;
        }
        self.update_state();
    }

    /// Updates the camera; called whenever the render loop moves it
    pub fn set_camera(&mut self, camera: CameraState) {
        self.camera = Some(camera);
        self.update_state();
    }

    fn update_state(&mut self) {
        if self.model.is_some() && self.camera.is_some() {
            self.state = CoordinatorState::Ready;
        }
    }

    /// Recomputes labels for this frame, or fails with
    /// [`Error::CameraNotReady`] while the model or camera is missing.
    pub fn try_labels(&mut self, viewport: Viewport) -> Result<&[ScreenLabel]> {
        match (&self.model, &self.camera) {
            (Some(model), Some(camera)) if self.state == CoordinatorState::Ready => {
                compute_labels_into(&model.spaces, camera, viewport, self.z_offset, &mut self.labels);
                Ok(&self.labels)
            }
            _ => Err(Error::CameraNotReady),
        }
    }

    /// Per-frame entry point. Yields no labels until both model and camera
    /// are available.
    pub fn tick(&mut self, viewport: Viewport) -> &[ScreenLabel] {
        if self.try_labels(viewport).is_err() {
            self.labels.clear();
        }
        &self.labels
    }

    /// Labels from the most recent tick
    pub fn labels(&self) -> &[ScreenLabel] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, LayerTable, SceneElement, SceneNode};
    use glam::DVec3;

    fn cube(min: f64, max: f64) -> Vec<DVec3> {
        (0..8)
            .map(|i| {
                DVec3::new(
                    if i & 1 == 0 { min } else { max },
                    if i & 2 == 0 { min } else { max },
                    if i & 4 == 0 { min } else { max },
                )
            })
            .collect()
    }

    fn sample_scene() -> SceneGraph {
        let layers = LayerTable::new(["Spaces", "Occ"]);
        SceneGraph::new(
            layers,
            vec![
                SceneNode::new(SceneElement::new("Hall", Geometry::triangles(cube(-1.0, 1.0), None)).with_layer(0)),
                SceneNode::new(SceneElement::new("Empty", Geometry::default()).with_layer(0)),
                SceneNode::new(SceneElement::new("Zone", Geometry::curve(cube(0.0, 2.0))).with_layer(1)),
                SceneNode::new(SceneElement::new("Unmodelled zone", Geometry::default()).with_layer(1)),
                SceneNode::new(
                    SceneElement::new(
                        "Flat",
                        Geometry::curve(vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(1.0, 1.0, 0.0)]),
                    )
                    .with_layer(1),
                ),
            ],
        )
    }

    fn camera() -> CameraState {
        CameraState::perspective(DVec3::new(0.0, 0.0, 20.0), DVec3::ZERO, DVec3::Y, 30.0, 1.0, 0.1, 100.0)
    }

    #[test]
    fn test_extract_model_skips_empty_spaces() {
        let model = extract_model(&sample_scene(), &ClassifierConfig::default());
        assert_eq!(model.spaces.len(), 1);
        assert_eq!(model.spaces[0].name(), "Hall");
        assert_eq!(model.spaces[0].center, DVec3::ZERO);
    }

    #[test]
    fn test_extract_model_skips_empty_boundaries() {
        let model = extract_model(&sample_scene(), &ClassifierConfig::default());
        let names: Vec<&str> = model.boundaries.iter().map(|b| b.name()).collect();
        assert_eq!(names, ["Zone", "Flat"], "Boundary without vertices should be left out");
    }

    #[test]
    fn test_no_labels_before_camera() {
        let mut coordinator = LabelCoordinator::default();
        assert_eq!(coordinator.state(), CoordinatorState::Uninitialized);
        assert!(coordinator.tick(Viewport::new(100.0, 100.0)).is_empty());

        coordinator.begin_loading();
        assert_eq!(coordinator.state(), CoordinatorState::ModelLoading);

        coordinator.set_model(extract_model(&sample_scene(), &ClassifierConfig::default()));
        assert_eq!(coordinator.state(), CoordinatorState::ModelLoading);
        assert_eq!(
            coordinator.try_labels(Viewport::new(100.0, 100.0)).unwrap_err(),
            Error::CameraNotReady
        );
        assert!(coordinator.tick(Viewport::new(100.0, 100.0)).is_empty());

        coordinator.set_camera(camera());
        assert_eq!(coordinator.state(), CoordinatorState::Ready);
        let labels = coordinator.tick(Viewport::new(100.0, 100.0));
        assert_eq!(labels.len(), 1);
        assert_eq!(&*labels[0].space_name, "Hall");
    }

    #[test]
    fn test_camera_before_model() {
        let mut coordinator = LabelCoordinator::default();
        coordinator.set_camera(camera());
        assert_eq!(coordinator.state(), CoordinatorState::Uninitialized);

        coordinator.set_model(extract_model(&sample_scene(), &ClassifierConfig::default()));
        assert_eq!(coordinator.state(), CoordinatorState::Ready);
    }

    #[test]
    fn test_second_model_is_ignored() {
        let mut coordinator = LabelCoordinator::default();
        coordinator.set_model(extract_model(&sample_scene(), &ClassifierConfig::default()));
        coordinator.set_model(ModelData::default());
        assert_eq!(coordinator.model().unwrap().spaces.len(), 1);
    }

    #[test]
    fn test_labels_follow_camera() {
        let mut coordinator = LabelCoordinator::default();
        coordinator.set_model(extract_model(&sample_scene(), &ClassifierConfig::default()));
        coordinator.set_camera(camera());
        let viewport = Viewport::new(100.0, 100.0);
        let before = coordinator.tick(viewport)[0].clone();

        coordinator.set_camera(CameraState::perspective(
            DVec3::new(5.0, 0.0, 20.0),
            DVec3::new(5.0, 0.0, 0.0),
            DVec3::Y,
            30.0,
            1.0,
            0.1,
            100.0,
        ));
        let after = coordinator.tick(viewport)[0].clone();

        assert!(after.x < before.x, "label should move left when the camera pans right");
        assert_eq!(coordinator.labels().len(), 1);
    }

    #[test]
    fn test_sample_request() {
        let model = extract_model(&sample_scene(), &ClassifierConfig::default());
        let request = SamplingRequest::new(0, 100, 5);
        let sampled = model.sample(request, &SamplerConfig::default()).unwrap();

        assert_eq!(sampled.points.len(), 100);
        assert!(sampled
            .points
            .iter()
            .all(|p| p.cmpgt(DVec3::ZERO).all() && p.cmplt(DVec3::splat(2.0)).all()));
    }

    #[test]
    fn test_sample_request_errors() {
        let model = extract_model(&sample_scene(), &ClassifierConfig::default());
        let config = SamplerConfig::default();

        let unknown = SamplingRequest::new(9, 1, 0);
        assert_eq!(model.sample(unknown, &config).unwrap_err(), Error::UnknownBoundary(9));
        assert!(matches!(model.spawn_sample(unknown, config), Err(Error::UnknownBoundary(9))));

        let flat = SamplingRequest::new(1, 1, 0);
        assert!(matches!(
            model.sample(flat, &config),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_spawned_sample_matches_synchronous() {
        let model = extract_model(&sample_scene(), &ClassifierConfig::default());
        let request = SamplingRequest::new(0, 20, 77);
        let config = SamplerConfig::default();

        let expected = model.sample(request, &config).unwrap();
        let task = model.spawn_sample(request, config).unwrap();
        assert_eq!(pollster::block_on(task).unwrap(), expected);
    }

    /// Unit-height prism over [0,2]x[0,2] minus the [1,2]x[1,2] corner
    fn l_shaped_zone() -> SceneElement {
        let footprint = [(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 2.0), (0.0, 2.0)];
        let mut positions: Vec<DVec3> = footprint.iter().map(|&(x, y)| DVec3::new(x, y, 0.0)).collect();
        positions.extend(footprint.iter().map(|&(x, y)| DVec3::new(x, y, 1.0)));

        let mut indices: Vec<u32> = vec![3, 1, 0, 3, 2, 1, 3, 0, 5, 3, 5, 4, 9, 6, 7, 9, 7, 8, 9, 11, 6, 9, 10, 11];
        for i in 0..6u32 {
            let j = (i + 1) % 6;
            indices.extend([i, j, j + 6, i, j + 6, i + 6]);
        }
        SceneElement::new("L zone", Geometry::triangles(positions, Some(indices)))
    }

    fn in_notch(p: &DVec3) -> bool {
        p.x > 1.0 && p.y > 1.0
    }

    #[test]
    fn test_mesh_solid_respects_non_convex_boundary() {
        let scene = SceneGraph::new(
            LayerTable::new(["Occ"]),
            vec![SceneNode::new(l_shaped_zone().with_layer(0))],
        );
        let model = extract_model(&scene, &ClassifierConfig::default());
        let config = SamplerConfig::default();

        let mesh_request = SamplingRequest::new(0, 200, 21).with_solid(SolidKind::Mesh);
        let sampled = model.sample(mesh_request, &config).unwrap();
        assert_eq!(sampled.points.len(), 200);
        assert!(!sampled.points.iter().any(in_notch), "Mesh sampling should avoid the notch");

        let background = pollster::block_on(model.spawn_sample(mesh_request, config).unwrap()).unwrap();
        assert_eq!(background, sampled);

        // The convex hull fills the notch in
        let hull_points = model.sample(SamplingRequest::new(0, 200, 21), &config).unwrap();
        assert!(hull_points.points.iter().any(in_notch));
    }

    #[test]
    fn test_solid_kind_defaults_to_hull() {
        let request: SamplingRequest =
            serde_json::from_str(r#"{"boundary_id": 2, "count": 10, "seed": 4}"#).unwrap();
        assert_eq!(request, SamplingRequest::new(2, 10, 4));

        let request: SamplingRequest =
            serde_json::from_str(r#"{"boundary_id": 0, "count": 1, "seed": 0, "solid": "mesh"}"#).unwrap();
        assert_eq!(request.solid, SolidKind::Mesh);
    }
}
