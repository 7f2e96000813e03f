pub mod camera;
pub mod classify;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod core;
pub mod error;
pub mod loaders;
pub mod math;
pub mod projector;
pub mod scene;
pub mod types;

pub use camera::{CameraState, Viewport};
pub use classify::{classify, ClassifierConfig};
pub use coordinator::{extract_model, LabelCoordinator, ModelData, SamplingRequest, SolidKind};
pub use error::{Error, Result};
pub use scene::{Geometry, LayerTable, SceneElement, SceneGraph, SceneNode};
pub use types::{BoundaryCurve, ScreenLabel, SpaceRecord};
