use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scene::{LayerTable, SceneElement, SceneGraph};
use crate::types::BoundaryCurve;

pub const SPACE_LAYER: &str = "Spaces";
pub const BOUNDARY_LAYER: &str = "Occ";

/// Layer names that select spaces and occupancy boundaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub space_layer: String,
    pub boundary_layer: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            space_layer: SPACE_LAYER.to_string(),
            boundary_layer: BOUNDARY_LAYER.to_string(),
        }
    }
}

/// Elements of a scene split by layer, in document order
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub spaces: Vec<Arc<SceneElement>>,
    pub boundaries: Vec<BoundaryCurve>,
}

pub fn resolve_layer<'a>(layers: &'a LayerTable, element: &SceneElement) -> Result<&'a str> {
    layers
        .resolve(element.layer_index)
        .ok_or_else(|| Error::MissingLayerTag {
            element: element.name.clone(),
        })
}

/// Splits the scene's elements into spaces and occupancy boundaries.
///
/// Untagged elements and elements on other layers are skipped.
pub fn classify(scene: &SceneGraph, config: &ClassifierConfig) -> Classification {
    let mut classification = Classification::default();
    let mut untagged = 0;

    for element in scene.elements() {
        let layer = match resolve_layer(&scene.layers, element) {
            Ok(layer) => layer,
            Err(err) => {
                log::trace!("Skipping element: {}", err);
                untagged += 1;
                continue;
            }
        };

        if layer == config.space_layer {
            classification.spaces.push(Arc::clone(element));
        } else if layer == config.boundary_layer {
            classification
                .boundaries
                .push(BoundaryCurve::from_element(Arc::clone(element)));
        }
    }

    log::debug!(
        "Classified {} spaces and {} boundaries ({} untagged elements)",
        classification.spaces.len(),
        classification.boundaries.len(),
        untagged
    );

    classification
}
