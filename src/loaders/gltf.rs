use anyhow::{Context, Result};
use glam::{DMat4, Mat4, Vec3};
use gltf::mesh::Mode;
use serde::Deserialize;
use std::path::Path;

use crate::scene::{Geometry, LayerTable, SceneElement, SceneGraph, SceneNode};

#[derive(Debug, Default, Deserialize)]
struct NodeExtras {
    #[serde(rename = "layerIndex")]
    layer_index: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct LayerExtras {
    layers: Option<LayerTable>,
}

/// Loads a glTF file into a scene graph
pub fn load_scene(path: impl AsRef<Path>) -> Result<SceneGraph> {
    let path = path.as_ref();
    log::info!("Loading glTF file: {:?}", path);

    let (document, buffers, _images) =
        gltf::import(path).context(format!("Failed to load glTF file: {:?}", path))?;

    log::debug!(
        "glTF loaded: {} scenes, {} nodes, {} meshes",
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count()
    );

    scene_from_document(&document, &buffers)
}

/// Builds a scene graph from the default scene of a parsed document.
///
/// The layer table comes from the scene's `extras.layers`, falling back to
/// the asset's. Each node's `extras.layerIndex` is its layer tag.
pub fn scene_from_document(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Result<SceneGraph> {
    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        log::warn!("glTF document has no scenes");
        return Ok(SceneGraph::default());
    };

    let layers = parse_layers(scene.extras())
        .or_else(|| parse_layers(&document.as_json().asset.extras))
        .unwrap_or_default();

    let roots = scene
        .nodes()
        .map(|node| process_node(&node, buffers, &DMat4::IDENTITY))
        .collect::<Result<Vec<_>>>()?;

    let graph = SceneGraph::new(layers, roots);
    log::info!(
        "Scene {:?}: {} layers, {} elements",
        scene.name().unwrap_or("unnamed"),
        graph.layers.len(),
        graph.element_count()
    );
    Ok(graph)
}

/// Recursively converts glTF nodes, composing world transforms parent × local
fn process_node(node: &gltf::Node, buffers: &[gltf::buffer::Data], parent_transform: &DMat4) -> Result<SceneNode> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix()).as_dmat4();
    let world_transform = *parent_transform * local_transform;

    let geometry = match node.mesh() {
        Some(mesh) => process_mesh(&mesh, buffers)
            .with_context(|| format!("Failed to read mesh of node {}", node.index()))?,
        None => Geometry::default(),
    };

    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node {}", node.index()));

    let mut element = SceneElement::new(name, geometry).with_transform(world_transform);
    if let Some(layer_index) = parse_layer_index(node.extras()) {
        element = element.with_layer(layer_index);
    }

    let children = node
        .children()
        .map(|child| process_node(&child, buffers, &world_transform))
        .collect::<Result<Vec<_>>>()?;

    Ok(SceneNode::new(element).with_children(children))
}

/// Concatenates the positions of every primitive in local space. Triangle
/// lists, strips and fans contribute a triangle-list index buffer; line and
/// point primitives only positions.
fn process_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Result<Geometry> {
    let mut positions = Vec::new();
    let mut indices = Vec::new();
    let mut has_triangles = false;

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));

        let Some(read) = reader.read_positions() else {
            log::warn!("Mesh {:?} has a primitive without positions", mesh.name());
            continue;
        };

        let base = u32::try_from(positions.len()).context("Mesh has too many vertices")?;
        let start = positions.len();
        positions.extend(read.map(|p| Vec3::from_array(p).as_dvec3()));
        let added = positions.len() - start;

        let order: Vec<u32> = match reader.read_indices() {
            Some(read) => read.into_u32().collect(),
            None => (0..added as u32).collect(),
        };
        if let Some(triangles) = triangle_list(primitive.mode(), &order) {
            has_triangles = true;
            indices.extend(triangles.into_iter().map(|i| base + i));
        }
    }

    Ok(Geometry::triangles(positions, has_triangles.then_some(indices)))
}

/// Vertex order of a primitive as a triangle list, or `None` for primitives
/// without faces
fn triangle_list(mode: Mode, order: &[u32]) -> Option<Vec<u32>> {
    match mode {
        Mode::Triangles => Some(order[..order.len() - order.len() % 3].to_vec()),
        // Odd triangles swap their first two vertices to keep the winding
        Mode::TriangleStrip => Some(
            order
                .windows(3)
                .enumerate()
                .flat_map(|(i, w)| if i % 2 == 0 { [w[0], w[1], w[2]] } else { [w[1], w[0], w[2]] })
                .collect(),
        ),
        Mode::TriangleFan => Some(match order.split_first() {
            Some((&hub, rest)) => rest.windows(2).flat_map(|w| [hub, w[0], w[1]]).collect(),
            None => Vec::new(),
        }),
        Mode::Points | Mode::Lines | Mode::LineLoop | Mode::LineStrip => None,
    }
}

fn parse_extras<T: for<'de> Deserialize<'de>>(extras: &gltf::json::Extras) -> Option<T> {
    let raw = extras.as_ref()?;
    match serde_json::from_str(raw.get()) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("Ignoring malformed extras: {}", err);
            None
        }
    }
}

fn parse_layer_index(extras: &gltf::json::Extras) -> Option<i64> {
    parse_extras::<NodeExtras>(extras)?.layer_index
}

fn parse_layers(extras: &gltf::json::Extras) -> Option<LayerTable> {
    parse_extras::<LayerExtras>(extras)?.layers
}
