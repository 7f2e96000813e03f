pub mod gltf;

pub use self::gltf::{load_scene, scene_from_document};
