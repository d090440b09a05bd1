//! # Scene Management Module
//!
//! Retained description of everything drawn each frame.
//!
//! - [`Scene`] - meshes, objects, lights and fog
//! - [`Object`] - a placed, coloured instance of a shared [`Mesh`]
//! - [`Ghost`] - a point light that follows an orbit
//! - [`haunted_house::build`] - builds the reference scene from configuration

pub mod haunted_house;
pub mod lights;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use lights::{AmbientLight, DirectionalLight, Fog, Ghost, PointLight, PointLightUniform};
pub use object::{DrawMesh, Material, Mesh, MeshId, Object, ObjectUniform, Transform};
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;
