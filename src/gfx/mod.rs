//! # Graphics Module
//!
//! Everything between the scene description and the pixels on screen.
//!
//! - **Camera** ([`camera`]) - perspective camera and damped orbit controls
//! - **Geometry** ([`geometry`]) - procedural boxes, cones, spheres and planes
//! - **Scene** ([`scene`]) - meshes, placed objects, lights and the haunted house builder
//! - **Resources** ([`resources`]) - global uniforms, bind groups and depth textures
//! - **Rendering** ([`rendering`]) - pipelines and the two-pass render engine
//!
//! The application owns a [`RenderEngine`] and a [`Scene`]; the engine
//! uploads the scene once and then draws it each frame from a borrowed
//! reference.
//!
//! [`Scene`]: scene::Scene

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::{OrbitControls, PerspectiveCamera};
pub use rendering::render_engine::RenderEngine;
