//! GPU resource management
//!
//! Uniform buffers, bind groups and depth textures shared by the passes.

pub mod global_bindings;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalBindings, GlobalUBO, GlobalUniform};
pub use texture_resource::TextureResource;
