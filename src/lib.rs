//! Haunted House
//!
//! A small wgpu/winit scene: a house, a graveyard and three ghost lights that
//! orbit it. The interesting part is [`animation`], the self-rescheduling
//! frame loop that moves the ghosts, advances the camera controls and renders
//! exactly once per display refresh.

pub mod animation;
pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod gfx;
pub mod ui;
pub mod viewport;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::{AppOptions, HauntedHouseApp};
pub use config::SceneConfig;
pub use context::SceneContext;
pub use error::{AppError, ConfigError, RenderError};
