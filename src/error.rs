//! Error types for the haunted house application
//!
//! Every fallible step belongs to one of three concerns: loading the scene
//! configuration, bringing up the GPU surface, or running the window event loop.
//! None of them are recoverable per frame; they abort startup or stop the loop.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a [`SceneConfig`](crate::config::SceneConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors raised by the render engine
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not create a render surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("render surface reports no supported texture format")]
    NoSurfaceFormat,

    #[error("failed to build render pipelines: {}", .0.join("; "))]
    Pipeline(Vec<String>),

    #[error("failed to acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),
}

/// Top level application error
#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
