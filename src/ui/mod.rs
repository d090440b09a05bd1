//! # User Interface Module
//!
//! Dear ImGui overlay for the haunted house.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu
//! - [`debug_panel`] - sliders for the [`DebugParams`] tunables
//!
//! Input the UI wants (hovering or dragging a slider) is kept away from the
//! orbit controls by [`UiManager::handle_window_event`].
//!
//! [`DebugParams`]: crate::config::DebugParams

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::debug_panel;
