//! # Scene Configuration
//!
//! Typed configuration for the haunted house scene, loaded from TOML. Every
//! field is optional in the file; anything missing falls back to the reference
//! scene returned by [`SceneConfig::default`].
//!
//! ```toml
//! [graves]
//! count = 40
//! seed = 1234
//!
//! [[ghosts]]
//! radius = 4.0
//! speed = 1.0
//! color = "#8800ff"
//! ```
//!
//! The module also holds [`DebugParams`], the small set of values the debug
//! panel is allowed to change at runtime.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gfx::scene::Scene;

/// Maximum number of point lights the renderer uploads per frame
pub const MAX_POINT_LIGHTS: usize = 8;

/// An sRGB colour, written as `"#rrggbb"` in config files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self, ConfigError> {
        let trimmed = hex.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConfigError::Invalid(format!(
                "colour '{hex}' is not of the form #rrggbb"
            )));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map(|value| value as f32 / 255.0)
                .map_err(|_| ConfigError::Invalid(format!("colour '{hex}' has non-hex digits")))
        };

        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Converts to linear space for lighting in the shader
    pub fn to_linear(self) -> [f32; 3] {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [decode(self.r), decode(self.g), decode(self.b)]
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            to_byte(color.r),
            to_byte(color.g),
            to_byte(color.b)
        )
    }
}

/// Complete scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub lighting: LightingConfig,
    pub fog: FogConfig,
    pub graves: GraveConfig,
    pub shadows: ShadowConfig,
    pub ghosts: Vec<GhostConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            lighting: LightingConfig::default(),
            fog: FogConfig::default(),
            graves: GraveConfig::default(),
            shadows: ShadowConfig::default(),
            ghosts: vec![
                GhostConfig::new(4.0, 1.0, Color::rgb(0.533, 0.0, 1.0)),
                GhostConfig::new(5.0, -0.38, Color::rgb(1.0, 0.0, 0.533)),
                GhostConfig::new(6.0, 1.3, Color::rgb(1.0, 0.0, 0.0)),
            ],
        }
    }
}

impl SceneConfig {
    /// Reads, parses and validates a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents)?;
        log::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a TOML document
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(message: String) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid(message))
        }

        if self.window.width == 0 || self.window.height == 0 {
            return invalid(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            ));
        }

        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return invalid(format!("camera fov {} must be in (0, 180)", camera.fov_degrees));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return invalid(format!(
                "camera clip range {}..{} must satisfy 0 < near < far",
                camera.near, camera.far
            ));
        }

        let controls = &self.controls;
        if !(controls.damping_factor > 0.0 && controls.damping_factor <= 1.0) {
            return invalid(format!(
                "damping factor {} must be in (0, 1]",
                controls.damping_factor
            ));
        }
        if !(controls.min_distance > 0.0 && controls.max_distance >= controls.min_distance) {
            return invalid(format!(
                "orbit distance bounds {}..{} are not ordered",
                controls.min_distance, controls.max_distance
            ));
        }

        let graves = &self.graves;
        if graves.count > 0
            && !(graves.min_radius >= 0.0 && graves.max_radius > graves.min_radius)
        {
            return invalid(format!(
                "grave ring {}..{} is empty",
                graves.min_radius, graves.max_radius
            ));
        }

        if self.shadows.map_size == 0 || self.shadows.map_size > 4096 {
            return invalid(format!(
                "shadow map size {} must be in 1..=4096",
                self.shadows.map_size
            ));
        }

        // The door light takes one slot
        if self.ghosts.len() + 1 > MAX_POINT_LIGHTS {
            return invalid(format!(
                "{} ghosts exceed the limit of {} point lights",
                self.ghosts.len(),
                MAX_POINT_LIGHTS - 1
            ));
        }

        for (i, ghost) in self.ghosts.iter().enumerate() {
            if !(ghost.radius > 0.0 && ghost.radius.is_finite()) {
                return invalid(format!("ghost {i} radius {} must be positive", ghost.radius));
            }
            if !ghost.speed.is_finite() || !ghost.phase.is_finite() {
                return invalid(format!("ghost {i} speed and phase must be finite"));
            }
            if ghost.intensity < 0.0 {
                return invalid(format!("ghost {i} intensity must not be negative"));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Logical width
    pub width: u32,
    /// Logical height
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Haunted House".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            position: [4.0, 2.0, 5.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.5,
            max_distance: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient: AmbientConfig,
    pub moon: MoonConfig,
    pub door: DoorLightConfig,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: AmbientConfig::default(),
            moon: MoonConfig::default(),
            door: DoorLightConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub color: Color,
    pub intensity: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            color: Color::rgb(0.525, 0.804, 1.0),
            intensity: 0.275,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonConfig {
    pub color: Color,
    pub intensity: f32,
    /// The moon shines from this point towards the origin
    pub position: [f32; 3],
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            color: Color::rgb(0.525, 0.804, 1.0),
            intensity: 1.0,
            position: [3.0, 2.0, -8.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorLightConfig {
    pub color: Color,
    pub intensity: f32,
    pub position: [f32; 3],
    /// Distance at which the light fades out completely
    pub range: f32,
}

impl Default for DoorLightConfig {
    fn default() -> Self {
        Self {
            color: Color::rgb(1.0, 0.49, 0.275),
            intensity: 5.0,
            position: [0.0, 2.2, 2.7],
            range: 7.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub color: Color,
    /// Exponential-squared density; 0 disables fog
    pub density: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            color: Color::rgb(0.016, 0.204, 0.247),
            density: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraveConfig {
    pub count: u32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub seed: u64,
    pub color: Color,
}

impl Default for GraveConfig {
    fn default() -> Self {
        Self {
            count: 30,
            min_radius: 3.0,
            max_radius: 7.0,
            seed: 31,
            color: Color::rgb(0.698, 0.714, 0.694),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub enabled: bool,
    pub map_size: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            map_size: 1024,
        }
    }
}

/// One orbiting ghost light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostConfig {
    pub radius: f32,
    /// Signed angular speed multiplier; negative orbits clockwise
    pub speed: f64,
    #[serde(default)]
    pub phase: f64,
    #[serde(default = "GhostConfig::default_color")]
    pub color: Color,
    #[serde(default = "GhostConfig::default_intensity")]
    pub intensity: f32,
    #[serde(default = "GhostConfig::default_range")]
    pub range: f32,
}

impl GhostConfig {
    pub fn new(radius: f32, speed: f64, color: Color) -> Self {
        Self {
            radius,
            speed,
            phase: 0.0,
            color,
            intensity: Self::default_intensity(),
            range: Self::default_range(),
        }
    }

    fn default_color() -> Color {
        Color::WHITE
    }

    fn default_intensity() -> f32 {
        6.0
    }

    fn default_range() -> f32 {
        10.0
    }
}

/// Values the debug panel may tune while the scene runs
///
/// The panel edits a copy; [`DebugParams::apply`] writes it back to the scene
/// explicitly, so nothing outside this list can be changed from the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugParams {
    pub ambient_intensity: f32,
    pub moon_intensity: f32,
    pub moon_position: [f32; 3],
    pub door_light_intensity: f32,
    /// One entry per ghost, in scene order
    pub ghost_intensities: Vec<f32>,
    pub fog_density: f32,
}

impl DebugParams {
    /// Captures the current tunable values of a scene
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            ambient_intensity: scene.ambient.intensity,
            moon_intensity: scene.moon.intensity,
            moon_position: scene.moon.position.into(),
            door_light_intensity: scene.door_light.intensity,
            ghost_intensities: scene
                .ghosts
                .iter()
                .map(|ghost| ghost.light.intensity)
                .collect(),
            fog_density: scene.fog.density,
        }
    }

    /// Writes the values into the scene, clamping them to sane ranges
    pub fn apply(&self, scene: &mut Scene) {
        scene.ambient.intensity = self.ambient_intensity.max(0.0);
        scene.moon.intensity = self.moon_intensity.max(0.0);
        scene.moon.position = self.moon_position.into();
        scene.door_light.intensity = self.door_light_intensity.max(0.0);
        for (ghost, intensity) in scene.ghosts.iter_mut().zip(&self.ghost_intensities) {
            ghost.light.intensity = intensity.max(0.0);
        }
        scene.fog.density = self.fog_density.clamp(0.0, 1.0);
    }
}
