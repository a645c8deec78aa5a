//! Visualizer configuration.
//!
//! Everything tunable lives in [`VisualizerConfig`], which round-trips
//! through JSON. Missing fields fall back to their defaults, so a config
//! file only needs the values it changes:
//!
//! ```json
//! { "palette": 2, "shell": { "count": 40000 } }
//! ```
//!
//! Fixed algorithm constants (noise scale, wave lifetime, glow radii and so
//! on) are not configurable; see [`crate::shading`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::interaction::Region;
use crate::palette::Palette;
use crate::shading::{BloomParams, ShadingParams};

/// Cylindrical shell settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    pub count: u32,
    pub radius: f32,
    pub height: f32,
    pub displacement_strength: f32,
    /// Tumble rate about x, y and z in radians per second.
    pub rotation_rate: [f32; 3],
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            count: 75_000,
            radius: 15.0,
            height: 30.0,
            displacement_strength: 3.0,
            rotation_rate: [0.03, 0.018, -0.012],
        }
    }
}

/// Fibonacci core settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoreConfig {
    pub count: u32,
    pub radius: f32,
    /// Spin about y in radians per second.
    pub spin_rate: f32,
    /// Relative amplitude of the breathing scale.
    pub pulse_amplitude: f32,
    /// Angular frequency of the breathing scale.
    pub pulse_speed: f32,
    /// Hue rotation in turns per second.
    pub hue_speed: f32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            count: 10_000,
            radius: 3.6,
            spin_rate: -0.12,
            pulse_amplitude: 0.1,
            pulse_speed: 2.5,
            hue_speed: 0.15,
        }
    }
}

/// Click shockwave settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShockwaveConfig {
    /// Front speed in world units per second.
    pub speed: f32,
    /// Width of the front in world units.
    pub thickness: f32,
}

impl Default for ShockwaveConfig {
    fn default() -> Self {
        Self {
            speed: 40.0,
            thickness: 5.0,
        }
    }
}

/// Pointer repulsion settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RepulsionConfig {
    pub radius: f32,
    pub strength: f32,
}

impl Default for RepulsionConfig {
    fn default() -> Self {
        Self {
            radius: 8.0,
            strength: 1.5,
        }
    }
}

/// Bloom post-process settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BloomConfig {
    pub enabled: bool,
    /// Weight of the blurred highlights added back onto the scene.
    pub strength: f32,
    /// Blur spread, nominally in [0, 1].
    pub radius: f32,
    /// Luminance a pixel needs before it glows.
    pub threshold: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        let params = BloomParams::default();
        Self {
            enabled: true,
            strength: params.strength,
            radius: params.radius,
            threshold: params.threshold,
        }
    }
}

/// Orbit camera settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    /// Fraction of queued orbit motion applied per frame, in (0, 1].
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 35.0,
            yaw: 0.0,
            pitch: 1.5,
            target: [0.0; 3],
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            min_distance: 5.0,
            max_distance: 100.0,
            rotate_speed: 1.0,
            damping: 0.05,
        }
    }
}

/// Window settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Pulsar".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Complete visualizer configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Theme index into [`Palette::ALL`].
    pub palette: usize,
    /// RNG seed for formation synthesis. Time-based when absent.
    pub seed: Option<u64>,
    /// Radius used for the distance fade.
    pub formation_radius: f32,
    pub shell: ShellConfig,
    pub core: CoreConfig,
    pub shockwave: ShockwaveConfig,
    pub repulsion: RepulsionConfig,
    pub bloom: BloomConfig,
    pub camera: CameraConfig,
    pub window: WindowConfig,
    /// Screen areas where clicks do not start a shockwave.
    pub reserved_regions: Vec<Region>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default().index(),
            seed: None,
            formation_radius: 25.0,
            shell: ShellConfig::default(),
            core: CoreConfig::default(),
            shockwave: ShockwaveConfig::default(),
            repulsion: RepulsionConfig::default(),
            bloom: BloomConfig::default(),
            camera: CameraConfig::default(),
            window: WindowConfig::default(),
            reserved_regions: Vec::new(),
        }
    }
}

fn require_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

fn require_finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

impl VisualizerConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The selected theme.
    pub fn palette(&self) -> Result<Palette, ConfigError> {
        Palette::from_index(self.palette)
    }

    /// Uniform-level parameters for the point shader.
    pub fn shading_params(&self) -> ShadingParams {
        ShadingParams {
            wave_speed: self.shockwave.speed,
            wave_thickness: self.shockwave.thickness,
            repel_radius: self.repulsion.radius,
            repel_strength: self.repulsion.strength,
            formation_radius: self.formation_radius,
        }
    }

    /// Bloom tuning. A disabled bloom has zero strength.
    pub fn bloom_params(&self) -> BloomParams {
        BloomParams {
            strength: if self.bloom.enabled { self.bloom.strength } else { 0.0 },
            radius: self.bloom.radius,
            threshold: self.bloom.threshold,
        }
    }

    /// Reject values the visualizer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.palette()?;

        if self.shell.count == 0 {
            return Err(ConfigError::TooFewParticles {
                formation: "shell",
                count: self.shell.count,
                minimum: 1,
            });
        }
        if self.core.count < 2 {
            return Err(ConfigError::TooFewParticles {
                formation: "core",
                count: self.core.count,
                minimum: 2,
            });
        }

        require_positive("formation_radius", self.formation_radius)?;
        require_positive("shell.radius", self.shell.radius)?;
        require_positive("shell.height", self.shell.height)?;
        require_positive("shell.displacement_strength", self.shell.displacement_strength)?;
        for rate in self.shell.rotation_rate {
            require_finite("shell.rotation_rate", rate)?;
        }

        require_positive("core.radius", self.core.radius)?;
        require_finite("core.spin_rate", self.core.spin_rate)?;
        require_finite("core.pulse_amplitude", self.core.pulse_amplitude)?;
        require_finite("core.pulse_speed", self.core.pulse_speed)?;
        require_finite("core.hue_speed", self.core.hue_speed)?;

        require_positive("shockwave.speed", self.shockwave.speed)?;
        require_positive("shockwave.thickness", self.shockwave.thickness)?;
        require_positive("repulsion.radius", self.repulsion.radius)?;
        require_finite("repulsion.strength", self.repulsion.strength)?;

        if !(self.bloom.strength >= 0.0 && self.bloom.strength.is_finite()) {
            return Err(ConfigError::InvalidParameter {
                name: "bloom.strength",
                value: self.bloom.strength,
            });
        }
        if !(self.bloom.radius >= 0.0 && self.bloom.radius.is_finite()) {
            return Err(ConfigError::InvalidParameter {
                name: "bloom.radius",
                value: self.bloom.radius,
            });
        }
        require_finite("bloom.threshold", self.bloom.threshold)?;

        let cam = &self.camera;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(ConfigError::InvalidParameter {
                name: "camera.fov_degrees",
                value: cam.fov_degrees,
            });
        }
        require_positive("camera.near", cam.near)?;
        if !(cam.far > cam.near && cam.far.is_finite()) {
            return Err(ConfigError::InvalidParameter {
                name: "camera.far",
                value: cam.far,
            });
        }
        require_positive("camera.min_distance", cam.min_distance)?;
        if !(cam.max_distance >= cam.min_distance && cam.max_distance.is_finite()) {
            return Err(ConfigError::InvalidParameter {
                name: "camera.max_distance",
                value: cam.max_distance,
            });
        }
        require_positive("camera.distance", cam.distance)?;
        require_positive("camera.rotate_speed", cam.rotate_speed)?;
        if !(cam.damping > 0.0 && cam.damping <= 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "camera.damping",
                value: cam.damping,
            });
        }

        Ok(())
    }
}
