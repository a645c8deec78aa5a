//! Error types for pulsar.
//!
//! Configuration problems (bad palette index, degenerate particle counts,
//! unreadable config files) are reported as [`ConfigError`] at construction
//! time. GPU setup failures are [`GpuError`]. [`VisualizerError`] wraps
//! everything that can stop [`Visualizer::run`](crate::Visualizer::run).

use std::fmt;

/// Errors raised while validating configuration or synthesizing formations.
#[derive(Debug)]
pub enum ConfigError {
    /// Requested palette does not exist.
    PaletteOutOfRange {
        /// Index that was requested.
        index: usize,
        /// Number of palettes available.
        available: usize,
    },
    /// A formation was asked for fewer particles than it can be built with.
    TooFewParticles {
        /// Which formation ("shell" or "core").
        formation: &'static str,
        /// Requested count.
        count: u32,
        /// Smallest count that produces valid geometry.
        minimum: u32,
    },
    /// A numeric parameter is non-finite or outside its valid range.
    InvalidParameter {
        /// Parameter name as it appears in the config.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// Failed to read or write a config file.
    Io(std::io::Error),
    /// Config file is not valid JSON for [`VisualizerConfig`](crate::VisualizerConfig).
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::PaletteOutOfRange { index, available } => write!(
                f,
                "Palette index {} is out of range (expected 0..{})",
                index, available
            ),
            ConfigError::TooFewParticles {
                formation,
                count,
                minimum,
            } => write!(
                f,
                "The {} formation needs at least {} particles, got {}",
                formation, minimum, count
            ),
            ConfigError::InvalidParameter { name, value } => {
                write!(f, "Invalid value for `{}`: {}", name, value)
            }
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Errors that can occur during GPU initialization or readback.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// Failed to map buffer for reading.
    BufferMapping(String),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::BufferMapping(msg) => write!(f, "Failed to map GPU buffer: {}", msg),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can stop the visualizer.
#[derive(Debug)]
pub enum VisualizerError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for VisualizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisualizerError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            VisualizerError::Window(e) => write!(f, "Failed to create window: {}", e),
            VisualizerError::Gpu(e) => write!(f, "GPU error: {}", e),
            VisualizerError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for VisualizerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VisualizerError::EventLoop(e) => Some(e),
            VisualizerError::Window(e) => Some(e),
            VisualizerError::Gpu(e) => Some(e),
            VisualizerError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for VisualizerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        VisualizerError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for VisualizerError {
    fn from(e: winit::error::OsError) -> Self {
        VisualizerError::Window(e)
    }
}

impl From<GpuError> for VisualizerError {
    fn from(e: GpuError) -> Self {
        VisualizerError::Gpu(e)
    }
}

impl From<ConfigError> for VisualizerError {
    fn from(e: ConfigError) -> Self {
        VisualizerError::Config(e)
    }
}
