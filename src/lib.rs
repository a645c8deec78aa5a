//! # Pulsar
//!
//! Interactive GPU particle formations: a noise-displaced cylindrical shell
//! wrapped around a pulsing Fibonacci-sphere core, animated on the GPU every
//! frame and answering the pointer with repulsion and click shockwaves.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pulsar::prelude::*;
//!
//! fn main() -> Result<(), VisualizerError> {
//!     Visualizer::new()
//!         .with_palette(1)
//!         .with_particle_counts(75_000, 10_000)
//!         .run()
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`noise`]: simplex noise and fbm, as CPU kernels and as WGSL built from
//!   the same constants.
//! - [`geometry`]: formation synthesis. [`ShellBuilder`] bakes fbm
//!   displacement into a cylinder once; [`CoreBuilder`] lays a Fibonacci
//!   lattice on a sphere and keeps an HSL cache for per-frame hue rotation.
//! - [`shading`]: the point shader (noise breathing, shockwave, pointer
//!   repulsion, soft glow), the bloom post-process, and CPU references of
//!   both.
//! - [`interaction`]: hover and click state, screen-to-world projection.
//! - [`scene`], [`gpu`], [`visualizer`]: the frame loop that ties them
//!   together.
//!
//! Formations are generated without a window, so everything above
//! [`gpu`] can be tested headless:
//!
//! ```ignore
//! use pulsar::prelude::*;
//! use rand::{rngs::SmallRng, SeedableRng};
//!
//! let mut rng = SmallRng::seed_from_u64(1);
//! let shell = ShellBuilder::new(5_000).build(Palette::Fire, &Simplex, &mut rng)?;
//! assert_eq!(shell.count(), 5_000);
//! ```
//!
//! ## Controls
//!
//! | Input | Effect |
//! |---|---|
//! | Move pointer | Particles near it are pushed away |
//! | Click | Shockwave from the clicked point |
//! | Drag | Orbit the camera |
//! | Wheel | Zoom |
//! | `1` `2` `3` | Neon, fire, aqua themes |
//! | `Esc` | Quit |

pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod input;
pub mod interaction;
pub mod noise;
pub mod palette;
pub mod ray;
pub mod scene;
pub mod shading;
pub mod time;
mod visualizer;

pub use bytemuck;
pub use camera::OrbitCamera;
pub use color::{Color, Hsl};
pub use config::{BloomConfig, VisualizerConfig};
pub use error::{ConfigError, GpuError, VisualizerError};
pub use geometry::{CoreBuilder, Formation, FormationKind, ParticleVertex, ShellBuilder};
pub use glam::{Vec2, Vec3, Vec4};
pub use interaction::{InteractionController, RayCaster, Region, Viewport};
pub use noise::{LaneSimplex, NoiseKernel, Simplex};
pub use palette::Palette;
pub use scene::Scene;
pub use shading::{BloomParams, FrameContext, ShaderUniforms, ShadingParams};
pub use visualizer::Visualizer;

/// Convenient imports for typical usage.
///
/// ```ignore
/// use pulsar::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ConfigError, CoreBuilder, Formation, NoiseKernel, Palette, ShellBuilder, Simplex, Vec2,
        Vec3, Visualizer, VisualizerConfig, VisualizerError,
    };
}
