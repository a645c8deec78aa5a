//! Host-side scene state.
//!
//! The [`Scene`] owns both formations, the interaction controller and the
//! per-frame core color buffer. It knows nothing about the GPU: the renderer
//! watches [`Scene::generation`] to learn when formations were replaced and
//! reads [`Scene::core_colors`] every frame.

use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::VisualizerConfig;
use crate::error::ConfigError;
use crate::geometry::{CoreBuilder, Formation, ShellBuilder};
use crate::interaction::{ClickOutcome, InteractionController, RayCaster, Viewport};
use crate::noise::Simplex;
use crate::palette::Palette;
use crate::shading::{FrameContext, ShadingParams};

/// Both formations plus everything that changes them between frames.
#[derive(Debug)]
pub struct Scene {
    config: VisualizerConfig,
    palette: Palette,
    shell: Arc<Formation>,
    core: Arc<Formation>,
    core_colors: Vec<[f32; 3]>,
    generation: u64,
    controller: InteractionController,
    rng: SmallRng,
    time: f32,
    frame: u64,
}

impl Scene {
    /// Validate `config` and synthesize the initial formations.
    pub fn new(config: VisualizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let palette = config.palette()?;

        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let (shell, core) = synthesize(&config, palette, &mut rng)?;
        log::info!(
            "scene ready: {} palette, {} shell + {} core particles",
            palette.name(),
            shell.count(),
            core.count()
        );

        let core_colors = core.colors().to_vec();
        let controller = InteractionController::new(config.reserved_regions.clone());

        Ok(Self {
            config,
            palette,
            shell: Arc::new(shell),
            core: Arc::new(core),
            core_colors,
            generation: 0,
            controller,
            rng,
            time: 0.0,
            frame: 0,
        })
    }

    /// Replace both formations with freshly synthesized ones in `index`'s
    /// theme.
    ///
    /// Both new formations are built before either is swapped in, so on error
    /// the current ones stay. Previously handed-out `Arc`s keep their data.
    pub fn set_palette(&mut self, index: usize) -> Result<(), ConfigError> {
        let palette = Palette::from_index(index)?;
        let (shell, core) = synthesize(&self.config, palette, &mut self.rng)?;

        self.shell = Arc::new(shell);
        self.core = Arc::new(core);
        self.core_colors.clear();
        self.core_colors.resize(self.core.hsl_cache().len(), [0.0; 3]);
        self.core
            .recolor_into(self.time, self.config.core.hue_speed, &mut self.core_colors);

        self.palette = palette;
        self.generation += 1;
        log::info!("switched to {} palette (generation {})", palette.name(), self.generation);
        Ok(())
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn shell(&self) -> &Arc<Formation> {
        &self.shell
    }

    pub fn core(&self) -> &Arc<Formation> {
        &self.core
    }

    /// Hue-rotated core colors as of the last [`advance`](Self::advance).
    pub fn core_colors(&self) -> &[[f32; 3]] {
        &self.core_colors
    }

    /// Bumped every time the formations are replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn shading_params(&self) -> ShadingParams {
        self.config.shading_params()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// Scene time as of the last advance.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn pointer_moved(&mut self, physical: Vec2, viewport: &Viewport) {
        self.controller.pointer_moved(physical, viewport);
    }

    pub fn pointer_left(&mut self) {
        self.controller.pointer_left();
    }

    /// Start a shockwave at the current scene time.
    pub fn click(
        &mut self,
        physical: Vec2,
        viewport: &Viewport,
        caster: &impl RayCaster,
    ) -> ClickOutcome {
        self.controller.click(physical, viewport, self.time, caster)
    }

    /// Step to `time`: re-project the pointer, rotate core hues and
    /// capture the frame's interaction state.
    pub fn advance(&mut self, time: f32, delta: f32, caster: &impl RayCaster) -> FrameContext {
        self.time = time;
        self.frame += 1;
        self.controller.update(caster);
        self.core
            .recolor_into(time, self.config.core.hue_speed, &mut self.core_colors);

        FrameContext {
            time,
            delta,
            frame: self.frame,
            interaction: self.controller.snapshot(),
        }
    }

    /// Shell tumble at `time`.
    pub fn shell_model(&self, time: f32) -> Mat4 {
        let [x, y, z] = self.config.shell.rotation_rate.map(|rate| rate * time);
        Mat4::from_euler(EulerRot::XYZ, x, y, z)
    }

    /// Core spin and breathing scale at `time`.
    pub fn core_model(&self, time: f32) -> Mat4 {
        let core = &self.config.core;
        let scale = 1.0 + core.pulse_amplitude * (core.pulse_speed * time).sin();
        Mat4::from_scale_rotation_translation(
            Vec3::splat(scale),
            Quat::from_rotation_y(core.spin_rate * time),
            Vec3::ZERO,
        )
    }
}

fn synthesize(
    config: &VisualizerConfig,
    palette: Palette,
    rng: &mut SmallRng,
) -> Result<(Formation, Formation), ConfigError> {
    let shell = ShellBuilder::new(config.shell.count)
        .with_radius(config.shell.radius)
        .with_height(config.shell.height)
        .with_displacement_strength(config.shell.displacement_strength)
        .build(palette, &Simplex, rng)?;
    let core = CoreBuilder::new(config.core.count)
        .with_radius(config.core.radius)
        .build(palette, rng)?;
    Ok((shell, core))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FormationKind;
    use crate::ray::Ray;

    struct DownCaster;

    impl RayCaster for DownCaster {
        fn eye(&self) -> Vec3 {
            Vec3::new(0.0, 10.0, 0.0)
        }

        fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
            Ray::new(Vec3::new(ndc.x, 10.0, -ndc.y), Vec3::NEG_Y)
        }
    }

    fn small_config() -> VisualizerConfig {
        let mut config = VisualizerConfig::default();
        config.seed = Some(7);
        config.shell.count = 2_000;
        config.core.count = 500;
        config
    }

    fn mean_color(colors: &[[f32; 3]]) -> Vec3 {
        colors.iter().map(|c| Vec3::from(*c)).sum::<Vec3>() / colors.len() as f32
    }

    #[test]
    fn test_new_builds_both_formations() {
        let scene = Scene::new(small_config()).unwrap();
        assert_eq!(scene.shell().kind(), FormationKind::Shell);
        assert_eq!(scene.core().kind(), FormationKind::Core);
        assert_eq!(scene.shell().count(), 2_000);
        assert_eq!(scene.core().count(), 500);
        assert_eq!(scene.core_colors().len(), 500);
        assert_eq!(scene.palette(), Palette::Fire);
        assert_eq!(scene.generation(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config();
        config.core.count = 1;
        assert!(Scene::new(config).is_err());
    }

    #[test]
    fn test_set_palette_swaps_without_mutating_previous() {
        let mut scene = Scene::new(small_config()).unwrap();
        let old_shell = Arc::clone(scene.shell());
        let old_colors = old_shell.colors().to_vec();

        scene.set_palette(2).unwrap();
        assert_eq!(scene.generation(), 1);
        assert_eq!(scene.palette(), Palette::Aqua);
        assert!(!Arc::ptr_eq(&old_shell, scene.shell()));
        assert_eq!(old_shell.colors(), old_colors.as_slice());
        assert_eq!(old_shell.palette(), Palette::Fire);
    }

    #[test]
    fn test_same_palette_twice_is_statistically_stable() {
        let mut scene = Scene::new(small_config()).unwrap();
        scene.set_palette(0).unwrap();
        let first = Arc::clone(scene.shell());
        scene.set_palette(0).unwrap();
        let second = Arc::clone(scene.shell());

        assert_eq!(first.count(), second.count());
        assert!(!Arc::ptr_eq(&first, &second));
        let drift = (mean_color(first.colors()) - mean_color(second.colors())).abs();
        assert!(drift.max_element() < 0.05, "mean color drift {:?}", drift);
    }

    #[test]
    fn test_bad_palette_keeps_current() {
        let mut scene = Scene::new(small_config()).unwrap();
        assert!(scene.set_palette(3).is_err());
        assert_eq!(scene.generation(), 0);
        assert_eq!(scene.palette(), Palette::Fire);
    }

    #[test]
    fn test_advance_without_interaction_is_neutral() {
        let mut scene = Scene::new(small_config()).unwrap();
        let frame = scene.advance(0.0, 0.0, &DownCaster);
        assert_eq!(frame.frame, 1);
        assert_eq!(frame.interaction.pointer, None);
        assert_eq!(frame.interaction.shockwave, None);
    }

    #[test]
    fn test_advance_rotates_core_hues() {
        let mut scene = Scene::new(small_config()).unwrap();
        scene.advance(0.0, 0.0, &DownCaster);
        let before = scene.core_colors().to_vec();
        scene.advance(1.0, 1.0, &DownCaster);
        assert_ne!(scene.core_colors(), before.as_slice());
        // A full hue turn later the colors come back
        scene.advance(1.0 / 0.15, 0.0, &DownCaster);
        for (a, b) in scene.core_colors().iter().zip(&before) {
            for i in 0..3 {
                assert!((a[i] - b[i]).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_click_uses_scene_time() {
        let mut scene = Scene::new(small_config()).unwrap();
        let viewport = Viewport::new(200, 200, 1.0);
        scene.advance(1.5, 0.016, &DownCaster);
        match scene.click(Vec2::new(100.0, 100.0), &viewport, &DownCaster) {
            ClickOutcome::Started(wave) => {
                assert_eq!(wave.start_time, 1.5);
                assert!(wave.origin.length() < 1e-4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_model_transforms() {
        let scene = Scene::new(small_config()).unwrap();
        assert_eq!(scene.shell_model(0.0), Mat4::IDENTITY);

        let core = scene.core_model(0.0);
        assert!(core.abs_diff_eq(Mat4::IDENTITY, 1e-6));

        // Peak breathing at sin = 1
        let t = std::f32::consts::FRAC_PI_2 / 2.5;
        let scaled = scene.core_model(t).transform_vector3(Vec3::Y);
        assert!((scaled.length() - 1.1).abs() < 1e-4);
    }
}
