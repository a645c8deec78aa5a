//! The windowed visualizer.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::camera::OrbitCamera;
use crate::config::VisualizerConfig;
use crate::error::VisualizerError;
use crate::gpu::Renderer;
use crate::input::{Input, Intent};
use crate::interaction::{ClickOutcome, Region, Viewport};
use crate::scene::Scene;
use crate::shading::ViewState;
use crate::time::FrameClock;

/// Visualizer builder.
///
/// Use method chaining to configure, then call `.run()` to open the window.
///
/// ```ignore
/// Visualizer::new()
///     .with_palette(2)
///     .with_particle_counts(40_000, 8_000)
///     .run()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Visualizer {
    config: VisualizerConfig,
}

impl Visualizer {
    /// A visualizer with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: VisualizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Select the starting theme by index.
    pub fn with_palette(mut self, index: usize) -> Self {
        self.config.palette = index;
        self
    }

    pub fn with_particle_counts(mut self, shell: u32, core: u32) -> Self {
        self.config.shell.count = shell;
        self.config.core.count = core;
        self
    }

    /// Make formation synthesis reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Turn the bloom post-process on or off.
    pub fn with_bloom(mut self, enabled: bool) -> Self {
        self.config.bloom.enabled = enabled;
        self
    }

    /// Add a screen area where clicks do not start a shockwave.
    pub fn with_reserved_region(mut self, region: Region) -> Self {
        self.config.reserved_regions.push(region);
        self
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Build the scene, open the window and run until it closes.
    ///
    /// Configuration is validated before any window is created.
    pub fn run(self) -> Result<(), VisualizerError> {
        let scene = Scene::new(self.config)?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(scene);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct App {
    scene: Scene,
    camera: OrbitCamera,
    viewport: Viewport,
    input: Input,
    clock: FrameClock,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    error: Option<VisualizerError>,
}

impl App {
    fn new(scene: Scene) -> Self {
        let window = &scene.config().window;
        let viewport = Viewport::new(window.width, window.height, 1.0);
        let camera = OrbitCamera::from_config(&scene.config().camera, viewport.aspect());
        Self {
            scene,
            camera,
            viewport,
            input: Input::new(),
            clock: FrameClock::new(),
            window: None,
            renderer: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: VisualizerError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn set_surface_size(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        self.viewport = Viewport::new(size.width, size.height, scale_factor);
        self.camera.set_aspect(self.viewport.aspect());
    }

    fn apply_intents(&mut self, event_loop: &ActiveEventLoop) {
        let intents: Vec<Intent> = self.input.drain().collect();
        for intent in intents {
            match intent {
                Intent::PointerMoved(position) => self.scene.pointer_moved(position, &self.viewport),
                Intent::PointerLeft => self.scene.pointer_left(),
                Intent::Click(position) => {
                    if let ClickOutcome::Started(wave) =
                        self.scene.click(position, &self.viewport, &self.camera)
                    {
                        log::debug!("shockwave at {:?}, t={:.2}", wave.origin, wave.start_time);
                    }
                }
                Intent::Orbit(delta) => self.camera.orbit(delta),
                Intent::Zoom(lines) => self.camera.zoom(lines),
                Intent::SelectPalette(index) => {
                    if let Err(e) = self.scene.set_palette(index) {
                        log::warn!("palette switch failed: {}", e);
                    }
                }
                Intent::Exit => event_loop.exit(),
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (time, delta) = self.clock.tick();
        self.camera.update();
        let frame = self.scene.advance(time, delta, &self.camera);

        // Minimized: nothing to draw into, and the point size divides by the viewport
        if self.viewport.is_empty() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            return;
        }

        let view = ViewState::from_camera(&self.camera, &self.viewport);
        if let Some(renderer) = &mut self.renderer {
            match renderer.render(&self.scene, &frame, &view) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("GPU out of memory");
                    event_loop.exit();
                }
                Err(e) => log::warn!("frame skipped: {:?}", e),
            }
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let config = &self.scene.config().window;
        let window_attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        self.set_surface_size(window.inner_size(), window.scale_factor());

        match pollster::block_on(Renderer::new(Arc::clone(&window), &self.scene)) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => return self.fail(event_loop, e.into()),
        }
        log::info!(
            "window open at {}x{} (scale {})",
            self.viewport.width,
            self.viewport.height,
            self.viewport.scale_factor
        );

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
                self.set_surface_size(physical_size, self.viewport.scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.viewport.scale_factor = scale_factor;
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => {
                self.input.handle_event(&other);
                self.apply_intents(event_loop);
            }
        }
    }
}
