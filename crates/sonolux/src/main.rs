//! Sonolux - Audio-Reactive Scene Demo
//!
//! Plays a music track and renders a small 3D scene whose lighting and
//! object scale react to the track's instantaneous loudness.

#![warn(missing_docs)]

mod config;
mod logging_setup;
mod window;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

use sonolux_audio::{list_output_devices, MusicPlayer, MusicTrack};
use sonolux_core::{AnimationClock, LoudnessCell, LoudnessEstimator};
use sonolux_render::{FrameParams, Scene, SceneAssets, WgpuBackend};

use config::AppConfig;
use window::WindowContext;
use winit::{
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
};

/// The running application.
struct App {
    // Dropped first: stopping the audio callback must precede the
    // teardown of the GPU resources below.
    _player: MusicPlayer,

    /// The main window and its surface.
    window: WindowContext,
    /// The render backend.
    backend: WgpuBackend,
    /// The scene renderer.
    scene: Scene,
    /// Frame clock driving all animation.
    clock: AnimationClock,
    /// Loudness published by the audio callback, read once per frame.
    loudness: Arc<LoudnessCell>,
    /// The user configuration, written back on exit.
    config: AppConfig,
    /// Timestamp of the previous rendered frame, for the frame limiter.
    last_frame: Instant,
}

impl App {
    /// Creates the backend, window, scene and audio playback.
    async fn new(event_loop: &ActiveEventLoop, config: AppConfig) -> Result<Self> {
        let backend = WgpuBackend::new(config.preferred_gpu.as_deref()).await?;
        let window = WindowContext::create(event_loop, &backend, &config)?;

        let assets = SceneAssets {
            wood_color: config.wood_color_path.clone(),
            wood_normal: config.wood_normal_path.clone(),
        };
        let scene = Scene::new(
            backend.device.clone(),
            &backend.queue,
            window.surface_config.format,
            window.surface_config.width,
            window.surface_config.height,
            &assets,
        )?;

        info!(
            "Available audio output devices: {:?}",
            list_output_devices()
        );

        let loudness = Arc::new(LoudnessCell::new());
        let track = MusicTrack::load(&config.music_path)
            .with_context(|| format!("Failed to load music track {:?}", config.music_path))?;
        let estimator = LoudnessEstimator::new(config.loudness.clone(), loudness.clone());
        let player = MusicPlayer::start(config.audio_device.as_deref(), track, estimator)?;
        info!("Playing on '{}'", player.device_name());

        let clock = AnimationClock::new(config.animation_rate);

        Ok(Self {
            _player: player,
            window,
            backend,
            scene,
            clock,
            loudness,
            config,
            last_frame: Instant::now(),
        })
    }

    /// Handles one event from the event loop.
    fn handle_event(
        &mut self,
        event: winit::event::Event<()>,
        event_loop: &ActiveEventLoop,
    ) -> Result<()> {
        match event {
            winit::event::Event::WindowEvent { event, window_id }
                if window_id == self.window.window.id() =>
            {
                match event {
                    WindowEvent::CloseRequested => {
                        info!("Close requested");
                        event_loop.exit();
                    }
                    WindowEvent::Resized(size) => {
                        self.window
                            .resize(&self.backend.device, size.width, size.height);
                        self.scene.resize(size.width, size.height);
                    }
                    WindowEvent::RedrawRequested => {
                        self.render()?;
                    }
                    _ => {}
                }
            }
            winit::event::Event::AboutToWait => {
                // Non-blocking frame limiter: skip the frame if it is too
                // early, re-checking immediately via Poll.
                event_loop.set_control_flow(ControlFlow::Poll);
                if let Some(target_fps) = self.config.target_fps {
                    let cap_fps = if target_fps <= 0.0 { 60.0 } else { target_fps };
                    let frame_target = Duration::from_secs_f64(1.0 / cap_fps as f64);
                    if self.last_frame.elapsed() < frame_target {
                        return Ok(());
                    }
                }

                self.render()?;
                self.last_frame = Instant::now();
            }
            winit::event::Event::LoopExiting => {
                info!("Application exiting, saving config...");

                let size = self.window.window.inner_size();
                self.config.window_width = size.width;
                self.config.window_height = size.height;
                if let Ok(position) = self.window.window.outer_position() {
                    self.config.window_x = position.x;
                    self.config.window_y = position.y;
                }

                if let Err(e) = self.config.save() {
                    error!("Failed to save user config: {}", e);
                } else {
                    info!("User config saved successfully.");
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Renders one frame: advance the clock, read the loudness cell,
    /// derive the frame parameters and draw.
    fn render(&mut self) -> Result<()> {
        self.clock.tick();
        let loudness = self.loudness.load();
        let params = FrameParams {
            light: self
                .config
                .lighting
                .light_levels(loudness, self.clock.angle()),
            pulse_scale: self.config.lighting.pulse_scale(loudness),
            angle: self.clock.angle(),
        };

        let surface_texture = match self.window.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.window.reconfigure(&self.backend.device);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(anyhow::anyhow!("Failed to acquire frame: {}", e)),
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.scene.render(&self.backend.queue, &view, &params);
        surface_texture.present();

        Ok(())
    }
}

/// The main entry point for the application.
fn main() -> Result<()> {
    let config = AppConfig::load();
    let _log_guard = logging_setup::init(&config.log)?;

    info!("==========================================");
    info!("===      Sonolux Session Started       ===");
    info!("==========================================");

    let event_loop = EventLoop::new()?;
    let mut app: Option<App> = None;

    #[allow(deprecated)]
    event_loop.run(move |event, elwt| {
        if app.is_none() {
            match pollster::block_on(App::new(elwt, config.clone())) {
                Ok(created) => {
                    app = Some(created);
                    info!("--- Entering Main Event Loop ---");
                }
                Err(e) => {
                    error!("Failed to start application: {:#}", e);
                    elwt.exit();
                    return;
                }
            }
        }

        if let Some(app_ref) = &mut app {
            if let Err(e) = app_ref.handle_event(event, elwt) {
                error!("Application error: {}", e);
                elwt.exit();
            }
        }
    })?;

    Ok(())
}
