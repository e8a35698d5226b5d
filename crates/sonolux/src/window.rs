//! Window and surface context.
//!
//! The demo has exactly one window; this wraps the `winit` window
//! together with its `wgpu` surface and surface configuration.

use crate::config::AppConfig;
use anyhow::Result;
use sonolux_render::WgpuBackend;
use std::sync::Arc;
use tracing::info;
use winit::{event_loop::ActiveEventLoop, window::Window};

/// The main window, its surface and the surface configuration.
pub struct WindowContext {
    /// The `winit` window.
    pub window: Arc<Window>,
    /// The `wgpu` surface associated with the window.
    pub surface: wgpu::Surface<'static>,
    /// The configuration for the `wgpu` surface.
    pub surface_config: wgpu::SurfaceConfiguration,
}

impl WindowContext {
    /// Creates the window with the saved geometry and configures its
    /// surface.
    pub fn create(
        event_loop: &ActiveEventLoop,
        backend: &WgpuBackend,
        config: &AppConfig,
    ) -> Result<Self> {
        let attributes = Window::default_attributes()
            .with_title("Sonolux - Crab Dance")
            .with_inner_size(winit::dpi::PhysicalSize::new(
                config.window_width,
                config.window_height,
            ))
            .with_position(winit::dpi::PhysicalPosition::new(
                config.window_x,
                config.window_y,
            ));

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();

        let surface = backend.create_surface(window.clone())?;
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: backend.surface_format(),
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&backend.device, &surface_config);

        info!(
            "Created main window at {}x{}",
            surface_config.width, surface_config.height
        );

        Ok(Self {
            window,
            surface,
            surface_config,
        })
    }

    /// Reconfigures the surface for a new window size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(device, &self.surface_config);
    }

    /// Reconfigures the surface with its current settings, used to
    /// recover a lost or outdated surface.
    pub fn reconfigure(&self, device: &wgpu::Device) {
        self.surface.configure(device, &self.surface_config);
    }
}
