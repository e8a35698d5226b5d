//! Rendering backend setup.

use crate::{RenderError, Result};
use std::sync::Arc;
use tracing::info;

/// wgpu instance, device and queue for the demo's single window.
pub struct WgpuBackend {
    /// The wgpu instance surfaces are created from.
    pub instance: Arc<wgpu::Instance>,
    /// The logical device.
    pub device: Arc<wgpu::Device>,
    /// The device's queue.
    pub queue: Arc<wgpu::Queue>,
    /// Info about the selected adapter.
    pub adapter_info: wgpu::AdapterInfo,
}

impl WgpuBackend {
    /// Create a new wgpu backend.
    ///
    /// Tries every backend except GL first; GL initialization can panic on
    /// headless systems where EGL/GLX is probed eagerly. GL is used as the
    /// fallback for older hardware when the primary attempt fails.
    pub async fn new(preferred_gpu: Option<&str>) -> Result<Self> {
        let safe_backends = wgpu::Backends::all() & !wgpu::Backends::GL;
        let primary = Self::new_with_options(safe_backends, preferred_gpu).await;
        if primary.is_ok() {
            return primary;
        }

        info!("Primary backend initialization failed, attempting GL fallback...");
        Self::new_with_options(wgpu::Backends::GL, preferred_gpu).await
    }

    /// Create a new wgpu backend restricted to the given backend set.
    pub async fn new_with_options(
        backends: wgpu::Backends,
        preferred_gpu: Option<&str>,
    ) -> Result<Self> {
        info!("Initializing wgpu backend");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let mut adapter = None;

        if let Some(gpu_name) = preferred_gpu {
            if !gpu_name.is_empty() {
                for a in instance.enumerate_adapters(backends) {
                    if a.get_info().name == gpu_name {
                        info!("Found preferred adapter: {}", gpu_name);
                        adapter = Some(a);
                        break;
                    }
                }
                if adapter.is_none() {
                    tracing::warn!(
                        "Preferred GPU '{}' not found, falling back to auto-selection.",
                        gpu_name
                    );
                }
            }
        }

        if adapter.is_none() {
            // Manual selection to prioritize Discrete > Integrated > CPU
            let mut best_adapter = None;
            let mut best_score = -1;

            for a in instance.enumerate_adapters(backends) {
                let score = match a.get_info().device_type {
                    wgpu::DeviceType::DiscreteGpu => 3,
                    wgpu::DeviceType::IntegratedGpu => 2,
                    wgpu::DeviceType::VirtualGpu => 1,
                    wgpu::DeviceType::Cpu => 0,
                    wgpu::DeviceType::Other => 0,
                };
                if score > best_score {
                    best_score = score;
                    best_adapter = Some(a);
                }
            }

            if let Some(a) = best_adapter {
                let info = a.get_info();
                info!(
                    "Auto-selected best adapter: {} ({:?})",
                    info.name, info.device_type
                );
                adapter = Some(a);
            }
        }

        if adapter.is_none() {
            adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .ok();
        }

        let adapter =
            adapter.ok_or_else(|| RenderError::DeviceError("No adapter found".to_string()))?;

        let adapter_info = adapter.get_info();
        info!(
            "Selected adapter: {} ({:?})",
            adapter_info.name, adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Sonolux Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                ..Default::default()
            })
            .await
            .map_err(|e: wgpu::RequestDeviceError| RenderError::DeviceError(e.to_string()))?;

        info!("Device created successfully");

        Ok(Self {
            instance: Arc::new(instance),
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_info,
        })
    }

    /// Create a surface for the given window.
    pub fn create_surface(
        &self,
        window: Arc<winit::window::Window>,
    ) -> Result<wgpu::Surface<'static>> {
        self.instance
            .create_surface(window)
            .map_err(|e| RenderError::SurfaceError(format!("Failed to create surface: {}", e)))
    }

    /// Get adapter info
    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// The surface format the scene renders into.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        wgpu::TextureFormat::Bgra8UnormSrgb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_creation() {
        pollster::block_on(async {
            let backend = WgpuBackend::new(None).await;
            if backend.is_err() {
                // Skipping on CI/headless systems without GPU support.
                eprintln!("SKIP: no usable GPU backend available");
                return;
            }

            if let Ok(backend) = backend {
                println!("Backend: {:?}", backend.adapter_info);
            }
        });
    }

    #[test]
    fn test_initialization_does_not_panic() {
        pollster::block_on(async {
            match WgpuBackend::new(Some("Not A Real GPU")).await {
                Ok(b) => println!("Backend init success: {:?}", b.adapter_info),
                Err(e) => println!("Backend init failed gracefully: {}", e),
            }
        });
    }
}
