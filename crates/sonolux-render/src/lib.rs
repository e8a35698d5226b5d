//! Sonolux Render - Scene Rendering
//!
//! This crate provides the rendering side of Sonolux:
//! - wgpu backend selection and device setup
//! - Texture loading with solid-pixel fallbacks
//! - Procedural primitive meshes (plane, sphere, cone)
//! - The Blinn-Phong scene renderer consuming per-frame light levels

#![warn(missing_docs)]

use thiserror::Error;

pub mod backend;
pub mod mesh;
pub mod scene;
pub mod texture;

pub use backend::WgpuBackend;
pub use mesh::{GpuMesh, Mesh, Vertex};
pub use scene::{FrameParams, Scene, SceneAssets};
pub use texture::SceneTexture;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Adapter or device acquisition failed.
    #[error("Device error: {0}")]
    DeviceError(String),

    /// Surface creation or presentation failed.
    #[error("Surface error: {0}")]
    SurfaceError(String),
}

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;
