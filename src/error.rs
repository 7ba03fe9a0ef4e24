//! Error types for the harness

use thiserror::Error;

/// Failures raised by the rendering capability while a tick is running.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Scene advance failed: {0}")]
    Advance(String),

    #[error("Scene draw failed: {0}")]
    Draw(String),

    #[error("Unbalanced restore: no saved transform on the stack")]
    UnbalancedRestore,

    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Top-level error for startup and the tick loop.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("No suitable graphics adapter found")]
    NoAdapter,

    #[error("Failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("Surface reports no supported formats")]
    NoSurfaceFormat,

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;
