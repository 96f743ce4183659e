//! Dispatch failures. Every variant is fatal to the frame that hit it.

/// Error type for batch evaluator construction and dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    /// Failed to request GPU device.
    #[error("failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// The template cache has no template for the requested level.
    #[error("no plane template for detail level {level}")]
    TemplateMissing { level: u8 },

    /// A dispatch buffer would exceed what the device can bind.
    #[error("{what} buffer needs {size} bytes, device limit is {limit}")]
    BufferTooLarge {
        what: &'static str,
        size: u64,
        limit: u64,
    },

    /// Mapping the readback buffer failed.
    #[error("failed to map readback buffer: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    /// The map callback was dropped without reporting a result.
    #[error("readback callback dropped before completion")]
    ReadbackDropped,

    /// Waiting on the device failed.
    #[error("device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),

    /// The backend produced a different number of vertices than requested.
    #[error("expected {expected} output vertices, got {actual}")]
    OutputMismatch { expected: usize, actual: usize },
}
