use globe_compute::DispatchError;

/// Error type for the per-frame terrain pipeline.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// A bucket dispatch failed; the frame is abandoned.
    #[error("batch dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}
