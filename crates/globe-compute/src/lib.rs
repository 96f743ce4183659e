//! Batch mesh evaluation: maps a bucket of same-level chunk bounds through
//! the shared plane template and the height/color function in one parallel
//! dispatch.
//!
//! Two backends share the [`BatchEvaluator`] contract: [`CpuEvaluator`] runs
//! on the rayon thread pool, [`GpuEvaluator`] dispatches a wgpu compute
//! shader and blocks on readback.

mod cpu;
mod error;
mod evaluator;
mod gpu;
mod gpu_types;

pub use cpu::CpuEvaluator;
pub use error::DispatchError;
pub use evaluator::{BatchEvaluator, BatchOutput, SurfaceBinding};
pub use gpu::{GpuEvaluator, WORKGROUP_SIZE};
pub use gpu_types::{
    DispatchParams, GpuChunkBounds, GpuNoiseLayer, SurfaceUniform, crater_data, dispatch_grid,
};
