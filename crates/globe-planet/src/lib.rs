//! Planet-level terrain: the chunk array, the per-frame select, dispatch,
//! stitch, and combine pipeline, and the render and physics meshes it
//! produces.

mod chunk;
mod error;
mod stitch;
mod terrain;

pub use chunk::{Chunk, build_chunks};
pub use error::TerrainError;
pub use stitch::{BorderAuthority, border_authority, stitch_borders};
pub use terrain::{ChunkedTerrain, FrameStats};
