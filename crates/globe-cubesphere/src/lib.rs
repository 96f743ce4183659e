//! Cube-sphere chunk topology: base cube faces, quadtree subdivision, and
//! the neighbor links used to stitch chunk borders.

mod bounds;
mod cube_face;
mod quadtree;
mod side;

pub use bounds::ChunkBounds;
pub use cube_face::CubeFace;
pub use quadtree::{ChunkNode, base_chunks, child_index, chunk_count, generate_chunks, subdivide};
pub use side::{ChunkBorder, Quadrant, Side};
