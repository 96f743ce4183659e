//! Procedural planet surface: layered simplex noise, seeded craters, and the
//! height/color function sampled at every terrain vertex.

mod crater;
mod heightmap;
mod surface;

pub use crater::{Crater, CraterProfile, crater_height, generate_craters, smooth_max, smooth_min};
pub use heightmap::LayeredNoise;
pub use surface::{LayeredNoiseSurface, SurfaceSample, SurfaceSampler, noise_seed};
