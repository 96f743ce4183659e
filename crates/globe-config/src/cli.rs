//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{ComputeBackend, Config};

/// Terrain command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "globe", about = "Chunked LOD planet terrain")]
pub struct CliArgs {
    /// Chunk quadtree recursion depth (6·4^depth chunks).
    #[arg(long)]
    pub recursion_level: Option<u32>,

    /// Number of plane-template detail levels.
    #[arg(long)]
    pub detail_levels: Option<u8>,

    /// Batch evaluator backend.
    #[arg(long, value_enum)]
    pub backend: Option<ComputeBackend>,

    /// Surface seed (noise and crater placement).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(level) = args.recursion_level {
            self.mesh.chunk_recursion_level = level;
        }
        if let Some(levels) = args.detail_levels {
            self.mesh.max_detail_levels = levels;
        }
        if let Some(backend) = args.backend {
            self.compute.backend = backend;
        }
        if let Some(seed) = args.seed {
            self.surface.seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
