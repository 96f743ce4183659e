//! Configuration system for the chunked planet terrain.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization. Out-of-range values are clamped by policy in
//! [`Config::sanitized`] rather than rejected.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    ComputeBackend, ComputeConfig, Config, CraterConfig, CurveKey, DebugConfig,
    MAX_DETAIL_LEVELS, MAX_RECURSION_LEVEL, MeshConfig, NoiseLayerConfig, SurfaceConfig,
    default_config_dir,
};
pub use error::ConfigError;
