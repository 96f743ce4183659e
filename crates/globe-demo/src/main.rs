//! Headless terrain demo: moves a viewer along an inclined orbit and drives
//! the chunked planet pipeline every frame.
//!
//! Configuration is loaded from `config.ron` in the config directory and can
//! be overridden with CLI flags. Run with
//! `cargo run -p globe-demo -- --frames 240 --backend gpu`.

use std::f32::consts::TAU;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::{Quat, Vec3};
use globe_compute::{BatchEvaluator, CpuEvaluator, GpuEvaluator, SurfaceBinding};
use globe_config::{CliArgs, ComputeBackend, Config, default_config_dir};
use globe_mesh::PlaneTemplateCache;
use globe_planet::{ChunkedTerrain, TerrainError};
use tracing::{debug, error, info, warn};

/// Inclination of the orbit plane against the equator.
const ORBIT_TILT: f32 = 0.4;

#[derive(Parser, Debug)]
#[command(name = "globe-demo", about = "Orbit a chunked LOD planet and report pipeline statistics")]
struct DemoArgs {
    #[command(flatten)]
    cli: CliArgs,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Frames per full orbit.
    #[arg(long, default_value_t = 120)]
    orbit_frames: u32,

    /// Orbit radius in planet radii.
    #[arg(long, default_value_t = 2.5)]
    altitude: f32,

    /// Poll `config.ron` for changes every N frames (0 disables).
    #[arg(long, default_value_t = 0)]
    watch: u32,
}

/// How a backend run ended.
enum RunEnd {
    Finished,
    /// The reloaded config changed the template cache or the backend.
    Restart,
}

#[derive(Default)]
struct Totals {
    rebuilt_frames: u32,
    chunk_updates: usize,
    dispatches: usize,
    borders_stitched: usize,
    rebuild_time: Duration,
}

/// State shared across backend restarts.
struct Session {
    args: DemoArgs,
    config_dir: PathBuf,
    /// Config as read from disk, before CLI overrides.
    file_config: Config,
    config: Config,
    frame: u32,
    totals: Totals,
}

impl Session {
    /// Poll the config file and apply what can change in place. Returns
    /// whether the terrain has to be rebuilt from scratch.
    fn poll_config<E: SurfaceBinding>(&mut self, terrain: &mut ChunkedTerrain<E>) -> bool {
        let reloaded = match self.file_config.reload(&self.config_dir) {
            Ok(Some(config)) => config,
            Ok(None) => return false,
            Err(e) => {
                warn!("Config reload failed, keeping current settings: {e}");
                return false;
            }
        };
        info!("Config file changed");
        self.file_config = reloaded;
        let next = effective_config(&self.file_config, &self.args.cli);

        let restart = next.mesh.max_detail_levels != self.config.mesh.max_detail_levels
            || next.compute.backend != self.config.compute.backend;
        if !restart {
            if next.mesh != self.config.mesh {
                terrain.reconfigure(&next.mesh);
            }
            if next.surface != self.config.surface {
                terrain.rebind_surface(&next.surface);
            }
        }
        self.config = next;
        restart
    }
}

fn main() {
    let args = DemoArgs::parse();

    let config_dir = match args.cli.config.clone() {
        Some(dir) => dir,
        None => default_config_dir().unwrap_or_else(|e| {
            eprintln!("Warning: {e}, using ./globe");
            PathBuf::from("globe")
        }),
    };

    let file_config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Warning: failed to load config: {e}, using defaults");
        Config::default()
    });
    let config = effective_config(&file_config, &args.cli);

    let log_dir = config_dir.join("logs");
    globe_log::init_logging(Some(&log_dir), Some(&config.debug));
    info!("Config loaded from {}", config_dir.display());

    let mut session = Session {
        args,
        config_dir,
        file_config,
        config,
        frame: 0,
        totals: Totals::default(),
    };

    loop {
        match run_backend(&mut session) {
            Ok(RunEnd::Finished) => break,
            Ok(RunEnd::Restart) => info!("Rebuilding terrain for the new configuration"),
            Err(e) => {
                error!("Terrain pipeline failed: {e}");
                std::process::exit(1);
            }
        }
    }

    report_totals(&session);
}

fn effective_config(file_config: &Config, cli: &CliArgs) -> Config {
    let mut config = file_config.clone();
    config.apply_cli_overrides(cli);
    config.sanitized()
}

/// Build the configured backend and run frames until done or a restart is
/// needed. A GPU backend that cannot start falls back to the CPU.
fn run_backend(session: &mut Session) -> Result<RunEnd, TerrainError> {
    let templates = Arc::new(PlaneTemplateCache::new(session.config.mesh.max_detail_levels));
    info!(
        levels = templates.levels(),
        recursion = session.config.mesh.chunk_recursion_level,
        backend = ?session.config.compute.backend,
        "Building terrain"
    );

    if session.config.compute.backend == ComputeBackend::Gpu {
        match GpuEvaluator::new_blocking(Arc::clone(&templates), &session.config.surface, false) {
            Ok(evaluator) => {
                let mut terrain = ChunkedTerrain::new(evaluator, &session.config.mesh);
                return run_frames(&mut terrain, session);
            }
            Err(e) => warn!("GPU backend unavailable ({e}), falling back to CPU"),
        }
    }

    let evaluator = CpuEvaluator::from_config(templates, &session.config.surface);
    let mut terrain = ChunkedTerrain::new(evaluator, &session.config.mesh);
    run_frames(&mut terrain, session)
}

fn run_frames<E>(terrain: &mut ChunkedTerrain<E>, session: &mut Session) -> Result<RunEnd, TerrainError>
where
    E: BatchEvaluator + SurfaceBinding,
{
    // A fresh terrain has no meshes, so its first update always rebuilds.
    let mut force = true;
    while session.frame < session.args.frames {
        let view = orbit_position(session.frame, session.args.orbit_frames, session.args.altitude);

        let start = Instant::now();
        let stats = terrain.update(view, force)?;
        let elapsed = start.elapsed();
        force = false;

        let physics_triangles = terrain.physics_mesh(view).triangle_count();

        if stats.rebuilt {
            let totals = &mut session.totals;
            totals.rebuilt_frames += 1;
            totals.chunk_updates += stats.chunks_updated;
            totals.dispatches += stats.dispatches;
            totals.borders_stitched += stats.borders_stitched;
            totals.rebuild_time += elapsed;
            info!(
                frame = session.frame,
                chunks = stats.chunks_updated,
                dispatches = stats.dispatches,
                stitched = stats.borders_stitched,
                vertices = stats.render_vertices,
                physics_triangles,
                ms = elapsed.as_secs_f64() * 1000.0,
                "Terrain rebuilt"
            );
        } else {
            debug!(frame = session.frame, physics_triangles, "No LOD change");
        }

        session.frame += 1;

        let watch = session.args.watch;
        if watch > 0
            && session.frame % watch == 0
            && session.poll_config(terrain)
        {
            return Ok(RunEnd::Restart);
        }
    }

    let render = terrain.render_mesh();
    let vertex_bytes = size_of_val(render.vertices().as_slice());
    info!(
        chunks = terrain.chunks().len(),
        vertices = render.vertex_count(),
        triangles = render.triangle_count(),
        vertex_bytes,
        "Final render mesh"
    );
    Ok(RunEnd::Finished)
}

/// Viewer position for `frame` on a great circle inclined by [`ORBIT_TILT`].
fn orbit_position(frame: u32, orbit_frames: u32, altitude: f32) -> Vec3 {
    let angle = TAU * frame as f32 / orbit_frames.max(1) as f32;
    Quat::from_rotation_x(ORBIT_TILT) * Vec3::new(angle.cos(), 0.0, angle.sin()) * altitude
}

fn report_totals(session: &Session) {
    let totals = &session.totals;
    let average_ms = if totals.rebuilt_frames > 0 {
        totals.rebuild_time.as_secs_f64() * 1000.0 / f64::from(totals.rebuilt_frames)
    } else {
        0.0
    };
    info!(
        frames = session.frame,
        rebuilt_frames = totals.rebuilt_frames,
        chunk_updates = totals.chunk_updates,
        dispatches = totals.dispatches,
        borders_stitched = totals.borders_stitched,
        average_rebuild_ms = average_ms,
        "Run complete"
    );
    debug!("Terrain settings live in {}", session.config_dir.join("config.ron").display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_stays_at_altitude() {
        for frame in 0..16 {
            let p = orbit_position(frame, 16, 2.5);
            assert!((p.length() - 2.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_orbit_closes_after_full_period() {
        let start = orbit_position(0, 10, 3.0);
        let end = orbit_position(10, 10, 3.0);
        assert!(start.distance(end) < 1e-4);
    }

    #[test]
    fn test_cli_overrides_survive_sanitizing() {
        let cli = CliArgs {
            recursion_level: Some(2),
            seed: Some(9),
            ..Default::default()
        };
        let config = effective_config(&Config::default(), &cli);
        assert_eq!(config.mesh.chunk_recursion_level, 2);
        assert_eq!(config.surface.seed, 9);
    }

    #[test]
    fn test_demo_args_parse_flattened_cli() {
        let args = DemoArgs::parse_from(["globe-demo", "--frames", "5", "--backend", "gpu", "--watch", "2"]);
        assert_eq!(args.frames, 5);
        assert_eq!(args.watch, 2);
        assert_eq!(args.cli.backend, Some(ComputeBackend::Gpu));
    }
}
