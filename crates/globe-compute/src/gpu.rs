//! wgpu compute backend.
//!
//! Template uv buffers live for the evaluator's lifetime, one per detail
//! level. Everything a dispatch needs beyond that (chunk bounds, outputs,
//! staging) is allocated per call and released once the readback returns.

use std::sync::{Arc, mpsc};

use glam::{Vec3, Vec4};
use globe_config::SurfaceConfig;
use globe_cubesphere::ChunkBounds;
use globe_mesh::PlaneTemplateCache;
use globe_terrain::generate_craters;
use tracing::{debug, info};
use wgpu::util::DeviceExt;

use crate::gpu_types::{
    DispatchParams, GpuChunkBounds, GpuNoiseLayer, SurfaceUniform, crater_data, dispatch_grid,
};
use crate::{BatchEvaluator, BatchOutput, DispatchError, SurfaceBinding};

/// Invocations per workgroup; must match `@workgroup_size` in the kernel.
pub const WORKGROUP_SIZE: u32 = 64;

const KERNEL_SOURCE: &str = include_str!("terrain_kernel.wgsl");

const OUTPUT_STRIDE: u64 = std::mem::size_of::<[f32; 4]>() as u64;

/// Surface parameter buffers bound at slots 5 through 7.
struct SurfaceBuffers {
    uniform: wgpu::Buffer,
    layers: wgpu::Buffer,
    craters: wgpu::Buffer,
}

impl SurfaceBuffers {
    fn new(device: &wgpu::Device, config: &SurfaceConfig) -> Self {
        let craters = generate_craters(&config.craters, config.seed);
        let uniform = SurfaceUniform::new(config, craters.len() as u32);

        Self {
            uniform: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("terrain-surface-uniform"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            }),
            layers: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("terrain-noise-layers"),
                contents: bytemuck::cast_slice(&GpuNoiseLayer::stack(config)),
                usage: wgpu::BufferUsages::UNIFORM,
            }),
            craters: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("terrain-craters"),
                contents: bytemuck::cast_slice(&crater_data(&craters)),
                usage: wgpu::BufferUsages::STORAGE,
            }),
        }
    }
}

/// Evaluates buckets with one compute dispatch each, blocking on readback.
pub struct GpuEvaluator {
    templates: Arc<PlaneTemplateCache>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    template_buffers: Vec<wgpu::Buffer>,
    surface: SurfaceBuffers,
}

impl GpuEvaluator {
    /// Acquire an adapter and device, then build the pipeline and upload
    /// every template in `templates`.
    ///
    /// `force_fallback_adapter` selects a software adapter when available,
    /// which headless tests rely on.
    pub async fn request(
        templates: Arc<PlaneTemplateCache>,
        surface: &SurfaceConfig,
        force_fallback_adapter: bool,
    ) -> Result<Self, DispatchError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter,
            })
            .await
            .map_err(|_| DispatchError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        info!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            device_type = ?adapter_info.device_type,
            "Selected compute adapter"
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("globe-compute-device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self::from_device(device, queue, templates, surface))
    }

    /// Blocking wrapper around [`GpuEvaluator::request`] using `pollster`.
    pub fn new_blocking(
        templates: Arc<PlaneTemplateCache>,
        surface: &SurfaceConfig,
        force_fallback_adapter: bool,
    ) -> Result<Self, DispatchError> {
        pollster::block_on(Self::request(templates, surface, force_fallback_adapter))
    }

    /// Build on an existing device, e.g. one shared with a renderer.
    pub fn from_device(
        device: wgpu::Device,
        queue: wgpu::Queue,
        templates: Arc<PlaneTemplateCache>,
        surface: &SurfaceConfig,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("terrain-kernel"),
            source: wgpu::ShaderSource::Wgsl(KERNEL_SOURCE.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain-kernel-bgl"),
            entries: &[
                uniform_entry(0),
                storage_entry(1, true),
                storage_entry(2, true),
                storage_entry(3, false),
                storage_entry(4, false),
                uniform_entry(5),
                uniform_entry(6),
                storage_entry(7, true),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("terrain-kernel-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("terrain-kernel-pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let template_buffers = templates
            .iter()
            .map(|template| {
                let uvs: Vec<[f32; 2]> = template.uvs().iter().map(|uv| uv.to_array()).collect();
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("terrain-template-uvs"),
                    contents: bytemuck::cast_slice(&uvs),
                    usage: wgpu::BufferUsages::STORAGE,
                })
            })
            .collect();
        debug!(levels = templates.levels(), "Uploaded plane templates");

        let surface = SurfaceBuffers::new(&device, surface);

        Self {
            templates,
            device,
            queue,
            pipeline,
            bind_group_layout,
            template_buffers,
            surface,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    fn read_back(&self, staging: &wgpu::Buffer) -> Result<Vec<[f32; 4]>, DispatchError> {
        let slice = staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })?;
        rx.recv().map_err(|_| DispatchError::ReadbackDropped)??;

        let mapped = slice.get_mapped_range();
        let values = bytemuck::cast_slice::<u8, [f32; 4]>(&mapped).to_vec();
        drop(mapped);
        staging.unmap();
        Ok(values)
    }
}

impl BatchEvaluator for GpuEvaluator {
    fn templates(&self) -> &Arc<PlaneTemplateCache> {
        &self.templates
    }

    fn evaluate(&self, level: u8, bounds: &[ChunkBounds]) -> Result<BatchOutput, DispatchError> {
        let (template, template_buffer) = self
            .templates
            .get(level)
            .zip(self.template_buffers.get(usize::from(level)))
            .ok_or(DispatchError::TemplateMissing { level })?;
        let per_chunk = template.vertex_count();
        if bounds.is_empty() {
            return BatchOutput::new(Vec::new(), Vec::new(), per_chunk);
        }

        let limits = self.device.limits();
        let binding_limit = u64::from(limits.max_storage_buffer_binding_size);
        let total = per_chunk * bounds.len();
        let output_size = total as u64 * OUTPUT_STRIDE;
        let chunk_data: Vec<GpuChunkBounds> = bounds.iter().map(GpuChunkBounds::from).collect();
        check_size("output", output_size, binding_limit)?;
        check_size(
            "chunk bounds",
            std::mem::size_of_val(chunk_data.as_slice()) as u64,
            binding_limit,
        )?;
        check_size("staging", output_size * 2, limits.max_buffer_size)?;
        let invocations = u32::try_from(total).map_err(|_| DispatchError::BufferTooLarge {
            what: "invocation",
            size: total as u64,
            limit: u64::from(u32::MAX),
        })?;

        let (groups_x, groups_y, row_width) = dispatch_grid(
            invocations,
            WORKGROUP_SIZE,
            limits.max_compute_workgroups_per_dimension,
        );
        let params = DispatchParams {
            template_count: per_chunk as u32,
            chunk_count: bounds.len() as u32,
            total: invocations,
            row_width,
        };

        let params_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain-dispatch-params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let chunk_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain-chunk-bounds"),
            contents: bytemuck::cast_slice(&chunk_data),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let output = |label: &str| {
            self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: output_size,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            })
        };
        let positions_buffer = output("terrain-out-positions");
        let colors_buffer = output("terrain-out-colors");
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("terrain-staging"),
            size: output_size * 2,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("terrain-kernel-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                buffer_entry(0, &params_buffer),
                buffer_entry(1, template_buffer),
                buffer_entry(2, &chunk_buffer),
                buffer_entry(3, &positions_buffer),
                buffer_entry(4, &colors_buffer),
                buffer_entry(5, &self.surface.uniform),
                buffer_entry(6, &self.surface.layers),
                buffer_entry(7, &self.surface.craters),
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("terrain-dispatch"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("terrain-kernel-pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        encoder.copy_buffer_to_buffer(&positions_buffer, 0, &staging, 0, output_size);
        encoder.copy_buffer_to_buffer(&colors_buffer, 0, &staging, output_size, output_size);
        self.queue.submit(Some(encoder.finish()));

        let raw = self.read_back(&staging)?;
        if raw.len() != total * 2 {
            return Err(DispatchError::OutputMismatch {
                expected: total * 2,
                actual: raw.len(),
            });
        }
        let (raw_positions, raw_colors) = raw.split_at(total);
        let positions: Vec<Vec3> = raw_positions
            .iter()
            .map(|p| Vec4::from_array(*p).truncate())
            .collect();
        let colors = raw_colors.iter().copied().map(Vec4::from_array).collect();

        debug!(
            level,
            chunks = bounds.len(),
            vertices = total,
            groups_x,
            groups_y,
            "GPU bucket evaluated"
        );
        BatchOutput::new(positions, colors, per_chunk)
    }
}

impl SurfaceBinding for GpuEvaluator {
    fn bind_surface(&mut self, config: &SurfaceConfig) {
        self.surface = SurfaceBuffers::new(&self.device, config);
    }
}

fn check_size(what: &'static str, size: u64, limit: u64) -> Result<(), DispatchError> {
    if size > limit {
        return Err(DispatchError::BufferTooLarge { what, size, limit });
    }
    Ok(())
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn buffer_entry(binding: u32, buffer: &wgpu::Buffer) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: buffer.as_entire_binding(),
    }
}

#[cfg(test)]
mod tests {
    use globe_config::{CraterConfig, NoiseLayerConfig};
    use globe_cubesphere::generate_chunks;

    use super::*;
    use crate::CpuEvaluator;

    fn flat_surface() -> SurfaceConfig {
        let flat = NoiseLayerConfig {
            elevation: 0.0,
            ..Default::default()
        };
        SurfaceConfig {
            shape: flat,
            detail: flat,
            ridge: flat,
            ocean: flat,
            color: flat,
            craters: CraterConfig {
                count: 0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Headless CI may have no adapter at all; those runs skip.
    fn evaluator(templates: &Arc<PlaneTemplateCache>, config: &SurfaceConfig) -> Option<GpuEvaluator> {
        GpuEvaluator::new_blocking(Arc::clone(templates), config, true).ok()
    }

    #[test]
    fn test_flat_surface_matches_cpu_backend() {
        let templates = Arc::new(PlaneTemplateCache::new(3));
        let config = flat_surface();
        let Some(gpu) = evaluator(&templates, &config) else {
            return;
        };
        let cpu = CpuEvaluator::from_config(Arc::clone(&templates), &config);

        let bounds: Vec<_> = generate_chunks(1).iter().map(|c| c.bounds).collect();
        let gpu_out = gpu.evaluate(2, &bounds).unwrap();
        let cpu_out = cpu.evaluate(2, &bounds).unwrap();

        assert_eq!(gpu_out.chunk_count(), bounds.len());
        for (g, c) in gpu_out.positions.iter().zip(&cpu_out.positions) {
            assert!((*g - *c).length() < 1e-5, "{g} vs {c}");
        }
        for (g, c) in gpu_out.colors.iter().zip(&cpu_out.colors) {
            assert!((*g - *c).length() < 1e-5, "{g} vs {c}");
        }
    }

    #[test]
    fn test_default_surface_is_deterministic() {
        let templates = Arc::new(PlaneTemplateCache::new(3));
        let config = SurfaceConfig {
            craters: CraterConfig {
                count: 16,
                ..Default::default()
            },
            ..Default::default()
        };
        let Some(gpu) = evaluator(&templates, &config) else {
            return;
        };
        let bounds: Vec<_> = generate_chunks(0).iter().map(|c| c.bounds).collect();
        let first = gpu.evaluate(2, &bounds).unwrap();
        assert_eq!(first, gpu.evaluate(2, &bounds).unwrap());
        for p in &first.positions {
            assert!(p.is_finite());
            assert!((p.length() - 1.0).abs() < 0.5);
        }
    }

    #[test]
    fn test_missing_level_and_empty_bucket() {
        let templates = Arc::new(PlaneTemplateCache::new(2));
        let Some(gpu) = evaluator(&templates, &flat_surface()) else {
            return;
        };
        assert!(matches!(
            gpu.evaluate(5, &[]),
            Err(DispatchError::TemplateMissing { level: 5 })
        ));
        assert_eq!(gpu.evaluate(1, &[]).unwrap().chunk_count(), 0);
    }

    #[test]
    fn test_rebind_surface_changes_output() {
        let templates = Arc::new(PlaneTemplateCache::new(2));
        let Some(mut gpu) = evaluator(&templates, &flat_surface()) else {
            return;
        };
        let bounds: Vec<_> = generate_chunks(0).iter().map(|c| c.bounds).collect();
        let flat = gpu.evaluate(1, &bounds).unwrap();
        gpu.bind_surface(&SurfaceConfig::default());
        assert_ne!(flat, gpu.evaluate(1, &bounds).unwrap());
    }
}
