use std::sync::Arc;

use anyhow::Result;
use glam::{Mat4, Vec3};
use thiserror::Error;

use crate::clouds::CloudPuffInstance;
use crate::constants::{clouds, dust, rain, snow, splash};
use crate::coordinator::{WeatherEffectsCoordinator, ZoneId};

/// Renderer-side colors.
const RAIN_COLOR: [f32; 3] = [0.62, 0.70, 0.82];
const SNOW_COLOR: [f32; 3] = [0.96, 0.97, 1.0];
const DUST_COLOR: [f32; 3] = [0.72, 0.64, 0.52];
const SPLASH_COLOR: [f32; 3] = [0.70, 0.78, 0.88];

/// One endpoint of a rain streak line segment.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub alpha: f32,
}

/// One camera-facing point sprite (snow, dust, splash).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    camera_right: [f32; 4],
    camera_up: [f32; 4],
}

#[derive(Debug, Error)]
pub enum RenderInitError {
    #[error("weather buffers need {required} bytes, device allows {limit}")]
    BufferBudgetExceeded { required: u64, limit: u64 },
}

const RAIN_VERTEX_CAPACITY: usize = 3 * rain::CAPACITY * 2;
const SNOW_INSTANCE_CAPACITY: usize = 3 * snow::CAPACITY;
const DUST_INSTANCE_CAPACITY: usize = 3 * dust::CAPACITY;
const SPLASH_INSTANCE_CAPACITY: usize = splash::POOL_SIZE;
const CLOUD_INSTANCE_CAPACITY: usize = 3 * clouds::MAX_CLOUDS * clouds::PUFFS_PER_CLOUD;

/// GPU resources for the whole weather scene. Every buffer is allocated
/// once at startup at full capacity; per-frame work is write_buffer uploads
/// of the drawable sub-ranges plus one draw call per system kind.
///
/// Creation is the only fallible path; a failed allocation here is fatal,
/// the per-frame path never errors.
pub struct WeatherRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    rain_buffer: wgpu::Buffer,
    snow_buffer: wgpu::Buffer,
    dust_buffer: wgpu::Buffer,
    splash_buffer: wgpu::Buffer,
    cloud_buffer: wgpu::Buffer,

    rain_pipeline: wgpu::RenderPipeline,
    sprite_pipeline: wgpu::RenderPipeline,
    cloud_pipeline: wgpu::RenderPipeline,

    // CPU staging, reused every frame.
    rain_vertices: Vec<LineVertex>,
    snow_instances: Vec<SpriteInstance>,
    dust_instances: Vec<SpriteInstance>,
    splash_instances: Vec<SpriteInstance>,
    cloud_instances: Vec<CloudPuffInstance>,

    rain_vertex_count: u32,
    snow_count: u32,
    dust_count: u32,
    splash_count: u32,
    cloud_count: u32,
}

impl WeatherRenderer {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let required = (RAIN_VERTEX_CAPACITY * std::mem::size_of::<LineVertex>()
            + (SNOW_INSTANCE_CAPACITY + DUST_INSTANCE_CAPACITY + SPLASH_INSTANCE_CAPACITY)
                * std::mem::size_of::<SpriteInstance>()
            + CLOUD_INSTANCE_CAPACITY * std::mem::size_of::<CloudPuffInstance>())
            as u64;
        let limit = device.limits().max_buffer_size;
        if required > limit {
            return Err(RenderInitError::BufferBudgetExceeded { required, limit }.into());
        }

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Weather Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let vertex_buffer = |label: &str, size: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let rain_buffer = vertex_buffer(
            "Rain Streak Buffer",
            RAIN_VERTEX_CAPACITY * std::mem::size_of::<LineVertex>(),
        );
        let snow_buffer = vertex_buffer(
            "Snow Sprite Buffer",
            SNOW_INSTANCE_CAPACITY * std::mem::size_of::<SpriteInstance>(),
        );
        let dust_buffer = vertex_buffer(
            "Dust Sprite Buffer",
            DUST_INSTANCE_CAPACITY * std::mem::size_of::<SpriteInstance>(),
        );
        let splash_buffer = vertex_buffer(
            "Splash Sprite Buffer",
            SPLASH_INSTANCE_CAPACITY * std::mem::size_of::<SpriteInstance>(),
        );
        let cloud_buffer = vertex_buffer(
            "Cloud Instance Buffer",
            CLOUD_INSTANCE_CAPACITY * std::mem::size_of::<CloudPuffInstance>(),
        );

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Weather Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Weather Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Weather Pipeline Layout"),
            bind_group_layouts: &[&camera_layout],
            push_constant_ranges: &[],
        });

        let rain_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Rain Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/rain.wgsl").into()),
        });
        let sprite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/particle.wgsl").into()),
        });
        let cloud_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cloud Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/cloud.wgsl").into()),
        });

        let blend_target = [Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let rain_layout_attrs = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32];
        let rain_pipeline = device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Rain Streak Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &rain_shader,
                    entry_point: "vs_main",
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<LineVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &rain_layout_attrs,
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &rain_shader,
                    entry_point: "fs_main",
                    targets: &blend_target,
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::LineList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            });

        let sprite_attrs = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32x4];
        let sprite_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &sprite_attrs,
        };
        let sprite_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Weather Sprite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &sprite_shader,
                entry_point: "vs_main",
                buffers: &[sprite_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &sprite_shader,
                entry_point: "fs_main",
                targets: &blend_target,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let cloud_attrs =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32x4, 3 => Float32];
        let cloud_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cloud Billboard Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &cloud_shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<CloudPuffInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &cloud_attrs,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &cloud_shader,
                entry_point: "fs_main",
                targets: &blend_target,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Ok(Self {
            device,
            queue,
            camera_buffer,
            camera_bind_group,
            rain_buffer,
            snow_buffer,
            dust_buffer,
            splash_buffer,
            cloud_buffer,
            rain_pipeline,
            sprite_pipeline,
            cloud_pipeline,
            rain_vertices: Vec::with_capacity(RAIN_VERTEX_CAPACITY),
            snow_instances: Vec::with_capacity(SNOW_INSTANCE_CAPACITY),
            dust_instances: Vec::with_capacity(DUST_INSTANCE_CAPACITY),
            splash_instances: Vec::with_capacity(SPLASH_INSTANCE_CAPACITY),
            cloud_instances: Vec::with_capacity(CLOUD_INSTANCE_CAPACITY),
            rain_vertex_count: 0,
            snow_count: 0,
            dust_count: 0,
            splash_count: 0,
            cloud_count: 0,
        })
    }

    /// Upload the camera state billboards and projection depend on.
    pub fn set_camera(&self, view_proj: Mat4, right: Vec3, up: Vec3) {
        let uniform = CameraUniform {
            view_proj: view_proj.to_cols_array_2d(),
            camera_right: right.extend(0.0).to_array(),
            camera_up: up.extend(0.0).to_array(),
        };
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Gather every system's drawable sub-range and push it to the GPU.
    /// Runs after all CPU-side updates for the frame are complete.
    pub fn upload(&mut self, coordinator: &WeatherEffectsCoordinator) {
        self.rain_vertices.clear();
        self.snow_instances.clear();
        self.dust_instances.clear();
        self.splash_instances.clear();
        self.cloud_instances.clear();

        for id in ZoneId::ALL {
            let effects = coordinator.zone(id);

            let rain = &effects.rain;
            let alpha = rain.opacity();
            if alpha > 0.0 {
                let b = rain.buffer();
                for i in 0..rain.active_count() {
                    self.rain_vertices.push(LineVertex {
                        position: [b.head_x[i], b.head_y[i], b.head_z[i]],
                        alpha,
                    });
                    // The tail fades out for the motion-blur read.
                    self.rain_vertices.push(LineVertex {
                        position: [b.tail_x[i], b.tail_y[i], b.tail_z[i]],
                        alpha: alpha * 0.15,
                    });
                }
            }

            let snow_alpha = effects.snow.opacity();
            if snow_alpha > 0.0 {
                let b = effects.snow.buffer();
                for i in 0..effects.snow.active_count() {
                    self.snow_instances.push(SpriteInstance {
                        position: [b.pos_x[i], b.pos_y[i], b.pos_z[i]],
                        size: snow::SPRITE_SIZE,
                        color: [SNOW_COLOR[0], SNOW_COLOR[1], SNOW_COLOR[2], snow_alpha],
                    });
                }
            }

            let dust_alpha = effects.dust.opacity();
            if dust_alpha > 0.0 {
                let b = effects.dust.buffer();
                for i in 0..effects.dust.active_count() {
                    self.dust_instances.push(SpriteInstance {
                        position: [b.pos_x[i], b.pos_y[i], b.pos_z[i]],
                        size: dust::SPRITE_SIZE,
                        color: [DUST_COLOR[0], DUST_COLOR[1], DUST_COLOR[2], dust_alpha],
                    });
                }
            }

            self.cloud_instances.extend_from_slice(effects.clouds.instances());
        }

        let pool = coordinator.splashes();
        for i in 0..pool.capacity.min(SPLASH_INSTANCE_CAPACITY) {
            if pool.life[i] > 0.0 {
                // Splash rings grow as they die off.
                self.splash_instances.push(SpriteInstance {
                    position: [pool.pos_x[i], pool.pos_y[i], pool.pos_z[i]],
                    size: splash::SPRITE_SIZE * (1.0 + (1.0 - pool.life[i]) * 2.0),
                    color: [
                        SPLASH_COLOR[0],
                        SPLASH_COLOR[1],
                        SPLASH_COLOR[2],
                        pool.life[i] * splash::MAX_OPACITY,
                    ],
                });
            }
        }

        self.rain_vertex_count = self.rain_vertices.len() as u32;
        self.snow_count = self.snow_instances.len() as u32;
        self.dust_count = self.dust_instances.len() as u32;
        self.splash_count = self.splash_instances.len() as u32;
        self.cloud_count = self.cloud_instances.len() as u32;

        if !self.rain_vertices.is_empty() {
            self.queue
                .write_buffer(&self.rain_buffer, 0, bytemuck::cast_slice(&self.rain_vertices));
        }
        if !self.snow_instances.is_empty() {
            self.queue
                .write_buffer(&self.snow_buffer, 0, bytemuck::cast_slice(&self.snow_instances));
        }
        if !self.dust_instances.is_empty() {
            self.queue
                .write_buffer(&self.dust_buffer, 0, bytemuck::cast_slice(&self.dust_instances));
        }
        if !self.splash_instances.is_empty() {
            self.queue.write_buffer(
                &self.splash_buffer,
                0,
                bytemuck::cast_slice(&self.splash_instances),
            );
        }
        if !self.cloud_instances.is_empty() {
            self.queue
                .write_buffer(&self.cloud_buffer, 0, bytemuck::cast_slice(&self.cloud_instances));
        }
    }

    /// Record the weather draws into an existing render pass. The caller
    /// draws the opaque scene first; weather is blended on top without
    /// depth writes.
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_bind_group(0, &self.camera_bind_group, &[]);

        if self.cloud_count > 0 {
            pass.set_pipeline(&self.cloud_pipeline);
            pass.set_vertex_buffer(0, self.cloud_buffer.slice(..));
            pass.draw(0..4, 0..self.cloud_count);
        }
        if self.rain_vertex_count > 0 {
            pass.set_pipeline(&self.rain_pipeline);
            pass.set_vertex_buffer(0, self.rain_buffer.slice(..));
            pass.draw(0..self.rain_vertex_count, 0..1);
        }
        if self.snow_count > 0 {
            pass.set_pipeline(&self.sprite_pipeline);
            pass.set_vertex_buffer(0, self.snow_buffer.slice(..));
            pass.draw(0..4, 0..self.snow_count);
        }
        if self.dust_count > 0 {
            pass.set_pipeline(&self.sprite_pipeline);
            pass.set_vertex_buffer(0, self.dust_buffer.slice(..));
            pass.draw(0..4, 0..self.dust_count);
        }
        if self.splash_count > 0 {
            pass.set_pipeline(&self.sprite_pipeline);
            pass.set_vertex_buffer(0, self.splash_buffer.slice(..));
            pass.draw(0..4, 0..self.splash_count);
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_struct_layouts() {
        // Strides the vertex layouts above are written against.
        assert_eq!(std::mem::size_of::<LineVertex>(), 16);
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
        assert_eq!(std::mem::size_of::<CloudPuffInstance>(), 48);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 96);
    }
}
