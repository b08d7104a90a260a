use glam::{Vec2, Vec4};
use pinch_core::{Lane, Note, PlayfieldLayout, LANE_COUNT};
use wgpu::util::DeviceExt;

const SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

pub const MAX_INSTANCES: usize = 256;

const FLASH_DECAY_PER_SEC: f32 = 5.0;
const HIT_FLASH: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
const MISS_FLASH: Vec4 = Vec4::new(1.0, 0.15, 0.15, 1.0);

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    playfield: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    pub center: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
    pub shape: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Rect,
    Disc,
    Ring,
}

impl InstanceData {
    fn new(center: Vec2, size: Vec2, color: Vec4, shape: Shape) -> Self {
        let shape = match shape {
            Shape::Rect => 0.0,
            Shape::Disc => 1.0,
            Shape::Ring => 2.0,
        };
        Self {
            center: center.to_array(),
            size: size.to_array(),
            color: color.to_array(),
            shape,
        }
    }
}

/// Short-lived glow at the hit line after a resolution.
#[derive(Default, Clone, Copy, Debug)]
pub struct LaneFlashes {
    energy: [f32; LANE_COUNT],
    hit: [bool; LANE_COUNT],
}

impl LaneFlashes {
    pub fn trigger(&mut self, lane: Lane, hit: bool) {
        self.energy[lane.index()] = 1.0;
        self.hit[lane.index()] = hit;
    }

    pub fn decay(&mut self, dt_sec: f32) {
        for e in self.energy.iter_mut() {
            *e = (*e - dt_sec * FLASH_DECAY_PER_SEC).max(0.0);
        }
    }

    pub fn energy(&self, lane: Lane) -> f32 {
        self.energy[lane.index()]
    }
}

/// Build the quads for one frame, back to front: lane backdrops, dividers,
/// hit line, pinch indicators, notes, flashes.
pub fn scene_instances(
    layout: &PlayfieldLayout,
    notes: &[Note],
    held: [bool; LANE_COUNT],
    flashes: &LaneFlashes,
    now_sec: f64,
) -> Vec<InstanceData> {
    let lane_w = layout.lane_width();
    let mut out = Vec::with_capacity(LANE_COUNT * 4 + notes.len());

    for lane in Lane::ALL {
        let alpha = if held[lane.index()] { 0.3 } else { 0.1 };
        out.push(InstanceData::new(
            Vec2::new(lane.center_x(layout.width), layout.height * 0.5),
            Vec2::new(lane_w, layout.height),
            lane.color().truncate().extend(alpha),
            Shape::Rect,
        ));
    }
    for i in 1..LANE_COUNT {
        out.push(InstanceData::new(
            Vec2::new(lane_w * i as f32, layout.height * 0.5),
            Vec2::new(2.0, layout.height),
            Vec4::new(1.0, 1.0, 1.0, 0.25),
            Shape::Rect,
        ));
    }
    out.push(InstanceData::new(
        Vec2::new(layout.width * 0.5, layout.hit_line_y),
        Vec2::new(layout.width, 4.0),
        Vec4::ONE,
        Shape::Rect,
    ));

    let marker = lane_w.min(layout.note_height * 1.5);
    for lane in Lane::ALL {
        let center = Vec2::new(lane.center_x(layout.width), layout.hit_line_y);
        let (shape, alpha) = if held[lane.index()] {
            (Shape::Disc, 0.85)
        } else {
            (Shape::Ring, 0.6)
        };
        out.push(InstanceData::new(
            center,
            Vec2::splat(marker),
            lane.color().truncate().extend(alpha),
            shape,
        ));
    }

    for note in notes {
        let center = layout.note_center(note.lane, note.target_time_sec, now_sec);
        if !layout.is_on_screen(center.y) {
            continue;
        }
        out.push(InstanceData::new(
            center,
            Vec2::new(lane_w * 0.8, layout.note_height),
            note.lane.color(),
            Shape::Rect,
        ));
    }

    for lane in Lane::ALL {
        let e = flashes.energy(lane);
        if e <= 0.0 {
            continue;
        }
        let tint = if flashes.hit[lane.index()] {
            HIT_FLASH
        } else {
            MISS_FLASH
        };
        out.push(InstanceData::new(
            Vec2::new(lane.center_x(layout.width), layout.hit_line_y),
            Vec2::splat(marker * (1.0 + (1.0 - e))),
            tint.truncate().extend(0.7 * e),
            Shape::Ring,
        ));
    }

    out.truncate(MAX_INSTANCES);
    out
}

pub struct GpuState<'w> {
    pub window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    quad_vb: wgpu::Buffer,
    instance_vb: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    playfield: Vec2,
}

impl<'w> GpuState<'w> {
    pub async fn new(
        window: &'w winit::window::Window,
        layout: &PlayfieldLayout,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // two triangles, unit quad centered on the origin
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let instance_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_vb"),
            size: (std::mem::size_of::<InstanceData>() * MAX_INSTANCES) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffers = [
            // slot 0: quad corners
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 2) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            // slot 1: per-quad data
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<InstanceData>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x2,
                        offset: 0,
                        shader_location: 1,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x2,
                        offset: 8,
                        shader_location: 2,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x4,
                        offset: 16,
                        shader_location: 3,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32,
                        offset: 32,
                        shader_location: 4,
                    },
                ],
            },
        ];
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        log::info!("[gpu] surface {}x{} {:?}", config.width, config.height, format);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
            uniform_buffer,
            quad_vb,
            instance_vb,
            bind_group,
            playfield: Vec2::new(layout.width, layout.height),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn render(
        &mut self,
        instances: &[InstanceData],
        time_sec: f32,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                playfield: [self.playfield.x, self.playfield.y, time_sec, 0.0],
            }),
        );
        let count = instances.len().min(MAX_INSTANCES);
        self.queue.write_buffer(
            &self.instance_vb,
            0,
            bytemuck::cast_slice(&instances[..count]),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.04,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
            rpass.set_vertex_buffer(1, self.instance_vb.slice(..));
            rpass.draw(0..6, 0..count as u32);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinch_core::NoteStatus;

    fn note(lane: Lane, target: f64) -> Note {
        Note {
            id: 0,
            lane,
            spawn_time_sec: target - 2.0,
            target_time_sec: target,
            status: NoteStatus::Pending,
        }
    }

    // backdrops + dividers + hit line + indicators
    const STATIC_QUADS: usize = LANE_COUNT + (LANE_COUNT - 1) + 1 + LANE_COUNT;

    #[test]
    fn instance_layout_matches_vertex_attributes() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 36);
        assert_eq!(std::mem::size_of::<Uniforms>(), 16);
    }

    #[test]
    fn only_visible_notes_are_drawn() {
        let layout = PlayfieldLayout::default();
        let notes = [note(Lane::Index, 1.0), note(Lane::Ring, 60.0)];
        let quads = scene_instances(
            &layout,
            &notes,
            [false; LANE_COUNT],
            &LaneFlashes::default(),
            1.0,
        );
        assert_eq!(quads.len(), STATIC_QUADS + 1);
        let drawn = quads[STATIC_QUADS];
        assert!((drawn.center[1] - layout.hit_line_y).abs() < 1e-3);
        assert_eq!(drawn.center[0], Lane::Index.center_x(layout.width));
    }

    #[test]
    fn held_lanes_draw_filled_indicators() {
        let layout = PlayfieldLayout::default();
        let quads = scene_instances(
            &layout,
            &[],
            [false, true, false, false],
            &LaneFlashes::default(),
            0.0,
        );
        let indicators = &quads[STATIC_QUADS - LANE_COUNT..STATIC_QUADS];
        let shapes: Vec<f32> = indicators.iter().map(|q| q.shape).collect();
        assert_eq!(shapes, vec![2.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn flashes_fade_out() {
        let mut flashes = LaneFlashes::default();
        flashes.trigger(Lane::Pinky, false);
        let layout = PlayfieldLayout::default();
        let lit = scene_instances(&layout, &[], [false; LANE_COUNT], &flashes, 0.0);
        assert_eq!(lit.len(), STATIC_QUADS + 1);
        flashes.decay(1.0);
        assert_eq!(flashes.energy(Lane::Pinky), 0.0);
        let dark = scene_instances(&layout, &[], [false; LANE_COUNT], &flashes, 0.0);
        assert_eq!(dark.len(), STATIC_QUADS);
    }
}
