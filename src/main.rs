// Scroll-driven ant vignette.
//
// A colony of ants wanders a ground plane, drawn toward three bobbing
// sugar cubes while softly avoiding each other; the camera descends along
// a fixed flight as the user scrolls. All simulation runs synchronously
// inside the per-frame redraw: snapshot world → steer ants → advance the
// camera rig → draw (one instanced draw call per mesh).

mod engine;

use bevy_ecs::prelude::*;
use glam::{Mat4, Vec4Swizzles};
use winit::{
    event::{ElementState, Event as WinitEvent, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use engine::camera::{CameraKeyframes, ScrollCamera};
use engine::debug_overlay::{AntArrowDraw, DebugOverlay, DebugStats};
use engine::input::InputState;
use engine::mesh::{self, GpuVertex, RenderMesh};
use engine::scroll::ScrollTracker;
use engine::steering::SteeringParams;
use engine::systems;
use engine::{AntAgent, Color as EntityColor, SugarLure, Transform, Velocity};

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Instance scale of the ant body mesh (modelled in ~0.3-unit blobs).
const ANT_SCALE: f32 = 0.08;
const SUGAR_SIZE: f32 = 0.18;
const GROUND_EXTENT: f32 = 80.0;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// ============================================================================
// INSTANCE DATA (per-entity)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceData {
    /// xyz = world position, w = heading (radians about world Y).
    pos_heading: [f32; 4],
    color: [f32; 4],
    /// x = uniform scale, yzw padding.
    scale: [f32; 4],
}

impl InstanceData {
    fn new(position: glam::Vec3, heading: f32, color: [f32; 3], scale: f32) -> Self {
        Self {
            pos_heading: [position.x, position.y, position.z, heading],
            color: [color[0], color[1], color[2], 1.0],
            scale: [scale, 0.0, 0.0, 0.0],
        }
    }

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 32,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

// ============================================================================
// UNIFORM DATA (camera only)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

// ============================================================================
// GPU MESH
// ============================================================================

/// One mesh + its instance buffer. The scene has a fixed entity census, so
/// the instance capacity is set once at startup.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, mesh: &RenderMesh, label: &str, instance_capacity: usize) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vertices")),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} indices")),
            contents: mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} instances")),
            size: (instance_capacity * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: mesh.index_count(),
            instance_buffer,
            instance_capacity,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass, queue: &wgpu::Queue, instances: &[InstanceData]) {
        let count = instances.len().min(self.instance_capacity);
        if count == 0 {
            return;
        }
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&instances[..count]),
        );
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.num_indices, 0, 0..count as u32);
    }
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

struct State {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    ant_mesh: GpuMesh,
    sugar_mesh: GpuMesh,
    ground_mesh: GpuMesh,

    // ECS world + simulation
    world: World,
    params: SteeringParams,
    rng: StdRng,
    sim_time: f32,
    last_update: std::time::Instant,

    // Scroll + camera
    input: InputState,
    scroll: ScrollTracker,
    camera: ScrollCamera,
    projection: Mat4,

    overlay: DebugOverlay,
}

impl State {
    async fn new(window: std::sync::Arc<winit::window::Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone()).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .unwrap();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader_instanced.wgsl").into()),
        });

        use wgpu::util::DeviceExt;

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
                label: Some("uniform_bind_group_layout"),
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GpuVertex::desc(), InstanceData::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let ant_mesh = GpuMesh::new(&device, &mesh::ant_body(), "ant", systems::ANT_COUNT);
        let sugar_mesh = GpuMesh::new(
            &device,
            &mesh::sugar_cube(SUGAR_SIZE),
            "sugar",
            systems::SUGAR_SPOTS.len(),
        );
        let ground_mesh = GpuMesh::new(&device, &mesh::ground_slab(), "ground", 1);

        // Spawn the scene
        let mut world = World::new();
        let mut rng = StdRng::from_entropy();
        systems::spawn_colony(&mut world, &mut rng);
        systems::spawn_sugar(&mut world, &mut rng);
        log::info!(
            "spawned {} ants and {} sugar cubes",
            systems::ANT_COUNT,
            systems::SUGAR_SPOTS.len()
        );

        let camera = ScrollCamera::new(CameraKeyframes::default());
        let projection = camera.projection_matrix(size.width as f32 / size.height.max(1) as f32);

        let overlay = DebugOverlay::new(&window, &device, surface_format);

        Self {
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            depth_view,
            uniform_buffer,
            uniform_bind_group,
            ant_mesh,
            sugar_mesh,
            ground_mesh,
            world,
            params: SteeringParams::default(),
            rng,
            sim_time: 0.0,
            last_update: std::time::Instant::now(),
            input: InputState::new(),
            scroll: ScrollTracker::new(),
            camera,
            projection,
            overlay,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
            self.projection = self.camera.projection_matrix(self.aspect());
        }
    }

    fn aspect(&self) -> f32 {
        self.size.width as f32 / self.size.height.max(1) as f32
    }

    fn update(&mut self) {
        let now = std::time::Instant::now();
        let dt = (now - self.last_update).as_secs_f32();
        self.last_update = now;
        self.sim_time += dt;

        // Debug toggles
        if self.input.was_key_pressed(KeyCode::F3) {
            self.overlay.stats_visible = !self.overlay.stats_visible;
        }
        if self.input.was_key_pressed(KeyCode::F4) {
            self.overlay.arrows_visible = !self.overlay.arrows_visible;
        }
        if self.input.was_key_pressed(KeyCode::F6) {
            self.overlay.tuner_visible = !self.overlay.tuner_visible;
        }

        // Scroll progress → camera rig
        self.scroll.push_wheel(self.input.scroll_delta);
        self.scroll.update(dt);
        self.camera.advance(self.scroll.progress(), dt);
        if self.camera.take_projection_dirty() {
            self.projection = self.camera.projection_matrix(self.aspect());
        }

        // Host-scene animation first, so ants snapshot the bobbed cube
        // positions, then the colony step.
        systems::bob_sugar(&mut self.world, self.sim_time);
        systems::advance_colony(&mut self.world, &self.params, self.sim_time, dt, &mut self.rng);
    }

    fn render(&mut self, window: &winit::window::Window, stats: &DebugStats) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Collect instance data from the ECS before any pass starts.
        let mut ant_instances = Vec::with_capacity(systems::ANT_COUNT);
        let mut query = self.world.query::<(&Transform, &AntAgent, &EntityColor)>();
        for (transform, _, color) in query.iter(&self.world) {
            ant_instances.push(InstanceData::new(
                transform.position,
                transform.heading,
                [color.r, color.g, color.b],
                ANT_SCALE,
            ));
        }

        let mut sugar_instances = Vec::with_capacity(systems::SUGAR_SPOTS.len());
        let mut query = self.world.query::<(&Transform, &SugarLure, &EntityColor)>();
        for (transform, _, color) in query.iter(&self.world) {
            sugar_instances.push(InstanceData::new(
                transform.position,
                0.0,
                [color.r, color.g, color.b],
                1.0,
            ));
        }

        // Ground slab: unit cube scaled up, top face at y = -0.02.
        let ground_instances = [InstanceData::new(
            glam::Vec3::new(0.0, -0.02 - GROUND_EXTENT / 2.0, 0.0),
            0.0,
            [0.02, 0.03, 0.05],
            GROUND_EXTENT,
        )];

        let view_proj = self.projection * self.camera.view_matrix();
        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[Uniforms {
                view_proj: view_proj.to_cols_array_2d(),
            }]),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.012,
                            g: 0.02,
                            b: 0.045,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            self.ground_mesh
                .draw(&mut render_pass, &self.queue, &ground_instances);
            self.sugar_mesh
                .draw(&mut render_pass, &self.queue, &sugar_instances);
            self.ant_mesh
                .draw(&mut render_pass, &self.queue, &ant_instances);
        }

        // Debug overlay on top, no depth.
        let ant_draws = self.collect_ant_arrows(view_proj, window.scale_factor() as f32);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };
        self.overlay.render(
            &self.device,
            &self.queue,
            &mut encoder,
            window,
            &view,
            &screen_descriptor,
            stats,
            &ant_draws,
            &mut self.params,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Project each ant and its half-second velocity lookahead to egui
    /// screen points for the F4 arrow layer.
    fn collect_ant_arrows(&mut self, view_proj: Mat4, scale_factor: f32) -> Vec<AntArrowDraw> {
        if !self.overlay.arrows_visible {
            return Vec::new();
        }

        let (width, height) = (self.size.width as f32, self.size.height as f32);
        let to_screen = move |p: glam::Vec3| -> Option<egui::Pos2> {
            let clip = view_proj * p.extend(1.0);
            if clip.w <= 0.0 {
                return None;
            }
            let ndc = clip.xyz() / clip.w;
            Some(egui::pos2(
                (ndc.x + 1.0) * 0.5 * width / scale_factor,
                (1.0 - ndc.y) * 0.5 * height / scale_factor,
            ))
        };

        let mut draws = Vec::new();
        let mut query = self.world.query::<(&Transform, &Velocity, &AntAgent)>();
        for (transform, velocity, _) in query.iter(&self.world) {
            let pos = transform.position;
            let tip = pos + velocity.linear * 0.5;
            if let (Some(a), Some(b)) = (to_screen(pos), to_screen(tip)) {
                draws.push(AntArrowDraw { pos: a, vel_tip: b });
            }
        }
        draws
    }
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

// ============================================================================
// MAIN
// ============================================================================

fn main() {
    env_logger::init();

    let event_loop = EventLoop::new().unwrap();

    let window_attributes = Window::default_attributes()
        .with_title("Sugar March")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

    let window = std::sync::Arc::new(event_loop.create_window(window_attributes).unwrap());

    let mut state = pollster::block_on(State::new(window.clone()));

    // Rolling frame-time stats for the overlay.
    let mut frame_count: u32 = 0;
    let mut fps: u32 = 0;
    let mut frame_ms_sum = 0.0f32;
    let mut frame_ms_min = f32::INFINITY;
    let mut frame_ms_max = 0.0f32;
    let mut stats = DebugStats {
        fps: 0,
        frame_time_avg_ms: 0.0,
        frame_time_min_ms: 0.0,
        frame_time_max_ms: 0.0,
        ant_count: systems::ANT_COUNT,
        scroll_progress: 0.0,
        camera_position: (0.0, 0.0, 0.0),
        camera_fov_deg: 0.0,
        resolution: (0, 0),
    };
    let mut last_fps_update = std::time::Instant::now();

    event_loop
        .run(move |event, control_flow| {
            match event {
                WinitEvent::WindowEvent {
                    ref event,
                    window_id,
                } if window_id == window.id() => {
                    let response = state.overlay.handle_window_event(&window, event);
                    if !response.consumed {
                        state.input.process_event(event);
                    }

                    match event {
                        WindowEvent::CloseRequested
                        | WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    state: ElementState::Pressed,
                                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                                    ..
                                },
                            ..
                        } => control_flow.exit(),
                        WindowEvent::Resized(physical_size) => {
                            state.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            let frame_start = std::time::Instant::now();

                            state.update();

                            let cam_pos = state.camera.position();
                            stats.fps = fps;
                            stats.scroll_progress = state.scroll.progress();
                            stats.camera_position = (cam_pos.x, cam_pos.y, cam_pos.z);
                            stats.camera_fov_deg = state.camera.fov_degrees();
                            stats.resolution = (state.size.width, state.size.height);

                            match state.render(&window, &stats) {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost) => state.resize(state.size),
                                Err(wgpu::SurfaceError::OutOfMemory) => control_flow.exit(),
                                Err(e) => log::warn!("surface error: {e:?}"),
                            }

                            state.input.end_frame();

                            let frame_ms = frame_start.elapsed().as_secs_f32() * 1000.0;
                            frame_count += 1;
                            frame_ms_sum += frame_ms;
                            frame_ms_min = frame_ms_min.min(frame_ms);
                            frame_ms_max = frame_ms_max.max(frame_ms);

                            let now = std::time::Instant::now();
                            if (now - last_fps_update).as_secs_f32() >= 1.0 {
                                fps = frame_count;
                                stats.frame_time_avg_ms = frame_ms_sum / frame_count.max(1) as f32;
                                stats.frame_time_min_ms = frame_ms_min;
                                stats.frame_time_max_ms = frame_ms_max;
                                frame_count = 0;
                                frame_ms_sum = 0.0;
                                frame_ms_min = f32::INFINITY;
                                frame_ms_max = 0.0;
                                last_fps_update = now;
                            }
                        }
                        _ => {}
                    }
                }
                WinitEvent::AboutToWait => {
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .unwrap();
}
