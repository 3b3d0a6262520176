//! Desktop preview for the redhill experience.
//!
//! The story flow runs on the keyboard and the console; the AR overlay is
//! rendered in the window with a mouse click standing in for the tap
//! gesture. Keys: 1-4 pick a language, Enter opens the AR view, Esc
//! dismisses it, B goes back to the picker.

use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use wgpu::util::DeviceExt;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

use app_core::constants::{CAMERA_FOVY_RADIANS, CAMERA_Z, CAMERA_ZFAR, CAMERA_ZNEAR, PREVIEW_WALL_Z};
use app_core::flow::{Flow, Screen};
use app_core::locale::{Language, AR_HINT, PICKER_HEADING};
use app_core::raycast::hit_preview_wall;
use app_core::scene::{ModelHandle, RenderInstance, VideoHandle};
use app_core::session::{
    ArSession, AssetLibrary, AudioSession, SurfaceHit, SurfaceRaycaster, VideoPlayer,
};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use glam::{Mat4, Vec2, Vec3};
use smallvec::SmallVec;

const INSTANCE_CAPACITY: usize = 64;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

struct GpuState<'w> {
    window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    quad_vb: wgpu::Buffer,
    instance_vb: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl<'w> GpuState<'w> {
    async fn new(window: &'w winit::window::Window) -> anyhow::Result<Self> {
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
        let format = surface_caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shader"),
            source: wgpu::ShaderSource::Wgsl(app_core::SCENE_WGSL.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // Quad vertices for two triangles
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
            size: (std::mem::size_of::<RenderInstance>() * INSTANCE_CAPACITY) as u64,
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
            // slot 0: quad positions
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 2) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            // slot 1: instance data
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<RenderInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 1,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32,
                        offset: 12,
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
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32,
                        offset: 36,
                        shader_location: 5,
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
            width: size.width,
            height: size.height,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.width = new_size.width;
        self.height = new_size.height;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn view_proj(&self) -> [[f32; 4]; 4] {
        let aspect = self.width as f32 / self.height as f32;
        let proj = Mat4::perspective_rh(CAMERA_FOVY_RADIANS, aspect, CAMERA_ZNEAR, CAMERA_ZFAR);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, CAMERA_Z), Vec3::ZERO, Vec3::Y);
        (proj * view).to_cols_array_2d()
    }

    fn render(&mut self, instances: &[RenderInstance]) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: self.view_proj(),
            }),
        );
        let count = instances.len().min(INSTANCE_CAPACITY);
        self.queue
            .write_buffer(&self.instance_vb, 0, bytemuck::cast_slice(&instances[..count]));

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
            rpass.draw(0..6, 0..(count as u32));
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

// ---------------- Platform collaborators ----------------

/// Taps are hit-tested against one synthetic vertical wall.
struct PreviewWallTracker {
    width: f32,
    height: f32,
}

impl SurfaceRaycaster for PreviewWallTracker {
    fn raycast(&self, screen: Vec2) -> SmallVec<[SurfaceHit; 4]> {
        let mut hits = SmallVec::new();
        if let Some(pose) =
            hit_preview_wall(screen, self.width, self.height, CAMERA_Z, PREVIEW_WALL_Z)
        {
            hits.push(SurfaceHit { pose });
        }
        hits
    }
}

/// Disk-backed bundle: the video must exist under assets/, the fish model
/// resolves to the built-in billboard template.
struct NativeAssets;

impl AssetLibrary for NativeAssets {
    fn load_video(&self, name: &str) -> anyhow::Result<VideoHandle> {
        let path = format!("assets/{name}.mp4");
        if Path::new(&path).exists() {
            Ok(VideoHandle(0))
        } else {
            Err(anyhow::anyhow!("'{path}' not found"))
        }
    }

    fn load_model(&self, _name: &str) -> anyhow::Result<ModelHandle> {
        Ok(ModelHandle(0))
    }
}

/// The audio session maps to having a default output device at all.
#[derive(Default)]
struct NativeAudioSession;

impl AudioSession for NativeAudioSession {
    fn activate_playback(&mut self) -> anyhow::Result<()> {
        cpal::default_host()
            .default_output_device()
            .map(|_| ())
            .ok_or_else(|| anyhow::anyhow!("no default output device"))
    }
}

/// Soft looping tone standing in for the clip's soundtrack.
#[derive(Default)]
struct SoundtrackPlayer {
    stream: Option<cpal::Stream>,
}

impl SoundtrackPlayer {
    fn stop(&mut self) {
        self.stream.take();
    }
}

impl VideoPlayer for SoundtrackPlayer {
    fn play(&mut self, _video: VideoHandle) {
        self.stop();
        match build_tone_stream() {
            Some(stream) => {
                if let Err(e) = stream.play() {
                    log::warn!("[audio] soundtrack stream error: {e}");
                    return;
                }
                self.stream = Some(stream);
            }
            None => log::warn!("[audio] no usable output stream"),
        }
    }
}

fn build_tone_stream() -> Option<cpal::Stream> {
    let host = cpal::default_host();
    let device = host.default_output_device()?;
    let config = device.default_output_config().ok()?;
    if config.sample_format() != cpal::SampleFormat::F32 {
        log::warn!("[audio] unsupported sample format {:?}", config.sample_format());
        return None;
    }
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    let stream_config: cpal::StreamConfig = config.into();

    let mut phase = 0.0_f32;
    let phase_inc = 2.0 * std::f32::consts::PI * 220.0 / sample_rate;
    let err_fn = |err| log::error!("audio stream error: {err}");
    device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _| {
                let mut frame = 0usize;
                while frame < data.len() {
                    let v = phase.sin() * 0.08;
                    for ch in 0..channels {
                        if frame + ch < data.len() {
                            data[frame + ch] = v;
                        }
                    }
                    phase += phase_inc;
                    if phase > 2.0 * std::f32::consts::PI {
                        phase -= 2.0 * std::f32::consts::PI;
                    }
                    frame += channels;
                }
            },
            err_fn,
            None,
        )
        .ok()
}

// ---------------- Entry ----------------

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

fn log_story(language: Language) {
    log::info!("[story] {}", language.story_title());
    log::info!("[story] {}", language.story_body());
    log::info!("[story] Enter: {}", language.ar_prompt());
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("[picker] {PICKER_HEADING}");
    for (i, lang) in Language::ALL.iter().enumerate() {
        log::info!("[picker]   {}: {}", i + 1, lang.native_name());
    }

    let event_loop = EventLoop::new().expect("event loop");
    let window = WindowBuilder::new()
        .with_title("Redhill (preview)")
        .build(&event_loop)
        .expect("window");

    let mut gpu = pollster::block_on(GpuState::new(&window)).expect("gpu");

    let mut flow = Flow::new();
    let mut session = ArSession::new(time_seed());
    let assets = NativeAssets;
    let mut audio = NativeAudioSession;
    let mut soundtrack = SoundtrackPlayer::default();
    let started = Instant::now();
    let mut cursor = Vec2::ZERO;

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => gpu.resize(size),
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => elwt.exit(),
            Event::WindowEvent {
                event: WindowEvent::CursorMoved { position, .. },
                ..
            } => {
                cursor = Vec2::new(position.x as f32, position.y as f32);
            }
            Event::WindowEvent {
                event:
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    },
                ..
            } => {
                if matches!(flow.screen(), Screen::ArOverlay { .. }) {
                    flow.note_tap();
                    let tracker = PreviewWallTracker {
                        width: gpu.width.max(1) as f32,
                        height: gpu.height.max(1) as f32,
                    };
                    session.handle_tap(
                        cursor,
                        started.elapsed().as_secs_f64(),
                        &tracker,
                        &assets,
                        &mut audio,
                        &mut soundtrack,
                    );
                }
            }
            Event::WindowEvent {
                event:
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(code),
                                state: ElementState::Pressed,
                                ..
                            },
                        ..
                    },
                ..
            } => {
                let picked = match code {
                    KeyCode::Digit1 => Some(Language::English),
                    KeyCode::Digit2 => Some(Language::Chinese),
                    KeyCode::Digit3 => Some(Language::Tamil),
                    KeyCode::Digit4 => Some(Language::Malay),
                    _ => None,
                };
                if let (Some(lang), Screen::Picker) = (picked, flow.screen()) {
                    flow.select_language(lang);
                    log_story(lang);
                }
                match (code, flow.screen()) {
                    (KeyCode::Enter, Screen::Story(_)) => {
                        flow.open_ar();
                        session = ArSession::new(time_seed());
                        log::info!("[overlay] {AR_HINT}");
                    }
                    (KeyCode::Escape, Screen::ArOverlay { .. }) => {
                        flow.dismiss_ar();
                        session.shutdown();
                        soundtrack.stop();
                        log::info!("[overlay] dismissed");
                    }
                    (KeyCode::KeyB, Screen::Story(_)) => {
                        flow.back();
                        log::info!("[picker] {PICKER_HEADING}");
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                let overlay_active = matches!(flow.screen(), Screen::ArOverlay { .. });
                let instances = if overlay_active {
                    let now_sec = started.elapsed().as_secs_f64();
                    session.tick(now_sec, &assets);
                    session.scene().render_instances(now_sec)
                } else {
                    Vec::new()
                };
                match gpu.render(&instances) {
                    Ok(_) => gpu.window.request_redraw(),
                    Err(wgpu::SurfaceError::Lost) => gpu.resize(gpu.window.inner_size()),
                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                    Err(_) => {}
                }
            }
            _ => {}
        })
        .unwrap();
}
