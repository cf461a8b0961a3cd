use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use simteach_input::{Action, Key, PointerButton, PointerState};
use simteach_kernel::{SceneConfig, SceneKind, Simulation, Telemetry, TelemetrySink};
use simteach_render::{CameraController, OrbitCamera};
use simteach_render_wgpu::{FrameTargets, MeshRenderable, Primitive, ShaderProgram};
use simteach_tools::{
    Channel, DEFAULT_CAPACITY, EnergyMonitor, PlotSink, SimulationInspector, TraceRecorder,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Upper bound on simulation steps per frame so a stalled frame cannot spiral.
const MAX_STEPS_PER_FRAME: u32 = 10;
/// Scroll distance, in pixels, treated as one wheel notch.
const PIXELS_PER_NOTCH: f32 = 120.0;

#[derive(Parser)]
#[command(name = "simteach-desktop", about = "Interactive rigid-body and pendulum demos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene to open: pendulum, square or cube
    #[arg(short, long, default_value = "pendulum")]
    scene: SceneKind,

    /// YAML scene configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Feeds one sample to both the trace recorder and the energy monitor.
struct FrameSinks<'a> {
    recorder: &'a mut TraceRecorder,
    monitor: &'a mut EnergyMonitor,
}

impl TelemetrySink for FrameSinks<'_> {
    fn consume(&mut self, tick: u64, system: &str, telemetry: &Telemetry) {
        self.recorder.consume(tick, system, telemetry);
        self.monitor.consume(tick, system, telemetry);
    }
}

/// Simulation, camera and run controls. Independent of the GPU.
struct AppState {
    sim: Simulation,
    scene: SceneKind,
    camera: OrbitCamera,
    pointer: PointerState,
    recorder: TraceRecorder,
    monitor: EnergyMonitor,
    paused: bool,
    show_panel: bool,
    window_size: Vec2,
    last_frame: Instant,
    // Fixed timestep
    tick_accumulator: f64,
    tick_rate: f64,
}

impl AppState {
    fn new(scene: SceneKind, config: &SceneConfig) -> Result<Self> {
        let sim = config.build(scene)?;
        let channel = match scene {
            SceneKind::Pendulum => Channel::Theta,
            SceneKind::Square | SceneKind::Cube => Channel::Kinetic,
        };
        let mut monitor = EnergyMonitor::new();
        sim.publish(&mut monitor);

        Ok(Self {
            sim,
            scene,
            camera: OrbitCamera::looking_down(scene.camera_distance()),
            pointer: PointerState::new(720.0),
            recorder: TraceRecorder::new(channel, DEFAULT_CAPACITY),
            monitor,
            paused: false,
            show_panel: true,
            window_size: Vec2::new(1280.0, 720.0),
            last_frame: Instant::now(),
            tick_accumulator: 0.0,
            tick_rate: step_size(config, scene),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.window_size = Vec2::new(width as f32, height as f32);
        self.pointer.set_window_height(height as f32);
    }

    fn update(&mut self, dt: f64) {
        if self.paused {
            return;
        }
        self.tick_accumulator += dt;
        let mut steps = 0;
        while self.tick_accumulator >= self.tick_rate && steps < MAX_STEPS_PER_FRAME {
            self.tick_accumulator -= self.tick_rate;
            self.step_once();
            steps += 1;
            if self.paused {
                break;
            }
        }
        if steps == MAX_STEPS_PER_FRAME {
            self.tick_accumulator = 0.0;
        }
    }

    fn step_once(&mut self) {
        let mut sinks = FrameSinks {
            recorder: &mut self.recorder,
            monitor: &mut self.monitor,
        };
        if let Err(e) = self.sim.step_with(&mut sinks) {
            tracing::error!("simulation stopped: {e}");
            self.paused = true;
            return;
        }

        if let Some(trace) = self.recorder.take_fired() {
            let sink = PlotSink::new(format!("simteach {}", self.scene));
            if let Err(e) = sink.show(&trace) {
                tracing::warn!("could not plot trace: {e}");
            }
        }
    }

    fn handle_action(&mut self, action: Action) {
        if action.is_camera() {
            self.camera.apply(&action);
            return;
        }
        match action {
            Action::TogglePause => {
                if self.sim.is_halted() {
                    self.sim.resume();
                }
                self.paused = !self.paused;
                tracing::info!(paused = self.paused, tick = self.sim.tick(), "run state toggled");
            }
            Action::StepOnce => {
                self.paused = true;
                if self.sim.is_halted() {
                    self.sim.resume();
                }
                self.step_once();
            }
            Action::TogglePanel => {
                self.show_panel = !self.show_panel;
            }
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let summary = SimulationInspector::summary(&self.sim);
        let mut pending = None;

        egui::SidePanel::left("telemetry")
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.heading(format!("simteach: {}", self.scene));
                ui.separator();
                ui.label(format!("Tick: {}", summary.tick));
                ui.label(if summary.halted {
                    "State: halted".to_string()
                } else if self.paused {
                    "State: paused".to_string()
                } else {
                    format!("State: running at {:.0} Hz", 1.0 / self.tick_rate)
                });
                let eye = self.camera.eye();
                ui.label(format!(
                    "Camera: ({:.2}, {:.2}, {:.2}) d={:.3}",
                    eye.x,
                    eye.y,
                    eye.z,
                    self.camera.distance()
                ));
                ui.separator();

                ui.heading("Run");
                ui.horizontal(|ui| {
                    let label = if self.paused { "Resume (Space)" } else { "Pause (Space)" };
                    if ui.button(label).clicked() {
                        pending = Some(Action::TogglePause);
                    }
                    if ui.button("Step (S)").clicked() {
                        pending = Some(Action::StepOnce);
                    }
                });
                ui.horizontal(|ui| {
                    for (label, action) in [
                        ("X", Action::LookAtX),
                        ("Y", Action::LookAtY),
                        ("Z", Action::LookAtZ),
                        ("M", Action::LookAtMinus),
                    ] {
                        if ui.button(label).clicked() {
                            pending = Some(action);
                        }
                    }
                });

                ui.separator();
                ui.heading("Systems");
                for index in 0..summary.system_count {
                    let Some(info) = SimulationInspector::inspect_system(&self.sim, index) else {
                        continue;
                    };
                    ui.label(info.to_string());
                    if let Some(drift) = self.monitor.drift(info.name) {
                        ui.small(format!(
                            "E0={:.6} dE={:.3e} max={:.3e}",
                            drift.baseline,
                            drift.latest - drift.baseline,
                            drift.max_abs_drift
                        ));
                    }
                }

                ui.separator();
                let trace = if self.recorder.has_fired() {
                    "plotted".to_string()
                } else {
                    format!("{}/{}", self.recorder.len(), self.recorder.capacity())
                };
                ui.label(format!("Trace {:?}: {trace}", self.recorder.channel()));

                ui.separator();
                ui.small("LMB: orbit | RMB: pan | wheel: zoom | X/Y/Z/M: views | F1: panel");
            });

        if let Some(action) = pending {
            self.handle_action(action);
        }
    }
}

fn step_size(config: &SceneConfig, scene: SceneKind) -> f64 {
    match scene {
        SceneKind::Pendulum => config.pendulum.h,
        SceneKind::Square => config.square.dt,
        SceneKind::Cube => config.cube.dt,
    }
}

fn key_of(code: KeyCode) -> Key {
    match code {
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyS => Key::S,
        KeyCode::Space => Key::Space,
        KeyCode::F1 => Key::F1,
        _ => Key::Other,
    }
}

fn button_of(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Left),
        MouseButton::Right => Some(PointerButton::Right),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// One renderable per simulation system, in stepping order.
struct SceneMesh {
    renderable: MeshRenderable,
    primitive: Primitive,
}

/// Window and GPU resources, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    program: ShaderProgram,
    targets: FrameTargets,
    meshes: Vec<SceneMesh>,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        state: &mut AppState,
        egui_ctx: &EguiContext,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(format!("simteach: {}", state.scene))
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no GPU adapter for this surface")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("simteach_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no texture formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        state.resize(config.width, config.height);

        let program = ShaderProgram::new(&device, surface_format);
        let targets = FrameTargets::new(&device, config.width, config.height);

        let mut meshes = Vec::with_capacity(state.sim.system_count());
        for system in state.sim.systems_mut() {
            let primitive = match system.telemetry() {
                Telemetry::Pendulum(_) => Primitive::Lines,
                Telemetry::RigidBody(_) => Primitive::Triangles,
            };
            let renderable = MeshRenderable::new(&device, &program, system.shape_mut())
                .with_context(|| format!("uploading {}", system.name()))?;
            meshes.push(SceneMesh {
                renderable,
                primitive,
            });
        }

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            program,
            targets,
            meshes,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.targets
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn render(&mut self, state: &mut AppState, egui_ctx: &EguiContext) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);
        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let view_matrix = state.camera.view_matrix();
            let projection = state.camera.projection_matrix(state.window_size);
            let mut pass = self.targets.begin_pass(&mut encoder, &view);
            for (mesh, system) in self.meshes.iter().zip(state.sim.systems_mut()) {
                if let Err(e) = mesh.renderable.draw(
                    &mut pass,
                    &self.queue,
                    system.shape_mut(),
                    view_matrix,
                    projection,
                    &self.program,
                    mesh.primitive,
                ) {
                    tracing::error!(system = system.name(), "draw failed: {e}");
                }
            }
        }

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let egui_commands = self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(
            egui_commands
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
        self.window.request_redraw();
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &mut self.state, &self.egui_ctx) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("failed to initialise the window: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                self.state.resize(gpu.config.width, gpu.config.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                self.state.handle_action(key_of(code).action());
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(button) = button_of(button) {
                    self.state
                        .pointer
                        .button(button, state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let action = self
                    .state
                    .pointer
                    .cursor_moved(position.x as f32, position.y as f32);
                self.state.handle_action(action);
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.pointer.cursor_left();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_NOTCH,
                };
                let action = self.state.pointer.scrolled(notches);
                self.state.handle_action(action);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.state.last_frame).as_secs_f64().min(0.1);
                self.state.last_frame = now;
                self.state.update(dt);
                gpu.render(&mut self.state, &self.egui_ctx);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!(scene = %cli.scene, "simteach-desktop starting");

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load scene configuration {}", path.display()))?,
        None => SceneConfig::default(),
    };
    let state = AppState::new(cli.scene, &config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
