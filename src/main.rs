use std::sync::Arc;

use clap::Parser;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window},
};

// Import from the library crate
use stumble::{controller, logging, model, ui, view};

use controller::{CameraController, DemoMode, FrameDriver, InputEvent};
use model::{Camera, Scene};
use view::{render, CameraUniform, GpuContext, ModelUniform};

#[derive(Parser, Debug)]
#[command(name = "stumble", about = "First-person drunk-walk demo")]
struct Args {
    /// Demo variant
    #[arg(long, value_enum, default_value_t = ModeArg::Drunk)]
    mode: ModeArg,

    /// Seed for the scene layout and the drunk speed jitter
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Strength of the stumble/sway effect (drunk mode only)
    #[arg(long, default_value_t = 0.3)]
    intensity: f32,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum ModeArg {
    Look,
    Walk,
    Drunk,
}

impl From<ModeArg> for DemoMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Look => DemoMode::Look,
            ModeArg::Walk => DemoMode::Walk,
            ModeArg::Drunk => DemoMode::Drunk,
        }
    }
}

struct App {
    // Core GPU resources
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    window: Arc<Window>,

    // Rendering state
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    scene_res: render::SceneResources,
    render_state: render::RenderState,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    // Simulation
    driver: FrameDriver,
    events: Vec<InputEvent>,
    mouse_locked: bool,

    // Frame timing
    last_frame_time: std::time::Instant,
    fps: f32,
    frame_count: u32,
    fps_timer: f32,
}

impl App {
    async fn new(window: Arc<Window>, args: &Args) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let gpu = GpuContext::new_native(window.clone(), size.width, size.height).await?;
        let device = gpu.device.clone();
        let queue = gpu.queue.clone();
        let config = gpu.config.clone();

        let depth_format = wgpu::TextureFormat::Depth32Float;
        let (depth_texture, depth_view) =
            render::create_depth_texture(&device, size.width, size.height);

        use rand::{rngs::StdRng, SeedableRng};
        let scene = Scene::new(&mut StdRng::seed_from_u64(args.seed));
        let static_mesh = scene.static_mesh.upload(&device);
        let spin_mesh = scene.spin_mesh.upload(&device);

        let camera = Camera::new(size.width, size.height);
        let controller =
            CameraController::new(args.mode.into(), args.seed).with_intensity(args.intensity);
        let driver = FrameDriver::new(camera, controller, scene);

        let scene_res = render::create_scene_resources(&device);
        let cam_uniform = CameraUniform {
            view_proj: driver.camera.view_proj().to_cols_array_2d(),
        };
        queue.write_buffer(&scene_res.camera_buffer, 0, bytemuck::bytes_of(&cam_uniform));

        let pipeline = render::create_scene_pipeline(
            &device,
            config.format,
            &scene_res.bind_group_layout,
            depth_format,
        );

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            config.format,
            egui_wgpu::RendererOptions::default(),
        );

        let render_state = render::RenderState {
            format: config.format,
            alpha_mode: config.alpha_mode,
            width: size.width,
            height: size.height,
            pipeline,
            static_mesh,
            spin_mesh,
            egui_renderer,
            egui_primitives: None,
            egui_full_output: None,
            egui_dpr: window.scale_factor() as f32,
        };

        Ok(Self {
            surface: gpu.surface,
            device,
            queue,
            config,
            size,
            window,
            depth_texture,
            depth_view,
            scene_res,
            render_state,
            egui_state,
            egui_ctx,
            driver,
            events: Vec::new(),
            mouse_locked: false,
            last_frame_time: std::time::Instant::now(),
            fps: 0.0,
            frame_count: 0,
            fps_timer: 0.0,
        })
    }

    /// Translate window events into queued `InputEvent`s. Grab/release of
    /// the cursor stands in for the browser's pointer lock.
    fn input(&mut self, event: &WindowEvent) -> bool {
        let egui_captured = self
            .egui_state
            .on_window_event(self.window.as_ref(), event)
            .consumed;
        if egui_captured {
            return true;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key,
                        ..
                    },
                ..
            } => {
                if let PhysicalKey::Code(code) = physical_key {
                    if *code == KeyCode::Escape && *state == ElementState::Pressed {
                        self.release_cursor();
                        return true;
                    }
                    let key = match code {
                        KeyCode::KeyW => Some("w"),
                        KeyCode::KeyA => Some("a"),
                        KeyCode::KeyS => Some("s"),
                        KeyCode::KeyD => Some("d"),
                        _ => None,
                    };
                    if let Some(key) = key {
                        self.events.push(match state {
                            ElementState::Pressed => InputEvent::KeyDown(key.to_string()),
                            ElementState::Released => InputEvent::KeyUp(key.to_string()),
                        });
                    }
                }
                true
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if !self.mouse_locked {
                    self.grab_cursor();
                }
                true
            }
            WindowEvent::Focused(false) => {
                self.events.push(InputEvent::FocusLost);
                true
            }
            _ => false,
        }
    }

    fn grab_cursor(&mut self) {
        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                self.window.set_cursor_visible(false);
                self.mouse_locked = true;
                self.events
                    .push(InputEvent::PointerLockChanged { locked: true });
            }
            Err(e) => {
                tracing::warn!("cursor grab failed: {e}");
                self.events.push(InputEvent::PointerLockError);
            }
        }
    }

    fn release_cursor(&mut self) {
        let _ = self.window.set_cursor_grab(CursorGrabMode::None);
        self.window.set_cursor_visible(true);
        self.mouse_locked = false;
        self.events
            .push(InputEvent::PointerLockChanged { locked: false });
    }

    fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.events.push(InputEvent::MouseMove {
            dx: dx as f32,
            dy: dy as f32,
        });
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            let (depth_texture, depth_view) =
                render::create_depth_texture(&self.device, new_size.width, new_size.height);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;

            self.driver
                .camera
                .set_aspect(new_size.width, new_size.height);
            self.render_state.width = new_size.width;
            self.render_state.height = new_size.height;
        }
    }

    fn update(&mut self, dt: f32) {
        self.frame_count += 1;
        self.fps_timer += dt;
        if self.fps_timer >= 1.0 {
            self.fps = self.frame_count as f32 / self.fps_timer;
            self.frame_count = 0;
            self.fps_timer = 0.0;
        }

        self.driver.tick(std::mem::take(&mut self.events));

        let cam_uniform = CameraUniform {
            view_proj: self.driver.camera.view_proj().to_cols_array_2d(),
        };
        self.queue.write_buffer(
            &self.scene_res.camera_buffer,
            0,
            bytemuck::bytes_of(&cam_uniform),
        );
        let spin_uniform = ModelUniform {
            transform: self.driver.scene.spin_transform().to_cols_array_2d(),
        };
        self.queue.write_buffer(
            &self.scene_res.spin_buffer,
            0,
            bytemuck::bytes_of(&spin_uniform),
        );
    }

    fn render(&mut self) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let mut data = ui::UiData {
            eye: self.driver.camera.eye,
            yaw: self.driver.camera.yaw,
            pitch: self.driver.camera.pitch,
            roll: self.driver.camera.roll,
            mode: self.driver.controller.mode,
            intensity: self.driver.controller.drunk_intensity(),
            pointer_locked: self.driver.input.pointer_locked,
            fps: self.fps,
            fov_deg: self.driver.camera.fov_y.to_degrees(),
        };
        let full_output = self
            .egui_ctx
            .run(raw_input, |ctx| ui::draw_ui(ctx, &mut data));
        self.driver.camera.fov_y = data.fov_deg.to_radians();
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output.clone());

        let dpr = self.window.scale_factor() as f32;
        let primitives = self.egui_ctx.tessellate(full_output.shapes.clone(), dpr);
        self.render_state.egui_dpr = dpr;
        self.render_state.egui_primitives = Some(primitives);
        self.render_state.egui_full_output = Some(full_output);

        self.render_state.draw_frame(
            &self.device,
            &self.queue,
            &self.surface,
            &self.depth_view,
            &self.scene_res.static_bind_group,
            &self.scene_res.spin_bind_group,
        );
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();
    tracing::info!(?args, "starting demo");

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("Stumble")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    #[allow(deprecated)]
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window.clone(), &args))?;

    #[allow(deprecated)]
    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == app.window.id() => {
            if !app.input(event) {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(physical_size) => {
                        app.resize(*physical_size);
                    }
                    WindowEvent::RedrawRequested => {
                        let now = std::time::Instant::now();
                        let dt = (now - app.last_frame_time).as_secs_f32();
                        app.last_frame_time = now;

                        app.update(dt);
                        app.render();
                    }
                    _ => {}
                }
            }
        }
        Event::DeviceEvent {
            event: DeviceEvent::MouseMotion { delta },
            ..
        } => {
            app.handle_mouse_motion(delta.0, delta.1);
        }
        Event::AboutToWait => {
            app.window.request_redraw();
        }
        _ => {}
    })?;

    Ok(())
}
