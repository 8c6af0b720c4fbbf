// Re-export all public modules so they can be used from main.rs
pub mod logging;
pub mod mesh;
pub mod ui;

// MVC Architecture
pub mod controller;
pub mod model;
pub mod view;

#[cfg(target_arch = "wasm32")]
use std::cell::{Cell, RefCell};
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{
    Document, Event, EventTarget, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent,
    Window,
};

#[cfg(target_arch = "wasm32")]
use controller::{CameraController, DemoMode, FrameDriver, InputEvent};
#[cfg(target_arch = "wasm32")]
use model::{Camera, Scene};
#[cfg(target_arch = "wasm32")]
use view::{render, CameraUniform, GpuContext, ModelUniform};

#[cfg(target_arch = "wasm32")]
thread_local! {
    static ACTIVE_DEMO: RefCell<Option<DemoHandle>> = const { RefCell::new(None) };
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();
    let (window, document, canvas) = init_canvas(800, 600)?;
    let handle = setup_app(&window, &document, &canvas).await?;
    ACTIVE_DEMO.with(|slot| *slot.borrow_mut() = Some(handle));
    Ok(())
}

/// Tear the demo down: stops the frame loop, removes every DOM listener and
/// releases the pointer if it is still captured.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn shutdown() {
    ACTIVE_DEMO.with(|slot| slot.borrow_mut().take());
}

/// Keeps the session alive. Dropping it detaches all listeners (via
/// `EventListeners::drop`) and flips the flag the frame loop checks before
/// rescheduling itself.
#[cfg(target_arch = "wasm32")]
struct DemoHandle {
    running: Rc<Cell<bool>>,
    _listeners: EventListeners,
    document: Document,
}

#[cfg(target_arch = "wasm32")]
impl Drop for DemoHandle {
    fn drop(&mut self) {
        self.running.set(false);
        self.document.exit_pointer_lock();
        tracing::info!("demo stopped");
    }
}

/// Registered DOM listeners plus their closures. Removal happens in `drop`,
/// so whoever owns this owns the subscriptions.
#[cfg(target_arch = "wasm32")]
struct EventListeners {
    registered: Vec<(EventTarget, &'static str, js_sys::Function)>,
    closures: Vec<Box<dyn std::any::Any>>,
}

#[cfg(target_arch = "wasm32")]
impl EventListeners {
    fn new() -> Self {
        Self {
            registered: Vec::new(),
            closures: Vec::new(),
        }
    }

    fn add<E>(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        f: impl FnMut(E) + 'static,
    ) -> Result<(), JsValue>
    where
        E: wasm_bindgen::convert::FromWasmAbi + 'static,
    {
        let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(E)>);
        let func: js_sys::Function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
        target.add_event_listener_with_callback(event, &func)?;
        self.registered.push((target.clone(), event, func));
        self.closures.push(Box::new(closure));
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for EventListeners {
    fn drop(&mut self) {
        for (target, event, func) in &self.registered {
            let _ = target.remove_event_listener_with_callback(event, func);
        }
    }
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
) -> Result<DemoHandle, JsValue> {
    let (mode, seed, intensity) = demo_config(window);
    tracing::info!(?mode, seed, intensity, "starting demo");

    // Initialize GPU
    let gpu = GpuContext::new(canvas, 800, 600)
        .await
        .map_err(|e| js_error(format!("GPU init failed: {e:?}")))?;

    let width = gpu.config.width;
    let height = gpu.config.height;

    // Scene geometry gets uploaded once; only the uniforms change per frame
    use rand::{rngs::StdRng, SeedableRng};
    let scene = Scene::new(&mut StdRng::seed_from_u64(seed));
    let static_mesh = scene.static_mesh.upload(gpu.device.as_ref());
    let spin_mesh = scene.spin_mesh.upload(gpu.device.as_ref());

    let camera = Camera::new(width, height);
    let controller = CameraController::new(mode, seed).with_intensity(intensity);
    let mut driver = FrameDriver::new(camera, controller, scene);

    // Camera + model buffers, bind groups, pipeline
    let scene_res = render::create_scene_resources(gpu.device.as_ref());
    let cam_uniform = CameraUniform {
        view_proj: driver.camera.view_proj().to_cols_array_2d(),
    };
    gpu.queue
        .write_buffer(&scene_res.camera_buffer, 0, bytemuck::bytes_of(&cam_uniform));

    let depth_format = wgpu::TextureFormat::Depth32Float;
    let (_depth_tex, depth_view) = render::create_depth_texture(gpu.device.as_ref(), width, height);
    let pipeline = render::create_scene_pipeline(
        gpu.device.as_ref(),
        gpu.format,
        &scene_res.bind_group_layout,
        depth_format,
    );

    // egui setup
    let egui_ctx = egui::Context::default();
    let egui_renderer = egui_wgpu::Renderer::new(
        gpu.device.as_ref(),
        gpu.format,
        egui_wgpu::RendererOptions::default(),
    );

    let mut render_state = render::RenderState {
        format: gpu.format,
        alpha_mode: gpu.config.alpha_mode,
        width,
        height,
        pipeline,
        static_mesh,
        spin_mesh,
        egui_renderer,
        egui_primitives: None,
        egui_full_output: None,
        egui_dpr: 1.0,
    };

    // Input events flow through this queue and are drained once per frame
    let queue: Rc<RefCell<Vec<InputEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let listeners = setup_input_listeners(document, window, canvas, queue.clone())?;

    let running = Rc::new(Cell::new(true));
    let performance = window
        .performance()
        .ok_or_else(|| js_error("no performance on window"))?;
    let last_time = Cell::new(performance.now());

    start_frame_loop(window.clone(), running.clone(), move || {
        let events: Vec<InputEvent> = queue.borrow_mut().drain(..).collect();
        driver.tick(events);

        let cam_uniform = CameraUniform {
            view_proj: driver.camera.view_proj().to_cols_array_2d(),
        };
        gpu.queue
            .write_buffer(&scene_res.camera_buffer, 0, bytemuck::bytes_of(&cam_uniform));
        let spin_uniform = ModelUniform {
            transform: driver.scene.spin_transform().to_cols_array_2d(),
        };
        gpu.queue
            .write_buffer(&scene_res.spin_buffer, 0, bytemuck::bytes_of(&spin_uniform));

        let now = performance.now();
        let dt_ms = now - last_time.replace(now);
        let fps = if dt_ms > 0.0 { (1000.0 / dt_ms) as f32 } else { 0.0 };

        let mut data = ui::UiData {
            eye: driver.camera.eye,
            yaw: driver.camera.yaw,
            pitch: driver.camera.pitch,
            roll: driver.camera.roll,
            mode: driver.controller.mode,
            intensity: driver.controller.drunk_intensity(),
            pointer_locked: driver.input.pointer_locked,
            fps,
            fov_deg: driver.camera.fov_y.to_degrees(),
        };
        let full_output = ui::build_ui(&egui_ctx, &mut data, width, height, now);
        driver.camera.fov_y = data.fov_deg.to_radians();
        let primitives =
            egui_ctx.tessellate(full_output.shapes.clone(), full_output.pixels_per_point);
        render_state.egui_dpr = full_output.pixels_per_point;
        render_state.egui_primitives = Some(primitives);
        render_state.egui_full_output = Some(full_output);

        render_state.draw_frame(
            gpu.device.as_ref(),
            gpu.queue.as_ref(),
            &gpu.surface,
            &depth_view,
            &scene_res.static_bind_group,
            &scene_res.spin_bind_group,
        );
    })?;

    Ok(DemoHandle {
        running,
        _listeners: listeners,
        document: document.clone(),
    })
}

/// Demo variant and tuning via the URL query string:
/// `?mode=look|walk|drunk&seed=N&intensity=F`
#[cfg(target_arch = "wasm32")]
fn demo_config(window: &Window) -> (DemoMode, u64, f32) {
    let mut mode = DemoMode::Drunk;
    let mut seed = 42u64;
    let mut intensity = 0.3f32;

    let search = window.location().search().unwrap_or_default();
    for pair in search.trim_start_matches('?').split('&') {
        let mut parts = pair.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some("mode"), Some(v)) => {
                mode = match v {
                    "look" => DemoMode::Look,
                    "walk" => DemoMode::Walk,
                    _ => DemoMode::Drunk,
                }
            }
            (Some("seed"), Some(v)) => seed = v.parse().unwrap_or(seed),
            (Some("intensity"), Some(v)) => intensity = v.parse().unwrap_or(intensity),
            _ => {}
        }
    }
    (mode, seed, intensity)
}

/// Setup all input event listeners. They only translate DOM events into
/// `InputEvent`s; all interpretation happens in the frame loop.
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    canvas: &HtmlCanvasElement,
    queue: Rc<RefCell<Vec<InputEvent>>>,
) -> Result<EventListeners, JsValue> {
    let mut listeners = EventListeners::new();

    // Keyboard down
    {
        let queue = queue.clone();
        listeners.add(document.as_ref(), "keydown", move |e: KeyboardEvent| {
            let key = e.key();
            if matches!(key.as_str(), "w" | "a" | "s" | "d" | "W" | "A" | "S" | "D") {
                e.prevent_default();
            }
            queue.borrow_mut().push(InputEvent::KeyDown(key));
        })?;
    }

    // Keyboard up
    {
        let queue = queue.clone();
        listeners.add(document.as_ref(), "keyup", move |e: KeyboardEvent| {
            queue.borrow_mut().push(InputEvent::KeyUp(e.key()));
        })?;
    }

    // Focus loss and tab switches release all held keys
    {
        let queue = queue.clone();
        listeners.add(window.as_ref(), "blur", move |_e: Event| {
            queue.borrow_mut().push(InputEvent::FocusLost);
        })?;
    }
    {
        let queue = queue.clone();
        listeners.add(document.as_ref(), "visibilitychange", move |_e: Event| {
            queue.borrow_mut().push(InputEvent::FocusLost);
        })?;
    }

    // Pointer lock change / error
    {
        let queue = queue.clone();
        let doc = document.clone();
        listeners.add(document.as_ref(), "pointerlockchange", move |_e: Event| {
            let locked = doc.pointer_lock_element().is_some();
            tracing::info!(locked, "pointer lock changed");
            queue
                .borrow_mut()
                .push(InputEvent::PointerLockChanged { locked });
        })?;
    }
    {
        let queue = queue.clone();
        listeners.add(document.as_ref(), "pointerlockerror", move |_e: Event| {
            queue.borrow_mut().push(InputEvent::PointerLockError);
        })?;
    }

    // Canvas click to enter pointer lock
    {
        let canvas_click = canvas.clone();
        listeners.add(canvas.as_ref(), "click", move |_e: MouseEvent| {
            if let Ok(html_el) = canvas_click.clone().dyn_into::<HtmlElement>() {
                html_el.request_pointer_lock();
            }
        })?;
    }

    // Mouse move. Pushed unconditionally; deltas are dropped downstream
    // while the pointer is not locked.
    {
        let queue = queue.clone();
        listeners.add(document.as_ref(), "mousemove", move |e: MouseEvent| {
            queue.borrow_mut().push(InputEvent::MouseMove {
                dx: e.movement_x() as f32,
                dy: e.movement_y() as f32,
            });
        })?;
    }

    Ok(listeners)
}

/// Continuous redraw using requestAnimationFrame. The closure reschedules
/// itself until `running` flips to false; after that it is parked for the
/// lifetime of the page but never invoked again.
#[cfg(target_arch = "wasm32")]
fn start_frame_loop(
    window: Window,
    running: Rc<Cell<bool>>,
    mut frame: impl FnMut() + 'static,
) -> Result<(), JsValue> {
    let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
    let callback_clone = callback.clone();
    let window_for_loop = window.clone();

    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if !running.get() {
            return;
        }
        frame();

        let cb_ref = callback_clone.borrow();
        if let Some(cb) = cb_ref.as_ref() {
            window_for_loop
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .expect("RAF failed");
        }
    }) as Box<dyn FnMut()>));

    window.request_animation_frame(
        callback
            .borrow()
            .as_ref()
            .unwrap()
            .as_ref()
            .unchecked_ref(),
    )?;

    // The Rc cycle through callback_clone keeps the closure alive; the
    // running flag is the off switch.
    std::mem::forget(callback);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn init_canvas(width: u32, height: u32) -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;
    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    canvas_el.set_width(width);
    canvas_el.set_height(height);
    body.append_child(&canvas_el)?;
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}
