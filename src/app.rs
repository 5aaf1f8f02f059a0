use std::{sync::Arc, time::Instant};

use anyhow::{anyhow, Context};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowAttributes, WindowId},
};

use crate::{
    config::{Args, WINDOW_TITLE},
    gfx::{
        camera::{CameraController, ControlAction, FlyCamera, InputMode},
        rendering::{RenderEngine, SceneAssets},
        scene::{controls::SceneControls, mesh::Mesh},
    },
    performance::FrameTimer,
    ui::{scene_controls_panel, UiManager},
};

/// Loads the model, opens the window and runs the event loop until it closes
pub fn run(args: Args) -> anyhow::Result<()> {
    let mesh = Mesh::load(&args.model)
        .with_context(|| format!("failed to load model {}", args.model.display()))?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut state = AppState::new(args, mesh);
    event_loop
        .run_app(&mut state)
        .context("event loop terminated abnormally")?;

    match state.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Everything the viewer mutates between frames
///
/// Field order is drop order: the UI goes before the renderer, the renderer
/// before the window it draws into.
struct AppState {
    ui_manager: Option<UiManager>,
    render_engine: Option<RenderEngine>,
    window: Option<Arc<Window>>,
    args: Args,
    /// CPU copy of the model, emptied once it is on the GPU
    mesh: Mesh,
    camera: FlyCamera,
    controller: CameraController,
    controls: SceneControls,
    frame_timer: FrameTimer,
    fatal: Option<anyhow::Error>,
}

impl AppState {
    fn new(args: Args, mesh: Mesh) -> Self {
        Self {
            ui_manager: None,
            render_engine: None,
            window: None,
            args,
            mesh,
            camera: FlyCamera::default(),
            controller: CameraController::default(),
            controls: SceneControls::default(),
            frame_timer: FrameTimer::new(Instant::now()),
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(self.args.width, self.args.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );
        let (width, height) = window.inner_size().into();

        let assets = SceneAssets {
            mesh: &self.mesh,
            texture: self.args.texture.as_deref(),
            shader_dir: &self.args.shader_dir,
        };
        let render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            self.args.vsync,
            assets,
        ))?;
        self.mesh = Mesh::default();

        let mut ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
        );

        self.camera.resize_projection(width, height);
        apply_input_mode(&window, &mut ui_manager, self.controller.mode());
        self.frame_timer = FrameTimer::new(Instant::now());

        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(render_engine);
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(render_engine), Some(ui_manager)) = (
            self.window.as_ref(),
            self.render_engine.as_mut(),
            self.ui_manager.as_mut(),
        ) else {
            return;
        };

        let dt = self.frame_timer.tick(Instant::now());
        self.controller.update_camera(&mut self.camera, dt);

        let show_panel = !self.controller.is_captured();
        let controls = &mut self.controls;
        let frame_timer = &self.frame_timer;
        ui_manager.update_logic(window, |ui| {
            if show_panel {
                scene_controls_panel(ui, controls, frame_timer);
            }
        });

        let result = render_engine.render_frame(
            &self.camera,
            &self.controls,
            |device, queue, encoder, view| {
                ui_manager.render_display_only(device, queue, encoder, view);
            },
        );

        if let Err(err) = result {
            ui_manager.discard_frame();
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    log::debug!("Surface {:?}; reconfiguring", err);
                    render_engine.reconfigure();
                }
                wgpu::SurfaceError::OutOfMemory => {
                    self.fatal = Some(anyhow!("GPU out of memory"));
                    event_loop.exit();
                }
                other => log::warn!("Skipping frame: {}", other),
            }
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init(event_loop) {
            self.fatal = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        let ui_wants_keyboard = match self.ui_manager.as_mut() {
            Some(ui_manager) => {
                ui_manager.handle_input(&window, window_id, &event);
                ui_manager.wants_keyboard()
            }
            None => false,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if width > 0 && height > 0 {
                    self.camera.resize_projection(width, height);
                }
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if !key_reaches_controller(
                    key_event.state,
                    self.controller.mode(),
                    ui_wants_keyboard,
                ) {
                    return;
                }
                match self.controller.process_keyboard(&key_event) {
                    Some(ControlAction::Quit) => event_loop.exit(),
                    Some(ControlAction::InputModeChanged(mode)) => {
                        if let Some(ui_manager) = self.ui_manager.as_mut() {
                            apply_input_mode(&window, ui_manager, mode);
                        }
                    }
                    None => {}
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.controller
                    .process_scroll_delta(&delta, &mut self.camera);
            }
            WindowEvent::Focused(false) => self.controller.release_all(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.controller
                .process_mouse_motion(delta, &mut self.camera);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.ui_manager = None;
        self.render_engine = None;
        self.window = None;
        log::info!("Shut down");
    }
}

/// Whether a key event goes on to the camera controller after ImGui saw it
///
/// Presses are withheld only while the cursor is free and an ImGui widget is
/// taking keyboard input. Releases always get through so no movement key
/// stays held.
fn key_reaches_controller(state: ElementState, mode: InputMode, ui_wants_keyboard: bool) -> bool {
    state == ElementState::Released || mode == InputMode::Captured || !ui_wants_keyboard
}

/// Grabs and hides the cursor for camera control, or releases it for the panel
fn apply_input_mode(window: &Window, ui_manager: &mut UiManager, mode: InputMode) {
    match mode {
        InputMode::Captured => {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(err) = grabbed {
                log::warn!("Could not capture the cursor: {}", err);
            }
            window.set_cursor_visible(false);
        }
        InputMode::Free => {
            if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
                log::warn!("Could not release the cursor: {}", err);
            }
            window.set_cursor_visible(true);
        }
    }
    ui_manager.set_mouse_enabled(mode == InputMode::Free);
}
