// src/ui/manager.rs
//! ImGui UI manager for the viewer
//!
//! Handles ImGui integration with wgpu and winit, providing frame management,
//! input handling, and rendering of the debug overlay.

use imgui::{ConfigFlags, Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::{Window, WindowId},
};

/// ImGui UI manager
///
/// Owns the ImGui context, platform integration and renderer. A frame is
/// started every redraw even when no window is shown, so the overlay pass
/// always has draw data.
pub struct UiManager {
    context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
}

impl UiManager {
    /// Creates a new UI manager
    ///
    /// Uses locked DPI mode to prevent automatic scaling conflicts.
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        let font_size = 24.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        let renderer_config = RendererConfig {
            texture_format: output_color_format,
            ..Default::default()
        };
        let renderer = Renderer::new(&mut context, device, queue, renderer_config);

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    /// Lets ImGui see the mouse and change the cursor, or hides both from it
    ///
    /// Disabled while the camera owns the cursor so ImGui never shows it.
    pub fn set_mouse_enabled(&mut self, enabled: bool) {
        let flags = &mut self.context.io_mut().config_flags;
        flags.set(ConfigFlags::NO_MOUSE, !enabled);
        flags.set(ConfigFlags::NO_MOUSE_CURSOR_CHANGE, !enabled);
        self.last_cursor = None;
    }

    /// Feeds an input event to ImGui
    pub fn handle_input(&mut self, window: &Window, window_id: WindowId, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. }
            | WindowEvent::KeyboardInput { .. }
            | WindowEvent::ModifiersChanged(_)
            | WindowEvent::Resized(_)
            | WindowEvent::Focused(_) => {
                let ui_event: Event<()> = Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                };
                self.platform
                    .handle_event(self.context.io_mut(), window, &ui_event);
            }
            _ => {}
        }
    }

    /// True while a widget takes text or key input, e.g. a ctrl+click edit of a slider
    pub fn wants_keyboard(&self) -> bool {
        self.context.io().want_capture_keyboard
    }

    /// Starts a new ImGui frame and builds it with `run_ui`
    pub fn update_logic<F>(&mut self, window: &Window, run_ui: F)
    where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(err) = self.platform.prepare_frame(self.context.io_mut(), window) {
            log::warn!("Failed to prepare UI frame: {}", err);
        }

        let ui = self.context.frame();
        run_ui(ui);

        let cursor_locked = ui
            .io()
            .config_flags
            .contains(ConfigFlags::NO_MOUSE_CURSOR_CHANGE);
        if !cursor_locked && self.last_cursor != ui.mouse_cursor() {
            self.last_cursor = ui.mouse_cursor();
            self.platform.prepare_render(ui, window);
        }
    }

    /// Ends the current frame without drawing it, for frames that were never presented
    pub fn discard_frame(&mut self) {
        self.context.render();
    }

    /// Renders the UI built in the last `update_logic()` call
    ///
    /// Uses LoadOp::Load to preserve the scene already in `color_attachment`.
    pub fn render_display_only(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_attachment: &TextureView,
    ) {
        let draw_data = self.context.render();

        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imgui_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(err) = self
            .renderer
            .render(draw_data, queue, device, &mut render_pass)
        {
            log::error!("Failed to render UI: {:?}", err);
        }
    }
}
