//! Window and event-loop harness.
//!
//! Drives a built [`Sketch`]: one simulation step, one buffer sync and one
//! draw per displayed frame, with pointer events feeding the trail canvas
//! and the orbit camera. Everything runs on the event-loop thread; the
//! ordering inside `RedrawRequested` (advance -> sync -> render) is the
//! happens-before chain that keeps the renderer reading only fully
//! bridged buffers.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::error::SketchError;
use crate::gpu::GpuState;
use crate::input::PointerState;
use crate::sketch::Sketch;

/// Run a sketch in a window. Blocks until the window closes.
pub fn run(sketch: Sketch) -> Result<(), SketchError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(sketch);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    sketch: Sketch,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    pointer: PointerState,
    error: Option<SketchError>,
}

impl App {
    fn new(sketch: Sketch) -> Self {
        Self {
            sketch,
            window: None,
            gpu: None,
            pointer: PointerState::new(),
            error: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.sketch.title().to_string())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.error = Some(e.into());
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match pollster::block_on(GpuState::new(window, &self.sketch)) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                self.error = Some(e.into());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.handle_event(&event);
                // Every move feeds the trail, held or not.
                self.sketch
                    .record_pointer(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { .. } | WindowEvent::MouseWheel { .. } => {
                self.pointer.handle_event(&event);
            }
            WindowEvent::RedrawRequested => {
                if let Some(gpu) = &mut self.gpu {
                    if self.pointer.left_held() {
                        let delta = self.pointer.delta();
                        gpu.camera.orbit(delta.x, delta.y);
                    }
                    let scroll = self.pointer.scroll_delta();
                    if scroll != 0.0 {
                        gpu.camera.zoom(scroll);
                    }
                    self.pointer.begin_frame();

                    let (elapsed, delta_time) = self.sketch.advance();
                    gpu.sync(&mut self.sketch);

                    match gpu.render(elapsed, delta_time) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => gpu.resize(winit::dpi::PhysicalSize {
                            width: gpu.config.width,
                            height: gpu.config.height,
                        }),
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => eprintln!("Render error: {:?}", e),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
