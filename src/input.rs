//! Mouse input tracking.
//!
//! The sketches use only the pointer: its position feeds the trail canvas,
//! and drag/scroll drive the orbit camera. [`PointerState`] turns raw
//! window events into that small queryable surface.

use glam::Vec2;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl From<WinitMouseButton> for MouseButton {
    fn from(btn: WinitMouseButton) -> Self {
        match btn {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Left, // Default for other buttons
        }
    }
}

/// Pointer state assembled from window events.
#[derive(Debug, Default)]
pub struct PointerState {
    position: Vec2,
    last_position: Option<Vec2>,
    delta: Vec2,
    moved: bool,
    left_held: bool,
    scroll_delta: f32,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer position in window pixels.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Movement since the previous frame in pixels.
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Whether the pointer moved since the previous frame.
    pub fn moved(&self) -> bool {
        self.moved
    }

    /// Whether the left button is currently held.
    pub fn left_held(&self) -> bool {
        self.left_held
    }

    /// Scroll wheel delta accumulated this frame.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.delta = Vec2::ZERO;
        self.moved = false;
        self.scroll_delta = 0.0;
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = Vec2::new(position.x as f32, position.y as f32);
                if let Some(last) = self.last_position {
                    self.delta += new_pos - last;
                }
                self.last_position = Some(new_pos);
                self.position = new_pos;
                self.moved = true;
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if MouseButton::from(*button) == MouseButton::Left {
                    self.left_held = *state == ElementState::Pressed;
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
            }

            _ => {}
        }
    }
}
