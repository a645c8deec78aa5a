//! Window input translated into visualizer intents.
//!
//! [`Input`] watches raw winit events and queues [`Intent`]s for the render
//! loop to apply: pointer hover for repulsion, clicks for shockwaves, left
//! drags for orbiting, the wheel for zoom and number keys for themes.
//!
//! A left press followed by a release counts as a click only if the cursor
//! stayed within [`CLICK_SLOP`] physical pixels of the press; otherwise the
//! gesture is an orbit drag and no shockwave starts.

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Largest cursor travel, in physical pixels, that still counts as a click.
pub const CLICK_SLOP: f32 = 4.0;

/// Something the render loop should do in response to input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Cursor is over the surface at this physical position.
    PointerMoved(Vec2),
    /// Cursor left the surface.
    PointerLeft,
    /// Qualifying click at this physical position.
    Click(Vec2),
    /// Orbit by this many physical pixels of drag.
    Orbit(Vec2),
    /// Zoom by wheel lines; positive zooms in.
    Zoom(f32),
    SelectPalette(usize),
    Exit,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    origin: Vec2,
    dragging: bool,
}

/// Input tracker producing [`Intent`]s.
#[derive(Debug, Default)]
pub struct Input {
    cursor: Option<Vec2>,
    press: Option<Press>,
    keys_held: HashSet<KeyCode>,
    pending: Vec<Intent>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last cursor position in physical pixels, if over the surface.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Whether the left button is down and has moved past the click slop.
    pub fn dragging(&self) -> bool {
        self.press.is_some_and(|p| p.dragging)
    }

    /// Take all intents queued since the last drain.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Intent> {
        self.pending.drain(..)
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.key(code, event.state);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => self.mouse_button(*button, *state),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => self.cursor_left(),
            WindowEvent::MouseWheel { delta, .. } => self.scroll(*delta),
            _ => {}
        }
    }

    pub fn cursor_moved(&mut self, position: Vec2) {
        let previous = self.cursor.replace(position);
        self.pending.push(Intent::PointerMoved(position));

        if let Some(press) = &mut self.press {
            if !press.dragging && position.distance(press.origin) > CLICK_SLOP {
                press.dragging = true;
                // Catch up on the travel inside the slop
                self.pending.push(Intent::Orbit(position - press.origin));
            } else if press.dragging {
                if let Some(previous) = previous {
                    self.pending.push(Intent::Orbit(position - previous));
                }
            }
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = None;
        self.pending.push(Intent::PointerLeft);
    }

    pub fn mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                self.press = self.cursor.map(|origin| Press {
                    origin,
                    dragging: false,
                });
            }
            ElementState::Released => {
                if let (Some(press), Some(cursor)) = (self.press.take(), self.cursor) {
                    if !press.dragging {
                        self.pending.push(Intent::Click(cursor));
                    }
                }
            }
        }
    }

    pub fn scroll(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
        };
        if lines != 0.0 {
            self.pending.push(Intent::Zoom(lines));
        }
    }

    pub fn key(&mut self, code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // Ignore auto-repeat
                if !self.keys_held.insert(code) {
                    return;
                }
                let intent = match code {
                    KeyCode::Digit1 | KeyCode::Numpad1 => Intent::SelectPalette(0),
                    KeyCode::Digit2 | KeyCode::Numpad2 => Intent::SelectPalette(1),
                    KeyCode::Digit3 | KeyCode::Numpad3 => Intent::SelectPalette(2),
                    KeyCode::Escape => Intent::Exit,
                    _ => return,
                };
                self.pending.push(intent);
            }
            ElementState::Released => {
                self.keys_held.remove(&code);
            }
        }
    }
}
