//! Maps normalized pointer and wheel input onto the camera.

use crate::camera::Camera;

/// Input the simulation understands, already stripped of device details
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown,
    /// Pointer moved by `(dx, dy)` pixels
    PointerMove { dx: f64, dy: f64 },
    PointerUp,
    /// Wheel scrolled; positive zooms out
    Wheel { delta: f64 },
    Detonate,
}

/// Drag state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interaction {
    dragging: bool,
}

impl Interaction {
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Applies a camera-facing event. `Detonate` is left to the caller.
    pub fn apply(&mut self, event: InputEvent, camera: &mut Camera) {
        match event {
            InputEvent::PointerDown => self.dragging = true,
            InputEvent::PointerUp => self.dragging = false,
            InputEvent::PointerMove { dx, dy } => {
                if self.dragging {
                    camera.orbit(dx, dy);
                }
            }
            InputEvent::Wheel { delta } => camera.zoom(delta),
            InputEvent::Detonate => {}
        }
    }
}
