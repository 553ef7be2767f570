//! Orbit camera and the perspective projection onto the surface.

use crate::math::{multiply_matrices, multiply_matrix_vector, rotation_x, rotation_y, Vec3};

pub const MIN_RADIUS: f64 = 400.0;
pub const MAX_RADIUS: f64 = 2500.0;
/// Anything closer than this to the camera is not drawn
pub const NEAR_PLANE: f64 = 20.0;
/// How far off-screen a projected point may land and still be kept
pub const CULL_MARGIN: f64 = 50.0;
/// Azimuth advance per frame while the user is not dragging
pub const AUTO_ROTATE_SPEED: f64 = 0.0015;
/// Radians per pixel of pointer drag
pub const DRAG_SENSITIVITY: f64 = 0.003;
/// Radius change per unit of wheel delta
pub const ZOOM_SENSITIVITY: f64 = 0.5;

const DEFAULT_RADIUS: f64 = 1300.0;
const DEFAULT_POLAR: f64 = 0.3;

/// Camera orbiting the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    radius: f64,
    /// Tilt about the horizontal axis
    pub polar: f64,
    /// Orbit about the vertical axis
    pub azimuth: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            radius: DEFAULT_RADIUS,
            polar: DEFAULT_POLAR,
            azimuth: 0.0,
        }
    }
}

impl Camera {
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Sets the orbit radius, clamped to the allowed range
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.clamp(MIN_RADIUS, MAX_RADIUS);
    }

    /// Ambient rotation for one frame
    pub fn auto_rotate(&mut self) {
        self.azimuth += AUTO_ROTATE_SPEED;
    }

    /// Applies a pointer drag of `(dx, dy)` pixels
    pub fn orbit(&mut self, dx: f64, dy: f64) {
        self.azimuth -= dx * DRAG_SENSITIVITY;
        self.polar += dy * DRAG_SENSITIVITY;
    }

    /// Applies a wheel delta; positive moves the camera away
    pub fn zoom(&mut self, delta: f64) {
        self.set_radius(self.radius + delta * ZOOM_SENSITIVITY);
    }

    /// Freezes the current orientation into a projector for one frame
    pub fn projector(&self, fov: f64, width: f64, height: f64) -> Projector {
        Projector {
            rotation: multiply_matrices(&rotation_x(self.polar), &rotation_y(self.azimuth)),
            radius: self.radius,
            fov,
            width,
            height,
        }
    }
}

/// Where a point lands on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub x: f64,
    pub y: f64,
    /// Perspective scale at this depth
    pub scale: f64,
    /// View-space distance from the camera
    pub depth: f64,
}

/// Per-frame world-to-screen transform
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    rotation: [[f64; 3]; 3],
    radius: f64,
    fov: f64,
    width: f64,
    height: f64,
}

impl Projector {
    /// Projects `point`, or `None` when it is behind the near plane or off screen
    pub fn project(&self, point: &Vec3) -> Option<Projection> {
        let [x, y, z] = multiply_matrix_vector(&self.rotation, point);
        let depth = z + self.radius;
        if depth < NEAR_PLANE {
            return None;
        }
        let scale = self.fov / depth;
        let sx = x * scale + self.width / 2.0;
        let sy = y * scale + self.height / 2.0;
        if sx < -CULL_MARGIN
            || sx > self.width + CULL_MARGIN
            || sy < -CULL_MARGIN
            || sy > self.height + CULL_MARGIN
        {
            return None;
        }
        Some(Projection {
            x: sx,
            y: sy,
            scale,
            depth,
        })
    }
}
