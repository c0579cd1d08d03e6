#![forbid(unsafe_code)]

//! Pointer follower.
//!
//! An optional collaborator, independent of the engine: a trailing point that
//! eases toward the pointer each frame, and a tilt target for a 3D layer.
//! Hosts drive it from their own frame callback.

/// Per-frame lerp factor of the trailing point.
pub const DEFAULT_FOLLOW: f64 = 0.15;

/// Maximum tilt in radians on either axis.
pub const MAX_TILT: f64 = 0.15;

/// A point trailing the pointer with a fixed per-frame lerp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerFollower {
    factor: f64,
    target: (f64, f64),
    current: (f64, f64),
}

impl Default for PointerFollower {
    fn default() -> Self {
        Self::new(DEFAULT_FOLLOW)
    }
}

impl PointerFollower {
    /// `factor` is clamped to `[0, 1]`; `1` snaps to the pointer.
    #[must_use]
    pub fn new(factor: f64) -> Self {
        Self {
            factor: if factor.is_nan() { DEFAULT_FOLLOW } else { factor.clamp(0.0, 1.0) },
            target: (0.0, 0.0),
            current: (0.0, 0.0),
        }
    }

    /// Record the latest pointer position.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.target = (x, y);
    }

    /// Advance one frame and return the trailing point.
    pub fn step(&mut self) -> (f64, f64) {
        let (tx, ty) = self.target;
        let (cx, cy) = self.current;
        self.current = (cx + (tx - cx) * self.factor, cy + (ty - cy) * self.factor);
        self.current
    }

    #[must_use]
    pub fn current(&self) -> (f64, f64) {
        self.current
    }
}

/// Tilt `(rotate_x, rotate_y)` for a pointer at `(x, y)` in a viewport.
///
/// The viewport center is level; edges tilt by [`MAX_TILT`].
#[must_use]
pub fn tilt_target(x: f64, y: f64, viewport_width: f64, viewport_height: f64) -> (f64, f64) {
    if viewport_width <= 0.0 || viewport_height <= 0.0 {
        return (0.0, 0.0);
    }
    let nx = (x / viewport_width * 2.0 - 1.0).clamp(-1.0, 1.0);
    let ny = (y / viewport_height * 2.0 - 1.0).clamp(-1.0, 1.0);
    (ny * MAX_TILT, nx * MAX_TILT)
}
