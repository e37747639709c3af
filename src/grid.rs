//! Grid locking for brick positions.

use cgmath::Point3;

use crate::config::GridConfig;

/// Round half-way values toward positive infinity, so `-0.25` and `0.25`
/// snap to `0.0` and `0.5` respectively on a half-unit grid.
fn round_half_up(value: f32) -> f32 {
    (value + 0.5).floor()
}

/// Snap a picked point onto the brick grid.
///
/// `x` and `z` go to the nearest multiple of `grid.step`. `y` is rounded up to
/// the next layer so a brick resting on a surface never sinks into it.
pub fn lock_to_grid(position: Point3<f32>, grid: &GridConfig) -> Point3<f32> {
    let x = round_half_up(position.x / grid.step) * grid.step;
    let y = (position.y / grid.layer_height).ceil() * grid.layer_height;
    let z = round_half_up(position.z / grid.step) * grid.step;
    Point3::new(x, y, z)
}
