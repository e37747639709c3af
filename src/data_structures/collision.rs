//! Axis-aligned boxes used for brick overlap tests and ray picking.
//!
//! Bricks only ever turn in quarter steps around Y, so their boxes stay axis
//! aligned and a rotation is just an X/Z swap of the half extents.

use cgmath::{EuclideanSpace, Point3, Vector3};

/// Faces closer than this are considered touching.
pub const CONTACT_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionBox {
    pub center: Point3<f32>,
    pub half_extents: Vector3<f32>,
}

impl CollisionBox {
    /// Build a box from its full width (x), height (y) and depth (z).
    pub fn new(center: Point3<f32>, size: Vector3<f32>) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
        }
    }

    pub fn size(&self) -> Vector3<f32> {
        self.half_extents * 2.0
    }

    pub fn min(&self) -> Point3<f32> {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Point3<f32> {
        self.center + self.half_extents
    }

    /// Turn the box a quarter around world Y, pivoting on its own center.
    pub fn quarter_turn(&mut self) {
        std::mem::swap(&mut self.half_extents.x, &mut self.half_extents.z);
    }

    /// Overlap on all three axes. Touching faces count as an intersection,
    /// which is what lets a brick stacked right on top of another one register
    /// against the lower brick's taller vertical collision volume.
    pub fn intersects(&self, other: &CollisionBox) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        (0..3).all(|axis| {
            a_min[axis] <= b_max[axis] + CONTACT_TOLERANCE
                && a_max[axis] + CONTACT_TOLERANCE >= b_min[axis]
        })
    }

    /// Slab test. Returns the distance along `direction` to the first surface
    /// hit in front of `origin`, or the exit distance when `origin` is inside.
    pub fn ray_distance(&self, origin: Point3<f32>, direction: Vector3<f32>) -> Option<f32> {
        let min = self.min().to_vec();
        let max = self.max().to_vec();
        let origin = origin.to_vec();

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            if direction[axis].abs() < f32::EPSILON {
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction[axis];
            let mut t0 = (min[axis] - origin[axis]) * inv;
            let mut t1 = (max[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 {
            None
        } else if t_near >= 0.0 {
            Some(t_near)
        } else {
            Some(t_far)
        }
    }
}
