//! Pointer picking.
//!
//! Every frame the pointer is turned into a world-space [`Ray`] (see
//! [`crate::camera::OrbitCamera::cast_ray_from_mouse`]) and tested against the
//! pickable scene: the floor and the visible meshes of placed bricks. The
//! in-hand brick and every collision volume are never pickable, so the brick
//! following the pointer can't pick itself.
//!
//! Picking is done on the CPU: bricks are axis-aligned boxes and the floor is a
//! bounded horizontal plane, so a slab test per mesh is all that is needed.

use cgmath::{InnerSpace, Point3, Vector3};

use crate::{config::FloorConfig, data_structures::brick::Brick};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    /// Always normalized.
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, distance: f32) -> Point3<f32> {
        self.origin + self.direction * distance
    }

    /// Distance to the horizontal plane `y = height`, if it lies ahead.
    pub fn intersect_with_plane(&self, height: f32) -> Option<f32> {
        if self.direction.y.abs() < 1e-6 {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        (t >= 0.0).then_some(t)
    }
}

/// The square floor the bricks stand on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Floor {
    pub size: f32,
    pub height: f32,
}

impl Floor {
    /// Distance along `ray` to the floor surface, hitting either side.
    pub fn ray_distance(&self, ray: &Ray) -> Option<f32> {
        let t = ray.intersect_with_plane(self.height)?;
        let hit = ray.at(t);
        let half = self.size * 0.5;
        (hit.x.abs() <= half && hit.z.abs() <= half).then_some(t)
    }
}

impl From<&FloorConfig> for Floor {
    fn from(config: &FloorConfig) -> Self {
        Self {
            size: config.size,
            height: config.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    Floor,
    Brick(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickingInfo {
    pub picked_point: Point3<f32>,
    pub distance: f32,
    pub target: PickTarget,
}

/// Nearest pickable hit along `ray`.
pub fn pick_with_ray<'a>(
    ray: &Ray,
    floor: &Floor,
    bricks: impl IntoIterator<Item = &'a Brick>,
) -> Option<PickingInfo> {
    let mut nearest = floor.ray_distance(ray).map(|distance| (distance, PickTarget::Floor));

    for brick in bricks {
        for mesh in brick.pickable_meshes() {
            let Some(distance) = mesh.bounds().ray_distance(ray.origin, ray.direction) else {
                continue;
            };
            if nearest.is_none_or(|(best, _)| distance < best) {
                nearest = Some((distance, PickTarget::Brick(brick.id())));
            }
        }
    }

    nearest.map(|(distance, target)| PickingInfo {
        picked_point: ray.at(distance),
        distance,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::brick::Color3;

    fn floor() -> Floor {
        Floor::from(&FloorConfig::default())
    }

    fn down_from(x: f32, z: f32) -> Ray {
        Ray::new(Point3::new(x, 10.0, z), Vector3::new(0.0, -1.0, 0.0))
    }

    fn nothing() -> Vec<Brick> {
        Vec::new()
    }

    fn placed(id: u32, x: f32, y: f32, z: f32) -> Brick {
        Brick::new(id, Point3::new(x, y, z), Color3::new(0.5, 0.5, 0.5), true)
    }

    #[test]
    fn empty_scene_hits_the_floor() {
        let hit = pick_with_ray(&down_from(1.0, -2.0), &floor(), &nothing()).unwrap();
        assert_eq!(hit.target, PickTarget::Floor);
        assert_eq!(hit.picked_point, Point3::new(1.0, 0.5, -2.0));
        assert!((hit.distance - 9.5).abs() < 1e-5);
    }

    #[test]
    fn floor_is_visible_from_below() {
        let ray = Ray::new(Point3::new(0.0, -4.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        let hit = pick_with_ray(&ray, &floor(), &nothing()).unwrap();
        assert_eq!(hit.picked_point.y, 0.5);
    }

    #[test]
    fn pointer_beyond_floor_edge_picks_nothing() {
        assert!(pick_with_ray(&down_from(7.6, 0.0), &floor(), &nothing()).is_none());
        let sideways = Ray::new(Point3::new(0.0, 2.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(pick_with_ray(&sideways, &floor(), &nothing()).is_none());
    }

    #[test]
    fn nearest_brick_wins_over_floor() {
        let bricks = vec![placed(1, 0.0, 1.0, 0.0), placed(2, 0.0, 2.0, 0.0)];
        let hit = pick_with_ray(&down_from(0.5, 0.0), &floor(), &bricks).unwrap();
        assert_eq!(hit.target, PickTarget::Brick(2));
        assert!((hit.picked_point.y - 2.5).abs() < 1e-5);
    }

    #[test]
    fn in_hand_bricks_are_not_pickable() {
        let in_hand = Brick::new(3, Point3::new(0.0, 1.0, 0.0), Color3::new(1.0, 1.0, 1.0), false);
        let hit = pick_with_ray(&down_from(0.0, 0.0), &floor(), [&in_hand]).unwrap();
        assert_eq!(hit.target, PickTarget::Floor);
    }
}
