//! The brick entity.
//!
//! A [`Brick`] owns a visible body and two invisible collision volumes. The
//! collision volume is slightly smaller than the body so that neighbours on the
//! grid never touch; the vertical collision volume is slightly taller so a brick
//! resting directly on top of another one is still detected as "stacked".
//!
//! All setters re-derive the dependent mesh transforms, mirroring how the brick
//! is displayed: moving the brick moves every mesh, turning it turns every mesh
//! around its own center.

use cgmath::{Deg, Point3, Quaternion, Rotation3, Vector3};

use crate::data_structures::{collision::CollisionBox, instance::Instance};

pub const BRICK_SIZE: [f32; 3] = [2.0, 1.0, 1.0];
pub const COLLISION_SIZE: [f32; 3] = [1.9, 0.9, 0.9];
pub const VERTICAL_COLLISION_SIZE: [f32; 3] = [1.9, 1.1, 0.9];

pub const PERMANENT_ALPHA: f32 = 1.0;
pub const IN_HAND_ALPHA: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color3 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color3 {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Uniformly random channels in `[0, 1)`.
    pub fn random() -> Self {
        Self::new(rand::random(), rand::random(), rand::random())
    }

    pub fn with_alpha(&self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

/// One visible part of a brick.
#[derive(Debug, Clone, PartialEq)]
pub struct BrickMesh {
    /// Offset from the brick position.
    pub origin: Vector3<f32>,
    pub position: Point3<f32>,
    pub size: Vector3<f32>,
    pub turned: bool,
    pub pickable: bool,
    pub color: [f32; 4],
}

impl BrickMesh {
    pub fn bounds(&self) -> CollisionBox {
        let mut bounds = CollisionBox::new(self.position, self.size);
        if self.turned {
            bounds.quarter_turn();
        }
        bounds
    }

    pub fn to_instance(&self) -> Instance {
        let rotation = if self.turned {
            Quaternion::from_angle_y(Deg(90.0))
        } else {
            Quaternion::from_angle_y(Deg(0.0))
        };
        Instance {
            position: Vector3::new(self.position.x, self.position.y, self.position.z),
            rotation,
            scale: self.size,
            color: self.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Brick {
    id: u32,
    color: Color3,
    permanent: bool,
    position: Point3<f32>,
    rotated: bool,
    collision: CollisionBox,
    vertical_collision: CollisionBox,
    meshes: Vec<BrickMesh>,
}

impl Brick {
    pub fn new(id: u32, position: Point3<f32>, color: Color3, permanent: bool) -> Self {
        let body = BrickMesh {
            origin: Vector3::new(0.0, 0.0, 0.0),
            position,
            size: BRICK_SIZE.into(),
            turned: false,
            pickable: permanent,
            color: color.with_alpha(alpha_for(permanent)),
        };
        Self {
            id,
            color,
            permanent,
            position,
            rotated: false,
            collision: CollisionBox::new(position, COLLISION_SIZE.into()),
            vertical_collision: CollisionBox::new(position, VERTICAL_COLLISION_SIZE.into()),
            meshes: vec![body],
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
        for mesh in self.meshes.iter_mut() {
            mesh.position = position + mesh.origin;
        }
        self.collision.center = position;
        self.vertical_collision.center = position;
    }

    pub fn rotated(&self) -> bool {
        self.rotated
    }

    pub fn set_rotated(&mut self, rotated: bool) {
        if rotated != self.rotated {
            self.quarter_turn();
            self.rotated = rotated;
        }
    }

    fn quarter_turn(&mut self) {
        for mesh in self.meshes.iter_mut() {
            mesh.turned = !mesh.turned;
        }
        self.collision.quarter_turn();
        self.vertical_collision.quarter_turn();
    }

    pub fn color(&self) -> Color3 {
        self.color
    }

    pub fn set_color(&mut self, color: Color3) {
        self.color = color;
        let alpha = alpha_for(self.permanent);
        for mesh in self.meshes.iter_mut() {
            mesh.color = color.with_alpha(alpha);
        }
    }

    pub fn permanent(&self) -> bool {
        self.permanent
    }

    pub fn set_permanent(&mut self, permanent: bool) {
        self.permanent = permanent;
        let color = self.color.with_alpha(alpha_for(permanent));
        for mesh in self.meshes.iter_mut() {
            mesh.pickable = permanent;
            mesh.color = color;
        }
    }

    pub fn collision(&self) -> &CollisionBox {
        &self.collision
    }

    pub fn vertical_collision(&self) -> &CollisionBox {
        &self.vertical_collision
    }

    pub fn meshes(&self) -> &[BrickMesh] {
        &self.meshes
    }

    pub fn pickable_meshes(&self) -> impl Iterator<Item = &BrickMesh> {
        self.meshes.iter().filter(|mesh| mesh.pickable)
    }

    /// Release the brick together with every mesh it created.
    pub fn dispose(self) {
        log::debug!("Disposing brick {} ({} meshes)", self.id, self.meshes.len() + 2);
    }
}

fn alpha_for(permanent: bool) -> f32 {
    if permanent {
        PERMANENT_ALPHA
    } else {
        IN_HAND_ALPHA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Color3 {
        Color3::new(1.0, 0.0, 0.0)
    }

    #[test]
    fn new_in_hand_brick_is_translucent_and_not_pickable() {
        let brick = Brick::new(7, Point3::new(0.0, 1.0, 0.0), red(), false);
        assert_eq!(brick.id(), 7);
        assert!(!brick.permanent());
        assert_eq!(brick.meshes().len(), 1);
        assert_eq!(brick.meshes()[0].color, [1.0, 0.0, 0.0, IN_HAND_ALPHA]);
        assert_eq!(brick.pickable_meshes().count(), 0);
    }

    #[test]
    fn making_a_brick_permanent_makes_it_opaque_and_pickable() {
        let mut brick = Brick::new(0, Point3::new(0.0, 1.0, 0.0), red(), false);
        brick.set_permanent(true);
        assert_eq!(brick.meshes()[0].color[3], PERMANENT_ALPHA);
        assert_eq!(brick.pickable_meshes().count(), 1);
    }

    #[test]
    fn moving_a_brick_moves_every_volume() {
        let mut brick = Brick::new(0, Point3::new(0.0, 1.0, 0.0), red(), false);
        let target = Point3::new(2.5, 3.0, -1.0);
        brick.set_position(target);
        assert_eq!(brick.position(), target);
        assert_eq!(brick.collision().center, target);
        assert_eq!(brick.vertical_collision().center, target);
        assert_eq!(brick.meshes()[0].position, target);
        assert_eq!(brick.meshes()[0].bounds().center, target);
    }

    #[test]
    fn rotating_swaps_the_footprint_once() {
        let mut brick = Brick::new(0, Point3::new(0.0, 1.0, 0.0), red(), false);
        brick.set_rotated(true);
        assert!(brick.rotated());
        assert_eq!(brick.collision().size(), Vector3::new(0.9, 0.9, 1.9));
        assert_eq!(brick.vertical_collision().size(), Vector3::new(0.9, 1.1, 1.9));
        assert_eq!(brick.meshes()[0].bounds().size(), Vector3::new(1.0, 1.0, 2.0));

        // Setting the same value again must not turn the brick back.
        brick.set_rotated(true);
        assert_eq!(brick.collision().size(), Vector3::new(0.9, 0.9, 1.9));

        brick.set_rotated(false);
        assert_eq!(brick.collision().size(), Vector3::new(1.9, 0.9, 0.9));
    }

    #[test]
    fn recolouring_keeps_alpha() {
        let mut brick = Brick::new(0, Point3::new(0.0, 1.0, 0.0), red(), false);
        let blue = Color3::new(0.0, 0.0, 1.0);
        brick.set_color(blue);
        assert_eq!(brick.color(), blue);
        assert_eq!(brick.meshes()[0].color, [0.0, 0.0, 1.0, IN_HAND_ALPHA]);
    }

    #[test]
    fn turned_mesh_renders_with_a_quarter_rotation() {
        let mut brick = Brick::new(0, Point3::new(1.0, 1.0, 1.0), red(), true);
        brick.set_rotated(true);
        let instance = brick.meshes()[0].to_instance();
        let turned = instance.rotation * Vector3::new(1.0, 0.0, 0.0);
        assert!(turned.x.abs() < 1e-5);
        assert!((turned.z.abs() - 1.0).abs() < 1e-5);
        assert_eq!(instance.scale, Vector3::new(2.0, 1.0, 1.0));
        assert_eq!(instance.color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn random_colours_stay_in_range() {
        for _ in 0..32 {
            let c = Color3::random();
            for channel in [c.r, c.g, c.b] {
                assert!((0.0..1.0).contains(&channel));
            }
        }
    }
}
