//! The brick layout being built: committed bricks plus the brick in hand.
//!
//! Everything here is plain CPU state so it can be driven headlessly. The
//! render flow in [`crate::app`] mirrors it into instance buffers.

use cgmath::{Point3, Vector3};

use crate::{
    config::{GridConfig, PlacerConfig},
    data_structures::{
        brick::{Brick, Color3},
        instance::Instance,
    },
    grid::lock_to_grid,
    pick::{Floor, PickingInfo, Ray, pick_with_ray},
    upload::BrickRecord,
};

#[derive(Debug)]
pub struct Workspace {
    placed: Vec<Brick>,
    in_hand: Brick,
    next_id: u32,
    spawn: Point3<f32>,
    grid: GridConfig,
    floor: Floor,
}

impl Workspace {
    pub fn new(config: &PlacerConfig, color: Color3) -> Self {
        let spawn = Point3::from(config.spawn);
        Self {
            placed: Vec::new(),
            in_hand: Brick::new(0, spawn, color, false),
            next_id: 1,
            spawn,
            grid: config.grid,
            floor: Floor::from(&config.floor),
        }
    }

    pub fn placed(&self) -> &[Brick] {
        &self.placed
    }

    pub fn in_hand(&self) -> &Brick {
        &self.in_hand
    }

    pub fn floor(&self) -> &Floor {
        &self.floor
    }

    /// Nearest hit among the floor and the committed bricks.
    pub fn pick(&self, ray: &Ray) -> Option<PickingInfo> {
        pick_with_ray(ray, &self.floor, &self.placed)
    }

    /// Move the in-hand brick to where `ray` points.
    ///
    /// Returns whether the in-hand brick moved. Nothing happens when the ray
    /// hits neither the floor nor a brick.
    pub fn update_in_hand(&mut self, ray: &Ray) -> bool {
        let Some(info) = self.pick(ray) else {
            return false;
        };
        let before = self.in_hand.position();
        self.place_in_hand_at(info.picked_point);
        self.in_hand.position() != before
    }

    /// Snap the in-hand brick onto the grid cell under `picked_point`.
    ///
    /// While the brick is resting on a placed one it keeps its height. If the
    /// snapped cell is occupied the brick climbs one layer.
    pub fn place_in_hand_at(&mut self, picked_point: Point3<f32>) {
        let mut position = lock_to_grid(picked_point, &self.grid);
        if self.rests_on_placed(&self.in_hand) {
            position.y = self.in_hand.position().y;
        }
        self.in_hand.set_position(position);

        if self.collides_with_placed(&self.in_hand) {
            let bumped = self.in_hand.position() + Vector3::new(0.0, 1.0, 0.0);
            self.in_hand.set_position(bumped);
        }
    }

    /// Whether `brick` touches the vertical collision volume of any placed brick.
    pub fn rests_on_placed(&self, brick: &Brick) -> bool {
        self.placed
            .iter()
            .any(|placed| placed.vertical_collision().intersects(brick.collision()))
    }

    /// Whether `brick` overlaps the collision volume of any placed brick.
    pub fn collides_with_placed(&self, brick: &Brick) -> bool {
        self.placed
            .iter()
            .any(|placed| placed.collision().intersects(brick.collision()))
    }

    /// Make the in-hand brick permanent and take a new one in `next_color`.
    ///
    /// The new brick starts at the spawn point and is moved under the pointer
    /// on the next update.
    pub fn commit(&mut self, next_color: Color3) {
        let fresh = self.spawn_brick(next_color);
        let mut brick = std::mem::replace(&mut self.in_hand, fresh);
        brick.set_permanent(true);
        log::info!(
            "Placed brick {} at ({}, {}, {}){}",
            brick.id(),
            brick.position().x,
            brick.position().y,
            brick.position().z,
            if brick.rotated() { " rotated" } else { "" }
        );
        self.placed.push(brick);
    }

    pub fn toggle_rotation(&mut self) {
        let rotated = !self.in_hand.rotated();
        self.in_hand.set_rotated(rotated);
    }

    /// Records of the committed bricks in commit order.
    pub fn records(&self) -> Vec<BrickRecord> {
        self.placed.iter().map(BrickRecord::from).collect()
    }

    /// Take the layout out of the workspace and start over.
    ///
    /// Every brick is disposed and a fresh in-hand brick in `next_color` is
    /// spawned. The returned records are what should be uploaded.
    pub fn submit(&mut self, next_color: Color3) -> Vec<BrickRecord> {
        let records = self.records();
        let fresh = self.spawn_brick(next_color);
        let in_hand = std::mem::replace(&mut self.in_hand, fresh);
        in_hand.dispose();
        self.placed.drain(..).for_each(Brick::dispose);
        log::info!("Submitted {} bricks", records.len());
        records
    }

    /// Instances of the committed bricks.
    pub fn placed_instances(&self) -> Vec<Instance> {
        self.placed
            .iter()
            .flat_map(|brick| brick.meshes().iter().map(|mesh| mesh.to_instance()))
            .collect()
    }

    pub fn in_hand_instances(&self) -> Vec<Instance> {
        self.in_hand
            .meshes()
            .iter()
            .map(|mesh| mesh.to_instance())
            .collect()
    }

    fn spawn_brick(&mut self, color: Color3) -> Brick {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        Brick::new(id, self.spawn, color, false)
    }
}
