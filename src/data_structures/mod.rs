//! Engine and scene data structures.
//!
//! - `brick` is the placeable brick entity and its meshes
//! - `collision` holds the axis-aligned boxes used for overlap tests and picking
//! - `model` contains mesh definitions and the procedural box/quad geometry
//! - `texture` wraps the depth texture
//! - `block` is an instanced mesh (model + instance buffer) on the GPU
//! - `instance` holds per-instance transformation and colour data

pub mod block;
pub mod brick;
pub mod collision;
pub mod instance;
pub mod model;
pub mod texture;
