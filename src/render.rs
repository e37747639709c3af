//! What a flow hands to the renderer each frame.
//!
//! A flow returns a [`Render`] tree from `on_render`. The engine flattens the
//! trees of all flows into [`Batches`]: opaque draws go first, blended draws
//! after them so translucent bricks see the depth of everything solid.

use crate::data_structures::{block::BuildingBlocks, model::Model};

/// One instanced draw: a model and the buffer holding `amount` instances of it.
#[derive(Clone, Copy)]
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

pub enum Render<'a> {
    None,
    Opaque(Instanced<'a>),
    Transparent(Instanced<'a>),
    Composed(Vec<Render<'a>>),
}

/// Draws of one frame, grouped by pipeline.
#[derive(Default)]
pub(crate) struct Batches<'a> {
    pub(crate) opaque: Vec<Instanced<'a>>,
    pub(crate) transparent: Vec<Instanced<'a>>,
}

impl<'a> Batches<'a> {
    pub(crate) fn push(&mut self, render: Render<'a>) {
        match render {
            Render::None => (),
            Render::Opaque(instanced) => self.opaque.push(instanced),
            Render::Transparent(instanced) => self.transparent.push(instanced),
            Render::Composed(renders) => renders.into_iter().for_each(|r| self.push(r)),
        }
    }
}

impl<'a> From<&'a BuildingBlocks> for Render<'a> {
    fn from(blocks: &'a BuildingBlocks) -> Self {
        let instanced = Instanced {
            instance: &blocks.instance_buffer,
            model: &blocks.obj_model,
            amount: blocks.instances.len().min(blocks.capacity()),
        };
        if blocks.transparent {
            Render::Transparent(instanced)
        } else {
            Render::Opaque(instanced)
        }
    }
}
