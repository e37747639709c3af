use wgpu::Device;

use crate::{
    context::{BufferWriter, Context},
    data_structures::{
        instance::{Instance, InstanceRaw},
        model::{self, Geometry},
    },
};

/**
 * `BuildingBlocks` draws many copies of one mesh through instancing.
 *
 * Bricks, the in-hand brick and the floor are each one `BuildingBlocks`: a
 * unit mesh plus an instance buffer that stretches, turns and colours every
 * copy. The instance buffer grows on demand when more instances are written
 * than it can hold.
 */
pub struct BuildingBlocks {
    pub id: u32,
    pub obj_model: model::Model,
    pub instances: Vec<Instance>,
    pub instance_buffer: wgpu::Buffer,
    pub transparent: bool,
    capacity: usize,
}

impl BuildingBlocks {
    pub fn new(id: u32, device: &Device, geometry: &Geometry, name: &str, transparent: bool) -> Self {
        let obj_model = model::Model {
            meshes: vec![geometry.upload(device, name)],
        };
        let capacity = 1;
        let instance_buffer = mk_instance_buffer(device, capacity);

        Self {
            id,
            obj_model,
            instances: Vec::new(),
            instance_buffer,
            transparent,
            capacity,
        }
    }

    /// Replace all instances. Call [`BufferWriter::write_to_buffer`] afterwards
    /// to make the change visible.
    pub fn set_instances(&mut self, instances: Vec<Instance>) {
        self.instances = instances;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl BufferWriter for BuildingBlocks {
    fn write_to_buffer(&mut self, ctx: &Context) {
        if self.instances.is_empty() {
            return;
        }
        if self.instances.len() > self.capacity {
            self.capacity = self.instances.len().next_power_of_two();
            log::debug!(
                "Growing instance buffer of block {} to {} instances",
                self.id,
                self.capacity
            );
            self.instance_buffer = mk_instance_buffer(&ctx.device, self.capacity);
        }
        let instance_data = self.instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
        ctx.queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instance_data));
    }
}

fn mk_instance_buffer(device: &Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: (capacity * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
