//! Offscreen frame capture for golden image tests.
//!
//! The frame is rendered a second time into a texture of the window's size,
//! copied into a mappable buffer and handed to every flow's
//! `render_to_texture` as a tightly packed RGBA image.

use anyhow::Context as _;
use instant::Duration;

use crate::data_structures::texture::DepthTexture;

/// A captured frame. Channel order follows the surface format, so on BGRA
/// surfaces red and blue are swapped.
pub type Frame = image::RgbaImage;

const BYTES_PER_PIXEL: u32 = 4;
const MAP_TIMEOUT: Duration = Duration::from_secs(3);

pub(crate) struct OffscreenTarget {
    colour: wgpu::Texture,
    pub(crate) colour_view: wgpu::TextureView,
    pub(crate) depth: DepthTexture,
    readback: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_row: u32,
}

impl OffscreenTarget {
    pub(crate) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let colour = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Capture Texture"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let colour_view = colour.create_view(&wgpu::TextureViewDescriptor::default());
        let padded_row = padded_row_bytes(width);
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Readback Buffer"),
            size: (padded_row * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self {
            colour,
            colour_view,
            depth: DepthTexture::new(device, width, height, "Capture Depth Texture"),
            readback,
            width,
            height,
            padded_row,
        }
    }

    pub(crate) fn copy_to_readback(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.colour,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_row),
                    rows_per_image: Some(self.height),
                },
            },
            extent(self.width, self.height),
        );
    }

    /// Wait for the copy and strip the row padding. Call after submitting the
    /// encoder passed to [`Self::copy_to_readback`].
    pub(crate) fn read(&self, device: &wgpu::Device) -> anyhow::Result<Frame> {
        let slice = self.readback.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(MAP_TIMEOUT),
            })
            .context("Waiting for the captured frame")?;
        futures::executor::block_on(rx.receive())
            .context("Readback mapping was cancelled")?
            .context("Cannot map the readback buffer")?;

        let row = (self.width * BYTES_PER_PIXEL) as usize;
        let pixels = {
            let data = slice.get_mapped_range();
            unpad_rows(&data, self.padded_row as usize, row, self.height as usize)
        };
        self.readback.unmap();
        Frame::from_raw(self.width, self.height, pixels)
            .context("Captured frame is smaller than the window")
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

/// Buffer copies need rows aligned to `COPY_BYTES_PER_ROW_ALIGNMENT`.
fn padded_row_bytes(width: u32) -> u32 {
    (width * BYTES_PER_PIXEL).div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

fn unpad_rows(data: &[u8], padded_row: usize, row: usize, rows: usize) -> Vec<u8> {
    data.chunks(padded_row)
        .take(rows)
        .flat_map(|chunk| &chunk[..row])
        .copied()
        .collect()
}
