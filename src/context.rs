//! GPU context shared by all flows.
//!
//! [`Context`] owns the surface, device, queue, camera, light and pipelines.
//! Flows get a shared reference every frame and a mutable one in `on_init` or
//! through [`crate::flow::Out::Configure`].

use std::sync::Arc;

use anyhow::Context as _;
use cgmath::Deg;
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalPosition, window::Window};

use crate::{
    camera::{CameraController, CameraResources, CameraUniform, OrbitCamera, Projection},
    config::PlacerConfig,
    data_structures::texture::DepthTexture,
    pipelines::{
        Pipelines,
        light::{LightResources, LightUniform},
    },
};

const ZNEAR: f32 = 0.1;
const ZFAR: f32 = 500.0;
const DEFAULT_TICK_MILLIS: u64 = 100;

/// Anything that keeps a CPU copy of GPU data and can push it to the queue.
pub trait BufferWriter {
    fn write_to_buffer(&mut self, ctx: &Context);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButtonState {
    Left,
    Right,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseState {
    pub coords: PhysicalPosition<f64>,
    pub pressed: MouseButtonState,
}

impl Default for MouseState {
    fn default() -> Self {
        Self {
            coords: PhysicalPosition::new(0.0, 0.0),
            pressed: MouseButtonState::None,
        }
    }
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: DepthTexture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub light: LightResources,
    pub pipelines: Pipelines,
    pub clear_colour: wgpu::Color,
    pub tick_duration_millis: u64,
    pub mouse: MouseState,
}

impl Context {
    pub async fn new(window: Arc<Window>, placer: &PlacerConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("Setting up wgpu");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No graphics adapter is compatible with the surface")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                ..Default::default()
            })
            .await
            .context("Cannot open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader outputs linear colours and expects an sRGB surface
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("The surface reports no texture formats")?;
        let present_mode = surface_caps
            .present_modes
            .first()
            .copied()
            .unwrap_or(wgpu::PresentMode::Fifo);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = OrbitCamera::from(&placer.camera);
        let projection = Projection::new(
            config.width,
            config.height,
            Deg(placer.camera.fovy_degrees),
            ZNEAR,
            ZFAR,
        );
        let controller = CameraController::from(&placer.camera);
        let camera = mk_camera_resources(&device, camera, controller, &projection);

        let depth_texture = DepthTexture::new(&device, config.width, config.height, "depth_texture");

        // Sky light from straight above, no ground bounce.
        let light = LightResources::new(LightUniform::default(), &device);

        let pipelines = Pipelines::new(
            &device,
            config.format,
            &light.bind_group_layout,
            &camera.bind_group_layout,
        );

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            light,
            pipelines,
            clear_colour: placer.clear_colour(),
            tick_duration_millis: DEFAULT_TICK_MILLIS,
            mouse: MouseState::default(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Push the current camera state to its uniform buffer.
    pub fn write_camera(&mut self) {
        self.camera
            .uniform
            .update_view_proj(&self.camera.camera, &self.projection);
        self.queue.write_buffer(
            &self.camera.buffer,
            0,
            bytemuck::cast_slice(&[self.camera.uniform]),
        );
    }
}

fn mk_camera_resources(
    device: &wgpu::Device,
    camera: OrbitCamera,
    controller: CameraController,
    projection: &Projection,
) -> CameraResources {
    let mut uniform = CameraUniform::new();
    uniform.update_view_proj(&camera, projection);

    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Camera Buffer"),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("camera_bind_group_layout"),
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("camera_bind_group"),
    });

    CameraResources {
        camera,
        controller,
        uniform,
        buffer,
        bind_group,
        bind_group_layout,
    }
}

/// The part of the [`Context`] flow constructors need to create GPU resources.
///
/// Device and queue are internally reference counted so cloning them only
/// clones the handle.
#[derive(Debug, Clone)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            surface_format: ctx.config.format,
        }
    }
}
