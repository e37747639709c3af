//! The interactive brick placer.
//!
//! [`BrickPlacer`] is the single flow of the application. It keeps a
//! [`Workspace`] in sync with three instanced meshes (floor, committed bricks
//! and the translucent in-hand brick) and translates input into workspace
//! operations:
//!
//! - pointer motion moves the in-hand brick every frame
//! - left click commits it
//! - `r` turns it by a quarter
//! - `Enter` uploads the layout and starts over

use cgmath::{Quaternion, Vector3};
use instant::Duration;
use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{Key, NamedKey},
};

#[cfg(feature = "integration-tests")]
use crate::flow::ImageTestResult;
use crate::{
    config::PlacerConfig,
    context::{BufferWriter, Context, InitContext},
    data_structures::{
        block::BuildingBlocks,
        brick::Color3,
        instance::Instance,
        model::Geometry,
    },
    error::PlacerError,
    flow::{EventFuture, FlowConstructor, GraphicsFlow, Out},
    placement::Workspace,
    render::Render,
    upload::{UploadClient, UploadReceipt},
};

const FLOOR_ID: u32 = 0;
const PLACED_ID: u32 = 1;
const IN_HAND_ID: u32 = 2;
const FLOOR_COLOR: Color3 = Color3::new(0.6, 0.6, 0.6);

/// Session counters shared across flows.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlacerState {
    pub submitted: usize,
    pub failed_uploads: usize,
    pub pending_uploads: usize,
    pub last_receipt: Option<UploadReceipt>,
}

impl PlacerState {
    /// Book-keeping for a finished upload.
    pub fn record_upload(&mut self, result: Result<UploadReceipt, PlacerError>) {
        self.pending_uploads = self.pending_uploads.saturating_sub(1);
        match result {
            Ok(receipt) => {
                log::info!("Layout stored (status {}): {}", receipt.status, receipt.body);
                self.submitted += 1;
                self.last_receipt = Some(receipt);
            }
            Err(e) => {
                log::error!("Layout upload failed: {}", e);
                self.failed_uploads += 1;
            }
        }
    }
}

#[derive(Debug)]
pub enum PlacerEvent {
    UploadFinished(Result<UploadReceipt, PlacerError>),
}

/// What a key press asks the placer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Rotate,
    Submit,
}

impl KeyCommand {
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        Self::from_parts(event.state, event.repeat, event.logical_key.as_ref())
    }

    /// Fresh presses of `r` and `Enter`. Held-key repeats and releases are ignored.
    pub fn from_parts(state: ElementState, repeat: bool, key: Key<&str>) -> Option<Self> {
        if state != ElementState::Pressed || repeat {
            return None;
        }
        Self::from_key(key)
    }

    pub fn from_key(key: Key<&str>) -> Option<Self> {
        match key {
            Key::Character("r") => Some(Self::Rotate),
            Key::Named(NamedKey::Enter) => Some(Self::Submit),
            _ => None,
        }
    }
}

pub struct BrickPlacer {
    workspace: Workspace,
    uploader: Option<UploadClient>,
    floor: BuildingBlocks,
    placed: BuildingBlocks,
    in_hand: BuildingBlocks,
    dirty: bool,
}

impl BrickPlacer {
    pub fn new(ctx: &InitContext, config: &PlacerConfig) -> Self {
        let uploader = match UploadClient::new(&config.upload) {
            Ok(client) => {
                log::info!("Layouts will be uploaded to {}", client.endpoint());
                Some(client)
            }
            Err(e) => {
                log::error!("Uploads are disabled: {}", e);
                None
            }
        };

        let brick = Geometry::unit_box();
        let mut floor = BuildingBlocks::new(
            FLOOR_ID,
            &ctx.device,
            &Geometry::unit_quad(),
            "floor",
            false,
        );
        floor.set_instances(vec![Instance {
            position: Vector3::new(0.0, config.floor.height, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(config.floor.size, 1.0, config.floor.size),
            color: FLOOR_COLOR.with_alpha(1.0),
        }]);

        Self {
            workspace: Workspace::new(config, Color3::random()),
            uploader,
            floor,
            placed: BuildingBlocks::new(PLACED_ID, &ctx.device, &brick, "placed bricks", false),
            in_hand: BuildingBlocks::new(IN_HAND_ID, &ctx.device, &brick, "in-hand brick", true),
            dirty: true,
        }
    }

    pub fn constructor(config: PlacerConfig) -> FlowConstructor<PlacerState, PlacerEvent> {
        Box::new(move |ctx| {
            Box::pin(async move {
                Box::new(BrickPlacer::new(&ctx, &config))
                    as Box<dyn GraphicsFlow<PlacerState, PlacerEvent>>
            })
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    fn sync_buffers(&mut self, ctx: &Context) {
        if !self.dirty {
            return;
        }
        self.placed.set_instances(self.workspace.placed_instances());
        self.in_hand.set_instances(self.workspace.in_hand_instances());
        self.placed.write_to_buffer(ctx);
        self.in_hand.write_to_buffer(ctx);
        self.dirty = false;
    }

    fn submit(&mut self, state: &mut PlacerState) -> Out<PlacerState, PlacerEvent> {
        let records = self.workspace.submit(Color3::random());
        self.dirty = true;
        let Some(client) = self.uploader.clone() else {
            log::error!("Dropping a layout of {} bricks, uploads are disabled", records.len());
            state.failed_uploads += 1;
            return Out::Empty;
        };
        state.pending_uploads += 1;
        let upload: EventFuture<PlacerEvent> =
            Box::pin(async move { PlacerEvent::UploadFinished(client.upload(&records).await) });
        Out::FutEvent(vec![upload])
    }
}

impl GraphicsFlow<PlacerState, PlacerEvent> for BrickPlacer {
    fn on_init(&mut self, ctx: &mut Context, _: &mut PlacerState) -> Out<PlacerState, PlacerEvent> {
        self.floor.write_to_buffer(ctx);
        self.sync_buffers(ctx);
        Out::Empty
    }

    fn on_click(
        &mut self,
        _: &Context,
        _: &mut PlacerState,
        button: MouseButton,
    ) -> Out<PlacerState, PlacerEvent> {
        if button == MouseButton::Left {
            self.workspace.commit(Color3::random());
            self.dirty = true;
        }
        Out::Empty
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        _: &mut PlacerState,
        _: Duration,
    ) -> Out<PlacerState, PlacerEvent> {
        let ray = ctx.camera.camera.cast_ray_from_mouse(
            ctx.mouse.coords,
            ctx.config.width as f32,
            ctx.config.height as f32,
            &ctx.projection,
        );
        if self.workspace.update_in_hand(&ray) {
            self.dirty = true;
        }
        self.sync_buffers(ctx);
        Out::Empty
    }

    fn on_tick(&mut self, _: &Context, _: &mut PlacerState) -> Out<PlacerState, PlacerEvent> {
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut PlacerState,
        _: &DeviceEvent,
    ) -> Out<PlacerState, PlacerEvent> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        state: &mut PlacerState,
        event: &WindowEvent,
    ) -> Out<PlacerState, PlacerEvent> {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return Out::Empty;
        };
        match KeyCommand::from_key_event(event) {
            Some(KeyCommand::Rotate) => {
                self.workspace.toggle_rotation();
                self.dirty = true;
                Out::Empty
            }
            Some(KeyCommand::Submit) => self.submit(state),
            None => Out::Empty,
        }
    }

    fn on_custom_events(
        &mut self,
        _: &Context,
        state: &mut PlacerState,
        event: PlacerEvent,
    ) -> Option<PlacerEvent> {
        match event {
            PlacerEvent::UploadFinished(result) => state.record_upload(result),
        }
        None
    }

    fn on_render(&self) -> Render<'_> {
        Render::Composed(vec![
            (&self.floor).into(),
            (&self.placed).into(),
            (&self.in_hand).into(),
        ])
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut PlacerState,
        _: &mut crate::capture::Frame,
    ) -> anyhow::Result<ImageTestResult> {
        // Nothing to verify here; test flows rendered alongside decide.
        Ok(ImageTestResult::Passed)
    }
}

/// Load the configuration and run the placer until the window closes.
pub fn run() -> anyhow::Result<()> {
    crate::flow::init_logger();
    let config = PlacerConfig::load()?;
    crate::flow::run(config.clone(), vec![BrickPlacer::constructor(config)])
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run().map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{:#}", e)))
}
