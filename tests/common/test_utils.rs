use brick_placer::{
    capture::Frame,
    context::{BufferWriter, Context},
    data_structures::block::BuildingBlocks,
    flow::{GraphicsFlow, ImageTestResult, Out},
    render::Render,
};
use winit::event::MouseButton;

/// Counts lifecycle hook invocations so tests can assert on their order.
#[derive(Debug, Default)]
pub(crate) struct State {
    frame_counter: u32,
    init_invocations: u32,
    click_invocations: u32,
    update_invocations: u32,
    custom_events: u32,
}

impl State {
    pub fn frame(&mut self) {
        self.frame_counter += 1;
    }

    pub fn init(&mut self) {
        self.init_invocations += 1;
    }

    pub fn click(&mut self) {
        self.click_invocations += 1;
    }

    pub fn update(&mut self) {
        self.update_invocations += 1;
    }

    pub fn custom_event(&mut self) {
        self.custom_events += 1;
    }

    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    pub fn init_invocations(&self) -> u32 {
        self.init_invocations
    }

    pub fn update_invocations(&self) -> u32 {
        self.update_invocations
    }

    pub fn click_invocations(&self) -> u32 {
        self.click_invocations
    }

    pub fn custom_events(&self) -> u32 {
        self.custom_events
    }
}

#[derive(Debug, Default)]
pub(crate) struct FrameCounter(pub(crate) u32);

impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}

/// Something a golden image test draws.
pub(crate) trait Scene {
    fn write(&mut self, ctx: &Context);
    fn render(&self) -> Render<'_>;
}

/// Draws nothing, only the clear colour remains.
pub(crate) struct Empty;

impl Scene for Empty {
    fn write(&mut self, _: &Context) {}

    fn render(&self) -> Render<'_> {
        Render::None
    }
}

impl Scene for BuildingBlocks {
    fn write(&mut self, ctx: &Context) {
        self.write_to_buffer(ctx);
    }

    fn render(&self) -> Render<'_> {
        self.into()
    }
}

pub(crate) type Setup = Box<dyn Fn(&mut Context)>;
pub(crate) type Validate = Box<dyn Fn(&FrameCounter, &Frame) -> anyhow::Result<ImageTestResult>>;

/// Flow that sets up the context, renders a [`Scene`] and validates frames.
pub(crate) struct TestRender<T: Scene> {
    scene: T,
    setup: Setup,
    validate: Validate,
}

impl<T: Scene> TestRender<T> {
    pub(crate) fn new(scene: T, setup: Setup, validate: Validate) -> Self {
        Self {
            scene,
            setup,
            validate,
        }
    }
}

impl<T: Scene> GraphicsFlow<FrameCounter, ()> for TestRender<T> {
    fn on_init(&mut self, ctx: &mut Context, _: &mut FrameCounter) -> Out<FrameCounter, ()> {
        (self.setup)(ctx);
        ctx.write_camera();
        self.scene.write(ctx);
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        self.scene.render()
    }

    fn render_to_texture(
        &self,
        _: &Context,
        state: &mut FrameCounter,
        texture: &mut Frame,
    ) -> anyhow::Result<ImageTestResult> {
        (self.validate)(state, texture)
    }

    fn on_click(
        &mut self,
        _: &Context,
        _: &mut FrameCounter,
        _: MouseButton,
    ) -> Out<FrameCounter, ()> {
        Out::Empty
    }

    fn on_update(
        &mut self,
        _: &Context,
        state: &mut FrameCounter,
        _: std::time::Duration,
    ) -> Out<FrameCounter, ()> {
        state.progress();
        Out::Empty
    }

    fn on_tick(&mut self, _: &Context, _: &mut FrameCounter) -> Out<FrameCounter, ()> {
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut FrameCounter,
        _: &brick_placer::DeviceEvent,
    ) -> Out<FrameCounter, ()> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        _: &mut FrameCounter,
        _: &brick_placer::WindowEvent,
    ) -> Out<FrameCounter, ()> {
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut FrameCounter, event: ()) -> Option<()> {
        Some(event)
    }
}

pub(crate) fn f_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub(crate) fn clear_pixel(colour: wgpu::Color) -> image::Rgba<u8> {
    image::Rgba([
        f_to_u8(colour.r),
        f_to_u8(colour.g),
        f_to_u8(colour.b),
        f_to_u8(colour.a),
    ])
}

/// Run a single flow built by `$make_flow` until its validation passes.
///
/// Winit allows one event loop per process, so every golden image test lives
/// in its own test binary.
#[macro_export]
macro_rules! golden_image_test {
    ($make_flow:expr) => {{
        use brick_placer::flow::{FlowConstructor, GraphicsFlow};
        use $crate::common::test_utils::FrameCounter;

        let constructor: FlowConstructor<FrameCounter, ()> = Box::new(|ctx| {
            Box::pin(async move {
                let g_flow: Box<dyn GraphicsFlow<FrameCounter, ()>> =
                    Box::new(($make_flow)(ctx));
                g_flow
            })
        });

        brick_placer::flow::run(brick_placer::PlacerConfig::default(), vec![constructor])
            .expect("Failed to run flow for integration test.");
    }};
}
