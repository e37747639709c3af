//! Flow control and application event loop.
//!
//! A "flow" is a self-contained part of the application that handles user
//! input, updates its state and hands renderable objects to the engine each
//! frame. The engine owns the window and GPU context, drives all flows and
//! batches their renders into the opaque and transparent pipelines.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow<S, E>`] is the trait for scenes that handle events and rendering
//! - [`Out<S, E>`] lets a hook start background work or reconfigure the context
//!
//! # Lifecycle
//!
//! Each frame the event loop
//! 1. forwards window and device events to `on_<device/window>_events`
//! 2. renders every flow's `on_render()` output and presents the frame
//! 3. runs `on_tick` when a tick is due and advances the camera
//! 4. delivers events produced by finished background futures via `on_custom_events`
//! 5. calls `on_update`
//!
//! Mouse button presses are forwarded to `on_click` as they happen.

use std::{
    fmt::Debug,
    iter,
    pin::Pin,
    sync::{Arc, mpsc},
};

use instant::{Duration, Instant};

use wgpu::WasmNotSend;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    config::PlacerConfig,
    context::{Context, InitContext, MouseButtonState},
    data_structures::{model::DrawModel, texture::DepthTexture},
    render::{Batches, Instanced, Render},
};

#[cfg(feature = "integration-tests")]
use crate::capture::{Frame, OffscreenTarget};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

const WINDOW_TITLE: &str = "Brick Placer";

/// A future resolving to a custom event.
///
/// Natively these run on a tokio runtime next to the event loop and must be
/// `Send`. In the browser they run on the JS microtask queue.
#[cfg(not(target_arch = "wasm32"))]
pub type EventFuture<E> = Pin<Box<dyn Future<Output = E> + Send + 'static>>;
#[cfg(target_arch = "wasm32")]
pub type EventFuture<E> = Pin<Box<dyn Future<Output = E> + 'static>>;

/// Output of every lifecycle hook.
///
/// `Out::FutEvent` starts futures in the background. Each resolved event is
/// handed to `on_custom_events` on a later frame; the frame loop never waits
/// for them.
///
/// `Out::Configure` modifies the context and state right away, for instance to
/// change the tick speed or the clear colour.
///
/// `Empty` is the default output used when nothing needs to happen.
pub enum Out<S, E> {
    FutEvent(Vec<EventFuture<E>>),
    Configure(Box<dyn FnOnce(&mut Context, &mut S)>),
    Empty,
}

impl<S, E> Default for Out<S, E> {
    fn default() -> Self {
        Self::Empty
    }
}

#[cfg(feature = "integration-tests")]
pub enum ImageTestResult {
    Passed,
    Waiting,
    Failed,
}

/// Trait for implementing a renderable scene.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once when the flow is created; configure context (camera, clear color, etc.)
/// 2. `on_window_events()` and `on_device_events()` are called for each winit input event
/// 3. `on_click()` is called when a mouse button is pressed inside the window
/// 4. `on_update()` is called every frame
/// 5. `on_tick()` is called every `tick_duration_millis`
/// 6. `on_custom_events()` is called for events produced by background futures
/// 7. `on_render()` is called each frame and specifies how to render `self`
pub trait GraphicsFlow<S, E> {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<S, E>;

    /// Handle a mouse button press.
    ///
    /// The pointer position is available as `ctx.mouse.coords`.
    fn on_click(&mut self, ctx: &Context, state: &mut S, button: MouseButton) -> Out<S, E>;

    /// Update state every frame with the elapsed time `dt`.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Out<S, E>;

    /// Update state every `tick_duration_millis` milliseconds.
    fn on_tick(&mut self, ctx: &Context, state: &mut S) -> Out<S, E>;

    /// Handle raw device events (mouse motion, raw keys).
    fn on_device_events(&mut self, ctx: &Context, state: &mut S, event: &DeviceEvent) -> Out<S, E>;

    /// Handle window events (keyboard, mouse, window resizing, etc.).
    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent) -> Out<S, E>;

    /// Handle custom application events.
    ///
    /// Returns the event if it was not consumed, allowing it to be passed to
    /// the next flow. Returning `None` means the event was consumed.
    fn on_custom_events(&mut self, ctx: &Context, state: &mut S, event: E) -> Option<E>;

    /// Return renderable objects for this flow.
    fn on_render(&self) -> Render<'_>;

    /// Inspect the rendered frame. The test run ends once every flow passes.
    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut S,
        frame: &mut Frame,
    ) -> anyhow::Result<ImageTestResult>;
}

impl<State, Event> Debug for dyn GraphicsFlow<State, Event> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// A flow factory.
///
/// Takes an [`InitContext`] and asynchronously returns a boxed
/// `GraphicsFlow`, which allows flows to create their GPU resources up front.
pub type FlowConstructor<S, E> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn GraphicsFlow<S, E>>>>>>;

/// Application state bundle: GPU context, app state, and surface status.
#[derive(Debug)]
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    state: State,
    is_surface_configured: bool,
}

impl<State: Default> AppState<State> {
    async fn new(window: Arc<Window>, config: &PlacerConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config).await?;
        Ok(Self {
            ctx,
            state: State::default(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let ctx = &mut self.ctx;
        ctx.config.width = width;
        ctx.config.height = height;
        ctx.projection.resize(width, height);
        ctx.surface.configure(&ctx.device, &ctx.config);
        ctx.depth_texture = DepthTexture::new(&ctx.device, width, height, "depth_texture");
        self.is_surface_configured = true;
    }

    fn render<Event>(
        &mut self,
        graphics_flows: &[Box<dyn GraphicsFlow<State, Event>>],
    ) -> Result<(), wgpu::CurrentSurfaceTexture> {
        // keep the loop spinning
        self.ctx.window.request_redraw();

        if !self.is_surface_configured {
            return Ok(());
        }

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(texture)
            | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => texture,
            other => return Err(other),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.encoder("Render Encoder");
        self.encode_pass(
            &mut encoder,
            &view,
            &self.ctx.depth_texture.view,
            graphics_flows,
        );
        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Render the frame again offscreen and let every flow inspect it.
    ///
    /// Returns `true` once every flow reports [`ImageTestResult::Passed`].
    #[cfg(feature = "integration-tests")]
    fn validate_frame<Event>(
        &mut self,
        graphics_flows: &mut [Box<dyn GraphicsFlow<State, Event>>],
    ) -> anyhow::Result<bool> {
        if !self.is_surface_configured {
            return Ok(false);
        }
        let target = OffscreenTarget::new(
            &self.ctx.device,
            self.ctx.config.format,
            self.ctx.config.width,
            self.ctx.config.height,
        );
        let mut encoder = self.encoder("Capture Encoder");
        self.encode_pass(
            &mut encoder,
            &target.colour_view,
            &target.depth.view,
            graphics_flows,
        );
        target.copy_to_readback(&mut encoder);
        self.ctx.queue.submit(iter::once(encoder.finish()));

        let mut frame = target.read(&self.ctx.device)?;
        let mut all_passed = true;
        for flow in graphics_flows.iter_mut() {
            match flow.render_to_texture(&self.ctx, &mut self.state, &mut frame)? {
                ImageTestResult::Passed => (),
                ImageTestResult::Waiting => all_passed = false,
                ImageTestResult::Failed => anyhow::bail!("A flow rejected the rendered frame"),
            }
        }
        Ok(all_passed)
    }

    fn encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    /// Clear `colour` and draw every flow, opaque batches first.
    fn encode_pass<Event>(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        colour: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        graphics_flows: &[Box<dyn GraphicsFlow<State, Event>>],
    ) {
        let mut batches = Batches::default();
        for flow in graphics_flows {
            batches.push(flow.on_render());
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: colour,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });

        render_pass.set_pipeline(&self.ctx.pipelines.opaque);
        draw_batch(&mut render_pass, &self.ctx, &batches.opaque);
        render_pass.set_pipeline(&self.ctx.pipelines.transparent);
        draw_batch(&mut render_pass, &self.ctx, &batches.transparent);
    }
}

fn draw_batch(render_pass: &mut wgpu::RenderPass<'_>, ctx: &Context, batch: &[Instanced<'_>]) {
    for instanced in batch {
        if instanced.amount == 0 {
            continue;
        }
        render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
        render_pass.draw_model_instanced(
            instanced.model,
            0..instanced.amount as u32,
            &ctx.camera.bind_group,
            &ctx.light.bind_group,
        );
    }
}

pub struct App<State: 'static, Event: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg(target_arch = "wasm32")]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent<State, Event>>,
    config: PlacerConfig,
    state: Option<AppState<State>>,
    // Fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    // Taken on the first `resumed`.
    constructors: Option<Vec<FlowConstructor<State, Event>>>,
    // Background futures report their events here; drained once per frame.
    events_tx: mpsc::Sender<Event>,
    events_rx: mpsc::Receiver<Event>,
    last_time: Instant,
    time_since_tick: Duration,
}

impl<State, Event> App<State, Event>
where
    State: 'static,
    Event: 'static,
{
    fn new(
        event_loop: &EventLoop<FlowEvent<State, Event>>,
        config: PlacerConfig,
        constructors: Vec<FlowConstructor<State, Event>>,
    ) -> anyhow::Result<Self> {
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        let (events_tx, events_rx) = mpsc::channel();
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            #[cfg(target_arch = "wasm32")]
            proxy: event_loop.create_proxy(),
            config,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            events_tx,
            events_rx,
            last_time: Instant::now(),
            time_since_tick: Duration::from_millis(0),
        })
    }
}

/// Sent by the wasm initialization task once the context and flows are ready.
pub(crate) enum FlowEvent<State: 'static, Event: 'static> {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    Initialized {
        state: AppState<State>,
        flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    },
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    Exit,
}

impl<State, Event> Debug for FlowEvent<State, Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
            Self::Exit => f.write_str("Exit"),
        }
    }
}

impl<State, Event> App<State, Event>
where
    State: 'static + Default,
    Event: WasmNotSend + 'static,
{
    /// Call `hook` on every flow and act on what it returns.
    fn notify_flows<F>(&mut self, mut hook: F)
    where
        F: FnMut(
            &mut (dyn GraphicsFlow<State, Event> + 'static),
            &mut Context,
            &mut State,
        ) -> Out<State, Event>,
    {
        let Some(app_state) = &mut self.state else {
            return;
        };
        for flow in self.graphics_flows.iter_mut() {
            let out = hook(flow.as_mut(), &mut app_state.ctx, &mut app_state.state);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                &mut app_state.state,
                &mut app_state.ctx,
                &self.events_tx,
                out,
            );
        }
    }

    /// Deliver every event that background futures produced since the last frame.
    fn drain_custom_events(&mut self) {
        let Some(app_state) = &mut self.state else {
            return;
        };
        while let Ok(custom_event) = self.events_rx.try_recv() {
            let unconsumed = self
                .graphics_flows
                .iter_mut()
                .try_fold(custom_event, |event, flow| {
                    flow.on_custom_events(&app_state.ctx, &mut app_state.state, event)
                });
            if unconsumed.is_some() {
                log::warn!("Custom event was not consumed by any flow");
            }
        }
    }

    fn start(
        &mut self,
        mut app_state: AppState<State>,
        flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    ) {
        let size = app_state.ctx.window.inner_size();
        app_state.resize(size.width, size.height);
        app_state.ctx.window.request_redraw();
        self.state = Some(app_state);
        self.graphics_flows = flows;
        self.notify_flows(|flow, ctx, state| flow.on_init(ctx, state));
    }
}

impl<State, Event> ApplicationHandler<FlowEvent<State, Event>> for App<State, Event>
where
    State: 'static + Default,
    Event: WasmNotSend + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(constructors) = self.constructors.take() else {
            // Already initialized, e.g. resumed after a suspend.
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(WINDOW_TITLE);

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            match find_or_create_canvas() {
                Some(canvas) => window_attributes = window_attributes.with_canvas(Some(canvas)),
                None => log::error!("No canvas to render into, winit will create its own"),
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let config = self.config.clone();
        let init_future = async move {
            let app_state = AppState::new(window, &config).await?;
            let flow_futures: Vec<_> = constructors
                .into_iter()
                .map(|constructor| constructor((&app_state.ctx).into()))
                .collect();
            let flows: Vec<_> = futures::future::join_all(flow_futures).await;
            anyhow::Ok((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((app_state, flows)) => self.start(app_state, flows),
                Err(e) => {
                    log::error!("App initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok((state, flows)) => FlowEvent::Initialized { state, flows },
                    Err(e) => {
                        log::error!("App initialization failed: {:#}", e);
                        FlowEvent::Exit
                    }
                };
                if proxy.send_event(event).is_err() {
                    log::error!("Event loop closed during initialization");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent<State, Event>) {
        match event {
            // Sent by the wasm `spawn_local` in `resumed`
            FlowEvent::Initialized { state, flows } => self.start(state, flows),
            FlowEvent::Exit => event_loop.exit(),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if let MouseButtonState::Right = state.ctx.mouse.pressed {
                state.ctx.camera.controller.handle_mouse(dx, dy);
            }
        }
        self.notify_flows(|flow, ctx, state| flow.on_device_events(ctx, state, &event));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        state.ctx.camera.controller.handle_window_events(&event);
        if let WindowEvent::CursorMoved { position, .. } = event {
            state.ctx.mouse.coords = position;
        };

        self.notify_flows(|flow, ctx, state| flow.on_window_events(ctx, state, &event));

        let Some(state) = &mut self.state else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                self.time_since_tick += dt;

                match state.render(&self.graphics_flows) {
                    Ok(()) => {
                        #[cfg(feature = "integration-tests")]
                        match state.validate_frame(&mut self.graphics_flows) {
                            Ok(true) => event_loop.exit(),
                            Ok(false) => (),
                            Err(e) => panic!("Frame validation failed: {:#}", e),
                        }
                        if self.time_since_tick
                            >= Duration::from_millis(state.ctx.tick_duration_millis)
                        {
                            self.time_since_tick = Duration::from_millis(0);
                            self.notify_flows(|flow, ctx, state| flow.on_tick(ctx, state));
                        }
                        if let Some(state) = &mut self.state {
                            state
                                .ctx
                                .camera
                                .controller
                                .update(&mut state.ctx.camera.camera, dt);
                            state.ctx.write_camera();
                        }
                        self.drain_custom_events();
                        self.notify_flows(|flow, ctx, state| flow.on_update(ctx, state, dt));
                    }
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {:?}", e);
                    }
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => match (button, button_state.is_pressed()) {
                (MouseButton::Left, true) => {
                    state.ctx.mouse.pressed = MouseButtonState::Left;
                    self.notify_flows(|flow, ctx, state| flow.on_click(ctx, state, button));
                }
                (MouseButton::Right, true) => {
                    state.ctx.mouse.pressed = MouseButtonState::Right;
                    self.notify_flows(|flow, ctx, state| flow.on_click(ctx, state, button));
                }
                (_, false) => state.ctx.mouse.pressed = MouseButtonState::None,
                _ => (),
            },
            _ => {}
        }
    }
}

fn handle_flow_output<State, Event: WasmNotSend + 'static>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    state: &mut State,
    ctx: &mut Context,
    events: &mpsc::Sender<Event>,
    out: Out<State, Event>,
) {
    match out {
        Out::FutEvent(futures) => {
            for fut in futures {
                let events = events.clone();
                let deliver = async move {
                    let event = fut.await;
                    if events.send(event).is_err() {
                        log::warn!("Event loop closed before a background event was delivered");
                    }
                };
                #[cfg(not(target_arch = "wasm32"))]
                async_runtime.spawn(deliver);
                #[cfg(target_arch = "wasm32")]
                wasm_bindgen_futures::spawn_local(deliver);
            }
        }
        Out::Configure(f) => f(ctx, state),
        Out::Empty => (),
    }
}

/// Look up the `renderCanvas` element or create and attach one that fills
/// most of the viewport.
#[cfg(target_arch = "wasm32")]
fn find_or_create_canvas() -> Option<web_sys::HtmlCanvasElement> {
    const CANVAS_ID: &str = "renderCanvas";
    const MARGIN: f64 = 50.0;

    let window = web_sys::window()?;
    let document = window.document()?;
    if let Some(canvas) = document.get_element_by_id(CANVAS_ID) {
        return canvas.dyn_into().ok();
    }

    let canvas: web_sys::HtmlCanvasElement =
        document.create_element("canvas").ok()?.dyn_into().ok()?;
    canvas.set_id(CANVAS_ID);
    let width = window.inner_width().ok()?.as_f64()? - MARGIN;
    let height = window.inner_height().ok()?.as_f64()? - MARGIN;
    canvas.set_width(width.max(1.0) as u32);
    canvas.set_height(height.max(1.0) as u32);
    document.body()?.append_child(&canvas).ok()?;
    Some(canvas)
}

/// Install the platform logger. Safe to call more than once.
pub fn init_logger() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            log::debug!("Logger already initialized: {}", e);
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        std::panic::set_hook(Box::new(|info| log::error!("{}", info)));
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
        }
    }
}

pub fn run<State: 'static + Default, Event: WasmNotSend + 'static>(
    config: PlacerConfig,
    constructors: Vec<FlowConstructor<State, Event>>,
) -> anyhow::Result<()> {
    init_logger();

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<FlowEvent<State, Event>> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::with_user_event().with_any_thread(true).build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<FlowEvent<State, Event>> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::with_user_event().with_any_thread(true).build()?
    };

    #[cfg(any(
        not(feature = "integration-tests"),
        not(any(target_os = "linux", target_os = "windows"))
    ))]
    let event_loop: EventLoop<FlowEvent<State, Event>> = EventLoop::with_user_event().build()?;

    let mut app: App<State, Event> = App::new(&event_loop, config, constructors)?;

    #[cfg(not(target_arch = "wasm32"))]
    event_loop.run_app(&mut app)?;

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        event_loop.spawn_app(app);
    }

    Ok(())
}
