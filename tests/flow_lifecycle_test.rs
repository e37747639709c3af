#![cfg(feature = "integration-tests")]

mod common;

use brick_placer::{
    PlacerConfig,
    capture::Frame,
    context::Context,
    flow::{FlowConstructor, GraphicsFlow, ImageTestResult, Out},
    render::Render,
};
use wgpu::Color;
use winit::event::MouseButton;

use crate::common::test_utils::State;

#[derive(Debug, PartialEq)]
enum Event {
    Brewed(&'static str),
}

struct GraphicsElement;

impl GraphicsFlow<State, Event> for GraphicsElement {
    fn on_init(&mut self, ctx: &mut Context, state: &mut State) -> Out<State, Event> {
        ctx.clear_colour = Color::TRANSPARENT;
        assert_eq!(state.frame_counter(), 0);
        assert_eq!(state.init_invocations(), 0);
        assert_eq!(state.click_invocations(), 0);
        assert_eq!(state.update_invocations(), 0);

        state.init();
        Out::Empty
    }

    fn on_click(&mut self, _: &Context, state: &mut State, _: MouseButton) -> Out<State, Event> {
        state.click();
        Out::Empty
    }

    fn on_update(
        &mut self,
        _: &Context,
        state: &mut State,
        _: std::time::Duration,
    ) -> Out<State, Event> {
        assert_eq!(state.frame_counter(), state.update_invocations());
        assert_eq!(state.init_invocations(), 1);
        state.frame();
        state.update();

        match state.frame_counter() {
            3 => Out::FutEvent(vec![
                Box::pin(async { Event::Brewed("sencha") }),
                Box::pin(async {
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    Event::Brewed("mate")
                }),
            ]),
            4 => Out::Configure(Box::new(|ctx: &mut Context, _: &mut State| {
                ctx.tick_duration_millis = 10;
            })),
            _ => Out::Empty,
        }
    }

    fn on_tick(&mut self, _: &Context, _: &mut State) -> Out<State, Event> {
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut State,
        _: &brick_placer::DeviceEvent,
    ) -> Out<State, Event> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        _: &mut State,
        _: &brick_placer::WindowEvent,
    ) -> Out<State, Event> {
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, state: &mut State, event: Event) -> Option<Event> {
        // The futures are started in frame 3 and delivered on a later frame.
        assert!(state.frame_counter() >= 3);
        assert!(matches!(event, Event::Brewed("sencha" | "mate")));
        state.custom_event();
        None
    }

    fn on_render(&self) -> Render<'_> {
        Render::None
    }

    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut State,
        _: &mut Frame,
    ) -> anyhow::Result<ImageTestResult> {
        if state.custom_events() < 2 {
            return Ok(ImageTestResult::Waiting);
        }
        assert_eq!(ctx.tick_duration_millis, 10);
        assert_eq!(state.custom_events(), 2);
        Ok(ImageTestResult::Passed)
    }
}

#[test]
fn background_events_reach_the_flow_without_blocking_frames() {
    let constructor: FlowConstructor<State, Event> = Box::new(|_| {
        Box::pin(async move { Box::new(GraphicsElement) as Box<dyn GraphicsFlow<_, _>> })
    });

    if let Err(e) = brick_placer::flow::run(PlacerConfig::default(), vec![constructor]) {
        panic!("{}", e);
    }
}
