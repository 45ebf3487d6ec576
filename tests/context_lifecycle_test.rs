use hello_cube::{
    Frame, Renderer, SurfaceSize, ViewerConfig,
    renderer::{ContextRequests, ContextSlot},
};

use crate::common::test_utils::default_scene;

mod common;

#[derive(Debug, PartialEq)]
struct FakeContext {
    generation: u32,
    draws: u32,
}

impl FakeContext {
    fn new(generation: u32) -> Self {
        Self { generation, draws: 0 }
    }
}

fn draw(slot: &mut ContextSlot<FakeContext>) -> Frame {
    match slot.get_mut() {
        Some(ctx) => {
            ctx.draws += 1;
            Frame::Drawn
        }
        None => Frame::Skipped,
    }
}

#[test]
fn should_draw_again_after_loss_and_restore() {
    let mut slot = ContextSlot::default();
    assert_eq!(draw(&mut slot), Frame::Skipped);

    assert!(slot.attach(FakeContext::new(1)).is_none());
    assert_eq!(draw(&mut slot), Frame::Drawn);

    let released = slot.lose().expect("an active context is released on loss");
    assert_eq!(released, FakeContext { generation: 1, draws: 1 });
    assert!(slot.is_lost());
    assert_eq!(draw(&mut slot), Frame::Skipped);

    assert!(slot.attach(FakeContext::new(2)).is_none());
    assert!(slot.is_active());
    assert_eq!(draw(&mut slot), Frame::Drawn);
    assert_eq!(draw(&mut slot), Frame::Drawn);
    assert_eq!(slot.get(), Some(&FakeContext { generation: 2, draws: 2 }));
}

#[test]
fn should_tolerate_repeated_losses() {
    let mut slot = ContextSlot::default();
    slot.attach(FakeContext::new(1));
    assert!(slot.lose().is_some());
    assert!(slot.lose().is_none());
    assert!(slot.is_lost());
}

#[test]
fn should_replace_a_live_context_on_restore() {
    let mut slot = ContextSlot::default();
    slot.attach(FakeContext::new(1));
    let old = slot.attach(FakeContext::new(2));
    assert_eq!(old, Some(FakeContext::new(1)));
}

#[test]
fn should_skip_frames_without_a_context() {
    let config = ViewerConfig::default();
    let mut scene = default_scene(512, 512);
    let mut renderer = Renderer::new(SurfaceSize::new(512, 512), config.clear_colour);

    scene.animate();
    assert!(matches!(renderer.render(&scene), Ok(Frame::Skipped)));
    assert!(renderer.context().is_none());

    renderer.on_context_lost();
    assert!(renderer.is_lost());
    assert!(!renderer.device_lost());
    assert!(matches!(renderer.render(&scene), Ok(Frame::Skipped)));
    assert_eq!(renderer.generation(), 0);
}

#[test]
fn should_start_one_creation_at_a_time() {
    let mut requests = ContextRequests::default();
    let ticket = requests.begin().expect("nothing in flight yet");
    assert!(requests.is_pending());
    assert_eq!(requests.begin(), None);
    assert!(requests.complete(ticket));
    assert!(!requests.is_pending());
    assert!(requests.begin().is_some());
}

#[test]
fn should_allow_a_new_creation_after_a_failure() {
    let mut requests = ContextRequests::default();
    let ticket = requests.begin().unwrap();
    requests.fail(ticket);
    assert!(!requests.is_pending());
    assert_eq!(requests.begin(), Some(ticket));
}

#[test]
fn should_discard_contexts_created_before_a_loss() {
    let mut slot = ContextSlot::default();
    let mut requests = ContextRequests::default();

    let stale = requests.begin().unwrap();
    // lost while the first context was still being created
    slot.lose();
    requests.invalidate();
    assert!(!requests.is_pending());

    let fresh = requests.begin().expect("a restore may start after the loss");
    assert_ne!(stale, fresh);
    assert!(!requests.complete(stale));
    assert!(requests.is_pending());
    assert!(slot.is_lost());

    assert!(requests.complete(fresh));
    slot.attach(FakeContext::new(1));
    assert_eq!(draw(&mut slot), Frame::Drawn);
}

#[test]
fn should_ignore_failures_of_stale_creations() {
    let mut requests = ContextRequests::default();
    let stale = requests.begin().unwrap();
    requests.invalidate();
    let fresh = requests.begin().unwrap();
    requests.fail(stale);
    assert!(requests.is_pending());
    assert!(requests.complete(fresh));
}

#[test]
fn should_tolerate_a_logger_that_is_already_installed() {
    let _ = env_logger::try_init();
    hello_cube::flow::init_logging();
    hello_cube::flow::init_logging();
    log::info!("still running");
}
