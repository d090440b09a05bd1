use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use haunted_house::animation::{
    CameraControl, Clock, FrameRenderer, FrameScheduler, SceneAnimator, TimeSource,
};
use haunted_house::config::ControlsConfig;
use haunted_house::gfx::camera::{OrbitControls, PerspectiveCamera};
use haunted_house::gfx::scene::Scene;
use haunted_house::viewport::Viewport;
use haunted_house::{RenderError, SceneConfig, SceneContext};

/// Captures what each render call saw
#[derive(Default)]
struct CapturingRenderer {
    ghosts: Vec<Vec<[f32; 3]>>,
    eyes: Vec<[f32; 3]>,
}

impl FrameRenderer for CapturingRenderer {
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        self.ghosts.push(
            scene
                .ghosts
                .iter()
                .map(|ghost| ghost.light.position.into())
                .collect(),
        );
        self.eyes.push(camera.position.into());
        Ok(())
    }
}

#[derive(Default)]
struct CountingScheduler(Cell<usize>);

impl FrameScheduler for CountingScheduler {
    fn request_next_frame(&self) {
        self.0.set(self.0.get() + 1);
    }
}

struct NoControls;

impl CameraControl for NoControls {
    fn advance(&mut self, _camera: &mut PerspectiveCamera) {}
}

fn manual_clock() -> (Rc<Cell<f64>>, Clock<impl TimeSource>) {
    let now = Rc::new(Cell::new(12.5));
    let handle = now.clone();
    let clock = Clock::with_source(move || Duration::from_secs_f64(handle.get()));
    (now, clock)
}

fn reference_context() -> SceneContext {
    SceneContext::from_config(&SceneConfig::default(), Viewport::new(1280.0, 720.0, 1.0))
}

#[test]
fn ghosts_follow_their_orbits_frame_by_frame() {
    let (now, clock) = manual_clock();
    let mut animator = SceneAnimator::with_clock(clock);
    let mut context = reference_context();
    let mut renderer = CapturingRenderer::default();
    let scheduler = CountingScheduler::default();

    animator.start(&scheduler);
    assert_eq!(scheduler.0.get(), 1);

    let mut times = Vec::new();
    for step in 0..5 {
        let frame = animator
            .tick(&mut context, &mut NoControls, &mut renderer, &scheduler)
            .unwrap()
            .unwrap();
        assert_eq!(frame.index, step);
        times.push(frame.elapsed);
        now.set(now.get() + 0.25);
    }

    assert_eq!(renderer.ghosts.len(), 5);
    assert_eq!(scheduler.0.get(), 6);

    // First frame: every ghost sits on +X at its radius
    assert_eq!(renderer.ghosts[0], vec![[4.0, 0.0, 0.0], [5.0, 0.0, 0.0], [6.0, 0.0, 0.0]]);

    let radii = [4.0_f32, 5.0, 6.0];
    let speeds = [1.0_f64, -0.38, 1.3];
    for (frame, t) in renderer.ghosts.iter().zip(&times) {
        for ((position, radius), speed) in frame.iter().zip(radii).zip(speeds) {
            let phase = speed * t;
            assert_abs_diff_eq!(position[0], (phase.cos() * radius as f64) as f32, epsilon = 1e-5);
            assert_abs_diff_eq!(position[2], (phase.sin() * radius as f64) as f32, epsilon = 1e-5);
            assert!((-1.0..=1.0).contains(&position[1]));
        }
    }
}

#[test]
fn stopping_ends_the_loop_for_good() {
    let (now, clock) = manual_clock();
    let mut animator = SceneAnimator::with_clock(clock);
    let stop = animator.stop_token();
    let mut context = reference_context();
    let mut renderer = CapturingRenderer::default();
    let scheduler = CountingScheduler::default();

    animator.start(&scheduler);
    animator
        .tick(&mut context, &mut NoControls, &mut renderer, &scheduler)
        .unwrap();

    // The token is Send + Sync, so a host may fire it from another thread
    std::thread::spawn(move || stop.stop()).join().unwrap();

    for _ in 0..3 {
        now.set(now.get() + 1.0);
        let frame = animator
            .tick(&mut context, &mut NoControls, &mut renderer, &scheduler)
            .unwrap();
        assert!(frame.is_none());
    }
    assert!(animator.is_stopped());
    assert_eq!(renderer.ghosts.len(), 1);
    assert_eq!(scheduler.0.get(), 2);
}

#[test]
fn orbit_controls_drift_to_rest_under_damping() {
    let (now, clock) = manual_clock();
    let mut animator = SceneAnimator::with_clock(clock);
    let mut context = reference_context();
    let mut renderer = CapturingRenderer::default();
    let scheduler = CountingScheduler::default();
    let mut controls = OrbitControls::new(&ControlsConfig::default(), 720.0);

    let start_distance = context.camera.distance_to_target();
    controls.rotate_by_pixels(120.0, 0.0);

    animator.start(&scheduler);
    for _ in 0..400 {
        animator
            .tick(&mut context, &mut controls, &mut renderer, &scheduler)
            .unwrap();
        now.set(now.get() + 1.0 / 60.0);
    }

    // The eye moved on the first frame but kept its distance to the target
    assert_ne!(renderer.eyes[0], [4.0, 2.0, 5.0]);
    assert_abs_diff_eq!(context.camera.distance_to_target(), start_distance, epsilon = 1e-3);

    // ...and comes to rest once the damped delta is used up
    assert!(!controls.is_moving());
    let last = renderer.eyes.len() - 1;
    for axis in 0..3 {
        assert_abs_diff_eq!(renderer.eyes[last][axis], renderer.eyes[last - 1][axis], epsilon = 1e-4);
    }
}

#[test]
fn resize_updates_camera_aspect_once() {
    let mut context = reference_context();

    let size = context.resize(1024.0, 512.0, 1.0).unwrap();
    assert_eq!((size.width, size.height), (1024, 512));
    assert_abs_diff_eq!(context.camera.aspect, 2.0);

    // Same notification again: nothing to do
    assert!(context.resize(1024.0, 512.0, 1.0).is_none());
    assert_abs_diff_eq!(context.camera.aspect, 2.0);

    // High density displays are capped at two device pixels per logical pixel
    let size = context.resize(1024.0, 512.0, 3.0).unwrap();
    assert_eq!((size.width, size.height), (2048, 1024));
    assert_abs_diff_eq!(context.camera.aspect, 2.0);
}

#[test]
fn render_failure_stops_rescheduling() {
    struct FailingRenderer(RefCell<usize>);

    impl FrameRenderer for FailingRenderer {
        fn render(&mut self, _: &Scene, _: &PerspectiveCamera) -> Result<(), RenderError> {
            *self.0.borrow_mut() += 1;
            Err(RenderError::NoSurfaceFormat)
        }
    }

    let (_now, clock) = manual_clock();
    let mut animator = SceneAnimator::with_clock(clock);
    let mut context = reference_context();
    let mut renderer = FailingRenderer(RefCell::new(0));
    let scheduler = CountingScheduler::default();

    animator.start(&scheduler);
    let result = animator.tick(&mut context, &mut NoControls, &mut renderer, &scheduler);

    assert!(matches!(result, Err(RenderError::NoSurfaceFormat)));
    assert_eq!(*renderer.0.borrow(), 1);
    assert_eq!(scheduler.0.get(), 1, "only the start request");
    assert!(animator.last_frame().is_none());
}
