//! Frame scheduler and scene animator.
//!
//! One animation cycle, in order:
//!
//! 1. pull the next [`FrameEvent`] (ticks the clock),
//! 2. move every ghost light to its orbit position for the frame's elapsed time,
//! 3. advance the camera controls,
//! 4. render once,
//! 5. ask the host to schedule the next cycle.
//!
//! The loop ends when its [`StopToken`] fires or a render fails.

use std::iter::FusedIterator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::context::SceneContext;
use crate::error::RenderError;
use crate::gfx::camera::PerspectiveCamera;
use crate::gfx::scene::Scene;

use super::clock::{Clock, InstantSource, TimeSource};

/// Per-frame camera interaction update
pub trait CameraControl {
    fn advance(&mut self, camera: &mut PerspectiveCamera);
}

/// Issues the render call for one frame
pub trait FrameRenderer {
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError>;
}

/// Host hook that runs the next cycle on the next display refresh
pub trait FrameScheduler {
    fn request_next_frame(&self);
}

/// One-way cancellation flag shared between the loop and its host
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the loop; there is no way to restart it
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Timing of one animation cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEvent {
    /// Zero-based frame counter
    pub index: u64,
    /// Seconds since the first frame
    pub elapsed: f64,
    /// Seconds since the previous frame
    pub delta: f64,
}

/// Lazy, infinite stream of frame events
///
/// Each `next` ticks the clock exactly once. Once the stop token fires the
/// stream is exhausted for good.
#[derive(Debug)]
pub struct FrameEvents<S = InstantSource> {
    clock: Clock<S>,
    stop: StopToken,
    next_index: u64,
    finished: bool,
}

impl<S: TimeSource> FrameEvents<S> {
    pub fn new(clock: Clock<S>, stop: StopToken) -> Self {
        Self {
            clock,
            stop,
            next_index: 0,
            finished: false,
        }
    }

    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }
}

impl<S: TimeSource> Iterator for FrameEvents<S> {
    type Item = FrameEvent;

    fn next(&mut self) -> Option<FrameEvent> {
        if self.finished || self.stop.is_stopped() {
            self.finished = true;
            return None;
        }

        let time = self.clock.tick();
        let event = FrameEvent {
            index: self.next_index,
            elapsed: time.elapsed,
            delta: time.delta,
        };
        self.next_index += 1;
        Some(event)
    }
}

impl<S: TimeSource> FusedIterator for FrameEvents<S> {}

/// Moves every ghost light to its orbit position at `elapsed` seconds
pub fn animate_lights(scene: &mut Scene, elapsed: f64) {
    for ghost in &mut scene.ghosts {
        ghost.follow(elapsed);
    }
}

/// Drives the update/render cycle
pub struct SceneAnimator<S = InstantSource> {
    frames: FrameEvents<S>,
    started: bool,
    last_frame: Option<FrameEvent>,
}

impl SceneAnimator<InstantSource> {
    pub fn new() -> Self {
        Self::with_clock(Clock::new())
    }
}

impl Default for SceneAnimator<InstantSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TimeSource> SceneAnimator<S> {
    pub fn with_clock(clock: Clock<S>) -> Self {
        Self {
            frames: FrameEvents::new(clock, StopToken::new()),
            started: false,
            last_frame: None,
        }
    }

    /// Token that ends the loop when fired
    pub fn stop_token(&self) -> StopToken {
        self.frames.stop_token()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_stopped(&self) -> bool {
        self.frames.stop.is_stopped()
    }

    /// Most recent frame that was rendered
    pub fn last_frame(&self) -> Option<FrameEvent> {
        self.last_frame
    }

    /// Starts the loop by scheduling its first cycle
    pub fn start(&mut self, scheduler: &impl FrameScheduler) {
        if self.started {
            log::warn!("Animation loop already started; ignoring second start");
            return;
        }
        self.started = true;
        log::info!("Animation loop started");
        scheduler.request_next_frame();
    }

    /// Runs one cycle
    ///
    /// Returns the frame that was rendered, or `None` when the loop has not
    /// been started or has been stopped. A render error is returned as-is and
    /// the next cycle is not scheduled.
    pub fn tick<C, R, F>(
        &mut self,
        context: &mut SceneContext,
        controls: &mut C,
        renderer: &mut R,
        scheduler: &F,
    ) -> Result<Option<FrameEvent>, RenderError>
    where
        C: CameraControl + ?Sized,
        R: FrameRenderer + ?Sized,
        F: FrameScheduler + ?Sized,
    {
        if !self.started {
            log::trace!("Frame requested before the animation loop started");
            return Ok(None);
        }

        let Some(frame) = self.frames.next() else {
            return Ok(None);
        };

        animate_lights(&mut context.scene, frame.elapsed);
        controls.advance(&mut context.camera);
        renderer.render(&context.scene, &context.camera)?;

        log::trace!("Rendered frame {} at {:.3}s", frame.index, frame.elapsed);
        self.last_frame = Some(frame);
        scheduler.request_next_frame();
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::viewport::Viewport;
    use approx::assert_abs_diff_eq;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    struct RecordingControls(Log);

    impl CameraControl for RecordingControls {
        fn advance(&mut self, _camera: &mut PerspectiveCamera) {
            self.0.borrow_mut().push("controls");
        }
    }

    struct RecordingRenderer {
        log: Log,
        ghost_positions: Vec<Vec<[f32; 3]>>,
        fail: bool,
    }

    impl FrameRenderer for RecordingRenderer {
        fn render(&mut self, scene: &Scene, _camera: &PerspectiveCamera) -> Result<(), RenderError> {
            self.log.borrow_mut().push("render");
            if self.fail {
                return Err(RenderError::Frame(wgpu::SurfaceError::OutOfMemory));
            }
            self.ghost_positions.push(
                scene
                    .ghosts
                    .iter()
                    .map(|ghost| ghost.light.position.into())
                    .collect(),
            );
            Ok(())
        }
    }

    struct RecordingScheduler(Log);

    impl FrameScheduler for RecordingScheduler {
        fn request_next_frame(&self) {
            self.0.borrow_mut().push("schedule");
        }
    }

    struct Harness {
        now: Rc<Cell<f64>>,
        log: Log,
        animator: SceneAnimator<Box<dyn Fn() -> Duration>>,
        context: SceneContext,
        controls: RecordingControls,
        renderer: RecordingRenderer,
        scheduler: RecordingScheduler,
    }

    impl Harness {
        fn new() -> Self {
            let now = Rc::new(Cell::new(100.0));
            let handle = now.clone();
            let source: Box<dyn Fn() -> Duration> =
                Box::new(move || Duration::from_secs_f64(handle.get()));
            let log: Log = Rc::default();
            Self {
                now,
                animator: SceneAnimator::with_clock(Clock::with_source(source)),
                context: SceneContext::from_config(
                    &SceneConfig::default(),
                    Viewport::new(800.0, 600.0, 1.0),
                ),
                controls: RecordingControls(log.clone()),
                renderer: RecordingRenderer {
                    log: log.clone(),
                    ghost_positions: Vec::new(),
                    fail: false,
                },
                scheduler: RecordingScheduler(log.clone()),
                log,
            }
        }

        fn tick(&mut self) -> Result<Option<FrameEvent>, RenderError> {
            self.animator.tick(
                &mut self.context,
                &mut self.controls,
                &mut self.renderer,
                &self.scheduler,
            )
        }
    }

    #[test]
    fn test_stop_token_is_one_way() {
        let token = StopToken::new();
        let clone = token.clone();
        assert!(!token.is_stopped());
        clone.stop();
        assert!(token.is_stopped());
    }

    #[test]
    fn test_frame_events_are_fused_after_stop() {
        let stop = StopToken::new();
        let mut frames = FrameEvents::new(Clock::new(), stop.clone());
        assert_eq!(frames.next().map(|f| f.index), Some(0));
        assert_eq!(frames.next().map(|f| f.index), Some(1));
        stop.stop();
        assert!(frames.next().is_none());
        assert!(frames.next().is_none());
    }

    #[test]
    fn test_tick_before_start_does_nothing() {
        let mut harness = Harness::new();
        assert_eq!(harness.tick().unwrap(), None);
        assert!(harness.log.borrow().is_empty());
    }

    #[test]
    fn test_start_schedules_first_frame_once() {
        let mut harness = Harness::new();
        harness.animator.start(&harness.scheduler);
        harness.animator.start(&harness.scheduler);
        assert!(harness.animator.is_started());
        assert_eq!(*harness.log.borrow(), vec!["schedule"]);
    }

    #[test]
    fn test_cycle_order_is_controls_render_schedule() {
        let mut harness = Harness::new();
        harness.animator.start(&harness.scheduler);
        harness.log.borrow_mut().clear();

        harness.tick().unwrap();
        harness.now.set(100.5);
        harness.tick().unwrap();

        assert_eq!(
            *harness.log.borrow(),
            vec!["controls", "render", "schedule", "controls", "render", "schedule"]
        );
    }

    #[test]
    fn test_lights_are_current_at_render_time() {
        let mut harness = Harness::new();
        harness.animator.start(&harness.scheduler);

        let first = harness.tick().unwrap().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.elapsed, 0.0);

        harness.now.set(100.0 + std::f64::consts::PI);
        let second = harness.tick().unwrap().unwrap();
        assert_eq!(second.index, 1);
        assert_abs_diff_eq!(second.elapsed, std::f64::consts::PI, epsilon = 1e-9);
        assert_eq!(harness.animator.last_frame(), Some(second));

        let at_zero = &harness.renderer.ghost_positions[0];
        assert_eq!(at_zero[0], [4.0, 0.0, 0.0]);
        assert_eq!(at_zero[1], [5.0, 0.0, 0.0]);
        assert_eq!(at_zero[2], [6.0, 0.0, 0.0]);

        let at_pi = &harness.renderer.ghost_positions[1];
        for (ghost, rendered) in harness.context.scene.ghosts.iter().zip(at_pi) {
            let expected: [f32; 3] = ghost.orbit.position_at(second.elapsed).into();
            assert_eq!(*rendered, expected);
        }
        assert_abs_diff_eq!(at_pi[0][0], -4.0, epsilon = 1e-5);
        assert_abs_diff_eq!(at_pi[0][2], 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_stop_ends_the_loop() {
        let mut harness = Harness::new();
        harness.animator.start(&harness.scheduler);
        harness.tick().unwrap();

        harness.animator.stop_token().stop();
        assert!(harness.animator.is_stopped());
        harness.log.borrow_mut().clear();

        assert_eq!(harness.tick().unwrap(), None);
        assert_eq!(harness.tick().unwrap(), None);
        assert!(harness.log.borrow().is_empty());
        assert_eq!(harness.renderer.ghost_positions.len(), 1);
    }

    #[test]
    fn test_render_failure_is_not_rescheduled() {
        let mut harness = Harness::new();
        harness.animator.start(&harness.scheduler);
        harness.log.borrow_mut().clear();
        harness.renderer.fail = true;

        let result = harness.tick();
        assert!(matches!(result, Err(RenderError::Frame(_))));
        assert_eq!(*harness.log.borrow(), vec!["controls", "render"]);
        assert_eq!(harness.animator.last_frame(), None);
    }
}
