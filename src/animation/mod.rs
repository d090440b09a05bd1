pub mod animator;
pub mod clock;
pub mod orbit;

pub use animator::{
    animate_lights, CameraControl, FrameEvent, FrameEvents, FrameRenderer, FrameScheduler,
    SceneAnimator, StopToken,
};
pub use clock::{Clock, FrameTime, InstantSource, TimeSource};
pub use orbit::OrbitPath;
