//! Monotonic frame clock.

use std::time::{Duration, Instant};

/// A monotonic source of "now", measured from an arbitrary origin
///
/// Any `Fn() -> Duration` closure is a time source, which keeps tests free of
/// real sleeps.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

impl<F> TimeSource for F
where
    F: Fn() -> Duration,
{
    fn now(&self) -> Duration {
        self()
    }
}

/// Wall-clock time source backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct InstantSource {
    origin: Instant,
}

impl InstantSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for InstantSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Elapsed and delta time reported by one clock tick, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    pub elapsed: f64,
    pub delta: f64,
}

/// Clock that measures elapsed time since its first tick
///
/// The first call to [`Clock::tick`] anchors the clock and reports zero for
/// both elapsed and delta time. The clock has no reset; it is created once and
/// ticked once per frame for the lifetime of the animator that owns it.
#[derive(Debug)]
pub struct Clock<S = InstantSource> {
    source: S,
    start: Option<Duration>,
    last: Duration,
    current: FrameTime,
}

impl Clock<InstantSource> {
    pub fn new() -> Self {
        Self::with_source(InstantSource::new())
    }
}

impl Default for Clock<InstantSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TimeSource> Clock<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            start: None,
            last: Duration::ZERO,
            current: FrameTime {
                elapsed: 0.0,
                delta: 0.0,
            },
        }
    }

    /// Advances the clock to the source's current time
    pub fn tick(&mut self) -> FrameTime {
        // Never step backwards, even if the source does
        let now = self.source.now().max(self.last);

        let (start, delta) = match self.start {
            Some(start) => (start, now - self.last),
            None => {
                self.start = Some(now);
                (now, Duration::ZERO)
            }
        };

        self.last = now;
        self.current = FrameTime {
            elapsed: (now - start).as_secs_f64(),
            delta: delta.as_secs_f64(),
        };
        self.current
    }

    /// Time reported by the most recent tick
    pub fn current(&self) -> FrameTime {
        self.current
    }

    pub fn has_started(&self) -> bool {
        self.start.is_some()
    }
}
