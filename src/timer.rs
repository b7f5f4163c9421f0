//! Performance measurement tools.

use std::{
    cell::RefCell,
    fmt,
    time::{Duration, Instant},
};

use itertools::Itertools;

/// Measures and averages the time an operation takes.
///
/// Collected timings are averaged and reset when the timer is displayed using `{}`
/// ([`std::fmt::Display`]).
pub struct Timer {
    name: &'static str,
    total: RefCell<(Duration, u32)>,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            total: RefCell::new((Duration::ZERO, 0)),
        }
    }

    /// Invokes a closure, measuring and recording the time it takes.
    pub fn time<T>(&self, timee: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = timee();
        let mut total = self.total.borrow_mut();
        total.0 += start.elapsed();
        total.1 += 1;
        result
    }

    /// Returns the number of recorded timings.
    pub fn count(&self) -> u32 {
        self.total.borrow().1
    }
}

/// Displays the average recorded time and resets it.
impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sum, count) = self.total.replace((Duration::ZERO, 0));
        let avg_ms = if count == 0 {
            0.0
        } else {
            sum.as_secs_f32() * 1000.0 / count as f32
        };
        write!(f, "{}: {count}x{avg_ms:.02}ms", self.name)
    }
}

/// Logs frames per second with optional extra data.
pub struct FpsCounter {
    name: String,
    frames: u32,
    start: Instant,
}

impl FpsCounter {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            frames: 0,
            start: Instant::now(),
        }
    }

    /// Advances the frame counter by 1 and logs FPS and `extra` data if one second has passed.
    pub fn tick_with<D: fmt::Display, I: IntoIterator<Item = D>>(&mut self, extra: I) {
        self.frames += 1;
        if self.start.elapsed() > Duration::from_secs(1) {
            let extra = extra.into_iter().join(", ");
            if extra.is_empty() {
                log::debug!("{}: {} FPS", self.name, self.frames);
            } else {
                log::debug!("{}: {} FPS ({})", self.name, self.frames, extra);
            }

            self.frames = 0;
            self.start = Instant::now();
        }
    }
}
