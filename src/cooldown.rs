//! Action throttling and the visual cooldown countdown.

use std::time::{Duration, Instant};

/// Groups of actions sharing one cooldown timer.
///
/// Left and right click share [`CooldownClass::Click`], and both scroll directions share
/// [`CooldownClass::Scroll`], so alternating between them is throttled as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownClass {
    Click,
    DoubleClick,
    Scroll,
    Screenshot,
}

/// Cooldown durations of all [`CooldownClass`]es.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooldownDurations {
    pub click: Duration,
    pub double_click: Duration,
    pub scroll: Duration,
    pub screenshot: Duration,
}

impl Default for CooldownDurations {
    fn default() -> Self {
        Self {
            click: Duration::from_secs(1),
            double_click: Duration::from_secs(1),
            scroll: Duration::from_secs(3),
            screenshot: Duration::from_secs(3),
        }
    }
}

impl CooldownDurations {
    pub fn get(&self, class: CooldownClass) -> Duration {
        match class {
            CooldownClass::Click => self.click,
            CooldownClass::DoubleClick => self.double_click,
            CooldownClass::Scroll => self.scroll,
            CooldownClass::Screenshot => self.screenshot,
        }
    }
}

/// A single throttling timer.
#[derive(Debug, Clone)]
pub struct Cooldown {
    duration: Duration,
    last_fired: Option<Instant>,
}

impl Cooldown {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            last_fired: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns whether the action may fire at `now`.
    ///
    /// This requires *strictly* more than the cooldown duration to have passed since the last
    /// time it fired.
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last_fired {
            Some(last) => now.saturating_duration_since(last) > self.duration,
            None => true,
        }
    }

    /// Records that the action fired at `now` if it [is ready][Self::is_ready].
    ///
    /// Returns whether the action may be performed.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if self.is_ready(now) {
            self.last_fired = Some(now);
            true
        } else {
            false
        }
    }
}

/// The cooldown timers of all [`CooldownClass`]es.
#[derive(Debug, Clone)]
pub struct Cooldowns {
    click: Cooldown,
    double_click: Cooldown,
    scroll: Cooldown,
    screenshot: Cooldown,
}

impl Cooldowns {
    pub fn new(durations: CooldownDurations) -> Self {
        Self {
            click: Cooldown::new(durations.click),
            double_click: Cooldown::new(durations.double_click),
            scroll: Cooldown::new(durations.scroll),
            screenshot: Cooldown::new(durations.screenshot),
        }
    }

    pub fn get(&self, class: CooldownClass) -> &Cooldown {
        match class {
            CooldownClass::Click => &self.click,
            CooldownClass::DoubleClick => &self.double_click,
            CooldownClass::Scroll => &self.scroll,
            CooldownClass::Screenshot => &self.screenshot,
        }
    }

    pub fn get_mut(&mut self, class: CooldownClass) -> &mut Cooldown {
        match class {
            CooldownClass::Click => &mut self.click,
            CooldownClass::DoubleClick => &mut self.double_click,
            CooldownClass::Scroll => &mut self.scroll,
            CooldownClass::Screenshot => &mut self.screenshot,
        }
    }
}

impl Default for Cooldowns {
    fn default() -> Self {
        Self::new(CooldownDurations::default())
    }
}

/// Colour of the cooldown indicator, by how much of the cooldown has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownPhase {
    /// No cooldown running.
    Idle,
    /// Less than half elapsed.
    Red,
    /// Less than 80% elapsed.
    Yellow,
    Green,
}

/// User-facing countdown of the most recently fired throttled action.
///
/// This is independent of the [`Cooldown`] timers and exists purely for feedback: it always
/// shows the last action's cooldown, even if an earlier one with a longer duration is still
/// running.
#[derive(Debug, Clone, Default)]
pub struct CooldownIndicator {
    running: Option<(Instant, Duration)>,
}

impl CooldownIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restarts the countdown at 100%.
    ///
    /// A countdown too long to represent is not shown.
    pub fn start(&mut self, now: Instant, total: Duration) {
        self.running = match now.checked_add(total) {
            Some(end) => Some((end, total)),
            None => {
                log::warn!("cooldown of {total:?} is too long to display");
                None
            }
        };
    }

    fn remaining(&self, now: Instant) -> Option<(Duration, Duration)> {
        let (end, total) = self.running?;
        let remaining = end.saturating_duration_since(now);
        if remaining.is_zero() || total.is_zero() {
            None
        } else {
            Some((remaining, total))
        }
    }

    /// Returns the fraction of the cooldown that is still remaining, from 1.0 down to 0.0.
    pub fn fraction_remaining(&self, now: Instant) -> f32 {
        match self.remaining(now) {
            Some((remaining, total)) => remaining.as_secs_f32() / total.as_secs_f32(),
            None => 0.0,
        }
    }

    pub fn phase(&self, now: Instant) -> CooldownPhase {
        match self.remaining(now) {
            Some((remaining, total)) => {
                let progress = 1.0 - remaining.as_secs_f32() / total.as_secs_f32();
                if progress < 0.5 {
                    CooldownPhase::Red
                } else if progress < 0.8 {
                    CooldownPhase::Yellow
                } else {
                    CooldownPhase::Green
                }
            }
            None => CooldownPhase::Idle,
        }
    }

    pub fn is_idle(&self, now: Instant) -> bool {
        self.remaining(now).is_none()
    }
}
