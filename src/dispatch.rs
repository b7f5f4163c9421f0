//! Turning gestures into mouse actions.

use std::{fmt, time::Instant};

use nalgebra::{Point2, Vector2};

use crate::{
    automation::{Automation, MouseButton, ScreenSize},
    cooldown::{CooldownDurations, CooldownIndicator, Cooldowns},
    gesture::Gesture,
    hand::landmark::HandLandmarks,
    screenshot::ScreenshotSink,
};

/// Factor between hand motion and cursor motion.
///
/// Always within [`Sensitivity::MIN`] and [`Sensitivity::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Sensitivity(f32);

impl Sensitivity {
    pub const MIN: f32 = 1.0;
    pub const MAX: f32 = 5.0;
    pub const STEP: f32 = 0.1;

    /// Creates a sensitivity value, clamping `value` into the allowed range.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    /// Raises the sensitivity by one [step][Self::STEP].
    pub fn increment(&mut self) {
        *self = Self::new(round_tenth(self.0 + Self::STEP));
    }

    /// Lowers the sensitivity by one [step][Self::STEP].
    pub fn decrement(&mut self) {
        *self = Self::new(round_tenth(self.0 - Self::STEP));
    }
}

fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self(2.2)
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Reference point for relative cursor movement.
///
/// Created on the first frame of a Move Cursor gesture, so that the cursor doesn't jump when the
/// gesture starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionAnchor {
    /// Hand tracking point in screen pixels.
    pub hand: Point2<f32>,
    pub cursor: Point2<f32>,
}

impl MotionAnchor {
    /// Computes the cursor position for the hand being at `hand`.
    pub fn target(&self, hand: Point2<f32>, sensitivity: Sensitivity) -> Point2<f32> {
        let delta: Vector2<f32> = (hand - self.hand) * sensitivity.get();
        self.cursor + delta
    }
}

/// Dispatcher tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchOptions {
    pub sensitivity: Sensitivity,
    pub cooldowns: CooldownDurations,
    /// Magnitude of a single scroll action, in platform-defined units.
    pub scroll_amount: i32,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::default(),
            cooldowns: CooldownDurations::default(),
            scroll_amount: 150,
        }
    }
}

/// Performs the actions associated with recognized gestures.
///
/// Owns all state that spans frames on the action side: the cooldown timers, the visual cooldown
/// indicator and the cursor [`MotionAnchor`].
pub struct Dispatcher<A, S> {
    automation: A,
    screenshots: S,
    screen: ScreenSize,
    cooldowns: Cooldowns,
    indicator: CooldownIndicator,
    anchor: Option<MotionAnchor>,
    sensitivity: Sensitivity,
    scroll_amount: i32,
}

impl<A: Automation, S: ScreenshotSink> Dispatcher<A, S> {
    /// Creates a dispatcher.
    ///
    /// The screen size is queried once, here.
    pub fn new(
        mut automation: A,
        screenshots: S,
        options: DispatchOptions,
    ) -> anyhow::Result<Self> {
        let screen = automation.screen_size()?;
        log::debug!("screen size: {screen}");
        Ok(Self {
            automation,
            screenshots,
            screen,
            cooldowns: Cooldowns::new(options.cooldowns),
            indicator: CooldownIndicator::new(),
            anchor: None,
            sensitivity: options.sensitivity,
            scroll_amount: options.scroll_amount,
        })
    }

    /// Handles the outcome of classifying one frame.
    ///
    /// `gesture` is `None` when no hand was detected or its pose matched no gesture. `hand` must be
    /// the landmarks `gesture` was classified from.
    ///
    /// Returns the gesture whose action was performed, which is `None` if there was no gesture or
    /// its action is still cooling down.
    pub fn dispatch(
        &mut self,
        gesture: Option<Gesture>,
        hand: Option<&HandLandmarks>,
        now: Instant,
    ) -> anyhow::Result<Option<Gesture>> {
        let Some(gesture) = gesture else {
            self.clear_anchor();
            return Ok(None);
        };
        if !gesture.keeps_anchor() {
            self.clear_anchor();
        }

        if let Some(class) = gesture.cooldown_class() {
            if !self.cooldowns.get_mut(class).try_fire(now) {
                return Ok(None);
            }
            // Timestamps are recorded before the action runs, so a failing or asynchronous action
            // is throttled just the same.
            let duration = self.cooldowns.get(class).duration();
            self.indicator.start(now, duration);
            log::debug!("{gesture}");
        }

        match gesture {
            Gesture::Screenshot => self.screenshots.request(),
            Gesture::ScrollUp => self.automation.scroll(self.scroll_amount)?,
            Gesture::ScrollDown => self.automation.scroll(-self.scroll_amount)?,
            Gesture::RightClick => self.automation.click(MouseButton::Right)?,
            Gesture::LeftClick => self.automation.click(MouseButton::Left)?,
            Gesture::DoubleClick => self.automation.double_click()?,
            Gesture::FreezeCursor => {}
            Gesture::MoveCursor => match hand {
                Some(hand) => self.move_cursor(hand)?,
                None => log::warn!("move gesture without hand landmarks"),
            },
        }

        Ok(Some(gesture))
    }

    fn move_cursor(&mut self, hand: &HandLandmarks) -> anyhow::Result<()> {
        let hand = hand.tracking_point(self.screen);
        let anchor = match self.anchor {
            Some(anchor) => anchor,
            None => {
                let (x, y) = self.automation.cursor_position()?;
                let anchor = MotionAnchor {
                    hand,
                    cursor: Point2::new(x as f32, y as f32),
                };
                log::trace!("new motion anchor: {anchor:?}");
                *self.anchor.insert(anchor)
            }
        };

        let target = anchor.target(hand, self.sensitivity);
        self.automation
            .move_cursor_to(target.x.round() as i32, target.y.round() as i32)
    }

    pub fn clear_anchor(&mut self) {
        if self.anchor.take().is_some() {
            log::trace!("motion anchor cleared");
        }
    }

    pub fn anchor(&self) -> Option<&MotionAnchor> {
        self.anchor.as_ref()
    }

    pub fn indicator(&self) -> &CooldownIndicator {
        &self.indicator
    }

    pub fn sensitivity(&self) -> Sensitivity {
        self.sensitivity
    }

    pub fn sensitivity_mut(&mut self) -> &mut Sensitivity {
        &mut self.sensitivity
    }

    pub fn screen_size(&self) -> ScreenSize {
        self.screen
    }

    pub fn automation(&self) -> &A {
        &self.automation
    }

    pub fn screenshots(&self) -> &S {
        &self.screenshots
    }
}
