//! Per-frame status for the user.

use std::{fmt, time::Instant};

use crate::{
    cooldown::{CooldownIndicator, CooldownPhase},
    gesture::Gesture,
    hand::landmark::HandLandmarks,
};

/// Text shown as the application status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLabel {
    Ready,
    Action(Gesture),
    /// The last frame could not be read.
    SourceUnavailable,
    /// Processing the last frame failed.
    Error,
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLabel::Ready => f.write_str("Ready"),
            StatusLabel::Action(gesture) => f.write_str(gesture.name()),
            StatusLabel::SourceUnavailable => f.write_str("Source unavailable."),
            StatusLabel::Error => f.write_str("An error occurred."),
        }
    }
}

/// Everything a UI needs to display after a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStatus {
    pub label: StatusLabel,
    /// Fraction of the cooldown indicator that is remaining, from 1.0 to 0.0.
    pub cooldown_remaining: f32,
    pub cooldown_phase: CooldownPhase,
}

/// Derives the displayed [`FrameStatus`] from what happened in each frame.
///
/// The label sticks to the last performed action until the cooldown indicator has run out, then
/// falls back to [`StatusLabel::Ready`].
#[derive(Debug, Clone)]
pub struct StatusBoard {
    label: StatusLabel,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self {
            label: StatusLabel::Ready,
        }
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the status after a frame was processed.
    ///
    /// `performed` is the gesture whose action was performed in this frame, if any.
    pub fn update(
        &mut self,
        performed: Option<Gesture>,
        indicator: &CooldownIndicator,
        now: Instant,
    ) -> FrameStatus {
        match performed {
            Some(gesture) => self.label = StatusLabel::Action(gesture),
            None if indicator.is_idle(now) => self.label = StatusLabel::Ready,
            None => {}
        }
        self.status(indicator, now)
    }

    /// Shows a transient error label. It is replaced by the next successfully processed frame.
    pub fn set_transient(
        &mut self,
        label: StatusLabel,
        indicator: &CooldownIndicator,
        now: Instant,
    ) -> FrameStatus {
        self.label = label;
        self.status(indicator, now)
    }

    fn status(&self, indicator: &CooldownIndicator, now: Instant) -> FrameStatus {
        FrameStatus {
            label: self.label,
            cooldown_remaining: indicator.fraction_remaining(now),
            cooldown_phase: indicator.phase(now),
        }
    }

    pub fn label(&self) -> StatusLabel {
        self.label
    }
}

/// Receives the result of each processed frame.
pub trait Presenter {
    /// Called once per frame. `hand` holds the landmarks used for classification, for drawing a
    /// skeleton overlay.
    fn present(&mut self, status: &FrameStatus, hand: Option<&HandLandmarks>);
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn present(&mut self, status: &FrameStatus, hand: Option<&HandLandmarks>) {
        (**self).present(status, hand);
    }
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn present(&mut self, status: &FrameStatus, hand: Option<&HandLandmarks>) {
        (**self).present(status, hand);
    }
}

/// A [`Presenter`] that logs status changes.
#[derive(Debug, Default)]
pub struct LogPresenter {
    last: Option<(StatusLabel, CooldownPhase)>,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs the gesture cheat sheet.
    pub fn print_help(&self) {
        log::info!("gesture controls:");
        for gesture in Gesture::ALL {
            log::info!("  {:<14} {}", gesture.name(), gesture.pose_description());
        }
    }
}

impl Presenter for LogPresenter {
    fn present(&mut self, status: &FrameStatus, _hand: Option<&HandLandmarks>) {
        let key = (status.label, status.cooldown_phase);
        if self.last == Some(key) {
            return;
        }
        if self.last.map(|(label, _)| label) != Some(status.label) {
            log::info!("{}", status.label);
        }
        log::debug!(
            "cooldown {:?} ({:.0}%)",
            status.cooldown_phase,
            status.cooldown_remaining * 100.0
        );
        self.last = Some(key);
    }
}
