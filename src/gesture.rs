//! Gesture classification.

use std::fmt;

use crate::{cooldown::CooldownClass, hand::fingers::FingerState};

/// A recognized hand gesture, named after the action it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Screenshot,
    ScrollUp,
    ScrollDown,
    FreezeCursor,
    MoveCursor,
    RightClick,
    LeftClick,
    DoubleClick,
}

impl Gesture {
    pub const ALL: [Gesture; 8] = [
        Gesture::Screenshot,
        Gesture::ScrollUp,
        Gesture::ScrollDown,
        Gesture::FreezeCursor,
        Gesture::MoveCursor,
        Gesture::RightClick,
        Gesture::LeftClick,
        Gesture::DoubleClick,
    ];

    /// Returns the human-readable name shown to the user.
    pub fn name(self) -> &'static str {
        match self {
            Gesture::Screenshot => "Screenshot",
            Gesture::ScrollUp => "Scroll Up",
            Gesture::ScrollDown => "Scroll Down",
            Gesture::FreezeCursor => "Freeze Cursor",
            Gesture::MoveCursor => "Move Cursor",
            Gesture::RightClick => "Right Click",
            Gesture::LeftClick => "Left Click",
            Gesture::DoubleClick => "Double Click",
        }
    }

    /// Returns a description of the hand pose that produces this gesture.
    pub fn pose_description(self) -> &'static str {
        match self {
            Gesture::Screenshot => "All fingers up",
            Gesture::ScrollUp => "Thumb + Index + Middle + Ring up",
            Gesture::ScrollDown => "Thumb + Index + Middle + Pinky up",
            Gesture::FreezeCursor => "Thumb + Index + Middle up",
            Gesture::MoveCursor => "Index + Middle up",
            Gesture::RightClick => "Only Index finger up",
            Gesture::LeftClick => "Only Middle finger up",
            Gesture::DoubleClick => "All fingers down",
        }
    }

    /// Returns the cooldown class that throttles this gesture's action.
    ///
    /// Continuous gestures (cursor movement and freezing) are never throttled and return `None`.
    pub fn cooldown_class(self) -> Option<CooldownClass> {
        match self {
            Gesture::Screenshot => Some(CooldownClass::Screenshot),
            Gesture::ScrollUp | Gesture::ScrollDown => Some(CooldownClass::Scroll),
            Gesture::RightClick | Gesture::LeftClick => Some(CooldownClass::Click),
            Gesture::DoubleClick => Some(CooldownClass::DoubleClick),
            Gesture::FreezeCursor | Gesture::MoveCursor => None,
        }
    }

    /// Whether this gesture keeps the cursor motion anchor alive.
    pub fn keeps_anchor(self) -> bool {
        matches!(self, Gesture::MoveCursor | Gesture::FreezeCursor)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies a finger pattern.
///
/// The arms are checked in priority order; the first match wins. Returns `None` for patterns
/// that don't correspond to any gesture.
pub fn classify(fingers: FingerState) -> Option<Gesture> {
    let FingerState {
        thumb,
        index,
        middle,
        ring,
        pinky,
    } = fingers;

    let gesture = match (thumb, index, middle, ring, pinky) {
        (true, true, true, true, true) => Gesture::Screenshot,
        (true, true, true, true, false) => Gesture::ScrollUp,
        (true, true, true, false, true) => Gesture::ScrollDown,
        (true, true, true, false, false) => Gesture::FreezeCursor,
        (false, true, true, false, false) => Gesture::MoveCursor,
        (false, true, false, false, false) => Gesture::RightClick,
        (false, false, true, false, false) => Gesture::LeftClick,
        (false, false, false, false, false) => Gesture::DoubleClick,
        _ => return None,
    };
    Some(gesture)
}
