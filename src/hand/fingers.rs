//! Finger extension state.

use std::fmt;

use super::landmark::{HandLandmarks, Handedness, LandmarkIdx};

/// Which of the five fingers are extended ("up").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

/// Tip and PIP joint of the four non-thumb fingers.
const FINGER_JOINTS: [(LandmarkIdx, LandmarkIdx); 4] = {
    use LandmarkIdx::*;
    [
        (IndexFingerTip, IndexFingerPip),
        (MiddleFingerTip, MiddleFingerPip),
        (RingFingerTip, RingFingerPip),
        (PinkyTip, PinkyPip),
    ]
};

impl FingerState {
    pub const fn new(thumb: bool, index: bool, middle: bool, ring: bool, pinky: bool) -> Self {
        Self {
            thumb,
            index,
            middle,
            ring,
            pinky,
        }
    }

    /// Determines the finger state of a hand.
    ///
    /// `handedness` must be the *confirmed* handedness (see
    /// [`HandednessConfirmer`][super::identity::HandednessConfirmer]): the thumb folds sideways
    /// rather than down, so whether it counts as extended depends on which hand it belongs to.
    ///
    /// The other fingers are extended when their tip is above their PIP joint (image Y grows
    /// downwards).
    pub fn from_landmarks(hand: &HandLandmarks, handedness: Handedness) -> Self {
        let tip = hand.position(LandmarkIdx::ThumbTip);
        let ip = hand.position(LandmarkIdx::ThumbIp);
        let thumb = match handedness {
            Handedness::Left => tip.x > ip.x,
            Handedness::Right => tip.x < ip.x,
        };

        let [index, middle, ring, pinky] =
            FINGER_JOINTS.map(|(tip, pip)| hand.position(tip).y < hand.position(pip).y);

        Self {
            thumb,
            index,
            middle,
            ring,
            pinky,
        }
    }

    pub fn to_array(self) -> [bool; 5] {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
    }

    pub fn from_array([thumb, index, middle, ring, pinky]: [bool; 5]) -> Self {
        Self::new(thumb, index, middle, ring, pinky)
    }
}

/// Formats as five `0`/`1` digits, thumb first.
impl fmt::Display for FingerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for up in self.to_array() {
            f.write_str(if up { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point2;

    use super::*;
    use crate::hand::landmark::tests::open_hand;

    fn with(hand: &HandLandmarks, idx: LandmarkIdx, x: f32, y: f32) -> HandLandmarks {
        let mut positions: [Point2<f32>; HandLandmarks::NUM_LANDMARKS] =
            hand.positions().try_into().unwrap();
        positions[idx as usize] = Point2::new(x, y);
        HandLandmarks::new(positions)
    }

    #[test]
    fn open_right_hand() {
        let state = FingerState::from_landmarks(&open_hand(), Handedness::Right);
        assert_eq!(state, FingerState::new(true, true, true, true, true));
    }

    #[test]
    fn thumb_polarity_follows_handedness() {
        let hand = open_hand();
        for handedness in [Handedness::Left, Handedness::Right] {
            let a = FingerState::from_landmarks(&hand, handedness);
            let b = FingerState::from_landmarks(&hand, handedness.flip());
            assert_ne!(a.thumb, b.thumb);
            assert_eq!(
                (a.index, a.middle, a.ring, a.pinky),
                (b.index, b.middle, b.ring, b.pinky)
            );
        }
    }

    #[test]
    fn folded_fingers() {
        let hand = open_hand();
        // Fold the index and ring finger: tips end up below their PIP joints.
        let hand = with(&hand, LandmarkIdx::IndexFingerTip, 0.41, 0.55);
        let hand = with(&hand, LandmarkIdx::RingFingerTip, 0.58, 0.56);
        let state = FingerState::from_landmarks(&hand, Handedness::Right);
        assert_eq!(state, FingerState::new(true, false, true, false, true));
    }

    #[test]
    fn tip_level_with_joint_is_down() {
        let hand = with(&open_hand(), LandmarkIdx::PinkyTip, 0.67, 0.57);
        let state = FingerState::from_landmarks(&hand, Handedness::Right);
        assert!(!state.pinky);

        let hand = with(&open_hand(), LandmarkIdx::ThumbTip, 0.32, 0.66);
        assert!(!FingerState::from_landmarks(&hand, Handedness::Right).thumb);
        assert!(!FingerState::from_landmarks(&hand, Handedness::Left).thumb);
    }

    #[test]
    fn display() {
        assert_eq!(
            FingerState::new(false, true, true, false, false).to_string(),
            "01100"
        );
        assert_eq!(
            FingerState::from_array([true, false, false, false, true]),
            FingerState::new(true, false, false, false, true)
        );
    }
}
