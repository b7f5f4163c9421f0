//! Hand landmarks as reported by the vision collaborator.

use std::fmt;

use nalgebra::Point2;

use crate::automation::ScreenSize;

/// Which hand a detection belongs to, as labeled by the landmark model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn flip(self) -> Self {
        match self {
            Handedness::Left => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        })
    }
}

/// Names for the hand pose landmarks.
///
/// # Terminology
///
/// - **CMC**: [Carpometacarpal joint], the lowest joint of the thumb, located near the wrist.
/// - **MCP**: [Metacarpophalangeal joint], the lower joint forming the knuckles near the palm of
///   the hand.
/// - **PIP**: Proximal Interphalangeal joint, the joint between the MCP and DIP.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the DIP.
///
/// [Carpometacarpal joint]: https://en.wikipedia.org/wiki/Carpometacarpal_joint
/// [Metacarpophalangeal joint]: https://en.wikipedia.org/wiki/Metacarpophalangeal_joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// The 21 landmarks of one hand, in normalized image coordinates.
///
/// Positions are not range-checked: detectors routinely place occluded joints slightly outside of
/// the image.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    positions: [Point2<f32>; Self::NUM_LANDMARKS],
}

impl HandLandmarks {
    pub const NUM_LANDMARKS: usize = 21;

    pub fn new(positions: [Point2<f32>; Self::NUM_LANDMARKS]) -> Self {
        Self { positions }
    }

    /// Creates a landmark set from `(x, y)` pairs.
    ///
    /// Returns `None` if `coords` does not contain exactly [`Self::NUM_LANDMARKS`] entries.
    pub fn from_coords<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let mut positions = [Point2::origin(); Self::NUM_LANDMARKS];
        let mut count = 0;
        for (x, y) in coords {
            *positions.get_mut(count)? = Point2::new(x, y);
            count += 1;
        }
        (count == Self::NUM_LANDMARKS).then_some(Self { positions })
    }

    #[inline]
    pub fn position(&self, idx: LandmarkIdx) -> Point2<f32> {
        self.positions[idx as usize]
    }

    pub fn positions(&self) -> &[Point2<f32>] {
        &self.positions
    }

    /// Returns the point that drives cursor motion, scaled to screen pixels.
    ///
    /// The middle finger's knuckle is used since it barely moves when fingers are raised or
    /// lowered.
    pub fn tracking_point(&self, screen: ScreenSize) -> Point2<f32> {
        let p = self.position(LandmarkIdx::MiddleFingerMcp);
        Point2::new(p.x * screen.width as f32, p.y * screen.height as f32)
    }
}
