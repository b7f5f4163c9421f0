//! Handedness hysteresis.
//!
//! Landmark models occasionally mislabel a hand for a frame or two, which would flip the thumb
//! rule in [`FingerState::from_landmarks`][super::fingers::FingerState::from_landmarks] and
//! produce bogus gestures. A new label is only accepted after it has been reported for
//! [`HandednessConfirmer::CONFIRM_FRAMES`] consecutive frames.

use super::landmark::Handedness;

#[derive(Debug, Clone, Default)]
pub struct HandednessConfirmer {
    confirmed: Option<Handedness>,
    candidate: Option<Handedness>,
    streak: u32,
}

impl HandednessConfirmer {
    /// Number of consecutive frames a differing label must be observed for before it replaces the
    /// confirmed label.
    pub const CONFIRM_FRAMES: u32 = 3;

    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the label observed in the current frame and returns the confirmed handedness.
    ///
    /// The first label ever observed is confirmed immediately. Frames without a hand must not be
    /// fed to this method; the confirmed label is kept across such gaps.
    pub fn observe(&mut self, observed: Handedness) -> Handedness {
        let confirmed = *self.confirmed.get_or_insert(observed);

        if observed == confirmed {
            self.candidate = None;
            self.streak = 0;
            return confirmed;
        }

        if self.candidate == Some(observed) {
            self.streak += 1;
        } else {
            self.candidate = Some(observed);
            self.streak = 1;
        }

        if self.streak >= Self::CONFIRM_FRAMES {
            log::debug!("handedness changed: {confirmed} -> {observed}");
            self.confirmed = Some(observed);
            self.candidate = None;
            self.streak = 0;
        }

        self.confirmed.unwrap_or(observed)
    }

    /// Returns the confirmed handedness, or `None` if no hand was seen yet.
    pub fn confirmed(&self) -> Option<Handedness> {
        self.confirmed
    }

    /// Returns the label that is currently trying to replace the confirmed one.
    pub fn candidate(&self) -> Option<Handedness> {
        self.candidate
    }

    /// Returns for how many consecutive frames the candidate has been observed.
    pub fn streak(&self) -> u32 {
        self.streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Handedness::*;

    #[test]
    fn first_label_is_confirmed_immediately() {
        let mut c = HandednessConfirmer::new();
        assert_eq!(c.confirmed(), None);
        assert_eq!(c.observe(Left), Left);
        assert_eq!(c.confirmed(), Some(Left));
        assert_eq!(c.streak(), 0);
    }

    #[test]
    fn stable_label_is_idempotent() {
        let mut c = HandednessConfirmer::new();
        for _ in 0..100 {
            assert_eq!(c.observe(Right), Right);
            assert_eq!(c.candidate(), None);
            assert_eq!(c.streak(), 0);
        }
    }

    #[test]
    fn flips_after_exactly_three_frames() {
        let mut c = HandednessConfirmer::new();
        c.observe(Right);
        assert_eq!(c.observe(Left), Right);
        assert_eq!(c.streak(), 1);
        assert_eq!(c.observe(Left), Right);
        assert_eq!(c.streak(), 2);
        assert_eq!(c.observe(Left), Left);
        assert_eq!(c.candidate(), None);
        assert_eq!(c.streak(), 0);
    }

    #[test]
    fn interrupted_streak_does_not_flip() {
        let mut c = HandednessConfirmer::new();
        c.observe(Right);
        c.observe(Left);
        c.observe(Left);
        assert_eq!(c.observe(Right), Right);
        assert_eq!(c.streak(), 0);
        // The streak starts over.
        assert_eq!(c.observe(Left), Right);
        assert_eq!(c.observe(Left), Right);
        assert_eq!(c.observe(Left), Left);
    }

    #[test]
    fn randomized_sequences_never_flip_early() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..200 {
            let mut c = HandednessConfirmer::new();
            let mut confirmed = c.observe(Right);
            let mut run = 0;
            for _ in 0..50 {
                let label = if rng.bool() { Left } else { Right };
                run = if label == confirmed { 0 } else { run + 1 };
                let now = c.observe(label);
                if run >= 3 {
                    assert_eq!(now, label);
                    confirmed = now;
                    run = 0;
                } else {
                    assert_eq!(now, confirmed);
                }
            }
        }
    }
}
