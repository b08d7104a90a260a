//! Pinch classification with per-lane debounce.
//!
//! A lane is "pressed" while its fingertip is within the threshold distance
//! of the thumb tip. Only the transition from released to pressed produces a
//! [`PinchEvent`]; holding the pinch keeps the lane latched until the distance
//! rises back above the threshold or the hand disappears.

use smallvec::SmallVec;

use crate::constants::PINCH_THRESHOLD;
use crate::lane::{Lane, LANE_COUNT};
use crate::landmarks::{HandLandmarks, THUMB_TIP};

/// Discrete event emitted on the frame a pinch starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinchEvent {
    pub lane: Lane,
}

pub type PinchEvents = SmallVec<[PinchEvent; LANE_COUNT]>;

/// Classifier tuning.
///
/// - `thresholds`: per-lane pinch distance in normalized image units
/// - `use_depth`: include the z coordinate in the distance
#[derive(Clone, Debug, PartialEq)]
pub struct GestureParams {
    pub thresholds: [f32; LANE_COUNT],
    pub use_depth: bool,
}

impl Default for GestureParams {
    fn default() -> Self {
        Self {
            thresholds: [PINCH_THRESHOLD; LANE_COUNT],
            use_depth: false,
        }
    }
}

pub struct GestureClassifier {
    pub params: GestureParams,
    held: [bool; LANE_COUNT],
}

impl GestureClassifier {
    pub fn new(params: GestureParams) -> Self {
        Self {
            params,
            held: [false; LANE_COUNT],
        }
    }

    /// Thumb-to-fingertip distance for `lane`.
    pub fn pinch_distance(&self, hand: &HandLandmarks, lane: Lane) -> f32 {
        if self.params.use_depth {
            hand.thumb_tip().distance(hand.point(lane.fingertip()))
        } else {
            hand.point_2d(THUMB_TIP).distance(hand.point_2d(lane.fingertip()))
        }
    }

    /// Which lanes are currently pinched, without touching debounce state.
    pub fn pinched_lanes(&self, hand: Option<&HandLandmarks>) -> [bool; LANE_COUNT] {
        let mut pressed = [false; LANE_COUNT];
        if let Some(hand) = hand {
            for lane in Lane::ALL {
                let d = self.pinch_distance(hand, lane);
                pressed[lane.index()] = d < self.params.thresholds[lane.index()];
            }
        }
        pressed
    }

    /// Classify one frame. `None` means no hand was detected.
    pub fn classify(&mut self, hand: Option<&HandLandmarks>) -> PinchEvents {
        let pressed = self.pinched_lanes(hand);
        self.update_pressed(pressed)
    }

    /// Debounce an already-resolved per-lane pressed state.
    ///
    /// The frontend uses this to merge keyboard fallback keys into the pinch
    /// signal before edge detection.
    pub fn update_pressed(&mut self, pressed: [bool; LANE_COUNT]) -> PinchEvents {
        let mut events = PinchEvents::new();
        for lane in Lane::ALL {
            let i = lane.index();
            if pressed[i] && !self.held[i] {
                events.push(PinchEvent { lane });
            }
            self.held[i] = pressed[i];
        }
        events
    }

    /// Current latched state per lane (for the pressed indicator).
    pub fn held(&self) -> [bool; LANE_COUNT] {
        self.held
    }

    pub fn reset(&mut self) {
        self.held = [false; LANE_COUNT];
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::LANDMARK_COUNT;

    /// Hand with every fingertip far from the thumb except `touching`, which
    /// sits `gap` away from it.
    fn hand_with_gap(touching: Option<Lane>, gap: f32) -> HandLandmarks {
        let mut raw = [[0.0f32, 0.0, 0.0]; LANDMARK_COUNT];
        for (i, p) in raw.iter_mut().enumerate() {
            *p = [0.1 + i as f32 * 0.04, 0.2, 0.0];
        }
        raw[THUMB_TIP] = [0.5, 0.5, 0.0];
        for lane in Lane::ALL {
            raw[lane.fingertip()] = [0.5 + 0.3, 0.5, 0.0];
        }
        if let Some(lane) = touching {
            raw[lane.fingertip()] = [0.5 + gap, 0.5, 0.0];
        }
        HandLandmarks::from_points(&raw).unwrap()
    }

    #[test]
    fn pinch_below_threshold_emits_once() {
        let mut c = GestureClassifier::default();
        let hand = hand_with_gap(Some(Lane::Ring), 0.01);
        let events = c.classify(Some(&hand));
        assert_eq!(events.as_slice(), &[PinchEvent { lane: Lane::Ring }]);
        assert_eq!(c.held(), [false, false, true, false]);
    }

    #[test]
    fn distance_at_threshold_is_a_release() {
        let mut c = GestureClassifier::default();
        c.update_pressed([true; LANE_COUNT]);
        let hand = hand_with_gap(Some(Lane::Index), PINCH_THRESHOLD);
        assert!(c.classify(Some(&hand)).is_empty());
        assert!(!c.held()[Lane::Index.index()]);
    }

    #[test]
    fn depth_mode_counts_z() {
        let mut raw: Vec<[f32; 3]> = hand_with_gap(Some(Lane::Index), 0.01)
            .points()
            .iter()
            .map(|p| p.to_array())
            .collect();
        raw[Lane::Index.fingertip()][2] = 0.5;
        let hand = HandLandmarks::from_points(&raw).unwrap();

        let flat = GestureClassifier::default();
        assert!(flat.pinched_lanes(Some(&hand))[0]);

        let deep = GestureClassifier::new(GestureParams {
            use_depth: true,
            ..GestureParams::default()
        });
        assert!(!deep.pinched_lanes(Some(&hand))[0]);
    }

    #[test]
    fn reset_clears_latches() {
        let mut c = GestureClassifier::default();
        c.update_pressed([true, false, true, false]);
        c.reset();
        assert_eq!(c.held(), [false; LANE_COUNT]);
    }
}
