//! Fixed-shape hand landmark record.
//!
//! Detectors hand over 21 points in the usual hand-model order (wrist, then
//! four joints per digit from thumb to pinky). Coordinates are normalized to
//! the image: x and y in [0, 1], z relative depth. Raw detector output is
//! validated exactly once here; everything downstream can assume every point
//! is finite.

use glam::{Vec2, Vec3};

use crate::error::LandmarkError;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Vec3; LANDMARK_COUNT],
}

impl HandLandmarks {
    /// Build a record from raw `[x, y, z]` triples.
    pub fn from_points(raw: &[[f32; 3]]) -> Result<Self, LandmarkError> {
        if raw.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongCount {
                expected: LANDMARK_COUNT,
                actual: raw.len(),
            });
        }
        let mut points = [Vec3::ZERO; LANDMARK_COUNT];
        for (index, (dst, src)) in points.iter_mut().zip(raw).enumerate() {
            let p = Vec3::from_array(*src);
            if !p.is_finite() {
                return Err(LandmarkError::NonFinite { index });
            }
            *dst = p;
        }
        Ok(Self { points })
    }

    /// Convenience for detectors that only produce image-plane coordinates.
    pub fn from_points_2d(raw: &[[f32; 2]]) -> Result<Self, LandmarkError> {
        let lifted: Vec<[f32; 3]> = raw.iter().map(|[x, y]| [*x, *y, 0.0]).collect();
        Self::from_points(&lifted)
    }

    #[inline]
    pub fn point(&self, index: usize) -> Vec3 {
        self.points[index]
    }

    #[inline]
    pub fn point_2d(&self, index: usize) -> Vec2 {
        self.points[index].truncate()
    }

    pub fn points(&self) -> &[Vec3; LANDMARK_COUNT] {
        &self.points
    }

    pub fn thumb_tip(&self) -> Vec3 {
        self.points[THUMB_TIP]
    }

    /// Mirror horizontally, for front-facing cameras shown as a mirror image.
    pub fn mirrored(&self) -> Self {
        let mut points = self.points;
        for p in points.iter_mut() {
            p.x = 1.0 - p.x;
        }
        Self { points }
    }
}

/// Validate a raw detector frame, mapping malformed input to "no hand".
///
/// Missing or non-finite coordinates make the whole frame unusable; the caller
/// treats that exactly like an empty frame.
pub fn sanitize_frame(raw: Option<&[[f32; 3]]>) -> Option<HandLandmarks> {
    let raw = raw?;
    match HandLandmarks::from_points(raw) {
        Ok(hand) => Some(hand),
        Err(err) => {
            log::debug!("dropping detector frame: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_hand() -> Vec<[f32; 3]> {
        (0..LANDMARK_COUNT)
            .map(|i| [0.1 + i as f32 * 0.03, 0.5, 0.0])
            .collect()
    }

    #[test]
    fn accepts_exactly_21_finite_points() {
        let hand = HandLandmarks::from_points(&open_hand()).unwrap();
        assert!((hand.point(WRIST).x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn rejects_wrong_count() {
        let raw = &open_hand()[..20];
        assert_eq!(
            HandLandmarks::from_points(raw),
            Err(LandmarkError::WrongCount {
                expected: 21,
                actual: 20
            })
        );
    }

    #[test]
    fn rejects_nan() {
        let mut raw = open_hand();
        raw[THUMB_TIP][1] = f32::NAN;
        assert_eq!(
            HandLandmarks::from_points(&raw),
            Err(LandmarkError::NonFinite { index: THUMB_TIP })
        );
        assert!(sanitize_frame(Some(raw.as_slice())).is_none());
    }

    #[test]
    fn mirroring_flips_x_only() {
        let hand = HandLandmarks::from_points(&open_hand()).unwrap();
        let m = hand.mirrored();
        assert!((m.point(WRIST).x - 0.9).abs() < 1e-6);
        assert_eq!(m.point(WRIST).y, hand.point(WRIST).y);
    }
}
