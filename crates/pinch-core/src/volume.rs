//! Music volume ducking.
//!
//! A hit raises the music to the high level, a miss drops it to the floor,
//! and in between the level decays linearly toward the floor. The level never
//! leaves `[low, high]`.

use crate::constants::{VOLUME_DECAY_PER_SEC, VOLUME_HIGH, VOLUME_LOW};
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq)]
pub struct VolumeParams {
    pub low: f32,
    pub high: f32,
    pub decay_per_sec: f32,
}

impl Default for VolumeParams {
    fn default() -> Self {
        Self {
            low: VOLUME_LOW,
            high: VOLUME_HIGH,
            decay_per_sec: VOLUME_DECAY_PER_SEC,
        }
    }
}

impl VolumeParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = 0.0 <= self.low && self.low <= self.high && self.high <= 1.0;
        if !ordered {
            return Err(ConfigError::VolumeBounds {
                low: self.low,
                high: self.high,
            });
        }
        if self.decay_per_sec.is_nan() || self.decay_per_sec < 0.0 {
            return Err(ConfigError::VolumeDecay(self.decay_per_sec));
        }
        Ok(())
    }

    #[inline]
    pub fn clamp(&self, v: f32) -> f32 {
        v.clamp(self.low, self.high)
    }
}

pub struct VolumeDucker {
    pub params: VolumeParams,
}

impl VolumeDucker {
    pub fn new(params: VolumeParams) -> Self {
        Self { params }
    }

    /// Starting level for a session: quiet until the first hit.
    pub fn initial(&self) -> f32 {
        self.params.low
    }

    /// Advance `current` by one frame.
    ///
    /// `hits` and `misses` are the resolutions that happened this frame. A hit
    /// wins over a miss in the same frame.
    pub fn step(&self, current: f32, dt_sec: f32, hits: usize, misses: usize) -> f32 {
        let p = &self.params;
        let next = if hits > 0 {
            p.high
        } else if misses > 0 {
            p.low
        } else {
            current - p.decay_per_sec * dt_sec.max(0.0)
        };
        p.clamp(next)
    }
}

impl Default for VolumeDucker {
    fn default() -> Self {
        Self::new(VolumeParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_snaps_to_high_then_decays() {
        let d = VolumeDucker::default();
        let v = d.step(d.initial(), 1.0 / 30.0, 1, 0);
        assert_eq!(v, VOLUME_HIGH);
        let v2 = d.step(v, 1.0 / 30.0, 0, 0);
        assert!((v - v2 - 0.02).abs() < 1e-6);
    }

    #[test]
    fn miss_drops_to_floor() {
        let d = VolumeDucker::default();
        assert_eq!(d.step(0.8, 0.0, 0, 1), VOLUME_LOW);
    }

    #[test]
    fn decay_never_goes_below_floor() {
        let d = VolumeDucker::default();
        let mut v = VOLUME_HIGH;
        for _ in 0..1000 {
            v = d.step(v, 0.1, 0, 0);
        }
        assert_eq!(v, VOLUME_LOW);
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let p = VolumeParams {
            low: 0.9,
            high: 0.2,
            decay_per_sec: 0.5,
        };
        assert!(matches!(p.validate(), Err(ConfigError::VolumeBounds { .. })));
        assert!(VolumeParams::default().validate().is_ok());
    }
}
