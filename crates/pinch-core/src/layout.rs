use glam::Vec2;

use crate::constants::{
    HIT_LINE_Y, NOTE_FALL_SPEED_PX_PER_SEC, NOTE_HEIGHT, NOTE_SPAWN_Y, PLAYFIELD_HEIGHT,
    PLAYFIELD_WIDTH,
};
use crate::error::ConfigError;
use crate::lane::{Lane, LANE_COUNT};

/// Screen geometry of the playfield.
///
/// Notes fall at a constant speed from `spawn_y` to `hit_line_y`, so the time
/// between a note appearing and its target time is fixed: see
/// [`PlayfieldLayout::lead_time_sec`].
#[derive(Clone, Debug, PartialEq)]
pub struct PlayfieldLayout {
    pub width: f32,
    pub height: f32,
    pub hit_line_y: f32,
    pub spawn_y: f32,
    pub note_height: f32,
    pub fall_speed_px_per_sec: f32,
}

impl Default for PlayfieldLayout {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            hit_line_y: HIT_LINE_Y,
            spawn_y: NOTE_SPAWN_Y,
            note_height: NOTE_HEIGHT,
            fall_speed_px_per_sec: NOTE_FALL_SPEED_PX_PER_SEC,
        }
    }
}

impl PlayfieldLayout {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fall_speed_px_per_sec.is_nan() || self.fall_speed_px_per_sec <= 0.0 {
            return Err(ConfigError::FallSpeed(self.fall_speed_px_per_sec));
        }
        if self.hit_line_y <= self.spawn_y {
            return Err(ConfigError::Geometry {
                spawn_y: self.spawn_y,
                hit_line_y: self.hit_line_y,
            });
        }
        Ok(())
    }

    /// Seconds between a note appearing and reaching the hit line.
    pub fn lead_time_sec(&self) -> f64 {
        ((self.hit_line_y - self.spawn_y) / self.fall_speed_px_per_sec) as f64
    }

    pub fn lane_width(&self) -> f32 {
        self.width / LANE_COUNT as f32
    }

    /// Vertical position of a note's center at `now_sec`.
    pub fn note_y(&self, target_time_sec: f64, now_sec: f64) -> f32 {
        let remaining = (target_time_sec - now_sec) as f32;
        self.hit_line_y - remaining * self.fall_speed_px_per_sec
    }

    /// Center of a note in playfield pixels.
    pub fn note_center(&self, lane: Lane, target_time_sec: f64, now_sec: f64) -> Vec2 {
        Vec2::new(
            lane.center_x(self.width),
            self.note_y(target_time_sec, now_sec),
        )
    }

    /// Whether a note at `y` is still visible.
    pub fn is_on_screen(&self, y: f32) -> bool {
        y + self.note_height * 0.5 >= 0.0 && y - self.note_height * 0.5 <= self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lead_time_matches_fall_distance() {
        let l = PlayfieldLayout::default();
        let expected = 550.0 / 210.0;
        assert!((l.lead_time_sec() - expected).abs() < 1e-6);
    }

    #[test]
    fn note_reaches_hit_line_at_target_time() {
        let l = PlayfieldLayout::default();
        assert_eq!(l.note_y(5.0, 5.0), l.hit_line_y);
        let spawn = l.note_y(5.0, 5.0 - l.lead_time_sec());
        assert!((spawn - l.spawn_y).abs() < 1e-3);
    }

    #[test]
    fn notes_leave_the_screen_below_the_bottom_edge() {
        let l = PlayfieldLayout::default();
        assert!(!l.is_on_screen(l.spawn_y));
        assert!(l.is_on_screen(l.spawn_y + l.note_height));
        assert!(l.is_on_screen(l.height));
        assert!(!l.is_on_screen(l.height + l.note_height));
    }

    #[test]
    fn validate_rejects_upside_down_geometry() {
        let l = PlayfieldLayout {
            spawn_y: 600.0,
            ..PlayfieldLayout::default()
        };
        assert!(matches!(l.validate(), Err(ConfigError::Geometry { .. })));
    }
}
