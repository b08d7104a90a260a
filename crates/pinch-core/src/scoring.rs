use crate::constants::{
    COMBO_BASE_POINTS, GOOD_POINTS, GREAT_FRACTION, GREAT_POINTS, PERFECT_FRACTION,
    PERFECT_POINTS,
};

/// How close a hit landed to the target time, relative to the tolerance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Judgment {
    Perfect,
    Great,
    Good,
}

impl Judgment {
    /// Grade an absolute timing error against the hit tolerance.
    ///
    /// Returns `None` when the error is outside the window.
    pub fn grade(offset_sec: f64, tolerance_sec: f64) -> Option<Judgment> {
        let err = offset_sec.abs();
        if !err.is_finite() || err > tolerance_sec {
            None
        } else if err <= tolerance_sec * PERFECT_FRACTION {
            Some(Judgment::Perfect)
        } else if err <= tolerance_sec * GREAT_FRACTION {
            Some(Judgment::Great)
        } else {
            Some(Judgment::Good)
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Judgment::Perfect => "Perfect",
            Judgment::Great => "Great",
            Judgment::Good => "Good",
        }
    }
}

/// Score formula applied on every hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScoreMode {
    /// Same number of points for every hit.
    Flat { points: u64 },
    /// `base + combo` where combo is the streak before this hit.
    ComboBonus { base: u64 },
    /// Points by judgment grade, plus the combo streak.
    Graded,
}

impl Default for ScoreMode {
    fn default() -> Self {
        ScoreMode::ComboBonus {
            base: COMBO_BASE_POINTS,
        }
    }
}

impl ScoreMode {
    pub fn points(self, judgment: Judgment, combo_before: u32) -> u64 {
        match self {
            ScoreMode::Flat { points } => points,
            ScoreMode::ComboBonus { base } => base + combo_before as u64,
            ScoreMode::Graded => {
                let grade_points = match judgment {
                    Judgment::Perfect => PERFECT_POINTS,
                    Judgment::Great => GREAT_POINTS,
                    Judgment::Good => GOOD_POINTS,
                };
                grade_points + combo_before as u64
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_split_the_window_in_thirds() {
        assert_eq!(Judgment::grade(0.0, 0.15), Some(Judgment::Perfect));
        assert_eq!(Judgment::grade(-0.04, 0.15), Some(Judgment::Perfect));
        assert_eq!(Judgment::grade(0.08, 0.15), Some(Judgment::Great));
        assert_eq!(Judgment::grade(-0.12, 0.15), Some(Judgment::Good));
        assert_eq!(Judgment::grade(0.15, 0.15), Some(Judgment::Good));
        assert_eq!(Judgment::grade(0.151, 0.15), None);
        assert_eq!(Judgment::grade(f64::NAN, 0.15), None);
        assert_eq!(Judgment::grade(f64::INFINITY, 0.15), None);
    }

    #[test]
    fn combo_bonus_matches_classic_formula() {
        let mode = ScoreMode::default();
        assert_eq!(mode.points(Judgment::Good, 0), 10);
        assert_eq!(mode.points(Judgment::Perfect, 7), 17);
    }

    #[test]
    fn graded_rewards_accuracy() {
        let mode = ScoreMode::Graded;
        assert!(mode.points(Judgment::Perfect, 0) > mode.points(Judgment::Great, 0));
        assert!(mode.points(Judgment::Great, 0) > mode.points(Judgment::Good, 0));
        assert_eq!(mode.points(Judgment::Good, 3), GOOD_POINTS + 3);
    }

    #[test]
    fn flat_ignores_combo() {
        let mode = ScoreMode::Flat { points: 5 };
        assert_eq!(mode.points(Judgment::Good, 100), 5);
    }
}
