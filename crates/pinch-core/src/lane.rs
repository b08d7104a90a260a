//! The four note lanes and their static bindings.
//!
//! Each lane is tied to the fingertip that has to meet the thumb to hit it,
//! a display color, a fallback keyboard key and a fallback tone.

use glam::Vec4;

use crate::constants::{LANE_COLORS, LANE_MIDI_NOTES};
use crate::landmarks::{INDEX_TIP, MIDDLE_TIP, PINKY_TIP, RING_TIP};

pub const LANE_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lane {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Lane {
    pub const ALL: [Lane; LANE_COUNT] = [Lane::Index, Lane::Middle, Lane::Ring, Lane::Pinky];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Lane> {
        Lane::ALL.get(i).copied()
    }

    /// Landmark index of the fingertip paired with the thumb for this lane.
    pub fn fingertip(self) -> usize {
        match self {
            Lane::Index => INDEX_TIP,
            Lane::Middle => MIDDLE_TIP,
            Lane::Ring => RING_TIP,
            Lane::Pinky => PINKY_TIP,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Lane::Index => "Index",
            Lane::Middle => "Middle",
            Lane::Ring => "Ring",
            Lane::Pinky => "Pinky",
        }
    }

    /// Keyboard key that stands in for the pinch when no camera is used.
    pub fn fallback_key(self) -> char {
        match self {
            Lane::Index => 'D',
            Lane::Middle => 'F',
            Lane::Ring => 'J',
            Lane::Pinky => 'K',
        }
    }

    pub fn color_rgb(self) -> [f32; 3] {
        LANE_COLORS[self.index()]
    }

    #[inline]
    pub fn color(self) -> Vec4 {
        let [r, g, b] = self.color_rgb();
        Vec4::new(r, g, b, 1.0)
    }

    pub fn midi_note(self) -> i32 {
        LANE_MIDI_NOTES[self.index()]
    }

    /// Horizontal center of the lane on a playfield `width` pixels wide.
    pub fn center_x(self, width: f32) -> f32 {
        let lane_width = width / LANE_COUNT as f32;
        lane_width * (self.index() as f32 + 0.5)
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
