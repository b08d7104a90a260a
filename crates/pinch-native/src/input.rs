use pinch_core::{Lane, LANE_COUNT};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keyboard stand-in for a pinch: D F J K map to Index, Middle, Ring, Pinky.
pub fn lane_for_key(code: KeyCode) -> Option<Lane> {
    match code {
        KeyCode::KeyD => Some(Lane::Index),
        KeyCode::KeyF => Some(Lane::Middle),
        KeyCode::KeyJ => Some(Lane::Ring),
        KeyCode::KeyK => Some(Lane::Pinky),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Lane(Lane),
    Quit,
}

pub fn map_key(code: KeyCode) -> Option<KeyAction> {
    match code {
        KeyCode::Escape => Some(KeyAction::Quit),
        other => lane_for_key(other).map(KeyAction::Lane),
    }
}

/// Held state of the lane keys. Debouncing happens in the classifier, so this
/// only tracks which keys are physically down.
#[derive(Default, Clone, Copy, Debug)]
pub struct KeyboardLanes {
    down: [bool; LANE_COUNT],
}

impl KeyboardLanes {
    pub fn on_key(&mut self, lane: Lane, state: ElementState) {
        self.down[lane.index()] = state == ElementState::Pressed;
    }

    /// Route a winit key event; returns the action it mapped to, if any.
    pub fn handle(&mut self, event: &KeyEvent) -> Option<KeyAction> {
        let PhysicalKey::Code(code) = event.physical_key else {
            return None;
        };
        let action = map_key(code)?;
        if let KeyAction::Lane(lane) = action {
            self.on_key(lane, event.state);
        }
        Some(action)
    }

    pub fn pressed(&self) -> [bool; LANE_COUNT] {
        self.down
    }

    /// Forget everything, e.g. when the window loses focus and releases are
    /// never delivered.
    pub fn clear(&mut self) {
        self.down = [false; LANE_COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_keys_match_fallback_labels() {
        for (code, lane) in [
            (KeyCode::KeyD, Lane::Index),
            (KeyCode::KeyF, Lane::Middle),
            (KeyCode::KeyJ, Lane::Ring),
            (KeyCode::KeyK, Lane::Pinky),
        ] {
            assert_eq!(lane_for_key(code), Some(lane));
            assert_eq!(format!("{code:?}"), format!("Key{}", lane.fallback_key()));
        }
        assert_eq!(lane_for_key(KeyCode::KeyA), None);
    }

    #[test]
    fn escape_quits() {
        assert_eq!(map_key(KeyCode::Escape), Some(KeyAction::Quit));
        assert_eq!(map_key(KeyCode::Space), None);
    }

    #[test]
    fn press_and_release_track_held_state() {
        let mut keys = KeyboardLanes::default();
        keys.on_key(Lane::Ring, ElementState::Pressed);
        keys.on_key(Lane::Index, ElementState::Pressed);
        assert_eq!(keys.pressed(), [true, false, true, false]);
        keys.on_key(Lane::Ring, ElementState::Released);
        assert_eq!(keys.pressed(), [true, false, false, false]);
        keys.clear();
        assert_eq!(keys.pressed(), [false; LANE_COUNT]);
    }
}
