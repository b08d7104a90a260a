use std::time::Instant;

use pinch_core::{FrameReport, GameSession, GameState, HandLandmarks, Outcome};

use crate::audio::AudioOutput;
#[cfg(feature = "camera")]
use crate::detector::HandTracker;
use crate::input::KeyboardLanes;
use crate::render::{self, InstanceData, LaneFlashes};

pub const WINDOW_TITLE: &str = "Pinch Hero";

pub fn title_for(state: &GameState) -> String {
    format!(
        "{WINDOW_TITLE} | Score: {} | Combo: {}",
        state.score, state.combo
    )
}

/// Per-window game loop: input in, session frame, audio and visuals out.
pub struct FrameContext {
    pub session: GameSession,
    pub audio: Option<AudioOutput>,
    pub keys: KeyboardLanes,
    #[cfg(feature = "camera")]
    pub tracker: HandTracker,
    flashes: LaneFlashes,
    last_instant: Instant,
    title: String,
}

impl FrameContext {
    pub fn new(
        session: GameSession,
        audio: Option<AudioOutput>,
        #[cfg(feature = "camera")] tracker: HandTracker,
    ) -> Self {
        let title = title_for(session.state());
        Self {
            session,
            audio,
            keys: KeyboardLanes::default(),
            #[cfg(feature = "camera")]
            tracker,
            flashes: LaneFlashes::default(),
            last_instant: Instant::now(),
            title,
        }
    }

    #[cfg(feature = "camera")]
    fn poll_hand(&mut self) -> Option<Option<HandLandmarks>> {
        self.tracker.poll()
    }

    #[cfg(not(feature = "camera"))]
    fn poll_hand(&mut self) -> Option<Option<HandLandmarks>> {
        Some(None)
    }

    /// Run one game frame. Returns `None` when the camera frame was dropped,
    /// in which case nothing advances.
    pub fn frame(&mut self) -> Option<FrameReport> {
        let hand = self.poll_hand()?;
        let now = Instant::now();
        let dt = now - self.last_instant;
        self.last_instant = now;

        let report = self.session.frame(dt, hand.as_ref(), self.keys.pressed());

        self.flashes.decay(dt.as_secs_f32());
        for r in &report.resolutions {
            self.flashes.trigger(r.lane, r.is_hit());
        }
        if let Some(audio) = self.audio.as_mut() {
            let music = audio.has_music();
            for r in &report.resolutions {
                match r.outcome {
                    Outcome::Hit { .. } if !music => audio.play_lane(r.lane),
                    Outcome::Hit { .. } => {}
                    Outcome::Missed => audio.play_error(),
                }
            }
            audio.set_music_volume(report.state.volume);
        }
        Some(report)
    }

    /// New window title when the score line changed since the last call.
    pub fn take_title_update(&mut self) -> Option<&str> {
        let title = title_for(self.session.state());
        if title == self.title {
            return None;
        }
        self.title = title;
        Some(&self.title)
    }

    pub fn instances(&self) -> Vec<InstanceData> {
        render::scene_instances(
            self.session.layout(),
            self.session.active_notes(),
            self.session.held(),
            &self.flashes,
            self.session.now_sec(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_shows_score_and_combo() {
        let mut state = GameState::new(0.1);
        state.score = 120;
        state.combo = 7;
        assert_eq!(title_for(&state), "Pinch Hero | Score: 120 | Combo: 7");
    }

    #[cfg(not(feature = "camera"))]
    #[test]
    fn keyboard_frames_always_advance() {
        use pinch_core::{GameConfig, Lane};
        use winit::event::ElementState;

        let session = GameSession::new(GameConfig::default()).unwrap();
        let mut ctx = FrameContext::new(session, None);
        ctx.keys.on_key(Lane::Index, ElementState::Pressed);
        let report = ctx.frame().unwrap();
        assert_eq!(report.events.len(), 1);
        assert!(ctx.frame().unwrap().events.is_empty());
        assert!(ctx.take_title_update().is_none());
        assert!(!ctx.instances().is_empty());
    }
}
