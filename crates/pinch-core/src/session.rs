//! One play session: classifier, scheduler and engine driven frame by frame.
//!
//! The frontend calls [`GameSession::frame`] once per successfully captured
//! camera frame. A dropped frame is simply not reported, which leaves every
//! piece of state untouched.

use std::time::Duration;

use crate::config::GameConfig;
use crate::engine::{GameState, Note, NoteEngine, Resolutions};
use crate::error::CoreError;
use crate::gesture::{GestureClassifier, PinchEvents};
use crate::lane::LANE_COUNT;
use crate::landmarks::HandLandmarks;
use crate::layout::PlayfieldLayout;
use crate::schedule::{NoteScheduler, ScheduledNote};

/// What happened during a single frame.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub events: PinchEvents,
    pub resolutions: Resolutions,
    pub spawned: usize,
    pub state: GameState,
}

pub struct GameSession {
    config: GameConfig,
    classifier: GestureClassifier,
    scheduler: NoteScheduler,
    engine: NoteEngine,
    state: GameState,
    clock_sec: f64,
    spawn_buf: Vec<ScheduledNote>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let classifier = GestureClassifier::new(config.gesture.clone());
        let scheduler =
            NoteScheduler::new(config.schedule.clone(), config.layout.lead_time_sec());
        let engine = NoteEngine::new(config.engine.clone());
        let state = engine.initial_state();
        log::info!(
            "[session] lead time {:.2}s, hit window +/-{:.3}s",
            scheduler.lead_time_sec(),
            config.engine.tolerance_sec
        );
        Ok(Self {
            config,
            classifier,
            scheduler,
            engine,
            state,
            clock_sec: 0.0,
            spawn_buf: Vec::new(),
        })
    }

    /// Advance by `dt`.
    ///
    /// `hand` is the validated detector output (`None` when no hand is
    /// visible); `keys` is the keyboard fallback, OR-ed into the pinch state
    /// before debouncing.
    pub fn frame(
        &mut self,
        dt: Duration,
        hand: Option<&HandLandmarks>,
        keys: [bool; LANE_COUNT],
    ) -> FrameReport {
        self.clock_sec += dt.as_secs_f64();
        let now = self.clock_sec;

        let mut pressed = self.classifier.pinched_lanes(hand);
        for (p, k) in pressed.iter_mut().zip(keys) {
            *p |= k;
        }
        let events = self.classifier.update_pressed(pressed);

        self.spawn_buf.clear();
        self.scheduler.tick(dt, now, &mut self.spawn_buf);
        for scheduled in &self.spawn_buf {
            self.engine.spawn(*scheduled);
        }

        let outcome = self
            .engine
            .step(self.state.clone(), now, dt.as_secs_f32(), &events);
        self.state = outcome.state;

        FrameReport {
            events,
            resolutions: outcome.resolutions,
            spawned: self.spawn_buf.len(),
            state: self.state.clone(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn now_sec(&self) -> f64 {
        self.clock_sec
    }

    pub fn active_notes(&self) -> &[Note] {
        self.engine.active_notes()
    }

    /// Lanes currently held down, for the pressed indicator.
    pub fn held(&self) -> [bool; LANE_COUNT] {
        self.classifier.held()
    }

    pub fn layout(&self) -> &PlayfieldLayout {
        &self.config.layout
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// True once a chart-based session has resolved every note.
    pub fn is_finished(&self) -> bool {
        self.scheduler.is_exhausted() && self.engine.active_notes().is_empty()
    }
}
