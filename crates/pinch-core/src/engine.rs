//! Note/timing engine.
//!
//! Owns the falling notes, judges pinch events against the hit window, sweeps
//! late notes into misses, and ducks the music volume. Game state is passed
//! in by value and handed back, so a frame is a pure function of
//! `(state, active notes, now, events)`.

use smallvec::SmallVec;

use crate::constants::HIT_TOLERANCE_SEC;
use crate::error::ConfigError;
use crate::gesture::PinchEvent;
use crate::lane::Lane;
use crate::schedule::ScheduledNote;
use crate::scoring::{Judgment, ScoreMode};
use crate::volume::{VolumeDucker, VolumeParams};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteStatus {
    Pending,
    Hit,
    Missed,
}

impl NoteStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, NoteStatus::Pending)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub id: u64,
    pub lane: Lane,
    pub spawn_time_sec: f64,
    pub target_time_sec: f64,
    pub status: NoteStatus,
}

/// Per-session score and audio level.
///
/// Fields:
/// - `score`: never decreases
/// - `combo`: current streak of hits, reset by any miss
/// - `volume`: music level, always within the ducker's bounds
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub hits: u32,
    pub misses: u32,
    pub volume: f32,
}

impl GameState {
    pub fn new(volume: f32) -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            hits: 0,
            misses: 0,
            volume,
        }
    }

    /// Share of resolved notes that were hit, 0..1.
    pub fn accuracy(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f32 / total as f32
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    Hit { judgment: Judgment, points: u64 },
    Missed,
}

/// How a note left the playfield this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub note_id: u64,
    pub lane: Lane,
    pub outcome: Outcome,
    /// `now - target` at resolution time.
    pub offset_sec: f64,
}

impl Resolution {
    pub fn is_hit(&self) -> bool {
        matches!(self.outcome, Outcome::Hit { .. })
    }
}

pub type Resolutions = SmallVec<[Resolution; 4]>;

pub struct StepOutcome {
    pub state: GameState,
    pub resolutions: Resolutions,
}

/// Judgment tuning.
///
/// - `tolerance_sec`: half-width of the hit window around the target time
/// - `score_mode`: points formula per hit
/// - `volume`: ducking bounds and decay rate
#[derive(Clone, Debug, PartialEq)]
pub struct EngineParams {
    pub tolerance_sec: f64,
    pub score_mode: ScoreMode,
    pub volume: VolumeParams,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            tolerance_sec: HIT_TOLERANCE_SEC,
            score_mode: ScoreMode::default(),
            volume: VolumeParams::default(),
        }
    }
}

impl EngineParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance_sec.is_nan() || self.tolerance_sec <= 0.0 {
            return Err(ConfigError::HitTolerance(self.tolerance_sec));
        }
        self.volume.validate()
    }
}

pub struct NoteEngine {
    pub params: EngineParams,
    ducker: VolumeDucker,
    notes: Vec<Note>,
    next_id: u64,
}

impl NoteEngine {
    pub fn new(params: EngineParams) -> Self {
        let ducker = VolumeDucker::new(params.volume.clone());
        Self {
            params,
            ducker,
            notes: Vec::new(),
            next_id: 0,
        }
    }

    /// Fresh state for a new session.
    pub fn initial_state(&self) -> GameState {
        GameState::new(self.ducker.initial())
    }

    /// Put a scheduled note on the playfield; returns its id.
    pub fn spawn(&mut self, scheduled: ScheduledNote) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let note = Note {
            id,
            lane: scheduled.lane,
            spawn_time_sec: scheduled.spawn_time_sec,
            target_time_sec: scheduled.target_time_sec,
            status: NoteStatus::Pending,
        };
        // keep notes ordered by target time so the earliest is found first
        let at = self
            .notes
            .partition_point(|n| n.target_time_sec <= note.target_time_sec);
        self.notes.insert(at, note);
        id
    }

    /// Notes still falling, ordered by target time.
    pub fn active_notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// Advance one frame.
    ///
    /// Pinch events are judged before late notes are swept, so a pinch landing
    /// exactly on the window edge still counts. Notes already past their window
    /// are skipped by the lookup and swept below.
    pub fn step(
        &mut self,
        mut state: GameState,
        now_sec: f64,
        dt_sec: f32,
        events: &[PinchEvent],
    ) -> StepOutcome {
        let mut resolutions = Resolutions::new();
        let tolerance = self.params.tolerance_sec;

        for ev in events {
            let Some(note) = self
                .notes
                .iter_mut()
                .find(|n| {
                    n.lane == ev.lane
                        && n.status == NoteStatus::Pending
                        && now_sec <= n.target_time_sec + tolerance
                })
            else {
                continue;
            };
            let offset = now_sec - note.target_time_sec;
            let Some(judgment) = Judgment::grade(offset, tolerance) else {
                continue;
            };
            let points = self.params.score_mode.points(judgment, state.combo);
            note.status = NoteStatus::Hit;
            state.score += points;
            state.combo += 1;
            state.max_combo = state.max_combo.max(state.combo);
            state.hits += 1;
            resolutions.push(Resolution {
                note_id: note.id,
                lane: note.lane,
                outcome: Outcome::Hit { judgment, points },
                offset_sec: offset,
            });
        }

        for note in self.notes.iter_mut() {
            if note.status == NoteStatus::Pending && now_sec > note.target_time_sec + tolerance {
                note.status = NoteStatus::Missed;
                state.combo = 0;
                state.misses += 1;
                resolutions.push(Resolution {
                    note_id: note.id,
                    lane: note.lane,
                    outcome: Outcome::Missed,
                    offset_sec: now_sec - note.target_time_sec,
                });
            }
        }

        self.notes.retain(|n| !n.status.is_terminal());

        let hits = resolutions.iter().filter(|r| r.is_hit()).count();
        let misses = resolutions.len() - hits;
        state.volume = self.ducker.step(state.volume, dt_sec, hits, misses);

        for r in &resolutions {
            log::debug!("[engine] note {} in {}: {:?}", r.note_id, r.lane, r.outcome);
        }

        StepOutcome { state, resolutions }
    }
}

impl Default for NoteEngine {
    fn default() -> Self {
        Self::new(EngineParams::default())
    }
}
