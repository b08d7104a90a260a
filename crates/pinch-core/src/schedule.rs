use rand::prelude::*;
use std::time::Duration;

use crate::constants::{DEFAULT_SEED, SPAWN_INTERVAL_SEC, SPAWN_PROBABILITY};
use crate::error::ConfigError;
use crate::lane::{Lane, LANE_COUNT};

/// A note the scheduler wants on the playfield.
///
/// Fields:
/// - `lane`: which lane the note falls in
/// - `spawn_time_sec`: session time at which it appears at the top
/// - `target_time_sec`: session time at which it crosses the hit line
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledNote {
    pub lane: Lane,
    pub spawn_time_sec: f64,
    pub target_time_sec: f64,
}

/// A hand-authored chart entry: hit `lane` at `time_sec`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartNote {
    pub time_sec: f64,
    pub lane: Lane,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ScheduleKind {
    /// One spawn opportunity per interval, random lane.
    Procedural {
        interval_sec: f64,
        spawn_probability: f64,
        seed: u64,
    },
    /// Fixed chart of target times.
    Pattern(Vec<ChartNote>),
}

impl Default for ScheduleKind {
    fn default() -> Self {
        ScheduleKind::Procedural {
            interval_sec: SPAWN_INTERVAL_SEC,
            spawn_probability: SPAWN_PROBABILITY,
            seed: DEFAULT_SEED,
        }
    }
}

impl ScheduleKind {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            ScheduleKind::Procedural {
                interval_sec,
                spawn_probability,
                ..
            } => {
                if interval_sec.is_nan() || *interval_sec <= 0.0 {
                    return Err(ConfigError::SpawnInterval(*interval_sec));
                }
                if !(0.0..=1.0).contains(spawn_probability) {
                    return Err(ConfigError::SpawnProbability(*spawn_probability));
                }
            }
            ScheduleKind::Pattern(chart) => {
                if let Some((index, note)) = chart
                    .iter()
                    .enumerate()
                    .find(|(_, n)| !n.time_sec.is_finite())
                {
                    return Err(ConfigError::ChartTime {
                        index,
                        time_sec: note.time_sec,
                    });
                }
            }
        }
        Ok(())
    }
}

pub struct NoteScheduler {
    kind: ScheduleKind,
    lead_time_sec: f64,
    rng: StdRng,
    beat_accum: f64,
    cursor: usize,
}

impl NoteScheduler {
    /// `lead_time_sec` is the fixed spawn-to-hit interval the playfield gives.
    pub fn new(kind: ScheduleKind, lead_time_sec: f64) -> Self {
        let seed = match &kind {
            ScheduleKind::Procedural { seed, .. } => *seed,
            ScheduleKind::Pattern(_) => DEFAULT_SEED,
        };
        let kind = match kind {
            ScheduleKind::Pattern(mut chart) => {
                chart.sort_by(|a, b| a.time_sec.total_cmp(&b.time_sec));
                ScheduleKind::Pattern(chart)
            }
            other => other,
        };
        Self {
            kind,
            lead_time_sec,
            rng: StdRng::seed_from_u64(seed),
            beat_accum: 0.0,
            cursor: 0,
        }
    }

    pub fn lead_time_sec(&self) -> f64 {
        self.lead_time_sec
    }

    /// Whether a pattern schedule has handed out every note.
    pub fn is_exhausted(&self) -> bool {
        match &self.kind {
            ScheduleKind::Procedural { .. } => false,
            ScheduleKind::Pattern(chart) => self.cursor >= chart.len(),
        }
    }

    /// Advance the schedule to `now_sec` (after `dt` elapsed) and append every
    /// note that is due to appear.
    pub fn tick(&mut self, dt: Duration, now_sec: f64, out: &mut Vec<ScheduledNote>) {
        match &self.kind {
            ScheduleKind::Procedural {
                interval_sec,
                spawn_probability,
                ..
            } => {
                let (interval, prob) = (*interval_sec, *spawn_probability);
                self.beat_accum += dt.as_secs_f64();
                while self.beat_accum >= interval {
                    self.beat_accum -= interval;
                    // the beat actually happened `beat_accum` seconds ago
                    let spawn_at = now_sec - self.beat_accum;
                    if self.rng.gen::<f64>() < prob {
                        let lane = Lane::ALL[self.rng.gen_range(0..LANE_COUNT)];
                        out.push(ScheduledNote {
                            lane,
                            spawn_time_sec: spawn_at,
                            target_time_sec: spawn_at + self.lead_time_sec,
                        });
                    }
                }
            }
            ScheduleKind::Pattern(chart) => {
                while let Some(entry) = chart.get(self.cursor) {
                    let spawn_at = entry.time_sec - self.lead_time_sec;
                    if spawn_at > now_sec {
                        break;
                    }
                    // chart entries earlier than the lead time appear at once
                    out.push(ScheduledNote {
                        lane: entry.lane,
                        spawn_time_sec: spawn_at.max(0.0),
                        target_time_sec: entry.time_sec,
                    });
                    self.cursor += 1;
                }
            }
        }
    }
}
