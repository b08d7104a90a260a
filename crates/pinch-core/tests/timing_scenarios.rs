// End-to-end timing behaviour of a play session, driven frame by frame.

use pinch_core::*;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(50);
const NO_KEYS: [bool; LANE_COUNT] = [false; LANE_COUNT];

fn key(lane: Lane) -> [bool; LANE_COUNT] {
    let mut keys = NO_KEYS;
    keys[lane.index()] = true;
    keys
}

fn chart_session(chart: Vec<ChartNote>) -> GameSession {
    let config = GameConfig {
        schedule: ScheduleKind::Pattern(chart),
        ..GameConfig::default()
    };
    GameSession::new(config).unwrap()
}

fn single_note(lane: Lane, time_sec: f64) -> GameSession {
    chart_session(vec![ChartNote { time_sec, lane }])
}

/// Step with no input until the session clock passes `until`.
fn idle_until(session: &mut GameSession, until: f64) -> Vec<FrameReport> {
    let mut reports = Vec::new();
    while session.now_sec() + FRAME.as_secs_f64() < until {
        reports.push(session.frame(FRAME, None, NO_KEYS));
    }
    reports
}

#[test]
fn pinch_inside_window_scores_a_hit() {
    let mut s = single_note(Lane::Index, 2.0);
    idle_until(&mut s, 2.08);
    let report = s.frame(FRAME, None, key(Lane::Index));
    assert!((s.now_sec() - 2.10).abs() < 0.03);
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.resolutions.len(), 1);
    assert!(report.resolutions[0].is_hit());
    assert_eq!(report.state.score, COMBO_BASE_POINTS);
    assert_eq!(report.state.combo, 1);
    assert_eq!(report.state.volume, VOLUME_HIGH);
    assert!(s.active_notes().is_empty());
    assert!(s.is_finished());
}

#[test]
fn unpinched_note_is_missed_after_window() {
    let mut s = single_note(Lane::Middle, 2.0);
    let reports = idle_until(&mut s, 2.30);
    let misses: Vec<_> = reports
        .iter()
        .flat_map(|r| r.resolutions.iter())
        .filter(|r| !r.is_hit())
        .collect();
    assert_eq!(misses.len(), 1);
    assert!(misses[0].offset_sec > HIT_TOLERANCE_SEC);
    assert_eq!(s.state().score, 0);
    assert_eq!(s.state().combo, 0);
    assert_eq!(s.state().misses, 1);
    assert!(s.active_notes().is_empty());
}

#[test]
fn pinch_well_before_window_leaves_note_pending() {
    let mut s = single_note(Lane::Ring, 2.0);
    idle_until(&mut s, 1.0);
    let report = s.frame(FRAME, None, key(Lane::Ring));
    assert_eq!(report.events.len(), 1);
    assert!(report.resolutions.is_empty());
    assert_eq!(s.active_notes().len(), 1);
    assert_eq!(s.active_notes()[0].status, NoteStatus::Pending);
}

#[test]
fn pinch_in_wrong_lane_does_not_hit() {
    let mut s = single_note(Lane::Pinky, 2.0);
    idle_until(&mut s, 2.0);
    let report = s.frame(FRAME, None, key(Lane::Index));
    assert!(report.resolutions.is_empty());
    assert_eq!(s.state().score, 0);
}

#[test]
fn miss_breaks_combo_but_keeps_score() {
    let mut s = chart_session(vec![
        ChartNote {
            time_sec: 1.0,
            lane: Lane::Index,
        },
        ChartNote {
            time_sec: 2.0,
            lane: Lane::Middle,
        },
    ]);
    idle_until(&mut s, 1.0);
    s.frame(FRAME, None, key(Lane::Index));
    assert_eq!(s.state().combo, 1);
    let scored = s.state().score;

    idle_until(&mut s, 2.5);
    assert_eq!(s.state().combo, 0);
    assert_eq!(s.state().max_combo, 1);
    assert_eq!(s.state().score, scored);
    assert_eq!(s.state().volume, VOLUME_LOW);
}

#[test]
fn no_hand_frames_emit_nothing_and_volume_never_rises() {
    let mut engine = NoteEngine::default();
    let mut state = engine.initial_state();
    state.volume = VOLUME_HIGH;
    let mut prev = state.volume;
    for i in 0..50 {
        let out = engine.step(state, i as f64 / TARGET_FPS as f64, 1.0 / TARGET_FPS, &[]);
        assert!(out.resolutions.is_empty());
        assert!(out.state.volume <= prev);
        assert!(out.state.volume >= VOLUME_LOW);
        prev = out.state.volume;
        state = out.state;
    }
    assert!(prev < VOLUME_HIGH);

    let mut s = GameSession::new(GameConfig::default()).unwrap();
    for _ in 0..50 {
        let report = s.frame(Duration::from_secs_f32(1.0 / TARGET_FPS), None, NO_KEYS);
        assert!(report.events.is_empty());
        assert!(report.resolutions.is_empty());
    }
}

#[test]
fn holding_a_key_emits_one_event() {
    let mut s = GameSession::new(GameConfig::default()).unwrap();
    let total: usize = (0..20)
        .map(|_| s.frame(FRAME, None, key(Lane::Ring)).events.len())
        .sum();
    assert_eq!(total, 1);
    assert!(s.held()[Lane::Ring.index()]);

    s.frame(FRAME, None, NO_KEYS);
    assert_eq!(s.frame(FRAME, None, key(Lane::Ring)).events.len(), 1);
}

#[test]
fn long_random_session_keeps_invariants() {
    use rand::prelude::*;

    let mut s = GameSession::new(GameConfig::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let dt = Duration::from_secs_f32(1.0 / TARGET_FPS);
    let mut prev_score = 0;
    let mut spawned = 0;
    let mut resolved = 0;
    for _ in 0..3_000 {
        let keys = [(); LANE_COUNT].map(|_| rng.gen_bool(0.2));
        let report = s.frame(dt, None, keys);
        let state = &report.state;
        assert!(state.score >= prev_score);
        assert!((VOLUME_LOW..=VOLUME_HIGH).contains(&state.volume));
        assert!(state.combo <= state.max_combo);
        assert!(state.max_combo <= state.hits);
        prev_score = state.score;
        spawned += report.spawned;
        resolved += report.resolutions.len();
    }
    let state = s.state();
    assert_eq!(resolved as u32, state.hits + state.misses);
    assert_eq!(spawned, resolved + s.active_notes().len());
    assert!(state.hits > 0 && state.misses > 0);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = GameConfig::default();
    config.engine.tolerance_sec = -1.0;
    assert!(matches!(
        GameSession::new(config),
        Err(CoreError::Config(ConfigError::HitTolerance(_)))
    ));
}
