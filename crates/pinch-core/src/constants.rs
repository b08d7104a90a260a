// Shared gameplay/audio tuning constants used by the core and the native frontend.

// Playfield layout (pixels)
pub const PLAYFIELD_WIDTH: f32 = 800.0;
pub const PLAYFIELD_HEIGHT: f32 = 600.0;
pub const HIT_LINE_Y: f32 = PLAYFIELD_HEIGHT - 100.0; // judgment line
pub const NOTE_SPAWN_Y: f32 = -50.0; // notes appear just above the top edge
pub const NOTE_HEIGHT: f32 = 40.0;
pub const NOTE_FALL_SPEED_PX_PER_SEC: f32 = 210.0; // 7 px/frame at 30 FPS

// Nominal frame rate the game loop targets
pub const TARGET_FPS: f32 = 30.0;

// Pinch detection
pub const PINCH_THRESHOLD: f32 = 0.0625; // normalized image units (40 px on a 640 px frame)

// Hit judgment
pub const HIT_TOLERANCE_SEC: f64 = 0.15; // +/- around the target time
pub const COMBO_BASE_POINTS: u64 = 10; // points = base + combo before the hit

// Graded judgment thresholds as fractions of the tolerance
pub const PERFECT_FRACTION: f64 = 1.0 / 3.0;
pub const GREAT_FRACTION: f64 = 2.0 / 3.0;

// Graded points per judgment
pub const PERFECT_POINTS: u64 = 30;
pub const GREAT_POINTS: u64 = 20;
pub const GOOD_POINTS: u64 = 10;

// Music volume ducking
pub const VOLUME_LOW: f32 = 0.1;
pub const VOLUME_HIGH: f32 = 1.0;
pub const VOLUME_DECAY_PER_SEC: f32 = 0.6; // 0.02 per frame at 30 FPS

// Procedural schedule
pub const SPAWN_INTERVAL_SEC: f64 = 1.0; // one spawn opportunity per beat
pub const SPAWN_PROBABILITY: f64 = 0.7;
pub const DEFAULT_SEED: u64 = 42;

// Procedural audio
pub const SAMPLE_RATE_HZ: u32 = 44_100;
pub const TONE_DURATION_SEC: f32 = 0.3;
pub const TONE_DECAY_RATE: f32 = 3.0; // exp(-rate * t)
pub const ERROR_NOISE_DURATION_SEC: f32 = 0.1;
pub const ERROR_NOISE_AMPLITUDE: f32 = 0.3;
pub const WAVETABLE_SIZE: usize = 2048;

// Default palette for the four lanes (green, red, yellow, blue)
pub const LANE_COLORS: [[f32; 3]; 4] = [
    [0.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 0.39, 1.0],
];

// Fallback tone pitches per lane: C4, D4, E4, G4
pub const LANE_MIDI_NOTES: [i32; 4] = [60, 62, 64, 67];
