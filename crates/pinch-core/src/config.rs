use crate::engine::EngineParams;
use crate::error::ConfigError;
use crate::gesture::GestureParams;
use crate::layout::PlayfieldLayout;
use crate::schedule::ScheduleKind;
use crate::synth::Timbre;

/// Every tunable of a play session, with the documented defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameConfig {
    pub layout: PlayfieldLayout,
    pub gesture: GestureParams,
    pub engine: EngineParams,
    pub schedule: ScheduleKind,
    pub timbre: Timbre,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for t in self.gesture.thresholds {
            if !t.is_finite() || t <= 0.0 {
                return Err(ConfigError::PinchThreshold(t));
            }
        }
        self.layout.validate()?;
        self.engine.validate()?;
        self.schedule.validate()
    }
}
