use bevy::math::Vec2;
use serde::Deserialize;

use crate::health::Stage;

/// Seek speed per stage. Stage 0 is the fastest on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChaseSpeeds {
    pub high: f32,
    pub mid: f32,
    pub low: f32,
}

impl Default for ChaseSpeeds {
    fn default() -> Self {
        Self { high: 7.0, mid: 4.0, low: 13.0 }
    }
}

impl ChaseSpeeds {
    pub fn for_stage(&self, stage: Stage) -> f32 {
        match stage {
            Stage::High => self.high,
            Stage::Mid => self.mid,
            Stage::Low => self.low,
        }
    }

    /// Unknown indices use the stage 2 speed.
    pub fn for_index(&self, index: u8) -> f32 {
        Stage::from_index(index)
            .map(|stage| self.for_stage(stage))
            .unwrap_or(self.high)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChaseMovement {
    speeds: ChaseSpeeds,
}

impl ChaseMovement {
    pub fn new(speeds: ChaseSpeeds) -> Self {
        Self { speeds }
    }

    /// `None` without a target: the caller leaves velocity untouched.
    pub fn velocity(&self, position: Vec2, target: Option<Vec2>, stage: Stage) -> Option<Vec2> {
        let target = target?;
        Some((target - position).normalize_or_zero() * self.speeds.for_stage(stage))
    }
}
