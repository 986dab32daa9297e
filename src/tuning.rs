use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use crate::chase::ChaseSpeeds;
use crate::error::ConfigError;
use crate::invincibility::StageWindows;
use crate::pattern::PatternTuning;

/// All encounter knobs. Missing keys keep their defaults.
#[derive(Debug, Clone, Default, Deserialize, Resource)]
#[serde(default)]
pub struct Tuning {
    pub boss: BossTuning,
    pub player: PlayerTuning,
    pub arena: ArenaTuning,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    pub max_health: i32,
    pub chase_speeds: ChaseSpeeds,
    pub windows: StageWindows,
    pub patterns: PatternTuning,
    pub contact_damage: i32,
    pub screen_padding: f32,
    pub hurt_flash: f32,
    pub size: [f32; 2],
    pub spawn: [f32; 2],
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            max_health: 300,
            chase_speeds: ChaseSpeeds::default(),
            windows: StageWindows::default(),
            patterns: PatternTuning::default(),
            contact_damage: 1,
            screen_padding: 0.1,
            hurt_flash: 1.0,
            size: [2.5, 2.5],
            spawn: [8.0, 4.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: i32,
    pub move_speed: f32,
    pub jump_force: f32,
    pub max_jumps: u32,
    pub dash_multiplier: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    pub ground_sensor_radius: f32,
    pub ground_sensor_offset: [f32; 2],
    pub can_attack_in_air: bool,
    pub fast_fall_enabled: bool,
    pub fast_fall_multiplier: f32,
    pub fast_fall_threshold: f32,
    pub iframes_enabled: bool,
    pub iframe_duration: f32,
    pub hit_damage: i32,
    pub hit_range: f32,
    pub attack_window: f32,
    pub size: [f32; 2],
    pub spawn: [f32; 2],
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 5,
            move_speed: 14.0,
            jump_force: 20.0,
            max_jumps: 2,
            dash_multiplier: 6.0,
            dash_duration: 0.04,
            dash_cooldown: 0.5,
            ground_sensor_radius: 0.2,
            ground_sensor_offset: [0.0, -1.0],
            can_attack_in_air: true,
            fast_fall_enabled: true,
            fast_fall_multiplier: 20.0,
            fast_fall_threshold: -0.7,
            iframes_enabled: true,
            iframe_duration: 1.0,
            hit_damage: 20,
            hit_range: 1.5,
            attack_window: 0.25,
            size: [0.8, 1.8],
            spawn: [-8.0, -6.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub gravity: f32,
    pub view_height: f32,
    pub width: f32,
    pub floor_y: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            gravity: 40.0,
            view_height: 20.0,
            width: 36.0,
            floor_y: -8.0,
        }
    }
}

impl Tuning {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: Default::default(),
            source,
        })?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.boss.max_health <= 0 {
            return Err(ConfigError::Invalid("boss.max_health must be positive".into()));
        }
        if self.player.max_health <= 0 {
            return Err(ConfigError::Invalid("player.max_health must be positive".into()));
        }
        if self.player.max_jumps == 0 {
            return Err(ConfigError::Invalid("player.max_jumps must be at least 1".into()));
        }

        let p = &self.boss.patterns;
        let w = &self.boss.windows;
        let durations = [
            ("boss.patterns.dash_windup", p.dash_windup),
            ("boss.patterns.dash_duration", p.dash_duration),
            ("boss.patterns.cooldown", p.cooldown),
            ("boss.patterns.zigzag_duration", p.zigzag_duration),
            ("boss.patterns.homing_recovery", p.homing_recovery),
            ("boss.patterns.zigzag_recovery", p.zigzag_recovery),
            ("boss.patterns.barrage_recovery", p.barrage_recovery),
            ("boss.patterns.barrage_windup_scale", p.barrage_windup_scale),
            ("boss.patterns.barrage_dash_scale", p.barrage_dash_scale),
            ("boss.patterns.barrage_speed_scale", p.barrage_speed_scale),
            ("boss.windows.high.invincible", w.high.invincible),
            ("boss.windows.high.vulnerable", w.high.vulnerable),
            ("boss.windows.mid.invincible", w.mid.invincible),
            ("boss.windows.mid.vulnerable", w.mid.vulnerable),
            ("boss.windows.low.invincible", w.low.invincible),
            ("boss.windows.low.vulnerable", w.low.vulnerable),
            ("player.dash_duration", self.player.dash_duration),
            ("player.dash_cooldown", self.player.dash_cooldown),
            ("player.iframe_duration", self.player.iframe_duration),
            ("player.attack_window", self.player.attack_window),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, v)| !(*v >= 0.0)) {
            return Err(ConfigError::Invalid(format!("{name} must be non-negative")));
        }
        Ok(())
    }
}

/// Loads `Tuning` from JSON at build time; falls back to defaults on error.
pub struct TuningPlugin {
    path: String,
}

impl TuningPlugin {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Plugin for TuningPlugin {
    fn build(&self, app: &mut App) {
        let tuning = match Tuning::load(&self.path) {
            Ok(tuning) => {
                info!("TuningPlugin: loaded {}", self.path);
                tuning
            }
            Err(err) => {
                warn!("TuningPlugin: {err}; using defaults");
                Tuning::default()
            }
        };
        app.insert_resource(tuning);
    }
}
