//! Scripted boss attack patterns.
//!
//! A pattern is a fixed list of steps repeated a fixed number of times. The
//! engine holds an explicit cursor (pattern, repetition, step, elapsed) and is
//! advanced by two calls: `frame_tick` for timed waits and `physics_tick` for
//! the motion sub-steps. While a pattern runs it owns the boss velocity.

use std::f32::consts::TAU;

use bevy::log::debug;
use bevy::math::Vec2;
use serde::Deserialize;

use crate::health::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PatternTuning {
    pub dash_speed: f32,
    pub dash_windup: f32,
    pub dash_duration: f32,
    pub cooldown: f32,
    pub homing_rams: u32,
    pub homing_recovery: f32,
    pub zigzag_waves: u32,
    pub zigzag_duration: f32,
    pub zigzag_amplitude: f32,
    pub zigzag_oscillations: f32,
    pub zigzag_recovery: f32,
    pub barrage_rams: u32,
    pub barrage_windup_scale: f32,
    pub barrage_dash_scale: f32,
    pub barrage_speed_scale: f32,
    pub barrage_recovery: f32,
}

impl Default for PatternTuning {
    fn default() -> Self {
        Self {
            dash_speed: 20.0,
            dash_windup: 0.3,
            dash_duration: 0.5,
            cooldown: 1.0,
            homing_rams: 2,
            homing_recovery: 0.4,
            zigzag_waves: 3,
            zigzag_duration: 1.2,
            zigzag_amplitude: 2.5,
            zigzag_oscillations: 4.0,
            zigzag_recovery: 0.3,
            barrage_rams: 5,
            barrage_windup_scale: 0.6,
            barrage_dash_scale: 0.8,
            barrage_speed_scale: 1.5,
            barrage_recovery: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    SlowHomingRams,
    ZigZagRams,
    BarrageRams,
}

impl PatternKind {
    pub fn for_stage(stage: Stage) -> Self {
        match stage {
            Stage::High => PatternKind::SlowHomingRams,
            Stage::Mid => PatternKind::ZigZagRams,
            Stage::Low => PatternKind::BarrageRams,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PatternKind::SlowHomingRams => "slow homing rams",
            PatternKind::ZigZagRams => "zig-zag rams",
            PatternKind::BarrageRams => "barrage rams",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Windup,
    Dash,
    Recover,
}

impl StepKind {
    /// Dashes advance on the fixed physics tick, everything else on frames.
    pub fn is_physics(self) -> bool {
        matches!(self, StepKind::Dash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VelocityRule {
    /// Leave the current velocity alone.
    Hold,
    Stop,
    Straight { speed: f32 },
    /// `oscillations` full sine cycles of lateral offset across the step.
    ZigZag { speed: f32, amplitude: f32, oscillations: f32 },
}

impl VelocityRule {
    /// `progress` is elapsed / duration for the current step.
    pub fn velocity(self, dir: Vec2, progress: f32) -> Option<Vec2> {
        match self {
            VelocityRule::Hold => None,
            VelocityRule::Stop => Some(Vec2::ZERO),
            VelocityRule::Straight { speed } => Some(dir * speed),
            VelocityRule::ZigZag { speed, amplitude, oscillations } => {
                let perpendicular = Vec2::new(-dir.y, dir.x);
                let sine = (progress * TAU * oscillations).sin();
                Some(dir * speed + perpendicular * sine * amplitude)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternStep {
    pub kind: StepKind,
    pub duration: f32,
    pub rule: VelocityRule,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternScript {
    pub kind: PatternKind,
    pub repetitions: u32,
    pub steps: Vec<PatternStep>,
    pub stop_on_start: bool,
}

impl PatternScript {
    pub fn slow_homing_rams(t: &PatternTuning) -> Self {
        Self {
            kind: PatternKind::SlowHomingRams,
            repetitions: t.homing_rams,
            stop_on_start: true,
            steps: vec![
                PatternStep { kind: StepKind::Windup, duration: t.dash_windup, rule: VelocityRule::Hold },
                PatternStep {
                    kind: StepKind::Dash,
                    duration: t.dash_duration,
                    rule: VelocityRule::Straight { speed: t.dash_speed },
                },
                PatternStep { kind: StepKind::Recover, duration: t.homing_recovery, rule: VelocityRule::Stop },
            ],
        }
    }

    pub fn zig_zag_rams(t: &PatternTuning) -> Self {
        Self {
            kind: PatternKind::ZigZagRams,
            repetitions: t.zigzag_waves,
            stop_on_start: false,
            steps: vec![
                PatternStep {
                    kind: StepKind::Dash,
                    duration: t.zigzag_duration,
                    rule: VelocityRule::ZigZag {
                        speed: t.dash_speed,
                        amplitude: t.zigzag_amplitude,
                        oscillations: t.zigzag_oscillations,
                    },
                },
                PatternStep { kind: StepKind::Recover, duration: t.zigzag_recovery, rule: VelocityRule::Stop },
            ],
        }
    }

    pub fn barrage_rams(t: &PatternTuning) -> Self {
        Self {
            kind: PatternKind::BarrageRams,
            repetitions: t.barrage_rams,
            stop_on_start: false,
            steps: vec![
                PatternStep {
                    kind: StepKind::Windup,
                    duration: t.dash_windup * t.barrage_windup_scale,
                    rule: VelocityRule::Hold,
                },
                PatternStep {
                    kind: StepKind::Dash,
                    duration: t.dash_duration * t.barrage_dash_scale,
                    rule: VelocityRule::Straight { speed: t.dash_speed * t.barrage_speed_scale },
                },
                PatternStep { kind: StepKind::Recover, duration: t.barrage_recovery, rule: VelocityRule::Stop },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    kind: PatternKind,
    rep: u32,
    step: usize,
    elapsed: f32,
    dir: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Running(Cursor),
    Cooldown { remaining: f32 },
    Halted,
}

#[derive(Debug, Clone)]
pub struct AttackPatternEngine {
    scripts: [PatternScript; 3],
    cooldown: f32,
    phase: Phase,
    command: Option<Vec2>,
}

impl AttackPatternEngine {
    pub fn new(tuning: &PatternTuning) -> Self {
        Self {
            scripts: [
                PatternScript::slow_homing_rams(tuning),
                PatternScript::zig_zag_rams(tuning),
                PatternScript::barrage_rams(tuning),
            ],
            cooldown: tuning.cooldown.max(0.0),
            phase: Phase::Idle,
            command: None,
        }
    }

    pub fn script(&self, kind: PatternKind) -> &PatternScript {
        match kind {
            PatternKind::SlowHomingRams => &self.scripts[0],
            PatternKind::ZigZagRams => &self.scripts[1],
            PatternKind::BarrageRams => &self.scripts[2],
        }
    }

    pub fn is_performing(&self) -> bool {
        matches!(self.phase, Phase::Running(_))
    }

    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Halted
    }

    pub fn current_pattern(&self) -> Option<PatternKind> {
        match self.phase {
            Phase::Running(cursor) => Some(cursor.kind),
            _ => None,
        }
    }

    /// Repetition index and step kind of the running pattern.
    pub fn current_step(&self) -> Option<(u32, StepKind)> {
        match self.phase {
            Phase::Running(cursor) => {
                let step = self.script(cursor.kind).steps[cursor.step];
                Some((cursor.rep, step.kind))
            }
            _ => None,
        }
    }

    pub fn current_step_duration(&self) -> Option<f32> {
        match self.phase {
            Phase::Running(cursor) => Some(self.script(cursor.kind).steps[cursor.step].duration),
            _ => None,
        }
    }

    pub fn direction(&self) -> Option<Vec2> {
        match self.phase {
            Phase::Running(cursor) => Some(cursor.dir),
            _ => None,
        }
    }

    pub fn cooldown_remaining(&self) -> Option<f32> {
        match self.phase {
            Phase::Cooldown { remaining } => Some(remaining.max(0.0)),
            _ => None,
        }
    }

    /// Advances timed waits. Stage is only read when a new pattern is selected.
    pub fn frame_tick(
        &mut self,
        dt: f32,
        stage: Stage,
        alive: bool,
        target: Option<Vec2>,
        position: Vec2,
    ) {
        if !alive {
            self.halt();
            return;
        }

        match self.phase {
            Phase::Halted => {}
            Phase::Idle => self.begin(stage, target, position),
            Phase::Cooldown { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.phase = Phase::Idle;
                    self.begin(stage, target, position);
                } else {
                    self.phase = Phase::Cooldown { remaining };
                }
            }
            Phase::Running(mut cursor) => {
                let step = self.script(cursor.kind).steps[cursor.step];
                if step.kind.is_physics() {
                    return;
                }
                cursor.elapsed += dt;
                if cursor.elapsed >= step.duration {
                    self.advance(cursor, target, position);
                } else {
                    self.phase = Phase::Running(cursor);
                }
            }
        }
    }

    /// Advances motion sub-steps. Returns the velocity the boss must take this
    /// step, or `None` to leave it untouched.
    pub fn physics_tick(
        &mut self,
        dt: f32,
        alive: bool,
        target: Option<Vec2>,
        position: Vec2,
    ) -> Option<Vec2> {
        if !alive {
            self.halt();
            return None;
        }

        let Phase::Running(mut cursor) = self.phase else {
            self.command = None;
            return None;
        };

        let step = self.script(cursor.kind).steps[cursor.step];
        if !step.kind.is_physics() {
            return self.command.take();
        }

        self.command = None;
        cursor.elapsed += dt;
        let progress = if step.duration > 0.0 {
            cursor.elapsed / step.duration
        } else {
            1.0
        };
        let velocity = step.rule.velocity(cursor.dir, progress);

        if cursor.elapsed >= step.duration {
            self.advance(cursor, target, position);
        } else {
            self.phase = Phase::Running(cursor);
        }
        velocity
    }

    fn begin(&mut self, stage: Stage, target: Option<Vec2>, position: Vec2) {
        let kind = PatternKind::for_stage(stage);
        if self.script(kind).stop_on_start {
            self.command = Some(Vec2::ZERO);
        }
        debug!("boss pattern started: {}", kind.name());
        self.start_repetition(kind, 0, target, position);
    }

    fn start_repetition(&mut self, kind: PatternKind, rep: u32, target: Option<Vec2>, position: Vec2) {
        let script = self.script(kind);
        if rep >= script.repetitions || script.steps.is_empty() {
            self.finish(kind);
            return;
        }
        // target gone: abandon the remaining repetitions
        let Some(target) = target else {
            self.finish(kind);
            return;
        };

        let dir = (target - position).normalize_or_zero();
        self.enter_step(Cursor { kind, rep, step: 0, elapsed: 0.0, dir });
    }

    fn enter_step(&mut self, cursor: Cursor) {
        let step = self.script(cursor.kind).steps[cursor.step];
        if step.rule == VelocityRule::Stop {
            self.command = Some(Vec2::ZERO);
        }
        self.phase = Phase::Running(cursor);
    }

    fn advance(&mut self, cursor: Cursor, target: Option<Vec2>, position: Vec2) {
        let next = cursor.step + 1;
        if next < self.script(cursor.kind).steps.len() {
            self.enter_step(Cursor { step: next, elapsed: 0.0, ..cursor });
        } else {
            self.start_repetition(cursor.kind, cursor.rep + 1, target, position);
        }
    }

    fn finish(&mut self, kind: PatternKind) {
        debug!("boss pattern finished: {}", kind.name());
        self.phase = Phase::Cooldown { remaining: self.cooldown };
    }

    fn halt(&mut self) {
        self.phase = Phase::Halted;
        self.command = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: Option<Vec2> = Some(Vec2::new(10.0, 0.0));

    fn engine() -> AttackPatternEngine {
        AttackPatternEngine::new(&PatternTuning::default())
    }

    #[test]
    fn test_stage_selects_pattern() {
        for (stage, kind) in [
            (Stage::High, PatternKind::SlowHomingRams),
            (Stage::Mid, PatternKind::ZigZagRams),
            (Stage::Low, PatternKind::BarrageRams),
        ] {
            let mut e = engine();
            e.frame_tick(0.0, stage, true, TARGET, Vec2::ZERO);
            assert_eq!(e.current_pattern(), Some(kind));
        }
    }

    #[test]
    fn test_homing_stops_then_winds_up() {
        let mut e = engine();
        e.frame_tick(0.0, Stage::High, true, TARGET, Vec2::ZERO);
        assert_eq!(e.current_step(), Some((0, StepKind::Windup)));

        // the opening stop is delivered on the next physics step
        assert_eq!(e.physics_tick(0.02, true, TARGET, Vec2::ZERO), Some(Vec2::ZERO));
        assert_eq!(e.physics_tick(0.02, true, TARGET, Vec2::ZERO), None);
    }

    #[test]
    fn test_homing_dash_uses_sampled_direction() {
        let mut e = engine();
        e.frame_tick(0.0, Stage::High, true, TARGET, Vec2::ZERO);
        e.frame_tick(0.5, Stage::High, true, TARGET, Vec2::ZERO);
        assert_eq!(e.current_step(), Some((0, StepKind::Dash)));

        // target moved after sampling; the dash keeps the old heading
        let moved = Some(Vec2::new(0.0, 10.0));
        let v = e.physics_tick(0.02, true, moved, Vec2::ZERO).unwrap();
        assert!((v - Vec2::new(20.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_barrage_scales_windup_dash_and_speed() {
        let mut e = engine();
        e.frame_tick(0.0, Stage::Low, true, TARGET, Vec2::ZERO);
        assert!((e.current_step_duration().unwrap() - 0.18).abs() < 1e-6);

        e.frame_tick(0.2, Stage::Low, true, TARGET, Vec2::ZERO);
        assert_eq!(e.current_step(), Some((0, StepKind::Dash)));
        assert!((e.current_step_duration().unwrap() - 0.4).abs() < 1e-6);

        let v = e.physics_tick(0.02, true, TARGET, Vec2::ZERO).unwrap();
        assert!((v.length() - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_barrage_resamples_each_rep() {
        let mut e = engine();
        e.frame_tick(0.0, Stage::Low, true, TARGET, Vec2::ZERO);
        e.frame_tick(0.2, Stage::Low, true, TARGET, Vec2::ZERO);
        for _ in 0..25 {
            e.physics_tick(0.02, true, TARGET, Vec2::ZERO);
        }
        assert_eq!(e.current_step(), Some((0, StepKind::Recover)));

        let above = Some(Vec2::new(0.0, 5.0));
        e.frame_tick(0.25, Stage::Low, true, above, Vec2::ZERO);
        assert_eq!(e.current_step(), Some((1, StepKind::Windup)));
        assert_eq!(e.direction(), Some(Vec2::Y));
    }

    #[test]
    fn test_zigzag_wave_makes_four_full_cycles() {
        let mut e = engine();
        e.frame_tick(0.0, Stage::Mid, true, TARGET, Vec2::ZERO);
        assert_eq!(e.current_step(), Some((0, StepKind::Dash)));

        // heading is +X, so the lateral offset is the y component
        let mut lateral = Vec::new();
        while e.current_step() == Some((0, StepKind::Dash)) {
            let v = e.physics_tick(0.02, true, TARGET, Vec2::ZERO).unwrap();
            assert!((v.x - 20.0).abs() < 1e-4);
            lateral.push(v.y);
        }

        let falling_crossings = lateral.windows(2).filter(|w| w[0] > 0.0 && w[1] < 0.0).count();
        assert_eq!(falling_crossings, 4);
        let peak = lateral.iter().cloned().fold(f32::MIN, f32::max);
        assert!(peak > 2.4 && peak <= 2.5 + 1e-4);
    }

    #[test]
    fn test_missing_target_skips_body_but_keeps_cooldown() {
        let mut e = engine();
        e.frame_tick(0.0, Stage::Low, true, None, Vec2::ZERO);

        assert!(!e.is_performing());
        assert_eq!(e.cooldown_remaining(), Some(1.0));
        assert_eq!(e.physics_tick(0.02, true, None, Vec2::ZERO), None);

        e.frame_tick(0.5, Stage::Low, true, None, Vec2::ZERO);
        assert_eq!(e.cooldown_remaining(), Some(0.5));
    }

    #[test]
    fn test_target_lost_mid_pattern_aborts_at_next_rep() {
        let mut e = engine();
        e.frame_tick(0.0, Stage::High, true, TARGET, Vec2::ZERO);
        e.frame_tick(0.5, Stage::High, true, TARGET, Vec2::ZERO);
        for _ in 0..30 {
            e.physics_tick(0.02, true, None, Vec2::ZERO);
        }
        assert_eq!(e.current_step(), Some((0, StepKind::Recover)));

        e.frame_tick(0.5, Stage::High, true, None, Vec2::ZERO);
        assert!(!e.is_performing());
        assert_eq!(e.cooldown_remaining(), Some(1.0));
    }

    #[test]
    fn test_stage_change_mid_pattern_does_not_interrupt() {
        let mut e = engine();
        e.frame_tick(0.0, Stage::High, true, TARGET, Vec2::ZERO);
        e.frame_tick(0.1, Stage::Low, true, TARGET, Vec2::ZERO);
        assert_eq!(e.current_pattern(), Some(PatternKind::SlowHomingRams));
    }

    #[test]
    fn test_death_halts_engine() {
        let mut e = engine();
        e.frame_tick(0.0, Stage::High, true, TARGET, Vec2::ZERO);
        e.frame_tick(0.1, Stage::High, false, TARGET, Vec2::ZERO);

        assert!(e.is_halted());
        assert_eq!(e.physics_tick(0.02, true, TARGET, Vec2::ZERO), None);
        e.frame_tick(5.0, Stage::High, true, TARGET, Vec2::ZERO);
        assert!(e.is_halted());
    }
}
