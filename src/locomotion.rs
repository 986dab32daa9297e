use bevy::math::Vec2;
use bevy::prelude::Component;

use crate::feedback::{AnimatorSink, SoundCue, SoundPlayer};
use crate::tuning::PlayerTuning;

const FACING_DEADZONE: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    fn flipped(self) -> Self {
        match self {
            Facing::Right => Facing::Left,
            Facing::Left => Facing::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    Primary,
    Secondary,
}

impl AttackKind {
    pub fn trigger(self) -> &'static str {
        match self {
            AttackKind::Primary => "Attack1",
            AttackKind::Secondary => "Attack2",
        }
    }
}

/// Ground/air movement state for the player. Frame-rate timers live in
/// `frame_tick`, velocity composition in `physics_step`.
#[derive(Component, Debug, Clone)]
pub struct Locomotion {
    params: PlayerTuning,
    grounded: bool,
    jump_count: u32,
    facing: Facing,
    dashing: bool,
    dash_timer: f32,
    dash_cooldown_timer: f32,
    move_input: Vec2,
}

impl Locomotion {
    pub fn new(params: PlayerTuning) -> Self {
        Self {
            params,
            grounded: false,
            jump_count: 0,
            facing: Facing::Right,
            dashing: false,
            dash_timer: 0.0,
            dash_cooldown_timer: 0.0,
            move_input: Vec2::ZERO,
        }
    }

    pub fn params(&self) -> &PlayerTuning {
        &self.params
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn jump_count(&self) -> u32 {
        self.jump_count
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_dashing(&self) -> bool {
        self.dashing
    }

    pub fn dash_on_cooldown(&self) -> bool {
        self.dash_cooldown_timer > 0.0
    }

    pub fn set_move_input(&mut self, input: Vec2) {
        self.move_input = input;
    }

    pub fn wants_fast_fall(&self) -> bool {
        self.move_input.y <= self.params.fast_fall_threshold
    }

    /// Feeds the ground sensor result. Returns `true` on the landing edge.
    pub fn sense_ground(&mut self, grounded: bool) -> bool {
        let landed = grounded && !self.grounded;
        self.grounded = grounded;
        if landed {
            self.jump_count = 0;
        }
        landed
    }

    /// Dash timers and facing. Returns `true` when facing flipped this frame.
    pub fn frame_tick(&mut self, dt: f32) -> bool {
        if self.dash_cooldown_timer > 0.0 {
            self.dash_cooldown_timer -= dt;
        }

        if self.dashing {
            self.dash_timer -= dt;
            if self.dash_timer <= 0.0 {
                self.dashing = false;
            }
        }

        let x = self.move_input.x;
        let flip = (x > FACING_DEADZONE && self.facing == Facing::Left)
            || (x < -FACING_DEADZONE && self.facing == Facing::Right);
        if flip {
            self.facing = self.facing.flipped();
        }
        flip
    }

    /// Zeroes vertical velocity and applies the jump impulse (unit mass).
    pub fn try_jump(&mut self, velocity: &mut Vec2) -> bool {
        if !(self.grounded || self.jump_count < self.params.max_jumps) {
            return false;
        }
        velocity.y = self.params.jump_force;
        self.jump_count = (self.jump_count + 1).min(self.params.max_jumps);
        true
    }

    /// Rejected, not queued, while the cooldown runs.
    pub fn try_dash(&mut self) -> bool {
        if self.dash_on_cooldown() {
            return false;
        }
        self.dashing = true;
        self.dash_timer = self.params.dash_duration;
        self.dash_cooldown_timer = self.params.dash_cooldown;
        true
    }

    /// An accepted attack cancels the dash but keeps its cooldown.
    pub fn try_attack(&mut self, _kind: AttackKind) -> bool {
        if !self.grounded && !self.params.can_attack_in_air {
            return false;
        }
        self.dashing = false;
        true
    }

    pub fn request_jump(&mut self, velocity: &mut Vec2, anim: &mut impl AnimatorSink) -> bool {
        let accepted = self.try_jump(velocity);
        if accepted {
            anim.trigger("Jump");
        }
        accepted
    }

    pub fn request_dash(&mut self, sound: &mut impl SoundPlayer) -> bool {
        let accepted = self.try_dash();
        if accepted {
            sound.play(SoundCue::Dash);
        }
        accepted
    }

    pub fn request_attack(
        &mut self,
        kind: AttackKind,
        anim: &mut impl AnimatorSink,
        sound: &mut impl SoundPlayer,
    ) -> bool {
        let accepted = self.try_attack(kind);
        if accepted {
            anim.trigger(kind.trigger());
            sound.play(SoundCue::Swing);
        }
        accepted
    }

    pub fn physics_step(&self, mut velocity: Vec2, gravity_y: f32, dt: f32) -> Vec2 {
        if self.dashing {
            velocity.x = self.facing.sign() * self.params.move_speed * self.params.dash_multiplier;
            return velocity;
        }

        velocity.x = self.move_input.x * self.params.move_speed;
        if self.params.fast_fall_enabled
            && !self.grounded
            && velocity.y < 0.0
            && self.wants_fast_fall()
        {
            let extra = gravity_y * (self.params.fast_fall_multiplier - 1.0);
            velocity.y += extra * dt;
        }
        velocity
    }

    pub fn update_animator(&self, velocity: Vec2, anim: &mut impl AnimatorSink) {
        anim.set_float("Speed", velocity.x.abs());
        anim.set_bool("IsGrounded", self.grounded);
        anim.set_float("VerticalVelocity", velocity.y);
        anim.set_bool("IsDashing", self.dashing);
    }
}
