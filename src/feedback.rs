//! Audio and animation capabilities the combat code calls but does not own.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::damage::{Combatant, Hurt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    BossHurt,
    PlayerHurt,
    Dash,
    Swing,
}

pub trait SoundPlayer {
    fn play(&mut self, cue: SoundCue);
}

pub trait AnimatorSink {
    fn set_bool(&mut self, name: &'static str, value: bool);
    fn set_float(&mut self, name: &'static str, value: f32);
    fn trigger(&mut self, name: &'static str);
}

pub struct NullSound;

impl SoundPlayer for NullSound {
    fn play(&mut self, _cue: SoundCue) {}
}

pub struct NullAnimator;

impl AnimatorSink for NullAnimator {
    fn set_bool(&mut self, _name: &'static str, _value: bool) {}
    fn set_float(&mut self, _name: &'static str, _value: f32) {}
    fn trigger(&mut self, _name: &'static str) {}
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SoundRequested(pub SoundCue);

impl SoundPlayer for EventWriter<'_, SoundRequested> {
    fn play(&mut self, cue: SoundCue) {
        self.write(SoundRequested(cue));
    }
}

/// Animator parameter block read by whatever drives sprites.
#[derive(Component, Debug, Default)]
pub struct AnimatorParams {
    bools: HashMap<&'static str, bool>,
    floats: HashMap<&'static str, f32>,
    triggers: Vec<&'static str>,
}

impl AnimatorParams {
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.bools.get(name).copied()
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }

    pub fn take_triggers(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut self.triggers)
    }
}

impl AnimatorSink for AnimatorParams {
    fn set_bool(&mut self, name: &'static str, value: bool) {
        self.bools.insert(name, value);
    }

    fn set_float(&mut self, name: &'static str, value: f32) {
        self.floats.insert(name, value);
    }

    fn trigger(&mut self, name: &'static str) {
        self.triggers.push(name);
    }
}

#[derive(Component)]
pub struct HurtFlash {
    timer: Timer,
    base: Color,
}

const HURT_TINT: Color = Color::srgb(1.0, 0.2, 0.2);

fn start_hurt_feedback(
    mut commands: Commands,
    mut hurts: EventReader<Hurt>,
    mut sprites: Query<(&mut Sprite, Option<&mut HurtFlash>)>,
    mut sounds: EventWriter<SoundRequested>,
) {
    for hurt in hurts.read() {
        sounds.play(match hurt.who {
            Combatant::Boss => SoundCue::BossHurt,
            Combatant::Player => SoundCue::PlayerHurt,
        });

        let Ok((mut sprite, flash)) = sprites.get_mut(hurt.entity) else {
            continue;
        };
        match flash {
            Some(mut flash) => flash.timer = Timer::from_seconds(hurt.flash_seconds, TimerMode::Once),
            None => {
                commands.entity(hurt.entity).insert(HurtFlash {
                    timer: Timer::from_seconds(hurt.flash_seconds, TimerMode::Once),
                    base: sprite.color,
                });
            }
        }
        sprite.color = HURT_TINT;
    }
}

fn tick_hurt_flash(
    time: Res<Time>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut HurtFlash, &mut Sprite)>,
) {
    for (e, mut flash, mut sprite) in &mut q {
        flash.timer.tick(time.delta());
        if flash.timer.finished() {
            sprite.color = flash.base;
            commands.entity(e).remove::<HurtFlash>();
        }
    }
}

fn log_sound_requests(mut requests: EventReader<SoundRequested>) {
    for SoundRequested(cue) in requests.read() {
        debug!("sfx: {cue:?}");
    }
}

/// Triggers are one-shot: consumed the frame they were raised.
pub fn flush_animator_triggers(mut animators: Query<(Entity, &mut AnimatorParams)>) {
    for (entity, mut anim) in &mut animators {
        if anim.triggers.is_empty() {
            continue;
        }
        for name in anim.take_triggers() {
            debug!("{entity:?} anim trigger: {name}");
        }
    }
}

pub struct FeedbackPlugin;

impl Plugin for FeedbackPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SoundRequested>()
            .add_systems(
                Update,
                (start_hurt_feedback, tick_hurt_flash, log_sound_requests).chain(),
            )
            .add_systems(PostUpdate, flush_animator_triggers);
    }
}
