//! The boss: health, invincibility cycle, attack patterns and chase glued into
//! one component, plus the systems that drive it.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::transform::TransformSystem;

use crate::camera::ViewBounds;
use crate::chase::ChaseMovement;
use crate::damage::{CombatSet, Combatant, DealDamage, HealthEvents};
use crate::feedback::{AnimatorParams, AnimatorSink};
use crate::gameflow::{EncounterRoot, GameState};
use crate::health::{BossHealth, HealthListener};
use crate::invincibility::InvincibilityCycle;
use crate::pattern::AttackPatternEngine;
use crate::physics::GameLayer;
use crate::player::Player;
use crate::tuning::{BossTuning, Tuning};

/// What should happen to the boss velocity on a physics step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drive {
    Pattern(Vec2),
    Chase(Vec2),
    Hold,
}

#[derive(Component, Debug, Clone)]
pub struct Boss {
    health: BossHealth,
    cycle: InvincibilityCycle,
    patterns: AttackPatternEngine,
    chase: ChaseMovement,
    started: bool,
    contact_damage: i32,
    hurt_flash: f32,
}

impl Boss {
    pub fn new(tuning: &BossTuning) -> Self {
        Self {
            health: BossHealth::new(tuning.max_health),
            cycle: InvincibilityCycle::new(tuning.windows),
            patterns: AttackPatternEngine::new(&tuning.patterns),
            chase: ChaseMovement::new(tuning.chase_speeds),
            started: false,
            contact_damage: tuning.contact_damage,
            hurt_flash: tuning.hurt_flash,
        }
    }

    pub fn health(&self) -> &BossHealth {
        &self.health
    }

    pub fn cycle(&self) -> &InvincibilityCycle {
        &self.cycle
    }

    pub fn patterns(&self) -> &AttackPatternEngine {
        &self.patterns
    }

    pub fn hurt_flash(&self) -> f32 {
        self.hurt_flash
    }

    pub fn is_performing_pattern(&self) -> bool {
        self.patterns.is_performing()
    }

    /// Opens the first invincible window. Later calls do nothing.
    pub fn start(&mut self, out: &mut impl HealthListener) {
        if self.started {
            return;
        }
        self.started = true;
        self.cycle.start(&mut self.health, out);
    }

    pub fn take_damage(&mut self, amount: i32, out: &mut impl HealthListener) -> bool {
        self.health.take_damage(amount, out)
    }

    pub fn frame_tick(
        &mut self,
        dt: f32,
        target: Option<Vec2>,
        position: Vec2,
        out: &mut impl HealthListener,
    ) {
        self.start(out);
        self.cycle.tick(dt, &mut self.health, out);
        let alive = !self.health.is_dead();
        self.patterns
            .frame_tick(dt, self.health.stage(), alive, target, position);
    }

    /// A running pattern owns the velocity; chase only fills the gaps.
    pub fn physics_tick(&mut self, dt: f32, target: Option<Vec2>, position: Vec2) -> Drive {
        let alive = !self.health.is_dead();
        if let Some(velocity) = self.patterns.physics_tick(dt, alive, target, position) {
            return Drive::Pattern(velocity);
        }
        if !alive || self.patterns.is_performing() {
            return Drive::Hold;
        }
        match self.chase.velocity(position, target, self.health.stage()) {
            Some(velocity) => Drive::Chase(velocity),
            None => Drive::Hold,
        }
    }

    /// Touching the boss only hurts while it is invincible.
    pub fn contact_damage(&self) -> Option<i32> {
        (self.health.is_invincible() && !self.health.is_dead()).then_some(self.contact_damage)
    }
}

pub fn spawn_boss(commands: &mut Commands, tuning: &BossTuning) -> Entity {
    let size = Vec2::from(tuning.size);
    commands
        .spawn((
            Name::new("Boss"),
            Boss::new(tuning),
            AnimatorParams::default(),
            EncounterRoot,
            Sprite::from_color(Color::srgb(0.55, 0.2, 0.7), size),
            Transform::from_xyz(tuning.spawn[0], tuning.spawn[1], 0.0),
            (
                RigidBody::Kinematic,
                Collider::rectangle(size.x, size.y),
                Sensor,
                CollisionEventsEnabled,
                CollisionLayers::new(GameLayer::Boss, [GameLayer::Player]),
                LinearVelocity::default(),
            ),
        ))
        .id()
}

fn player_position(players: &Query<&GlobalTransform, With<Player>>) -> Option<Vec2> {
    players.iter().next().map(|gt| gt.translation().truncate())
}

fn tick_boss_frame(
    time: Res<Time>,
    mut bosses: Query<(Entity, &mut Boss, &GlobalTransform, &mut AnimatorParams)>,
    players: Query<&GlobalTransform, With<Player>>,
    mut events: HealthEvents,
) {
    let target = player_position(&players);
    let dt = time.delta_secs();

    for (entity, mut boss, gt, mut anim) in &mut bosses {
        let mut signals = Vec::new();
        boss.frame_tick(dt, target, gt.translation().truncate(), &mut signals);

        anim.set_bool("IsInvincible", boss.health().is_invincible());
        anim.set_bool("IsAttacking", boss.is_performing_pattern());
        events.forward(entity, Combatant::Boss, boss.health().max(), &signals);
    }
}

fn drive_boss_velocity(
    time: Res<Time>,
    mut bosses: Query<(&mut Boss, &GlobalTransform, &mut LinearVelocity)>,
    players: Query<&GlobalTransform, With<Player>>,
) {
    let target = player_position(&players);
    let dt = time.delta_secs();

    for (mut boss, gt, mut velocity) in &mut bosses {
        match boss.physics_tick(dt, target, gt.translation().truncate()) {
            Drive::Pattern(v) | Drive::Chase(v) => velocity.0 = v,
            Drive::Hold => {}
        }
    }
}

fn boss_contact_damage(
    mut started: EventReader<CollisionStarted>,
    bosses: Query<&Boss>,
    players: Query<(), With<Player>>,
    mut damage: EventWriter<DealDamage>,
) {
    for CollisionStarted(a, b) in started.read() {
        let (boss, other) = if bosses.contains(*a) {
            (*a, *b)
        } else if bosses.contains(*b) {
            (*b, *a)
        } else {
            continue;
        };
        if !players.contains(other) {
            continue;
        }
        let Some(amount) = bosses.get(boss).ok().and_then(Boss::contact_damage) else {
            continue;
        };
        damage.write(DealDamage { target: other, amount });
    }
}

fn clamp_boss_to_view(
    view: Option<Res<ViewBounds>>,
    tuning: Res<Tuning>,
    mut bosses: Query<&mut Transform, With<Boss>>,
) {
    let Some(view) = view else {
        return;
    };
    let half_size = Vec2::from(tuning.boss.size) * 0.5;
    for mut tf in &mut bosses {
        let clamped = view.clamp(tf.translation.truncate(), half_size, tuning.boss.screen_padding);
        tf.translation.x = clamped.x;
        tf.translation.y = clamped.y;
    }
}

pub struct BossPlugin;

impl Plugin for BossPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                boss_contact_damage.in_set(CombatSet::Sense),
                tick_boss_frame.in_set(CombatSet::Think),
            )
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedUpdate,
            drive_boss_velocity.run_if(in_state(GameState::InGame)),
        )
        // ungated: a boss mid-dash keeps drifting after the fight ends
        .add_systems(
            PostUpdate,
            clamp_boss_to_view.before(TransformSystem::TransformPropagate),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{HealthSignal, Stage};

    const TARGET: Option<Vec2> = Some(Vec2::new(10.0, 0.0));

    fn boss() -> Boss {
        Boss::new(&BossTuning::default())
    }

    #[test]
    fn test_first_frame_opens_invincible_window() {
        let mut boss = boss();
        let mut log = Vec::new();
        boss.frame_tick(0.016, TARGET, Vec2::ZERO, &mut log);

        assert_eq!(log, vec![HealthSignal::InvincibilityChanged(true)]);
        assert!(boss.health().is_invincible());
        assert!(boss.is_performing_pattern());
    }

    #[test]
    fn test_chase_only_when_no_pattern_runs() {
        let mut boss = boss();
        assert_eq!(
            boss.physics_tick(0.02, TARGET, Vec2::ZERO),
            Drive::Chase(Vec2::new(7.0, 0.0))
        );

        boss.frame_tick(0.0, TARGET, Vec2::ZERO, &mut ());
        // opening stop of the homing pattern, then hold through the windup
        assert_eq!(boss.physics_tick(0.02, TARGET, Vec2::ZERO), Drive::Pattern(Vec2::ZERO));
        assert_eq!(boss.physics_tick(0.02, TARGET, Vec2::ZERO), Drive::Hold);
    }

    #[test]
    fn test_no_target_holds_velocity() {
        let mut boss = boss();
        assert_eq!(boss.physics_tick(0.02, None, Vec2::ZERO), Drive::Hold);
    }

    #[test]
    fn test_contact_damage_only_while_invincible() {
        let mut boss = boss();
        assert_eq!(boss.contact_damage(), None);

        boss.start(&mut ());
        assert_eq!(boss.contact_damage(), Some(1));
    }

    #[test]
    fn test_dead_boss_is_inert() {
        let mut boss = boss();
        assert!(boss.take_damage(300, &mut ()));
        assert_eq!(boss.health().stage(), Stage::Low);

        boss.frame_tick(0.5, TARGET, Vec2::ZERO, &mut ());
        assert!(boss.cycle().is_halted());
        assert!(boss.patterns().is_halted());
        assert_eq!(boss.physics_tick(0.02, TARGET, Vec2::ZERO), Drive::Hold);
        assert_eq!(boss.contact_damage(), None);
    }

    #[test]
    fn test_view_clamp_runs_after_game_over() {
        use bevy::state::app::StatesPlugin;

        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .insert_state(GameState::GameOver)
            .insert_resource(Tuning::default())
            .insert_resource(ViewBounds { center: Vec2::ZERO, half_extents: Vec2::new(16.0, 9.0) })
            .add_systems(PostUpdate, clamp_boss_to_view);

        let boss = app
            .world_mut()
            .spawn((Boss::new(&BossTuning::default()), Transform::from_xyz(100.0, 0.0, 0.0)))
            .id();
        app.update();

        let x = app.world().get::<Transform>(boss).unwrap().translation.x;
        assert!((x - 14.65).abs() < 1e-4, "boss escaped the view: x = {x}");
    }
}
