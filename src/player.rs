use avian2d::prelude::*;
use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

use crate::controls::{Action, default_input_map};
use crate::damage::CombatSet;
use crate::feedback::{AnimatorParams, SoundRequested};
use crate::gameflow::{EncounterRoot, GameState};
use crate::health::PlayerHealth;
use crate::locomotion::{AttackKind, Facing, Locomotion};
use crate::physics::{GameLayer, ground_filter};
use crate::raycasts::{MeleeAttackActive, MeleeRaycastSpec, SwingTimer};
use crate::tuning::PlayerTuning;

#[derive(Component)]
pub struct Player;

pub fn spawn_player(commands: &mut Commands, tuning: &PlayerTuning) -> Entity {
    let size = Vec2::from(tuning.size);
    let hitbox = MeleeRaycastSpec {
        offset: Vec2::new(size.x * 0.5, 0.0),
        length: tuning.hit_range,
        max_hits: 4,
        damage: tuning.hit_damage,
        filter: SpatialQueryFilter::from_mask(GameLayer::Boss),
        solid: true,
        once_per_swing: true,
    };

    commands
        .spawn((
            Name::new("Player"),
            Player,
            EncounterRoot,
            Locomotion::new(*tuning),
            PlayerHealth::new(tuning.max_health, tuning.iframes_enabled, tuning.iframe_duration),
            AnimatorParams::default(),
            default_input_map(),
            hitbox,
            Sprite::from_color(Color::srgb(0.85, 0.85, 0.9), size),
            Transform::from_xyz(tuning.spawn[0], tuning.spawn[1], 0.0),
            (
                RigidBody::Dynamic,
                LockedAxes::ROTATION_LOCKED,
                Restitution::ZERO.with_combine_rule(CoefficientCombine::Min),
                Friction::ZERO.with_combine_rule(CoefficientCombine::Min),
                Collider::capsule(size.x * 0.5, (size.y - size.x).max(0.0)),
                CollisionLayers::new(GameLayer::Player, [GameLayer::Ground, GameLayer::Boss]),
                CollisionEventsEnabled,
            ),
        ))
        .id()
}

fn sense_ground(spatial: SpatialQuery, mut players: Query<(&GlobalTransform, &mut Locomotion), With<Player>>) {
    let filter = ground_filter();
    for (gt, mut loco) in &mut players {
        let params = loco.params();
        let sensor = Collider::circle(params.ground_sensor_radius);
        let origin = gt.translation().truncate() + Vec2::from(params.ground_sensor_offset);

        let grounded = !spatial
            .shape_intersections(&sensor, origin, 0.0, &filter)
            .is_empty();
        loco.sense_ground(grounded);
    }
}

fn read_player_input(
    mut commands: Commands,
    mut players: Query<
        (
            Entity,
            &ActionState<Action>,
            &mut Locomotion,
            &mut LinearVelocity,
            &mut AnimatorParams,
            Has<MeleeAttackActive>,
        ),
        With<Player>,
    >,
    mut sounds: EventWriter<SoundRequested>,
) {
    for (entity, actions, mut loco, mut velocity, mut anim, swinging) in &mut players {
        loco.set_move_input(actions.axis_pair(&Action::Move));

        if actions.just_pressed(&Action::Jump) {
            loco.request_jump(&mut velocity.0, &mut *anim);
        }

        if actions.just_pressed(&Action::Dash) && !loco.request_dash(&mut sounds) {
            debug!("dash rejected: cooling down");
        }

        let attack = if actions.just_pressed(&Action::Attack1) {
            Some(AttackKind::Primary)
        } else if actions.just_pressed(&Action::Attack2) {
            Some(AttackKind::Secondary)
        } else {
            None
        };
        // one hitbox per swing; presses during a swing are dropped
        if let Some(kind) = attack.filter(|_| !swinging) {
            if loco.request_attack(kind, &mut *anim, &mut sounds) {
                let window = loco.params().attack_window;
                commands.entity(entity).insert((
                    MeleeAttackActive,
                    SwingTimer(Timer::from_seconds(window, TimerMode::Once)),
                ));
            }
        }
    }
}

fn tick_player_frame(
    time: Res<Time>,
    mut players: Query<
        (
            &mut Locomotion,
            &mut PlayerHealth,
            &LinearVelocity,
            &mut Sprite,
            &mut AnimatorParams,
        ),
        With<Player>,
    >,
) {
    let dt = time.delta_secs();
    for (mut loco, mut health, velocity, mut sprite, mut anim) in &mut players {
        if loco.frame_tick(dt) {
            sprite.flip_x = loco.facing() == Facing::Left;
        }
        health.tick(dt);
        loco.update_animator(velocity.0, &mut *anim);
    }
}

fn drive_player_velocity(
    time: Res<Time>,
    gravity: Res<Gravity>,
    mut players: Query<(&Locomotion, &mut LinearVelocity), With<Player>>,
) {
    let dt = time.delta_secs();
    for (loco, mut velocity) in &mut players {
        velocity.0 = loco.physics_step(velocity.0, gravity.0.y, dt);
    }
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                (sense_ground, read_player_input)
                    .chain()
                    .in_set(CombatSet::Sense),
                tick_player_frame.in_set(CombatSet::Think),
            )
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedUpdate,
            drive_player_velocity.run_if(in_state(GameState::InGame)),
        );
    }
}
