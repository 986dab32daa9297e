//! Ray hitbox for player melee swings.

use std::collections::HashSet;

use avian2d::spatial_query::{RayCaster, RayHits, SpatialQueryFilter};
use bevy::prelude::*;

use crate::damage::{CombatSet, DealDamage};
use crate::gameflow::GameState;
use crate::locomotion::{Facing, Locomotion};

#[derive(Component, Clone)]
pub struct MeleeRaycastSpec {
    pub offset: Vec2,
    pub length: f32,
    pub max_hits: u32,
    pub damage: i32,
    pub filter: SpatialQueryFilter,
    pub solid: bool,
    pub once_per_swing: bool,
}

#[derive(Component, Default)]
pub struct MeleeAttackActive;

/// Remaining swing time; the ray lives until it runs out.
#[derive(Component, Deref, DerefMut)]
pub struct SwingTimer(pub Timer);

#[derive(Component)]
struct AttackRay;

#[derive(Component, Default)]
struct AlreadyHit(HashSet<Entity>);

pub struct RaycastMeleePlugin;

impl Plugin for RaycastMeleePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                spawn_ray_on_attack_start,
                keep_ray_facing_correctly,
                emit_hits_from_rays,
            )
                .chain()
                .in_set(CombatSet::Sense)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            Update,
            (end_finished_swings, despawn_ray_on_attack_end)
                .chain()
                .in_set(CombatSet::Resolve),
        );
    }
}

fn ray_for(spec: &MeleeRaycastSpec, facing: Facing) -> (Vec2, Dir2) {
    match facing {
        Facing::Right => (spec.offset, Dir2::X),
        Facing::Left => (Vec2::new(-spec.offset.x, spec.offset.y), Dir2::NEG_X),
    }
}

fn spawn_ray_on_attack_start(
    mut commands: Commands,
    added: Query<(Entity, &MeleeRaycastSpec, &Locomotion), Added<MeleeAttackActive>>,
) {
    for (attacker, spec, loco) in &added {
        commands.entity(attacker).insert(AlreadyHit::default());

        let (origin, direction) = ray_for(spec, loco.facing());
        commands.entity(attacker).with_children(|c| {
            c.spawn((
                AttackRay,
                Transform::default(),
                RayCaster::new(origin, direction)
                    .with_max_distance(spec.length)
                    .with_max_hits(spec.max_hits)
                    .with_ignore_self(true)
                    .with_solidness(spec.solid)
                    .with_query_filter(spec.filter.clone()),
            ));
        });
    }
}

fn keep_ray_facing_correctly(
    attackers: Query<(&MeleeRaycastSpec, &Locomotion, &Children), With<MeleeAttackActive>>,
    mut rays: Query<&mut RayCaster, With<AttackRay>>,
) {
    for (spec, loco, kids) in &attackers {
        let (origin, direction) = ray_for(spec, loco.facing());
        for &child in kids {
            if let Ok(mut rc) = rays.get_mut(child) {
                rc.origin = origin;
                rc.direction = direction;
            }
        }
    }
}

fn emit_hits_from_rays(
    mut writer: EventWriter<DealDamage>,
    rays: Query<(&ChildOf, &RayHits), With<AttackRay>>,
    specs: Query<&MeleeRaycastSpec, With<MeleeAttackActive>>,
    mut hit_sets: Query<&mut AlreadyHit>,
) {
    for (child_of, ray_hits) in &rays {
        let attacker = child_of.parent();
        let Ok(spec) = specs.get(attacker) else {
            continue;
        };

        for hit in ray_hits.iter_sorted() {
            let target = hit.entity;

            if spec.once_per_swing {
                if let Ok(mut set) = hit_sets.get_mut(attacker) {
                    if !set.0.insert(target) {
                        continue;
                    }
                }
            }

            writer.write(DealDamage { target, amount: spec.damage });
        }
    }
}

fn end_finished_swings(
    time: Res<Time>,
    mut commands: Commands,
    mut swings: Query<(Entity, &mut SwingTimer)>,
) {
    for (attacker, mut timer) in &mut swings {
        timer.tick(time.delta());
        if timer.finished() {
            commands
                .entity(attacker)
                .remove::<(MeleeAttackActive, SwingTimer, AlreadyHit)>();
        }
    }
}

fn despawn_ray_on_attack_end(
    mut commands: Commands,
    mut removed: RemovedComponents<MeleeAttackActive>,
    children: Query<&Children>,
    rays: Query<Entity, With<AttackRay>>,
) {
    for attacker in removed.read() {
        if let Ok(kids) = children.get(attacker) {
            for &child in kids {
                if rays.contains(child) {
                    commands.entity(child).despawn();
                }
            }
        }
    }
}
