use crate::boss::spawn_boss;
use crate::gameflow::EncounterRoot;
use crate::physics::GameLayer;
use crate::player::spawn_player;
use crate::prelude::*;
use crate::tuning::{ArenaTuning, Tuning};

const FLOOR_THICKNESS: f32 = 1.0;
const WALL_THICKNESS: f32 = 1.0;
const WALL_HEIGHT: f32 = 40.0;

fn spawn_block(commands: &mut Commands, name: &'static str, center: Vec2, size: Vec2) {
    commands.spawn((
        Name::new(name),
        EncounterRoot,
        Sprite::from_color(Color::srgb(0.18, 0.18, 0.24), size),
        Transform::from_translation(center.extend(-1.0)),
        RigidBody::Static,
        Friction::ZERO,
        Collider::rectangle(size.x, size.y),
        CollisionLayers::new(GameLayer::Ground, [GameLayer::Player]),
    ));
}

pub fn spawn_arena(commands: &mut Commands, arena: &ArenaTuning) {
    let floor_top = arena.floor_y;
    let half_width = arena.width * 0.5;

    spawn_block(
        commands,
        "Floor",
        Vec2::new(0.0, floor_top - FLOOR_THICKNESS * 0.5),
        Vec2::new(arena.width + 2.0 * WALL_THICKNESS, FLOOR_THICKNESS),
    );
    for (name, side) in [("Left wall", -1.0), ("Right wall", 1.0)] {
        spawn_block(
            commands,
            name,
            Vec2::new(
                side * (half_width + WALL_THICKNESS * 0.5),
                floor_top + WALL_HEIGHT * 0.5,
            ),
            Vec2::new(WALL_THICKNESS, WALL_HEIGHT),
        );
    }
}

/// Arena, player and boss. Skipped if an encounter is already live (resume).
pub fn spawn_encounter(
    mut commands: Commands,
    tuning: Res<Tuning>,
    existing: Query<(), With<EncounterRoot>>,
) {
    if !existing.is_empty() {
        return;
    }
    spawn_arena(&mut commands, &tuning.arena);
    spawn_player(&mut commands, &tuning.player);
    spawn_boss(&mut commands, &tuning.boss);
    info!("encounter spawned");
}
