use avian2d::{math::*, prelude::*};
use bevy::prelude::*;

use crate::tuning::Tuning;

#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum GameLayer {
    #[default]
    Default,
    Ground,
    Player,
    Boss,
}

pub fn ground_filter() -> SpatialQueryFilter {
    SpatialQueryFilter::from_mask(GameLayer::Ground)
}

fn apply_arena_gravity(tuning: Res<Tuning>, mut gravity: ResMut<Gravity>) {
    gravity.0 = Vector::NEG_Y * tuning.arena.gravity as Scalar;
}

/// Avian with the arena's gravity.
pub struct ArenaPhysicsPlugin;

impl Plugin for ArenaPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PhysicsPlugins::default())
            .add_systems(Startup, apply_arena_gravity);
    }
}
