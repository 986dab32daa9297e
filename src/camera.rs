use bevy::render::camera::ScalingMode;

use crate::prelude::*;
use crate::tuning::Tuning;

#[derive(Component)]
pub struct MainCamera;

/// World-space rectangle the main camera currently shows.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl ViewBounds {
    /// Keeps a box of `half_size` fully on screen, `padding` in from the edges.
    /// If the view is too small the box is pinned to the max corner.
    pub fn clamp(&self, position: Vec2, half_size: Vec2, padding: f32) -> Vec2 {
        let inset = half_size + Vec2::splat(padding);
        let min = self.center - self.half_extents + inset;
        let max = self.center + self.half_extents - inset;
        Vec2::new(
            position.x.max(min.x).min(max.x),
            position.y.max(min.y).min(max.y),
        )
    }
}

pub fn spawn_main_camera(
    mut commands: Commands,
    tuning: Res<Tuning>,
    existing: Query<(), With<MainCamera>>,
) {
    if !existing.is_empty() {
        return;
    }
    let mut projection = OrthographicProjection::default_2d();
    projection.scaling_mode = ScalingMode::FixedVertical {
        viewport_height: tuning.arena.view_height,
    };
    commands.spawn((MainCamera, Camera2d, Projection::Orthographic(projection)));
}

pub fn publish_view_bounds(
    mut commands: Commands,
    cameras: Query<(&GlobalTransform, &Projection), With<MainCamera>>,
) {
    let Ok((gt, projection)) = cameras.single() else {
        return;
    };
    let Projection::Orthographic(ortho) = projection else {
        return;
    };
    commands.insert_resource(ViewBounds {
        center: gt.translation().truncate() + ortho.area.center(),
        half_extents: ortho.area.half_size(),
    });
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_main_camera)
            .add_systems(Update, publish_view_bounds);
    }
}
