use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

use bossfight::boss::BossPlugin;
use bossfight::camera::CameraPlugin;
use bossfight::controls::Action;
use bossfight::damage::DamagePlugin;
use bossfight::feedback::FeedbackPlugin;
use bossfight::gameflow::GameFlowPlugin;
use bossfight::hud::HudPlugin;
use bossfight::physics::ArenaPhysicsPlugin;
use bossfight::player::PlayerPlugin;
use bossfight::raycasts::RaycastMeleePlugin;
use bossfight::tuning::TuningPlugin;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: String::from("bossfight"),
                        ..Default::default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
            InputManagerPlugin::<Action>::default(),
            ArenaPhysicsPlugin,
        ))
        .add_plugins(TuningPlugin::new("assets/tuning.json"))
        .add_plugins((
            GameFlowPlugin,
            DamagePlugin,
            FeedbackPlugin,
            CameraPlugin,
            PlayerPlugin,
            RaycastMeleePlugin,
            BossPlugin,
            HudPlugin,
        ))
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.1)))
        .run();
}
