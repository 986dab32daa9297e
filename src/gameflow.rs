use bevy::time::Virtual;
use bevy::ui::GlobalZIndex;

use crate::damage::{CombatSet, Combatant, Died};
use crate::level::spawn_encounter;
use crate::prelude::*;

#[derive(States, Debug, Hash, PartialEq, Eq, Clone, Copy, Default)]
pub enum GameState {
    #[default]
    InGame,
    Paused,
    Victory,
    GameOver,
}

/// Everything despawned on restart.
#[derive(Component)]
pub struct EncounterRoot;

#[derive(Component)]
struct PauseUI;

#[derive(Component)]
struct EndScreenUI;

pub struct GameFlowPlugin;

impl Plugin for GameFlowPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_systems(OnEnter(GameState::InGame), spawn_encounter)
            .add_systems(OnEnter(GameState::Paused), (spawn_pause_screen, pause_time))
            .add_systems(
                OnExit(GameState::Paused),
                (despawn_ui::<PauseUI>, resume_time),
            )
            .add_systems(OnEnter(GameState::Victory), spawn_end_screen)
            .add_systems(OnEnter(GameState::GameOver), spawn_end_screen)
            .add_systems(
                OnExit(GameState::Victory),
                (despawn_ui::<EndScreenUI>, despawn_encounter),
            )
            .add_systems(
                OnExit(GameState::GameOver),
                (despawn_ui::<EndScreenUI>, despawn_encounter),
            )
            .add_systems(Update, esc_to_pause.run_if(in_state(GameState::InGame)))
            .add_systems(Update, esc_to_resume.run_if(in_state(GameState::Paused)))
            .add_systems(
                Update,
                enter_to_restart
                    .run_if(in_state(GameState::Victory).or(in_state(GameState::GameOver))),
            )
            .add_systems(
                Update,
                end_fight_on_death
                    .in_set(CombatSet::Resolve)
                    .run_if(in_state(GameState::InGame)),
            );
    }
}

fn screen_root(commands: &mut Commands) -> Entity {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(12.0),
                ..default()
            },
            GlobalZIndex(1000),
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.45)),
        ))
        .id()
}

fn screen_text(commands: &mut Commands, text: &str, size: f32, color: Color) -> Entity {
    commands
        .spawn((
            Text::new(text),
            TextFont { font_size: size, ..default() },
            TextColor(color),
        ))
        .id()
}

fn spawn_pause_screen(mut commands: Commands) {
    let root = screen_root(&mut commands);
    commands.entity(root).insert(PauseUI);

    let title = screen_text(&mut commands, "PAUSED", 44.0, Color::WHITE);
    let hint = screen_text(&mut commands, "Esc to resume", 20.0, Color::srgb(0.7, 0.7, 0.7));
    commands.entity(root).add_children(&[title, hint]);
}

pub fn end_title(state: GameState) -> Option<&'static str> {
    match state {
        GameState::Victory => Some("YOU WIN"),
        GameState::GameOver => Some("YOU DIED"),
        _ => None,
    }
}

fn spawn_end_screen(mut commands: Commands, state: Res<State<GameState>>) {
    let Some(title) = end_title(*state.get()) else {
        return;
    };
    let color = match state.get() {
        GameState::Victory => Color::srgb(0.95, 0.85, 0.3),
        _ => Color::srgb(0.9, 0.2, 0.2),
    };

    let root = screen_root(&mut commands);
    commands.entity(root).insert(EndScreenUI);

    let title = screen_text(&mut commands, title, 56.0, color);
    let hint = screen_text(&mut commands, "Press Enter to fight again", 20.0, Color::WHITE);
    commands.entity(root).add_children(&[title, hint]);
}

fn esc_to_pause(keys: Res<ButtonInput<KeyCode>>, mut next: ResMut<NextState<GameState>>) {
    if keys.just_pressed(KeyCode::Escape) {
        next.set(GameState::Paused);
    }
}

fn esc_to_resume(keys: Res<ButtonInput<KeyCode>>, mut next: ResMut<NextState<GameState>>) {
    if keys.just_pressed(KeyCode::Escape) {
        next.set(GameState::InGame);
    }
}

fn enter_to_restart(keys: Res<ButtonInput<KeyCode>>, mut next: ResMut<NextState<GameState>>) {
    if keys.just_pressed(KeyCode::Enter) {
        info!("restarting encounter");
        next.set(GameState::InGame);
    }
}

fn pause_time(mut time: ResMut<Time<Virtual>>) {
    time.pause();
}

fn resume_time(mut time: ResMut<Time<Virtual>>) {
    time.unpause();
}

/// The dead entity leaves the world; its side loses.
fn end_fight_on_death(
    mut commands: Commands,
    mut died: EventReader<Died>,
    mut next: ResMut<NextState<GameState>>,
) {
    for ev in died.read() {
        commands.entity(ev.entity).despawn();
        next.set(match ev.who {
            Combatant::Boss => GameState::Victory,
            Combatant::Player => GameState::GameOver,
        });
    }
}

fn despawn_ui<T: Component>(mut commands: Commands, q: Query<Entity, With<T>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}

pub fn despawn_encounter(mut commands: Commands, q: Query<Entity, With<EncounterRoot>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;

    #[test]
    fn test_end_titles() {
        assert_eq!(end_title(GameState::Victory), Some("YOU WIN"));
        assert_eq!(end_title(GameState::GameOver), Some("YOU DIED"));
        assert_eq!(end_title(GameState::Paused), None);
    }

    #[test]
    fn test_boss_death_wins_the_fight() {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .init_state::<GameState>()
            .add_event::<Died>()
            .add_systems(Update, end_fight_on_death);

        let boss = app.world_mut().spawn(EncounterRoot).id();
        app.world_mut().send_event(Died { entity: boss, who: Combatant::Boss });
        app.update();
        app.update();

        assert!(app.world().get_entity(boss).is_err());
        assert_eq!(
            *app.world().resource::<State<GameState>>().get(),
            GameState::Victory
        );
    }
}
