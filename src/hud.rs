use bevy::ui::GlobalZIndex;

use crate::boss::Boss;
use crate::damage::{Combatant, HealthChanged};
use crate::health::PlayerHealth;
use crate::invincibility::Window;
use crate::prelude::*;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HudStats>()
            .add_systems(Startup, spawn_hud)
            .add_systems(
                Update,
                (
                    sync_stats_on_spawn,
                    track_health_changes,
                    update_player_text,
                    update_boss_bar,
                    update_boss_timer,
                )
                    .chain(),
            );
    }
}

/// Last known health of both sides, fed by `HealthChanged`.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudStats {
    pub player_health: i32,
    pub player_max: i32,
    pub boss_health: i32,
    pub boss_max: i32,
}

impl Default for HudStats {
    fn default() -> Self {
        Self { player_health: 0, player_max: 1, boss_health: 0, boss_max: 1 }
    }
}

impl HudStats {
    pub fn apply(&mut self, ev: &HealthChanged) {
        match ev.who {
            Combatant::Player => {
                self.player_health = ev.health;
                self.player_max = ev.max;
            }
            Combatant::Boss => {
                self.boss_health = ev.health;
                self.boss_max = ev.max;
            }
        }
    }

    pub fn player_label(&self) -> String {
        format!("HP: {}/{}", self.player_health, self.player_max)
    }

    pub fn boss_fill(&self) -> f32 {
        (self.boss_health as f32 / self.boss_max.max(1) as f32).clamp(0.0, 1.0)
    }
}

#[derive(Component, Default)] struct PlayerHealthText;
#[derive(Component, Default)] struct BossHealthFill;
#[derive(Component, Default)] struct BossTimerText;

fn spawn_hud(mut commands: Commands) {
    let root = commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            right: Val::Px(12.0),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(6.0),
            ..default()
        },
        GlobalZIndex(1),
        BackgroundColor(Color::NONE),
    )).id();

    let hp_text = commands.spawn((
        Text::new("HP: 0/0"),
        TextFont { font_size: 18.0, ..default() },
        TextColor(Color::WHITE),
        PlayerHealthText,
    )).id();

    let boss_row = commands.spawn((
        Node {
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            row_gap: Val::Px(4.0),
            ..default()
        },
        BackgroundColor(Color::NONE),
    )).id();

    let boss_container = commands.spawn((
        Node {
            width: Val::Px(420.0),
            height: Val::Px(18.0),
            border: UiRect::all(Val::Px(2.0)),
            ..default()
        },
        BorderColor(Color::srgb(0.1, 0.1, 0.1)),
        BackgroundColor(Color::srgb(0.05, 0.05, 0.05)),
    )).id();

    let boss_fill = commands.spawn((
        Node { width: Val::Percent(100.0), height: Val::Percent(100.0), ..default() },
        BackgroundColor(Color::srgb(0.6, 0.2, 0.75)),
        BossHealthFill,
    )).id();

    let timer_text = commands.spawn((
        Text::new(""),
        TextFont { font_size: 16.0, ..default() },
        TextColor(Color::WHITE),
        BossTimerText,
    )).id();

    commands.entity(boss_container).add_child(boss_fill);
    commands.entity(boss_row).add_children(&[boss_container, timer_text]);
    commands.entity(root).add_children(&[hp_text, boss_row]);
}

/// A fresh encounter starts at full health without emitting `HealthChanged`.
fn sync_stats_on_spawn(
    mut stats: ResMut<HudStats>,
    players: Query<&PlayerHealth, Added<PlayerHealth>>,
    bosses: Query<&Boss, Added<Boss>>,
) {
    for p in &players {
        stats.player_health = p.current();
        stats.player_max = p.max();
    }
    for b in &bosses {
        stats.boss_health = b.health().current();
        stats.boss_max = b.health().max();
    }
}

fn track_health_changes(mut stats: ResMut<HudStats>, mut events: EventReader<HealthChanged>) {
    for ev in events.read() {
        stats.apply(ev);
    }
}

fn update_player_text(stats: Res<HudStats>, mut q: Query<&mut Text, With<PlayerHealthText>>) {
    if !stats.is_changed() {
        return;
    }
    if let Ok(mut text) = q.single_mut() {
        *text = Text::new(stats.player_label());
    }
}

fn update_boss_bar(stats: Res<HudStats>, mut q: Query<&mut Node, With<BossHealthFill>>) {
    if let Ok(mut node) = q.single_mut() {
        node.width = Val::Percent(stats.boss_fill() * 100.0);
    }
}

fn update_boss_timer(
    bosses: Query<&Boss>,
    mut q: Query<(&mut Text, &mut TextColor), With<BossTimerText>>,
) {
    let Ok((mut text, mut color)) = q.single_mut() else {
        return;
    };
    let Some(boss) = bosses.iter().next().filter(|b| !b.cycle().is_halted()) else {
        *text = Text::new("");
        return;
    };

    *text = Text::new(boss.cycle().label());
    color.0 = match boss.cycle().window() {
        Some(Window::Invincible) => Color::srgb(0.55, 0.75, 1.0),
        _ => Color::srgb(1.0, 0.85, 0.3),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_follow_health_events() {
        let mut stats = HudStats::default();
        let e = Entity::PLACEHOLDER;

        stats.apply(&HealthChanged { entity: e, who: Combatant::Player, health: 3, max: 5 });
        stats.apply(&HealthChanged { entity: e, who: Combatant::Boss, health: 150, max: 300 });

        assert_eq!(stats.player_label(), "HP: 3/5");
        assert!((stats.boss_fill() - 0.5).abs() < 1e-6);
    }
}
