//! Damage requests and the health notification bridge.
//!
//! Collision and hitbox code only writes `DealDamage`; whether it lands is
//! decided by the target's health model.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::boss::Boss;
use crate::health::{HealthSignal, PlayerHealth, Stage};

/// Per-frame ordering: damage lands before anything reads the stage.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum CombatSet {
    Sense,
    ApplyDamage,
    Think,
    Resolve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combatant {
    Boss,
    Player,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct DealDamage {
    pub target: Entity,
    pub amount: i32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthChanged {
    pub entity: Entity,
    pub who: Combatant,
    pub health: i32,
    pub max: i32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageChanged {
    pub entity: Entity,
    pub stage: Stage,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvincibilityChanged {
    pub entity: Entity,
    pub invincible: bool,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Died {
    pub entity: Entity,
    pub who: Combatant,
}

/// A hit that actually landed.
#[derive(Event, Debug, Clone, Copy)]
pub struct Hurt {
    pub entity: Entity,
    pub who: Combatant,
    pub flash_seconds: f32,
}

#[derive(SystemParam)]
pub struct HealthEvents<'w> {
    health: EventWriter<'w, HealthChanged>,
    stage: EventWriter<'w, StageChanged>,
    invincibility: EventWriter<'w, InvincibilityChanged>,
    died: EventWriter<'w, Died>,
}

impl HealthEvents<'_> {
    pub fn forward(&mut self, entity: Entity, who: Combatant, max: i32, signals: &[HealthSignal]) {
        for signal in signals {
            match *signal {
                HealthSignal::HealthChanged(health) => {
                    self.health.write(HealthChanged { entity, who, health, max });
                }
                HealthSignal::StageChanged(stage) => {
                    info!("{who:?} entered stage {}", stage.index());
                    self.stage.write(StageChanged { entity, stage });
                }
                HealthSignal::InvincibilityChanged(invincible) => {
                    debug!("{who:?} invincible: {invincible}");
                    self.invincibility.write(InvincibilityChanged { entity, invincible });
                }
                HealthSignal::Died => {
                    info!("{who:?} died");
                    self.died.write(Died { entity, who });
                }
            }
        }
    }
}

pub fn apply_damage(
    mut requests: EventReader<DealDamage>,
    mut bosses: Query<&mut Boss>,
    mut players: Query<&mut PlayerHealth>,
    mut events: HealthEvents,
    mut hurts: EventWriter<Hurt>,
) {
    for request in requests.read() {
        let mut signals = Vec::new();

        if let Ok(mut boss) = bosses.get_mut(request.target) {
            if boss.take_damage(request.amount, &mut signals) {
                hurts.write(Hurt {
                    entity: request.target,
                    who: Combatant::Boss,
                    flash_seconds: boss.hurt_flash(),
                });
            }
            events.forward(request.target, Combatant::Boss, boss.health().max(), &signals);
        } else if let Ok(mut player) = players.get_mut(request.target) {
            if player.take_damage(request.amount, &mut signals) && !player.is_dead() {
                hurts.write(Hurt {
                    entity: request.target,
                    who: Combatant::Player,
                    flash_seconds: player.iframe_duration(),
                });
            }
            events.forward(request.target, Combatant::Player, player.max(), &signals);
        }
    }
}

pub struct DamagePlugin;

impl Plugin for DamagePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DealDamage>()
            .add_event::<HealthChanged>()
            .add_event::<StageChanged>()
            .add_event::<InvincibilityChanged>()
            .add_event::<Died>()
            .add_event::<Hurt>()
            .configure_sets(
                Update,
                (
                    CombatSet::Sense,
                    CombatSet::ApplyDamage,
                    CombatSet::Think,
                    CombatSet::Resolve,
                )
                    .chain(),
            )
            .add_systems(Update, apply_damage.in_set(CombatSet::ApplyDamage));
    }
}
