use bevy::prelude::Component;

/// Difficulty tier derived from the remaining health fraction.
/// `High` is the opening tier (index 2), `Low` the last one (index 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Low,
    Mid,
    High,
}

impl Stage {
    pub fn index(self) -> u8 {
        match self {
            Stage::High => 2,
            Stage::Mid => 1,
            Stage::Low => 0,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            2 => Some(Stage::High),
            1 => Some(Stage::Mid),
            0 => Some(Stage::Low),
            _ => None,
        }
    }
}

/// Stage 2 above two thirds, stage 1 above one third, stage 0 otherwise.
/// Integer cross-multiplication keeps the boundaries exact.
pub fn stage_for(current: i32, max: i32) -> Stage {
    let current = current as i64;
    let max = max.max(1) as i64;
    if current * 3 > max * 2 {
        Stage::High
    } else if current * 3 > max {
        Stage::Mid
    } else {
        Stage::Low
    }
}

/// Receives health notifications synchronously, before the mutating call returns.
pub trait HealthListener {
    fn on_health_changed(&mut self, _health: i32) {}
    fn on_stage_changed(&mut self, _stage: Stage) {}
    fn on_invincibility_changed(&mut self, _invincible: bool) {}
    fn on_death(&mut self) {}
}

impl HealthListener for () {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthSignal {
    HealthChanged(i32),
    StageChanged(Stage),
    InvincibilityChanged(bool),
    Died,
}

/// Records signals in delivery order; the ECS bridge forwards them as events.
impl HealthListener for Vec<HealthSignal> {
    fn on_health_changed(&mut self, health: i32) {
        self.push(HealthSignal::HealthChanged(health));
    }

    fn on_stage_changed(&mut self, stage: Stage) {
        self.push(HealthSignal::StageChanged(stage));
    }

    fn on_invincibility_changed(&mut self, invincible: bool) {
        self.push(HealthSignal::InvincibilityChanged(invincible));
    }

    fn on_death(&mut self) {
        self.push(HealthSignal::Died);
    }
}

#[derive(Debug, Clone)]
pub struct BossHealth {
    max: i32,
    current: i32,
    stage: Stage,
    invincible: bool,
}

impl BossHealth {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self {
            max,
            current: max,
            stage: stage_for(max, max),
            invincible: false,
        }
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Returns `true` when the hit landed.
    pub fn take_damage(&mut self, amount: i32, out: &mut impl HealthListener) -> bool {
        if amount <= 0 || self.invincible || self.is_dead() {
            return false;
        }

        self.current = (self.current - amount).max(0);
        out.on_health_changed(self.current);

        let stage = stage_for(self.current, self.max);
        if stage != self.stage {
            self.stage = stage;
            out.on_stage_changed(stage);
        }

        if self.current == 0 {
            out.on_death();
        }
        true
    }

    pub fn set_invincible(&mut self, invincible: bool, out: &mut impl HealthListener) {
        if self.invincible == invincible {
            return;
        }
        debug_assert!(!self.is_dead(), "invincibility toggled on a dead boss");
        self.invincible = invincible;
        out.on_invincibility_changed(invincible);
    }
}

/// Player health with post-hit invincibility frames.
#[derive(Component, Debug, Clone)]
pub struct PlayerHealth {
    max: i32,
    current: i32,
    use_iframes: bool,
    iframe_duration: f32,
    iframe_remaining: f32,
}

impl PlayerHealth {
    pub fn new(max: i32, use_iframes: bool, iframe_duration: f32) -> Self {
        let max = max.max(1);
        Self {
            max,
            current: max,
            use_iframes,
            iframe_duration: iframe_duration.max(0.0),
            iframe_remaining: 0.0,
        }
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    pub fn iframe_duration(&self) -> f32 {
        self.iframe_duration
    }

    pub fn iframes_active(&self) -> bool {
        self.use_iframes && self.iframe_remaining > 0.0
    }

    pub fn take_damage(&mut self, amount: i32, out: &mut impl HealthListener) -> bool {
        if amount <= 0 || self.iframes_active() || self.is_dead() {
            return false;
        }

        self.current = (self.current - amount).max(0);
        out.on_health_changed(self.current);

        if self.current == 0 {
            self.iframe_remaining = 0.0;
            out.on_death();
        } else if self.use_iframes {
            // a fresh hit restarts the window
            self.iframe_remaining = self.iframe_duration;
        }
        true
    }

    pub fn heal(&mut self, amount: i32, out: &mut impl HealthListener) {
        if amount <= 0 || self.is_dead() {
            return;
        }
        self.current = self.current.saturating_add(amount).min(self.max);
        out.on_health_changed(self.current);
    }

    pub fn tick(&mut self, dt: f32) {
        if self.iframe_remaining > 0.0 {
            self.iframe_remaining = (self.iframe_remaining - dt).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_stage_boundaries_are_strict() {
        assert_eq!(stage_for(300, 300), Stage::High);
        assert_eq!(stage_for(201, 300), Stage::High);
        assert_eq!(stage_for(200, 300), Stage::Mid);
        assert_eq!(stage_for(150, 300), Stage::Mid);
        assert_eq!(stage_for(101, 300), Stage::Mid);
        assert_eq!(stage_for(100, 300), Stage::Low);
        assert_eq!(stage_for(1, 300), Stage::Low);
    }

    #[test]
    fn test_boss_damage_emits_in_order() {
        let mut health = BossHealth::new(300);
        let mut log = Vec::new();

        assert!(health.take_damage(100, &mut log));

        assert_eq!(
            log,
            vec![
                HealthSignal::HealthChanged(200),
                HealthSignal::StageChanged(Stage::Mid),
            ]
        );
        assert_eq!(health.stage(), Stage::Mid);
    }

    #[test]
    fn test_boss_death_is_terminal() {
        let mut health = BossHealth::new(10);
        let mut log = Vec::new();

        health.take_damage(50, &mut log);
        assert_eq!(health.current(), 0);
        assert_eq!(log.last(), Some(&HealthSignal::Died));

        log.clear();
        assert!(!health.take_damage(5, &mut log));
        assert!(log.is_empty());
    }

    #[test]
    fn test_invincible_boss_ignores_damage() {
        let mut health = BossHealth::new(300);
        health.set_invincible(true, &mut ());

        let mut log = Vec::new();
        for _ in 0..10 {
            health.take_damage(40, &mut log);
        }
        assert_eq!(health.current(), 300);
        assert!(log.is_empty());
    }

    #[test]
    fn test_set_invincible_is_idempotent() {
        let mut health = BossHealth::new(300);
        let mut log = Vec::new();

        health.set_invincible(true, &mut log);
        health.set_invincible(true, &mut log);
        health.set_invincible(false, &mut log);

        assert_eq!(
            log,
            vec![
                HealthSignal::InvincibilityChanged(true),
                HealthSignal::InvincibilityChanged(false),
            ]
        );
    }

    #[test]
    fn test_player_iframes_block_followup_hits() {
        let mut health = PlayerHealth::new(5, true, 1.0);

        assert!(health.take_damage(1, &mut ()));
        assert!(!health.take_damage(1, &mut ()));
        assert_eq!(health.current(), 4);

        health.tick(0.5);
        assert!(health.iframes_active());
        health.tick(0.5);
        assert!(!health.iframes_active());

        assert!(health.take_damage(1, &mut ()));
        assert_eq!(health.current(), 3);
    }

    #[test]
    fn test_player_without_iframes_takes_every_hit() {
        let mut health = PlayerHealth::new(5, false, 1.0);
        health.take_damage(1, &mut ());
        health.take_damage(1, &mut ());
        assert_eq!(health.current(), 3);
    }

    #[test]
    fn test_heal_clamps_and_ignores_dead() {
        let mut health = PlayerHealth::new(5, false, 0.0);
        let mut log = Vec::new();

        health.take_damage(2, &mut log);
        health.heal(10, &mut log);
        assert_eq!(health.current(), 5);

        health.take_damage(5, &mut log);
        log.clear();
        health.heal(3, &mut log);
        assert_eq!(health.current(), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_huge_heal_saturates_at_max() {
        let mut health = PlayerHealth::new(5, false, 0.0);
        health.take_damage(1, &mut ());

        let mut log = Vec::new();
        health.heal(i32::MAX, &mut log);
        assert_eq!(health.current(), 5);
        assert_eq!(log, vec![HealthSignal::HealthChanged(5)]);
    }

    proptest! {
        #[test]
        fn non_positive_amounts_change_nothing(amount in i32::MIN..=0) {
            let mut boss = BossHealth::new(300);
            let mut player = PlayerHealth::new(5, true, 1.0);
            let mut log = Vec::new();

            boss.take_damage(amount, &mut log);
            player.take_damage(amount, &mut log);
            player.heal(amount, &mut log);

            prop_assert_eq!(boss.current(), 300);
            prop_assert_eq!(boss.stage(), Stage::High);
            prop_assert_eq!(player.current(), 5);
            prop_assert!(log.is_empty());
        }

        #[test]
        fn boss_health_stays_in_range_and_stage_tracks_it(
            hits in proptest::collection::vec(-20i32..150, 0..40)
        ) {
            let mut boss = BossHealth::new(300);
            for amount in hits {
                boss.take_damage(amount, &mut ());
                prop_assert!((0..=boss.max()).contains(&boss.current()));
                prop_assert_eq!(boss.stage(), stage_for(boss.current(), boss.max()));
            }
        }

        #[test]
        fn player_health_stays_in_range(
            ops in proptest::collection::vec((any::<bool>(), any::<i32>()), 0..60)
        ) {
            let mut player = PlayerHealth::new(5, false, 0.0);
            for (heal, amount) in ops {
                if heal {
                    player.heal(amount, &mut ());
                } else {
                    player.take_damage(amount, &mut ());
                }
                prop_assert!((0..=player.max()).contains(&player.current()));
            }
        }
    }
}
