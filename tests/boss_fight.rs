use bevy::prelude::*;

use bossfight::boss::{Boss, Drive};
use bossfight::damage::{DamagePlugin, DealDamage, Died, HealthChanged};
use bossfight::health::{HealthSignal, Stage};
use bossfight::invincibility::Window;
use bossfight::pattern::PatternKind;
use bossfight::tuning::{BossTuning, Tuning};

const FRAME: f32 = 0.25;
const PHYSICS: f32 = 0.02;

fn boss() -> Boss {
    Boss::new(&BossTuning::default())
}

#[test]
fn invincibility_cadence_at_stage_two() {
    let mut boss = boss();
    let target = Some(Vec2::new(5.0, 0.0));

    for _ in 0..32 {
        boss.frame_tick(FRAME, target, Vec2::ZERO, &mut ());
    }
    assert_eq!(boss.cycle().window(), Some(Window::Vulnerable));
    assert!(!boss.health().is_invincible());

    for _ in 0..16 {
        boss.frame_tick(FRAME, target, Vec2::ZERO, &mut ());
    }
    assert_eq!(boss.cycle().window(), Some(Window::Invincible));
    assert!(boss.health().is_invincible());
}

#[test]
fn damage_only_lands_in_vulnerable_windows() {
    let mut boss = boss();
    let target = Some(Vec2::new(5.0, 0.0));
    boss.frame_tick(FRAME, target, Vec2::ZERO, &mut ());

    assert!(!boss.take_damage(20, &mut ()));
    for _ in 0..31 {
        boss.frame_tick(FRAME, target, Vec2::ZERO, &mut ());
    }

    let mut log = Vec::new();
    assert!(boss.take_damage(120, &mut log));
    assert_eq!(
        log,
        vec![
            HealthSignal::HealthChanged(180),
            HealthSignal::StageChanged(Stage::Mid),
        ]
    );

    // the running vulnerable window keeps its stage-two length
    assert_eq!(boss.cycle().total_duration(), 4.0);
}

#[test]
fn death_stops_every_process() {
    let mut boss = boss();
    let target = Some(Vec2::new(5.0, 0.0));
    for _ in 0..32 {
        boss.frame_tick(FRAME, target, Vec2::ZERO, &mut ());
    }

    let mut log = Vec::new();
    assert!(boss.take_damage(1000, &mut log));
    assert_eq!(log.last(), Some(&HealthSignal::Died));

    log.clear();
    for _ in 0..200 {
        boss.frame_tick(FRAME, target, Vec2::ZERO, &mut log);
        assert_eq!(boss.physics_tick(PHYSICS, target, Vec2::ZERO), Drive::Hold);
    }
    assert!(log.is_empty());
    assert!(boss.cycle().is_halted());
    assert!(boss.patterns().is_halted());
    assert_eq!(boss.health().current(), 0);
}

#[test]
fn chase_never_runs_while_a_pattern_is_active() {
    let mut boss = boss();
    let target = Some(Vec2::new(12.0, 3.0));
    let mut position = Vec2::ZERO;
    let mut saw_pattern = false;
    let mut saw_chase = false;

    // 60 Hz frames, 50 Hz physics, 20 s
    let mut physics_clock = 0.0;
    for _ in 0..1200 {
        let frame = 1.0 / 60.0;
        boss.frame_tick(frame, target, position, &mut ());

        physics_clock += frame;
        while physics_clock >= PHYSICS {
            physics_clock -= PHYSICS;
            let performing = boss.is_performing_pattern();
            match boss.physics_tick(PHYSICS, target, position) {
                Drive::Chase(v) => {
                    assert!(!performing, "chase assigned during a pattern");
                    saw_chase = true;
                    position += v * PHYSICS;
                }
                Drive::Pattern(v) => {
                    saw_pattern = true;
                    position += v * PHYSICS;
                }
                Drive::Hold => {}
            }
        }
    }
    assert!(saw_pattern);
    assert!(saw_chase);
}

#[test]
fn barrage_without_target_is_only_a_cooldown() {
    let mut boss = boss();
    assert!(boss.take_damage(250, &mut ()));
    assert_eq!(boss.health().stage(), Stage::Low);

    boss.frame_tick(0.0, None, Vec2::ZERO, &mut ());
    assert!(!boss.is_performing_pattern());
    assert_eq!(boss.patterns().cooldown_remaining(), Some(1.0));
    assert_eq!(boss.physics_tick(PHYSICS, None, Vec2::ZERO), Drive::Hold);

    boss.frame_tick(0.5, None, Vec2::ZERO, &mut ());
    assert_eq!(boss.patterns().cooldown_remaining(), Some(0.5));

    // the player shows up: the next selection is the barrage
    boss.frame_tick(0.5, Some(Vec2::new(3.0, 0.0)), Vec2::ZERO, &mut ());
    assert_eq!(boss.patterns().current_pattern(), Some(PatternKind::BarrageRams));
}

#[test]
fn stage_two_chase_covers_seven_units_per_second() {
    let mut boss = boss();
    let start = Vec2::ZERO;
    let target = Some(Vec2::new(100.0, 0.0));
    let mut position = start;

    for _ in 0..100 {
        match boss.physics_tick(PHYSICS, target, position) {
            Drive::Chase(v) => position += v * PHYSICS,
            other => panic!("expected chase, got {other:?}"),
        }
    }
    assert!(((position - start).length() - 14.0).abs() < 1e-3);
    assert!(position.y.abs() < 1e-4);
}

#[test]
fn headless_app_routes_damage_to_the_boss() {
    let mut app = App::new();
    app.add_plugins(DamagePlugin).insert_resource(Tuning::default());

    let boss = app.world_mut().spawn(boss()).id();

    app.world_mut().send_event(DealDamage { target: boss, amount: 0 });
    app.world_mut().send_event(DealDamage { target: boss, amount: 300 });
    app.update();

    let changes: Vec<i32> = app
        .world()
        .resource::<Events<HealthChanged>>()
        .iter_current_update_events()
        .map(|ev| ev.health)
        .collect();
    assert_eq!(changes, vec![0]);
    assert_eq!(app.world().resource::<Events<Died>>().len(), 1);
}
