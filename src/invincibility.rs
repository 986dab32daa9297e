use serde::Deserialize;

use crate::health::{BossHealth, HealthListener, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WindowDurations {
    pub invincible: f32,
    pub vulnerable: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct StageWindows {
    pub high: WindowDurations,
    pub mid: WindowDurations,
    pub low: WindowDurations,
}

impl Default for StageWindows {
    fn default() -> Self {
        Self {
            high: WindowDurations { invincible: 8.0, vulnerable: 4.0 },
            mid: WindowDurations { invincible: 15.0, vulnerable: 3.0 },
            low: WindowDurations { invincible: 20.0, vulnerable: 1.5 },
        }
    }
}

impl StageWindows {
    pub fn for_stage(&self, stage: Stage) -> WindowDurations {
        match stage {
            Stage::High => self.high,
            Stage::Mid => self.mid,
            Stage::Low => self.low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Invincible,
    Vulnerable,
}

impl Window {
    fn other(self) -> Self {
        match self {
            Window::Invincible => Window::Vulnerable,
            Window::Vulnerable => Window::Invincible,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleState {
    Idle,
    Running(Window),
    Halted,
}

/// Oscillates the boss between invincible and vulnerable windows.
///
/// Durations are looked up for the stage current when a window opens; a stage
/// change mid-window only affects the next window.
#[derive(Debug, Clone)]
pub struct InvincibilityCycle {
    windows: StageWindows,
    state: CycleState,
    time_remaining: f32,
    total_duration: f32,
}

impl InvincibilityCycle {
    pub fn new(windows: StageWindows) -> Self {
        Self {
            windows,
            state: CycleState::Idle,
            time_remaining: 0.0,
            total_duration: 0.0,
        }
    }

    pub fn start(&mut self, health: &mut BossHealth, out: &mut impl HealthListener) {
        if self.state != CycleState::Idle {
            return;
        }
        if health.is_dead() {
            self.halt();
            return;
        }
        self.enter(Window::Invincible, health, out);
    }

    pub fn tick(&mut self, dt: f32, health: &mut BossHealth, out: &mut impl HealthListener) {
        let CycleState::Running(window) = self.state else {
            return;
        };
        if health.is_dead() {
            self.halt();
            return;
        }

        self.time_remaining -= dt;
        if self.time_remaining <= 0.0 {
            self.enter(window.other(), health, out);
        }
    }

    fn enter(&mut self, window: Window, health: &mut BossHealth, out: &mut impl HealthListener) {
        let durations = self.windows.for_stage(health.stage());
        let duration = match window {
            Window::Invincible => durations.invincible,
            Window::Vulnerable => durations.vulnerable,
        };

        health.set_invincible(window == Window::Invincible, out);
        self.state = CycleState::Running(window);
        self.total_duration = duration;
        self.time_remaining = duration;
    }

    fn halt(&mut self) {
        self.state = CycleState::Halted;
        self.time_remaining = 0.0;
    }

    pub fn window(&self) -> Option<Window> {
        match self.state {
            CycleState::Running(window) => Some(window),
            _ => None,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.state == CycleState::Halted
    }

    pub fn time_remaining(&self) -> f32 {
        self.time_remaining.max(0.0)
    }

    pub fn total_duration(&self) -> f32 {
        self.total_duration
    }

    pub fn ratio(&self) -> f32 {
        if self.total_duration <= 0.0 {
            return 0.0;
        }
        (self.time_remaining() / self.total_duration).clamp(0.0, 1.0)
    }

    /// Timer caption, e.g. `Invincible: 3.2s`.
    pub fn label(&self) -> String {
        let name = match self.window() {
            Some(Window::Invincible) => "Invincible",
            _ => "Vulnerable",
        };
        format!("{name}: {:.1}s", self.time_remaining())
    }
}
