use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum Action {
    #[actionlike(DualAxis)]
    Move,
    Jump,
    Dash,
    Attack1,
    Attack2,
}

/// Keyboard and gamepad bindings for the player.
pub fn default_input_map() -> InputMap<Action> {
    InputMap::default()
        .with_dual_axis(Action::Move, VirtualDPad::wasd())
        .with_dual_axis(Action::Move, VirtualDPad::arrow_keys())
        .with_dual_axis(Action::Move, GamepadStick::LEFT)
        .with(Action::Jump, KeyCode::Space)
        .with(Action::Jump, GamepadButton::South)
        .with(Action::Dash, KeyCode::ShiftLeft)
        .with(Action::Dash, GamepadButton::RightTrigger)
        .with(Action::Attack1, KeyCode::KeyJ)
        .with(Action::Attack1, GamepadButton::West)
        .with(Action::Attack2, KeyCode::KeyK)
        .with(Action::Attack2, GamepadButton::North)
}
