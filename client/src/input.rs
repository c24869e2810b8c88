//! Input routing.
//!
//! Pointer-level actions (the camera drag) go through leafwing's action
//! state. Keyboard keys are forwarded to the shared input aggregator as
//! lowercase textual identifiers, which re-derives the movement intent from
//! the full held-key set whenever it is read.

use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;
use bevy::window::WindowFocused;
use leafwing_input_manager::prelude::*;
use shared::{HeldKey, InputAggregator};

use crate::hud::DebugReadout;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    Drag,
}

/// The shared held-key aggregator, owned as a resource.
#[derive(Resource, Default)]
pub struct PlayerInput(pub InputAggregator);

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Drag, MouseButton::Left);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());

    app.init_resource::<PlayerInput>();
    app.add_systems(Update, (route_keyboard, release_all_on_focus_loss));
}

/// The textual identifier the aggregator understands for a logical key.
fn key_name(key: &Key) -> Option<&str> {
    match key {
        Key::Character(text) => Some(text.as_str()),
        Key::Space => Some("space"),
        Key::Shift => Some("shift"),
        Key::ArrowUp => Some("arrowup"),
        Key::ArrowDown => Some("arrowdown"),
        Key::ArrowLeft => Some("arrowleft"),
        Key::ArrowRight => Some("arrowright"),
        Key::F3 => Some("f3"),
        _ => None,
    }
}

fn route_keyboard(
    mut input: ResMut<PlayerInput>,
    mut debug: ResMut<DebugReadout>,
    mut messages: MessageReader<KeyboardInput>,
) {
    for message in messages.read() {
        let Some(name) = key_name(&message.logical_key) else {
            continue;
        };
        match message.state {
            ButtonState::Pressed => {
                let recognized = input.0.press(name);
                if recognized == Some(HeldKey::F3) && !message.repeat {
                    debug.0 = !debug.0;
                }
            }
            ButtonState::Released => {
                input.0.release(name);
            }
        }
    }
}

/// Key-up messages never arrive for keys released while the window is
/// unfocused, so drop the whole held set on focus loss.
fn release_all_on_focus_loss(
    mut input: ResMut<PlayerInput>,
    mut messages: MessageReader<WindowFocused>,
) {
    for message in messages.read() {
        if !message.focused {
            input.0.clear();
        }
    }
}
