//! Keyboard and mouse to character intent.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;

use crate::engine::FrameSet;
use crate::locomotion::LocomotionInput;

/// Raw mouse counts to look-axis units.
pub const MOUSE_AXIS_SCALE: f32 = 0.1;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<KeyBindings>()
            .init_resource::<LookInput>()
            .add_systems(
                Update,
                (read_movement_keys, read_look, exit_on_escape).in_set(FrameSet::Input),
            );
    }
}

/// Look axes for this frame: x = right, y = up.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct LookInput {
    pub delta: Vec2,
}

#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub forward: Vec<KeyCode>,
    pub back: Vec<KeyCode>,
    pub left: Vec<KeyCode>,
    pub right: Vec<KeyCode>,
    pub run: KeyCode,
    pub jump: KeyCode,
    pub exit: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: vec![KeyCode::KeyW, KeyCode::ArrowUp],
            back: vec![KeyCode::KeyS, KeyCode::ArrowDown],
            left: vec![KeyCode::KeyA, KeyCode::ArrowLeft],
            right: vec![KeyCode::KeyD, KeyCode::ArrowRight],
            run: KeyCode::ShiftLeft,
            jump: KeyCode::Space,
            exit: KeyCode::Escape,
        }
    }
}

fn axis(keys: &ButtonInput<KeyCode>, positive: &[KeyCode], negative: &[KeyCode]) -> f32 {
    let mut value = 0.0;
    if keys.any_pressed(positive.iter().copied()) {
        value += 1.0;
    }
    if keys.any_pressed(negative.iter().copied()) {
        value -= 1.0;
    }
    value
}

/// Intent from the current key state.
pub fn locomotion_input(keys: &ButtonInput<KeyCode>, bindings: &KeyBindings) -> LocomotionInput {
    LocomotionInput {
        direction: Vec2::new(
            axis(keys, &bindings.right, &bindings.left),
            axis(keys, &bindings.forward, &bindings.back),
        ),
        run: keys.pressed(bindings.run),
        jump: keys.just_pressed(bindings.jump),
    }
}

fn read_movement_keys(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    mut characters: Query<&mut LocomotionInput>,
) {
    let input = locomotion_input(&keys, &bindings);
    for mut target in &mut characters {
        *target = input;
    }
}

fn read_look(mut motion: EventReader<MouseMotion>, mut look: ResMut<LookInput>) {
    let mut delta = Vec2::ZERO;
    for event in motion.read() {
        delta += event.delta;
    }
    // Screen y grows downward; look y is positive up
    look.delta = Vec2::new(delta.x, -delta.y) * MOUSE_AXIS_SCALE;
}

fn exit_on_escape(keys: Res<ButtonInput<KeyCode>>, bindings: Res<KeyBindings>, mut exit: EventWriter<AppExit>) {
    if keys.just_pressed(bindings.exit) {
        info!("exit requested");
        exit.send(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposing_keys_cancel() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyA);
        keys.press(KeyCode::KeyD);
        keys.press(KeyCode::KeyW);
        let input = locomotion_input(&keys, &KeyBindings::default());
        assert_eq!(input.direction, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_run_held_and_jump_edge() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::ShiftLeft);
        keys.press(KeyCode::Space);
        let input = locomotion_input(&keys, &KeyBindings::default());
        assert!(input.run);
        assert!(input.jump);

        keys.clear();
        let held = locomotion_input(&keys, &KeyBindings::default());
        assert!(held.run);
        assert!(!held.jump);
    }

    #[test]
    fn test_escape_requests_exit() {
        let mut app = App::new();
        app.add_event::<AppExit>()
            .init_resource::<KeyBindings>()
            .insert_resource(ButtonInput::<KeyCode>::default())
            .add_systems(Update, exit_on_escape);
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        app.update();

        let events = app.world().resource::<Events<AppExit>>();
        let mut reader = events.get_cursor();
        assert_eq!(reader.read(events).next(), Some(&AppExit::Success));
    }
}
