//! Character locomotion: walking, running, jumping, wall-hanging and the
//! wall-jump cooldown.
//!
//! [`LocomotionController`] holds the decision logic and is usable without
//! an ECS. [`LocomotionPlugin`] wires it to rapier bodies:
//! - `apply_landing_events`: host animation events enter/leave the landing lockout
//! - `drive_locomotion`: sense, step, write forces/damping/gravity/rotation
//! - `draw_wall_probe`: yellow gizmo along the forward wall probe

pub mod config;
pub mod controller;
pub mod state;

use bevy::color::palettes::css::YELLOW;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub use config::LocomotionConfig;
pub use controller::{
    jump_velocity, AnimatorParams, AnimatorValue, BodyCommands, BodySnapshot, LocomotionController, LocomotionEvent,
    LocomotionFrame, LocomotionInput, LocomotionOutput, LocomotionProbes, LocomotionSensors,
    LocomotionView, ObservedLocomotion,
};
pub use state::{Footing, MovementMode, MovementState, WallJumpCooldown};

use crate::engine::FrameSet;
use crate::physics::RapierProbe;

pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<LandingEvent>()
            .add_event::<CharacterEvent>()
            .init_resource::<ProbeGizmos>()
            .add_systems(
                Update,
                (apply_landing_events, drive_locomotion, draw_wall_probe)
                    .chain()
                    .in_set(FrameSet::Locomotion),
            );
    }
}

/// Entities a character works with besides its own body.
#[derive(Component, Debug, Clone, Copy)]
pub struct CharacterLinks {
    /// Camera whose yaw the character turns toward and whose forward aims wall jumps
    pub camera: Entity,
}

/// Landing animation boundaries, sent by whatever plays the animations.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingEvent {
    Started(Entity),
    Finished(Entity),
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterEvent {
    pub entity: Entity,
    pub kind: LocomotionEvent,
}

/// Toggles the wall-probe gizmo.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ProbeGizmos {
    pub enabled: bool,
}

impl Default for ProbeGizmos {
    fn default() -> Self {
        Self {
            enabled: cfg!(debug_assertions),
        }
    }
}

fn apply_landing_events(mut events: EventReader<LandingEvent>, mut controllers: Query<&mut LocomotionController>) {
    for event in events.read() {
        match *event {
            LandingEvent::Started(entity) => {
                if let Ok(mut controller) = controllers.get_mut(entity) {
                    controller.begin_landing();
                }
            }
            LandingEvent::Finished(entity) => {
                if let Ok(mut controller) = controllers.get_mut(entity) {
                    controller.end_landing();
                }
            }
        }
    }
}

type CharacterBody<'a> = (
    Entity,
    &'a mut LocomotionController,
    &'a LocomotionInput,
    Option<&'a CharacterLinks>,
    &'a mut Transform,
    &'a mut Velocity,
    &'a mut ExternalForce,
    &'a mut ExternalImpulse,
    &'a mut Damping,
    &'a mut GravityScale,
    &'a mut AnimatorParams,
);

fn drive_locomotion(
    time: Res<Time>,
    rapier: ReadDefaultRapierContext,
    cameras: Query<&GlobalTransform, With<Camera>>,
    mut characters: Query<CharacterBody>,
    mut events: EventWriter<CharacterEvent>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }
    let context = rapier.single();

    for (
        entity,
        mut controller,
        input,
        links,
        mut transform,
        mut velocity,
        mut force,
        mut impulse,
        mut damping,
        mut gravity,
        mut animator,
    ) in &mut characters
    {
        let camera_rotation = links
            .and_then(|links| cameras.get(links.camera).ok())
            .map(|camera| camera.compute_transform().rotation)
            .unwrap_or(transform.rotation);

        let frame = LocomotionFrame {
            input: *input,
            body: BodySnapshot {
                position: transform.translation,
                rotation: transform.rotation,
                velocity: velocity.linvel,
            },
            camera_rotation,
            dt,
        };
        let world = RapierProbe::excluding(context, entity);
        let output = controller.update(&world, &frame);
        let commands = output.body;

        force.force = commands.force;
        impulse.impulse += commands.impulse;
        damping.linear_damping = commands.drag;
        gravity.0 = if commands.gravity_enabled { 1.0 } else { 0.0 };
        if let Some(linvel) = commands.velocity {
            velocity.linvel = linvel;
        }
        if let Some(position) = commands.teleport {
            transform.translation = position;
            velocity.angvel = Vec3::ZERO;
            force.force = Vec3::ZERO;
            impulse.impulse = Vec3::ZERO;
        }
        if transform.rotation != commands.rotation {
            transform.rotation = commands.rotation;
        }
        *animator = output.animator;

        for kind in output.events {
            events.send(CharacterEvent { entity, kind });
        }
    }
}

fn draw_wall_probe(
    settings: Res<ProbeGizmos>,
    mut gizmos: Gizmos,
    characters: Query<(&LocomotionController, &Transform)>,
) {
    if !settings.enabled {
        return;
    }
    for (controller, transform) in &characters {
        let body = BodySnapshot {
            position: transform.translation,
            rotation: transform.rotation,
            velocity: Vec3::ZERO,
        };
        let probe = controller.wall_probe(&body);
        gizmos.ray(probe.origin, probe.direction * probe.max_distance, YELLOW);
    }
}

/// Components a controllable character needs besides its physics bundle.
pub fn character_bundle(config: LocomotionConfig, spawn_position: Vec3, camera: Entity) -> impl Bundle {
    (
        LocomotionController::new(config, spawn_position),
        LocomotionInput::default(),
        AnimatorParams::default(),
        CharacterLinks { camera },
        Transform::from_translation(spawn_position),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_event_carries_entity() {
        let entity = Entity::from_raw(7);
        let event = CharacterEvent {
            entity,
            kind: LocomotionEvent::WallJumped,
        };
        assert_eq!(event.entity, entity);
        assert_eq!(event.kind, LocomotionEvent::WallJumped);
    }

    #[test]
    fn test_landing_events_toggle_controller() {
        let mut app = App::new();
        app.add_event::<LandingEvent>()
            .add_systems(Update, apply_landing_events);
        let entity = app
            .world_mut()
            .spawn(LocomotionController::new(LocomotionConfig::default(), Vec3::ZERO))
            .id();

        app.world_mut().send_event(LandingEvent::Started(entity));
        app.update();
        let landing = app.world().get::<LocomotionController>(entity).map(|c| c.state().is_landing);
        assert_eq!(landing, Some(true));

        app.world_mut().send_event(LandingEvent::Finished(entity));
        app.update();
        let landing = app.world().get::<LocomotionController>(entity).map(|c| c.state().is_landing);
        assert_eq!(landing, Some(false));
    }
}
