use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use character_core::camera::{FollowCamera, FollowTarget};
use character_core::constants::CAMERA_TARGET_HEIGHT;
use character_core::engine::CharacterSettings;
use character_core::ik::{IkDirector, IkRig};
use character_core::locomotion::character_bundle;
use character_core::physics::{
    character_physics_bundle, environment_physics_bundle, prop_physics_bundle, CHARACTER_HEIGHT, CHARACTER_RADIUS,
};
use character_core::spin::Spinner;
use character_core::CharacterPlugins;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Character Core - Playground".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .add_plugins(CharacterPlugins)
        .add_systems(Startup, setup_scene)
        .run();
}

fn setup_scene(
    mut commands: Commands,
    settings: Res<CharacterSettings>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let config = settings.0;
    let stone = materials.add(Color::srgb(0.55, 0.55, 0.6));
    let ramp_color = materials.add(Color::srgb(0.45, 0.6, 0.45));
    let steep_color = materials.add(Color::srgb(0.65, 0.4, 0.35));
    let prop_color = materials.add(Color::srgb(0.8, 0.7, 0.2));

    let mut block = |commands: &mut Commands, size: Vec3, transform: Transform, material: Handle<StandardMaterial>| {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(size))),
            MeshMaterial3d(material),
            transform,
            environment_physics_bundle(size * 0.5),
        ));
    };

    // Ground
    block(
        &mut commands,
        Vec3::new(80.0, 1.0, 80.0),
        Transform::from_xyz(0.0, -0.5, 0.0),
        stone.clone(),
    );
    // Walkable ramp (20 degrees)
    block(
        &mut commands,
        Vec3::new(6.0, 0.5, 14.0),
        Transform::from_xyz(-10.0, 2.0, -12.0).with_rotation(Quat::from_rotation_x(20f32.to_radians())),
        ramp_color,
    );
    // Too steep to walk (70 degrees)
    block(
        &mut commands,
        Vec3::new(6.0, 0.5, 10.0),
        Transform::from_xyz(10.0, 3.0, -12.0).with_rotation(Quat::from_rotation_x(70f32.to_radians())),
        steep_color,
    );
    // Walls to hang from and cut out
    for (x, z, rotation) in [(0.0, -25.0, 0.0), (-20.0, 0.0, 90.0), (20.0, 0.0, 90.0)] {
        block(
            &mut commands,
            Vec3::new(20.0, 8.0, 1.0),
            Transform::from_xyz(x, 4.0, z).with_rotation(Quat::from_rotation_y(f32::to_radians(rotation))),
            stone.clone(),
        );
    }

    // Spinning platform
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(8.0, 0.5, 2.0))),
        MeshMaterial3d(prop_color),
        Transform::from_xyz(0.0, 1.0, 12.0),
        prop_physics_bundle(Vec3::new(4.0, 0.25, 1.0)),
        Spinner {
            axis: Vec3::Y,
            degrees_per_step: 1.0,
        },
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(8.0, 20.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let camera = commands
        .spawn((
            Camera3d::default(),
            Transform::from_xyz(0.0, CAMERA_TARGET_HEIGHT, 2.0),
            FollowCamera::new(config.camera).with_blend(config.blend),
        ))
        .id();

    let spawn = Vec3::new(0.0, 0.1, 0.0);
    let character = commands
        .spawn((
            character_bundle(config.locomotion, spawn, camera),
            character_physics_bundle(),
            IkDirector::new(config.ik).with_blend(config.blend),
            IkRig::default(),
            Visibility::default(),
        ))
        .with_children(|body| {
            body.spawn((
                Mesh3d(meshes.add(Capsule3d::new(
                    CHARACTER_RADIUS,
                    CHARACTER_HEIGHT - 2.0 * CHARACTER_RADIUS,
                ))),
                MeshMaterial3d(materials.add(Color::srgb(0.2, 0.4, 0.8))),
                Transform::from_xyz(0.0, CHARACTER_HEIGHT * 0.5, 0.0),
            ));
        })
        .id();

    commands.entity(camera).insert(FollowTarget {
        character,
        offset: Vec3::Y * CAMERA_TARGET_HEIGHT,
    });
}
