use bevy::math::{Quat, Vec2, Vec3};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::ffi::CString;

use character_core::bridge::*;
use character_core::camera::{CameraConfig, CameraFrame, FollowCamera};
use character_core::ik::{IkConfig, IkDirector, IkFrame, IkRig};
use character_core::locomotion::{BodySnapshot, LocomotionConfig, LocomotionController, LocomotionFrame, LocomotionInput};
use character_core::sensing::analytic::AnalyticWorld;

const DT: f32 = 1.0 / 60.0;

fn arena() -> AnalyticWorld {
    AnalyticWorld::new()
        .with_ground(0.0)
        .with_box(Vec3::new(-5.0, 0.0, -3.0), Vec3::new(5.0, 10.0, -1.5))
        .with_box(Vec3::new(1.0, 0.0, -10.0), Vec3::new(2.0, 6.0, 10.0))
}

fn walking_frame(position: Vec3) -> LocomotionFrame {
    LocomotionFrame {
        input: LocomotionInput {
            direction: Vec2::new(0.3, 1.0),
            run: true,
            jump: false,
        },
        body: BodySnapshot {
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::new(1.0, 0.0, -6.0),
        },
        camera_rotation: Quat::from_rotation_y(0.2),
        dt: DT,
    }
}

fn bench_locomotion(c: &mut Criterion) {
    let world = arena();

    c.bench_function("locomotion_update_grounded", |b| {
        let mut controller = LocomotionController::new(LocomotionConfig::default(), Vec3::ZERO);
        let frame = walking_frame(Vec3::new(0.0, 0.05, 0.0));
        b.iter(|| controller.update(black_box(&world), black_box(&frame)))
    });

    c.bench_function("locomotion_update_hanging", |b| {
        let mut controller = LocomotionController::new(LocomotionConfig::default(), Vec3::ZERO);
        let frame = walking_frame(Vec3::new(0.0, 3.0, 0.0));
        b.iter(|| controller.update(black_box(&world), black_box(&frame)))
    });
}

fn bench_ik(c: &mut Criterion) {
    let world = arena();
    let locomotion = LocomotionController::new(LocomotionConfig::default(), Vec3::ZERO);
    let frame = IkFrame {
        body: BodySnapshot::at_rest(Vec3::new(0.0, 0.05, 0.0)),
        camera_position: Vec3::new(0.0, 1.6, 2.0),
        camera_forward: Vec3::NEG_Z,
        left_bone: Vec3::new(-0.4, 1.4, 0.0),
        right_bone: Vec3::new(0.4, 1.4, 0.0),
        dt: DT,
    };

    c.bench_function("ik_update_wall_touch", |b| {
        let mut director = IkDirector::new(IkConfig::default());
        let mut rig = IkRig::default();
        b.iter(|| director.update(&mut rig, black_box(&world), black_box(&frame), &locomotion))
    });
}

fn bench_camera(c: &mut Criterion) {
    let locomotion = LocomotionController::new(LocomotionConfig::default(), Vec3::ZERO);
    let frame = CameraFrame {
        target: Vec3::new(0.0, 1.6, 0.0),
        target_velocity: Vec3::new(0.0, 0.0, -8.0),
        dt: DT,
    };

    c.bench_function("camera_step", |b| {
        let mut camera = FollowCamera::new(CameraConfig::default());
        b.iter(|| {
            camera.look(black_box(Vec2::new(0.5, -0.2)));
            camera.step(black_box(&frame), &locomotion)
        })
    });
}

fn bench_bridge(c: &mut Criterion) {
    let config = CString::new("{}").unwrap();
    let handle = character_create(config.as_ptr(), 0.0, 0.0, 0.0);
    let frame = CString::new(
        serde_json::json!({
            "input": {"direction": [0.0, 1.0], "run": true},
            "body": {"position": [0.0, 0.0, 0.0], "velocity": [0.0, 0.0, -5.0]},
            "dt": DT,
            "look": [0.3, 0.0],
            "ground": {"point": [0.0, 0.0, 0.0], "normal": [0.0, 1.0, 0.0]},
            "right_arm": {"point": [1.0, 1.4, 0.0], "normal": [-1.0, 0.0, 0.0], "distance": 1.0},
            "projection": {"fov_y_degrees": 60.0, "viewport_width": 1920, "viewport_height": 1080}
        })
        .to_string(),
    )
    .unwrap();
    let body = CString::new(r#"{"position": [0.0, 0.0, 0.0]}"#).unwrap();

    c.bench_function("bridge_character_probes", |b| {
        b.iter(|| {
            let ptr = character_probes(black_box(handle), black_box(body.as_ptr()));
            free_string(ptr);
        })
    });

    c.bench_function("bridge_character_step", |b| {
        b.iter(|| {
            let ptr = character_step(black_box(handle), black_box(frame.as_ptr()));
            free_string(ptr);
        })
    });

    character_destroy(handle);
}

criterion_group!(benches, bench_locomotion, bench_ik, bench_camera, bench_bridge);
criterion_main!(benches);
