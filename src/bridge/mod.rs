//! FFI Bridge Layer: character core <-> foreign host engines
//!
//! C-ABI functions for hosts that own their own physics and animation.
//! Each frame the host asks which rays to cast (`character_probes`), casts
//! them, and hands the hits back with the body state (`character_step`).
//! The answer carries body commands, animator values, IK targets and the
//! camera pose, computed in that order.
//!
//! Data crosses the boundary as JSON. Vectors are `[x, y, z]`, rotations
//! `[x, y, z, w]`, in a right-handed Y-up frame with -Z forward.
//! All returned strings are heap-allocated; free them with `free_string`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::camera::{cutout_coordinate, occlusion_probe, CameraFrame, CameraPose, FollowCamera, MatrixProjection};
use crate::constants::CAMERA_TARGET_HEIGHT;
use crate::engine::CharacterConfig;
use crate::ik::{ArmSensors, HandEffector, IkDirector, IkFrame, IkRig};
use crate::locomotion::{
    AnimatorParams, AnimatorValue, BodySnapshot, LocomotionController, LocomotionEvent, LocomotionFrame, LocomotionInput,
    LocomotionSensors, MovementMode,
};
use crate::sensing::{Probe, RayHit};

// ========================
// Data transfer types
// ========================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BodyDto {
    pub position: [f32; 3],
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    #[serde(default)]
    pub velocity: [f32; 3],
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl From<BodyDto> for BodySnapshot {
    fn from(dto: BodyDto) -> Self {
        Self {
            position: Vec3::from_array(dto.position),
            rotation: quat_from_array(dto.rotation),
            velocity: Vec3::from_array(dto.velocity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeDto {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    pub max_distance: f32,
}

impl From<Probe> for ProbeDto {
    fn from(probe: Probe) -> Self {
        Self {
            origin: probe.origin.to_array(),
            direction: probe.direction.to_array(),
            max_distance: probe.max_distance,
        }
    }
}

/// Rays the host must cast before the next `character_step`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProbesResponse {
    pub ground: ProbeDto,
    pub wall: ProbeDto,
    pub left_arm: ProbeDto,
    pub right_arm: ProbeDto,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HitDto {
    pub point: [f32; 3],
    pub normal: [f32; 3],
    #[serde(default)]
    pub distance: f32,
}

impl From<HitDto> for RayHit {
    fn from(dto: HitDto) -> Self {
        Self {
            point: Vec3::from_array(dto.point),
            normal: Vec3::from_array(dto.normal).normalize_or_zero(),
            distance: dto.distance,
            collider: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InputDto {
    #[serde(default)]
    pub direction: [f32; 2],
    #[serde(default)]
    pub run: bool,
    #[serde(default)]
    pub jump: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectionDto {
    pub fov_y_degrees: f32,
    /// Screen size in pixels
    pub viewport_width: u32,
    pub viewport_height: u32,
    #[serde(default = "default_near")]
    pub near: f32,
}

fn default_near() -> f32 {
    0.1
}

fn default_target_offset() -> [f32; 3] {
    [0.0, CAMERA_TARGET_HEIGHT, 0.0]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRequest {
    #[serde(default)]
    pub input: InputDto,
    pub body: BodyDto,
    pub dt: f32,
    /// Look input for this frame: x = right, y = up
    #[serde(default)]
    pub look: [f32; 2],
    #[serde(default)]
    pub ground: Option<HitDto>,
    #[serde(default)]
    pub wall: Option<HitDto>,
    #[serde(default)]
    pub left_arm: Option<HitDto>,
    #[serde(default)]
    pub right_arm: Option<HitDto>,
    #[serde(default)]
    pub left_hand_bone: Option<[f32; 3]>,
    #[serde(default)]
    pub right_hand_bone: Option<[f32; 3]>,
    #[serde(default = "default_target_offset")]
    pub camera_target_offset: [f32; 3],
    /// Needed only for the cutout coordinate
    #[serde(default)]
    pub projection: Option<ProjectionDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BodyCommandsDto {
    pub force: [f32; 3],
    pub impulse: [f32; 3],
    pub drag: f32,
    pub gravity_enabled: bool,
    pub velocity: Option<[f32; 3]>,
    pub teleport: Option<[f32; 3]>,
    pub rotation: [f32; 4],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HandDto {
    pub position: [f32; 3],
    pub position_weight: f32,
    pub rotation: [f32; 4],
    pub rotation_weight: f32,
}

impl From<HandEffector> for HandDto {
    fn from(hand: HandEffector) -> Self {
        Self {
            position: hand.position.to_array(),
            position_weight: hand.position_weight,
            rotation: hand.rotation.to_array(),
            rotation_weight: hand.rotation_weight,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IkDto {
    pub left_hand: HandDto,
    pub right_hand: HandDto,
    pub look_at: [f32; 3],
    pub body_weight: f32,
    pub head_weight: f32,
}

impl From<IkRig> for IkDto {
    fn from(rig: IkRig) -> Self {
        Self {
            left_hand: rig.left_hand.into(),
            right_hand: rig.right_hand.into(),
            look_at: rig.gaze.position.to_array(),
            body_weight: rig.gaze.body_weight,
            head_weight: rig.gaze.head_weight,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CameraDto {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub distance: f32,
    /// Ray the host casts against environment geometry to find occluders
    pub occlusion_probe: ProbeDto,
    pub cutout_position: Option<[f32; 3]>,
    pub cutout_falloff: f32,
    pub cutout_size: f32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StepResponse {
    pub mode: MovementMode,
    pub body: BodyCommandsDto,
    pub animator: AnimatorParams,
    /// Same values keyed by animator parameter name
    pub animator_channels: BTreeMap<String, AnimatorValue>,
    pub events: Vec<LocomotionEvent>,
    pub ik: IkDto,
    pub camera: CameraDto,
}

// ========================
// Sessions
// ========================

struct Session {
    locomotion: LocomotionController,
    ik: IkDirector,
    rig: IkRig,
    camera: FollowCamera,
    camera_pose: Option<CameraPose>,
    config: CharacterConfig,
}

impl Session {
    fn new(config: CharacterConfig, spawn: Vec3) -> Self {
        Self {
            locomotion: LocomotionController::new(config.locomotion, spawn).with_blend(config.blend),
            ik: IkDirector::new(config.ik).with_blend(config.blend),
            rig: IkRig::default(),
            camera: FollowCamera::new(config.camera).with_blend(config.blend),
            camera_pose: None,
            config,
        }
    }

    fn probes(&self, body: &BodySnapshot) -> ProbesResponse {
        let locomotion = self.locomotion.probes(body);
        let arms = self.ik.probes(body);
        ProbesResponse {
            ground: locomotion.ground.into(),
            wall: locomotion.wall.into(),
            left_arm: arms.left.into(),
            right_arm: arms.right.into(),
        }
    }

    fn step(&mut self, request: &StepRequest) -> StepResponse {
        let body = BodySnapshot::from(request.body);
        let dt = request.dt.max(0.0);
        let offset = Vec3::from_array(request.camera_target_offset);

        // Camera from the previous frame steers this frame's locomotion and IK
        let previous = self.camera_pose.unwrap_or(CameraPose {
            position: body.position + offset - body.forward() * self.config.camera.distance,
            rotation: body.rotation,
            distance: self.config.camera.distance,
        });

        let frame = LocomotionFrame {
            input: LocomotionInput {
                direction: Vec2::from_array(request.input.direction),
                run: request.input.run,
                jump: request.input.jump,
            },
            body,
            camera_rotation: previous.rotation,
            dt,
        };
        let sensors = LocomotionSensors {
            ground: request.ground.map(RayHit::from),
            wall: request.wall.map(RayHit::from),
        };
        let output = self.locomotion.step(&frame, &sensors);

        let ik_frame = IkFrame {
            body,
            camera_position: previous.position,
            camera_forward: previous.forward(),
            left_bone: request.left_hand_bone.map(Vec3::from_array).unwrap_or(body.position),
            right_bone: request.right_hand_bone.map(Vec3::from_array).unwrap_or(body.position),
            dt,
        };
        let arms = ArmSensors {
            left: request.left_arm.map(RayHit::from),
            right: request.right_arm.map(RayHit::from),
        };
        self.ik.step(&mut self.rig, &ik_frame, &arms, &self.locomotion);

        self.camera.look(Vec2::from_array(request.look));
        let target = body.position + offset;
        let pose = self.camera.step(
            &CameraFrame {
                target,
                target_velocity: body.velocity,
                dt,
            },
            &self.locomotion,
        );
        self.camera_pose = Some(pose);

        let cutout_position = request.projection.map(|projection| {
            let matrices = MatrixProjection::perspective(
                projection.fov_y_degrees.to_radians(),
                UVec2::new(projection.viewport_width, projection.viewport_height),
                projection.near,
                Mat4::from_rotation_translation(pose.rotation, pose.position),
            );
            cutout_coordinate(&matrices, target).to_array()
        });

        let commands = output.body;
        StepResponse {
            mode: output.mode,
            body: BodyCommandsDto {
                force: commands.force.to_array(),
                impulse: commands.impulse.to_array(),
                drag: commands.drag,
                gravity_enabled: commands.gravity_enabled,
                velocity: commands.velocity.map(|v| v.to_array()),
                teleport: commands.teleport.map(|p| p.to_array()),
                rotation: commands.rotation.to_array(),
            },
            animator: output.animator,
            animator_channels: output
                .animator
                .channels()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            events: output.events,
            ik: self.rig.into(),
            camera: CameraDto {
                position: pose.position.to_array(),
                rotation: pose.rotation.to_array(),
                distance: pose.distance,
                occlusion_probe: occlusion_probe(pose.position, target).into(),
                cutout_position,
                cutout_falloff: self.config.camera.cutout_falloff,
                cutout_size: self.config.camera.cutout_size,
            },
        }
    }
}

static SESSIONS: OnceLock<Mutex<HashMap<u64, Session>>> = OnceLock::new();
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

fn sessions() -> Option<MutexGuard<'static, HashMap<u64, Session>>> {
    SESSIONS.get_or_init(|| Mutex::new(HashMap::new())).lock().ok()
}

// ========================
// Helpers
// ========================

fn json_to_cstring<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn parse_cstr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_owned()) }
}

fn parse_json<T: for<'de> Deserialize<'de>>(ptr: *const c_char) -> Option<T> {
    let json = parse_cstr(ptr)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("rejected bridge payload: {}", e);
            None
        }
    }
}

fn quat_from_array(values: [f32; 4]) -> Quat {
    let rotation = Quat::from_array(values);
    if rotation.length_squared() < 1e-8 || !rotation.is_finite() {
        Quat::IDENTITY
    } else {
        rotation.normalize()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub error: Option<String>,
}

// ========================
// C-ABI: Core
// ========================

/// Version string
#[no_mangle]
pub extern "C" fn get_version() -> *mut c_char {
    CString::new(env!("CARGO_PKG_VERSION")).unwrap_or_default().into_raw()
}

/// Free a string allocated by Rust.
/// ptr must come from a prior call into this library, or be null.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            drop(CString::from_raw(ptr));
        }
    }
}

// ========================
// C-ABI: Configuration
// ========================

/// Default configuration as JSON.
#[no_mangle]
pub extern "C" fn default_config_json() -> *mut c_char {
    json_to_cstring(&CharacterConfig::default())
}

/// Parse and validate a configuration. Null input returns null.
#[no_mangle]
pub extern "C" fn validate_config_json(config_json: *const c_char) -> *mut c_char {
    let Some(json) = parse_cstr(config_json) else {
        return std::ptr::null_mut();
    };
    let result = match CharacterConfig::from_json_str(&json) {
        Ok(_) => ValidationResult {
            valid: true,
            error: None,
        },
        Err(e) => ValidationResult {
            valid: false,
            error: Some(e.to_string()),
        },
    };
    json_to_cstring(&result)
}

// ========================
// C-ABI: Character sessions
// ========================

/// Create a character at the spawn point. Returns 0 on null or invalid config.
#[no_mangle]
pub extern "C" fn character_create(config_json: *const c_char, spawn_x: f32, spawn_y: f32, spawn_z: f32) -> u64 {
    crate::logging::init_tracing_default();
    let Some(json) = parse_cstr(config_json) else {
        return 0;
    };
    let config = match CharacterConfig::from_json_str(&json) {
        Ok(config) => config,
        Err(e) => {
            warn!("character_create rejected config: {}", e);
            return 0;
        }
    };
    let spawn = Vec3::new(spawn_x, spawn_y, spawn_z);
    if !spawn.is_finite() {
        return 0;
    }
    let Some(mut sessions) = sessions() else {
        return 0;
    };
    let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
    sessions.insert(handle, Session::new(config, spawn));
    debug!(handle, "character session created");
    handle
}

/// Rays to cast for the body state given as JSON (`BodyDto`).
#[no_mangle]
pub extern "C" fn character_probes(handle: u64, body_json: *const c_char) -> *mut c_char {
    let Some(body) = parse_json::<BodyDto>(body_json) else {
        return std::ptr::null_mut();
    };
    let Some(sessions) = sessions() else {
        return std::ptr::null_mut();
    };
    match sessions.get(&handle) {
        Some(session) => json_to_cstring(&session.probes(&body.into())),
        None => std::ptr::null_mut(),
    }
}

/// Advance one frame (`StepRequest` in, `StepResponse` out).
#[no_mangle]
pub extern "C" fn character_step(handle: u64, frame_json: *const c_char) -> *mut c_char {
    let Some(request) = parse_json::<StepRequest>(frame_json) else {
        return std::ptr::null_mut();
    };
    if !request.dt.is_finite() {
        return std::ptr::null_mut();
    }
    let Some(mut sessions) = sessions() else {
        return std::ptr::null_mut();
    };
    match sessions.get_mut(&handle) {
        Some(session) => json_to_cstring(&session.step(&request)),
        None => std::ptr::null_mut(),
    }
}

/// Enter (`true`) or leave (`false`) the landing lockout.
#[no_mangle]
pub extern "C" fn character_set_landing(handle: u64, landing: bool) -> bool {
    let Some(mut sessions) = sessions() else {
        return false;
    };
    match sessions.get_mut(&handle) {
        Some(session) => {
            if landing {
                session.locomotion.begin_landing();
            } else {
                session.locomotion.end_landing();
            }
            true
        }
        None => false,
    }
}

#[no_mangle]
pub extern "C" fn character_destroy(handle: u64) -> bool {
    let Some(mut sessions) = sessions() else {
        return false;
    };
    sessions.remove(&handle).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = unsafe { CStr::from_ptr(ptr).to_str().unwrap().to_owned() };
        free_string(ptr);
        s
    }

    fn create_default() -> u64 {
        let config = CString::new("{}").unwrap();
        character_create(config.as_ptr(), 0.0, 0.0, 0.0)
    }

    #[test]
    fn test_version_matches_package() {
        assert_eq!(take_string(get_version()), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_default_config_roundtrips() {
        let json = take_string(default_config_json());
        let parsed = CharacterConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, CharacterConfig::default());
    }

    #[test]
    fn test_validate_reports_error() {
        let bad = CString::new(r#"{"camera": {"pitch_min": 90.0, "pitch_max": 0.0}}"#).unwrap();
        let result: ValidationResult = serde_json::from_str(&take_string(validate_config_json(bad.as_ptr()))).unwrap();
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("camera.pitch_min"));
    }

    #[test]
    fn test_probes_follow_body() {
        let handle = create_default();
        assert_ne!(handle, 0);
        let body = CString::new(r#"{"position": [1.0, 2.0, 3.0]}"#).unwrap();
        let probes: ProbesResponse = serde_json::from_str(&take_string(character_probes(handle, body.as_ptr()))).unwrap();
        assert_eq!(probes.ground.origin, [1.0, 2.0, 3.0]);
        assert_eq!(probes.ground.direction, [0.0, -1.0, 0.0]);
        assert_eq!(probes.wall.origin, [1.0, 4.0, 3.0]);
        assert_eq!(probes.wall.direction, [0.0, 0.0, -1.0]);
        assert_eq!(probes.right_arm.direction, [1.0, 0.0, 0.0]);
        assert!(character_destroy(handle));
    }

    #[test]
    fn test_grounded_jump_through_bridge() {
        let handle = create_default();
        let frame = CString::new(
            r#"{
                "input": {"direction": [0.0, 1.0], "jump": true},
                "body": {"position": [0.0, 0.0, 0.0]},
                "dt": 0.02,
                "ground": {"point": [0.0, 0.0, 0.0], "normal": [0.0, 1.0, 0.0], "distance": 0.0}
            }"#,
        )
        .unwrap();
        let response: StepResponse = serde_json::from_str(&take_string(character_step(handle, frame.as_ptr()))).unwrap();
        assert_eq!(response.mode, MovementMode::Grounded);
        assert!(response.animator.jump);
        assert_eq!(response.animator_channels.get("Jump"), Some(&AnimatorValue::Trigger));
        assert_eq!(response.animator_channels.get("IsFalling"), Some(&AnimatorValue::Bool(false)));
        assert!(response.events.contains(&LocomotionEvent::Jumped));
        assert!((response.body.impulse[1] - 2f32.sqrt()).abs() < 1e-5);
        assert!(response.body.gravity_enabled);
        assert!((response.camera.distance - 2.0).abs() < 1e-5);
        assert!(response.camera.cutout_position.is_none());
        assert!(character_destroy(handle));
    }

    #[test]
    fn test_landing_toggle_and_destroy() {
        let handle = create_default();
        assert!(character_set_landing(handle, true));
        assert!(character_set_landing(handle, false));
        assert!(character_destroy(handle));
        assert!(!character_destroy(handle));
        assert!(!character_set_landing(handle, true));
    }
}
