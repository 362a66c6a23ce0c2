//! Physics integration: bevy_rapier3d collision layers, bundles and ray queries
//!
//! Provides:
//! - Collision group constants (CHARACTER, ENVIRONMENT, PROP)
//! - Bundles for the character body and static level geometry
//! - `RapierProbe`, the rapier-backed `RaycastQuery` used by the character systems

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::sensing::{Probe, RayHit, RaycastQuery};

// ============================================================================
// Collision Layers
// ============================================================================

/// Collision group constants for physics filtering.
pub struct PhysicsLayers;

impl PhysicsLayers {
    /// Player characters
    pub const CHARACTER: Group = Group::GROUP_1;
    /// Static level geometry; also what the camera cuts out
    pub const ENVIRONMENT: Group = Group::GROUP_2;
    /// Moving props (spinners, platforms)
    pub const PROP: Group = Group::GROUP_3;
}

/// Ray filter groups for camera occlusion queries.
pub fn occlusion_groups() -> CollisionGroups {
    CollisionGroups::new(Group::ALL, PhysicsLayers::ENVIRONMENT)
}

// ============================================================================
// Physics Component Bundles
// ============================================================================

/// Capsule height (feet to crown) of the character collider.
pub const CHARACTER_HEIGHT: f32 = 1.8;
/// Capsule radius of the character collider.
pub const CHARACTER_RADIUS: f32 = 0.4;

/// Rigid-body components for a controllable character.
///
/// The capsule is offset upward so the entity origin sits at the feet, where
/// the ground probe starts. Rotation is owned by the locomotion controller.
pub fn character_physics_bundle() -> impl Bundle {
    let half_height = CHARACTER_HEIGHT * 0.5 - CHARACTER_RADIUS;
    (
        RigidBody::Dynamic,
        Collider::compound(vec![(
            Vec3::Y * (CHARACTER_HEIGHT * 0.5),
            Quat::IDENTITY,
            Collider::capsule_y(half_height, CHARACTER_RADIUS),
        )]),
        ColliderMassProperties::Mass(1.0),
        CollisionGroups::new(
            PhysicsLayers::CHARACTER,
            PhysicsLayers::ENVIRONMENT | PhysicsLayers::PROP,
        ),
        LockedAxes::ROTATION_LOCKED,
        Velocity::default(),
        ExternalForce::default(),
        ExternalImpulse::default(),
        Damping::default(),
        GravityScale(1.0),
    )
}

/// Fixed cuboid for floors, walls and ramps.
pub fn environment_physics_bundle(half_extents: Vec3) -> (RigidBody, Collider, CollisionGroups) {
    (
        RigidBody::Fixed,
        Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
        CollisionGroups::new(PhysicsLayers::ENVIRONMENT, Group::ALL),
    )
}

/// Kinematic cuboid for props driven by transform (spinners).
pub fn prop_physics_bundle(half_extents: Vec3) -> (RigidBody, Collider, CollisionGroups) {
    (
        RigidBody::KinematicPositionBased,
        Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
        CollisionGroups::new(PhysicsLayers::PROP, Group::ALL),
    )
}

// ============================================================================
// Ray queries
// ============================================================================

/// `RaycastQuery` over a rapier context.
pub struct RapierProbe<'a> {
    context: &'a RapierContext,
    filter: QueryFilter<'a>,
}

impl<'a> RapierProbe<'a> {
    pub fn new(context: &'a RapierContext) -> Self {
        Self {
            context,
            filter: QueryFilter::default(),
        }
    }

    /// Probe that ignores the colliders of `body` (the character casting it).
    pub fn excluding(context: &'a RapierContext, body: Entity) -> Self {
        Self {
            context,
            filter: QueryFilter::default().exclude_rigid_body(body),
        }
    }

    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.filter = self.filter.groups(groups);
        self
    }
}

impl RaycastQuery for RapierProbe<'_> {
    fn cast(&self, probe: &Probe) -> Option<RayHit> {
        if probe.is_degenerate() {
            return None;
        }
        self.context
            .cast_ray_and_get_normal(
                probe.origin,
                probe.direction,
                probe.max_distance,
                true,
                self.filter,
            )
            .map(|(entity, hit)| RayHit {
                point: hit.point,
                normal: hit.normal,
                distance: probe.origin.distance(hit.point),
                collider: Some(entity),
            })
    }

    fn cast_all(&self, probe: &Probe) -> Vec<RayHit> {
        let mut hits = Vec::new();
        if probe.is_degenerate() {
            return hits;
        }
        self.context.intersections_with_ray(
            probe.origin,
            probe.direction,
            probe.max_distance,
            true,
            self.filter,
            |entity, hit| {
                hits.push(RayHit {
                    point: hit.point,
                    normal: hit.normal,
                    distance: probe.origin.distance(hit.point),
                    collider: Some(entity),
                });
                true
            },
        );
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
