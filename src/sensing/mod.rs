//! Ray probes and the raycast seam.
//!
//! Controllers describe what they want to know as [`Probe`]s and ask a
//! [`RaycastQuery`] for the answer. A miss is an ordinary `None`, never an
//! error. The Bevy side answers with rapier (`physics::RapierProbe`), tests
//! and headless hosts with [`analytic::AnalyticWorld`].

use bevy::prelude::*;

pub mod analytic;

/// A ray segment: `origin + direction * t` for `t` in `[0, max_distance]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub origin: Vec3,
    /// Unit length, or zero for a probe that can never hit
    pub direction: Vec3,
    pub max_distance: f32,
}

impl Probe {
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_distance: max_distance.max(0.0),
        }
    }

    /// Probe covering the segment from `from` to `to`.
    pub fn between(from: Vec3, to: Vec3) -> Self {
        let offset = to - from;
        Self::new(from, offset, offset.length())
    }

    pub fn end(&self) -> Vec3 {
        self.origin + self.direction * self.max_distance
    }

    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO
    }
}

/// Result of a probe that struck a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    /// Surface normal facing back toward the probe origin
    pub normal: Vec3,
    pub distance: f32,
    pub collider: Option<Entity>,
}

/// Physics ray queries supplied by the host.
pub trait RaycastQuery {
    /// Nearest hit along the probe, if any.
    fn cast(&self, probe: &Probe) -> Option<RayHit>;

    /// Every hit along the probe, nearest first.
    fn cast_all(&self, probe: &Probe) -> Vec<RayHit>;
}

impl<T: RaycastQuery + ?Sized> RaycastQuery for &T {
    fn cast(&self, probe: &Probe) -> Option<RayHit> {
        (**self).cast(probe)
    }

    fn cast_all(&self, probe: &Probe) -> Vec<RayHit> {
        (**self).cast_all(probe)
    }
}

/// A world with nothing in it. Every probe misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyWorld;

impl RaycastQuery for EmptyWorld {
    fn cast(&self, _probe: &Probe) -> Option<RayHit> {
        None
    }

    fn cast_all(&self, _probe: &Probe) -> Vec<RayHit> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_normalizes_direction() {
        let probe = Probe::new(Vec3::ZERO, Vec3::new(0.0, -3.0, 0.0), 0.2);
        assert_eq!(probe.direction, Vec3::NEG_Y);
        assert!((probe.end() - Vec3::new(0.0, -0.2, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_probe_between() {
        let probe = Probe::between(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(probe.direction, Vec3::NEG_Z);
        assert!((probe.max_distance - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_direction_is_degenerate() {
        let probe = Probe::between(Vec3::ONE, Vec3::ONE);
        assert!(probe.is_degenerate());
        assert!(EmptyWorld.cast(&probe).is_none());
    }
}
