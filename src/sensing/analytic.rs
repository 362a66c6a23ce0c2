//! Headless ray world made of planes and axis-aligned boxes.
//!
//! Good enough to drive the controllers without a physics engine: tests,
//! benches and foreign hosts that want a quick stand-in use it.

use bevy::prelude::*;

use super::{Probe, RayHit, RaycastQuery};

/// Surface shapes understood by [`AnalyticWorld`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    /// Infinite two-sided plane through `point`
    Plane { point: Vec3, normal: Vec3 },
    /// Solid axis-aligned box
    Box { min: Vec3, max: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Shape {
    surface: Surface,
    collider: Option<Entity>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticWorld {
    shapes: Vec<Shape>,
}

impl AnalyticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Horizontal ground plane at height `y`.
    pub fn with_ground(self, y: f32) -> Self {
        self.with_plane(Vec3::new(0.0, y, 0.0), Vec3::Y)
    }

    pub fn with_plane(mut self, point: Vec3, normal: Vec3) -> Self {
        self.shapes.push(Shape {
            surface: Surface::Plane {
                point,
                normal: normal.normalize_or_zero(),
            },
            collider: None,
        });
        self
    }

    pub fn with_box(self, min: Vec3, max: Vec3) -> Self {
        self.with_tagged_box(min, max, None)
    }

    /// Box that reports `collider` on hits, for occlusion queries.
    pub fn with_tagged_box(mut self, min: Vec3, max: Vec3, collider: Option<Entity>) -> Self {
        self.shapes.push(Shape {
            surface: Surface::Box {
                min: min.min(max),
                max: min.max(max),
            },
            collider,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    fn hits(&self, probe: &Probe) -> impl Iterator<Item = RayHit> + '_ {
        let probe = *probe;
        self.shapes.iter().filter_map(move |shape| {
            if probe.is_degenerate() {
                return None;
            }
            let (distance, normal) = match shape.surface {
                Surface::Plane { point, normal } => intersect_plane(&probe, point, normal)?,
                Surface::Box { min, max } => intersect_box(&probe, min, max)?,
            };
            Some(RayHit {
                point: probe.origin + probe.direction * distance,
                normal,
                distance,
                collider: shape.collider,
            })
        })
    }
}

impl RaycastQuery for AnalyticWorld {
    fn cast(&self, probe: &Probe) -> Option<RayHit> {
        self.hits(probe)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn cast_all(&self, probe: &Probe) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = self.hits(probe).collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

fn intersect_plane(probe: &Probe, point: Vec3, normal: Vec3) -> Option<(f32, Vec3)> {
    let denom = normal.dot(probe.direction);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (point - probe.origin).dot(normal) / denom;
    if !(0.0..=probe.max_distance).contains(&t) {
        return None;
    }
    let facing = if denom > 0.0 { -normal } else { normal };
    Some((t, facing))
}

fn intersect_box(probe: &Probe, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_normal = -probe.direction;

    for axis in 0..3 {
        let origin = probe.origin[axis];
        let dir = probe.direction[axis];
        if dir.abs() < 1e-8 {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir;
        let mut t0 = (min[axis] - origin) * inv;
        let mut t1 = (max[axis] - origin) * inv;
        let mut normal = Vec3::ZERO;
        normal[axis] = -1.0;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
            normal[axis] = 1.0;
        }
        if t0 > t_enter {
            t_enter = t0;
            enter_normal = normal;
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }
    // Origin inside the box: solid hit at the start of the probe
    if t_enter < 0.0 {
        return Some((0.0, -probe.direction));
    }
    if t_enter > probe.max_distance {
        return None;
    }
    Some((t_enter, enter_normal))
}
