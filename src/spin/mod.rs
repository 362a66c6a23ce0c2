//! Props that turn at a constant rate per fixed step.

use bevy::prelude::*;

pub struct SpinPlugin;

impl Plugin for SpinPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, spin_props);
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Spinner {
    /// Local rotation axis; its length scales the rate
    pub axis: Vec3,
    pub degrees_per_step: f32,
}

impl Default for Spinner {
    fn default() -> Self {
        Self {
            axis: Vec3::Z,
            degrees_per_step: 1.0,
        }
    }
}

impl Spinner {
    /// Rotation applied each fixed step, in the spinner's local frame.
    pub fn step_rotation(&self) -> Quat {
        let scaled = self.axis * self.degrees_per_step;
        let angle = scaled.length();
        if angle < f32::EPSILON {
            return Quat::IDENTITY;
        }
        Quat::from_axis_angle(scaled / angle, angle.to_radians())
    }
}

fn spin_props(mut props: Query<(&Spinner, &mut Transform)>) {
    for (spinner, mut transform) in &mut props {
        let step = spinner.step_rotation();
        transform.rotation = (transform.rotation * step).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_per_step() {
        let spinner = Spinner {
            axis: Vec3::Y,
            degrees_per_step: 90.0,
        };
        let rotated = spinner.step_rotation() * Vec3::X;
        assert!((rotated - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_axis_length_scales_rate() {
        let spinner = Spinner {
            axis: Vec3::Y * 2.0,
            degrees_per_step: 45.0,
        };
        let (axis, angle) = spinner.step_rotation().to_axis_angle();
        assert!((axis - Vec3::Y).length() < 1e-5);
        assert!((angle.to_degrees() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_axis_is_still() {
        let spinner = Spinner {
            axis: Vec3::ZERO,
            degrees_per_step: 10.0,
        };
        assert_eq!(spinner.step_rotation(), Quat::IDENTITY);
    }

    #[test]
    fn test_fixed_update_turns_transform() {
        let mut app = App::new();
        app.add_systems(Update, spin_props);
        let entity = app
            .world_mut()
            .spawn((
                Spinner {
                    axis: Vec3::Y,
                    degrees_per_step: 30.0,
                },
                Transform::default(),
            ))
            .id();
        app.update();
        app.update();
        let rotation = app.world().get::<Transform>(entity).map(|t| t.rotation);
        let expected = Quat::from_rotation_y(60f32.to_radians());
        assert!(rotation.is_some_and(|r| r.angle_between(expected) < 1e-4));
    }
}
