//! Gripper-to-cube distance tint.
//!
//! The gripper site fades from red to green as it closes on the cube.

use bevy::prelude::*;

/// Squared distance at which the tint saturates to red.
pub const TINT_MAX_SQ_DIST: f32 = 0.1;
const TINT_EXPONENT: i32 = 15;

/// Which debug visualisations are active.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisSettings {
    pub grippers: bool,
}

impl Default for VisSettings {
    fn default() -> Self {
        Self { grippers: true }
    }
}

/// Site rgb for a gripper-to-target vector. Alpha is left to the caller.
pub fn gripper_tint(gripper_pos: Vec3, target_pos: Vec3) -> [f32; 3] {
    let sq = gripper_pos.distance_squared(target_pos);
    let closeness = (1.0 - (sq / TINT_MAX_SQ_DIST).min(1.0)).powi(TINT_EXPONENT);
    [1.0 - closeness, closeness, 0.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_is_green() {
        assert_eq!(gripper_tint(Vec3::ONE, Vec3::ONE), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn far_is_red() {
        assert_eq!(gripper_tint(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn uses_squared_distance() {
        // d = 0.1 gives d^2 = 0.01, closeness = 0.9^15
        let [r, g, b] = gripper_tint(Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0));
        let expected = 0.9_f32.powi(15);
        assert!((g - expected).abs() < 1e-5);
        assert!((r + g - 1.0).abs() < 1e-6);
        assert!(b.abs() < f32::EPSILON);
    }
}
