//! Plain data types shared across the lift task crates.
//!
//! All spatial quantities use the MuJoCo convention: Z is up, lengths are in
//! metres. Quaternions are carried as [`Quat`] internally and only flattened
//! to a component order at the edges (joint qpos, MJCF attributes, observables).

use bevy::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// A flat vector of observation values produced by an observable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Observation {
    data: Vec<f32>,
}

impl Observation {
    pub const fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
        }
    }

    pub const fn len(&self) -> usize {
        self.data.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

impl From<Vec3> for Observation {
    fn from(v: Vec3) -> Self {
        Self::new(v.to_array().to_vec())
    }
}

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// A principal rotation axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    /// Unit vector along this axis.
    pub const fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }

    /// Rotation of `angle` radians about this axis.
    pub fn rotation(self, angle: f32) -> Quat {
        Quat::from_axis_angle(self.unit(), angle)
    }
}

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// Position and orientation of a rigid body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Free-joint qpos layout: `[x, y, z, qw, qx, qy, qz]`.
    pub fn to_qpos(&self) -> [f32; 7] {
        let [w, x, y, z] = quat_to_wxyz(self.orientation);
        [
            self.position.x,
            self.position.y,
            self.position.z,
            w,
            x,
            y,
            z,
        ]
    }

    /// Inverse of [`to_qpos`](Self::to_qpos).
    pub fn from_qpos(qpos: [f32; 7]) -> Self {
        Self {
            position: Vec3::new(qpos[0], qpos[1], qpos[2]),
            orientation: quat_from_wxyz([qpos[3], qpos[4], qpos[5], qpos[6]]),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

// ---------------------------------------------------------------------------
// Quaternion component orders
// ---------------------------------------------------------------------------

/// Scalar-first component order, as MuJoCo stores quaternions.
pub fn quat_to_wxyz(q: Quat) -> [f32; 4] {
    [q.w, q.x, q.y, q.z]
}

/// Scalar-last component order, as policies consume orientation observations.
pub fn quat_to_xyzw(q: Quat) -> [f32; 4] {
    q.to_array()
}

pub fn quat_from_wxyz(wxyz: [f32; 4]) -> Quat {
    Quat::from_xyzw(wxyz[1], wxyz[2], wxyz[3], wxyz[0])
}

/// Quaternion for an axis-angle vector whose norm is the rotation angle.
///
/// A zero vector maps to the identity.
pub fn axis_angle_to_quat(axis_angle: Vec3) -> Quat {
    let angle = axis_angle.length();
    if angle < f32::EPSILON {
        return Quat::IDENTITY;
    }
    Quat::from_axis_angle(axis_angle / angle, angle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
