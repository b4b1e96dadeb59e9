//! ECS components and resources describing host simulation state.
//!
//! The physics host owns these values. Task systems read body and site
//! positions from [`Transform`] and only write through the narrow surfaces
//! below: [`FreeJoint`] on reset, [`GeomVisual`] alpha for transparency and
//! [`SiteRgba`] for gripper tinting.

use bevy::prelude::*;

use crate::types::Pose;

/// Marks the body the robot is meant to lift.
#[derive(Component, Clone, Debug)]
pub struct Manipulandum {
    /// Object name, matching the placement sampler registration.
    pub name: String,
}

impl Manipulandum {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Marks the end-effector reference site of a robot arm.
#[derive(Component, Clone, Debug)]
pub struct GripperSite {
    /// Robot-level name prefix, e.g. `robot0_`.
    pub robot_prefix: String,
    /// Arm-level prefix; empty for single-arm robots.
    pub arm_prefix: String,
}

impl Default for GripperSite {
    fn default() -> Self {
        Self {
            robot_prefix: "robot0_".into(),
            arm_prefix: String::new(),
        }
    }
}

/// Seven-value free-joint state `[x, y, z, qw, qx, qy, qz]`.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct FreeJoint {
    pub qpos: [f32; 7],
}

impl FreeJoint {
    pub fn from_pose(pose: &Pose) -> Self {
        Self {
            qpos: pose.to_qpos(),
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::from_qpos(self.qpos)
    }
}

impl Default for FreeJoint {
    fn default() -> Self {
        Self::from_pose(&Pose::default())
    }
}

/// Visual properties of a named geom.
#[derive(Component, Clone, Debug)]
pub struct GeomVisual {
    pub name: String,
    /// Geom group; group 1 holds visual-only geoms.
    pub group: u8,
    pub rgba: [f32; 4],
}

/// Display colour of a site.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct SiteRgba(pub [f32; 4]);

impl Default for SiteRgba {
    fn default() -> Self {
        Self([1.0, 0.0, 0.0, 0.5])
    }
}

/// Contacts reported by the host for each finger pad of a gripper.
#[derive(Component, Clone, Debug, Default)]
pub struct GripperContacts {
    pub left_pad: Vec<Entity>,
    pub right_pad: Vec<Entity>,
}

/// Table-top height stored when the scene is built.
///
/// Success and reward compare against this value rather than re-deriving
/// it from the arena each step.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct TableTop {
    pub height: f32,
}

impl Default for TableTop {
    fn default() -> Self {
        Self { height: 0.8 }
    }
}
