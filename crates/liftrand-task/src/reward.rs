//! Lift reward.
//!
//! Sparse mode pays [`SPARSE_LIFT_REWARD`] while the cube is lifted. Shaped
//! mode adds a reaching term `1 - tanh(10 d)` and a flat grasp bonus. The sum
//! is then multiplied by `reward_scale / 2.25`, so the sparse maximum equals
//! `reward_scale`; shaped totals can exceed it.

use bevy::prelude::*;
use liftrand_core::config::RewardConfig;
use liftrand_core::traits::{GraspDetector, RewardFunction, SuccessCriterion};

pub const SPARSE_LIFT_REWARD: f32 = 2.25;
pub const REACH_TANH_GAIN: f32 = 10.0;
pub const GRASP_REWARD: f32 = 0.25;
/// Optional lifting component, off unless `include_lifting_term` is set.
pub const LIFT_TERM_REWARD: f32 = 1.0;

/// State the reward reads for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardInputs {
    pub success: bool,
    pub cube_pos: Vec3,
    pub gripper_pos: Vec3,
    pub grasping: bool,
}

/// Per-term reward, before and after scaling.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RewardBreakdown {
    pub completion: f32,
    pub reaching: f32,
    pub grasping: f32,
    pub lifting: f32,
    /// Multiplier applied to the raw sum; 1 when unscaled.
    pub scale_factor: f32,
    pub total: f32,
}

impl RewardBreakdown {
    pub fn raw(&self) -> f32 {
        self.completion + self.reaching + self.grasping + self.lifting
    }
}

/// `1 - tanh(10 d)` for gripper-to-cube distance `d`.
pub fn reaching_reward(gripper_pos: Vec3, cube_pos: Vec3) -> f32 {
    1.0 - (REACH_TANH_GAIN * gripper_pos.distance(cube_pos)).tanh()
}

/// Pure reward computation.
pub fn lift_reward(inputs: &RewardInputs, config: &RewardConfig) -> RewardBreakdown {
    let mut out = RewardBreakdown {
        scale_factor: 1.0,
        ..RewardBreakdown::default()
    };

    if inputs.success {
        out.completion = SPARSE_LIFT_REWARD;
    }

    if config.reward_shaping {
        out.reaching = reaching_reward(inputs.gripper_pos, inputs.cube_pos);
        if inputs.grasping {
            out.grasping = GRASP_REWARD;
        }
        if config.include_lifting_term && inputs.success {
            out.lifting = LIFT_TERM_REWARD;
        }
    }

    if let Some(scale) = config.reward_scale {
        out.scale_factor = scale / SPARSE_LIFT_REWARD;
    }
    out.total = out.raw() * out.scale_factor;
    out
}

// ---------------------------------------------------------------------------
// LiftReward
// ---------------------------------------------------------------------------

/// [`RewardFunction`] reading cube and gripper transforms from the world.
///
/// Missing entities read as the origin, matching an unset body position.
pub struct LiftReward {
    pub config: RewardConfig,
    pub cube: Entity,
    pub gripper: Entity,
    pub success: Box<dyn SuccessCriterion>,
    pub grasp: Box<dyn GraspDetector>,
}

impl LiftReward {
    pub fn inputs(&self, world: &World) -> RewardInputs {
        let pos = |e: Entity| world.get::<Transform>(e).map_or(Vec3::ZERO, |t| t.translation);
        RewardInputs {
            success: self.success.is_success(world),
            cube_pos: pos(self.cube),
            gripper_pos: pos(self.gripper),
            grasping: self.config.reward_shaping
                && self.grasp.is_grasping(world, self.gripper, self.cube),
        }
    }

    pub fn breakdown(&self, world: &World) -> RewardBreakdown {
        lift_reward(&self.inputs(world), &self.config)
    }
}

impl RewardFunction for LiftReward {
    fn compute(&self, world: &World) -> f32 {
        self.breakdown(world).total
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "LiftReward"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
