//! The randomized cube-lift task.
//!
//! Combines the randomized scene from `liftrand-scene` with reward, success
//! and grasp evaluation, robot-base transparency and the gripper tint, and
//! drives the reset lifecycle through [`LiftTaskPlugin`].

pub mod grasp;
pub mod plugin;
pub mod reward;
pub mod success;
pub mod task;
pub mod transparency;
pub mod visualize;

pub use plugin::{LiftTaskPlugin, reset_episode};
pub use task::LiftTask;

pub mod prelude {
    pub use crate::{
        LiftTask, LiftTaskPlugin,
        grasp::ContactGraspDetector,
        plugin::{
            JustReset, LastReward, LiftEvaluator, ResetReport, ResetRequest, TaskHandles,
            reset_episode,
        },
        reward::{LiftReward, RewardBreakdown, RewardInputs, lift_reward},
        success::{LIFT_MARGIN, LiftSuccess, is_lifted},
        task::ResetOutcome,
        transparency::make_robot_base_transparent,
        visualize::{VisSettings, gripper_tint},
    };
}
