use bevy::prelude::*;

use crate::types::Observation;

// ---------------------------------------------------------------------------
// RewardFunction
// ---------------------------------------------------------------------------

/// Computes a scalar reward from the current world state.
pub trait RewardFunction: Send + Sync + 'static {
    /// Compute the reward value.
    fn compute(&self, world: &World) -> f32;

    /// Human-readable name for this reward function.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// SuccessCriterion
// ---------------------------------------------------------------------------

/// Decides whether the task is currently accomplished.
///
/// Evaluated every step with no memory of previous steps.
pub trait SuccessCriterion: Send + Sync + 'static {
    /// Returns `true` while the task condition holds.
    fn is_success(&self, world: &World) -> bool;

    /// Human-readable name for this criterion.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// GraspDetector
// ---------------------------------------------------------------------------

/// Host-provided predicate deciding whether a gripper holds an object.
pub trait GraspDetector: Send + Sync + 'static {
    fn is_grasping(&self, world: &World, gripper: Entity, object: Entity) -> bool;
}

// ---------------------------------------------------------------------------
// Observable
// ---------------------------------------------------------------------------

/// A named per-step state reporter consumed by policies and loggers.
pub trait Observable: Send + Sync + 'static {
    /// Read the current value from the world.
    fn read(&self, world: &World) -> Observation;

    /// Unique observable name, e.g. `cube_pos`.
    fn name(&self) -> &str;

    /// Grouping used by consumers, e.g. `object`.
    fn modality(&self) -> &str;

    /// Number of values produced by [`read`](Self::read).
    fn dim(&self) -> usize;

    /// Sampling rate in Hz. `None` means every step.
    fn rate_hz(&self) -> Option<f32> {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
