//! liftrand-core: types, host-state components, config, seeds and errors
//! for the randomized cube-lift task.

pub mod components;
pub mod config;
pub mod error;
pub mod seed;
pub mod traits;
pub mod types;

use bevy::prelude::*;

// ---------------------------------------------------------------------------
// LiftSet
// ---------------------------------------------------------------------------

/// Ordering of the task's per-frame work inside [`Update`].
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiftSet {
    /// Scene rebuild and object placement after an episode reset.
    Reset,
    /// Propagate joint state to body transforms.
    Forward,
    /// Sample observables.
    Observe,
    /// Reward, success and episode bookkeeping.
    Evaluate,
    /// Debug visualisation.
    Visualize,
}

// ---------------------------------------------------------------------------
// LiftCorePlugin
// ---------------------------------------------------------------------------

/// Registers [`LiftSet`] ordering and the shared configuration resources.
pub struct LiftCorePlugin;

impl Plugin for LiftCorePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                LiftSet::Reset,
                LiftSet::Forward,
                LiftSet::Observe,
                LiftSet::Evaluate,
                LiftSet::Visualize,
            )
                .chain(),
        )
        .init_resource::<config::LiftConfig>()
        .init_resource::<components::TableTop>();

        let root = app.world().resource::<config::LiftConfig>().env.seed;
        if !app.world().contains_resource::<seed::SeedHierarchy>() {
            app.insert_resource(seed::SeedHierarchy::new(root));
        }
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        LiftCorePlugin, LiftSet,
        components::{
            FreeJoint, GeomVisual, GripperContacts, GripperSite, Manipulandum, SiteRgba, TableTop,
        },
        config::{LiftConfig, RotationSpec, TableRotationMode},
        error::{ConfigError, LiftError, PlacementError, SceneError, SimError},
        seed::SeedHierarchy,
        traits::{GraspDetector, Observable, RewardFunction, SuccessCriterion},
        types::{Axis, Observation, Pose},
    };
}
