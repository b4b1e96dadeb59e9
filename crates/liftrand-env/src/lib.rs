//! Episode lifecycle, observables and host-state propagation for the lift task.

pub mod buffer;
pub mod episode;
pub mod observables;
pub mod systems;

use bevy::prelude::*;
use liftrand_core::LiftSet;
use liftrand_core::config::LiftConfig;

use crate::buffer::ObservationBuffer;
use crate::episode::{Episode, EpisodeConfig};
use crate::observables::ObservableRegistry;
use crate::systems::{StepReward, StepSuccess};

// ---------------------------------------------------------------------------
// LiftEnvPlugin
// ---------------------------------------------------------------------------

/// Episode, observation and forward-kinematics plumbing.
///
/// Expects [`LiftCorePlugin`](liftrand_core::LiftCorePlugin) to be added first.
pub struct LiftEnvPlugin;

impl Plugin for LiftEnvPlugin {
    fn build(&self, app: &mut App) {
        let episode_config = app
            .world()
            .get_resource::<LiftConfig>()
            .map(|c| EpisodeConfig::from_env(&c.env))
            .unwrap_or_default();

        app.insert_resource(episode_config)
            .init_resource::<Episode>()
            .init_resource::<ObservationBuffer>()
            .init_resource::<ObservableRegistry>()
            .init_resource::<StepReward>()
            .init_resource::<StepSuccess>()
            .add_systems(Update, systems::forward_system.in_set(LiftSet::Forward))
            .add_systems(Update, systems::observe_system.in_set(LiftSet::Observe))
            .add_systems(
                Update,
                systems::episode_step_system.in_set(LiftSet::Evaluate),
            );
    }
}

pub mod prelude {
    pub use crate::{
        LiftEnvPlugin,
        buffer::ObservationBuffer,
        episode::{Episode, EpisodeConfig, EpisodeState},
        observables::{CubePosition, CubeQuat, GripperToCube, OBJECT_MODALITY, ObservableRegistry},
        systems::{StepReward, StepSuccess, episode_step_system},
    };
}
