//! Bevy integration: reset, evaluation and visualisation systems.

use bevy::prelude::*;
use liftrand_core::LiftSet;
use liftrand_core::components::{FreeJoint, GripperSite, Manipulandum, SiteRgba, TableTop};
use liftrand_core::config::LiftConfig;
use liftrand_core::error::{LiftError, SimError};
use liftrand_core::seed::SeedHierarchy;
use liftrand_core::types::Pose;
use liftrand_env::buffer::ObservationBuffer;
use liftrand_env::episode::Episode;
use liftrand_env::observables::{CubePosition, CubeQuat, GripperToCube, ObservableRegistry};
use liftrand_env::systems::{StepReward, StepSuccess, episode_step_system};
use liftrand_scene::CUBE_NAME;

use crate::grasp::ContactGraspDetector;
use crate::reward::{LiftReward, RewardBreakdown, lift_reward};
use crate::success::LiftSuccess;
use crate::task::LiftTask;
use crate::transparency::make_robot_base_transparent;
use crate::visualize::{VisSettings, gripper_tint};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Entities the task reads every step.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskHandles {
    pub cube: Entity,
    pub gripper: Entity,
}

/// Reward and success evaluation bound to the current handles.
#[derive(Resource)]
pub struct LiftEvaluator {
    pub reward: LiftReward,
}

/// Per-term reward of the last evaluated step.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct LastReward(pub RewardBreakdown);

/// Pending reset, consumed in [`LiftSet::Reset`]. The inner value is an
/// optional explicit seed.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResetRequest(pub Option<Option<u64>>);

impl ResetRequest {
    pub const fn request(&mut self, seed: Option<u64>) {
        self.0 = Some(seed);
    }
}

/// Set on frames that performed a reset; evaluation is skipped on them.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JustReset(pub bool);

/// Summary of one [`reset_episode`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResetReport {
    pub episode_seed: u64,
    pub rebuilt: bool,
    pub cube_pose: Option<Pose>,
    pub table_height: f32,
    pub hidden_geoms: usize,
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

/// The single gripper site in the world.
pub fn single_gripper(world: &mut World) -> Result<(Entity, GripperSite), SimError> {
    let mut query = world.query::<(Entity, &GripperSite)>();
    let sites: Vec<(Entity, GripperSite)> =
        query.iter(world).map(|(e, s)| (e, s.clone())).collect();
    match sites.as_slice() {
        [one] => Ok(one.clone()),
        _ => Err(SimError::RobotCount(sites.len())),
    }
}

fn find_or_spawn_cube(world: &mut World) -> Entity {
    let mut query = world.query::<(Entity, &Manipulandum)>();
    let existing = query
        .iter(world)
        .find(|(_, m)| m.name == CUBE_NAME)
        .map(|(e, _)| e);
    existing.unwrap_or_else(|| {
        world
            .spawn((
                Manipulandum::new(CUBE_NAME),
                FreeJoint::default(),
                Transform::default(),
            ))
            .id()
    })
}

/// Start a new episode.
///
/// Validates the single-arm precondition, rebuilds or reuses the scene,
/// writes the sampled cube pose into its free joint in one assignment, hides
/// the robot base and resets the episode counters. With `seed` the episode is
/// reproducible on its own; without it the episode seed derives from the
/// [`SeedHierarchy`] and the episode number.
pub fn reset_episode(world: &mut World, seed: Option<u64>) -> Result<ResetReport, LiftError> {
    let (gripper, site) = single_gripper(world)?;

    let episode_number = world.get_resource::<Episode>().map_or(0, |e| e.episode_number);
    let (hierarchy, index) = match seed {
        Some(seed) => (SeedHierarchy::new(seed), 0),
        None => (
            world
                .get_resource::<SeedHierarchy>()
                .copied()
                .unwrap_or_default(),
            episode_number,
        ),
    };
    let mut scene_rng = hierarchy.scene_rng(index);
    let mut placement_rng = hierarchy.placement_rng(index);

    let (outcome, cube_pose, table_height, config) = {
        let mut task = world
            .get_resource_mut::<LiftTask>()
            .ok_or(SimError::SceneNotBuilt)?;
        let outcome = task.reset(&mut scene_rng, &mut placement_rng)?;
        let table_height = task.table_height().ok_or(SimError::SceneNotBuilt)?;
        (outcome, task.cube_pose(), table_height, task.config().clone())
    };

    if outcome.rebuilt {
        world.insert_resource(TableTop {
            height: table_height,
        });
    }

    let cube = find_or_spawn_cube(world);
    // Kept placements are re-applied so a deterministic reset restores the
    // cube after it was moved.
    if let Some(pose) = cube_pose {
        world.entity_mut(cube).insert(FreeJoint::from_pose(&pose));
    }

    world.insert_resource(TaskHandles { cube, gripper });
    world.insert_resource(LiftEvaluator {
        reward: LiftReward {
            config: config.reward.clone(),
            cube,
            gripper,
            success: Box::new(LiftSuccess { cube }),
            grasp: Box::new(ContactGraspDetector),
        },
    });

    if config.env.use_object_obs {
        setup_observables(world, cube, gripper, &site, config.env.control_freq);
    }

    let hidden_geoms = make_robot_base_transparent(world);

    let episode_seed = hierarchy.episode_seed(index);
    if let Some(mut episode) = world.get_resource_mut::<Episode>() {
        episode.reset(Some(episode_seed));
    }
    if let Some(mut reward) = world.get_resource_mut::<StepReward>() {
        reward.0 = 0.0;
    }

    Ok(ResetReport {
        episode_seed,
        rebuilt: outcome.rebuilt,
        cube_pose,
        table_height,
        hidden_geoms,
    })
}

/// Entities the registered cube observables read.
#[derive(Resource, Clone, Debug, PartialEq, Eq)]
struct ObservableBinding {
    cube: Entity,
    gripper: Entity,
    arm_prefix: String,
}

/// Register the cube observables, or restart their clocks when they are
/// already bound to the same entities. A changed cube or gripper entity
/// drops the old observables and their buffer slots.
fn setup_observables(
    world: &mut World,
    cube: Entity,
    gripper: Entity,
    site: &GripperSite,
    control_freq: f32,
) {
    let Some(mut registry) = world.remove_resource::<ObservableRegistry>() else {
        return;
    };
    let mut buffer = world
        .remove_resource::<ObservationBuffer>()
        .unwrap_or_default();

    let binding = ObservableBinding {
        cube,
        gripper,
        arm_prefix: site.arm_prefix.clone(),
    };
    let stale = world.get_resource::<ObservableBinding>() != Some(&binding);
    if stale || registry.is_empty() {
        if !registry.is_empty() {
            debug!("re-binding cube observables to cube {cube}, gripper {gripper}");
            registry.clear();
            buffer = ObservationBuffer::new();
        }
        registry.register(Box::new(CubePosition::new(cube, control_freq)), &mut buffer);
        registry.register(Box::new(CubeQuat::new(cube, control_freq)), &mut buffer);
        registry.register(
            Box::new(GripperToCube::with_arm_prefix(
                gripper,
                cube,
                control_freq,
                &site.arm_prefix,
            )),
            &mut buffer,
        );
        world.insert_resource(binding);
    }
    registry.reset_clocks();

    world.insert_resource(buffer);
    world.insert_resource(registry);
}

/// Consumes a pending [`ResetRequest`].
pub fn reset_request_system(world: &mut World) {
    let pending = world
        .get_resource_mut::<ResetRequest>()
        .and_then(|mut r| r.0.take());
    if let Some(mut just_reset) = world.get_resource_mut::<JustReset>() {
        just_reset.0 = pending.is_some();
    }
    if let Some(seed) = pending {
        if let Err(e) = reset_episode(world, seed) {
            error!("reset failed: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluate
// ---------------------------------------------------------------------------

/// Computes the step reward and success flag.
///
/// Runs in [`LiftSet::Evaluate`] before [`episode_step_system`].
pub fn evaluate_system(world: &mut World) {
    let Some(evaluator) = world.get_resource::<LiftEvaluator>() else {
        return;
    };
    let inputs = evaluator.reward.inputs(world);
    let breakdown = lift_reward(&inputs, &evaluator.reward.config);

    world.insert_resource(StepReward(breakdown.total));
    world.insert_resource(StepSuccess(inputs.success));
    world.insert_resource(LastReward(breakdown));
}

fn not_just_reset(just_reset: Option<Res<JustReset>>) -> bool {
    !just_reset.is_some_and(|j| j.0)
}

// ---------------------------------------------------------------------------
// Visualize
// ---------------------------------------------------------------------------

/// Tints the gripper site by its distance to the cube.
#[allow(clippy::needless_pass_by_value)]
pub fn visualize_system(
    settings: Res<VisSettings>,
    handles: Option<Res<TaskHandles>>,
    bodies: Query<&Transform>,
    mut sites: Query<&mut SiteRgba, With<GripperSite>>,
) {
    if !settings.grippers {
        return;
    }
    let Some(handles) = handles else {
        return;
    };
    let (Ok(gripper), Ok(cube)) = (bodies.get(handles.gripper), bodies.get(handles.cube)) else {
        return;
    };
    if let Ok(mut rgba) = sites.get_mut(handles.gripper) {
        let [r, g, b] = gripper_tint(gripper.translation, cube.translation);
        rgba.0 = [r, g, b, rgba.0[3]];
    }
}

// ---------------------------------------------------------------------------
// LiftTaskPlugin
// ---------------------------------------------------------------------------

/// The randomized lift task.
///
/// Requires [`LiftCorePlugin`](liftrand_core::LiftCorePlugin) and
/// [`LiftEnvPlugin`](liftrand_env::LiftEnvPlugin). Insert a [`LiftTask`]
/// before adding the plugin to supply a custom placement sampler.
pub struct LiftTaskPlugin;

impl Plugin for LiftTaskPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<LiftTask>() {
            let config = app
                .world()
                .get_resource::<LiftConfig>()
                .cloned()
                .unwrap_or_default();
            app.insert_resource(LiftTask::new(config));
        }

        app.init_resource::<VisSettings>()
            .init_resource::<ResetRequest>()
            .init_resource::<JustReset>()
            .init_resource::<LastReward>()
            .configure_sets(Update, LiftSet::Evaluate.run_if(not_just_reset))
            .add_systems(Update, reset_request_system.in_set(LiftSet::Reset))
            .add_systems(
                Update,
                evaluate_system
                    .in_set(LiftSet::Evaluate)
                    .before(episode_step_system),
            )
            .add_systems(Update, visualize_system.in_set(LiftSet::Visualize));
    }
}
