//! Bevy systems for state propagation, observation collection and episode
//! lifecycle.

use bevy::prelude::*;
use liftrand_core::components::FreeJoint;
use liftrand_core::config::LiftConfig;

use crate::buffer::ObservationBuffer;
use crate::episode::{Episode, EpisodeConfig};
use crate::observables::ObservableRegistry;

// ---------------------------------------------------------------------------
// Step outputs
// ---------------------------------------------------------------------------

/// Reward for the current step.
///
/// Written by the task each step; consumed by [`episode_step_system`].
#[derive(Resource, Clone, Debug, Default)]
pub struct StepReward(pub f32);

/// Whether the task held on the current step.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepSuccess(pub bool);

// ---------------------------------------------------------------------------
// forward_system
// ---------------------------------------------------------------------------

/// Copies changed free-joint state onto body transforms.
///
/// Runs in [`LiftSet::Forward`](liftrand_core::LiftSet::Forward).
pub fn forward_system(mut bodies: Query<(&FreeJoint, &mut Transform), Changed<FreeJoint>>) {
    for (joint, mut transform) in &mut bodies {
        let pose = joint.pose();
        transform.translation = pose.position;
        transform.rotation = pose.orientation;
    }
}

// ---------------------------------------------------------------------------
// observe_system
// ---------------------------------------------------------------------------

/// Exclusive system that samples registered observables into the buffer.
///
/// Runs in [`LiftSet::Observe`](liftrand_core::LiftSet::Observe). The
/// registry and buffer are taken out of the world while observables read it.
pub fn observe_system(world: &mut World) {
    let dt = world
        .get_resource::<LiftConfig>()
        .map_or(1.0 / 20.0, |c| 1.0 / c.env.control_freq);
    let Some(mut registry) = world.remove_resource::<ObservableRegistry>() else {
        return;
    };
    let Some(mut buffer) = world.remove_resource::<ObservationBuffer>() else {
        world.insert_resource(registry);
        return;
    };

    registry.sample(world, &mut buffer, dt);

    world.insert_resource(buffer);
    world.insert_resource(registry);
}

// ---------------------------------------------------------------------------
// episode_step_system
// ---------------------------------------------------------------------------

/// Advances the episode by one step and checks the horizon.
///
/// Runs in [`LiftSet::Evaluate`](liftrand_core::LiftSet::Evaluate), after the
/// task has written [`StepReward`] and [`StepSuccess`].
#[allow(clippy::needless_pass_by_value)]
pub fn episode_step_system(
    mut episode: ResMut<Episode>,
    config: Res<EpisodeConfig>,
    mut reward: ResMut<StepReward>,
    success: Res<StepSuccess>,
) {
    if episode.is_running() {
        episode.advance(reward.0, success.0);
        if episode.check_truncation(&config) {
            info!(
                "episode {} truncated after {} steps (return {:.3}, {} success steps)",
                episode.episode_number, episode.step_count, episode.total_reward, episode.success_steps
            );
        }
        reward.0 = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observables::{CubePosition, GripperToCube};
    use liftrand_core::types::Pose;
    use liftrand_core::{LiftCorePlugin, LiftSet};

    fn build_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(LiftCorePlugin);
        app.init_resource::<Episode>();
        app.init_resource::<EpisodeConfig>();
        app.init_resource::<ObservationBuffer>();
        app.init_resource::<ObservableRegistry>();
        app.init_resource::<StepReward>();
        app.init_resource::<StepSuccess>();
        app.add_systems(Update, forward_system.in_set(LiftSet::Forward));
        app.add_systems(Update, observe_system.in_set(LiftSet::Observe));
        app.add_systems(Update, episode_step_system.in_set(LiftSet::Evaluate));
        app.finish();
        app.cleanup();
        app
    }

    fn register(app: &mut App, observable: Box<dyn liftrand_core::traits::Observable>) {
        let world = app.world_mut();
        let mut registry = world.remove_resource::<ObservableRegistry>().unwrap();
        let mut buffer = world.remove_resource::<ObservationBuffer>().unwrap();
        registry.register(observable, &mut buffer);
        world.insert_resource(buffer);
        world.insert_resource(registry);
    }

    #[test]
    fn forward_moves_body_to_joint_pose() {
        let mut app = build_test_app();
        let pose = Pose::new(Vec3::new(0.1, 0.0, 0.83), Quat::from_rotation_z(1.0));
        let cube = app
            .world_mut()
            .spawn((FreeJoint::from_pose(&pose), Transform::default()))
            .id();
        app.update();
        let t = app.world().get::<Transform>(cube).unwrap();
        assert!((t.translation - pose.position).length() < 1e-6);
        assert!(t.rotation.dot(pose.orientation).abs() > 1.0 - 1e-6);
    }

    #[test]
    fn observe_after_forward_sees_new_pose() {
        let mut app = build_test_app();
        let cube = app
            .world_mut()
            .spawn((FreeJoint::default(), Transform::default()))
            .id();
        let gripper = app.world_mut().spawn(Transform::from_xyz(0.0, 0.0, 1.0)).id();
        register(&mut app, Box::new(CubePosition::new(cube, 20.0)));
        register(&mut app, Box::new(GripperToCube::new(gripper, cube, 20.0)));

        app.world_mut().get_mut::<FreeJoint>(cube).unwrap().qpos =
            Pose::new(Vec3::new(0.2, 0.1, 0.9), Quat::IDENTITY).to_qpos();
        app.update();

        let buffer = app.world().resource::<ObservationBuffer>();
        assert_eq!(buffer.get("cube_pos"), Some(&[0.2, 0.1, 0.9][..]));
        let rel = buffer.get("gripper_to_cube_pos").unwrap();
        assert!((rel[2] + 0.1).abs() < 1e-6);
    }

    #[test]
    fn observe_handles_empty_registry() {
        let mut app = build_test_app();
        app.update();
        assert_eq!(app.world().resource::<ObservationBuffer>().dim(), 0);
    }

    #[test]
    fn episode_step_accumulates_and_consumes_reward() {
        let mut app = build_test_app();
        app.world_mut().resource_mut::<Episode>().reset(None);
        app.world_mut().resource_mut::<StepReward>().0 = 1.0;
        app.world_mut().resource_mut::<StepSuccess>().0 = true;

        app.update();

        let ep = app.world().resource::<Episode>();
        assert_eq!(ep.step_count, 1);
        assert_eq!(ep.success_steps, 1);
        assert!((ep.total_reward - 1.0).abs() < f32::EPSILON);
        assert!(app.world().resource::<StepReward>().0.abs() < f32::EPSILON);
    }

    #[test]
    fn success_does_not_end_episode() {
        let mut app = build_test_app();
        app.world_mut().resource_mut::<Episode>().reset(None);
        app.world_mut().resource_mut::<StepSuccess>().0 = true;
        for _ in 0..5 {
            app.update();
        }
        let ep = app.world().resource::<Episode>();
        assert!(ep.is_running());
        assert_eq!(ep.success_steps, 5);
    }

    #[test]
    fn episode_truncates_at_horizon() {
        let mut app = build_test_app();
        app.world_mut().resource_mut::<EpisodeConfig>().horizon = 3;
        app.world_mut().resource_mut::<Episode>().reset(None);
        for _ in 0..5 {
            app.update();
        }
        let ep = app.world().resource::<Episode>();
        assert!(ep.is_done());
        assert_eq!(ep.step_count, 3);
    }

    #[test]
    fn idle_episode_does_not_advance() {
        let mut app = build_test_app();
        app.world_mut().resource_mut::<StepReward>().0 = 10.0;
        app.update();
        assert_eq!(app.world().resource::<Episode>().step_count, 0);
    }
}
