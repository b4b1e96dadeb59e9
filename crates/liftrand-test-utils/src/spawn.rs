//! Helpers for spawning host bodies in test worlds.

use bevy::prelude::*;
use liftrand_core::components::{
    FreeJoint, GeomVisual, GripperContacts, GripperSite, Manipulandum, SiteRgba,
};
use liftrand_core::types::Pose;

/// Spawn a cube body named `cube` at `position` with a matching free joint.
pub fn spawn_cube(world: &mut World, position: Vec3) -> Entity {
    let pose = Pose::new(position, Quat::IDENTITY);
    world
        .spawn((
            Manipulandum::new("cube"),
            FreeJoint::from_pose(&pose),
            Transform::from_translation(position),
        ))
        .id()
}

/// Spawn a single-arm gripper site at `position` with empty contacts.
pub fn spawn_gripper(world: &mut World, position: Vec3) -> Entity {
    world
        .spawn((
            GripperSite::default(),
            GripperContacts::default(),
            SiteRgba::default(),
            Transform::from_translation(position),
        ))
        .id()
}

/// Spawn the robot mount and first-link visual geoms plus one unrelated geom.
///
/// Returns every spawned entity; the last one is the unrelated geom.
pub fn spawn_robot_base_geoms(world: &mut World) -> Vec<Entity> {
    let mut names: Vec<String> = vec![
        "fixed_mount0_torso_vis".into(),
        "fixed_mount0_pedestal_vis".into(),
    ];
    names.extend((0..12).map(|i| format!("robot0_g{i}_vis")));
    names.push("robot0_link1_vis".into());
    names
        .into_iter()
        .map(|name| {
            world
                .spawn(GeomVisual {
                    name,
                    group: 1,
                    rgba: [0.5, 0.5, 0.5, 1.0],
                })
                .id()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_cube_sets_transform_and_joint() {
        let mut world = World::new();
        let cube = spawn_cube(&mut world, Vec3::new(0.0, 0.0, 0.82));
        let t = world.get::<Transform>(cube).unwrap();
        assert!((t.translation.z - 0.82).abs() < f32::EPSILON);
        let joint = world.get::<FreeJoint>(cube).unwrap();
        assert!((joint.qpos[2] - 0.82).abs() < f32::EPSILON);
    }

    #[test]
    fn spawn_robot_base_geoms_count() {
        let mut world = World::new();
        assert_eq!(spawn_robot_base_geoms(&mut world).len(), 15);
    }
}
