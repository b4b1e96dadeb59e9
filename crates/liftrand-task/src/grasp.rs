use bevy::prelude::*;
use liftrand_core::components::GripperContacts;
use liftrand_core::traits::GraspDetector;

/// A grasp holds when both finger pads report contact with the object.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContactGraspDetector;

impl GraspDetector for ContactGraspDetector {
    fn is_grasping(&self, world: &World, gripper: Entity, object: Entity) -> bool {
        world.get::<GripperContacts>(gripper).is_some_and(|c| {
            c.left_pad.contains(&object) && c.right_pad.contains(&object)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_both_pads() {
        let mut world = World::new();
        let cube = world.spawn_empty().id();
        let gripper = world
            .spawn(GripperContacts {
                left_pad: vec![cube],
                right_pad: Vec::new(),
            })
            .id();
        assert!(!ContactGraspDetector.is_grasping(&world, gripper, cube));

        world
            .get_mut::<GripperContacts>(gripper)
            .unwrap()
            .right_pad
            .push(cube);
        assert!(ContactGraspDetector.is_grasping(&world, gripper, cube));
    }

    #[test]
    fn missing_contacts_is_no_grasp() {
        let mut world = World::new();
        let cube = world.spawn_empty().id();
        let gripper = world.spawn_empty().id();
        assert!(!ContactGraspDetector.is_grasping(&world, gripper, cube));
    }
}
