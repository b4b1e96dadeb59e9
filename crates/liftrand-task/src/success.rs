//! Lift success: the cube is more than [`LIFT_MARGIN`] above the table top.

use bevy::prelude::*;
use liftrand_core::components::TableTop;
use liftrand_core::traits::SuccessCriterion;

/// Height above the table surface the cube must exceed.
pub const LIFT_MARGIN: f32 = 0.04;

/// Strict comparison: a cube exactly at the margin is not lifted.
pub fn is_lifted(cube_z: f32, table_z: f32) -> bool {
    cube_z > table_z + LIFT_MARGIN
}

/// Reads the cube transform and the stored [`TableTop`] height.
///
/// A missing cube or table height never counts as success.
pub struct LiftSuccess {
    pub cube: Entity,
}

impl SuccessCriterion for LiftSuccess {
    fn is_success(&self, world: &World) -> bool {
        let Some(cube) = world.get::<Transform>(self.cube) else {
            return false;
        };
        let Some(table) = world.get_resource::<TableTop>() else {
            return false;
        };
        is_lifted(cube.translation.z, table.height)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "LiftSuccess"
    }
}
