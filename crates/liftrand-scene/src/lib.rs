//! liftrand-scene: randomized table arena, cube object, MJCF export and
//! object placement sampling.
//!
//! Everything here is pure: functions take an explicit RNG and return plain
//! data, so scenes and placements are reproducible from a seed.

pub mod arena;
pub mod builder;
pub mod material;
pub mod mjcf;
pub mod object;
pub mod placement;

pub use builder::{CUBE_NAME, SceneDescription, build_scene};
pub use mjcf::to_mjcf;

pub mod prelude {
    pub use crate::{
        arena::{ROBOT_MOUNT_TABLE_LENGTH, TableArena, TableRotation},
        builder::{CUBE_NAME, SceneDescription, build_scene},
        material::{Material, TableSurface, Texture},
        mjcf::to_mjcf,
        object::BoxObject,
        placement::{
            ObjectPlacements, PlaceableObject, Placement, PlacementSampler, UniformRandomSampler,
            configure_placement_initializer,
        },
    };
}
