//! Pure scene construction.
//!
//! [`build_scene`] turns a [`LiftConfig`] and an RNG into an immutable
//! [`SceneDescription`]. Draw order is fixed (shift x, shift y, rotation,
//! cube x/y/z) so a seed always reproduces the same scene.
//!
//! # Example
//!
//! ```
//! use liftrand_core::config::LiftConfig;
//! use liftrand_scene::build_scene;
//! let mut rng = liftrand_test_utils::seeded_rng(7);
//! let scene = build_scene(&LiftConfig::default(), &mut rng).unwrap();
//! assert_eq!(scene.arena.offset.z, 0.8);
//! ```

use std::f32::consts::TAU;

use bevy::log::debug;
use bevy::math::{Quat, Vec3};
use liftrand_core::config::{LiftConfig, TableConfig, TableRotationMode};
use liftrand_core::error::SceneError;
use liftrand_core::types::{Axis, axis_angle_to_quat};
use rand::Rng;

use crate::arena::{ROBOT_MOUNT_TABLE_LENGTH, TableArena, TableRotation};
use crate::material::{TableSurface, glass_cube_assets};
use crate::object::BoxObject;

/// Name of the manipulated cube.
pub const CUBE_NAME: &str = "cube";

/// Everything the host scene assembler needs for one model load.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDescription {
    pub arena: TableArena,
    pub cube: BoxObject,
    /// Table length the robot mount is positioned for.
    pub robot_mount_table_length: f32,
}

impl SceneDescription {
    /// Reference point for object placement: the shifted table-top centre.
    pub fn placement_reference(&self) -> Vec3 {
        self.arena.offset
    }

    pub fn table_height(&self) -> f32 {
        self.arena.table_top_height()
    }
}

/// Build a randomized scene.
pub fn build_scene<R: Rng + ?Sized>(
    config: &LiftConfig,
    rng: &mut R,
) -> Result<SceneDescription, SceneError> {
    let offset = sample_table_offset(&config.table, rng)?;
    let rotation = sample_table_rotation(config.table.rotation_mode, rng);

    let surface = TableSurface::from_flag(config.appearance.use_white_table_texture);
    let (textures, materials) = surface.assets(&config.appearance.texture_dir);

    let arena = TableArena {
        full_size: Vec3::from_array(config.table.full_size),
        friction: Vec3::from_array(config.table.friction),
        offset,
        rotation,
        surface,
        textures,
        materials,
    };

    let cube = BoxObject::sample(
        CUBE_NAME,
        config.cube.size_min,
        config.cube.size_max,
        config.cube.rgba,
        glass_cube_assets(&config.appearance.texture_dir),
        rng,
    )?;

    debug!(
        "built scene: table offset {:?}, rotation {:.3} rad, cube half-size {:?}",
        arena.offset, arena.rotation.angle, cube.half_size
    );

    Ok(SceneDescription {
        arena,
        cube,
        robot_mount_table_length: ROBOT_MOUNT_TABLE_LENGTH,
    })
}

/// Base offset shifted by independent uniform draws in x and y.
///
/// The z component is copied from the base offset untouched.
pub fn sample_table_offset<R: Rng + ?Sized>(
    table: &TableConfig,
    rng: &mut R,
) -> Result<Vec3, SceneError> {
    let base = Vec3::from_array(table.base_offset);
    if !base.is_finite() {
        return Err(SceneError::NonFinite("table.base_offset"));
    }
    if !(2.0 * table.max_shift).is_finite() {
        return Err(SceneError::NonFinite("table.max_shift"));
    }
    let (dx, dy) = if table.max_shift > 0.0 {
        (
            rng.gen_range(-table.max_shift..table.max_shift),
            rng.gen_range(-table.max_shift..table.max_shift),
        )
    } else {
        (0.0, 0.0)
    };
    Ok(Vec3::new(base.x + dx, base.y + dy, base.z))
}

/// Draw an angle in `[0, 2π)` and encode it per `mode`.
///
/// `Legacy` places the angle in the first axis-angle component, which is a
/// rotation about x rather than the vertical axis.
pub fn sample_table_rotation<R: Rng + ?Sized>(
    mode: TableRotationMode,
    rng: &mut R,
) -> TableRotation {
    let angle = rng.gen_range(0.0..TAU);
    let quat: Quat = match mode {
        TableRotationMode::Legacy => axis_angle_to_quat(Vec3::new(angle, 0.0, 0.0)),
        TableRotationMode::Vertical => Axis::Z.rotation(angle),
    };
    TableRotation { angle, mode, quat }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
