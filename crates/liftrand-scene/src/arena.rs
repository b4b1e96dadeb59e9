//! Table-top arena description.

use bevy::math::{Quat, Vec3};
use liftrand_core::config::TableRotationMode;

use crate::material::{Material, TableSurface, Texture};

/// Nominal table length the robot mount is positioned for, independent of
/// the configured table size.
pub const ROBOT_MOUNT_TABLE_LENGTH: f32 = 0.8;

/// The random rotation applied to the table body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableRotation {
    /// Drawn angle in `[0, 2π)`.
    pub angle: f32,
    pub mode: TableRotationMode,
    pub quat: Quat,
}

impl TableRotation {
    /// Components of the MJCF `quat` attribute, in the order they are written.
    ///
    /// `Legacy` emits `x y z w`, which MuJoCo reads as `w x y z`.
    pub fn mjcf_components(&self) -> [f32; 4] {
        let q = self.quat;
        match self.mode {
            TableRotationMode::Legacy => [q.x, q.y, q.z, q.w],
            TableRotationMode::Vertical => [q.w, q.x, q.y, q.z],
        }
    }
}

/// A table arena: one box table whose top centre sits at `offset`.
#[derive(Clone, Debug, PartialEq)]
pub struct TableArena {
    pub full_size: Vec3,
    pub friction: Vec3,
    /// Table-top centre after the random horizontal shift.
    pub offset: Vec3,
    pub rotation: TableRotation,
    pub surface: TableSurface,
    pub textures: Vec<Texture>,
    pub materials: Vec<Material>,
}

impl TableArena {
    pub fn half_size(&self) -> Vec3 {
        self.full_size / 2.0
    }

    /// Table body origin: the top centre lowered by half the thickness.
    pub fn table_body_pos(&self) -> Vec3 {
        self.offset - Vec3::new(0.0, 0.0, self.half_size().z)
    }

    /// Height of the table surface.
    pub fn table_top_height(&self) -> f32 {
        self.offset.z
    }

    /// Material referenced by the table-top visual geom.
    pub fn table_top_material(&self) -> &'static str {
        self.surface.material_name()
    }

    /// The arena is always assembled at the world origin.
    pub const fn origin(&self) -> Vec3 {
        Vec3::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> TableArena {
        TableArena {
            full_size: Vec3::new(10.0, 10.0, 0.05),
            friction: Vec3::new(1.0, 5e-3, 1e-4),
            offset: Vec3::new(0.1, -0.2, 0.8),
            rotation: TableRotation {
                angle: 0.0,
                mode: TableRotationMode::Legacy,
                quat: Quat::IDENTITY,
            },
            surface: TableSurface::White,
            textures: Vec::new(),
            materials: Vec::new(),
        }
    }

    #[test]
    fn body_sits_half_thickness_below_top() {
        let a = arena();
        let pos = a.table_body_pos();
        assert!((pos.z - 0.775).abs() < 1e-6);
        assert!((pos.x - 0.1).abs() < f32::EPSILON);
        assert!((a.table_top_height() - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn origin_is_zero() {
        assert_eq!(arena().origin(), Vec3::ZERO);
    }

    #[test]
    fn legacy_components_are_scalar_last() {
        let rot = TableRotation {
            angle: 1.0,
            mode: TableRotationMode::Legacy,
            quat: Quat::from_xyzw(0.1, 0.2, 0.3, 0.9),
        };
        assert_eq!(rot.mjcf_components(), [0.1, 0.2, 0.3, 0.9]);
        let vertical = TableRotation {
            mode: TableRotationMode::Vertical,
            ..rot
        };
        assert_eq!(vertical.mjcf_components(), [0.9, 0.1, 0.2, 0.3]);
    }
}
