//! Box-shaped manipulable object with randomized half-extents.

use bevy::math::Vec3;
use liftrand_core::error::SceneError;
use rand::Rng;

use crate::material::{Material, Texture};

/// A free-floating box body.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxObject {
    pub name: String,
    /// Half-extents along x, y, z.
    pub half_size: Vec3,
    pub rgba: [f32; 4],
    pub material: Material,
    pub texture: Texture,
}

impl BoxObject {
    /// Build a box whose half-extents are drawn independently per axis from
    /// `[size_min[i], size_max[i]]`.
    pub fn sample<R: Rng + ?Sized>(
        name: impl Into<String>,
        size_min: [f32; 3],
        size_max: [f32; 3],
        rgba: [f32; 4],
        (texture, material): (Texture, Material),
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        let mut half = [0.0_f32; 3];
        for axis in 0..3 {
            let (min, max) = (size_min[axis], size_max[axis]);
            if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
                return Err(SceneError::InvalidSizeBounds { axis, min, max });
            }
            half[axis] = rng.gen_range(min..=max);
        }
        Ok(Self {
            name: name.into(),
            half_size: Vec3::from_array(half),
            rgba,
            material,
            texture,
        })
    }

    /// Radius of the footprint circle in the horizontal plane.
    pub fn horizontal_radius(&self) -> f32 {
        self.half_size.truncate().length()
    }

    /// Offset from the body origin to its lowest point.
    pub fn bottom_offset(&self) -> f32 {
        -self.half_size.z
    }

    /// Offset from the body origin to its highest point.
    pub fn top_offset(&self) -> f32 {
        self.half_size.z
    }

    pub fn root_body(&self) -> String {
        format!("{}_main", self.name)
    }

    pub fn joint_name(&self) -> String {
        format!("{}_joint0", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::glass_cube_assets;
    use liftrand_test_utils::seeded_rng;
    use std::path::Path;

    fn cube(min: [f32; 3], max: [f32; 3], seed: u64) -> Result<BoxObject, SceneError> {
        BoxObject::sample(
            "cube",
            min,
            max,
            [0.0, 1.0, 0.0, 1.0],
            glass_cube_assets(Path::new("t")),
            &mut seeded_rng(seed),
        )
    }

    #[test]
    fn half_extents_within_bounds_per_axis() {
        for seed in 0..200 {
            let c = cube([0.020; 3], [0.022; 3], seed).unwrap();
            for v in c.half_size.to_array() {
                assert!((0.020..=0.022).contains(&v), "got {v}");
            }
        }
    }

    #[test]
    fn axes_drawn_independently() {
        let c = cube([0.01; 3], [0.05; 3], 3).unwrap();
        let [x, y, z] = c.half_size.to_array();
        assert!((x - y).abs() > f32::EPSILON || (y - z).abs() > f32::EPSILON);
    }

    #[test]
    fn degenerate_bounds_give_fixed_size() {
        let c = cube([0.02, 0.03, 0.04], [0.02, 0.03, 0.04], 9).unwrap();
        assert_eq!(c.half_size, Vec3::new(0.02, 0.03, 0.04));
    }

    #[test]
    fn inverted_bounds_rejected() {
        let err = cube([0.02, 0.03, 0.02], [0.022, 0.02, 0.022], 0).unwrap_err();
        assert!(matches!(err, SceneError::InvalidSizeBounds { axis: 1, .. }));
    }

    #[test]
    fn geometry_helpers() {
        let c = cube([0.03, 0.04, 0.02], [0.03, 0.04, 0.02], 0).unwrap();
        assert!((c.horizontal_radius() - 0.05).abs() < 1e-6);
        assert!((c.bottom_offset() + 0.02).abs() < f32::EPSILON);
        assert!((c.top_offset() - 0.02).abs() < f32::EPSILON);
        assert_eq!(c.root_body(), "cube_main");
        assert_eq!(c.joint_name(), "cube_joint0");
    }
}
