//! Hides the robot mount and first link so the cube stays visible to cameras.

use bevy::prelude::*;
use liftrand_core::components::GeomVisual;

/// Visual-only geom group.
pub const VISUAL_GROUP: u8 = 1;

const MOUNT_GEOMS: [&str; 2] = ["fixed_mount0_torso_vis", "fixed_mount0_pedestal_vis"];
const FIRST_LINK_GEOMS: usize = 12;

/// Whether `name` is one of the hidden mount or first-link visuals.
pub fn is_hidden_geom(name: &str) -> bool {
    if MOUNT_GEOMS.contains(&name) {
        return true;
    }
    name.strip_prefix("robot0_g")
        .and_then(|rest| rest.strip_suffix("_vis"))
        .and_then(first_link_index)
        .is_some_and(|i| i < FIRST_LINK_GEOMS)
}

/// Plain decimal index without sign or leading zeros.
fn first_link_index(digits: &str) -> Option<usize> {
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'));
    if canonical { digits.parse().ok() } else { None }
}

/// Set alpha to zero on every matching group-1 geom. Returns how many changed.
pub fn make_robot_base_transparent(world: &mut World) -> usize {
    let mut query = world.query::<&mut GeomVisual>();
    let mut hidden = 0;
    for mut geom in query.iter_mut(world) {
        if geom.group == VISUAL_GROUP && is_hidden_geom(&geom.name) {
            geom.rgba[3] = 0.0;
            hidden += 1;
        }
    }
    hidden
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftrand_test_utils::spawn_robot_base_geoms;

    #[test]
    fn name_matching() {
        assert!(is_hidden_geom("fixed_mount0_torso_vis"));
        assert!(is_hidden_geom("robot0_g0_vis"));
        assert!(is_hidden_geom("robot0_g11_vis"));
        assert!(!is_hidden_geom("robot0_g12_vis"));
        assert!(!is_hidden_geom("robot0_link1_vis"));
        assert!(!is_hidden_geom("robot0_g1_col"));
        assert!(!is_hidden_geom("robot0_g01_vis"));
        assert!(!is_hidden_geom("robot0_g+1_vis"));
        assert!(!is_hidden_geom("robot0_g_vis"));
        assert!(!is_hidden_geom("robot0_g99999999999999999999999_vis"));
    }

    #[test]
    fn hides_only_listed_visual_geoms() {
        let mut world = World::new();
        let geoms = spawn_robot_base_geoms(&mut world);
        let collision = world
            .spawn(GeomVisual {
                name: "robot0_g0_vis".into(),
                group: 0,
                rgba: [1.0; 4],
            })
            .id();

        assert_eq!(make_robot_base_transparent(&mut world), 14);

        for &e in &geoms[..14] {
            assert!(world.get::<GeomVisual>(e).unwrap().rgba[3].abs() < f32::EPSILON);
        }
        let unrelated = world.get::<GeomVisual>(geoms[14]).unwrap();
        assert!((unrelated.rgba[3] - 1.0).abs() < f32::EPSILON);
        let other_group = world.get::<GeomVisual>(collision).unwrap();
        assert!((other_group.rgba[3] - 1.0).abs() < f32::EPSILON);
    }
}
