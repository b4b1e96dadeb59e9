//! MJCF export of a [`SceneDescription`].
//!
//! Produces a standalone `<mujoco>` document holding the arena and cube
//! assets plus their bodies. Robot models are merged in by the host.

use std::io;

use bevy::math::Vec3;
use liftrand_core::error::SceneError;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::builder::SceneDescription;
use crate::material::{Material, Texture};
use crate::object::BoxObject;

/// Model name written on the root element.
pub const MODEL_NAME: &str = "lift_rand";

pub const TABLE_BODY: &str = "table";
pub const TABLE_COLLISION_GEOM: &str = "table_collision";
pub const TABLE_VISUAL_GEOM: &str = "table_visual";
pub const TABLE_TOP_SITE: &str = "table_top";

type Attrs = Vec<(&'static str, String)>;

/// Render the scene as an MJCF document.
pub fn to_mjcf(scene: &SceneDescription) -> Result<String, SceneError> {
    let mut w = MjcfWriter::new();

    w.open("mujoco", vec![("model", MODEL_NAME.into())])?;

    w.open("asset", Vec::new())?;
    for texture in scene.arena.textures.iter().chain([&scene.cube.texture]) {
        w.empty("texture", texture_attrs(texture))?;
    }
    for material in scene.arena.materials.iter().chain([&scene.cube.material]) {
        w.empty("material", material_attrs(material))?;
    }
    w.close("asset")?;

    w.open("worldbody", Vec::new())?;
    write_table(&mut w, scene)?;
    write_box(&mut w, &scene.cube)?;
    w.close("worldbody")?;

    w.close("mujoco")?;
    Ok(w.finish())
}

fn write_table(w: &mut MjcfWriter, scene: &SceneDescription) -> io::Result<()> {
    let arena = &scene.arena;
    let half = arena.half_size();

    w.open(
        "body",
        vec![
            ("name", TABLE_BODY.into()),
            ("pos", vec3(arena.table_body_pos())),
            ("quat", join(&arena.rotation.mjcf_components())),
        ],
    )?;
    w.empty(
        "geom",
        vec![
            ("name", TABLE_COLLISION_GEOM.into()),
            ("type", "box".into()),
            ("pos", "0 0 0".into()),
            ("size", vec3(half)),
            ("friction", vec3(arena.friction)),
            ("group", "0".into()),
        ],
    )?;
    w.empty(
        "geom",
        vec![
            ("name", TABLE_VISUAL_GEOM.into()),
            ("type", "box".into()),
            ("pos", "0 0 0".into()),
            ("size", vec3(half)),
            ("contype", "0".into()),
            ("conaffinity", "0".into()),
            ("group", "1".into()),
            ("material", arena.table_top_material().into()),
        ],
    )?;
    w.empty(
        "site",
        vec![
            ("name", TABLE_TOP_SITE.into()),
            ("pos", vec3(Vec3::new(0.0, 0.0, half.z))),
            ("size", "0.001 0.001 0.001".into()),
            ("rgba", "0 0 0 0".into()),
        ],
    )?;
    w.close("body")
}

fn write_box(w: &mut MjcfWriter, obj: &BoxObject) -> io::Result<()> {
    let size = vec3(obj.half_size);
    let rgba = join(&obj.rgba);

    w.open("body", vec![("name", obj.root_body())])?;
    w.empty(
        "joint",
        vec![
            ("name", obj.joint_name()),
            ("type", "free".into()),
            ("damping", "0.0005".into()),
        ],
    )?;
    w.empty(
        "geom",
        vec![
            ("name", format!("{}_g0", obj.name)),
            ("type", "box".into()),
            ("size", size.clone()),
            ("rgba", rgba.clone()),
            ("density", "1000".into()),
            ("friction", "1 0.005 0.0001".into()),
            ("solref", "0.02 1".into()),
            ("solimp", "0.9 0.95 0.001".into()),
            ("group", "0".into()),
        ],
    )?;
    w.empty(
        "geom",
        vec![
            ("name", format!("{}_g0_vis", obj.name)),
            ("type", "box".into()),
            ("size", size),
            ("rgba", rgba),
            ("material", obj.material.name.clone()),
            ("contype", "0".into()),
            ("conaffinity", "0".into()),
            ("group", "1".into()),
        ],
    )?;
    w.close("body")
}

fn texture_attrs(texture: &Texture) -> Attrs {
    let mut attrs: Attrs = vec![
        ("name", texture.name.clone()),
        ("type", "2d".into()),
        ("file", texture.file.display().to_string()),
    ];
    if let Some(rgb1) = texture.rgb1 {
        attrs.push(("rgb1", join(&rgb1)));
    }
    attrs
}

fn material_attrs(material: &Material) -> Attrs {
    let mut attrs: Attrs = vec![("name", material.name.clone())];
    if let Some(texture) = &material.texture {
        attrs.push(("texture", texture.clone()));
    }
    if let Some(rgba) = material.rgba {
        attrs.push(("rgba", join(&rgba)));
    }
    attrs.push(("reflectance", material.reflectance.to_string()));
    if let Some(specular) = material.specular {
        attrs.push(("specular", specular.to_string()));
    }
    if let Some(shininess) = material.shininess {
        attrs.push(("shininess", shininess.to_string()));
    }
    if let Some(repeat) = material.texrepeat {
        attrs.push(("texrepeat", join(&repeat)));
    }
    if material.texuniform {
        attrs.push(("texuniform", "true".into()));
    }
    attrs
}

fn join(values: &[f32]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn vec3(v: Vec3) -> String {
    join(&v.to_array())
}

// ---------------------------------------------------------------------------
// MjcfWriter
// ---------------------------------------------------------------------------

struct MjcfWriter {
    inner: Writer<Vec<u8>>,
}

impl MjcfWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn open(&mut self, tag: &str, attrs: Attrs) -> io::Result<()> {
        self.inner.write_event(Event::Start(element(tag, &attrs)))
    }

    fn empty(&mut self, tag: &str, attrs: Attrs) -> io::Result<()> {
        self.inner.write_event(Event::Empty(element(tag, &attrs)))
    }

    fn close(&mut self, tag: &str) -> io::Result<()> {
        self.inner.write_event(Event::End(BytesEnd::new(tag)))
    }

    fn finish(self) -> String {
        String::from_utf8_lossy(&self.inner.into_inner()).into_owned()
    }
}

fn element<'a>(tag: &'a str, attrs: &[(&'static str, String)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(tag);
    for (key, value) in attrs {
        start.push_attribute((*key, value.as_str()));
    }
    start
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_scene;
    use crate::material::{CEREAL_TABLE_MATERIAL, WHITE_TABLE_MATERIAL};
    use liftrand_core::config::LiftConfig;
    use liftrand_test_utils::seeded_rng;
    use quick_xml::Reader;

    /// Attributes of the first element named `name`.
    fn find_named(xml: &str, name: &str) -> Option<Vec<(String, String)>> {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Start(e) | Event::Empty(e)) => {
                    let attrs: Vec<(String, String)> = e
                        .attributes()
                        .map(|a| {
                            let a = a.unwrap();
                            (
                                String::from_utf8(a.key.as_ref().to_vec()).unwrap(),
                                String::from_utf8(a.value.to_vec()).unwrap(),
                            )
                        })
                        .collect();
                    if attrs.iter().any(|(k, v)| k == "name" && v == name) {
                        return Some(attrs);
                    }
                }
                Ok(Event::Eof) => return None,
                Ok(_) => {}
                Err(e) => panic!("bad xml: {e}"),
            }
        }
    }

    fn attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn table_visual_references_selected_material() {
        for (white, expected, other) in [
            (true, WHITE_TABLE_MATERIAL, CEREAL_TABLE_MATERIAL),
            (false, CEREAL_TABLE_MATERIAL, WHITE_TABLE_MATERIAL),
        ] {
            let cfg = LiftConfig::default().with_white_table(white);
            let xml = to_mjcf(&build_scene(&cfg, &mut seeded_rng(3)).unwrap()).unwrap();
            let visual = find_named(&xml, TABLE_VISUAL_GEOM).unwrap();
            assert_eq!(attr(&visual, "material"), Some(expected));
            assert!(find_named(&xml, expected).is_some());
            assert!(find_named(&xml, other).is_none());
        }
    }

    #[test]
    fn cube_body_and_joint_present() {
        let scene = build_scene(&LiftConfig::default(), &mut seeded_rng(0)).unwrap();
        let xml = to_mjcf(&scene).unwrap();
        assert!(find_named(&xml, "cube_main").is_some());
        let joint = find_named(&xml, "cube_joint0").unwrap();
        assert_eq!(attr(&joint, "type"), Some("free"));
        let vis = find_named(&xml, "cube_g0_vis").unwrap();
        assert_eq!(attr(&vis, "material"), Some("glass_cube_mat"));
    }

    #[test]
    fn table_quat_uses_mode_order() {
        let scene = build_scene(&LiftConfig::default(), &mut seeded_rng(8)).unwrap();
        let xml = to_mjcf(&scene).unwrap();
        let body = find_named(&xml, TABLE_BODY).unwrap();
        assert_eq!(
            attr(&body, "quat"),
            Some(join(&scene.arena.rotation.mjcf_components()).as_str())
        );
    }

    #[test]
    fn cereal_texture_tiles() {
        let scene = build_scene(&LiftConfig::default(), &mut seeded_rng(0)).unwrap();
        let xml = to_mjcf(&scene).unwrap();
        let mat = find_named(&xml, CEREAL_TABLE_MATERIAL).unwrap();
        assert_eq!(attr(&mat, "texrepeat"), Some("3 3"));
        assert_eq!(attr(&mat, "texuniform"), Some("true"));
        let tex = find_named(&xml, "tex-cereal-table").unwrap();
        assert_eq!(attr(&tex, "rgb1"), Some("1 1 1"));
    }
}
