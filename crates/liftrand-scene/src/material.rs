//! Texture and material assets for the table top and the cube.

use std::path::{Path, PathBuf};

pub const WHITE_TABLE_MATERIAL: &str = "white_table_mat";
pub const CEREAL_TABLE_MATERIAL: &str = "cereal_table_mat";
pub const CEREAL_TABLE_TEXTURE: &str = "tex-cereal-table";
pub const GLASS_CUBE_MATERIAL: &str = "glass_cube_mat";
pub const GLASS_CUBE_TEXTURE: &str = "glass_cube";

const CEREAL_FILE: &str = "cereal.png";
const GLASS_FILE: &str = "glass.png";

/// A 2D image texture asset.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub file: PathBuf,
    /// Base colour multiplied into the image, if any.
    pub rgb1: Option<[f32; 3]>,
}

/// A surface material, optionally backed by a texture.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub texture: Option<String>,
    pub rgba: Option<[f32; 4]>,
    pub reflectance: f32,
    pub specular: Option<f32>,
    pub shininess: Option<f32>,
    /// Texture tiling in u and v.
    pub texrepeat: Option<[f32; 2]>,
    /// Tile by world size instead of by object size.
    pub texuniform: bool,
}

impl Material {
    fn untextured(name: &str) -> Self {
        Self {
            name: name.into(),
            texture: None,
            rgba: None,
            reflectance: 0.0,
            specular: None,
            shininess: None,
            texrepeat: None,
            texuniform: false,
        }
    }
}

/// Which table-top look to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableSurface {
    /// Flat reflective white, no texture.
    White,
    /// Cereal-box image tiled 3x3.
    Cereal,
}

impl TableSurface {
    pub const fn from_flag(use_white_table_texture: bool) -> Self {
        if use_white_table_texture {
            Self::White
        } else {
            Self::Cereal
        }
    }

    /// Name of the material the table-top visual references.
    pub const fn material_name(self) -> &'static str {
        match self {
            Self::White => WHITE_TABLE_MATERIAL,
            Self::Cereal => CEREAL_TABLE_MATERIAL,
        }
    }

    /// Textures and materials this surface adds to the arena assets.
    pub fn assets(self, texture_dir: &Path) -> (Vec<Texture>, Vec<Material>) {
        match self {
            Self::White => {
                let material = Material {
                    reflectance: 0.5,
                    rgba: Some([1.0, 1.0, 1.0, 1.0]),
                    ..Material::untextured(WHITE_TABLE_MATERIAL)
                };
                (Vec::new(), vec![material])
            }
            Self::Cereal => {
                let texture = Texture {
                    name: CEREAL_TABLE_TEXTURE.into(),
                    file: texture_dir.join(CEREAL_FILE),
                    rgb1: Some([1.0, 1.0, 1.0]),
                };
                let material = Material {
                    texture: Some(CEREAL_TABLE_TEXTURE.into()),
                    reflectance: 0.5,
                    texrepeat: Some([3.0, 3.0]),
                    texuniform: true,
                    ..Material::untextured(CEREAL_TABLE_MATERIAL)
                };
                (vec![texture], vec![material])
            }
        }
    }
}

/// Glass-like texture and material applied to the cube.
pub fn glass_cube_assets(texture_dir: &Path) -> (Texture, Material) {
    let texture = Texture {
        name: GLASS_CUBE_TEXTURE.into(),
        file: texture_dir.join(GLASS_FILE),
        rgb1: None,
    };
    let material = Material {
        texture: Some(GLASS_CUBE_TEXTURE.into()),
        reflectance: 0.5,
        specular: Some(0.8),
        shininess: Some(0.8),
        texrepeat: Some([1.0, 1.0]),
        ..Material::untextured(GLASS_CUBE_MATERIAL)
    };
    (texture, material)
}
