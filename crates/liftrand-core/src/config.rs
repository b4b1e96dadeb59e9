use std::path::PathBuf;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Axis;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_table_full_size() -> [f32; 3] {
    [10.0, 10.0, 0.05]
}
const fn default_table_friction() -> [f32; 3] {
    [1.0, 5e-3, 1e-4]
}
const fn default_table_offset() -> [f32; 3] {
    [0.0, 0.0, 0.8]
}
const fn default_table_shift() -> f32 {
    0.5
}
const fn default_cube_size_min() -> [f32; 3] {
    [0.020, 0.020, 0.020]
}
const fn default_cube_size_max() -> [f32; 3] {
    [0.022, 0.022, 0.022]
}
const fn default_cube_rgba() -> [f32; 4] {
    [0.0, 1.0, 0.0, 1.0]
}
fn default_texture_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TEXTURE_DIR)
}
const fn default_placement_range() -> [f32; 2] {
    [-0.2, 0.2]
}
const fn default_z_offset() -> f32 {
    0.01
}
const fn default_true() -> bool {
    true
}
const fn default_max_attempts() -> u32 {
    5000
}
#[allow(clippy::unnecessary_wraps)]
const fn default_reward_scale() -> Option<f32> {
    Some(1.0)
}
const fn default_control_freq() -> f32 {
    20.0
}
const fn default_horizon() -> u32 {
    1000
}

/// Texture directory the task was first authored against.
///
/// Absolute and machine-specific; override `appearance.texture_dir` to run
/// anywhere else.
pub const DEFAULT_TEXTURE_DIR: &str =
    "/home/tianchongj/workspace/script_robosuite_demos/robosuite_source/robosuite/models/assets/textures";

// ---------------------------------------------------------------------------
// TableConfig
// ---------------------------------------------------------------------------

/// How the random table rotation is encoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRotationMode {
    /// Axis-angle `(theta, 0, 0)`, quaternion written as `x y z w`.
    #[default]
    Legacy,
    /// Rotation about the vertical axis, quaternion written as `w x y z`.
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Full table dimensions `[x, y, z]`.
    #[serde(default = "default_table_full_size")]
    pub full_size: [f32; 3],
    /// Sliding, torsional and rolling friction.
    #[serde(default = "default_table_friction")]
    pub friction: [f32; 3],
    /// Table-top centre before randomization. The z component is never randomized.
    #[serde(default = "default_table_offset")]
    pub base_offset: [f32; 3],
    /// Half-range of the uniform horizontal shift applied in x and y.
    #[serde(default = "default_table_shift")]
    pub max_shift: f32,
    #[serde(default)]
    pub rotation_mode: TableRotationMode,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            full_size: default_table_full_size(),
            friction: default_table_friction(),
            base_offset: default_table_offset(),
            max_shift: default_table_shift(),
            rotation_mode: TableRotationMode::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// CubeConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeConfig {
    /// Lower half-extent bound per axis.
    #[serde(default = "default_cube_size_min")]
    pub size_min: [f32; 3],
    /// Upper half-extent bound per axis.
    #[serde(default = "default_cube_size_max")]
    pub size_max: [f32; 3],
    #[serde(default = "default_cube_rgba")]
    pub rgba: [f32; 4],
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            size_min: default_cube_size_min(),
            size_max: default_cube_size_max(),
            rgba: default_cube_rgba(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppearanceConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearanceConfig {
    /// Flat white table top instead of the tiled cereal texture.
    #[serde(default)]
    pub use_white_table_texture: bool,
    /// Directory holding `cereal.png` and `glass.png`.
    #[serde(default = "default_texture_dir")]
    pub texture_dir: PathBuf,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            use_white_table_texture: false,
            texture_dir: default_texture_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// PlacementConfig
// ---------------------------------------------------------------------------

/// Rotation applied to each sampled placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationSpec {
    /// Uniform over a full turn.
    #[default]
    Free,
    /// Always this angle, radians.
    Fixed(f32),
    /// Uniform over `[low, high)`, radians.
    Range([f32; 2]),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// x range relative to the reference position.
    #[serde(default = "default_placement_range")]
    pub x_range: [f32; 2],
    /// y range relative to the reference position.
    #[serde(default = "default_placement_range")]
    pub y_range: [f32; 2],
    /// Clearance above the reference height.
    #[serde(default = "default_z_offset")]
    pub z_offset: f32,
    #[serde(default)]
    pub rotation: RotationSpec,
    #[serde(default)]
    pub rotation_axis: Axis,
    /// Shrink the region so the whole footprint stays inside it.
    #[serde(default)]
    pub ensure_object_boundary_in_range: bool,
    /// Reject samples overlapping already placed objects.
    #[serde(default = "default_true")]
    pub ensure_valid_placement: bool,
    /// Attempts per object before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            x_range: default_placement_range(),
            y_range: default_placement_range(),
            z_offset: default_z_offset(),
            rotation: RotationSpec::Free,
            rotation_axis: Axis::Z,
            ensure_object_boundary_in_range: false,
            ensure_valid_placement: true,
            max_attempts: default_max_attempts(),
        }
    }
}

// ---------------------------------------------------------------------------
// RewardConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Normalizes the reward so the sparse maximum equals this value.
    /// `None` leaves the reward unnormalized.
    #[serde(default = "default_reward_scale")]
    pub reward_scale: Option<f32>,
    /// Add reaching and grasping shaping terms.
    #[serde(default)]
    pub reward_shaping: bool,
    /// Add the documented `{0, 1}` lifting term to the shaped sum.
    #[serde(default)]
    pub include_lifting_term: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            reward_scale: default_reward_scale(),
            reward_shaping: false,
            include_lifting_term: false,
        }
    }
}

// ---------------------------------------------------------------------------
// EnvConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Register cube observables.
    #[serde(default = "default_true")]
    pub use_object_obs: bool,
    /// Control steps per second; observables sample at this rate.
    #[serde(default = "default_control_freq")]
    pub control_freq: f32,
    /// Steps per episode.
    #[serde(default = "default_horizon")]
    pub horizon: u32,
    /// Never truncate at the horizon.
    #[serde(default)]
    pub ignore_done: bool,
    /// Rebuild the scene on every reset.
    #[serde(default = "default_true")]
    pub hard_reset: bool,
    /// Keep object poses on reset instead of re-sampling them.
    #[serde(default)]
    pub deterministic_reset: bool,
    /// Root seed for all randomized draws.
    #[serde(default)]
    pub seed: u64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            use_object_obs: true,
            control_freq: default_control_freq(),
            horizon: default_horizon(),
            ignore_done: false,
            hard_reset: true,
            deterministic_reset: false,
            seed: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// LiftConfig
// ---------------------------------------------------------------------------

/// Complete lift task configuration loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Resource)]
pub struct LiftConfig {
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub cube: CubeConfig,
    #[serde(default)]
    pub appearance: AppearanceConfig,
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub reward: RewardConfig,
    #[serde(default)]
    pub env: EnvConfig,
}

impl LiftConfig {
    /// Validate configuration. Returns Err on the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, &size) in self.table.full_size.iter().enumerate() {
            if !size.is_finite() || size <= 0.0 {
                return Err(invalid(
                    format!("table.full_size[{axis}]"),
                    format!("must be > 0, got {size}"),
                ));
            }
        }
        if !self.table.max_shift.is_finite() || self.table.max_shift < 0.0 {
            return Err(invalid("table.max_shift", "must be >= 0"));
        }
        if !(2.0 * self.table.max_shift).is_finite() {
            return Err(invalid("table.max_shift", "shift span overflows f32"));
        }
        for axis in 0..3 {
            let (low, high) = (self.cube.size_min[axis], self.cube.size_max[axis]);
            if !low.is_finite() || low <= 0.0 {
                return Err(invalid(
                    format!("cube.size_min[{axis}]"),
                    format!("must be > 0, got {low}"),
                ));
            }
            check_range(&format!("cube.size[{axis}]"), low, high)?;
        }
        check_range("placement.x_range", self.placement.x_range[0], self.placement.x_range[1])?;
        check_range("placement.y_range", self.placement.y_range[0], self.placement.y_range[1])?;
        if let RotationSpec::Range([low, high]) = self.placement.rotation {
            check_range("placement.rotation", low, high)?;
        }
        if self.placement.max_attempts == 0 {
            return Err(invalid("placement.max_attempts", "must be >= 1"));
        }
        if let Some(scale) = self.reward.reward_scale {
            if !scale.is_finite() {
                return Err(invalid("reward.reward_scale", "must be finite"));
            }
        }
        if !self.env.control_freq.is_finite() || self.env.control_freq <= 0.0 {
            return Err(invalid("env.control_freq", "must be > 0"));
        }
        Ok(())
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Builder: set the root seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.env.seed = seed;
        self
    }

    /// Builder: enable or disable reward shaping.
    #[must_use]
    pub const fn with_reward_shaping(mut self, shaping: bool) -> Self {
        self.reward.reward_shaping = shaping;
        self
    }

    /// Builder: set or clear the reward scale.
    #[must_use]
    pub const fn with_reward_scale(mut self, scale: Option<f32>) -> Self {
        self.reward.reward_scale = scale;
        self
    }

    /// Builder: choose the white or cereal table top.
    #[must_use]
    pub const fn with_white_table(mut self, white: bool) -> Self {
        self.appearance.use_white_table_texture = white;
        self
    }
}

fn check_range(field: &str, low: f32, high: f32) -> Result<(), ConfigError> {
    if !low.is_finite() || !high.is_finite() {
        return Err(invalid(field, "bounds must be finite"));
    }
    if !(high - low).is_finite() {
        return Err(invalid(field, "span overflows f32"));
    }
    if low > high {
        return Err(ConfigError::InvertedRange {
            field: field.into(),
            low,
            high,
        });
    }
    Ok(())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_task_constructor() {
        let cfg = LiftConfig::default();
        assert_eq!(cfg.table.full_size, [10.0, 10.0, 0.05]);
        assert_eq!(cfg.table.friction, [1.0, 5e-3, 1e-4]);
        assert_eq!(cfg.table.base_offset, [0.0, 0.0, 0.8]);
        assert_eq!(cfg.table.rotation_mode, TableRotationMode::Legacy);
        assert_eq!(cfg.cube.size_min, [0.020; 3]);
        assert_eq!(cfg.cube.size_max, [0.022; 3]);
        assert_eq!(cfg.cube.rgba, [0.0, 1.0, 0.0, 1.0]);
        assert!(!cfg.appearance.use_white_table_texture);
        assert_eq!(cfg.placement.x_range, [-0.2, 0.2]);
        assert!((cfg.placement.z_offset - 0.01).abs() < f32::EPSILON);
        assert_eq!(cfg.placement.rotation, RotationSpec::Free);
        assert!(!cfg.placement.ensure_object_boundary_in_range);
        assert!(cfg.placement.ensure_valid_placement);
        assert_eq!(cfg.reward.reward_scale, Some(1.0));
        assert!(!cfg.reward.reward_shaping);
        assert!(!cfg.reward.include_lifting_term);
        assert!(cfg.env.use_object_obs);
        assert_eq!(cfg.env.horizon, 1000);
        assert!(cfg.env.hard_reset);
        assert!(!cfg.env.deterministic_reset);
    }

    #[test]
    fn default_validates() {
        assert!(LiftConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = LiftConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, LiftConfig::default());
    }

    #[test]
    fn toml_overrides_sections() {
        let cfg = LiftConfig::from_toml_str(
            r#"
            [table]
            rotation_mode = "vertical"

            [appearance]
            use_white_table_texture = true
            texture_dir = "assets/textures"

            [placement]
            rotation = { fixed = 0.5 }
            rotation_axis = "x"

            [reward]
            reward_scale = 2.0
            reward_shaping = true

            [env]
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(cfg.table.rotation_mode, TableRotationMode::Vertical);
        assert!(cfg.appearance.use_white_table_texture);
        assert_eq!(cfg.appearance.texture_dir, PathBuf::from("assets/textures"));
        assert_eq!(cfg.placement.rotation, RotationSpec::Fixed(0.5));
        assert_eq!(cfg.placement.rotation_axis, Axis::X);
        assert_eq!(cfg.reward.reward_scale, Some(2.0));
        assert!(cfg.reward.reward_shaping);
        assert_eq!(cfg.env.seed, 7);
        assert_eq!(cfg.env.horizon, 1000);
    }

    #[test]
    fn rejects_inverted_cube_bounds() {
        let mut cfg = LiftConfig::default();
        cfg.cube.size_min[1] = 0.03;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvertedRange { .. })
        ));
    }

    #[test]
    fn rejects_inverted_placement_range() {
        let mut cfg = LiftConfig::default();
        cfg.placement.x_range = [0.2, -0.2];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_overflowing_table_shift() {
        let err = LiftConfig::from_toml_str("[table]\nmax_shift = 3.0e38\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "table.max_shift"
        ));
    }

    #[test]
    fn rejects_overflowing_placement_span() {
        let mut cfg = LiftConfig::default();
        cfg.placement.y_range = [-3.0e38, 3.0e38];
        assert!(cfg.validate().is_err());

        let mut cfg = LiftConfig::default();
        cfg.placement.rotation = RotationSpec::Range([-3.0e38, 3.0e38]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_table_size() {
        let mut cfg = LiftConfig::default();
        cfg.table.full_size[2] = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_control_freq() {
        let mut cfg = LiftConfig::default();
        cfg.env.control_freq = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_attempts() {
        let mut cfg = LiftConfig::default();
        cfg.placement.max_attempts = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn equal_cube_bounds_are_valid() {
        let mut cfg = LiftConfig::default();
        cfg.cube.size_max = cfg.cube.size_min;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builders() {
        let cfg = LiftConfig::default()
            .with_seed(3)
            .with_reward_shaping(true)
            .with_reward_scale(None)
            .with_white_table(true);
        assert_eq!(cfg.env.seed, 3);
        assert!(cfg.reward.reward_shaping);
        assert!(cfg.reward.reward_scale.is_none());
        assert!(cfg.appearance.use_white_table_texture);
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = LiftConfig::from_file("/nonexistent/lift.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
