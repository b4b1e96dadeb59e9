use thiserror::Error;

/// Top-level error type for the lift task crates.
#[derive(Debug, Error)]
pub enum LiftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Placement error: {0}")]
    Placement(#[from] PlacementError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid range for {field}: low ({low}) > high ({high})")]
    InvertedRange { field: String, low: f32, high: f32 },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised while assembling a scene description.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Invalid cube size bounds on axis {axis}: min={min}, max={max}")]
    InvalidSizeBounds { axis: usize, min: f32, max: f32 },

    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("MJCF export failed: {0}")]
    Export(#[from] std::io::Error),
}

/// Object placement errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("Object '{0}' is already registered with the sampler")]
    DuplicateObject(String),

    #[error("Cannot place '{object}' after {attempts} attempts")]
    Exhausted { object: String, attempts: u32 },

    #[error("Sampling region for '{object}' is empty on the {axis} axis")]
    EmptyRegion { object: String, axis: char },

    #[error("Sampling range for '{object}' ({field}) is too wide to draw from")]
    UnboundedRange { object: String, field: &'static str },
}

/// Errors reading or writing host simulation state.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Expected exactly one single-arm robot, found {0} gripper sites")]
    RobotCount(usize),

    #[error("Scene has not been built yet")]
    SceneNotBuilt,
}
