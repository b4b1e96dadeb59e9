//! Shared test fixtures and utilities for the lift task crates.
//!
//! Provides deterministic RNG setup, Bevy test app builders and helpers for
//! spawning the host bodies the task reads (cube, gripper site, robot geoms).

pub mod app;
pub mod rng;
pub mod spawn;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use app::core_test_app;
pub use rng::seeded_rng;
pub use spawn::{spawn_cube, spawn_gripper, spawn_robot_base_geoms};
