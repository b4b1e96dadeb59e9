//! Bevy test app builders.

use bevy::prelude::*;
use liftrand_core::LiftCorePlugin;
use liftrand_core::config::LiftConfig;

/// Minimal app with [`LiftCorePlugin`] and the given configuration.
pub fn core_test_app(config: LiftConfig) -> App {
    let mut app = App::new();
    app.insert_resource(config);
    app.add_plugins(LiftCorePlugin);
    app.finish();
    app.cleanup();
    app
}
