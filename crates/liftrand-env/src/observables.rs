//! Object observables and the rate-limited registry that samples them.
//!
//! Each registered [`Observable`] owns a slot in the
//! [`ObservationBuffer`](crate::buffer::ObservationBuffer). The registry
//! advances a per-observable clock by the control timestep and only reads an
//! observable once its sampling period has elapsed.

use bevy::prelude::*;
use liftrand_core::traits::Observable;
use liftrand_core::types::{Observation, quat_to_xyzw};

use crate::buffer::ObservationBuffer;

/// Modality shared by the cube observables.
pub const OBJECT_MODALITY: &str = "object";

const PERIOD_EPS: f32 = 1e-6;

// ---------------------------------------------------------------------------
// ObservableRegistry
// ---------------------------------------------------------------------------

struct RegistryEntry {
    observable: Box<dyn Observable>,
    slot_index: usize,
    /// Seconds accumulated since the last sample; `None` before the first.
    since_sample: Option<f32>,
}

/// Registered observables, sampled each control step.
#[derive(Resource, Default)]
pub struct ObservableRegistry {
    entries: Vec<RegistryEntry>,
}

impl ObservableRegistry {
    /// Register an observable and allocate its buffer slot. Returns the slot index.
    pub fn register(
        &mut self,
        observable: Box<dyn Observable>,
        buffer: &mut ObservationBuffer,
    ) -> usize {
        let slot_index = buffer.register(observable.name(), observable.modality(), observable.dim());
        debug!(
            "registered observable '{}' ({}, dim {})",
            observable.name(),
            observable.modality(),
            observable.dim()
        );
        self.entries.push(RegistryEntry {
            observable,
            slot_index,
            since_sample: None,
        });
        slot_index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.observable.name())
    }

    /// Drop all observables. Buffer slots must be cleared separately.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Force every observable to sample on the next step.
    pub fn reset_clocks(&mut self) {
        for entry in &mut self.entries {
            entry.since_sample = None;
        }
    }

    /// Advance clocks by `dt` seconds and write due observables into `buffer`.
    /// Returns how many were sampled.
    pub fn sample(&mut self, world: &World, buffer: &mut ObservationBuffer, dt: f32) -> usize {
        let mut sampled = 0;
        for entry in &mut self.entries {
            let period = entry.observable.rate_hz().map(|hz| 1.0 / hz);
            let due = match (entry.since_sample, period) {
                (None, _) | (Some(_), None) => {
                    entry.since_sample = Some(0.0);
                    true
                }
                (Some(elapsed), Some(period)) => {
                    let elapsed = elapsed + dt;
                    if elapsed + PERIOD_EPS >= period {
                        entry.since_sample = Some((elapsed - period).max(0.0));
                        true
                    } else {
                        entry.since_sample = Some(elapsed);
                        false
                    }
                }
            };
            if due {
                let obs = entry.observable.read(world);
                buffer.write(entry.slot_index, obs.as_slice());
                sampled += 1;
            }
        }
        sampled
    }
}

// ---------------------------------------------------------------------------
// CubePosition
// ---------------------------------------------------------------------------

/// World position of the cube body, `[x, y, z]`.
pub struct CubePosition {
    cube: Entity,
    rate_hz: f32,
}

impl CubePosition {
    pub const fn new(cube: Entity, rate_hz: f32) -> Self {
        Self { cube, rate_hz }
    }
}

impl Observable for CubePosition {
    fn read(&self, world: &World) -> Observation {
        world
            .get::<Transform>(self.cube)
            .map_or_else(|| Observation::zeros(3), |t| t.translation.into())
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "cube_pos"
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn modality(&self) -> &str {
        OBJECT_MODALITY
    }

    fn dim(&self) -> usize {
        3
    }

    fn rate_hz(&self) -> Option<f32> {
        Some(self.rate_hz)
    }
}

// ---------------------------------------------------------------------------
// CubeQuat
// ---------------------------------------------------------------------------

/// Orientation of the cube body, scalar-last `[x, y, z, w]`.
pub struct CubeQuat {
    cube: Entity,
    rate_hz: f32,
}

impl CubeQuat {
    pub const fn new(cube: Entity, rate_hz: f32) -> Self {
        Self { cube, rate_hz }
    }
}

impl Observable for CubeQuat {
    fn read(&self, world: &World) -> Observation {
        let q = world
            .get::<Transform>(self.cube)
            .map_or(Quat::IDENTITY, |t| t.rotation);
        Observation::new(quat_to_xyzw(q).to_vec())
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "cube_quat"
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn modality(&self) -> &str {
        OBJECT_MODALITY
    }

    fn dim(&self) -> usize {
        4
    }

    fn rate_hz(&self) -> Option<f32> {
        Some(self.rate_hz)
    }
}

// ---------------------------------------------------------------------------
// GripperToCube
// ---------------------------------------------------------------------------

/// Vector from the gripper site to the cube, `cube - gripper`.
///
/// Named `{arm_prefix}gripper_to_cube_pos`; the prefix is empty for a
/// single-arm robot.
pub struct GripperToCube {
    gripper: Entity,
    cube: Entity,
    rate_hz: f32,
    name: String,
}

impl GripperToCube {
    pub fn new(gripper: Entity, cube: Entity, rate_hz: f32) -> Self {
        Self::with_arm_prefix(gripper, cube, rate_hz, "")
    }

    pub fn with_arm_prefix(gripper: Entity, cube: Entity, rate_hz: f32, arm_prefix: &str) -> Self {
        Self {
            gripper,
            cube,
            rate_hz,
            name: format!("{arm_prefix}gripper_to_cube_pos"),
        }
    }
}

impl Observable for GripperToCube {
    fn read(&self, world: &World) -> Observation {
        let gripper = world.get::<Transform>(self.gripper).map(|t| t.translation);
        let cube = world.get::<Transform>(self.cube).map(|t| t.translation);
        match (gripper, cube) {
            (Some(g), Some(c)) => (c - g).into(),
            _ => Observation::zeros(3),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn modality(&self) -> &str {
        OBJECT_MODALITY
    }

    fn dim(&self) -> usize {
        3
    }

    fn rate_hz(&self) -> Option<f32> {
        Some(self.rate_hz)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
