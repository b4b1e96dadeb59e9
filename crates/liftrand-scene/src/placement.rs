//! Initial object placement.
//!
//! A [`PlacementSampler`] owns a list of objects and, given an RNG, produces
//! one collision-free [`Placement`] per object relative to a reference point.
//! [`UniformRandomSampler`] draws x and y uniformly inside a rectangle around
//! the reference, puts the object's bottom `z_offset` above the reference
//! height, and retries each object until it clears everything already placed.

use std::f32::consts::TAU;

use bevy::log::{debug, warn};
use bevy::math::{Quat, Vec3};
use liftrand_core::config::{PlacementConfig, RotationSpec};
use liftrand_core::error::PlacementError;
use liftrand_core::types::{Axis, Pose};
use rand::{Rng, RngCore};

use crate::object::BoxObject;

// ---------------------------------------------------------------------------
// PlaceableObject
// ---------------------------------------------------------------------------

/// The geometry a sampler needs to know about an object.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaceableObject {
    pub name: String,
    /// Radius of the footprint circle in the horizontal plane.
    pub horizontal_radius: f32,
    /// Body origin to lowest point; negative for objects resting on their origin's underside.
    pub bottom_offset: f32,
    /// Body origin to highest point.
    pub top_offset: f32,
}

impl From<&BoxObject> for PlaceableObject {
    fn from(obj: &BoxObject) -> Self {
        Self {
            name: obj.name.clone(),
            horizontal_radius: obj.horizontal_radius(),
            bottom_offset: obj.bottom_offset(),
            top_offset: obj.top_offset(),
        }
    }
}

// ---------------------------------------------------------------------------
// Placements
// ---------------------------------------------------------------------------

/// A sampled pose for one object.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub object: PlaceableObject,
    pub pose: Pose,
}

/// Placements keyed by object name, in placement order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectPlacements {
    entries: Vec<Placement>,
}

impl ObjectPlacements {
    pub fn get(&self, name: &str) -> Option<&Placement> {
        self.entries.iter().find(|p| p.object.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placement> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, placement: Placement) {
        self.entries.push(placement);
    }
}

// ---------------------------------------------------------------------------
// PlacementSampler
// ---------------------------------------------------------------------------

/// Chooses start poses for a set of objects.
pub trait PlacementSampler: Send + Sync {
    /// Sampler name, used in log output.
    fn name(&self) -> &str;

    /// Forget all objects previously added.
    fn reset(&mut self);

    /// Add objects to be placed. Names must be unique within the sampler.
    fn add_objects(&mut self, objects: &[PlaceableObject]) -> Result<(), PlacementError>;

    /// Objects currently bound to this sampler.
    fn objects(&self) -> &[PlaceableObject];

    /// Sample a placement for every bound object.
    ///
    /// `fixtures` are already placed objects that new samples must avoid;
    /// they are included in the returned placements.
    fn sample(
        &self,
        rng: &mut dyn RngCore,
        fixtures: Option<&ObjectPlacements>,
    ) -> Result<ObjectPlacements, PlacementError>;
}

// ---------------------------------------------------------------------------
// UniformRandomSampler
// ---------------------------------------------------------------------------

/// Uniform sampling over an axis-aligned rectangle around a reference point.
#[derive(Clone, Debug)]
pub struct UniformRandomSampler {
    name: String,
    objects: Vec<PlaceableObject>,
    pub x_range: [f32; 2],
    pub y_range: [f32; 2],
    pub rotation: RotationSpec,
    pub rotation_axis: Axis,
    pub ensure_object_boundary_in_range: bool,
    pub ensure_valid_placement: bool,
    /// Point the ranges and `z_offset` are relative to.
    pub reference: Vec3,
    pub z_offset: f32,
    pub max_attempts: u32,
}

impl UniformRandomSampler {
    /// A sampler with no objects, configured from `config`.
    pub fn from_config(name: impl Into<String>, config: &PlacementConfig, reference: Vec3) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
            x_range: config.x_range,
            y_range: config.y_range,
            rotation: config.rotation,
            rotation_axis: config.rotation_axis,
            ensure_object_boundary_in_range: config.ensure_object_boundary_in_range,
            ensure_valid_placement: config.ensure_valid_placement,
            reference,
            z_offset: config.z_offset,
            max_attempts: config.max_attempts,
        }
    }

    fn sample_coord(
        &self,
        rng: &mut dyn RngCore,
        range: [f32; 2],
        object: &PlaceableObject,
        axis: char,
        field: &'static str,
    ) -> Result<f32, PlacementError> {
        let [mut low, mut high] = range;
        if self.ensure_object_boundary_in_range {
            low += object.horizontal_radius;
            high -= object.horizontal_radius;
        }
        if low > high {
            return Err(PlacementError::EmptyRegion {
                object: object.name.clone(),
                axis,
            });
        }
        uniform(rng, low, high).ok_or_else(|| unbounded(object, field))
    }

    fn sample_quat(
        &self,
        rng: &mut dyn RngCore,
        object: &PlaceableObject,
    ) -> Result<Quat, PlacementError> {
        let angle = match self.rotation {
            RotationSpec::Free => rng.gen_range(0.0..TAU),
            RotationSpec::Fixed(angle) => angle,
            RotationSpec::Range([a, b]) => uniform(rng, a.min(b), a.max(b))
                .ok_or_else(|| unbounded(object, "rotation"))?,
        };
        Ok(self.rotation_axis.rotation(angle))
    }

    /// Whether a candidate at `pos` overlaps an already placed object.
    fn collides(pos: Vec3, object: &PlaceableObject, placed: &ObjectPlacements) -> bool {
        placed.iter().any(|other| {
            let other_pos = other.pose.position;
            let planar = (pos.truncate() - other_pos.truncate()).length();
            planar <= other.object.horizontal_radius + object.horizontal_radius
                && pos.z - other_pos.z <= other.object.top_offset - object.bottom_offset
        })
    }
}

impl PlacementSampler for UniformRandomSampler {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        self.objects.clear();
    }

    fn add_objects(&mut self, objects: &[PlaceableObject]) -> Result<(), PlacementError> {
        for obj in objects {
            if self.objects.iter().any(|o| o.name == obj.name) {
                return Err(PlacementError::DuplicateObject(obj.name.clone()));
            }
            self.objects.push(obj.clone());
        }
        Ok(())
    }

    fn objects(&self) -> &[PlaceableObject] {
        &self.objects
    }

    fn sample(
        &self,
        rng: &mut dyn RngCore,
        fixtures: Option<&ObjectPlacements>,
    ) -> Result<ObjectPlacements, PlacementError> {
        let mut placed = fixtures.cloned().unwrap_or_default();

        for object in &self.objects {
            if placed.contains(&object.name) {
                return Err(PlacementError::DuplicateObject(object.name.clone()));
            }

            let z = self.reference.z + self.z_offset - object.bottom_offset;
            let mut found = None;
            for attempt in 1..=self.max_attempts {
                let x = self.reference.x + self.sample_coord(rng, self.x_range, object, 'x', "x_range")?;
                let y = self.reference.y + self.sample_coord(rng, self.y_range, object, 'y', "y_range")?;
                let pos = Vec3::new(x, y, z);
                if self.ensure_valid_placement && Self::collides(pos, object, &placed) {
                    continue;
                }
                let orientation = self.sample_quat(rng, object)?;
                debug!(
                    "{}: placed '{}' at {pos:?} after {attempt} attempt(s)",
                    self.name, object.name
                );
                found = Some(Pose::new(pos, orientation));
                break;
            }

            let Some(pose) = found else {
                warn!(
                    "{}: no valid placement for '{}' in {} attempts",
                    self.name, object.name, self.max_attempts
                );
                return Err(PlacementError::Exhausted {
                    object: object.name.clone(),
                    attempts: self.max_attempts,
                });
            };
            placed.push(Placement {
                object: object.clone(),
                pose,
            });
        }

        Ok(placed)
    }
}

/// Uniform draw over `[low, high)`; a degenerate interval yields `low`.
///
/// `None` when the span overflows `f32`.
fn uniform(rng: &mut dyn RngCore, low: f32, high: f32) -> Option<f32> {
    if !(high - low).is_finite() {
        return None;
    }
    Some(if low < high {
        rng.gen_range(low..high)
    } else {
        low
    })
}

fn unbounded(object: &PlaceableObject, field: &'static str) -> PlacementError {
    PlacementError::UnboundedRange {
        object: object.name.clone(),
        field,
    }
}

// ---------------------------------------------------------------------------
// Initializer policy
// ---------------------------------------------------------------------------

/// Name given to the default sampler.
pub const DEFAULT_SAMPLER_NAME: &str = "ObjectSampler";

/// Reuse a caller-supplied sampler (reset, then bind `objects`), or build the
/// default [`UniformRandomSampler`] around `reference`.
///
/// A supplied sampler keeps its own reference point.
pub fn configure_placement_initializer(
    supplied: Option<Box<dyn PlacementSampler>>,
    objects: &[PlaceableObject],
    config: &PlacementConfig,
    reference: Vec3,
) -> Result<Box<dyn PlacementSampler>, PlacementError> {
    let mut sampler = match supplied {
        Some(mut sampler) => {
            sampler.reset();
            sampler
        }
        None => Box::new(UniformRandomSampler::from_config(
            DEFAULT_SAMPLER_NAME,
            config,
            reference,
        )),
    };
    sampler.add_objects(objects)?;
    Ok(sampler)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
