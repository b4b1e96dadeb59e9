//! Pre-allocated observation buffer.
//!
//! Observables write into the buffer at fixed offsets. Slots keep their last
//! value between samples, so an observable sampled below the step rate reads
//! as held.

use bevy::prelude::*;
use liftrand_core::types::Observation;

// ---------------------------------------------------------------------------
// ObservableSlot
// ---------------------------------------------------------------------------

/// Metadata for a registered observable's slot in the buffer.
#[derive(Clone, Debug)]
pub struct ObservableSlot {
    pub name: String,
    pub modality: String,
    /// Number of f32 values.
    pub dim: usize,
    /// Start offset into the buffer.
    pub offset: usize,
}

// ---------------------------------------------------------------------------
// ObservationBuffer
// ---------------------------------------------------------------------------

/// Flat storage for every registered observable, in registration order.
#[derive(Resource, Clone, Debug, Default)]
pub struct ObservationBuffer {
    data: Vec<f32>,
    slots: Vec<ObservableSlot>,
}

impl ObservationBuffer {
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Allocate a slot. Returns the slot index.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        modality: impl Into<String>,
        dim: usize,
    ) -> usize {
        let offset = self.data.len();
        self.slots.push(ObservableSlot {
            name: name.into(),
            modality: modality.into(),
            dim,
            offset,
        });
        self.data.resize(offset + dim, 0.0);
        self.slots.len() - 1
    }

    /// Total observation dimension.
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[ObservableSlot] {
        &self.slots
    }

    /// Index of the slot registered under `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    /// Write values into a slot. Panics if `values.len() != slot.dim`.
    pub fn write(&mut self, slot_index: usize, values: &[f32]) {
        let slot = &self.slots[slot_index];
        assert_eq!(
            values.len(),
            slot.dim,
            "observable '{}': expected {} values, got {}",
            slot.name,
            slot.dim,
            values.len()
        );
        self.data[slot.offset..slot.offset + slot.dim].copy_from_slice(values);
    }

    pub fn read(&self, slot_index: usize) -> &[f32] {
        let slot = &self.slots[slot_index];
        &self.data[slot.offset..slot.offset + slot.dim]
    }

    /// Values of the observable registered under `name`.
    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.index_of(name).map(|i| self.read(i))
    }

    /// Concatenation of every slot of the given modality.
    pub fn modality(&self, modality: &str) -> Observation {
        let data = self
            .slots
            .iter()
            .filter(|s| s.modality == modality)
            .flat_map(|s| self.data[s.offset..s.offset + s.dim].iter().copied())
            .collect();
        Observation::new(data)
    }

    pub fn as_observation(&self) -> Observation {
        Observation::new(self.data.clone())
    }

    /// Fill with zeros. Slots remain registered.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
