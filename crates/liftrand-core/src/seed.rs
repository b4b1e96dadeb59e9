//! Deterministic seed derivation for reproducible episodes.
//!
//! Every randomized draw in the task takes an explicit RNG. [`SeedHierarchy`]
//! hands those RNGs out from a single root seed:
//!
//! ```text
//! Root seed
//! └── Episode seed (per reset)
//!     └── Subsystem seed ("scene", "placement", ...)
//! ```
//!
//! Scene and placement streams are independent, so switching the table
//! texture or rotation mode never shifts where the cube lands.

use std::hash::{DefaultHasher, Hash, Hasher};

use bevy::prelude::Resource;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Subsystem key for table and cube randomization.
pub const SCENE_STREAM: &str = "scene";
/// Subsystem key for object placement.
pub const PLACEMENT_STREAM: &str = "placement";

/// Mix a parent seed with any hashable key.
///
/// # Example
///
/// ```
/// use liftrand_core::seed::derive_seed;
///
/// assert_eq!(derive_seed(42, "scene"), derive_seed(42, "scene"));
/// assert_ne!(derive_seed(42, "scene"), derive_seed(42, "placement"));
/// ```
#[must_use]
pub fn derive_seed<K: Hash + ?Sized>(parent: u64, key: &K) -> u64 {
    let mut hasher = DefaultHasher::new();
    parent.hash(&mut hasher);
    key.hash(&mut hasher);
    hasher.finish()
}

/// Root seed plus the derivation rules for episode and subsystem streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Resource)]
pub struct SeedHierarchy {
    root: u64,
}

impl SeedHierarchy {
    #[must_use]
    pub const fn new(root: u64) -> Self {
        Self { root }
    }

    #[must_use]
    pub const fn root(&self) -> u64 {
        self.root
    }

    /// Seed for the `episode`-th reset.
    #[must_use]
    pub fn episode_seed(&self, episode: u32) -> u64 {
        derive_seed(self.root, &episode)
    }

    /// Seed for a named subsystem within an episode.
    #[must_use]
    pub fn stream_seed(&self, episode: u32, stream: &str) -> u64 {
        derive_seed(self.episode_seed(episode), stream)
    }

    /// RNG for a named subsystem within an episode.
    #[must_use]
    pub fn stream_rng(&self, episode: u32, stream: &str) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.stream_seed(episode, stream))
    }

    #[must_use]
    pub fn scene_rng(&self, episode: u32) -> ChaCha8Rng {
        self.stream_rng(episode, SCENE_STREAM)
    }

    #[must_use]
    pub fn placement_rng(&self, episode: u32) -> ChaCha8Rng {
        self.stream_rng(episode, PLACEMENT_STREAM)
    }
}

impl Default for SeedHierarchy {
    fn default() -> Self {
        Self::new(0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
