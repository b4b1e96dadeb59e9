//! Scene and placement lifecycle of the lift task.
//!
//! [`LiftTask`] owns the current [`SceneDescription`], the placement sampler
//! bound to it and the last sampled placements. It is plain data driven by
//! explicit RNGs; the plugin wires it into the world.

use bevy::log::{debug, info, warn};
use bevy::prelude::Resource;
use liftrand_core::config::LiftConfig;
use liftrand_core::error::{LiftError, SimError};
use liftrand_core::types::Pose;
use liftrand_scene::placement::{
    ObjectPlacements, PlaceableObject, PlacementSampler, configure_placement_initializer,
};
use liftrand_scene::{CUBE_NAME, SceneDescription, build_scene};
use rand::{Rng, RngCore};

/// What a reset changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetOutcome {
    /// The scene was rebuilt with fresh table and cube draws.
    pub rebuilt: bool,
    /// Placements were re-sampled.
    pub resampled: bool,
}

/// Scene, sampler and placements for one environment.
#[derive(Resource)]
pub struct LiftTask {
    config: LiftConfig,
    scene: Option<SceneDescription>,
    sampler: Option<Box<dyn PlacementSampler>>,
    /// The sampler came from the caller and is reused across rebuilds.
    caller_sampler: bool,
    placements: Option<ObjectPlacements>,
    loads: u32,
}

impl LiftTask {
    pub fn new(config: LiftConfig) -> Self {
        Self {
            config,
            scene: None,
            sampler: None,
            caller_sampler: false,
            placements: None,
            loads: 0,
        }
    }

    /// Use `sampler` instead of the default uniform sampler.
    #[must_use]
    pub fn with_placement_initializer(mut self, sampler: Box<dyn PlacementSampler>) -> Self {
        self.sampler = Some(sampler);
        self.caller_sampler = true;
        self
    }

    pub const fn config(&self) -> &LiftConfig {
        &self.config
    }

    pub const fn scene(&self) -> Option<&SceneDescription> {
        self.scene.as_ref()
    }

    pub fn sampler(&self) -> Option<&dyn PlacementSampler> {
        self.sampler.as_deref()
    }

    pub const fn placements(&self) -> Option<&ObjectPlacements> {
        self.placements.as_ref()
    }

    /// Number of scene builds so far.
    pub const fn loads(&self) -> u32 {
        self.loads
    }

    /// Table-top height of the current scene.
    pub fn table_height(&self) -> Option<f32> {
        self.scene.as_ref().map(SceneDescription::table_height)
    }

    /// Sampled pose of the cube.
    pub fn cube_pose(&self) -> Option<Pose> {
        self.placements
            .as_ref()
            .and_then(|p| p.get(CUBE_NAME))
            .map(|p| p.pose)
    }

    /// Build a fresh scene and bind the placement sampler to it.
    ///
    /// Previous placements are dropped since they belong to the old scene.
    pub fn load_model<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&SceneDescription, LiftError> {
        let scene = build_scene(&self.config, rng)?;
        let sampler = self.bind_sampler(&scene)?;
        Ok(self.commit(scene, sampler))
    }

    /// Rebuild the scene when `hard_reset` is set without `deterministic_reset`
    /// (or none exists yet), then re-sample placements unless
    /// `deterministic_reset` keeps the last ones.
    ///
    /// A rebuild is committed only once its placements were sampled; on error
    /// the previous scene, sampler and placements stay in place.
    pub fn reset<R: Rng + ?Sized>(
        &mut self,
        scene_rng: &mut R,
        placement_rng: &mut dyn RngCore,
    ) -> Result<ResetOutcome, LiftError> {
        let env = &self.config.env;
        let rebuilt = self.scene.is_none() || (env.hard_reset && !env.deterministic_reset);
        let resampled = rebuilt || !env.deterministic_reset || self.placements.is_none();

        if rebuilt {
            let scene = build_scene(&self.config, scene_rng)?;
            let sampler = self.bind_sampler(&scene)?;
            let placements = match sampler.sample(placement_rng, None) {
                Ok(placements) => placements,
                Err(e) => {
                    self.release_sampler(sampler);
                    return Err(e.into());
                }
            };
            self.commit(scene, sampler);
            self.placements = Some(placements);
        } else if resampled {
            let sampler = self.sampler.as_ref().ok_or(SimError::SceneNotBuilt)?;
            self.placements = Some(sampler.sample(placement_rng, None)?);
        }

        if let (Some(scene), Some(pose)) = (&self.scene, self.cube_pose()) {
            info!(
                "reset: table at {:?}, cube at {:?} (rebuilt={rebuilt}, resampled={resampled})",
                scene.arena.offset, pose.position
            );
        }
        Ok(ResetOutcome { rebuilt, resampled })
    }

    /// Sampler bound to the cube of `scene`: the caller's, reset and rebound,
    /// or a fresh default sampler around the scene's placement reference.
    fn bind_sampler(
        &mut self,
        scene: &SceneDescription,
    ) -> Result<Box<dyn PlacementSampler>, LiftError> {
        let objects = [PlaceableObject::from(&scene.cube)];
        if !self.caller_sampler {
            return Ok(configure_placement_initializer(
                None,
                &objects,
                &self.config.placement,
                scene.placement_reference(),
            )?);
        }

        let mut sampler = self.sampler.take().ok_or(SimError::SceneNotBuilt)?;
        sampler.reset();
        if let Err(e) = sampler.add_objects(&objects) {
            self.release_sampler(sampler);
            return Err(e.into());
        }
        Ok(sampler)
    }

    /// Return an uncommitted sampler. A caller sampler goes back in place,
    /// rebound to the committed cube; a default one is dropped.
    fn release_sampler(&mut self, mut sampler: Box<dyn PlacementSampler>) {
        if !self.caller_sampler {
            return;
        }
        sampler.reset();
        if let Some(scene) = &self.scene {
            if let Err(e) = sampler.add_objects(&[PlaceableObject::from(&scene.cube)]) {
                warn!("sampler '{}' lost its binding to the current cube: {e}", sampler.name());
            }
        }
        self.sampler = Some(sampler);
    }

    fn commit(
        &mut self,
        scene: SceneDescription,
        sampler: Box<dyn PlacementSampler>,
    ) -> &SceneDescription {
        debug!(
            "scene load {}: sampler '{}' bound to {} object(s)",
            self.loads + 1,
            sampler.name(),
            sampler.objects().len()
        );
        self.sampler = Some(sampler);
        self.placements = None;
        self.loads += 1;
        &*self.scene.insert(scene)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use bevy::math::Vec3;
    use liftrand_core::config::PlacementConfig;
    use liftrand_core::error::PlacementError;
    use liftrand_scene::placement::UniformRandomSampler;
    use liftrand_test_utils::seeded_rng;

    /// Switches that make [`FaultySampler`] fail on demand.
    #[derive(Clone, Default)]
    struct Faults {
        add: Arc<AtomicBool>,
        sample: Arc<AtomicBool>,
    }

    struct FaultySampler {
        inner: UniformRandomSampler,
        faults: Faults,
    }

    impl FaultySampler {
        fn new(faults: &Faults) -> Self {
            Self {
                inner: UniformRandomSampler::from_config(
                    "faulty",
                    &PlacementConfig::default(),
                    Vec3::new(0.0, 0.0, 0.8),
                ),
                faults: faults.clone(),
            }
        }
    }

    impl PlacementSampler for FaultySampler {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn reset(&mut self) {
            self.inner.reset();
        }

        fn add_objects(&mut self, objects: &[PlaceableObject]) -> Result<(), PlacementError> {
            if self.faults.add.load(Ordering::SeqCst) {
                return Err(PlacementError::DuplicateObject(CUBE_NAME.into()));
            }
            self.inner.add_objects(objects)
        }

        fn objects(&self) -> &[PlaceableObject] {
            self.inner.objects()
        }

        fn sample(
            &self,
            rng: &mut dyn RngCore,
            fixtures: Option<&ObjectPlacements>,
        ) -> Result<ObjectPlacements, PlacementError> {
            if self.faults.sample.load(Ordering::SeqCst) {
                return Err(PlacementError::Exhausted {
                    object: CUBE_NAME.into(),
                    attempts: 1,
                });
            }
            self.inner.sample(rng, fixtures)
        }
    }

    fn reset(task: &mut LiftTask, seed: u64) -> ResetOutcome {
        task.reset(&mut seeded_rng(seed), &mut seeded_rng(seed + 1000))
            .unwrap()
    }

    #[test]
    fn first_reset_builds_scene_and_places_cube() {
        let mut task = LiftTask::new(LiftConfig::default());
        assert!(task.scene().is_none());
        let out = reset(&mut task, 0);
        assert!(out.rebuilt && out.resampled);
        let pose = task.cube_pose().unwrap();
        let reference = task.scene().unwrap().placement_reference();
        assert!((pose.position.x - reference.x).abs() <= 0.2);
        assert!(pose.position.z > 0.8);
        assert_eq!(task.sampler().unwrap().objects().len(), 1);
    }

    #[test]
    fn hard_reset_rebuilds_every_time() {
        let mut task = LiftTask::new(LiftConfig::default());
        reset(&mut task, 0);
        let first = task.scene().unwrap().arena.offset;
        reset(&mut task, 1);
        assert_eq!(task.loads(), 2);
        assert_ne!(task.scene().unwrap().arena.offset, first);
    }

    #[test]
    fn soft_reset_keeps_scene() {
        let mut cfg = LiftConfig::default();
        cfg.env.hard_reset = false;
        let mut task = LiftTask::new(cfg);
        reset(&mut task, 0);
        let first = task.scene().unwrap().clone();
        let out = reset(&mut task, 1);
        assert!(!out.rebuilt);
        assert_eq!(task.loads(), 1);
        assert_eq!(task.scene().unwrap(), &first);
    }

    #[test]
    fn deterministic_reset_keeps_placements() {
        let mut cfg = LiftConfig::default();
        cfg.env.deterministic_reset = true;
        cfg.env.hard_reset = false;
        let mut task = LiftTask::new(cfg);
        reset(&mut task, 0);
        let pose = task.cube_pose().unwrap();
        let out = reset(&mut task, 5);
        assert!(!out.resampled);
        assert_eq!(task.cube_pose().unwrap(), pose);
    }

    #[test]
    fn deterministic_reset_overrides_hard_reset() {
        let mut cfg = LiftConfig::default();
        cfg.env.deterministic_reset = true;
        assert!(cfg.env.hard_reset);
        let mut task = LiftTask::new(cfg);
        reset(&mut task, 0);
        let scene = task.scene().unwrap().clone();
        let pose = task.cube_pose().unwrap();

        let out = reset(&mut task, 1);
        assert!(!out.rebuilt);
        assert!(!out.resampled);
        assert_eq!(task.loads(), 1);
        assert_eq!(task.scene().unwrap(), &scene);
        assert_eq!(task.cube_pose().unwrap(), pose);

        let local = pose.position - task.scene().unwrap().placement_reference();
        assert!(local.x.abs() <= 0.2 && local.y.abs() <= 0.2);
    }

    #[test]
    fn failed_sample_keeps_previous_episode() {
        let faults = Faults::default();
        let mut task = LiftTask::new(LiftConfig::default())
            .with_placement_initializer(Box::new(FaultySampler::new(&faults)));
        reset(&mut task, 0);
        let scene = task.scene().unwrap().clone();
        let pose = task.cube_pose().unwrap();

        faults.sample.store(true, Ordering::SeqCst);
        let err = task
            .reset(&mut seeded_rng(1), &mut seeded_rng(1001))
            .unwrap_err();
        assert!(matches!(err, LiftError::Placement(PlacementError::Exhausted { .. })));
        assert_eq!(task.loads(), 1);
        assert_eq!(task.scene().unwrap(), &scene);
        assert_eq!(task.cube_pose().unwrap(), pose);
        let sampler = task.sampler().unwrap();
        assert_eq!(sampler.name(), "faulty");
        assert_eq!(sampler.objects(), &[PlaceableObject::from(&scene.cube)]);

        faults.sample.store(false, Ordering::SeqCst);
        let out = reset(&mut task, 2);
        assert!(out.rebuilt);
        assert_eq!(task.loads(), 2);
    }

    #[test]
    fn failed_bind_keeps_caller_sampler() {
        let faults = Faults::default();
        let mut task = LiftTask::new(LiftConfig::default())
            .with_placement_initializer(Box::new(FaultySampler::new(&faults)));
        reset(&mut task, 0);
        let scene = task.scene().unwrap().clone();

        faults.add.store(true, Ordering::SeqCst);
        assert!(task.reset(&mut seeded_rng(1), &mut seeded_rng(1001)).is_err());
        assert_eq!(task.scene().unwrap(), &scene);
        assert_eq!(task.sampler().unwrap().name(), "faulty");

        faults.add.store(false, Ordering::SeqCst);
        reset(&mut task, 2);
        assert_eq!(task.sampler().unwrap().name(), "faulty");
        assert_eq!(task.sampler().unwrap().objects().len(), 1);
    }

    #[test]
    fn failed_first_reset_commits_nothing() {
        let mut cfg = LiftConfig::default();
        cfg.placement.x_range = [-0.01, 0.01];
        cfg.placement.ensure_object_boundary_in_range = true;
        let mut task = LiftTask::new(cfg);
        assert!(task.reset(&mut seeded_rng(0), &mut seeded_rng(1)).is_err());
        assert!(task.scene().is_none());
        assert!(task.sampler().is_none());
        assert_eq!(task.loads(), 0);
    }

    #[test]
    fn default_sampler_follows_rebuilt_table() {
        let mut task = LiftTask::new(LiftConfig::default());
        for seed in 0..5 {
            reset(&mut task, seed);
            let reference = task.scene().unwrap().placement_reference();
            let pose = task.cube_pose().unwrap();
            assert!((pose.position.x - reference.x).abs() <= 0.2);
            assert!((pose.position.y - reference.y).abs() <= 0.2);
        }
    }

    #[test]
    fn caller_sampler_is_reused_with_its_own_reference() {
        let custom = UniformRandomSampler::from_config(
            "custom",
            &PlacementConfig::default(),
            Vec3::new(2.0, 0.0, 0.8),
        );
        let mut task =
            LiftTask::new(LiftConfig::default()).with_placement_initializer(Box::new(custom));
        reset(&mut task, 0);
        reset(&mut task, 1);
        assert_eq!(task.sampler().unwrap().name(), "custom");
        assert_eq!(task.sampler().unwrap().objects().len(), 1);
        assert!(task.cube_pose().unwrap().position.x > 1.7);
    }

    #[test]
    fn same_seeds_same_episode() {
        let mut a = LiftTask::new(LiftConfig::default());
        let mut b = LiftTask::new(LiftConfig::default());
        reset(&mut a, 3);
        reset(&mut b, 3);
        assert_eq!(a.scene(), b.scene());
        assert_eq!(a.cube_pose(), b.cube_pose());
    }
}
