//! Randomized cube-lift task CLI.
//!
//! Provides four modes of operation:
//! - `scene`: Build one randomized scene and print its MJCF
//! - `sample`: Print cube placements drawn from the default sampler
//! - `rollout`: Run scripted pick-and-lift episodes and print statistics
//! - `info`: Print the crate version and effective configuration

use std::path::PathBuf;
use std::process::ExitCode;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::{Parser, Subcommand};

use liftrand_core::prelude::*;
use liftrand_env::prelude::*;
use liftrand_scene::placement::{PlaceableObject, configure_placement_initializer};
use liftrand_scene::{build_scene, to_mjcf};
use liftrand_task::prelude::*;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Randomized cube-lift task.
#[derive(Parser)]
#[command(name = "liftrand", version, about)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one randomized scene and print its MJCF.
    Scene {
        /// Random seed.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,

        /// Use the plain white table material.
        #[arg(long)]
        white: bool,
    },

    /// Print cube placements from the default sampler.
    Sample {
        /// Random seed.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,

        /// Number of placements to draw.
        #[arg(short = 'n', long, default_value_t = 5)]
        count: u32,
    },

    /// Run scripted pick-and-lift episodes and print statistics.
    Rollout {
        /// Number of episodes to run.
        #[arg(short = 'n', long, default_value_t = 1)]
        episodes: u32,

        /// Maximum steps per episode.
        #[arg(short, long, default_value_t = 100)]
        max_steps: u32,

        /// Root seed.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Use the dense shaped reward.
        #[arg(long)]
        shaping: bool,
    },

    /// Print crate information.
    Info,
}

// ---------------------------------------------------------------------------
// Scripted host
// ---------------------------------------------------------------------------

/// Gripper travel per control step, in metres.
const SCRIPT_STEP: f32 = 0.02;
/// Distance at which both pads close on the cube.
const GRASP_TOLERANCE: f32 = 0.005;
/// Height above the table top at which lifting stops.
const LIFT_HEIGHT: f32 = 0.1;
/// Gripper start height above the placement reference.
const GRIPPER_START_HEIGHT: f32 = 0.25;

/// Stands in for the physics host: moves the gripper onto the cube, closes
/// both pads, then carries the cube straight up.
fn scripted_pick_and_lift(world: &mut World) {
    let Some(handles) = world.get_resource::<TaskHandles>().copied() else {
        return;
    };
    let table = world.get_resource::<TableTop>().map_or(0.8, |t| t.height);
    let position = |world: &World, e: Entity| world.get::<Transform>(e).map(|t| t.translation);
    let (Some(cube), Some(gripper)) = (
        position(world, handles.cube),
        position(world, handles.gripper),
    ) else {
        return;
    };
    let grasped = world
        .get::<GripperContacts>(handles.gripper)
        .is_some_and(|c| c.left_pad.contains(&handles.cube));

    if grasped {
        if cube.z >= table + LIFT_HEIGHT {
            return;
        }
        let target = gripper + Vec3::Z * SCRIPT_STEP;
        if let Some(mut t) = world.get_mut::<Transform>(handles.gripper) {
            t.translation = target;
        }
        if let Some(mut joint) = world.get_mut::<FreeJoint>(handles.cube) {
            let mut pose = joint.pose();
            pose.position = target;
            *joint = FreeJoint::from_pose(&pose);
        }
    } else {
        let target = gripper + (cube - gripper).clamp_length_max(SCRIPT_STEP);
        if let Some(mut t) = world.get_mut::<Transform>(handles.gripper) {
            t.translation = target;
        }
        if target.distance(cube) < GRASP_TOLERANCE {
            if let Some(mut contacts) = world.get_mut::<GripperContacts>(handles.gripper) {
                contacts.left_pad = vec![handles.cube];
                contacts.right_pad = vec![handles.cube];
            }
        }
    }
}

/// Park the gripper above the new placement reference with open pads.
fn rearm_gripper(world: &mut World, gripper: Entity) {
    let reference = world
        .get_resource::<LiftTask>()
        .and_then(LiftTask::scene)
        .map_or(Vec3::new(0.0, 0.0, 0.8), |s| s.placement_reference());
    if let Some(mut t) = world.get_mut::<Transform>(gripper) {
        t.translation = reference + Vec3::Z * GRIPPER_START_HEIGHT;
    }
    if let Some(mut contacts) = world.get_mut::<GripperContacts>(gripper) {
        contacts.left_pad.clear();
        contacts.right_pad.clear();
    }
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_scene(mut config: LiftConfig, seed: u64, white: bool) -> Result<(), LiftError> {
    config.appearance.use_white_table_texture |= white;
    let mut rng = SeedHierarchy::new(seed).scene_rng(0);
    let scene = build_scene(&config, &mut rng)?;
    println!("{}", to_mjcf(&scene)?);
    Ok(())
}

fn run_sample(config: &LiftConfig, seed: u64, count: u32) -> Result<(), LiftError> {
    let seeds = SeedHierarchy::new(seed);
    let scene = build_scene(config, &mut seeds.scene_rng(0))?;
    let sampler = configure_placement_initializer(
        None,
        &[PlaceableObject::from(&scene.cube)],
        &config.placement,
        scene.placement_reference(),
    )?;
    let mut rng = seeds.placement_rng(0);

    println!(
        "table offset {:?}, cube half-size {:?}",
        scene.arena.offset, scene.cube.half_size
    );
    for i in 0..count {
        let placements = sampler.sample(&mut rng, None)?;
        for placement in placements.iter() {
            let p = placement.pose.position;
            let q = placement.pose.orientation;
            println!(
                "{i}: {} pos=({:.4}, {:.4}, {:.4}) quat_wxyz=({:.4}, {:.4}, {:.4}, {:.4})",
                placement.object.name, p.x, p.y, p.z, q.w, q.x, q.y, q.z
            );
        }
    }
    Ok(())
}

fn run_rollout(
    mut config: LiftConfig,
    episodes: u32,
    max_steps: u32,
    seed: Option<u64>,
    shaping: bool,
) -> Result<(), LiftError> {
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    config.reward.reward_shaping |= shaping;
    config.env.horizon = max_steps;
    config.env.ignore_done = false;

    let mut app = App::new();
    app.add_plugins(LogPlugin::default());
    app.insert_resource(config);
    app.add_plugins((LiftCorePlugin, LiftEnvPlugin, LiftTaskPlugin));
    app.add_systems(
        Update,
        scripted_pick_and_lift
            .after(LiftSet::Reset)
            .before(LiftSet::Forward),
    );

    let gripper = app
        .world_mut()
        .spawn((
            GripperSite::default(),
            GripperContacts::default(),
            SiteRgba::default(),
            Transform::default(),
        ))
        .id();

    app.finish();
    app.cleanup();

    let mut successes = 0;
    let mut total_return = 0.0;
    for ep in 0..episodes {
        reset_episode(app.world_mut(), None)?;
        rearm_gripper(app.world_mut(), gripper);

        for _ in 0..max_steps {
            app.update();
            if app.world().resource::<Episode>().is_done() {
                break;
            }
        }

        let episode = app.world().resource::<Episode>();
        let success = episode.success_steps > 0;
        successes += u32::from(success);
        total_return += episode.total_reward;
        println!(
            "episode {}: steps={}, return={:.3}, success={success}",
            ep + 1,
            episode.step_count,
            episode.total_reward
        );
    }

    println!("\ntotal: episodes={episodes}, successes={successes}, return={total_return:.3}");
    Ok(())
}

fn run_info(config: &LiftConfig) {
    println!("liftrand v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  liftrand-core   {}", env!("CARGO_PKG_VERSION"));
    println!("  liftrand-scene  {}", env!("CARGO_PKG_VERSION"));
    println!("  liftrand-env    {}", env!("CARGO_PKG_VERSION"));
    println!("  liftrand-task   {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("configuration:");
    println!("{config:#?}");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn run(cli: Cli) -> Result<(), LiftError> {
    let config = match &cli.config {
        Some(path) => LiftConfig::from_file(path)?,
        None => LiftConfig::default(),
    };

    match cli.command {
        Some(Commands::Scene { seed, white }) => run_scene(config, seed, white),
        Some(Commands::Sample { seed, count }) => run_sample(&config, seed, count),
        Some(Commands::Rollout {
            episodes,
            max_steps,
            seed,
            shaping,
        }) => run_rollout(config, episodes, max_steps, seed, shaping),
        Some(Commands::Info) => {
            run_info(&config);
            Ok(())
        }
        // Default: one scripted episode
        None => run_rollout(config, 1, 100, None, false),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
