//! Episode state machine and lifecycle management.
//!
//! An episode runs from reset until the horizon is reached. Lifting the cube
//! does not end it; success is reported per step and the policy keeps acting.

use bevy::prelude::*;
use liftrand_core::config::EnvConfig;

// ---------------------------------------------------------------------------
// EpisodeState
// ---------------------------------------------------------------------------

/// Lifecycle state of an episode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EpisodeState {
    /// Before the first reset.
    #[default]
    Idle,
    /// Actively stepping.
    Running,
    /// Ended at the horizon.
    Truncated,
}

impl EpisodeState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Truncated)
    }

    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

// ---------------------------------------------------------------------------
// EpisodeConfig
// ---------------------------------------------------------------------------

/// Configuration for episode lifecycle.
#[derive(Resource, Clone, Debug, PartialEq, Eq)]
pub struct EpisodeConfig {
    /// Steps before the episode is truncated.
    pub horizon: u32,
    /// Keep running past the horizon.
    pub ignore_done: bool,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            horizon: 1000,
            ignore_done: false,
        }
    }
}

impl EpisodeConfig {
    pub const fn from_env(env: &EnvConfig) -> Self {
        Self {
            horizon: env.horizon,
            ignore_done: env.ignore_done,
        }
    }

    /// Builder: set the horizon.
    #[must_use]
    pub const fn with_horizon(mut self, horizon: u32) -> Self {
        self.horizon = horizon;
        self
    }

    /// Builder: never truncate.
    #[must_use]
    pub const fn with_ignore_done(mut self, ignore_done: bool) -> Self {
        self.ignore_done = ignore_done;
        self
    }
}

// ---------------------------------------------------------------------------
// Episode
// ---------------------------------------------------------------------------

/// Bevy resource tracking the current episode's state.
#[derive(Resource, Clone, Debug, Default)]
pub struct Episode {
    pub state: EpisodeState,
    /// Steps taken this episode.
    pub step_count: u32,
    /// Reward accumulated this episode.
    pub total_reward: f32,
    /// Steps on which the task was accomplished.
    pub success_steps: u32,
    /// Seed used for this episode (set on reset).
    pub seed: Option<u64>,
    /// Number of resets since app start.
    pub episode_number: u32,
}

impl Episode {
    /// Start a new episode.
    pub const fn reset(&mut self, seed: Option<u64>) {
        self.state = EpisodeState::Running;
        self.step_count = 0;
        self.total_reward = 0.0;
        self.success_steps = 0;
        self.seed = seed;
        self.episode_number += 1;
    }

    /// Advance one step. Returns `false` if the episode is not running.
    pub fn advance(&mut self, reward: f32, success: bool) -> bool {
        if self.state != EpisodeState::Running {
            return false;
        }
        self.step_count += 1;
        self.total_reward += reward;
        if success {
            self.success_steps += 1;
        }
        true
    }

    /// Truncate if the horizon has been reached. Returns `true` on the
    /// transition.
    pub fn check_truncation(&mut self, config: &EpisodeConfig) -> bool {
        if !config.ignore_done
            && self.step_count >= config.horizon
            && self.state == EpisodeState::Running
        {
            self.state = EpisodeState::Truncated;
            return true;
        }
        false
    }

    pub const fn is_done(&self) -> bool {
        self.state.is_terminal()
    }

    pub const fn is_running(&self) -> bool {
        self.state.is_running()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_default_is_idle() {
        assert_eq!(EpisodeState::default(), EpisodeState::Idle);
        assert!(!EpisodeState::Idle.is_terminal());
        assert!(EpisodeState::Running.is_running());
        assert!(EpisodeState::Truncated.is_terminal());
    }

    #[test]
    fn config_from_env() {
        let env = EnvConfig {
            horizon: 50,
            ignore_done: true,
            ..EnvConfig::default()
        };
        let c = EpisodeConfig::from_env(&env);
        assert_eq!(c.horizon, 50);
        assert!(c.ignore_done);
        assert_eq!(EpisodeConfig::default().horizon, 1000);
    }

    #[test]
    fn reset_transitions_to_running() {
        let mut ep = Episode::default();
        ep.reset(Some(42));
        assert_eq!(ep.state, EpisodeState::Running);
        assert_eq!(ep.seed, Some(42));
        assert_eq!(ep.episode_number, 1);
    }

    #[test]
    fn advance_accumulates_reward_and_successes() {
        let mut ep = Episode::default();
        ep.reset(None);
        assert!(ep.advance(1.5, false));
        assert!(ep.advance(2.0, true));
        assert_eq!(ep.step_count, 2);
        assert_eq!(ep.success_steps, 1);
        assert!((ep.total_reward - 3.5).abs() < f32::EPSILON);
        assert!(ep.is_running());
    }

    #[test]
    fn advance_fails_when_idle() {
        let mut ep = Episode::default();
        assert!(!ep.advance(1.0, true));
        assert_eq!(ep.step_count, 0);
    }

    #[test]
    fn truncates_at_horizon() {
        let config = EpisodeConfig::default().with_horizon(3);
        let mut ep = Episode::default();
        ep.reset(None);
        for _ in 0..2 {
            ep.advance(0.0, false);
            assert!(!ep.check_truncation(&config));
        }
        ep.advance(0.0, false);
        assert!(ep.check_truncation(&config));
        assert!(ep.is_done());
        assert!(!ep.advance(1.0, false));
    }

    #[test]
    fn ignore_done_never_truncates() {
        let config = EpisodeConfig::default().with_horizon(2).with_ignore_done(true);
        let mut ep = Episode::default();
        ep.reset(None);
        for _ in 0..10 {
            ep.advance(0.0, false);
        }
        assert!(!ep.check_truncation(&config));
        assert!(ep.is_running());
    }

    #[test]
    fn reset_clears_counters() {
        let mut ep = Episode::default();
        ep.reset(None);
        ep.advance(100.0, true);
        ep.reset(Some(1));
        assert!(ep.total_reward.abs() < f32::EPSILON);
        assert_eq!(ep.success_steps, 0);
        assert_eq!(ep.episode_number, 2);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn types_are_send_sync() {
        assert_send_sync::<EpisodeState>();
        assert_send_sync::<EpisodeConfig>();
        assert_send_sync::<Episode>();
    }
}
