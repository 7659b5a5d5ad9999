// src/rl/agent.rs
//
// Linear Gaussian policy agent with a simplified REINFORCE-style update.
//
// The policy is a linear map `mean_action = W^T state + b` with isotropic
// Gaussian exploration noise. The update rule is intentionally
// non-standard: it moves the weights toward actions with positive
// whitened return and away (at one-tenth magnitude) from actions with
// negative whitened return, using raw action values rather than
// score-function gradients. Reward and threshold dynamics were tuned
// against this exact rule; do not "correct" it.
//
// Randomness is an explicit generator owned by the agent, seeded once at
// construction. Subsequent draws mutate the shared stream, so re-runs
// with the same seed but different step counts diverge from that point.

use std::fs;
use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TunerError};

/// Checkpoint schema version. Increment on layout changes.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Scale of the small random weight initialization.
const INIT_SCALE: f64 = 0.1;

/// Std of the exploration noise added in stochastic mode.
const EXPLORATION_STD: f64 = 0.1;

/// Numerical floor added to the return std during whitening.
const WHITEN_EPS: f64 = 1e-8;

/// One unit of experience, buffered per episode and cleared after each
/// policy update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transition {
    pub state: Vec<f64>,
    pub action: Vec<f64>,
    pub reward: f64,
    pub next_state: Vec<f64>,
    pub done: bool,
}

/// Diagnostics returned by `train_step`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrainStepMetrics {
    /// Total (undiscounted) reward of the trained episode.
    pub episode_reward: f64,
    /// Mean absolute weight of W after the update.
    pub mean_abs_weight: f64,
    /// Number of training steps performed so far.
    pub train_step: u64,
}

/// Serialized agent parameters and hyperparameters.
///
/// The construction seed is deliberately not persisted: it only affects
/// fresh initialization, and a loaded agent may run under any seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PolicyCheckpoint {
    version: u32,
    state_dim: usize,
    action_dim: usize,
    learning_rate: f64,
    gamma: f64,
    /// Row-major `state_dim x action_dim`.
    w: Vec<f64>,
    b: Vec<f64>,
}

/// Linear Gaussian stochastic policy with per-episode REINFORCE updates.
pub struct GaussianPolicyAgent {
    state_dim: usize,
    action_dim: usize,
    learning_rate: f64,
    gamma: f64,

    /// Row-major `state_dim x action_dim` weight matrix.
    w: Vec<f64>,
    b: Vec<f64>,

    rng: ChaCha8Rng,
    episode_transitions: Vec<Transition>,
    train_step_count: u64,
}

impl GaussianPolicyAgent {
    /// Create a freshly initialized agent.
    ///
    /// Weights are drawn N(0, 1) * 0.1 from the seeded generator.
    pub fn new(
        state_dim: usize,
        action_dim: usize,
        learning_rate: f64,
        gamma: f64,
        seed: u64,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let w = (0..state_dim * action_dim)
            .map(|_| {
                let z: f64 = StandardNormal.sample(&mut rng);
                z * INIT_SCALE
            })
            .collect();
        let b = (0..action_dim)
            .map(|_| {
                let z: f64 = StandardNormal.sample(&mut rng);
                z * INIT_SCALE
            })
            .collect();

        Self {
            state_dim,
            action_dim,
            learning_rate,
            gamma,
            w,
            b,
            rng,
            episode_transitions: Vec::new(),
            train_step_count: 0,
        }
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    pub fn train_step_count(&self) -> u64 {
        self.train_step_count
    }

    /// Number of transitions buffered for the current episode.
    pub fn buffered_transitions(&self) -> usize {
        self.episode_transitions.len()
    }

    /// Mean action for a state: `W^T state + b`.
    fn mean_action(&self, state: &[f64]) -> Vec<f64> {
        let mut out = self.b.clone();
        for (s_idx, &s) in state.iter().enumerate().take(self.state_dim) {
            let row = &self.w[s_idx * self.action_dim..(s_idx + 1) * self.action_dim];
            for (a_idx, &w) in row.iter().enumerate() {
                out[a_idx] += w * s;
            }
        }
        out
    }

    /// Select an action for the given state vector.
    ///
    /// Deterministic mode returns the policy mean unchanged (evaluation);
    /// stochastic mode adds isotropic Gaussian noise (training).
    pub fn select_action(&mut self, state: &[f64], deterministic: bool) -> Vec<f64> {
        let mut action = self.mean_action(state);
        if !deterministic {
            for a in &mut action {
                let z: f64 = StandardNormal.sample(&mut self.rng);
                *a += z * EXPLORATION_STD;
            }
        }
        action
    }

    /// Record a transition into the per-episode buffer.
    pub fn observe(&mut self, transition: Transition) {
        self.episode_transitions.push(transition);
    }

    /// Run one policy update over the buffered episode.
    ///
    /// Computes discounted returns backward, whitens them when more than
    /// one transition is present, then applies the asymmetric
    /// advantage-weighted update. Clears the buffer and bumps the step
    /// counter. An empty buffer returns zero diagnostics without error.
    pub fn train_step(&mut self) -> TrainStepMetrics {
        if self.episode_transitions.is_empty() {
            return TrainStepMetrics {
                episode_reward: 0.0,
                mean_abs_weight: 0.0,
                train_step: self.train_step_count,
            };
        }

        // Discounted returns, computed backward: G_t = r_t + gamma * G_{t+1}.
        let n = self.episode_transitions.len();
        let mut returns = vec![0.0f64; n];
        let mut g = 0.0;
        for (i, transition) in self.episode_transitions.iter().enumerate().rev() {
            g = transition.reward + self.gamma * g;
            returns[i] = g;
        }

        // Whiten (subtract mean, divide by std + eps) when >1 transition.
        if n > 1 {
            let mean = returns.iter().sum::<f64>() / n as f64;
            let var = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n as f64;
            let std = var.sqrt();
            for r in &mut returns {
                *r = (*r - mean) / (std + WHITEN_EPS);
            }
        }

        let transitions = std::mem::take(&mut self.episode_transitions);
        for (i, transition) in transitions.iter().enumerate() {
            let advantage = returns[i];

            // Positive advantage pulls W,b toward the taken action at full
            // magnitude; negative pushes away at one-tenth.
            let scale = if advantage > 0.0 {
                self.learning_rate * advantage
            } else {
                -self.learning_rate * advantage.abs() * 0.1
            };

            for (s_idx, &s) in transition.state.iter().enumerate().take(self.state_dim) {
                let row = &mut self.w[s_idx * self.action_dim..(s_idx + 1) * self.action_dim];
                for (a_idx, w) in row.iter_mut().enumerate() {
                    *w += scale * s * transition.action[a_idx];
                }
            }
            for (a_idx, b) in self.b.iter_mut().enumerate() {
                *b += scale * transition.action[a_idx];
            }
        }

        let episode_reward = transitions.iter().map(|t| t.reward).sum();
        let mean_abs_weight = self.w.iter().map(|w| w.abs()).sum::<f64>() / self.w.len() as f64;

        self.train_step_count += 1;

        TrainStepMetrics {
            episode_reward,
            mean_abs_weight,
            train_step: self.train_step_count,
        }
    }

    /// Persist W, b, and hyperparameters as a JSON checkpoint.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let checkpoint = PolicyCheckpoint {
            version: CHECKPOINT_VERSION,
            state_dim: self.state_dim,
            action_dim: self.action_dim,
            learning_rate: self.learning_rate,
            gamma: self.gamma,
            w: self.w.clone(),
            b: self.b.clone(),
        };

        let payload = serde_json::to_string_pretty(&checkpoint)?;
        fs::write(path, payload)?;
        Ok(())
    }

    /// Restore an agent from a JSON checkpoint.
    ///
    /// The agent is constructed under a fixed seed; the seed only affects
    /// fresh initialization, which the checkpoint weights overwrite.
    pub fn load(path: &Path) -> Result<Self> {
        let payload = fs::read_to_string(path)?;
        let checkpoint: PolicyCheckpoint = serde_json::from_str(&payload)?;

        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(TunerError::Checkpoint(format!(
                "unsupported checkpoint version {} (expected {})",
                checkpoint.version, CHECKPOINT_VERSION
            )));
        }
        if checkpoint.w.len() != checkpoint.state_dim * checkpoint.action_dim
            || checkpoint.b.len() != checkpoint.action_dim
        {
            return Err(TunerError::Checkpoint(format!(
                "checkpoint dims inconsistent: w={} b={} for {}x{}",
                checkpoint.w.len(),
                checkpoint.b.len(),
                checkpoint.state_dim,
                checkpoint.action_dim
            )));
        }

        let mut agent = Self::new(
            checkpoint.state_dim,
            checkpoint.action_dim,
            checkpoint.learning_rate,
            checkpoint.gamma,
            42,
        );
        agent.w = checkpoint.w;
        agent.b = checkpoint.b;
        Ok(agent)
    }
}
