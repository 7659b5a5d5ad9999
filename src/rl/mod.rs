// src/rl/mod.rs
//
// RL-based governance threshold tuner.
//
// Key components:
// - GovernanceParams / Action: the tunable threshold space and the
//   bounded delta surface the policy emits (params)
// - State: fixed-length encoded snapshot for policy input (encoder)
// - compute_reward: multi-objective scalar reward (reward)
// - GaussianPolicyAgent: linear Gaussian policy with a simplified
//   REINFORCE update and JSON checkpointing (agent)
// - train / evaluate: the two entry points, driving an external
//   BacktestEngine one step at a time (training / eval)
// - TunerTelemetry: JSONL logging of steps and episode boundaries
//
// Design principle: the policy tunes thresholds, clamping enforces the
// declared ranges. Every engine output is sanitized before the policy
// sees it.

pub mod agent;
pub mod encoder;
pub mod eval;
pub mod params;
pub mod reward;
pub mod telemetry;
pub mod training;

// Re-exports for convenience
pub use agent::{GaussianPolicyAgent, TrainStepMetrics, Transition, CHECKPOINT_VERSION};
pub use encoder::{State, ACTION_DIM, HISTORY_LEN, STATE_DIM};
pub use eval::{evaluate, EvalMetrics, EvalResult};
pub use params::{Action, GovernanceParams};
pub use reward::compute_reward;
pub use telemetry::{
    EpisodeMarker, EpisodeMarkerType, StepRecord, TerminationReason, TunerTelemetry,
};
pub use training::{train, TrainMetrics, TrainResult, ENGINE_FAILURE_REWARD};
