//! Govtune core library.
//!
//! A reinforcement-learning tuner that iteratively adjusts the
//! risk-governance thresholds gating an external walk-forward backtest:
//! minimum acceptable Sharpe ratio, maximum drawdown, maximum turnover,
//! maximum tracking error, and a discrete basic/extreme mode.
//!
//! # Architecture
//!
//! - **Engine boundary** (`engine`): the `BacktestEngine` capability
//!   trait plus a deterministic `MockBacktestEngine`, so the tuner runs
//!   against a fake engine with no data or network dependency.
//!
//! - **RL core** (`rl`): governance parameter/action space, the state
//!   encoder, the reward function, a linear Gaussian policy agent with a
//!   simplified REINFORCE update, and the training/evaluation loops.
//!
//! - **Configuration** (`config`): backtest, training, and evaluation
//!   configs; static for the duration of a run.
//!
//! Everything is single-threaded and strictly sequential: the only
//! blocking call is into the backtest engine, and all mutable state
//! (agent, thresholds, window history) is singly owned by the loop.

pub mod config;
pub mod engine;
pub mod error;
pub mod rl;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use config::{BacktestConfig, DataSource, EvalConfig, Mode, TrainConfig};
pub use engine::{BacktestEngine, MockBacktestEngine};
pub use error::{Result, TunerError};
pub use types::{BacktestRunResult, GovernanceEvent, GovernanceSummary, WindowResult};

pub use rl::{
    compute_reward, evaluate, train, Action, EvalMetrics, EvalResult, GaussianPolicyAgent,
    GovernanceParams, State, TrainMetrics, TrainResult, TrainStepMetrics, Transition,
    TunerTelemetry, ACTION_DIM, ENGINE_FAILURE_REWARD, STATE_DIM,
};
