// src/config.rs
//
// Central configuration for the governance tuner.
//
// BacktestConfig is the contract with the external walk-forward engine:
// a base configuration that the training loop overlays with the current
// governance thresholds before every engine invocation.
//
// TrainConfig / EvalConfig are the static inputs of the two entry points
// (`rl::train` / `rl::evaluate`); both are immutable for the run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the backtest engine sources its historical data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Deterministic synthetic data (no filesystem / network).
    Mock,
    /// External market-data provider.
    Finmind,
}

impl DataSource {
    /// Stable lowercase name (used in logs/telemetry).
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Mock => "mock",
            DataSource::Finmind => "finmind",
        }
    }

    /// Parse a data source name (case-insensitive). Returns None if unrecognized.
    pub fn parse(s: &str) -> Option<DataSource> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Some(DataSource::Mock),
            "finmind" => Some(DataSource::Finmind),
            _ => None,
        }
    }
}

/// Governance mode gating how aggressively the strategy is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Basic,
    Extreme,
}

impl Mode {
    /// Stable lowercase name (used in logs/telemetry and engine configs).
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Basic => "basic",
            Mode::Extreme => "extreme",
        }
    }

    /// Integer id used in the state encoding: basic=0, extreme=1.
    pub fn id(&self) -> u8 {
        match self {
            Mode::Basic => 0,
            Mode::Extreme => 1,
        }
    }
}

/// Configuration passed to the external backtest engine for one run.
///
/// The four governance thresholds use the engine's own conventions:
/// fractions rather than percent, and drawdown as a negative fraction
/// (-0.15 means a 15% drawdown limit). `overlay_governance` in
/// `rl::params` performs the percent-to-fraction mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    /// Strategy identifier forwarded to the engine.
    pub strategy: String,
    /// Inclusive backtest start date (ISO-8601).
    pub start_date: String,
    /// Inclusive backtest end date (ISO-8601).
    pub end_date: String,
    /// Walk-forward window length in trading days.
    pub window_days: u32,

    // ----- Governance thresholds (engine conventions) -----
    /// Minimum acceptable Sharpe ratio.
    pub sharpe_threshold: f64,
    /// Maximum drawdown as a negative fraction (e.g. -0.15).
    pub max_drawdown_threshold: f64,
    /// Maximum annualized turnover as a fraction (e.g. 1.0 = 100%).
    pub turnover_max: f64,
    /// Maximum annualized tracking error as a fraction (e.g. 0.04).
    pub tracking_error_max: f64,
    /// Governance mode.
    pub mode: Mode,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            strategy: "momentum".to_string(),
            start_date: "2020-01-01".to_string(),
            end_date: "2023-12-31".to_string(),
            window_days: 63,
            sharpe_threshold: 1.0,
            max_drawdown_threshold: -0.15,
            turnover_max: 1.0,
            tracking_error_max: 0.04,
            mode: Mode::Basic,
        }
    }
}

/// Static inputs for a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Experiment name; keys the best-policy checkpoint path.
    pub experiment_name: String,
    /// Backtest data source.
    pub data_source: DataSource,
    /// Initial governance mode for the engine.
    pub mode: Mode,
    /// Base backtest configuration overlaid with thresholds each step.
    pub base_config: BacktestConfig,
    /// Number of training episodes.
    pub episodes: usize,
    /// Steps per episode.
    pub max_steps_per_episode: usize,
    /// Discount factor for returns.
    pub gamma: f64,
    /// Policy learning rate.
    pub learning_rate: f64,
    /// RNG seed for the agent.
    pub seed: u64,
    /// Root directory for per-experiment checkpoints.
    pub models_dir: PathBuf,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            experiment_name: "default".to_string(),
            data_source: DataSource::Mock,
            mode: Mode::Basic,
            base_config: BacktestConfig::default(),
            episodes: 100,
            max_steps_per_episode: 10,
            gamma: 0.99,
            learning_rate: 0.001,
            seed: 42,
            models_dir: PathBuf::from("models/govtune"),
        }
    }
}

impl TrainConfig {
    pub fn with_experiment_name(mut self, name: &str) -> Self {
        self.experiment_name = name.to_string();
        self
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_max_steps_per_episode(mut self, steps: usize) -> Self {
        self.max_steps_per_episode = steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_models_dir(mut self, dir: PathBuf) -> Self {
        self.models_dir = dir;
        self
    }

    /// Path of the best-policy checkpoint for this experiment.
    pub fn best_policy_path(&self) -> PathBuf {
        self.models_dir
            .join(&self.experiment_name)
            .join("best_policy.json")
    }
}

/// Static inputs for an evaluation run of a saved policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Experiment name (for logs).
    pub experiment_name: String,
    /// Backtest data source.
    pub data_source: DataSource,
    /// Initial governance mode for the engine.
    pub mode: Mode,
    /// Base backtest configuration overlaid with thresholds each step.
    pub base_config: BacktestConfig,
    /// Number of evaluation episodes.
    pub eval_episodes: usize,
    /// Steps per episode.
    pub max_steps_per_episode: usize,
    /// Checkpoint to load; load failure aborts evaluation.
    pub policy_path: PathBuf,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            experiment_name: "default".to_string(),
            data_source: DataSource::Mock,
            mode: Mode::Basic,
            base_config: BacktestConfig::default(),
            eval_episodes: 5,
            max_steps_per_episode: 10,
            policy_path: PathBuf::from("models/govtune/default/best_policy.json"),
        }
    }
}

impl EvalConfig {
    pub fn with_policy_path(mut self, path: PathBuf) -> Self {
        self.policy_path = path;
        self
    }

    pub fn with_eval_episodes(mut self, episodes: usize) -> Self {
        self.eval_episodes = episodes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_roundtrip() {
        let json = serde_json::to_string(&Mode::Extreme).unwrap();
        assert_eq!(json, "\"extreme\"");
        let parsed: Mode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Mode::Extreme);
    }

    #[test]
    fn test_mode_ids() {
        assert_eq!(Mode::Basic.id(), 0);
        assert_eq!(Mode::Extreme.id(), 1);
    }

    #[test]
    fn test_data_source_parse() {
        assert_eq!(DataSource::parse("Mock"), Some(DataSource::Mock));
        assert_eq!(DataSource::parse(" finmind "), Some(DataSource::Finmind));
        assert_eq!(DataSource::parse("csv"), None);
    }

    #[test]
    fn test_best_policy_path_keyed_by_experiment() {
        let cfg = TrainConfig::default().with_experiment_name("exp_a");
        assert_eq!(
            cfg.best_policy_path(),
            PathBuf::from("models/govtune/exp_a/best_policy.json")
        );
    }
}
