// src/rl/training.rs
//
// Training loop: episodes of steps, each step interleaving one policy
// decision with one external backtest run.
//
// Per step: overlay current thresholds onto the base config, run the
// engine (capped to a few windows for speed), take the last window,
// encode state, sample an exploratory action, apply it, compute reward,
// and record the transition. Episode end triggers a policy update and
// best-model checkpointing.
//
// Engine failure mid-episode is absorbed locally: a fixed penalty reward
// is added and the episode ends early. It is never propagated.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::TrainConfig;
use crate::engine::BacktestEngine;
use crate::error::Result;
use crate::rl::agent::{GaussianPolicyAgent, Transition};
use crate::rl::encoder::{State, ACTION_DIM, HISTORY_LEN, STATE_DIM};
use crate::rl::params::{Action, GovernanceParams};
use crate::rl::reward::compute_reward;
use crate::rl::telemetry::{StepRecord, TerminationReason, TunerTelemetry};
use crate::types::WindowResult;

/// Fixed penalty reward injected when the engine fails during a step.
pub const ENGINE_FAILURE_REWARD: f64 = -10.0;

/// Window cap per training-step backtest run.
const MAX_TRAIN_WINDOWS: usize = 3;

/// Aggregate reward metrics over a training run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrainMetrics {
    pub avg_reward: f64,
    pub best_reward: f64,
    pub final_reward: f64,
}

/// Result of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainResult {
    /// Per-episode total rewards, length = configured episode count.
    pub episode_rewards: Vec<f64>,
    pub metrics: TrainMetrics,
    /// Checkpoint of the best episode's policy; None only if no episode
    /// reward ever exceeded negative infinity.
    pub best_policy_path: Option<PathBuf>,
}

/// Train a fresh policy against the given backtest engine.
///
/// Synchronous and strictly sequential; returns only when all episodes
/// have run. Checkpoint write failures are fatal.
pub fn train(config: &TrainConfig, engine: &mut dyn BacktestEngine) -> Result<TrainResult> {
    let mut agent = GaussianPolicyAgent::new(
        STATE_DIM,
        ACTION_DIM,
        config.learning_rate,
        config.gamma,
        config.seed,
    );
    let mut telemetry = TunerTelemetry::from_env();

    println!(
        "govtune train | experiment={} | source={} | episodes={} | steps={} | seed={}",
        config.experiment_name,
        config.data_source.as_str(),
        config.episodes,
        config.max_steps_per_episode,
        config.seed
    );

    let mut episode_rewards: Vec<f64> = Vec::with_capacity(config.episodes);
    let mut best_reward = f64::NEG_INFINITY;
    let mut best_policy_path: Option<PathBuf> = None;

    for episode in 1..=config.episodes {
        telemetry.log_episode_start(episode, config.seed);

        let mut params = GovernanceParams::sample_initial(config.mode);
        let mut recent_windows: Vec<WindowResult> = Vec::with_capacity(HISTORY_LEN);
        let mut episode_reward = 0.0;
        let mut steps_recorded = 0usize;
        let mut termination = TerminationReason::Completed;

        for step in 1..=config.max_steps_per_episode {
            let backtest_cfg = params.overlay_governance(&config.base_config);

            let run = match engine.run(&backtest_cfg) {
                Ok(run) => run.truncated(MAX_TRAIN_WINDOWS),
                Err(err) => {
                    // Absorbed locally: penalty reward, early episode end.
                    println!(
                        "  episode {episode} step {step}: engine failed ({err}), ending episode"
                    );
                    episode_reward += ENGINE_FAILURE_REWARD;
                    termination = TerminationReason::EngineFailure;
                    break;
                }
            };

            // Zero windows: skip the step silently.
            let Some(latest) = run.window_results.last().cloned() else {
                continue;
            };

            recent_windows.push(latest.clone());
            if recent_windows.len() > HISTORY_LEN {
                recent_windows.remove(0);
            }

            let state_vec = State::from_window(&latest, &params, &recent_windows).encode();
            let action_vec = agent.select_action(&state_vec, false);
            let action = Action::from_vec(&action_vec);
            let next_params = params.apply(&action);

            let breach_ratio = run
                .governance_summary
                .map(|s| s.breach_ratio())
                .unwrap_or(0.0);
            let reward = compute_reward(
                latest.sharpe_ratio,
                latest.max_drawdown,
                breach_ratio,
                latest.turnover_rate,
            );
            episode_reward += reward;

            // Next state uses the updated thresholds against the same window.
            let next_state_vec =
                State::from_window(&latest, &next_params, &recent_windows).encode();
            let done = step == config.max_steps_per_episode;

            telemetry.log_step(&StepRecord {
                episode,
                step,
                state: state_vec.clone(),
                action: action_vec.clone(),
                reward,
                done,
                params: next_params,
            });

            agent.observe(Transition {
                state: state_vec,
                action: action_vec,
                reward,
                next_state: next_state_vec,
                done,
            });
            steps_recorded += 1;

            params = next_params;
        }

        let train_metrics = agent.train_step();
        episode_rewards.push(episode_reward);
        telemetry.log_episode_end(episode, episode_reward, termination, steps_recorded);

        let recent_avg = rolling_mean(&episode_rewards, 10);
        println!(
            "  episode {}/{}: reward={:.2} avg10={:.2} |W|={:.4}",
            episode, config.episodes, episode_reward, recent_avg, train_metrics.mean_abs_weight
        );

        if episode_reward > best_reward {
            best_reward = episode_reward;
            let path = config.best_policy_path();
            agent.save(&path)?;
            println!("  saved best policy to {}", path.display());
            best_policy_path = Some(path);
        }
    }

    telemetry.flush();

    let metrics = TrainMetrics {
        avg_reward: if episode_rewards.is_empty() {
            0.0
        } else {
            episode_rewards.iter().sum::<f64>() / episode_rewards.len() as f64
        },
        best_reward,
        final_reward: episode_rewards.last().copied().unwrap_or(0.0),
    };

    println!(
        "govtune train complete | best={:.2} avg={:.2}",
        metrics.best_reward, metrics.avg_reward
    );

    Ok(TrainResult {
        episode_rewards,
        metrics,
        best_policy_path,
    })
}

/// Mean of the trailing `n` values.
fn rolling_mean(values: &[f64], n: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let tail = if values.len() > n {
        &values[values.len() - n..]
    } else {
        values
    };
    tail.iter().sum::<f64>() / tail.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BacktestConfig;
    use crate::engine::MockBacktestEngine;
    use crate::error::TunerError;
    use crate::types::BacktestRunResult;

    /// Engine that fails on every call.
    struct FailingEngine;

    impl BacktestEngine for FailingEngine {
        fn run(&mut self, _cfg: &BacktestConfig) -> Result<BacktestRunResult> {
            Err(TunerError::Engine("data source unavailable".to_string()))
        }
    }

    /// Engine that returns runs with no windows.
    struct EmptyEngine;

    impl BacktestEngine for EmptyEngine {
        fn run(&mut self, _cfg: &BacktestConfig) -> Result<BacktestRunResult> {
            Ok(BacktestRunResult {
                window_results: Vec::new(),
                governance_summary: None,
            })
        }
    }

    fn small_config(dir: &std::path::Path) -> TrainConfig {
        TrainConfig::default()
            .with_experiment_name("training_tests")
            .with_episodes(3)
            .with_max_steps_per_episode(4)
            .with_seed(42)
            .with_models_dir(dir.to_path_buf())
    }

    #[test]
    fn test_train_produces_reward_per_episode() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(dir.path());
        let mut engine = MockBacktestEngine::new(7);

        let result = train(&config, &mut engine).unwrap();

        assert_eq!(result.episode_rewards.len(), 3);
        assert!(result.best_policy_path.is_some());
        assert!(result.best_policy_path.unwrap().exists());
        assert!(result.metrics.best_reward >= result.metrics.avg_reward);
    }

    #[test]
    fn test_engine_failure_injects_penalty_and_ends_episode() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(dir.path());
        let mut engine = FailingEngine;

        let result = train(&config, &mut engine).unwrap();

        // Every episode fails on its first step with exactly one penalty.
        assert_eq!(result.episode_rewards, vec![-10.0, -10.0, -10.0]);
        // A best episode still exists (-10 beats -inf), so a checkpoint
        // was written.
        assert!(result.best_policy_path.is_some());
    }

    #[test]
    fn test_zero_window_runs_are_skipped_silently() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(dir.path());
        let mut engine = EmptyEngine;

        let result = train(&config, &mut engine).unwrap();

        // No transitions, no rewards; episodes complete with zero total.
        assert_eq!(result.episode_rewards, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rolling_mean() {
        assert_eq!(rolling_mean(&[], 10), 0.0);
        assert_eq!(rolling_mean(&[2.0, 4.0], 10), 3.0);
        assert_eq!(rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2), 3.5);
    }
}
