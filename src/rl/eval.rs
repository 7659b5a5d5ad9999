// src/rl/eval.rs
//
// Evaluation loop: deterministic rollout of a saved policy.
//
// Loads a checkpoint (load failure is fatal and aborts the run), then
// runs episodes with deterministic action selection and no learning,
// averaging per-episode rewards and final-window metrics.

use serde::{Deserialize, Serialize};

use crate::config::EvalConfig;
use crate::engine::BacktestEngine;
use crate::error::Result;
use crate::rl::agent::GaussianPolicyAgent;
use crate::rl::encoder::{State, HISTORY_LEN};
use crate::rl::params::{Action, GovernanceParams};
use crate::rl::reward::compute_reward;
use crate::types::WindowResult;

/// Mean final-window metrics across evaluation episodes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EvalMetrics {
    pub avg_reward: f64,
    pub avg_sharpe: f64,
    pub avg_max_drawdown: f64,
    pub avg_total_return: f64,
    pub avg_turnover: f64,
    pub avg_breach_ratio: f64,
}

/// Result of an evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalResult {
    /// Raw per-episode total rewards.
    pub episode_rewards: Vec<f64>,
    pub metrics: EvalMetrics,
}

/// Final-window snapshot collected per episode.
struct EpisodeFinal {
    sharpe: f64,
    max_drawdown: f64,
    total_return: f64,
    turnover: f64,
    breach_ratio: f64,
}

/// Evaluate a saved policy against the given backtest engine.
///
/// Engine failure mid-episode ends that episode early; no penalty
/// reward is injected during evaluation.
pub fn evaluate(config: &EvalConfig, engine: &mut dyn BacktestEngine) -> Result<EvalResult> {
    let mut agent = GaussianPolicyAgent::load(&config.policy_path)?;

    println!(
        "govtune eval | experiment={} | source={} | episodes={} | policy={}",
        config.experiment_name,
        config.data_source.as_str(),
        config.eval_episodes,
        config.policy_path.display()
    );

    let mut episode_rewards: Vec<f64> = Vec::with_capacity(config.eval_episodes);
    let mut finals: Vec<EpisodeFinal> = Vec::new();

    for episode in 1..=config.eval_episodes {
        let mut params = GovernanceParams::sample_initial(config.mode);
        let mut episode_reward = 0.0;
        let mut episode_final: Option<EpisodeFinal> = None;

        for _step in 1..=config.max_steps_per_episode {
            let backtest_cfg = params.overlay_governance(&config.base_config);

            let run = match engine.run(&backtest_cfg) {
                Ok(run) => run,
                Err(_) => break,
            };

            let Some(latest) = run.window_results.last().cloned() else {
                continue;
            };

            // Evaluation uses the run's own trailing windows as history.
            let recent: &[WindowResult] = if run.window_results.len() > HISTORY_LEN {
                &run.window_results[run.window_results.len() - HISTORY_LEN..]
            } else {
                &run.window_results
            };

            let state_vec = State::from_window(&latest, &params, recent).encode();
            let action_vec = agent.select_action(&state_vec, true);
            let action = Action::from_vec(&action_vec);

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

            episode_final = Some(EpisodeFinal {
                sharpe: latest.sharpe_ratio,
                max_drawdown: latest.max_drawdown,
                total_return: latest.total_return,
                turnover: latest.turnover_rate,
                breach_ratio,
            });

            params = params.apply(&action);
        }

        episode_rewards.push(episode_reward);
        if let Some(f) = episode_final {
            finals.push(f);
        }

        println!(
            "  eval episode {}/{}: reward={:.2}",
            episode, config.eval_episodes, episode_reward
        );
    }

    let avg_reward = mean(&episode_rewards);
    let metrics = EvalMetrics {
        avg_reward,
        avg_sharpe: mean_by(&finals, |f| f.sharpe),
        avg_max_drawdown: mean_by(&finals, |f| f.max_drawdown),
        avg_total_return: mean_by(&finals, |f| f.total_return),
        avg_turnover: mean_by(&finals, |f| f.turnover),
        avg_breach_ratio: mean_by(&finals, |f| f.breach_ratio),
    };

    println!("govtune eval complete | avg_reward={:.2}", avg_reward);

    Ok(EvalResult {
        episode_rewards,
        metrics,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_by(finals: &[EpisodeFinal], f: impl Fn(&EpisodeFinal) -> f64) -> f64 {
    if finals.is_empty() {
        return 0.0;
    }
    finals.iter().map(f).sum::<f64>() / finals.len() as f64
}
