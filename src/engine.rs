// src/engine.rs
//
// Capability interface for the external walk-forward backtest engine,
// plus a deterministic mock implementation.
//
// The tuner is polymorphic over `run(config) -> BacktestRunResult`: the
// training and evaluation loops take `&mut dyn BacktestEngine`, so they
// can be exercised against the mock with no data, filesystem, or network
// dependency, and wired to a real engine unchanged.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::config::{BacktestConfig, Mode};
use crate::error::Result;
use crate::types::{BacktestRunResult, GovernanceEvent, GovernanceSummary, WindowResult};

/// External walk-forward backtest engine.
///
/// `run` is treated as a pure function from configuration to a sequence
/// of window results; it is the only blocking call in the tuner and has
/// no timeout.
pub trait BacktestEngine {
    fn run(&mut self, cfg: &BacktestConfig) -> Result<BacktestRunResult>;
}

/// Deterministic synthetic backtest engine.
///
/// Generates plausible window metrics from a seeded RNG, with mild
/// sensitivity to the governance thresholds in the config so that the
/// training loop sees a real (if simple) optimization surface:
/// - Extreme mode raises mean Sharpe but deepens drawdowns.
/// - Tighter thresholds raise the breach rate of governance events.
///
/// Successive `run` calls advance the shared RNG stream, so the same
/// engine produces different windows per step while remaining fully
/// reproducible from the construction seed.
pub struct MockBacktestEngine {
    rng: ChaCha8Rng,
    windows_per_run: usize,
}

impl MockBacktestEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            windows_per_run: 6,
        }
    }

    pub fn with_windows_per_run(mut self, windows: usize) -> Self {
        self.windows_per_run = windows.max(1);
        self
    }

    fn gen_window(&mut self, cfg: &BacktestConfig) -> WindowResult {
        let z_sharpe: f64 = StandardNormal.sample(&mut self.rng);
        let z_dd: f64 = StandardNormal.sample(&mut self.rng);
        let z_to: f64 = StandardNormal.sample(&mut self.rng);

        let (sharpe_mu, dd_mu) = match cfg.mode {
            Mode::Basic => (1.1, -9.0),
            Mode::Extreme => (1.4, -14.0),
        };

        let sharpe_ratio = sharpe_mu + 0.4 * z_sharpe;
        let max_drawdown = (dd_mu + 3.0 * z_dd).min(-1.0);
        let turnover_rate = (85.0 + 20.0 * z_to).max(5.0);
        let total_return = sharpe_ratio * 4.0 + self.rng.gen_range(-2.0..2.0);
        let tracking_error = Some(f64::max(3.5 + self.rng.gen_range(-1.0..1.5), 0.5));

        let governance_events = vec![
            GovernanceEvent {
                rule: "sharpe_floor".to_string(),
                triggered: sharpe_ratio < cfg.sharpe_threshold,
            },
            GovernanceEvent {
                rule: "max_drawdown".to_string(),
                triggered: max_drawdown / 100.0 < cfg.max_drawdown_threshold,
            },
            GovernanceEvent {
                rule: "turnover".to_string(),
                triggered: turnover_rate / 100.0 > cfg.turnover_max,
            },
            GovernanceEvent {
                rule: "tracking_error".to_string(),
                triggered: tracking_error
                    .map(|te| te / 100.0 > cfg.tracking_error_max)
                    .unwrap_or(false),
            },
        ];

        WindowResult {
            sharpe_ratio,
            max_drawdown,
            total_return,
            turnover_rate,
            tracking_error,
            governance_events,
        }
    }
}

impl BacktestEngine for MockBacktestEngine {
    fn run(&mut self, cfg: &BacktestConfig) -> Result<BacktestRunResult> {
        let window_results: Vec<WindowResult> = (0..self.windows_per_run)
            .map(|_| self.gen_window(cfg))
            .collect();

        let windows_with_any_breach = window_results
            .iter()
            .filter(|w| w.governance_events.iter().any(|e| e.triggered))
            .count();

        let governance_summary = Some(GovernanceSummary {
            windows_with_any_breach,
            total_windows: window_results.len(),
        });

        Ok(BacktestRunResult {
            window_results,
            governance_summary,
        })
    }
}
