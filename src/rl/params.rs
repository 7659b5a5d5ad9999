// src/rl/params.rs
//
// Governance parameter space and action space.
//
// GovernanceParams holds the five tunable thresholds gating the external
// backtest; Action is the bounded delta surface the policy emits. One
// action perturbs each threshold by a small, economically meaningful
// amount, and every update is unconditionally clamped to its declared
// range. Clamping is the sole safety mechanism here and never errors.

use serde::{Deserialize, Serialize};

use crate::config::{BacktestConfig, Mode};

/// Per-field delta step scales: one unit of action delta moves the
/// threshold by this much before clamping.
pub const STEP_SHARPE_FLOOR: f64 = 0.1;
pub const STEP_MAX_DRAWDOWN_LIMIT: f64 = 1.0;
pub const STEP_TURNOVER_LIMIT: f64 = 5.0;
pub const STEP_TE_MAX: f64 = 0.5;

/// Declared clip ranges for each threshold.
pub const SHARPE_FLOOR_RANGE: (f64, f64) = (-1.0, 3.0);
pub const MAX_DRAWDOWN_LIMIT_RANGE: (f64, f64) = (5.0, 40.0);
pub const TURNOVER_LIMIT_RANGE: (f64, f64) = (10.0, 200.0);
pub const TE_MAX_RANGE: (f64, f64) = (1.0, 10.0);

/// The five tunable governance thresholds.
///
/// Owned by the loop; mutated once per step via `apply`, re-sampled at
/// episode start. Limits are in percent (annualized for turnover).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GovernanceParams {
    /// Minimum acceptable Sharpe ratio.
    pub sharpe_floor: f64,
    /// Maximum drawdown limit in percent (positive, e.g. 15.0).
    pub max_drawdown_limit: f64,
    /// Maximum annualized turnover in percent.
    pub turnover_limit: f64,
    /// Maximum annualized tracking error in percent.
    pub te_max: f64,
    /// Governance mode.
    pub mode: Mode,
}

impl GovernanceParams {
    /// Sensible starting thresholds for a fresh episode, in the given
    /// starting mode.
    pub fn sample_initial(mode: Mode) -> Self {
        Self {
            sharpe_floor: 1.0,
            max_drawdown_limit: 15.0,
            turnover_limit: 100.0,
            te_max: 4.0,
            mode,
        }
    }

    /// Apply an action, producing the next parameter set.
    ///
    /// Mode is re-decided from the sign of the mode logit on every step;
    /// there is no hysteresis, so it can flip each step by design.
    pub fn apply(&self, action: &Action) -> Self {
        let sharpe_floor = (self.sharpe_floor + action.delta_sharpe_floor * STEP_SHARPE_FLOOR)
            .clamp(SHARPE_FLOOR_RANGE.0, SHARPE_FLOOR_RANGE.1);
        let max_drawdown_limit = (self.max_drawdown_limit
            + action.delta_max_drawdown_limit * STEP_MAX_DRAWDOWN_LIMIT)
            .clamp(MAX_DRAWDOWN_LIMIT_RANGE.0, MAX_DRAWDOWN_LIMIT_RANGE.1);
        let turnover_limit = (self.turnover_limit
            + action.delta_turnover_limit * STEP_TURNOVER_LIMIT)
            .clamp(TURNOVER_LIMIT_RANGE.0, TURNOVER_LIMIT_RANGE.1);
        let te_max = (self.te_max + action.delta_te_max * STEP_TE_MAX)
            .clamp(TE_MAX_RANGE.0, TE_MAX_RANGE.1);

        let mode = if action.delta_mode_logit > 0.0 {
            Mode::Extreme
        } else {
            Mode::Basic
        };

        Self {
            sharpe_floor,
            max_drawdown_limit,
            turnover_limit,
            te_max,
            mode,
        }
    }

    /// Overlay these thresholds onto a base backtest configuration.
    ///
    /// Maps percent-denominated limits to the engine's fraction
    /// conventions; the drawdown limit is stored as a negative fraction.
    pub fn overlay_governance(&self, base: &BacktestConfig) -> BacktestConfig {
        let mut cfg = base.clone();
        cfg.sharpe_threshold = self.sharpe_floor;
        cfg.max_drawdown_threshold = -self.max_drawdown_limit / 100.0;
        cfg.turnover_max = self.turnover_limit / 100.0;
        cfg.tracking_error_max = self.te_max / 100.0;
        cfg.mode = self.mode;
        cfg
    }
}

/// Bounded action surface: five continuous deltas produced by the policy.
///
/// The first four perturb thresholds; the mode logit selects extreme mode
/// iff strictly positive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Action {
    pub delta_sharpe_floor: f64,
    pub delta_max_drawdown_limit: f64,
    pub delta_turnover_limit: f64,
    pub delta_te_max: f64,
    pub delta_mode_logit: f64,
}

impl Action {
    /// Build an action from a policy output vector.
    ///
    /// The slice must have at least `ACTION_DIM` elements; extra
    /// elements are ignored.
    pub fn from_vec(v: &[f64]) -> Self {
        Self {
            delta_sharpe_floor: v[0],
            delta_max_drawdown_limit: v[1],
            delta_turnover_limit: v[2],
            delta_te_max: v[3],
            delta_mode_logit: v[4],
        }
    }
}
