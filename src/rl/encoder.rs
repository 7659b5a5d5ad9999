// src/rl/encoder.rs
//
// State encoder: maps the latest window result, recent window history,
// and current governance thresholds to a fixed-length numeric vector.
//
// Design requirements (mirroring the observation layer conventions):
// - Fixed dimensionality and field order for reproducibility
// - Serializable (serde) for logging and replay
// - Normalized and clipped features for stable training; the encoder
//   guarantees bounded, finite output even under degenerate backtest
//   results.

use serde::{Deserialize, Serialize};

use crate::rl::params::GovernanceParams;
use crate::types::WindowResult;

/// State vector dimensionality.
pub const STATE_DIM: usize = 12;

/// Action vector dimensionality.
pub const ACTION_DIM: usize = 5;

/// Number of recent windows retained for trailing averages.
pub const HISTORY_LEN: usize = 5;

/// Immutable per-step snapshot of tuner state.
///
/// Twelve numeric fields in fixed order; `encode` produces the vector
/// consumed by the policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct State {
    // ----- Latest window -----
    pub sharpe_last: f64,
    pub max_drawdown_last: f64,
    pub breach_ratio_last: f64,

    // ----- Trailing averages -----
    pub avg_sharpe_3: f64,
    pub avg_breach_ratio_3: f64,
    pub avg_sharpe_5: f64,
    pub avg_breach_ratio_5: f64,

    // ----- Current thresholds -----
    pub sharpe_floor: f64,
    pub max_drawdown_limit: f64,
    pub turnover_limit: f64,
    pub te_max: f64,

    /// 0 = basic, 1 = extreme.
    pub mode_id: u8,
}

impl State {
    /// Build a state from the latest window, current thresholds, and up
    /// to the last `HISTORY_LEN` windows (latest included, oldest first).
    ///
    /// Trailing averages fall back to the latest single value when the
    /// history is shorter than the averaging horizon.
    pub fn from_window(
        latest: &WindowResult,
        params: &GovernanceParams,
        recent: &[WindowResult],
    ) -> Self {
        let sharpe = latest.sharpe_ratio;
        let breach_ratio = latest.breach_ratio();

        let tail = if recent.len() > HISTORY_LEN {
            &recent[recent.len() - HISTORY_LEN..]
        } else {
            recent
        };

        let sharpe_list: Vec<f64> = tail.iter().map(|w| w.sharpe_ratio).collect();
        let breach_list: Vec<f64> = tail.iter().map(|w| w.breach_ratio()).collect();

        let avg_sharpe_3 = if sharpe_list.len() >= 3 {
            mean(&sharpe_list[sharpe_list.len() - 3..])
        } else {
            sharpe
        };
        let avg_sharpe_5 = if sharpe_list.is_empty() {
            sharpe
        } else {
            mean(&sharpe_list)
        };
        let avg_breach_3 = if breach_list.len() >= 3 {
            mean(&breach_list[breach_list.len() - 3..])
        } else {
            breach_ratio
        };
        let avg_breach_5 = if breach_list.is_empty() {
            breach_ratio
        } else {
            mean(&breach_list)
        };

        Self {
            sharpe_last: sharpe,
            max_drawdown_last: latest.max_drawdown,
            breach_ratio_last: breach_ratio,
            avg_sharpe_3,
            avg_breach_ratio_3: avg_breach_3,
            avg_sharpe_5,
            avg_breach_ratio_5: avg_breach_5,
            sharpe_floor: params.sharpe_floor,
            max_drawdown_limit: params.max_drawdown_limit,
            turnover_limit: params.turnover_limit,
            te_max: params.te_max,
            mode_id: params.mode.id(),
        }
    }

    /// Encode to a fixed-order vector of length `STATE_DIM`.
    ///
    /// Percent-denominated fields are normalized by 100; every element
    /// is sanitized to a finite value in [-10, 10] (NaN becomes 0).
    pub fn encode(&self) -> Vec<f64> {
        let raw = [
            self.sharpe_last,
            self.max_drawdown_last / 100.0,
            self.breach_ratio_last,
            self.avg_sharpe_3,
            self.avg_breach_ratio_3,
            self.avg_sharpe_5,
            self.avg_breach_ratio_5,
            self.sharpe_floor,
            self.max_drawdown_limit / 100.0,
            self.turnover_limit / 100.0,
            self.te_max / 100.0,
            self.mode_id as f64,
        ];

        raw.iter().map(|&v| sanitize(v)).collect()
    }
}

/// Clip to [-10, 10] and replace NaN with 0.
fn sanitize(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-10.0, 10.0)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::types::GovernanceEvent;

    fn window(sharpe: f64, dd: f64, breached: bool) -> WindowResult {
        WindowResult {
            sharpe_ratio: sharpe,
            max_drawdown: dd,
            total_return: 0.0,
            turnover_rate: 50.0,
            tracking_error: None,
            governance_events: vec![GovernanceEvent {
                rule: "max_drawdown".to_string(),
                triggered: breached,
            }],
        }
    }

    #[test]
    fn test_state_vector_dimension() {
        let params = GovernanceParams::sample_initial(Mode::Basic);
        let latest = window(1.2, -8.0, false);
        let state = State::from_window(&latest, &params, std::slice::from_ref(&latest));
        assert_eq!(state.encode().len(), STATE_DIM);
    }

    #[test]
    fn test_short_history_falls_back_to_latest() {
        let params = GovernanceParams::sample_initial(Mode::Basic);
        let latest = window(2.0, -5.0, true);
        let state = State::from_window(&latest, &params, std::slice::from_ref(&latest));

        // With a single window, all trailing averages equal the latest.
        assert_eq!(state.avg_sharpe_3, 2.0);
        assert_eq!(state.avg_breach_ratio_3, 1.0);
        // avg-5 is the mean of the one available window.
        assert_eq!(state.avg_sharpe_5, 2.0);
        assert_eq!(state.avg_breach_ratio_5, 1.0);
    }

    #[test]
    fn test_trailing_averages_over_full_history() {
        let params = GovernanceParams::sample_initial(Mode::Basic);
        let history: Vec<WindowResult> = [1.0, 2.0, 3.0, 4.0, 5.0]
            .iter()
            .map(|&s| window(s, -8.0, false))
            .collect();
        let latest = history.last().unwrap().clone();
        let state = State::from_window(&latest, &params, &history);

        assert!((state.avg_sharpe_3 - 4.0).abs() < 1e-12);
        assert!((state.avg_sharpe_5 - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_history_longer_than_five_uses_tail() {
        let params = GovernanceParams::sample_initial(Mode::Basic);
        let history: Vec<WindowResult> = [10.0, 1.0, 2.0, 3.0, 4.0, 5.0]
            .iter()
            .map(|&s| window(s, -8.0, false))
            .collect();
        let latest = history.last().unwrap().clone();
        let state = State::from_window(&latest, &params, &history);

        // The leading 10.0 window falls outside the 5-window tail.
        assert!((state.avg_sharpe_5 - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_encode_normalizes_thresholds() {
        let params = GovernanceParams::sample_initial(Mode::Basic);
        let latest = window(1.0, -20.0, false);
        let vec = State::from_window(&latest, &params, std::slice::from_ref(&latest)).encode();

        assert!((vec[1] - (-0.2)).abs() < 1e-12); // drawdown / 100
        assert!((vec[8] - 0.15).abs() < 1e-12); // mdd limit / 100
        assert!((vec[9] - 1.0).abs() < 1e-12); // turnover limit / 100
        assert!((vec[10] - 0.04).abs() < 1e-12); // te max / 100
        assert_eq!(vec[11], 0.0); // mode id
    }

    #[test]
    fn test_encode_sanitizes_non_finite_inputs() {
        let params = GovernanceParams::sample_initial(Mode::Basic);
        let cases = [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e18, -1e18];
        for &bad in &cases {
            let latest = window(bad, bad, false);
            let vec = State::from_window(&latest, &params, std::slice::from_ref(&latest)).encode();

            for v in vec {
                assert!(v.is_finite());
                assert!((-10.0..=10.0).contains(&v));
            }
        }
    }
}
