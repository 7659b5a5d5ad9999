// src/types.rs
//
// Shared data types at the boundary between the tuner and the external
// walk-forward backtest engine. The tuner treats these as read-only: it
// never constructs window results itself (except in the mock engine).

use serde::{Deserialize, Serialize};

/// One governance rule evaluation within a backtest window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GovernanceEvent {
    /// Rule identifier (e.g. "max_drawdown", "sharpe_floor").
    pub rule: String,
    /// Whether the rule fired for this window.
    pub triggered: bool,
}

/// Performance and governance data for a single walk-forward window.
///
/// Produced by the backtest engine; consumed read-only by the state
/// encoder and reward function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowResult {
    /// Annualized Sharpe ratio over the window.
    pub sharpe_ratio: f64,
    /// Maximum drawdown over the window, in percent (negative, e.g. -26.87).
    pub max_drawdown: f64,
    /// Total return over the window, in percent.
    pub total_return: f64,
    /// Annualized turnover rate, in percent.
    pub turnover_rate: f64,
    /// Annualized tracking error, in percent (None if no benchmark).
    pub tracking_error: Option<f64>,
    /// Governance rule evaluations for this window.
    pub governance_events: Vec<GovernanceEvent>,
}

impl WindowResult {
    /// Fraction of governance events flagged as triggered, 0.0 if none.
    pub fn breach_ratio(&self) -> f64 {
        if self.governance_events.is_empty() {
            return 0.0;
        }
        let breaches = self
            .governance_events
            .iter()
            .filter(|e| e.triggered)
            .count();
        breaches as f64 / self.governance_events.len() as f64
    }
}

/// Run-level governance breach summary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GovernanceSummary {
    /// Number of windows with at least one triggered rule.
    pub windows_with_any_breach: usize,
    /// Total number of windows in the run.
    pub total_windows: usize,
}

impl GovernanceSummary {
    /// Episode-level breach ratio, guarded against empty runs.
    pub fn breach_ratio(&self) -> f64 {
        self.windows_with_any_breach as f64 / self.total_windows.max(1) as f64
    }
}

/// Full result of one backtest engine invocation.
///
/// `window_results` is ordered oldest-first; the tuner always consumes
/// the last entry as the most recent window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestRunResult {
    /// Ordered per-window results.
    pub window_results: Vec<WindowResult>,
    /// Optional run-level breach summary.
    pub governance_summary: Option<GovernanceSummary>,
}

impl BacktestRunResult {
    /// Truncate the run to at most `max_windows` windows.
    ///
    /// Used by the training loop to cap backtest cost per step. The
    /// governance summary is left untouched; it describes the full run.
    pub fn truncated(mut self, max_windows: usize) -> Self {
        if self.window_results.len() > max_windows {
            self.window_results.truncate(max_windows);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_with_events(events: &[bool]) -> WindowResult {
        WindowResult {
            sharpe_ratio: 1.0,
            max_drawdown: -8.0,
            total_return: 5.0,
            turnover_rate: 60.0,
            tracking_error: None,
            governance_events: events
                .iter()
                .map(|&t| GovernanceEvent {
                    rule: "max_drawdown".to_string(),
                    triggered: t,
                })
                .collect(),
        }
    }

    #[test]
    fn test_breach_ratio_no_events() {
        let w = window_with_events(&[]);
        assert_eq!(w.breach_ratio(), 0.0);
    }

    #[test]
    fn test_breach_ratio_partial() {
        let w = window_with_events(&[true, false, true, false]);
        assert!((w.breach_ratio() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_governance_summary_guards_empty_run() {
        let s = GovernanceSummary {
            windows_with_any_breach: 0,
            total_windows: 0,
        };
        assert_eq!(s.breach_ratio(), 0.0);
    }

    #[test]
    fn test_truncated_keeps_prefix() {
        let run = BacktestRunResult {
            window_results: (0..6).map(|_| window_with_events(&[false])).collect(),
            governance_summary: None,
        };
        let run = run.truncated(3);
        assert_eq!(run.window_results.len(), 3);
    }
}
