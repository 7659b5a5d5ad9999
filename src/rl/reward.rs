// src/rl/reward.rs
//
// Multi-objective scalar reward for the tuner.
//
// reward = sharpe - penalty_drawdown - penalty_breach - penalty_turnover
//
// The breach penalty dominates the others by an order of magnitude: a
// governance breach costs far more than any Sharpe/drawdown/turnover
// shortfall, making breaches a near-hard constraint for the policy.

/// Absolute drawdown below which no penalty applies (percent).
const DRAWDOWN_FREE_PCT: f64 = 10.0;

/// Annualized turnover below which no penalty applies (percent).
const TURNOVER_FREE_PCT: f64 = 80.0;

/// Weight on governance breaches; dominant term.
const BREACH_WEIGHT: f64 = 5.0;

/// Compute the step reward.
///
/// `max_drawdown` is in percent and typically negative (-26.87 means a
/// 26.87% drawdown); the penalty is taken on its absolute value.
/// `breach_ratio` is in [0, 1]; `avg_turnover` is annualized percent.
pub fn compute_reward(
    sharpe: f64,
    max_drawdown: f64,
    breach_ratio: f64,
    avg_turnover: f64,
) -> f64 {
    let dd_abs = max_drawdown.abs();
    let penalty_dd = 0.1 * ((dd_abs - DRAWDOWN_FREE_PCT).max(0.0) / 5.0);
    let penalty_breach = BREACH_WEIGHT * breach_ratio;
    let penalty_turnover = 0.01 * (avg_turnover - TURNOVER_FREE_PCT).max(0.0);

    sharpe - penalty_dd - penalty_breach - penalty_turnover
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_penalties_inside_free_bands() {
        // Scenario A: all penalty terms inactive, reward is exactly sharpe.
        let reward = compute_reward(1.0, -10.0, 0.0, 50.0);
        assert_eq!(reward, 1.0);
    }

    #[test]
    fn test_full_breach_dominates() {
        // Scenario B: breach_ratio = 1.0 costs 5.0.
        let breached = compute_reward(1.5, -10.0, 1.0, 50.0);
        let clean = compute_reward(1.5, -10.0, 0.0, 50.0);

        assert!((breached - (-3.5)).abs() < 1e-9);
        assert!(clean - breached > 4.0);
    }

    #[test]
    fn test_turnover_above_band_penalized() {
        // Scenario C: higher turnover strictly lowers reward.
        let high = compute_reward(1.5, -10.0, 0.0, 100.0);
        let low = compute_reward(1.5, -10.0, 0.0, 50.0);
        assert!(high < low);
        assert!((low - high - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_monotone_in_sharpe() {
        let lo = compute_reward(0.5, -12.0, 0.2, 90.0);
        let hi = compute_reward(1.5, -12.0, 0.2, 90.0);
        assert!(hi > lo);
    }

    #[test]
    fn test_monotone_in_drawdown_above_band() {
        let shallow = compute_reward(1.0, -12.0, 0.0, 50.0);
        let deep = compute_reward(1.0, -30.0, 0.0, 50.0);
        assert!(deep < shallow);

        // Below the 10% band the drawdown term is flat.
        let a = compute_reward(1.0, -4.0, 0.0, 50.0);
        let b = compute_reward(1.0, -9.9, 0.0, 50.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_strictly_decreasing_in_breach_ratio() {
        let mut prev = f64::INFINITY;
        for i in 0..=10 {
            let ratio = i as f64 / 10.0;
            let r = compute_reward(1.0, -10.0, ratio, 50.0);
            assert!(r < prev);
            prev = r;
        }
    }

    #[test]
    fn test_drawdown_sign_irrelevant() {
        // Engines may report drawdown as positive or negative percent.
        let neg = compute_reward(1.0, -20.0, 0.0, 50.0);
        let pos = compute_reward(1.0, 20.0, 0.0, 50.0);
        assert_eq!(neg, pos);
    }
}
