use log::debug;

use crate::errors::{Result, CalcError};
use crate::models::roi::{RoiInput, RoiResult, ScenarioResult};
use crate::util::{round_currency, round_volume};

/// 按事件影响百分比调整目标价：target * (1 + impact / 100)
pub fn adjust_target(target: f64, event_impact_pct: f64) -> f64 {
    target * (1.0 + event_impact_pct / 100.0)
}

/// 单一目标价的杠杆 ROI 计算，结果在返回时统一取整
pub fn calculate_roi(
    current_price: f64,
    target: f64,
    initial_investment: f64,
    leverage: f64,
) -> Result<RoiResult> {
    validate(current_price, initial_investment, leverage)?;
    if !target.is_finite() {
        return Err(CalcError::InvalidInput("target price must be a finite number".to_string()));
    }

    let position_size = initial_investment * leverage;
    let volume = position_size / current_price;
    let profit = (target - current_price) * volume;
    let roi_pct = profit / initial_investment * 100.0;

    Ok(RoiResult {
        roi_pct: round_currency(roi_pct),
        profit: round_currency(profit),
        volume: round_volume(volume),
        position_size: round_currency(position_size),
    })
}

/// Computes one result per target, each adjusted by the same event impact.
/// Relative ordering of low/average/high is not checked.
pub fn compute_roi(input: &RoiInput) -> Result<Vec<ScenarioResult>> {
    if !input.event_impact_pct.is_finite() {
        return Err(CalcError::InvalidInput("event impact must be a finite number".to_string()));
    }

    input
        .targets
        .labeled()
        .into_iter()
        .map(|(label, raw_target)| {
            let target = adjust_target(raw_target, input.event_impact_pct);
            debug!("{} target {} adjusted to {} ({}%)", label, raw_target, target, input.event_impact_pct);
            let result = calculate_roi(input.current_price, target, input.initial_investment, input.leverage)?;
            Ok(ScenarioResult { label, target: round_currency(target), result })
        })
        .collect()
}

fn validate(current_price: f64, initial_investment: f64, leverage: f64) -> Result<()> {
    if !(current_price.is_finite() && current_price > 0.0) {
        return Err(CalcError::InvalidInput("current price must be positive".to_string()));
    }
    if !(leverage.is_finite() && leverage >= 1.0) {
        return Err(CalcError::InvalidInput("leverage must be at least 1".to_string()));
    }
    if !(initial_investment.is_finite() && initial_investment > 0.0) {
        return Err(CalcError::InvalidInput("initial investment must be positive".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::roi::{TargetLabel, Targets};
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_example() {
        let result = calculate_roi(100.0, 120.0, 1000.0, 2.0).unwrap();
        assert_eq!(result.profit, 400.0);
        assert_eq!(result.roi_pct, 40.0);
        assert_eq!(result.volume, 20.0);
        assert_eq!(result.position_size, 2000.0);
    }

    #[test]
    fn test_target_at_current_price_is_flat() {
        for &(price, leverage) in &[(0.5, 1.0), (37.25, 3.5), (1999.99, 10.0)] {
            let result = calculate_roi(price, price, 750.0, leverage).unwrap();
            assert_eq!(result.profit, 0.0);
            assert_eq!(result.roi_pct, 0.0);
        }
    }

    #[test]
    fn test_position_size_is_investment_times_leverage() {
        let result = calculate_roi(42.0, 50.0, 1234.5, 3.0).unwrap();
        assert_eq!(result.position_size, 3703.5);
    }

    #[test]
    fn test_roi_linear_in_price_delta() {
        let single = calculate_roi(100.0, 105.0, 1000.0, 2.0).unwrap();
        let double = calculate_roi(100.0, 110.0, 1000.0, 2.0).unwrap();
        assert_relative_eq!(double.profit, single.profit * 2.0, epsilon = 1e-9);
        assert_relative_eq!(double.roi_pct, single.roi_pct * 2.0, epsilon = 1e-9);

        let loss = calculate_roi(100.0, 90.0, 1000.0, 2.0).unwrap();
        assert_relative_eq!(loss.profit, -double.profit, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(calculate_roi(0.0, 120.0, 1000.0, 2.0), Err(CalcError::InvalidInput(_))));
        assert!(matches!(calculate_roi(-5.0, 120.0, 1000.0, 2.0), Err(CalcError::InvalidInput(_))));
        assert!(matches!(calculate_roi(100.0, 120.0, 1000.0, 0.5), Err(CalcError::InvalidInput(_))));
        assert!(matches!(calculate_roi(100.0, 120.0, 0.0, 2.0), Err(CalcError::InvalidInput(_))));
        assert!(matches!(calculate_roi(100.0, f64::NAN, 1000.0, 2.0), Err(CalcError::InvalidInput(_))));

        let err = calculate_roi(0.0, 120.0, 1000.0, 2.0).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: current price must be positive");
        let err = calculate_roi(100.0, 120.0, 1000.0, 0.5).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: leverage must be at least 1");
    }

    #[test]
    fn test_event_impact_matches_direct_target() {
        assert_relative_eq!(adjust_target(100.0, 10.0), 110.0, epsilon = 1e-9);

        let input = RoiInput::new(100.0, Targets::Single(100.0), 1000.0, 2.0).with_event_impact(10.0);
        let adjusted = compute_roi(&input).unwrap();
        let direct = calculate_roi(100.0, 110.0, 1000.0, 2.0).unwrap();

        assert_eq!(adjusted.len(), 1);
        assert_eq!(adjusted[0].label, TargetLabel::Forecast);
        assert_eq!(adjusted[0].target, 110.0);
        assert_eq!(adjusted[0].result, direct);
    }

    #[test]
    fn test_range_targets_keep_order_and_accept_inverted_range() {
        let input = RoiInput::new(
            100.0,
            Targets::Range { low: 130.0, average: 110.0, high: 90.0 },
            1000.0,
            1.0,
        )
        .with_event_impact(-5.0);
        let results = compute_roi(&input).unwrap();

        let labels: Vec<_> = results.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec![TargetLabel::Low, TargetLabel::Average, TargetLabel::High]);
        assert_eq!(results[0].target, 123.5);
        assert_eq!(results[1].target, 104.5);
        assert_eq!(results[2].target, 85.5);
        assert_eq!(results[0].result.profit, 235.0);
        assert_eq!(results[2].result.roi_pct, -14.5);
    }

    #[test]
    fn test_volume_rounded_to_four_decimals() {
        let result = calculate_roi(3.0, 3.0, 1000.0, 1.0).unwrap();
        assert_eq!(result.volume, 333.3333);
    }
}
