use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info};

use crate::errors::{Result, CalcError};
use crate::models::analysis::EventImpactSample;
use crate::models::price::{Interval, PriceRequest, PriceSeries};
use crate::scrapers::base::PriceSource;
use crate::util::{pct_change, round_currency};

/// 从事件窗口内的价格序列中取样。
///
/// 第一根K线为事件前价格；第二根（缺失时回退为事件前价格）为第一个事后样本；
/// 第三根（缺失时回退为第一个事后样本）为第二个事后样本。窗口为空时返回 `Ok(None)`，
/// 事件前价格非正或任一样本价格非有限值时返回 ExternalFailure。
pub fn sample_event_impact(
    symbol: &str,
    event_time: DateTime<Utc>,
    interval: Interval,
    series: &PriceSeries,
) -> Result<Option<EventImpactSample>> {
    let pre_event_price = match series.first() {
        Some(point) => point.close,
        None => return Ok(None),
    };
    if !(pre_event_price.is_finite() && pre_event_price > 0.0) {
        return Err(CalcError::ExternalFailure(format!(
            "{} pre-event price {} is not usable", symbol, pre_event_price
        )));
    }

    let first_post_price = match series.points.get(1) {
        Some(point) => point.close,
        None => {
            debug!("{}: no first post-event bar, falling back to pre-event price", symbol);
            pre_event_price
        }
    };

    let second_post_price = match series.points.get(2) {
        Some(point) => point.close,
        None => {
            debug!("{}: no second post-event bar, falling back to first post-event price", symbol);
            first_post_price
        }
    };

    if !(first_post_price.is_finite() && second_post_price.is_finite()) {
        return Err(CalcError::ExternalFailure(format!(
            "{} post-event prices are not finite", symbol
        )));
    }

    let change_at_offset_2 = pct_change(pre_event_price, second_post_price);

    Ok(Some(EventImpactSample {
        symbol: symbol.to_string(),
        event_time,
        interval,
        pre_event_price: round_currency(pre_event_price),
        first_post_price: round_currency(first_post_price),
        second_post_price: round_currency(second_post_price),
        change_at_offset_1_pct: round_currency(pct_change(pre_event_price, first_post_price)),
        change_at_offset_2_pct: round_currency(change_at_offset_2),
        unrounded_change_at_offset_2_pct: change_at_offset_2,
    }))
}

/// Fetches `[event_time - window, event_time + window]` and samples it.
/// Daily bars cannot resolve a window this short, so `1d` is rejected.
pub async fn try_analyze_event_impact(
    source: &dyn PriceSource,
    symbol: &str,
    event_time: DateTime<Utc>,
    interval: Interval,
    window: Duration,
) -> Result<Option<EventImpactSample>> {
    if !interval.is_intraday() {
        return Err(CalcError::InvalidInput(format!(
            "event impact needs an intraday interval, got {}", interval
        )));
    }

    let request = PriceRequest::intraday(symbol, event_time - window, event_time + window, interval);
    let series = source.fetch_prices(&request).await?;

    sample_event_impact(symbol, event_time, interval, &series)
}

/// 事件影响分析的对外入口：任何失败都记录错误日志并返回 None
pub async fn analyze_event_impact(
    source: &dyn PriceSource,
    symbol: &str,
    event_time: DateTime<Utc>,
    interval: Interval,
    window: Duration,
) -> Option<EventImpactSample> {
    match try_analyze_event_impact(source, symbol, event_time, interval, window).await {
        Ok(Some(sample)) => {
            info!(
                "{} around {}: {:+.2}% after 1 bar, {:+.2}% after 2 bars",
                symbol, event_time, sample.change_at_offset_1_pct, sample.change_at_offset_2_pct
            );
            Some(sample)
        }
        Ok(None) => {
            info!("No {} data for {} around {}", interval, symbol, event_time);
            None
        }
        Err(e) => {
            error!("Error analyzing event impact for {}: {}", symbol, e.into_external());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::price::PricePoint;
    use async_trait::async_trait;
    use chrono::TimeZone;

    /// 固定返回同一序列的数据源
    struct FixedWindow(PriceSeries);

    #[async_trait]
    impl PriceSource for FixedWindow {
        fn source_name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_prices(&self, _request: &PriceRequest) -> Result<PriceSeries> {
            Ok(self.0.clone())
        }
    }

    fn event_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 5, 13, 30, 0).unwrap()
    }

    fn window(closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                timestamp: event_time() - Duration::minutes(60) + Duration::minutes(5 * i as i64),
                close,
            })
            .collect();
        PriceSeries::new("SPY", points)
    }

    #[test]
    fn test_empty_window_is_absent() {
        assert!(sample_event_impact("SPY", event_time(), Interval::FiveMinutes, &window(&[])).unwrap().is_none());
    }

    #[test]
    fn test_single_observation_falls_back_to_pre_event_price() {
        let sample = sample_event_impact("SPY", event_time(), Interval::FiveMinutes, &window(&[470.0])).unwrap().unwrap();
        assert_eq!(sample.pre_event_price, 470.0);
        assert_eq!(sample.first_post_price, 470.0);
        assert_eq!(sample.second_post_price, 470.0);
        assert_eq!(sample.change_at_offset_1_pct, 0.0);
        assert_eq!(sample.change_at_offset_2_pct, 0.0);
    }

    #[test]
    fn test_two_observations_second_sample_falls_back_to_first() {
        let sample = sample_event_impact("SPY", event_time(), Interval::FiveMinutes, &window(&[100.0, 101.0])).unwrap().unwrap();
        assert_eq!(sample.first_post_price, 101.0);
        assert_eq!(sample.second_post_price, 101.0);
        assert_eq!(sample.change_at_offset_1_pct, 1.0);
        assert_eq!(sample.change_at_offset_2_pct, 1.0);
    }

    #[test]
    fn test_uses_first_three_bars_only() {
        let sample = sample_event_impact(
            "SPY",
            event_time(),
            Interval::FiveMinutes,
            &window(&[200.0, 202.0, 197.0, 250.0]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(sample.change_at_offset_1_pct, 1.0);
        assert_eq!(sample.change_at_offset_2_pct, -1.5);
        assert_eq!(sample.interval, Interval::FiveMinutes);
    }

    #[test]
    fn test_zero_pre_event_price_is_rejected() {
        let err = sample_event_impact("SPY", event_time(), Interval::FiveMinutes, &window(&[0.0, 101.0])).unwrap_err();
        assert!(matches!(err, CalcError::ExternalFailure(_)));

        let err = sample_event_impact("SPY", event_time(), Interval::FiveMinutes, &window(&[100.0, f64::NAN])).unwrap_err();
        assert!(matches!(err, CalcError::ExternalFailure(_)));
    }

    #[test]
    fn test_unrounded_change_is_kept_alongside_rounded_one() {
        let sample = sample_event_impact("SPY", event_time(), Interval::FiveMinutes, &window(&[100.0, 100.0, 100.004]))
            .unwrap()
            .unwrap();
        assert_eq!(sample.change_at_offset_2_pct, 0.0);
        assert!((sample.unrounded_change_at_offset_2_pct - 0.004).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_try_analyze_reports_zero_pre_event_price() {
        let source = FixedWindow(window(&[0.0, 5.0, 6.0]));
        let err = try_analyze_event_impact(&source, "SPY", event_time(), Interval::FiveMinutes, Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CalcError::ExternalFailure(_)));

        let absent = analyze_event_impact(&source, "SPY", event_time(), Interval::FiveMinutes, Duration::hours(1)).await;
        assert!(absent.is_none());
    }

    #[tokio::test]
    async fn test_daily_interval_is_rejected() {
        let source = FixedWindow(window(&[100.0, 101.0]));
        let err = try_analyze_event_impact(&source, "SPY", event_time(), Interval::OneDay, Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput(_)));
    }
}
