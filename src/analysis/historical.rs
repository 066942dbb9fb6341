use chrono::NaiveDate;
use log::{info, warn};

use crate::errors::{Result, CalcError};
use crate::models::analysis::HistoricalSummary;
use crate::models::price::{PriceRequest, PriceSeries};
use crate::scrapers::base::PriceSource;
use crate::util::{date_to_utc, pct_change, round_currency};

pub const NO_DATA_MESSAGE: &str = "No data found for the given symbol and date range";

/// 相邻价格的日收益率（小数形式），长度为 n - 1
pub fn daily_returns(series: &PriceSeries) -> Vec<f64> {
    series
        .points
        .windows(2)
        .map(|w| (w[1].close - w[0].close) / w[0].close)
        .collect()
}

/// Sample standard deviation (n - 1). A single observation has no spread, so
/// it is pinned to 0.0.
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// 根据价格序列计算统计指标
pub fn summarize_series(symbol: &str, series: &PriceSeries) -> Result<HistoricalSummary> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first.close, last.close),
        _ => return Err(CalcError::NoData(NO_DATA_MESSAGE.to_string())),
    };

    let returns = daily_returns(series);
    if returns.is_empty() {
        return Err(CalcError::EmptySeries(format!(
            "{} has a single price point, daily return statistics are undefined", symbol
        )));
    }
    if returns.iter().any(|r| !r.is_finite()) {
        return Err(CalcError::ExternalFailure(format!(
            "{} price series contains zero or invalid prices", symbol
        )));
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let volatility = sample_std_dev(&returns, mean);
    let max_gain = returns.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let max_loss = returns.iter().cloned().fold(f64::INFINITY, f64::min);

    Ok(HistoricalSummary {
        symbol: symbol.to_string(),
        start_price: round_currency(first),
        end_price: round_currency(last),
        total_change_pct: round_currency(pct_change(first, last)),
        mean_daily_return_pct: round_currency(mean * 100.0),
        volatility_pct: round_currency(volatility * 100.0),
        max_daily_gain_pct: round_currency(max_gain * 100.0),
        max_daily_loss_pct: round_currency(max_loss * 100.0),
    })
}

/// 获取 [start_date, end_date) 区间的日线复权收盘价并计算统计指标。
/// 数据源的任何失败都转换为 ExternalFailure 返回，不会向上抛出 panic。
pub async fn analyze_historical(
    source: &dyn PriceSource,
    symbol: &str,
    start_date: &NaiveDate,
    end_date: &NaiveDate,
) -> Result<HistoricalSummary> {
    if start_date >= end_date {
        return Err(CalcError::InvalidInput(format!(
            "start date {} must be before end date {}", start_date, end_date
        )));
    }

    info!("Analyzing {} from {} to {} via {}", symbol, start_date, end_date, source.source_name());

    let request = PriceRequest::daily(symbol, date_to_utc(start_date), date_to_utc(end_date));
    let series = match source.fetch_prices(&request).await {
        Ok(series) => series,
        Err(e) => {
            warn!("Price fetch for {} failed: {}", symbol, e);
            return Err(e.into_external());
        }
    };

    info!("Fetched {} daily prices for {}", series.len(), symbol);
    summarize_series(symbol, &series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::price::PricePoint;
    use chrono::{Duration, TimeZone, Utc};
    use approx::assert_relative_eq;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint { timestamp: start + Duration::days(i as i64), close })
            .collect();
        PriceSeries::new("TEST", points)
    }

    #[test]
    fn test_empty_series_is_no_data() {
        let err = summarize_series("TEST", &series(&[])).unwrap_err();
        assert!(matches!(err, CalcError::NoData(_)));
        assert_eq!(err.to_string(), NO_DATA_MESSAGE);
    }

    #[test]
    fn test_single_point_is_empty_series() {
        let err = summarize_series("TEST", &series(&[100.0])).unwrap_err();
        assert!(matches!(err, CalcError::EmptySeries(_)));
    }

    #[test]
    fn test_two_point_series() {
        let summary = summarize_series("TEST", &series(&[100.0, 110.0])).unwrap();
        assert_eq!(summary.start_price, 100.0);
        assert_eq!(summary.end_price, 110.0);
        assert_eq!(summary.total_change_pct, 10.0);
        assert_eq!(summary.mean_daily_return_pct, 10.0);
        assert_eq!(summary.volatility_pct, 0.0);
        assert_eq!(summary.max_daily_gain_pct, 10.0);
        assert_eq!(summary.max_daily_loss_pct, 10.0);
    }

    #[test]
    fn test_multi_point_statistics() {
        // 收益率: +10%, -10%, +5%
        let summary = summarize_series("TEST", &series(&[100.0, 110.0, 99.0, 103.95])).unwrap();
        assert_eq!(summary.total_change_pct, 3.95);
        assert_eq!(summary.mean_daily_return_pct, 1.67);
        assert_eq!(summary.max_daily_gain_pct, 10.0);
        assert_eq!(summary.max_daily_loss_pct, -10.0);

        // 样本标准差: sqrt(((0.1-m)^2 + (-0.1-m)^2 + (0.05-m)^2) / 2)
        let m = (0.1 - 0.1 + 0.05) / 3.0;
        let expected = (((0.1f64 - m).powi(2) + (-0.1f64 - m).powi(2) + (0.05f64 - m).powi(2)) / 2.0).sqrt();
        assert_relative_eq!(summary.volatility_pct, round_currency(expected * 100.0), epsilon = 1e-9);
    }

    #[test]
    fn test_daily_returns_length() {
        assert_eq!(daily_returns(&series(&[1.0, 2.0, 4.0])), vec![1.0, 1.0]);
        assert!(daily_returns(&series(&[1.0])).is_empty());
    }

    #[test]
    fn test_zero_price_is_rejected() {
        let err = summarize_series("TEST", &series(&[0.0, 10.0])).unwrap_err();
        assert!(matches!(err, CalcError::ExternalFailure(_)));
    }
}
