use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::price::Interval;

/// 历史行情统计结果（百分比字段均已保留两位小数）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalSummary {
    pub symbol: String,
    pub start_price: f64,
    pub end_price: f64,
    pub total_change_pct: f64,
    pub mean_daily_return_pct: f64,
    /// Sample standard deviation (n - 1) of daily returns; 0 for a single return.
    pub volatility_pct: f64,
    pub max_daily_gain_pct: f64,
    pub max_daily_loss_pct: f64,
}

/// 事件前后短窗口价格变化
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventImpactSample {
    pub symbol: String,
    pub event_time: DateTime<Utc>,
    pub interval: Interval,
    pub pre_event_price: f64,
    pub first_post_price: f64,
    pub second_post_price: f64,
    pub change_at_offset_1_pct: f64,
    pub change_at_offset_2_pct: f64,
    /// 未取整的第二个事后样本变化，供会话传递给 ROI 计算
    #[serde(skip)]
    pub unrounded_change_at_offset_2_pct: f64,
}
