use crate::analysis::{event_impact, historical, roi};
use crate::config::Config;
use crate::errors::Result;
use crate::models::analysis::{EventImpactSample, HistoricalSummary};
use crate::models::calendar::EconomicEvent;
use crate::models::price::Interval;
use crate::models::roi::{RoiInput, ScenarioResult, Targets};
use crate::scrapers::base::{EconomicCalendar, PriceSource};
use crate::scrapers::calendar::FinnhubCalendarScraper;
use crate::scrapers::yahoo::YahooChartScraper;
use crate::session::Session;
use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use std::sync::Arc;

/// ROI 工作流的请求参数；`event_impact_pct` 为 None 时使用会话中的值
#[derive(Debug, Clone, PartialEq)]
pub struct RoiRequest {
    pub current_price: f64,
    pub targets: Targets,
    pub initial_investment: f64,
    pub leverage: f64,
    pub event_impact_pct: Option<f64>,
}

/// 计算服务，串联价格数据源、经济日历与分析函数
pub struct CalculatorService {
    config: Config,
    prices: Arc<dyn PriceSource>,
    calendar: Arc<dyn EconomicCalendar>,
}

impl CalculatorService {
    /// 创建新的计算服务实例
    pub fn new(config: Config, prices: Arc<dyn PriceSource>, calendar: Arc<dyn EconomicCalendar>) -> Self {
        Self {
            config,
            prices,
            calendar,
        }
    }

    /// 使用默认的 Yahoo 行情与 Finnhub 日历
    pub fn from_config(config: Config) -> Result<Self> {
        let prices = Arc::new(YahooChartScraper::new(&config)?);
        let calendar = Arc::new(FinnhubCalendarScraper::new(&config)?);
        Ok(Self::new(config, prices, calendar))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// ROI Calculator workflow. An explicit impact wins over the session value.
    pub fn roi_workflow(&self, session: &Session, request: RoiRequest) -> Result<Vec<ScenarioResult>> {
        let impact = match request.event_impact_pct {
            Some(pct) => pct,
            None => match session.last_event_impact() {
                Some(pct) => {
                    info!("Using event impact {}% from the last event analysis", pct);
                    pct
                }
                None => 0.0,
            },
        };

        let input = RoiInput::new(request.current_price, request.targets, request.initial_investment, request.leverage)
            .with_event_impact(impact);
        roi::compute_roi(&input)
    }

    pub async fn historical_workflow(
        &self,
        symbol: &str,
        start_date: &NaiveDate,
        end_date: &NaiveDate,
    ) -> Result<HistoricalSummary> {
        historical::analyze_historical(self.prices.as_ref(), symbol, start_date, end_date).await
    }

    /// 事件影响分析，成功时写入会话供后续 ROI 计算使用
    pub async fn event_workflow(
        &self,
        session: &mut Session,
        symbol: &str,
        event_time: DateTime<Utc>,
        interval: Interval,
    ) -> Option<EventImpactSample> {
        let sample = event_impact::analyze_event_impact(
            self.prices.as_ref(),
            symbol,
            event_time,
            interval,
            self.config.event_window(),
        )
        .await?;

        session.record_event_impact(&sample);
        Some(sample)
    }

    pub async fn calendar_workflow(&self, from: &NaiveDate, to: &NaiveDate) -> Vec<EconomicEvent> {
        match self.calendar.fetch_events(from, to).await {
            Ok(events) => {
                info!("Found {} economic events from {}", events.len(), self.calendar.source_name());
                events
            }
            Err(e) => {
                warn!("Failed to fetch economic calendar: {}", e);
                Vec::new()
            }
        }
    }
}
