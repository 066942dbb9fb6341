use crate::models::price::{PricePoint, PriceRequest, PriceSeries};
use crate::errors::{Result, CalcError};
use crate::scrapers::base::PriceSource;
use crate::config::Config;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use log::{debug, info};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Yahoo Finance chart 接口价格数据抓取器
pub struct YahooChartScraper {
    client: Client,
    base_url: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl YahooChartScraper {
    /// 创建新的价格数据抓取器
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(CalcError::RequestError)?;

        Ok(Self {
            client,
            base_url: config.price_base_url.clone(),
            min_interval: Duration::from_millis(config.min_request_interval_ms),
            last_request: Mutex::new(None),
        })
    }

    /// 等待请求频率限制
    async fn wait_for_rate_limit(&self) {
        let now = Instant::now();
        let should_wait = {
            let mut last = self.last_request.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let should_wait = remaining_wait(*last, self.min_interval);
            *last = Some(now);
            should_wait
        };

        if let Some(wait_time) = should_wait {
            debug!("等待 {:?} 以遵守频率限制", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }
}

#[async_trait]
impl PriceSource for YahooChartScraper {
    fn source_name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_prices(&self, request: &PriceRequest) -> Result<PriceSeries> {
        info!(
            "获取 {} 行情 {} ~ {} ({})",
            request.symbol, request.start, request.end, request.interval
        );

        self.wait_for_rate_limit().await;

        let response = self.client
            .get(format!("{}/v8/finance/chart/{}", self.base_url, request.symbol))
            .query(&[
                ("period1", request.start.timestamp().to_string()),
                ("period2", request.end.timestamp().to_string()),
                ("interval", request.interval.as_str().to_string()),
                ("includeAdjustedClose", "true".to_string()),
                ("events", "div,split".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("收到响应 HTTP {}", status);

        // 未知代码返回 404，视为无数据
        if status == StatusCode::NOT_FOUND {
            info!("Symbol {} not found, treating as empty series", request.symbol);
            return Ok(PriceSeries::empty(&request.symbol));
        }

        let json: Value = serde_json::from_str(&text).map_err(|e| {
            CalcError::ExternalFailure(format!("HTTP {} with unparseable body: {}", status, e))
        })?;

        let series = parse_chart_response(request, &json)?;
        debug!("获取到 {} 条价格记录", series.len());
        Ok(series)
    }
}

/// 距离上次请求还需等待的时间；elapsed 只读取一次
fn remaining_wait(last: Option<Instant>, min_interval: Duration) -> Option<Duration> {
    let elapsed = last?.elapsed();
    let wait = min_interval.saturating_sub(elapsed);
    if wait.is_zero() { None } else { Some(wait) }
}

/// Parse a `/v8/finance/chart` payload into a series restricted to the
/// requested range. Adjusted closes are preferred; intraday bars only carry
/// plain closes. Rows with null prices are skipped.
pub fn parse_chart_response(request: &PriceRequest, json: &Value) -> Result<PriceSeries> {
    let chart = json.get("chart")
        .ok_or_else(|| CalcError::ExternalFailure("missing chart field in response".to_string()))?;

    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        let code = err.get("code").and_then(|c| c.as_str()).unwrap_or_default();
        let description = err.get("description").and_then(|d| d.as_str()).unwrap_or_default();
        if code.eq_ignore_ascii_case("Not Found") {
            return Ok(PriceSeries::empty(&request.symbol));
        }
        return Err(CalcError::ExternalFailure(format!("{}: {}", code, description)));
    }

    let result = match chart.get("result").and_then(|r| r.as_array()).and_then(|r| r.first()) {
        Some(result) => result,
        None => return Ok(PriceSeries::empty(&request.symbol)),
    };

    let timestamps = match result.get("timestamp").and_then(|t| t.as_array()) {
        Some(timestamps) => timestamps,
        None => return Ok(PriceSeries::empty(&request.symbol)),
    };

    let indicators = result.get("indicators");
    let adjclose = indicators
        .and_then(|i| i.get("adjclose"))
        .and_then(|a| a.as_array())
        .and_then(|a| a.first())
        .and_then(|a| a.get("adjclose"))
        .and_then(|a| a.as_array());
    let close = indicators
        .and_then(|i| i.get("quote"))
        .and_then(|q| q.as_array())
        .and_then(|q| q.first())
        .and_then(|q| q.get("close"))
        .and_then(|c| c.as_array());

    let prices = adjclose.or(close).ok_or_else(|| {
        CalcError::ExternalFailure(format!("no close prices in response for {}", request.symbol))
    })?;

    let inclusive_end = request.interval.is_intraday();
    let mut points = Vec::with_capacity(timestamps.len());
    for (ts, price) in timestamps.iter().zip(prices.iter()) {
        let (secs, close) = match (ts.as_i64(), price.as_f64()) {
            (Some(secs), Some(close)) => (secs, close),
            _ => continue,
        };
        let timestamp = match Utc.timestamp_opt(secs, 0).single() {
            Some(timestamp) => timestamp,
            None => continue,
        };

        let in_range = timestamp >= request.start
            && (timestamp < request.end || (inclusive_end && timestamp == request.end));
        if in_range {
            points.push(PricePoint { timestamp, close });
        }
    }

    Ok(PriceSeries::new(&request.symbol, points))
}
