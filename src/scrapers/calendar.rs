use crate::models::calendar::EconomicEvent;
use crate::errors::{Result, CalcError};
use crate::scrapers::base::EconomicCalendar;
use crate::config::Config;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use log::{debug, info, warn};

/// Finnhub 经济日历抓取器
pub struct FinnhubCalendarScraper {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FinnhubCalendarScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(CalcError::RequestError)?;

        Ok(Self {
            client,
            base_url: config.calendar_base_url.clone(),
            api_key: config.calendar_api_key.clone(),
        })
    }
}

#[async_trait]
impl EconomicCalendar for FinnhubCalendarScraper {
    fn source_name(&self) -> &'static str {
        "finnhub"
    }

    async fn fetch_events(&self, from: &NaiveDate, to: &NaiveDate) -> Result<Vec<EconomicEvent>> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                warn!("FINCALC_CALENDAR_API_KEY is not set, economic calendar is unavailable");
                return Ok(Vec::new());
            }
        };

        info!("获取经济日历 {} ~ {}", from, to);

        let response = self.client
            .get(format!("{}/api/v1/calendar/economic", self.base_url))
            .query(&[
                ("from", from.format("%Y-%m-%d").to_string()),
                ("to", to.format("%Y-%m-%d").to_string()),
                ("token", api_key.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Economic calendar request failed: HTTP status {}", response.status());
            return Ok(Vec::new());
        }

        let text = response.text().await?;
        let events = parse_calendar_body(&text);
        debug!("获取到 {} 条经济事件", events.len());
        Ok(events)
    }
}

/// 解析响应正文；非 JSON 正文记录警告并返回空列表
pub fn parse_calendar_body(text: &str) -> Vec<EconomicEvent> {
    match serde_json::from_str::<Value>(text) {
        Ok(json) => parse_calendar_response(&json),
        Err(e) => {
            warn!("Economic calendar returned a non-JSON body: {}", e);
            Vec::new()
        }
    }
}

/// 解析 economicCalendar 字段，缺失时返回空列表
pub fn parse_calendar_response(json: &Value) -> Vec<EconomicEvent> {
    let list = match json.get("economicCalendar").and_then(|c| c.as_array()) {
        Some(list) => list,
        None => return Vec::new(),
    };

    let text = |item: &Value, key: &str| {
        item.get(key).and_then(|v| v.as_str()).unwrap_or_default().to_string()
    };

    list.iter()
        .filter(|item| item.get("event").and_then(|e| e.as_str()).is_some())
        .map(|item| EconomicEvent {
            event: text(item, "event"),
            date: text(item, "time"),
            country: text(item, "country"),
            impact: text(item, "impact"),
        })
        .collect()
}
