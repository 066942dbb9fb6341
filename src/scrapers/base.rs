use crate::models::calendar::EconomicEvent;
use crate::models::price::{PriceRequest, PriceSeries};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Base trait for market price sources
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Name used in logs
    fn source_name(&self) -> &'static str;

    /// Fetch an ordered price series for the request.
    /// A symbol or range without data yields an empty series, not an error.
    async fn fetch_prices(&self, request: &PriceRequest) -> Result<PriceSeries>;
}

/// Base trait for economic calendar providers
#[async_trait]
pub trait EconomicCalendar: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Fetch events between `from` and `to` (inclusive).
    /// Non-success responses and missing payloads yield an empty list.
    async fn fetch_events(&self, from: &NaiveDate, to: &NaiveDate) -> Result<Vec<EconomicEvent>>;
}
