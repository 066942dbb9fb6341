use serde::Serialize;

/// Economic calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomicEvent {
    pub event: String,
    /// 提供方原始时间字符串，例如 "2024-01-05 13:30:00"（UTC）
    pub date: String,
    pub country: String,
    pub impact: String,
}
