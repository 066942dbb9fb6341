use log::debug;

use crate::models::analysis::EventImpactSample;

/// 工作流之间传递的会话状态。
///
/// 只有一个字段：最近一次事件影响分析得到的百分比。事件分析完成时写入，
/// ROI 计算在调用方未显式给出影响值时读取；除 `clear` 外只随进程结束而失效。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    last_event_impact_pct: Option<f64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the unrounded change after the second post-event bar.
    pub fn record_event_impact(&mut self, sample: &EventImpactSample) {
        debug!("Session: event impact for {} set to {}%", sample.symbol, sample.unrounded_change_at_offset_2_pct);
        self.last_event_impact_pct = Some(sample.unrounded_change_at_offset_2_pct);
    }

    pub fn set_event_impact(&mut self, pct: f64) {
        self.last_event_impact_pct = Some(pct);
    }

    pub fn last_event_impact(&self) -> Option<f64> {
        self.last_event_impact_pct
    }

    pub fn clear(&mut self) {
        self.last_event_impact_pct = None;
    }
}
