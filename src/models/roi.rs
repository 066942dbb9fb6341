use serde::Serialize;
use std::fmt;

/// 目标价：单一预测值，或者低/平均/高三档
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Targets {
    Single(f64),
    Range { low: f64, average: f64, high: f64 },
}

impl Targets {
    /// Labeled targets in output order.
    pub fn labeled(&self) -> Vec<(TargetLabel, f64)> {
        match *self {
            Targets::Single(target) => vec![(TargetLabel::Forecast, target)],
            Targets::Range { low, average, high } => vec![
                (TargetLabel::Low, low),
                (TargetLabel::Average, average),
                (TargetLabel::High, high),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetLabel {
    Forecast,
    Low,
    Average,
    High,
}

impl fmt::Display for TargetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetLabel::Forecast => "Forecast",
            TargetLabel::Low => "Low",
            TargetLabel::Average => "Average",
            TargetLabel::High => "High",
        };
        f.write_str(name)
    }
}

/// ROI 计算输入
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiInput {
    pub current_price: f64,
    pub targets: Targets,
    pub initial_investment: f64,
    pub leverage: f64,
    /// 宏观事件影响百分比，默认 0
    pub event_impact_pct: f64,
}

impl RoiInput {
    pub fn new(current_price: f64, targets: Targets, initial_investment: f64, leverage: f64) -> Self {
        Self {
            current_price,
            targets,
            initial_investment,
            leverage,
            event_impact_pct: 0.0,
        }
    }

    pub fn with_event_impact(mut self, event_impact_pct: f64) -> Self {
        self.event_impact_pct = event_impact_pct;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoiResult {
    pub roi_pct: f64,
    pub profit: f64,
    pub volume: f64,
    pub position_size: f64,
}

/// One target scenario: the (adjusted) target and its ROI figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub label: TargetLabel,
    pub target: f64,
    pub result: RoiResult,
}
