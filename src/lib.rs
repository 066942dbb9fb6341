// 公开导出的模块，供外部使用
pub mod models;
pub mod analysis;
pub mod errors;
pub mod session;
pub mod config;
pub mod scrapers;
pub mod services;

#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use analysis::roi::{adjust_target, calculate_roi, compute_roi};
pub use analysis::historical::{analyze_historical, summarize_series};
pub use analysis::event_impact::{analyze_event_impact, sample_event_impact};
pub use models::roi::{RoiInput, RoiResult, ScenarioResult, TargetLabel, Targets};
pub use models::analysis::{EventImpactSample, HistoricalSummary};
pub use models::price::{Interval, PricePoint, PriceSeries};
pub use session::Session;
pub use errors::{Result, CalcError};
