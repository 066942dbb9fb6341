use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use crate::errors::{Result, CalcError};

/// 四舍五入到指定小数位，只在结果边界处调用
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // 避免输出 -0.0
    if rounded == 0.0 { 0.0 } else { rounded }
}

pub fn round_currency(value: f64) -> f64 {
    round_to(value, 2)
}

pub fn round_volume(value: f64) -> f64 {
    round_to(value, 4)
}

/// 百分比变化：(to - from) / from * 100
pub fn pct_change(from: f64, to: f64) -> f64 {
    (to - from) / from * 100.0
}

// 日期转换工具
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")?)
}

pub fn date_to_utc(date: &NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| CalcError::InvalidInput(format!("unknown timezone {}: {}", name, e)))
}

/// Parse "YYYY-MM-DD HH:MM[:SS]" (or RFC 3339) as a wall-clock time in `tz`.
pub fn parse_event_time(raw: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))?;

    tz.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| CalcError::InvalidInput(format!("ambiguous or invalid local time {} in {}", raw, tz)))
}
