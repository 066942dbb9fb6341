use crate::errors::{Result, CalcError};
use std::env;

pub const DEFAULT_PRICE_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_CALENDAR_BASE_URL: &str = "https://finnhub.io";

#[derive(Debug, Clone)]
pub struct Config {
    pub price_base_url: String,
    pub calendar_base_url: String,
    pub calendar_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub min_request_interval_ms: u64,
    pub event_window_minutes: i64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            price_base_url: DEFAULT_PRICE_BASE_URL.to_string(),
            calendar_base_url: DEFAULT_CALENDAR_BASE_URL.to_string(),
            calendar_api_key: None,
            request_timeout_secs: 30,
            min_request_interval_ms: 500,
            event_window_minutes: 60,
        }
    }

    /// 从环境变量读取配置，未设置的字段保持默认值
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from any `FINCALC_*` variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(url) = lookup("FINCALC_PRICE_BASE_URL") {
            config = config.with_price_base_url(&url);
        }
        if let Some(url) = lookup("FINCALC_CALENDAR_BASE_URL") {
            config = config.with_calendar_base_url(&url);
        }
        if let Some(key) = lookup("FINCALC_CALENDAR_API_KEY") {
            if !key.trim().is_empty() {
                config = config.with_calendar_api_key(key.trim());
            }
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "FINCALC_REQUEST_TIMEOUT_SECS")? {
            config = config.with_request_timeout_secs(secs);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "FINCALC_MIN_REQUEST_INTERVAL_MS")? {
            config = config.with_min_request_interval_ms(ms);
        }
        if let Some(minutes) = parse_var::<i64, _>(&lookup, "FINCALC_EVENT_WINDOW_MINUTES")? {
            if minutes <= 0 {
                return Err(CalcError::ConfigError(format!(
                    "FINCALC_EVENT_WINDOW_MINUTES must be positive, got {}", minutes
                )));
            }
            config = config.with_event_window_minutes(minutes);
        }

        Ok(config)
    }

    pub fn with_price_base_url(mut self, url: &str) -> Self {
        self.price_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_calendar_base_url(mut self, url: &str) -> Self {
        self.calendar_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_calendar_api_key(mut self, key: &str) -> Self {
        self.calendar_api_key = Some(key.to_string());
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_min_request_interval_ms(mut self, ms: u64) -> Self {
        self.min_request_interval_ms = ms;
        self
    }

    pub fn with_event_window_minutes(mut self, minutes: i64) -> Self {
        self.event_window_minutes = minutes;
        self
    }

    pub fn event_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.event_window_minutes)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| CalcError::ConfigError(format!("{}={}: {}", name, raw, e))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let config = Config::new()
            .with_price_base_url("http://localhost:8080/")
            .with_calendar_api_key("secret")
            .with_event_window_minutes(30);

        assert_eq!(config.price_base_url, "http://localhost:8080");
        assert_eq!(config.calendar_api_key.as_deref(), Some("secret"));
        assert_eq!(config.event_window(), chrono::Duration::minutes(30));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.price_base_url, DEFAULT_PRICE_BASE_URL);
        assert!(config.calendar_api_key.is_none());
        assert_eq!(config.event_window_minutes, 60);
    }

    #[test]
    fn test_from_lookup_reads_all_vars() {
        let config = from_vars(&[
            ("FINCALC_PRICE_BASE_URL", "http://127.0.0.1:9000/"),
            ("FINCALC_CALENDAR_BASE_URL", "http://127.0.0.1:9001"),
            ("FINCALC_CALENDAR_API_KEY", "  abc123 "),
            ("FINCALC_REQUEST_TIMEOUT_SECS", "5"),
            ("FINCALC_MIN_REQUEST_INTERVAL_MS", " 0 "),
            ("FINCALC_EVENT_WINDOW_MINUTES", "15"),
        ])
        .unwrap();

        assert_eq!(config.price_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.calendar_base_url, "http://127.0.0.1:9001");
        assert_eq!(config.calendar_api_key.as_deref(), Some("abc123"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.min_request_interval_ms, 0);
        assert_eq!(config.event_window(), chrono::Duration::minutes(15));
    }

    #[test]
    fn test_from_lookup_without_vars_keeps_defaults() {
        let config = from_vars(&[("FINCALC_CALENDAR_API_KEY", "   ")]).unwrap();
        assert!(config.calendar_api_key.is_none());
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.min_request_interval_ms, 500);
        assert_eq!(config.event_window_minutes, 60);
    }

    #[test]
    fn test_non_positive_event_window_is_rejected() {
        for raw in ["0", "-30"] {
            let err = from_vars(&[("FINCALC_EVENT_WINDOW_MINUTES", raw)]).unwrap_err();
            assert!(matches!(err, CalcError::ConfigError(_)));
            assert!(err.to_string().contains("must be positive"));
        }
    }

    #[test]
    fn test_malformed_numbers_are_rejected() {
        let cases = [
            ("FINCALC_REQUEST_TIMEOUT_SECS", "thirty"),
            ("FINCALC_MIN_REQUEST_INTERVAL_MS", "-1"),
            ("FINCALC_EVENT_WINDOW_MINUTES", "1.5"),
        ];
        for (name, raw) in cases {
            let err = from_vars(&[(name, raw)]).unwrap_err();
            assert!(matches!(err, CalcError::ConfigError(_)));
            assert!(err.to_string().contains(name));
        }
    }
}
