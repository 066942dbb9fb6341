use thiserror::Error;
use std::num::ParseFloatError;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    NoData(String),

    #[error("External source failure: {0}")]
    ExternalFailure(String),

    #[error("Empty series: {0}")]
    EmptySeries(String),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Parse float error: {0}")]
    ParseFloatError(#[from] ParseFloatError),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl CalcError {
    /// 采集层错误（网络、解析）统一转换为 ExternalFailure，领域错误原样保留
    pub fn into_external(self) -> Self {
        match self {
            CalcError::RequestError(_)
            | CalcError::JsonError(_)
            | CalcError::DateError(_)
            | CalcError::ParseFloatError(_)
            | CalcError::Unknown(_) => CalcError::ExternalFailure(self.to_string()),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

// 用于从字符串创建错误
impl From<String> for CalcError {
    fn from(s: String) -> Self {
        CalcError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for CalcError {
    fn from(s: &str) -> Self {
        CalcError::Unknown(s.to_string())
    }
}
