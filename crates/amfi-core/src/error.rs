//! 핵심 에러 타입.

use thiserror::Error;

/// 설정 및 입력 검증 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
