//! 에러 타입 정의.

use amfi_core::CoreError;
use amfi_data::DataError;
use thiserror::Error;

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    /// 파이프라인 단계 에러
    #[error(transparent)]
    Data(#[from] DataError),

    /// 결과 출력 에러
    #[error("Output error: {0}")]
    Output(String),
}

impl From<serde_json::Error> for CollectorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}

impl From<std::io::Error> for CollectorError {
    fn from(err: std::io::Error) -> Self {
        Self::Output(err.to_string())
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
