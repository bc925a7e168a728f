//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 파이프라인 단계별 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 리포트 다운로드 실패 (200이 아닌 응답, 전송 오류)
    #[error("Download error: {0}")]
    Download(String),

    /// 스프레드시트 파싱 실패 (손상된 파일, 예상과 다른 구조)
    #[error("Parse error: {0}")]
    Parse(String),

    /// 데이터베이스 연결 실패
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// 테이블 생성 또는 행 삽입 실패
    #[error("Persist error: {0}")]
    Persist(String),

    /// 로컬 파일 I/O 오류
    #[error("I/O error: {0}")]
    Io(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataError {
    /// 로그/결과 보고용 고정 라벨
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Download(_) => "download",
            Self::Parse(_) => "parse",
            Self::Connectivity(_) => "connectivity",
            Self::Persist(_) => "persist",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
        }
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut => {
                DataError::Connectivity(err.to_string())
            }
            sqlx::Error::Database(db_err) => DataError::Persist(db_err.message().to_string()),
            _ => DataError::Persist(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        DataError::Download(err.to_string())
    }
}

impl From<calamine::Error> for DataError {
    fn from(err: calamine::Error) -> Self {
        DataError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
