//! tracing을 사용한 로깅 인프라.
//!
//! 배치 작업의 각 단계(다운로드, 정규화, 적재)가 구조화된 필드로 로그를 남깁니다.
//! 출력 형식은 세 가지를 지원합니다:
//! - **pretty**: 개발용 사람이 읽기 쉬운 형식
//! - **json**: cron/로그 수집기용 JSON 형식
//! - **compact**: 한 줄 형식

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;
use crate::error::CoreError;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 색상이 포함된 사람이 읽기 쉬운 형식 (개발용)
    #[default]
    Pretty,
    /// 로그 집계용 JSON 형식 (운영용)
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 로그 레벨 필터 (예: "info", "amfi_data=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// span 이벤트 포함 여부 (진입/종료)
    pub with_span_events: bool,
    /// 파일명과 줄 번호 포함 여부
    pub with_file: bool,
    /// 스레드 ID 포함 여부
    pub with_thread_ids: bool,
    /// 대상(모듈 경로) 포함 여부
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_span_events: false,
            with_file: false,
            with_thread_ids: false,
            with_target: true,
        }
    }
}

impl LogConfig {
    /// 새 로그 설정을 생성합니다.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// 로그 형식을 설정합니다.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// span 이벤트를 활성화합니다.
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.with_span_events = enabled;
        self
    }
}

impl TryFrom<&LoggingConfig> for LogConfig {
    type Error = CoreError;

    /// 알 수 없는 `logging.format`은 설정 에러입니다.
    fn try_from(cfg: &LoggingConfig) -> Result<Self, Self::Error> {
        let format = cfg
            .format
            .parse()
            .map_err(|e| CoreError::Config(format!("logging.format: {}", e)))?;
        Ok(Self::new(cfg.level.clone())
            .with_format(format)
            .with_span_events(cfg.span_events))
    }
}

/// 주어진 설정으로 로깅 시스템을 초기화합니다.
///
/// `RUST_LOG`가 설정되어 있으면 `config.level`보다 우선합니다.
///
/// # 예제
///
/// ```no_run
/// use amfi_core::logging::{init_logging, LogConfig, LogFormat};
///
/// let config = LogConfig::new("debug").with_format(LogFormat::Json);
/// init_logging(config).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let span_events = if config.with_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .with_thread_ids(config.with_thread_ids)
        .with_target(config.with_target)
        .with_span_events(span_events);

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().boxed(),
        LogFormat::Compact => base.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()?;

    tracing::debug!(
        format = ?config.format,
        level = %config.level,
        "Logging initialized"
    );

    Ok(())
}

/// 리포트 단위 span을 생성하는 매크로.
#[macro_export]
macro_rules! report_span {
    ($name:expr, $month:expr) => {
        tracing::info_span!($name, month = %$month)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Compact ".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_config_from_logging_section() {
        let section = LoggingConfig {
            level: "amfi_data=debug".to_string(),
            format: "JSON".to_string(),
            span_events: true,
        };
        let config = LogConfig::try_from(&section).unwrap();

        assert_eq!(config.level, "amfi_data=debug");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.with_span_events);
    }

    #[test]
    fn test_unknown_format_is_config_error() {
        let section = LoggingConfig {
            level: "info".to_string(),
            format: "jsn".to_string(),
            span_events: false,
        };
        let err = LogConfig::try_from(&section).unwrap_err();
        assert!(matches!(err, CoreError::Config(ref m) if m.contains("jsn")));
    }
}
