//! 설정 관리.
//!
//! 설정은 다음 순서로 병합됩니다 (뒤의 소스가 우선):
//! 1. 내장 기본값
//! 2. TOML 파일 (기본 경로 `config/amfi.toml`, 없으면 무시)
//! 3. `AMFI` 접두사 환경 변수 (예: `AMFI__DATABASE__PASSWORD`)
//!
//! `.env` 파일이 있으면 환경 변수로 먼저 로드됩니다.

use config::builder::DefaultState;
use config::ConfigBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/amfi.toml";

/// AMFI 포털 기본 URL.
pub const DEFAULT_BASE_URL: &str = "https://portal.amfiindia.com";

/// 기본 적재 테이블.
pub const DEFAULT_TABLE: &str = "amfi_reports";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 리포트 다운로드 설정
    pub fetch: FetchConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 리포트 다운로드 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// 리포트 호스트 기본 URL
    pub base_url: String,
    /// 다운로드 파일 저장 디렉토리
    pub download_dir: PathBuf,
    /// HTTP 요청 타임아웃 (초, 미설정 시 전송 계층 기본값)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// HTTP User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    concat!("amfi-collector/", env!("CARGO_PKG_VERSION")).to_string()
}

impl FetchConfig {
    /// 요청 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// 비밀번호 (로그에 노출되지 않음)
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    pub password: SecretString,
    /// 데이터베이스 이름
    pub database: String,
    /// 적재 대상 테이블
    #[serde(default = "default_table")]
    pub table: String,
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new().into_boxed_str())
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| SecretString::new(s.into_boxed_str()))
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl Clone for DatabaseConfig {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: SecretString::new(self.password.expose_secret().into()),
            database: self.database.clone(),
            table: self.table.clone(),
        }
    }
}

impl DatabaseConfig {
    /// 테이블 이름이 단순 SQL 식별자인지 검증합니다.
    ///
    /// 테이블 이름은 쿼리 문자열에 직접 삽입되므로 `[A-Za-z_][A-Za-z0-9_]*`만 허용합니다.
    pub fn validate(&self) -> CoreResult<()> {
        if !is_sql_identifier(&self.table) {
            return Err(CoreError::InvalidInput(format!(
                "테이블 이름이 올바르지 않습니다: {:?}",
                self.table
            )));
        }
        if self.host.trim().is_empty() {
            return Err(CoreError::Config("database.host가 비어 있습니다".to_string()));
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*` 형식 검사
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// span 진입/종료 이벤트 출력
    #[serde(default)]
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            span_events: false,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// `path`가 주어지면 해당 파일은 반드시 존재해야 하고,
    /// 없으면 기본 경로를 선택적으로 읽습니다.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        dotenvy::dotenv().ok();

        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let builder = with_defaults()?
            .add_source(config::File::from(file).required(required))
            .add_source(
                config::Environment::with_prefix("AMFI")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.database.validate()?;
        Ok(config)
    }
}

/// 내장 기본값이 채워진 빌더.
pub(crate) fn with_defaults() -> CoreResult<ConfigBuilder<DefaultState>> {
    Ok(config::Config::builder()
        .set_default("fetch.base_url", DEFAULT_BASE_URL)?
        .set_default("fetch.download_dir", "reports")?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 3306)?
        .set_default("database.user", "root")?
        .set_default("database.password", "")?
        .set_default("database.database", "stat_amfi_project")?
        .set_default("database.table", DEFAULT_TABLE)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "pretty")?)
}
