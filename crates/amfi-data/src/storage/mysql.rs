//! MySQL 저장소 구현.
//!
//! 연결 풀 없이 단계마다 단일 연결을 열고 닫습니다. 월 1회 배치 작업이라
//! 동시 호출자가 없습니다.
//!
//! 같은 레코드를 두 번 적재하면 행이 두 배가 됩니다 (중복 제거/upsert 없음).

use amfi_core::{DatabaseConfig, NormalizedRecord};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, error, info, instrument, warn};

use super::ReportSink;
use crate::error::{DataError, Result};

/// 테이블 생성 DDL.
pub fn create_table_sql(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INT AUTO_INCREMENT PRIMARY KEY,
            SR VARCHAR(255),
            Scheme_Name VARCHAR(255),
            No_of_Scheme INT,
            No_of_Folio INT,
            Gross_Sales DECIMAL(15, 2),
            Redemption DECIMAL(15, 2),
            Net_Sales DECIMAL(15, 2),
            AUM DECIMAL(15, 2),
            AAUM DECIMAL(15, 2),
            No_of_Portfolio INT,
            NAV DECIMAL(15, 2),
            Scheme_Type VARCHAR(255),
            Detailed_Scheme_Type VARCHAR(255)
        )
        "#
    )
}

/// 레코드 한 건의 INSERT 문 (13개 파라미터).
pub fn insert_sql(table: &str) -> String {
    format!(
        r#"
        INSERT INTO {table} (
            SR, Scheme_Name, No_of_Scheme, No_of_Folio, Gross_Sales, Redemption,
            Net_Sales, AUM, AAUM, No_of_Portfolio, NAV, Scheme_Type, Detailed_Scheme_Type
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#
    )
}

/// MySQL 리포트 저장소.
#[derive(Debug, Clone)]
pub struct ReportStore {
    options: MySqlConnectOptions,
    table: String,
}

impl ReportStore {
    /// 설정으로부터 저장소를 생성합니다. 테이블 이름을 검증합니다.
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| DataError::Config(e.to_string()))?;

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(config.password.expose_secret())
            .database(&config.database);

        Ok(Self {
            options,
            table: config.table.clone(),
        })
    }

    /// 연결 옵션을 직접 지정합니다 (테스트용 URL 등).
    pub fn with_options(options: MySqlConnectOptions, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        if !amfi_core::is_sql_identifier(&table) {
            return Err(DataError::Config(format!(
                "테이블 이름이 올바르지 않습니다: {:?}",
                table
            )));
        }
        Ok(Self { options, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    async fn connect(&self) -> Result<MySqlConnection> {
        self.options
            .connect()
            .await
            .map_err(|e| DataError::Connectivity(e.to_string()))
    }

    /// 연결을 닫습니다. 닫기 실패는 결과에 영향을 주지 않습니다.
    async fn release(conn: MySqlConnection) {
        if let Err(e) = conn.close().await {
            warn!(error = %e, "데이터베이스 연결 종료 실패");
        }
    }

    /// 데이터베이스 연결 확인. 실패 사유는 로그로 남깁니다.
    #[instrument(skip(self))]
    pub async fn check_connectivity(&self) -> bool {
        match self.connect().await {
            Ok(conn) => {
                info!("데이터베이스 연결 확인");
                Self::release(conn).await;
                true
            }
            Err(e) => {
                error!(error = %e, "데이터베이스에 연결할 수 없습니다");
                false
            }
        }
    }

    /// 대상 테이블이 없으면 생성합니다.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn ensure_schema(&self) -> Result<()> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(&create_table_sql(&self.table))
            .execute(&mut conn)
            .await
            .map_err(|e| DataError::Persist(format!("테이블 생성 실패: {}", e)));
        Self::release(conn).await;

        result?;
        debug!("테이블 확인 완료");
        Ok(())
    }

    /// 레코드를 하나의 트랜잭션으로 적재합니다.
    ///
    /// 한 건이라도 실패하면 전체를 롤백하고 실패한 행 위치를 에러에 담습니다.
    #[instrument(skip(self, records), fields(table = %self.table, records = records.len()))]
    pub async fn persist(&self, records: &[NormalizedRecord]) -> Result<u64> {
        if records.is_empty() {
            info!("적재할 레코드가 없습니다");
            return Ok(0);
        }

        let mut conn = self.connect().await?;
        let result = self.insert_all(&mut conn, records).await;
        Self::release(conn).await;

        let inserted = result?;
        info!(inserted, "레코드 적재 완료");
        Ok(inserted)
    }

    async fn insert_all(&self, conn: &mut MySqlConnection, records: &[NormalizedRecord]) -> Result<u64> {
        let sql = insert_sql(&self.table);
        let mut tx = conn.begin().await?;
        let mut inserted = 0u64;

        for (idx, record) in records.iter().enumerate() {
            let result = sqlx::query(&sql)
                .bind(&record.sr)
                .bind(&record.scheme_name)
                .bind(record.no_of_scheme)
                .bind(record.no_of_folio)
                .bind(record.gross_sales)
                .bind(record.redemption)
                .bind(record.net_sales)
                .bind(record.aum)
                .bind(record.aaum)
                .bind(record.no_of_portfolio)
                .bind(record.nav)
                .bind(record.scheme_type_label())
                .bind(record.detailed_scheme_type_label())
                .execute(&mut *tx)
                .await;

            match result {
                Ok(done) => inserted += done.rows_affected(),
                Err(e) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(error = %rollback_err, "롤백 실패");
                    }
                    return Err(DataError::Persist(format!(
                        "{}번째 행 삽입 실패 (SR={}, Scheme_Name={}): {}",
                        idx, record.sr, record.scheme_name, e
                    )));
                }
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// 대상 테이블의 전체 행 수.
    pub async fn count_rows(&self) -> Result<i64> {
        let mut conn = self.connect().await?;
        let result: Result<i64> = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table))
            .fetch_one(&mut conn)
            .await
            .map_err(DataError::from);
        Self::release(conn).await;
        result
    }
}

#[async_trait]
impl ReportSink for ReportStore {
    async fn check_connectivity(&self) -> bool {
        ReportStore::check_connectivity(self).await
    }

    async fn ensure_schema(&self) -> Result<()> {
        ReportStore::ensure_schema(self).await
    }

    async fn persist(&self, records: &[NormalizedRecord]) -> Result<u64> {
        ReportStore::persist(self, records).await
    }
}
