//! 정규화된 레코드 저장소.

pub mod mysql;

pub use mysql::{create_table_sql, insert_sql, ReportStore};

use amfi_core::NormalizedRecord;
use async_trait::async_trait;

use crate::error::Result;

/// 레코드 적재 대상.
///
/// 구현체는 호출마다 연결을 열고 모든 경로에서 닫아야 합니다.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// 데이터베이스에 연결할 수 있는지 확인합니다.
    async fn check_connectivity(&self) -> bool;

    /// 대상 테이블이 없으면 생성합니다.
    async fn ensure_schema(&self) -> Result<()>;

    /// 레코드를 하나의 트랜잭션으로 적재하고 삽입된 행 수를 반환합니다.
    async fn persist(&self, records: &[NormalizedRecord]) -> Result<u64>;
}
