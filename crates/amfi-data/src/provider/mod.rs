//! 리포트 데이터 소스.

pub mod amfi;

pub use amfi::{report_file_name, resolve_report_url, AmfiReportFetcher};

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::error::Result;

/// 월간 리포트 원본을 로컬 파일로 가져오는 소스.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// `today` 기준 직전 달 리포트를 내려받아 저장 경로를 반환합니다.
    async fn fetch_latest(&self, today: NaiveDate) -> Result<PathBuf>;
}
