//! 실행 통계 구조체.

use amfi_core::ReportMonth;
use amfi_data::NormalizeStats;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// 파이프라인 1회 실행 통계
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// 리포트 기준 월
    pub report_month: Option<ReportMonth>,
    /// 다운로드된 파일 경로
    pub report_path: Option<PathBuf>,
    /// 정규화 단계 통계
    pub normalize: Option<NormalizeStats>,
    /// 적재된 행 수
    pub inserted: u64,
    /// 다운로드 소요 시간
    #[serde(skip)]
    pub download_elapsed: Duration,
    /// 적재 소요 시간
    #[serde(skip)]
    pub persist_elapsed: Duration,
    /// 전체 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 정규화된 레코드 수
    pub fn records(&self) -> usize {
        self.normalize.as_ref().map(|s| s.records).unwrap_or(0)
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        let normalize = self.normalize.clone().unwrap_or_default();
        tracing::info!(
            operation = operation,
            month = %self
                .report_month
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string()),
            path = %self
                .report_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
            rows_read = normalize.rows_read,
            sparse_dropped = normalize.sparse_dropped,
            aggregate_dropped = normalize.aggregate_dropped,
            records = normalize.records,
            inserted = self.inserted,
            download = format!("{:.1}s", self.download_elapsed.as_secs_f64()),
            persist = format!("{:.1}s", self.persist_elapsed.as_secs_f64()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "실행 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_defaults_to_zero() {
        let mut stats = RunStats::new();
        assert_eq!(stats.records(), 0);

        stats.normalize = Some(NormalizeStats {
            records: 5,
            ..Default::default()
        });
        assert_eq!(stats.records(), 5);
    }

    #[test]
    fn test_serialises_without_durations() {
        let stats = RunStats {
            inserted: 3,
            elapsed: Duration::from_secs(2),
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["inserted"], 3);
        assert!(json.get("elapsed").is_none());
    }
}
