//! 월간 리포트 적재 파이프라인.
//!
//! 단계는 순서대로 실행되며, 한 단계가 실패하면 이후 단계는 호출되지 않습니다:
//!
//! 1. DB 연결 확인
//! 2. 테이블 생성
//! 3. 직전 달 리포트 다운로드
//! 4. 정규화
//! 5. 적재
//!
//! 실패는 [`PipelineOutcome::Halted`]로 반환되며 프로세스 종료 코드에는 영향을 주지 않습니다.

use amfi_core::ReportMonth;
use amfi_data::{ReportParser, ReportSink, ReportSource};
use chrono::NaiveDate;
use std::fmt;
use std::time::Instant;
use tracing::{error, info, Instrument};

use crate::stats::RunStats;

/// 파이프라인 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connectivity,
    Schema,
    Download,
    Normalize,
    Persist,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connectivity => "connectivity",
            Self::Schema => "schema",
            Self::Download => "download",
            Self::Normalize => "normalize",
            Self::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 파이프라인 실행 결과
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// 모든 단계 성공 (적재 0건 포함)
    Completed(RunStats),
    /// 특정 단계에서 중단
    Halted {
        stage: Stage,
        error: String,
        stats: RunStats,
    },
}

impl PipelineOutcome {
    pub fn stats(&self) -> &RunStats {
        match self {
            Self::Completed(stats) => stats,
            Self::Halted { stats, .. } => stats,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// 중단된 단계
    pub fn halted_at(&self) -> Option<Stage> {
        match self {
            Self::Completed(_) => None,
            Self::Halted { stage, .. } => Some(*stage),
        }
    }
}

/// 전체 파이프라인을 실행합니다.
///
/// `today`는 실행 날짜이며, 리포트 기준 월은 그 직전 달입니다.
pub async fn run_pipeline(
    source: &dyn ReportSource,
    parser: &dyn ReportParser,
    sink: &dyn ReportSink,
    today: NaiveDate,
) -> PipelineOutcome {
    let month = ReportMonth::preceding(today);
    let span = amfi_core::report_span!("run_pipeline", month);

    async move {
        let started = Instant::now();
        let mut stats = RunStats {
            report_month: Some(month),
            ..Default::default()
        };

        macro_rules! halt {
            ($stage:expr, $err:expr) => {{
                let error = $err.to_string();
                stats.elapsed = started.elapsed();
                error!(stage = %$stage, error = %error, "파이프라인 중단");
                return PipelineOutcome::Halted {
                    stage: $stage,
                    error,
                    stats,
                };
            }};
        }

        // 1. 연결 확인
        info!("Step 1/5: DB 연결 확인");
        if !sink.check_connectivity().await {
            halt!(Stage::Connectivity, "데이터베이스에 연결할 수 없습니다");
        }

        // 2. 테이블 생성
        info!("Step 2/5: 테이블 확인");
        if let Err(e) = sink.ensure_schema().await {
            halt!(Stage::Schema, e);
        }

        // 3. 다운로드
        info!("Step 3/5: 리포트 다운로드");
        let download_started = Instant::now();
        let path = match source.fetch_latest(today).await {
            Ok(path) => path,
            Err(e) => halt!(Stage::Download, e),
        };
        stats.download_elapsed = download_started.elapsed();
        stats.report_path = Some(path.clone());

        // 4. 정규화
        info!("Step 4/5: 정규화");
        let report = match parser.parse(&path) {
            Ok(report) => report,
            Err(e) => halt!(Stage::Normalize, e),
        };
        stats.normalize = Some(report.stats.clone());

        // 5. 적재 (빈 레코드도 그대로 전달)
        info!(records = report.records.len(), "Step 5/5: 적재");
        let persist_started = Instant::now();
        match sink.persist(&report.records).await {
            Ok(inserted) => stats.inserted = inserted,
            Err(e) => halt!(Stage::Persist, e),
        }
        stats.persist_elapsed = persist_started.elapsed();
        stats.elapsed = started.elapsed();

        PipelineOutcome::Completed(stats)
    }
    .instrument(span)
    .await
}
