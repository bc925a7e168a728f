//! 리포트 수집, 정규화 및 저장.
//!
//! 이 crate는 파이프라인의 세 단계를 제공합니다:
//! - [`provider`]: 직전 달 리포트 URL 계산 및 다운로드
//! - [`normalize`]: 스프레드시트 파싱과 카테고리 계층 복원
//! - [`storage`]: MySQL 테이블 생성 및 레코드 적재
//!
//! 각 단계는 trait(`ReportSource`, `ReportParser`, `ReportSink`)으로 노출되어
//! 오케스트레이터에서 교체/목킹할 수 있습니다.

pub mod error;
pub mod normalize;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};
pub use normalize::{NormalizeStats, NormalizedReport, ReportParser, WorkbookParser};
pub use provider::{AmfiReportFetcher, ReportSource};
pub use storage::{ReportSink, ReportStore};
