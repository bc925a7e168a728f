//! AMFI 월간 리포트 적재 작업.
//!
//! 이 crate는 월 1회 실행되는 배치 바이너리를 제공합니다:
//! - DB 연결 확인 → 테이블 생성 → 리포트 다운로드 → 정규화 → 적재
//! - 로컬 리포트 파일 점검 (`inspect`)

pub mod error;
pub mod modules;
pub mod stats;

pub use error::{CollectorError, Result};
pub use stats::RunStats;
