//! # AMFI Core
//!
//! AMFI 월간 펀드 리포트 적재기의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 리포트 원본 행(셀) 및 정규화된 레코드
//! - 스킴 카테고리 계층 (Scheme Type → Detailed Scheme Type)
//! - 리포트 기준 월 계산
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
