//! 리포트 도메인 모델.

pub mod category;
pub mod report;

pub use category::*;
pub use report::*;
