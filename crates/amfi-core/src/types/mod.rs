//! 공통 값 타입.

pub mod month;

pub use month::ReportMonth;
