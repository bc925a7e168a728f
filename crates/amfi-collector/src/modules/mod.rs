//! 배치 작업 모듈.

pub mod inspect;
pub mod pipeline;

pub use inspect::{inspect_report, OutputFormat};
pub use pipeline::{run_pipeline, PipelineOutcome, Stage};
