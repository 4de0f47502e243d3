pub mod extraction_flow;
pub mod file_ctx;

pub use extraction_flow::{ExtractionFlow, FileOutcome, ProcessResult};
pub use file_ctx::FileCtx;
