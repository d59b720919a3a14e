pub mod chunker;
pub mod dedup;
pub mod extraction;
pub mod numeric;
pub mod orchestrator;
pub mod resolver;
pub mod structuring;
pub mod validation;
pub mod writer;

pub use orchestrator::{ImportRequest, ImportRun, ImportSummary, PipelineError, RunState};
pub use writer::ImportCounts;
